use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tc_core::{
    ANSWER_KEY, CalcError, CalculatorCache, Radix, VAR_NAMESPACE, Value, VariableContext,
    VectorKind, evaluate,
};
use tc_store::{DEFAULT_DATA_FILE, Settings};

#[derive(Parser)]
#[command(name = "tc", about = "Tetracoordinate calculator")]
struct Cli {
    /// Data file holding persisted variables
    #[arg(long, short = 'f', global = true, env = "TC_DATA_FILE")]
    file: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, global = true, env = "TC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Log filter, e.g. `info` or `tc_core=debug`
    #[arg(long, short = 'l', global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one expression
    Eval {
        /// Expression text
        expr: String,

        #[command(flatten)]
        output: OutputArgs,

        /// Leave the data file untouched
        #[arg(long)]
        no_save: bool,
    },

    /// Read expressions from stdin, one per line
    Repl {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List stored variables
    Vars {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct OutputArgs {
    /// Show numbers in this radix
    #[arg(long, short = 's', value_enum)]
    radix: Option<RadixArg>,

    /// Convert vectors to this type before printing
    #[arg(long, short = 'v', value_enum)]
    vector: Option<VectorArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RadixArg {
    B,
    Q,
    D,
}

impl From<RadixArg> for Radix {
    fn from(arg: RadixArg) -> Self {
        match arg {
            RadixArg::B => Radix::Binary,
            RadixArg::Q => Radix::Quaternary,
            RadixArg::D => Radix::Decimal,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VectorArg {
    Cc,
    Tc,
}

impl From<VectorArg> for VectorKind {
    fn from(arg: VectorArg) -> Self {
        match arg {
            VectorArg::Cc => VectorKind::Cartesian,
            VectorArg::Tc => VectorKind::Tetra,
        }
    }
}

fn init_tracing(verbose: bool, level: Option<&str>) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else if let Some(level) = level {
        EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to read settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    init_tracing(
        cli.verbose,
        cli.log_level.as_deref().or(settings.log_level.as_deref()),
    )?;

    match &cli.command {
        Commands::Eval {
            expr,
            output,
            no_save,
        } => cmd_eval(&cli, &settings, output, expr, *no_save),
        Commands::Repl { output } => cmd_repl(&cli, &settings, output),
        Commands::Vars { output } => cmd_vars(&cli, &settings, output),
    }
}

// ---------------------------------------------------------------------------
// Session: data file, context, and display options shared by all commands
// ---------------------------------------------------------------------------

struct Session {
    path: PathBuf,
    ctx: VariableContext,
    cache: CalculatorCache,
    radix: Option<Radix>,
    vector: Option<VectorKind>,
    /// Set while the data file on disk could not be read; automatic saves
    /// are skipped so it is not clobbered.
    unreadable: bool,
}

enum Flow {
    Continue,
    Quit,
}

impl Session {
    fn open(cli: &Cli, settings: &Settings, output: &OutputArgs) -> Result<Self> {
        let path = cli
            .file
            .clone()
            .or_else(|| settings.data_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        let radix = match output.radix {
            Some(arg) => Some(arg.into()),
            None => settings.radix()?,
        };
        let vector = match output.vector {
            Some(arg) => Some(arg.into()),
            None => settings.vector()?,
        };

        let mut session = Session {
            path,
            ctx: VariableContext::new(),
            cache: CalculatorCache::default(),
            radix,
            vector,
            unreadable: false,
        };
        if let Err(e) = session.reload() {
            tracing::warn!("ignoring data file: {e}");
        }
        Ok(session)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the context with the data file's contents. A bad file keeps
    /// the current context and blocks automatic saves.
    fn reload(&mut self) -> tc_store::Result<()> {
        let mut ctx = VariableContext::new();
        match tc_store::load_into(&self.path, &mut ctx, &self.cache) {
            Ok(_) => {
                self.ctx = ctx;
                self.unreadable = false;
                Ok(())
            }
            Err(e) => {
                self.unreadable = true;
                Err(e)
            }
        }
    }

    fn save(&mut self) -> Result<()> {
        tc_store::save(&self.path, &self.ctx)
            .with_context(|| format!("failed to save {}", self.path.display()))?;
        self.unreadable = false;
        Ok(())
    }

    fn autosave(&mut self) -> Result<()> {
        if self.unreadable {
            tracing::warn!("not overwriting unreadable {}", self.path.display());
            return Ok(());
        }
        self.save()
    }

    fn render(&self, value: &Value) -> std::result::Result<String, CalcError> {
        value
            .format(self.radix, self.vector)
            .map_err(|e| CalcError::scalar(value, e))
    }

    fn eval(&mut self, expr: &str) -> std::result::Result<String, CalcError> {
        let value = evaluate(expr, Some(&mut self.ctx), &self.cache)?;
        self.render(&value)
    }

    /// One line per variable. An entry that cannot be rendered is reported
    /// on stderr and the listing goes on.
    fn print_vars(&self) {
        let answer = (ANSWER_KEY, self.ctx.answer());
        for (name, value) in self.ctx.entries().chain(std::iter::once(answer)) {
            match value.map(|v| self.render(v)) {
                Some(Ok(text)) => println!("{VAR_NAMESPACE}.{name} = {text}"),
                Some(Err(e)) => eprintln!("error: {VAR_NAMESPACE}.{name}: {e}"),
                None => println!("{VAR_NAMESPACE}.{name} = (unset)"),
            }
        }
    }

    fn command(&mut self, line: &str) -> Result<Flow> {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("quit" | "q" | "exit"), _) => return Ok(Flow::Quit),
            (Some("radix"), Some(arg)) => match parse_option::<RadixArg>(arg) {
                Ok(radix) => self.radix = radix.map(Into::into),
                Err(e) => eprintln!("error: {e}"),
            },
            (Some("vector"), Some(arg)) => match parse_option::<VectorArg>(arg) {
                Ok(vector) => self.vector = vector.map(Into::into),
                Err(e) => eprintln!("error: {e}"),
            },
            (Some("vars"), None) => self.print_vars(),
            (Some("save"), None) => match self.save() {
                Ok(()) => println!("saved to {}", self.path().display()),
                Err(e) => eprintln!("error: {e:#}"),
            },
            (Some("reload"), None) => match self.reload() {
                Ok(()) => println!("loaded {} variables", self.ctx.len()),
                Err(e) => eprintln!("error: {e}"),
            },
            _ => eprintln!("unknown command :{line}"),
        }
        Ok(Flow::Continue)
    }
}

/// `none` clears the option.
fn parse_option<T: ValueEnum>(arg: &str) -> std::result::Result<Option<T>, String> {
    if arg == "none" {
        return Ok(None);
    }
    T::from_str(arg, true).map(Some)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_eval(
    cli: &Cli,
    settings: &Settings,
    output: &OutputArgs,
    expr: &str,
    no_save: bool,
) -> Result<()> {
    let mut session = Session::open(cli, settings, output)?;
    let result = session
        .eval(expr)
        .with_context(|| format!("failed to evaluate {expr:?}"))?;
    println!("result = {result}");

    if !no_save {
        session.autosave()?;
    }
    Ok(())
}

fn cmd_repl(cli: &Cli, settings: &Settings, output: &OutputArgs) -> Result<()> {
    let mut session = Session::open(cli, settings, output)?;
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("tc> ");
            std::io::stdout().flush().context("failed to write prompt")?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match session.command(command)? {
                Flow::Continue => continue,
                Flow::Quit => break,
            }
        }

        match session.eval(line) {
            Ok(result) => println!("result = {result}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    session.autosave()
}

fn cmd_vars(cli: &Cli, settings: &Settings, output: &OutputArgs) -> Result<()> {
    let session = Session::open(cli, settings, output)?;
    println!("data file: {}", session.path().display());
    session.print_vars();
    Ok(())
}
