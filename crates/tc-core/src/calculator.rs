//! Expression calculator plugins.
//!
//! A plugin is looked up by path through a [`CalculatorLoader`]. The
//! [`CalculatorRegistry`] resolves paths either from exact registrations or
//! from a JSON manifest file naming a registered calculator kind. Loaded
//! instances are kept in a host-owned [`CalculatorCache`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CalcError, CalculatorError};
use crate::value::Value;

/// Kind name of the built-in average-magnitude calculator.
pub const VECTOR_AVERAGE_MAGNITUDE: &str = "vector-average-magnitude";

/// Plugin entry point.
pub trait ExpressionCalculator: Send + Sync {
    fn eval(&self, args: &[Value]) -> Result<Value, CalculatorError>;
}

/// Builds a calculator for the path it was loaded from.
pub type CalculatorFactory = fn(&str) -> Box<dyn ExpressionCalculator>;

pub trait CalculatorLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<Arc<dyn ExpressionCalculator>, CalcError>;
}

#[derive(Deserialize)]
struct Manifest {
    calculator: String,
}

#[derive(Default)]
pub struct CalculatorRegistry {
    paths: HashMap<String, CalculatorFactory>,
    kinds: HashMap<String, CalculatorFactory>,
}

impl CalculatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every calculator kind shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_kind(VECTOR_AVERAGE_MAGNITUDE, |path| {
            Box::new(VectorAverageMagnitude::new(path))
        });
        registry
    }

    pub fn register_path(&mut self, path: &str, factory: CalculatorFactory) -> &mut Self {
        self.paths.insert(path.to_string(), factory);
        self
    }

    pub fn register_kind(&mut self, kind: &str, factory: CalculatorFactory) -> &mut Self {
        self.kinds.insert(kind.to_string(), factory);
        self
    }
}

impl CalculatorLoader for CalculatorRegistry {
    fn load(&self, path: &str) -> Result<Arc<dyn ExpressionCalculator>, CalcError> {
        if let Some(factory) = self.paths.get(path) {
            return Ok(Arc::from(factory(path)));
        }

        let text = std::fs::read_to_string(path).map_err(|e| CalcError::load(path, e))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .map_err(|e| CalcError::load(path, format!("malformed manifest: {e}")))?;
        let factory = self.kinds.get(&manifest.calculator).ok_or_else(|| {
            CalcError::load(
                path,
                format!("no calculator of kind {:?}", manifest.calculator),
            )
        })?;
        Ok(Arc::from(factory(path)))
    }
}

/// Loaded plugins keyed by path. Repeated loads share one instance.
pub struct CalculatorCache {
    loader: Box<dyn CalculatorLoader>,
    loaded: Mutex<HashMap<String, Arc<dyn ExpressionCalculator>>>,
}

impl CalculatorCache {
    pub fn new(loader: impl CalculatorLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn load(&self, path: &str) -> Result<CalculatorRef, CalcError> {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(calculator) = loaded.get(path) {
            debug!(path, "calculator cache hit");
            return Ok(CalculatorRef::new(path, Arc::clone(calculator)));
        }

        let calculator = self.loader.load(path)?;
        debug!(path, "loaded calculator");
        loaded.insert(path.to_string(), Arc::clone(&calculator));
        Ok(CalculatorRef::new(path, calculator))
    }

    pub fn len(&self) -> usize {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CalculatorCache {
    fn default() -> Self {
        Self::new(CalculatorRegistry::builtin())
    }
}

/// A loaded plugin together with the path it came from.
#[derive(Clone)]
pub struct CalculatorRef {
    path: String,
    calculator: Arc<dyn ExpressionCalculator>,
}

impl CalculatorRef {
    pub fn new(path: &str, calculator: Arc<dyn ExpressionCalculator>) -> Self {
        Self {
            path: path.to_string(),
            calculator,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn eval(&self, args: &[Value]) -> Result<Value, CalcError> {
        self.calculator.eval(args).map_err(|source| CalcError::Eval {
            path: self.path.clone(),
            source,
        })
    }

    pub fn same_instance(&self, other: &CalculatorRef) -> bool {
        Arc::ptr_eq(&self.calculator, &other.calculator)
    }
}

impl fmt::Debug for CalculatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorRef")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CalculatorRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

/// Mean magnitude of its vector arguments.
pub struct VectorAverageMagnitude {
    path: String,
}

impl VectorAverageMagnitude {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl ExpressionCalculator for VectorAverageMagnitude {
    fn eval(&self, args: &[Value]) -> Result<Value, CalculatorError> {
        if args.is_empty() {
            return Err(CalculatorError(format!(
                "{} needs at least one vector",
                self.path
            )));
        }
        let mut total = 0.0;
        for arg in args {
            total += match arg {
                Value::Tetra(t) => t.magnitude(),
                Value::Cartesian(c) => c.magnitude(),
                other => {
                    return Err(CalculatorError(format!(
                        "cannot average the magnitude of {} {other}",
                        other.type_name()
                    )));
                }
            };
        }
        Ok(Value::Number(total / args.len() as f64))
    }
}
