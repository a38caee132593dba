//! The CLI's on-disk data file: a serialized variable context wrapped in a
//! tagged envelope.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tc_core::serde_compat::WireContext;
use tc_core::{CalculatorCache, VariableContext};

use crate::error::{Result, StoreError};

pub const DATA_FILE_TAG: &str = "tcoord-cli";
pub const DEFAULT_DATA_FILE: &str = "default.tcoord-data.json";

#[derive(Serialize, Deserialize, Debug)]
struct WireDataFile {
    #[serde(rename = "type")]
    kind: String,
    var: WireContext,
}

/// Merge the data file at `path` into `ctx`. Returns `false` when the file
/// does not exist. On error `ctx` is left as it was.
pub fn load_into(path: &Path, ctx: &mut VariableContext, cache: &CalculatorCache) -> Result<bool> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            tracing::warn!("no data file at {}, starting empty", path.display());
            return Ok(false);
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let file: WireDataFile = serde_json::from_str(&json).map_err(|e| StoreError::json(path, e))?;
    if file.kind != DATA_FILE_TAG {
        return Err(StoreError::InvalidData(format!(
            "{} has type {:?}, expected {DATA_FILE_TAG:?}",
            path.display(),
            file.kind
        )));
    }

    ctx.load(file.var, cache)?;
    tracing::info!("loaded {} variables from {}", ctx.len(), path.display());
    Ok(true)
}

/// Write `ctx` to `path`, creating parent directories as needed.
pub fn save(path: &Path, ctx: &VariableContext) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let file = WireDataFile {
        kind: DATA_FILE_TAG.to_string(),
        var: ctx.save(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::json(path, e))?;
    fs::write(path, json).map_err(|e| StoreError::io(path, e))?;
    tracing::info!("saved {} variables to {}", ctx.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::{CalculatorRegistry, Value, VectorAverageMagnitude, evaluate};
    use tempfile::TempDir;

    fn cache() -> CalculatorCache {
        let mut registry = CalculatorRegistry::builtin();
        registry.register_path("mem://avg", |p| Box::new(VectorAverageMagnitude::new(p)));
        CalculatorCache::new(registry)
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let mut ctx = VariableContext::new();
        let loaded = load_into(&dir.path().join("absent.json"), &mut ctx, &cache()).unwrap();
        assert!(!loaded);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/data.json");
        let cache = cache();

        let mut ctx = VariableContext::new();
        evaluate("var.t = tc[0q321.2i]", Some(&mut ctx), &cache).unwrap();
        evaluate("var.avg = exprcalc['mem://avg']", Some(&mut ctx), &cache).unwrap();
        ctx.declare("pending");
        save(&path, &ctx).unwrap();

        let mut restored = VariableContext::new();
        assert!(load_into(&path, &mut restored, &cache).unwrap());
        assert_eq!(restored, ctx);
        assert_eq!(
            evaluate("var.avg(var.t) === |var.t|", Some(&mut restored), &cache).unwrap(),
            Value::Bool(true),
        );
    }

    #[test]
    fn test_envelope_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let mut ctx = VariableContext::new();
        ctx.set("x", Value::Number(2.0)).unwrap();
        save(&path, &ctx).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["type"], DATA_FILE_TAG);
        assert_eq!(raw["var"]["type"], "var");
        assert_eq!(raw["var"]["values"]["x"], 2.0);
    }

    #[test]
    fn test_bad_files_name_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        let mut ctx = VariableContext::new();
        ctx.set("keep", Value::Bool(true)).unwrap();

        fs::write(&path, "{ not json").unwrap();
        let err = load_into(&path, &mut ctx, &cache()).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));

        fs::write(&path, r#"{"type":"other","var":{"type":"var","values":{}}}"#).unwrap();
        let err = load_into(&path, &mut ctx, &cache()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert!(err.to_string().contains("bad.json"));

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("keep"), Some(&Value::Bool(true)));
    }
}
