use crate::core::error::Error;
use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A compiled JSON Schema. Built once and shared read-only by every worker.
pub struct Schema {
    path: PathBuf,
    id: Option<String>,
    validator: Validator,
}

impl Schema {
    /// Read and compile the schema document at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("could not read schema {}: {e}", path.display()))
        })?;
        Self::compile(path, &content)
    }

    /// Compile schema text; `path` is only used for messages.
    pub fn compile(path: &Path, content: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            Error::Config(format!("schema {} is not valid JSON: {e}", path.display()))
        })?;
        let validator = jsonschema::validator_for(&value).map_err(|e| {
            Error::Config(format!("schema {} does not compile: {e}", path.display()))
        })?;
        let id = value.get("$id").and_then(|v| v.as_str()).map(String::from);

        Ok(Self {
            path: path.to_path_buf(),
            id,
            validator,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check `instance` and describe the first violation as `<pointer>: <message>`.
    pub fn check(&self, instance: &Value) -> Result<(), String> {
        self.validator.validate(instance).map_err(|err| {
            let path = err.instance_path.to_string();
            let path = if path.is_empty() {
                "/".to_string()
            } else {
                path
            };
            format!("{path}: {err}")
        })
    }
}
