use std::path::PathBuf;
use thiserror::Error;

/// Every failure the validator can report. All of them end the run unless
/// `--keep-going` is in effect.
#[derive(Error, Debug)]
pub enum Error {
    /// The root path or the pattern could not be used to discover files.
    #[error("could not discover files in {}: {reason}", .path.display())]
    Discovery { path: PathBuf, reason: String },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parse error in {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// Carries the validator's description of the first violation.
    #[error("{} is invalid: {description}", .path.display())]
    SchemaViolation { path: PathBuf, description: String },

    /// Missing arguments, missing or broken schema, empty file list.
    #[error("{0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_file() {
        let err = Error::SchemaViolation {
            path: PathBuf::from("./templates/b.template.yaml"),
            description: "/: \"name\" is a required property".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("./templates/b.template.yaml is invalid"));
        assert!(msg.contains("required property"));
    }
}
