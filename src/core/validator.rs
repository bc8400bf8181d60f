use crate::core::error::Error;
use crate::core::schema::Schema;
use crate::core::yaml;
use std::fs;
use std::path::Path;

/// Read, parse and validate one file.
pub fn validate_file(schema: &Schema, path: &Path) -> Result<(), Error> {
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    validate_content(schema, path, &content)
}

pub fn validate_content(schema: &Schema, path: &Path, content: &str) -> Result<(), Error> {
    let document = yaml::parse_yaml(content).map_err(|reason| Error::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    schema
        .check(&document)
        .map_err(|description| Error::SchemaViolation {
            path: path.to_path_buf(),
            description,
        })
}
