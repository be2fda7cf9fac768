//! Variables files
//!
//! A variables file is a flat TOML table:
//!
//! ```toml
//! APP_NAME = "web"
//! REPLICAS = 3
//! DEBUG = false
//! ```
//!
//! Strings are taken verbatim; integers, floats and booleans are stringified.
//! Arrays, tables and datetimes are rejected.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported value for {key}: expected a string, number or boolean")]
    UnsupportedValue { key: String },
}

fn toml_to_string(key: &str, value: toml::Value) -> Result<String, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(_) | toml::Value::Array(_) | toml::Value::Table(_) => {
            Err(ConfigError::UnsupportedValue {
                key: key.to_string(),
            })
        }
    }
}

/// Parse variables from TOML text, sorted by name.
pub fn parse_vars(input: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let table: toml::Table = toml::from_str(input)?;
    table
        .into_iter()
        .map(|(key, value)| {
            let value = toml_to_string(&key, value)?;
            Ok((key, value))
        })
        .collect()
}

/// Read and parse a variables file.
pub fn load_vars_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let vars = parse_vars(&content)?;
    tracing::debug!(path = %path.display(), count = vars.len(), "loaded variables file");
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_scalars() {
        let vars = parse_vars("NAME = \"web\"\nREPLICAS = 3\nRATIO = 0.5\nDEBUG = false\n").unwrap();
        assert_eq!(
            vars,
            vec![
                ("DEBUG".to_string(), "false".to_string()),
                ("NAME".to_string(), "web".to_string()),
                ("RATIO".to_string(), "0.5".to_string()),
                ("REPLICAS".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_nested_values() {
        let err = parse_vars("PORTS = [80, 443]").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedValue { ref key } if key == "PORTS"));

        let err = parse_vars("[server]\nhost = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(parse_vars("NAME = ").unwrap_err(), ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_vars_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GREETING = \"hello\"").unwrap();

        let vars = load_vars_file(file.path()).unwrap();
        assert_eq!(vars, vec![("GREETING".to_string(), "hello".to_string())]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_vars_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("cannot read "));
    }
}
