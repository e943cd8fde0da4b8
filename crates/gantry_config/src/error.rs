//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `gantry.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {reason}")]
    Parse {
        /// Description of the parse failure.
        reason: String,
    },

    /// A required field is missing from the configuration.
    #[error("missing required field: {field}")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Description of the invalid value.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let err = ConfigError::MissingField {
            field: "compiler.command".to_string(),
        };
        assert_eq!(err.to_string(), "missing required field: compiler.command");
    }

    #[test]
    fn parse_display() {
        let err = ConfigError::Parse {
            reason: "expected '=' at line 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn invalid_display() {
        let err = ConfigError::Invalid {
            reason: "no extensions listed".to_string(),
        };
        assert_eq!(err.to_string(), "invalid configuration: no extensions listed");
    }

    #[test]
    fn read_display_names_the_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("gantry.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to read"));
        assert!(msg.contains("gantry.toml"));
    }
}
