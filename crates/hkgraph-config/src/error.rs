//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds a value the engine cannot use
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn not_found() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
    }

    #[test]
    fn read_file_display_names_path() {
        let err = ConfigError::read_file("/etc/hkgraph.toml", not_found());
        let msg = err.to_string();
        assert!(msg.starts_with("failed to read file '/etc/hkgraph.toml'"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn write_and_create_dir_keep_io_source() {
        let write = ConfigError::write_file("/x", not_found());
        let mkdir = ConfigError::create_dir("/y", not_found());
        assert!(matches!(write, ConfigError::WriteFile { .. }));
        assert!(matches!(mkdir, ConfigError::CreateDir { ref path, .. } if path == std::path::Path::new("/y")));
        assert!(write.source().is_some());
        assert!(mkdir.to_string().contains("failed to create directory"));
    }

    #[test]
    fn invalid_value_names_field() {
        let err = ConfigError::InvalidValue {
            field: "worker_thread_name",
            reason: "contains a NUL byte",
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'worker_thread_name': contains a NUL byte"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn toml_errors_convert() {
        let parse = toml::from_str::<toml::Table>("= nope").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }
}
