//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration directory could be determined for this platform.
    #[error("unable to determine the user configuration directory")]
    NoConfigDir,
    /// Reading the configuration file failed.
    #[error("failed to read configuration file {}", .path.display())]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Writing the configuration file failed.
    #[error("failed to write configuration file {}", .path.display())]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The configuration file did not contain valid JSON.
    #[error("configuration file {} is not valid JSON", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Serialising the configuration failed.
    #[error("failed to serialise configuration")]
    Serialize {
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// No instance matched the request.
    #[error("instance '{name}' is not configured")]
    UnknownInstance {
        /// Requested instance name.
        name: String,
    },
    /// An instance with the same name already exists.
    #[error("instance '{name}' already exists")]
    DuplicateInstance {
        /// Conflicting instance name.
        name: String,
    },
    /// No instance is configured at all.
    #[error("no instance configured; run `coolify instances add <name> <fqdn>` first")]
    NoInstances,
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
