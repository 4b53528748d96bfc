//! Error types for command generation.

use std::path::PathBuf;

use jet_sql_core::RewriteError;

/// Errors raised while turning a statement into a native command.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The statement could not be rewritten for Jet.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// A parameter has no declared type.
    #[error("No SQL type declared for parameter {ordinal} ({declared} types declared)")]
    MissingParameterType {
        /// Ordinal of the parameter.
        ordinal: usize,
        /// Number of declared types.
        declared: usize,
    },

    /// The native driver refused the command.
    #[error("Native driver error: {0}")]
    Native(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failed to parse the configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
