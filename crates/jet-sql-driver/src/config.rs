//! Driver configuration, loadable from JSON.

use std::path::Path;

use jet_sql_core::{DialectFeatures, ParameterStyle, RewriteOptions};
use serde::{Deserialize, Serialize};

use crate::error::{DriverError, Result};

/// Configuration of a [`JetDriver`](crate::JetDriver).
///
/// Every field has a default, so `{}` is a valid configuration:
///
/// ```json
/// {
///   "rewrite": { "fixes": ["upper_lower", "cast"], "cache_max_entries": 512 },
///   "dialect": { "variable_limit": true },
///   "parameter_style": "named"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Rewriter options.
    pub rewrite: RewriteOptions,
    /// Optional Jet dialect features.
    pub dialect: DialectFeatures,
    /// How parameter markers are spelled in command text.
    pub parameter_style: ParameterStyle,
}

impl DriverConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Config`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Io`] if the file cannot be read and
    /// [`DriverError::Config`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use jet_sql_core::FixRule;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DriverConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.parameter_style, ParameterStyle::Named);
        assert_eq!(config.rewrite.fixes, FixRule::ALL.to_vec());
    }

    #[test]
    fn test_partial_config() {
        let config = DriverConfig::from_json_str(
            r#"{"rewrite": {"fixes": ["cast"]}, "dialect": {"trim_emulation": false}, "parameter_style": "positional"}"#,
        )
        .unwrap();
        assert_eq!(config.rewrite.fixes, vec![FixRule::Cast]);
        assert!(!config.dialect.trim_emulation);
        assert!(config.dialect.extended_functions);
        assert_eq!(config.parameter_style, ParameterStyle::Positional);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            DriverConfig::from_json_str(r#"{"rewrite": {"fixes": ["nope"]}}"#),
            Err(DriverError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DriverConfig::load("/nonexistent/jet-driver.json"),
            Err(DriverError::Io { .. })
        ));
    }
}
