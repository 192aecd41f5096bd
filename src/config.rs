//! Compiler configuration.
//!
//! Options are read from a `dfql.toml` file. Every key is optional:
//!
//! ```toml
//! indent_size = 4
//! beautify = true
//! default_sort_limit = 5000
//! udf_prefix = "my_udf"
//! ```

use crate::error::{DfqlError, DfqlResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "dfql.toml";

/// Safety cap applied to `ORDER BY` without an explicit `LIMIT`.
pub const DEFAULT_SORT_LIMIT: u64 = 10000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Spaces used to indent nested subqueries.
    pub indent_size: usize,
    /// One select field per line, aligned aliases, indented CASE branches.
    pub beautify: bool,
    pub default_sort_limit: u64,
    /// Prefix of generated external function names.
    pub udf_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            beautify: false,
            default_sort_limit: DEFAULT_SORT_LIMIT,
            udf_prefix: "dfql_udf".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn from_toml_str(content: &str) -> DfqlResult<Self> {
        let options: CompilerOptions =
            toml::from_str(content).map_err(|e| DfqlError::Config(e.to_string()))?;
        if options.udf_prefix.is_empty() {
            return Err(DfqlError::Config("udf_prefix cannot be empty".to_string()));
        }
        Ok(options)
    }

    pub fn load(path: &Path) -> DfqlResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| DfqlError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve options from an explicit path, `./dfql.toml`, or
    /// `<config dir>/dfql/dfql.toml`, falling back to defaults.
    pub fn discover(explicit: Option<&Path>) -> DfqlResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for candidate in Self::candidates() {
            if candidate.is_file() {
                tracing::debug!("loading config from {}", candidate.display());
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("dfql").join(CONFIG_FILE));
        }
        paths
    }

    pub fn indent(&self) -> String {
        " ".repeat(self.indent_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::from_toml_str("").unwrap();
        assert_eq!(options, CompilerOptions::default());
        assert_eq!(options.default_sort_limit, 10000);
        assert_eq!(options.indent(), "  ");
    }

    #[test]
    fn test_partial_override() {
        let options = CompilerOptions::from_toml_str("indent_size = 4\nbeautify = true").unwrap();
        assert_eq!(options.indent_size, 4);
        assert!(options.beautify);
        assert_eq!(options.udf_prefix, "dfql_udf");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            CompilerOptions::from_toml_str("indent_size = \"wide\""),
            Err(DfqlError::Config(_))
        ));
        assert!(matches!(
            CompilerOptions::from_toml_str("udf_prefix = \"\""),
            Err(DfqlError::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = CompilerOptions::discover(Some(Path::new("/nonexistent/dfql.toml")));
        assert!(matches!(err, Err(DfqlError::Io(_))));
    }
}
