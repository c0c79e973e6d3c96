// crates/file-search/src/config/file.rs
// File-based configuration from ~/.file-search/config.toml

use crate::error::{FileSearchError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key
    pub api_key_env: Option<String>,
    pub mcp_tools: Option<ToolList>,
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// `mcp_tools` may be written as `"query,upload"` or `["query", "upload"]`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolList {
    Csv(String),
    List(Vec<String>),
}

impl ToolList {
    pub fn to_csv(&self) -> String {
        match self {
            ToolList::Csv(s) => s.clone(),
            ToolList::List(items) => items.join(","),
        }
    }
}

/// Shell completion section
#[derive(Debug, Deserialize, Default)]
pub struct CompletionConfig {
    pub enabled: Option<bool>,
    pub cache_ttl_secs: Option<u64>,
}

impl FileConfig {
    /// Load config from an explicit path, or from the default location.
    ///
    /// A missing or unparseable default file yields defaults; an explicit
    /// path that cannot be read or parsed is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                FileSearchError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            let config = Self::parse(&contents).map_err(|e| {
                FileSearchError::Config(format!("cannot parse {}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), "Loaded config from file");
            return Ok(config);
        }

        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    Ok(config)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Ok(Self::default())
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}

/// `~/.file-search`
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".file-search")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let toml = r#"
api_key = "abc"
mcp_tools = "query,upload"

[completion]
enabled = false
cache_ttl_secs = 60
"#;
        let config = FileConfig::parse(toml).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(
            config.mcp_tools.map(|t| t.to_csv()).as_deref(),
            Some("query,upload")
        );
        assert_eq!(config.completion.enabled, Some(false));
        assert_eq!(config.completion.cache_ttl_secs, Some(60));
    }

    #[test]
    fn test_tools_as_array() {
        let config = FileConfig::parse(r#"mcp_tools = ["query", "delete"]"#).unwrap();
        assert_eq!(
            config.mcp_tools,
            Some(ToolList::List(vec!["query".into(), "delete".into()]))
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = FileConfig::parse("").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.completion.enabled.is_none());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key_env = \"MY_KEY\"").unwrap();
        let config = FileConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_key_env.as_deref(), Some("MY_KEY"));
    }

    #[test]
    fn test_load_explicit_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, FileSearchError::Config(_)));
    }

    #[test]
    fn test_load_explicit_invalid_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = [").unwrap();
        assert!(FileConfig::load(Some(file.path())).is_err());
    }
}
