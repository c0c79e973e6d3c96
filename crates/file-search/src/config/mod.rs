// crates/file-search/src/config/mod.rs
// Configuration: defaults, config file, .env, environment and flags merged into one Settings

pub mod env;
pub mod file;

pub use env::{ApiKeys, ConfigValidation, EnvConfig};
pub use file::FileConfig;

use crate::error::{FileSearchError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Default completion cache lifetime
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default tool allow-list
pub const DEFAULT_MCP_TOOLS: &str = "all";

/// Values supplied on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub mcp_tools: Option<String>,
}

/// Fully merged runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub mcp_tools: String,
    pub completion_enabled: bool,
    pub completion_cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            mcp_tools: DEFAULT_MCP_TOOLS.to_string(),
            completion_enabled: true,
            completion_cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Settings {
    /// Load every source (call once at startup)
    pub fn load(overrides: &Overrides) -> Result<Self> {
        load_dotenv();
        let file = FileConfig::load(overrides.config_path.as_deref())?;
        let env = EnvConfig::load();
        Ok(Self::resolve(&file, &env, overrides, env::read_key))
    }

    /// Merge already-loaded sources. `lookup` reads the variable named by
    /// `api_key_env`.
    pub fn resolve(
        file: &FileConfig,
        env: &EnvConfig,
        overrides: &Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());

        let key_from_named_var = overrides
            .api_key_env
            .as_deref()
            .or(file.api_key_env.as_deref())
            .filter(|name| !name.is_empty())
            .and_then(|name| {
                let value = lookup(name);
                if value.is_none() {
                    debug!(var = name, "Named API key variable is unset or empty");
                }
                value
            });

        let api_key = key_from_named_var
            .or_else(|| non_empty(&overrides.api_key))
            .or_else(|| env.api_keys.gemini.clone())
            .or_else(|| non_empty(&file.api_key));

        let mcp_tools = non_empty(&overrides.mcp_tools)
            .or_else(|| env.mcp_tools.clone())
            .or_else(|| file.mcp_tools.as_ref().map(|t| t.to_csv()))
            .unwrap_or_else(|| DEFAULT_MCP_TOOLS.to_string());

        let completion_enabled = env
            .completion_enabled
            .or(file.completion.enabled)
            .unwrap_or(true);

        let completion_cache_ttl = env
            .completion_cache_ttl
            .or(file.completion.cache_ttl_secs.map(Duration::from_secs))
            .unwrap_or(DEFAULT_CACHE_TTL);

        Self {
            api_key,
            mcp_tools,
            completion_enabled,
            completion_cache_ttl,
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(FileSearchError::MissingApiKey)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if self.api_key.is_none() {
            validation.add_warning(
                "No API key configured. Set GEMINI_API_KEY or GOOGLE_API_KEY, or use --api-key.",
            );
        }

        let allow = crate::mcp::AllowList::parse(&self.mcp_tools);
        for name in &allow.unknown {
            validation.add_warning(format!("Unknown tool name in allow-list: '{}'", name));
        }

        validation
    }
}

/// Load `.env` files. Existing variables are never overwritten, so the
/// working-directory file is read first to take precedence over the home one.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }
    let home_env = file::config_dir().join(".env");
    if dotenvy::from_path(&home_env).is_ok() {
        debug!(path = %home_env.display(), "Loaded .env");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{CompletionConfig, ToolList};

    fn no_vars(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(
            &FileConfig::default(),
            &EnvConfig::default(),
            &Overrides::default(),
            no_vars,
        );
        assert!(settings.api_key.is_none());
        assert_eq!(settings.mcp_tools, "all");
        assert!(settings.completion_enabled);
        assert_eq!(settings.completion_cache_ttl, DEFAULT_CACHE_TTL);
        assert!(matches!(
            settings.require_api_key(),
            Err(FileSearchError::MissingApiKey)
        ));
    }

    #[test]
    fn test_named_variable_wins() {
        let overrides = Overrides {
            api_key: Some("flag".into()),
            api_key_env: Some("TEAM_KEY".into()),
            ..Default::default()
        };
        let env = EnvConfig {
            api_keys: ApiKeys {
                gemini: Some("env".into()),
            },
            ..Default::default()
        };
        let lookup = |name: &str| (name == "TEAM_KEY").then(|| "named".to_string());
        let settings = Settings::resolve(&FileConfig::default(), &env, &overrides, lookup);
        assert_eq!(settings.api_key.as_deref(), Some("named"));
    }

    #[test]
    fn test_empty_named_variable_falls_through() {
        let overrides = Overrides {
            api_key: Some("flag".into()),
            api_key_env: Some("TEAM_KEY".into()),
            ..Default::default()
        };
        let settings =
            Settings::resolve(&FileConfig::default(), &EnvConfig::default(), &overrides, no_vars);
        assert_eq!(settings.api_key.as_deref(), Some("flag"));
    }

    #[test]
    fn test_env_beats_file() {
        let file = FileConfig {
            api_key: Some("file".into()),
            mcp_tools: Some(ToolList::Csv("query".into())),
            completion: CompletionConfig {
                enabled: Some(true),
                cache_ttl_secs: Some(60),
            },
            ..Default::default()
        };
        let env = EnvConfig {
            api_keys: ApiKeys {
                gemini: Some("env".into()),
            },
            mcp_tools: Some("upload".into()),
            completion_enabled: Some(false),
            completion_cache_ttl: None,
        };
        let settings = Settings::resolve(&file, &env, &Overrides::default(), no_vars);
        assert_eq!(settings.api_key.as_deref(), Some("env"));
        assert_eq!(settings.mcp_tools, "upload");
        assert!(!settings.completion_enabled);
        assert_eq!(settings.completion_cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_validate_flags_unknown_tools() {
        let settings = Settings {
            api_key: Some("k".into()),
            mcp_tools: "query,bogus".into(),
            ..Default::default()
        };
        let validation = settings.validate();
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("bogus"));
    }
}
