// crates/file-search/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::time::Duration;
use tracing::{debug, info, warn};

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Gemini/Google API key (GEMINI_API_KEY or GOOGLE_API_KEY)
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables
    pub fn from_env() -> Self {
        let gemini = read_key("GEMINI_API_KEY").or_else(|| read_key("GOOGLE_API_KEY"));
        let keys = Self { gemini };
        keys.log_status();
        keys
    }

    /// Log whether a key is available (without exposing the value)
    fn log_status(&self) {
        if self.gemini.is_some() {
            debug!("Gemini API key found in environment");
        } else {
            debug!("No Gemini API key in environment");
        }
    }
}

/// Read a single variable from the environment, filtering empty values
pub fn read_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Emit every entry through tracing
    pub fn log(&self) {
        for err in &self.errors {
            warn!("config error: {}", err);
        }
        for w in &self.warnings {
            warn!("{}", w);
        }
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_keys: ApiKeys,
    /// Tool allow-list (MCP_TOOLS)
    pub mcp_tools: Option<String>,
    /// Completion toggle (COMPLETION_ENABLED)
    pub completion_enabled: Option<bool>,
    /// Completion cache lifetime (COMPLETION_CACHE_TTL)
    pub completion_cache_ttl: Option<Duration>,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");

        let completion_cache_ttl = read_key("COMPLETION_CACHE_TTL").and_then(|v| {
            let parsed = parse_duration(&v);
            if parsed.is_none() {
                warn!(value = %v, "Unparseable COMPLETION_CACHE_TTL, using default");
            }
            parsed
        });

        Self {
            api_keys: ApiKeys::from_env(),
            mcp_tools: read_key("MCP_TOOLS"),
            completion_enabled: parse_bool_env("COMPLETION_ENABLED"),
            completion_cache_ttl,
        }
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    parse_bool(&std::env::var(name).ok()?)
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a duration such as `300`, `300s`, `10m` or `1h`.
/// A bare number is seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (digits, multiplier) = match value.as_bytes().last()? {
        b's' => (&value[..value.len() - 1], 1),
        b'm' => (&value[..value.len() - 1], 60),
        b'h' => (&value[..value.len() - 1], 3600),
        _ => (value, 1),
    };
    let n: u64 = digits.trim().parse().ok()?;
    Some(Duration::from_secs(n.checked_mul(multiplier)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "YES", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("300"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("600s"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("10m"), Some(Duration::from_secs(600)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("-5s"), None);
    }

    #[test]
    fn test_validation_report() {
        let mut validation = ConfigValidation::new();
        assert_eq!(validation.report(), "Configuration OK");

        validation.add_warning("No API key configured");
        assert!(validation.is_valid()); // Warnings don't make it invalid
        assert!(validation.report().contains("Warnings:"));

        validation.add_error("bad");
        assert!(!validation.is_valid());
        assert!(validation.report().starts_with("Errors:"));
    }

    #[test]
    fn test_default_env_config_is_empty() {
        let config = EnvConfig::default();
        assert!(config.api_keys.gemini.is_none());
        assert!(config.mcp_tools.is_none());
        assert!(config.completion_enabled.is_none());
    }
}
