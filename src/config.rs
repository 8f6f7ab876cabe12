//! Client configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin for relative request paths
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Default request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Minimum duration the busy signal stays visible once raised, in
    /// milliseconds
    #[serde(rename = "min-display-ms")]
    pub min_display_ms: u64,

    /// UI routes exempt from the forced login redirect on session expiry
    #[serde(rename = "public-paths")]
    pub public_paths: Vec<String>,

    /// Login entry point the 401 policy redirects to
    #[serde(rename = "login-path")]
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 10_000,
            min_display_ms: 300,
            public_paths: vec!["/".to_string(), "/login".to_string(), "/404".to_string()],
            login_path: "/login".to_string(),
        }
    }
}

impl ClientConfig {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(eyre::eyre!(
                "base-url must be an http(s) origin, got: {}",
                self.base_url
            ));
        }
        if self.login_path.is_empty() {
            return Err(eyre::eyre!("login-path must not be empty"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .apiwire.yml
        let local_config = PathBuf::from(".apiwire.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/apiwire/apiwire.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("apiwire").join("apiwire.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the default request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the minimum busy-display duration as a Duration
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    /// Check whether a UI route is exempt from the login redirect
    pub fn is_public_path(&self, path: &str) -> bool {
        let normalized = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        self.public_paths.iter().any(|p| {
            let allowed = if p.len() > 1 { p.trim_end_matches('/') } else { p.as_str() };
            allowed == normalized
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.min_display_ms, 300);
        assert_eq!(config.login_path, "/login");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
base-url: https://admin.example.com
timeout-ms: 5000
min-display-ms: 800
public-paths:
  - /
  - /login
login-path: /signin
"#;

        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.base_url, "https://admin.example.com");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.min_display(), Duration::from_millis(800));
        assert_eq!(config.login_path, "/signin");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
timeout-ms: 3000
"#;

        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.timeout_ms, 3000);

        // Defaults for unspecified
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.min_display_ms, 300);
        assert!(config.is_public_path("/login"));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base-url: https://api.example.com").unwrap();

        let config = ClientConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/definitely/not/a/config.yml");
        assert!(ClientConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_origin() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_public_path() {
        let config = ClientConfig::default();

        assert!(config.is_public_path("/"));
        assert!(config.is_public_path("/login"));
        assert!(config.is_public_path("/login/"));
        assert!(!config.is_public_path("/admin/dashboard"));
    }
}
