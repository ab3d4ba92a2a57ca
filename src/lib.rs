//! Gated Chat
//!
//! A conversational client for a remote answering service:
//! - Chat sessions with a stable session id and single-in-flight sends
//! - Tolerant extraction of replies from bodies of unknown shape
//! - A session-cookie gate deciding whether the chat widget exists
//! - A small auth proxy issuing and clearing that cookie

pub mod api;
pub mod auth;
pub mod chat;
pub mod gate;

use anyhow::{Context, Result};
use chat::ChatConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub chat: ChatYamlConfig,
    pub auth: AuthYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    /// Deployment environment; "production" turns on Secure cookies
    pub environment: Option<String>,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: None,
        }
    }
}

/// Chat configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatYamlConfig {
    pub endpoint_base_url: String,
    /// Absent means requests never time out
    pub request_timeout_secs: Option<u64>,
}

impl Default for ChatYamlConfig {
    fn default() -> Self {
        Self {
            endpoint_base_url: chat::config::DEFAULT_ENDPOINT_BASE_URL.into(),
            request_timeout_secs: None,
        }
    }
}

/// Auth proxy configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthYamlConfig {
    /// Upstream login endpoint credentials are forwarded to
    pub backend_url: String,
}

impl Default for AuthYamlConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080/api/auth/login".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub secure_cookies: bool,
    pub auth_backend_url: String,
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing file falls
    /// back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let environment = std::env::var("APP_ENV").ok().or(yaml.server.environment);
        let request_timeout_secs = std::env::var("CHAT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(yaml.chat.request_timeout_secs);

        Ok(Self {
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            secure_cookies: auth::cookie::should_set_secure(environment.as_deref()),
            auth_backend_url: std::env::var("AUTH_BACKEND_URL").unwrap_or(yaml.auth.backend_url),
            chat: ChatConfig {
                endpoint_base_url: std::env::var("CHAT_ENDPOINT_URL")
                    .unwrap_or(yaml.chat.endpoint_base_url),
                request_timeout: request_timeout_secs.map(Duration::from_secs),
            },
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Start the auth proxy and serve until the process exits
pub async fn start_server(config: Config) -> Result<()> {
    let state = Arc::new(api::handlers::ServerState::from_config(&config)?);
    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        upstream = %config.auth_backend_url,
        secure_cookies = config.secure_cookies,
        "Auth proxy listening on {}",
        addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
server:
  port: 9090
  environment: production

chat:
  endpoint_base_url: https://answers.example.com
  request_timeout_secs: 20

auth:
  backend_url: https://auth.example.com/login
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.environment.as_deref(), Some("production"));
        assert_eq!(config.chat.endpoint_base_url, "https://answers.example.com");
        assert_eq!(config.chat.request_timeout_secs, Some(20));
        assert_eq!(config.auth.backend_url, "https://auth.example.com/login");
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.environment.is_none());
        assert_eq!(config.chat.endpoint_base_url, "http://localhost:8080");
        assert!(config.chat.request_timeout_secs.is_none());
        assert_eq!(
            config.auth.backend_url,
            "http://localhost:8080/api/auth/login"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_section_defaults() {
        let yaml = r#"
chat:
  request_timeout_secs: 5
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chat.endpoint_base_url, "http://localhost:8080");
        assert_eq!(config.chat.request_timeout_secs, Some(5));
    }

    /// Combined test for YAML file loading and env var overrides.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "SERVER_PORT",
                "APP_ENV",
                "AUTH_BACKEND_URL",
                "CHAT_ENDPOINT_URL",
                "CHAT_REQUEST_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
server:
  port: 9999
chat:
  endpoint_base_url: http://yaml-chat:8080
auth:
  backend_url: http://yaml-auth/login
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert!(!config.secure_cookies);
        assert_eq!(config.auth_backend_url, "http://yaml-auth/login");
        assert_eq!(config.chat.endpoint_base_url, "http://yaml-chat:8080");
        assert!(config.chat.request_timeout.is_none());

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("SERVER_PORT", "7777");
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CHAT_ENDPOINT_URL", "http://env-chat:8080");
        std::env::set_var("CHAT_REQUEST_TIMEOUT_SECS", "15");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 7777);
        assert!(config.secure_cookies);
        assert_eq!(config.chat.endpoint_base_url, "http://env-chat:8080");
        assert_eq!(config.chat.request_timeout, Some(Duration::from_secs(15)));
        // YAML value still used where no env override
        assert_eq!(config.auth_backend_url, "http://yaml-auth/login");

        // --- Phase 3: Invalid numbers fall back ---
        std::env::set_var("SERVER_PORT", "not_a_port");
        std::env::set_var("CHAT_REQUEST_TIMEOUT_SECS", "soon");
        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.server_port, 9999);
        assert!(config.chat.request_timeout.is_none());

        clear_env();

        // --- Phase 4: No YAML file → defaults ---
        let nonexistent = Path::new("/tmp/nonexistent-gated-chat-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.server_port, 3000);
        assert!(!config.secure_cookies);
        assert_eq!(config.chat, ChatConfig::default());
    }

    #[test]
    fn test_malformed_yaml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        std::fs::write(&file_path, "server: [not, a, map").unwrap();

        let yaml = Config::load_yaml(Some(&file_path));
        assert_eq!(yaml.server.port, 3000);
    }
}
