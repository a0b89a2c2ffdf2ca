//! Global configuration loader for Sherpa.
//!
//! Reads `config.toml` from the data directory (`~/.sherpa/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use sherpa_types::config::GlobalConfig;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "SHERPA_HOME";

/// Resolve the data directory: `$SHERPA_HOME`, else `~/.sherpa`, else `./.sherpa`.
pub fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sherpa")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Read an API key from the environment variable `name`.
///
/// Unset and blank values both yield `None`.
pub fn read_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.server.port, 5000);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[llm]
provider = "anthropic"
provider_type = "anthropic"
model = "claude-sonnet-4-20250514"
api_key_env = "ANTHROPIC_API_KEY"

[places]
radius_meters = 2500.0

[narration]
enabled = true

[narration.voices]
Spanish = "voice-es"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.places.radius_meters, 2500.0);
        assert_eq!(config.places.max_results, 20);
        assert!(config.narration.enabled);
        assert_eq!(config.narration.voice_for("spanish"), "voice-es");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(!config.narration.enabled);
    }

    #[test]
    fn read_secret_missing_and_blank() {
        assert!(read_secret("SHERPA_TEST_SURELY_UNSET_VAR").is_none());
        // PATH is always set in test environments.
        let path = read_secret("PATH").unwrap();
        assert!(!path.expose_secret().is_empty());
    }
}
