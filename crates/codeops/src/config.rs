//! Application configuration.
//!
//! Read from `$CODEOPS_HOME/config.toml` (or `--config <path>`), then
//! overridden by environment variables. Every field has a default, so an
//! absent file is a valid configuration.

use codeops_ai::provider::{
    GATEWAY_BASE_URL, GATEWAY_DEFAULT_MODEL, GROQ_BASE_URL, GROQ_DEFAULT_MODEL,
};
use codeops_ai::{
    ActionHandler, ChatCompletionsProvider, ChatProvider, ProviderRouter, ProviderSettings,
};
use codeops_github::{FetchLimits, GitHubClient, RepoFetcher};
use codeops_pipeline::OrchestratorSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_PRIMARY_KEY: &str = "GROQ_API_KEY";
pub const ENV_GENERAL_KEY: &str = "AI_GATEWAY_API_KEY";
pub const ENV_SERVICE_URL: &str = "CODEOPS_SERVICE_URL";
pub const ENV_SERVICE_KEY: &str = "CODEOPS_SERVICE_KEY";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of hosted services. `run`/`chat` call the services in
    /// process when unset.
    pub service_url: Option<String>,
    /// Bearer key sent to the hosted services.
    pub service_key: Option<String>,
    pub github_token: Option<String>,
    pub providers: ProvidersConfig,
    pub pipeline: PipelineConfig,
    pub fetch: FetchLimits,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Fast code-generation provider (fix/approve/chat go here first).
    pub primary: ProviderConfig,
    /// General provider, and the fallback for the primary.
    pub general: ProviderConfig,
}

/// Overrides for one chat-completions endpoint. Unset fields keep the
/// provider's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub deploy_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deploy_delay_ms: codeops_pipeline::DEFAULT_DEPLOY_DELAY.as_millis() as u64,
        }
    }
}

impl ProviderConfig {
    /// Settings for this endpoint, or `None` when no secret is configured.
    fn settings(&self, defaults: impl FnOnce(String) -> ProviderSettings) -> Option<ProviderSettings> {
        let key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let mut settings = defaults(key.to_string());
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            settings.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            settings.temperature = temperature;
        }
        Some(settings)
    }
}

impl AppConfig {
    /// Default location: `$CODEOPS_HOME/config.toml`.
    pub fn default_path() -> PathBuf {
        codeops_logging::codeops_home().join(CONFIG_FILE)
    }

    /// Load the file at `path` (must exist) or the default file (optional),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_from(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Environment variables win over the file. Blank values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_PRIMARY_KEY) {
            self.providers.primary.api_key = Some(key);
        }
        if let Some(key) = get(ENV_GENERAL_KEY) {
            self.providers.general.api_key = Some(key);
        }
        if let Some(url) = get(ENV_SERVICE_URL) {
            self.service_url = Some(url);
        }
        if let Some(key) = get(ENV_SERVICE_KEY) {
            self.service_key = Some(key);
        }
        if let Some(token) = get(ENV_GITHUB_TOKEN) {
            self.github_token = Some(token);
        }
    }

    pub fn primary_settings(&self) -> Option<ProviderSettings> {
        self.providers.primary.settings(ProviderSettings::groq)
    }

    pub fn general_settings(&self) -> Option<ProviderSettings> {
        self.providers.general.settings(ProviderSettings::gateway)
    }

    /// Provider chain. Providers without a secret are left out.
    pub fn provider_router(&self) -> ProviderRouter {
        let build = |settings: ProviderSettings| -> Arc<dyn ChatProvider> {
            Arc::new(ChatCompletionsProvider::new(settings))
        };
        ProviderRouter::new(
            self.primary_settings().map(build),
            self.general_settings().map(build),
        )
    }

    pub fn action_handler(&self) -> ActionHandler {
        ActionHandler::new(self.provider_router())
    }

    pub fn repo_fetcher(&self) -> RepoFetcher<GitHubClient> {
        RepoFetcher::with_limits(
            GitHubClient::new().with_token(self.github_token.clone()),
            self.fetch.clone(),
        )
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            deploy_delay: Duration::from_millis(self.pipeline.deploy_delay_ms),
            ..OrchestratorSettings::default()
        }
    }

    /// One line per provider for `codeops serve` startup output.
    pub fn describe_providers(&self) -> Vec<String> {
        let describe = |role: &str, settings: Option<ProviderSettings>, base: &str, model: &str| {
            match settings {
                Some(s) => format!("{}: {} {} ({})", role, s.name, s.model, s.base_url),
                None => format!("{}: not configured (default {} at {})", role, model, base),
            }
        };
        vec![
            describe("primary", self.primary_settings(), GROQ_BASE_URL, GROQ_DEFAULT_MODEL),
            describe("general", self.general_settings(), GATEWAY_BASE_URL, GATEWAY_DEFAULT_MODEL),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeops_ai::provider::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.service_url.is_none());
        assert!(config.primary_settings().is_none());
        assert!(config.general_settings().is_none());
        assert!(!config.provider_router().has_providers());
        assert_eq!(config.pipeline.deploy_delay_ms, 2000);
        assert_eq!(config.fetch, FetchLimits::default());
        assert_eq!(
            config.orchestrator_settings().deploy_delay,
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            service_url = "http://localhost:8787"

            [providers.general]
            api_key = "gw-key"
            model = "openai/gpt-5-mini"
            temperature = 0.5

            [pipeline]
            deploy_delay_ms = 10

            [fetch]
            max_files = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.service_url.as_deref(), Some("http://localhost:8787"));
        let general = config.general_settings().unwrap();
        assert_eq!(general.model, "openai/gpt-5-mini");
        assert_eq!(general.temperature, 0.5);
        assert_eq!(general.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(general.base_url, GATEWAY_BASE_URL);
        assert!(config.primary_settings().is_none());
        assert_eq!(config.fetch.max_files, 5);
        assert_eq!(config.fetch.max_content_chars, 10_000);
        assert_eq!(config.pipeline.deploy_delay_ms, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml(
            r#"
            github_token = "from-file"

            [providers.primary]
            api_key = "file-key"
            base_url = "http://groq.local/v1/"
            "#,
        )
        .unwrap();

        config.apply_env_from(env(&[
            (ENV_PRIMARY_KEY, "env-key"),
            (ENV_GENERAL_KEY, "  "),
            (ENV_SERVICE_URL, "http://svc"),
            (ENV_SERVICE_KEY, "anon-key"),
        ]));

        let primary = config.primary_settings().unwrap();
        assert_eq!(primary.api_key, "env-key");
        assert_eq!(primary.base_url, "http://groq.local/v1");
        assert_eq!(primary.model, GROQ_DEFAULT_MODEL);
        assert_eq!(primary.temperature, DEFAULT_TEMPERATURE);
        assert!(config.general_settings().is_none());
        assert_eq!(config.service_url.as_deref(), Some("http://svc"));
        assert_eq!(config.service_key.as_deref(), Some("anon-key"));
        assert_eq!(config.github_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_blank_key_means_absent() {
        let config = AppConfig::from_toml("[providers.primary]\napi_key = \"   \"\n").unwrap();
        assert!(config.primary_settings().is_none());
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            AppConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "pipeline = 3").unwrap();
        let err = AppConfig::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[pipeline]\ndeploy_delay_ms = 1\n").unwrap();
        assert_eq!(AppConfig::from_file(&good).unwrap().pipeline.deploy_delay_ms, 1);
    }
}
