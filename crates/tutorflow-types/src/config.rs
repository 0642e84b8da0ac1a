//! Configuration schema.
//!
//! All structs accept both `snake_case` and `camelCase` keys and fall back
//! to defaults for anything missing. Unknown keys are ignored. The schema is
//! immutable once loaded: it is built at startup and passed by value or
//! behind an `Arc` into the pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::role::Role;
use crate::secret::ApiKey;

/// Upper bound accepted for `pipeline.max_retries`. A run therefore makes at
/// most four generate/review cycles, whatever the deployment configures.
pub const MAX_RETRIES_LIMIT: u32 = 3;

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote text-generation endpoint.
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Per-role model selection.
    #[serde(default)]
    pub stages: StagesConfig,

    /// Retry and deadline policy.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// HTTP front end settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url is empty".into()));
        }
        for role in Role::ALL {
            if self.stages.get(role).model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "stages.{role}.model is empty"
                )));
            }
        }
        if self.pipeline.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "pipeline.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                self.pipeline.max_retries
            )));
        }
        if self.pipeline.stage_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "pipeline.stage_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ── Provider ─────────────────────────────────────────────────────────────

/// Connection settings for the OpenAI-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Name used in logs.
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL of the chat completion API.
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env", alias = "apiKeyEnv")]
    pub api_key_env: String,

    /// Inline key; takes precedence over `api_key_env` when non-empty.
    #[serde(default, alias = "apiKey")]
    pub api_key: ApiKey,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs", alias = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Extra headers sent with every request (e.g. a DashScope workspace id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

fn default_provider_name() -> String {
    "dashscope".into()
}
fn default_base_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".into()
}
fn default_api_key_env() -> String {
    "DASHSCOPE_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key: ApiKey::default(),
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
        }
    }
}

// ── Stages ───────────────────────────────────────────────────────────────

/// Model selection for one role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageConfig {
    /// Model identifier sent to the provider.
    pub model: String,

    /// Sampling temperature; provider default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Completion token cap; provider default when unset.
    #[serde(default, alias = "maxTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
}

impl StageConfig {
    /// A stage using `model` with provider defaults.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Role to model mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagesConfig {
    /// Prompt optimizer.
    #[serde(default = "default_optimizer")]
    pub optimizer: StageConfig,

    /// Dialogue generator.
    #[serde(default = "default_generator")]
    pub generator: StageConfig,

    /// Fact reviewer.
    #[serde(default = "default_reviewer")]
    pub reviewer: StageConfig,
}

fn default_optimizer() -> StageConfig {
    StageConfig::with_model("qwen-flash")
}
fn default_generator() -> StageConfig {
    StageConfig::with_model("qwen-plus-character")
}
fn default_reviewer() -> StageConfig {
    StageConfig::with_model("qwen-flash")
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            optimizer: default_optimizer(),
            generator: default_generator(),
            reviewer: default_reviewer(),
        }
    }
}

impl StagesConfig {
    /// Look up the settings for `role`.
    pub fn get(&self, role: Role) -> &StageConfig {
        match role {
            Role::Optimizer => &self.optimizer,
            Role::Generator => &self.generator,
            Role::Reviewer => &self.reviewer,
        }
    }

    /// Mutable lookup, used when applying overrides.
    pub fn get_mut(&mut self, role: Role) -> &mut StageConfig {
        match role {
            Role::Optimizer => &mut self.optimizer,
            Role::Generator => &mut self.generator,
            Role::Reviewer => &mut self.reviewer,
        }
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────────

/// Retry and deadline policy for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Regeneration attempts allowed after the first, so a run makes at
    /// most `max_retries + 1` generate/review cycles. May be lowered, never
    /// raised above [`MAX_RETRIES_LIMIT`].
    #[serde(default = "default_max_retries", alias = "maxRetries")]
    pub max_retries: u32,

    /// Deadline for each individual stage call. No deadline when unset.
    #[serde(default, alias = "stageTimeoutSecs")]
    pub stage_timeout_secs: Option<u64>,
}

fn default_max_retries() -> u32 {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            stage_timeout_secs: None,
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// HTTP front end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin.
    #[serde(default, alias = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}
