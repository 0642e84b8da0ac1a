//! Provider connection settings.
//!
//! An [`LlmProviderConfig`] describes how to reach one OpenAI-compatible
//! endpoint: its base URL, the environment variable holding the API key,
//! extra headers and the per-request timeout.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for a single LLM provider endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Human-readable provider name (e.g. "dashscope").
    pub name: String,

    /// Base URL for the OpenAI-compatible API.
    pub base_url: String,

    /// Environment variable that holds the API key (e.g. "DASHSCOPE_API_KEY").
    pub api_key_env: String,

    /// Extra HTTP headers to include in every request to this provider.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds. Defaults to 120.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    /// Alibaba DashScope, OpenAI-compatible mode (mainland endpoint).
    pub fn dashscope() -> Self {
        Self {
            name: "dashscope".into(),
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".into(),
            api_key_env: "DASHSCOPE_API_KEY".into(),
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }

    /// Effective timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
