//! CLI command implementations for `tutorflow`.
//!
//! - [`ask`] -- one-shot pipeline run.
//! - [`interactive`] -- console loop.
//! - [`serve`] -- HTTP API.
//! - [`config_cmd`] -- configuration inspection.

pub mod ask;
pub mod config_cmd;
pub mod interactive;
pub mod serve;

use std::path::Path;

use tutorflow_types::Config;

/// Load configuration from the given path override or via auto-discovery.
///
/// If `config_override` is provided, loads from that path. Otherwise the
/// discovery chain is:
/// 1. `TUTORFLOW_CONFIG` env var
/// 2. `~/.tutorflow/config.json`
///
/// Returns a default `Config` if no config file is found. Environment
/// overrides are applied and the result is validated either way.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<Config> {
    tutorflow_core::config_loader::load_config(config_override.map(Path::new))
        .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))
}
