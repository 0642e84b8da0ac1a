//! `tutorflow config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! tutorflow config show
//! tutorflow config path --config ./tutorflow.json
//! ```

use std::path::Path;

use tutorflow_core::config_loader::discover_config_path;
use tutorflow_types::Config;

/// Render the configuration as pretty JSON. The API key serializes empty.
pub fn render_config(config: &Config) -> serde_json::Result<String> {
    serde_json::to_string_pretty(config)
}

/// Display the resolved configuration as formatted JSON.
pub fn config_show(config: &Config) {
    match render_config(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize config: {e}"),
    }
}

/// Display the config file the discovery chain selects.
pub fn config_path(config_override: Option<&str>) {
    match discover_config_path(config_override.map(Path::new)) {
        Some(path) if path.exists() => println!("{}", path.display()),
        Some(path) => println!("{} (missing, defaults apply)", path.display()),
        None => println!("(none, defaults apply)"),
    }
}
