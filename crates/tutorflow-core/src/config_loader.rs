//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. An explicit path passed by the caller (`--config`).
//! 2. `TUTORFLOW_CONFIG` environment variable.
//! 3. `~/.tutorflow/config.json`
//! 4. If none found, built-in defaults.
//!
//! Before discovery, a `.env` file in the working directory is loaded into the
//! process environment; variables already set win over the file. After the
//! config file is read, a few environment variables override individual
//! settings (see [`apply_env_overrides`]) and the result is validated.

use std::path::{Path, PathBuf};

use tutorflow_types::config::Config;
use tutorflow_types::{ConfigError, Role};

/// Dotenv file read from the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TUTORFLOW_CONFIG";

/// Environment variables overriding each role's model.
pub const MODEL_ENV: [(Role, &str); 3] = [
    (Role::Optimizer, "OPTIMIZER_MODEL"),
    (Role::Generator, "GENERATOR_MODEL"),
    (Role::Reviewer, "REVIEWER_MODEL"),
];

/// Environment variable overriding `provider.base_url`.
pub const BASE_URL_ENV: &str = "DASHSCOPE_BASE_URL";

/// Environment variable overriding `pipeline.max_retries`.
pub const MAX_RETRIES_ENV: &str = "TUTORFLOW_MAX_RETRIES";

/// Discover the config file path using the fallback chain.
///
/// An explicit path or `TUTORFLOW_CONFIG` is returned as-is; the home
/// directory candidate only if it exists.
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = env_var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    let candidate = dirs::home_dir()?.join(".tutorflow").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load, override and validate configuration.
///
/// A missing explicit path is an error. A missing path from
/// `TUTORFLOW_CONFIG` falls back to defaults with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    load_dotenv(Path::new(DOTENV_FILE))?;

    let mut config = match discover_config_path(explicit) {
        Some(path) if explicit.is_none() && !path.exists() => {
            tracing::warn!(
                path = %path.display(),
                "config path does not exist, using defaults"
            );
            Config::default()
        }
        Some(path) => read_config_file(&path)?,
        None => {
            tracing::info!("no config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` as a dotenv file into the process environment.
///
/// Variables already present in the environment are left untouched. Returns
/// `false` when the file does not exist.
pub fn load_dotenv(path: &Path) -> Result<bool, ConfigError> {
    if !path.is_file() {
        return Ok(false);
    }
    dotenvy::from_path(path).map_err(|e| {
        ConfigError::Invalid(format!("failed to load {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "loaded dotenv file");
    Ok(true)
}

/// Parse one config file.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply environment variable overrides to `config`.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    for (role, var) in MODEL_ENV {
        if let Some(model) = env_var(var) {
            tracing::debug!(%role, %model, "model overridden from {var}");
            config.stages.get_mut(role).model = model;
        }
    }

    if let Some(url) = env_var(BASE_URL_ENV) {
        config.provider.base_url = url;
    }

    if let Some(raw) = env_var(MAX_RETRIES_ENV) {
        config.pipeline.max_retries = raw.parse().map_err(|_| {
            ConfigError::Invalid(format!("{MAX_RETRIES_ENV} must be a number, got {raw:?}"))
        })?;
    }

    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const OVERRIDE_VARS: [&str; 6] = [
        CONFIG_ENV,
        "OPTIMIZER_MODEL",
        "GENERATOR_MODEL",
        "REVIEWER_MODEL",
        BASE_URL_ENV,
        MAX_RETRIES_ENV,
    ];

    fn without_overrides<R>(f: impl FnOnce() -> R) -> R {
        let unset: Vec<(&str, Option<&str>)> = OVERRIDE_VARS.iter().map(|v| (*v, None)).collect();
        temp_env::with_vars(unset, f)
    }

    #[test]
    fn explicit_path_is_loaded() {
        let file = config_file(r#"{"stages": {"generator": {"model": "qwen-max"}}}"#);
        let config = without_overrides(|| load_config(Some(file.path()))).unwrap();
        assert_eq!(config.stages.generator.model, "qwen-max");
        assert_eq!(config.stages.optimizer.model, "qwen-flash");
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = without_overrides(|| load_config(Some(&path))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_config_path_missing_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.json");
        let config = without_overrides(|| {
            temp_env::with_var(CONFIG_ENV, Some(missing.as_os_str()), || load_config(None))
        })
        .unwrap();
        assert_eq!(config.pipeline.max_retries, 3);
    }

    #[test]
    fn env_config_path_is_discovered() {
        let file = config_file(r#"{"pipeline": {"maxRetries": 2}}"#);
        let config = without_overrides(|| {
            temp_env::with_var(CONFIG_ENV, Some(file.path().as_os_str()), || load_config(None))
        })
        .unwrap();
        assert_eq!(config.pipeline.max_retries, 2);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let file = config_file("{ not json");
        let err = without_overrides(|| load_config(Some(file.path()))).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn model_env_overrides() {
        let config = without_overrides(|| {
            temp_env::with_vars(
                [
                    ("OPTIMIZER_MODEL", Some("qwen-turbo")),
                    ("REVIEWER_MODEL", Some("qwen-max")),
                    (BASE_URL_ENV, Some("http://localhost:1234/v1")),
                ],
                || {
                    let mut config = Config::default();
                    apply_env_overrides(&mut config).map(|_| config)
                },
            )
        })
        .unwrap();
        assert_eq!(config.stages.optimizer.model, "qwen-turbo");
        assert_eq!(config.stages.generator.model, "qwen-plus-character");
        assert_eq!(config.stages.reviewer.model, "qwen-max");
        assert_eq!(config.provider.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn bad_max_retries_env_is_invalid() {
        let err = without_overrides(|| {
            temp_env::with_var(MAX_RETRIES_ENV, Some("lots"), || {
                apply_env_overrides(&mut Config::default())
            })
        })
        .unwrap_err();
        assert!(err.to_string().contains(MAX_RETRIES_ENV));
    }

    #[test]
    fn max_retries_env_cannot_raise_ceiling() {
        let file = config_file("{}");
        let err = without_overrides(|| {
            temp_env::with_var(MAX_RETRIES_ENV, Some("10"), || load_config(Some(file.path())))
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("at most 3"), "{err}");
    }

    #[test]
    fn max_retries_env_may_lower_ceiling() {
        let file = config_file("{}");
        let config = without_overrides(|| {
            temp_env::with_var(MAX_RETRIES_ENV, Some("1"), || load_config(Some(file.path())))
        })
        .unwrap();
        assert_eq!(config.pipeline.max_retries, 1);
    }

    #[test]
    fn dotenv_file_feeds_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(DOTENV_FILE);
        std::fs::write(
            &dotenv,
            "# local settings\nGENERATOR_MODEL=qwen-from-dotenv\nTUTORFLOW_MAX_RETRIES=2\n",
        )
        .unwrap();

        let config = without_overrides(|| {
            assert!(load_dotenv(&dotenv).unwrap());
            let mut config = Config::default();
            apply_env_overrides(&mut config).map(|_| config)
        })
        .unwrap();
        assert_eq!(config.stages.generator.model, "qwen-from-dotenv");
        assert_eq!(config.pipeline.max_retries, 2);
    }

    #[test]
    fn dotenv_does_not_override_process_env() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(DOTENV_FILE);
        std::fs::write(&dotenv, "REVIEWER_MODEL=from-file\n").unwrap();

        let model = without_overrides(|| {
            temp_env::with_var("REVIEWER_MODEL", Some("from-process"), || {
                load_dotenv(&dotenv).unwrap();
                std::env::var("REVIEWER_MODEL").unwrap()
            })
        });
        assert_eq!(model, "from-process");
    }

    #[test]
    fn missing_dotenv_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_dotenv(&dir.path().join(DOTENV_FILE)).unwrap());
    }

    #[test]
    fn malformed_dotenv_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let dotenv = dir.path().join(DOTENV_FILE);
        std::fs::write(&dotenv, "NOT A VALID LINE\n").unwrap();
        let err = load_dotenv(&dotenv).unwrap_err();
        assert!(err.to_string().contains(".env"), "{err}");
    }
}
