use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const CONFIG_PATH_ENV_VAR: &str = "MERCY_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub(crate) target_tps: u32,
    pub(crate) max_frame_delta: Duration,
    pub(crate) max_ticks_per_frame: u32,
    pub(crate) status_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            status_log_interval: Duration::from_secs(1),
        }
    }
}

/// On-disk shape: every field optional, merged over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    target_tps: Option<u32>,
    max_frame_delta_ms: Option<u64>,
    max_ticks_per_frame: Option<u32>,
    status_log_interval_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {detail}")]
    Parse { path: PathBuf, detail: String },
}

/// Loads loop settings from the file named by `MERCY_CONFIG`, or the
/// defaults when the variable is unset. A named-but-unreadable file is a
/// startup error, never a silent fallback.
pub(crate) fn load_loop_config() -> Result<LoopConfig, ConfigError> {
    match env::var(CONFIG_PATH_ENV_VAR) {
        Ok(value) => {
            let path = PathBuf::from(value);
            let config = load_from_file(&path)?;
            info!(path = %path.display(), "config_loaded");
            Ok(config)
        }
        Err(env::VarError::NotPresent) => Ok(LoopConfig::default()),
        Err(source) => Err(ConfigError::EnvVar {
            var: CONFIG_PATH_ENV_VAR,
            source,
        }),
    }
}

fn load_from_file(path: &Path) -> Result<LoopConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_config_json(&raw).map_err(|detail| ConfigError::Parse {
        path: path.to_path_buf(),
        detail,
    })?;
    Ok(merge_over_defaults(file))
}

fn parse_config_json(raw: &str) -> Result<ConfigFile, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, ConfigFile>(&mut deserializer) {
        Ok(file) => Ok(file),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(source.to_string())
            } else {
                Err(format!("at {path}: {source}"))
            }
        }
    }
}

fn merge_over_defaults(file: ConfigFile) -> LoopConfig {
    let defaults = LoopConfig::default();
    LoopConfig {
        target_tps: file.target_tps.unwrap_or(defaults.target_tps),
        max_frame_delta: file
            .max_frame_delta_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_frame_delta),
        max_ticks_per_frame: file
            .max_ticks_per_frame
            .unwrap_or(defaults.max_ticks_per_frame),
        status_log_interval: file
            .status_log_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.status_log_interval),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn full_file_overrides_every_default() {
        let file = write_config(
            r#"{
                "target_tps": 30,
                "max_frame_delta_ms": 100,
                "max_ticks_per_frame": 3,
                "status_log_interval_ms": 5000
            }"#,
        );

        let config = load_from_file(file.path()).expect("load config");
        assert_eq!(config.target_tps, 30);
        assert_eq!(config.max_frame_delta, Duration::from_millis(100));
        assert_eq!(config.max_ticks_per_frame, 3);
        assert_eq!(config.status_log_interval, Duration::from_secs(5));
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let file = write_config(r#"{ "target_tps": 120 }"#);

        let config = load_from_file(file.path()).expect("load config");
        assert_eq!(config.target_tps, 120);
        assert_eq!(config.max_frame_delta, Duration::from_millis(250));
        assert_eq!(config.max_ticks_per_frame, 5);
        assert_eq!(config.status_log_interval, Duration::from_secs(1));
    }

    #[test]
    fn empty_object_is_all_defaults() {
        let file = write_config("{}");
        let config = load_from_file(file.path()).expect("load config");
        assert_eq!(config.target_tps, LoopConfig::default().target_tps);
    }

    #[test]
    fn unknown_field_errors_with_its_path() {
        let file = write_config(r#"{ "target_fps": 30 }"#);

        let error = load_from_file(file.path()).expect_err("should reject unknown field");
        let message = error.to_string();
        assert!(message.contains("target_fps"), "got: {message}");
    }

    #[test]
    fn type_mismatch_errors_name_the_offending_field() {
        let file = write_config(r#"{ "target_tps": "fast" }"#);

        let error = load_from_file(file.path()).expect_err("should reject string tps");
        let message = error.to_string();
        assert!(message.contains("target_tps"), "got: {message}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let path = directory.path().join("absent.json");

        let error = load_from_file(&path).expect_err("should fail to read");
        assert!(matches!(error, ConfigError::ReadFile { .. }));
    }
}
