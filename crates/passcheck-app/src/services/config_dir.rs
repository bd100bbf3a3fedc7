// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config directory resolution and `config.json` loading.

use std::path::{Path, PathBuf};

use passcheck_core::AppConfig;
use tracing::{info, warn};

const CONFIG_FILE: &str = "config.json";

/// Return the application config directory. Not created; the app only reads it.
pub fn config_dir() -> PathBuf {
    dirs_fallback().join("passcheck")
}

/// Load settings from the default config directory.
pub fn load_config() -> AppConfig {
    load_config_from(&config_dir())
}

/// Load `config.json` from `dir`, falling back to defaults when it is absent
/// or invalid. Environment overrides are applied last.
pub fn load_config_from(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILE);
    let config = match std::fs::read_to_string(&path) {
        Ok(json) => match AppConfig::from_json(&json) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    };
    config.with_env_overrides()
}

fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(dir.path());
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.jpeg_quality, 92);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "jpeg_quality": 80, "request_timeout_secs": 30 }"#,
        )
        .unwrap();

        let config = load_config_from(dir.path());
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.request_timeout_secs, Some(30));
        assert!((config.accept_threshold - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "max_attempts": 0 }"#).unwrap();
        assert_eq!(load_config_from(dir.path()).max_attempts, 2);
    }
}
