// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Service credentials are deliberately not part of `AppConfig`: they are read
// from the process environment at runtime and never written to disk.

use serde::{Deserialize, Serialize};

use crate::error::{PasscheckError, Result};

/// Environment variable holding the scoring service user id.
pub const ENV_API_USER: &str = "PASSCHECK_API_USER";
/// Environment variable holding the scoring service secret.
pub const ENV_API_SECRET: &str = "PASSCHECK_API_SECRET";
/// Optional override for [`AppConfig::scoring_endpoint`].
pub const ENV_ENDPOINT: &str = "PASSCHECK_ENDPOINT";

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scoring service endpoint (multipart POST and GET-by-URL).
    pub scoring_endpoint: String,
    /// Value of the `models` field sent with each check.
    pub scoring_model: String,
    /// Minimum score for a photo to be accepted.
    pub accept_threshold: f64,
    /// Total submissions allowed before the photo is rejected outright.
    pub max_attempts: u8,
    /// JPEG quality (1-100) for exported crops.
    pub jpeg_quality: u8,
    /// Largest accepted image payload in bytes.
    pub max_file_size: u64,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring_endpoint: "https://api.sightengine.com/1.0/check.json".into(),
            scoring_model: "quality".into(),
            accept_threshold: 0.6,
            max_attempts: 2,
            jpeg_quality: 92,
            max_file_size: 15 * 1024 * 1024,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Parse a config document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT)
            && !endpoint.trim().is_empty()
        {
            self.scoring_endpoint = endpoint.trim().to_string();
        }
        self
    }

    /// Reject settings the gate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            return Err(PasscheckError::Config(format!(
                "accept_threshold must be within [0, 1], got {}",
                self.accept_threshold
            )));
        }
        if self.max_attempts == 0 {
            return Err(PasscheckError::Config("max_attempts must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PasscheckError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.scoring_endpoint.trim().is_empty() {
            return Err(PasscheckError::Config("scoring_endpoint is empty".into()));
        }
        Ok(())
    }
}

/// Scoring service credentials, injected at runtime.
#[derive(Clone)]
pub struct ScoringCredentials {
    pub api_user: String,
    pub api_secret: String,
}

impl ScoringCredentials {
    pub fn new(api_user: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_user: api_user.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read both credentials from the environment.
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| -> Result<String> {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PasscheckError::Config(format!("{key} is not set")))
        };
        Ok(Self::new(read(ENV_API_USER)?, read(ENV_API_SECRET)?))
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for ScoringCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringCredentials")
            .field("api_user", &self.api_user)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 2);
        assert!((config.accept_threshold - 0.6).abs() < f64::EPSILON);
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = AppConfig::from_json(r#"{ "jpeg_quality": 80 }"#).unwrap();
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.scoring_model, "quality");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = AppConfig::from_json(r#"{ "accept_threshold": 1.5 }"#).unwrap_err();
        assert!(matches!(err, PasscheckError::Config(_)));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let config = AppConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = ScoringCredentials::new("user", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("user"));
        assert!(!printed.contains("hunter2"));
    }
}
