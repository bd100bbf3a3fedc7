// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async HTTP client for the remote image-quality scoring service.
//
// Two request shapes reach the same endpoint:
//   - multipart POST with the photo in a `media` file part
//   - GET with the photo's address in a `url` query parameter
// Both carry the model selector and the two credential fields. No timeout is
// applied unless `request_timeout_secs` is configured.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use passcheck_core::config::{AppConfig, ScoringCredentials};
use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::types::{ImageSource, QualityScore};

use crate::response::parse_quality_response;
use crate::traits::QualityScorer;

/// HTTP scoring client.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool.
#[derive(Clone)]
pub struct ScoringClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    credentials: ScoringCredentials,
}

impl ScoringClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &AppConfig, credentials: ScoringCredentials) -> Result<Self> {
        if credentials.api_user.trim().is_empty() || credentials.api_secret.trim().is_empty() {
            return Err(PasscheckError::Config("scoring credentials are empty".into()));
        }

        let endpoint: Url = config.scoring_endpoint.parse().map_err(|e| {
            PasscheckError::Config(format!(
                "invalid scoring endpoint '{}': {e}",
                config.scoring_endpoint
            ))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| PasscheckError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            model: config.scoring_model.clone(),
            credentials,
        })
    }

    /// Create a client with credentials taken from the environment.
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::new(config, ScoringCredentials::from_env()?)
    }

    /// Shared HTTP client (same timeout), reused for downloading URL sources.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build the multipart upload request.
    fn upload_request(&self, data: &[u8], name: &str, mime: &str) -> Result<RequestBuilder> {
        let media = Part::bytes(data.to_vec())
            .file_name(name.to_string())
            .mime_str(mime)
            .map_err(|e| PasscheckError::UnsupportedImage(format!("bad MIME type '{mime}': {e}")))?;

        let form = Form::new()
            .part("media", media)
            .text("models", self.model.clone())
            .text("api_user", self.credentials.api_user.clone())
            .text("api_secret", self.credentials.api_secret.clone());

        Ok(self.http.post(self.endpoint.clone()).multipart(form))
    }

    /// Build the check-by-URL request.
    fn url_request(&self, image_url: &str) -> RequestBuilder {
        self.http.get(self.endpoint.clone()).query(&[
            ("url", image_url),
            ("models", self.model.as_str()),
            ("api_user", self.credentials.api_user.as_str()),
            ("api_secret", self.credentials.api_secret.as_str()),
        ])
    }

    /// Send a prepared request and interpret the JSON body.
    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<QualityScore> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, operation, "scoring request failed");
            PasscheckError::Transport(format!("{operation}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), operation, "scoring service returned an error status");
            return Err(PasscheckError::Transport(format!(
                "{operation} returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!(error = %e, operation, "scoring response was not JSON");
            PasscheckError::Transport(format!("{operation}: unreadable response: {e}"))
        })?;
        debug!(%body, operation, "full scoring response");

        let score = parse_quality_response(&body)?;
        info!(%score, operation, "photo scored");
        Ok(score)
    }
}

impl QualityScorer for ScoringClient {
    #[instrument(skip(self, image), fields(endpoint = %self.endpoint, image = image.label()))]
    async fn check_upload(&self, image: &ImageSource) -> Result<QualityScore> {
        match image {
            ImageSource::Bytes { data, name, mime } => {
                let request = self.upload_request(data, name, mime)?;
                self.send(request, "upload check").await
            }
            ImageSource::Url(url) => self.check_url(url).await,
        }
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn check_url(&self, url: &str) -> Result<QualityScore> {
        let request = self.url_request(url);
        self.send(request, "URL check").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(endpoint: &str) -> ScoringClient {
        let config = AppConfig {
            scoring_endpoint: endpoint.into(),
            ..Default::default()
        };
        ScoringClient::new(&config, ScoringCredentials::new("user-1", "s3cret")).unwrap()
    }

    #[test]
    fn new_rejects_empty_credentials() {
        let result = ScoringClient::new(&AppConfig::default(), ScoringCredentials::new("", "x"));
        assert!(matches!(result, Err(PasscheckError::Config(_))));
    }

    #[test]
    fn new_rejects_invalid_endpoint() {
        let config = AppConfig {
            scoring_endpoint: "not a url %%%".into(),
            ..Default::default()
        };
        let result = ScoringClient::new(&config, ScoringCredentials::new("u", "s"));
        assert!(matches!(result, Err(PasscheckError::Config(_))));
    }

    #[test]
    fn url_request_carries_model_and_credentials() {
        let client = client_for("https://scoring.example.com/1.0/check.json");
        let request = client
            .url_request("https://cdn.example.com/me.jpg")
            .build()
            .unwrap();

        assert_eq!(*request.method(), reqwest::Method::GET);
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("url".into(), "https://cdn.example.com/me.jpg".into())));
        assert!(pairs.contains(&("models".into(), "quality".into())));
        assert!(pairs.contains(&("api_user".into(), "user-1".into())));
        assert!(pairs.contains(&("api_secret".into(), "s3cret".into())));
    }

    #[test]
    fn upload_request_is_multipart_post() {
        let client = client_for("https://scoring.example.com/1.0/check.json");
        let request = client
            .upload_request(&[0xFF, 0xD8, 0xFF], "me.jpg", "image/jpeg")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(*request.method(), reqwest::Method::POST);
        let content_type = request
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Port 9 (discard) is closed on any sane test host.
        let client = client_for("http://127.0.0.1:9/check.json");
        let err = client
            .check_url("https://cdn.example.com/me.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, PasscheckError::Transport(_)));
    }
}
