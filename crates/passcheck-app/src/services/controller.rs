// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload controller: drives acquisition, export, and scoring, and feeds every
// outcome into the quality gate.
//
// Every flow goes through a `start_*_check` step that records the input and
// registers the request, then `run_check` + `complete_check`. The async
// `submit_*` methods chain those for callers that can hold `&mut self` across
// an await; the UI runs the same steps around its own task.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::gate::GatePolicy;
use passcheck_core::types::{CropGeometry, ImageSource, QualityScore, SubmissionId};
use passcheck_core::{AppConfig, GateEvent, QualityGate};
use passcheck_image::{
    ImageProcessor, acquire_bytes, acquire_file, acquire_url, export_crop, fetch_url,
};
use passcheck_scoring::QualityScorer;

/// A scoring request that has been registered with the gate.
#[derive(Debug, Clone)]
pub struct PendingCheck {
    pub id: SubmissionId,
    pub image: ImageSource,
}

/// Owns the gate and the scorer for one uploader.
pub struct UploadController<S> {
    gate: QualityGate,
    scorer: S,
    config: AppConfig,
    /// Used for downloading URL sources before a crop.
    http: reqwest::Client,
}

impl<S: QualityScorer> UploadController<S> {
    /// Controller with its own download client, honouring
    /// `request_timeout_secs`.
    pub fn new(scorer: S, config: AppConfig) -> Self {
        let http = download_client(&config);
        Self::with_http(scorer, config, http)
    }

    /// Controller that downloads through `http` (e.g. the scoring client's).
    pub fn with_http(scorer: S, config: AppConfig, http: reqwest::Client) -> Self {
        Self {
            gate: QualityGate::new(GatePolicy::from(&config)),
            scorer,
            config,
            http,
        }
    }

    /// Current gate snapshot for rendering.
    pub fn state(&self) -> &QualityGate {
        &self.gate
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // -- Steps ----------------------------------------------------------------

    /// Check a photo by URL. `None` when the input was rejected; nothing is
    /// sent in that case.
    pub fn start_url_check(&mut self, input: &str) -> Option<PendingCheck> {
        self.record_acquisition(acquire_url(input))
    }

    /// Read a local file and register its upload.
    pub fn start_file_check(&mut self, path: impl AsRef<Path>) -> Option<PendingCheck> {
        let acquired = acquire_file(path, &self.config);
        self.record_acquisition(acquired)
    }

    /// Register the upload of in-memory bytes (e.g. from a file picker).
    pub fn start_bytes_check(&mut self, data: Vec<u8>, name: &str) -> Option<PendingCheck> {
        let acquired = acquire_bytes(data, name, &self.config);
        self.record_acquisition(acquired)
    }

    /// Replace the current photo with its crop and register the upload.
    /// The crop belongs to the same attempt cycle as the photo it came from.
    pub fn start_export_check(&mut self, exported: Result<ImageSource>) -> Option<PendingCheck> {
        match exported {
            Ok(image) => {
                self.dispatch(GateEvent::Exported(image));
                self.begin_check()
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.dispatch(GateEvent::ExportFailed(e));
                None
            }
        }
    }

    /// Feed a scoring result back. Results for superseded requests are dropped
    /// by the gate.
    pub fn complete_check(&mut self, id: SubmissionId, result: Result<QualityScore>) {
        let event = match result {
            Ok(score) => GateEvent::Scored {
                id,
                score,
                checked_at: Utc::now(),
            },
            Err(error) => {
                if error.is_missing_data() {
                    warn!(%id, %error, "scoring response unusable");
                } else {
                    warn!(%id, %error, "scoring request failed");
                }
                GateEvent::CheckFailed { id, error }
            }
        };
        self.dispatch(event);
        info!(%id, phase = ?self.gate.phase(), "quality check completed");
    }

    fn dispatch(&mut self, event: GateEvent) {
        let gate = std::mem::take(&mut self.gate);
        self.gate = gate.apply(event);
    }

    fn record_acquisition(&mut self, acquired: Result<ImageSource>) -> Option<PendingCheck> {
        match acquired {
            Ok(image) => {
                self.dispatch(GateEvent::Acquired(image));
                self.begin_check()
            }
            Err(e) => {
                warn!(error = %e, "acquisition rejected");
                self.dispatch(GateEvent::InputRejected(e));
                None
            }
        }
    }

    fn begin_check(&mut self) -> Option<PendingCheck> {
        let image = self.gate.image()?.clone();
        let id = SubmissionId::new();
        self.dispatch(GateEvent::Submitted(id));
        info!(%id, image = image.label(), attempt = %self.gate.attempt(), "quality check submitted");
        Some(PendingCheck { id, image })
    }

    // -- Flows ----------------------------------------------------------------

    /// Accept a URL and have the service check it directly.
    #[instrument(skip(self))]
    pub async fn submit_url(&mut self, input: &str) {
        let check = self.start_url_check(input);
        self.finish(check).await;
    }

    /// Read a local file and upload it for checking.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn submit_file(&mut self, path: impl AsRef<Path>) {
        let check = self.start_file_check(path);
        self.finish(check).await;
    }

    /// Upload in-memory bytes for checking.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn submit_bytes(&mut self, data: Vec<u8>, name: &str) {
        let check = self.start_bytes_check(data, name);
        self.finish(check).await;
    }

    /// Crop the current image and upload the result.
    #[instrument(skip(self))]
    pub async fn export_and_submit(&mut self, geometry: CropGeometry) {
        let exported = match self.gate.image().cloned() {
            Some(image) => export_source(&self.http, &self.config, image, geometry).await,
            None => Err(PasscheckError::Image("no photo to crop".into())),
        };
        let check = self.start_export_check(exported);
        self.finish(check).await;
    }

    async fn finish(&mut self, check: Option<PendingCheck>) {
        if let Some(check) = check {
            let result = run_check(&self.scorer, &check.image).await;
            self.complete_check(check.id, result);
        }
    }
}

fn download_client(config: &AppConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "cannot build download client, using defaults");
        reqwest::Client::new()
    })
}

/// Send one check: URL sources by address, everything else as an upload.
pub async fn run_check<S: QualityScorer>(scorer: &S, image: &ImageSource) -> Result<QualityScore> {
    match image {
        ImageSource::Url(url) => scorer.check_url(url).await,
        ImageSource::Bytes { .. } => scorer.check_upload(image).await,
    }
}

/// Bytes for `image`, downloading it first when it is a URL.
async fn local_copy(
    http: &reqwest::Client,
    config: &AppConfig,
    image: ImageSource,
) -> Result<ImageSource> {
    match image {
        ImageSource::Url(url) => fetch_url(http, &url, config).await,
        bytes => Ok(bytes),
    }
}

/// Crop `image` with `geometry`, downloading it first when it is a URL.
pub async fn export_source(
    http: &reqwest::Client,
    config: &AppConfig,
    image: ImageSource,
    geometry: CropGeometry,
) -> Result<ImageSource> {
    let image = local_copy(http, config, image).await?;
    let data = image
        .bytes()
        .ok_or_else(|| PasscheckError::Image("image has no bytes".into()))?;

    let exported = export_crop(data, &geometry, config.jpeg_quality)?;
    if exported.is_empty() {
        return Err(PasscheckError::Image("crop area is empty".into()));
    }
    Ok(exported.source)
}

/// Crop covering the whole of `image`, so the crop controls start from its
/// real size. URL sources are downloaded to learn it.
pub async fn initial_crop(
    http: &reqwest::Client,
    config: &AppConfig,
    image: ImageSource,
) -> Result<CropGeometry> {
    let image = local_copy(http, config, image).await?;
    let data = image
        .bytes()
        .ok_or_else(|| PasscheckError::Image("image has no bytes".into()))?;
    let processor = ImageProcessor::from_bytes(data)?;
    Ok(CropGeometry::full(processor.width(), processor.height()))
}
