// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state: reactive signals for the Dioxus UI.

use passcheck_core::human_errors::humanize_error;
use passcheck_core::types::{CropGeometry, UploadMethod};
use passcheck_core::{AppConfig, GatePhase, QualityGate};
use passcheck_scoring::ScoringClient;

use crate::services::controller::UploadController;

/// Shared state accessible to the uploader via `use_context`.
pub struct AppState {
    /// URL or file input.
    pub method: UploadMethod,
    /// Contents of the URL text box.
    pub url_input: String,
    /// Crop values as reported by the crop controls.
    pub crop: CropGeometry,
    /// A crop export is running (before any request leaves).
    pub exporting: bool,
    /// `None` when the scoring service could not be configured.
    pub controller: Option<UploadController<ScoringClient>>,
    /// Why `controller` is missing, in plain English.
    pub setup_error: Option<String>,
}

impl AppState {
    /// Build the initial state; missing credentials leave the uploader
    /// disabled with an explanation instead of failing startup.
    pub fn new(config: AppConfig) -> Self {
        let (controller, setup_error) = match ScoringClient::from_env(&config) {
            Ok(client) => {
                let http = client.http().clone();
                (Some(UploadController::with_http(client, config, http)), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "scoring service unavailable");
                let human = humanize_error(&e);
                (None, Some(format!("{} {}", human.message, human.suggestion)))
            }
        };

        Self {
            method: UploadMethod::default(),
            url_input: String::new(),
            crop: CropGeometry::full(0, 0),
            exporting: false,
            controller,
            setup_error,
        }
    }

    pub fn gate(&self) -> Option<&QualityGate> {
        self.controller.as_ref().map(UploadController::state)
    }

    /// Whether input should be locked while work is in flight.
    pub fn busy(&self) -> bool {
        self.exporting || self.gate().is_some_and(|g| g.phase() == GatePhase::Submitted)
    }
}
