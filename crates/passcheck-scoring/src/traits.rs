// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait seam between the upload controller and whatever scores photos.
//
// The production implementation is `ScoringClient` (HTTP); tests and offline
// runs use `ScriptedScorer`.

use std::future::Future;

use passcheck_core::error::Result;
use passcheck_core::types::{ImageSource, QualityScore};

/// Something that can rate the clarity of a passport photo.
pub trait QualityScorer {
    /// Upload the photo and return its score.
    ///
    /// In-memory sources go up as multipart form data; URL sources are
    /// scored by reference, as [`QualityScorer::check_url`] would.
    fn check_upload(&self, image: &ImageSource) -> impl Future<Output = Result<QualityScore>> + Send;

    /// Ask the service to fetch and score a remote photo.
    fn check_url(&self, url: &str) -> impl Future<Output = Result<QualityScore>> + Send;
}
