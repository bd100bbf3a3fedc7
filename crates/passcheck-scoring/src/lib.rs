// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// passcheck-scoring — Client for the remote image-quality scoring service,
// response interpretation, and the `QualityScorer` seam the controller is
// generic over.

pub mod client;
pub mod response;
pub mod stub;
pub mod traits;

pub use client::ScoringClient;
pub use response::parse_quality_response;
pub use stub::{ScoredCall, ScriptedOutcome, ScriptedScorer};
pub use traits::QualityScorer;
