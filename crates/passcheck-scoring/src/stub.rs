// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted scorer for tests and offline runs where the real service is
// unavailable.
//
// Outcomes are replayed in order; every call is recorded so callers can
// assert exactly which requests were (or were not) made.

use std::collections::VecDeque;
use std::sync::Mutex;

use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::types::{ImageSource, QualityScore};

use crate::traits::QualityScorer;

/// What the next check should return.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedOutcome {
    /// Raw score; values outside [0, 1] behave like a missing score.
    Score(f64),
    MissingQuality,
    MissingScore,
    TransportFailure,
}

/// A request the stub received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoredCall {
    /// Multipart upload of the named file.
    Upload { name: String },
    /// Check by URL.
    Url(String),
}

/// Scorer that replays canned outcomes.
#[derive(Debug, Default)]
pub struct ScriptedScorer {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    calls: Mutex<Vec<ScoredCall>>,
}

impl ScriptedScorer {
    pub fn new(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> Vec<ScoredCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn respond(&self, call: ScoredCall) -> Result<QualityScore> {
        tracing::debug!(?call, "scripted scorer called");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        let next = self.outcomes.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(ScriptedOutcome::Score(raw)) => {
                QualityScore::new(raw).ok_or(PasscheckError::MissingScore)
            }
            Some(ScriptedOutcome::MissingQuality) => Err(PasscheckError::MissingQuality),
            Some(ScriptedOutcome::MissingScore) => Err(PasscheckError::MissingScore),
            Some(ScriptedOutcome::TransportFailure) => {
                Err(PasscheckError::Transport("scripted transport failure".into()))
            }
            None => {
                tracing::warn!("scripted scorer has no outcome left");
                Err(PasscheckError::Transport("no scripted outcome left".into()))
            }
        }
    }
}

impl QualityScorer for ScriptedScorer {
    async fn check_upload(&self, image: &ImageSource) -> Result<QualityScore> {
        let call = match image {
            ImageSource::Bytes { name, .. } => ScoredCall::Upload { name: name.clone() },
            ImageSource::Url(url) => ScoredCall::Url(url.clone()),
        };
        self.respond(call)
    }

    async fn check_url(&self, url: &str) -> Result<QualityScore> {
        self.respond(ScoredCall::Url(url.to_string()))
    }
}
