// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Passcheck.

use thiserror::Error;

/// Top-level error type for all Passcheck operations.
#[derive(Debug, Error)]
pub enum PasscheckError {
    // -- Acquisition errors --
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("not a supported image: {0}")]
    UnsupportedImage(String),

    // -- Image pipeline errors --
    #[error("image processing failed: {0}")]
    Image(String),

    // -- Scoring service errors --
    #[error("scoring request failed: {0}")]
    Transport(String),

    #[error("scoring response has no quality data")]
    MissingQuality,

    #[error("scoring response has no usable quality score")]
    MissingScore,

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PasscheckError {
    /// Whether the error came from an unusable scoring response rather than
    /// from the transport.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingQuality | Self::MissingScore)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PasscheckError>;
