// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Passcheck.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one outbound scoring request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the user chose to supply the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UploadMethod {
    #[default]
    Url,
    File,
}

/// An acquired photo.
///
/// Replaced wholesale on every acquisition; never mutated in place. Byte
/// payloads are shared behind an `Arc` so UI snapshots stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes (a picked file or an exported crop).
    Bytes {
        data: Arc<[u8]>,
        /// File name sent with multipart uploads.
        name: String,
        /// Sniffed MIME type, e.g. `image/jpeg`.
        mime: String,
    },
    /// A remote image the scoring service fetches itself.
    Url(String),
}

impl ImageSource {
    pub fn from_bytes(data: Vec<u8>, name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self::Bytes {
            data: data.into(),
            name: name.into(),
            mime: mime.into(),
        }
    }

    /// Encoded bytes, if this source is held in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes { data, .. } => Some(&data[..]),
            Self::Url(_) => None,
        }
    }

    /// Short label for logs and the UI (file name or URL).
    pub fn label(&self) -> &str {
        match self {
            Self::Bytes { name, .. } => name,
            Self::Url(url) => url,
        }
    }
}

/// Crop rectangle in source-pixel space plus the widget's zoom and rotation.
///
/// Values arrive fractional from the cropping widget. Zoom only changes which
/// rectangle the widget reports; the pixel pipeline ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
}

impl CropGeometry {
    /// Identity crop covering a `width` x `height` image, no rotation.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(width),
            height: f64::from(height),
            zoom: 1.0,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Rotation folded into `[0, 360)`. Non-finite input counts as 0.
    pub fn normalised_rotation(&self) -> f64 {
        if self.rotation.is_finite() {
            self.rotation.rem_euclid(360.0)
        } else {
            0.0
        }
    }

    /// Rounded integer rectangle. Negative or NaN extents collapse to zero;
    /// offsets are clamped to the `u32` range so later arithmetic cannot
    /// overflow.
    pub fn pixel_rect(&self) -> PixelRect {
        let extent = |v: f64| -> u32 {
            if v.is_finite() && v > 0.0 {
                v.round().min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        };
        let bound = f64::from(u32::MAX);
        let offset = |v: f64| -> i64 {
            if v.is_finite() {
                v.round().clamp(-bound, bound) as i64
            } else {
                0
            }
        };

        PixelRect {
            x: offset(self.x),
            y: offset(self.y),
            width: extent(self.width),
            height: extent(self.height),
        }
    }
}

/// Integer crop rectangle used by the pixel pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which submission the user is on. Starts at 1 and never passes the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptCounter(u8);

impl AttemptCounter {
    pub const FIRST: Self = Self(1);

    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether another submission is still allowed under `max_attempts`.
    pub fn has_retry_left(self, max_attempts: u8) -> bool {
        self.0 < max_attempts
    }

    /// Next attempt, saturating at `max_attempts`.
    pub fn advance(self, max_attempts: u8) -> Self {
        Self(self.0.saturating_add(1).min(max_attempts.max(1)))
    }
}

impl Default for AttemptCounter {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for AttemptCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Perceived clarity reported by the scoring service, always in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct QualityScore(f64);

impl QualityScore {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn meets(self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl std::fmt::Display for QualityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Outcome of one scored submission, kept for display and logging.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub submission: SubmissionId,
    pub score: QualityScore,
    pub accepted: bool,
    pub attempt: AttemptCounter,
    pub checked_at: DateTime<Utc>,
}
