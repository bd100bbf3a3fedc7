// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// passcheck-image — Photo handling for Passcheck.
//
// Provides acquisition (local file, in-memory bytes, remote URL) with image
// signature checks, and the crop/export pipeline (safe-area rotation, crop
// paste, JPEG re-encode).

pub mod acquire;
pub mod export;

// Re-export the primary entry points so callers can use `passcheck_image::export_crop` etc.
pub use acquire::{acquire_bytes, acquire_file, acquire_url, fetch_url};
pub use export::processor::{ExportedImage, ImageProcessor, export_crop, safe_area_side};
