// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export module: rotate inside a safe area, crop, and re-encode.

pub mod processor;

pub use processor::{ExportedImage, ImageProcessor, export_crop};
