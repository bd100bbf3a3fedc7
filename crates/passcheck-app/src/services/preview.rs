// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview sources for the `img` element.

use base64::{Engine as _, engine::general_purpose};
use passcheck_core::types::ImageSource;

/// `src` attribute for `image`: the URL itself, or a base64 data URL for
/// in-memory bytes.
pub fn preview_src(image: &ImageSource) -> String {
    match image {
        ImageSource::Url(url) => url.clone(),
        ImageSource::Bytes { data, mime, .. } => {
            format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(data))
        }
    }
}
