// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo acquisition from local files, in-memory bytes, and remote URLs.
//
// Every path checks its input as early as possible: empty or oversized
// payloads and anything whose signature is not an image are refused before
// the crop pipeline or the scoring service ever sees them. An empty URL is
// rejected without touching the network.

use std::path::Path;

use passcheck_core::AppConfig;
use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::types::ImageSource;
use tracing::{debug, info, instrument, warn};

/// Name given to downloads whose URL has no usable last path segment.
const FALLBACK_REMOTE_NAME: &str = "remote-image";

/// Read a local photo and validate it.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn acquire_file(path: impl AsRef<Path>, config: &AppConfig) -> Result<ImageSource> {
    let path = path.as_ref();

    let metadata = std::fs::metadata(path)?;
    check_size(metadata.len(), config)?;

    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".into());

    acquire_bytes(data, name, config)
}

/// Validate bytes that are already in memory (e.g. a file picker result).
#[instrument(skip_all, fields(data_len = data.len()))]
pub fn acquire_bytes(
    data: Vec<u8>,
    name: impl Into<String>,
    config: &AppConfig,
) -> Result<ImageSource> {
    if data.is_empty() {
        return Err(PasscheckError::UnsupportedImage("file is empty".into()));
    }
    check_size(data.len() as u64, config)?;

    let mime = sniff_image_mime(&data)?;
    let source = ImageSource::from_bytes(data, name, mime);
    info!(name = source.label(), mime, "photo acquired");
    Ok(source)
}

/// Accept a remote photo URL.
///
/// The input is trimmed first; an empty string fails with `InvalidUrl` and
/// nothing is fetched. Only absolute http/https URLs with a host pass.
pub fn acquire_url(input: &str) -> Result<ImageSource> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        debug!("empty URL submitted");
        return Err(PasscheckError::InvalidUrl("no URL given".into()));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| PasscheckError::InvalidUrl(format!("'{trimmed}': {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(PasscheckError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(PasscheckError::InvalidUrl(format!("'{trimmed}' has no host")));
    }

    info!(url = trimmed, "photo URL accepted");
    Ok(ImageSource::Url(trimmed.to_string()))
}

/// Download a URL source so it can be previewed or cropped locally.
#[instrument(skip(client, config))]
pub async fn fetch_url(
    client: &reqwest::Client,
    url: &str,
    config: &AppConfig,
) -> Result<ImageSource> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PasscheckError::Transport(format!("GET {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "image download refused");
        return Err(PasscheckError::Transport(format!(
            "GET {url} returned HTTP {}",
            status.as_u16()
        )));
    }

    if let Some(length) = response.content_length() {
        check_size(length, config)?;
    }

    // The declared length may be absent or wrong; count as chunks arrive.
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| PasscheckError::Transport(format!("reading {url}: {e}")))?
    {
        body.extend_from_slice(&chunk);
        check_size(body.len() as u64, config)?;
    }
    debug!(bytes = body.len(), "image downloaded");

    acquire_bytes(body, remote_name(url), config)
}

/// Identify the image type from its content signature.
pub fn sniff_image_mime(data: &[u8]) -> Result<&'static str> {
    let kind = infer::get(data)
        .ok_or_else(|| PasscheckError::UnsupportedImage("unrecognised file signature".into()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(PasscheckError::UnsupportedImage(format!(
            "signature is {}, not an image",
            kind.mime_type()
        )));
    }
    Ok(kind.mime_type())
}

fn check_size(len: u64, config: &AppConfig) -> Result<()> {
    if len > config.max_file_size {
        return Err(PasscheckError::UnsupportedImage(format!(
            "file is {:.1} MB, limit is {:.1} MB",
            len as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// Last non-empty path segment of `url`, used as the upload file name.
fn remote_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()).map(str::to_string))
        })
        .unwrap_or_else(|| FALLBACK_REMOTE_NAME.into())
}
