// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop/export processor: rotate inside a safe area, cut the crop rectangle,
// re-encode as JPEG. Operates on in-memory images using the `image` and
// `imageproc` crates.

use std::f64::consts::SQRT_2;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{self, Interpolation};
use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::types::{CropGeometry, ImageSource, PixelRect};
use tracing::{debug, info, instrument, warn};

/// File name given to exported crops.
pub const EXPORT_NAME: &str = "cropped.jpg";
/// MIME type of exported crops.
pub const EXPORT_MIME: &str = "image/jpeg";

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes)?
///     .rotate_in_safe_area(12.5)
///     .crop_to(40, 18, 600, 800)
///     .to_jpeg_bytes(92)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| PasscheckError::Image(format!("failed to decode image: {err}")))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) ----------------------

    /// Center the image on a transparent square safe area and rotate the
    /// whole area clockwise about its center.
    ///
    /// The safe area is large enough that no corner is clipped at any angle
    /// (see [`safe_area_side`]). Quarter turns are lossless; other angles use
    /// bilinear interpolation.
    #[instrument(skip(self))]
    pub fn rotate_in_safe_area(self, degrees: f64) -> Self {
        let (width, height) = (self.width(), self.height());
        let side = safe_area_side(width, height);

        let mut canvas = RgbaImage::from_pixel(side, side, TRANSPARENT);
        image::imageops::replace(
            &mut canvas,
            &self.image.to_rgba8(),
            centre_offset(side, width),
            centre_offset(side, height),
        );
        info!(width, height, side, degrees, "Rotating inside safe area");

        let normalised = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        let near = |target: f64| (normalised - target).abs() < 0.01;

        let rotated = if near(0.0) || near(360.0) {
            canvas
        } else if near(90.0) {
            image::imageops::rotate90(&canvas)
        } else if near(180.0) {
            image::imageops::rotate180(&canvas)
        } else if near(270.0) {
            image::imageops::rotate270(&canvas)
        } else {
            debug!("General rotation applied");
            geometric_transformations::rotate_about_center(
                &canvas,
                normalised.to_radians() as f32,
                Interpolation::Bilinear,
                TRANSPARENT,
            )
        };

        Self {
            image: DynamicImage::ImageRgba8(rotated),
        }
    }

    /// Cut a `width` x `height` window whose top-left sits at `(x, y)`.
    ///
    /// The window may extend past the image; uncovered pixels stay
    /// transparent. Pixels are copied, not blended.
    #[instrument(skip(self))]
    pub fn crop_to(self, x: i64, y: i64, width: u32, height: u32) -> Self {
        let mut surface = RgbaImage::from_pixel(width, height, TRANSPARENT);
        image::imageops::replace(&mut surface, &self.image.to_rgba8(), -x, -y);
        Self {
            image: DynamicImage::ImageRgba8(surface),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG has no alpha channel, so transparent areas come out black.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| PasscheckError::Image(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

/// Result of [`export_crop`].
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// The encoded crop, ready for upload.
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    fn empty() -> Self {
        Self {
            source: ImageSource::from_bytes(Vec::new(), EXPORT_NAME, EXPORT_MIME),
            width: 0,
            height: 0,
        }
    }

    /// True for zero-area crops, which carry no bytes.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Side length of the square safe area for a `width` x `height` image:
/// `2 * ceil((max(width, height) / 2) * sqrt(2))`.
pub fn safe_area_side(width: u32, height: u32) -> u32 {
    let max = f64::from(width.max(height));
    (2.0 * ((max / 2.0) * SQRT_2).ceil()) as u32
}

/// Offset that centers a span of `len` pixels inside `side`.
fn centre_offset(side: u32, len: u32) -> i64 {
    i64::from(side / 2) - i64::from(len / 2)
}

/// Run the full crop/export pipeline on an encoded source image.
///
/// The crop rectangle is expressed relative to the original image's top-left
/// corner as it sits, unrotated, in the safe area; rotation is applied
/// before cutting. Zoom never enters the pixel math. A zero-area rectangle
/// yields an empty image rather than an error. A rectangle with more pixels
/// than the whole safe area is refused before anything is allocated.
#[instrument(skip(source), fields(source_len = source.len()))]
pub fn export_crop(
    source: &[u8],
    geometry: &CropGeometry,
    jpeg_quality: u8,
) -> Result<ExportedImage> {
    let processor = ImageProcessor::from_bytes(source)?;
    let (width, height) = (processor.width(), processor.height());

    let rect: PixelRect = geometry.pixel_rect();
    if rect.is_empty() {
        warn!(?rect, "empty crop rectangle, exporting empty image");
        return Ok(ExportedImage::empty());
    }

    let side = safe_area_side(width, height);
    let area = u64::from(rect.width) * u64::from(rect.height);
    if area > u64::from(side) * u64::from(side) {
        warn!(?rect, side, "crop rectangle larger than the safe area");
        return Err(PasscheckError::Image(format!(
            "crop area too large: {}x{} exceeds the {side}x{side} safe area",
            rect.width, rect.height
        )));
    }

    let rotated = processor.rotate_in_safe_area(geometry.normalised_rotation());

    let cropped = rotated.crop_to(
        centre_offset(side, width) + rect.x,
        centre_offset(side, height) + rect.y,
        rect.width,
        rect.height,
    );
    let bytes = cropped.to_jpeg_bytes(jpeg_quality)?;

    info!(
        out_w = rect.width,
        out_h = rect.height,
        bytes = bytes.len(),
        "Crop exported"
    );
    Ok(ExportedImage {
        source: ImageSource::from_bytes(bytes, EXPORT_NAME, EXPORT_MIME),
        width: rect.width,
        height: rect.height,
    })
}
