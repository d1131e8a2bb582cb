//! Renders run results onto an output surface.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use lumen_abstraction::{ImageBuffer, ModelError};
use tracing::{debug, error};

use crate::dispatcher::RunResult;

/// Largest width and height an image is shown at.
pub const DISPLAY_BOUND: u32 = 300;

/// Whatever displays results to the user.
///
/// Text replaces what was shown before. An image is shown with a caption and
/// stays until cleared or replaced.
pub trait OutputSurface {
    /// Replaces the output text.
    fn show_text(&mut self, text: &str);

    /// Shows an image together with its caption text.
    fn show_image(&mut self, image: &ImageBuffer, caption: &str);

    /// Removes any image currently shown.
    fn clear_image(&mut self);

    /// Replaces the model information panel.
    fn show_info(&mut self, info: &str);

    /// Pops a short titled notification.
    fn notify(&mut self, title: &str, message: &str);
}

/// Caption shown under a generated image, with its original dimensions.
#[must_use]
pub fn caption(image: &ImageBuffer) -> String {
    format!("Image generated successfully!\n\nImage size: {}×{}", image.width, image.height)
}

/// Largest size that fits inside `bound`×`bound` with the same aspect ratio.
/// Images that already fit keep their size.
#[must_use]
pub fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    if width <= bound && height <= bound {
        return (width, height);
    }
    let scale = (f64::from(bound) / f64::from(width)).min(f64::from(bound) / f64::from(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, bound);
    (scaled(width), scaled(height))
}

/// Turns run results into surface calls.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    bound: u32,
}

impl Default for Presenter {
    fn default() -> Self {
        Self { bound: DISPLAY_BOUND }
    }
}

impl Presenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bound(bound: u32) -> Self {
        Self { bound: bound.max(1) }
    }

    /// Scales `image` down to the display bound.
    pub fn thumbnail(&self, image: &ImageBuffer) -> Result<ImageBuffer, ModelError> {
        if !image.is_well_formed() {
            let expected = image
                .expected_len()
                .map_or_else(|| "more than addressable".to_string(), |len| len.to_string());
            return Err(ModelError::PresentationFailure(format!(
                "pixel buffer holds {} bytes, expected {expected} for a {}x{} image",
                image.pixels.len(),
                image.width,
                image.height
            )));
        }

        let (width, height) = fit_within(image.width, image.height, self.bound);
        if (width, height) == (image.width, image.height) {
            return Ok(image.clone());
        }

        let source = RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| ModelError::PresentationFailure("pixel buffer rejected".to_string()))?;
        let resized = imageops::resize(&source, width, height, FilterType::Lanczos3);
        debug!(from = ?(image.width, image.height), to = ?(width, height), "Thumbnail created");

        Ok(ImageBuffer::new(width, height, resized.into_raw()))
    }

    /// Shows `result` on `surface`.
    pub fn present(&self, result: &RunResult, surface: &mut dyn OutputSurface) {
        match result {
            RunResult::Image(image) => match self.thumbnail(image) {
                Ok(thumbnail) => surface.show_image(&thumbnail, &caption(image)),
                Err(e) => {
                    error!(error = %e, "Cannot display image");
                    surface.clear_image();
                    surface.show_text(&format!("Error displaying image: {e}"));
                }
            },
            RunResult::Text(text) | RunResult::Error(text) => {
                surface.clear_image();
                surface.show_text(text);
            }
        }
    }
}
