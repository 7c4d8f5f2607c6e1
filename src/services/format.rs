//! Output format handling service
//!
//! Encoding of region images lives here so the compositor only deals in
//! pixel buffers.

use crate::{
    config::OutputFormat,
    error::{PartitionError, Result},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Service for encoding region images
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Encode an RGBA image into the bytes of the given output format
    ///
    /// `Rgba8` yields the raw row-major pixel buffer with no header.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use image_line_split::{services::OutputFormatHandler, OutputFormat};
    /// use image::RgbaImage;
    ///
    /// let image = RgbaImage::new(4, 4);
    /// let png = OutputFormatHandler::encode(&image, OutputFormat::Png)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
        let image_format = match Self::image_format(format) {
            Some(image_format) => image_format,
            None => return Ok(image.as_raw().clone()),
        };

        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, image_format).map_err(|e| {
            PartitionError::encoding(format!(
                "Failed to encode {}x{} image as {:?}: {}",
                image.width(),
                image.height(),
                format,
                e
            ))
        })?;
        Ok(buffer.into_inner())
    }

    /// Encode as PNG and wrap in standard base64
    pub fn to_base64_png(image: &RgbaImage) -> Result<String> {
        let png = Self::encode(image, OutputFormat::Png)?;
        Ok(STANDARD.encode(png))
    }

    /// Codec used for a given output format; `None` for raw buffers
    #[must_use]
    pub fn image_format(format: OutputFormat) -> Option<ImageFormat> {
        match format {
            OutputFormat::Png => Some(ImageFormat::Png),
            OutputFormat::Tiff => Some(ImageFormat::Tiff),
            OutputFormat::Rgba8 => None,
        }
    }

    /// Get the file extension (without the dot) for a given output format
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Rgba8 => "rgba8",
        }
    }
}
