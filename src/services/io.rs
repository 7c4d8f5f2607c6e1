//! Image I/O operations service
//!
//! Keeps file and stream handling out of the partition engine, which only
//! ever sees decoded pixel grids.

use crate::{
    config::OutputFormat,
    error::{PartitionError, Result},
    services::OutputFormatHandler,
};
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first, then falls back to
    /// content sniffing.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use image_line_split::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(PartitionError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    PartitionError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    let extension = path_ref
                        .extension()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown");

                    PartitionError::processing_stage_error(
                        "image loading",
                        &format!(
                            "Failed to load image with both extension-based ({}) and content-based detection. Extension error: {}. Content error: {}",
                            extension, e, content_err
                        ),
                        Some(&format!("path: {}, size: {} bytes", path_ref.display(), data.len())),
                    )
                })
            },
        }
    }

    /// Decode an image from bytes
    ///
    /// Empty or undecodable input is the caller's fault and maps to `InvalidImage`.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(PartitionError::invalid_image("image data is empty"));
        }
        image::load_from_memory(bytes).map_err(|e| {
            PartitionError::invalid_image(format!(
                "cannot decode {} bytes as an image: {e}",
                bytes.len()
            ))
        })
    }

    /// Read all bytes from an async reader and decode them
    pub async fn load_from_reader<R: tokio::io::AsyncRead + Unpin>(
        mut reader: R,
    ) -> Result<DynamicImage> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;

        Self::load_from_bytes(&buffer)
    }

    /// Save a region image, creating parent directories as needed
    ///
    /// # Examples
    /// ```rust,no_run
    /// use image_line_split::{services::ImageIOService, OutputFormat};
    /// use image::RgbaImage;
    ///
    /// let image = RgbaImage::new(8, 8);
    /// ImageIOService::save_image(&image, "out/region1.png", OutputFormat::Png)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_image<P: AsRef<Path>>(
        image: &RgbaImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PartitionError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        let bytes = OutputFormatHandler::encode(image, format)?;
        std::fs::write(path_ref, bytes)
            .map_err(|e| PartitionError::file_io_error("write region image", path_ref, &e))?;

        log::debug!(
            "Saved {:?} region image to {}",
            format,
            path_ref.display()
        );
        Ok(())
    }

    /// Check if a file path has a supported input image extension
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| {
                matches!(
                    ext.as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif"
                )
            })
    }
}
