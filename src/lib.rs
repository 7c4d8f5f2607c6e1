#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Image Line Split
//!
//! A geometric image partition engine: given an image and two points, it draws
//! the infinite line through them and returns two RGBA images. The first keeps
//! the pixels on one side of the line, the second keeps the rest; everything
//! else is fully transparent.
//!
//! ## Features
//!
//! - **Exact partition**: every pixel lands in exactly one region image
//! - **Deterministic**: pixel centers are tested, ties go to region 1
//! - **Coordinate modes**: absolute pixel coordinates or normalized `[0, 1]`
//! - **Parallel**: rows are classified and composited with `rayon`
//! - **Fast path**: vertical and horizontal lines skip per-pixel evaluation
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use image_line_split::{partition, CoordinateMode, Point};
//! use image::{DynamicImage, RgbImage};
//!
//! let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
//! let (left, right) = partition(
//!     &image,
//!     Point::new(2.0, 0.0),
//!     Point::new(2.0, 4.0),
//!     CoordinateMode::Absolute,
//! )?;
//! assert_eq!(left.get_pixel(0, 0)[3], 255);
//! assert_eq!(right.get_pixel(0, 0)[3], 0);
//! # Ok::<(), image_line_split::PartitionError>(())
//! ```
//!
//! ## Region convention
//!
//! For points `(x1, y1)` and `(x2, y2)` the line is `a*x + b*y + c = 0` with
//! `a = y2 - y1`, `b = x1 - x2`, `c = x2*y1 - x1*y2`. Pixel `(x, y)` belongs to
//! region 1 when `a*(x+0.5) + b*(y+0.5) + c <= 0`. Swapping the points swaps
//! the two regions.
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface, progress bar and tracing subscriber
//! - `webp-support` (default): WebP input support
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! image-line-split = { version = "0.1", default-features = false }
//! ```

pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod line;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

use image::{DynamicImage, RgbaImage};
use tokio::io::AsyncRead;

// Public API exports
pub use classifier::{Classification, RegionClassifier};
pub use compositor::{Compositor, TRANSPARENT_PIXEL};
pub use config::{
    BoundsPolicy, CoordinateMode, OutputFormat, PartitionConfig, PartitionConfigBuilder,
    DEFAULT_ABSOLUTE_EPSILON, DEFAULT_NORMALIZED_EPSILON,
};
pub use error::{PartitionError, Result};
pub use line::{resolve_line, Line, LineOrientation};
pub use processor::PartitionProcessor;
pub use services::{ImageIOService, OutputFormatHandler};
pub use types::{
    EncodedPartition, MaskPair, MaskStatistics, PartitionMetadata, PartitionResult,
    PartitionTimings, Point, Region, RegionMask,
};

#[cfg(feature = "cli")]
pub use tracing_config::{
    cli_tracing_config, events, init_cli_tracing, spans, TracingConfig, TracingFormat,
};

/// Split an image into two region images along the line through two points
///
/// Uses the default configuration for everything but the coordinate mode:
/// points may not both lie outside the image, and must be at least 1 pixel
/// (absolute) or `1e-6` (normalized) apart.
///
/// # Returns
///
/// `(region1, region2)`, both with the source dimensions. A pixel that is
/// opaque in one is `(255, 255, 255, 0)` in the other.
///
/// # Errors
/// - `InvalidImage` for a zero-sized image
/// - `InvalidPoint` for non-finite coordinates
/// - `OutOfBounds` when both points are outside the image
/// - `DegenerateLine` when the points coincide
pub fn partition(
    image: &DynamicImage,
    point1: Point,
    point2: Point,
    coordinate_mode: CoordinateMode,
) -> Result<(RgbaImage, RgbaImage)> {
    let config = PartitionConfig {
        coordinate_mode,
        ..PartitionConfig::default()
    };
    partition_with_config(image, point1, point2, &config).map(PartitionResult::into_images)
}

/// Partition a decoded image with a custom configuration
///
/// Returns the full [`PartitionResult`] with masks, line and timing metadata.
///
/// ```rust
/// use image_line_split::{partition_with_config, BoundsPolicy, PartitionConfig, Point};
/// use image::{DynamicImage, RgbaImage};
///
/// let image = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
/// let config = PartitionConfig::builder()
///     .bounds_policy(BoundsPolicy::Clamp)
///     .build()?;
/// let result = partition_with_config(&image, Point::new(-5.0, 0.0), Point::new(20.0, 10.0), &config)?;
/// assert_eq!(result.metadata.first_pixels + result.metadata.second_pixels, 100);
/// # Ok::<(), image_line_split::PartitionError>(())
/// ```
pub fn partition_with_config(
    image: &DynamicImage,
    point1: Point,
    point2: Point,
    config: &PartitionConfig,
) -> Result<PartitionResult> {
    PartitionProcessor::new(config.clone())?.process_image(image, point1, point2)
}

/// Partition an encoded image (PNG, JPEG, TIFF, WebP)
///
/// Suited to request handlers that receive the image as an upload body.
///
/// ```rust,no_run
/// use image_line_split::{partition_from_bytes, PartitionConfig, Point, Region};
///
/// # fn example(upload: Vec<u8>) -> anyhow::Result<()> {
/// let result = partition_from_bytes(
///     &upload,
///     Point::new(0.0, 0.0),
///     Point::new(640.0, 480.0),
///     &PartitionConfig::default(),
/// )?;
/// let encoded = result.to_encoded()?;
/// println!("{}", serde_json::to_string(&encoded)?);
/// # Ok(())
/// # }
/// ```
pub fn partition_from_bytes(
    image_bytes: &[u8],
    point1: Point,
    point2: Point,
    config: &PartitionConfig,
) -> Result<PartitionResult> {
    PartitionProcessor::new(config.clone())?.process_bytes(image_bytes, point1, point2)
}

/// Partition an image read from an async stream
///
/// ```rust,no_run
/// use image_line_split::{partition_from_reader, CoordinateMode, PartitionConfig, Point, OutputFormat};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = PartitionConfig::builder()
///     .coordinate_mode(CoordinateMode::Normalized)
///     .build()?;
/// let file = File::open("photo.jpg").await?;
/// let mut result =
///     partition_from_reader(file, Point::new(0.5, 0.0), Point::new(0.5, 1.0), &config).await?;
/// result.save("out", "photo", OutputFormat::Png)?;
/// # Ok(())
/// # }
/// ```
pub async fn partition_from_reader<R: AsyncRead + Unpin>(
    reader: R,
    point1: Point,
    point2: Point,
    config: &PartitionConfig,
) -> Result<PartitionResult> {
    PartitionProcessor::new(config.clone())?
        .process_reader(reader, point1, point2)
        .await
}
