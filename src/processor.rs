//! Unified partition processor
//!
//! `PartitionProcessor` runs the three stages (line resolution, region
//! classification, compositing) behind one entry point and records timings
//! and metadata. Both the library functions and the CLI go through it.

use crate::{
    classifier::RegionClassifier,
    compositor::Compositor,
    config::PartitionConfig,
    error::Result,
    line::resolve_line,
    services::ImageIOService,
    types::{PartitionMetadata, PartitionResult, PartitionTimings, Point},
};
use chrono::Utc;
use image::{DynamicImage, GenericImageView};
use instant::Instant;
use std::path::Path;
use tracing::{debug, info, instrument, span, Level};

/// Runs partitions with a fixed configuration
#[derive(Debug, Clone)]
pub struct PartitionProcessor {
    config: PartitionConfig,
    classifier: RegionClassifier,
    compositor: Compositor,
}

impl PartitionProcessor {
    /// Create a processor, validating the configuration
    ///
    /// # Errors
    /// - `InvalidConfig` when the configuration fails validation
    pub fn new(config: PartitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: RegionClassifier::from_config(&config),
            compositor: Compositor::from_config(&config),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Partition a decoded image along the line through `point1` and `point2`
    ///
    /// # Errors
    /// - `InvalidImage` for an empty image
    /// - `InvalidPoint`, `OutOfBounds` or `DegenerateLine` for unusable points
    ///
    /// # Examples
    /// ```rust
    /// use image_line_split::{PartitionConfig, PartitionProcessor, Point};
    /// use image::{DynamicImage, RgbImage};
    ///
    /// let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
    /// let processor = PartitionProcessor::new(PartitionConfig::default())?;
    /// let result = processor.process_image(&image, Point::new(2.0, 0.0), Point::new(2.0, 4.0))?;
    /// assert_eq!(result.metadata.first_pixels, 8);
    /// # Ok::<(), image_line_split::PartitionError>(())
    /// ```
    #[instrument(
        skip(self, image),
        fields(
            dimensions = %format!("{}x{}", image.width(), image.height()),
            mode = %self.config.coordinate_mode
        )
    )]
    pub fn process_image(
        &self,
        image: &DynamicImage,
        point1: Point,
        point2: Point,
    ) -> Result<PartitionResult> {
        let total_start = Instant::now();
        let (width, height) = image.dimensions();
        let mut timings = PartitionTimings::default();

        let line = {
            let _span = span!(Level::DEBUG, "line", width, height).entered();
            let line_start = Instant::now();
            let line = resolve_line(point1, point2, width, height, &self.config)?;
            timings.line_ms = line_start.elapsed().as_millis() as u64;
            line
        };

        let classification = {
            let _span = span!(
                Level::DEBUG,
                "classification",
                orientation = ?line.orientation(),
                parallel = self.config.parallel
            )
            .entered();
            let classify_start = Instant::now();
            let classification = self.classifier.classify(&line, width, height)?;
            timings.classification_ms = classify_start.elapsed().as_millis() as u64;
            classification
        };

        let (first, second) = {
            let _span = span!(Level::DEBUG, "compositing", width, height).entered();
            let compose_start = Instant::now();
            let source = Compositor::promote(image);
            let images = self.compositor.compose(&source, &classification.masks)?;
            timings.compositing_ms = compose_start.elapsed().as_millis() as u64;
            images
        };

        timings.total_ms = total_start.elapsed().as_millis() as u64;
        let stats = classification.masks.statistics();

        info!(
            first_pixels = stats.first_pixels,
            second_pixels = stats.second_pixels,
            fast_path = classification.fast_path_used,
            total_ms = timings.total_ms,
            "Partitioned image"
        );

        let metadata = PartitionMetadata {
            dimensions: (width, height),
            coordinate_mode: self.config.coordinate_mode,
            bounds_policy: self.config.bounds_policy,
            fast_path_used: classification.fast_path_used,
            first_pixels: stats.first_pixels,
            second_pixels: stats.second_pixels,
            boundary_segment: line.boundary_segment(width, height),
            timings,
            completed_at: Utc::now(),
        };

        Ok(PartitionResult {
            first,
            second,
            masks: classification.masks,
            line,
            metadata,
        })
    }

    /// Decode image bytes, then partition
    ///
    /// # Errors
    /// - `InvalidImage` for empty or undecodable input
    /// - any error from [`Self::process_image`]
    pub fn process_bytes(
        &self,
        image_bytes: &[u8],
        point1: Point,
        point2: Point,
    ) -> Result<PartitionResult> {
        let decode_start = Instant::now();
        let image = ImageIOService::load_from_bytes(image_bytes)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(bytes = image_bytes.len(), decode_ms, "Decoded input image");

        let mut result = self.process_image(&image, point1, point2)?;
        Self::record_decode(&mut result, decode_ms);
        Ok(result)
    }

    /// Load an image file, then partition
    ///
    /// # Errors
    /// - `Io` when the file cannot be read, `Processing` when decoding fails
    /// - any error from [`Self::process_image`]
    pub fn process_file<P: AsRef<Path>>(
        &self,
        input_path: P,
        point1: Point,
        point2: Point,
    ) -> Result<PartitionResult> {
        let input_path = input_path.as_ref();
        let decode_start = Instant::now();
        let image = ImageIOService::load_image(input_path)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(path = %input_path.display(), decode_ms, "Loaded input image");

        let mut result = self.process_image(&image, point1, point2)?;
        Self::record_decode(&mut result, decode_ms);
        Ok(result)
    }

    /// Read an async stream to the end, then partition the decoded image
    ///
    /// # Errors
    /// - `Io` when reading the stream fails, `InvalidImage` when decoding fails
    /// - any error from [`Self::process_image`]
    pub async fn process_reader<R: tokio::io::AsyncRead + Unpin>(
        &self,
        reader: R,
        point1: Point,
        point2: Point,
    ) -> Result<PartitionResult> {
        let decode_start = Instant::now();
        let image = ImageIOService::load_from_reader(reader).await?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;
        debug!(decode_ms, "Decoded streamed image");

        let mut result = self.process_image(&image, point1, point2)?;
        Self::record_decode(&mut result, decode_ms);
        Ok(result)
    }

    fn record_decode(result: &mut PartitionResult, decode_ms: u64) {
        let timings = &mut result.metadata.timings;
        timings.image_decode_ms = decode_ms;
        timings.total_ms += decode_ms;
    }
}
