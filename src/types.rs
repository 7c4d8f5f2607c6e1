//! Core types for image partition operations

use crate::{
    compositor::Compositor,
    config::{BoundsPolicy, CoordinateMode, OutputFormat},
    error::{PartitionError, Result},
    line::Line,
    services::{ImageIOService, OutputFormatHandler},
};
use chrono::{DateTime, Utc};
use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// A point in either absolute pixel or normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether the point lies inside `[0, max_x] x [0, max_y]`, edges included
    #[must_use]
    pub fn within(&self, max_x: f64, max_y: f64) -> bool {
        (0.0..=max_x).contains(&self.x) && (0.0..=max_y).contains(&self.y)
    }

    /// Clamp the point into `[0, max_x] x [0, max_y]`
    #[must_use]
    pub fn clamped(&self, max_x: f64, max_y: f64) -> Self {
        Self::new(self.x.clamp(0.0, max_x), self.y.clamp(0.0, max_y))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl std::str::FromStr for Point {
    type Err = PartitionError;

    /// Parse `"x,y"`
    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| PartitionError::invalid_point(format!("expected 'x,y', got '{s}'")))?;
        let parse = |value: &str| {
            value.trim().parse::<f64>().map_err(|e| {
                PartitionError::invalid_point(format!("'{}' is not a number: {}", value.trim(), e))
            })
        };
        Ok(Self::new(parse(x)?, parse(y)?))
    }
}

/// One of the two half-planes produced by a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Pixels with `line_value <= 0`, including pixels exactly on the line
    First,
    /// Pixels with `line_value > 0`
    Second,
}

impl Region {
    /// 1-based region number
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region{}", self.number())
    }
}

/// Boolean membership grid for one region, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    /// Membership per pixel, index `y * width + x`
    pub data: Vec<bool>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),

    /// Region this mask describes
    pub region: Region,
}

impl RegionMask {
    #[must_use]
    pub fn new(data: Vec<bool>, dimensions: (u32, u32), region: Region) -> Self {
        Self {
            data,
            dimensions,
            region,
        }
    }

    /// Membership of the pixel at `(x, y)`; false outside the grid
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (width, height) = self.dimensions;
        if x >= width || y >= height {
            return false;
        }
        self.data
            .get(y as usize * width as usize + x as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Number of pixels in the region
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&inside| inside).count()
    }

    /// Render as a grayscale image: 255 inside, 0 outside
    pub fn to_image(&self) -> Result<GrayImage> {
        let (width, height) = self.dimensions;
        let data = self
            .data
            .iter()
            .map(|&inside| if inside { 255 } else { 0 })
            .collect();
        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| PartitionError::processing("Failed to create image from mask data"))
    }

    /// Save mask as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let image = self.to_image()?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Build a mask from a grayscale image, treating any non-zero value as inside
    #[must_use]
    pub fn from_image(image: &GrayImage, region: Region) -> Self {
        let data = image.pixels().map(|Luma([value])| *value > 0).collect();
        Self::new(data, image.dimensions(), region)
    }
}

/// The two complementary masks produced by one classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPair {
    pub first: RegionMask,
    pub second: RegionMask,
}

impl MaskPair {
    #[must_use]
    pub fn new(first: RegionMask, second: RegionMask) -> Self {
        Self { first, second }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.first.dimensions
    }

    /// Mask of the given region
    #[must_use]
    pub fn mask(&self, region: Region) -> &RegionMask {
        match region {
            Region::First => &self.first,
            Region::Second => &self.second,
        }
    }

    /// Region owning the pixel at `(x, y)`, None outside the grid or if the pair is broken
    #[must_use]
    pub fn region_at(&self, x: u32, y: u32) -> Option<Region> {
        match (self.first.contains(x, y), self.second.contains(x, y)) {
            (true, false) => Some(Region::First),
            (false, true) => Some(Region::Second),
            _ => None,
        }
    }

    /// Every pixel belongs to exactly one mask
    #[must_use]
    pub fn is_partition(&self) -> bool {
        self.first.dimensions == self.second.dimensions
            && self.first.data.len() == self.second.data.len()
            && self
                .first
                .data
                .iter()
                .zip(&self.second.data)
                .all(|(a, b)| a != b)
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.first.data.len();
        let first_pixels = self.first.count();
        let second_pixels = self.second.count();
        let ratio = |count: usize| {
            if total_pixels == 0 {
                0.0
            } else {
                count as f64 / total_pixels as f64
            }
        };

        MaskStatistics {
            total_pixels,
            first_pixels,
            second_pixels,
            first_ratio: ratio(first_pixels),
            second_ratio: ratio(second_pixels),
        }
    }
}

/// Pixel counts of a mask pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub first_pixels: usize,
    pub second_pixels: usize,
    pub first_ratio: f64,
    pub second_ratio: f64,
}

/// Timing breakdown for a partition, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTimings {
    /// Decoding the input bytes (0 when a decoded image was supplied)
    pub image_decode_ms: u64,

    /// Point resolution and line canonicalization
    pub line_ms: u64,

    /// Per-pixel side-of-line classification
    pub classification_ms: u64,

    /// Alpha promotion and compositing of both region images
    pub compositing_ms: u64,

    /// Encoding the region images (if saved or encoded)
    pub image_encode_ms: Option<u64>,

    /// Total end-to-end time
    pub total_ms: u64,
}

impl PartitionTimings {
    /// Time not attributed to any measured stage
    #[must_use]
    pub fn other_overhead_ms(&self) -> u64 {
        let measured = self.image_decode_ms
            + self.line_ms
            + self.classification_ms
            + self.compositing_ms
            + self.image_encode_ms.unwrap_or(0);
        self.total_ms.saturating_sub(measured)
    }
}

/// Metadata about one partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionMetadata {
    /// Source image dimensions (width, height)
    pub dimensions: (u32, u32),

    /// Coordinate encoding of the caller's points
    pub coordinate_mode: CoordinateMode,

    /// Bounds policy applied to the points
    pub bounds_policy: BoundsPolicy,

    /// Whether the axis-aligned fast path filled the masks
    pub fast_path_used: bool,

    /// Pixels assigned to region 1
    pub first_pixels: usize,

    /// Pixels assigned to region 2
    pub second_pixels: usize,

    /// Where the line crosses the image rectangle, if it does
    pub boundary_segment: Option<(Point, Point)>,

    /// Detailed timing breakdown
    pub timings: PartitionTimings,

    /// When the partition finished
    pub completed_at: DateTime<Utc>,
}

/// Result of a partition: both region images plus the masks and line that produced them
#[derive(Debug, Clone)]
pub struct PartitionResult {
    /// Region 1 cutout (`line_value <= 0`)
    pub first: RgbaImage,

    /// Region 2 cutout (`line_value > 0`)
    pub second: RgbaImage,

    /// The mask pair used for compositing
    pub masks: MaskPair,

    /// Canonical line in absolute pixel space
    pub line: Line,

    /// Processing metadata
    pub metadata: PartitionMetadata,
}

impl PartitionResult {
    /// Region image for the given region
    #[must_use]
    pub fn region(&self, region: Region) -> &RgbaImage {
        match region {
            Region::First => &self.first,
            Region::Second => &self.second,
        }
    }

    /// Consume the result, keeping only the two region images
    #[must_use]
    pub fn into_images(self) -> (RgbaImage, RgbaImage) {
        (self.first, self.second)
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.metadata.dimensions
    }

    /// Encode one region image in the given format
    pub fn to_bytes(&self, region: Region, format: OutputFormat) -> Result<Vec<u8>> {
        OutputFormatHandler::encode(self.region(region), format)
    }

    /// Encode one region image as base64 PNG
    pub fn to_base64(&self, region: Region) -> Result<String> {
        OutputFormatHandler::to_base64_png(self.region(region))
    }

    /// Transport form with both images as base64 PNG
    pub fn to_encoded(&self) -> Result<EncodedPartition> {
        Ok(EncodedPartition {
            image1: self.to_base64(Region::First)?,
            image2: self.to_base64(Region::Second)?,
            width: self.metadata.dimensions.0,
            height: self.metadata.dimensions.1,
            first_pixels: self.metadata.first_pixels,
            second_pixels: self.metadata.second_pixels,
            line: self.line.clone(),
            boundary_segment: self.metadata.boundary_segment,
        })
    }

    /// Save both region images as `<stem>_region1.<ext>` and `<stem>_region2.<ext>` in `dir`
    ///
    /// Records the encoding time in the metadata.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        dir: P,
        stem: &str,
        format: OutputFormat,
    ) -> Result<(PathBuf, PathBuf)> {
        let encode_start = instant::Instant::now();
        let extension = OutputFormatHandler::get_extension(format);
        let first_path = dir
            .as_ref()
            .join(format!("{stem}_{}.{extension}", Region::First));
        let second_path = dir
            .as_ref()
            .join(format!("{stem}_{}.{extension}", Region::Second));

        ImageIOService::save_image(&self.first, &first_path, format)?;
        ImageIOService::save_image(&self.second, &second_path, format)?;

        let encode_ms = encode_start.elapsed().as_millis() as u64;
        self.metadata.timings.image_encode_ms = Some(encode_ms);
        info!(
            first = %first_path.display(),
            second = %second_path.display(),
            encode_ms,
            "Saved region images"
        );

        Ok((first_path, second_path))
    }

    /// Rebuild the source image from the two region images
    pub fn reconstruct(&self) -> Result<RgbaImage> {
        Compositor::reconstruct(&self.first, &self.second, &self.masks)
    }

    /// Get timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.metadata.timings;
        let mut summary = format!(
            "Total: {}ms | Decode: {}ms | Line: {}ms | Classify: {}ms | Composite: {}ms",
            t.total_ms, t.image_decode_ms, t.line_ms, t.classification_ms, t.compositing_ms
        );

        if let Some(encode_ms) = t.image_encode_ms {
            summary.push_str(&format!(" | Encode: {}ms", encode_ms));
        }

        let other_ms = t.other_overhead_ms();
        if other_ms > 5 {
            summary.push_str(&format!(" | Other: {}ms", other_ms));
        }

        summary
    }
}

/// Serializable transport form of a partition: both images as base64 PNG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedPartition {
    pub image1: String,
    pub image2: String,
    pub width: u32,
    pub height: u32,
    pub first_pixels: usize,
    pub second_pixels: usize,
    pub line: Line,
    pub boundary_segment: Option<(Point, Point)>,
}
