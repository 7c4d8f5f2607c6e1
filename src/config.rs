//! Configuration types for image partition operations

use serde::{Deserialize, Serialize};

/// Default minimum distance between the two points in normalized space
pub const DEFAULT_NORMALIZED_EPSILON: f64 = 1e-6;

/// Default minimum distance between the two points in absolute pixel space
pub const DEFAULT_ABSOLUTE_EPSILON: f64 = 1.0;

/// Coordinate encoding used by the caller for the two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Pixel coordinates, `[0, width] x [0, height]`
    Absolute,
    /// Fractions of the image width and height, `[0, 1] x [0, 1]`
    Normalized,
}

impl Default for CoordinateMode {
    fn default() -> Self {
        Self::Absolute
    }
}

impl std::fmt::Display for CoordinateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute => write!(f, "absolute"),
            Self::Normalized => write!(f, "normalized"),
        }
    }
}

impl CoordinateMode {
    /// Minimum point distance used when the configuration does not override it
    #[must_use]
    pub fn default_epsilon(self) -> f64 {
        match self {
            Self::Absolute => DEFAULT_ABSOLUTE_EPSILON,
            Self::Normalized => DEFAULT_NORMALIZED_EPSILON,
        }
    }
}

/// What to do with points outside the image's coordinate domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Fail with `OutOfBounds` when both points are outside the domain
    Reject,
    /// Clamp every point into the domain, then re-check degeneracy
    Clamp,
    /// Use the points as given
    Allow,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        Self::Reject
    }
}

impl std::fmt::Display for BoundsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Clamp => write!(f, "clamp"),
            Self::Allow => write!(f, "allow"),
        }
    }
}

/// Output encoding for region images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

/// Configuration for partition operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Coordinate encoding of the input points
    pub coordinate_mode: CoordinateMode,

    /// Handling of points outside the image domain
    pub bounds_policy: BoundsPolicy,

    /// Minimum distance between the points, in the caller's coordinate space
    /// (None = mode default)
    pub min_point_distance: Option<f64>,

    /// Evaluate rows in parallel
    pub parallel: bool,

    /// Use the axis-aligned fast path for vertical and horizontal lines
    pub fast_path: bool,

    /// Output format for encoded region images
    pub output_format: OutputFormat,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            coordinate_mode: CoordinateMode::default(),
            bounds_policy: BoundsPolicy::default(),
            min_point_distance: None,
            parallel: true,
            fast_path: true,
            output_format: OutputFormat::default(),
        }
    }
}

impl PartitionConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use image_line_split::{BoundsPolicy, CoordinateMode, PartitionConfig};
    ///
    /// let config = PartitionConfig::builder()
    ///     .coordinate_mode(CoordinateMode::Normalized)
    ///     .bounds_policy(BoundsPolicy::Clamp)
    ///     .parallel(false)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.epsilon(), 1e-6);
    /// ```
    #[must_use]
    pub fn builder() -> PartitionConfigBuilder {
        PartitionConfigBuilder::default()
    }

    /// Minimum point distance in effect for this configuration
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.min_point_distance
            .unwrap_or_else(|| self.coordinate_mode.default_epsilon())
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - `min_point_distance` is not finite or not strictly positive
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(distance) = self.min_point_distance {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(crate::error::PartitionError::config_value_error(
                    "min_point_distance",
                    distance,
                    "> 0",
                    Some(self.coordinate_mode.default_epsilon()),
                ));
            }
        }

        Ok(())
    }
}

/// Builder for `PartitionConfig`
#[derive(Debug, Default)]
pub struct PartitionConfigBuilder {
    config: PartitionConfig,
}

impl PartitionConfigBuilder {
    /// Set coordinate mode
    #[must_use]
    pub fn coordinate_mode(mut self, mode: CoordinateMode) -> Self {
        self.config.coordinate_mode = mode;
        self
    }

    /// Set bounds policy
    #[must_use]
    pub fn bounds_policy(mut self, policy: BoundsPolicy) -> Self {
        self.config.bounds_policy = policy;
        self
    }

    /// Override the minimum point distance
    #[must_use]
    pub fn min_point_distance(mut self, distance: f64) -> Self {
        self.config.min_point_distance = Some(distance);
        self
    }

    /// Enable or disable row-parallel evaluation
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Enable or disable the axis-aligned fast path
    #[must_use]
    pub fn fast_path(mut self, fast_path: bool) -> Self {
        self.config.fast_path = fast_path;
        self
    }

    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Configuration validation failures
    pub fn build(self) -> crate::Result<PartitionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
