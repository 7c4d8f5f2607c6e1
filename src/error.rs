//! Error types for image partition operations

use crate::types::Point;
use thiserror::Error;

/// Result type alias for partition operations
pub type Result<T> = std::result::Result<T, PartitionError>;

/// Error taxonomy for the partition engine and its surrounding services
#[derive(Error, Debug)]
pub enum PartitionError {
    /// The two points coincide (or are closer than the configured epsilon), so no line is defined
    #[error("Degenerate line: points {point1} and {point2} are {distance} apart (minimum distance: {epsilon})")]
    DegenerateLine {
        point1: Point,
        point2: Point,
        distance: f64,
        epsilon: f64,
    },

    /// Zero-sized image, empty pixel buffer or mismatched dimensions
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Both points lie outside the image's coordinate domain
    #[error("Points {point1} and {point2} are both outside the {width}x{height} image domain")]
    OutOfBounds {
        point1: Point,
        point2: Point,
        width: u32,
        height: u32,
    },

    /// Point coordinates that cannot describe a line (NaN, infinite)
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors from the image crate
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Transport encoding errors
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Unexpected failures while processing
    #[error("Processing error: {0}")]
    Processing(String),
}

impl PartitionError {
    /// Create a new invalid image error
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new invalid point error
    pub fn invalid_point<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPoint(msg.into())
    }

    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Whether the failure was caused by caller input (maps to a 4xx at a service boundary)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DegenerateLine { .. }
                | Self::InvalidImage(_)
                | Self::OutOfBounds { .. }
                | Self::InvalidPoint(_)
                | Self::InvalidConfig(_)
        )
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_display() {
        let err = PartitionError::invalid_image("image has zero width");
        assert_eq!(err.to_string(), "Invalid image: image has zero width");

        let err = PartitionError::DegenerateLine {
            point1: Point::new(3.0, 4.0),
            point2: Point::new(3.0, 4.0),
            distance: 0.0,
            epsilon: 1.0,
        };
        let message = err.to_string();
        assert!(message.contains("(3, 4)"));
        assert!(message.contains("minimum distance: 1"));
    }

    #[test]
    fn test_client_error_classification() {
        let degenerate = PartitionError::DegenerateLine {
            point1: Point::new(0.0, 0.0),
            point2: Point::new(0.0, 0.0),
            distance: 0.0,
            epsilon: 1.0,
        };
        assert!(degenerate.is_client_error());

        let out_of_bounds = PartitionError::OutOfBounds {
            point1: Point::new(-5.0, -5.0),
            point2: Point::new(-1.0, -9.0),
            width: 4,
            height: 4,
        };
        assert!(out_of_bounds.is_client_error());
        assert!(PartitionError::invalid_point("NaN").is_client_error());

        assert!(!PartitionError::processing("buffer allocation").is_client_error());
        assert!(!PartitionError::encoding("png").is_client_error());
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err =
            PartitionError::file_io_error("write region image", Path::new("/out/a.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("write region image"));
        assert!(error_string.contains("/out/a.png"));

        let err = PartitionError::config_value_error("min_point_distance", -1.0, "> 0", Some(1.0));
        let error_string = err.to_string();
        assert!(error_string.contains("min_point_distance"));
        assert!(error_string.contains("-1"));
        assert!(error_string.contains("Recommended: 1"));

        let err = PartitionError::processing_stage_error(
            "compositing",
            "row buffer size mismatch",
            Some("640x480"),
        );
        let error_string = err.to_string();
        assert!(error_string.contains("compositing"));
        assert!(error_string.contains("640x480"));
    }
}
