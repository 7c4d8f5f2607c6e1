//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBoundsPolicy, CliCoordinateMode, CliOutputFormat};
use crate::config::{BoundsPolicy, CoordinateMode, OutputFormat, PartitionConfig};
use anyhow::{Context, Result};

/// Convert CLI arguments to a `PartitionConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `PartitionConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<PartitionConfig> {
        let coordinate_mode = match cli.coordinates {
            CliCoordinateMode::Absolute => CoordinateMode::Absolute,
            CliCoordinateMode::Normalized => CoordinateMode::Normalized,
        };

        let bounds_policy = match cli.bounds {
            CliBoundsPolicy::Reject => BoundsPolicy::Reject,
            CliBoundsPolicy::Clamp => BoundsPolicy::Clamp,
            CliBoundsPolicy::Allow => BoundsPolicy::Allow,
        };

        let output_format = match cli.format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
            CliOutputFormat::Rgba8 => OutputFormat::Rgba8,
        };

        let mut builder = PartitionConfig::builder()
            .coordinate_mode(coordinate_mode)
            .bounds_policy(bounds_policy)
            .output_format(output_format)
            .parallel(!cli.sequential)
            .fast_path(!cli.no_fast_path);

        if let Some(distance) = cli.min_distance {
            builder = builder.min_point_distance(distance);
        }

        builder.build().context("Invalid configuration")
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        for (name, point) in [("--point1", cli.point1), ("--point2", cli.point2)] {
            if !point.is_finite() {
                anyhow::bail!("{name} must have finite coordinates, got {point}");
            }
        }

        if cli.input.iter().filter(|input| *input == "-").count() > 1 {
            anyhow::bail!("stdin (-) can only be used once");
        }

        if let Some(output) = &cli.output {
            if output.is_file() {
                anyhow::bail!(
                    "Output path exists and is a file, not a directory: {}",
                    output.display()
                );
            }
        }

        if cli.save_masks && cli.json && cli.output.is_none() {
            anyhow::bail!("--save-masks with --json needs --output");
        }

        Ok(())
    }
}
