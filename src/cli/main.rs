//! Image partition CLI tool
//!
//! Splits each input image into two transparent cutouts along the line
//! through `--point1` and `--point2`.

use super::config::CliConfigBuilder;
use crate::{
    compositor::Compositor,
    processor::PartitionProcessor,
    services::ImageIOService,
    tracing_config::{events, init_cli_tracing, spans, TracingFormat},
    types::{PartitionResult, Point, Region},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, Instrument};

/// Split images into two region cutouts along a line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "image-line-split")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image files (use "-" for stdin)
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<String>,

    /// First point of the line, as "X,Y"
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    pub point1: Point,

    /// Second point of the line, as "X,Y"
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    pub point2: Point,

    /// How the point coordinates are encoded
    #[arg(long, value_enum, default_value_t = CliCoordinateMode::Absolute)]
    pub coordinates: CliCoordinateMode,

    /// What to do with points outside the image
    #[arg(long, value_enum, default_value_t = CliBoundsPolicy::Reject)]
    pub bounds: CliBoundsPolicy,

    /// Output directory [default: next to each input, or the current directory for stdin]
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// Print both cutouts as base64 PNG JSON on stdout (files are written only with --output)
    #[arg(long)]
    pub json: bool,

    /// Check that the two cutouts reassemble into the input
    #[arg(long)]
    pub verify: bool,

    /// Disable parallel row evaluation
    #[arg(long)]
    pub sequential: bool,

    /// Disable the axis-aligned fast path
    #[arg(long)]
    pub no_fast_path: bool,

    /// Minimum distance between the points, in the chosen coordinate space
    #[arg(long, value_name = "D")]
    pub min_distance: Option<f64>,

    /// Also write both region masks as grayscale PNGs
    #[arg(long)]
    pub save_masks: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output style on stderr
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliCoordinateMode {
    Absolute,
    Normalized,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBoundsPolicy {
    Reject,
    Clamp,
    Allow,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Tiff,
    Rgba8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored, human-readable
    Console,
    /// No colors, one line per event
    Compact,
    /// Structured JSON lines
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    run(&cli)
        .instrument(spans::session(&session_id, cli.input.len()))
        .await
}

async fn run(cli: &Cli) -> Result<()> {
    CliConfigBuilder::validate_cli(cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;

    info!(
        "Splitting along {} -> {} ({} coordinates, {} bounds)",
        cli.point1, cli.point2, config.coordinate_mode, config.bounds_policy
    );

    let processor = PartitionProcessor::new(config).context("Failed to create processor")?;

    let start_time = Instant::now();
    let (processed_count, failed_count) = process_inputs(cli, &processor)
        .instrument(spans::batch_processing(cli.input.len()))
        .await?;
    info!(
        "Processed {} image(s) in {:.2}s",
        processed_count,
        start_time.elapsed().as_secs_f64()
    );

    if failed_count > 0 {
        anyhow::bail!("{failed_count} of {} input(s) failed", cli.input.len());
    }
    Ok(())
}

/// Process every input, returning (processed, failed) counts
async fn process_inputs(cli: &Cli, processor: &PartitionProcessor) -> Result<(usize, usize)> {
    let file_count = cli.input.len();

    let progress = if file_count > 1 {
        let pb = ProgressBar::new(file_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut processed_count = 0;
    let mut failed_count = 0;

    for input in &cli.input {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Processing {input}"));
        }

        let span = spans::file_processing(Path::new(input), &format!("{:?}", cli.format));
        match process_single_input(cli, processor, input)
            .instrument(span)
            .await
        {
            Ok(()) => processed_count += 1,
            Err(e) => {
                error!("Failed to process {}: {:#}", input, e);
                events::error_with_context(&*e, input);
                failed_count += 1;
            },
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Processed: {processed_count}, Failed: {failed_count}"
        ));
    }

    if failed_count > 0 {
        warn!("Some inputs failed. Processed: {processed_count}, Failed: {failed_count}");
    }

    Ok((processed_count, failed_count))
}

/// Load one input, partition it and emit the requested outputs
async fn process_single_input(cli: &Cli, processor: &PartitionProcessor, input: &str) -> Result<()> {
    let (image, stem, default_dir) = load_input(input).await?;

    let mut result = processor
        .process_image(&image, cli.point1, cli.point2)
        .with_context(|| format!("Failed to partition {input}"))?;

    if cli.verify {
        verify_reconstruction(&image, &result)
            .with_context(|| format!("Verification failed for {input}"))?;
        debug!(input, "Cutouts reassemble into the input");
    }

    if cli.json {
        let encoded = result.to_encoded().context("Failed to encode region images")?;
        println!(
            "{}",
            serde_json::to_string(&encoded).context("Failed to serialize result")?
        );
    }

    let output_dir = match (&cli.output, cli.json) {
        (Some(dir), _) => Some(dir.clone()),
        (None, false) => Some(default_dir),
        (None, true) => None,
    };

    if let Some(dir) = output_dir {
        let format = processor.config().output_format;
        let (first_path, second_path) = result
            .save(&dir, &stem, format)
            .with_context(|| format!("Failed to save region images to {}", dir.display()))?;
        info!(
            "{} -> {}, {}",
            input,
            first_path.display(),
            second_path.display()
        );

        if cli.save_masks {
            for region in [Region::First, Region::Second] {
                let mask_path = dir.join(format!("{stem}_{region}_mask.png"));
                result
                    .masks
                    .mask(region)
                    .save_png(&mask_path)
                    .with_context(|| format!("Failed to save mask {}", mask_path.display()))?;
            }
        }
    }

    let stats = result.masks.statistics();
    info!(
        "{}: region1 {} px ({:.1}%), region2 {} px ({:.1}%)",
        input,
        stats.first_pixels,
        stats.first_ratio * 100.0,
        stats.second_pixels,
        stats.second_ratio * 100.0
    );
    info!("{}", result.timing_summary());
    events::performance_metric("partition", result.metadata.timings.total_ms);

    Ok(())
}

/// Decode an input, returning the image, the output file stem and the default output directory
async fn load_input(input: &str) -> Result<(DynamicImage, String, PathBuf)> {
    let decode_start = Instant::now();

    let loaded = if input == "-" {
        events::progress("Reading image from stdin");
        let image = ImageIOService::load_from_reader(tokio::io::stdin())
            .await
            .context("Failed to read image from stdin")?;
        (image, "stdin".to_string(), PathBuf::from("."))
    } else {
        let path = Path::new(input);
        if !ImageIOService::is_supported_format(path) {
            events::warning_with_recommendation(
                &format!("{} has an unrecognized extension", path.display()),
                "use .png, .jpg, .tiff or .webp; falling back to content detection",
            );
        }
        let image = ImageIOService::load_image(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        (image, stem, dir)
    };

    debug!(
        input,
        decode_ms = decode_start.elapsed().as_millis() as u64,
        "Decoded input"
    );
    Ok(loaded)
}

/// Rebuild the source from both cutouts and compare it with the decoded input
fn verify_reconstruction(image: &DynamicImage, result: &PartitionResult) -> Result<()> {
    if !result.masks.is_partition() {
        anyhow::bail!("region masks overlap or leave pixels unassigned");
    }
    let rebuilt = result.reconstruct()?;
    if rebuilt != Compositor::promote(image) {
        anyhow::bail!("reassembled image differs from the input");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "image-line-split",
            "a.png",
            "b.jpg",
            "--point1",
            "-5,2",
            "--point2",
            "0.5,0.75",
            "--coordinates",
            "normalized",
            "--bounds",
            "clamp",
            "-f",
            "rgba8",
            "--json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.input, vec!["a.png", "b.jpg"]);
        assert_eq!(cli.point1, Point::new(-5.0, 2.0));
        assert_eq!(cli.point2, Point::new(0.5, 0.75));
        assert_eq!(cli.coordinates, CliCoordinateMode::Normalized);
        assert_eq!(cli.bounds, CliBoundsPolicy::Clamp);
        assert_eq!(cli.format, CliOutputFormat::Rgba8);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, CliLogFormat::Console);
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from([
            "image-line-split",
            "a.png",
            "--point1",
            "0,0",
            "--point2",
            "1,1",
            "--log-format",
            "compact",
        ])
        .unwrap();
        assert_eq!(cli.log_format, CliLogFormat::Compact);
        assert_eq!(TracingFormat::from(cli.log_format), TracingFormat::Compact);

        assert!(Cli::try_parse_from([
            "image-line-split",
            "a.png",
            "--point1",
            "0,0",
            "--point2",
            "1,1",
            "--log-format",
            "fancy",
        ])
        .is_err());
    }

    #[test]
    fn test_points_are_required() {
        assert!(Cli::try_parse_from(["image-line-split", "a.png", "--point1", "0,0"]).is_err());
        assert!(
            Cli::try_parse_from(["image-line-split", "a.png", "--point1", "0", "--point2", "1,1"])
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_single_input_writes_both_cutouts() {
        use image::{Rgba, RgbaImage};

        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]))
            .save(&input)
            .unwrap();
        let input = input.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "image-line-split",
            input.as_str(),
            "--point1",
            "2,0",
            "--point2",
            "2,4",
            "--verify",
            "--save-masks",
        ])
        .unwrap();
        let processor =
            PartitionProcessor::new(CliConfigBuilder::from_cli(&cli).unwrap()).unwrap();

        process_single_input(&cli, &processor, &input).await.unwrap();

        for name in [
            "photo_region1.png",
            "photo_region2.png",
            "photo_region1_mask.png",
            "photo_region2_mask.png",
        ] {
            assert!(temp_dir.path().join(name).exists(), "missing {name}");
        }
        let first = image::open(temp_dir.path().join("photo_region1.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(first.get_pixel(0, 0)[3], 255);
        assert_eq!(first.get_pixel(3, 0)[3], 0);
    }
}
