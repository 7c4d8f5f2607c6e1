//! Partition invariants checked over many images and lines
//!
//! Every pixel must end up opaque in exactly one region image, the two
//! images must reassemble into the source, and repeated runs must agree
//! byte for byte.

use image::{DynamicImage, Rgba, RgbaImage};
use image_line_split::{
    compositor::TRANSPARENT_PIXEL,
    config::{CoordinateMode, OutputFormat, PartitionConfig},
    error::Result,
    partition, partition_with_config,
    types::{Point, Region},
    Compositor,
};

fn textured(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 31 % 256) as u8,
            (y * 17 % 256) as u8,
            ((x + y) * 7 % 256) as u8,
            255,
        ])
    }))
}

fn absolute_lines(width: f64, height: f64) -> Vec<(Point, Point)> {
    vec![
        (Point::new(0.0, 0.0), Point::new(width, height)),
        (Point::new(width, 0.0), Point::new(0.0, height)),
        (Point::new(width / 2.0, 0.0), Point::new(width / 2.0, height)),
        (Point::new(0.0, height / 3.0), Point::new(width, height / 3.0)),
        (Point::new(1.0, 0.0), Point::new(width, height - 1.0)),
        (Point::new(0.0, height), Point::new(width / 4.0, 0.0)),
        (Point::new(0.3, 0.7), Point::new(width - 0.2, height / 2.0)),
    ]
}

#[test]
fn test_coverage_and_disjointness() -> Result<()> {
    for (width, height) in [(3, 2), (2, 3), (17, 9), (40, 25)] {
        let image = textured(width, height);
        let source = image.to_rgba8();
        for (p1, p2) in absolute_lines(f64::from(width), f64::from(height)) {
            let (first, second) = partition(&image, p1, p2, CoordinateMode::Absolute)?;
            assert_eq!(first.dimensions(), (width, height));
            assert_eq!(second.dimensions(), (width, height));

            for (x, y, original) in source.enumerate_pixels() {
                let a = first.get_pixel(x, y);
                let b = second.get_pixel(x, y);
                let in_first = a[3] > 0;
                let in_second = b[3] > 0;
                assert!(
                    in_first ^ in_second,
                    "pixel ({x},{y}) must be in exactly one region for {p1} -> {p2}"
                );
                if in_first {
                    assert_eq!(a, original);
                    assert_eq!(*b, TRANSPARENT_PIXEL);
                } else {
                    assert_eq!(b, original);
                    assert_eq!(*a, TRANSPARENT_PIXEL);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_reconstruction() -> Result<()> {
    let image = textured(23, 14);
    let config = PartitionConfig::default();
    for (p1, p2) in absolute_lines(23.0, 14.0) {
        let result = partition_with_config(&image, p1, p2, &config)?;
        assert_eq!(result.reconstruct()?, image.to_rgba8());
        assert_eq!(
            Compositor::overlay(&result.first, &result.second)?,
            image.to_rgba8()
        );
    }
    Ok(())
}

#[test]
fn test_scenario_vertical_line_on_left_edge() -> Result<()> {
    let image = textured(4, 4);
    let (first, second) = partition(
        &image,
        Point::new(0.0, 0.0),
        Point::new(0.0, 4.0),
        CoordinateMode::Absolute,
    )?;

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(*first.get_pixel(x, y), TRANSPARENT_PIXEL);
            assert_eq!(second.get_pixel(x, y), image.to_rgba8().get_pixel(x, y));
        }
    }
    Ok(())
}

#[test]
fn test_scenario_diagonal_two_by_two() -> Result<()> {
    let image = textured(2, 2);
    let result = partition_with_config(
        &image,
        Point::new(0.0, 0.0),
        Point::new(2.0, 2.0),
        &PartitionConfig::default(),
    )?;

    assert_eq!(result.masks.region_at(0, 0), Some(Region::First));
    assert_eq!(result.masks.region_at(0, 1), Some(Region::First));
    assert_eq!(result.masks.region_at(1, 1), Some(Region::First));
    assert_eq!(result.masks.region_at(1, 0), Some(Region::Second));
    assert_eq!(result.metadata.first_pixels, 3);
    assert_eq!(result.metadata.second_pixels, 1);
    Ok(())
}

#[test]
fn test_ties_go_to_first_region() -> Result<()> {
    let image = textured(4, 4);

    // x = 0.5 runs through the centers of column 0
    let forward = partition_with_config(
        &image,
        Point::new(0.5, 0.0),
        Point::new(0.5, 4.0),
        &PartitionConfig::default(),
    )?;
    let expected: Vec<bool> = (0..16).map(|i| i % 4 == 0).collect();
    assert_eq!(forward.masks.first.data, expected);

    // Reversed, the sign flips but the tied column stays in region 1
    let reversed = partition_with_config(
        &image,
        Point::new(0.5, 4.0),
        Point::new(0.5, 0.0),
        &PartitionConfig::default(),
    )?;
    assert_eq!(reversed.metadata.first_pixels, 16);
    Ok(())
}

#[test]
fn test_swapping_points_swaps_regions_off_the_line() -> Result<()> {
    let image = textured(12, 8);
    let (p1, p2) = (Point::new(0.2, 1.1), Point::new(11.3, 6.9));
    let (a1, a2) = partition(&image, p1, p2, CoordinateMode::Absolute)?;
    let (b1, b2) = partition(&image, p2, p1, CoordinateMode::Absolute)?;
    assert_eq!(a1, b2);
    assert_eq!(a2, b1);
    Ok(())
}

#[test]
fn test_fast_path_and_sequential_match_general_path() -> Result<()> {
    let image = textured(19, 11);
    let reference_config = PartitionConfig::builder()
        .fast_path(false)
        .parallel(false)
        .build()?;
    let fast_config = PartitionConfig::default();

    for (p1, p2) in [
        (Point::new(7.0, 0.0), Point::new(7.0, 11.0)),
        (Point::new(7.5, 11.0), Point::new(7.5, 0.0)),
        (Point::new(0.0, 5.5), Point::new(19.0, 5.5)),
        (Point::new(19.0, 4.0), Point::new(0.0, 4.0)),
    ] {
        let reference = partition_with_config(&image, p1, p2, &reference_config)?;
        let fast = partition_with_config(&image, p1, p2, &fast_config)?;
        assert!(fast.metadata.fast_path_used);
        assert!(!reference.metadata.fast_path_used);
        assert_eq!(reference.first, fast.first);
        assert_eq!(reference.second, fast.second);
    }
    Ok(())
}

#[test]
fn test_idempotent_encoded_output() -> Result<()> {
    let image = textured(30, 20);
    let config = PartitionConfig::default();
    let (p1, p2) = (Point::new(3.0, 0.0), Point::new(27.0, 20.0));

    let first_run = partition_with_config(&image, p1, p2, &config)?;
    let second_run = partition_with_config(&image, p1, p2, &config)?;
    for region in [Region::First, Region::Second] {
        assert_eq!(
            first_run.to_bytes(region, OutputFormat::Png)?,
            second_run.to_bytes(region, OutputFormat::Png)?
        );
    }
    Ok(())
}

#[test]
fn test_normalized_points_match_absolute_points() -> Result<()> {
    let image = textured(20, 10);
    let absolute = partition(
        &image,
        Point::new(0.0, 2.0),
        Point::new(20.0, 8.0),
        CoordinateMode::Absolute,
    )?;
    let normalized = partition(
        &image,
        Point::new(0.0, 0.2),
        Point::new(1.0, 0.8),
        CoordinateMode::Normalized,
    )?;
    assert_eq!(absolute, normalized);
    Ok(())
}
