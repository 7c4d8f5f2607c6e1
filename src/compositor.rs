//! Compositor: turns a mask pair into two RGBA region images

use crate::{
    config::PartitionConfig,
    error::{PartitionError, Result},
    types::{MaskPair, RegionMask},
};
use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

/// Value written to every pixel outside a region
pub const TRANSPARENT_PIXEL: Rgba<u8> = Rgba([255, 255, 255, 0]);

const CHANNELS: usize = 4;

/// Applies region masks to a source image
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    parallel: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Compositor {
    #[must_use]
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    #[must_use]
    pub fn from_config(config: &PartitionConfig) -> Self {
        Self::new(config.parallel)
    }

    /// Promote any image to RGBA8; missing alpha becomes fully opaque
    #[must_use]
    pub fn promote(image: &DynamicImage) -> RgbaImage {
        match image {
            DynamicImage::ImageRgba8(rgba) => rgba.clone(),
            other => other.to_rgba8(),
        }
    }

    /// Produce the region 1 and region 2 images
    ///
    /// # Errors
    /// - `InvalidImage` when the source is empty or the masks do not match its dimensions
    pub fn compose(&self, source: &RgbaImage, masks: &MaskPair) -> Result<(RgbaImage, RgbaImage)> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(PartitionError::invalid_image(format!(
                "source image is empty ({width}x{height})"
            )));
        }
        Self::check_mask(&masks.first, (width, height))?;
        Self::check_mask(&masks.second, (width, height))?;

        let row_bytes = width as usize * CHANNELS;
        let len = row_bytes * height as usize;
        let raw = source.as_raw();
        let src = raw.get(..len).ok_or_else(|| {
            PartitionError::invalid_image(format!(
                "pixel buffer holds {} bytes, expected {len}",
                raw.len()
            ))
        })?;

        let mut first = vec![0u8; len];
        let mut second = vec![0u8; len];
        let row_len = width as usize;

        if self.parallel {
            first
                .par_chunks_mut(row_bytes)
                .zip(second.par_chunks_mut(row_bytes))
                .zip(src.par_chunks(row_bytes))
                .zip(masks.first.data.par_chunks(row_len))
                .zip(masks.second.data.par_chunks(row_len))
                .for_each(|((((out1, out2), src_row), mask1), mask2)| {
                    compose_row(src_row, mask1, mask2, out1, out2);
                });
        } else {
            first
                .chunks_mut(row_bytes)
                .zip(second.chunks_mut(row_bytes))
                .zip(src.chunks(row_bytes))
                .zip(masks.first.data.chunks(row_len))
                .zip(masks.second.data.chunks(row_len))
                .for_each(|((((out1, out2), src_row), mask1), mask2)| {
                    compose_row(src_row, mask1, mask2, out1, out2);
                });
        }

        let first = RgbaImage::from_raw(width, height, first)
            .ok_or_else(|| PartitionError::processing("Failed to build region 1 image"))?;
        let second = RgbaImage::from_raw(width, height, second)
            .ok_or_else(|| PartitionError::processing("Failed to build region 2 image"))?;
        Ok((first, second))
    }

    /// Rebuild the source by taking every pixel from the image whose mask owns it
    ///
    /// # Errors
    /// - `InvalidImage` when dimensions disagree
    pub fn reconstruct(first: &RgbaImage, second: &RgbaImage, masks: &MaskPair) -> Result<RgbaImage> {
        let dimensions = first.dimensions();
        if second.dimensions() != dimensions {
            return Err(PartitionError::invalid_image(format!(
                "region images differ in size: {:?} vs {:?}",
                dimensions,
                second.dimensions()
            )));
        }
        Self::check_mask(&masks.first, dimensions)?;

        Ok(RgbaImage::from_fn(dimensions.0, dimensions.1, |x, y| {
            if masks.first.contains(x, y) {
                *first.get_pixel(x, y)
            } else {
                *second.get_pixel(x, y)
            }
        }))
    }

    /// Union by alpha: the non-transparent pixel wins, fully transparent where neither is
    ///
    /// # Errors
    /// - `InvalidImage` when dimensions disagree
    pub fn overlay(first: &RgbaImage, second: &RgbaImage) -> Result<RgbaImage> {
        let dimensions = first.dimensions();
        if second.dimensions() != dimensions {
            return Err(PartitionError::invalid_image(format!(
                "region images differ in size: {:?} vs {:?}",
                dimensions,
                second.dimensions()
            )));
        }

        Ok(RgbaImage::from_fn(dimensions.0, dimensions.1, |x, y| {
            let a = first.get_pixel(x, y);
            let b = second.get_pixel(x, y);
            if a[3] > 0 {
                *a
            } else if b[3] > 0 {
                *b
            } else {
                TRANSPARENT_PIXEL
            }
        }))
    }

    fn check_mask(mask: &RegionMask, dimensions: (u32, u32)) -> Result<()> {
        let expected = dimensions.0 as usize * dimensions.1 as usize;
        if mask.dimensions != dimensions || mask.data.len() != expected {
            return Err(PartitionError::invalid_image(format!(
                "{} mask is {}x{} ({} cells), image is {}x{}",
                mask.region,
                mask.dimensions.0,
                mask.dimensions.1,
                mask.data.len(),
                dimensions.0,
                dimensions.1
            )));
        }
        Ok(())
    }
}

fn compose_row(src: &[u8], mask1: &[bool], mask2: &[bool], out1: &mut [u8], out2: &mut [u8]) {
    let pixels = src
        .chunks_exact(CHANNELS)
        .zip(mask1.iter().zip(mask2))
        .zip(out1.chunks_exact_mut(CHANNELS).zip(out2.chunks_exact_mut(CHANNELS)));
    for ((pixel, (&in1, &in2)), (o1, o2)) in pixels {
        o1.copy_from_slice(if in1 { pixel } else { &TRANSPARENT_PIXEL.0[..] });
        o2.copy_from_slice(if in2 { pixel } else { &TRANSPARENT_PIXEL.0[..] });
    }
}
