//! Region classifier: per-pixel half-plane membership
//!
//! Every pixel center `(x + 0.5, y + 0.5)` is evaluated against the line; a
//! value `<= 0` puts the pixel in region 1, anything else in region 2. Rows are
//! independent, so they are filled with `rayon` when parallel evaluation is on.
//!
//! Axis-aligned lines take a fast path: the side is evaluated once per column
//! (vertical) or once per row (horizontal) with the same `Line::in_first_region`
//! call as the general path, and the result is copied across the grid.

use crate::{
    config::PartitionConfig,
    error::{PartitionError, Result},
    line::{Line, LineOrientation},
    types::{MaskPair, Region, RegionMask},
};
use rayon::prelude::*;
use tracing::trace;

/// Masks produced by one classification pass
#[derive(Debug, Clone)]
pub struct Classification {
    pub masks: MaskPair,
    /// Whether the axis-aligned fast path produced the masks
    pub fast_path_used: bool,
}

/// Side-of-line classifier for a pixel grid
#[derive(Debug, Clone, Copy)]
pub struct RegionClassifier {
    parallel: bool,
    fast_path: bool,
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self {
            parallel: true,
            fast_path: true,
        }
    }
}

impl RegionClassifier {
    #[must_use]
    pub fn new(parallel: bool, fast_path: bool) -> Self {
        Self {
            parallel,
            fast_path,
        }
    }

    #[must_use]
    pub fn from_config(config: &PartitionConfig) -> Self {
        Self::new(config.parallel, config.fast_path)
    }

    /// Classify every pixel of a `width x height` grid
    ///
    /// # Errors
    /// - `InvalidImage` for zero dimensions or a grid too large to address
    pub fn classify(&self, line: &Line, width: u32, height: u32) -> Result<Classification> {
        let pixel_count = Self::pixel_count(width, height)?;

        let fast = if self.fast_path {
            self.classify_axis_aligned(line, width, height)
        } else {
            None
        };
        let fast_path_used = fast.is_some();
        let membership = match fast {
            Some(membership) => membership,
            None => self.classify_per_pixel(line, width, height),
        };
        debug_assert_eq!(membership.len(), pixel_count);

        trace!(
            width,
            height,
            fast_path_used,
            orientation = ?line.orientation(),
            "Classified pixel grid"
        );

        Ok(Classification {
            masks: self.split_membership(membership, (width, height)),
            fast_path_used,
        })
    }

    /// General path: evaluate the signed half-plane test at every pixel center
    #[must_use]
    pub fn classify_per_pixel(&self, line: &Line, width: u32, height: u32) -> Vec<bool> {
        let mut membership = vec![false; width as usize * height as usize];
        self.fill_rows(&mut membership, width, |y, row| {
            for (x, cell) in (0..width).zip(row.iter_mut()) {
                *cell = line.in_first_region(x, y);
            }
        });
        membership
    }

    /// Fast path for vertical and horizontal lines; `None` for oblique lines
    #[must_use]
    pub fn classify_axis_aligned(&self, line: &Line, width: u32, height: u32) -> Option<Vec<bool>> {
        let orientation = line.orientation();
        if orientation == LineOrientation::Oblique {
            return None;
        }

        let mut membership = vec![false; width as usize * height as usize];
        if orientation == LineOrientation::Vertical {
            // b == 0, so the side depends on the column only
            let template: Vec<bool> = (0..width).map(|x| line.in_first_region(x, 0)).collect();
            self.fill_rows(&mut membership, width, |_, row| {
                row.copy_from_slice(&template);
            });
        } else {
            self.fill_rows(&mut membership, width, |y, row| {
                row.fill(line.in_first_region(0, y));
            });
        }
        Some(membership)
    }

    fn fill_rows<F>(&self, membership: &mut [bool], width: u32, fill: F)
    where
        F: Fn(u32, &mut [bool]) + Send + Sync,
    {
        let row_len = width as usize;
        if row_len == 0 {
            return;
        }
        if self.parallel {
            membership
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| fill(y as u32, row));
        } else {
            membership
                .chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| fill(y as u32, row));
        }
    }

    fn split_membership(&self, in_first: Vec<bool>, dimensions: (u32, u32)) -> MaskPair {
        let in_second: Vec<bool> = if self.parallel {
            in_first.par_iter().map(|inside| !inside).collect()
        } else {
            in_first.iter().map(|inside| !inside).collect()
        };
        MaskPair::new(
            RegionMask::new(in_first, dimensions, Region::First),
            RegionMask::new(in_second, dimensions, Region::Second),
        )
    }

    fn pixel_count(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(PartitionError::invalid_image(format!(
                "cannot classify an empty {width}x{height} grid"
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                PartitionError::invalid_image(format!("{width}x{height} grid is too large"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
        Line::through(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    fn grid(mask: &RegionMask) -> Vec<Vec<bool>> {
        let (width, height) = mask.dimensions;
        (0..height)
            .map(|y| (0..width).map(|x| mask.contains(x, y)).collect())
            .collect()
    }

    #[test]
    fn test_vertical_line_at_left_edge() {
        // a = 4, b = 0, c = 0: every pixel center has x >= 0.5, so line_value > 0
        let result = RegionClassifier::default()
            .classify(&line(0.0, 0.0, 0.0, 4.0), 4, 4)
            .unwrap();

        assert!(result.fast_path_used);
        assert_eq!(grid(&result.masks.first), vec![vec![false; 4]; 4]);
        assert_eq!(grid(&result.masks.second), vec![vec![true; 4]; 4]);
        assert_eq!(result.masks.first.count(), 0);
        assert_eq!(result.masks.second.count(), 16);
    }

    #[test]
    fn test_diagonal_two_by_two() {
        let result = RegionClassifier::default()
            .classify(&line(0.0, 0.0, 2.0, 2.0), 2, 2)
            .unwrap();

        assert!(!result.fast_path_used);
        assert_eq!(
            grid(&result.masks.first),
            vec![vec![true, false], vec![true, true]]
        );
        assert_eq!(
            grid(&result.masks.second),
            vec![vec![false, true], vec![false, false]]
        );
    }

    #[test]
    fn test_vertical_split_through_middle() {
        // x = 2 on a 4x3 grid; a = 3 > 0 so the left columns are region 1
        let result = RegionClassifier::default()
            .classify(&line(2.0, 0.0, 2.0, 3.0), 4, 3)
            .unwrap();
        let expected_row = vec![true, true, false, false];
        assert_eq!(grid(&result.masks.first), vec![expected_row; 3]);
    }

    #[test]
    fn test_horizontal_split() {
        // y = 1 drawn right to left: a = 0, b = 4, c = -4, so rows with y + 0.5 <= 1 are region 1
        let result = RegionClassifier::default()
            .classify(&line(4.0, 1.0, 0.0, 1.0), 4, 3)
            .unwrap();
        assert!(result.fast_path_used);
        assert_eq!(
            grid(&result.masks.first),
            vec![vec![true; 4], vec![false; 4], vec![false; 4]]
        );
    }

    #[test]
    fn test_fast_path_matches_per_pixel() {
        let lines = [
            line(2.5, 0.0, 2.5, 7.0),
            line(3.0, 0.0, 3.0, 1.0),
            line(3.0, 5.0, 3.0, 1.0),
            line(0.0, 2.5, 9.0, 2.5),
            line(6.0, 4.0, 1.0, 4.0),
            line(-3.0, 0.0, -3.0, 2.0),
        ];
        for classifier in [
            RegionClassifier::new(true, true),
            RegionClassifier::new(false, true),
        ] {
            for l in &lines {
                let fast = classifier.classify_axis_aligned(l, 7, 6).unwrap();
                let general = classifier.classify_per_pixel(l, 7, 6);
                assert_eq!(fast, general, "fast path diverged for {l:?}");
            }
        }
    }

    #[test]
    fn test_oblique_line_has_no_fast_path() {
        let classifier = RegionClassifier::default();
        assert!(classifier
            .classify_axis_aligned(&line(0.0, 0.0, 3.0, 1.0), 4, 4)
            .is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let l = line(0.3, 11.0, 17.0, 2.2);
        let parallel = RegionClassifier::new(true, false)
            .classify(&l, 31, 17)
            .unwrap();
        let sequential = RegionClassifier::new(false, false)
            .classify(&l, 31, 17)
            .unwrap();
        assert_eq!(parallel.masks, sequential.masks);
        assert!(parallel.masks.is_partition());
    }

    #[test]
    fn test_coverage_over_many_lines() {
        let classifier = RegionClassifier::default();
        for (w, h) in [(1, 1), (1, 9), (9, 1), (5, 7), (16, 3)] {
            for (x1, y1, x2, y2) in [
                (0.0, 0.0, 1.0, 1.0),
                (0.0, 3.0, 5.0, 0.0),
                (2.0, 0.0, 2.0, 1.0),
                (0.0, 0.5, 1.0, 0.5),
                (-4.0, 10.0, 12.0, -3.0),
            ] {
                let result = classifier
                    .classify(&line(x1, y1, x2, y2), w, h)
                    .unwrap();
                let stats = result.masks.statistics();
                assert_eq!(
                    stats.first_pixels + stats.second_pixels,
                    (w * h) as usize
                );
                assert!(result.masks.is_partition());
            }
        }
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = RegionClassifier::default()
            .classify(&line(0.0, 0.0, 1.0, 1.0), 0, 3)
            .unwrap_err();
        assert!(matches!(err, PartitionError::InvalidImage(_)));
    }
}
