//! Line model: canonical half-plane representation of the split line
//!
//! Two caller points are resolved into absolute pixel space and turned into
//! `a·x + b·y + c = 0` with `a = y2 - y1`, `b = x1 - x2`, `c = x2·y1 - x1·y2`.
//! The coefficient signs follow the order of the points, so swapping the
//! points swaps the two regions while the line itself stays the same.

use crate::{
    config::{BoundsPolicy, CoordinateMode, PartitionConfig},
    error::{PartitionError, Result},
    types::{Point, Region},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Intersections closer than this are treated as the same boundary point
const INTERSECTION_TOLERANCE: f64 = 1e-9;

/// Orientation of a line relative to the pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrientation {
    /// `x1 == x2`, so `b == 0`
    Vertical,
    /// `y1 == y2`, so `a == 0`
    Horizontal,
    Oblique,
}

/// Canonical line `a·x + b·y + c = 0` in absolute pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// First point, absolute pixels
    pub start: Point,
    /// Second point, absolute pixels
    pub end: Point,
}

impl Line {
    /// Build the canonical line through two absolute points
    ///
    /// # Errors
    /// - `InvalidPoint` for non-finite coordinates or coefficients
    /// - `DegenerateLine` when the points coincide exactly
    pub fn through(start: Point, end: Point) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(PartitionError::invalid_point(format!(
                "line points must be finite, got {start} and {end}"
            )));
        }

        let a = end.y - start.y;
        let b = start.x - end.x;
        let c = end.x * start.y - start.x * end.y;

        if a == 0.0 && b == 0.0 {
            return Err(PartitionError::DegenerateLine {
                point1: start,
                point2: end,
                distance: 0.0,
                epsilon: 0.0,
            });
        }
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return Err(PartitionError::invalid_point(format!(
                "coefficients for {start} and {end} overflow"
            )));
        }

        Ok(Self {
            a,
            b,
            c,
            start,
            end,
        })
    }

    /// Signed value of the line expression at `(x, y)`
    #[must_use]
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y + self.c
    }

    /// Signed value at the center of pixel `(px, py)`
    #[must_use]
    #[inline]
    pub fn value_at_pixel(&self, px: u32, py: u32) -> f64 {
        self.evaluate(f64::from(px) + 0.5, f64::from(py) + 0.5)
    }

    /// Whether pixel `(px, py)` belongs to region 1 (`line_value <= 0`, ties included)
    #[must_use]
    #[inline]
    pub fn in_first_region(&self, px: u32, py: u32) -> bool {
        self.value_at_pixel(px, py) <= 0.0
    }

    /// Region owning pixel `(px, py)`
    #[must_use]
    pub fn region_of_pixel(&self, px: u32, py: u32) -> Region {
        if self.in_first_region(px, py) {
            Region::First
        } else {
            Region::Second
        }
    }

    #[must_use]
    pub fn orientation(&self) -> LineOrientation {
        if self.b == 0.0 {
            LineOrientation::Vertical
        } else if self.a == 0.0 {
            LineOrientation::Horizontal
        } else {
            LineOrientation::Oblique
        }
    }

    /// Segment where the infinite line crosses the rectangle `[0, width] x [0, height]`
    ///
    /// Returns `None` when the line misses the rectangle. A line touching a
    /// single corner yields a zero-length segment.
    #[must_use]
    pub fn boundary_segment(&self, width: u32, height: u32) -> Option<(Point, Point)> {
        let w = f64::from(width);
        let h = f64::from(height);
        let mut hits: Vec<Point> = Vec::with_capacity(4);
        let mut push = |point: Point| {
            if point.within(w, h)
                && !hits
                    .iter()
                    .any(|hit| hit.distance(&point) < INTERSECTION_TOLERANCE)
            {
                hits.push(point);
            }
        };

        if self.b != 0.0 {
            for x in [0.0, w] {
                push(Point::new(x, -(self.a * x + self.c) / self.b));
            }
        }
        if self.a != 0.0 {
            for y in [0.0, h] {
                push(Point::new(-(self.b * y + self.c) / self.a, y));
            }
        }

        let mut best: Option<(Point, Point)> = hits.first().map(|&p| (p, p));
        let mut best_distance = 0.0;
        for (i, p) in hits.iter().enumerate() {
            for q in hits.iter().skip(i + 1) {
                let distance = p.distance(q);
                if distance > best_distance {
                    best_distance = distance;
                    best = Some((*p, *q));
                }
            }
        }
        best
    }
}

/// Resolve caller points into the canonical line for an image of `width x height`
///
/// Applies, in order: finiteness check, degeneracy check, bounds policy and
/// (after clamping) a second degeneracy check, all in the caller's coordinate
/// space. Points are converted to absolute pixels once, at the end.
///
/// # Errors
/// - `InvalidImage` for zero dimensions
/// - `InvalidPoint` for non-finite coordinates
/// - `OutOfBounds` when both points are outside and the policy is `Reject`
/// - `DegenerateLine` when the points are closer than the configured epsilon
pub fn resolve_line(
    point1: Point,
    point2: Point,
    width: u32,
    height: u32,
    config: &PartitionConfig,
) -> Result<Line> {
    if width == 0 || height == 0 {
        return Err(PartitionError::invalid_image(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    for point in [point1, point2] {
        if !point.is_finite() {
            return Err(PartitionError::invalid_point(format!(
                "coordinates must be finite, got {point}"
            )));
        }
    }

    let epsilon = config.epsilon();
    ensure_distinct(point1, point2, epsilon)?;

    let (max_x, max_y) = match config.coordinate_mode {
        CoordinateMode::Absolute => (f64::from(width), f64::from(height)),
        CoordinateMode::Normalized => (1.0, 1.0),
    };

    let (p1, p2) = match config.bounds_policy {
        BoundsPolicy::Reject => {
            if !point1.within(max_x, max_y) && !point2.within(max_x, max_y) {
                return Err(PartitionError::OutOfBounds {
                    point1,
                    point2,
                    width,
                    height,
                });
            }
            (point1, point2)
        },
        BoundsPolicy::Clamp => {
            let (p1, p2) = (point1.clamped(max_x, max_y), point2.clamped(max_x, max_y));
            // Clamping can collapse two distinct points onto one corner
            ensure_distinct(p1, p2, epsilon)?;
            (p1, p2)
        },
        BoundsPolicy::Allow => (point1, point2),
    };

    let (start, end) = match config.coordinate_mode {
        CoordinateMode::Absolute => (p1, p2),
        CoordinateMode::Normalized => (
            Point::new(p1.x * f64::from(width), p1.y * f64::from(height)),
            Point::new(p2.x * f64::from(width), p2.y * f64::from(height)),
        ),
    };

    let line = Line::through(start, end)?;
    debug!(
        a = line.a,
        b = line.b,
        c = line.c,
        start = %line.start,
        end = %line.end,
        "Resolved split line"
    );
    Ok(line)
}

fn ensure_distinct(point1: Point, point2: Point, epsilon: f64) -> Result<()> {
    let distance = point1.distance(&point2);
    if distance < epsilon {
        return Err(PartitionError::DegenerateLine {
            point1,
            point2,
            distance,
            epsilon,
        });
    }
    Ok(())
}
