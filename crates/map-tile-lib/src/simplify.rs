//! Douglas-Peucker line and polygon simplification
//!
//! Lines are cut at every preserved point and each piece is simplified on its
//! own, so a preserved point can never be removed. Removed points are marked in
//! a mask and the survivors copied forward, the input sequence is never touched.

use crate::{CoordRef, LineLike, Result, TilingError, utils};
use std::sync::Arc;

/// Highest output resolution, at which lines pass through untouched
pub const MAX_RESOLUTION: u8 = utils::MAP_UNIT_BITS as u8;

/// Default filter distance in meters at the highest resolution
pub const DEFAULT_FILTER_DISTANCE: f64 = 2.6;

/// The output resolution a filter runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Bits per coordinate of the output level
    resolution: u8,
    /// `MAX_RESOLUTION - resolution`
    shift: u8,
}

impl FilterConfig {
    pub fn new(resolution: u8) -> Result<Self> {
        if resolution == 0 || resolution > MAX_RESOLUTION {
            return Err(TilingError::InvalidConfig(format!(
                "resolution {resolution} outside 1..={MAX_RESOLUTION}"
            )));
        }
        Ok(Self {
            resolution,
            shift: MAX_RESOLUTION - resolution,
        })
    }

    #[inline]
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    #[inline]
    pub fn shift(&self) -> u8 {
        self.shift
    }
}

/// Reduces point density while bounding the introduced error
#[derive(Debug, Clone)]
pub struct DouglasPeuckerFilter {
    resolution: u8,
    max_error_distance: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DouglasPeuckerFilter {
    /// `filter_distance` is the allowed error in meters at the highest
    /// resolution; it doubles for every resolution step below that.
    pub fn new(filter_distance: f64, config: FilterConfig) -> Self {
        Self {
            resolution: config.resolution(),
            max_error_distance: filter_distance * (1u64 << config.shift()) as f64,
        }
    }

    /// Allowed perpendicular error in meters
    #[inline]
    pub fn max_error_distance(&self) -> f64 {
        self.max_error_distance
    }

    /// Simplify a line or shape for this filter's resolution
    ///
    /// Returns the same `Arc` when nothing was removed, otherwise a shallow
    /// copy holding the reduced point sequence.
    pub fn filter<L: LineLike>(&self, element: &Arc<L>) -> Arc<L> {
        if self.resolution >= MAX_RESOLUTION {
            return element.clone();
        }

        let points = element.points();
        let keep = self.keep_mask(points);
        let kept = keep.iter().filter(|&&k| k).count();
        if kept == points.len() {
            return element.clone();
        }

        let reduced: Vec<CoordRef> = points
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(point, _)| point.clone())
            .collect();
        tracing::trace!(
            kind = element.info().kind,
            before = points.len(),
            after = reduced.len(),
            "simplified"
        );
        Arc::new(element.copy_with_points(reduced))
    }

    /// Which points survive simplification
    pub(crate) fn keep_mask(&self, points: &[CoordRef]) -> Vec<bool> {
        let mut keep = vec![true; points.len()];
        if points.len() < 3 {
            return keep;
        }

        let mut end = points.len() - 1;
        for i in (1..end).rev() {
            if points[i].preserved() {
                douglas_peucker(points, &mut keep, i, end, self.max_error_distance);
                end = i;
            }
        }
        douglas_peucker(points, &mut keep, 0, end, self.max_error_distance);
        keep
    }
}

/// Clear `keep` for the interior points of `start..=end` that lie within
/// `allowed_error` of the chord. Both endpoints are left alone.
fn douglas_peucker(
    points: &[CoordRef],
    keep: &mut [bool],
    start: usize,
    end: usize,
    allowed_error: f64,
) {
    if end - start <= 1 {
        return;
    }

    let a = &points[start];
    let b = &points[end];

    let mut max_distance = 0.0;
    let mut max_index = end;
    for i in (start + 1..end).rev() {
        let distance = points[i].shortest_distance_to_segment(a, b);
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    if max_distance > allowed_error {
        douglas_peucker(points, keep, max_index, end, allowed_error);
        douglas_peucker(points, keep, start, max_index, allowed_error);
    } else {
        keep[start + 1..end].fill(false);
    }
}
