//! Recursive spatial decomposition of a feature set into tiles
//!
//! Splitting runs in two phases. The extent phase cuts the input into the
//! smallest grid whose cells fit the maximum division size. The density phase
//! then splits every cell holding too many features into quadrants, recursively,
//! until each tile is within the feature limit.

use crate::{MapArea, Result, TilingError};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest tile extent in map units, well inside the 16 bit format ceiling
/// to leave room for features that reach beyond their tile
pub const MAX_DIVISION_SIZE: u32 = 0x3fff;

/// Largest number of points, lines or shapes in one tile
pub const MAX_FEATURE_COUNT: usize = 3000;

/// Maximum depth of the density phase to prevent infinite recursion
pub const MAX_DEPTH: u32 = 20;

/// Limits applied by the splitter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitLimits {
    /// Maximum width and height of a tile in map units
    pub max_division_size: u32,
    /// Maximum count of each feature kind in a tile
    pub max_feature_count: usize,
    /// Density splits after which an oversized tile is accepted as it is
    pub max_depth: u32,
}

impl Default for SplitLimits {
    fn default() -> Self {
        Self {
            max_division_size: MAX_DIVISION_SIZE,
            max_feature_count: MAX_FEATURE_COUNT,
            max_depth: MAX_DEPTH,
        }
    }
}

impl SplitLimits {
    pub fn validate(&self) -> Result<()> {
        if self.max_division_size == 0 {
            return Err(TilingError::InvalidConfig(
                "max division size must be positive".to_string(),
            ));
        }
        if self.max_feature_count == 0 {
            return Err(TilingError::InvalidConfig(
                "max feature count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits a tile until every piece is within the size and density limits
#[derive(Debug, Clone)]
pub struct MapSplitter {
    limits: SplitLimits,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapSplitter {
    pub fn new(limits: SplitLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> &SplitLimits {
        &self.limits
    }

    /// Split the tile into leaf tiles
    ///
    /// Leaves come out row-major over the extent grid and depth-first over the
    /// quadrant splits, so the order is the same on every run.
    pub fn split(&self, area: MapArea) -> Vec<MapArea> {
        #[cfg(feature = "profiling")]
        profiling::scope!("partition::split");

        tracing::debug!("splitting area {}", area.bounds());
        let cells = self.split_max_size(area);

        let leaves: Vec<MapArea> = cells
            .into_par_iter()
            .flat_map_iter(|cell| {
                let mut leaves = Vec::new();
                self.split_dense(cell, 0, &mut leaves);
                leaves
            })
            .collect();

        tracing::debug!("split into {} tiles", leaves.len());
        leaves
    }

    /// Grid dimensions that bring every cell within the maximum size
    pub fn grid_for(&self, width: u32, height: u32) -> (u32, u32) {
        let max = self.limits.max_division_size;
        (width.div_ceil(max).max(1), height.div_ceil(max).max(1))
    }

    /// Extent phase: one grid split, a no-op if the area already fits
    fn split_max_size(&self, area: MapArea) -> Vec<MapArea> {
        let bounds = *area.bounds();
        let (xsplit, ysplit) = self.grid_for(bounds.width(), bounds.height());
        tracing::debug!(
            width = bounds.width(),
            height = bounds.height(),
            xsplit,
            ysplit,
            "extent split"
        );
        area.split(xsplit, ysplit)
    }

    /// Density phase: quarter the tile until each kind fits the feature limit
    fn split_dense(&self, area: MapArea, depth: u32, leaves: &mut Vec<MapArea>) {
        if !area.exceeds(self.limits.max_feature_count) {
            leaves.push(area);
            return;
        }

        let bounds = *area.bounds();
        if depth >= self.limits.max_depth || (bounds.width() < 2 && bounds.height() < 2) {
            tracing::warn!(
                points = area.point_count(),
                lines = area.line_count(),
                shapes = area.shape_count(),
                depth,
                "accepting oversized tile {bounds}"
            );
            leaves.push(area);
            return;
        }

        if !self.separates(&area) {
            tracing::warn!(
                points = area.point_count(),
                lines = area.line_count(),
                shapes = area.shape_count(),
                depth,
                "accepting oversized tile {bounds}, its features cross every split"
            );
            leaves.push(area);
            return;
        }

        tracing::debug!(depth, "splitting dense area {bounds}");
        for quadrant in area.split(2, 2) {
            self.split_dense(quadrant, depth + 1, leaves);
        }
    }

    /// Whether quartering makes progress on the kinds over the limit
    ///
    /// A split makes none when two or more quadrants would each keep every
    /// feature of such a kind. Lines and shapes crossing the whole tile do
    /// that at every depth.
    fn separates(&self, area: &MapArea) -> bool {
        let max = self.limits.max_feature_count;
        let parent = area.counts();
        let unseparated = area
            .split_counts(2, 2)
            .iter()
            .filter(|child| (0..3).all(|kind| parent[kind] <= max || child[kind] == parent[kind]))
            .count();
        unseparated < 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Area, Coordinate, ElementInfo, MapLine, MapPoint};
    use std::sync::Arc;

    fn point(lat: i32, lon: i32) -> MapPoint {
        MapPoint::new(
            ElementInfo::new(0x2f00),
            Arc::new(Coordinate::from_map_units(lat, lon)),
        )
    }

    fn splitter(max_division_size: u32, max_feature_count: usize) -> MapSplitter {
        MapSplitter::new(SplitLimits {
            max_division_size,
            max_feature_count,
            max_depth: MAX_DEPTH,
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_limits() {
        assert!(MapSplitter::new(SplitLimits {
            max_division_size: 0,
            ..Default::default()
        })
        .is_err());
        assert!(MapSplitter::new(SplitLimits {
            max_feature_count: 0,
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_grid_for() {
        let s = splitter(100, 10);
        assert_eq!(s.grid_for(0, 0), (1, 1));
        assert_eq!(s.grid_for(100, 50), (1, 1));
        assert_eq!(s.grid_for(101, 200), (2, 2));
        assert_eq!(s.grid_for(250, 301), (3, 4));
    }

    #[test]
    fn test_small_sparse_area_is_a_single_leaf() {
        let area = MapArea::new(
            Area::new(0, 0, 50, 50),
            vec![point(1, 1), point(40, 40)],
            Vec::new(),
            Vec::new(),
        );
        let leaves = splitter(100, 10).split(area);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].point_count(), 2);
    }

    #[test]
    fn test_wide_area_splits_by_extent_only() {
        // Wider than twice the division size, sparse
        let bounds = Area::new(0, 0, 50, 250);
        let area = MapArea::new(bounds, vec![point(10, 10)], Vec::new(), Vec::new());
        let leaves = splitter(100, 10).split(area);
        assert_eq!(leaves.len(), 3);
        assert!(leaves.iter().all(|l| l.bounds().width() <= 100));
        assert_eq!(leaves.iter().map(MapArea::point_count).sum::<usize>(), 1);
    }

    #[test]
    fn test_dense_area_splits_into_quadrants() {
        let points: Vec<MapPoint> = (0..40)
            .flat_map(|lat| (0..40).map(move |lon| point(lat * 2, lon * 2)))
            .collect();
        let area = MapArea::new(Area::new(0, 0, 80, 80), points, Vec::new(), Vec::new());
        let leaves = splitter(1000, 100).split(area);

        assert!(leaves.len() >= 16);
        assert!(leaves.iter().all(|l| l.point_count() <= 100));
        assert_eq!(leaves.iter().map(MapArea::point_count).sum::<usize>(), 1600);
    }

    #[test]
    fn test_coincident_points_terminate() {
        let points: Vec<MapPoint> = (0..50).map(|_| point(7, 7)).collect();
        let area = MapArea::new(Area::new(0, 0, 1000, 1000), points, Vec::new(), Vec::new());
        let leaves = splitter(2000, 10).split(area);

        assert_eq!(leaves.iter().map(MapArea::point_count).sum::<usize>(), 50);
        assert_eq!(leaves.iter().filter(|l| l.point_count() > 0).count(), 1);
    }

    #[test]
    fn test_depth_backstop_accepts_oversized_tile() {
        let points: Vec<MapPoint> = (0..50).map(|_| point(7, 7)).collect();
        let area = MapArea::new(Area::new(0, 0, 1000, 1000), points, Vec::new(), Vec::new());
        let s = MapSplitter::new(SplitLimits {
            max_division_size: 2000,
            max_feature_count: 10,
            max_depth: 3,
        })
        .unwrap();
        let leaves = s.split(area);

        // Three splits, each leaving three empty quadrants, then the dense one
        assert_eq!(leaves.len(), 10);
        assert_eq!(leaves.iter().filter(|l| l.point_count() == 50).count(), 1);
    }

    fn diagonal_lines(count: usize, size: i32) -> Vec<Arc<MapLine>> {
        (0..count)
            .map(|_| {
                Arc::new(MapLine::new(
                    ElementInfo::new(0x01),
                    vec![
                        Arc::new(Coordinate::from_map_units(0, 0)),
                        Arc::new(Coordinate::from_map_units(size, size)),
                    ],
                ))
            })
            .collect()
    }

    #[test]
    fn test_crossing_lines_stop_density_split() {
        // Lines crossing the whole tile land in two quadrants at every depth,
        // so splitting cannot bring the count down
        for size in [64, 512, 4096, 0x3fff] {
            let area = MapArea::new(
                Area::new(0, 0, size, size),
                Vec::new(),
                diagonal_lines(3, size),
                Vec::new(),
            );
            let leaves = splitter(MAX_DIVISION_SIZE, 2).split(area);
            assert_eq!(leaves.len(), 1, "size {size}");
            assert_eq!(leaves[0].line_count(), 3);
        }
    }

    #[test]
    fn test_crossing_lines_do_not_block_other_splits() {
        // Two crossing lines are fine; the clustered points still get split
        let points: Vec<MapPoint> = (0..20)
            .flat_map(|lat| (0..20).map(move |lon| point(lat * 10, 1000 + lon * 10)))
            .collect();
        let area = MapArea::new(
            Area::new(0, 0, 2000, 2000),
            points,
            diagonal_lines(2, 2000),
            Vec::new(),
        );
        let leaves = splitter(MAX_DIVISION_SIZE, 100).split(area);

        assert!(leaves.iter().all(|l| !l.exceeds(100)));
        assert_eq!(leaves.iter().map(MapArea::point_count).sum::<usize>(), 400);
    }

    #[test]
    fn test_output_order_is_stable() {
        let points: Vec<MapPoint> = (0..30)
            .flat_map(|lat| (0..30).map(move |lon| point(lat * 11, lon * 13)))
            .collect();
        let build = || {
            let area = MapArea::new(
                Area::new(0, 0, 330, 390),
                points.clone(),
                Vec::new(),
                Vec::new(),
            );
            splitter(150, 40)
                .split(area)
                .iter()
                .map(|l| *l.bounds())
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
