//! FeatureCollection - the styled features of one map and their extent
//!
//! This is the input to the tiler. Features are added one at a time by
//! whatever produced them; the bounding area and counts are kept up to date
//! incrementally so they never need a full rescan.

use crate::{Area, LineLike, MapArea, MapLine, MapPoint, MapShape, Overlays, Result, TilingError};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary of a collection's contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectionInfo {
    pub point_count: usize,
    pub line_count: usize,
    pub shape_count: usize,
    /// Coordinates referenced by lines and shapes, counted per feature
    pub coordinate_count: usize,
}

/// Points, lines and shapes covering one map
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    points: Vec<MapPoint>,
    lines: Vec<Arc<MapLine>>,
    shapes: Vec<Arc<MapShape>>,
    /// Overlays applied to incoming lines
    overlays: Overlays,
    /// Bounding area of everything added so far (None if empty)
    bounds: Option<Area>,
    coordinate_count: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection that expands overlay line types as lines are added
    pub fn with_overlays(overlays: Overlays) -> Self {
        Self {
            overlays,
            ..Self::default()
        }
    }

    pub fn add_point(&mut self, point: MapPoint) {
        self.include(Area::point(&point.location));
        self.points.push(point);
    }

    /// Add a line, expanding overlays
    ///
    /// Every coordinate of the line has its line reference count increased.
    pub fn add_line(&mut self, line: MapLine) -> Result<()> {
        let bounds = line.bounds().ok_or_else(|| {
            TilingError::InvalidGeometry(format!("line of type {:#x} has no points", line.info.kind))
        })?;

        for coord in line.points() {
            coord.inc_line_count();
        }

        for line in self.overlays.expand(line) {
            self.coordinate_count += line.points().len();
            self.lines.push(Arc::new(line));
        }
        self.include(bounds);
        Ok(())
    }

    pub fn add_shape(&mut self, shape: MapShape) -> Result<()> {
        let bounds = shape.bounds().ok_or_else(|| {
            TilingError::InvalidGeometry(format!(
                "shape of type {:#x} has no points",
                shape.info.kind
            ))
        })?;

        self.coordinate_count += shape.points().len();
        self.shapes.push(Arc::new(shape));
        self.include(bounds);
        Ok(())
    }

    #[inline]
    fn include(&mut self, area: Area) {
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(&area),
            None => area,
        });
    }

    /// Bounding area of all features, `None` while the collection is empty
    #[inline]
    pub fn bounds(&self) -> Option<Area> {
        self.bounds
    }

    #[inline]
    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    #[inline]
    pub fn lines(&self) -> &[Arc<MapLine>] {
        &self.lines
    }

    #[inline]
    pub fn shapes(&self) -> &[Arc<MapShape>] {
        &self.shapes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.shapes.is_empty()
    }

    /// O(1), all values are cached
    pub fn info(&self) -> CollectionInfo {
        CollectionInfo {
            point_count: self.points.len(),
            line_count: self.lines.len(),
            shape_count: self.shapes.len(),
            coordinate_count: self.coordinate_count,
        }
    }

    /// A tile over `bounds` holding the features visible at `resolution`
    ///
    /// Features are shared with the collection, not copied.
    pub fn area_for_resolution(&self, bounds: Area, resolution: u8) -> MapArea {
        let points = self
            .points
            .iter()
            .filter(|p| p.info.is_visible_at(resolution))
            .cloned()
            .collect();
        let lines = self
            .lines
            .iter()
            .filter(|l| l.info.is_visible_at(resolution))
            .cloned()
            .collect();
        let shapes = self
            .shapes
            .iter()
            .filter(|s| s.info.is_visible_at(resolution))
            .cloned()
            .collect();
        MapArea::new(bounds, points, lines, shapes)
    }
}
