//! Map features produced by the styling stage
//!
//! Lines and shapes share their coordinates through [`CoordRef`], so copying a
//! feature copies handles, never positions.

use crate::{Area, CoordRef, utils};

/// Attributes common to every map feature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementInfo {
    /// Numeric type code assigned by the style
    pub kind: u32,
    /// Lowest resolution at which the feature is shown
    pub min_resolution: u8,
    /// Highest resolution at which the feature is shown
    pub max_resolution: u8,
    /// Label, if any
    pub name: Option<String>,
}

impl ElementInfo {
    /// Feature of the given type visible at every resolution
    pub fn new(kind: u32) -> Self {
        Self {
            kind,
            min_resolution: 0,
            max_resolution: utils::MAP_UNIT_BITS as u8,
            name: None,
        }
    }

    /// Restrict the feature to `min..=max`
    pub fn with_resolutions(mut self, min: u8, max: u8) -> Self {
        self.min_resolution = min.min(max);
        self.max_resolution = min.max(max);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the feature belongs in the output for `resolution`
    #[inline]
    pub fn is_visible_at(&self, resolution: u8) -> bool {
        (self.min_resolution..=self.max_resolution).contains(&resolution)
    }
}

/// Behaviour shared by lines and polygons
///
/// Cloning is shallow: the coordinate handles are cloned, the coordinates
/// themselves are shared.
pub trait LineLike: Clone + Send + Sync {
    fn info(&self) -> &ElementInfo;

    /// The ordered point sequence
    fn points(&self) -> &[CoordRef];

    /// Replace the point sequence
    fn set_points(&mut self, points: Vec<CoordRef>);

    /// Copy with the same attributes and a fresh point sequence
    fn copy_with_points(&self, points: Vec<CoordRef>) -> Self {
        let mut copy = self.clone();
        copy.set_points(points);
        copy
    }

    /// Bounding box of the points, `None` for an empty sequence
    fn bounds(&self) -> Option<Area> {
        Area::from_coords(self.points())
    }
}

/// A point feature such as a POI
#[derive(Clone, Debug)]
pub struct MapPoint {
    pub info: ElementInfo,
    pub location: CoordRef,
}

impl MapPoint {
    pub fn new(info: ElementInfo, location: CoordRef) -> Self {
        Self { info, location }
    }
}

/// A polyline feature such as a road or a track
#[derive(Clone, Debug)]
pub struct MapLine {
    pub info: ElementInfo,
    points: Vec<CoordRef>,
}

impl MapLine {
    pub fn new(info: ElementInfo, points: Vec<CoordRef>) -> Self {
        Self { info, points }
    }

    /// Same line with a different type code
    pub fn with_kind(&self, kind: u32) -> Self {
        let mut line = self.clone();
        line.info.kind = kind;
        line
    }
}

impl LineLike for MapLine {
    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn points(&self) -> &[CoordRef] {
        &self.points
    }

    fn set_points(&mut self, points: Vec<CoordRef>) {
        self.points = points;
    }
}

/// A polygon feature; the outline is normally closed (first point == last point)
#[derive(Clone, Debug)]
pub struct MapShape {
    pub info: ElementInfo,
    points: Vec<CoordRef>,
}

impl MapShape {
    pub fn new(info: ElementInfo, points: Vec<CoordRef>) -> Self {
        Self { info, points }
    }

    /// Whether the outline ends where it starts
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 2 && first == last,
            _ => false,
        }
    }
}

impl LineLike for MapShape {
    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn points(&self) -> &[CoordRef] {
        &self.points
    }

    fn set_points(&mut self, points: Vec<CoordRef>) {
        self.points = points;
    }
}
