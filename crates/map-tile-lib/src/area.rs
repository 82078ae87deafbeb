//! Axis-aligned bounding boxes in map unit space

use crate::{Coordinate, utils};
use geo::{Coord, Rect};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangle on the map unit grid, bounds inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Area {
    min_lat: i32,
    min_lon: i32,
    max_lat: i32,
    max_lon: i32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Area {
    /// Create an area from its bounds in map units
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min_lat: i32, min_lon: i32, max_lat: i32, max_lon: i32) -> Self {
        Self {
            min_lat: min_lat.min(max_lat),
            min_lon: min_lon.min(max_lon),
            max_lat: min_lat.max(max_lat),
            max_lon: min_lon.max(max_lon),
        }
    }

    /// Zero-size area around a single coordinate
    pub fn point(coord: &Coordinate) -> Self {
        Self::new(
            coord.latitude(),
            coord.longitude(),
            coord.latitude(),
            coord.longitude(),
        )
    }

    /// Smallest area containing every coordinate, `None` if there are none
    pub fn from_coords<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a crate::CoordRef>,
    {
        let mut iter = coords.into_iter();
        let first = Self::point(iter.next()?);
        Some(iter.fold(first, |area, coord| area.expanded_to(coord)))
    }

    #[inline]
    pub fn min_lat(&self) -> i32 {
        self.min_lat
    }

    #[inline]
    pub fn min_lon(&self) -> i32 {
        self.min_lon
    }

    #[inline]
    pub fn max_lat(&self) -> i32 {
        self.max_lat
    }

    #[inline]
    pub fn max_lon(&self) -> i32 {
        self.max_lon
    }

    /// Extent along the longitude axis in map units
    #[inline]
    pub fn width(&self) -> u32 {
        (self.max_lon as i64 - self.min_lon as i64) as u32
    }

    /// Extent along the latitude axis in map units
    #[inline]
    pub fn height(&self) -> u32 {
        (self.max_lat as i64 - self.min_lat as i64) as u32
    }

    /// Center of the area in map units
    pub fn center(&self) -> Coordinate {
        let lat = (self.min_lat as i64 + self.max_lat as i64) / 2;
        let lon = (self.min_lon as i64 + self.max_lon as i64) / 2;
        Coordinate::from_map_units(lat as i32, lon as i32)
    }

    /// Whether the coordinate lies inside or on the edge of the area
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.latitude() >= self.min_lat
            && coord.latitude() <= self.max_lat
            && coord.longitude() >= self.min_lon
            && coord.longitude() <= self.max_lon
    }

    /// Whether the two areas share at least one point
    pub fn intersects(&self, other: &Area) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }

    /// This area grown to include the coordinate
    pub fn expanded_to(&self, coord: &Coordinate) -> Self {
        Self {
            min_lat: self.min_lat.min(coord.latitude()),
            min_lon: self.min_lon.min(coord.longitude()),
            max_lat: self.max_lat.max(coord.latitude()),
            max_lon: self.max_lon.max(coord.longitude()),
        }
    }

    /// Smallest area containing both
    pub fn union(&self, other: &Area) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lat: self.max_lat.max(other.max_lat),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    /// Split into an `xdiv` × `ydiv` grid, row-major from the south-west corner
    ///
    /// Neighbouring cells share their edge, so the union of the cells is
    /// exactly this area. A zero division count is treated as one.
    pub fn split(&self, xdiv: u32, ydiv: u32) -> Vec<Area> {
        let grid = Grid::new(self, xdiv, ydiv);
        let mut areas = Vec::with_capacity(grid.cell_count());
        for row in grid.lat_bounds.windows(2) {
            for column in grid.lon_bounds.windows(2) {
                areas.push(Area::new(row[0], column[0], row[1], column[1]));
            }
        }
        areas
    }

    /// Bounds in degrees as a `geo::Rect` (x = longitude, y = latitude)
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: utils::map_unit_to_degrees(self.min_lon),
                y: utils::map_unit_to_degrees(self.min_lat),
            },
            Coord {
                x: utils::map_unit_to_degrees(self.max_lon),
                y: utils::map_unit_to_degrees(self.max_lat),
            },
        )
    }
}

impl From<Rect<f64>> for Area {
    /// Converts a rectangle in degrees (x = longitude, y = latitude)
    fn from(rect: Rect<f64>) -> Self {
        Area::new(
            utils::to_map_unit(rect.min().y),
            utils::to_map_unit(rect.min().x),
            utils::to_map_unit(rect.max().y),
            utils::to_map_unit(rect.max().x),
        )
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}) to ({},{})",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}

/// Cell boundaries of an evenly divided area
///
/// Cells are half-open on their upper edges except for the last row and
/// column, so every coordinate inside the area maps to exactly one cell.
/// Coordinates outside the area map to the nearest edge cell.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    lat_bounds: Vec<i32>,
    lon_bounds: Vec<i32>,
}

impl Grid {
    pub(crate) fn new(area: &Area, xdiv: u32, ydiv: u32) -> Self {
        Self {
            lat_bounds: axis_bounds(area.min_lat, area.max_lat, ydiv.max(1)),
            lon_bounds: axis_bounds(area.min_lon, area.max_lon, xdiv.max(1)),
        }
    }

    #[inline]
    pub(crate) fn columns(&self) -> usize {
        self.lon_bounds.len() - 1
    }

    #[inline]
    pub(crate) fn rows(&self) -> usize {
        self.lat_bounds.len() - 1
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.columns() * self.rows()
    }

    /// Row-major index of the cell containing the coordinate
    pub(crate) fn cell_of(&self, coord: &Coordinate) -> usize {
        self.row_of(coord.latitude()) * self.columns() + self.column_of(coord.longitude())
    }

    pub(crate) fn row_of(&self, latitude: i32) -> usize {
        axis_index(&self.lat_bounds, latitude)
    }

    pub(crate) fn column_of(&self, longitude: i32) -> usize {
        axis_index(&self.lon_bounds, longitude)
    }

    /// Latitude range of `row`, lower and upper boundary
    #[inline]
    pub(crate) fn row_span(&self, row: usize) -> (i32, i32) {
        (self.lat_bounds[row], self.lat_bounds[row + 1])
    }
}

/// `div + 1` boundaries from `min` to `max` inclusive
fn axis_bounds(min: i32, max: i32, div: u32) -> Vec<i32> {
    let extent = max as i64 - min as i64;
    (0..=div as i64)
        .map(|i| (min as i64 + extent * i / div as i64) as i32)
        .collect()
}

/// Index of the interval containing `value`, clamped to the valid range
fn axis_index(bounds: &[i32], value: i32) -> usize {
    let inner = &bounds[1..bounds.len() - 1];
    inner.partition_point(|&b| b <= value)
}
