//! Tiles: an area together with the features assigned to it
//!
//! When a tile is split, each point moves to the single cell containing it.
//! Lines and shapes are not clipped; they are assigned whole to every cell
//! one of their segments passes through.

use crate::area::Grid;
use crate::{Area, CoordRef, Coordinate, LineLike, MapLine, MapPoint, MapShape};
use smallvec::SmallVec;
use std::sync::Arc;

/// Cell indices touched by one feature; most features touch very few cells
type Cells = SmallVec<[usize; 4]>;

/// A rectangular region of the map and the features it owns
#[derive(Clone, Debug)]
pub struct MapArea {
    bounds: Area,
    points: Vec<MapPoint>,
    lines: Vec<Arc<MapLine>>,
    shapes: Vec<Arc<MapShape>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapArea {
    pub fn new(
        bounds: Area,
        points: Vec<MapPoint>,
        lines: Vec<Arc<MapLine>>,
        shapes: Vec<Arc<MapShape>>,
    ) -> Self {
        Self {
            bounds,
            points,
            lines,
            shapes,
        }
    }

    /// Tile with no features
    pub fn empty(bounds: Area) -> Self {
        Self::new(bounds, Vec::new(), Vec::new(), Vec::new())
    }

    #[inline]
    pub fn bounds(&self) -> &Area {
        &self.bounds
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

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<Arc<MapLine>> {
        &mut self.lines
    }

    pub(crate) fn shapes_mut(&mut self) -> &mut Vec<Arc<MapShape>> {
        &mut self.shapes
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Total number of coordinates referenced by lines and shapes
    pub fn coordinate_count(&self) -> usize {
        self.lines.iter().map(|l| l.points().len()).sum::<usize>()
            + self.shapes.iter().map(|s| s.points().len()).sum::<usize>()
    }

    /// Whether any feature count is above `max`
    pub fn exceeds(&self, max: usize) -> bool {
        self.point_count() > max || self.line_count() > max || self.shape_count() > max
    }

    /// Point, line and shape counts
    #[inline]
    pub(crate) fn counts(&self) -> [usize; 3] {
        [self.point_count(), self.line_count(), self.shape_count()]
    }

    /// Counts each cell would hold after `split(xdiv, ydiv)`, without moving anything
    pub(crate) fn split_counts(&self, xdiv: u32, ydiv: u32) -> Vec<[usize; 3]> {
        let grid = Grid::new(&self.bounds, xdiv, ydiv);
        let mut counts = vec![[0; 3]; grid.cell_count()];

        for point in &self.points {
            counts[grid.cell_of(&point.location)][0] += 1;
        }
        for line in &self.lines {
            for cell in cells_touched(&grid, &self.bounds, line.points()) {
                counts[cell][1] += 1;
            }
        }
        for shape in &self.shapes {
            for cell in cells_touched(&grid, &self.bounds, shape.points()) {
                counts[cell][2] += 1;
            }
        }
        counts
    }

    /// Split into an `xdiv` × `ydiv` grid and hand every feature to the
    /// cell(s) it overlaps. Cells are returned row-major from the south-west.
    pub fn split(self, xdiv: u32, ydiv: u32) -> Vec<MapArea> {
        let grid = Grid::new(&self.bounds, xdiv, ydiv);
        let mut areas: Vec<MapArea> = self
            .bounds
            .split(xdiv, ydiv)
            .into_iter()
            .map(MapArea::empty)
            .collect();
        debug_assert_eq!(areas.len(), grid.cell_count());

        for point in self.points {
            let cell = grid.cell_of(&point.location);
            areas[cell].points.push(point);
        }

        for line in self.lines {
            for cell in cells_touched(&grid, &self.bounds, line.points()) {
                areas[cell].lines.push(line.clone());
            }
        }

        for shape in self.shapes {
            for cell in cells_touched(&grid, &self.bounds, shape.points()) {
                areas[cell].shapes.push(shape.clone());
            }
        }

        areas
    }
}

/// Upper row edges are open; a segment ending exactly on one belongs to the row above
const ROW_EDGE: f64 = 1e-6;

/// Positions this close to a grid line are taken to be on it
const SNAP: f64 = 1e-7;

/// Cells crossed by the polyline, ascending
///
/// Only the parts of segments inside `bounds` count. A polyline lying wholly
/// outside goes to the edge cell nearest its first point.
fn cells_touched(grid: &Grid, bounds: &Area, points: &[CoordRef]) -> Cells {
    let mut cells = Cells::new();
    match points {
        [] => cells.push(0),
        [only] => cells.push(grid.cell_of(only)),
        _ => {
            for segment in points.windows(2) {
                segment_cells(grid, bounds, &segment[0], &segment[1], &mut cells);
            }
            if cells.is_empty() {
                cells.push(grid.cell_of(&points[0]));
            }
            cells.sort_unstable();
            cells.dedup();
        }
    }
    cells
}

/// Push the cells the segment `a`-`b` passes through, walking row by row
///
/// Duplicates are left for the caller to remove.
fn segment_cells(grid: &Grid, bounds: &Area, a: &Coordinate, b: &Coordinate, cells: &mut Cells) {
    let start = (a.longitude() as f64, a.latitude() as f64);
    let delta = (
        b.longitude() as f64 - start.0,
        b.latitude() as f64 - start.1,
    );
    let at = |t: f64| (snap(start.0 + t * delta.0), snap(start.1 + t * delta.1));

    let Some((t0, t1)) = clip(
        start,
        delta,
        (bounds.min_lon() as f64, bounds.min_lat() as f64),
        (bounds.max_lon() as f64, bounds.max_lat() as f64),
    ) else {
        return;
    };

    let (lat0, lat1) = (at(t0).1, at(t1).1);
    let first_row = grid.row_of(lat0.min(lat1).floor() as i32);
    let last_row = grid.row_of(lat0.max(lat1).floor() as i32);

    for row in first_row..=last_row {
        let (low, high) = grid.row_span(row);
        let high = if row + 1 < grid.rows() {
            high as f64 - ROW_EDGE
        } else {
            high as f64
        };
        let Some((s0, s1)) = clip(
            start,
            delta,
            (f64::NEG_INFINITY, low as f64),
            (f64::INFINITY, high),
        ) else {
            continue;
        };
        let (s0, s1) = (s0.max(t0), s1.min(t1));
        if s0 > s1 {
            continue;
        }

        let (lon0, lon1) = (at(s0).0, at(s1).0);
        let first_column = grid.column_of(lon0.min(lon1).floor() as i32);
        let last_column = grid.column_of(lon0.max(lon1).floor() as i32);
        cells.extend((first_column..=last_column).map(|column| row * grid.columns() + column));
    }
}

/// Parameter range of `start + t * delta`, `t` in `0..=1`, inside the closed box `min..=max`
///
/// Liang–Barsky clipping; `None` if the segment misses the box.
fn clip(start: (f64, f64), delta: (f64, f64), min: (f64, f64), max: (f64, f64)) -> Option<(f64, f64)> {
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-delta.0, start.0 - min.0),
        (delta.0, max.0 - start.0),
        (-delta.1, start.1 - min.1),
        (delta.1, max.1 - start.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

#[inline]
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < SNAP {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementInfo;

    fn at(lat: i32, lon: i32) -> CoordRef {
        Arc::new(Coordinate::from_map_units(lat, lon))
    }

    fn point(lat: i32, lon: i32) -> MapPoint {
        MapPoint::new(ElementInfo::new(0x2f00), at(lat, lon))
    }

    fn line(coords: &[(i32, i32)]) -> Arc<MapLine> {
        Arc::new(MapLine::new(
            ElementInfo::new(0x01),
            coords.iter().map(|&(lat, lon)| at(lat, lon)).collect(),
        ))
    }

    #[test]
    fn test_points_go_to_exactly_one_cell() {
        let points = (0..100)
            .flat_map(|lat| (0..10).map(move |lon| point(lat * 10, lon * 100)))
            .collect::<Vec<_>>();
        let tile = MapArea::new(Area::new(0, 0, 1000, 1000), points, Vec::new(), Vec::new());

        let cells = tile.split(2, 2);
        let total: usize = cells.iter().map(MapArea::point_count).sum();
        assert_eq!(total, 1000);
        for cell in &cells {
            for p in cell.points() {
                assert!(cell.bounds().contains(&p.location));
            }
        }
    }

    #[test]
    fn test_line_inside_one_cell_not_duplicated() {
        let tile = MapArea::new(
            Area::new(0, 0, 100, 100),
            Vec::new(),
            vec![line(&[(10, 10), (20, 30), (5, 40)])],
            Vec::new(),
        );
        let cells = tile.split(2, 2);
        assert_eq!(cells.iter().map(MapArea::line_count).sum::<usize>(), 1);
        assert_eq!(cells[0].line_count(), 1);
    }

    #[test]
    fn test_straddling_line_goes_to_every_touched_cell() {
        // Runs along the south edge from west to east, then north in the east
        let shared = line(&[(10, 10), (10, 90), (90, 90)]);
        let tile = MapArea::new(
            Area::new(0, 0, 100, 100),
            Vec::new(),
            vec![shared.clone()],
            Vec::new(),
        );
        let cells = tile.split(2, 2);
        let counts: Vec<usize> = cells.iter().map(MapArea::line_count).collect();
        assert_eq!(counts, vec![1, 1, 0, 1]);
        assert!(Arc::ptr_eq(&cells[3].lines()[0], &shared));
    }

    #[test]
    fn test_shapes_follow_lines_policy() {
        let ring = [(10, 10), (10, 90), (90, 90), (90, 10), (10, 10)];
        let shape = Arc::new(MapShape::new(
            ElementInfo::new(0x4a),
            ring.iter().map(|&(lat, lon)| at(lat, lon)).collect(),
        ));
        let tile = MapArea::new(Area::new(0, 0, 100, 100), Vec::new(), Vec::new(), vec![shape]);
        let cells = tile.split(2, 2);
        assert!(cells.iter().all(|c| c.shape_count() == 1));
    }

    #[test]
    fn test_split_bounds_union_equals_input() {
        let bounds = Area::new(-500, 300, 777, 1234);
        let cells = MapArea::empty(bounds).split(3, 2);
        assert_eq!(cells.len(), 6);
        let union = cells
            .iter()
            .skip(1)
            .fold(*cells[0].bounds(), |acc, c| acc.union(c.bounds()));
        assert_eq!(union, bounds);
    }

    #[test]
    fn test_segments_outside_tile_are_ignored() {
        // Enters the tile from the north-east corner; the far part lies outside
        let tile = MapArea::new(
            Area::new(0, 0, 100, 100),
            Vec::new(),
            vec![line(&[(5000, 90), (90, 90), (90, 60)])],
            Vec::new(),
        );
        let cells = tile.split(2, 2);
        let counts: Vec<usize> = cells.iter().map(MapArea::line_count).collect();
        assert_eq!(counts, vec![0, 0, 0, 1]);

        // Wholly outside: still kept, in the nearest edge cell
        let tile = MapArea::new(
            Area::new(0, 0, 100, 100),
            Vec::new(),
            vec![line(&[(500, 10), (600, 20)])],
            Vec::new(),
        );
        let counts: Vec<usize> = tile.split(2, 2).iter().map(MapArea::line_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_diagonal_line_only_in_crossed_cells() {
        let tile = MapArea::new(
            Area::new(0, 0, 900, 900),
            Vec::new(),
            vec![line(&[(0, 0), (900, 900)])],
            Vec::new(),
        );
        let counts: Vec<usize> = tile.split(3, 3).iter().map(MapArea::line_count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 1, 0, 0, 0, 1]);

        // Falling from the north-west, missing the grid corners
        let tile = MapArea::new(
            Area::new(0, 0, 900, 900),
            Vec::new(),
            vec![line(&[(800, 0), (0, 800)])],
            Vec::new(),
        );
        let cells = tile.split(3, 3);
        let owners: Vec<usize> = (0..9).filter(|&i| cells[i].line_count() == 1).collect();
        assert_eq!(owners, vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_shallow_line_crosses_columns_within_its_row() {
        // Rises 100 units over the full width, staying in the bottom row
        let tile = MapArea::new(
            Area::new(0, 0, 900, 900),
            Vec::new(),
            vec![line(&[(10, 0), (110, 900)])],
            Vec::new(),
        );
        let counts: Vec<usize> = tile.split(3, 3).iter().map(MapArea::line_count).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_split_counts_match_split() {
        let tile = MapArea::new(
            Area::new(0, 0, 100, 100),
            vec![point(5, 5), point(60, 60), point(70, 20)],
            vec![
                line(&[(10, 10), (10, 90), (90, 90)]),
                line(&[(0, 0), (100, 100)]),
            ],
            Vec::new(),
        );
        let counts = tile.split_counts(2, 2);
        let split: Vec<[usize; 3]> = tile.split(2, 2).iter().map(MapArea::counts).collect();
        assert_eq!(counts, split);
        assert_eq!(counts[0], [1, 2, 0]);
    }

    #[test]
    fn test_exceeds() {
        let tile = MapArea::new(
            Area::new(0, 0, 10, 10),
            vec![point(1, 1), point(2, 2)],
            Vec::new(),
            Vec::new(),
        );
        assert!(tile.exceeds(1));
        assert!(!tile.exceeds(2));
    }
}
