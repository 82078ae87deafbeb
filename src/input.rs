//! GPX input: files are parsed in parallel, then turned into map features
//!
//! Track segments and routes become lines, waypoints become points. Each GPX
//! point gets its own coordinate; lines are only shared with the tiles they
//! end up in.

use crate::error::{AppError, Result};
use map_tile_lib::{CoordRef, Coordinate, ElementInfo, FeatureCollection, MapLine, MapPoint};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Feature types given to imported GPX elements
#[derive(Debug, Clone, Copy)]
pub struct FeatureKinds {
    pub line: u32,
    pub point: u32,
}

/// Counts of what was taken from the GPX data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub lines: usize,
    pub points: usize,
    pub skipped_coordinates: usize,
}

/// Load GPX files in parallel
pub fn load_gpx_files(paths: &[PathBuf]) -> Result<Vec<gpx::Gpx>> {
    paths.par_iter().map(|path| read_gpx(path)).collect()
}

fn read_gpx(path: &Path) -> Result<gpx::Gpx> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let gpx = gpx::read(reader).map_err(|source| AppError::GpxParse {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        tracks = gpx.tracks.len(),
        routes = gpx.routes.len(),
        waypoints = gpx.waypoints.len(),
        "parsed GPX file"
    );
    Ok(gpx)
}

/// Add the tracks, routes and waypoints of `gpx` to `collection`
pub fn add_gpx(
    collection: &mut FeatureCollection,
    gpx: &gpx::Gpx,
    kinds: FeatureKinds,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    for track in &gpx.tracks {
        for segment in &track.segments {
            add_line(collection, &segment.points, track.name.as_deref(), kinds, &mut stats)?;
        }
    }

    for route in &gpx.routes {
        add_line(collection, &route.points, route.name.as_deref(), kinds, &mut stats)?;
    }

    for waypoint in &gpx.waypoints {
        match to_coordinate(waypoint) {
            Some(location) => {
                collection.add_point(MapPoint::new(info(kinds.point, waypoint.name.as_deref()), location));
                stats.points += 1;
            }
            None => stats.skipped_coordinates += 1,
        }
    }

    Ok(stats)
}

fn add_line(
    collection: &mut FeatureCollection,
    waypoints: &[gpx::Waypoint],
    name: Option<&str>,
    kinds: FeatureKinds,
    stats: &mut ImportStats,
) -> Result<()> {
    let points: Vec<CoordRef> = waypoints.iter().filter_map(to_coordinate).collect();
    stats.skipped_coordinates += waypoints.len() - points.len();

    if points.is_empty() {
        if !waypoints.is_empty() {
            tracing::warn!(name, "skipping line without usable points");
        }
        return Ok(());
    }

    collection.add_line(MapLine::new(info(kinds.line, name), points))?;
    stats.lines += 1;
    Ok(())
}

fn info(kind: u32, name: Option<&str>) -> ElementInfo {
    let info = ElementInfo::new(kind);
    match name {
        Some(name) => info.with_name(name),
        None => info,
    }
}

/// Coordinates outside the valid latitude/longitude ranges are dropped
fn to_coordinate(waypoint: &gpx::Waypoint) -> Option<CoordRef> {
    let point = waypoint.point();
    let valid = point.y().is_finite()
        && point.x().is_finite()
        && (-90.0..=90.0).contains(&point.y())
        && (-180.0..=180.0).contains(&point.x());
    if !valid {
        tracing::warn!(
            "Skipping point outside the map: ({}, {})",
            point.y(),
            point.x()
        );
        return None;
    }
    Some(Arc::new(Coordinate::from(point)))
}
