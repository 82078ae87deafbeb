//! MapBuilder - turns a feature collection into simplified tiles per resolution
//!
//! For every configured resolution the features visible at that resolution are
//! split into tiles, then every line and shape in every tile is simplified
//! for that resolution.

use crate::{
    DouglasPeuckerFilter, FeatureCollection, FilterConfig, LineLike, MapArea, MapSplitter, Result,
    SplitLimits, TilingError,
};
use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for building tiles
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Allowed simplification error in meters at the highest resolution
    pub filter_distance: f64,
    /// Tile size and density limits
    pub limits: SplitLimits,
    /// Output resolutions (bits per coordinate), built in this order
    pub resolutions: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter_distance: crate::simplify::DEFAULT_FILTER_DISTANCE,
            limits: SplitLimits::default(),
            resolutions: vec![24, 22, 20, 18],
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(self.filter_distance >= 0.0 && self.filter_distance.is_finite()) {
            return Err(TilingError::InvalidConfig(format!(
                "filter distance {} must be a non-negative number",
                self.filter_distance
            )));
        }
        if self.resolutions.is_empty() {
            return Err(TilingError::InvalidConfig(
                "at least one resolution is required".to_string(),
            ));
        }
        for &resolution in &self.resolutions {
            FilterConfig::new(resolution)?;
        }
        self.limits.validate()
    }
}

/// The tiles of one output resolution
#[derive(Debug, Clone)]
pub struct LevelTiles {
    pub resolution: u8,
    pub tiles: Vec<MapArea>,
    /// Coordinates in lines and shapes before simplification, summed over tiles
    pub input_coordinates: usize,
}

/// Summary of one output resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelInfo {
    pub resolution: u8,
    pub tile_count: usize,
    pub point_count: usize,
    pub line_count: usize,
    pub shape_count: usize,
    pub input_coordinates: usize,
    pub output_coordinates: usize,
    /// Largest feature count of any kind in a single tile
    pub max_features_per_tile: usize,
}

impl LevelTiles {
    pub fn info(&self) -> LevelInfo {
        LevelInfo {
            resolution: self.resolution,
            tile_count: self.tiles.len(),
            point_count: self.tiles.iter().map(MapArea::point_count).sum(),
            line_count: self.tiles.iter().map(MapArea::line_count).sum(),
            shape_count: self.tiles.iter().map(MapArea::shape_count).sum(),
            input_coordinates: self.input_coordinates,
            output_coordinates: self.tiles.iter().map(MapArea::coordinate_count).sum(),
            max_features_per_tile: self
                .tiles
                .iter()
                .map(|t| t.point_count().max(t.line_count()).max(t.shape_count()))
                .max()
                .unwrap_or(0),
        }
    }
}

/// Builds per-resolution tile sets from a feature collection
#[derive(Debug, Clone)]
pub struct MapBuilder {
    config: Config,
    splitter: MapSplitter,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapBuilder {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let splitter = MapSplitter::new(config.limits)?;
        Ok(Self { config, splitter })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build every configured resolution
    ///
    /// An empty collection yields no levels.
    pub fn build(&self, collection: &FeatureCollection) -> Result<Vec<LevelTiles>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("builder::build");

        let Some(bounds) = collection.bounds() else {
            tracing::warn!("nothing to build, the feature collection is empty");
            return Ok(Vec::new());
        };

        self.config
            .resolutions
            .iter()
            .map(|&resolution| {
                let area = collection.area_for_resolution(bounds, resolution);
                self.build_level(area, resolution)
            })
            .collect()
    }

    /// Split one tile and simplify its contents for `resolution`
    pub fn build_level(&self, area: MapArea, resolution: u8) -> Result<LevelTiles> {
        #[cfg(feature = "profiling")]
        profiling::scope!("builder::build_level");

        let filter = DouglasPeuckerFilter::new(
            self.config.filter_distance,
            FilterConfig::new(resolution)?,
        );

        let mut tiles = self.splitter.split(area);
        let input_coordinates = tiles.iter().map(MapArea::coordinate_count).sum();

        // Lines straddling tiles are shared; simplify each one only once
        let line_cache = DashMap::new();
        let shape_cache = DashMap::new();
        tiles.par_iter_mut().for_each(|tile| {
            for line in tile.lines_mut().iter_mut() {
                *line = simplify_cached(&filter, &line_cache, line);
            }
            for shape in tile.shapes_mut().iter_mut() {
                *shape = simplify_cached(&filter, &shape_cache, shape);
            }
        });

        let level = LevelTiles {
            resolution,
            tiles,
            input_coordinates,
        };
        let info = level.info();
        tracing::info!(
            resolution,
            tiles = info.tile_count,
            input_coordinates = info.input_coordinates,
            output_coordinates = info.output_coordinates,
            "built level"
        );
        Ok(level)
    }
}

/// Simplify `element`, reusing the result for other tiles sharing the same `Arc`
///
/// The cache keeps the original alive, so its address stays unique while cached.
/// Filtering runs without holding a shard lock; if two tiles race on the same
/// line, the first result stored wins and both get it.
fn simplify_cached<L: LineLike>(
    filter: &DouglasPeuckerFilter,
    cache: &DashMap<usize, (Arc<L>, Arc<L>)>,
    element: &Arc<L>,
) -> Arc<L> {
    let key = Arc::as_ptr(element) as usize;
    if let Some(cached) = cache.get(&key) {
        return cached.1.clone();
    }

    let simplified = filter.filter(element);
    cache
        .entry(key)
        .or_insert((element.clone(), simplified))
        .1
        .clone()
}
