//! Map Tile Library - Geometry Core for Tiled Multi-Resolution Maps
//!
//! This library turns styled vector features (points, lines, polygons) into
//! bounded tiles with geometry simplified for each output resolution of a
//! fixed-precision map format.
//!
//! # Architecture
//!
//! - **[`Coordinate`]**: 24 bit map unit position plus a 30 bit residual, shared by reference
//! - **[`DouglasPeuckerFilter`]**: Per-resolution line reduction that never drops preserved points
//! - **[`Area`]** / **[`MapArea`]**: Bounding boxes and tiles that own features
//! - **[`MapSplitter`]**: Extent then density splitting into bounded tiles
//! - **[`MapBuilder`]**: Runs splitting and simplification for every resolution
//!
//! # Concurrency
//!
//! Coordinates are `Arc`-shared with atomic attribute flags. Flags must be set
//! before building starts; building itself only reads them, so top-level tiles
//! and the tiles of one level are processed in parallel with rayon.

mod area;
mod builder;
mod collection;
mod coord;
mod feature;
mod overlay;
mod partition;
pub mod simplify;
mod tile;
pub mod utils;

// Public API exports
pub use area::Area;
pub use builder::{Config, LevelInfo, LevelTiles, MapBuilder};
pub use collection::{CollectionInfo, FeatureCollection};
pub use coord::{CoordRef, Coordinate, DEFAULT_OSM_ZOOM};
pub use feature::{ElementInfo, LineLike, MapLine, MapPoint, MapShape};
pub use overlay::Overlays;
pub use partition::{MAX_DEPTH, MAX_DIVISION_SIZE, MAX_FEATURE_COUNT, MapSplitter, SplitLimits};
pub use simplify::{DouglasPeuckerFilter, FilterConfig, MAX_RESOLUTION};
pub use tile::MapArea;

/// Error types for the tiling library
#[derive(Debug, thiserror::Error)]
pub enum TilingError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Overlay syntax error on line {line}: {message}")]
    OverlaySyntax { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TilingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the main entry points are accessible
        let _: fn(Config) -> Result<MapBuilder> = MapBuilder::new;
        let _: fn() -> Config = Config::default;
        let _: fn() -> FeatureCollection = FeatureCollection::new;
    }

    #[test]
    fn test_error_display() {
        let err = TilingError::OverlaySyntax {
            line: 3,
            message: "Expecting a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Overlay syntax error on line 3: Expecting a number"
        );
    }
}
