//! Map Tiler - command line front end for `map-tile-lib`
//!
//! Reads GPX files, tiles and simplifies them for every configured resolution
//! and reports what was produced.

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod report;
pub mod settings;

pub use error::{AppError, Result};
pub use report::Summary;
pub use settings::Settings;

use input::FeatureKinds;
use map_tile_lib::{FeatureCollection, MapBuilder, Overlays};

/// Load the input, build every level and summarise the result
pub fn run(settings: &Settings) -> Result<Summary> {
    let builder = MapBuilder::new(settings.to_config())?;

    let mut collection = match &settings.overlays {
        Some(path) => {
            let overlays = Overlays::from_file(path)?;
            tracing::info!(path = %path.display(), definitions = overlays.len(), "loaded overlays");
            FeatureCollection::with_overlays(overlays)
        }
        None => FeatureCollection::new(),
    };

    let kinds = FeatureKinds {
        line: settings.line_type,
        point: settings.point_type,
    };
    for (path, gpx) in settings
        .gpx_files
        .iter()
        .zip(input::load_gpx_files(&settings.gpx_files)?)
    {
        let stats = input::add_gpx(&mut collection, &gpx, kinds)?;
        tracing::info!(
            path = %path.display(),
            lines = stats.lines,
            points = stats.points,
            skipped = stats.skipped_coordinates,
            "imported GPX file"
        );
    }

    if collection.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let levels = builder.build(&collection)?;
    Ok(Summary::new(collection.info(), collection.bounds(), &levels))
}
