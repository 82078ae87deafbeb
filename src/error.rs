use thiserror::Error;

/// Errors reported by the command line front end
#[derive(Debug, Error)]
pub enum AppError {
    #[error("GPX parsing error in {path}: {source}")]
    GpxParse {
        path: String,
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tiling(#[from] map_tile_lib::TilingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Nothing to tile: no usable points in the input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, AppError>;
