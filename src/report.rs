use map_tile_lib::{Area, CollectionInfo, LevelInfo, LevelTiles};
use serde::Serialize;

/// JSON summary printed after a run
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// What was read from the input files
    pub input: CollectionInfo,
    /// Bounding area of the input in map units
    pub bounds: Option<Area>,
    /// One entry per resolution, in build order
    pub levels: Vec<LevelInfo>,
}

impl Summary {
    pub fn new(input: CollectionInfo, bounds: Option<Area>, levels: &[LevelTiles]) -> Self {
        Self {
            input,
            bounds,
            levels: levels.iter().map(LevelTiles::info).collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
