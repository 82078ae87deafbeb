use crate::config::{get_env, get_env_list};
use clap::Parser;
use map_tile_lib::{Config, SplitLimits};
use std::path::PathBuf;

pub const ENV_FILTER_DISTANCE: &str = "MAP_TILER_FILTER_DISTANCE";
pub const ENV_MAX_DIVISION_SIZE: &str = "MAP_TILER_MAX_DIVISION_SIZE";
pub const ENV_MAX_FEATURE_COUNT: &str = "MAP_TILER_MAX_FEATURE_COUNT";
pub const ENV_RESOLUTIONS: &str = "MAP_TILER_RESOLUTIONS";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Map Tiler - Splits GPS tracks and waypoints into bounded, simplified tiles for every map resolution
pub struct Settings {
    /// GPX files to tile
    #[clap(value_name = "FILE", required = true)]
    pub gpx_files: Vec<PathBuf>,

    /// Overlay definitions (`type: type, type` per line) applied to incoming lines
    #[clap(short, long, value_name = "FILE")]
    pub overlays: Option<PathBuf>,

    /// Output resolutions in bits, highest detail first [env: MAP_TILER_RESOLUTIONS] [default: 24,22,20,18]
    #[clap(short, long, value_delimiter = ',')]
    pub resolutions: Option<Vec<u8>>,

    /// Allowed simplification error in meters at resolution 24 [env: MAP_TILER_FILTER_DISTANCE] [default: 2.6]
    #[clap(short, long)]
    pub filter_distance: Option<f64>,

    /// Largest tile side in map units [env: MAP_TILER_MAX_DIVISION_SIZE] [default: 0x3fff]
    #[clap(long, value_parser = parse_number)]
    pub max_division_size: Option<u32>,

    /// Most points, lines or shapes in one tile [env: MAP_TILER_MAX_FEATURE_COUNT] [default: 3000]
    #[clap(long)]
    pub max_feature_count: Option<usize>,

    /// Deepest density split before an oversized tile is accepted as is
    #[clap(long, default_value_t = map_tile_lib::MAX_DEPTH)]
    pub max_depth: u32,

    /// Line type given to tracks and routes
    #[clap(long, default_value = "0x06", value_parser = parse_number)]
    pub line_type: u32,

    /// Point type given to waypoints
    #[clap(long, default_value = "0x2f00", value_parser = parse_number)]
    pub point_type: u32,

    /// Pretty-print the JSON summary
    #[clap(long, default_value = "false")]
    pub pretty: bool,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Library configuration: command line first, then environment, then defaults
    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        Config {
            filter_distance: self
                .filter_distance
                .or_else(|| get_env(ENV_FILTER_DISTANCE))
                .unwrap_or(defaults.filter_distance),
            limits: SplitLimits {
                max_division_size: self
                    .max_division_size
                    .or_else(|| get_env::<String>(ENV_MAX_DIVISION_SIZE).and_then(|s| parse_number(&s).ok()))
                    .unwrap_or(defaults.limits.max_division_size),
                max_feature_count: self
                    .max_feature_count
                    .or_else(|| get_env(ENV_MAX_FEATURE_COUNT))
                    .unwrap_or(defaults.limits.max_feature_count),
                max_depth: self.max_depth,
            },
            resolutions: self
                .resolutions
                .clone()
                .or_else(|| get_env_list(ENV_RESOLUTIONS))
                .unwrap_or(defaults.resolutions),
        }
    }
}

/// Decimal or `0x` prefixed hexadecimal
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x3fff"), Ok(0x3fff));
        assert_eq!(parse_number("16383"), Ok(16383));
        assert_eq!(parse_number(" 0X2F00 "), Ok(0x2f00));
        assert!(parse_number("0xzz").is_err());
        assert!(parse_number("-1").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let settings = Settings::try_parse_from([
            "map-tiler",
            "a.gpx",
            "b.gpx",
            "--resolutions",
            "24,20,16",
            "--filter-distance",
            "5",
            "--max-division-size",
            "0x1000",
            "--line-type",
            "0x01",
        ])
        .unwrap();
        assert_eq!(settings.gpx_files.len(), 2);
        assert_eq!(settings.line_type, 0x01);
        assert_eq!(settings.point_type, 0x2f00);

        let config = settings.to_config();
        assert_eq!(config.resolutions, vec![24, 20, 16]);
        assert_eq!(config.filter_distance, 5.0);
        assert_eq!(config.limits.max_division_size, 0x1000);
        assert_eq!(config.limits.max_depth, map_tile_lib::MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_files_are_required() {
        assert!(Settings::try_parse_from(["map-tiler"]).is_err());
    }
}
