//! Utility functions for converting between degrees and the integer map grids
//!
//! Two grids are used throughout the crate:
//! - map units: 24 bits per axis, one unit is 360/2^24 degrees
//! - high precision: 30 bits per axis, one unit is 360/2^30 degrees

/// Number of bits per axis in the map unit grid
pub const MAP_UNIT_BITS: u32 = 24;

/// Number of bits per axis in the high precision grid
pub const HIGH_PRECISION_BITS: u32 = 30;

/// Difference in bits between the two grids
pub const HIGH_PRECISION_SHIFT: u32 = HIGH_PRECISION_BITS - MAP_UNIT_BITS;

/// Circumference of the Earth at the equator in meters
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_000.0;

/// Precomputed constant: meters per degree along a great circle
pub const METERS_PER_DEGREE: f64 = EARTH_CIRCUMFERENCE_METERS / 360.0;

/// Precomputed constant: 2^24 / 360
const DEGREES_TO_MAP_UNIT: f64 = (1u64 << MAP_UNIT_BITS) as f64 / 360.0;

/// Precomputed constant: 2^30 / 360
const DEGREES_TO_BIT30: f64 = (1u64 << HIGH_PRECISION_BITS) as f64 / 360.0;

/// Half a map unit in degrees, added before truncation to round to nearest
const MAP_UNIT_ROUNDING: f64 = 360.0 / (1u64 << MAP_UNIT_BITS) as f64 / 2.0;

/// Half a high precision unit in degrees
const BIT30_ROUNDING: f64 = 360.0 / (1u64 << HIGH_PRECISION_BITS) as f64 / 2.0;

/// Precomputed constant: radians per high precision unit
const BIT30_TO_RADIANS: f64 = 2.0 * std::f64::consts::PI / (1u64 << HIGH_PRECISION_BITS) as f64;

/// Convert decimal degrees to map units, rounding to the nearest unit
///
/// The rounding bias moves away from zero before the truncating cast so that
/// negative and positive inputs round symmetrically.
#[inline(always)]
pub fn to_map_unit(degrees: f64) -> i32 {
    if degrees > 0.0 {
        ((degrees + MAP_UNIT_ROUNDING) * DEGREES_TO_MAP_UNIT) as i32
    } else {
        ((degrees - MAP_UNIT_ROUNDING) * DEGREES_TO_MAP_UNIT) as i32
    }
}

/// Convert decimal degrees to the 30 bit high precision grid
#[inline(always)]
pub fn to_bit30(degrees: f64) -> i32 {
    if degrees > 0.0 {
        ((degrees + BIT30_ROUNDING) * DEGREES_TO_BIT30) as i32
    } else {
        ((degrees - BIT30_ROUNDING) * DEGREES_TO_BIT30) as i32
    }
}

/// Convert map units back to decimal degrees
#[inline(always)]
pub fn map_unit_to_degrees(units: i32) -> f64 {
    units as f64 / DEGREES_TO_MAP_UNIT
}

/// Convert a high precision value back to decimal degrees
#[inline(always)]
pub fn bit30_to_degrees(value: i32) -> f64 {
    value as f64 / DEGREES_TO_BIT30
}

/// Convert a high precision value to radians
#[inline(always)]
pub fn bit30_to_radians(value: i32) -> f64 {
    value as f64 * BIT30_TO_RADIANS
}

/// Round a high precision value to the nearest map unit (half up)
#[inline(always)]
pub fn bit30_to_map_unit(value: i32) -> i32 {
    (value + (1 << (HIGH_PRECISION_SHIFT - 1))) >> HIGH_PRECISION_SHIFT
}
