//! Geographic coordinates held in two precisions at once
//!
//! A [`Coordinate`] stores its position as 24 bit map units plus a signed byte
//! per axis that recovers the 30 bit high precision value. The high precision
//! value is computed once from degrees and never derived from floating point
//! again, so repeated quantization across output resolutions cannot drift.
//!
//! Coordinates are shared between every feature that uses them (see
//! [`CoordRef`]). Their attribute flags are atomics, so setting a flag through
//! one feature is visible to all others.

use crate::utils;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

/// Shared handle to a coordinate
pub type CoordRef = Arc<Coordinate>;

const ON_BOUNDARY_MASK: u8 = 0x01;
const PRESERVED_MASK: u8 = 0x02;
const REPLACED_MASK: u8 = 0x04;
const TREAT_AS_NODE_MASK: u8 = 0x08;
const FIXME_MASK: u8 = 0x10;

/// Saturation limit for the line reference counter
const MAX_LINE_COUNT: u8 = i8::MAX as u8;

/// Zoom used by [`Coordinate::to_osm_url`] when none is given
pub const DEFAULT_OSM_ZOOM: u32 = 17;

/// A point in map units with a high precision residual and attribute flags
pub struct Coordinate {
    /// Latitude in map units
    latitude: i32,
    /// Longitude in map units
    longitude: i32,
    /// `(latitude << 6) - lat30`
    lat_delta: i8,
    /// `(longitude << 6) - lon30`
    lon_delta: i8,
    /// Number of lines referencing this point (saturating)
    line_count: AtomicU8,
    /// Attribute bits, see the `*_MASK` constants
    flags: AtomicU8,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Coordinate {
    /// Create a coordinate from decimal degrees
    ///
    /// Map units and the 30 bit values are both computed from the input and the
    /// difference between them is stored as the per-axis delta.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        let lat24 = utils::to_map_unit(latitude);
        let lon24 = utils::to_map_unit(longitude);
        let lat30 = utils::to_bit30(latitude);
        let lon30 = utils::to_bit30(longitude);

        let lat_delta = ((lat24 << utils::HIGH_PRECISION_SHIFT) - lat30) as i8;
        let lon_delta = ((lon24 << utils::HIGH_PRECISION_SHIFT) - lon30) as i8;

        let coord = Self::with_deltas(lat24, lon24, lat_delta, lon_delta);
        debug_assert_eq!(coord.high_prec_lat(), lat30, "latitude delta out of range");
        debug_assert_eq!(coord.high_prec_lon(), lon30, "longitude delta out of range");
        coord
    }

    /// Create a coordinate from values that are already in map units
    pub fn from_map_units(latitude: i32, longitude: i32) -> Self {
        Self::with_deltas(latitude, longitude, 0, 0)
    }

    /// Create a coordinate at a 30 bit position, rounding to the nearest map unit
    pub fn from_high_precision(lat30: i32, lon30: i32) -> Self {
        let lat24 = utils::bit30_to_map_unit(lat30);
        let lon24 = utils::bit30_to_map_unit(lon30);
        let lat_delta = ((lat24 << utils::HIGH_PRECISION_SHIFT) - lat30) as i8;
        let lon_delta = ((lon24 << utils::HIGH_PRECISION_SHIFT) - lon30) as i8;
        Self::with_deltas(lat24, lon24, lat_delta, lon_delta)
    }

    fn with_deltas(latitude: i32, longitude: i32, lat_delta: i8, lon_delta: i8) -> Self {
        Self {
            latitude,
            longitude,
            lat_delta,
            lon_delta,
            line_count: AtomicU8::new(0),
            flags: AtomicU8::new(0),
        }
    }

    /// A new coordinate at the same high precision position with cleared attributes
    pub fn copy_position(&self) -> Self {
        Self::with_deltas(self.latitude, self.longitude, self.lat_delta, self.lon_delta)
    }

    /// Latitude in map units
    #[inline]
    pub fn latitude(&self) -> i32 {
        self.latitude
    }

    /// Longitude in map units
    #[inline]
    pub fn longitude(&self) -> i32 {
        self.longitude
    }

    /// Latitude on the 30 bit grid
    #[inline]
    pub fn high_prec_lat(&self) -> i32 {
        (self.latitude << utils::HIGH_PRECISION_SHIFT) - self.lat_delta as i32
    }

    /// Longitude on the 30 bit grid
    #[inline]
    pub fn high_prec_lon(&self) -> i32 {
        (self.longitude << utils::HIGH_PRECISION_SHIFT) - self.lon_delta as i32
    }

    /// Latitude in degrees, from the high precision value
    #[inline]
    pub fn lat_degrees(&self) -> f64 {
        utils::bit30_to_degrees(self.high_prec_lat())
    }

    /// Longitude in degrees, from the high precision value
    #[inline]
    pub fn lon_degrees(&self) -> f64 {
        utils::bit30_to_degrees(self.high_prec_lon())
    }

    /// Point on the straight line to `other` at `fraction` (0 = self, 1 = other)
    ///
    /// Works on the 30 bit values so the new point keeps sub-unit precision.
    pub fn interpolate(&self, other: &Coordinate, fraction: f64) -> Coordinate {
        let lat30 = self.high_prec_lat() as f64
            + (other.high_prec_lat() - self.high_prec_lat()) as f64 * fraction;
        let lon30 = self.high_prec_lon() as f64
            + (other.high_prec_lon() - self.high_prec_lon()) as f64 * fraction;
        Coordinate::from_high_precision(lat30 as i32, lon30 as i32)
    }

    /// Squared planar distance in degrees², with wraparound correction
    pub fn distance_in_degrees_squared(&self, other: &Coordinate) -> f64 {
        if self == other {
            return 0.0;
        }

        let lat1 = self.lat_degrees();
        let lat2 = other.lat_degrees();
        let lon1 = self.lon_degrees();
        let lon2 = other.lon_degrees();

        let mut lat_diff = (lat1 - lat2).abs();
        if lat_diff > 90.0 {
            lat_diff -= 180.0;
        }

        let mut lon_diff = (lon1 - lon2).abs();
        if lon_diff > 180.0 {
            lon_diff -= 360.0;
        }

        // Scale longitude by the cosine of the mean latitude
        lon_diff *= ((lat1 + lat2) / 2.0).abs().to_radians().cos();

        lat_diff * lat_diff + lon_diff * lon_diff
    }

    /// Approximate distance to `other` in meters (equirectangular)
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        self.distance_in_degrees_squared(other).sqrt() * utils::METERS_PER_DEGREE
    }

    /// Distance in meters to the closest point of the segment `a`-`b`
    pub fn shortest_distance_to_segment(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        let a_lat = a.high_prec_lat() as f64;
        let a_lon = a.high_prec_lon() as f64;
        let delta_lat = b.high_prec_lat() as f64 - a_lat;
        let delta_lon = b.high_prec_lon() as f64 - a_lon;

        let frac = if delta_lat == 0.0 && delta_lon == 0.0 {
            0.0
        } else {
            ((self.high_prec_lon() as f64 - a_lon) * delta_lon
                + (self.high_prec_lat() as f64 - a_lat) * delta_lat)
                / (delta_lon * delta_lon + delta_lat * delta_lat)
        };

        if frac <= 0.0 {
            a.distance_meters(self)
        } else if frac >= 1.0 {
            b.distance_meters(self)
        } else {
            self.distance_meters(&a.interpolate(b, frac))
        }
    }

    /// Initial bearing to `other` in degrees, in the range [-180, 180]
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        let lat1 = utils::bit30_to_radians(self.high_prec_lat());
        let lat2 = utils::bit30_to_radians(other.high_prec_lat());
        let lon1 = utils::bit30_to_radians(self.high_prec_lon());
        let lon2 = utils::bit30_to_radians(other.high_prec_lon());

        let dlon = lon2 - lon1;
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees()
    }

    /// Number of lines that reference this point
    #[inline]
    pub fn line_count(&self) -> u8 {
        self.line_count.load(AtomicOrdering::Relaxed)
    }

    /// Count one more referencing line; stops at the cap instead of wrapping
    pub fn inc_line_count(&self) {
        let _ = self
            .line_count
            .fetch_update(AtomicOrdering::Relaxed, AtomicOrdering::Relaxed, |count| {
                (count < MAX_LINE_COUNT).then_some(count + 1)
            });
    }

    #[inline]
    fn flag(&self, mask: u8) -> bool {
        self.flags.load(AtomicOrdering::Relaxed) & mask != 0
    }

    #[inline]
    fn set_flag(&self, mask: u8, value: bool) {
        if value {
            self.flags.fetch_or(mask, AtomicOrdering::Relaxed);
        } else {
            self.flags.fetch_and(!mask, AtomicOrdering::Relaxed);
        }
    }

    /// Whether the point lies on a region boundary
    pub fn on_boundary(&self) -> bool {
        self.flag(ON_BOUNDARY_MASK)
    }

    pub fn set_on_boundary(&self, value: bool) {
        self.set_flag(ON_BOUNDARY_MASK, value)
    }

    /// Whether simplification must keep this point
    pub fn preserved(&self) -> bool {
        self.flag(PRESERVED_MASK)
    }

    pub fn set_preserved(&self, value: bool) {
        self.set_flag(PRESERVED_MASK, value)
    }

    /// Whether the point was superseded during short edge removal
    pub fn is_replaced(&self) -> bool {
        self.flag(REPLACED_MASK)
    }

    pub fn set_replaced(&self, value: bool) {
        self.set_flag(REPLACED_MASK, value)
    }

    /// Whether short edge removal should treat the point as a routing node
    pub fn treat_as_node(&self) -> bool {
        self.flag(TREAT_AS_NODE_MASK)
    }

    pub fn set_treat_as_node(&self, value: bool) {
        self.set_flag(TREAT_AS_NODE_MASK, value)
    }

    /// Whether the point comes from a node tagged with a fixme marker
    pub fn is_fixme(&self) -> bool {
        self.flag(FIXME_MASK)
    }

    pub fn set_fixme(&self, value: bool) {
        self.set_flag(FIXME_MASK, value)
    }

    /// Position formatted as `lat/lon` in degrees with five decimals
    pub fn to_degree_string(&self) -> String {
        format!(
            "{:.5}/{:.5}",
            utils::map_unit_to_degrees(self.latitude),
            utils::map_unit_to_degrees(self.longitude)
        )
    }

    /// Link to the position on openstreetmap.org
    pub fn to_osm_url(&self, zoom: u32) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={:.5}&mlon={:.5}&zoom={}",
            utils::map_unit_to_degrees(self.latitude),
            utils::map_unit_to_degrees(self.longitude),
            zoom
        )
    }
}

impl Clone for Coordinate {
    fn clone(&self) -> Self {
        Self {
            latitude: self.latitude,
            longitude: self.longitude,
            lat_delta: self.lat_delta,
            lon_delta: self.lon_delta,
            line_count: AtomicU8::new(self.line_count()),
            flags: AtomicU8::new(self.flags.load(AtomicOrdering::Relaxed)),
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Spreads latitude over the i32 range for |lat| <= 2^22, |lon| <= 2^23
        state.write_i32(self.latitude.wrapping_mul(503).wrapping_add(self.longitude));
    }
}

impl Ord for Coordinate {
    /// Longitude first, then latitude
    fn cmp(&self, other: &Self) -> Ordering {
        self.longitude
            .cmp(&other.longitude)
            .then(self.latitude.cmp(&other.latitude))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.latitude, self.longitude)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinate")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("lat_delta", &self.lat_delta)
            .field("lon_delta", &self.lon_delta)
            .field("flags", &self.flags.load(AtomicOrdering::Relaxed))
            .finish()
    }
}

impl From<geo::Point<f64>> for Coordinate {
    /// `x` is the longitude and `y` the latitude, as in GPX/GeoJSON
    fn from(point: geo::Point<f64>) -> Self {
        Coordinate::from_degrees(point.y(), point.x())
    }
}

impl From<&Coordinate> for geo::Point<f64> {
    fn from(coord: &Coordinate) -> Self {
        geo::Point::new(coord.lon_degrees(), coord.lat_degrees())
    }
}
