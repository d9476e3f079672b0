//! Geographic primitives and the geocoded-URL parser.
//!
//! Google Maps share links embed coordinates in one of two shapes:
//! a viewport segment (`.../@40.7128,-74.0060,15z`) or a data segment
//! (`...!3d40.7128!4d-74.0060...`). Grounding chunk URIs use both.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Axis-aligned bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    /// Degenerate box around a single point.
    pub fn of(point: LatLng) -> Self {
        Self {
            south: point.latitude,
            west: point.longitude,
            north: point.latitude,
            east: point.longitude,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south = self.south.min(point.latitude);
        self.north = self.north.max(point.latitude);
        self.west = self.west.min(point.longitude);
        self.east = self.east.max(point.longitude);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Extract a coordinate pair from a map-provider URL.
///
/// Tries the `@lat,lng` viewport segment first, then the `!3dlat!4dlng`
/// data segment; the first match wins. Returns `None` for empty,
/// malformed, or coordinate-free URLs — never panics.
pub fn coords_from_maps_url(url: &str) -> Option<LatLng> {
    if url.is_empty() {
        return None;
    }

    let at_re = Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").ok()?;
    if let Some(caps) = at_re.captures(url) {
        if let Some(coords) = captures_to_latlng(&caps) {
            return Some(coords);
        }
    }

    let data_re = Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").ok()?;
    if let Some(caps) = data_re.captures(url) {
        if let Some(coords) = captures_to_latlng(&caps) {
            return Some(coords);
        }
    }

    None
}

fn captures_to_latlng(caps: &regex::Captures<'_>) -> Option<LatLng> {
    let latitude: f64 = caps.get(1)?.as_str().parse().ok()?;
    let longitude: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(LatLng::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_viewport_segment() {
        let coords =
            coords_from_maps_url("https://maps.google.com/@40.7128,-74.0060,15z").unwrap();
        assert_eq!(coords, LatLng::new(40.7128, -74.0060));
    }

    #[test]
    fn parses_data_segment() {
        let coords = coords_from_maps_url(
            "https://www.google.com/maps/place/x/data=!4m2!3d48.8583701!4d2.2944813",
        )
        .unwrap();
        assert_eq!(coords, LatLng::new(48.8583701, 2.2944813));
    }

    #[test]
    fn viewport_segment_wins_over_data_segment() {
        let coords =
            coords_from_maps_url("https://g.co/maps/@1.5,-2.5,10z/data=!3d9.9!4d8.8").unwrap();
        assert_eq!(coords, LatLng::new(1.5, -2.5));
    }

    #[test]
    fn no_coordinates_yields_none() {
        assert_eq!(coords_from_maps_url("https://maps.google.com/?q=cafe"), None);
        assert_eq!(coords_from_maps_url(""), None);
        assert_eq!(coords_from_maps_url("not a url at all"), None);
    }

    #[test]
    fn integer_coordinates_do_not_match() {
        // Both patterns require a decimal point, as the provider emits.
        assert_eq!(coords_from_maps_url("https://maps.google.com/@40,-74,15z"), None);
    }

    #[test]
    fn bounds_extend_covers_all_points() {
        let mut bounds = LatLngBounds::of(LatLng::new(10.0, 20.0));
        bounds.extend(LatLng::new(-5.0, 25.0));
        bounds.extend(LatLng::new(12.0, -8.0));
        assert_eq!(bounds.south, -5.0);
        assert_eq!(bounds.north, 12.0);
        assert_eq!(bounds.west, -8.0);
        assert_eq!(bounds.east, 25.0);
        let center = bounds.center();
        assert!((center.latitude - 3.5).abs() < 1e-9);
        assert!((center.longitude - 8.5).abs() < 1e-9);
    }
}
