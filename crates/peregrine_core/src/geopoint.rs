use geo::{Distance, Euclidean, Haversine};
use serde::{Deserialize, Serialize};

use crate::meters::Meters;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    /// Great-circle distance over the mean Earth radius.
    pub fn haversine_distance(&self, other: &GeoPoint) -> Meters {
        let haversine = Haversine;

        Meters::new(haversine.distance(geo::Point::from(self), geo::Point::from(other)))
    }

    /// Straight-line distance in raw coordinate-degree space. Only suitable
    /// for cosmetic geometry such as flight-arc bowing.
    pub fn euclidean_degrees(&self, other: &GeoPoint) -> f64 {
        let euclidean = Euclidean;

        euclidean.distance(&geo::Point::from(self), &geo::Point::from(other))
    }

    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }
}

impl From<&GeoPoint> for geo::Point {
    fn from(point: &GeoPoint) -> Self {
        geo::Point::new(point.lng, point.lat)
    }
}

impl From<GeoPoint> for geo::Point {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lng, point.lat)
    }
}
