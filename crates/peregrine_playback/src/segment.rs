use peregrine_core::{geopoint::GeoPoint, travel_method::TravelMethod};

/// Floor so near-zero legs still animate visibly.
const MIN_SEGMENT_DURATION_MS: f64 = 500.0;
/// One simulated hour plays in one second at 1x speed.
const MS_PER_SIMULATED_HOUR: f64 = 1000.0;

/// One leg of a playback session. Built when playback starts, dropped with
/// the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSegment {
    geometry: Vec<GeoPoint>,
    travel_method: TravelMethod,
    real_duration_hours: f64,
    base_duration_ms: f64,
    nights_after: u32,
}

impl PlaybackSegment {
    pub fn new(
        geometry: Vec<GeoPoint>,
        travel_method: TravelMethod,
        real_duration_hours: f64,
        nights_after: u32,
    ) -> Self {
        PlaybackSegment {
            geometry,
            travel_method,
            real_duration_hours,
            base_duration_ms: (real_duration_hours * MS_PER_SIMULATED_HOUR)
                .max(MIN_SEGMENT_DURATION_MS),
            nights_after,
        }
    }

    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }

    pub fn travel_method(&self) -> TravelMethod {
        self.travel_method
    }

    pub fn real_duration_hours(&self) -> f64 {
        self.real_duration_hours
    }

    /// Animation length at 1x speed.
    pub fn base_duration_ms(&self) -> f64 {
        self.base_duration_ms
    }

    /// Nights spent at the stop this segment arrives at.
    pub fn nights_after(&self) -> u32 {
        self.nights_after
    }

    /// Interpolated token position at `progress` in [0, 1]: a plain lerp
    /// between the endpoints for 2-point geometry, otherwise piecewise
    /// linear across the polyline. `None` only for empty geometry.
    pub fn position_at(&self, progress: f64) -> Option<GeoPoint> {
        let progress = progress.clamp(0.0, 1.0);

        match self.geometry.as_slice() {
            [] => None,
            [only] => Some(*only),
            [a, b] => Some(lerp(a, b, progress)),
            points => {
                let scaled = progress * (points.len() - 1) as f64;
                let index = (scaled.floor() as usize).min(points.len() - 2);
                let frac = scaled - index as f64;
                Some(lerp(&points[index], &points[index + 1], frac))
            }
        }
    }
}

fn lerp(a: &GeoPoint, b: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lng + (b.lng - a.lng) * t)
}
