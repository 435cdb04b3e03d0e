use peregrine_core::{geopoint::GeoPoint, stop::Stopover};

/// Samples per arc: t = 0, 0.05, ..., 1.0.
const ARC_SAMPLES: usize = 21;
const ARC_STEP: f64 = 0.05;
/// Latitude bow of the control point, as a share of the endpoint distance
/// in degree space.
const ARC_BOW: f64 = 0.2;

/// Quadratic-Bezier bow between two points. A cosmetic curve in raw
/// coordinate space, not a great-circle projection.
pub fn flight_arc(from: &GeoPoint, to: &GeoPoint) -> Vec<GeoPoint> {
    let mid = from.midpoint(to);
    let control = GeoPoint::new(mid.lat + ARC_BOW * from.euclidean_degrees(to), mid.lng);

    (0..ARC_SAMPLES)
        .map(|i| {
            let t = i as f64 * ARC_STEP;
            let u = 1.0 - t;
            GeoPoint::new(
                u * u * from.lat + 2.0 * u * t * control.lat + t * t * to.lat,
                u * u * from.lng + 2.0 * u * t * control.lng + t * t * to.lng,
            )
        })
        .collect()
}

/// Concatenated arcs through the stopovers, in order. Stopovers without
/// coordinates are skipped so no arc references a missing point.
pub fn flight_path(start: &GeoPoint, end: &GeoPoint, stopovers: &[Stopover]) -> Vec<GeoPoint> {
    let mut waypoints = vec![*start];
    waypoints.extend(stopovers.iter().filter_map(|stopover| stopover.position));
    waypoints.push(*end);

    let mut path: Vec<GeoPoint> = Vec::with_capacity((waypoints.len() - 1) * ARC_SAMPLES);
    for pair in waypoints.windows(2) {
        let arc = flight_arc(&pair[0], &pair[1]);
        if path.is_empty() {
            path.extend(arc);
        } else {
            // The previous arc already ends on this waypoint
            path.extend(arc.into_iter().skip(1));
        }
    }

    path
}
