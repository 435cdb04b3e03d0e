use jiff::SignedDuration;

use crate::{
    itinerary::Itinerary, meters::Meters, stop::Stop, travel_method::TravelMethod,
};

/// Distance and travel time of the leg arriving at a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegMetrics {
    pub distance: Meters,
    pub duration: SignedDuration,
}

impl LegMetrics {
    pub fn hours(&self) -> f64 {
        self.duration.as_secs_f64() / 3600.0
    }

    /// "42 min" under an hour, "3 h 7 min" above it, minutes rounded.
    pub fn display_duration(&self) -> String {
        let total_minutes = self.duration.as_secs_f64() / 60.0;
        if total_minutes < 60.0 {
            format!("{} min", total_minutes.round() as i64)
        } else {
            let hours = (total_minutes / 60.0).floor() as i64;
            let minutes = (total_minutes - hours as f64 * 60.0).round() as i64;
            format!("{hours} h {minutes} min")
        }
    }
}

/// Path length of the leg arriving at `stop`: great-circle for road legs,
/// the hop-sum through active stopovers for flight legs. Stopovers without
/// coordinates contract to the next known point. `None` until both
/// endpoints are geocoded.
pub fn leg_distance(prev: &Stop, stop: &Stop) -> Option<Meters> {
    let start = prev.position()?;
    let end = stop.position()?;

    if stop.travel_method() == TravelMethod::Plane {
        let mut hops = vec![start];
        hops.extend(
            stop.active_stopovers()
                .iter()
                .filter_map(|stopover| stopover.position),
        );
        hops.push(end);

        Some(
            hops.windows(2)
                .map(|pair| pair[0].haversine_distance(&pair[1]))
                .sum(),
        )
    } else {
        Some(start.haversine_distance(&end))
    }
}

pub fn leg_metrics(prev: &Stop, stop: &Stop) -> Option<LegMetrics> {
    let distance = leg_distance(prev, stop)?;
    let duration = distance / stop.travel_method().speed();

    Some(LegMetrics { distance, duration })
}

/// Whole-trip aggregates over one stop snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TripTotals {
    pub total_distance: Meters,
    pub total_nights: u32,
    pub travel_days: f64,
}

impl TripTotals {
    /// Nights at destinations plus fractional travel days.
    pub fn total_days(&self) -> f64 {
        self.total_nights as f64 + self.travel_days
    }

    /// Whole trip lengths render without a decimal, everything else with
    /// one decimal place.
    pub fn display_days(&self) -> String {
        let days = self.total_days();
        if days.fract() == 0.0 {
            format!("{}", days as i64)
        } else {
            format!("{days:.1}")
        }
    }
}

pub fn aggregate(itinerary: &Itinerary) -> TripTotals {
    let mut totals = TripTotals::default();

    for (prev, stop) in itinerary.legs() {
        if let Some(metrics) = leg_metrics(prev, stop) {
            totals.total_distance += metrics.distance;
            totals.travel_days += metrics.hours() / 24.0;
        }
    }

    // Nights at the departure point are not part of the trip
    totals.total_nights = itinerary
        .stops()
        .iter()
        .skip(1)
        .map(|stop| stop.nights())
        .sum();

    totals
}
