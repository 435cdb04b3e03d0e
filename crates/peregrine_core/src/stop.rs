use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{geopoint::GeoPoint, travel_method::TravelMethod};

/// Unique, monotonic (creation-order) stop identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StopId(u64);

impl StopId {
    pub(crate) fn new(raw: u64) -> Self {
        StopId(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Intermediate named point on a flight leg. Contributes to arc geometry
/// and distance summation only, never to road routing.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stopover {
    pub name: Option<String>,
    pub position: Option<GeoPoint>,
}

impl Stopover {
    pub fn new(name: Option<String>, position: Option<GeoPoint>) -> Self {
        Stopover { name, position }
    }
}

/// One waypoint of an itinerary. The position stays empty until the stop is
/// geocoded or placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    id: StopId,
    pub(crate) name: Option<String>,
    pub(crate) position: Option<GeoPoint>,
    pub(crate) travel_method: TravelMethod,
    pub(crate) nights: u32,
    pub(crate) flight_stop_count: usize,
    pub(crate) flight_stopovers: Vec<Stopover>,
}

impl Stop {
    pub(crate) fn new(id: StopId, position: Option<GeoPoint>) -> Self {
        Stop {
            id,
            name: None,
            position,
            travel_method: TravelMethod::default(),
            nights: 1,
            flight_stop_count: 0,
            flight_stopovers: Vec::new(),
        }
    }

    pub fn id(&self) -> StopId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    pub fn travel_method(&self) -> TravelMethod {
        self.travel_method
    }

    /// Nights spent at this stop. Ignored for the first stop of a trip.
    pub fn nights(&self) -> u32 {
        self.nights
    }

    pub fn flight_stop_count(&self) -> usize {
        self.flight_stop_count
    }

    /// Every stopover ever entered for this stop, active or not.
    pub fn flight_stopovers(&self) -> &[Stopover] {
        &self.flight_stopovers
    }

    /// The prefix of the stopover list that currently counts: shrinking the
    /// count only narrows this window, the data behind it stays put.
    pub fn active_stopovers(&self) -> &[Stopover] {
        let active = self.flight_stop_count.min(self.flight_stopovers.len());
        &self.flight_stopovers[..active]
    }
}

/// Position-derived role of a stop within the sequence. Computed on read,
/// never stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopRole {
    Start,
    Via,
    End,
}

impl StopRole {
    pub fn of(index: usize, len: usize) -> StopRole {
        if index == 0 {
            StopRole::Start
        } else if index + 1 == len {
            StopRole::End
        } else {
            StopRole::Via
        }
    }
}

impl Display for StopRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                StopRole::Start => "start",
                StopRole::Via => "stop",
                StopRole::End => "end",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_index_is_always_start() {
        assert_eq!(StopRole::of(0, 1), StopRole::Start);
        assert_eq!(StopRole::of(0, 5), StopRole::Start);
    }

    #[test]
    fn last_index_is_end_only_with_two_or_more_stops() {
        assert_eq!(StopRole::of(1, 2), StopRole::End);
        assert_eq!(StopRole::of(4, 5), StopRole::End);
        // A single stop is a start, not an end
        assert_eq!(StopRole::of(0, 1), StopRole::Start);
    }

    #[test]
    fn everything_between_is_a_plain_stop() {
        assert_eq!(StopRole::of(1, 3), StopRole::Via);
        assert_eq!(StopRole::of(3, 5), StopRole::Via);
    }

    #[test]
    fn active_stopovers_clamp_to_the_entered_list() {
        let mut stop = Stop::new(StopId::new(0), None);
        stop.flight_stopovers = vec![Stopover::default(), Stopover::default()];
        stop.flight_stop_count = 5;

        assert_eq!(stop.active_stopovers().len(), 2);
    }
}
