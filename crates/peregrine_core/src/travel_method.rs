use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{kmh::Kmh, meters::Meters};

/// How the traveller arrives at a stop. Irrelevant for the first stop of an
/// itinerary, which is arrived at by definition.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMethod {
    #[default]
    Car,
    Train,
    Bus,
    Walk,
    Plane,
}

/// Profile understood by the road routing providers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RoutingProfile {
    Driving,
    Walking,
}

impl Display for RoutingProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RoutingProfile::Driving => "driving",
                RoutingProfile::Walking => "walking",
            }
        )
    }
}

const AUTO_SELECT_SPEED: Kmh = Kmh::new(60.0);

impl TravelMethod {
    pub fn speed(&self) -> Kmh {
        Kmh::new(match self {
            TravelMethod::Car => 60.0,
            TravelMethod::Train => 80.0,
            TravelMethod::Bus => 40.0,
            TravelMethod::Walk => 5.0,
            TravelMethod::Plane => 800.0,
        })
    }

    /// Road profile for the leg, or `None` for flight legs, whose geometry
    /// is synthesized rather than routed.
    pub fn profile(&self) -> Option<RoutingProfile> {
        match self {
            TravelMethod::Walk => Some(RoutingProfile::Walking),
            TravelMethod::Plane => None,
            TravelMethod::Car | TravelMethod::Train | TravelMethod::Bus => {
                Some(RoutingProfile::Driving)
            }
        }
    }

    /// Default method for a new leg, picked from the estimated drive time:
    /// under two hours goes by car, up to six hours by train, anything
    /// longer flies.
    pub fn infer(distance: Meters) -> TravelMethod {
        let hours = (distance / AUTO_SELECT_SPEED).as_secs_f64() / 3600.0;

        if hours < 2.0 {
            TravelMethod::Car
        } else if hours <= 6.0 {
            TravelMethod::Train
        } else {
            TravelMethod::Plane
        }
    }
}

impl Display for TravelMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TravelMethod::Car => "car",
                TravelMethod::Train => "train",
                TravelMethod::Bus => "bus",
                TravelMethod::Walk => "walk",
                TravelMethod::Plane => "plane",
            }
        )
    }
}
