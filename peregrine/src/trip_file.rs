use serde::Deserialize;

use peregrine_core::{
    error::ValidationError, geopoint::GeoPoint, itinerary::Itinerary, stop::Stopover,
    travel_method::TravelMethod,
};

/// On-disk trip description. Built through the store's own mutators so
/// method auto-selection and validation behave exactly like interactive
/// edits.
#[derive(Deserialize)]
#[serde(rename = "Trip")]
pub struct TripFile {
    pub stops: Vec<TripFileStop>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TripFileStop {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub travel_method: Option<TravelMethod>,
    pub nights: Option<u32>,

    /// Multi-stopover form for flight legs.
    pub stopovers: Option<Vec<TripFileStopover>>,

    /// Legacy single-stopover form, read as a one-entry list.
    pub stopover: Option<TripFileStopover>,
}

#[derive(Deserialize)]
pub struct TripFileStopover {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn position_of(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    }
}

impl TripFile {
    pub fn from_json(json: &str) -> Result<TripFile, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn build_itinerary(self) -> Result<Itinerary, ValidationError> {
        let mut itinerary = Itinerary::new();

        for stop in self.stops {
            let position = position_of(stop.lat, stop.lng);
            let id = itinerary.add_stop(position);

            if let (Some(name), Some(position)) = (stop.name, position) {
                itinerary.set_position_and_name(id, position, Some(name))?;
            }
            if let Some(method) = stop.travel_method {
                itinerary.set_travel_method(id, method)?;
            }
            if let Some(nights) = stop.nights {
                itinerary.set_nights(id, nights)?;
            }

            let stopovers = stop
                .stopovers
                .or_else(|| stop.stopover.map(|legacy| vec![legacy]));
            if let Some(stopovers) = stopovers {
                itinerary.set_flight_stop_count(id, stopovers.len())?;
                for (index, stopover) in stopovers.into_iter().enumerate() {
                    let position = position_of(stopover.lat, stopover.lng);
                    itinerary.set_flight_stopover(
                        id,
                        index,
                        Stopover::new(stopover.name, position),
                    )?;
                }
            }
        }

        Ok(itinerary)
    }
}
