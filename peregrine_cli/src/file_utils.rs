use std::path::Path;

use peregrine::{TripFile, TripSession};
use peregrine_providers::geocode::NominatimClient;
use tracing::{info, warn};

/// Loads a trip file, geocoding named stops that carry no coordinates, and
/// wraps the result in a fresh session.
pub async fn load_session(path: &Path) -> Result<TripSession, anyhow::Error> {
    let json = std::fs::read_to_string(path)?;
    let mut trip = TripFile::from_json(&json)?;

    geocode_missing(&mut trip).await;

    Ok(TripSession::with_itinerary(trip.build_itinerary()?))
}

/// Fills in coordinates for named stops. A miss or a network failure
/// leaves the stop unplaced; downstream components already cope with that.
async fn geocode_missing(trip: &mut TripFile) {
    let geocoder = NominatimClient::new();

    for stop in trip
        .stops
        .iter_mut()
        .filter(|stop| stop.lat.is_none() || stop.lng.is_none())
    {
        let Some(name) = stop.name.clone() else {
            continue;
        };

        match geocoder.forward(&name).await {
            Ok(Some(place)) => {
                info!(
                    "geocoded '{}' to {:.5}, {:.5}",
                    name, place.position.lat, place.position.lng
                );
                stop.lat = Some(place.position.lat);
                stop.lng = Some(place.position.lng);
            }
            Ok(None) => warn!("no geocoder result for '{name}'"),
            Err(error) => warn!(%error, "geocoding '{name}' failed"),
        }
    }
}
