use peregrine_core::geopoint::GeoPoint;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::route_api::REQUEST_TIMEOUT;

pub const NOMINATIM_SEARCH_API_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const NOMINATIM_REVERSE_API_URL: &str = "https://nominatim.openstreetmap.org/reverse";

// Nominatim's usage policy requires an identifying agent
const USER_AGENT: &str = "peregrine-trip-planner";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("malformed coordinate in response: {0}")]
    MalformedCoordinate(String),
}

/// A geocoder hit. An absent hit is a miss, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub position: GeoPoint,
    pub display_name: String,
}

#[derive(Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl SearchHit {
    fn into_place(self) -> Result<Place, GeocodeError> {
        let lat: f64 = self
            .lat
            .parse()
            .map_err(|_| GeocodeError::MalformedCoordinate(self.lat.clone()))?;
        let lng: f64 = self
            .lon
            .parse()
            .map_err(|_| GeocodeError::MalformedCoordinate(self.lon.clone()))?;

        Ok(Place {
            position: GeoPoint::new(lat, lng),
            display_name: self.display_name,
        })
    }
}

#[derive(Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Deserialize, Default)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
}

impl Address {
    /// Most specific locality available, city first.
    fn locality(self) -> Option<String> {
        self.city.or(self.town).or(self.village).or(self.hamlet)
    }
}

pub struct NominatimClient {
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Forward geocode. An empty result set resolves to `Ok(None)`.
    pub async fn forward(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let response = self
            .client
            .get(NOMINATIM_SEARCH_API_URL)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let hits: Vec<SearchHit> = Self::handle_response(response).await?;
        debug!(query, hits = hits.len(), "forward geocode");

        hits.into_iter().next().map(SearchHit::into_place).transpose()
    }

    /// Reverse geocode to a locality name, or `Ok(None)` when the address
    /// carries none of the known locality fields.
    pub async fn reverse(&self, position: &GeoPoint) -> Result<Option<String>, GeocodeError> {
        let response = self
            .client
            .get(NOMINATIM_REVERSE_API_URL)
            .query(&[
                ("lat", position.lat.to_string()),
                ("lon", position.lng.to_string()),
                ("format", "json".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let body: ReverseResponse = Self::handle_response(response).await?;

        Ok(body.address.and_then(Address::locality))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeocodeError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(GeocodeError::Api { status, message })
        }
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_hit_parses_string_coordinates() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"lat":"50.85045","lon":"4.34878","display_name":"Brussels, Belgium"}"#,
        )
        .unwrap();

        let place = hit.into_place().unwrap();
        assert_eq!(place.position, GeoPoint::new(50.85045, 4.34878));
        assert_eq!(place.display_name, "Brussels, Belgium");
    }

    #[test]
    fn malformed_coordinates_are_reported() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"lat":"not-a-number","lon":"4.34878","display_name":"?"}"#,
        )
        .unwrap();

        assert!(matches!(
            hit.into_place(),
            Err(GeocodeError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn locality_falls_back_through_smaller_places() {
        let town = Address {
            town: Some("Bruges".into()),
            ..Address::default()
        };
        let hamlet = Address {
            hamlet: Some("Oosthoek".into()),
            ..Address::default()
        };

        assert_eq!(town.locality().as_deref(), Some("Bruges"));
        assert_eq!(hamlet.locality().as_deref(), Some("Oosthoek"));
        assert_eq!(Address::default().locality(), None);
    }

    #[test]
    fn missing_address_is_a_miss() {
        let body: ReverseResponse = serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();

        assert_eq!(body.address.and_then(Address::locality), None);
    }
}
