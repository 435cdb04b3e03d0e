use std::time::Duration;

use peregrine_core::{geopoint::GeoPoint, travel_method::RoutingProfile};
use serde::Deserialize;
use thiserror::Error;

/// Budget for one candidate query; expiry aborts the request and moves on
/// to the next candidate.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum RouteApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("response contained no routes")]
    NoRoute,
}

#[derive(Deserialize)]
struct RouteResponse {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    geometry: RouteGeometry,
}

#[derive(Deserialize)]
struct RouteGeometry {
    /// (lon, lat) pairs, the providers' native order.
    coordinates: Vec<[f64; 2]>,
}

pub struct RouteApiClient {
    client: reqwest::Client,
}

impl RouteApiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// One bounded query against one OSRM-shaped endpoint.
    pub async fn fetch_route(
        &self,
        base_url: &str,
        profile: RoutingProfile,
        start: &GeoPoint,
        end: &GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteApiError> {
        let url = format!(
            "{}/{}/{},{};{},{}",
            base_url, profile, start.lng, start.lat, end.lng, end.lat
        );

        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RouteApiError::Api { status, message });
        }

        let body: RouteResponse = response.json().await?;
        into_points(body)
    }
}

impl Default for RouteApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Takes the first route and reorders its coordinates to (lat, lng).
fn into_points(body: RouteResponse) -> Result<Vec<GeoPoint>, RouteApiError> {
    let route = body.routes.into_iter().next().ok_or(RouteApiError::NoRoute)?;

    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| GeoPoint::new(lat, lng))
        .collect())
}
