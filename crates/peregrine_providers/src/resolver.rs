use peregrine_core::{
    geopoint::GeoPoint,
    stop::Stopover,
    travel_method::{RoutingProfile, TravelMethod},
};
use tracing::{debug, warn};

use crate::{
    flight_path::flight_path,
    route_api::RouteApiClient,
    route_provider::{RouteEndpoint, candidate_chain},
};

/// Resolves one leg into an ordered polyline. Infallible by design: road
/// legs degrade to the straight line between the endpoints once every
/// provider candidate has failed, flight legs are synthesized locally.
pub struct RouteResolver {
    api: RouteApiClient,
}

impl RouteResolver {
    pub fn new() -> Self {
        Self {
            api: RouteApiClient::new(),
        }
    }

    pub async fn resolve(
        &self,
        start: &GeoPoint,
        end: &GeoPoint,
        method: TravelMethod,
        stopovers: &[Stopover],
    ) -> Vec<GeoPoint> {
        match method.profile() {
            None => flight_path(start, end, stopovers),
            Some(profile) => {
                self.resolve_road(&candidate_chain(profile), profile, start, end)
                    .await
            }
        }
    }

    /// Tries the candidates strictly in order and short-circuits on the
    /// first success. Failures are logged and recovered here, never
    /// surfaced.
    pub async fn resolve_road(
        &self,
        candidates: &[RouteEndpoint],
        profile: RoutingProfile,
        start: &GeoPoint,
        end: &GeoPoint,
    ) -> Vec<GeoPoint> {
        for endpoint in candidates {
            match self
                .api
                .fetch_route(&endpoint.base_url, profile, start, end)
                .await
            {
                Ok(route) => {
                    debug!(
                        provider = endpoint.name,
                        points = route.len(),
                        "road leg resolved"
                    );
                    return route;
                }
                Err(error) => {
                    warn!(provider = endpoint.name, %error, "routing candidate failed");
                }
            }
        }

        vec![*start, *end]
    }
}

impl Default for RouteResolver {
    fn default() -> Self {
        Self::new()
    }
}
