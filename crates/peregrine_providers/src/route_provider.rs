use peregrine_core::travel_method::RoutingProfile;

pub const ROUTING_URL_ENV_VAR: &str = "PEREGRINE_ROUTING_URL";

pub const OSRM_ROUTE_API_URL: &str = "https://router.project-osrm.org/route/v1";
pub const FOSSGIS_CAR_ROUTE_API_URL: &str =
    "https://routing.openstreetmap.de/routed-car/route/v1";
pub const FOSSGIS_FOOT_ROUTE_API_URL: &str =
    "https://routing.openstreetmap.de/routed-foot/route/v1";

/// One road-routing endpoint of the candidate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEndpoint {
    pub name: &'static str,
    pub base_url: String,
}

/// The fixed, ordered chain of endpoints tried for a road leg. The primary
/// base URL can be overridden through `PEREGRINE_ROUTING_URL`, e.g. to
/// point at a self-hosted OSRM.
pub fn candidate_chain(profile: RoutingProfile) -> Vec<RouteEndpoint> {
    let primary = std::env::var(ROUTING_URL_ENV_VAR)
        .unwrap_or_else(|_| OSRM_ROUTE_API_URL.to_string());

    let secondary = match profile {
        RoutingProfile::Driving => FOSSGIS_CAR_ROUTE_API_URL,
        RoutingProfile::Walking => FOSSGIS_FOOT_ROUTE_API_URL,
    };

    vec![
        RouteEndpoint {
            name: "osrm",
            base_url: primary,
        },
        RouteEndpoint {
            name: "fossgis",
            base_url: secondary.to_string(),
        },
    ]
}
