pub mod flight_path;
pub mod geocode;
pub mod resolver;
pub mod route_api;
pub mod route_provider;
