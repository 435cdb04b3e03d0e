use futures::future::join_all;
use thiserror::Error;
use tracing::debug;

use peregrine_core::{
    geopoint::GeoPoint,
    itinerary::Itinerary,
    metrics::{self, TripTotals},
    stop::StopId,
};
use peregrine_playback::{
    segment::PlaybackSegment,
    session::{PlaybackError, PlaybackSession},
};
use peregrine_providers::{
    geocode::{GeocodeError, NominatimClient},
    resolver::RouteResolver,
};

/// Resolved polyline for the leg arriving at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct LegRoute {
    pub arrival: StopId,
    pub geometry: Vec<GeoPoint>,
}

#[derive(Debug, Error)]
pub enum StartPlaybackError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("stop {0} has no coordinates yet")]
    UnplacedStop(StopId),
}

/// One trip's worth of state: the itinerary, its resolved leg geometries,
/// and the clients used to refresh them. Created at application start,
/// reset on "reset trip"; nothing lives in module globals.
pub struct TripSession {
    itinerary: Itinerary,
    resolver: RouteResolver,
    geocoder: NominatimClient,
    leg_routes: Vec<LegRoute>,
}

impl TripSession {
    pub fn new() -> Self {
        TripSession {
            itinerary: Itinerary::new(),
            resolver: RouteResolver::new(),
            geocoder: NominatimClient::new(),
            leg_routes: Vec::new(),
        }
    }

    pub fn with_itinerary(itinerary: Itinerary) -> Self {
        TripSession {
            itinerary,
            ..TripSession::new()
        }
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn itinerary_mut(&mut self) -> &mut Itinerary {
        &mut self.itinerary
    }

    pub fn leg_routes(&self) -> &[LegRoute] {
        &self.leg_routes
    }

    pub fn totals(&self) -> TripTotals {
        metrics::aggregate(&self.itinerary)
    }

    pub fn reset(&mut self) {
        self.itinerary.reset();
        self.leg_routes.clear();
    }

    /// Re-resolves every geocoded leg concurrently. The result is applied
    /// only when no mutation happened in the meantime; a stale batch is
    /// dropped instead of clobbering newer state.
    pub async fn refresh_routes(&mut self) {
        let generation = self.itinerary.generation();

        let jobs: Vec<_> = self
            .itinerary
            .legs()
            .filter_map(|(prev, stop)| {
                let start = prev.position()?;
                let end = stop.position()?;
                Some((
                    stop.id(),
                    start,
                    end,
                    stop.travel_method(),
                    stop.active_stopovers().to_vec(),
                ))
            })
            .collect();

        let resolver = &self.resolver;
        let resolved = join_all(jobs.into_iter().map(
            |(arrival, start, end, method, stopovers)| async move {
                let geometry = resolver.resolve(&start, &end, method, &stopovers).await;
                LegRoute { arrival, geometry }
            },
        ))
        .await;

        if self.itinerary.generation() != generation {
            debug!("itinerary changed while routing, discarding stale geometries");
            return;
        }

        self.leg_routes = resolved;
    }

    /// Forward-geocodes a stop. The result is applied only when its
    /// generation token still matches; a hit that arrives after another
    /// mutation is discarded. `Ok(false)` is a miss or a discard, not an
    /// error.
    pub async fn geocode_stop(&mut self, id: StopId, query: &str) -> Result<bool, GeocodeError> {
        let generation = self.itinerary.generation();
        let place = self.geocoder.forward(query).await?;

        let Some(place) = place else {
            return Ok(false);
        };
        if self.itinerary.generation() != generation {
            debug!(stop = %id, "stale geocode result discarded");
            return Ok(false);
        }

        Ok(self
            .itinerary
            .set_position_and_name(id, place.position, Some(place.display_name))
            .is_ok())
    }

    /// Names a stop from its coordinates, under the same generation guard.
    pub async fn name_stop_from_position(&mut self, id: StopId) -> Result<bool, GeocodeError> {
        let Some(position) = self.itinerary.get(id).and_then(|stop| stop.position()) else {
            return Ok(false);
        };

        let generation = self.itinerary.generation();
        let Some(name) = self.geocoder.reverse(&position).await? else {
            return Ok(false);
        };
        if self.itinerary.generation() != generation {
            debug!(stop = %id, "stale reverse geocode discarded");
            return Ok(false);
        }

        Ok(self
            .itinerary
            .set_position_and_name(id, position, Some(name))
            .is_ok())
    }

    /// Resolves every leg and assembles a playback session. Requires at
    /// least two stops, all with coordinates. Failures here map to the
    /// standard playback teardown at the caller.
    pub async fn begin_playback(&self) -> Result<PlaybackSession, StartPlaybackError> {
        if self.itinerary.len() < 2 {
            return Err(PlaybackError::NotEnoughStops.into());
        }
        if let Some(stop) = self
            .itinerary
            .stops()
            .iter()
            .find(|stop| stop.position().is_none())
        {
            return Err(StartPlaybackError::UnplacedStop(stop.id()));
        }

        let jobs: Vec<_> = self
            .itinerary
            .legs()
            .filter_map(|(prev, stop)| {
                let start = prev.position()?;
                let end = stop.position()?;
                let hours = metrics::leg_metrics(prev, stop)
                    .map(|m| m.hours())
                    .unwrap_or_default();
                Some((
                    start,
                    end,
                    stop.travel_method(),
                    stop.active_stopovers().to_vec(),
                    hours,
                    stop.nights(),
                ))
            })
            .collect();

        let resolver = &self.resolver;
        let segments = join_all(jobs.into_iter().map(
            |(start, end, method, stopovers, hours, nights)| async move {
                let geometry = resolver.resolve(&start, &end, method, &stopovers).await;
                PlaybackSegment::new(geometry, method, hours, nights)
            },
        ))
        .await;

        Ok(PlaybackSession::new(segments)?)
    }
}

impl Default for TripSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peregrine_core::travel_method::TravelMethod;

    fn flight_trip() -> TripSession {
        let mut session = TripSession::new();
        let itinerary = session.itinerary_mut();
        itinerary.add_stop(Some(GeoPoint::new(50.85, 4.35)));
        let arrival = itinerary.add_stop(Some(GeoPoint::new(41.39, 2.16)));
        itinerary
            .set_travel_method(arrival, TravelMethod::Plane)
            .unwrap();
        session
    }

    #[tokio::test]
    async fn playback_needs_two_stops() {
        let mut session = TripSession::new();
        session.itinerary_mut().add_stop(Some(GeoPoint::new(0.0, 0.0)));

        assert!(matches!(
            session.begin_playback().await,
            Err(StartPlaybackError::Playback(PlaybackError::NotEnoughStops))
        ));
    }

    #[tokio::test]
    async fn playback_needs_every_stop_placed() {
        let mut session = TripSession::new();
        session.itinerary_mut().add_stop(Some(GeoPoint::new(0.0, 0.0)));
        let blank = session.itinerary_mut().add_stop(None);

        assert!(matches!(
            session.begin_playback().await,
            Err(StartPlaybackError::UnplacedStop(id)) if id == blank
        ));
    }

    #[tokio::test]
    async fn flight_trips_assemble_offline() {
        let session = flight_trip();

        let playback = session.begin_playback().await.unwrap();
        assert_eq!(playback.segments().len(), 1);
        assert_eq!(playback.segments()[0].geometry().len(), 21);
        assert!(playback.segments()[0].real_duration_hours() > 1.0);
    }

    #[tokio::test]
    async fn refresh_routes_covers_every_geocoded_leg() {
        let mut session = flight_trip();

        session.refresh_routes().await;
        assert_eq!(session.leg_routes().len(), 1);
        assert_eq!(session.leg_routes()[0].geometry.len(), 21);
    }

    #[tokio::test]
    async fn reset_clears_routes_and_stops() {
        let mut session = flight_trip();
        session.refresh_routes().await;

        session.reset();
        assert!(session.itinerary().is_empty());
        assert!(session.leg_routes().is_empty());
    }
}
