use tracing::debug;

use crate::{
    error::ValidationError,
    geopoint::GeoPoint,
    stop::{Stop, StopId, StopRole, Stopover},
    travel_method::TravelMethod,
};

/// Monotonic token advanced by every mutation. Asynchronous work snapshots
/// the generation before suspending and discards its result when the token
/// has moved on in the meantime.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// The ordered stop sequence of one trip; sequence order is travel order.
/// The itinerary is the sole mutator of its stops, and every mutation
/// advances the generation token.
#[derive(Debug, Default, Clone)]
pub struct Itinerary {
    stops: Vec<Stop>,
    next_id: u64,
    generation: Generation,
}

impl Itinerary {
    pub fn new() -> Self {
        Itinerary::default()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn get(&self, id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.id() == id)
    }

    pub fn role_of(&self, index: usize) -> StopRole {
        StopRole::of(index, self.stops.len())
    }

    /// Consecutive stop pairs in travel order; the second element of each
    /// pair is the stop the leg arrives at.
    pub fn legs(&self) -> impl Iterator<Item = (&Stop, &Stop)> {
        self.stops.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Appends a new stop. The travel method is auto-selected from the
    /// distance to the nearest preceding geocoded stop; nights default to
    /// one.
    pub fn add_stop(&mut self, position: Option<GeoPoint>) -> StopId {
        let id = StopId::new(self.next_id);
        self.next_id += 1;

        let mut stop = Stop::new(id, position);
        if let Some(position) = position
            && let Some(method) = self.inferred_method(self.stops.len(), &position)
        {
            stop.travel_method = method;
        }

        self.stops.push(stop);
        self.bump();
        id
    }

    pub fn remove_stop(&mut self, id: StopId) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.stops.remove(index);
        self.bump();
        Ok(())
    }

    /// Replaces the sequence with a permutation of the same ids. A mismatch
    /// in the id multiset leaves the itinerary untouched.
    pub fn reorder(&mut self, order: &[StopId]) -> Result<(), ValidationError> {
        let mut current: Vec<StopId> = self.stops.iter().map(|stop| stop.id()).collect();
        let mut requested: Vec<StopId> = order.to_vec();
        current.sort();
        requested.sort();
        if current != requested {
            return Err(ValidationError::InvalidOrder);
        }

        let mut pool = std::mem::take(&mut self.stops);
        for id in order {
            if let Some(index) = pool.iter().position(|stop| stop.id() == *id) {
                self.stops.push(pool.swap_remove(index));
            }
        }
        self.bump();
        Ok(())
    }

    /// Geocodes or relocates a stop. When the stop gains a position for the
    /// first time and has a geocoded predecessor, the travel method is
    /// re-derived with the same rule as `add_stop`.
    pub fn set_position_and_name(
        &mut self,
        id: StopId,
        position: GeoPoint,
        name: Option<String>,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        let first_fix = self.stops[index].position.is_none();

        self.stops[index].position = Some(position);
        self.stops[index].name = name;

        if first_fix && let Some(method) = self.inferred_method(index, &position) {
            self.stops[index].travel_method = method;
        }

        self.bump();
        Ok(())
    }

    pub fn set_travel_method(
        &mut self,
        id: StopId,
        method: TravelMethod,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.stops[index].travel_method = method;
        self.bump();
        Ok(())
    }

    pub fn set_nights(&mut self, id: StopId, nights: u32) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.stops[index].nights = nights;
        self.bump();
        Ok(())
    }

    /// Resizes the active stopover window. Data beyond the window is kept,
    /// so growing the count back restores previously entered stopovers.
    pub fn set_flight_stop_count(
        &mut self,
        id: StopId,
        count: usize,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        self.stops[index].flight_stop_count = count;
        self.bump();
        Ok(())
    }

    pub fn set_flight_stopover(
        &mut self,
        id: StopId,
        stopover_index: usize,
        stopover: Stopover,
    ) -> Result<(), ValidationError> {
        let index = self.index_of(id)?;
        let stopovers = &mut self.stops[index].flight_stopovers;
        if stopovers.len() <= stopover_index {
            stopovers.resize_with(stopover_index + 1, Stopover::default);
        }
        stopovers[stopover_index] = stopover;
        self.bump();
        Ok(())
    }

    /// Empties the trip and restarts id numbering. The generation still
    /// advances so in-flight work against the old trip gets discarded.
    pub fn reset(&mut self) {
        self.stops.clear();
        self.next_id = 0;
        self.bump();
    }

    fn index_of(&self, id: StopId) -> Result<usize, ValidationError> {
        self.stops
            .iter()
            .position(|stop| stop.id() == id)
            .ok_or(ValidationError::UnknownStop(id))
    }

    /// Travel method suggested by the distance from the nearest geocoded
    /// stop before `index`, if any.
    fn inferred_method(&self, index: usize, position: &GeoPoint) -> Option<TravelMethod> {
        let previous = self.stops[..index]
            .iter()
            .rev()
            .find_map(|stop| stop.position())?;

        Some(TravelMethod::infer(previous.haversine_distance(position)))
    }

    fn bump(&mut self) {
        self.generation.0 += 1;
        debug!(generation = self.generation.0, "itinerary mutated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: f64, lng: f64) -> Option<GeoPoint> {
        Some(GeoPoint::new(lat, lng))
    }

    #[test]
    fn roles_follow_sequence_position() {
        let mut itinerary = Itinerary::new();
        itinerary.add_stop(place(50.85, 4.35));
        assert_eq!(itinerary.role_of(0), StopRole::Start);

        itinerary.add_stop(place(50.63, 5.57));
        itinerary.add_stop(place(51.22, 4.40));
        assert_eq!(itinerary.role_of(0), StopRole::Start);
        assert_eq!(itinerary.role_of(1), StopRole::Via);
        assert_eq!(itinerary.role_of(2), StopRole::End);
    }

    #[test]
    fn removing_the_start_promotes_the_next_stop() {
        let mut itinerary = Itinerary::new();
        let first = itinerary.add_stop(place(50.85, 4.35));
        itinerary.add_stop(place(50.63, 5.57));

        itinerary.remove_stop(first).unwrap();
        assert_eq!(itinerary.role_of(0), StopRole::Start);
        assert_eq!(itinerary.len(), 1);
    }

    #[test]
    fn remove_unknown_stop_is_rejected() {
        let mut itinerary = Itinerary::new();
        itinerary.add_stop(None);
        let before = itinerary.generation();

        let bogus = StopId::new(99);
        assert_eq!(
            itinerary.remove_stop(bogus),
            Err(ValidationError::UnknownStop(bogus))
        );
        assert_eq!(itinerary.generation(), before);
    }

    #[test]
    fn reorder_applies_a_valid_permutation() {
        let mut itinerary = Itinerary::new();
        let a = itinerary.add_stop(place(50.0, 4.0));
        let b = itinerary.add_stop(place(51.0, 4.0));
        let c = itinerary.add_stop(place(52.0, 4.0));

        itinerary.reorder(&[c, a, b]).unwrap();

        let ids: Vec<StopId> = itinerary.stops().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![c, a, b]);
    }

    #[test]
    fn reorder_rejects_a_foreign_id_set() {
        let mut itinerary = Itinerary::new();
        let a = itinerary.add_stop(place(50.0, 4.0));
        let b = itinerary.add_stop(place(51.0, 4.0));

        assert_eq!(
            itinerary.reorder(&[a, StopId::new(7)]),
            Err(ValidationError::InvalidOrder)
        );
        // No-op on failure
        let ids: Vec<StopId> = itinerary.stops().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn added_stop_infers_method_from_previous_distance() {
        let mut itinerary = Itinerary::new();
        itinerary.add_stop(place(50.0, 4.0));

        // ~78 km north: comfortably under two hours by car
        let near = itinerary.add_stop(place(50.7, 4.0));
        // ~310 km further: around five hours, train territory
        let mid = itinerary.add_stop(place(53.5, 4.0));
        // ~1000 km further still: plane
        let far = itinerary.add_stop(place(63.1, 4.0));

        let by_id = |id| itinerary.get(id).unwrap().travel_method();
        assert_eq!(by_id(near), TravelMethod::Car);
        assert_eq!(by_id(mid), TravelMethod::Train);
        assert_eq!(by_id(far), TravelMethod::Plane);
    }

    #[test]
    fn first_geocode_rederives_the_method() {
        let mut itinerary = Itinerary::new();
        itinerary.add_stop(place(50.0, 4.0));
        let blank = itinerary.add_stop(None);
        assert_eq!(itinerary.get(blank).unwrap().travel_method(), TravelMethod::Car);

        itinerary
            .set_position_and_name(blank, GeoPoint::new(63.1, 4.0), Some("North".into()))
            .unwrap();
        assert_eq!(
            itinerary.get(blank).unwrap().travel_method(),
            TravelMethod::Plane
        );

        // Relocating afterwards keeps the chosen method
        itinerary
            .set_position_and_name(blank, GeoPoint::new(50.1, 4.0), Some("Nearby".into()))
            .unwrap();
        assert_eq!(
            itinerary.get(blank).unwrap().travel_method(),
            TravelMethod::Plane
        );
    }

    #[test]
    fn shrinking_the_stopover_window_keeps_the_data() {
        let mut itinerary = Itinerary::new();
        itinerary.add_stop(place(50.0, 4.0));
        let id = itinerary.add_stop(place(40.0, 20.0));

        itinerary.set_flight_stop_count(id, 2).unwrap();
        itinerary
            .set_flight_stopover(id, 0, Stopover::new(Some("Vienna".into()), place(48.2, 16.4)))
            .unwrap();
        itinerary
            .set_flight_stopover(id, 1, Stopover::new(Some("Sofia".into()), place(42.7, 23.3)))
            .unwrap();

        itinerary.set_flight_stop_count(id, 0).unwrap();
        assert!(itinerary.get(id).unwrap().active_stopovers().is_empty());

        itinerary.set_flight_stop_count(id, 2).unwrap();
        let restored = itinerary.get(id).unwrap().active_stopovers();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].name.as_deref(), Some("Vienna"));
        assert_eq!(restored[1].name.as_deref(), Some("Sofia"));
    }

    #[test]
    fn every_mutation_advances_the_generation() {
        let mut itinerary = Itinerary::new();
        let g0 = itinerary.generation();
        let id = itinerary.add_stop(None);
        let g1 = itinerary.generation();
        itinerary.set_nights(id, 3).unwrap();
        let g2 = itinerary.generation();

        assert!(g0 < g1 && g1 < g2);
    }
}
