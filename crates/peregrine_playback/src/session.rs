use peregrine_core::geopoint::GeoPoint;
use thiserror::Error;
use tracing::debug;

use crate::{clock::SimClock, segment::PlaybackSegment, speed::SpeedLadder};

/// Real-time pause between segments, a visual layover beat. Counted in
/// wall-clock milliseconds, not simulated time.
const LAYOVER_MS: f64 = 500.0;
/// Floor for the per-tick progress divisor.
const MIN_TICK_DIVISOR_MS: f64 = 100.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("playback needs at least two stops")]
    NotEnoughStops,

    #[error("segment {0} has no geometry")]
    EmptyGeometry(usize),
}

/// What the host should render after one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackUpdate {
    /// The token moved. Recenter the view iff `camera` is set.
    Frame(PlaybackFrame),

    /// Waiting out the layover beat between segments.
    Resting { day: u32, time_label: String },

    /// Session over, whether completed or cancelled: remove the token,
    /// hide the clock readout, refit the view to all stop markers.
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackFrame {
    pub position: GeoPoint,
    pub segment: usize,
    pub day: u32,
    pub time_label: String,
    /// Recenter target while the camera is locked to the token.
    pub camera: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Travelling { segment: usize, progress: f64 },
    Layover { next_segment: usize, remaining_ms: f64 },
    Done,
}

/// One playback session: an explicit state machine advanced by the host's
/// frame callback with the elapsed wall-clock milliseconds. The simulated
/// clock and camera lock live here and die with the session.
pub struct PlaybackSession {
    segments: Vec<PlaybackSegment>,
    phase: Phase,
    clock: SimClock,
    speed: SpeedLadder,
    camera_locked: bool,
    cancelled: bool,
}

impl PlaybackSession {
    pub fn new(segments: Vec<PlaybackSegment>) -> Result<Self, PlaybackError> {
        if segments.is_empty() {
            return Err(PlaybackError::NotEnoughStops);
        }
        if let Some(index) = segments.iter().position(|s| s.geometry().is_empty()) {
            return Err(PlaybackError::EmptyGeometry(index));
        }

        Ok(PlaybackSession {
            segments,
            phase: Phase::Travelling {
                segment: 0,
                progress: 0.0,
            },
            clock: SimClock::default(),
            speed: SpeedLadder::default(),
            camera_locked: true,
            cancelled: false,
        })
    }

    pub fn segments(&self) -> &[PlaybackSegment] {
        &self.segments
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn speed(&self) -> &SpeedLadder {
        &self.speed
    }

    pub fn faster(&mut self) {
        self.speed.faster();
    }

    pub fn slower(&mut self) {
        self.speed.slower();
    }

    pub fn set_speed_index(&mut self, index: usize) {
        self.speed.set_index(index);
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Where the token sits right now; `None` once the session is over.
    pub fn current_position(&self) -> Option<GeoPoint> {
        match self.phase {
            Phase::Travelling { segment, progress } => {
                self.segments[segment].position_at(progress)
            }
            Phase::Layover { next_segment, .. } => {
                self.segments[next_segment].position_at(0.0)
            }
            Phase::Done => None,
        }
    }

    /// Cooperative cancellation, observed at the top of the next tick.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_camera_locked(&self) -> bool {
        self.camera_locked
    }

    /// A manual map drag breaks the camera follow.
    pub fn release_camera(&mut self) {
        self.camera_locked = false;
    }

    /// Restores the camera follow and hands back the immediate recenter
    /// target.
    pub fn lock_camera(&mut self) -> Option<GeoPoint> {
        self.camera_locked = true;
        self.current_position()
    }

    /// One tick per rendered frame; `dt_ms` is the elapsed wall-clock time
    /// since the previous frame.
    pub fn advance(&mut self, dt_ms: f64) -> PlaybackUpdate {
        if self.cancelled {
            return self.finish("cancelled");
        }

        match self.phase {
            Phase::Done => PlaybackUpdate::Done,
            Phase::Layover {
                next_segment,
                remaining_ms,
            } => {
                let remaining = remaining_ms - dt_ms;
                if remaining > 0.0 {
                    self.phase = Phase::Layover {
                        next_segment,
                        remaining_ms: remaining,
                    };
                    PlaybackUpdate::Resting {
                        day: self.clock.day(),
                        time_label: self.clock.time_label(),
                    }
                } else {
                    self.phase = Phase::Travelling {
                        segment: next_segment,
                        progress: 0.0,
                    };
                    self.frame_at(next_segment, 0.0)
                }
            }
            Phase::Travelling { segment, progress } => {
                let mult = self.speed.multiplier();
                let divisor = self.segments[segment]
                    .base_duration_ms()
                    .max(MIN_TICK_DIVISOR_MS);
                let progress = (progress + dt_ms * mult / divisor).min(1.0);
                self.clock.advance(dt_ms * mult / 1000.0);

                if progress >= 1.0 {
                    self.complete_segment(segment)
                } else {
                    self.phase = Phase::Travelling { segment, progress };
                    self.frame_at(segment, progress)
                }
            }
        }
    }

    fn complete_segment(&mut self, segment: usize) -> PlaybackUpdate {
        let nights = self.segments[segment].nights_after();
        if nights > 0 {
            self.clock.add_nights(nights);
        }

        if segment + 1 < self.segments.len() {
            self.phase = Phase::Layover {
                next_segment: segment + 1,
                remaining_ms: LAYOVER_MS,
            };
            // Last frame of the leg, parked on the arrival stop
            self.frame_at(segment, 1.0)
        } else {
            self.finish("completed")
        }
    }

    fn frame_at(&mut self, segment: usize, progress: f64) -> PlaybackUpdate {
        let Some(position) = self.segments[segment].position_at(progress) else {
            return self.finish("aborted on empty geometry");
        };

        PlaybackUpdate::Frame(PlaybackFrame {
            position,
            segment,
            day: self.clock.day(),
            time_label: self.clock.time_label(),
            camera: self.camera_locked.then_some(position),
        })
    }

    fn finish(&mut self, outcome: &str) -> PlaybackUpdate {
        self.phase = Phase::Done;
        debug!(outcome, "playback session over");
        PlaybackUpdate::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peregrine_core::travel_method::TravelMethod;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    fn one_leg(hours: f64, nights_after: u32) -> PlaybackSegment {
        PlaybackSegment::new(
            vec![point(0.0, 0.0), point(0.0, 1.0)],
            TravelMethod::Car,
            hours,
            nights_after,
        )
    }

    #[test]
    fn rejects_an_empty_trip() {
        assert_eq!(
            PlaybackSession::new(vec![]).err(),
            Some(PlaybackError::NotEnoughStops)
        );
    }

    #[test]
    fn progress_completes_when_elapsed_reaches_the_base_duration() {
        // 2 simulated hours -> 2000 ms at 1x
        let mut session = PlaybackSession::new(vec![one_leg(2.0, 0)]).unwrap();

        let update = session.advance(1999.0);
        assert!(matches!(update, PlaybackUpdate::Frame(_)));
        assert!(!session.is_done());

        let update = session.advance(1.0);
        assert_eq!(update, PlaybackUpdate::Done);
        assert!(session.is_done());
    }

    #[test]
    fn frames_follow_the_token_while_locked() {
        let mut session = PlaybackSession::new(vec![one_leg(2.0, 0)]).unwrap();

        let PlaybackUpdate::Frame(frame) = session.advance(1000.0) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.camera, Some(frame.position));
        assert_eq!(frame.position, point(0.0, 0.5));
    }

    #[test]
    fn releasing_the_camera_stops_the_recentering() {
        let mut session = PlaybackSession::new(vec![one_leg(2.0, 0)]).unwrap();
        session.release_camera();

        let PlaybackUpdate::Frame(frame) = session.advance(500.0) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.camera, None);

        let target = session.lock_camera();
        assert_eq!(target, session.current_position());
        assert!(session.is_camera_locked());
    }

    #[test]
    fn speed_scales_the_simulated_clock() {
        let mut session = PlaybackSession::new(vec![one_leg(10.0, 0)]).unwrap();
        session.faster(); // 2x

        session.advance(1000.0);
        // 2 simulated hours after an 08:00 departure
        assert_eq!(session.clock().time_label(), "10:00");
    }

    #[test]
    fn cancelling_mid_segment_tears_down_immediately() {
        let mut session = PlaybackSession::new(vec![one_leg(2.0, 0), one_leg(2.0, 0)]).unwrap();
        session.advance(500.0);

        session.cancel();
        assert_eq!(session.advance(16.0), PlaybackUpdate::Done);
        assert_eq!(session.current_position(), None);
        assert!(session.is_done());
    }

    #[test]
    fn nights_jump_the_calendar_and_stage_a_layover() {
        let mut session =
            PlaybackSession::new(vec![one_leg(2.0, 2), one_leg(2.0, 0)]).unwrap();

        // Finish the first leg in one long frame
        let update = session.advance(2000.0);
        assert!(matches!(update, PlaybackUpdate::Frame(_)));
        assert_eq!(session.clock().day(), 3);

        // The layover burns real time, unscaled
        assert!(matches!(
            session.advance(200.0),
            PlaybackUpdate::Resting { .. }
        ));
        assert!(matches!(
            session.advance(200.0),
            PlaybackUpdate::Resting { .. }
        ));

        // Crossing the 500 ms beat starts the next segment
        let PlaybackUpdate::Frame(frame) = session.advance(200.0) else {
            panic!("expected the next segment to start");
        };
        assert_eq!(frame.segment, 1);
    }

    #[test]
    fn completing_the_last_segment_ends_the_session() {
        let mut session = PlaybackSession::new(vec![one_leg(1.0, 3)]).unwrap();

        assert_eq!(session.advance(1000.0), PlaybackUpdate::Done);
        // Nights at the final stop still land on the calendar
        assert_eq!(session.clock().day(), 4);
    }
}
