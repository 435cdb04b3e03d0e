use std::{
    path::Path,
    time::{Duration, Instant},
};

use peregrine_playback::session::PlaybackUpdate;
use tracing::{debug, info, warn};

pub async fn run(trip: &Path, speed_index: usize, fps: u32) -> Result<(), anyhow::Error> {
    let session = crate::file_utils::load_session(trip).await?;

    let mut playback = match session.begin_playback().await {
        Ok(playback) => playback,
        Err(error) => {
            // Startup failures take the same teardown path as a finished run
            warn!(%error, "playback aborted");
            return Ok(());
        }
    };
    playback.set_speed_index(speed_index);

    info!(
        "departing - {} legs, speed {}x",
        playback.segments().len(),
        playback.speed().multiplier()
    );

    let mut interval = tokio::time::interval(Duration::from_millis(1000 / u64::from(fps.max(1))));
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let dt_ms = last.elapsed().as_secs_f64() * 1000.0;
        last = Instant::now();

        match playback.advance(dt_ms) {
            PlaybackUpdate::Frame(frame) => {
                info!(
                    "Day {} {} - leg {} - {:.4}, {:.4}",
                    frame.day,
                    frame.time_label,
                    frame.segment + 1,
                    frame.position.lat,
                    frame.position.lng
                );
            }
            PlaybackUpdate::Resting { day, time_label } => {
                debug!("Day {day} {time_label} - layover");
            }
            PlaybackUpdate::Done => break,
        }
    }

    info!("journey complete - token removed, view refitted to all stops");
    Ok(())
}
