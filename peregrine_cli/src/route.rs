use std::path::Path;

use tracing::info;

pub async fn run(trip: &Path) -> Result<(), anyhow::Error> {
    let mut session = crate::file_utils::load_session(trip).await?;

    session.refresh_routes().await;

    for route in session.leg_routes() {
        let arrival = session
            .itinerary()
            .get(route.arrival)
            .and_then(|stop| stop.name())
            .unwrap_or("(unnamed)");

        info!(
            "leg to {} resolved with {} points{}",
            arrival,
            route.geometry.len(),
            if route.geometry.len() == 2 {
                " (straight-line fallback)"
            } else {
                ""
            }
        );
    }

    Ok(())
}
