use std::path::Path;

use comfy_table::Table;
use peregrine_core::metrics;
use tracing::info;

pub async fn run(trip: &Path) -> Result<(), anyhow::Error> {
    let session = crate::file_utils::load_session(trip).await?;
    let itinerary = session.itinerary();

    let mut table = Table::new();
    table.set_header(vec![
        "#", "Role", "Stop", "Arrive by", "Leg", "Duration", "Nights",
    ]);

    for (index, stop) in itinerary.stops().iter().enumerate() {
        let leg = (index > 0)
            .then(|| metrics::leg_metrics(&itinerary.stops()[index - 1], stop))
            .flatten();

        table.add_row(vec![
            (index + 1).to_string(),
            itinerary.role_of(index).to_string(),
            stop.name().unwrap_or("(unnamed)").to_string(),
            if index == 0 {
                String::from("-")
            } else {
                stop.travel_method().to_string()
            },
            leg.map(|leg| format!("{:.1} km", leg.distance.kilometers()))
                .unwrap_or_else(|| String::from("-")),
            leg.map(|leg| leg.display_duration())
                .unwrap_or_else(|| String::from("-")),
            if index == 0 {
                String::from("-")
            } else {
                stop.nights().to_string()
            },
        ]);
    }

    println!("{table}");

    let totals = session.totals();
    info!(
        "{} stops - {:.1} km - {} nights - {} days total",
        itinerary.len(),
        totals.total_distance.kilometers(),
        totals.total_nights,
        totals.display_days()
    );

    Ok(())
}
