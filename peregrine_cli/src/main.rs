use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

mod file_utils;
mod play;
mod route;
mod summary;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-leg distances and durations plus trip totals
    Summary { trip: PathBuf },

    /// Resolve every leg and report the geometry
    Route { trip: PathBuf },

    /// Animate the trip with a simulated calendar clock
    Play {
        trip: PathBuf,

        /// Initial rung on the speed ladder (0-6, 4 is real time)
        #[arg(short, long, default_value_t = 4)]
        speed_index: usize,

        /// Frames per second to simulate
        #[arg(short, long, default_value_t = 10)]
        fps: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Summary { trip } => summary::run(&trip).await,
        Commands::Route { trip } => route::run(&trip).await,
        Commands::Play {
            trip,
            speed_index,
            fps,
        } => play::run(&trip, speed_index, fps).await,
    }
}
