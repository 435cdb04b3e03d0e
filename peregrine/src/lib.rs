pub mod session;
pub mod trip_file;

pub use session::{LegRoute, StartPlaybackError, TripSession};
pub use trip_file::TripFile;
