//! Fleet data structures and snapshot loading

mod data;
pub mod loader;

pub use data::{FleetSnapshot, RevenueSplit, UnitCounts};
pub use loader::{load_fleet, load_fleet_from_reader};
