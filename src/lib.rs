pub mod config;
pub mod generator;
pub mod logging;
pub mod region;
pub mod snapshot;
pub mod summary;
pub mod verify;

pub use generator::{generate_for_catalog, RegionMetrics, RegionStatus};
pub use region::{Region, RegionCatalog};
pub use snapshot::Snapshot;
