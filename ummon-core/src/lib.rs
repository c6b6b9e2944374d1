pub mod config;
pub mod error;
pub mod profile;
pub mod snapshot;

pub use config::ExporterConfig;
pub use error::ExporterError;
pub use profile::{MappingProfile, TimestampUnit};
pub use snapshot::{InstanceSnapshot, StatusSnapshot, TaskCollectionSnapshot, TaskSnapshot};
