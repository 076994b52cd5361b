//! bunkmeter-sources — where attendance counts come from.
//!
//! Implements the `AttendanceSource` trait for a local TOML sheet and for
//! the scraping backend that logs into the student portal, plus the
//! configuration that selects between them.

pub mod config;
pub mod error;
pub mod mock;
pub mod remote;
pub mod sheet;

pub use config::{create_source, load_config_from, BunkmeterConfig, RemoteConfig};
pub use error::SourceError;
pub use mock::MockSource;
pub use remote::{Credentials, HealthStatus, RemoteSource};
pub use sheet::SheetSource;
