//! Starbase dispatch: authenticates requests, pins them to one backend instance, and hands them to the query handler.

pub mod config;
pub mod data_source;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod instance;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{DispatchConfig, RegionHint, Source};
pub use data_source::{DataSource, ExternalConnection};
pub use error::{AppError, ConfigError, DelegateError};
pub use handlers::{BasicAuthStudio, QueryHandler, SqlQueryHandler, StudioHandler};
pub use instance::{DatabaseInstance, InstanceDirectory, InstanceHandle, InstanceKey, PgDirectory, PgDirectoryConfig};
pub use routes::{app, common_routes};
pub use service::{AuthGate, IdentityResolver, StudioOptions};
pub use state::AppState;
