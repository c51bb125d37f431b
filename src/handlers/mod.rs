//! Request handlers: the dispatcher entry point and the collaborators it delegates to.

pub mod dispatch;
pub mod query;
pub mod studio;

pub use dispatch::dispatch;
pub use query::SqlQueryHandler;
pub use studio::BasicAuthStudio;

use crate::config::DispatchConfig;
use crate::data_source::DataSource;
use crate::error::AppError;
use crate::service::StudioOptions;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

/// Serves an authorized request. Its response, or its error, goes back to the caller untouched.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(
        &self,
        request: Request<Body>,
        data_source: DataSource,
        config: &DispatchConfig,
    ) -> Result<Response, AppError>;
}

/// Serves `GET /studio`. Runs its own credential challenge.
#[async_trait]
pub trait StudioHandler: Send + Sync {
    async fn handle(&self, request: Request<Body>, options: StudioOptions) -> Result<Response, AppError>;
}
