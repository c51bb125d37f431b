//! Shared application state for all routes. Read-only after startup.

use crate::config::DispatchConfig;
use crate::handlers::{QueryHandler, StudioHandler};
use crate::service::IdentityResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DispatchConfig>,
    pub resolver: IdentityResolver,
    pub query_handler: Arc<dyn QueryHandler>,
    pub studio_handler: Arc<dyn StudioHandler>,
}
