//! Front door for every request not claimed by the common routes.
//!
//! One pass, no retries: studio shortcut, auth gate, instance resolution, source
//! selection, descriptor assembly, then delegation to the query handler.

use crate::data_source::{duplicate_request, DataSource};
use crate::error::AppError;
use crate::extractors::SelectedSource;
use crate::service::{studio_shortcut, AuthGate};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::Request,
    response::Response,
};
use tracing::Instrument;

pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Result<Response, AppError> {
    let span = tracing::debug_span!(
        "dispatch",
        method = %request.method(),
        path = %request.uri().path()
    );
    run(state, request).instrument(span).await
}

async fn run(state: AppState, request: Request<Body>) -> Result<Response, AppError> {
    let config = state.config.as_ref();

    if let Some(options) = studio_shortcut(config, request.method(), request.uri().path()) {
        tracing::debug!("studio shortcut");
        return state.studio_handler.handle(request, options).await;
    }

    AuthGate::authorize(&request, &config.authorization_token)?;

    let instance = state.resolver.resolve(config.region);

    let (mut parts, body) = request.into_parts();
    let SelectedSource(source) = SelectedSource::from_request_parts(&mut parts, &state).await?;

    let (original, copy) = duplicate_request(parts, body, config.max_body_bytes).await?;
    let data_source = DataSource::new(source, copy, instance, config.external.api_key.clone());

    tracing::debug!(%source, region = %config.region, "delegating to query handler");
    state.query_handler.handle(original, data_source, config).await
}
