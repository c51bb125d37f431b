//! Routing descriptor handed to the query handler with every authorized request.

use crate::config::Source;
use crate::error::AppError;
use crate::instance::InstanceHandle;
use axum::{
    body::{to_bytes, Body},
    http::{request::Parts, Request},
};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use std::error::Error as StdError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalConnection {
    /// Empty when no key is configured.
    pub api_key: String,
}

/// Per-request routing metadata.
///
/// `internal` and `external` are both always populated; consumers branch on `source`.
pub struct DataSource {
    pub source: Source,
    /// Independent copy of the inbound request: method, URI, headers and body, no extensions.
    pub request: Request<Body>,
    pub internal: Option<InstanceHandle>,
    pub external: Option<ExternalConnection>,
}

impl DataSource {
    pub fn new(source: Source, request: Request<Body>, internal: InstanceHandle, external_api_key: String) -> Self {
        DataSource {
            source,
            request,
            internal: Some(internal),
            external: Some(ExternalConnection {
                api_key: external_api_key,
            }),
        }
    }

    /// Consume the descriptor's request copy and return its body.
    pub async fn take_body(&mut self, limit: usize) -> Result<Bytes, AppError> {
        let body = std::mem::replace(self.request.body_mut(), Body::empty());
        to_bytes(body, limit).await.map_err(|e| body_error(e, limit))
    }
}

/// Buffer the body once and rebuild two requests that can each be read independently.
/// The first keeps the original extensions (needed for websocket upgrades); the copy does not.
pub async fn duplicate_request(parts: Parts, body: Body, limit: usize) -> Result<(Request<Body>, Request<Body>), AppError> {
    let bytes = to_bytes(body, limit).await.map_err(|e| body_error(e, limit))?;

    let mut copy = Request::builder()
        .method(parts.method.clone())
        .uri(parts.uri.clone())
        .version(parts.version)
        .body(Body::from(bytes.clone()))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    *copy.headers_mut() = parts.headers.clone();

    let original = Request::from_parts(parts, Body::from(bytes));
    Ok((original, copy))
}

/// A length-limit failure anywhere in the source chain is 413; anything else is a bad body.
fn body_error(err: axum::Error, limit: usize) -> AppError {
    let mut cause: Option<&(dyn StdError + 'static)> = Some(&err);
    while let Some(e) = cause {
        if e.is::<LengthLimitError>() {
            return AppError::PayloadTooLarge(limit);
        }
        cause = e.source();
    }
    AppError::BadRequest(format!("failed to read request body: {}", err))
}
