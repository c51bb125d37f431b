//! Response envelope helpers for the query API: `{ "result": ..., "error": ... }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

pub fn success<T: Serialize>(result: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            result: Some(result),
            error: None,
        }),
    )
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Envelope::<serde_json::Value> {
            result: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

/// Same envelope as JSON text, for websocket frames.
pub fn envelope_text<T: Serialize>(result: Result<T, String>) -> String {
    let envelope = match result {
        Ok(r) => Envelope {
            result: Some(r),
            error: None,
        },
        Err(e) => Envelope {
            result: None,
            error: Some(e),
        },
    };
    serde_json::to_string(&envelope).unwrap_or_else(|e| {
        serde_json::json!({ "result": null, "error": e.to_string() }).to_string()
    })
}
