//! Shared-secret check for inbound requests.
//!
//! Plain HTTP requests must carry `Authorization: Bearer <token>`. Websocket upgrades
//! cannot reliably set custom headers from every client, so they present the secret
//! as a `token` query parameter instead, and only there.

use crate::error::AppError;
use axum::{
    extract::Query,
    http::{header, HeaderMap, Request},
};
use subtle::ConstantTimeEq;

pub struct AuthGate;

impl AuthGate {
    /// `Ok(())` to allow; `Unauthorized` (401) or `UpgradeRejected` (440) to deny.
    ///
    /// An empty `expected_token` is compared literally like any other value.
    pub fn authorize<B>(request: &Request<B>, expected_token: &str) -> Result<(), AppError> {
        if is_websocket_upgrade(request.headers()) {
            let token = query_token(request);
            if !secure_eq(token.as_deref(), expected_token) {
                tracing::warn!(path = %request.uri().path(), "websocket upgrade rejected: bad token");
                return Err(AppError::UpgradeRejected);
            }
            return Ok(());
        }

        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let expected = format!("Bearer {}", expected_token);
        if !secure_eq(presented, &expected) {
            tracing::warn!(path = %request.uri().path(), "request rejected: missing or invalid bearer token");
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }
}

/// `Upgrade: websocket`, compared case-insensitively.
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}

/// First `token` parameter wins when it is repeated.
fn query_token<B>(request: &Request<B>) -> Option<String> {
    Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.into_iter().find(|(k, _)| k == "token"))
        .map(|(_, v)| v)
}

fn secure_eq(presented: Option<&str>, expected: &str) -> bool {
    match presented {
        Some(p) => p.as_bytes().ct_eq(expected.as_bytes()).into(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_token_must_match_exactly() {
        let ok = request("/query", &[("Authorization", "Bearer secret")]);
        assert!(AuthGate::authorize(&ok, "secret").is_ok());

        for bad in ["Bearer wrong", "bearer secret", "Bearer secret ", "secret", "Basic secret"] {
            let req = request("/query", &[("Authorization", bad)]);
            assert!(matches!(AuthGate::authorize(&req, "secret"), Err(AppError::Unauthorized)), "{bad}");
        }
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let req = request("/query", &[]);
        assert!(matches!(AuthGate::authorize(&req, "secret"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn query_token_is_ignored_for_plain_requests() {
        let req = request("/query?token=secret", &[]);
        assert!(matches!(AuthGate::authorize(&req, "secret"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn upgrade_uses_query_token_only() {
        let ok = request("/socket?token=secret", &[("Upgrade", "websocket")]);
        assert!(AuthGate::authorize(&ok, "secret").is_ok());

        let header_only = request(
            "/socket",
            &[("Upgrade", "websocket"), ("Authorization", "Bearer secret")],
        );
        assert!(matches!(AuthGate::authorize(&header_only, "secret"), Err(AppError::UpgradeRejected)));

        let wrong = request("/socket?token=wrong", &[("Upgrade", "websocket")]);
        assert!(matches!(AuthGate::authorize(&wrong, "secret"), Err(AppError::UpgradeRejected)));
    }

    #[test]
    fn repeated_token_uses_first_value() {
        let first_ok = request("/socket?token=secret&token=wrong", &[("Upgrade", "websocket")]);
        assert!(AuthGate::authorize(&first_ok, "secret").is_ok());

        let first_wrong = request("/socket?token=wrong&token=secret", &[("Upgrade", "websocket")]);
        assert!(matches!(AuthGate::authorize(&first_wrong, "secret"), Err(AppError::UpgradeRejected)));
    }

    #[test]
    fn upgrade_header_is_case_insensitive() {
        let req = request("/socket?token=secret", &[("Upgrade", "WebSocket")]);
        assert!(is_websocket_upgrade(req.headers()));
        assert!(AuthGate::authorize(&req, "secret").is_ok());

        let other = request("/socket", &[("Upgrade", "h2c")]);
        assert!(!is_websocket_upgrade(other.headers()));
    }

    #[test]
    fn empty_expected_token_is_compared_literally() {
        let bare = request("/query", &[("Authorization", "Bearer ")]);
        assert!(AuthGate::authorize(&bare, "").is_ok());

        let any = request("/query", &[("Authorization", "Bearer anything")]);
        assert!(AuthGate::authorize(&any, "").is_err());
        assert!(AuthGate::authorize(&request("/query", &[]), "").is_err());
    }
}
