//! Pre-auth shortcut to the studio UI.

use crate::config::DispatchConfig;
use axum::http::Method;

pub const STUDIO_PATH: &str = "/studio";

/// Passed to the studio handler: its own login plus the API token for calls back into this service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioOptions {
    pub username: String,
    pub password: String,
    pub api_token: String,
}

/// `Some` only for `GET /studio` when both studio credentials are configured.
pub fn studio_shortcut(config: &DispatchConfig, method: &Method, path: &str) -> Option<StudioOptions> {
    let credentials = config.studio.as_ref()?;
    if method != Method::GET || path != STUDIO_PATH {
        return None;
    }
    Some(StudioOptions {
        username: credentials.username.clone(),
        password: credentials.password.clone(),
        api_token: config.authorization_token.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExternalConfig, RegionHint, StudioCredentials, DEFAULT_MAX_BODY_BYTES};

    fn config(studio: Option<(&str, &str)>) -> DispatchConfig {
        DispatchConfig {
            authorization_token: "secret".into(),
            region: RegionHint::Auto,
            studio: studio.map(|(u, p)| StudioCredentials {
                username: u.into(),
                password: p.into(),
            }),
            external: ExternalConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[test]
    fn triggers_on_get_studio_with_credentials() {
        let options = studio_shortcut(&config(Some(("a", "b"))), &Method::GET, "/studio").unwrap();
        assert_eq!(
            options,
            StudioOptions {
                username: "a".into(),
                password: "b".into(),
                api_token: "secret".into(),
            }
        );
    }

    #[test]
    fn never_triggers_without_credentials() {
        assert!(studio_shortcut(&config(None), &Method::GET, "/studio").is_none());
    }

    #[test]
    fn only_exact_method_and_path() {
        let c = config(Some(("a", "b")));
        assert!(studio_shortcut(&c, &Method::POST, "/studio").is_none());
        assert!(studio_shortcut(&c, &Method::HEAD, "/studio").is_none());
        assert!(studio_shortcut(&c, &Method::GET, "/studio/").is_none());
        assert!(studio_shortcut(&c, &Method::GET, "/studios").is_none());
        assert!(studio_shortcut(&c, &Method::GET, "/").is_none());
    }
}
