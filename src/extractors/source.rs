//! Extract the data source override from a request (`X-Starbase-Source` header, then `?source=`).

use crate::config::Source;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap, Uri},
};

/// Header name for the source override.
pub const SOURCE_HEADER: &str = "X-Starbase-Source";

/// Query parameter consulted when the header is absent.
pub const SOURCE_QUERY_PARAM: &str = "source";

/// Header first, then the first `source` query parameter, else `Internal`. A present but unknown value is an error,
/// including a bad header alongside a valid query parameter.
pub fn select_source(headers: &HeaderMap, uri: &Uri) -> Result<Source, AppError> {
    if let Some(value) = headers.get(SOURCE_HEADER) {
        let raw = value
            .to_str()
            .map_err(|_| AppError::InvalidSource(format!("{} header is not valid text", SOURCE_HEADER)))?;
        return raw.parse().map_err(AppError::InvalidSource);
    }
    let from_query = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.into_iter().find(|(k, _)| k == SOURCE_QUERY_PARAM))
        .map(|(_, v)| v);
    match from_query {
        Some(raw) => raw.parse().map_err(AppError::InvalidSource),
        None => Ok(Source::Internal),
    }
}

/// Extractor for the selected [`Source`]; rejects unknown values with 400.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectedSource(pub Source);

#[async_trait]
impl<S> FromRequestParts<S> for SelectedSource
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        select_source(&parts.headers, &parts.uri).map(SelectedSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn select(uri: &str, header: Option<&str>) -> Result<Source, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(h) = header {
            headers.insert(SOURCE_HEADER, HeaderValue::from_str(h).unwrap());
        }
        select_source(&headers, &uri.parse().unwrap())
    }

    #[test]
    fn defaults_to_internal() {
        assert_eq!(select("/query", None).unwrap(), Source::Internal);
    }

    #[test]
    fn query_param_is_used_without_header() {
        assert_eq!(select("/query?source=external", None).unwrap(), Source::External);
    }

    #[test]
    fn header_overrides_query_param() {
        assert_eq!(
            select("/query?source=internal", Some("external")).unwrap(),
            Source::External
        );
    }

    #[test]
    fn repeated_query_param_uses_first_value() {
        assert_eq!(select("/query?source=external&source=internal", None).unwrap(), Source::External);
        assert_eq!(select("/query?source=internal&source=bogus", None).unwrap(), Source::Internal);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(matches!(select("/query?source=bogus", None), Err(AppError::InvalidSource(_))));
        assert!(matches!(select("/query", Some("nope")), Err(AppError::InvalidSource(_))));
    }

    #[test]
    fn bad_header_does_not_fall_back_to_query() {
        assert!(matches!(
            select("/query?source=internal", Some("nope")),
            Err(AppError::InvalidSource(_))
        ));
    }

    #[tokio::test]
    async fn extractor_reads_parts() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/query?source=external")
            .body(())
            .unwrap()
            .into_parts();
        let SelectedSource(source) = SelectedSource::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(source, Source::External);
    }
}
