//! Resolve the single backend instance this deployment serves.

use crate::config::RegionHint;
use crate::instance::{InstanceDirectory, InstanceHandle, InstanceKey};
use std::sync::Arc;

/// Well-known name every request's instance key is derived from.
pub const INSTANCE_NAME: &str = "sql-durable-object";

/// Holds the instance key (computed once) and the directory that resolves it.
#[derive(Clone)]
pub struct IdentityResolver {
    key: InstanceKey,
    directory: Arc<dyn InstanceDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn InstanceDirectory>) -> Self {
        let key = directory.id_from_name(INSTANCE_NAME);
        tracing::debug!(instance = %key, "instance key derived");
        IdentityResolver { key, directory }
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    /// `Auto` resolves without a location constraint; any other hint is passed through.
    pub fn resolve(&self, region: RegionHint) -> InstanceHandle {
        self.directory.get(&self.key, region.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::instance::{DatabaseInstance, QueryRequest, QueryResponse};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, response::{IntoResponse, Response}};
    use std::sync::Mutex;

    struct NullInstance;

    #[async_trait]
    impl DatabaseInstance for NullInstance {
        async fn execute_query(&self, _q: &QueryRequest, _raw: bool) -> Result<QueryResponse, AppError> {
            Ok(QueryResponse::Rows(Vec::new()))
        }

        async fn execute_transaction(&self, _q: &[QueryRequest], _raw: bool) -> Result<Vec<QueryResponse>, AppError> {
            Ok(Vec::new())
        }

        async fn fetch(&self, _request: Request<Body>) -> Response {
            ().into_response()
        }
    }

    #[derive(Default)]
    struct RecordingDirectory {
        names: Mutex<Vec<String>>,
        gets: Mutex<Vec<(InstanceKey, Option<RegionHint>)>>,
    }

    impl InstanceDirectory for RecordingDirectory {
        fn id_from_name(&self, name: &str) -> InstanceKey {
            self.names.lock().unwrap().push(name.to_string());
            InstanceKey::from_name(name)
        }

        fn get(&self, key: &InstanceKey, location: Option<RegionHint>) -> InstanceHandle {
            self.gets.lock().unwrap().push((key.clone(), location));
            Arc::new(NullInstance)
        }
    }

    #[test]
    fn key_is_derived_once_from_well_known_name() {
        let directory = Arc::new(RecordingDirectory::default());
        let resolver = IdentityResolver::new(directory.clone());
        resolver.resolve(RegionHint::Auto);
        resolver.resolve(RegionHint::Weur);
        assert_eq!(*directory.names.lock().unwrap(), vec![INSTANCE_NAME.to_string()]);
        assert_eq!(resolver.key(), &InstanceKey::from_name(INSTANCE_NAME));
    }

    #[test]
    fn auto_is_unconstrained_and_regions_pass_through() {
        let directory = Arc::new(RecordingDirectory::default());
        let resolver = IdentityResolver::new(directory.clone());
        resolver.resolve(RegionHint::Auto);
        resolver.resolve(RegionHint::Weur);
        resolver.resolve(RegionHint::Apac);

        let gets = directory.gets.lock().unwrap();
        let locations: Vec<_> = gets.iter().map(|(_, l)| *l).collect();
        assert_eq!(locations, vec![None, Some(RegionHint::Weur), Some(RegionHint::Apac)]);
        assert!(gets.iter().all(|(k, _)| k == resolver.key()));
    }
}
