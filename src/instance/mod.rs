//! Backend instance seam: the directory that addresses instances and the narrow
//! surface the dispatcher and query handler may call on one.

pub mod postgres;

use crate::config::RegionHint;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

pub use postgres::{PgDirectory, PgDirectoryConfig, PgInstance};

/// Stable address of one logical backend instance, derived from a name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// SHA-256 of the name, hex encoded. Same name, same key, in every process.
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        InstanceKey(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One statement with positional parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub rows_read: u64,
    pub rows_written: u64,
}

/// Rows as JSON objects, or in raw mode as column names plus value arrays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Rows(Vec<serde_json::Map<String, serde_json::Value>>),
    Raw {
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
        meta: QueryMeta,
    },
}

/// Operations callable on a resolved backend instance.
#[async_trait]
pub trait DatabaseInstance: Send + Sync {
    async fn execute_query(&self, query: &QueryRequest, is_raw: bool) -> Result<QueryResponse, AppError>;

    /// All statements commit together or not at all.
    async fn execute_transaction(
        &self,
        queries: &[QueryRequest],
        is_raw: bool,
    ) -> Result<Vec<QueryResponse>, AppError>;

    /// Hand a raw request (typically a websocket upgrade) to the instance.
    async fn fetch(&self, request: Request<Body>) -> Response;
}

pub type InstanceHandle = Arc<dyn DatabaseInstance>;

/// Maps names to keys and keys to instance handles.
///
/// `get` never fails: an unreachable instance surfaces on the first call made against the handle.
pub trait InstanceDirectory: Send + Sync {
    fn id_from_name(&self, name: &str) -> InstanceKey {
        InstanceKey::from_name(name)
    }

    /// `location` is `None` for no placement constraint.
    fn get(&self, key: &InstanceKey, location: Option<RegionHint>) -> InstanceHandle;
}
