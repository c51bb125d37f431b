//! Default query handler: `POST /query`, `POST /query/raw`, and websocket sessions on the internal instance.

use super::QueryHandler;
use crate::config::{DispatchConfig, Source};
use crate::data_source::DataSource;
use crate::error::AppError;
use crate::instance::QueryRequest;
use crate::response::{failure, success};
use crate::service::is_websocket_upgrade;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Body of `POST /query` and `POST /query/raw`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryPayload {
    Transaction { transaction: Vec<QueryRequest> },
    Single(QueryRequest),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SqlQueryHandler;

impl SqlQueryHandler {
    pub fn new() -> Self {
        SqlQueryHandler
    }
}

#[async_trait]
impl QueryHandler for SqlQueryHandler {
    async fn handle(
        &self,
        request: Request<Body>,
        mut data_source: DataSource,
        config: &DispatchConfig,
    ) -> Result<Response, AppError> {
        if data_source.source == Source::External {
            let kind = config.external.db_type.as_deref().unwrap_or("external");
            return Err(AppError::NotImplemented(format!("{} data source is not configured", kind)));
        }
        let instance = data_source
            .internal
            .clone()
            .ok_or_else(|| AppError::BadRequest("no internal instance resolved".into()))?;

        if is_websocket_upgrade(request.headers()) {
            return Ok(instance.fetch(request).await);
        }

        let is_raw = match (request.method(), request.uri().path()) {
            (&Method::POST, "/query") => false,
            (&Method::POST, "/query/raw") => true,
            _ => return Ok(failure(StatusCode::NOT_FOUND, "Unknown operation")),
        };

        let body = data_source.take_body(config.max_body_bytes).await?;
        let payload: QueryPayload =
            serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(format!("invalid query body: {}", e)))?;

        match payload {
            QueryPayload::Single(query) => {
                if query.sql.trim().is_empty() {
                    return Err(AppError::BadRequest("sql is required".into()));
                }
                match instance.execute_query(&query, is_raw).await {
                    Ok(result) => Ok(success(result).into_response()),
                    Err(e) => {
                        tracing::debug!(error = %e, "query failed");
                        Ok(failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
                    }
                }
            }
            QueryPayload::Transaction { transaction } => {
                if transaction.is_empty() || transaction.iter().any(|q| q.sql.trim().is_empty()) {
                    return Err(AppError::BadRequest("transaction requires at least one statement with sql".into()));
                }
                match instance.execute_transaction(&transaction, is_raw).await {
                    Ok(results) => Ok(success(results).into_response()),
                    Err(e) => {
                        tracing::debug!(error = %e, "transaction failed");
                        Ok(failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
                    }
                }
            }
        }
    }
}
