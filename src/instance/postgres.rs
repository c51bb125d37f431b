//! Default backend instances: one lazily connected PostgreSQL pool per (key, region).

use super::{DatabaseInstance, InstanceDirectory, InstanceHandle, InstanceKey, QueryMeta, QueryRequest, QueryResponse};
use crate::config::RegionHint;
use crate::error::{AppError, ConfigError};
use crate::response::envelope_text;
use crate::sql::{column_names, row_to_object, row_to_values, PgBindValue};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRequestParts,
    },
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, Postgres};
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/starbase";

/// Connection settings for [`PgDirectory`].
#[derive(Clone, Debug)]
pub struct PgDirectoryConfig {
    /// `DATABASE_URL`: used for `auto` and for any region without its own URL.
    pub database_url: String,
    /// `DATABASE_URL_<REGION>` overrides, e.g. `DATABASE_URL_WEUR`.
    pub regional_urls: HashMap<RegionHint, String>,
    pub max_connections: u32,
}

impl PgDirectoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let mut regional_urls = HashMap::new();
        for region in RegionHint::ALL.into_iter().filter(|r| *r != RegionHint::Auto) {
            let key = format!("DATABASE_URL_{}", region.as_str().to_ascii_uppercase());
            if let Some(url) = get(&key) {
                regional_urls.insert(region, url);
            }
        }
        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 5,
        };
        Ok(PgDirectoryConfig {
            database_url,
            regional_urls,
            max_connections,
        })
    }
}

/// Directory over PostgreSQL. Pools are created on first `get` and never connect until used.
pub struct PgDirectory {
    default_options: PgConnectOptions,
    regional_options: HashMap<RegionHint, PgConnectOptions>,
    max_connections: u32,
    pools: RwLock<HashMap<(InstanceKey, Option<RegionHint>), PgPool>>,
}

impl PgDirectory {
    /// Parses every URL up front so that `get` cannot fail later.
    pub fn new(config: &PgDirectoryConfig) -> Result<Self, ConfigError> {
        let parse = |key: String, url: &str| {
            PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
                key: "DATABASE_URL",
                value: key,
                reason: e.to_string(),
            })
        };
        let default_options = parse("DATABASE_URL".into(), &config.database_url)?;
        let mut regional_options = HashMap::new();
        for (region, url) in &config.regional_urls {
            let options = parse(format!("DATABASE_URL_{}", region.as_str().to_ascii_uppercase()), url)?;
            regional_options.insert(*region, options);
        }
        Ok(PgDirectory {
            default_options,
            regional_options,
            max_connections: config.max_connections,
            pools: RwLock::new(HashMap::new()),
        })
    }

    fn options_for(&self, key: &InstanceKey, location: Option<RegionHint>) -> PgConnectOptions {
        let base = location
            .and_then(|r| self.regional_options.get(&r))
            .unwrap_or(&self.default_options);
        let short_key = &key.as_str()[..key.as_str().len().min(12)];
        base.clone().application_name(&format!("starbase-{}", short_key))
    }
}

impl InstanceDirectory for PgDirectory {
    fn get(&self, key: &InstanceKey, location: Option<RegionHint>) -> InstanceHandle {
        let cache_key = (key.clone(), location);
        if let Some(pool) = self
            .pools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&cache_key)
        {
            return Arc::new(PgInstance::new(pool.clone()));
        }
        let mut pools = self.pools.write().unwrap_or_else(|e| e.into_inner());
        let pool = pools
            .entry(cache_key)
            .or_insert_with(|| {
                tracing::info!(
                    instance = %key,
                    region = location.map(|r| r.as_str()).unwrap_or("auto"),
                    "creating instance pool"
                );
                PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .connect_lazy_with(self.options_for(key, location))
            })
            .clone();
        Arc::new(PgInstance::new(pool))
    }
}

/// A backend instance backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgInstance {
    pool: PgPool,
}

impl PgInstance {
    pub fn new(pool: PgPool) -> Self {
        PgInstance { pool }
    }

    async fn run_session(self, mut socket: WebSocket) {
        tracing::debug!("websocket session opened");
        while let Some(msg) = socket.recv().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(error = %e, "websocket receive failed");
                    break;
                }
            };
            match msg {
                Message::Text(text) => {
                    let reply = self.handle_frame(&text).await;
                    if socket.send(Message::Text(reply)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::debug!("websocket session closed");
    }

    async fn handle_frame(&self, text: &str) -> String {
        let frame: SessionFrame = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => return envelope_text::<()>(Err(format!("invalid message: {}", e))),
        };
        match frame {
            SessionFrame::Query { sql, params, raw } => {
                let query = QueryRequest { sql, params };
                envelope_text(self.execute_query(&query, raw).await.map_err(|e| e.to_string()))
            }
            SessionFrame::Transaction { queries, raw } => {
                envelope_text(self.execute_transaction(&queries, raw).await.map_err(|e| e.to_string()))
            }
        }
    }
}

/// Messages accepted on a websocket query session.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum SessionFrame {
    Query {
        sql: String,
        #[serde(default)]
        params: Vec<serde_json::Value>,
        #[serde(default)]
        raw: bool,
    },
    Transaction {
        queries: Vec<QueryRequest>,
        #[serde(default)]
        raw: bool,
    },
}

#[async_trait]
impl DatabaseInstance for PgInstance {
    async fn execute_query(&self, query: &QueryRequest, is_raw: bool) -> Result<QueryResponse, AppError> {
        run_statement(&self.pool, query, is_raw).await
    }

    async fn execute_transaction(
        &self,
        queries: &[QueryRequest],
        is_raw: bool,
    ) -> Result<Vec<QueryResponse>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut out = Vec::with_capacity(queries.len());
        for query in queries {
            out.push(run_statement(&mut *tx, query, is_raw).await?);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn fetch(&self, request: Request<Body>) -> Response {
        let (mut parts, _body) = request.into_parts();
        match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
            Ok(upgrade) => {
                let instance = self.clone();
                upgrade.on_upgrade(move |socket| instance.run_session(socket))
            }
            Err(_) => (StatusCode::BAD_REQUEST, "expected a websocket upgrade").into_response(),
        }
    }
}

/// Writes without RETURNING are executed for their row count; everything else is fetched.
fn is_plain_write(sql: &str) -> bool {
    let first = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    matches!(first.as_str(), "INSERT" | "UPDATE" | "DELETE" | "CREATE" | "DROP" | "ALTER")
        && !sql
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .any(|word| word.eq_ignore_ascii_case("RETURNING"))
}

async fn run_statement<'c, E>(executor: E, query: &QueryRequest, is_raw: bool) -> Result<QueryResponse, AppError>
where
    E: sqlx::Executor<'c, Database = Postgres>,
{
    tracing::debug!(sql = %query.sql, params = ?query.params, "query");
    let mut statement = sqlx::query(&query.sql);
    for p in &query.params {
        statement = statement.bind(PgBindValue::from(p));
    }

    if is_plain_write(&query.sql) {
        let result = statement.execute(executor).await?;
        let meta = QueryMeta {
            rows_read: 0,
            rows_written: result.rows_affected(),
        };
        return Ok(if is_raw {
            QueryResponse::Raw {
                columns: Vec::new(),
                rows: Vec::new(),
                meta,
            }
        } else {
            QueryResponse::Rows(Vec::new())
        });
    }

    let rows = statement.fetch_all(executor).await?;
    if is_raw {
        Ok(QueryResponse::Raw {
            columns: rows.first().map(column_names).unwrap_or_default(),
            rows: rows.iter().map(row_to_values).collect(),
            meta: QueryMeta {
                rows_read: rows.len() as u64,
                rows_written: 0,
            },
        })
    } else {
        Ok(QueryResponse::Rows(rows.iter().map(row_to_object).collect()))
    }
}
