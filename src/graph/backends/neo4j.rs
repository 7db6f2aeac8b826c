//! Neo4j backend over the `neo4rs` bolt driver.
//!
//! # Example
//!
//! ```ignore
//! use graphrepo::config::Neo4jConfig;
//! use graphrepo::graph::backends::neo4j::Neo4jClient;
//! use graphrepo::graph::QueryExt;
//!
//! let client = Neo4jClient::connect(&config).await?;
//! let rows = client.query("MATCH (e:Entity) RETURN e").fetch_all().await?;
//! ```
//!
//! # Security
//!
//! Every parameter is bound through the driver's typed parameter API and
//! travels in the bolt protocol's parameter map; values never appear in the
//! statement text, so user-controlled property values cannot alter the
//! statement.

use std::collections::HashMap;

use async_stream::try_stream;
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph};
use serde_json::Value as JsonValue;

use crate::config::Neo4jConfig;
use crate::error::GraphError;
use crate::graph::cypher::return_columns;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// Neo4j graph client.
///
/// Cheap to clone — the underlying driver pools its bolt connections.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Graph,
}

impl Neo4jClient {
    /// Connects to the configured Neo4j instance.
    ///
    /// The driver's pool is lazy, so a cheap `RETURN 1` ping runs once here
    /// to force a real bolt handshake — an unreachable store fails at
    /// connect time instead of on the first repository call.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, GraphError> {
        let driver_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .db(config.database.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections)
            .build()?;

        let graph = Graph::connect(driver_config).await?;
        graph.run(neo4rs::query("RETURN 1")).await?;

        tracing::info!(uri = %config.uri, db = %config.database, "connected to Neo4j");

        Ok(Self { graph })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, GraphError> {
        let columns = return_columns(cypher)?;
        let query = build_query(cypher, params)?;

        tracing::debug!(statement = cypher, "executing statement");

        let statement = cypher.to_string();
        let mut result = self.graph.execute(query).await.map_err(|e| GraphError::Query {
            message: e.to_string(),
            query: statement.clone(),
        })?;

        let stream = try_stream! {
            loop {
                let next = result.next().await.map_err(|e| GraphError::Query {
                    message: e.to_string(),
                    query: statement.clone(),
                })?;

                match next {
                    Some(row) => yield convert_row(&row, &columns)?,
                    None => break,
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), GraphError> {
        let query = build_query(cypher, params)?;

        tracing::debug!(statement = cypher, "running statement");

        self.graph.run(query).await.map_err(|e| GraphError::Query {
            message: e.to_string(),
            query: cypher.to_string(),
        })
    }
}

/// Builds a driver query, binding every parameter through the typed API.
fn build_query(cypher: &str, params: Params) -> Result<neo4rs::Query, GraphError> {
    let mut query = neo4rs::query(cypher);
    for (name, value) in params {
        query = bind_param(query, &name, value)?;
    }
    Ok(query)
}

fn bind_param(
    query: neo4rs::Query,
    name: &str,
    value: JsonValue,
) -> Result<neo4rs::Query, GraphError> {
    let query = match value {
        JsonValue::Bool(b) => query.param(name, b),
        JsonValue::String(s) => query.param(name, s),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => query.param(name, i),
            None => query.param(name, n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::Array(items) => bind_list_param(query, name, items)?,
        JsonValue::Null => {
            return Err(GraphError::Internal(format!(
                "parameter '{}' is null; unset values must be omitted, not bound",
                name
            )));
        }
        JsonValue::Object(_) => {
            return Err(GraphError::Internal(format!(
                "parameter '{}' is a nested object; graph properties are scalars or lists",
                name
            )));
        }
    };
    Ok(query)
}

/// Binds a homogeneous scalar list parameter.
fn bind_list_param(
    query: neo4rs::Query,
    name: &str,
    items: Vec<JsonValue>,
) -> Result<neo4rs::Query, GraphError> {
    let mismatch = || {
        GraphError::Internal(format!(
            "parameter '{}' must be a homogeneous list of scalars",
            name
        ))
    };

    let query = match items.first() {
        None => query.param(name, Vec::<String>::new()),
        Some(JsonValue::String(_)) => {
            let values: Vec<String> = items
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(mismatch))
                .collect::<Result<_, _>>()?;
            query.param(name, values)
        }
        Some(JsonValue::Bool(_)) => {
            let values: Vec<bool> = items
                .iter()
                .map(|v| v.as_bool().ok_or_else(mismatch))
                .collect::<Result<_, _>>()?;
            query.param(name, values)
        }
        Some(JsonValue::Number(n)) if n.is_i64() => {
            let values: Vec<i64> = items
                .iter()
                .map(|v| v.as_i64().ok_or_else(mismatch))
                .collect::<Result<_, _>>()?;
            query.param(name, values)
        }
        Some(JsonValue::Number(_)) => {
            let values: Vec<f64> = items
                .iter()
                .map(|v| v.as_f64().ok_or_else(mismatch))
                .collect::<Result<_, _>>()?;
            query.param(name, values)
        }
        Some(_) => return Err(mismatch()),
    };
    Ok(query)
}

/// Converts a driver row into the backend-agnostic [`Row`].
///
/// Node columns become the JSON object of their stored properties; scalar
/// columns pass through as-is.
fn convert_row(row: &neo4rs::Row, columns: &[String]) -> Result<Row, GraphError> {
    let mut data = HashMap::new();

    for column in columns {
        let value = match row.get::<neo4rs::Node>(column.as_str()) {
            Ok(node) => node_properties_json(&node)?,
            Err(_) => row.get::<JsonValue>(column.as_str()).map_err(|e| {
                GraphError::Internal(format!("failed to decode column '{}': {}", column, e))
            })?,
        };
        data.insert(column.clone(), value);
    }

    Ok(Row::new(data))
}

fn node_properties_json(node: &neo4rs::Node) -> Result<JsonValue, GraphError> {
    let mut properties = serde_json::Map::new();

    for key in node.keys() {
        let value: JsonValue = node.get(key).map_err(|e| {
            GraphError::Internal(format!("failed to decode node property '{}': {}", key, e))
        })?;
        properties.insert(key.to_string(), value);
    }

    Ok(JsonValue::Object(properties))
}
