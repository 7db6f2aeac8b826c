//! Crate error types.

use thiserror::Error;

use crate::graph::cypher::CypherParseError;

/// Errors surfaced by repository operations and the graph backend.
///
/// Failures reported by the store are propagated unchanged; this layer
/// performs no retries and no local recovery. A filtered read that matches
/// nothing is not an error — it is an empty result or `None`.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Connection or driver-level failure from the Neo4j client.
    #[error("graph connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    /// The store rejected or failed a composed statement.
    #[error("graph query error: {message}")]
    Query { message: String, query: String },

    /// A composed statement's RETURN clause could not be decoded.
    #[error("statement parse error: {0}")]
    Parse(#[from] CypherParseError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Row or parameter (de)serialization failure.
    #[error("{0}")]
    Internal(String),
}
