//! The executor contract a graph backend must satisfy.

use async_trait::async_trait;

use crate::error::GraphError;
use crate::graph::row::{Params, RowStream};

/// Executes composed Cypher statements against a graph store.
///
/// This is the repository's only boundary with the database: one method for
/// statements that return rows, one for fire-and-forget mutations. The
/// backend must bind `params` as real query parameters — values are never
/// inlined into the statement text by this crate, and a backend that
/// interpolates them would break that guarantee.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes `cypher` and streams back its result rows.
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, GraphError>;

    /// Executes `cypher` discarding any results.
    ///
    /// Used for mutations with no RETURN clause (delete, relationship
    /// create/delete).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), GraphError>;
}
