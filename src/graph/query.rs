//! Fluent builder for executing composed statements.

use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::GraphError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// Builds up a statement's parameters and dispatches it to an executor.
///
/// ```ignore
/// let rows = executor
///     .query("MATCH (e:Entity) WHERE e.entity_id = $id RETURN e")
///     .param("id", "E1")
///     .fetch_all()
///     .await?;
/// ```
pub struct Query<'a, E: CypherExecutor + ?Sized> {
    executor: &'a E,
    cypher: String,
    params: Params,
}

impl<'a, E: CypherExecutor + ?Sized> Query<'a, E> {
    pub fn new(executor: &'a E, cypher: &str) -> Self {
        Self {
            executor,
            cypher: cypher.to_string(),
            params: Params::new(),
        }
    }

    /// Binds one parameter, referenced in the statement as `$name`.
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized to JSON.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        let value = serde_json::to_value(value).expect("failed to serialize parameter value");
        self.params.insert(name.to_string(), value);
        self
    }

    /// Binds a parameter that is already a JSON value.
    pub fn param_raw(mut self, name: &str, value: JsonValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Binds a whole parameter map at once.
    ///
    /// Used by the repository to attach the parameters a bound filter
    /// collected while rendering its clause.
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Executes the statement and returns the row stream.
    pub async fn execute(self) -> Result<RowStream<'a>, GraphError> {
        self.executor
            .execute_cypher(&self.cypher, self.params)
            .await
    }

    /// Executes the statement and collects every row.
    pub async fn fetch_all(self) -> Result<Vec<Row>, GraphError> {
        self.execute().await?.try_collect().await
    }

    /// Executes the statement and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, GraphError> {
        use futures::StreamExt;
        let mut stream = self.execute().await?;
        stream.next().await.transpose()
    }

    /// Executes the statement discarding results.
    pub async fn run(self) -> Result<(), GraphError> {
        self.executor.run_cypher(&self.cypher, self.params).await
    }
}

/// Blanket extension adding `executor.query(...)` to every executor.
pub trait QueryExt: CypherExecutor {
    fn query(&self, cypher: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, cypher)
    }
}

impl<E: CypherExecutor> QueryExt for E {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    struct ExpectingExecutor {
        cypher: String,
        params: Params,
    }

    #[async_trait::async_trait]
    impl CypherExecutor for ExpectingExecutor {
        async fn execute_cypher(
            &self,
            cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, GraphError> {
            assert_eq!(cypher, self.cypher);
            assert_eq!(params, self.params);
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), GraphError> {
            assert_eq!(cypher, self.cypher);
            assert_eq!(params, self.params);
            Ok(())
        }
    }

    #[tokio::test]
    async fn fetch_all_passes_statement_and_params_through() {
        let mut expected = HashMap::new();
        expected.insert("id".to_string(), json!("E1"));

        let executor = ExpectingExecutor {
            cypher: "MATCH (e:Entity) WHERE e.entity_id = $id RETURN e".to_string(),
            params: expected,
        };

        executor
            .query("MATCH (e:Entity) WHERE e.entity_id = $id RETURN e")
            .param("id", "E1")
            .fetch_all()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn params_merges_a_whole_map() {
        let mut bound = Params::new();
        bound.insert("e_p0".to_string(), json!("E1"));
        bound.insert("e_p1".to_string(), json!(true));

        let executor = ExpectingExecutor {
            cypher: "MATCH (e:Entity) WHERE e.entity_id = $e_p0 RETURN e".to_string(),
            params: bound.clone(),
        };

        executor
            .query("MATCH (e:Entity) WHERE e.entity_id = $e_p0 RETURN e")
            .params(bound)
            .fetch_all()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn run_dispatches_to_the_no_result_path() {
        let mut expected = Params::new();
        expected.insert("id".to_string(), json!("E1"));

        let executor = ExpectingExecutor {
            cypher: "MATCH (e:Entity) WHERE e.entity_id = $id DETACH DELETE e".to_string(),
            params: expected,
        };

        executor
            .query("MATCH (e:Entity) WHERE e.entity_id = $id DETACH DELETE e")
            .param("id", "E1")
            .run()
            .await
            .unwrap();
    }
}
