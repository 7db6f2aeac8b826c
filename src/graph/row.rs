//! Result rows and parameter maps for graph queries.

use std::collections::HashMap;
use std::pin::Pin;

use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::GraphError;

/// Bound parameters for a query, keyed by name (referenced as `$name`).
pub type Params = HashMap<String, JsonValue>;

/// An asynchronous stream of result rows.
///
/// Rows are produced on demand so large result sets never have to be
/// buffered by the backend.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, GraphError>> + Send + 'a>>;

/// One result row, keyed by the column names of the statement's RETURN
/// clause.
///
/// Column values are JSON: a returned node appears as the object of its
/// stored properties, ready to deserialize into its record type with
/// [`Row::get`].
#[derive(Debug, Clone)]
pub struct Row {
    columns: HashMap<String, JsonValue>,
}

impl Row {
    pub fn new(columns: HashMap<String, JsonValue>) -> Self {
        Self { columns }
    }

    /// Deserializes the named column into `T`.
    ///
    /// Fails if the column is absent or its value does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> Result<T, GraphError> {
        let value = self
            .columns
            .get(column)
            .ok_or_else(|| GraphError::Internal(format!("column not found: {}", column)))?;

        serde_json::from_value(value.clone()).map_err(|e| {
            GraphError::Internal(format!("failed to deserialize column '{}': {}", column, e))
        })
    }

    /// Like [`Row::get`], but absent columns and nulls become `None`.
    pub fn get_opt<T: DeserializeOwned>(&self, column: &str) -> Result<Option<T>, GraphError> {
        match self.columns.get(column) {
            None => Ok(None),
            Some(JsonValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                GraphError::Internal(format!("failed to deserialize column '{}': {}", column, e))
            }),
        }
    }

    /// The raw JSON value of a column, if present.
    pub fn get_raw(&self, column: &str) -> Option<&JsonValue> {
        self.columns.get(column)
    }

    /// Consumes the row, returning the column map.
    pub fn into_inner(self) -> HashMap<String, JsonValue> {
        self.columns
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(columns: HashMap<String, JsonValue>) -> Self {
        Self::new(columns)
    }
}
