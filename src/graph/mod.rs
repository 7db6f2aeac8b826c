//! Graph-client abstraction: executor contract, query builder, rows.
//!
//! The repository composes statements and hands them to a
//! [`CypherExecutor`]; everything driver-specific lives behind that trait
//! in [`backends`]. Rows come back as JSON column maps with typed
//! extraction, so record types deserialize the same way no matter which
//! backend produced them.
//!
//! ```ignore
//! use graphrepo::graph::QueryExt;
//!
//! let rows = client
//!     .query("MATCH (e:Entity) WHERE e.entity_id = $id RETURN e")
//!     .param("id", "E1")
//!     .fetch_all()
//!     .await?;
//! ```

pub mod cypher;
mod query;
pub(crate) mod row;
mod traits;

pub mod backends;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::CypherExecutor;
