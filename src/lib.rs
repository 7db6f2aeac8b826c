//! graphrepo - generic repository over labeled-property graph databases.
//!
//! Define a node type once and get full CRUD plus relationship management
//! without writing query strings by hand. Typed filter predicates are
//! translated into parameterized Cypher clauses, and independently-built
//! predicates compose into one statement without variable collisions.
//!
//! ```ignore
//! use graphrepo::{Filter, GraphNode, GraphRelationship, GraphRepository, prop};
//! use graphrepo::config::Config;
//! use graphrepo::graph::backends::neo4j::Neo4jClient;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(GraphNode, Serialize, Deserialize, Default, Clone)]
//! #[graph(label = "Entity")]
//! struct Entity {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     entity_id: Option<String>,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     legal_name: Option<String>,
//! }
//!
//! #[derive(GraphRelationship, Serialize, Default)]
//! #[graph(rel_type = "Investor_Of")]
//! struct InvestorOf;
//!
//! # async fn example() -> Result<(), graphrepo::GraphError> {
//! let config = Config::load()?;
//! let client = Neo4jClient::connect(&config.neo4j).await?;
//! let repository: GraphRepository<Entity, _> = GraphRepository::new(client);
//!
//! let filter = Filter::new(prop("legal_name").eq_ignore_case("acme"));
//! let matches = repository.find(&filter).await?;
//! # Ok(())
//! # }
//! ```

// Lets the derive macros refer to this crate by its external name even in
// its own tests.
extern crate self as graphrepo;

pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod model;
pub mod repository;

pub use error::GraphError;
pub use filter::{prop, Filter};
pub use model::{GraphNode, GraphRelationship};
pub use repository::GraphRepository;

// Derive macros share the trait names, serde-style.
pub use graphrepo_macros::{GraphNode, GraphRelationship};
