//! Backend implementations of [`CypherExecutor`](crate::graph::CypherExecutor).
//!
//! A backend owns the driver connection and translates between this crate's
//! JSON row/parameter model and the driver's wire types. The repository
//! never talks to a driver directly, which keeps it testable against a mock
//! executor.

pub mod neo4j;
