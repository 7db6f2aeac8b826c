//! Derive macros for graphrepo node and relationship contracts.
//!
//! This crate provides two derives:
//! - `#[derive(GraphNode)]` implements the `GraphNode` trait for a record
//!   type, wiring up its label and the field-overlay merge used by updates
//! - `#[derive(GraphRelationship)]` implements the `GraphRelationship`
//!   trait, wiring up the relationship's type name
//!
//! Generated code references `::graphrepo::GraphNode` and
//! `::graphrepo::GraphRelationship`, so the `graphrepo` crate must be a
//! dependency of the deriving crate.

use proc_macro::TokenStream;

mod node;
mod relationship;

/// Derive macro for graph node record types.
///
/// Implements `GraphNode` with the node's label and an `overlay` merge.
/// The label defaults to the struct name and can be overridden with
/// `#[graph(label = "...")]`.
///
/// The generated `overlay` copies `Option` fields from the incoming value
/// only when they are `Some`, leaving the existing value untouched
/// otherwise; non-`Option` fields are copied unconditionally.
///
/// # Requirements
///
/// - Named fields, all `Clone`
/// - The struct must also implement `Serialize` and `Deserialize` (its
///   fields are the node's stored properties)
///
/// # Example
///
/// ```ignore
/// use graphrepo::GraphNode;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(GraphNode, Serialize, Deserialize, Default, Clone)]
/// #[graph(label = "Entity")]
/// pub struct Entity {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     pub entity_id: Option<String>,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     pub legal_name: Option<String>,
/// }
/// ```
#[proc_macro_derive(GraphNode, attributes(graph))]
pub fn derive_graph_node(input: TokenStream) -> TokenStream {
    node::derive_graph_node_impl(input)
}

/// Derive macro for graph relationship record types.
///
/// Implements `GraphRelationship` with the relationship's type name.
/// The type name defaults to the struct name and can be overridden with
/// `#[graph(rel_type = "...")]`.
///
/// # Example
///
/// ```ignore
/// use graphrepo::GraphRelationship;
/// use serde::Serialize;
///
/// #[derive(GraphRelationship, Serialize, Default)]
/// #[graph(rel_type = "Investor_Of")]
/// pub struct InvestorOf;
/// ```
#[proc_macro_derive(GraphRelationship, attributes(graph))]
pub fn derive_graph_relationship(input: TokenStream) -> TokenStream {
    relationship::derive_graph_relationship_impl(input)
}
