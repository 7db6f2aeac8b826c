//! Node and relationship type contracts.
//!
//! A record type becomes usable with [`GraphRepository`] by implementing
//! [`GraphNode`]: the node's label is an associated constant and the
//! update-merge behavior is an explicit method, both resolved at compile
//! time. Relationship types implement [`GraphRelationship`] the same way.
//! Both traits are normally derived:
//!
//! ```ignore
//! use graphrepo::{GraphNode, GraphRelationship};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(GraphNode, Serialize, Deserialize, Default, Clone)]
//! #[graph(label = "Entity")]
//! pub struct Entity {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub entity_id: Option<String>,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     pub legal_name: Option<String>,
//! }
//!
//! #[derive(GraphRelationship, Serialize, Default)]
//! #[graph(rel_type = "Investor_Of")]
//! pub struct InvestorOf;
//! ```
//!
//! Mark optional fields with `skip_serializing_if = "Option::is_none"` so
//! unset values stay absent in the store instead of being written as nulls.
//!
//! [`GraphRepository`]: crate::repository::GraphRepository

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record type stored as a labeled node.
///
/// The serialized form of the type is its stored property set; every field
/// that should round-trip through the store must be independently
/// (de)serializable.
pub trait GraphNode: Serialize + DeserializeOwned + Send + Sync {
    /// The label nodes of this type carry in the store.
    const LABEL: &'static str;

    /// Overlays the set fields of `incoming` onto `self`.
    ///
    /// Fields left unset in `incoming` (a `None`) keep their current value;
    /// set fields replace it. Used by update to merge new values onto the
    /// stored node before re-writing its property set.
    fn overlay(&mut self, incoming: &Self);
}

/// A record type stored as a typed, directed relationship.
///
/// The serialized form, if non-empty, is persisted onto the edge when the
/// relationship is created.
pub trait GraphRelationship: Serialize + Send + Sync {
    /// The relationship type name in the store (e.g. `"Investor_Of"`).
    const TYPE: &'static str;
}
