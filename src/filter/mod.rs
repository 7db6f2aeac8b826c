//! Typed predicates and their translation into query clauses.
//!
//! Predicates are explicit expression trees built with a small combinator
//! API rather than captured closures, so the set of translatable constructs
//! is closed and checked by the compiler:
//!
//! ```ignore
//! use graphrepo::filter::{prop, Filter};
//!
//! let filter = Filter::<Entity>::new(
//!     prop("legal_name").eq_ignore_case("acme")
//!         .and(prop("formation_state").eq("DE")),
//! );
//! ```
//!
//! [`bind`] turns a filter into a WHERE-ready clause anchored to a chosen
//! query variable, with every constant bound as a parameter.

mod bind;
mod expr;

pub use bind::{bind, BoundFilter};
pub use expr::{prop, CmpOp, Expr, Filter, Prop, Value};
