//! Binding a predicate to a query variable name.
//!
//! A [`Filter`] names properties but no query variable; binding renders it
//! into a Cypher boolean clause anchored to a caller-chosen variable. The
//! same filter bound to two different names produces clauses that differ
//! only in that name, so a parent-entity filter bound to `"e"` and a
//! child-entity filter bound to `"c"` can share one statement without their
//! variables or parameters colliding.

use crate::filter::expr::{CmpOp, Expr, Filter};
use crate::graph::row::Params;
use crate::model::GraphNode;

/// A predicate rendered against a concrete query variable.
pub struct BoundFilter {
    /// The boolean clause, e.g. `(e.entity_id = $e_p0 AND e.active = $e_p1)`.
    pub clause: String,
    /// Parameter bindings referenced by the clause, named `{var}_p{n}`.
    pub params: Params,
    /// The variable name the clause is anchored to, echoed back for use in
    /// match/return clause templates.
    pub var: String,
    /// The label of the node type the filter constrains.
    pub label: &'static str,
}

/// Renders `filter` against the variable name `var`.
///
/// Constants never appear in the clause text; each becomes a parameter
/// named `{var}_p{n}`, so two binds with distinct variable names are
/// guaranteed disjoint parameter namespaces. Binding is pure: it has no
/// side effects and the clause's truth table is that of the filter itself.
pub fn bind<T: GraphNode>(filter: &Filter<T>, var: &str) -> BoundFilter {
    let mut params = Params::new();
    let mut counter = 0usize;
    let clause = render(filter.expr(), var, &mut params, &mut counter);

    BoundFilter {
        clause,
        params,
        var: var.to_string(),
        label: T::LABEL,
    }
}

fn render(expr: &Expr, var: &str, params: &mut Params, counter: &mut usize) -> String {
    match expr {
        Expr::Cmp {
            prop,
            op,
            value,
            case_insensitive,
        } => {
            let name = format!("{}_p{}", var, counter);
            *counter += 1;
            params.insert(name.clone(), value.to_json());

            let op = match op {
                CmpOp::Eq => "=",
                CmpOp::Ne => "<>",
            };

            if *case_insensitive {
                format!("toLower({}.{}) {} toLower(${})", var, prop, op, name)
            } else {
                format!("{}.{} {} ${}", var, prop, op, name)
            }
        }
        Expr::And(lhs, rhs) => {
            let lhs = render(lhs, var, params, counter);
            let rhs = render(rhs, var, params, counter);
            format!("({} AND {})", lhs, rhs)
        }
        Expr::Or(lhs, rhs) => {
            let lhs = render(lhs, var, params, counter);
            let rhs = render(rhs, var, params, counter);
            format!("({} OR {})", lhs, rhs)
        }
    }
}
