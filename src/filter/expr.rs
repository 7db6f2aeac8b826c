//! Predicate expression tree and combinator builders.

use std::marker::PhantomData;

use serde_json::Value as JsonValue;

use crate::model::GraphNode;

/// A constant compared against a node property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// The JSON form used when the constant is bound as a query parameter.
    pub(crate) fn to_json(&self) -> JsonValue {
        match self {
            Value::Str(s) => JsonValue::from(s.clone()),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => JsonValue::from(*f),
            Value::Bool(b) => JsonValue::from(*b),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
}

/// A boolean expression over one node's properties.
///
/// The grammar is deliberately closed: comparisons (optionally
/// case-insensitive for strings) combined with AND/OR. Every variant has a
/// rendering rule in the binder, so an expression that cannot be translated
/// into a query clause is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `property <op> constant`
    Cmp {
        prop: String,
        op: CmpOp,
        value: Value,
        /// Compare strings case-insensitively (`toLower` on both sides).
        case_insensitive: bool,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Combines two expressions with AND.
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Combines two expressions with OR.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }
}

/// Entry point of the builder API: names the property a comparison reads.
///
/// ```ignore
/// let expr = prop("legal_name").eq_ignore_case("acme")
///     .and(prop("formation_state").eq("DE"));
/// ```
pub fn prop(name: impl Into<String>) -> Prop {
    Prop { name: name.into() }
}

/// A named property awaiting its comparison.
pub struct Prop {
    name: String,
}

impl Prop {
    /// `property = value`
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        Expr::Cmp {
            prop: self.name,
            op: CmpOp::Eq,
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// `property <> value`
    pub fn ne(self, value: impl Into<Value>) -> Expr {
        Expr::Cmp {
            prop: self.name,
            op: CmpOp::Ne,
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// Case-insensitive string equality.
    pub fn eq_ignore_case(self, value: impl Into<String>) -> Expr {
        Expr::Cmp {
            prop: self.name,
            op: CmpOp::Eq,
            value: Value::Str(value.into()),
            case_insensitive: true,
        }
    }

    /// Case-insensitive string inequality.
    pub fn ne_ignore_case(self, value: impl Into<String>) -> Expr {
        Expr::Cmp {
            prop: self.name,
            op: CmpOp::Ne,
            value: Value::Str(value.into()),
            case_insensitive: true,
        }
    }
}

/// A predicate over nodes of type `T`.
///
/// Wrapping the expression with the node type keeps independently-built
/// parent and child predicates from being swapped when both appear in one
/// relationship operation.
pub struct Filter<T> {
    expr: Expr,
    _model: PhantomData<fn() -> T>,
}

impl<T: GraphNode> Filter<T> {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            _model: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl<T: GraphNode> From<Expr> for Filter<T> {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _model: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter").field("expr", &self.expr).finish()
    }
}
