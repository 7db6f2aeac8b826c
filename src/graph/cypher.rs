//! Extraction of RETURN-clause column names from composed statements.
//!
//! The Neo4j driver hands back rows without announcing their column names,
//! so the backend parses the statement it is about to run and pulls the
//! names out of its final RETURN clause. Only the shapes this crate
//! composes need to parse: plain variables, dotted property accesses,
//! simple function calls like `count(r)`, and optional `AS` aliases.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "graph/cypher.pest"]
struct ReturnClauseParser;

/// Errors from RETURN-clause extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CypherParseError {
    /// The statement has no RETURN clause.
    #[error("no RETURN clause in statement")]
    NoReturnClause,

    /// The RETURN clause uses a shape this crate does not compose.
    #[error("unsupported RETURN clause: {0}")]
    InvalidSyntax(String),
}

/// Returns the column names of a statement's final RETURN clause.
///
/// Aliased items (`expr AS alias`) yield the alias; unaliased items yield
/// the expression text.
///
/// ```
/// use graphrepo::graph::cypher::return_columns;
///
/// let columns = return_columns("MATCH (e:Entity) RETURN e").unwrap();
/// assert_eq!(columns, vec!["e"]);
///
/// let columns = return_columns("MATCH (e:Entity) RETURN e.legal_name AS name, e.ein").unwrap();
/// assert_eq!(columns, vec!["name", "e.ein"]);
/// ```
pub fn return_columns(cypher: &str) -> Result<Vec<String>, CypherParseError> {
    let offset = last_return_keyword(cypher).ok_or(CypherParseError::NoReturnClause)?;
    let clause = cypher[offset..].trim();

    let parsed = ReturnClauseParser::parse(Rule::return_clause, clause)
        .map_err(|e| CypherParseError::InvalidSyntax(e.to_string()))?;

    let mut columns = Vec::new();
    for pair in parsed {
        collect_items(pair, &mut columns);
    }

    if columns.is_empty() {
        return Err(CypherParseError::NoReturnClause);
    }

    Ok(columns)
}

fn collect_items(pair: pest::iterators::Pair<Rule>, columns: &mut Vec<String>) {
    match pair.as_rule() {
        Rule::item => {
            let mut value = None;
            let mut alias = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::value => value = Some(inner.as_str().trim().to_string()),
                    Rule::alias => alias = Some(inner.as_str().to_string()),
                    _ => {}
                }
            }
            if let Some(column) = alias.or(value) {
                columns.push(column);
            }
        }
        _ => {
            for inner in pair.into_inner() {
                collect_items(inner, columns);
            }
        }
    }
}

/// Byte offset of the statement's last RETURN keyword, respecting word
/// boundaries. Composed statements contain no string literals (all values
/// are bound parameters), so a plain scan cannot be fooled by quoted text.
fn last_return_keyword(cypher: &str) -> Option<usize> {
    const KEYWORD: &[u8] = b"return";
    let bytes = cypher.as_bytes();
    let mut found = None;

    if bytes.len() < KEYWORD.len() {
        return None;
    }

    for at in 0..=bytes.len() - KEYWORD.len() {
        if bytes[at..at + KEYWORD.len()].eq_ignore_ascii_case(KEYWORD) {
            let before_ok = at == 0 || !is_word_byte(bytes[at - 1]);
            let after = at + KEYWORD.len();
            let after_ok = after >= bytes.len() || !is_word_byte(bytes[after]);
            if before_ok && after_ok {
                found = Some(at);
            }
        }
    }

    found
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
