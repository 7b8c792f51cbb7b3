//! Adapter over the [`graphql_parser`] crate producing the documents the
//! executor and the schema loader consume.

use std::fmt;

use derive_more::with_trait::{Display, Error};
use graphql_parser::{Pos, query, schema};
use serde::Serialize;

/// Parsed executable document.
pub type Document = query::Document<'static, String>;

/// Parsed type system (SDL) document.
pub type SchemaDocument = schema::Document<'static, String>;

/// A (1-based) location in a source document.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourcePosition {
    /// Line number, starting from 1.
    pub line: usize,

    /// Column number, starting from 1.
    pub column: usize,
}

impl SourcePosition {
    /// Creates a new [`SourcePosition`].
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<Pos> for SourcePosition {
    fn from(p: Pos) -> Self {
        Self::new(p.line, p.column)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error of parsing a GraphQL document.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("{message}")]
pub struct ParseError {
    /// Message produced by the parser, including the position.
    #[error(not(source))]
    pub message: String,
}

/// Parses an executable document.
///
/// # Errors
///
/// If the `source` isn't a syntactically valid GraphQL document.
pub fn parse_query(source: &str) -> Result<Document, ParseError> {
    query::parse_query::<String>(source)
        .map(query::Document::into_static)
        .map_err(|e| ParseError {
            message: e.to_string().trim_end().to_owned(),
        })
}

/// Parses a type system document.
///
/// # Errors
///
/// If the `source` isn't a syntactically valid SDL document.
pub fn parse_schema(source: &str) -> Result<SchemaDocument, ParseError> {
    schema::parse_schema::<String>(source)
        .map(schema::Document::into_static)
        .map_err(|e| ParseError {
            message: e.to_string().trim_end().to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::{parse_query, parse_schema};

    #[test]
    fn reports_syntax_errors() {
        assert!(parse_query("{ a(").is_err());
        assert!(parse_schema("type {").is_err());
    }

    #[test]
    fn parses_operations() {
        let doc = parse_query("query Q($a: Int) { f(a: $a) }").unwrap();
        assert_eq!(doc.definitions.len(), 1);
    }
}
