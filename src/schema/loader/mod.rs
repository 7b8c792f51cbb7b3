//! Schemas built out of SDL documents or introspection results.
//!
//! Loaded schemas resolve fields with the default resolvers: key lookup on
//! map-like parents, and `__typename` keys or typed parents for abstract
//! types.

mod introspection;
mod sdl;

use derive_more::with_trait::{Display, Error, From};
use graphql_parser::query::{Definition, OperationDefinition, Selection};

use super::{builder::SchemaBuilder, model::Schema, model::SchemaError};
use crate::{
    ast::InputValue,
    parser::{ParseError, SourcePosition, parse_query},
};

/// Problem with the content of a loaded document.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum InvalidDocument {
    /// More than one `schema { .. }` block.
    #[display("Must provide only one schema definition.")]
    MultipleSchemaDefinitions,

    /// Neither an explicit query root nor a type named `Query`.
    #[display("Must provide schema definition with query type or a type named Query.")]
    MissingQueryType,

    /// A referenced type has no definition.
    #[display("Type \"{name}\" not found in document.")]
    TypeNotFound {
        /// The referenced name.
        name: String,
    },

    /// A root named in the `schema` block has no definition.
    #[display("Specified {operation} type \"{name}\" not found in document.")]
    RootTypeNotFound {
        /// Root kind, such as `query`.
        operation: String,
        /// The named root.
        name: String,
    },

    /// An applied directive has no definition.
    #[display(
        "No definition for @{directive} {}at {position}",
        owner.as_ref().map(|o| format!("on {o} ")).unwrap_or_default(),
    )]
    UnknownDirective {
        /// The directive.
        directive: String,
        /// Name of the member it's applied to.
        owner: Option<String>,
        /// Position of that member.
        position: SourcePosition,
    },

    /// An introspection result of an unexpected shape.
    #[display("Invalid introspection result: {message}")]
    InvalidIntrospection {
        /// What's wrong with it.
        message: String,
    },
}

/// Error of loading a schema.
#[derive(Clone, Debug, Display, Error, From, PartialEq)]
pub enum LoadError {
    /// The SDL isn't syntactically valid.
    Parse(ParseError),

    /// The document doesn't describe a schema.
    InvalidDocument(InvalidDocument),

    /// The described schema doesn't build.
    Schema(SchemaError),
}

impl SchemaBuilder {
    /// Builder for the schema an SDL document describes.
    ///
    /// Hooks and configuration can still be set on the returned builder.
    ///
    /// # Errors
    ///
    /// If the document doesn't parse or doesn't describe a schema.
    pub fn from_definition(sdl: &str) -> Result<Self, LoadError> {
        sdl::load(sdl)
    }

    /// Builder for the schema an introspection result describes.
    ///
    /// Both the full response (`{"data": {"__schema": ..}}`) and its
    /// `data` member are accepted.
    ///
    /// # Errors
    ///
    /// If `json` isn't an introspection result.
    pub fn from_introspection(json: &serde_json::Value) -> Result<Self, LoadError> {
        introspection::load(json)
    }
}

impl Schema {
    /// Builds the schema an SDL document describes.
    ///
    /// # Errors
    ///
    /// If the document doesn't parse, doesn't describe a schema, or the
    /// schema doesn't build.
    pub fn from_definition(sdl: &str) -> Result<Self, LoadError> {
        Ok(SchemaBuilder::from_definition(sdl)?.build()?)
    }

    /// Builds the schema an introspection result describes.
    ///
    /// # Errors
    ///
    /// If `json` isn't an introspection result, or the schema doesn't build.
    pub fn from_introspection(json: &serde_json::Value) -> Result<Self, LoadError> {
        Ok(SchemaBuilder::from_introspection(json)?.build()?)
    }
}

/// Parses a standalone constant literal, such as an introspected
/// `defaultValue`.
fn parse_literal(source: &str) -> Result<InputValue, LoadError> {
    let invalid = || InvalidDocument::InvalidIntrospection {
        message: format!("`{source}` is not a GraphQL literal"),
    };
    let doc = parse_query(&format!("{{ f(v: {source}) }}"))?;
    let Some(Definition::Operation(OperationDefinition::SelectionSet(set))) =
        doc.definitions.first()
    else {
        return Err(invalid().into());
    };
    match set.items.first() {
        Some(Selection::Field(field)) => field
            .arguments
            .first()
            .map(|(_, v)| InputValue::from_parsed(v))
            .ok_or_else(|| invalid().into()),
        _ => Err(invalid().into()),
    }
}
