#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

use std::fmt;

use tracing::Instrument as _;

#[doc(hidden)]
#[macro_use]
pub mod macros;
mod ast;
pub mod config;
pub mod executor;
pub mod http;
mod introspection;
pub mod parser;
pub mod schema;
pub mod subscriptions;
mod types;
mod util;
pub mod validation;
mod value;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod executor_tests;

pub use crate::util::to_camel_case;

use crate::{
    executor::{ExecutionOutput, coerce_variables, execute_operation, find_operation},
    parser::{Document, parse_query},
};

pub use crate::{
    ast::{InputValue, Type, Variables},
    config::{SchemaConfig, VisibilityStrategy},
    executor::{
        Arguments, Authorization, Context, DataLoader, ExecutionError, Extra, FieldError,
        FieldExtension, FieldResult, FieldValue, Lazy, LoadApplicationObjectFailedError,
        LookAhead, Next, Outcome, PathSegment, ResolverContext, UnauthorizedError,
    },
    introspection::INTROSPECTION_QUERY,
    parser::{ParseError, SourcePosition},
    schema::{
        builder::SchemaBuilder,
        directives::{DirectiveApplication, DirectiveLocation, DirectiveType},
        loader::{InvalidDocument, LoadError},
        meta::{
            self, Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType,
            ObjectMeta, ScalarMeta, TypeKind, UnionMeta,
        },
        model::{OperationType, Schema, SchemaError, SchemaType},
        printer::{print_introspection_schema, print_schema, print_type},
        relay::RelayClassicMutation,
        visibility::{DuplicateNamesError, Member, VisibilityPredicate, Warden},
    },
    validation::RuleError,
    value::{Object, ScalarValue, Value},
};

/// An error that prevented query execution
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum GraphQLError {
    ParseError(ParseError),
    ValidationError(Vec<RuleError>),
    NoOperationProvided,
    MultipleOperationsProvided,
    UnknownOperationName,
    IsSubscription,
    NotSubscription,
    VariableError(Vec<ExecutionError>),
    DuplicateNames(DuplicateNamesError),
    UnknownVisibilityProfile(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(e) => write!(f, "{e}"),
            Self::ValidationError(errs) => {
                for e in errs {
                    writeln!(f, "{e}")?;
                }
                Ok(())
            }
            Self::NoOperationProvided => write!(f, "No operation provided"),
            Self::MultipleOperationsProvided => write!(f, "Multiple operations provided"),
            Self::UnknownOperationName => write!(f, "Unknown operation name"),
            Self::IsSubscription => write!(f, "Operation is a subscription"),
            Self::NotSubscription => write!(f, "Operation is not a subscription"),
            Self::VariableError(errs) => {
                for e in errs {
                    writeln!(f, "{}", e.message())?;
                }
                Ok(())
            }
            Self::DuplicateNames(e) => write!(f, "{e}"),
            Self::UnknownVisibilityProfile(name) => {
                write!(f, "Visibility profile `{name}` is not configured")
            }
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::ValidationError(errs) => Some(errs.first()?),
            Self::DuplicateNames(e) => Some(e),
            Self::NoOperationProvided
            | Self::MultipleOperationsProvided
            | Self::UnknownOperationName
            | Self::IsSubscription
            | Self::NotSubscription
            | Self::VariableError(_)
            | Self::UnknownVisibilityProfile(_) => None,
        }
    }
}

impl From<ParseError> for GraphQLError {
    fn from(e: ParseError) -> Self {
        Self::ParseError(e)
    }
}

impl From<DuplicateNamesError> for GraphQLError {
    fn from(e: DuplicateNamesError) -> Self {
        Self::DuplicateNames(e)
    }
}

/// Executes a query or mutation in the provided schema.
///
/// # Errors
///
/// If the document doesn't parse or validate, no operation can be selected,
/// the operation is a subscription, or the variables are invalid. Errors of
/// single fields are returned along with the data instead.
pub async fn execute(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &Schema,
    variables: &Variables,
    context: &Context,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let document = parse_query(document_source)?;
    let output = execute_document(
        &document,
        operation_name,
        schema,
        variables,
        context,
        OperationKind::Regular,
    )
    .await?;
    Ok((output.data, output.errors))
}

/// Synchronous version of [`execute()`].
///
/// Lazy values are driven on the current thread.
///
/// # Errors
///
/// Same as [`execute()`].
pub fn execute_sync(
    document_source: &str,
    operation_name: Option<&str>,
    schema: &Schema,
    variables: &Variables,
    context: &Context,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    futures::executor::block_on(execute(
        document_source,
        operation_name,
        schema,
        variables,
        context,
    ))
}

/// Which operation kinds a request accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OperationKind {
    /// Queries and mutations.
    Regular,
    Subscription,
}

/// Validates and runs one operation of a parsed document.
pub(crate) async fn execute_document(
    document: &Document,
    operation_name: Option<&str>,
    schema: &Schema,
    variables: &Variables,
    context: &Context,
    kind: OperationKind,
) -> Result<ExecutionOutput, GraphQLError> {
    let warden = schema.warden(context)?;

    validation::validate(&warden, document)?;

    let operation = find_operation(document, operation_name)?;
    match (operation.kind, kind) {
        (OperationType::Subscription, OperationKind::Regular) => {
            return Err(GraphQLError::IsSubscription);
        }
        (OperationType::Query | OperationType::Mutation, OperationKind::Subscription) => {
            return Err(GraphQLError::NotSubscription);
        }
        _ => {}
    }

    let variables = coerce_variables(&warden, &operation, variables, context)
        .map_err(GraphQLError::VariableError)?;

    let span = tracing::trace_span!(
        "execute",
        operation = operation.name.unwrap_or("anonymous"),
        kind = %operation.kind,
    );
    Ok(execute_operation(&warden, document, &operation, &variables, context)
        .instrument(span)
        .await)
}
