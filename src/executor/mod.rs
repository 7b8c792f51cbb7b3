//! Resolution of operations against a schema.

mod context;
pub mod dataloader;
mod engine;
pub mod extension;
mod field_value;
mod lazy;
pub mod look_ahead;
mod pipeline;

use std::{cmp::Ordering, error::Error, fmt, sync::Arc};

use arcstr::ArcStr;
use derive_more::with_trait::{Debug, Display, Error as DeriveError};
use graphql_parser::query;
use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::{
    parser::SourcePosition,
    schema::{meta::Field, visibility::Warden},
    types::coercion::inspect,
    ast::InputValue,
    value::Value,
};

pub use self::{
    context::Context,
    dataloader::{BatchFn, DataLoader, Dataloader},
    extension::{FieldExtension, Next},
    field_value::{Arguments, FieldValue},
    lazy::{Authorization, Lazy, Outcome},
    look_ahead::LookAhead,
};
pub(crate) use self::engine::{
    ExecutionOutput, Operation, coerce_variables, execute_operation, find_operation, is_excluded,
    operation_of,
};

/// Error of resolving one field.
///
/// Field errors are represented by a human-readable message and an optional
/// [`Value`] of extensions. They can be converted from any type implementing
/// [`Display`](fmt::Display), which makes error chaining with the `?`
/// operator a breeze:
///
/// ```rust
/// # use trellis::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
///
/// Errors built with [`FieldError::from_source()`] keep the typed error so
/// `rescue_from` handlers can match it.
#[derive(Clone, Debug)]
pub struct FieldError {
    message: String,
    extensions: Value,
    #[debug(skip)]
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl<T: fmt::Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
            source: None,
        }
    }
}

impl PartialEq for FieldError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.extensions == other.extensions
    }
}

impl FieldError {
    /// Constructs a new error with additional extensions.
    ///
    /// ```rust
    /// # use trellis::{FieldError, graphql_value};
    /// FieldError::new(
    ///     "Could not open connection to the database",
    ///     graphql_value!({"internal_error": "Connection refused"}),
    /// );
    /// ```
    ///
    /// A `null` `extensions` value is left out of the response.
    pub fn new<T: fmt::Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
            source: None,
        }
    }

    /// Constructs an error out of a typed error, keeping it as the source.
    pub fn from_source<E: Error + Send + Sync + 'static>(e: E) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
            source: Some(Arc::new(e)),
        }
    }

    /// Message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extensions of this error.
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }

    /// Typed error this one was constructed from.
    pub fn source(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

/// Result of resolving the value of a field of type `T`.
pub type FieldResult<T> = Result<T, FieldError>;

/// One step of a response path.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathSegment {
    /// Response key of a field.
    Field(ArcStr),

    /// Position inside a list.
    Index(usize),
}

impl PathSegment {
    /// Converts this segment into a plain value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Field(f) => Value::scalar(f.as_str()),
            Self::Index(i) => Value::scalar(i32::try_from(*i).unwrap_or(i32::MAX)),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Field(s.into())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(f) => serializer.serialize_str(f),
            Self::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

/// Error recorded in the `errors` list of a response.
///
/// Field errors carry the source positions of the failing field and its
/// response path. Errors are ordered by the traversal order of their paths.
#[derive(Clone, Debug)]
pub struct ExecutionError {
    locations: Vec<SourcePosition>,
    path: Vec<PathSegment>,
    error: FieldError,
    order: Vec<usize>,
}

impl ExecutionError {
    /// Constructs a new located error.
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            locations: vec![location],
            path,
            error,
            order: Vec::new(),
        }
    }

    /// Constructs an error neither located nor attached to a path.
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            locations: Vec::new(),
            path: Vec::new(),
            error,
            order: Vec::new(),
        }
    }

    pub(crate) fn ordered(mut self, order: Vec<usize>) -> Self {
        self.order = order;
        self
    }

    /// Message of the error.
    pub fn message(&self) -> &str {
        self.error.message()
    }

    /// Underlying field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// Source positions of the failing field in the query.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }

    /// Response path of the failing field.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl PartialEq for ExecutionError {
    fn eq(&self, other: &Self) -> bool {
        self.locations == other.locations && self.path == other.path && self.error == other.error
    }
}

impl Eq for ExecutionError {}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.order, &self.locations, &self.error.message).cmp(&(
            &other.order,
            &other.locations,
            &other.error.message,
        ))
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_extensions = !self.error.extensions.is_null();
        let len = 1
            + usize::from(!self.locations.is_empty())
            + usize::from(!self.path.is_empty())
            + usize::from(has_extensions);
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("message", self.error.message())?;
        if !self.locations.is_empty() {
            map.serialize_entry("locations", &self.locations)?;
        }
        if !self.path.is_empty() {
            map.serialize_entry("path", &self.path)?;
        }
        if has_extensions {
            map.serialize_entry("extensions", &self.error.extensions)?;
        }
        map.end()
    }
}

/// Additional data a resolver may request through [`Field::extras()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Extra {
    /// The field's node in the query document.
    AstNode,

    /// The field's response path.
    Path,

    /// A [`LookAhead`] over the field's selections.
    LookAhead,
}

/// Everything a resolver gets to compute a field.
#[derive(Clone, Debug)]
pub struct ResolverContext {
    object: FieldValue,
    args: Arguments,
    context: Context,
    field: Arc<Field>,
    path: Option<Vec<PathSegment>>,
    ast_node: Option<Arc<query::Field<'static, String>>>,
    look_ahead: Option<LookAhead>,
    warden: Warden,
    dataloader: Dataloader,
}

impl ResolverContext {
    /// Parent object the field is resolved on.
    pub fn object(&self) -> &FieldValue {
        &self.object
    }

    /// Prepared and loaded arguments.
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// Mutable arguments, for extensions adjusting them before the resolver
    /// runs.
    pub fn args_mut(&mut self) -> &mut Arguments {
        &mut self.args
    }

    /// Looks an argument up by its keyword.
    pub fn arg(&self, key: &str) -> Option<&FieldValue> {
        self.args.get(key)
    }

    /// Request context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Definition of the field being resolved.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Visibility-filtered view of the schema for this request.
    pub fn warden(&self) -> &Warden {
        &self.warden
    }

    /// Request-scoped batch loaders.
    pub fn dataloader(&self) -> &Dataloader {
        &self.dataloader
    }

    /// Response path of the field, when [`Extra::Path`] was requested.
    pub fn path(&self) -> Option<&[PathSegment]> {
        self.path.as_deref()
    }

    /// The field's query node, when [`Extra::AstNode`] was requested.
    pub fn ast_node(&self) -> Option<&query::Field<'static, String>> {
        self.ast_node.as_deref()
    }

    /// Selections below the field, when [`Extra::LookAhead`] was requested.
    pub fn look_ahead(&self) -> Option<&LookAhead> {
        self.look_ahead.as_ref()
    }
}

/// Authorization of an object or a field failed.
///
/// Handed to the schema's `unauthorized_object` and `unauthorized_field`
/// hooks.
#[derive(Clone, Debug, Display, DeriveError)]
#[display("An instance of {type_name} failed {type_name}'s authorization check{}", field_suffix(field))]
pub struct UnauthorizedError {
    /// The application object, or the parent object for field checks.
    #[error(not(source))]
    pub object: FieldValue,

    /// Type whose check failed.
    pub type_name: ArcStr,

    /// Field whose check failed, for field checks.
    pub field: Option<ArcStr>,
}

fn field_suffix(field: &Option<ArcStr>) -> String {
    field
        .as_ref()
        .map(|f| format!(" on field {f}"))
        .unwrap_or_default()
}

/// An argument with `loads` didn't produce a usable application object.
///
/// Handed to the schema's `load_application_object_failed` hook.
#[derive(Clone, Debug, Display, DeriveError)]
#[display("No object found for `{argument}: {}`", inspect(id))]
pub struct LoadApplicationObjectFailedError {
    /// GraphQL name of the argument.
    pub argument: ArcStr,

    /// The ID that was given.
    pub id: InputValue,

    /// Type the argument loads.
    pub type_name: ArcStr,

    /// Object that was found, if one was found but had the wrong type.
    #[error(not(source))]
    pub object: Option<FieldValue>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        ExecutionError, FieldError, FieldValue, LoadApplicationObjectFailedError, PathSegment,
    };
    use crate::{ast::InputValue, graphql_value, parser::SourcePosition};

    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("typed")]
    struct Typed;

    #[test]
    fn keeps_typed_sources() {
        let e = FieldError::from_source(Typed);
        assert_eq!(e.message(), "typed");
        assert!(e.source().unwrap().downcast_ref::<Typed>().is_some());
        assert!(FieldError::from("plain").source().is_none());
    }

    #[test]
    fn serializes_errors_without_empty_keys() {
        let e = ExecutionError::new(
            SourcePosition::new(1, 3),
            vec!["a".into(), PathSegment::Index(1)],
            FieldError::new("boom", graphql_value!({"code": "X"})),
        );
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"message":"boom","locations":[{"line":1,"column":3}],"path":["a",1],"extensions":{"code":"X"}}"#,
        );
        let bare = ExecutionError::at_origin(FieldError::from("fatal"));
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"message":"fatal"}"#);
    }

    #[test]
    fn orders_errors_by_traversal() {
        let at = |order: Vec<usize>, msg: &str| {
            ExecutionError::new(SourcePosition::new(9, 1), vec![], FieldError::from(msg))
                .ordered(order)
        };
        let mut errors = vec![at(vec![1], "b"), at(vec![0, 2], "a2"), at(vec![0], "a")];
        errors.sort();
        let messages = errors.iter().map(ExecutionError::message).collect::<Vec<_>>();
        assert_eq!(messages, ["a", "a2", "b"]);
    }

    #[test]
    fn load_failures_inspect_the_id() {
        let e = LoadApplicationObjectFailedError {
            argument: "id".into(),
            id: InputValue::from("1"),
            type_name: "Thing".into(),
            object: None::<FieldValue>,
        };
        assert_eq!(e.to_string(), "No object found for `id: \"1\"`");
    }
}
