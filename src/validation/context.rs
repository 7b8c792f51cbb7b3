use std::{collections::HashMap, fmt, sync::Arc};

use derive_more::with_trait::Error;
use graphql_parser::query::{Definition, FragmentDefinition};
use serde::Serialize;

use crate::{
    parser::{Document, SourcePosition},
    schema::{
        meta::{Field, MetaType},
        visibility::{DuplicateNamesError, Warden},
    },
};

/// Query validation error.
#[derive(Clone, Debug, Eq, Error, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message for a validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error.
    ///
    /// Most validation errors contain at least one source position. The
    /// static analyzers report against the whole operation.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.locations.is_empty() {
            return f.write_str(&self.message);
        }
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub warden: &'a Warden,
    errors: Vec<RuleError>,
    duplicate: Option<DuplicateNamesError>,
    type_stack: Vec<Option<&'a Arc<MetaType>>>,
    parent_type_stack: Vec<Option<&'a Arc<MetaType>>>,
    field_stack: Vec<Option<Arc<Field>>>,
    fragments: HashMap<&'a str, &'a FragmentDefinition<'static, String>>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(warden: &'a Warden, document: &'a Document) -> Self {
        Self {
            warden,
            errors: Vec::new(),
            duplicate: None,
            type_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            field_stack: Vec::new(),
            fragments: document
                .definitions
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some((frag.name.as_str(), frag)),
                    Definition::Operation(_) => None,
                })
                .collect(),
        }
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations));
    }

    /// Reports a member this request can't tell apart from another one of the
    /// same name. The first one is kept for the request-level error.
    pub(crate) fn report_duplicate(&mut self, e: DuplicateNamesError, locations: &[SourcePosition]) {
        self.report_error(&e.to_string(), locations);
        self.duplicate.get_or_insert(e);
    }

    pub(crate) fn take_duplicate(&mut self) -> Option<DuplicateNamesError> {
        self.duplicate.take()
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors.dedup();
        self.errors
    }

    /// Visible type named `name`, ignoring ambiguities.
    pub(crate) fn type_named(&self, name: &str) -> Option<&'a Arc<MetaType>> {
        self.warden.get_type(name).ok().flatten()
    }

    #[doc(hidden)]
    pub fn with_pushed_type<R>(&mut self, t: Option<&'a Arc<MetaType>>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.type_stack.push(t);
        let res = f(self);
        self.type_stack.pop();
        res
    }

    #[doc(hidden)]
    pub fn with_pushed_parent_type<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.parent_type_stack
            .push(self.type_stack.last().copied().flatten());
        let res = f(self);
        self.parent_type_stack.pop();
        res
    }

    #[doc(hidden)]
    pub fn with_pushed_field<R>(&mut self, field: Option<Arc<Field>>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.field_stack.push(field);
        let res = f(self);
        self.field_stack.pop();
        res
    }

    /// Type of the selection being visited: the return type of the current
    /// field, or the type condition of the current fragment.
    pub fn current_type(&self) -> Option<&'a Arc<MetaType>> {
        self.type_stack.last().copied().flatten()
    }

    /// Type declaring the fields of the current selection set.
    pub fn parent_type(&self) -> Option<&'a Arc<MetaType>> {
        self.parent_type_stack.last().copied().flatten()
    }

    /// Definition of the field being visited.
    pub fn current_field(&self) -> Option<&Arc<Field>> {
        self.field_stack.last().and_then(Option::as_ref)
    }

    #[doc(hidden)]
    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition<'static, String>> {
        self.fragments.get(name).copied()
    }

    #[doc(hidden)]
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }
}
