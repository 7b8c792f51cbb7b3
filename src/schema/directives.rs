//! Directive definitions and their applications on schema members.

use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use arcstr::ArcStr;
use itertools::Itertools as _;

use super::{meta::Argument, visibility::VisibilityPredicate};
use crate::ast::InputValue;

/// Places a directive may be used at.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// All locations, in the order of the GraphQL specification.
    pub const ALL: [Self; 19] = [
        Self::Query,
        Self::Mutation,
        Self::Subscription,
        Self::Field,
        Self::FragmentDefinition,
        Self::FragmentSpread,
        Self::InlineFragment,
        Self::VariableDefinition,
        Self::Schema,
        Self::Scalar,
        Self::Object,
        Self::FieldDefinition,
        Self::ArgumentDefinition,
        Self::Interface,
        Self::Union,
        Self::Enum,
        Self::EnumValue,
        Self::InputObject,
        Self::InputFieldDefinition,
    ];

    /// Name of this location as used in SDL and introspection.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }

    /// Parses a location name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }

    /// Description used by the `__DirectiveLocation` introspection enum.
    pub fn description(self) -> &'static str {
        match self {
            Self::Query => "Location adjacent to a query operation.",
            Self::Mutation => "Location adjacent to a mutation operation.",
            Self::Subscription => "Location adjacent to a subscription operation.",
            Self::Field => "Location adjacent to a field.",
            Self::FragmentDefinition => "Location adjacent to a fragment definition.",
            Self::FragmentSpread => "Location adjacent to a fragment spread.",
            Self::InlineFragment => "Location adjacent to an inline fragment.",
            Self::VariableDefinition => "Location adjacent to a variable definition.",
            Self::Schema => "Location adjacent to a schema definition.",
            Self::Scalar => "Location adjacent to a scalar definition.",
            Self::Object => "Location adjacent to an object type definition.",
            Self::FieldDefinition => "Location adjacent to a field definition.",
            Self::ArgumentDefinition => "Location adjacent to an argument definition.",
            Self::Interface => "Location adjacent to an interface definition.",
            Self::Union => "Location adjacent to a union definition.",
            Self::Enum => "Location adjacent to an enum definition.",
            Self::EnumValue => "Location adjacent to an enum value definition.",
            Self::InputObject => "Location adjacent to an input object type definition.",
            Self::InputFieldDefinition => {
                "Location adjacent to an input object field definition."
            }
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of a directive.
#[derive(Clone, Debug)]
pub struct DirectiveType {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub locations: Vec<DirectiveLocation>,
    #[doc(hidden)]
    pub arguments: Vec<Arc<Argument>>,
    #[doc(hidden)]
    pub is_repeatable: bool,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
}

/// Reason `@deprecated` carries when none is given.
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Names of the directives every schema has.
pub const BUILT_IN_DIRECTIVES: [&str; 5] =
    ["deprecated", "include", "oneOf", "skip", "specifiedBy"];

static DEPRECATED: LazyLock<Arc<DirectiveType>> = LazyLock::new(|| {
    Arc::new(
        DirectiveType::new(
            "deprecated",
            &[
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::EnumValue,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
            ],
        )
        .description("Marks an element of a GraphQL schema as no longer supported.")
        .argument(
            Argument::new("reason", "String")
                .description(
                    "Explains why this element was deprecated, usually also including a \
                     suggestion\nfor how to access supported similar data. Formatted in\n\
                     [Markdown](https://daringfireball.net/projects/markdown/).",
                )
                .default_value(DEFAULT_DEPRECATION_REASON),
        ),
    )
});

static INCLUDE: LazyLock<Arc<DirectiveType>> = LazyLock::new(|| {
    Arc::new(
        DirectiveType::new("include", &EXECUTABLE_FIELD_LOCATIONS)
            .description(
                "Directs the executor to include this field or fragment only when the `if` \
                 argument is true.",
            )
            .argument(Argument::new("if", "Boolean!").description("Included when true.")),
    )
});

static SKIP: LazyLock<Arc<DirectiveType>> = LazyLock::new(|| {
    Arc::new(
        DirectiveType::new("skip", &EXECUTABLE_FIELD_LOCATIONS)
            .description(
                "Directs the executor to skip this field or fragment when the `if` argument \
                 is true.",
            )
            .argument(Argument::new("if", "Boolean!").description("Skipped when true.")),
    )
});

static ONE_OF: LazyLock<Arc<DirectiveType>> = LazyLock::new(|| {
    Arc::new(
        DirectiveType::new("oneOf", &[DirectiveLocation::InputObject]).description(
            "Requires that exactly one field must be supplied and that field must not be \
             `null`.",
        ),
    )
});

static SPECIFIED_BY: LazyLock<Arc<DirectiveType>> = LazyLock::new(|| {
    Arc::new(
        DirectiveType::new("specifiedBy", &[DirectiveLocation::Scalar])
            .description("Exposes a URL that specifies the behavior of this scalar.")
            .argument(
                Argument::new("url", "String!")
                    .description("The URL that specifies the behavior of this scalar."),
            ),
    )
});

const EXECUTABLE_FIELD_LOCATIONS: [DirectiveLocation; 3] = [
    DirectiveLocation::Field,
    DirectiveLocation::FragmentSpread,
    DirectiveLocation::InlineFragment,
];

impl DirectiveType {
    /// Creates a new directive definition.
    pub fn new(name: impl Into<ArcStr>, locations: &[DirectiveLocation]) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations: locations.to_vec(),
            arguments: Vec::new(),
            is_repeatable: false,
            visibility: None,
        }
    }

    /// `@deprecated(reason:)`.
    pub fn deprecated() -> Arc<Self> {
        DEPRECATED.clone()
    }

    /// `@include(if:)`.
    pub fn include() -> Arc<Self> {
        INCLUDE.clone()
    }

    /// `@skip(if:)`.
    pub fn skip() -> Arc<Self> {
        SKIP.clone()
    }

    /// `@oneOf`.
    pub fn one_of() -> Arc<Self> {
        ONE_OF.clone()
    }

    /// `@specifiedBy(url:)`.
    pub fn specified_by() -> Arc<Self> {
        SPECIFIED_BY.clone()
    }

    /// All built-in directives, sorted by name.
    pub fn built_ins() -> Vec<Arc<Self>> {
        vec![
            Self::deprecated(),
            Self::include(),
            Self::one_of(),
            Self::skip(),
            Self::specified_by(),
        ]
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(Arc::new(argument));
        self
    }

    /// Allows the directive to be applied several times to one member.
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Name of the directive.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Indicates whether this is one of the built-in directives.
    pub fn is_builtin(&self) -> bool {
        BUILT_IN_DIRECTIVES.contains(&self.name.as_str())
    }

    /// Looks an argument up by name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Locations joined as they appear in `on A | B`, sorted by name.
    pub(crate) fn locations_signature(&self) -> String {
        self.locations
            .iter()
            .map(|l| l.as_str())
            .sorted()
            .dedup()
            .join(" | ")
    }
}

/// A directive applied to a schema member, e.g. `@deprecated(reason: "..")`.
#[derive(Clone, Debug)]
pub struct DirectiveApplication {
    definition: Arc<DirectiveType>,
    arguments: Vec<(String, InputValue)>,
}

impl DirectiveApplication {
    /// Applies the given directive without arguments.
    pub fn new(definition: &Arc<DirectiveType>) -> Self {
        Self {
            definition: definition.clone(),
            arguments: Vec::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    /// Definition of the applied directive.
    pub fn definition(&self) -> &Arc<DirectiveType> {
        &self.definition
    }

    /// Name of the applied directive.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Given arguments, in application order.
    pub fn arguments(&self) -> &[(String, InputValue)] {
        &self.arguments
    }

    /// Looks a given argument up.
    pub fn argument_value(&self, name: &str) -> Option<&InputValue> {
        self.arguments.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Ordered directive applications of one schema member.
///
/// A non-repeatable directive is applied at most once: applying it again
/// replaces the earlier application. Repeatable directives accumulate.
#[derive(Clone, Debug, Default)]
pub struct Directives(Vec<DirectiveApplication>);

impl Directives {
    /// Adds an application following the repeatability of its definition.
    pub fn apply(&mut self, application: DirectiveApplication) {
        if !application.definition.is_repeatable {
            if let Some(existing) = self
                .0
                .iter_mut()
                .find(|d| d.name() == application.name())
            {
                *existing = application;
                return;
            }
        }
        self.0.push(application);
    }

    /// Removes every application of the named directive.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|d| d.name() != name);
    }

    /// Returns the first application of the named directive.
    pub fn get(&self, name: &str) -> Option<&DirectiveApplication> {
        self.0.iter().find(|d| d.name() == name)
    }

    /// Iterates over the applications in order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectiveApplication> {
        self.0.iter()
    }

    /// Number of applications.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether nothing is applied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deprecation reason carried by an `@deprecated` application.
    pub fn deprecation_reason(&self) -> Option<String> {
        let app = self.get("deprecated")?;
        Some(
            app.argument_value("reason")
                .and_then(InputValue::as_string_value)
                .unwrap_or(DEFAULT_DEPRECATION_REASON)
                .to_owned(),
        )
    }

    /// Marks a member deprecated. Without a reason the schema's default
    /// reason applies once it's built.
    pub fn deprecate(&mut self, reason: Option<&str>) {
        self.remove("deprecated");
        let app = DirectiveApplication::new(&DirectiveType::deprecated());
        self.apply(match reason {
            Some(reason) => app.argument("reason", reason),
            None => app,
        });
    }

    /// Gives a reason-less `@deprecated` application `reason`.
    pub(crate) fn fill_deprecation_reason(&mut self, reason: &str) {
        let missing = self
            .get("deprecated")
            .is_some_and(|app| app.argument_value("reason").is_none());
        if missing {
            self.deprecate(Some(reason));
        }
    }

    /// Replaces the deprecation of a member. [`None`] removes it.
    pub fn set_deprecation_reason(&mut self, reason: Option<&str>) {
        self.remove("deprecated");
        if let Some(reason) = reason {
            self.apply(
                DirectiveApplication::new(&DirectiveType::deprecated()).argument("reason", reason),
            );
        }
    }
}
