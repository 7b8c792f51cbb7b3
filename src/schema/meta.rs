//! Types used to describe a GraphQL schema.

use std::{fmt, future::Future, sync::Arc};

use arcstr::ArcStr;
use derive_more::with_trait::{Debug, From};
use futures::FutureExt as _;
use indexmap::IndexMap;

use super::{
    directives::{DirectiveApplication, DirectiveType, Directives},
    model::SchemaError,
    visibility::VisibilityPredicate,
};
use crate::{
    ast::{InputValue, Type},
    executor::{
        Arguments, Authorization, Context, Extra, FieldExtension, FieldResult, FieldValue, Lazy,
        Outcome, ResolverContext,
    },
    util::{loads_keyword, to_camel_case, to_snake_case},
    value::Value,
};

/// Resolver of a field.
pub type ResolverFn = Arc<dyn Fn(ResolverContext) -> Lazy<Outcome> + Send + Sync>;

/// `prepare` transform of an argument, called with the coerced value.
pub type PrepareFn = Arc<dyn Fn(FieldValue, &Context) -> Lazy<Outcome> + Send + Sync>;

/// Field-level `authorized` hook, called with the parent object and the
/// prepared arguments.
pub type FieldAuthorizedFn =
    Arc<dyn Fn(&FieldValue, &Arguments, &Context) -> Lazy<FieldResult<Authorization>> + Send + Sync>;

/// Argument-level `authorized` hook, called with the parent object and the
/// argument's prepared (or loaded) value.
pub type ArgumentAuthorizedFn =
    Arc<dyn Fn(&FieldValue, &FieldValue, &Context) -> Lazy<FieldResult<bool>> + Send + Sync>;

/// Object-level `authorized` hook, called with the application object.
pub type ObjectAuthorizedFn =
    Arc<dyn Fn(&FieldValue, &Context) -> Lazy<FieldResult<bool>> + Send + Sync>;

/// Maps a runtime value of an abstract type to the name of its object type.
pub type ResolveTypeFn = Arc<dyn Fn(&FieldValue, &Context) -> Option<ArcStr> + Send + Sync>;

/// Converts an external value into the internal representation of a scalar.
pub type CoerceInputFn =
    Arc<dyn Fn(&InputValue, &Context) -> Result<FieldValue, String> + Send + Sync>;

/// Converts an internal value of a scalar into its external representation.
pub type CoerceResultFn = Arc<dyn Fn(&FieldValue, &Context) -> Result<Value, String> + Send + Sync>;

/// Computes the complexity of a field out of its (literal) arguments and the
/// complexity of its selections.
pub type ComplexityFn = Arc<dyn Fn(&IndexMap<String, InputValue>, usize) -> usize + Send + Sync>;

/// Kind of a type, as reported by introspection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// Name of this kind in the `__TypeKind` enum.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value of an argument or input field.
#[derive(Clone, Debug)]
pub enum DefaultValue {
    /// External literal, coerced like a literal given in a query.
    Literal(InputValue),

    /// Internal value, delivered as is. Printed through the type's result
    /// coercion.
    Internal(FieldValue),
}

/// Complexity of a field for the complexity analyzer.
#[derive(Clone, Debug)]
pub enum Complexity {
    /// The field costs this much plus its selections.
    Static(usize),

    /// Computed per query.
    Dynamic(#[debug(skip)] ComplexityFn),
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Static(1)
    }
}

/// Scalar type metadata.
#[derive(Clone, Debug)]
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) coerce_input: Option<CoerceInputFn>,
    #[debug(skip)]
    pub(crate) coerce_result: Option<CoerceResultFn>,
}

/// Object type metadata.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Arc<Field>>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) authorized: Option<ObjectAuthorizedFn>,
    inherited: Vec<ArcStr>,
}

/// Interface type metadata.
#[derive(Clone, Debug)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Arc<Field>>,
    #[doc(hidden)]
    pub interface_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Union type metadata.
#[derive(Clone, Debug)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_type_names: Vec<ArcStr>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) resolve_type: Option<ResolveTypeFn>,
}

/// Enum type metadata.
#[derive(Clone, Debug)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<Arc<EnumValue>>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
}

/// Input object type metadata.
#[derive(Clone, Debug)]
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: Vec<Arc<Argument>>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    inherited: Vec<ArcStr>,
}

/// Generic type metadata.
#[derive(Clone, Debug, From)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum MetaType {
    Scalar(ScalarMeta),
    Object(ObjectMeta),
    Interface(InterfaceMeta),
    Union(UnionMeta),
    Enum(EnumMeta),
    InputObject(InputObjectMeta),
}

/// Metadata for a field.
#[derive(Clone, Debug)]
pub struct Field {
    #[doc(hidden)]
    pub definition_name: ArcStr,
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Vec<Arc<Argument>>,
    #[doc(hidden)]
    pub field_type: Type,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) resolver: Option<ResolverFn>,
    pub(crate) method: Option<ArcStr>,
    #[debug(skip)]
    pub(crate) authorized: Option<FieldAuthorizedFn>,
    #[debug(skip)]
    pub(crate) extensions: Vec<Arc<dyn FieldExtension>>,
    pub(crate) extras: Vec<Extra>,
    pub(crate) complexity: Complexity,
    pub(crate) owner: Option<ArcStr>,
    pub(crate) connection: Option<bool>,
}

/// Metadata for an argument to a field, a directive, or a field of an input
/// object.
#[derive(Clone, Debug)]
pub struct Argument {
    #[doc(hidden)]
    pub definition_name: ArcStr,
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: Type,
    #[doc(hidden)]
    pub default_value: Option<DefaultValue>,
    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
    #[debug(skip)]
    pub(crate) prepare: Option<PrepareFn>,
    pub(crate) keyword: Option<ArcStr>,
    pub(crate) loads: Option<ArcStr>,
    pub(crate) replace_null_with_default: bool,
    #[debug(skip)]
    pub(crate) authorized: Option<ArgumentAuthorizedFn>,
}

/// Metadata for a single value in an enum.
#[derive(Clone, Debug)]
pub struct EnumValue {
    /// The name of the enum value.
    ///
    /// This is the string literal representation of the enum in responses.
    pub name: ArcStr,

    /// The optional description of the enum value.
    pub description: Option<ArcStr>,

    /// Internal value resolvers return and arguments receive.
    pub value: Value,

    #[doc(hidden)]
    pub directives: Directives,
    #[doc(hidden)]
    pub visibility: Option<VisibilityPredicate>,
}

impl ScalarMeta {
    /// Builds a new custom scalar type. The default coercion passes values
    /// through untouched.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            directives: Directives::default(),
            visibility: None,
            coerce_input: None,
            coerce_result: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the `@specifiedBy` URL.
    #[must_use]
    pub fn specified_by_url(mut self, url: impl Into<String>) -> Self {
        self.directives.apply(
            DirectiveApplication::new(&DirectiveType::specified_by()).argument("url", url.into()),
        );
        self
    }

    /// Sets the input coercion.
    #[must_use]
    pub fn coerce_input(
        mut self,
        f: impl Fn(&InputValue, &Context) -> Result<FieldValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_input = Some(Arc::new(f));
        self
    }

    /// Sets the result coercion.
    #[must_use]
    pub fn coerce_result(
        mut self,
        f: impl Fn(&FieldValue, &Context) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_result = Some(Arc::new(f));
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// `@specifiedBy` URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.directives
            .get("specifiedBy")?
            .argument_value("url")?
            .as_string_value()
    }

    /// Wraps this [`ScalarMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl ObjectMeta {
    /// Builds a new object type.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            interface_names: Vec::new(),
            directives: Directives::default(),
            visibility: None,
            authorized: None,
            inherited: Vec::new(),
        }
    }

    /// Builds a new object type sharing the fields, interfaces and hooks of
    /// `parent`. Fields redefined later replace the inherited ones.
    pub fn inherit(name: impl Into<ArcStr>, parent: &Self) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: parent.fields.clone(),
            interface_names: parent.interface_names.clone(),
            directives: Directives::default(),
            visibility: parent.visibility.clone(),
            authorized: parent.authorized.clone(),
            inherited: parent.fields.iter().map(|f| f.name.clone()).collect(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field. Several fields may share a name when their visibility
    /// predicates are mutually exclusive.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        let field = field.owned_by(&self.name);
        replace_inherited(&mut self.fields, &mut self.inherited, &field.name, |f| &f.name);
        self.fields.push(Arc::new(field));
        self
    }

    /// Declares implemented interfaces.
    #[must_use]
    pub fn interfaces(mut self, names: &[&str]) -> Self {
        for n in names {
            if !self.interface_names.iter().any(|i| i == n) {
                self.interface_names.push(ArcStr::from(*n));
            }
        }
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Sets the object-level `authorized` hook.
    #[must_use]
    pub fn authorized(
        mut self,
        f: impl Fn(&FieldValue, &Context) -> Lazy<FieldResult<bool>> + Send + Sync + 'static,
    ) -> Self {
        self.authorized = Some(Arc::new(f));
        self
    }

    /// Returns the first field with the given name.
    pub fn field_by_name(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Wraps this [`ObjectMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

impl InterfaceMeta {
    /// Builds a new interface type.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            interface_names: Vec::new(),
            directives: Directives::default(),
            visibility: None,
            resolve_type: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(Arc::new(field.owned_by(&self.name)));
        self
    }

    /// Declares interfaces this interface implements.
    #[must_use]
    pub fn interfaces(mut self, names: &[&str]) -> Self {
        self.interface_names.extend(names.iter().map(|n| ArcStr::from(*n)));
        self
    }

    /// Sets the type resolution of this interface.
    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&FieldValue, &Context) -> Option<ArcStr> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Wraps this [`InterfaceMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Builds a new union type of the given object types.
    pub fn new(name: impl Into<ArcStr>, of_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_type_names: of_types.iter().map(|n| ArcStr::from(*n)).collect(),
            directives: Directives::default(),
            visibility: None,
            resolve_type: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the type resolution of this union.
    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&FieldValue, &Context) -> Option<ArcStr> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Wraps this [`UnionMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl EnumMeta {
    /// Builds a new enum type.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: Vec::new(),
            directives: Directives::default(),
            visibility: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a value.
    #[must_use]
    pub fn value(mut self, value: EnumValue) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// Adds several plain values whose internal value is their name.
    #[must_use]
    pub fn values(mut self, names: &[&str]) -> Self {
        self.values
            .extend(names.iter().map(|n| Arc::new(EnumValue::new(*n))));
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Wraps this [`EnumMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }
}

impl InputObjectMeta {
    /// Builds a new input object type.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: Vec::new(),
            directives: Directives::default(),
            visibility: None,
            inherited: Vec::new(),
        }
    }

    /// Builds a new input object type sharing the arguments of `parent`.
    pub fn inherit(name: impl Into<ArcStr>, parent: &Self) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields: parent.input_fields.clone(),
            directives: parent.directives.clone(),
            visibility: parent.visibility.clone(),
            inherited: parent.input_fields.iter().map(|a| a.name.clone()).collect(),
        }
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
        replace_inherited(&mut self.input_fields, &mut self.inherited, &argument.name, |a| {
            &a.name
        });
        self.input_fields.push(Arc::new(argument));
        self
    }

    /// Requires exactly one argument to be given, and non-null.
    #[must_use]
    pub fn one_of(mut self) -> Self {
        self.directives
            .apply(DirectiveApplication::new(&DirectiveType::one_of()));
        self
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Indicates whether this is a `@oneOf` input object.
    pub fn is_one_of(&self) -> bool {
        self.directives.get("oneOf").is_some()
    }

    /// Wraps this [`InputObjectMeta`] into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

fn replace_inherited<T>(
    members: &mut Vec<Arc<T>>,
    inherited: &mut Vec<ArcStr>,
    name: &str,
    name_of: impl Fn(&T) -> &ArcStr,
) {
    if let Some(pos) = inherited.iter().position(|n| n == name) {
        inherited.remove(pos);
        members.retain(|m| name_of(m) != name);
    }
}

impl MetaType {
    /// Name of the type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. }) => name,
        }
    }

    /// Description of the type.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
        }
    }

    /// Directives applied to the type.
    pub fn directives(&self) -> &Directives {
        match self {
            Self::Scalar(ScalarMeta { directives, .. })
            | Self::Object(ObjectMeta { directives, .. })
            | Self::Interface(InterfaceMeta { directives, .. })
            | Self::Union(UnionMeta { directives, .. })
            | Self::Enum(EnumMeta { directives, .. })
            | Self::InputObject(InputObjectMeta { directives, .. }) => directives,
        }
    }

    /// Own visibility predicate of the type.
    pub fn visibility(&self) -> Option<&VisibilityPredicate> {
        match self {
            Self::Scalar(ScalarMeta { visibility, .. })
            | Self::Object(ObjectMeta { visibility, .. })
            | Self::Interface(InterfaceMeta { visibility, .. })
            | Self::Union(UnionMeta { visibility, .. })
            | Self::Enum(EnumMeta { visibility, .. })
            | Self::InputObject(InputObjectMeta { visibility, .. }) => visibility.as_ref(),
        }
    }

    /// Introspection kind of the type.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Output fields of an object or an interface, unfiltered.
    pub fn fields(&self) -> &[Arc<Field>] {
        match self {
            Self::Object(ObjectMeta { fields, .. }) | Self::Interface(InterfaceMeta { fields, .. }) => {
                fields
            }
            _ => &[],
        }
    }

    /// Fields of an input object, unfiltered.
    pub fn input_fields(&self) -> &[Arc<Argument>] {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => input_fields,
            _ => &[],
        }
    }

    /// Interfaces declared by an object or an interface.
    pub fn interface_names(&self) -> &[ArcStr] {
        match self {
            Self::Object(ObjectMeta { interface_names, .. })
            | Self::Interface(InterfaceMeta { interface_names, .. }) => interface_names,
            _ => &[],
        }
    }

    /// Values of an enum, unfiltered.
    pub fn enum_values(&self) -> &[Arc<EnumValue>] {
        match self {
            Self::Enum(EnumMeta { values, .. }) => values,
            _ => &[],
        }
    }

    /// Own type resolution of an abstract type.
    pub(crate) fn resolve_type_fn(&self) -> Option<&ResolveTypeFn> {
        match self {
            Self::Interface(InterfaceMeta { resolve_type, .. })
            | Self::Union(UnionMeta { resolve_type, .. }) => resolve_type.as_ref(),
            _ => None,
        }
    }

    /// Indicates whether this type can be used as an input.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Indicates whether this type can be returned by a field.
    pub fn is_output(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }

    /// Indicates whether this type is a union or an interface.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Indicates whether this type is a scalar or an enum.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Indicates whether this type is one of the introspection types.
    pub fn is_introspection(&self) -> bool {
        self.name().starts_with("__")
    }

    /// Indicates whether this type is built in: an introspection type or a
    /// standard scalar.
    pub fn is_builtin(&self) -> bool {
        self.is_introspection()
            || matches!(
                self,
                Self::Scalar(ScalarMeta { name, .. })
                    if matches!(name.as_str(), "Boolean" | "String" | "Int" | "Float" | "ID")
            )
    }
}

impl Field {
    /// Builds a new field. Its GraphQL name is the camel-cased `name`.
    pub fn new(name: impl Into<ArcStr>, field_type: impl Into<Type>) -> Self {
        let definition_name = name.into();
        let field_type = field_type.into();
        Self {
            name: to_camel_case(&definition_name).into(),
            definition_name,
            description: None,
            arguments: Vec::new(),
            field_type,
            directives: Directives::default(),
            visibility: None,
            resolver: None,
            method: None,
            authorized: None,
            extensions: Vec::new(),
            extras: Vec::new(),
            complexity: Complexity::default(),
            owner: None,
            connection: None,
        }
    }

    /// Toggles camel-casing of the GraphQL name.
    #[must_use]
    pub fn camelize(mut self, camelize: bool) -> Self {
        self.name = if camelize {
            to_camel_case(&self.definition_name).into()
        } else {
            self.definition_name.clone()
        };
        self
    }

    /// Overrides the GraphQL name.
    #[must_use]
    pub fn graphql_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.name = name.into();
        self
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

    /// Adds an argument unless one with the same name exists already.
    pub fn ensure_argument(&mut self, argument: Argument) {
        if !self.arguments.iter().any(|a| a.name == argument.name) {
            self.arguments.push(Arc::new(argument));
        }
    }

    /// Marks the field deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<Option<&'static str>>) -> Self {
        self.directives.deprecate(reason.into());
        self
    }

    /// Replaces the deprecation reason. [`None`] removes the deprecation.
    pub fn set_deprecation_reason(&mut self, reason: Option<&str>) {
        self.directives.set_deprecation_reason(reason);
    }

    /// Current deprecation reason.
    pub fn deprecation_reason(&self) -> Option<String> {
        self.directives.deprecation_reason()
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Sets a synchronous resolver.
    #[must_use]
    pub fn resolve<F, R>(mut self, f: F) -> Self
    where
        F: Fn(ResolverContext) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.resolver = Some(Arc::new(move |ctx| Lazy::Ready(f(ctx).into())));
        self
    }

    /// Sets an asynchronous resolver.
    #[must_use]
    pub fn resolve_async<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<Outcome> + 'static,
    {
        self.resolver = Some(Arc::new(move |ctx| Lazy::pending(f(ctx).map(Into::into))));
        self
    }

    /// Sets a resolver returning a [`Lazy`] outcome.
    #[must_use]
    pub fn resolve_lazy(
        mut self,
        f: impl Fn(ResolverContext) -> Lazy<Outcome> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(f));
        self
    }

    /// Sets the key the default resolver looks up on the parent.
    #[must_use]
    pub fn method(mut self, key: impl Into<ArcStr>) -> Self {
        self.method = Some(key.into());
        self
    }

    /// Sets the field-level `authorized` hook.
    #[must_use]
    pub fn authorized(
        mut self,
        f: impl Fn(&FieldValue, &Arguments, &Context) -> Lazy<FieldResult<Authorization>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.authorized = Some(Arc::new(f));
        self
    }

    /// Appends an extension, letting it adjust this field first.
    #[must_use]
    pub fn extension(mut self, extension: impl FieldExtension) -> Self {
        extension.apply(&mut self);
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Requests extras for the resolver.
    #[must_use]
    pub fn extras(mut self, extras: &[Extra]) -> Self {
        for e in extras {
            if !self.extras.contains(e) {
                self.extras.push(*e);
            }
        }
        self
    }

    /// Sets a static complexity.
    #[must_use]
    pub fn complexity(mut self, complexity: usize) -> Self {
        self.complexity = Complexity::Static(complexity);
        self
    }

    /// Sets a dynamic complexity.
    #[must_use]
    pub fn complexity_fn(
        mut self,
        f: impl Fn(&IndexMap<String, InputValue>, usize) -> usize + Send + Sync + 'static,
    ) -> Self {
        self.complexity = Complexity::Dynamic(Arc::new(f));
        self
    }

    /// Overrides the connection flag.
    #[must_use]
    pub fn connection(mut self, connection: bool) -> Self {
        self.connection = Some(connection);
        self
    }

    pub(crate) fn owned_by(mut self, owner: &ArcStr) -> Self {
        if self.owner.is_none() {
            self.owner = Some(owner.clone());
        }
        self
    }

    /// Name of the type declaring this field.
    ///
    /// # Errors
    ///
    /// If the field was never attached to a type.
    pub fn owner_type(&self) -> Result<&ArcStr, SchemaError> {
        self.owner.as_ref().ok_or_else(|| SchemaError::MissingOwner {
            field: self.name.to_string(),
        })
    }

    /// Indicates whether this field returns a connection.
    pub fn is_connection(&self) -> bool {
        self.connection
            .unwrap_or_else(|| self.field_type.innermost_name().ends_with("Connection"))
    }

    /// Returns the first argument with the given name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Key the default resolver looks up on the parent.
    pub(crate) fn method_key(&self) -> &str {
        self.method.as_deref().unwrap_or(&self.definition_name)
    }

    /// `Owner.name` of this field.
    pub fn path(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}.{}", self.name),
            None => self.name.to_string(),
        }
    }
}

impl Argument {
    /// Builds a new argument. Its GraphQL name is the camel-cased `name`.
    pub fn new(name: impl Into<ArcStr>, arg_type: impl Into<Type>) -> Self {
        let definition_name = name.into();
        Self {
            name: to_camel_case(&definition_name).into(),
            definition_name,
            description: None,
            arg_type: arg_type.into(),
            default_value: None,
            directives: Directives::default(),
            visibility: None,
            prepare: None,
            keyword: None,
            loads: None,
            replace_null_with_default: false,
            authorized: None,
        }
    }

    /// Builds an argument out of an SDL definition, whose keyword is the
    /// snake-cased GraphQL name.
    pub(crate) fn from_graphql_name(name: &str, arg_type: Type) -> Self {
        let mut arg = Self::new(to_snake_case(name), arg_type);
        arg.name = name.into();
        arg
    }

    /// Toggles camel-casing of the GraphQL name.
    #[must_use]
    pub fn camelize(mut self, camelize: bool) -> Self {
        self.name = if camelize {
            to_camel_case(&self.definition_name).into()
        } else {
            self.definition_name.clone()
        };
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<InputValue>) -> Self {
        self.default_value = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Sets an internal default value, delivered as is.
    #[must_use]
    pub fn default_internal(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(DefaultValue::Internal(value.into()));
        self
    }

    /// Delivers the argument under `keyword` instead of its definition name.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<ArcStr>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Sets the `prepare` transform.
    #[must_use]
    pub fn prepare<F, R>(mut self, f: F) -> Self
    where
        F: Fn(FieldValue, &Context) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.prepare = Some(Arc::new(move |v, ctx| Lazy::Ready(f(v, ctx).into())));
        self
    }

    /// Sets a `prepare` transform returning a [`Lazy`] outcome.
    #[must_use]
    pub fn prepare_lazy(
        mut self,
        f: impl Fn(FieldValue, &Context) -> Lazy<Outcome> + Send + Sync + 'static,
    ) -> Self {
        self.prepare = Some(Arc::new(f));
        self
    }

    /// Loads application objects of the named type by the given ID(s).
    #[must_use]
    pub fn loads(mut self, type_name: impl Into<ArcStr>) -> Self {
        self.loads = Some(type_name.into());
        self
    }

    /// Replaces an explicit `null` with the default value.
    #[must_use]
    pub fn replace_null_with_default(mut self) -> Self {
        self.replace_null_with_default = true;
        self
    }

    /// Sets the argument-level `authorized` hook.
    #[must_use]
    pub fn authorized(
        mut self,
        f: impl Fn(&FieldValue, &FieldValue, &Context) -> Lazy<FieldResult<bool>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.authorized = Some(Arc::new(f));
        self
    }

    /// Marks the argument deprecated. Required arguments are rejected when the
    /// schema is built.
    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<Option<&'static str>>) -> Self {
        self.directives.deprecate(reason.into());
        self
    }

    /// Replaces the deprecation reason. [`None`] removes the deprecation.
    ///
    /// # Errors
    ///
    /// If the argument is required. `path` names it in the error.
    pub fn set_deprecation_reason(
        &mut self,
        path: &str,
        reason: Option<&str>,
    ) -> Result<(), SchemaError> {
        if reason.is_some() && self.is_required() {
            return Err(SchemaError::DeprecatedRequiredArgument {
                path: path.to_owned(),
            });
        }
        self.directives.set_deprecation_reason(reason);
        Ok(())
    }

    /// Current deprecation reason.
    pub fn deprecation_reason(&self) -> Option<String> {
        self.directives.deprecation_reason()
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }

    /// Indicates whether the argument must be given: non-null without default.
    pub fn is_required(&self) -> bool {
        self.arg_type.is_non_null() && self.default_value.is_none()
    }

    /// Key the coerced value is delivered under.
    pub fn keyword_name(&self) -> String {
        match (&self.keyword, &self.loads) {
            (Some(k), _) => k.to_string(),
            (None, Some(_)) => loads_keyword(&self.definition_name),
            (None, None) => self.definition_name.to_string(),
        }
    }

    /// Type of the objects this argument loads, if it loads.
    pub fn loads_type(&self) -> Option<&ArcStr> {
        self.loads.as_ref()
    }
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] whose internal value is its name.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        Self {
            value: Value::from(name.as_str()),
            name,
            description: None,
            directives: Directives::default(),
            visibility: None,
        }
    }

    /// Sets the internal value.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the value deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<Option<&'static str>>) -> Self {
        self.directives.deprecate(reason.into());
        self
    }

    /// Replaces the deprecation reason. [`None`] removes the deprecation.
    pub fn set_deprecation_reason(&mut self, reason: Option<&str>) {
        self.directives.set_deprecation_reason(reason);
    }

    /// Current deprecation reason.
    pub fn deprecation_reason(&self) -> Option<String> {
        self.directives.deprecation_reason()
    }

    /// Applies a directive.
    #[must_use]
    pub fn directive(mut self, application: DirectiveApplication) -> Self {
        self.directives.apply(application);
        self
    }

    /// Restricts visibility.
    #[must_use]
    pub fn visible(mut self, predicate: impl Into<VisibilityPredicate>) -> Self {
        self.visibility = VisibilityPredicate::and_maybe(self.visibility, predicate.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Argument, EnumValue, Field, InputObjectMeta, ObjectMeta};
    use crate::schema::model::SchemaError;

    #[test]
    fn camelizes_names_unless_told_not_to() {
        assert_eq!(Field::new("comments_count", "Int!").name, "commentsCount");
        assert_eq!(
            Field::new("comments_count", "Int!").camelize(false).name,
            "comments_count",
        );
    }

    #[test]
    fn derives_keywords() {
        assert_eq!(Argument::new("aliased_arg", "String").keyword("renamed").keyword_name(), "renamed");
        assert_eq!(Argument::new("instrument_id", "ID").loads("Instrument").keyword_name(), "instrument");
        assert_eq!(Argument::new("instrument_ids", "[ID!]").loads("Instrument").keyword_name(), "instruments");
        assert_eq!(Argument::new("plain", "ID").keyword_name(), "plain");
    }

    #[test]
    fn rejects_deprecating_required_arguments() {
        let mut arg = Argument::new("foo", "String!");
        let err = arg.set_deprecation_reason("MyInput.foo", Some("x")).unwrap_err();
        assert_eq!(err.to_string(), "Required arguments cannot be deprecated: MyInput.foo.");
        let mut optional = Argument::new("foo", "String");
        optional.set_deprecation_reason("MyInput.foo", Some("x")).unwrap();
        optional.set_deprecation_reason("MyInput.foo", None).unwrap();
        assert_eq!(optional.directives.len(), 0);
        assert!(!Argument::new("x", "Int!").default_value(1).is_required());
        let _ = SchemaError::MissingOwner { field: "x".into() };
    }

    #[test]
    fn deprecating_twice_keeps_one_directive() {
        let mut v = EnumValue::new("FOO").deprecated("a");
        v.set_deprecation_reason(Some("b"));
        assert_eq!(v.directives.len(), 1);
        assert_eq!(v.deprecation_reason().as_deref(), Some("b"));
    }

    #[test]
    fn inherited_fields_are_replaced_without_touching_the_parent() {
        let parent = ObjectMeta::new("Parent")
            .field(Field::new("a", "Int"))
            .field(Field::new("b", "Int"));
        let child = ObjectMeta::inherit("Child", &parent).field(Field::new("a", "String"));
        assert_eq!(child.fields.len(), 2);
        assert_eq!(child.field_by_name("a").unwrap().field_type.to_string(), "String");
        assert_eq!(parent.field_by_name("a").unwrap().field_type.to_string(), "Int");
        assert_eq!(child.field_by_name("a").unwrap().owner.as_deref(), Some("Child"));

        let versioned = child.field(Field::new("a", "Float"));
        assert_eq!(versioned.fields.iter().filter(|f| f.name == "a").count(), 2);
    }

    #[test]
    fn one_of_is_a_directive() {
        let input = InputObjectMeta::new("OneOfInput").one_of();
        assert!(input.is_one_of());
        assert_eq!(input.directives.len(), 1);
    }

    #[test]
    fn unattached_fields_have_no_owner() {
        assert!(Field::new("f", "Int").owner_type().is_err());
    }
}
