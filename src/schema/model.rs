use std::{
    collections::HashMap,
    ops::Deref,
    sync::{Arc, PoisonError, RwLock},
};

use arcstr::ArcStr;
use derive_more::with_trait::{Debug, Display, Error};
use fnv::FnvHashMap;

use super::{
    builder::SchemaBuilder,
    directives::{DirectiveType, Directives},
    meta::MetaType,
    visibility::{DuplicateNamesError, Member, Warden, WardenCache},
};
use crate::{
    GraphQLError,
    config::{SchemaConfig, VisibilityStrategy},
    executor::{
        Context, FieldError, FieldResult, FieldValue, Lazy, LoadApplicationObjectFailedError,
        Outcome, UnauthorizedError,
    },
};

/// Kind of an operation, and of the root type answering it.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum OperationType {
    #[display("query")]
    Query,
    #[display("mutation")]
    Mutation,
    #[display("subscription")]
    Subscription,
}

/// Error of a schema definition, raised when the schema is built.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum SchemaError {
    /// A member references a type the schema doesn't define.
    #[display("Type \"{name}\" referenced by `{path}` is not defined")]
    InvalidTypeReference {
        /// Name of the missing type.
        name: String,
        /// Member referencing it.
        path: String,
    },

    /// A default value doesn't satisfy the type it's declared for.
    #[display(
        "`{path}` has an invalid default value: `{value}` isn't accepted by `{type_name}`; \
         update the default value or the argument type."
    )]
    InvalidDefaultValue {
        /// Argument or input field holding the default.
        path: String,
        /// The rejected default.
        value: String,
        /// Type that rejected it.
        type_name: String,
    },

    /// A required argument carries a deprecation.
    #[display("Required arguments cannot be deprecated: {path}.")]
    DeprecatedRequiredArgument {
        /// The argument.
        path: String,
    },

    /// A directive is applied outside its locations.
    #[display(
        "Directive `@{directive}` can't be attached to {owner} because {kind} isn't included \
         in its locations ({locations}). Use `locations({kind})` to update this directive's \
         definition, or remove it from {owner}."
    )]
    DirectiveLocation {
        /// The directive.
        directive: String,
        /// Member it's applied to.
        owner: String,
        /// Location of that member.
        kind: String,
        /// Locations the directive allows.
        locations: String,
    },

    /// An argument or input field references an output-only type.
    #[display(
        "Invalid input type for {path}: {type_name}. Must be scalar, enum, or input object, \
         not {kind}."
    )]
    InvalidInputType {
        /// The argument.
        path: String,
        /// Its type.
        type_name: String,
        /// Kind of its type.
        kind: String,
    },

    /// A field references an input-only type.
    #[display(
        "Invalid output type for {path}: {type_name}. Must be scalar, enum, object, interface \
         or union, not {kind}."
    )]
    InvalidOutputType {
        /// The field.
        path: String,
        /// Its type.
        type_name: String,
        /// Kind of its type.
        kind: String,
    },

    /// An argument of a `@oneOf` input object is non-null.
    #[display(
        "Argument '{argument}' must be nullable because it is part of a OneOf type, \
         add `required: false`."
    )]
    OneOfRequiredArgument {
        /// The argument.
        argument: String,
    },

    /// An argument of a `@oneOf` input object has a default.
    #[display(
        "Argument '{argument}' cannot have a default value because it is part of a OneOf type, \
         remove `default_value: ...`."
    )]
    OneOfDefaultValue {
        /// The argument.
        argument: String,
    },

    /// A type lists a non-interface as implemented.
    #[display("`{type_name}` can't implement `{interface}`, because it isn't an interface type")]
    NotAnInterface {
        /// The implementing type.
        type_name: String,
        /// The listed type.
        interface: String,
    },

    /// A union lists a non-object member.
    #[display("Union `{union}` can only include object types, but `{member}` is not one")]
    InvalidUnionMember {
        /// The union.
        union: String,
        /// The listed member.
        member: String,
    },

    /// Two definitions of one name would always be visible together.
    #[display(
        "Type \"{name}\" is defined more than once; give its definitions mutually exclusive \
         visibility"
    )]
    DuplicateDefinition {
        /// The name.
        name: String,
    },

    /// A root type is missing or isn't an object type.
    #[display("The {operation} root type \"{name}\" must be a defined object type")]
    MissingRoot {
        /// Kind of the root.
        operation: OperationType,
        /// Name of the root type.
        name: String,
    },

    /// A field is queried for its owner, but was never attached to a type.
    #[display("Field `{field}` isn't attached to a type, so it has no owner")]
    MissingOwner {
        /// The field.
        field: String,
    },

    /// A named visibility profile exposes same-named definitions together.
    #[display("{_0}")]
    DuplicateNames(DuplicateNamesError),
}

pub(crate) type VisibleHook = Arc<dyn Fn(Member<'_>, &Context) -> bool + Send + Sync>;
pub(crate) type ObjectFromIdHook =
    Arc<dyn Fn(&FieldValue, &MetaType, &Context) -> Lazy<FieldResult<Option<FieldValue>>> + Send + Sync>;
pub(crate) type IdFromObjectHook =
    Arc<dyn Fn(&FieldValue, &MetaType, &Context) -> FieldResult<FieldValue> + Send + Sync>;
pub(crate) type SchemaResolveTypeHook =
    Arc<dyn Fn(&MetaType, &FieldValue, &Context) -> Option<ArcStr> + Send + Sync>;
pub(crate) type UnauthorizedHook = Arc<dyn Fn(UnauthorizedError, &Context) -> Outcome + Send + Sync>;
pub(crate) type LoadFailedHook =
    Arc<dyn Fn(LoadApplicationObjectFailedError, &Context) -> Outcome + Send + Sync>;
pub(crate) type RescueHook =
    Arc<dyn Fn(&(dyn std::error::Error + Send + Sync + 'static), &Context) -> Option<Outcome> + Send + Sync>;

/// Schema-level hooks, set through [`SchemaBuilder`].
#[derive(Clone, Debug, Default)]
pub(crate) struct SchemaHooks {
    #[debug(skip)]
    pub(crate) visible: Option<VisibleHook>,
    #[debug(skip)]
    pub(crate) object_from_id: Option<ObjectFromIdHook>,
    #[debug(skip)]
    pub(crate) id_from_object: Option<IdFromObjectHook>,
    #[debug(skip)]
    pub(crate) resolve_type: Option<SchemaResolveTypeHook>,
    #[debug(skip)]
    pub(crate) unauthorized_object: Option<UnauthorizedHook>,
    #[debug(skip)]
    pub(crate) unauthorized_field: Option<UnauthorizedHook>,
    #[debug(skip)]
    pub(crate) load_application_object_failed: Option<LoadFailedHook>,
    /// Most recently registered first.
    #[debug(skip)]
    pub(crate) rescues: Vec<RescueHook>,
}

/// Metadata for a schema.
#[derive(Debug)]
pub struct SchemaType {
    pub(crate) description: Option<ArcStr>,
    pub(crate) types: Vec<Arc<MetaType>>,
    pub(crate) types_by_name: FnvHashMap<ArcStr, Vec<usize>>,
    pub(crate) possible: FnvHashMap<ArcStr, Vec<ArcStr>>,
    pub(crate) directives: Vec<Arc<DirectiveType>>,
    pub(crate) query_type_name: ArcStr,
    pub(crate) mutation_type_name: Option<ArcStr>,
    pub(crate) subscription_type_name: Option<ArcStr>,
    pub(crate) orphan_types: Vec<ArcStr>,
    pub(crate) schema_directives: Directives,
    pub(crate) hooks: SchemaHooks,
    pub(crate) config: SchemaConfig,
    pub(crate) profiles: RwLock<HashMap<ArcStr, Arc<WardenCache>>>,
}

impl SchemaType {
    /// Description of the schema.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Settings of the schema.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Directives applied to the schema itself.
    pub fn schema_directives(&self) -> &Directives {
        &self.schema_directives
    }

    /// Every type definition, unfiltered, in registration order.
    pub fn type_list(&self) -> &[Arc<MetaType>] {
        &self.types
    }

    /// Every directive definition, unfiltered.
    pub fn directive_list(&self) -> &[Arc<DirectiveType>] {
        &self.directives
    }

    pub(crate) fn definitions_named<'s>(
        &'s self,
        name: &str,
    ) -> impl Iterator<Item = &'s Arc<MetaType>> + 's {
        self.types_by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|i| self.types.get(*i))
    }

    /// First definition of the given name, ignoring visibility.
    pub fn type_by_name(&self, name: &str) -> Option<&Arc<MetaType>> {
        self.definitions_named(name).next()
    }

    /// Directive definition of the given name, ignoring visibility.
    pub fn directive_by_name(&self, name: &str) -> Option<&Arc<DirectiveType>> {
        self.directives.iter().find(|d| d.name == name)
    }

    /// Name of the query root type.
    pub fn query_type_name(&self) -> &ArcStr {
        &self.query_type_name
    }

    /// Name of the mutation root type, if any.
    pub fn mutation_type_name(&self) -> Option<&ArcStr> {
        self.mutation_type_name.as_ref()
    }

    /// Name of the subscription root type, if any.
    pub fn subscription_type_name(&self) -> Option<&ArcStr> {
        self.subscription_type_name.as_ref()
    }

    /// Name of the root type of the given operation kind.
    pub fn root_name(&self, op: OperationType) -> Option<&ArcStr> {
        match op {
            OperationType::Query => Some(&self.query_type_name),
            OperationType::Mutation => self.mutation_type_name.as_ref(),
            OperationType::Subscription => self.subscription_type_name.as_ref(),
        }
    }

    pub(crate) fn root_names(&self) -> impl Iterator<Item = ArcStr> + '_ {
        std::iter::once(&self.query_type_name)
            .chain(&self.mutation_type_name)
            .chain(&self.subscription_type_name)
            .cloned()
    }

    /// Indicates whether root names deviate from `Query`, `Mutation` and
    /// `Subscription`.
    pub fn has_custom_root_names(&self) -> bool {
        self.query_type_name != "Query"
            || self.mutation_type_name.as_ref().is_some_and(|n| n != "Mutation")
            || self
                .subscription_type_name
                .as_ref()
                .is_some_and(|n| n != "Subscription")
    }

    /// Indicates whether `name` was registered as an orphan type.
    pub fn is_orphan(&self, name: &str) -> bool {
        self.orphan_types.iter().any(|o| o == name)
    }

    /// Names of the types an abstract type may resolve to, ignoring
    /// visibility. Interfaces list their implementing interfaces too.
    pub fn possible_type_names(&self, ty: &MetaType) -> &[ArcStr] {
        self.possible.get(ty.name()).map_or(&[], Vec::as_slice)
    }

    fn profile_cache(&self, name: &str) -> Option<Arc<WardenCache>> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// Shared handle to a built schema.
///
/// Cheap to clone and safe to share across concurrent requests.
#[derive(Clone, Debug)]
pub struct Schema(pub(crate) Arc<SchemaType>);

static_assertions::assert_impl_all!(Schema: Send, Sync);

impl Schema {
    /// Starts defining a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Visibility-filtering view for a request context.
    ///
    /// Requests selecting a visibility profile share the profile's cached
    /// view. Other requests get a fresh view evaluated in their own context.
    ///
    /// # Errors
    ///
    /// If the selected profile isn't configured.
    pub fn warden(&self, ctx: &Context) -> Result<Warden, GraphQLError> {
        match ctx.visibility_profile() {
            None => Ok(Warden::new(Arc::clone(&self.0), Arc::default(), ctx.clone())),
            Some(profile) => self
                .profile_warden(profile)
                .ok_or_else(|| GraphQLError::UnknownVisibilityProfile(profile.to_owned())),
        }
    }

    fn profile_warden(&self, profile: &str) -> Option<Warden> {
        let profile_ctx = self.0.config.profile_context(profile)?;
        let cache = if let Some(cache) = self.0.profile_cache(profile) {
            cache
        } else {
            let mut profiles = self.0.profiles.write().unwrap_or_else(PoisonError::into_inner);
            let cache = profiles.entry(profile.into()).or_insert_with(|| {
                tracing::debug!(profile, "filling visibility profile cache");
                Arc::default()
            });
            Arc::clone(cache)
        };
        Some(Warden::new(Arc::clone(&self.0), cache, profile_ctx))
    }

    /// View where every member is visible.
    pub fn unfiltered_warden(&self) -> Warden {
        Warden::unfiltered(Arc::clone(&self.0))
    }

    pub(crate) fn preload_profiles(&self) -> Result<(), SchemaError> {
        if self.0.config.visibility_strategy != VisibilityStrategy::Eager {
            return Ok(());
        }
        for name in self.0.config.visibility_profiles.keys() {
            if let Some(warden) = self.profile_warden(name) {
                warden.preload().map_err(SchemaError::DuplicateNames)?;
                tracing::debug!(profile = name.as_str(), "preloaded visibility profile");
            }
        }
        Ok(())
    }

    /// Asks the schema-level hook for the ID of an application object.
    ///
    /// # Errors
    ///
    /// If no `id_from_object` hook is set, or the hook fails.
    pub fn id_from_object(
        &self,
        object: &FieldValue,
        ty: &MetaType,
        ctx: &Context,
    ) -> FieldResult<FieldValue> {
        match &self.0.hooks.id_from_object {
            Some(hook) => hook(object, ty, ctx),
            None => Err(FieldError::from("Schema doesn't define `id_from_object`")),
        }
    }
}

impl Deref for Schema {
    type Target = SchemaType;

    fn deref(&self) -> &SchemaType {
        &self.0
    }
}
