//! Definition-time assembly of a [`Schema`].

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use itertools::Itertools as _;

use super::{
    directives::{DirectiveApplication, DirectiveLocation, DirectiveType, Directives},
    meta::{Argument, Field, InterfaceMeta, MetaType, ObjectMeta},
    model::{OperationType, Schema, SchemaError, SchemaHooks, SchemaType},
    visibility::Member,
};
use crate::{
    ast::Type,
    config::SchemaConfig,
    executor::{
        Context, FieldResult, FieldValue, Lazy, LoadApplicationObjectFailedError, Outcome,
        UnauthorizedError,
    },
    introspection,
    types::{coercion::check_default, scalars::builtin_scalars},
};

/// Collects type definitions and hooks, then validates them into an
/// immutable [`Schema`].
///
/// ```
/// # use trellis::{FieldValue, SchemaBuilder, meta::{Field, ObjectMeta}};
/// let answer = Field::new("answer", "Int!").resolve(|_| FieldValue::from(42));
/// let schema = SchemaBuilder::new()
///     .query(ObjectMeta::new("Query").field(answer))
///     .build()
///     .unwrap();
/// assert_eq!(schema.query_type_name(), "Query");
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    description: Option<ArcStr>,
    query: Option<ArcStr>,
    mutation: Option<ArcStr>,
    subscription: Option<ArcStr>,
    types: Vec<MetaType>,
    orphan_types: Vec<ArcStr>,
    directives: Vec<Arc<DirectiveType>>,
    schema_directives: Directives,
    hooks: SchemaHooks,
    config: SchemaConfig,
}

impl SchemaBuilder {
    /// Starts an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Registers the query root type.
    #[must_use]
    pub fn query(mut self, ty: impl Into<MetaType>) -> Self {
        let ty = ty.into();
        self.query = Some(ty.name().clone());
        self.register(ty)
    }

    /// Names the query root type, registered separately.
    #[must_use]
    pub fn query_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.query = Some(name.into());
        self
    }

    /// Registers the mutation root type.
    #[must_use]
    pub fn mutation(mut self, ty: impl Into<MetaType>) -> Self {
        let ty = ty.into();
        self.mutation = Some(ty.name().clone());
        self.register(ty)
    }

    /// Names the mutation root type, registered separately.
    #[must_use]
    pub fn mutation_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.mutation = Some(name.into());
        self
    }

    /// Registers the subscription root type.
    #[must_use]
    pub fn subscription(mut self, ty: impl Into<MetaType>) -> Self {
        let ty = ty.into();
        self.subscription = Some(ty.name().clone());
        self.register(ty)
    }

    /// Names the subscription root type, registered separately.
    #[must_use]
    pub fn subscription_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.subscription = Some(name.into());
        self
    }

    /// Registers a type definition. Several definitions may share a name
    /// when their visibility predicates are mutually exclusive.
    #[must_use]
    pub fn register(mut self, ty: impl Into<MetaType>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Keeps the named types visible even when no field reaches them.
    #[must_use]
    pub fn orphan_types(mut self, names: &[&str]) -> Self {
        self.orphan_types.extend(names.iter().map(|n| ArcStr::from(*n)));
        self
    }

    /// Registers a directive definition. A definition named like a built-in
    /// directive replaces it.
    #[must_use]
    pub fn directive(mut self, directive: impl Into<Arc<DirectiveType>>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Applies a directive to the schema itself.
    #[must_use]
    pub fn schema_directive(mut self, application: DirectiveApplication) -> Self {
        self.schema_directives.apply(application);
        self
    }

    /// Sets a schema-wide visibility check, combined with every member's own
    /// predicate.
    #[must_use]
    pub fn visible(
        mut self,
        f: impl Fn(Member<'_>, &Context) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hooks.visible = Some(Arc::new(f));
        self
    }

    /// Sets the loader of application objects for `loads` arguments.
    #[must_use]
    pub fn object_from_id<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue, &MetaType, &Context) -> R + Send + Sync + 'static,
        R: Into<Lazy<FieldResult<Option<FieldValue>>>>,
    {
        self.hooks.object_from_id = Some(Arc::new(move |id, ty, ctx| f(id, ty, ctx).into()));
        self
    }

    /// Sets the inverse of [`SchemaBuilder::object_from_id()`].
    #[must_use]
    pub fn id_from_object(
        mut self,
        f: impl Fn(&FieldValue, &MetaType, &Context) -> FieldResult<FieldValue> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.id_from_object = Some(Arc::new(f));
        self
    }

    /// Sets the fallback type resolution of abstract types.
    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&MetaType, &FieldValue, &Context) -> Option<ArcStr> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.resolve_type = Some(Arc::new(f));
        self
    }

    /// Decides what an unauthorized object turns into. By default it becomes
    /// a silent `null`.
    #[must_use]
    pub fn unauthorized_object<F, R>(mut self, f: F) -> Self
    where
        F: Fn(UnauthorizedError, &Context) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.hooks.unauthorized_object = Some(Arc::new(move |e, ctx| f(e, ctx).into()));
        self
    }

    /// Decides what an unauthorized field turns into. By default it becomes
    /// a silent `null`.
    #[must_use]
    pub fn unauthorized_field<F, R>(mut self, f: F) -> Self
    where
        F: Fn(UnauthorizedError, &Context) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.hooks.unauthorized_field = Some(Arc::new(move |e, ctx| f(e, ctx).into()));
        self
    }

    /// Decides what a failed `loads` lookup turns into. By default it becomes
    /// a field error.
    #[must_use]
    pub fn load_application_object_failed<F, R>(mut self, f: F) -> Self
    where
        F: Fn(LoadApplicationObjectFailedError, &Context) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.hooks.load_application_object_failed =
            Some(Arc::new(move |e, ctx| f(e, ctx).into()));
        self
    }

    /// Handles field errors whose source is an `E`. Later registrations are
    /// tried first.
    #[must_use]
    pub fn rescue_from<E, F, R>(mut self, f: F) -> Self
    where
        E: std::error::Error + 'static,
        F: Fn(&E, &Context) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.hooks.rescues.insert(
            0,
            Arc::new(move |err, ctx| err.downcast_ref::<E>().map(|e| f(e, ctx).into())),
        );
        self
    }

    /// Replaces the settings.
    #[must_use]
    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the definitions and freezes them into a [`Schema`].
    ///
    /// # Errors
    ///
    /// On the first definition-time error found.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let Self {
            description,
            query,
            mutation,
            subscription,
            mut types,
            orphan_types,
            directives: user_directives,
            schema_directives,
            hooks,
            config,
        } = self;

        for scalar in builtin_scalars() {
            if !types.iter().any(|t| t.name() == &scalar.name) {
                types.push(scalar.into_meta());
            }
        }
        types.extend(introspection::meta_types());

        let types_by_name = index_by_name(&types);
        flatten_interfaces(&mut types, &types_by_name)?;
        fill_deprecation_reasons(&mut types, &config.default_deprecation_reason);

        let directives = collect_directives(user_directives, &types, &schema_directives);
        let checker = Checker {
            types: &types,
            by_name: &types_by_name,
            directives: &directives,
        };
        let query_type_name = query.unwrap_or_else(|| arcstr::literal!("Query"));
        checker.root(OperationType::Query, &query_type_name)?;
        if let Some(name) = &mutation {
            checker.root(OperationType::Mutation, name)?;
        }
        if let Some(name) = &subscription {
            checker.root(OperationType::Subscription, name)?;
        }
        for ty in &types {
            checker.check_type(ty)?;
        }
        for d in &directives {
            for a in &d.arguments {
                checker.input_ref(&format!("@{}.{}", d.name, a.name), &a.arg_type)?;
            }
        }
        checker.apply("schema", DirectiveLocation::Schema, &schema_directives)?;
        for name in &orphan_types {
            if !types_by_name.contains_key(name) {
                return Err(SchemaError::InvalidTypeReference {
                    name: name.to_string(),
                    path: "orphan types".into(),
                });
            }
        }

        let possible = possible_types(&types);
        let schema = Schema(Arc::new(SchemaType {
            description,
            types: types.into_iter().map(Arc::new).collect(),
            types_by_name,
            possible,
            directives,
            query_type_name,
            mutation_type_name: mutation,
            subscription_type_name: subscription,
            orphan_types,
            schema_directives,
            hooks,
            config,
            profiles: RwLock::default(),
        }));

        check_defaults(&schema)?;
        tracing::debug!(
            types = schema.types.len(),
            directives = schema.directives.len(),
            "built schema",
        );
        schema.preload_profiles()?;
        Ok(schema)
    }
}

fn index_by_name(types: &[MetaType]) -> FnvHashMap<ArcStr, Vec<usize>> {
    let mut by_name = FnvHashMap::<ArcStr, Vec<usize>>::default();
    for (i, t) in types.iter().enumerate() {
        by_name.entry(t.name().clone()).or_default().push(i);
    }
    by_name
}

/// Gives every member deprecated without a reason the configured one.
fn fill_deprecation_reasons(types: &mut [MetaType], reason: &str) {
    let fill_arguments = |arguments: &mut Vec<Arc<Argument>>| {
        for a in arguments {
            if a.directives.get("deprecated").is_some() {
                Arc::make_mut(a).directives.fill_deprecation_reason(reason);
            }
        }
    };
    for t in types {
        match t {
            MetaType::Object(ObjectMeta { fields, .. })
            | MetaType::Interface(InterfaceMeta { fields, .. }) => {
                for f in fields {
                    if f.directives.get("deprecated").is_some() {
                        Arc::make_mut(f).directives.fill_deprecation_reason(reason);
                    }
                    if f.arguments.iter().any(|a| a.directives.get("deprecated").is_some()) {
                        fill_arguments(&mut Arc::make_mut(f).arguments);
                    }
                }
            }
            MetaType::InputObject(i) => fill_arguments(&mut i.input_fields),
            MetaType::Enum(e) => {
                for v in &mut e.values {
                    if v.directives.get("deprecated").is_some() {
                        Arc::make_mut(v).directives.fill_deprecation_reason(reason);
                    }
                }
            }
            MetaType::Scalar(_) | MetaType::Union(_) => {}
        }
    }
}

/// Expands interface lists transitively and copies interface fields into
/// the types that don't redefine them.
fn flatten_interfaces(
    types: &mut [MetaType],
    by_name: &FnvHashMap<ArcStr, Vec<usize>>,
) -> Result<(), SchemaError> {
    let mut declared = FnvHashMap::<ArcStr, Vec<ArcStr>>::default();
    let mut fields = FnvHashMap::<ArcStr, Vec<Arc<Field>>>::default();
    for t in types.iter() {
        if let MetaType::Interface(i) = t {
            declared
                .entry(i.name.clone())
                .or_default()
                .extend(i.interface_names.iter().cloned());
            fields
                .entry(i.name.clone())
                .or_default()
                .extend(i.fields.iter().cloned());
        }
    }

    for t in types.iter_mut() {
        let (name, interface_names, own_fields) = match t {
            MetaType::Object(o) => (&o.name, &mut o.interface_names, &mut o.fields),
            MetaType::Interface(i) => (&i.name, &mut i.interface_names, &mut i.fields),
            _ => continue,
        };
        let mut closure = Vec::<ArcStr>::new();
        let mut stack = interface_names.iter().rev().cloned().collect::<Vec<_>>();
        while let Some(next) = stack.pop() {
            if closure.contains(&next) || next == *name {
                continue;
            }
            if !by_name.contains_key(&next) {
                return Err(SchemaError::InvalidTypeReference {
                    name: next.to_string(),
                    path: name.to_string(),
                });
            }
            let Some(parents) = declared.get(&next) else {
                return Err(SchemaError::NotAnInterface {
                    type_name: name.to_string(),
                    interface: next.to_string(),
                });
            };
            stack.extend(parents.iter().rev().cloned());
            closure.push(next);
        }

        let own = own_fields.iter().map(|f| f.name.clone()).collect::<HashSet<_>>();
        let mut added = HashSet::new();
        for iface in &closure {
            let mut from_this = HashSet::new();
            for f in fields.get(iface).into_iter().flatten() {
                if own.contains(&f.name) || added.contains(&f.name) {
                    continue;
                }
                from_this.insert(f.name.clone());
                own_fields.push(Arc::clone(f));
            }
            added.extend(from_this);
        }
        *interface_names = closure;
    }
    Ok(())
}

/// Merges user directives over the built-in ones, then adds directives only
/// known through their applications.
fn collect_directives(
    user: Vec<Arc<DirectiveType>>,
    types: &[MetaType],
    schema_directives: &Directives,
) -> Vec<Arc<DirectiveType>> {
    let mut all = DirectiveType::built_ins();
    for d in user {
        all.retain(|b| !(b.is_builtin() && b.name == d.name));
        all.push(d);
    }

    let mut applied = Vec::new();
    push_applied(&mut applied, schema_directives);
    for t in types {
        push_applied(&mut applied, t.directives());
        for f in t.fields() {
            push_applied(&mut applied, &f.directives);
            for a in &f.arguments {
                push_applied(&mut applied, &a.directives);
            }
        }
        for a in t.input_fields() {
            push_applied(&mut applied, &a.directives);
        }
        for v in t.enum_values() {
            push_applied(&mut applied, &v.directives);
        }
    }
    for d in applied {
        if !all.iter().any(|known| known.name == d.name) {
            tracing::debug!(directive = d.name.as_str(), "registering applied directive");
            all.push(d);
        }
    }
    all
}

fn push_applied(out: &mut Vec<Arc<DirectiveType>>, directives: &Directives) {
    out.extend(directives.iter().map(|app| Arc::clone(app.definition())));
}

fn possible_types(types: &[MetaType]) -> FnvHashMap<ArcStr, Vec<ArcStr>> {
    let mut possible = FnvHashMap::<ArcStr, Vec<ArcStr>>::default();
    for t in types {
        match t {
            MetaType::Union(u) => {
                let entry = possible.entry(u.name.clone()).or_default();
                for m in &u.of_type_names {
                    if !entry.contains(m) {
                        entry.push(m.clone());
                    }
                }
            }
            MetaType::Object(_) | MetaType::Interface(_) => {
                for i in t.interface_names() {
                    let entry = possible.entry(i.clone()).or_default();
                    if !entry.contains(t.name()) {
                        entry.push(t.name().clone());
                    }
                }
            }
            _ => {}
        }
    }
    possible
}

struct Checker<'a> {
    types: &'a [MetaType],
    by_name: &'a FnvHashMap<ArcStr, Vec<usize>>,
    directives: &'a [Arc<DirectiveType>],
}

impl Checker<'_> {
    fn lookup(&self, name: &str) -> Option<&MetaType> {
        self.by_name
            .get(name)
            .and_then(|idx| idx.first())
            .and_then(|i| self.types.get(*i))
    }

    fn root(&self, operation: OperationType, name: &str) -> Result<(), SchemaError> {
        match self.lookup(name) {
            Some(MetaType::Object(_)) => Ok(()),
            _ => Err(SchemaError::MissingRoot {
                operation,
                name: name.into(),
            }),
        }
    }

    fn reference(&self, path: &str, ty: &Type) -> Result<&MetaType, SchemaError> {
        self.lookup(ty.innermost_name())
            .ok_or_else(|| SchemaError::InvalidTypeReference {
                name: ty.innermost_name().into(),
                path: path.into(),
            })
    }

    fn input_ref(&self, path: &str, ty: &Type) -> Result<(), SchemaError> {
        let meta = self.reference(path, ty)?;
        if meta.is_input() {
            Ok(())
        } else {
            Err(SchemaError::InvalidInputType {
                path: path.into(),
                type_name: meta.name().to_string(),
                kind: meta.kind().to_string(),
            })
        }
    }

    fn output_ref(&self, path: &str, ty: &Type) -> Result<(), SchemaError> {
        let meta = self.reference(path, ty)?;
        if meta.is_output() {
            Ok(())
        } else {
            Err(SchemaError::InvalidOutputType {
                path: path.into(),
                type_name: meta.name().to_string(),
                kind: meta.kind().to_string(),
            })
        }
    }

    /// Checks the directive applications of the member at `owner`.
    fn apply(
        &self,
        owner: &str,
        location: DirectiveLocation,
        applied: &Directives,
    ) -> Result<(), SchemaError> {
        for app in applied.iter() {
            let Some(definition) = self.directives.iter().find(|d| d.name == app.name()) else {
                continue;
            };
            if !definition.locations.contains(&location) {
                return Err(SchemaError::DirectiveLocation {
                    directive: definition.name.to_string(),
                    owner: owner.into(),
                    kind: location.as_str().into(),
                    locations: definition.locations.iter().map(|l| l.as_str()).join(", "),
                });
            }
        }
        Ok(())
    }

    fn argument(
        &self,
        path: &str,
        argument: &Argument,
        location: DirectiveLocation,
    ) -> Result<(), SchemaError> {
        self.input_ref(path, &argument.arg_type)?;
        self.apply(path, location, &argument.directives)?;
        if argument.deprecation_reason().is_some() && argument.is_required() {
            return Err(SchemaError::DeprecatedRequiredArgument { path: path.into() });
        }
        Ok(())
    }

    fn check_type(&self, ty: &MetaType) -> Result<(), SchemaError> {
        let name = ty.name();
        let location = match ty {
            MetaType::Scalar(_) => DirectiveLocation::Scalar,
            MetaType::Object(_) => DirectiveLocation::Object,
            MetaType::Interface(_) => DirectiveLocation::Interface,
            MetaType::Union(_) => DirectiveLocation::Union,
            MetaType::Enum(_) => DirectiveLocation::Enum,
            MetaType::InputObject(_) => DirectiveLocation::InputObject,
        };
        self.apply(name, location, ty.directives())?;
        self.unique(ty)?;

        for f in ty.fields() {
            let path = format!("{name}.{}", f.name);
            self.output_ref(&path, &f.field_type)?;
            self.apply(&path, DirectiveLocation::FieldDefinition, &f.directives)?;
            for a in &f.arguments {
                self.argument(
                    &format!("{path}.{}", a.name),
                    a,
                    DirectiveLocation::ArgumentDefinition,
                )?;
            }
        }
        match ty {
            MetaType::Union(u) => {
                for m in &u.of_type_names {
                    match self.lookup(m) {
                        None => {
                            return Err(SchemaError::InvalidTypeReference {
                                name: m.to_string(),
                                path: name.to_string(),
                            });
                        }
                        Some(MetaType::Object(_)) => {}
                        Some(_) => {
                            return Err(SchemaError::InvalidUnionMember {
                                union: name.to_string(),
                                member: m.to_string(),
                            });
                        }
                    }
                }
            }
            MetaType::InputObject(input) => {
                for a in &input.input_fields {
                    let path = format!("{name}.{}", a.name);
                    self.argument(&path, a, DirectiveLocation::InputFieldDefinition)?;
                    if input.is_one_of() {
                        if a.arg_type.is_non_null() {
                            return Err(SchemaError::OneOfRequiredArgument { argument: path });
                        }
                        if a.default_value.is_some() {
                            return Err(SchemaError::OneOfDefaultValue { argument: path });
                        }
                    }
                }
            }
            MetaType::Enum(_) => {
                for v in ty.enum_values() {
                    self.apply(
                        &format!("{name}.{}", v.name),
                        DirectiveLocation::EnumValue,
                        &v.directives,
                    )?;
                }
            }
            MetaType::Scalar(_) | MetaType::Object(_) | MetaType::Interface(_) => {}
        }
        Ok(())
    }

    /// Same-named definitions must each carry a visibility predicate, or
    /// they'd always be visible together.
    fn unique(&self, ty: &MetaType) -> Result<(), SchemaError> {
        let unconditional = self
            .by_name
            .get(ty.name())
            .into_iter()
            .flatten()
            .filter_map(|i| self.types.get(*i))
            .filter(|t| t.visibility().is_none())
            .count();
        let total = self.by_name.get(ty.name()).map_or(0, Vec::len);
        if total > 1 && unconditional > 1 {
            return Err(SchemaError::DuplicateDefinition {
                name: ty.name().to_string(),
            });
        }
        Ok(())
    }
}

fn check_defaults(schema: &Schema) -> Result<(), SchemaError> {
    let warden = schema.unfiltered_warden();
    for ty in schema.type_list() {
        for f in ty.fields() {
            for a in &f.arguments {
                check_default(&warden, &format!("{}.{}.{}", ty.name(), f.name, a.name), a)?;
            }
        }
        for a in ty.input_fields() {
            check_default(&warden, &format!("{}.{}", ty.name(), a.name), a)?;
        }
    }
    for d in schema.directive_list() {
        for a in &d.arguments {
            check_default(&warden, &format!("@{}.{}", d.name, a.name), a)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::SchemaBuilder;
    use crate::{
        ast::InputValue,
        schema::{
            directives::{DirectiveApplication, DirectiveLocation, DirectiveType},
            meta::{
                Argument, EnumMeta, Field, InputObjectMeta, InterfaceMeta, ObjectMeta, UnionMeta,
            },
            model::SchemaError,
        },
    };

    fn query() -> ObjectMeta {
        ObjectMeta::new("Query").field(Field::new("f", "Int"))
    }

    #[test]
    fn rejects_invalid_field_argument_defaults() {
        let err = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query").field(
                    Field::new("f1", "Int!")
                        .argument(Argument::new("arg1", "Int!").default_value(InputValue::Null)),
                ),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`Query.f1.arg1` has an invalid default value: `nil` isn't accepted by `Int!`; \
             update the default value or the argument type.",
        );
    }

    #[test]
    fn rejects_invalid_nested_and_directive_defaults() {
        let err = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("f1", "Int").argument(Argument::new("input", "InputObj"))),
            )
            .register(InputObjectMeta::new("InputObj").argument(
                Argument::new("arg1", "[String!]").default_value(vec![InputValue::Null]),
            ))
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`InputObj.arg1` has an invalid default value: `[nil]` isn't accepted by \
             `[String!]`; update the default value or the argument type.",
        );

        let err = SchemaBuilder::new()
            .query(query())
            .register(EnumMeta::new("Language").values(&["EN", "JA"]))
            .directive(
                DirectiveType::new("localize", &[DirectiveLocation::Field])
                    .argument(Argument::new("lang", "Language").default_value("ZH")),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`@localize.lang` has an invalid default value: `\"ZH\"` isn't accepted by \
             `Language`; update the default value or the argument type.",
        );
    }

    #[test]
    fn rejects_deprecated_required_arguments() {
        let err = SchemaBuilder::new()
            .query(query().field(Field::new("g", "Int").argument(Argument::new("i", "MyInput"))))
            .register(
                InputObjectMeta::new("MyInput")
                    .argument(Argument::new("foo", "String!").deprecated("gone")),
            )
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Required arguments cannot be deprecated: MyInput.foo.");
    }

    #[test]
    fn rejects_directives_outside_their_locations() {
        let only_objects = std::sync::Arc::new(DirectiveType::new("thing", &[DirectiveLocation::Object]));
        let err = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query").field(
                    Field::new("f", "Int").directive(DirectiveApplication::new(&only_objects)),
                ),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DirectiveLocation {
                directive: "thing".into(),
                owner: "Query.f".into(),
                kind: "FIELD_DEFINITION".into(),
                locations: "OBJECT".into(),
            },
        );
    }

    #[test]
    fn rejects_bad_references() {
        let err = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("f", "Missing")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidTypeReference { name, .. } if name == "Missing"));

        let err = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("f", "Int").argument(Argument::new("o", "Query"))),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input type for Query.f.o: Query. Must be scalar, enum, or input object, \
             not OBJECT.",
        );

        let err = SchemaBuilder::new()
            .query(query())
            .register(UnionMeta::new("U", &["Int"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidUnionMember { .. }));

        let err = SchemaBuilder::new().build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingRoot { .. }));
    }

    #[test]
    fn one_of_arguments_must_be_optional() {
        let err = SchemaBuilder::new()
            .query(query().field(Field::new("g", "Int").argument(Argument::new("i", "OneOf"))))
            .register(
                InputObjectMeta::new("OneOf")
                    .one_of()
                    .argument(Argument::new("a", "Int!")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::OneOfRequiredArgument { argument } if argument == "OneOf.a"));
    }

    #[test]
    fn flattens_interfaces_transitively() {
        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("c", "C")))
            .register(InterfaceMeta::new("A").field(Field::new("a", "Int")))
            .register(
                InterfaceMeta::new("B")
                    .interfaces(&["A"])
                    .field(Field::new("b", "Int")),
            )
            .register(
                ObjectMeta::new("C")
                    .interfaces(&["B", "A"])
                    .field(Field::new("b", "String")),
            )
            .build()
            .unwrap();

        let c = schema.type_by_name("C").unwrap();
        let names = c.interface_names().iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(names, ["B", "A"]);
        let fields = c
            .fields()
            .iter()
            .map(|f| format!("{}: {}", f.name, f.field_type))
            .collect::<Vec<_>>();
        assert_eq!(fields, ["b: String", "a: Int"]);
        let a = schema.type_by_name("A").unwrap();
        assert_eq!(
            schema.possible_type_names(a).iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["B", "C"],
        );
    }

    #[test]
    fn requires_visibility_to_tell_duplicates_apart() {
        let err = SchemaBuilder::new()
            .query(query())
            .register(ObjectMeta::new("Thing").field(Field::new("a", "Int")))
            .register(ObjectMeta::new("Thing").field(Field::new("b", "Int")))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateDefinition {
                name: "Thing".into()
            },
        );
    }
}
