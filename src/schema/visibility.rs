//! Per-request filtering of the schema's visible surface.

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use fnv::FnvHashMap;

use super::{
    directives::DirectiveType,
    meta::{Argument, EnumValue, Field, MetaType},
    model::{OperationType, SchemaType},
};
use crate::{ast::Type, executor::Context};

/// Visibility predicate of a single schema member.
///
/// Predicates compose with [`VisibilityPredicate::and()`] and
/// [`VisibilityPredicate::or()`].
#[derive(Clone)]
pub struct VisibilityPredicate(Arc<dyn Fn(&Context) -> bool + Send + Sync>);

impl VisibilityPredicate {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Visible when both predicates are.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::new(move |ctx| self.call(ctx) && other.call(ctx))
    }

    /// Visible when either predicate is.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(move |ctx| self.call(ctx) || other.call(ctx))
    }

    /// Visible when this predicate is not.
    #[must_use]
    pub fn not(self) -> Self {
        Self::new(move |ctx| !self.call(ctx))
    }

    pub(crate) fn and_maybe(existing: Option<Self>, new: Self) -> Option<Self> {
        Some(match existing {
            Some(e) => e.and(new),
            None => new,
        })
    }

    /// Evaluates this predicate.
    pub fn call(&self, ctx: &Context) -> bool {
        (self.0)(ctx)
    }
}

impl<F> From<F> for VisibilityPredicate
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl fmt::Debug for VisibilityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VisibilityPredicate(..)")
    }
}

/// Schema member handed to the schema-level visibility hook.
#[derive(Clone, Copy, Debug)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Member<'a> {
    Type(&'a MetaType),
    Field(&'a Field),
    Argument(&'a Argument),
    EnumValue(&'a EnumValue),
    Directive(&'a DirectiveType),
}

/// Error of a context in which several same-named definitions are visible.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display(
    "Found two visible definitions for `{duplicated_name}`: {}",
    definitions.join(", "),
)]
pub struct DuplicateNamesError {
    /// Fully qualified name of the duplicated member, such as `Query.f1`.
    pub duplicated_name: String,

    /// Descriptions of the competing definitions.
    pub definitions: Vec<String>,
}

/// Memoized visibility of one profile, or of one request without a profile.
///
/// Holds no reference back to the schema, so schemas can keep caches of
/// their profiles.
#[derive(Debug, Default)]
pub(crate) struct WardenCache {
    own: Mutex<FnvHashMap<usize, bool>>,
    reachable: OnceLock<Result<Reachability, DuplicateNamesError>>,
}

#[derive(Debug, Default)]
struct Reachability {
    types: HashSet<ArcStr>,
}

fn addr<T: ?Sized>(v: &T) -> usize {
    std::ptr::from_ref(v).cast::<()>() as usize
}

/// Visibility-filtering view over a schema.
///
/// Every query through a [`Warden`] sees only the members visible in its
/// context. Predicates are evaluated at most once per member.
#[derive(Clone)]
pub struct Warden {
    schema: Arc<SchemaType>,
    cache: Arc<WardenCache>,
    context: Context,
    unfiltered: bool,
}

impl fmt::Debug for Warden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warden")
            .field("profile", &self.context.visibility_profile())
            .field("unfiltered", &self.unfiltered)
            .finish_non_exhaustive()
    }
}

impl Warden {
    pub(crate) fn new(schema: Arc<SchemaType>, cache: Arc<WardenCache>, context: Context) -> Self {
        Self {
            schema,
            cache,
            context,
            unfiltered: false,
        }
    }

    /// A view where every member is visible.
    pub(crate) fn unfiltered(schema: Arc<SchemaType>) -> Self {
        Self {
            schema,
            cache: Arc::default(),
            context: Context::default(),
            unfiltered: true,
        }
    }

    /// The underlying schema.
    pub fn schema(&self) -> &SchemaType {
        &self.schema
    }

    /// Context the predicates are evaluated in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    fn own_visible(&self, key: usize, member: Member<'_>) -> bool {
        if self.unfiltered {
            return true;
        }
        let mut own = self.cache.own.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(v) = own.get(&key) {
            return *v;
        }
        let predicate = match member {
            Member::Type(t) => t.visibility(),
            Member::Field(f) => f.visibility.as_ref(),
            Member::Argument(a) => a.visibility.as_ref(),
            Member::EnumValue(v) => v.visibility.as_ref(),
            Member::Directive(d) => d.visibility.as_ref(),
        };
        let visible = predicate.is_none_or(|p| p.call(&self.context))
            && self.schema.hooks.visible.as_ref().is_none_or(|v| v(member, &self.context));
        own.insert(key, visible);
        visible
    }

    fn own_type(&self, t: &Arc<MetaType>) -> bool {
        t.is_introspection() || self.own_visible(addr(&**t), Member::Type(t))
    }

    fn own_field(&self, f: &Arc<Field>) -> bool {
        self.own_visible(addr(&**f), Member::Field(f))
    }

    fn own_argument(&self, a: &Arc<Argument>) -> bool {
        self.own_visible(addr(&**a), Member::Argument(a))
    }

    fn own_enum_value(&self, v: &Arc<EnumValue>) -> bool {
        self.own_visible(addr(&**v), Member::EnumValue(v))
    }

    /// Single definition named `name` whose own predicate passes, if any.
    fn candidate_type(&self, name: &str) -> Result<Option<&Arc<MetaType>>, DuplicateNamesError> {
        let mut found = self
            .schema
            .definitions_named(name)
            .filter(|t| self.own_type(t));
        let Some(first) = found.next() else {
            return Ok(None);
        };
        if self.unfiltered {
            return Ok(Some(first));
        }
        let rest = found.collect::<Vec<_>>();
        if rest.is_empty() {
            Ok(Some(first))
        } else {
            Err(DuplicateNamesError {
                duplicated_name: name.to_owned(),
                definitions: std::iter::once(first)
                    .chain(rest)
                    .map(|t| describe_type(t))
                    .collect(),
            })
        }
    }

    fn type_ref_candidate(&self, ty: &Type) -> bool {
        matches!(self.candidate_type(ty.innermost_name()), Ok(Some(_)))
    }

    fn candidate_argument(&self, a: &Arc<Argument>) -> bool {
        self.own_argument(a) && self.type_ref_candidate(&a.arg_type)
    }

    fn candidate_field(&self, f: &Arc<Field>) -> bool {
        self.own_field(f)
            && self.type_ref_candidate(&f.field_type)
            && f
                .arguments
                .iter()
                .filter(|a| a.is_required())
                .all(|a| self.candidate_argument(a))
    }

    fn reachability(&self) -> Result<&Reachability, DuplicateNamesError> {
        self.cache
            .reachable
            .get_or_init(|| self.compute_reachability())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_reachability(&self) -> Result<Reachability, DuplicateNamesError> {
        let mut hidden_abstract = HashSet::<ArcStr>::new();
        loop {
            let types = self.walk(&hidden_abstract)?;
            let mut newly_hidden = false;
            for name in &types {
                let Some(t) = self.candidate_type(name)? else {
                    continue;
                };
                if t.is_abstract()
                    && !self.schema.is_orphan(name)
                    && !self
                        .schema
                        .possible_type_names(t)
                        .iter()
                        .any(|p| types.contains(p))
                {
                    newly_hidden |= hidden_abstract.insert(name.clone());
                }
            }
            if !newly_hidden {
                tracing::debug!(types = types.len(), "computed visible types");
                return Ok(Reachability { types });
            }
        }
    }

    fn walk(&self, hidden: &HashSet<ArcStr>) -> Result<HashSet<ArcStr>, DuplicateNamesError> {
        let schema = &self.schema;
        let mut queue = Vec::<ArcStr>::new();
        queue.extend(schema.root_names());
        queue.extend(schema.orphan_types.iter().cloned());
        queue.extend(
            schema
                .types
                .iter()
                .filter(|t| t.is_introspection())
                .map(|t| t.name().clone()),
        );
        for d in &schema.directives {
            if self.own_visible(addr(&**d), Member::Directive(d)) {
                for a in &d.arguments {
                    if self.own_argument(a) {
                        queue.push(a.arg_type.innermost_name().into());
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        while let Some(name) = queue.pop() {
            if seen.contains(&name) || hidden.contains(&name) {
                continue;
            }
            let Some(t) = self.candidate_type(&name)? else {
                continue;
            };
            seen.insert(name.clone());
            match &**t {
                MetaType::Object(_) | MetaType::Interface(_) => {
                    for f in t.fields() {
                        if !self.candidate_field(f) || hidden.contains(f.field_type.innermost_name()) {
                            continue;
                        }
                        queue.push(f.field_type.innermost_name().into());
                        for a in &f.arguments {
                            if self.own_argument(a) {
                                queue.push(a.arg_type.innermost_name().into());
                            }
                        }
                    }
                    queue.extend(t.interface_names().iter().cloned());
                    if matches!(&**t, MetaType::Interface(_)) {
                        queue.extend(schema.possible_type_names(t).iter().cloned());
                    }
                }
                MetaType::Union(u) => queue.extend(u.of_type_names.iter().cloned()),
                MetaType::InputObject(i) => {
                    for a in &i.input_fields {
                        if self.own_argument(a) {
                            queue.push(a.arg_type.innermost_name().into());
                        }
                    }
                }
                MetaType::Scalar(_) | MetaType::Enum(_) => {}
            }
        }
        Ok(seen)
    }

    fn is_reachable(&self, name: &str) -> Result<bool, DuplicateNamesError> {
        if self.unfiltered {
            return Ok(true);
        }
        Ok(self.reachability()?.types.contains(name))
    }

    /// Computes the visible surface right away: every visible type and its
    /// visible fields, arguments, input fields and enum values.
    ///
    /// # Errors
    ///
    /// If two same-named members are visible anywhere in that surface.
    pub fn preload(&self) -> Result<(), DuplicateNamesError> {
        for ty in self.types()? {
            for field in self.fields(ty)? {
                self.arguments(&field.path(), &field.arguments)?;
            }
            self.arguments(ty.name(), ty.input_fields())?;
            self.enum_values(ty)?;
        }
        for d in self.directives() {
            self.arguments(&format!("@{}", d.name), &d.arguments)?;
        }
        Ok(())
    }

    /// Looks a visible type up by name.
    ///
    /// # Errors
    ///
    /// If several definitions named `name` are visible.
    pub fn get_type(&self, name: &str) -> Result<Option<&Arc<MetaType>>, DuplicateNamesError> {
        let Some(t) = self.candidate_type(name)? else {
            return Ok(None);
        };
        Ok(self.is_reachable(name)?.then_some(t))
    }

    /// Indicates whether a type named `name` is visible.
    pub fn is_visible_type(&self, name: &str) -> bool {
        matches!(self.get_type(name), Ok(Some(_)))
    }

    /// Every visible type, in registration order.
    ///
    /// # Errors
    ///
    /// If several same-named types are visible.
    pub fn types(&self) -> Result<Vec<&Arc<MetaType>>, DuplicateNamesError> {
        let mut out = Vec::new();
        let mut names = HashSet::new();
        for t in &self.schema.types {
            if !names.insert(t.name().clone()) {
                continue;
            }
            if let Some(t) = self.get_type(t.name())? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Root type of the given operation kind, if any.
    pub fn root_type(&self, op: OperationType) -> Option<&Arc<MetaType>> {
        let name = self.schema.root_name(op)?;
        self.get_type(name).ok().flatten()
    }

    /// Visible fields of a type, in definition order.
    ///
    /// # Errors
    ///
    /// If several same-named fields are visible.
    pub fn fields<'s>(&'s self, ty: &'s MetaType) -> Result<Vec<&'s Arc<Field>>, DuplicateNamesError> {
        let visible = ty
            .fields()
            .iter()
            .filter(|f| self.field_visible(f))
            .collect::<Vec<_>>();
        ensure_unique(ty.name(), &visible, |f| &f.name, |f| describe_field(f))?;
        Ok(visible)
    }

    fn field_visible(&self, f: &Arc<Field>) -> bool {
        if self.unfiltered {
            return true;
        }
        self.candidate_field(f)
            && self.is_visible_type(f.field_type.innermost_name())
            && f
                .arguments
                .iter()
                .filter(|a| a.is_required())
                .all(|a| self.argument_visible(a))
    }

    /// Looks a visible field of a type up by name.
    ///
    /// # Errors
    ///
    /// If several fields named `name` are visible.
    pub fn get_field<'s>(
        &'s self,
        ty: &'s MetaType,
        name: &str,
    ) -> Result<Option<&'s Arc<Field>>, DuplicateNamesError> {
        let visible = ty
            .fields()
            .iter()
            .filter(|f| f.name == name && self.field_visible(f))
            .collect::<Vec<_>>();
        ensure_unique(ty.name(), &visible, |f| &f.name, |f| describe_field(f))?;
        Ok(visible.first().copied())
    }

    fn argument_visible(&self, a: &Arc<Argument>) -> bool {
        self.unfiltered
            || (self.own_argument(a) && self.is_visible_type(a.arg_type.innermost_name()))
    }

    /// Visible arguments out of `arguments`, whose owner is named `owner`
    /// for error reporting.
    ///
    /// # Errors
    ///
    /// If several same-named arguments are visible.
    pub fn arguments<'s>(
        &self,
        owner: &str,
        arguments: &'s [Arc<Argument>],
    ) -> Result<Vec<&'s Arc<Argument>>, DuplicateNamesError> {
        let visible = arguments
            .iter()
            .filter(|a| self.argument_visible(a))
            .collect::<Vec<_>>();
        ensure_unique(owner, &visible, |a| &a.name, |a| describe_argument(a))?;
        Ok(visible)
    }

    /// Visible values of an enum, in definition order.
    ///
    /// # Errors
    ///
    /// If several same-named values are visible.
    pub fn enum_values<'s>(
        &self,
        ty: &'s MetaType,
    ) -> Result<Vec<&'s Arc<EnumValue>>, DuplicateNamesError> {
        let visible = ty
            .enum_values()
            .iter()
            .filter(|v| self.unfiltered || self.own_enum_value(v))
            .collect::<Vec<_>>();
        ensure_unique(ty.name(), &visible, |v| &v.name, |v| format!("{}.{}", ty.name(), v.name))?;
        Ok(visible)
    }

    /// Visible object types an abstract type may resolve to. A concrete
    /// object is its own single possible type.
    pub fn possible_types(&self, ty: &MetaType) -> Vec<&Arc<MetaType>> {
        match ty {
            MetaType::Object(o) => self.get_type(&o.name).ok().flatten().into_iter().collect(),
            _ => self
                .schema
                .possible_type_names(ty)
                .iter()
                .filter_map(|n| self.get_type(n).ok().flatten())
                .filter(|t| matches!(&***t, MetaType::Object(_)))
                .collect(),
        }
    }

    /// Indicates whether `name` is a visible possible type of `ty`.
    pub fn is_possible_type(&self, ty: &MetaType, name: &str) -> bool {
        self.possible_types(ty).iter().any(|t| t.name() == name)
    }

    /// Visible interfaces implemented by an object or an interface.
    pub fn interfaces(&self, ty: &MetaType) -> Vec<&Arc<MetaType>> {
        ty.interface_names()
            .iter()
            .filter_map(|n| self.get_type(n).ok().flatten())
            .collect()
    }

    /// Visible directive definitions.
    pub fn directives(&self) -> Vec<&Arc<DirectiveType>> {
        self.schema
            .directives
            .iter()
            .filter(|d| self.unfiltered || self.own_visible(addr(&***d), Member::Directive(d)))
            .collect()
    }

    /// Looks a visible directive definition up by name.
    pub fn get_directive(&self, name: &str) -> Option<&Arc<DirectiveType>> {
        self.directives().into_iter().find(|d| d.name == name)
    }
}

fn ensure_unique<T>(
    owner: &str,
    members: &[&Arc<T>],
    name_of: impl Fn(&T) -> &ArcStr,
    describe: impl Fn(&T) -> String,
) -> Result<(), DuplicateNamesError> {
    for (i, m) in members.iter().enumerate() {
        let name = name_of(m);
        let dups = members[i..]
            .iter()
            .filter(|o| name_of(o) == name)
            .collect::<Vec<_>>();
        if dups.len() > 1 {
            return Err(DuplicateNamesError {
                duplicated_name: format!("{owner}.{name}"),
                definitions: dups.iter().map(|d| describe(d)).collect(),
            });
        }
    }
    Ok(())
}

fn describe_type(t: &MetaType) -> String {
    format!("{} {}", t.kind(), t.name())
}

fn describe_field(f: &Field) -> String {
    format!("{}: {}", f.path(), f.field_type)
}

fn describe_argument(a: &Argument) -> String {
    format!("{}: {}", a.name, a.arg_type)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use pretty_assertions::assert_eq;

    use crate::{
        Context,
        schema::{
            builder::SchemaBuilder,
            meta::{Argument, EnumMeta, EnumValue, Field, InterfaceMeta, ObjectMeta, UnionMeta},
        },
    };

    fn future(ctx: &Context) -> bool {
        ctx.flag("future_schema")
    }

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(&Context) -> bool + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn evaluates_each_predicate_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("thing", "Thing").visible(counting(&calls)))
                    .field(Field::new("other", "Thing")),
            )
            .register(
                ObjectMeta::new("Thing")
                    .visible(counting(&calls))
                    .field(Field::new("name", "String").visible(counting(&calls))),
            )
            .build()
            .unwrap();

        let warden = schema.warden(&Context::new()).unwrap();
        for _ in 0..3 {
            let query = warden.get_type("Query").unwrap().unwrap();
            assert_eq!(warden.fields(query).unwrap().len(), 2);
            let thing = warden.get_type("Thing").unwrap().unwrap();
            assert_eq!(warden.fields(thing).unwrap().len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn hides_fields_whose_type_or_required_arguments_are_hidden() {
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("secret", "Secret"))
                    .field(
                        Field::new("needs_arg", "Int")
                            .argument(Argument::new("hidden", "Int!").visible(|_: &Context| false)),
                    )
                    .field(
                        Field::new("optional_arg", "Int")
                            .argument(Argument::new("hidden", "Int").visible(|_: &Context| false)),
                    ),
            )
            .register(ObjectMeta::new("Secret").visible(|_: &Context| false))
            .build()
            .unwrap();

        let warden = schema.warden(&Context::new()).unwrap();
        let query = warden.get_type("Query").unwrap().unwrap();
        let names = warden
            .fields(query)
            .unwrap()
            .iter()
            .map(|f| f.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["optionalArg"]);
        assert!(warden.get_type("Secret").unwrap().is_none());
        let optional = warden.get_field(query, "optionalArg").unwrap().unwrap();
        assert!(warden.arguments("Query.optionalArg", &optional.arguments).unwrap().is_empty());
    }

    #[test]
    fn unreferenced_types_are_hidden_unless_orphan() {
        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("a", "Int")))
            .register(ObjectMeta::new("Lonely").field(Field::new("a", "Int")))
            .register(ObjectMeta::new("Extra").field(Field::new("a", "Int")))
            .orphan_types(&["Extra"])
            .build()
            .unwrap();

        let warden = schema.warden(&Context::new()).unwrap();
        assert!(!warden.is_visible_type("Lonely"));
        assert!(warden.is_visible_type("Extra"));
        assert!(warden.is_visible_type("Int"));
    }

    #[test]
    fn abstract_types_without_visible_members_are_hidden() {
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("node", "Node"))
                    .field(Field::new("thing", "Thing"))
                    .field(Field::new("kept", "Kept")),
            )
            .register(InterfaceMeta::new("Node").field(Field::new("id", "ID!")))
            .register(
                ObjectMeta::new("Hidden")
                    .interfaces(&["Node"])
                    .field(Field::new("id", "ID!"))
                    .visible(|_: &Context| false),
            )
            .register(UnionMeta::new("Thing", &["Hidden"]))
            .register(UnionMeta::new("Kept", &["Hidden"]))
            .orphan_types(&["Kept"])
            .build()
            .unwrap();

        let warden = schema.warden(&Context::new()).unwrap();
        assert!(!warden.is_visible_type("Node"));
        assert!(!warden.is_visible_type("Thing"));
        let kept = warden.get_type("Kept").unwrap().unwrap();
        assert!(warden.possible_types(kept).is_empty());
        let query = warden.get_type("Query").unwrap().unwrap();
        assert_eq!(warden.fields(query).unwrap().len(), 1);
    }

    #[test]
    fn reports_duplicate_names() {
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("f1", "Int").visible(future))
                    .field(Field::new("f1", "String")),
            )
            .build()
            .unwrap();

        let current = schema.warden(&Context::new()).unwrap();
        let query = current.get_type("Query").unwrap().unwrap();
        assert_eq!(current.fields(query).unwrap().len(), 1);

        let both = schema
            .warden(&Context::new().with_value("future_schema", true))
            .unwrap();
        let query = both.get_type("Query").unwrap().unwrap();
        let err = both.fields(query).unwrap_err();
        assert_eq!(err.duplicated_name, "Query.f1");
        assert_eq!(
            err.to_string(),
            "Found two visible definitions for `Query.f1`: Query.f1: Int, Query.f1: String",
        );
    }

    #[test]
    fn filters_enum_values() {
        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("lang", "Language")))
            .register(
                EnumMeta::new("Language")
                    .value(EnumValue::new("PYTHON"))
                    .value(EnumValue::new("RUST").visible(future)),
            )
            .build()
            .unwrap();

        let warden = schema.warden(&Context::new()).unwrap();
        let lang = warden.get_type("Language").unwrap().unwrap();
        assert_eq!(warden.enum_values(lang).unwrap().len(), 1);
    }

    #[test]
    fn preload_walks_the_whole_surface() {
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query").field(
                    Field::new("search", "Language")
                        .argument(Argument::new("term", "String"))
                        .argument(Argument::new("term", "Int").visible(future)),
                ),
            )
            .register(EnumMeta::new("Language").value(EnumValue::new("RUST")))
            .build()
            .unwrap();
        schema.warden(&Context::new()).unwrap().preload().unwrap();
        let err = schema
            .warden(&Context::new().with_value("future_schema", true))
            .unwrap()
            .preload()
            .unwrap_err();
        assert_eq!(err.duplicated_name, "Query.search.term");

        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("lang", "Language")))
            .register(
                EnumMeta::new("Language")
                    .value(EnumValue::new("RUST"))
                    .value(EnumValue::new("RUST").visible(future)),
            )
            .build()
            .unwrap();
        schema.warden(&Context::new()).unwrap().preload().unwrap();
        let err = schema
            .warden(&Context::new().with_value("future_schema", true))
            .unwrap()
            .preload()
            .unwrap_err();
        assert_eq!(err.duplicated_name, "Language.RUST");
    }
}
