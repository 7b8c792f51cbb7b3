//! Walks an operation over the schema, producing the response tree.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use arcstr::ArcStr;
use futures::{
    FutureExt as _,
    future::{BoxFuture, join_all},
};
use graphql_parser::{
    Pos,
    query::{
        self, Definition, Directive, FragmentDefinition, OperationDefinition, Selection,
        SelectionSet, TypeCondition, VariableDefinition,
    },
};
use indexmap::IndexMap;
use itertools::Itertools as _;

use super::{
    Context, Dataloader, ExecutionError, Extra, FieldError, FieldValue, LookAhead, Outcome,
    PathSegment, ResolverContext, pipeline,
};
use crate::{
    GraphQLError,
    ast::{InputValue, Type, Variables},
    introspection,
    parser::{Document, SourcePosition},
    schema::{
        meta::{Field, MetaType},
        model::OperationType,
        visibility::Warden,
    },
    types::coercion::{Problem, coerce_arguments, coerce_leaf_result, coerce_value},
    value::{Object, ScalarValue, Value},
};

pub(crate) type Fragments<'a> = HashMap<&'a str, &'a FragmentDefinition<'static, String>>;

/// Operation selected out of a document.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Operation<'a> {
    pub(crate) kind: OperationType,
    pub(crate) name: Option<&'a str>,
    pub(crate) variable_definitions: &'a [VariableDefinition<'static, String>],
    pub(crate) selection_set: &'a SelectionSet<'static, String>,
    pub(crate) position: Pos,
}

/// Selects the operation to run.
pub(crate) fn find_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<Operation<'a>, GraphQLError> {
    let mut operations = document.definitions.iter().filter_map(|d| match d {
        Definition::Operation(op) => Some(operation_of(op)),
        Definition::Fragment(_) => None,
    });
    match operation_name {
        Some(name) => operations
            .find(|op| op.name == Some(name))
            .ok_or(GraphQLError::UnknownOperationName),
        None => {
            let first = operations.next().ok_or(GraphQLError::NoOperationProvided)?;
            if operations.next().is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }
            Ok(first)
        }
    }
}

pub(crate) fn operation_of<'a>(op: &'a OperationDefinition<'static, String>) -> Operation<'a> {
    match op {
        OperationDefinition::SelectionSet(s) => Operation {
            kind: OperationType::Query,
            name: None,
            variable_definitions: &[],
            selection_set: s,
            position: s.span.0,
        },
        OperationDefinition::Query(q) => Operation {
            kind: OperationType::Query,
            name: q.name.as_deref(),
            variable_definitions: &q.variable_definitions,
            selection_set: &q.selection_set,
            position: q.position,
        },
        OperationDefinition::Mutation(m) => Operation {
            kind: OperationType::Mutation,
            name: m.name.as_deref(),
            variable_definitions: &m.variable_definitions,
            selection_set: &m.selection_set,
            position: m.position,
        },
        OperationDefinition::Subscription(s) => Operation {
            kind: OperationType::Subscription,
            name: s.name.as_deref(),
            variable_definitions: &s.variable_definitions,
            selection_set: &s.selection_set,
            position: s.position,
        },
    }
}

/// Coerces the provided variables against their definitions, filling in
/// defaults.
///
/// The coerced map keeps external values: arguments referencing variables are
/// coerced again along with the literals around them.
pub(crate) fn coerce_variables(
    warden: &Warden,
    operation: &Operation<'_>,
    given: &Variables,
    ctx: &Context,
) -> Result<Variables, Vec<ExecutionError>> {
    let mut coerced = Variables::new();
    let mut errors = Vec::new();
    for def in operation.variable_definitions {
        let ty = Type::from(&def.var_type);
        let location = SourcePosition::from(def.position);
        let value = match (given.get(&def.name), &def.default_value) {
            (Some(v), _) => v.clone(),
            (None, Some(default)) => InputValue::from_parsed(default),
            (None, None) => {
                if ty.is_non_null() {
                    let problem = Problem::new("Expected value to not be null");
                    errors.push(variable_error(&def.name, &ty, &InputValue::Null, &[problem], location));
                }
                continue;
            }
        };
        match coerce_value(warden, &ty, &value, ctx) {
            Ok(_) => {
                coerced.insert(def.name.clone(), value);
            }
            Err(problems) => errors.push(variable_error(&def.name, &ty, &value, &problems, location)),
        }
    }
    if errors.is_empty() { Ok(coerced) } else { Err(errors) }
}

fn variable_error(
    name: &str,
    ty: &Type,
    value: &InputValue,
    problems: &[Problem],
    location: SourcePosition,
) -> ExecutionError {
    let mut message = format!("Variable ${name} of type {ty} was provided invalid value");
    let located = problems
        .iter()
        .filter(|p| !p.path.is_empty())
        .map(|p| format!("{} ({})", p.path.iter().join("."), p.explanation))
        .collect::<Vec<_>>();
    if !located.is_empty() {
        message.push_str(" for ");
        message.push_str(&located.join(", "));
    }
    let mut extensions = Object::with_capacity(2);
    extensions.add_field("value", value.to_value());
    extensions.add_field(
        "problems",
        Value::List(problems.iter().map(Problem::to_value).collect()),
    );
    ExecutionError::new(location, Vec::new(), FieldError::new(message, Value::Object(extensions)))
}

/// Indicates whether `@skip` or `@include` exclude a selection.
pub(crate) fn is_excluded(directives: &[Directive<'static, String>], variables: &Variables) -> bool {
    directives.iter().any(|d| {
        let condition = d
            .arguments
            .iter()
            .find(|(k, _)| k == "if")
            .and_then(|(_, v)| InputValue::from_parsed(v).into_const(variables))
            .and_then(|v| v.as_scalar().and_then(ScalarValue::as_bool))
            .unwrap_or(false);
        (d.name == "skip" && condition) || (d.name == "include" && !condition)
    })
}

/// Response of one operation run.
#[derive(Debug)]
pub(crate) struct ExecutionOutput {
    pub(crate) data: Value,
    pub(crate) errors: Vec<ExecutionError>,
    pub(crate) no_update: bool,
}

/// A `null` that has to replace the closest nullable parent.
///
/// The error explaining it, if any, is recorded already.
#[derive(Debug)]
struct Propagate;

type Completed = Result<Value, Propagate>;

/// Where a value is being completed.
struct Site<'b> {
    owner: &'b MetaType,
    field: &'b Arc<Field>,
    nodes: &'b [&'b query::Field<'static, String>],
}

impl Site<'_> {
    fn location(&self) -> SourcePosition {
        self.nodes
            .first()
            .map(|n| SourcePosition::from(n.position))
            .unwrap_or_default()
    }
}

pub(crate) struct Executor<'a> {
    pub(crate) warden: &'a Warden,
    fragments: Fragments<'a>,
    pub(crate) variables: &'a Variables,
    pub(crate) context: &'a Context,
    dataloader: Dataloader,
    errors: Mutex<Vec<ExecutionError>>,
    no_update: AtomicBool,
    operation: OperationType,
}

/// Runs a validated operation with coerced variables.
pub(crate) async fn execute_operation(
    warden: &Warden,
    document: &Document,
    operation: &Operation<'_>,
    variables: &Variables,
    context: &Context,
) -> ExecutionOutput {
    let executor = Executor {
        warden,
        fragments: document
            .definitions
            .iter()
            .filter_map(|d| match d {
                Definition::Fragment(f) => Some((f.name.as_str(), f)),
                Definition::Operation(_) => None,
            })
            .collect(),
        variables,
        context,
        dataloader: Dataloader::new(),
        errors: Mutex::new(Vec::new()),
        no_update: AtomicBool::new(false),
        operation: operation.kind,
    };

    let data = match warden.root_type(operation.kind) {
        Some(root) => {
            let serial = operation.kind == OperationType::Mutation;
            executor
                .resolve_object(
                    root,
                    context.root_value().clone(),
                    vec![operation.selection_set],
                    Vec::new(),
                    Vec::new(),
                    serial,
                )
                .await
                .map_or(Value::Null, Value::Object)
        }
        None => {
            executor.errors_mut().push(ExecutionError::new(
                operation.position.into(),
                Vec::new(),
                FieldError::from(format!("Schema is not configured for {}s", operation.kind)),
            ));
            Value::Null
        }
    };

    let mut errors = executor
        .errors
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    errors.sort();
    ExecutionOutput {
        data,
        errors,
        no_update: executor.no_update.load(Ordering::Relaxed),
    }
}

impl<'a> Executor<'a> {
    fn errors_mut(&self) -> std::sync::MutexGuard<'_, Vec<ExecutionError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push_error(
        &self,
        location: SourcePosition,
        path: &[PathSegment],
        order: &[usize],
        error: FieldError,
    ) {
        let error = ExecutionError::new(location, path.to_vec(), error).ordered(order.to_vec());
        self.errors_mut().push(error);
    }

    /// Indicates whether `ty` answers a fragment on `condition`.
    fn fragment_applies(&self, ty: &MetaType, condition: &str) -> bool {
        condition == ty.name().as_str()
            || self
                .warden
                .get_type(condition)
                .ok()
                .flatten()
                .is_some_and(|c| c.is_abstract() && self.warden.is_possible_type(c, ty.name()))
    }

    fn collect_fields(
        &self,
        ty: &MetaType,
        selection_set: &'a SelectionSet<'static, String>,
        out: &mut IndexMap<&'a str, Vec<&'a query::Field<'static, String>>>,
        visited: &mut HashSet<&'a str>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(f) => {
                    if is_excluded(&f.directives, self.variables) {
                        continue;
                    }
                    let key = f.alias.as_deref().unwrap_or(&f.name);
                    out.entry(key).or_default().push(f);
                }
                Selection::FragmentSpread(spread) => {
                    if is_excluded(&spread.directives, self.variables)
                        || !visited.insert(spread.fragment_name.as_str())
                    {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(spread.fragment_name.as_str()) else {
                        continue;
                    };
                    let TypeCondition::On(on) = &fragment.type_condition;
                    if self.fragment_applies(ty, on) {
                        self.collect_fields(ty, &fragment.selection_set, out, visited);
                    }
                }
                Selection::InlineFragment(inline) => {
                    if is_excluded(&inline.directives, self.variables) {
                        continue;
                    }
                    let applies = match &inline.type_condition {
                        Some(TypeCondition::On(on)) => self.fragment_applies(ty, on),
                        None => true,
                    };
                    if applies {
                        self.collect_fields(ty, &inline.selection_set, out, visited);
                    }
                }
            }
        }
    }

    fn resolve_object<'b>(
        &'b self,
        ty: &'b Arc<MetaType>,
        object: FieldValue,
        selection_sets: Vec<&'a SelectionSet<'static, String>>,
        path: Vec<PathSegment>,
        order: Vec<usize>,
        serial: bool,
    ) -> BoxFuture<'b, Result<Object, Propagate>> {
        async move {
            let mut grouped = IndexMap::new();
            let mut visited = HashSet::new();
            for set in selection_sets {
                self.collect_fields(ty, set, &mut grouped, &mut visited);
            }
            let entries = grouped.into_iter().collect::<Vec<_>>();

            let results = if serial {
                let mut results = Vec::with_capacity(entries.len());
                for (i, entry) in entries.iter().enumerate() {
                    results.push(self.resolve_entry(ty, &object, entry, &path, (&order, i)).await);
                }
                results
            } else {
                join_all(
                    entries
                        .iter()
                        .enumerate()
                        .map(|(i, entry)| self.resolve_entry(ty, &object, entry, &path, (&order, i))),
                )
                .await
            };

            let mut out = Object::with_capacity(entries.len());
            for ((key, _), value) in entries.iter().zip(results) {
                out.add_field(*key, value?);
            }
            Ok(out)
        }
        .boxed()
    }

    fn resolve_entry<'b>(
        &'b self,
        ty: &'b Arc<MetaType>,
        object: &'b FieldValue,
        (key, nodes): &'b (&'a str, Vec<&'a query::Field<'static, String>>),
        path: &'b [PathSegment],
        (order, index): (&'b [usize], usize),
    ) -> BoxFuture<'b, Completed> {
        async move {
            let mut path = path.to_vec();
            path.push(PathSegment::Field((*key).into()));
            let mut order = order.to_vec();
            order.push(index);
            let Some(node) = nodes.first() else {
                return Ok(Value::Null);
            };
            let location = SourcePosition::from(node.position);

            if node.name == "__typename" {
                return Ok(Value::scalar(ty.name().as_str()));
            }
            let field = match introspection::field_of(self.warden, ty, &node.name) {
                Ok(Some(f)) => f,
                Ok(None) => {
                    let message = format!("Field '{}' doesn't exist on type '{}'", node.name, ty.name());
                    self.push_error(location, &path, &order, FieldError::from(message));
                    return Ok(Value::Null);
                }
                Err(e) => {
                    self.push_error(location, &path, &order, FieldError::from(e));
                    return Ok(Value::Null);
                }
            };
            self.resolve_field(ty, &field, object, nodes, path, order).await
        }
        .boxed()
    }

    async fn resolve_field(
        &self,
        owner: &Arc<MetaType>,
        field: &Arc<Field>,
        object: &FieldValue,
        nodes: &[&'a query::Field<'static, String>],
        path: Vec<PathSegment>,
        order: Vec<usize>,
    ) -> Completed {
        let site = Site { owner, field, nodes };
        let Some(node) = nodes.first() else {
            return Ok(Value::Null);
        };
        let location = site.location();
        let given = node
            .arguments
            .iter()
            .map(|(k, v)| (k.clone(), InputValue::from_parsed(v)))
            .collect::<Vec<_>>();
        let args = match coerce_arguments(
            self.warden,
            &format!("Field '{}'", field.name),
            &field.path(),
            &field.arguments,
            &given,
            self.variables,
            self.context,
        ) {
            Ok(args) => args,
            Err(e) => {
                self.push_error(location, &path, &order, e);
                return self.null_for(&field.field_type);
            }
        };

        let ctx = ResolverContext {
            object: object.clone(),
            args,
            context: self.context.clone(),
            field: Arc::clone(field),
            path: field.extras.contains(&Extra::Path).then(|| path.clone()),
            ast_node: field
                .extras
                .contains(&Extra::AstNode)
                .then(|| Arc::new((*node).clone())),
            look_ahead: field
                .extras
                .contains(&Extra::LookAhead)
                .then(|| LookAhead::of_fields(nodes, &self.fragments, self.variables)),
            warden: self.warden.clone(),
            dataloader: self.dataloader.clone(),
        };
        let subscription_root =
            self.operation == OperationType::Subscription && path.len() == 1;
        let outcome = pipeline::run(self, owner, field, ctx, subscription_root).await;

        match outcome {
            Outcome::Value(v) => {
                tracing::trace!(path = %path.iter().join("."), "resolved field");
                self.complete(&field.field_type, v, &site, path, order).await
            }
            Outcome::NoUpdate => {
                if path.len() == 1 {
                    self.no_update.store(true, Ordering::Relaxed);
                }
                self.null_for(&field.field_type)
            }
            Outcome::Unauthorized => {
                tracing::trace!(path = %path.iter().join("."), "field unauthorized");
                self.null_for(&field.field_type)
            }
            Outcome::Err(e) => {
                self.push_error(location, &path, &order, e);
                self.null_for(&field.field_type)
            }
        }
    }

    /// `null` for a field of type `ty`, propagating when it's non-null.
    fn null_for(&self, ty: &Type) -> Completed {
        if ty.is_non_null() { Err(Propagate) } else { Ok(Value::Null) }
    }

    fn complete<'b>(
        &'b self,
        ty: &'b Type,
        value: FieldValue,
        site: &'b Site<'b>,
        path: Vec<PathSegment>,
        order: Vec<usize>,
    ) -> BoxFuture<'b, Completed> {
        async move {
            if ty.is_non_null() {
                if value.is_null() {
                    let message = format!(
                        "Cannot return null for non-nullable field {}.{}",
                        site.owner.name(),
                        site.field.name,
                    );
                    self.push_error(site.location(), &path, &order, FieldError::from(message));
                    return Err(Propagate);
                }
                return self.complete_inner(ty, value, site, path, order).await;
            }
            if value.is_null() {
                return Ok(Value::Null);
            }
            Ok(self
                .complete_inner(ty, value, site, path, order)
                .await
                .unwrap_or(Value::Null))
        }
        .boxed()
    }

    async fn complete_inner(
        &self,
        ty: &Type,
        value: FieldValue,
        site: &Site<'_>,
        path: Vec<PathSegment>,
        order: Vec<usize>,
    ) -> Completed {
        if let Some(item) = ty.list_item() {
            let Some(items) = value.to_list() else {
                let message = format!(
                    "Failed to build a GraphQL list result for field `{}.{}` at path `{}`",
                    site.owner.name(),
                    site.field.name,
                    path.iter().join("."),
                );
                self.push_error(site.location(), &path, &order, FieldError::from(message));
                return Err(Propagate);
            };
            let completed = join_all(items.into_iter().enumerate().map(|(i, v)| {
                let mut path = path.clone();
                path.push(PathSegment::Index(i));
                let mut order = order.clone();
                order.push(i);
                self.complete(item, v, site, path, order)
            }))
            .await;
            return completed.into_iter().collect::<Result<Vec<_>, _>>().map(Value::List);
        }

        let name = ty.innermost_name();
        let meta = match self.warden.get_type(name) {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                let message = format!("Type '{name}' isn't visible");
                self.push_error(site.location(), &path, &order, FieldError::from(message));
                return Err(Propagate);
            }
            Err(e) => {
                self.push_error(site.location(), &path, &order, FieldError::from(e));
                return Err(Propagate);
            }
        };
        match &**meta {
            MetaType::Scalar(_) | MetaType::Enum(_) => {
                coerce_leaf_result(self.warden, meta, &value, self.context).map_err(|message| {
                    let message = if let MetaType::Enum(e) = &**meta {
                        invalid_enum_message(site, &value, &path, &e.name)
                    } else {
                        message
                    };
                    self.push_error(site.location(), &path, &order, FieldError::from(message));
                    Propagate
                })
            }
            MetaType::Object(_) => self.complete_object(meta, value, site, path, order).await,
            MetaType::Interface(_) | MetaType::Union(_) => {
                match self.resolve_abstract(meta, &value, site) {
                    Ok(concrete) => self.complete_object(concrete, value, site, path, order).await,
                    Err(message) => {
                        self.push_error(site.location(), &path, &order, FieldError::from(message));
                        Err(Propagate)
                    }
                }
            }
            MetaType::InputObject(i) => {
                let message = format!("{} is an input type and can't be returned", i.name);
                self.push_error(site.location(), &path, &order, FieldError::from(message));
                Err(Propagate)
            }
        }
    }

    async fn complete_object(
        &self,
        meta: &Arc<MetaType>,
        value: FieldValue,
        site: &Site<'_>,
        path: Vec<PathSegment>,
        order: Vec<usize>,
    ) -> Completed {
        let value = match pipeline::authorize_object(self, meta, value).await {
            Outcome::Value(v) => v,
            Outcome::Unauthorized | Outcome::NoUpdate => return Err(Propagate),
            Outcome::Err(e) => {
                self.push_error(site.location(), &path, &order, e);
                return Err(Propagate);
            }
        };
        let sets = site.nodes.iter().map(|n| &n.selection_set).collect();
        self.resolve_object(meta, value, sets, path, order, false)
            .await
            .map(Value::Object)
    }

    /// Finds the object type of a value of an abstract type: its tag, the
    /// type's own `resolve_type`, the schema's, then a `__typename` key.
    pub(crate) fn resolve_abstract(
        &self,
        abs: &'a MetaType,
        value: &FieldValue,
        site: &Site<'_>,
    ) -> Result<&'a Arc<MetaType>, String> {
        let name = self.concrete_type_name(abs, value).ok_or_else(|| {
            format!(
                "Abstract type `{}` couldn't resolve the concrete type of the value of `{}.{}`",
                abs.name(),
                site.owner.name(),
                site.field.name,
            )
        })?;
        if !self.warden.is_possible_type(abs, &name) {
            return Err(format!(
                "`{}` resolved to `{name}`, which isn't a possible type of `{}`",
                abs.name(),
                abs.name(),
            ));
        }
        match self.warden.get_type(&name) {
            Ok(Some(t)) => Ok(t),
            Ok(None) => Err(format!("Type '{name}' isn't visible")),
            Err(e) => Err(e.to_string()),
        }
    }

    pub(crate) fn concrete_type_name(&self, abs: &MetaType, value: &FieldValue) -> Option<ArcStr> {
        if let Some(tag) = value.type_tag() {
            return Some(tag.clone());
        }
        if let Some(f) = abs.resolve_type_fn() {
            if let Some(name) = f(value, self.context) {
                return Some(name);
            }
        }
        if let Some(hook) = &self.warden.schema().hooks.resolve_type {
            if let Some(name) = hook(abs, value, self.context) {
                return Some(name);
            }
        }
        value
            .get("__typename")
            .and_then(|v| v.as_str().map(ArcStr::from))
    }
}

fn invalid_enum_message(site: &Site<'_>, value: &FieldValue, path: &[PathSegment], enum_name: &str) -> String {
    let shown = value
        .to_plain()
        .map_or_else(|| format!("{value:?}"), |v| v.to_string());
    format!(
        "`{}.{}` returned `{shown}` at `{}`, but this isn't a valid value for `{enum_name}`. \
         Update the field or resolver to return one of `{enum_name}`'s values instead.",
        site.owner.name(),
        site.field.name,
        path.iter().join("."),
    )
}
