//! Subscriptions stored by topic and re-run when their topic is triggered.
//!
//! A topic is the root field's name followed by its arguments sorted by name,
//! such as `postAdded(author: "ada")`. Triggering runs every subscription of
//! the topic with the triggered object as the subscription root's event, and
//! hands the results to the [`SubscriptionStore`].

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use graphql_parser::query::{Definition, Field, Selection, SelectionSet};
use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::{
    Context, DuplicateNamesError, ExecutionError, FieldValue, GraphQLError, InputValue,
    OperationKind, OperationType, Schema, Value, Variables, Warden, execute_document,
    executor::find_operation,
    http::GraphQLRequest,
    parser::{Document, parse_query},
    types::coercion::default_literal,
};

/// Result delivered for one run of a subscription.
pub type SubscriptionResult = Result<(Value, Vec<ExecutionError>), GraphQLError>;

/// Subscription kept between triggers.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: String,
    topic: String,
    document: Arc<Document>,
    operation_name: Option<String>,
    variables: Variables,
    context: Context,
}

impl Subscription {
    /// Identifier the subscription was registered with.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Topic the subscription listens to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Storage of subscriptions and transport of their results.
pub trait SubscriptionStore: Send + Sync {
    /// Stores a subscription, replacing one with the same id.
    fn write(&self, subscription: Subscription);

    /// Subscriptions listening to `topic`.
    fn read(&self, topic: &str) -> Vec<Subscription>;

    /// Removes a subscription, returning it if it was stored.
    fn delete(&self, id: &str) -> Option<Subscription>;

    /// Sends the result of a triggered run to the subscriber.
    fn deliver(&self, id: &str, result: SubscriptionResult);
}

/// [`SubscriptionStore`] keeping subscriptions and delivered results in
/// memory.
#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    subscriptions: RwLock<IndexMap<String, Subscription>>,
    deliveries: Mutex<HashMap<String, Vec<SubscriptionResult>>>,
}

impl MemorySubscriptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the results delivered to `id` so far, oldest first.
    pub fn take_deliveries(&self, id: &str) -> Vec<SubscriptionResult> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .unwrap_or_default()
    }

    /// Number of stored subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Indicates whether no subscriptions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn write(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription.id.clone(), subscription);
    }

    fn read(&self, topic: &str) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| s.topic == topic)
            .cloned()
            .collect()
    }

    fn delete(&self, id: &str) -> Option<Subscription> {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(id)
    }

    fn deliver(&self, id: &str, result: SubscriptionResult) {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.to_owned())
            .or_default()
            .push(result);
    }
}

/// Registry of the subscriptions of one schema.
#[derive(Debug)]
pub struct Subscriptions<S = MemorySubscriptionStore> {
    schema: Schema,
    store: S,
}

impl Subscriptions {
    /// Registry keeping its subscriptions in memory.
    pub fn in_memory(schema: Schema) -> Self {
        Self::new(schema, MemorySubscriptionStore::new())
    }
}

impl<S: SubscriptionStore> Subscriptions<S> {
    /// Creates a registry over `store`.
    pub fn new(schema: Schema, store: S) -> Self {
        Self { schema, store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the initial pass of a subscription and stores it under its topic.
    ///
    /// Root fields without an event resolve to `null` in the returned
    /// payload unless their resolver produces one.
    ///
    /// # Errors
    ///
    /// If the request fails as a whole, or isn't a subscription. Nothing is
    /// stored then.
    pub async fn subscribe(
        &self,
        request: &GraphQLRequest,
        context: &Context,
        id: impl Into<String>,
    ) -> SubscriptionResult {
        let document = Arc::new(parse_query(&request.query)?);
        let variables = request.variables();
        let operation_name = request.operation_name.as_deref();

        let output = execute_document(
            &document,
            operation_name,
            &self.schema,
            &variables,
            context,
            OperationKind::Subscription,
        )
        .await?;

        let warden = self.schema.warden(context)?;
        let topic = topic_of(&warden, &document, operation_name, &variables)?;
        let id = id.into();
        tracing::debug!(id = id.as_str(), topic = topic.as_str(), "subscribed");
        self.store.write(Subscription {
            id,
            topic,
            document: Arc::clone(&document),
            operation_name: request.operation_name.clone(),
            variables,
            context: context.clone(),
        });
        Ok((output.data, output.errors))
    }

    /// Re-runs the subscriptions of `field` with `arguments`, delivering each
    /// result to the store.
    ///
    /// `arguments` is an object literal. Anything else counts as no
    /// arguments. Arguments it omits take the defaults of the root field.
    /// Runs whose root resolves to [`Outcome::NoUpdate`] aren't delivered.
    ///
    /// Returns the number of delivered results.
    ///
    /// [`Outcome::NoUpdate`]: crate::Outcome::NoUpdate
    pub async fn trigger(&self, field: &str, arguments: &InputValue, object: FieldValue) -> usize {
        let mut arguments = match arguments {
            InputValue::Object(fields) => fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect(),
            _ => Vec::new(),
        };
        let warden = self.schema.unfiltered_warden();
        if let Err(e) = add_defaults(&warden, field, &mut arguments) {
            tracing::warn!(field, error = %e, "triggering without argument defaults");
        }
        let topic = topic(field, arguments);

        let mut delivered = 0;
        for subscription in self.store.read(&topic) {
            let context = subscription.context.clone().with_event(object.clone());
            let result = execute_document(
                &subscription.document,
                subscription.operation_name.as_deref(),
                &self.schema,
                &subscription.variables,
                &context,
                OperationKind::Subscription,
            )
            .await;
            match result {
                Ok(output) if output.no_update => {
                    tracing::warn!(
                        id = subscription.id.as_str(),
                        topic = topic.as_str(),
                        "skipping delivery without update",
                    );
                }
                Ok(output) => {
                    self.store.deliver(&subscription.id, Ok((output.data, output.errors)));
                    delivered += 1;
                }
                Err(e) => {
                    self.store.deliver(&subscription.id, Err(e));
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Removes a subscription. Returns whether it was stored.
    pub fn unsubscribe(&self, id: &str) -> bool {
        let removed = self.store.delete(id).is_some();
        if removed {
            tracing::debug!(id, "unsubscribed");
        }
        removed
    }
}

/// Topic of the root field a subscription operation selects.
///
/// Arguments the operation omits take their defaults.
fn topic_of(
    warden: &Warden,
    document: &Document,
    operation_name: Option<&str>,
    variables: &Variables,
) -> Result<String, GraphQLError> {
    let operation = find_operation(document, operation_name)?;

    let mut values = variables.clone();
    for def in operation.variable_definitions {
        if let Some(default) = &def.default_value {
            values
                .entry(def.name.clone())
                .or_insert_with(|| InputValue::from_parsed(default));
        }
    }

    let Some(field) = root_field(document, operation.selection_set) else {
        return Err(GraphQLError::NoOperationProvided);
    };
    let mut arguments = field
        .arguments
        .iter()
        .filter_map(|(name, v)| {
            InputValue::from_parsed(v)
                .into_const(&values)
                .map(|v| (name.as_str(), v))
        })
        .collect::<Vec<_>>();

    add_defaults(warden, &field.name, &mut arguments)?;
    Ok(topic(&field.name, arguments))
}

/// Adds the defaults of the subscription root field `field` for the
/// arguments missing from `arguments`.
fn add_defaults<'a>(
    warden: &'a Warden,
    field: &str,
    arguments: &mut Vec<(&'a str, InputValue)>,
) -> Result<(), DuplicateNamesError> {
    let definition = match warden.root_type(OperationType::Subscription) {
        Some(root) => warden.get_field(root, field)?,
        None => None,
    };
    let Some(definition) = definition else {
        return Ok(());
    };
    for arg in warden.arguments(&definition.path(), &definition.arguments)? {
        if arguments.iter().any(|(name, _)| *name == arg.name.as_str()) {
            continue;
        }
        if let Some(Ok(default)) = default_literal(warden, arg) {
            arguments.push((arg.name.as_str(), default));
        }
    }
    Ok(())
}

/// First field selected at the root, looking into fragments.
fn root_field<'d>(
    document: &'d Document,
    set: &'d SelectionSet<'static, String>,
) -> Option<&'d Field<'static, String>> {
    set.items.iter().find_map(|selection| match selection {
        Selection::Field(field) => Some(field),
        Selection::InlineFragment(fragment) => root_field(document, &fragment.selection_set),
        Selection::FragmentSpread(spread) => {
            document.definitions.iter().find_map(|d| match d {
                Definition::Fragment(f) if f.name == spread.fragment_name => {
                    root_field(document, &f.selection_set)
                }
                _ => None,
            })
        }
    })
}

fn topic(field: &str, mut arguments: Vec<(&str, InputValue)>) -> String {
    if arguments.is_empty() {
        return field.to_owned();
    }
    arguments.sort_by(|a, b| a.0.cmp(b.0));
    format!(
        "{field}({})",
        arguments
            .iter()
            .map(|(name, value)| format!("{name}: {}", value.sorted()))
            .join(", "),
    )
}
