//! Relay classic mutations: a single `input` argument and a payload object,
//! both carrying an optional `clientMutationId`.
//!
//! The client mutation ID given in the input is handed back unchanged on the
//! payload. Resolvers see the other input fields as the field's arguments.

use std::sync::Arc;

use arcstr::ArcStr;
use derive_more::with_trait::Debug;

use super::meta::{Argument, Field, InputObjectMeta, ObjectMeta, ResolverFn};
use crate::{
    ast::Type,
    executor::{FieldValue, Lazy, Outcome, ResolverContext},
    util::to_camel_case,
    value::Value,
};

const CLIENT_MUTATION_ID: &str = "client_mutation_id";

const CLIENT_MUTATION_ID_DESCRIPTION: &str =
    "A unique identifier for the client performing the mutation.";

/// Definition of a Relay classic mutation.
///
/// ```
/// # use trellis::{Argument, Field, FieldValue, ObjectMeta, RelayClassicMutation, SchemaBuilder};
/// let rename = RelayClassicMutation::new("rename_ensemble")
///     .argument(Argument::new("name", "String!"))
///     .return_field(Field::new("name", "String"))
///     .resolve(|ctx| FieldValue::map([("name", ctx.arg("name").cloned().unwrap_or_default())]));
///
/// let schema = SchemaBuilder::new()
///     .query(ObjectMeta::new("Query").field(Field::new("ok", "Boolean")))
///     .mutation(ObjectMeta::new("Mutation").field(rename.field()))
///     .register(rename.input_type())
///     .register(rename.payload_type())
///     .build()
///     .unwrap();
/// assert!(schema.type_by_name("RenameEnsembleInput").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct RelayClassicMutation {
    name: ArcStr,
    type_name: String,
    description: Option<ArcStr>,
    input_fields: Vec<Argument>,
    return_fields: Vec<Field>,
    #[debug(skip)]
    resolver: Option<ResolverFn>,
}

impl RelayClassicMutation {
    /// Creates a mutation from its field's definition name. The input and
    /// payload types are named after it, so `rename_ensemble` declares
    /// `RenameEnsembleInput` and `RenameEnsemblePayload`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        let name = name.into();
        Self {
            type_name: type_name_of(&name),
            name,
            description: None,
            input_fields: Vec::new(),
            return_fields: Vec::new(),
            resolver: None,
        }
    }

    /// Sets the description of the mutation field.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field to the input type.
    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.input_fields.push(argument);
        self
    }

    /// Adds a field to the payload type.
    #[must_use]
    pub fn return_field(mut self, field: Field) -> Self {
        self.return_fields.push(field);
        self
    }

    /// Sets the resolver. It returns the payload, usually a map keyed by the
    /// payload fields' definition names.
    #[must_use]
    pub fn resolve<F, R>(mut self, f: F) -> Self
    where
        F: Fn(ResolverContext) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        self.resolver = Some(Arc::new(move |ctx| Lazy::Ready(f(ctx).into())));
        self
    }

    /// Sets a resolver returning a [`Lazy`] payload.
    #[must_use]
    pub fn resolve_lazy(
        mut self,
        f: impl Fn(ResolverContext) -> Lazy<Outcome> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(f));
        self
    }

    /// Name of the input type.
    pub fn input_type_name(&self) -> String {
        format!("{}Input", self.type_name)
    }

    /// Name of the payload type.
    pub fn payload_type_name(&self) -> String {
        format!("{}Payload", self.type_name)
    }

    /// The input object type: the declared arguments plus
    /// `clientMutationId`.
    pub fn input_type(&self) -> InputObjectMeta {
        let input = self.input_fields.iter().cloned().fold(
            InputObjectMeta::new(self.input_type_name())
                .description(format!("Autogenerated input type of {}", self.type_name)),
            InputObjectMeta::argument,
        );
        input.argument(
            Argument::new(CLIENT_MUTATION_ID, "String").description(CLIENT_MUTATION_ID_DESCRIPTION),
        )
    }

    /// The payload object type: the declared return fields plus
    /// `clientMutationId`.
    pub fn payload_type(&self) -> ObjectMeta {
        let payload = self.return_fields.iter().cloned().fold(
            ObjectMeta::new(self.payload_type_name())
                .description(format!("Autogenerated return type of {}.", self.type_name)),
            ObjectMeta::field,
        );
        payload.field(
            Field::new(CLIENT_MUTATION_ID, "String").description(CLIENT_MUTATION_ID_DESCRIPTION),
        )
    }

    /// The mutation field, taking a non-null `input` and returning a
    /// nullable payload.
    pub fn field(&self) -> Field {
        let input_type = format!("{}!", self.input_type_name());
        let input = Argument::new("input", Type::from(input_type.as_str()))
            .description(format!("Parameters for {}", self.type_name));
        let field = Field::new(self.name.clone(), Type::named(self.payload_type_name()))
            .argument(input);
        let field = match &self.description {
            Some(d) => field.description(d.clone()),
            None => field,
        };
        let resolver = self.resolver.clone();
        field.resolve_lazy(move |mut ctx| {
            let input = ctx.args_mut().remove("input").unwrap_or_default();
            let mut client_mutation_id = None;
            for (key, value) in input.as_map().into_iter().flatten() {
                if key == CLIENT_MUTATION_ID {
                    client_mutation_id = Some(value.clone());
                } else {
                    ctx.args_mut().insert(key.clone(), value.clone());
                }
            }
            let payload = match &resolver {
                Some(resolver) => resolver(ctx),
                None => Lazy::ready(Outcome::Value(FieldValue::Null)),
            };
            payload.map(move |outcome| {
                outcome.map(|payload| with_client_mutation_id(payload, client_mutation_id))
            })
        })
    }
}

/// Adds the client mutation ID to a map-like payload. Other payloads are
/// kept as they are.
fn with_client_mutation_id(payload: FieldValue, id: Option<FieldValue>) -> FieldValue {
    let id = id.unwrap_or_default();
    match payload {
        FieldValue::Map(mut fields) => {
            fields.insert(CLIENT_MUTATION_ID.to_owned(), id);
            FieldValue::Map(fields)
        }
        FieldValue::Value(Value::Object(mut fields)) => match id.to_plain() {
            Some(id) => {
                fields.add_field(CLIENT_MUTATION_ID, id);
                FieldValue::Value(Value::Object(fields))
            }
            None => FieldValue::Value(Value::Object(fields)),
        },
        FieldValue::Typed { type_name, value } => FieldValue::Typed {
            type_name,
            value: Box::new(with_client_mutation_id(*value, Some(id))),
        },
        other => other,
    }
}

fn type_name_of(name: &str) -> String {
    let camel = to_camel_case(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{RelayClassicMutation, type_name_of};
    use crate::{
        Context, FieldError, FieldValue, Outcome, Schema, SchemaBuilder, Variables, execute,
        graphql_value, graphql_vars,
        schema::meta::{Argument, Field, ObjectMeta},
        tests::util::{messages, run},
    };

    fn schema() -> Schema {
        let introduce = RelayClassicMutation::new("introduce_ship")
            .description("Adds a ship to a faction")
            .argument(Argument::new("ship_name", "String").default_value("Bagel"))
            .argument(Argument::new("faction_id", "ID!"))
            .return_field(Field::new("ship_name", "String"))
            .return_field(Field::new("faction_id", "ID"))
            .resolve(|ctx| {
                if ctx.arg("faction_id").and_then(FieldValue::as_str) == Some("404") {
                    return Outcome::Err(FieldError::from("No such faction"));
                }
                let arg = |k: &str| ctx.arg(k).cloned().unwrap_or_default();
                Outcome::Value(FieldValue::map([
                    ("ship_name", arg("ship_name")),
                    ("faction_id", arg("faction_id")),
                ]))
            });
        let noop = RelayClassicMutation::new("noop").resolve(|_| FieldValue::map([("unused", 0)]));
        SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("ok", "Boolean")))
            .mutation(
                ObjectMeta::new("Mutation")
                    .field(introduce.field())
                    .field(noop.field()),
            )
            .register(introduce.input_type())
            .register(introduce.payload_type())
            .register(noop.input_type())
            .register(noop.payload_type())
            .build()
            .unwrap()
    }

    #[test]
    fn names_types_after_the_field() {
        assert_eq!(type_name_of("introduce_ship"), "IntroduceShip");
        assert_eq!(type_name_of("addSitar"), "AddSitar");
        let m = RelayClassicMutation::new("rename_ensemble");
        assert_eq!(m.input_type_name(), "RenameEnsembleInput");
        assert_eq!(m.payload_type_name(), "RenameEnsemblePayload");
    }

    #[tokio::test]
    async fn passes_the_client_mutation_id_through() {
        let query = r#"mutation M($cid: String, $name: String = "Bagel") {
            introduceShip(input: {shipName: $name, factionId: "1", clientMutationId: $cid}) {
                clientMutationId shipName factionId
            }
        }"#;
        let schema = schema();
        let ctx = Context::new();

        let (data, errors) = execute(query, None, &schema, &graphql_vars! {"cid": "1234"}, &ctx)
            .await
            .unwrap();
        assert_eq!(errors, []);
        assert_eq!(
            data,
            graphql_value!({"introduceShip": {
                "clientMutationId": "1234",
                "shipName": "Bagel",
                "factionId": "1",
            }}),
        );

        let (data, errors) = execute(query, None, &schema, &Variables::new(), &ctx).await.unwrap();
        assert_eq!(errors, []);
        assert_eq!(
            data,
            graphql_value!({"introduceShip": {
                "clientMutationId": null,
                "shipName": "Bagel",
                "factionId": "1",
            }}),
        );
    }

    #[tokio::test]
    async fn works_without_arguments() {
        let (data, errors) = run(
            &schema(),
            r#"mutation { noop(input: {clientMutationId: "x"}) { clientMutationId } }"#,
        )
        .await;
        assert_eq!(errors, []);
        assert_eq!(data, graphql_value!({"noop": {"clientMutationId": "x"}}));
    }

    #[tokio::test]
    async fn resolver_errors_null_the_payload() {
        let (data, errors) = run(
            &schema(),
            r#"mutation { introduceShip(input: {factionId: "404", clientMutationId: "1"}) { clientMutationId } }"#,
        )
        .await;
        assert_eq!(data, graphql_value!({"introduceShip": null}));
        assert_eq!(messages(&errors), ["No such faction"]);
    }

    #[tokio::test]
    async fn input_and_payload_are_introspectable() {
        let (data, errors) = run(
            &schema(),
            r#"{
                input: __type(name: "IntroduceShipInput") { inputFields { name type { name } } }
                payload: __type(name: "IntroduceShipPayload") { fields { name } }
            }"#,
        )
        .await;
        assert_eq!(errors, []);
        assert_eq!(
            data,
            graphql_value!({
                "input": {"inputFields": [
                    {"name": "shipName", "type": {"name": "String"}},
                    {"name": "factionId", "type": {"name": null}},
                    {"name": "clientMutationId", "type": {"name": "String"}},
                ]},
                "payload": {"fields": [
                    {"name": "shipName"},
                    {"name": "factionId"},
                    {"name": "clientMutationId"},
                ]},
            }),
        );
    }
}
