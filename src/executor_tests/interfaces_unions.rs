use arcstr::ArcStr;
use pretty_assertions::assert_eq;

use crate::{
    Field, FieldValue, InterfaceMeta, ObjectMeta, Schema, SchemaBuilder, UnionMeta,
    graphql_value,
    tests::util::{messages, run},
};

fn pet(kind: &str, name: &str) -> FieldValue {
    FieldValue::map([("kind", kind), ("name", name)])
}

fn schema(pets: Vec<FieldValue>) -> Schema {
    let members = FieldValue::list(pets);
    let union_members = members.clone();
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("pets", "[Pet]").resolve(move |_| members.clone()))
                .field(Field::new("everything", "[Entity]").resolve(move |_| union_members.clone())),
        )
        .register(
            InterfaceMeta::new("Pet")
                .field(Field::new("name", "String"))
                .resolve_type(|value, _| match value.get("kind")?.as_str()? {
                    "dog" => Some(ArcStr::from("Dog")),
                    "cat" => Some(ArcStr::from("Cat")),
                    "car" => Some(ArcStr::from("Car")),
                    _ => None,
                }),
        )
        .register(
            ObjectMeta::new("Dog")
                .interfaces(&["Pet"])
                .field(Field::new("name", "String"))
                .field(Field::new("barks", "Boolean").resolve(|_| FieldValue::from(true))),
        )
        .register(
            ObjectMeta::new("Cat")
                .interfaces(&["Pet"])
                .field(Field::new("name", "String"))
                .field(Field::new("meows", "Boolean").resolve(|_| FieldValue::from(true))),
        )
        .register(ObjectMeta::new("Car").field(Field::new("name", "String")))
        .register(UnionMeta::new("Entity", &["Dog", "Car"]))
        .build()
        .unwrap()
}

#[tokio::test]
async fn interfaces_resolve_their_concrete_types() {
    let (data, errors) = run(
        &schema(vec![pet("dog", "Rex"), pet("cat", "Tom")]),
        "{ pets { __typename name ... on Dog { barks } ... on Cat { meows } } }",
    )
    .await;
    assert_eq!(errors, []);
    assert_eq!(
        data,
        graphql_value!({"pets": [
            {"__typename": "Dog", "name": "Rex", "barks": true},
            {"__typename": "Cat", "name": "Tom", "meows": true},
        ]}),
    );
}

#[tokio::test]
async fn typed_values_skip_type_resolution() {
    let tagged = FieldValue::typed("Cat", FieldValue::map([("name", "Felix")]));
    let (data, errors) = run(&schema(vec![tagged]), "{ pets { __typename name } }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"pets": [{"__typename": "Cat", "name": "Felix"}]}));
}

#[tokio::test]
async fn unions_fall_back_to_typename_keys() {
    let car = FieldValue::map([("__typename", "Car"), ("name", "Beetle")]);
    let dog = FieldValue::typed("Dog", pet("dog", "Rex"));
    let (data, errors) = run(
        &schema(vec![car, dog]),
        "{ everything { __typename ... on Pet { name } ... on Car { name } } }",
    )
    .await;
    assert_eq!(errors, []);
    assert_eq!(
        data,
        graphql_value!({"everything": [
            {"__typename": "Car", "name": "Beetle"},
            {"__typename": "Dog", "name": "Rex"},
        ]}),
    );
}

#[tokio::test]
async fn unresolvable_items_become_null_with_errors() {
    let (data, errors) = run(
        &schema(vec![pet("car", "Beetle"), pet("fish", "Nemo"), pet("dog", "Rex")]),
        "{ pets { name } }",
    )
    .await;
    assert_eq!(data, graphql_value!({"pets": [null, null, {"name": "Rex"}]}));
    assert_eq!(
        messages(&errors),
        [
            "`Pet` resolved to `Car`, which isn't a possible type of `Pet`",
            "Abstract type `Pet` couldn't resolve the concrete type of the value of `Query.pets`",
        ],
    );
}
