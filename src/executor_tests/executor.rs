use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use pretty_assertions::assert_eq;

use crate::{
    Argument, Context, Field, FieldError, FieldValue, GraphQLError, ObjectMeta, PathSegment, Schema,
    SchemaBuilder, Variables, execute, graphql_value,
    tests::util::{messages, run},
};

fn nulls_schema() -> Schema {
    let parent = || FieldValue::map([("ok", "fine")]);
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("parent", "Parent").resolve(move |_| parent()))
                .field(Field::new("strict", "Parent!").resolve(move |_| parent()))
                .field(
                    Field::new("items", "[String!]")
                        .resolve(|_| FieldValue::list([FieldValue::from("a"), FieldValue::Null])),
                )
                .field(Field::new("plain", "String").resolve(|_| FieldValue::from("plain"))),
        )
        .register(
            ObjectMeta::new("Parent")
                .field(Field::new("ok", "String"))
                .field(Field::new("non_null", "String!")),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn nulls_replace_the_closest_nullable_parent() {
    let (data, errors) = run(&nulls_schema(), "{ parent { ok nonNull } items plain }").await;
    assert_eq!(data, graphql_value!({"parent": null, "items": null, "plain": "plain"}));
    assert_eq!(
        messages(&errors),
        [
            "Cannot return null for non-nullable field Parent.nonNull",
            "Cannot return null for non-nullable field Query.items",
        ],
    );
    assert_eq!(errors[0].path(), [PathSegment::from("parent"), PathSegment::from("nonNull")]);
    assert_eq!(errors[1].path(), [PathSegment::from("items"), PathSegment::Index(1)]);
}

#[tokio::test]
async fn non_null_roots_null_the_whole_response() {
    let (data, errors) = run(&nulls_schema(), "{ plain strict { nonNull } }").await;
    assert_eq!(data, graphql_value!(null));
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].path(),
        [PathSegment::from("strict"), PathSegment::from("nonNull")],
    );
}

#[tokio::test]
async fn nullable_fields_on_the_path_keep_their_siblings() {
    let (data, _) = run(&nulls_schema(), "{ parent { ok } plain }").await;
    assert_eq!(data, graphql_value!({"parent": {"ok": "fine"}, "plain": "plain"}));
}

#[tokio::test]
async fn errors_follow_the_document_order() {
    let schema = SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("slow", "Int").resolve_async(|_| async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    FieldError::from("slow failed")
                }))
                .field(Field::new("fast", "Int").resolve(|_| FieldError::from("fast failed"))),
        )
        .build()
        .unwrap();

    let (data, errors) = run(&schema, "{ slow fast }").await;
    assert_eq!(data, graphql_value!({"slow": null, "fast": null}));
    assert_eq!(messages(&errors), ["slow failed", "fast failed"]);
}

#[tokio::test]
async fn mutation_fields_run_one_after_another() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (first, second) = (Arc::clone(&log), Arc::clone(&log));
    let schema = SchemaBuilder::new()
        .query(ObjectMeta::new("Query").field(Field::new("a", "Int")))
        .mutation(
            ObjectMeta::new("Mutation")
                .field(Field::new("first", "String").resolve_async(move |_| {
                    let log = Arc::clone(&first);
                    async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        log.lock().unwrap().push("first");
                        FieldValue::from("1")
                    }
                }))
                .field(Field::new("second", "String").resolve(move |_| {
                    second.lock().unwrap().push("second");
                    FieldValue::from("2")
                })),
        )
        .build()
        .unwrap();

    let (data, errors) = run(&schema, "mutation { first second }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"first": "1", "second": "2"}));
    assert_eq!(*log.lock().unwrap(), ["first", "second"]);
}

#[tokio::test]
async fn aliases_and_typename() {
    let (data, errors) = run(&nulls_schema(), "{ x: plain, y: plain, __typename }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"x": "plain", "y": "plain", "__typename": "Query"}));
}

#[tokio::test]
async fn conflicting_aliases_are_rejected() {
    let schema = SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query").field(
                Field::new("f", "Int")
                    .argument(Argument::new("x", "Int"))
                    .resolve(|ctx| FieldValue::from(ctx.arg("x").and_then(|x| x.as_i32()))),
            ),
        )
        .build()
        .unwrap();

    let err = execute("{ a: f(x: 1) a: f(x: 2) }", None, &schema, &Variables::new(), &Context::new())
        .await
        .unwrap_err();
    let GraphQLError::ValidationError(errors) = &err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(
        errors[0].message(),
        "Fields \"a\" conflict because they have differing arguments. \
         Use different aliases on the fields to fetch both if this was intentional",
    );

    let (data, errors) = run(&schema, "{ a: f(x: 1) b: f(x: 2) }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn selects_operations_by_name() {
    let schema = SchemaBuilder::new()
        .query(ObjectMeta::new("Query").field(Field::new("a", "Int").resolve(|_| FieldValue::from(1))))
        .subscription(ObjectMeta::new("Subscription").field(Field::new("a", "Int")))
        .build()
        .unwrap();
    let vars = Variables::new();
    let ctx = Context::new();
    let doc = "query A { a } query B { b: a }";

    let (data, _) = execute(doc, Some("B"), &schema, &vars, &ctx).await.unwrap();
    assert_eq!(data, graphql_value!({"b": 1}));

    assert_eq!(
        execute(doc, None, &schema, &vars, &ctx).await.unwrap_err(),
        GraphQLError::MultipleOperationsProvided,
    );
    assert_eq!(
        execute(doc, Some("C"), &schema, &vars, &ctx).await.unwrap_err(),
        GraphQLError::UnknownOperationName,
    );
    assert_eq!(
        execute("subscription { a }", None, &schema, &vars, &ctx).await.unwrap_err(),
        GraphQLError::IsSubscription,
    );
}

#[tokio::test]
async fn parse_errors_are_request_errors() {
    let err = execute("{ a", None, &nulls_schema(), &Variables::new(), &Context::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GraphQLError::ParseError(_)), "{err:?}");
}
