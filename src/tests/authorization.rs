use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Argument, Authorization, Context, Field, FieldError, FieldValue, Lazy, ObjectMeta, Schema,
    SchemaBuilder, graphql_value,
    http::GraphQLRequest,
    tests::util::{messages, run, run_with},
};

fn schema(hooks: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Schema {
    let builder = SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("open", "Int").resolve(|_| FieldValue::from(1)))
                .field(
                    Field::new("secret", "String")
                        .authorized(|_, _, ctx| Lazy::ready(Ok(Authorization::from(ctx.flag("admin")))))
                        .resolve(|_| FieldValue::from("s3cret")),
                )
                .field(
                    Field::new("cached", "String")
                        .authorized(|_, _, _| {
                            Lazy::ready(Ok(Authorization::Resolved(FieldValue::from("from cache"))))
                        })
                        .resolve(|_| FieldValue::from("fresh")),
                )
                .field(
                    Field::new("guarded", "String")
                        .argument(Argument::new("token", "String").authorized(|_, token, _| {
                            let valid = token.as_str() == Some("ok");
                            Lazy::pending(async move { Ok(valid) })
                        }))
                        .resolve(|_| FieldValue::from("in")),
                )
                .field(
                    Field::new("document", "Document")
                        .resolve(|_| FieldValue::map([("title", "Plans")])),
                ),
        )
        .register(
            ObjectMeta::new("Document")
                .authorized(|_, ctx| Lazy::ready(Ok(ctx.flag("admin"))))
                .field(Field::new("title", "String")),
        );
    hooks(builder).build().unwrap()
}

#[tokio::test]
async fn failed_checks_are_silent_nulls() {
    let schema = schema(|b| b);
    let (data, errors) = run(
        &schema,
        r#"{ open secret cached document { title } yes: guarded(token: "ok") no: guarded(token: "nope") }"#,
    )
    .await;
    assert_eq!(errors, []);
    assert_eq!(
        data,
        graphql_value!({
            "open": 1,
            "secret": null,
            "cached": "from cache",
            "document": null,
            "yes": "in",
            "no": null,
        }),
    );

    let response = GraphQLRequest::new("{ open secret }", None, None)
        .execute(&schema, &Context::new())
        .await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"open": 1, "secret": null}}),
    );
}

#[tokio::test]
async fn resolved_payloads_are_results_not_denials() {
    let schema = SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(
                    Field::new("nothing", "String")
                        .authorized(|_, _, _| Lazy::ready(Ok(Authorization::Resolved(FieldValue::Null))))
                        .resolve(|_| FieldValue::from("resolver ran")),
                )
                .field(
                    Field::new("off", "Boolean")
                        .authorized(|_, _, _| {
                            Lazy::ready(Ok(Authorization::Resolved(FieldValue::from(false))))
                        })
                        .resolve(|_| FieldValue::from(true)),
                ),
        )
        .unauthorized_field(|_, _| FieldValue::from("hook ran"))
        .build()
        .unwrap();

    let (data, errors) = run(&schema, "{ nothing off }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"nothing": null, "off": false}));
}

#[tokio::test]
async fn checks_follow_fields_through_aliases() {
    let schema = schema(|b| b);
    let (data, errors) = run(&schema, "{ secret: open open: secret }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"secret": 1, "open": null}));

    let (data, errors) = run(&schema, "{ secret secret cached }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"secret": null, "cached": "from cache"}));
}

#[tokio::test]
async fn passing_checks_resolve_normally() {
    let ctx = Context::new().with_value("admin", true);
    let (data, errors) = run_with(&schema(|b| b), "{ secret document { title } }", &ctx).await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"secret": "s3cret", "document": {"title": "Plans"}}));
}

#[tokio::test]
async fn hooks_may_report_failures_as_errors() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let schema = schema(|b| {
        b.unauthorized_field(|e, _| FieldError::from(e.to_string()))
            .unauthorized_object(|e, _| FieldError::from(e.to_string()))
    });
    let (data, errors) = run(&schema, "{ secret document { title } }").await;
    assert_eq!(data, graphql_value!({"secret": null, "document": null}));
    assert_eq!(
        messages(&errors),
        [
            "An instance of Query failed Query's authorization check on field secret",
            "An instance of Document failed Document's authorization check",
        ],
    );
}

#[tokio::test]
async fn hooks_may_replace_unauthorized_values() {
    let schema = schema(|b| {
        b.unauthorized_field(|e, _| {
            FieldValue::from(format!("redacted {}", e.field.as_deref().unwrap_or("?")))
        })
        .unauthorized_object(|_, _| FieldValue::map([("title", "Redacted")]))
    });
    let (data, errors) = run(&schema, "{ secret document { title } }").await;
    assert_eq!(errors, []);
    assert_eq!(
        data,
        graphql_value!({"secret": "redacted secret", "document": {"title": "Redacted"}}),
    );
}
