use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;

use crate::{
    Context, Field, FieldValue, GraphQLError, Member, ObjectMeta, Schema, SchemaBuilder,
    SchemaConfig, SchemaError, Variables, VisibilityStrategy, execute, graphql_value,
    tests::util::{run, run_with},
};

fn profiles(strategy: VisibilityStrategy) -> SchemaConfig {
    SchemaConfig {
        visibility_strategy: strategy,
        ..SchemaConfig::from_json(
            r#"{"visibility_profiles": {"public": {}, "internal": {"admin": true}}}"#,
        )
        .unwrap()
    }
}

fn stats_schema(calls: &Arc<AtomicUsize>) -> Schema {
    let calls = Arc::clone(calls);
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("name", "String").resolve(|_| FieldValue::from("shop")))
                .field(
                    Field::new("stats", "Int")
                        .visible(move |ctx: &Context| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            ctx.flag("admin")
                        })
                        .resolve(|_| FieldValue::from(99)),
                ),
        )
        .config(profiles(VisibilityStrategy::Lazy))
        .build()
        .unwrap()
}

fn with_duplicates() -> SchemaBuilder {
    SchemaBuilder::new().query(
        ObjectMeta::new("Query")
            .field(
                Field::new("f1", "Int")
                    .visible(|ctx: &Context| ctx.flag("future_schema"))
                    .resolve(|_| FieldValue::from(1)),
            )
            .field(Field::new("f1", "String").resolve(|_| FieldValue::from("one"))),
    )
}

#[tokio::test]
async fn profiles_filter_and_cache_visibility() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = stats_schema(&calls);

    let internal = Context::new().with_visibility_profile("internal");
    let (data, errors) = run_with(&schema, "{ name stats }", &internal).await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"name": "shop", "stats": 99}));
    let evaluated = calls.load(Ordering::SeqCst);
    assert!(evaluated > 0);

    let (data, _) = run_with(&schema, "{ stats }", &internal).await;
    assert_eq!(data, graphql_value!({"stats": 99}));
    assert_eq!(calls.load(Ordering::SeqCst), evaluated);

    let public = Context::new().with_visibility_profile("public");
    let err = execute("{ stats }", None, &schema, &Variables::new(), &public)
        .await
        .unwrap_err();
    let GraphQLError::ValidationError(errors) = &err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(errors[0].message(), "Field 'stats' doesn't exist on type 'Query'");

    let (data, errors) = run_with(
        &schema,
        r#"{ __type(name: "Query") { fields { name } } }"#,
        &public,
    )
    .await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"__type": {"fields": [{"name": "name"}]}}));
}

#[tokio::test]
async fn rejects_unknown_profiles() {
    let schema = stats_schema(&Arc::default());
    let ctx = Context::new().with_visibility_profile("partners");
    let err = execute("{ name }", None, &schema, &Variables::new(), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err, GraphQLError::UnknownVisibilityProfile("partners".into()));
    assert_eq!(err.to_string(), "Visibility profile `partners` is not configured");
}

#[tokio::test]
async fn requests_without_profile_use_their_own_context() {
    let schema = stats_schema(&Arc::default());
    let admin = Context::new().with_value("admin", true);
    let (data, errors) = run_with(&schema, "{ stats }", &admin).await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"stats": 99}));
}

#[tokio::test]
async fn ambiguous_names_fail_the_request() {
    let schema = with_duplicates().build().unwrap();

    let (data, errors) = run(&schema, "{ f1 }").await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"f1": "one"}));

    let ctx = Context::new().with_value("future_schema", true);
    let err = execute("{ f1 }", None, &schema, &Variables::new(), &ctx)
        .await
        .unwrap_err();
    let GraphQLError::DuplicateNames(e) = &err else {
        panic!("expected duplicate names, got {err:?}");
    };
    assert_eq!(e.duplicated_name, "Query.f1");
    assert_eq!(e.definitions.len(), 2);
}

#[test]
fn eager_profiles_surface_duplicates_at_build_time() {
    let mut config = SchemaConfig {
        visibility_strategy: VisibilityStrategy::Eager,
        ..SchemaConfig::default()
    };
    config.visibility_profiles.insert(
        "future".into(),
        [("future_schema".to_owned(), serde_json::Value::Bool(true))]
            .into_iter()
            .collect(),
    );

    let err = with_duplicates().config(config).build().unwrap_err();
    let SchemaError::DuplicateNames(e) = &err else {
        panic!("expected duplicate names, got {err:?}");
    };
    assert_eq!(e.duplicated_name, "Query.f1");
}

#[tokio::test]
async fn schema_hook_applies_to_every_member() {
    let schema = SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("public", "Int").resolve(|_| FieldValue::from(1)))
                .field(Field::new("internal_count", "Int").resolve(|_| FieldValue::from(2))),
        )
        .visible(|member, ctx| match member {
            Member::Field(f) => !f.name.starts_with("internal") || ctx.flag("staff"),
            _ => true,
        })
        .build()
        .unwrap();

    let (data, _) = run(&schema, r#"{ __type(name: "Query") { fields { name } } }"#).await;
    assert_eq!(data, graphql_value!({"__type": {"fields": [{"name": "public"}]}}));

    let staff = Context::new().with_value("staff", true);
    let (data, errors) = run_with(&schema, "{ public internalCount }", &staff).await;
    assert_eq!(errors, []);
    assert_eq!(data, graphql_value!({"public": 1, "internalCount": 2}));
}
