use pretty_assertions::assert_eq;

use crate::{
    Context, Field, FieldValue, ObjectMeta, Schema, SchemaBuilder, Value, Variables,
    graphql_value, graphql_vars,
};

fn schema() -> Schema {
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("TestType")
                .field(Field::new("a", "String").resolve(|_| FieldValue::from("a")))
                .field(Field::new("b", "String").resolve(|_| FieldValue::from("b"))),
        )
        .build()
        .unwrap()
}

async fn run_variable_query(query: &str, vars: Variables) -> Value {
    let (data, errors) = crate::execute(query, None, &schema(), &vars, &Context::new())
        .await
        .unwrap_or_else(|e| panic!("`{query}` failed: {e}"));
    assert_eq!(errors, []);
    data
}

async fn run_query(query: &str) -> Value {
    run_variable_query(query, Variables::new()).await
}

#[tokio::test]
async fn include_and_skip_on_fields() {
    assert_eq!(
        run_query("{ a, b @include(if: true) }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
    assert_eq!(run_query("{ a, b @include(if: false) }").await, graphql_value!({"a": "a"}));
    assert_eq!(run_query("{ a, b @skip(if: true) }").await, graphql_value!({"a": "a"}));
    assert_eq!(
        run_query("{ a @skip(if: false), b }").await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}

#[tokio::test]
async fn skip_wins_over_include() {
    assert_eq!(
        run_query("{ a, b @include(if: true) @skip(if: true) }").await,
        graphql_value!({"a": "a"}),
    );
}

#[tokio::test]
async fn conditions_apply_to_fragments() {
    assert_eq!(
        run_query("{ a, ...Frag @include(if: false) } fragment Frag on TestType { b }").await,
        graphql_value!({"a": "a"}),
    );
    assert_eq!(
        run_query("{ a, ... on TestType @skip(if: true) { b } }").await,
        graphql_value!({"a": "a"}),
    );
    assert_eq!(
        run_query("{ ... @include(if: true) { b } }").await,
        graphql_value!({"b": "b"}),
    );
}

#[tokio::test]
async fn conditions_from_variables() {
    let query = "query Q($show: Boolean!) { a, b @include(if: $show) }";
    assert_eq!(
        run_variable_query(query, graphql_vars! {"show": false}).await,
        graphql_value!({"a": "a"}),
    );
    assert_eq!(
        run_variable_query(query, graphql_vars! {"show": true}).await,
        graphql_value!({"a": "a", "b": "b"}),
    );
}
