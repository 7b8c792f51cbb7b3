use pretty_assertions::assert_eq;

use crate::{
    Argument, Context, EnumMeta, EnumValue, ExecutionError, Field, FieldValue, GraphQLError,
    InputObjectMeta, ObjectMeta, Schema, SchemaBuilder, Variables, execute, graphql_value,
    graphql_vars,
    tests::util::run_variable_query,
};

fn echo(name: &'static str, ty: &'static str) -> Field {
    Field::new(name, "String")
        .argument(Argument::new("value", ty))
        .resolve(|ctx| {
            let shown = match ctx.arg("value") {
                None => "<omitted>".to_owned(),
                Some(v) => v.to_plain().map_or_else(|| format!("{v:?}"), |v| v.to_string()),
            };
            FieldValue::from(shown)
        })
}

fn schema() -> Schema {
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(echo("int", "Int"))
                .field(echo("required", "Int!"))
                .field(echo("input", "TestInput"))
                .field(
                    Field::new("fields", "String")
                        .argument(Argument::new("value", "TestInput"))
                        .resolve(|ctx| {
                            let v = ctx.arg("value").cloned().unwrap_or_default();
                            let field = |k: &str| {
                                v.get(k)
                                    .and_then(|f| f.to_plain())
                                    .map_or_else(|| "-".to_owned(), |p| p.to_string())
                            };
                            FieldValue::from(format!("a={} c={} d={}", field("a"), field("c"), field("d")))
                        }),
                )
                .field(echo("lang", "Language"))
                .field(echo("one", "OneOfInput")),
        )
        .register(
            InputObjectMeta::new("TestInput")
                .argument(Argument::new("a", "String"))
                .argument(Argument::new("b", "[String!]"))
                .argument(Argument::new("c", "String!"))
                .argument(Argument::new("d", "Int").default_value(7)),
        )
        .register(
            EnumMeta::new("Language")
                .value(EnumValue::new("PYTHON").value("py"))
                .value(EnumValue::new("RUST").value("rs")),
        )
        .register(
            InputObjectMeta::new("OneOfInput")
                .one_of()
                .argument(Argument::new("arg1", "Int"))
                .argument(Argument::new("arg2", "Int")),
        )
        .build()
        .unwrap()
}

async fn run(query: &str, vars: Variables) -> crate::Value {
    let (data, errors) = run_variable_query(&schema(), query, &vars, &Context::new()).await;
    assert_eq!(errors, []);
    data
}

async fn variable_errors(query: &str, vars: Variables) -> Vec<ExecutionError> {
    match execute(query, None, &schema(), &vars, &Context::new()).await {
        Err(GraphQLError::VariableError(errors)) => errors,
        other => panic!("expected variable errors, got {other:?}"),
    }
}

#[tokio::test]
async fn variables_fill_arguments_and_defaults() {
    let data = run(
        "query Q($v: Int, $d: Int = 5, $missing: Int) { a: int(value: $v) b: int(value: $d) c: int(value: $missing) }",
        graphql_vars! {"v": 3},
    )
    .await;
    assert_eq!(data, graphql_value!({"a": "3", "b": "5", "c": "<omitted>"}));
}

#[tokio::test]
async fn explicit_null_is_kept_apart_from_omission() {
    let data = run(
        "query Q($v: Int) { int(value: $v) }",
        graphql_vars! {"v": null},
    )
    .await;
    assert_eq!(data, graphql_value!({"int": "null"}));
}

#[tokio::test]
async fn variables_inside_literals_and_input_defaults() {
    let data = run(
        r#"query Q($c: String!) { plain: fields(value: {a: "x", c: $c}) }"#,
        graphql_vars! {"c": "see"},
    )
    .await;
    assert_eq!(data, graphql_value!({"plain": r#"a="x" c="see" d=7"#}));
}

#[tokio::test]
async fn enum_variables_become_internal_values() {
    let data = run(
        "query Q($l: Language) { lang(value: $l) }",
        graphql_vars! {"l": "RUST"},
    )
    .await;
    assert_eq!(data, graphql_value!({"lang": "\"rs\""}));
}

#[tokio::test]
async fn missing_required_variables() {
    let errors = variable_errors("query Q($r: Int!) { required(value: $r) }", Variables::new()).await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Variable $r of type Int! was provided invalid value");
    assert_eq!(
        errors[0].error().extensions(),
        &graphql_value!({
            "value": null,
            "problems": [{"path": [], "explanation": "Expected value to not be null"}],
        }),
    );
}

#[tokio::test]
async fn invalid_nested_variables_are_located() {
    let errors = variable_errors(
        "query Q($i: TestInput) { input(value: $i) }",
        graphql_vars! {"i": {"a": "x", "b": ["y", null]}},
    )
    .await;
    let message = errors[0].message();
    assert!(
        message.starts_with("Variable $i of type TestInput was provided invalid value for "),
        "{message}",
    );
    assert!(message.contains("c (Expected value to not be null)"), "{message}");
    assert!(message.contains("b.1 (Expected value to not be null)"), "{message}");
}

#[tokio::test]
async fn one_of_variables_need_a_non_null_key() {
    let errors = variable_errors(
        "query Q($o: OneOfInput) { one(value: $o) }",
        graphql_vars! {"o": {"arg1": null}},
    )
    .await;
    assert!(
        errors[0]
            .message()
            .starts_with("Variable $o of type OneOfInput was provided invalid value"),
        "{}",
        errors[0].message(),
    );

    let data = run(
        "query Q($o: OneOfInput) { one(value: $o) }",
        graphql_vars! {"o": {"arg2": 2}},
    )
    .await;
    assert_eq!(data, graphql_value!({"one": r#"{"arg2": 2}"#}));
}

#[tokio::test]
async fn explicit_null_for_a_defaulted_variable_fails_the_field() {
    let (data, errors) = run_variable_query(
        &schema(),
        "query Q($r: Int = 1) { required(value: $r) int }",
        &graphql_vars! {"r": null},
        &Context::new(),
    )
    .await;
    assert_eq!(data, graphql_value!({"required": null, "int": "<omitted>"}));
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Argument 'value' on Field 'required' has an invalid value (null). Expected type 'Int!'.",
    );
}
