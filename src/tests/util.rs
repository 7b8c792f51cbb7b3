use crate::{Context, ExecutionError, Schema, Value, Variables, execute};

pub(crate) async fn run(schema: &Schema, query: &str) -> (Value, Vec<ExecutionError>) {
    run_with(schema, query, &Context::new()).await
}

pub(crate) async fn run_with(
    schema: &Schema,
    query: &str,
    ctx: &Context,
) -> (Value, Vec<ExecutionError>) {
    run_variable_query(schema, query, &Variables::new(), ctx).await
}

pub(crate) async fn run_variable_query(
    schema: &Schema,
    query: &str,
    vars: &Variables,
    ctx: &Context,
) -> (Value, Vec<ExecutionError>) {
    execute(query, None, schema, vars, ctx)
        .await
        .unwrap_or_else(|e| panic!("request failed: {e}"))
}

pub(crate) fn messages(errors: &[ExecutionError]) -> Vec<&str> {
    errors.iter().map(ExecutionError::message).collect()
}
