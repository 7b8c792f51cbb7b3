//! Utilities for building HTTP endpoints in a library-agnostic manner

use serde::{
    Deserialize, Serialize, de,
    ser::{self, SerializeMap as _},
};

use crate::{
    Context, ExecutionError, FieldError, GraphQLError, InputValue, Schema, Value, Variables,
};

/// The expected structure of the decoded JSON document for either POST or GET requests.
///
/// For POST, you can use Serde to deserialize the incoming JSON data directly
/// into this struct - it derives Deserialize for exactly this reason.
///
/// For GET, you will need to parse the query string and extract "query",
/// "operationName", and "variables" manually.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GraphQLRequest {
    /// GraphQL query representing this request.
    pub query: String,

    /// Optional name of the operation associated with this request.
    #[serde(rename = "operationName", default)]
    pub operation_name: Option<String>,

    /// Optional variables to execute the GraphQL operation with.
    #[serde(default)]
    pub variables: Option<InputValue>,
}

impl GraphQLRequest {
    /// Construct a new GraphQL request from parts
    pub fn new(
        query: impl Into<String>,
        operation_name: Option<String>,
        variables: Option<InputValue>,
    ) -> Self {
        Self {
            query: query.into(),
            operation_name,
            variables,
        }
    }

    /// Returns operation [`Variables`] defined withing this request.
    ///
    /// Anything but an object counts as no variables.
    pub fn variables(&self) -> Variables {
        self.variables
            .as_ref()
            .and_then(|iv| {
                iv.to_object_value()
                    .map(|o| o.into_iter().map(|(k, v)| (k.into(), v.clone())).collect())
            })
            .unwrap_or_default()
    }

    /// Execute a GraphQL request synchronously using the specified schema and context
    ///
    /// This is a simple wrapper around the `execute_sync` function exposed at the
    /// top level of this crate.
    pub fn execute_sync(&self, schema: &Schema, context: &Context) -> GraphQLResponse {
        GraphQLResponse(crate::execute_sync(
            &self.query,
            self.operation_name.as_deref(),
            schema,
            &self.variables(),
            context,
        ))
    }

    /// Execute a GraphQL request using the specified schema and context
    ///
    /// This is a simple wrapper around the `execute` function exposed at the
    /// top level of this crate.
    pub async fn execute(&self, schema: &Schema, context: &Context) -> GraphQLResponse {
        let op = self.operation_name.as_deref();
        let vars = &self.variables();
        GraphQLResponse(crate::execute(&self.query, op, schema, vars, context).await)
    }
}

/// Simple wrapper around the result from executing a GraphQL query
///
/// This struct implements Serialize, so you can simply serialize this
/// to JSON and send it over the wire. Use the `is_ok` method to determine
/// whether to send a 200 or 400 HTTP status code.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphQLResponse(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl GraphQLResponse {
    /// Constructs new `GraphQLResponse` using the given result
    pub fn from_result(r: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(r)
    }

    /// Constructs an error response outside of the normal execution flow
    pub fn error(error: FieldError) -> Self {
        Self(Ok((Value::null(), vec![ExecutionError::at_origin(error)])))
    }

    /// Was the request successful or not?
    ///
    /// Note that there still might be errors in the response even though it's
    /// considered OK, since GraphQL reports field errors along with data.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// Unwraps the underlying result.
    pub fn into_result(self) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        self.0
    }
}

impl Serialize for GraphQLResponse {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Ok((res, err)) => {
                let mut map = serializer.serialize_map(None)?;

                map.serialize_key("data")?;
                map.serialize_value(res)?;

                if !err.is_empty() {
                    map.serialize_key("errors")?;
                    map.serialize_value(err)?;
                }

                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_key("errors")?;
                map.serialize_value(err)?;
                map.end()
            }
        }
    }
}

impl Serialize for GraphQLError {
    fn serialize<S: ser::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Helper {
            message: String,
        }

        let message = |m: &str| [Helper { message: m.into() }];

        match self {
            Self::ValidationError(es) => es.serialize(ser),
            Self::VariableError(es) => es.serialize(ser),
            Self::NoOperationProvided => message("Must provide an operation").serialize(ser),
            Self::MultipleOperationsProvided => message(
                "Must provide operation name if query contains multiple operations",
            )
            .serialize(ser),
            Self::UnknownOperationName => message("Unknown operation").serialize(ser),
            Self::IsSubscription => message("Expected query, got subscription").serialize(ser),
            Self::NotSubscription => message("Expected subscription, got query").serialize(ser),
            Self::ParseError(_) | Self::DuplicateNames(_) | Self::UnknownVisibilityProfile(_) => {
                message(&self.to_string()).serialize(ser)
            }
        }
    }
}

/// Simple wrapper around GraphQLRequest to allow the handling of Batch requests.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GraphQLBatchRequest {
    /// A single operation request.
    Single(GraphQLRequest),

    /// A batch operation request.
    ///
    /// Empty batch is considered as invalid value, so cannot be deserialized.
    #[serde(deserialize_with = "deserialize_non_empty_batch")]
    Batch(Vec<GraphQLRequest>),
}

fn deserialize_non_empty_batch<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: de::Deserializer<'de>,
    T: Deserialize<'de>,
{
    use de::Error as _;

    let v = Vec::<T>::deserialize(deserializer)?;
    if v.is_empty() {
        Err(D::Error::invalid_length(
            0,
            &"non-empty batch of GraphQL requests",
        ))
    } else {
        Ok(v)
    }
}

impl GraphQLBatchRequest {
    /// Execute a GraphQL batch request synchronously using the specified schema and context
    pub fn execute_sync(&self, schema: &Schema, context: &Context) -> GraphQLBatchResponse {
        match self {
            Self::Single(req) => GraphQLBatchResponse::Single(req.execute_sync(schema, context)),
            Self::Batch(reqs) => GraphQLBatchResponse::Batch(
                reqs.iter().map(|req| req.execute_sync(schema, context)).collect(),
            ),
        }
    }

    /// Executes a GraphQL batch request using the specified schema and context
    ///
    /// Requests of a batch run concurrently.
    pub async fn execute(&self, schema: &Schema, context: &Context) -> GraphQLBatchResponse {
        match self {
            Self::Single(req) => GraphQLBatchResponse::Single(req.execute(schema, context).await),
            Self::Batch(reqs) => GraphQLBatchResponse::Batch(
                futures::future::join_all(reqs.iter().map(|req| req.execute(schema, context)))
                    .await,
            ),
        }
    }

    /// The operation names of the request.
    pub fn operation_names(&self) -> Vec<Option<&str>> {
        match self {
            Self::Single(req) => vec![req.operation_name.as_deref()],
            Self::Batch(reqs) => reqs.iter().map(|r| r.operation_name.as_deref()).collect(),
        }
    }
}

/// Simple wrapper around the result (GraphQLResponse) from executing a GraphQLBatchRequest
///
/// This struct implements Serialize, so you can simply serialize this
/// to JSON and send it over the wire. use the `is_ok` to determine
/// whether to send a 200 or 400 HTTP status code.
#[derive(Serialize)]
#[serde(untagged)]
pub enum GraphQLBatchResponse {
    /// Result of a single operation in a GraphQL request.
    Single(GraphQLResponse),
    /// Result of a batch operation in a GraphQL request.
    Batch(Vec<GraphQLResponse>),
}

impl GraphQLBatchResponse {
    /// Returns if all the GraphQLResponse in this operation are ok,
    /// you can use it to determine whether to send a 200 or 400 HTTP status code.
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Single(resp) => resp.is_ok(),
            Self::Batch(resps) => resps.iter().all(GraphQLResponse::is_ok),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{GraphQLBatchRequest, GraphQLRequest, GraphQLResponse};
    use crate::{
        Context, FieldError, FieldResult, GraphQLError, Schema, Value, graphql_input_value,
        schema::meta::{Argument, Field, ObjectMeta},
    };

    fn schema() -> Schema {
        Schema::builder()
            .query(
                ObjectMeta::new("Query").field(
                    Field::new("greet", "String!")
                        .argument(Argument::new("name", "String").default_value("world"))
                        .resolve(|ctx| {
                            let name = ctx.arg("name").and_then(|v| v.as_str()).unwrap_or("?");
                            FieldResult::Ok(Value::from(format!("Hello, {name}!")))
                        }),
                ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn deserializes_requests() {
        let req: GraphQLRequest = serde_json::from_value(json!({
            "query": "query Q($name: String) { greet(name: $name) }",
            "operationName": "Q",
            "variables": {"name": "Ada"},
        }))
        .unwrap();
        assert_eq!(req.operation_name.as_deref(), Some("Q"));
        assert_eq!(req.variables().get("name"), Some(&"Ada".into()));

        let bare: GraphQLRequest = serde_json::from_value(json!({"query": "{ greet }"})).unwrap();
        assert_eq!(bare, GraphQLRequest::new("{ greet }", None, None));
        assert!(bare.variables().is_empty());
    }

    #[test]
    fn serializes_successful_responses_without_errors_key() {
        let req = GraphQLRequest::new(
            "query Q($name: String) { greet(name: $name) }",
            None,
            Some(graphql_input_value!({"name": "Ada"})),
        );
        let res = req.execute_sync(&schema(), &Context::new());
        assert!(res.is_ok());
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({"data": {"greet": "Hello, Ada!"}}),
        );
    }

    #[test]
    fn serializes_field_errors_along_with_data() {
        let res = GraphQLResponse::error(FieldError::from("Service unavailable"));
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({
                "data": null,
                "errors": [{"message": "Service unavailable"}],
            }),
        );
    }

    #[test]
    fn serializes_request_errors_without_data() {
        let res = GraphQLResponse::from_result(Err(GraphQLError::MultipleOperationsProvided));
        assert!(!res.is_ok());
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({"errors": [{
                "message": "Must provide operation name if query contains multiple operations",
            }]}),
        );

        let res = GraphQLRequest::new("{ greet(", None, None).execute_sync(&schema(), &Context::new());
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn executes_batches() {
        let batch: GraphQLBatchRequest = serde_json::from_value(json!([
            {"query": "{ greet }"},
            {"query": "{ greet(name: \"Bob\") }"},
        ]))
        .unwrap();
        assert_eq!(batch.operation_names(), vec![None, None]);

        let res = batch.execute(&schema(), &Context::new()).await;
        assert!(res.is_ok());
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!([
                {"data": {"greet": "Hello, world!"}},
                {"data": {"greet": "Hello, Bob!"}},
            ]),
        );
    }

    #[test]
    fn rejects_empty_batches() {
        assert!(serde_json::from_value::<GraphQLBatchRequest>(json!([])).is_err());
    }
}
