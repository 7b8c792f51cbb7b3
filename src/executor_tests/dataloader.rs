use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use crate::{
    Field, FieldError, FieldResult, FieldValue, ObjectMeta, Schema, SchemaBuilder,
    executor::BatchFn, graphql_value,
    tests::util::run,
};

type Batches = Arc<Mutex<Vec<Vec<i32>>>>;

struct Authors {
    batches: Batches,
}

#[async_trait]
impl BatchFn for Authors {
    type Key = i32;
    type Value = String;

    async fn load(&self, keys: &[i32]) -> FieldResult<HashMap<i32, String>> {
        self.batches.lock().unwrap().push(keys.to_vec());
        Ok(keys
            .iter()
            .filter(|k| **k != 404)
            .map(|k| (*k, format!("author {k}")))
            .collect())
    }
}

fn schema(batches: &Batches) -> Schema {
    let batches = Arc::clone(batches);
    let post = |id: i32, author: i32| FieldValue::map([("id", id), ("author_id", author)]);
    SchemaBuilder::new()
        .query(ObjectMeta::new("Query").field(Field::new("posts", "[Post!]!").resolve(move |_| {
            FieldValue::list([post(1, 1), post(2, 2), post(3, 1), post(4, 404)])
        })))
        .register(
            ObjectMeta::new("Post")
                .field(Field::new("id", "Int!"))
                .field(Field::new("author", "String").resolve_async(move |ctx| {
                    let batches = Arc::clone(&batches);
                    async move {
                        let Some(id) = ctx.object().get("author_id").and_then(|v| v.as_i32()) else {
                            return Ok(FieldValue::Null);
                        };
                        let loader = ctx.dataloader().source(|| Authors { batches });
                        let name = loader.load(id).await?;
                        Ok::<_, FieldError>(FieldValue::from(name))
                    }
                })),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn sibling_loads_share_one_batch() {
    let batches = Batches::default();
    let schema = schema(&batches);

    let (data, errors) = run(&schema, "{ posts { id author } }").await;
    assert_eq!(errors, []);
    assert_eq!(
        data,
        graphql_value!({"posts": [
            {"id": 1, "author": "author 1"},
            {"id": 2, "author": "author 2"},
            {"id": 3, "author": "author 1"},
            {"id": 4, "author": null},
        ]}),
    );
    assert_eq!(*batches.lock().unwrap(), [vec![1, 2, 404]]);
}

#[tokio::test]
async fn each_request_gets_its_own_loaders() {
    let batches = Batches::default();
    let schema = schema(&batches);

    run(&schema, "{ posts { author } }").await;
    run(&schema, "{ posts { author } }").await;
    assert_eq!(batches.lock().unwrap().len(), 2);
}
