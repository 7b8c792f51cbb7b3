//! Batching of loads issued by sibling resolvers.
//!
//! A [`DataLoader`] collects the keys requested by every resolver polled in
//! the same wave, then calls its [`BatchFn`] once for all of them. Waves end
//! cooperatively: the batch is dispatched after every waiting resolver had a
//! few chances to enqueue its keys, so no runtime timer is involved.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    future::Future,
    hash::Hash,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context as TaskContext, Poll},
};

use async_trait::async_trait;
use futures::{
    FutureExt as _,
    future::{BoxFuture, Shared},
};

use super::{FieldError, FieldResult};

/// Number of times a wave yields before its batch is dispatched.
pub const DEFAULT_YIELD_COUNT: usize = 10;

/// Batch loading function of a [`DataLoader`].
#[async_trait]
pub trait BatchFn: Send + Sync + 'static {
    /// Key identifying a loaded value.
    type Key: Clone + Eq + Hash + Send + Sync + fmt::Debug + 'static;

    /// Loaded value.
    type Value: Clone + Send + Sync + 'static;

    /// Loads every value of `keys` at once. Keys missing in the result load
    /// as [`None`].
    async fn load(&self, keys: &[Self::Key]) -> FieldResult<HashMap<Self::Key, Self::Value>>;
}

type BatchOutput<K, V> = Result<Arc<HashMap<K, V>>, FieldError>;

struct Wave<K, V> {
    keys: Arc<Mutex<Vec<K>>>,
    result: Shared<BoxFuture<'static, BatchOutput<K, V>>>,
}

struct State<K, V> {
    cache: HashMap<K, V>,
    open: Option<Wave<K, V>>,
}

struct Inner<F: BatchFn> {
    batch_fn: F,
    yield_count: usize,
    state: Mutex<State<F::Key, F::Value>>,
}

/// Batching, caching loader over a [`BatchFn`].
///
/// Cheap to clone. Clones share their cache and their open wave.
pub struct DataLoader<F: BatchFn> {
    inner: Arc<Inner<F>>,
}

impl<F: BatchFn> Clone for DataLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BatchFn> fmt::Debug for DataLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataLoader")
            .field("source", &type_name::<F>())
            .field("yield_count", &self.inner.yield_count)
            .finish_non_exhaustive()
    }
}

impl<F: BatchFn> DataLoader<F> {
    /// Creates a new loader dispatching after [`DEFAULT_YIELD_COUNT`] yields.
    pub fn new(batch_fn: F) -> Self {
        Self::with_yield_count(batch_fn, DEFAULT_YIELD_COUNT)
    }

    /// Creates a new loader dispatching after `yield_count` yields.
    pub fn with_yield_count(batch_fn: F, yield_count: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                batch_fn,
                yield_count,
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    open: None,
                }),
            }),
        }
    }

    /// Loads the value of one key.
    ///
    /// # Errors
    ///
    /// If the batch containing the key fails.
    pub async fn load(&self, key: F::Key) -> FieldResult<Option<F::Value>> {
        let wave = {
            let mut state = self.lock();
            if let Some(v) = state.cache.get(&key) {
                return Ok(Some(v.clone()));
            }
            self.enqueue(&mut state, key.clone())
        };
        let loaded = wave.await?;
        Ok(loaded.get(&key).cloned())
    }

    /// Loads the values of several keys, in the order of `keys`.
    ///
    /// # Errors
    ///
    /// If a batch containing one of the keys fails.
    pub async fn load_many(&self, keys: Vec<F::Key>) -> FieldResult<Vec<Option<F::Value>>> {
        let mut waves = Vec::new();
        {
            let mut state = self.lock();
            for key in &keys {
                if !state.cache.contains_key(key) {
                    waves.push(self.enqueue(&mut state, key.clone()));
                }
            }
        }
        for wave in waves {
            wave.await?;
        }
        let state = self.lock();
        Ok(keys.iter().map(|k| state.cache.get(k).cloned()).collect())
    }

    /// Puts a value in the cache without loading it.
    pub fn prime(&self, key: F::Key, value: F::Value) {
        self.lock().cache.entry(key).or_insert(value);
    }

    /// Forgets every cached value.
    pub fn clear(&self) {
        self.lock().cache.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<F::Key, F::Value>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(
        &self,
        state: &mut State<F::Key, F::Value>,
        key: F::Key,
    ) -> Shared<BoxFuture<'static, BatchOutput<F::Key, F::Value>>> {
        let wave = state.open.get_or_insert_with(|| self.open_wave());
        let mut keys = wave.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.contains(&key) {
            keys.push(key);
        }
        drop(keys);
        wave.result.clone()
    }

    fn open_wave(&self) -> Wave<F::Key, F::Value> {
        let keys = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&self.inner);
        let wave_keys = Arc::clone(&keys);
        let result = async move {
            for _ in 0..inner.yield_count {
                YieldNow::default().await;
            }
            let keys = {
                let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
                if state
                    .open
                    .as_ref()
                    .is_some_and(|w| Arc::ptr_eq(&w.keys, &wave_keys))
                {
                    state.open = None;
                }
                std::mem::take(&mut *wave_keys.lock().unwrap_or_else(PoisonError::into_inner))
            };
            tracing::debug!(source = type_name::<F>(), keys = keys.len(), "dispatching batch");
            let loaded = Arc::new(inner.batch_fn.load(&keys).await?);
            let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            for (k, v) in loaded.iter() {
                state.cache.insert(k.clone(), v.clone());
            }
            Ok::<_, FieldError>(loaded)
        }
        .boxed()
        .shared();
        Wave { keys, result }
    }
}

/// Request-scoped registry of [`DataLoader`]s, one per [`BatchFn`] type.
#[derive(Clone, Default)]
pub struct Dataloader {
    sources: Arc<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl fmt::Debug for Dataloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.sources.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("Dataloader").field("sources", &len).finish()
    }
}

impl Dataloader {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loader of `F`, creating it with `init` on first use.
    pub fn source<F: BatchFn>(&self, init: impl FnOnce() -> F) -> DataLoader<F> {
        let id = TypeId::of::<DataLoader<F>>();
        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(loader) = sources.get(&id).and_then(|s| s.downcast_ref::<DataLoader<F>>()) {
            return loader.clone();
        }
        let loader = DataLoader::new(init());
        sources.insert(id, Arc::new(loader.clone()));
        loader
    }

    /// Runs `f` with a fresh registry, so its loads batch and cache apart
    /// from the ones of the surrounding request.
    pub async fn run_isolated<Fut, T>(&self, f: impl FnOnce(Self) -> Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        f(Self::new()).await
    }
}

/// Yields to the executor once.
#[derive(Debug, Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;
    use futures::future::join_all;
    use pretty_assertions::assert_eq;

    use super::{BatchFn, DataLoader, Dataloader};
    use crate::{FieldError, FieldResult};

    #[derive(Default)]
    struct Doubler {
        batches: Arc<Mutex<Vec<Vec<i32>>>>,
    }

    #[async_trait]
    impl BatchFn for Doubler {
        type Key = i32;
        type Value = i32;

        async fn load(&self, keys: &[i32]) -> FieldResult<HashMap<i32, i32>> {
            self.batches.lock().unwrap().push(keys.to_vec());
            Ok(keys.iter().filter(|k| **k >= 0).map(|k| (*k, k * 2)).collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl BatchFn for Failing {
        type Key = i32;
        type Value = i32;

        async fn load(&self, _: &[i32]) -> FieldResult<HashMap<i32, i32>> {
            Err(FieldError::from("backend down"))
        }
    }

    #[tokio::test]
    async fn batches_concurrent_loads_into_one_wave() {
        let doubler = Doubler::default();
        let batches = Arc::clone(&doubler.batches);
        let loader = DataLoader::new(doubler);

        let results = join_all([1, 2, 1, -1].map(|k| loader.load(k))).await;
        let values = results.into_iter().map(Result::unwrap).collect::<Vec<_>>();
        assert_eq!(values, [Some(2), Some(4), Some(2), None]);
        assert_eq!(*batches.lock().unwrap(), [vec![1, 2, -1]]);

        assert_eq!(loader.load(2).await.unwrap(), Some(4));
        assert_eq!(batches.lock().unwrap().len(), 1);
        assert_eq!(loader.load_many(vec![3, 1]).await.unwrap(), [Some(6), Some(2)]);
        assert_eq!(batches.lock().unwrap()[1], [3]);
    }

    #[tokio::test]
    async fn batch_errors_reach_every_waiter() {
        let loader = DataLoader::new(Failing);
        let results = join_all([1, 2].map(|k| loader.load(k))).await;
        for r in results {
            assert_eq!(r.unwrap_err().message(), "backend down");
        }
    }

    #[tokio::test]
    async fn registry_shares_loaders_unless_isolated() {
        let registry = Dataloader::new();
        let a = registry.source(Doubler::default);
        a.prime(7, 70);
        let b = registry.source(Doubler::default);
        assert_eq!(b.load(7).await.unwrap(), Some(70));

        let isolated = registry
            .run_isolated(async |fresh| fresh.source(Doubler::default).load(7).await)
            .await;
        assert_eq!(isolated.unwrap(), Some(14));
    }
}
