use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use arcstr::ArcStr;
use indexmap::IndexMap;

use super::FieldValue;
use crate::value::Value;

/// Per-request bag of values handed to every resolver and hook.
///
/// Cheap to clone. Holds plain values looked up by string key, typed data
/// looked up by type, and the request's visibility profile and root value.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<IndexMap<String, Value>>,
    data: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    profile: Option<ArcStr>,
    root_value: FieldValue,
    event: Option<FieldValue>,
}

impl Context {
    /// Creates an empty [`Context`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a plain value under `key`.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    /// Stores typed data, replacing data of the same type.
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        let mut map = (*self.data).clone();
        map.insert(TypeId::of::<T>(), Arc::new(data));
        self.data = Arc::new(map);
        self
    }

    /// Selects a named visibility profile configured on the schema.
    #[must_use]
    pub fn with_visibility_profile(mut self, name: impl Into<ArcStr>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Sets the value root fields are resolved against.
    #[must_use]
    pub fn with_root_value(mut self, root: impl Into<FieldValue>) -> Self {
        self.root_value = root.into();
        self
    }

    pub(crate) fn with_event(mut self, event: FieldValue) -> Self {
        self.event = Some(event);
        self
    }

    /// Looks a plain value up.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Indicates whether `key` holds `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .and_then(Value::as_scalar)
            .and_then(|s| s.as_bool())
            .unwrap_or(false)
    }

    /// Looks typed data up.
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Name of the selected visibility profile.
    pub fn visibility_profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Value root fields are resolved against.
    pub fn root_value(&self) -> &FieldValue {
        &self.root_value
    }

    /// Object a subscription was triggered with, when re-running a
    /// subscription.
    pub fn subscription_event(&self) -> Option<&FieldValue> {
        self.event.as_ref()
    }

    pub(crate) fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
