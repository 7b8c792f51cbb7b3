use std::{any::Any, fmt, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::value::{ScalarValue, Value};

/// Internal (application-level) value flowing through field resolution.
///
/// Resolvers produce these, and coerced argument values take this shape too.
#[derive(Clone, Default)]
pub enum FieldValue {
    /// Absence of a value.
    #[default]
    Null,

    /// Plain data. Leaf types are coerced out of this, and object fields are
    /// resolved by key lookup on [`Value::Object`]s.
    Value(Value),

    /// List of values.
    List(Vec<FieldValue>),

    /// Keyed values: coerced input objects, or hash-like parents resolved by
    /// key lookup.
    Map(IndexMap<String, FieldValue>),

    /// Opaque application object.
    Opaque(Arc<dyn Any + Send + Sync>),

    /// Value tagged with its concrete GraphQL object type, used to resolve
    /// abstract types.
    Typed {
        /// Name of the concrete object type.
        type_name: ArcStr,

        /// The tagged value.
        value: Box<FieldValue>,
    },
}

impl FieldValue {
    /// Wraps an application object.
    pub fn opaque<T: Any + Send + Sync>(v: T) -> Self {
        Self::Opaque(Arc::new(v))
    }

    /// Tags a value with its concrete object type.
    pub fn typed(type_name: impl Into<ArcStr>, value: impl Into<Self>) -> Self {
        Self::Typed {
            type_name: type_name.into(),
            value: Box::new(value.into()),
        }
    }

    /// Constructs a list value.
    pub fn list<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Constructs a keyed value.
    pub fn map<K: Into<String>, V: Into<Self>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Strips a type tag, if any.
    pub fn untagged(&self) -> &Self {
        match self {
            Self::Typed { value, .. } => value.untagged(),
            v => v,
        }
    }

    /// Returns the concrete type tag, if any.
    pub fn type_tag(&self) -> Option<&ArcStr> {
        match self {
            Self::Typed { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Does this value represent `null`?
    pub fn is_null(&self) -> bool {
        matches!(self.untagged(), Self::Null | Self::Value(Value::Null))
    }

    /// Downcasts an opaque application object.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self.untagged() {
            Self::Opaque(o) => o.downcast_ref(),
            _ => None,
        }
    }

    /// Views plain data.
    pub fn as_value(&self) -> Option<&Value> {
        match self.untagged() {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Views a scalar.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        self.as_value().and_then(Value::as_scalar)
    }

    /// Views a string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// Views an integer.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_scalar().and_then(ScalarValue::as_int)
    }

    /// Views a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(ScalarValue::as_bool)
    }

    /// Views a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(ScalarValue::as_float)
    }

    /// Views a keyed value.
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self.untagged() {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Views list items. Plain data lists are viewed item by item.
    pub fn to_list(&self) -> Option<Vec<FieldValue>> {
        match self.untagged() {
            Self::List(l) => Some(l.clone()),
            Self::Value(Value::List(l)) => Some(l.iter().cloned().map(Self::Value).collect()),
            _ => None,
        }
    }

    /// Looks a key up on a map-like value.
    pub fn get(&self, key: &str) -> Option<FieldValue> {
        match self.untagged() {
            Self::Map(m) => m.get(key).cloned(),
            Self::Value(Value::Object(o)) => o.get_field_value(key).cloned().map(Self::Value),
            _ => None,
        }
    }

    /// Converts this value into plain data, if it holds no opaque objects.
    pub fn to_plain(&self) -> Option<Value> {
        match self.untagged() {
            Self::Null => Some(Value::Null),
            Self::Value(v) => Some(v.clone()),
            Self::List(l) => l.iter().map(Self::to_plain).collect::<Option<_>>().map(Value::List),
            Self::Map(m) => m
                .iter()
                .map(|(k, v)| v.to_plain().map(|v| (k.clone(), v)))
                .collect::<Option<_>>()
                .map(Value::Object),
            Self::Opaque(_) | Self::Typed { .. } => None,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::List(l) => f.debug_tuple("List").field(l).finish(),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
            Self::Typed { type_name, value } => f
                .debug_struct("Typed")
                .field("type_name", type_name)
                .field("value", value)
                .finish(),
        }
    }
}

impl PartialEq for FieldValue {
    /// Opaque objects are equal when they're the same allocation.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            (
                Self::Typed { type_name: n1, value: v1 },
                Self::Typed { type_name: n2, value: v2 },
            ) => n1 == n2 && v1 == v2,
            _ => false,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            v => Self::Value(v),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}

macro_rules! impl_from_plain {
    ($($t:ty),*) => {$(
        impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                Self::Value(Value::from(v))
            }
        }
    )*};
}

impl_from_plain!(i32, f64, bool, String, &str, ScalarValue);

/// Coerced arguments of a field, keyed by their resolver keyword.
///
/// Optional arguments that were neither given nor defaulted are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<String, FieldValue>,
}

impl Arguments {
    /// Creates empty [`Arguments`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the given argument.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.args.get(key)
    }

    /// Indicates whether the argument is present.
    pub fn contains(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    /// Sets an argument, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.args.insert(key.into(), value)
    }

    /// Removes an argument.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.args.shift_remove(key)
    }

    /// Iterates over the arguments in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.args.iter()
    }

    /// Number of present arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Indicates whether no argument is present.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the arguments as a keyed [`FieldValue`].
    pub fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(self.args.clone())
    }
}

impl FromIterator<(String, FieldValue)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}
