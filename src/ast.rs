use std::{collections::HashMap, fmt};

use arcstr::ArcStr;
use graphql_parser::query as parsed;
use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer, de,
    ser::{SerializeMap as _, SerializeSeq as _},
};

use crate::value::{ScalarValue, Value};

/// A type literal in the syntax tree.
///
/// This enum carries no semantic information and might refer to types that
/// do not exist. Its shape rules out a non-null type wrapping another
/// non-null type.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`.
    Named(ArcStr),

    /// A nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),

    /// A non-null named type, e.g. `String!`.
    NonNullNamed(ArcStr),

    /// A non-null list type, e.g. `[String]!`.
    ///
    /// The list itself is what's non-null, the containing type might be null.
    NonNullList(Box<Type>),
}

impl Type {
    /// Constructs a nullable named type.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Constructs a nullable list of `inner`.
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wraps this type into a non-null one. Already non-null types are returned as is.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::Named(n) => Self::NonNullNamed(n),
            Self::List(l) => Self::NonNullList(l),
            t => t,
        }
    }

    /// Strips the outermost non-null modifier, if any.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            Self::NonNullNamed(n) => Self::Named(n),
            Self::NonNullList(l) => Self::List(l),
            t => t,
        }
    }

    /// Returns the name of this type, if it's a named (non-list) type.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n),
            Self::List(_) | Self::NonNullList(_) => None,
        }
    }

    /// Returns the innermost name of the type, unwrapping every list.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Returns the element type of a list type.
    pub fn list_item(&self) -> Option<&Self> {
        match self {
            Self::List(l) | Self::NonNullList(l) => Some(l),
            _ => None,
        }
    }

    /// Indicates whether this type is non-null.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(_) | Self::NonNullList(_))
    }

    /// Indicates whether this type is a (possibly non-null) list.
    pub fn is_list(&self) -> bool {
        self.list_item().is_some()
    }

    /// Parses a type signature like `[Int!]!`.
    ///
    /// Returns [`None`] for malformed signatures.
    pub fn parse(signature: &str) -> Option<Self> {
        let s = signature.trim();
        if let Some(inner) = s.strip_suffix('!') {
            let t = Self::parse(inner)?;
            return (!t.is_non_null()).then(|| t.non_null());
        }
        if let Some(inner) = s.strip_prefix('[') {
            return Some(Self::list(Self::parse(inner.strip_suffix(']')?)?));
        }
        let valid = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !s.starts_with(|c: char| c.is_ascii_digit());
        valid.then(|| Self::named(s))
    }
}

impl From<&str> for Type {
    /// Parses a type signature, keeping malformed input as a named type so it
    /// fails the schema's type reference check.
    fn from(signature: &str) -> Self {
        Self::parse(signature).unwrap_or_else(|| Self::named(signature))
    }
}

impl From<&parsed::Type<'_, String>> for Type {
    fn from(t: &parsed::Type<'_, String>) -> Self {
        match t {
            parsed::Type::NamedType(n) => Self::named(n.as_str()),
            parsed::Type::ListType(l) => Self::list(l.as_ref().into()),
            parsed::Type::NonNullType(inner) => Self::from(inner.as_ref()).non_null(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// constant and might contain variables.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Scalar(ScalarValue),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

/// Variables of a GraphQL operation, keyed by name (without the `$`).
pub type Variables = HashMap<String, InputValue>;

impl InputValue {
    /// Constructs an enum literal.
    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Constructs an object value out of key-value pairs.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Does this value represent `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Does this value represent a variable reference?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Views the underlying scalar value, if any.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying string value, if any.
    pub fn as_string_value(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// Views the underlying enum value, if any.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Converts this value into an ordered map of references, if it's an object.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(o.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            _ => None,
        }
    }

    /// Resolves variable references against `values`.
    ///
    /// Object fields referencing a missing variable are dropped, so they count
    /// as omitted. A missing top-level or list variable yields `null`.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Option<Self> {
        match self {
            Self::Variable(v) => values.get(&v).cloned(),
            Self::List(l) => Some(Self::List(
                l.into_iter()
                    .map(|v| v.into_const(values).unwrap_or(Self::Null))
                    .collect(),
            )),
            Self::Object(o) => Some(Self::Object(
                o.into_iter()
                    .filter_map(|(k, v)| v.into_const(values).map(|v| (k, v)))
                    .collect(),
            )),
            v => Some(v),
        }
    }

    /// Recursively finds all referenced variables.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l.iter().flat_map(Self::referenced_variables).collect(),
            Self::Object(o) => o.iter().flat_map(|(_, v)| v.referenced_variables()).collect(),
            _ => vec![],
        }
    }

    /// Copy of this value with object fields sorted by name, at every level.
    pub(crate) fn sorted(&self) -> Self {
        match self {
            Self::List(items) => Self::List(items.iter().map(Self::sorted).collect()),
            Self::Object(fields) => {
                let mut fields = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.sorted()))
                    .collect::<Vec<_>>();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                Self::Object(fields)
            }
            v => v.clone(),
        }
    }

    /// Converts this constant into a plain value. Enum values become strings
    /// and variables become `null`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null | Self::Variable(_) => Value::Null,
            Self::Scalar(s) => Value::Scalar(s.clone()),
            Self::Enum(e) => Value::scalar(e.as_str()),
            Self::List(l) => Value::List(l.iter().map(Self::to_value).collect()),
            Self::Object(o) => Value::Object(o.iter().map(|(k, v)| (k.clone(), v.to_value())).collect()),
        }
    }

    /// Converts a parsed query literal.
    pub fn from_parsed(v: &parsed::Value<'_, String>) -> Self {
        match v {
            parsed::Value::Variable(n) => Self::Variable(n.clone()),
            parsed::Value::Int(n) => n
                .as_i64()
                .map_or(Self::Null, |n| Self::Scalar(ScalarValue::from_i64(n))),
            parsed::Value::Float(f) => Self::Scalar(ScalarValue::Float(*f)),
            parsed::Value::String(s) => Self::Scalar(s.as_str().into()),
            parsed::Value::Boolean(b) => Self::Scalar((*b).into()),
            parsed::Value::Null => Self::Null,
            parsed::Value::Enum(e) => Self::Enum(e.clone()),
            parsed::Value::List(l) => Self::List(l.iter().map(Self::from_parsed).collect()),
            parsed::Value::Object(o) => Self::Object(
                o.iter()
                    .map(|(k, v)| (k.clone(), Self::from_parsed(v)))
                    .collect(),
            ),
        }
    }

    /// Converts a JSON value, treating strings as strings (never enums).
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Scalar(b.into()),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(ScalarValue::from_i64)
                .or_else(|| n.as_f64().map(ScalarValue::Float))
                .map_or(Self::Null, Self::Scalar),
            serde_json::Value::String(s) => Self::Scalar(s.into()),
            serde_json::Value::Array(a) => Self::List(a.into_iter().map(Self::from_json).collect()),
            serde_json::Value::Object(o) => {
                Self::Object(o.into_iter().map(|(k, v)| (k, Self::from_json(v))).collect())
            }
        }
    }
}

impl From<Value> for InputValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Scalar(s) => Self::Scalar(s),
            Value::List(l) => Self::List(l.into_iter().map(Into::into).collect()),
            Value::Object(o) => Self::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        Self::Scalar(i.into())
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        Self::Scalar(f.into())
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::Scalar(b.into())
    }
}

impl<T: Into<Self>> From<Option<T>> for InputValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for InputValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Writes a float so that it reads back as a float literal.
pub(crate) fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{n:.1}")
    } else {
        write!(f, "{n}")
    }
}

/// Writes a GraphQL string literal, escaping as needed.
pub(crate) fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for InputValue {
    /// Formats this value as a GraphQL literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Scalar(ScalarValue::String(s)) => write_string(f, s),
            Self::Scalar(ScalarValue::Float(n)) => write_float(f, *n),
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt(f)?;
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for InputValue {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Variable(_) => ser.serialize_unit(),
            Self::Scalar(s) => s.serialize(ser),
            Self::Enum(e) => ser.serialize_str(e),
            Self::List(l) => {
                let mut seq = ser.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Self::Object(o) => {
                let mut map = ser.serialize_map(Some(o.len()))?;
                for (k, v) in o {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InputValueVisitor;

        impl<'de> de::Visitor<'de> for InputValueVisitor {
            type Value = InputValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a valid input value")
            }

            fn visit_bool<E>(self, b: bool) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(b.into()))
            }

            fn visit_i64<E>(self, n: i64) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(ScalarValue::from_i64(n)))
            }

            fn visit_u64<E>(self, n: u64) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(
                    i64::try_from(n).map_or(ScalarValue::Float(n as f64), ScalarValue::from_i64),
                ))
            }

            fn visit_f64<E>(self, f: f64) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(f.into()))
            }

            fn visit_str<E>(self, s: &str) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(s.into()))
            }

            fn visit_string<E>(self, s: String) -> Result<InputValue, E> {
                Ok(InputValue::Scalar(s.into()))
            }

            fn visit_none<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::Null)
            }

            fn visit_unit<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<InputValue, D::Error> {
                InputValue::deserialize(d)
            }

            fn visit_seq<V: de::SeqAccess<'de>>(self, mut visitor: V) -> Result<InputValue, V::Error> {
                let mut values = Vec::new();
                while let Some(el) = visitor.next_element()? {
                    values.push(el);
                }
                Ok(InputValue::List(values))
            }

            fn visit_map<V: de::MapAccess<'de>>(self, mut visitor: V) -> Result<InputValue, V::Error> {
                let mut object = Vec::new();
                while let Some((key, value)) = visitor.next_entry::<String, InputValue>()? {
                    object.push((key, value));
                }
                Ok(InputValue::Object(object))
            }
        }

        deserializer.deserialize_any(InputValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::graphql_input_value;

    use super::{InputValue, Type};

    #[test]
    fn parses_type_signatures() {
        assert_eq!(Type::parse("[Int!]!").unwrap().to_string(), "[Int!]!");
        assert_eq!(Type::parse("Int!!"), None);
        assert_eq!(Type::parse("[Int"), None);
        assert_eq!(Type::parse("[[String]]").unwrap().innermost_name(), "String");
    }

    #[test]
    fn displays_literals() {
        let v = graphql_input_value!({"id": "123", "f": 2.0, "e": FOO, "l": [null]});
        assert_eq!(v.to_string(), r#"{id: "123", f: 2.0, e: FOO, l: [null]}"#);
        assert_eq!(InputValue::from("a\"b\n").to_string(), r#""a\"b\n""#);
    }

    #[test]
    fn missing_variables_drop_object_fields() {
        let vars = crate::graphql_vars! {"a": 1};
        let v = InputValue::object([
            ("x", InputValue::Variable("a".into())),
            ("y", InputValue::Variable("b".into())),
        ]);
        assert_eq!(
            v.into_const(&vars),
            Some(InputValue::object([("x", InputValue::from(1))])),
        );
    }

    #[test]
    fn deserializes_in_order() {
        let v: InputValue = serde_json::from_str(r#"{"b": 1, "a": [true]}"#).unwrap();
        assert_eq!(v, graphql_input_value!({"b": 1, "a": [true]}));
    }
}
