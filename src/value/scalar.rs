use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Leaf value of a GraphQL response or input.
///
/// `ID` values are carried as [`ScalarValue::String`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// `Int` value. GraphQL integers are signed 32-bit.
    Int(i32),

    /// `Float` value.
    Float(f64),

    /// `String` (or `ID`) value.
    String(String),

    /// `Boolean` value.
    Boolean(bool),
}

impl ScalarValue {
    /// Returns the inner integer, if this is an [`ScalarValue::Int`].
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns this value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the inner string, if this is a [`ScalarValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean, if this is a [`ScalarValue::Boolean`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts a 64-bit integer, falling back to a float outside of the `Int` range.
    pub fn from_i64(n: i64) -> Self {
        i32::try_from(n).map_or_else(|_| Self::Float(n as f64), Self::Int)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarValueVisitor;

        impl de::Visitor<'_> for ScalarValueVisitor {
            type Value = ScalarValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a valid scalar value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<ScalarValue, E> {
                Ok(ScalarValue::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<ScalarValue, E> {
                Ok(ScalarValue::from_i64(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<ScalarValue, E> {
                Ok(i64::try_from(value)
                    .map_or(ScalarValue::Float(value as f64), ScalarValue::from_i64))
            }

            fn visit_f64<E>(self, value: f64) -> Result<ScalarValue, E> {
                Ok(ScalarValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<ScalarValue, E> {
                Ok(ScalarValue::String(value.into()))
            }

            fn visit_string<E>(self, value: String) -> Result<ScalarValue, E> {
                Ok(ScalarValue::String(value))
            }
        }

        deserializer.deserialize_any(ScalarValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarValue;

    #[test]
    fn widens_out_of_range_integers() {
        assert_eq!(ScalarValue::from_i64(12), ScalarValue::Int(12));
        assert_eq!(
            ScalarValue::from_i64(i64::from(i32::MAX) + 1),
            ScalarValue::Float(2_147_483_648.0),
        );
    }

    #[test]
    fn deserializes_json_scalars() {
        let v: ScalarValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, ScalarValue::Float(1.5));
        let v: ScalarValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v.as_str(), Some("x"));
    }
}
