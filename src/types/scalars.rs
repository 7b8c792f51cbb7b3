use crate::{
    ast::InputValue,
    executor::FieldValue,
    schema::meta::ScalarMeta,
    value::{ScalarValue, Value},
};

/// Names of the built-in scalars.
pub const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub(crate) fn builtin_scalars() -> Vec<ScalarMeta> {
    vec![
        ScalarMeta::new("Int").description(
            "Represents non-fractional signed whole numeric values. Int can represent values \
             between -(2^31) and 2^31 - 1.",
        ),
        ScalarMeta::new("Float").description(
            "Represents signed double-precision fractional values as specified by [IEEE \
             754](https://en.wikipedia.org/wiki/IEEE_floating_point).",
        ),
        ScalarMeta::new("String").description(
            "Represents textual data as UTF-8 character sequences. This type is most often used \
             by GraphQL to represent free-form human-readable text.",
        ),
        ScalarMeta::new("Boolean").description("Represents `true` or `false` values."),
        ScalarMeta::new("ID").description(
            "Represents a unique identifier that is Base64 obfuscated. It is often used to \
             refetch an object or as key for a cache. The ID type appears in a JSON response as \
             a String; however, it is not intended to be human-readable. When expected as an \
             input type, any string (such as `\"VXNlci0xMA==\"`) or integer (such as `4`) input \
             value will be accepted as an ID.",
        ),
    ]
}

/// Coerces an external value into a built-in scalar.
///
/// The outer [`None`] means `name` isn't a built-in scalar. The inner one
/// means the value isn't accepted.
pub(crate) fn coerce_builtin_input(name: &str, value: &InputValue) -> Option<Option<FieldValue>> {
    let scalar = value.as_scalar();
    let coerced = match name {
        "Int" => scalar.and_then(|s| match s {
            ScalarValue::Int(i) => Some(FieldValue::from(*i)),
            _ => None,
        }),
        "Float" => scalar
            .and_then(ScalarValue::as_float)
            .map(FieldValue::from),
        "String" => scalar
            .and_then(ScalarValue::as_str)
            .map(FieldValue::from),
        "Boolean" => scalar.and_then(ScalarValue::as_bool).map(FieldValue::from),
        "ID" => scalar.and_then(|s| match s {
            ScalarValue::String(s) => Some(FieldValue::from(s.as_str())),
            ScalarValue::Int(i) => Some(FieldValue::from(i.to_string())),
            _ => None,
        }),
        _ => return None,
    };
    Some(coerced)
}

/// Coerces an internal value of a built-in scalar into its external form.
///
/// The outer [`None`] means `name` isn't a built-in scalar.
pub(crate) fn coerce_builtin_result(name: &str, value: &FieldValue) -> Option<Result<Value, String>> {
    let scalar = value.as_scalar();
    let result = match name {
        "Int" => match scalar {
            Some(ScalarValue::Int(i)) => Ok(Value::scalar(*i)),
            Some(ScalarValue::Float(f))
                if f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX) =>
            {
                #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
                Ok(Value::scalar(*f as i32))
            }
            _ => Err(cannot_represent("Int", value)),
        },
        "Float" => scalar
            .and_then(ScalarValue::as_float)
            .map(Value::scalar)
            .ok_or_else(|| cannot_represent("Float", value)),
        "String" => match scalar {
            Some(ScalarValue::String(s)) => Ok(Value::scalar(s.as_str())),
            Some(s) => Ok(Value::scalar(s.to_string())),
            None => Err(cannot_represent("String", value)),
        },
        "Boolean" => scalar
            .and_then(ScalarValue::as_bool)
            .map(Value::scalar)
            .ok_or_else(|| cannot_represent("Boolean", value)),
        "ID" => match scalar {
            Some(ScalarValue::String(s)) => Ok(Value::scalar(s.as_str())),
            Some(ScalarValue::Int(i)) => Ok(Value::scalar(i.to_string())),
            _ => Err(cannot_represent("ID", value)),
        },
        _ => return None,
    };
    Some(result)
}

fn cannot_represent(name: &str, value: &FieldValue) -> String {
    match value.to_plain() {
        Some(v) => format!("{name} cannot represent value: {v}"),
        None => format!("{name} cannot represent an application object"),
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce_builtin_input, coerce_builtin_result};
    use crate::{ast::InputValue, executor::FieldValue, value::Value};

    #[test]
    fn ids_accept_strings_and_integers() {
        assert_eq!(
            coerce_builtin_input("ID", &InputValue::from(4)),
            Some(Some(FieldValue::from("4"))),
        );
        assert_eq!(
            coerce_builtin_input("ID", &InputValue::from("VXNlci0xMA==")),
            Some(Some(FieldValue::from("VXNlci0xMA=="))),
        );
        assert_eq!(coerce_builtin_input("ID", &InputValue::from(1.5)), Some(None));
    }

    #[test]
    fn floats_widen_integers_but_ints_reject_floats() {
        assert_eq!(
            coerce_builtin_input("Float", &InputValue::from(2)),
            Some(Some(FieldValue::from(2.0))),
        );
        assert_eq!(coerce_builtin_input("Int", &InputValue::from(2.0)), Some(None));
        assert_eq!(coerce_builtin_input("Int", &InputValue::enum_value("TWO")), Some(None));
    }

    #[test]
    fn custom_scalars_are_not_builtin() {
        assert_eq!(coerce_builtin_input("Date", &InputValue::from("x")), None);
        assert!(coerce_builtin_result("Date", &FieldValue::from("x")).is_none());
    }

    #[test]
    fn results_are_converted_leniently() {
        assert_eq!(
            coerce_builtin_result("String", &FieldValue::from(1)),
            Some(Ok(Value::scalar("1"))),
        );
        assert_eq!(
            coerce_builtin_result("Int", &FieldValue::from(3.0)),
            Some(Ok(Value::scalar(3))),
        );
        assert_eq!(
            coerce_builtin_result("Boolean", &FieldValue::from("yes")),
            Some(Err("Boolean cannot represent value: \"yes\"".into())),
        );
    }
}
