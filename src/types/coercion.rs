//! Conversion between external values and the internal values resolvers see.

use arcstr::ArcStr;
use indexmap::IndexMap;
use itertools::Itertools as _;

use super::scalars::{coerce_builtin_input, coerce_builtin_result};
use crate::{
    ast::{InputValue, Type, Variables},
    executor::{Arguments, Context, FieldError, FieldValue, PathSegment},
    schema::{
        meta::{Argument, DefaultValue, MetaType},
        model::SchemaError,
        visibility::{DuplicateNamesError, Warden},
    },
    value::{ScalarValue, Value},
};

/// Reason a literal is rejected by static validation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LiteralError {
    /// The literal itself doesn't fit the expected type.
    Invalid,

    /// A field of an input object literal doesn't fit its type.
    InputObject {
        type_name: ArcStr,
        argument: ArcStr,
        value: InputValue,
        expected: Type,
    },

    /// A required input object field is missing.
    Missing {
        type_name: ArcStr,
        argument: ArcStr,
        expected: Type,
    },

    /// An input object literal has a field its type doesn't define.
    Unknown { type_name: ArcStr, argument: String },

    /// A `@oneOf` literal doesn't have exactly one field.
    OneOfKeys { type_name: ArcStr },

    /// The single field of a `@oneOf` literal is `null`.
    OneOfNull { type_name: ArcStr, argument: String },

    Duplicate(DuplicateNamesError),
}

impl LiteralError {
    /// Message of this error for an argument named `argument` of `owner`,
    /// such as `Field 'f'`.
    pub(crate) fn message(&self, owner: &str, argument: &str, value: &InputValue, ty: &Type) -> String {
        match self {
            Self::Invalid => format!(
                "Argument '{argument}' on {owner} has an invalid value ({value}). \
                 Expected type '{ty}'.",
            ),
            Self::InputObject {
                type_name,
                argument,
                value,
                expected,
            } => format!(
                "Argument '{argument}' on InputObject '{type_name}' has an invalid value \
                 ({value}). Expected type '{expected}'.",
            ),
            Self::Missing {
                type_name,
                argument,
                expected,
            } => format!(
                "Argument '{argument}' on InputObject '{type_name}' is required. \
                 Expected type {expected}",
            ),
            Self::Unknown { type_name, argument } => {
                format!("InputObject '{type_name}' doesn't accept argument '{argument}'")
            }
            Self::OneOfKeys { type_name } => {
                format!("OneOf Input Object '{type_name}' must specify exactly one key.")
            }
            Self::OneOfNull { type_name, argument } => {
                format!("Argument '{type_name}.{argument}' must be non-null.")
            }
            Self::Duplicate(e) => e.to_string(),
        }
    }
}

/// Checks a (possibly variable-bearing) literal against a type. Variables
/// are checked separately, so they always pass.
pub(crate) fn validate_literal(
    warden: &Warden,
    ty: &Type,
    value: &InputValue,
) -> Result<(), LiteralError> {
    if value.is_variable() {
        return Ok(());
    }
    if value.is_null() {
        return if ty.is_non_null() {
            Err(LiteralError::Invalid)
        } else {
            Ok(())
        };
    }
    if let Some(item) = ty.list_item() {
        return match value {
            InputValue::List(items) => items
                .iter()
                .try_for_each(|v| validate_literal(warden, item, v)),
            single => validate_literal(warden, item, single),
        };
    }

    let meta = warden
        .get_type(ty.innermost_name())
        .map_err(LiteralError::Duplicate)?
        .ok_or(LiteralError::Invalid)?;
    match &**meta {
        MetaType::Scalar(s) => {
            if !value.referenced_variables().is_empty() {
                return Ok(());
            }
            let accepted = match &s.coerce_input {
                Some(f) => f(value, warden.context()).is_ok(),
                None => coerce_builtin_input(&s.name, value).is_none_or(|c| c.is_some()),
            };
            if accepted { Ok(()) } else { Err(LiteralError::Invalid) }
        }
        MetaType::Enum(_) => {
            let name = value.as_enum_value().ok_or(LiteralError::Invalid)?;
            let values = warden.enum_values(meta).map_err(LiteralError::Duplicate)?;
            if values.iter().any(|v| v.name == name) {
                Ok(())
            } else {
                Err(LiteralError::Invalid)
            }
        }
        MetaType::InputObject(input) => {
            let InputValue::Object(fields) = value else {
                return Err(LiteralError::Invalid);
            };
            let arguments = warden
                .arguments(&input.name, &input.input_fields)
                .map_err(LiteralError::Duplicate)?;
            for (key, v) in fields {
                let Some(arg) = arguments.iter().find(|a| a.name == *key) else {
                    return Err(LiteralError::Unknown {
                        type_name: input.name.clone(),
                        argument: key.clone(),
                    });
                };
                validate_literal(warden, &arg.arg_type, v).map_err(|e| match e {
                    LiteralError::Invalid => LiteralError::InputObject {
                        type_name: input.name.clone(),
                        argument: arg.name.clone(),
                        value: v.clone(),
                        expected: arg.arg_type.clone(),
                    },
                    nested => nested,
                })?;
            }
            if input.is_one_of() {
                if fields.len() != 1 {
                    return Err(LiteralError::OneOfKeys {
                        type_name: input.name.clone(),
                    });
                }
                if let Some((key, InputValue::Null)) = fields.first() {
                    return Err(LiteralError::OneOfNull {
                        type_name: input.name.clone(),
                        argument: key.clone(),
                    });
                }
            }
            for arg in arguments {
                if arg.is_required() && !fields.iter().any(|(k, _)| *k == arg.name) {
                    return Err(LiteralError::Missing {
                        type_name: input.name.clone(),
                        argument: arg.name.clone(),
                        expected: arg.arg_type.clone(),
                    });
                }
            }
            Ok(())
        }
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => {
            Err(LiteralError::Invalid)
        }
    }
}

/// A located reason a constant value can't be coerced.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    /// Location of the offending part inside the value.
    pub path: Vec<PathSegment>,

    /// Why it's rejected.
    pub explanation: String,
}

impl Problem {
    pub(crate) fn new(explanation: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            explanation: explanation.into(),
        }
    }

    fn under(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Converts this problem into a plain value for error extensions.
    pub fn to_value(&self) -> Value {
        let mut obj = crate::value::Object::with_capacity(2);
        obj.add_field(
            "path",
            Value::List(self.path.iter().map(PathSegment::to_value).collect()),
        );
        obj.add_field("explanation", Value::scalar(self.explanation.as_str()));
        Value::Object(obj)
    }
}

/// Coerces a constant external value into its internal form.
///
/// # Errors
///
/// With every located problem.
pub(crate) fn coerce_value(
    warden: &Warden,
    ty: &Type,
    value: &InputValue,
    ctx: &Context,
) -> Result<FieldValue, Vec<Problem>> {
    if value.is_null() {
        return if ty.is_non_null() {
            Err(vec![Problem::new("Expected value to not be null")])
        } else {
            Ok(FieldValue::Null)
        };
    }
    if let Some(item) = ty.list_item() {
        return match value {
            InputValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut problems = Vec::new();
                for (i, v) in items.iter().enumerate() {
                    match coerce_value(warden, item, v, ctx) {
                        Ok(v) => out.push(v),
                        Err(p) => problems
                            .extend(p.into_iter().map(|p| p.under(PathSegment::Index(i)))),
                    }
                }
                if problems.is_empty() {
                    Ok(FieldValue::List(out))
                } else {
                    Err(problems)
                }
            }
            single => coerce_value(warden, item, single, ctx).map(|v| FieldValue::List(vec![v])),
        };
    }

    let name = ty.innermost_name();
    let meta = match warden.get_type(name) {
        Ok(Some(m)) => m,
        Ok(None) => return Err(vec![Problem::new(format!("{name} is not a visible type"))]),
        Err(e) => return Err(vec![Problem::new(e.to_string())]),
    };
    match &**meta {
        MetaType::Scalar(s) => match &s.coerce_input {
            Some(f) => f(value, ctx).map_err(|e| vec![Problem::new(e)]),
            None => match coerce_builtin_input(&s.name, value) {
                Some(Some(v)) => Ok(v),
                Some(None) => Err(vec![Problem::new(format!(
                    "Could not coerce value {value} to {name}",
                ))]),
                None => Ok(passthrough(value)),
            },
        },
        MetaType::Enum(_) => {
            let given = match value {
                InputValue::Enum(e) => Some(e.as_str()),
                InputValue::Scalar(ScalarValue::String(s)) => Some(s.as_str()),
                _ => None,
            };
            let values = warden
                .enum_values(meta)
                .map_err(|e| vec![Problem::new(e.to_string())])?;
            given
                .and_then(|g| values.iter().find(|v| v.name == g))
                .map(|v| FieldValue::from(v.value.clone()))
                .ok_or_else(|| {
                    vec![Problem::new(format!(
                        "Expected {} to be one of: {}",
                        match given {
                            Some(g) => format!("{g:?}"),
                            None => value.to_string(),
                        },
                        values.iter().map(|v| v.name.as_str()).join(", "),
                    ))]
                })
        }
        MetaType::InputObject(input) => {
            let InputValue::Object(fields) = value else {
                return Err(vec![Problem::new("Expected value to be a key-value object")]);
            };
            let arguments = warden
                .arguments(&input.name, &input.input_fields)
                .map_err(|e| vec![Problem::new(e.to_string())])?;
            let mut problems = Vec::new();
            for (key, _) in fields {
                if !arguments.iter().any(|a| a.name == *key) {
                    problems.push(
                        Problem::new(format!("Field is not defined on {}", input.name))
                            .under(PathSegment::Field(key.as_str().into())),
                    );
                }
            }
            if input.is_one_of() {
                if fields.len() != 1 {
                    problems.push(Problem::new(format!(
                        "'{}' requires exactly one argument, but {} were provided.",
                        input.name,
                        fields.len(),
                    )));
                } else if let Some((key, InputValue::Null)) = fields.first() {
                    problems.push(Problem::new(format!(
                        "'{}' requires exactly one argument, but '{key}' was `null`.",
                        input.name,
                    )));
                }
            }
            let mut out = IndexMap::new();
            for arg in arguments {
                let given = fields.iter().find(|(k, _)| *k == arg.name).map(|(_, v)| v);
                match coerce_argument(warden, arg, given, ctx) {
                    Ok(Some(v)) => {
                        out.insert(arg.keyword_name(), v);
                    }
                    Ok(None) => {}
                    Err(p) => problems.extend(
                        p.into_iter()
                            .map(|p| p.under(PathSegment::Field(arg.name.clone()))),
                    ),
                }
            }
            if problems.is_empty() {
                Ok(FieldValue::Map(out))
            } else {
                Err(problems)
            }
        }
        MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_) => Err(vec![
            Problem::new(format!("{name} is not an input type")),
        ]),
    }
}

/// Coerces a single argument given as `given`, applying its default.
///
/// Omitted optional arguments without a default give [`None`].
fn coerce_argument(
    warden: &Warden,
    arg: &Argument,
    given: Option<&InputValue>,
    ctx: &Context,
) -> Result<Option<FieldValue>, Vec<Problem>> {
    match (given, &arg.default_value) {
        (Some(InputValue::Null), Some(default)) if arg.replace_null_with_default => {
            coerce_default(warden, &arg.arg_type, default, ctx).map(Some)
        }
        (Some(v), _) => coerce_value(warden, &arg.arg_type, v, ctx).map(Some),
        (None, Some(default)) => coerce_default(warden, &arg.arg_type, default, ctx).map(Some),
        (None, None) if arg.arg_type.is_non_null() => {
            Err(vec![Problem::new("Expected value to not be null")])
        }
        (None, None) => Ok(None),
    }
}

fn coerce_default(
    warden: &Warden,
    ty: &Type,
    default: &DefaultValue,
    ctx: &Context,
) -> Result<FieldValue, Vec<Problem>> {
    match default {
        DefaultValue::Literal(v) => coerce_value(warden, ty, v, ctx),
        DefaultValue::Internal(v) => Ok(v.clone()),
    }
}

fn passthrough(value: &InputValue) -> FieldValue {
    match value {
        InputValue::Null | InputValue::Variable(_) => FieldValue::Null,
        InputValue::Scalar(s) => FieldValue::from(s.clone()),
        InputValue::Enum(e) => FieldValue::from(e.as_str()),
        InputValue::List(l) => FieldValue::List(l.iter().map(passthrough).collect()),
        InputValue::Object(o) => {
            FieldValue::Map(o.iter().map(|(k, v)| (k.clone(), passthrough(v))).collect())
        }
    }
}

/// Coerces the arguments given to a field or a directive.
///
/// `given` literals may reference `variables`, which were coerced already.
/// A reference to an unprovided variable counts as an omitted argument.
///
/// # Errors
///
/// If a value is rejected, naming the argument and `owner` (such as
/// `Field 'f'`).
pub(crate) fn coerce_arguments(
    warden: &Warden,
    owner: &str,
    owner_path: &str,
    arguments: &[std::sync::Arc<Argument>],
    given: &[(String, InputValue)],
    variables: &Variables,
    ctx: &Context,
) -> Result<Arguments, FieldError> {
    let visible = warden
        .arguments(owner_path, arguments)
        .map_err(|e| FieldError::from(e.to_string()))?;
    let mut out = Arguments::new();
    for arg in visible {
        let literal = given
            .iter()
            .find(|(k, _)| *k == arg.name)
            .map(|(_, v)| v.clone());
        let value = match literal {
            Some(InputValue::Variable(v)) if !variables.contains_key(&v) => None,
            Some(l) => l.into_const(variables),
            None => None,
        };
        match coerce_argument(warden, arg, value.as_ref(), ctx) {
            Ok(Some(v)) => {
                out.insert(arg.keyword_name(), v);
            }
            Ok(None) => {}
            Err(_) => {
                let shown = value.map_or_else(|| "null".to_owned(), |v| v.to_string());
                return Err(FieldError::from(format!(
                    "Argument '{}' on {owner} has an invalid value ({shown}). Expected type '{}'.",
                    arg.name, arg.arg_type,
                )));
            }
        }
    }
    Ok(out)
}

/// Coerces the internal value of a leaf type into its external form.
///
/// # Errors
///
/// If the value has no external representation.
pub(crate) fn coerce_leaf_result(
    warden: &Warden,
    meta: &MetaType,
    value: &FieldValue,
    ctx: &Context,
) -> Result<Value, String> {
    match meta {
        MetaType::Scalar(s) => match &s.coerce_result {
            Some(f) => f(value, ctx),
            None => coerce_builtin_result(&s.name, value).unwrap_or_else(|| {
                value
                    .to_plain()
                    .ok_or_else(|| format!("{} cannot represent an application object", s.name))
            }),
        },
        MetaType::Enum(e) => {
            let plain = value.to_plain();
            warden
                .enum_values(meta)
                .map_err(|e| e.to_string())?
                .iter()
                .find(|v| plain.as_ref() == Some(&v.value))
                .map(|v| Value::scalar(v.name.as_str()))
                .ok_or_else(|| format!("{value:?} isn't a valid value for `{}`", e.name))
        }
        _ => Err(format!("{} is not a leaf type", meta.name())),
    }
}

/// Renders an internal value as a literal of `ty`, going through result
/// coercion. Used to print defaults.
pub(crate) fn to_literal(
    warden: &Warden,
    ty: &Type,
    value: &FieldValue,
    ctx: &Context,
) -> Result<InputValue, String> {
    if value.is_null() {
        return Ok(InputValue::Null);
    }
    if let Some(item) = ty.list_item() {
        return match value.to_list() {
            Some(items) => items
                .iter()
                .map(|v| to_literal(warden, item, v, ctx))
                .collect::<Result<_, _>>()
                .map(InputValue::List),
            None => to_literal(warden, item, value, ctx),
        };
    }
    let meta = warden
        .get_type(ty.innermost_name())
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{ty} is not a visible type"))?;
    match &**meta {
        MetaType::Scalar(_) => coerce_leaf_result(warden, meta, value, ctx).map(InputValue::from),
        MetaType::Enum(_) => coerce_leaf_result(warden, meta, value, ctx).map(|v| {
            v.as_string_value()
                .map_or(InputValue::Null, InputValue::enum_value)
        }),
        MetaType::InputObject(input) => {
            let arguments = warden
                .arguments(&input.name, &input.input_fields)
                .map_err(|e| e.to_string())?;
            let mut fields = Vec::new();
            for arg in arguments {
                if let Some(v) = value.get(&arg.keyword_name()) {
                    fields.push((arg.name.to_string(), to_literal(warden, &arg.arg_type, &v, ctx)?));
                }
            }
            Ok(InputValue::Object(fields))
        }
        _ => Err(format!("{} is not an input type", meta.name())),
    }
}

/// Literal form of an argument's default.
pub(crate) fn default_literal(warden: &Warden, arg: &Argument) -> Option<Result<InputValue, String>> {
    Some(match arg.default_value.as_ref()? {
        DefaultValue::Literal(v) => Ok(v.clone()),
        DefaultValue::Internal(v) => to_literal(warden, &arg.arg_type, v, warden.context()),
    })
}

/// Checks the default of an argument at `path` when the schema is built.
pub(crate) fn check_default(warden: &Warden, path: &str, arg: &Argument) -> Result<(), SchemaError> {
    let Some(literal) = default_literal(warden, arg) else {
        return Ok(());
    };
    let invalid = |value: String| SchemaError::InvalidDefaultValue {
        path: path.to_owned(),
        value,
        type_name: arg.arg_type.to_string(),
    };
    let literal = literal.map_err(invalid)?;
    validate_literal(warden, &arg.arg_type, &literal).map_err(|_| invalid(inspect(&literal)))
}

/// Renders a literal the way definition-time errors show values.
pub(crate) fn inspect(value: &InputValue) -> String {
    match value {
        InputValue::Null => "nil".into(),
        InputValue::Scalar(ScalarValue::String(s)) => format!("{s:?}"),
        InputValue::Scalar(s) => s.to_string(),
        InputValue::Enum(e) => format!("{e:?}"),
        InputValue::Variable(v) => format!("${v}"),
        InputValue::List(l) => format!("[{}]", l.iter().map(inspect).join(", ")),
        InputValue::Object(o) => format!(
            "{{{}}}",
            o.iter().map(|(k, v)| format!("{k}: {}", inspect(v))).join(", "),
        ),
    }
}
