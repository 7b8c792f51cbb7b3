use std::collections::HashSet;

use serde::Deserialize;

use super::{InvalidDocument, LoadError, parse_literal};
use crate::{
    ast::Type,
    schema::{
        builder::SchemaBuilder,
        directives::{DirectiveLocation, DirectiveType},
        meta::{
            Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType,
            ObjectMeta, ScalarMeta, UnionMeta,
        },
        model::OperationType,
    },
    util::to_snake_case,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedSchema {
    description: Option<String>,
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
    #[serde(default)]
    directives: Vec<IntrospectedDirective>,
}

#[derive(Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Clone, Copy, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Kind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: Kind,
    name: String,
    description: Option<String>,
    #[serde(rename = "specifiedByURL")]
    specified_by_url: Option<String>,
    is_one_of: Option<bool>,
    fields: Option<Vec<IntrospectedField>>,
    input_fields: Option<Vec<IntrospectedInputValue>>,
    interfaces: Option<Vec<TypeRef>>,
    enum_values: Option<Vec<IntrospectedEnumValue>>,
    possible_types: Option<Vec<TypeRef>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    kind: Kind,
    name: Option<String>,
    of_type: Option<Box<TypeRef>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedField {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<IntrospectedInputValue>,
    #[serde(rename = "type")]
    field_type: TypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedInputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    value_type: TypeRef,
    default_value: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedEnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectedDirective {
    name: String,
    description: Option<String>,
    locations: Vec<String>,
    #[serde(default)]
    is_repeatable: bool,
    #[serde(default)]
    args: Vec<IntrospectedInputValue>,
}

fn invalid(message: impl Into<String>) -> InvalidDocument {
    InvalidDocument::InvalidIntrospection {
        message: message.into(),
    }
}

pub(super) fn load(json: &serde_json::Value) -> Result<SchemaBuilder, LoadError> {
    let root = json.get("data").unwrap_or(json);
    let schema = root
        .get("__schema")
        .ok_or_else(|| invalid("missing `__schema`"))?;
    let schema = IntrospectedSchema::deserialize(schema).map_err(|e| invalid(e.to_string()))?;

    let types = schema
        .types
        .iter()
        .filter(|t| !t.name.starts_with("__") && !is_builtin_scalar(&t.name))
        .collect::<Vec<_>>();
    let loader = Loader {
        known: types.iter().map(|t| t.name.as_str()).collect(),
    };

    let query = schema
        .query_type
        .as_ref()
        .ok_or(InvalidDocument::MissingQueryType)?;
    let roots = [
        (OperationType::Query, Some(query)),
        (OperationType::Mutation, schema.mutation_type.as_ref()),
        (OperationType::Subscription, schema.subscription_type.as_ref()),
    ];
    for (op, root) in roots {
        if let Some(root) = root.filter(|r| !loader.known.contains(r.name.as_str())) {
            return Err(InvalidDocument::RootTypeNotFound {
                operation: op.to_string(),
                name: root.name.clone(),
            }
            .into());
        }
    }

    let mut builder = SchemaBuilder::new().query_name(query.name.as_str()).orphan_types(
        &types
            .iter()
            .filter(|t| t.kind == Kind::Object)
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>(),
    );
    if let Some(description) = &schema.description {
        builder = builder.description(description.as_str());
    }
    if let Some(root) = &schema.mutation_type {
        builder = builder.mutation_name(root.name.as_str());
    }
    if let Some(root) = &schema.subscription_type {
        builder = builder.subscription_name(root.name.as_str());
    }
    let builtin_directives = DirectiveType::built_ins();
    for d in &schema.directives {
        if builtin_directives.iter().any(|b| b.name == d.name) {
            continue;
        }
        builder = builder.directive(loader.directive(d)?);
    }
    for t in &types {
        builder = builder.register(loader.full_type(t)?);
    }
    tracing::debug!(types = types.len(), "loaded introspection result");
    Ok(builder)
}

fn is_builtin_scalar(name: &str) -> bool {
    matches!(name, "Boolean" | "String" | "Int" | "Float" | "ID")
}

struct Loader<'s> {
    known: HashSet<&'s str>,
}

impl Loader<'_> {
    fn type_ref(&self, type_ref: &TypeRef) -> Result<Type, InvalidDocument> {
        let inner = || {
            type_ref
                .of_type
                .as_deref()
                .ok_or_else(|| invalid("wrapping type without `ofType`"))
        };
        Ok(match type_ref.kind {
            Kind::NonNull => self.type_ref(inner()?)?.non_null(),
            Kind::List => Type::list(self.type_ref(inner()?)?),
            _ => {
                let name = type_ref
                    .name
                    .as_deref()
                    .ok_or_else(|| invalid("named type without `name`"))?;
                if !is_builtin_scalar(name) && !self.known.contains(name) {
                    return Err(InvalidDocument::TypeNotFound { name: name.to_owned() });
                }
                Type::named(name)
            }
        })
    }

    fn names(&self, refs: Option<&[TypeRef]>) -> Result<Vec<String>, InvalidDocument> {
        refs.into_iter()
            .flatten()
            .map(|r| self.type_ref(r).map(|t| t.innermost_name().to_owned()))
            .collect()
    }

    fn full_type(&self, t: &FullType) -> Result<MetaType, LoadError> {
        let name = t.name.as_str();
        let description = t.description.as_deref();
        Ok(match t.kind {
            Kind::Scalar => {
                let mut meta = ScalarMeta::new(name);
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                if let Some(url) = &t.specified_by_url {
                    meta = meta.specified_by_url(url.as_str());
                }
                meta.into()
            }
            Kind::Object => {
                let interfaces = self.names(t.interfaces.as_deref())?;
                let mut meta = ObjectMeta::new(name)
                    .interfaces(&interfaces.iter().map(String::as_str).collect::<Vec<_>>());
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                for f in t.fields.iter().flatten() {
                    meta = meta.field(self.field(name, f)?);
                }
                meta.into()
            }
            Kind::Interface => {
                let interfaces = self.names(t.interfaces.as_deref())?;
                let mut meta = InterfaceMeta::new(name)
                    .interfaces(&interfaces.iter().map(String::as_str).collect::<Vec<_>>());
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                for f in t.fields.iter().flatten() {
                    meta = meta.field(self.field(name, f)?);
                }
                meta.into()
            }
            Kind::Union => {
                let members = self.names(t.possible_types.as_deref())?;
                let mut meta =
                    UnionMeta::new(name, &members.iter().map(String::as_str).collect::<Vec<_>>());
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                meta.into()
            }
            Kind::Enum => {
                let mut meta = EnumMeta::new(name);
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                for v in t.enum_values.iter().flatten() {
                    let mut value = EnumValue::new(v.name.as_str());
                    if let Some(d) = &v.description {
                        value = value.description(d.as_str());
                    }
                    if v.is_deprecated {
                        value.set_deprecation_reason(Some(reason(v.deprecation_reason.as_deref())));
                    }
                    meta = meta.value(value);
                }
                meta.into()
            }
            Kind::InputObject => {
                let mut meta = InputObjectMeta::new(name);
                if let Some(d) = description {
                    meta = meta.description(d);
                }
                if t.is_one_of == Some(true) {
                    meta = meta.one_of();
                }
                for f in t.input_fields.iter().flatten() {
                    meta = meta.argument(self.input_value(name, f)?);
                }
                meta.into()
            }
            Kind::List | Kind::NonNull => {
                return Err(invalid(format!("`{name}` is a wrapping type")).into());
            }
        })
    }

    fn field(&self, owner: &str, f: &IntrospectedField) -> Result<Field, LoadError> {
        let mut field = Field::new(to_snake_case(&f.name), self.type_ref(&f.field_type)?)
            .graphql_name(f.name.as_str());
        if let Some(d) = &f.description {
            field = field.description(d.as_str());
        }
        if f.is_deprecated {
            field.set_deprecation_reason(Some(reason(f.deprecation_reason.as_deref())));
        }
        let path = format!("{owner}.{}", f.name);
        for arg in &f.args {
            field = field.argument(self.input_value(&path, arg)?);
        }
        Ok(field)
    }

    fn input_value(&self, owner: &str, v: &IntrospectedInputValue) -> Result<Argument, LoadError> {
        let mut arg = Argument::from_graphql_name(&v.name, self.type_ref(&v.value_type)?);
        if let Some(d) = &v.description {
            arg = arg.description(d.as_str());
        }
        if let Some(default) = &v.default_value {
            arg = arg.default_value(parse_literal(default)?);
        }
        if v.is_deprecated {
            arg.set_deprecation_reason(
                &format!("{owner}.{}", v.name),
                Some(reason(v.deprecation_reason.as_deref())),
            )?;
        }
        Ok(arg)
    }

    fn directive(&self, d: &IntrospectedDirective) -> Result<DirectiveType, LoadError> {
        let locations = d
            .locations
            .iter()
            .map(|l| {
                DirectiveLocation::ALL
                    .into_iter()
                    .find(|known| known.as_str() == l.as_str())
                    .ok_or_else(|| invalid(format!("unknown directive location `{l}`")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut directive = DirectiveType::new(d.name.as_str(), &locations);
        if let Some(description) = &d.description {
            directive = directive.description(description.as_str());
        }
        if d.is_repeatable {
            directive = directive.repeatable();
        }
        let path = format!("@{}", d.name);
        for arg in &d.args {
            directive = directive.argument(self.input_value(&path, arg)?);
        }
        Ok(directive)
    }
}

fn reason(reason: Option<&str>) -> &str {
    reason.unwrap_or(crate::schema::directives::DEFAULT_DEPRECATION_REASON)
}
