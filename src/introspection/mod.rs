//! `__schema`, `__type` and `__typename`, answered through the request's
//! [`Warden`].

use std::sync::{Arc, LazyLock};

use arcstr::ArcStr;

use crate::{
    GraphQLError,
    ast::{InputValue, Type, Variables},
    executor::{Context, ExecutionError, FieldError, FieldResult, FieldValue, ResolverContext},
    schema::{
        directives::{DirectiveLocation, DirectiveType},
        meta::{Argument, EnumMeta, EnumValue, Field, MetaType, ObjectMeta, TypeKind},
        model::{OperationType, Schema},
        visibility::{DuplicateNamesError, Warden},
    },
    types::coercion::default_literal,
    value::Value,
};

/// From <https://github.com/graphql/graphql-js/blob/v17.0.0-alpha.3/src/utilities/getIntrospectionQuery.ts>,
/// with every optional feature on.
pub const INTROSPECTION_QUERY: &str = include_str!("./query.graphql");

/// Schema member an introspection object stands for.
#[derive(Clone, Debug)]
enum Node {
    Schema,
    Type(Type),
    Field(Arc<Field>),
    InputValue(Arc<Argument>),
    EnumValue(Arc<EnumValue>),
    Directive(Arc<DirectiveType>),
}

static SCHEMA_FIELD: LazyLock<Arc<Field>> = LazyLock::new(|| {
    Arc::new(
        Field::new("__schema", "__Schema!")
            .camelize(false)
            .description("Access the current type schema of this server.")
            .resolve(|_| FieldValue::opaque(Node::Schema)),
    )
});

static TYPE_FIELD: LazyLock<Arc<Field>> = LazyLock::new(|| {
    Arc::new(
        Field::new("__type", "__Type")
            .camelize(false)
            .description("Request the type information of a single type.")
            .argument(Argument::new("name", "String!"))
            .resolve(|ctx| -> FieldResult<FieldValue> {
                let name = ctx.arg("name").and_then(FieldValue::as_str).unwrap_or_default();
                Ok(ctx
                    .warden()
                    .get_type(name)?
                    .map_or(FieldValue::Null, |t| named_node(t.name())))
            }),
    )
});

static TYPENAME_FIELD: LazyLock<Arc<Field>> = LazyLock::new(|| {
    Arc::new(
        Field::new("__typename", "String!")
            .camelize(false)
            .description("The name of the current Object type at runtime."),
    )
});

/// Looks a field up on `ty`, including the introspection fields it answers.
///
/// # Errors
///
/// If several fields named `name` are visible.
pub(crate) fn field_of(
    warden: &Warden,
    ty: &MetaType,
    name: &str,
) -> Result<Option<Arc<Field>>, DuplicateNamesError> {
    let schema = warden.schema();
    let on_query_root = ty.name() == schema.query_type_name();
    match name {
        "__typename" if matches!(ty, MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)) => {
            Ok(Some(Arc::clone(&TYPENAME_FIELD)))
        }
        "__schema" if on_query_root && schema.config().introspection => Ok(Some(Arc::clone(&SCHEMA_FIELD))),
        "__type" if on_query_root && schema.config().introspection => Ok(Some(Arc::clone(&TYPE_FIELD))),
        _ => Ok(warden.get_field(ty, name)?.cloned()),
    }
}

fn node(ctx: &ResolverContext) -> FieldResult<&Node> {
    ctx.object()
        .downcast_ref::<Node>()
        .ok_or_else(|| FieldError::from("Introspection field resolved outside of introspection"))
}

fn type_node(ty: Type) -> FieldValue {
    FieldValue::opaque(Node::Type(ty))
}

fn named_node(name: &ArcStr) -> FieldValue {
    type_node(Type::named(name.clone()))
}

fn include_deprecated(ctx: &ResolverContext) -> bool {
    ctx.arg("include_deprecated")
        .and_then(FieldValue::as_bool)
        .unwrap_or(false)
}

fn include_deprecated_argument() -> Argument {
    Argument::new("include_deprecated", "Boolean").default_value(false)
}

fn opt_str(s: Option<&ArcStr>) -> FieldValue {
    s.map_or(FieldValue::Null, |s| FieldValue::from(s.as_str()))
}

fn opt_string(s: Option<String>) -> FieldValue {
    s.map_or(FieldValue::Null, FieldValue::from)
}

/// Runs `f` on the named type a `__Type` stands for. Wrapping types answer
/// `null`.
fn on_named_type(
    ctx: &ResolverContext,
    f: impl FnOnce(&Warden, &MetaType) -> FieldResult<FieldValue>,
) -> FieldResult<FieldValue> {
    let Node::Type(Type::Named(name)) = node(ctx)? else {
        return Ok(FieldValue::Null);
    };
    match ctx.warden().get_type(name)? {
        Some(meta) => f(ctx.warden(), meta),
        None => Ok(FieldValue::Null),
    }
}

fn arguments_of(
    warden: &Warden,
    owner: &str,
    arguments: &[Arc<Argument>],
    include_deprecated: bool,
) -> FieldResult<FieldValue> {
    Ok(FieldValue::List(
        warden
            .arguments(owner, arguments)?
            .into_iter()
            .filter(|a| include_deprecated || a.deprecation_reason().is_none())
            .map(|a| FieldValue::opaque(Node::InputValue(Arc::clone(a))))
            .collect(),
    ))
}

fn schema_type() -> ObjectMeta {
    ObjectMeta::new("__Schema")
        .description(
            "A GraphQL Schema defines the capabilities of a GraphQL server. It exposes all \
             available types and directives on the server, as well as the entry points for \
             query, mutation, and subscription operations.",
        )
        .field(Field::new("description", "String").resolve(|ctx| {
            opt_str(ctx.warden().schema().description())
        }))
        .field(
            Field::new("types", "[__Type!]!")
                .description("A list of all types supported by this server.")
                .resolve(|ctx| -> FieldResult<FieldValue> {
                    Ok(FieldValue::List(
                        ctx.warden().types()?.into_iter().map(|t| named_node(t.name())).collect(),
                    ))
                }),
        )
        .field(
            Field::new("query_type", "__Type!")
                .description("The type that query operations will be rooted at.")
                .resolve(|ctx| root_of(&ctx, OperationType::Query)),
        )
        .field(
            Field::new("mutation_type", "__Type")
                .description(
                    "If this server supports mutation, the type that mutation operations will \
                     be rooted at.",
                )
                .resolve(|ctx| root_of(&ctx, OperationType::Mutation)),
        )
        .field(
            Field::new("subscription_type", "__Type")
                .description(
                    "If this server support subscription, the type that subscription operations \
                     will be rooted at.",
                )
                .resolve(|ctx| root_of(&ctx, OperationType::Subscription)),
        )
        .field(
            Field::new("directives", "[__Directive!]!")
                .description("A list of all directives supported by this server.")
                .resolve(|ctx| {
                    FieldValue::List(
                        ctx.warden()
                            .directives()
                            .into_iter()
                            .map(|d| FieldValue::opaque(Node::Directive(Arc::clone(d))))
                            .collect(),
                    )
                }),
        )
}

fn root_of(ctx: &ResolverContext, op: OperationType) -> FieldValue {
    ctx.warden()
        .root_type(op)
        .map_or(FieldValue::Null, |t| named_node(t.name()))
}

fn type_type() -> ObjectMeta {
    ObjectMeta::new("__Type")
        .description(
            "The fundamental unit of any GraphQL Schema is the type. There are many kinds of \
             types in GraphQL as represented by the `__TypeKind` enum.\n\nDepending on the \
             kind of a type, certain fields describe information about that type. Scalar types \
             provide no information beyond a name, description and optional `specifiedByURL`, \
             while Enum types provide their values. Object and Interface types provide the \
             fields they describe. Abstract types, Union and Interface, provide the Object \
             types possible at runtime. List and NonNull types compose other types.",
        )
        .field(Field::new("kind", "__TypeKind!").resolve(|ctx| -> FieldResult<FieldValue> {
            let Node::Type(ty) = node(&ctx)? else {
                return Ok(FieldValue::Null);
            };
            let kind = match ty {
                Type::Named(name) => match ctx.warden().get_type(name)? {
                    Some(meta) => meta.kind(),
                    None => return Ok(FieldValue::Null),
                },
                Type::List(_) => TypeKind::List,
                Type::NonNullNamed(_) | Type::NonNullList(_) => TypeKind::NonNull,
            };
            Ok(FieldValue::from(kind.as_str()))
        }))
        .field(Field::new("name", "String").resolve(|ctx| {
            on_named_type(&ctx, |_, meta| Ok(FieldValue::from(meta.name().as_str())))
        }))
        .field(Field::new("description", "String").resolve(|ctx| {
            on_named_type(&ctx, |_, meta| Ok(opt_str(meta.description())))
        }))
        .field(
            Field::new("specified_by_url", "String")
                .graphql_name("specifiedByURL")
                .resolve(|ctx| {
                    on_named_type(&ctx, |_, meta| {
                        Ok(match meta {
                            MetaType::Scalar(s) => s.url().map_or(FieldValue::Null, FieldValue::from),
                            _ => FieldValue::Null,
                        })
                    })
                }),
        )
        .field(
            Field::new("fields", "[__Field!]")
                .argument(include_deprecated_argument())
                .resolve(|ctx| {
                    let include = include_deprecated(&ctx);
                    on_named_type(&ctx, |warden, meta| {
                        if !matches!(meta, MetaType::Object(_) | MetaType::Interface(_)) {
                            return Ok(FieldValue::Null);
                        }
                        Ok(FieldValue::List(
                            warden
                                .fields(meta)?
                                .into_iter()
                                .filter(|f| include || f.deprecation_reason().is_none())
                                .map(|f| FieldValue::opaque(Node::Field(Arc::clone(f))))
                                .collect(),
                        ))
                    })
                }),
        )
        .field(Field::new("interfaces", "[__Type!]").resolve(|ctx| {
            on_named_type(&ctx, |warden, meta| {
                if !matches!(meta, MetaType::Object(_) | MetaType::Interface(_)) {
                    return Ok(FieldValue::Null);
                }
                Ok(FieldValue::List(
                    warden.interfaces(meta).into_iter().map(|t| named_node(t.name())).collect(),
                ))
            })
        }))
        .field(Field::new("possible_types", "[__Type!]").resolve(|ctx| {
            on_named_type(&ctx, |warden, meta| {
                if !meta.is_abstract() {
                    return Ok(FieldValue::Null);
                }
                Ok(FieldValue::List(
                    warden.possible_types(meta).into_iter().map(|t| named_node(t.name())).collect(),
                ))
            })
        }))
        .field(
            Field::new("enum_values", "[__EnumValue!]")
                .argument(include_deprecated_argument())
                .resolve(|ctx| {
                    let include = include_deprecated(&ctx);
                    on_named_type(&ctx, |warden, meta| {
                        if !matches!(meta, MetaType::Enum(_)) {
                            return Ok(FieldValue::Null);
                        }
                        Ok(FieldValue::List(
                            warden
                                .enum_values(meta)?
                                .into_iter()
                                .filter(|v| include || v.deprecation_reason().is_none())
                                .map(|v| FieldValue::opaque(Node::EnumValue(Arc::clone(v))))
                                .collect(),
                        ))
                    })
                }),
        )
        .field(
            Field::new("input_fields", "[__InputValue!]")
                .argument(include_deprecated_argument())
                .resolve(|ctx| {
                    let include = include_deprecated(&ctx);
                    on_named_type(&ctx, |warden, meta| match meta {
                        MetaType::InputObject(i) => arguments_of(warden, &i.name, &i.input_fields, include),
                        _ => Ok(FieldValue::Null),
                    })
                }),
        )
        .field(Field::new("of_type", "__Type").resolve(|ctx| -> FieldResult<FieldValue> {
            let Node::Type(ty) = node(&ctx)? else {
                return Ok(FieldValue::Null);
            };
            Ok(match ty {
                Type::Named(_) => FieldValue::Null,
                Type::List(inner) => type_node((**inner).clone()),
                Type::NonNullNamed(name) => type_node(Type::Named(name.clone())),
                Type::NonNullList(inner) => type_node(Type::List(inner.clone())),
            })
        }))
        .field(Field::new("is_one_of", "Boolean").resolve(|ctx| {
            on_named_type(&ctx, |_, meta| {
                Ok(FieldValue::from(matches!(meta, MetaType::InputObject(i) if i.is_one_of())))
            })
        }))
}

fn field_type() -> ObjectMeta {
    ObjectMeta::new("__Field")
        .description(
            "Object and Interface types are described by a list of Fields, each of which has a \
             name, potentially a list of arguments, and a return type.",
        )
        .field(Field::new("name", "String!").resolve(|ctx| on_field(&ctx, |f| FieldValue::from(f.name.as_str()))))
        .field(Field::new("description", "String").resolve(|ctx| on_field(&ctx, |f| opt_str(f.description.as_ref()))))
        .field(
            Field::new("args", "[__InputValue!]!")
                .argument(include_deprecated_argument())
                .resolve(|ctx| -> FieldResult<FieldValue> {
                    let Node::Field(f) = node(&ctx)? else {
                        return Ok(FieldValue::Null);
                    };
                    arguments_of(ctx.warden(), &f.path(), &f.arguments, include_deprecated(&ctx))
                }),
        )
        .field(Field::new("type", "__Type!").resolve(|ctx| on_field(&ctx, |f| type_node(f.field_type.clone()))))
        .field(
            Field::new("is_deprecated", "Boolean!")
                .resolve(|ctx| on_field(&ctx, |f| FieldValue::from(f.deprecation_reason().is_some()))),
        )
        .field(
            Field::new("deprecation_reason", "String")
                .resolve(|ctx| on_field(&ctx, |f| opt_string(f.deprecation_reason()))),
        )
}

fn on_field(ctx: &ResolverContext, f: impl FnOnce(&Field) -> FieldValue) -> FieldResult<FieldValue> {
    match node(ctx)? {
        Node::Field(field) => Ok(f(field)),
        _ => Ok(FieldValue::Null),
    }
}

fn input_value_type() -> ObjectMeta {
    ObjectMeta::new("__InputValue")
        .description(
            "Arguments provided to Fields or Directives and the input fields of an InputObject \
             are represented as Input Values which describe their type and optionally a default \
             value.",
        )
        .field(Field::new("name", "String!").resolve(|ctx| on_input(&ctx, |_, a| Ok(FieldValue::from(a.name.as_str())))))
        .field(Field::new("description", "String").resolve(|ctx| on_input(&ctx, |_, a| Ok(opt_str(a.description.as_ref())))))
        .field(Field::new("type", "__Type!").resolve(|ctx| on_input(&ctx, |_, a| Ok(type_node(a.arg_type.clone())))))
        .field(
            Field::new("default_value", "String")
                .description(
                    "A GraphQL-formatted string representing the default value for this input \
                     value.",
                )
                .resolve(|ctx| {
                    on_input(&ctx, |warden, a| match default_literal(warden, a) {
                        Some(Ok(literal)) => Ok(FieldValue::from(literal.to_string())),
                        Some(Err(e)) => Err(FieldError::from(e)),
                        None => Ok(FieldValue::Null),
                    })
                }),
        )
        .field(
            Field::new("is_deprecated", "Boolean!")
                .resolve(|ctx| on_input(&ctx, |_, a| Ok(FieldValue::from(a.deprecation_reason().is_some())))),
        )
        .field(
            Field::new("deprecation_reason", "String")
                .resolve(|ctx| on_input(&ctx, |_, a| Ok(opt_string(a.deprecation_reason())))),
        )
}

fn on_input(
    ctx: &ResolverContext,
    f: impl FnOnce(&Warden, &Argument) -> FieldResult<FieldValue>,
) -> FieldResult<FieldValue> {
    match node(ctx)? {
        Node::InputValue(a) => f(ctx.warden(), a),
        _ => Ok(FieldValue::Null),
    }
}

fn enum_value_type() -> ObjectMeta {
    ObjectMeta::new("__EnumValue")
        .description(
            "One possible value for a given Enum. Enum values are unique values, not a \
             placeholder for a string or numeric value. However an Enum value is returned in a \
             JSON response as a string.",
        )
        .field(Field::new("name", "String!").resolve(|ctx| on_enum_value(&ctx, |v| FieldValue::from(v.name.as_str()))))
        .field(Field::new("description", "String").resolve(|ctx| on_enum_value(&ctx, |v| opt_str(v.description.as_ref()))))
        .field(
            Field::new("is_deprecated", "Boolean!")
                .resolve(|ctx| on_enum_value(&ctx, |v| FieldValue::from(v.deprecation_reason().is_some()))),
        )
        .field(
            Field::new("deprecation_reason", "String")
                .resolve(|ctx| on_enum_value(&ctx, |v| opt_string(v.deprecation_reason()))),
        )
}

fn on_enum_value(ctx: &ResolverContext, f: impl FnOnce(&EnumValue) -> FieldValue) -> FieldResult<FieldValue> {
    match node(ctx)? {
        Node::EnumValue(v) => Ok(f(v)),
        _ => Ok(FieldValue::Null),
    }
}

fn directive_type() -> ObjectMeta {
    ObjectMeta::new("__Directive")
        .description(
            "A Directive provides a way to describe alternate runtime execution and type \
             validation behavior in a GraphQL document.\n\nIn some cases, you need to provide \
             options to alter GraphQL's execution behavior in ways field arguments will not \
             suffice, such as conditionally including or skipping a field. Directives provide \
             this by describing additional information to the executor.",
        )
        .field(Field::new("name", "String!").resolve(|ctx| on_directive(&ctx, |d| FieldValue::from(d.name.as_str()))))
        .field(Field::new("description", "String").resolve(|ctx| on_directive(&ctx, |d| opt_str(d.description.as_ref()))))
        .field(Field::new("locations", "[__DirectiveLocation!]!").resolve(|ctx| {
            on_directive(&ctx, |d| FieldValue::list(d.locations.iter().map(|l| l.as_str())))
        }))
        .field(
            Field::new("args", "[__InputValue!]!")
                .argument(include_deprecated_argument())
                .resolve(|ctx| -> FieldResult<FieldValue> {
                    let Node::Directive(d) = node(&ctx)? else {
                        return Ok(FieldValue::Null);
                    };
                    arguments_of(ctx.warden(), &format!("@{}", d.name), &d.arguments, include_deprecated(&ctx))
                }),
        )
        .field(
            Field::new("is_repeatable", "Boolean!")
                .resolve(|ctx| on_directive(&ctx, |d| FieldValue::from(d.is_repeatable))),
        )
}

fn on_directive(ctx: &ResolverContext, f: impl FnOnce(&DirectiveType) -> FieldValue) -> FieldResult<FieldValue> {
    match node(ctx)? {
        Node::Directive(d) => Ok(f(d)),
        _ => Ok(FieldValue::Null),
    }
}

fn type_kind_type() -> EnumMeta {
    let descriptions = [
        (TypeKind::Scalar, "Indicates this type is a scalar."),
        (
            TypeKind::Object,
            "Indicates this type is an object. `fields` and `interfaces` are valid fields.",
        ),
        (
            TypeKind::Interface,
            "Indicates this type is an interface. `fields`, `interfaces`, and `possibleTypes` \
             are valid fields.",
        ),
        (
            TypeKind::Union,
            "Indicates this type is a union. `possibleTypes` is a valid field.",
        ),
        (
            TypeKind::Enum,
            "Indicates this type is an enum. `enumValues` is a valid field.",
        ),
        (
            TypeKind::InputObject,
            "Indicates this type is an input object. `inputFields` is a valid field.",
        ),
        (
            TypeKind::List,
            "Indicates this type is a list. `ofType` is a valid field.",
        ),
        (
            TypeKind::NonNull,
            "Indicates this type is a non-null. `ofType` is a valid field.",
        ),
    ];
    descriptions.into_iter().fold(
        EnumMeta::new("__TypeKind")
            .description("An enum describing what kind of type a given `__Type` is."),
        |e, (kind, description)| e.value(EnumValue::new(kind.as_str()).description(description)),
    )
}

fn directive_location_type() -> EnumMeta {
    DirectiveLocation::ALL.into_iter().fold(
        EnumMeta::new("__DirectiveLocation").description(
            "A Directive can be adjacent to many parts of the GraphQL language, a \
             __DirectiveLocation describes one such possible adjacencies.",
        ),
        |e, l| e.value(EnumValue::new(l.as_str()).description(l.description())),
    )
}

/// Types answering introspection queries, registered in every schema.
pub(crate) fn meta_types() -> Vec<MetaType> {
    vec![
        schema_type().into_meta(),
        type_type().into_meta(),
        field_type().into_meta(),
        input_value_type().into_meta(),
        enum_value_type().into_meta(),
        directive_type().into_meta(),
        type_kind_type().into_meta(),
        directive_location_type().into_meta(),
    ]
}

impl Schema {
    /// Runs [`INTROSPECTION_QUERY`] in `ctx`, producing introspection JSON
    /// of the members visible in it.
    ///
    /// # Errors
    ///
    /// If `ctx` selects an unknown visibility profile or same-named members
    /// are visible.
    pub fn introspect(&self, ctx: &Context) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        crate::execute_sync(INTROSPECTION_QUERY, None, self, &Variables::new(), ctx)
    }
}
