use std::sync::Arc;

use graphql_parser::{
    Pos,
    schema::{
        self as parsed, Definition, DirectiveDefinition, SchemaDefinition, TypeDefinition,
        TypeExtension,
    },
};
use indexmap::IndexMap;

use super::{InvalidDocument, LoadError};
use crate::{
    ast::{InputValue, Type},
    parser::parse_schema,
    schema::{
        builder::SchemaBuilder,
        directives::{
            DEFAULT_DEPRECATION_REASON, DirectiveApplication, DirectiveLocation, DirectiveType,
        },
        meta::{
            Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, MetaType,
            ObjectMeta, ScalarMeta, UnionMeta,
        },
        model::OperationType,
    },
    util::to_snake_case,
};

type Directives = [parsed::Directive<'static, String>];

pub(super) fn load(sdl: &str) -> Result<SchemaBuilder, LoadError> {
    let doc = parse_schema(sdl)?;

    let mut schema_definition = None;
    let mut directive_definitions = Vec::new();
    let mut types = IndexMap::new();
    let mut extensions = Vec::new();
    for definition in doc.definitions {
        match definition {
            Definition::SchemaDefinition(s) => {
                if schema_definition.replace(s).is_some() {
                    return Err(InvalidDocument::MultipleSchemaDefinitions.into());
                }
            }
            Definition::DirectiveDefinition(d) => directive_definitions.push(d),
            Definition::TypeDefinition(t) => {
                let name = type_name(&t);
                if is_builtin_scalar(name) || name.starts_with("__") {
                    continue;
                }
                // The first definition of a name wins.
                types.entry(name.to_owned()).or_insert(t);
            }
            Definition::TypeExtension(e) => extensions.push(e),
        }
    }
    for extension in extensions {
        extend(&mut types, extension)?;
    }

    check_references(&types, &directive_definitions)?;
    let roots = roots(schema_definition.as_ref(), &types)?;

    let loader = Loader::new(&directive_definitions)?;
    let mut builder = SchemaBuilder::new()
        .query_name(roots.query)
        .orphan_types(
            &types
                .values()
                .filter(|t| matches!(t, TypeDefinition::Object(_)))
                .map(type_name)
                .collect::<Vec<_>>(),
        );
    if let Some(name) = roots.mutation {
        builder = builder.mutation_name(name);
    }
    if let Some(name) = roots.subscription {
        builder = builder.subscription_name(name);
    }
    if let Some(schema) = &schema_definition {
        for app in loader.applications(&schema.directives, None, schema.position)? {
            builder = builder.schema_directive(app);
        }
    }
    for directive in loader.declared() {
        builder = builder.directive(directive);
    }
    for definition in types.values() {
        builder = builder.register(loader.type_definition(definition)?);
    }
    tracing::debug!(
        types = types.len(),
        directives = directive_definitions.len(),
        "loaded schema definition",
    );
    Ok(builder)
}

fn is_builtin_scalar(name: &str) -> bool {
    matches!(name, "Boolean" | "String" | "Int" | "Float" | "ID")
}

fn type_name<'d>(definition: &'d TypeDefinition<'static, String>) -> &'d str {
    match definition {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

/// Merges an `extend ..` block into the definition it extends.
fn extend(
    types: &mut IndexMap<String, TypeDefinition<'static, String>>,
    extension: TypeExtension<'static, String>,
) -> Result<(), InvalidDocument> {
    let name = match &extension {
        TypeExtension::Scalar(e) => &e.name,
        TypeExtension::Object(e) => &e.name,
        TypeExtension::Interface(e) => &e.name,
        TypeExtension::Union(e) => &e.name,
        TypeExtension::Enum(e) => &e.name,
        TypeExtension::InputObject(e) => &e.name,
    }
    .clone();
    let not_found = || InvalidDocument::TypeNotFound { name: name.clone() };
    let definition = types.get_mut(&name).ok_or_else(not_found)?;
    match (definition, extension) {
        (TypeDefinition::Scalar(t), TypeExtension::Scalar(e)) => t.directives.extend(e.directives),
        (TypeDefinition::Object(t), TypeExtension::Object(e)) => {
            t.implements_interfaces.extend(e.implements_interfaces);
            t.directives.extend(e.directives);
            t.fields.extend(e.fields);
        }
        (TypeDefinition::Interface(t), TypeExtension::Interface(e)) => {
            t.directives.extend(e.directives);
            t.fields.extend(e.fields);
        }
        (TypeDefinition::Union(t), TypeExtension::Union(e)) => {
            t.directives.extend(e.directives);
            t.types.extend(e.types);
        }
        (TypeDefinition::Enum(t), TypeExtension::Enum(e)) => {
            t.directives.extend(e.directives);
            t.values.extend(e.values);
        }
        (TypeDefinition::InputObject(t), TypeExtension::InputObject(e)) => {
            t.directives.extend(e.directives);
            t.fields.extend(e.fields);
        }
        _ => return Err(not_found()),
    }
    Ok(())
}

/// Checks that every referenced type name has a definition.
fn check_references(
    types: &IndexMap<String, TypeDefinition<'static, String>>,
    directives: &[DirectiveDefinition<'static, String>],
) -> Result<(), InvalidDocument> {
    let mut referenced = Vec::new();
    for d in directives {
        input_types(&d.arguments, &mut referenced);
    }
    for t in types.values() {
        match t {
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
            TypeDefinition::Object(o) => {
                referenced.extend(o.implements_interfaces.iter().map(String::as_str));
                output_types(&o.fields, &mut referenced);
            }
            TypeDefinition::Interface(i) => output_types(&i.fields, &mut referenced),
            TypeDefinition::Union(u) => referenced.extend(u.types.iter().map(String::as_str)),
            TypeDefinition::InputObject(i) => input_types(&i.fields, &mut referenced),
        }
    }
    match referenced
        .into_iter()
        .find(|name| !is_builtin_scalar(name) && !types.contains_key(*name))
    {
        Some(name) => Err(InvalidDocument::TypeNotFound { name: name.to_owned() }),
        None => Ok(()),
    }
}

fn output_types<'d>(fields: &'d [parsed::Field<'static, String>], out: &mut Vec<&'d str>) {
    for f in fields {
        out.push(named(&f.field_type));
        input_types(&f.arguments, out);
    }
}

fn input_types<'d>(values: &'d [parsed::InputValue<'static, String>], out: &mut Vec<&'d str>) {
    out.extend(values.iter().map(|v| named(&v.value_type)));
}

fn named<'t>(ty: &'t parsed::Type<'static, String>) -> &'t str {
    match ty {
        parsed::Type::NamedType(name) => name,
        parsed::Type::ListType(inner) | parsed::Type::NonNullType(inner) => named(inner),
    }
}

struct Roots {
    query: String,
    mutation: Option<String>,
    subscription: Option<String>,
}

fn roots(
    schema: Option<&SchemaDefinition<'static, String>>,
    types: &IndexMap<String, TypeDefinition<'static, String>>,
) -> Result<Roots, InvalidDocument> {
    let declared = schema
        .map(|s| [s.query.clone(), s.mutation.clone(), s.subscription.clone()])
        .filter(|names| names.iter().any(Option::is_some));
    let [query, mutation, subscription] = match declared {
        Some(names) => {
            let ops = [
                OperationType::Query,
                OperationType::Mutation,
                OperationType::Subscription,
            ];
            for (op, name) in ops.into_iter().zip(&names) {
                if let Some(name) = name.as_ref().filter(|n| !types.contains_key(*n)) {
                    return Err(InvalidDocument::RootTypeNotFound {
                        operation: op.to_string(),
                        name: name.clone(),
                    });
                }
            }
            names
        }
        None => ["Query", "Mutation", "Subscription"]
            .map(|n| types.contains_key(n).then(|| n.to_owned())),
    };
    Ok(Roots {
        query: query.ok_or(InvalidDocument::MissingQueryType)?,
        mutation,
        subscription,
    })
}

struct Loader {
    directives: IndexMap<String, Arc<DirectiveType>>,
    declared: Vec<Arc<DirectiveType>>,
}

impl Loader {
    fn new(definitions: &[DirectiveDefinition<'static, String>]) -> Result<Self, LoadError> {
        let mut loader = Self {
            directives: DirectiveType::built_ins()
                .into_iter()
                .map(|d| (d.name.to_string(), d))
                .collect(),
            declared: Vec::new(),
        };
        // Applications on directive arguments may refer to any declared
        // directive, so those are known without them first.
        for d in definitions {
            let bare = directive_definition(d, |arg| Ok(input_value(arg)))?;
            loader.directives.insert(d.name.clone(), Arc::new(bare));
        }
        for d in definitions {
            let path = format!("@{}", d.name);
            let full = directive_definition(d, |arg| loader.argument(&path, arg))?;
            loader.declared.push(Arc::new(full));
        }
        Ok(loader)
    }

    fn declared(&self) -> impl Iterator<Item = Arc<DirectiveType>> + '_ {
        self.declared.iter().cloned()
    }

    fn type_definition(&self, definition: &TypeDefinition<'static, String>) -> Result<MetaType, LoadError> {
        Ok(match definition {
            TypeDefinition::Scalar(t) => {
                let mut meta = ScalarMeta::new(t.name.as_str());
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                meta.into()
            }
            TypeDefinition::Object(t) => {
                let mut meta = ObjectMeta::new(t.name.as_str()).interfaces(
                    &t.implements_interfaces.iter().map(String::as_str).collect::<Vec<_>>(),
                );
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                for f in &t.fields {
                    meta = meta.field(self.field(&t.name, f)?);
                }
                meta.into()
            }
            TypeDefinition::Interface(t) => {
                let mut meta = InterfaceMeta::new(t.name.as_str());
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                for f in &t.fields {
                    meta = meta.field(self.field(&t.name, f)?);
                }
                meta.into()
            }
            TypeDefinition::Union(t) => {
                let members = t.types.iter().map(String::as_str).collect::<Vec<_>>();
                let mut meta = UnionMeta::new(t.name.as_str(), &members);
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                meta.into()
            }
            TypeDefinition::Enum(t) => {
                let mut meta = EnumMeta::new(t.name.as_str());
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                for v in &t.values {
                    let mut value = EnumValue::new(v.name.as_str());
                    if let Some(d) = &v.description {
                        value = value.description(d.as_str());
                    }
                    value.set_deprecation_reason(deprecation_reason(&v.directives).as_deref());
                    for app in self.applications(&v.directives, Some(&v.name), v.position)? {
                        value = value.directive(app);
                    }
                    meta = meta.value(value);
                }
                meta.into()
            }
            TypeDefinition::InputObject(t) => {
                let mut meta = InputObjectMeta::new(t.name.as_str());
                if let Some(d) = &t.description {
                    meta = meta.description(d.as_str());
                }
                for app in self.applications(&t.directives, Some(&t.name), t.position)? {
                    meta = meta.directive(app);
                }
                for f in &t.fields {
                    meta = meta.argument(self.argument(&t.name, f)?);
                }
                meta.into()
            }
        })
    }

    fn field(&self, owner: &str, def: &parsed::Field<'static, String>) -> Result<Field, LoadError> {
        let mut field = Field::new(to_snake_case(&def.name), Type::from(&def.field_type))
            .graphql_name(def.name.as_str());
        if let Some(d) = &def.description {
            field = field.description(d.as_str());
        }
        field.set_deprecation_reason(deprecation_reason(&def.directives).as_deref());
        for app in self.applications(&def.directives, Some(&def.name), def.position)? {
            field = field.directive(app);
        }
        let path = format!("{owner}.{}", def.name);
        for arg in &def.arguments {
            field = field.argument(self.argument(&path, arg)?);
        }
        Ok(field)
    }

    fn argument(
        &self,
        owner: &str,
        def: &parsed::InputValue<'static, String>,
    ) -> Result<Argument, LoadError> {
        let mut arg = input_value(def);
        arg.set_deprecation_reason(
            &format!("{owner}.{}", def.name),
            deprecation_reason(&def.directives).as_deref(),
        )?;
        for app in self.applications(&def.directives, Some(&def.name), def.position)? {
            arg = arg.directive(app);
        }
        Ok(arg)
    }

    /// Applications of every directive but `@deprecated`, which is handled
    /// as a deprecation reason.
    fn applications(
        &self,
        directives: &Directives,
        owner: Option<&str>,
        position: Pos,
    ) -> Result<Vec<DirectiveApplication>, InvalidDocument> {
        directives
            .iter()
            .filter(|d| d.name != "deprecated")
            .map(|d| {
                let definition = self.directives.get(&d.name).ok_or_else(|| {
                    InvalidDocument::UnknownDirective {
                        directive: d.name.clone(),
                        owner: owner.map(str::to_owned),
                        position: position.into(),
                    }
                })?;
                Ok(d.arguments.iter().fold(
                    DirectiveApplication::new(definition),
                    |app, (name, value)| app.argument(name.as_str(), InputValue::from_parsed(value)),
                ))
            })
            .collect()
    }
}

/// Argument or input field without its directives.
fn input_value(def: &parsed::InputValue<'static, String>) -> Argument {
    let mut arg = Argument::from_graphql_name(&def.name, (&def.value_type).into());
    if let Some(d) = &def.description {
        arg = arg.description(d.as_str());
    }
    if let Some(v) = &def.default_value {
        arg = arg.default_value(InputValue::from_parsed(v));
    }
    arg
}

fn directive_definition(
    def: &DirectiveDefinition<'static, String>,
    argument: impl Fn(&parsed::InputValue<'static, String>) -> Result<Argument, LoadError>,
) -> Result<DirectiveType, LoadError> {
    let locations = def
        .locations
        .iter()
        .filter_map(|l| {
            DirectiveLocation::ALL
                .into_iter()
                .find(|known| known.as_str() == l.as_str())
        })
        .collect::<Vec<_>>();
    let mut directive = DirectiveType::new(def.name.as_str(), &locations);
    if let Some(d) = &def.description {
        directive = directive.description(d.as_str());
    }
    if def.repeatable {
        directive = directive.repeatable();
    }
    for arg in &def.arguments {
        directive = directive.argument(argument(arg)?);
    }
    Ok(directive)
}

/// Reason of an applied `@deprecated`, if any.
fn deprecation_reason(directives: &Directives) -> Option<String> {
    let deprecated = directives.iter().find(|d| d.name == "deprecated")?;
    Some(
        deprecated
            .arguments
            .iter()
            .find(|(name, _)| name == "reason")
            .and_then(|(_, v)| match v {
                parsed::Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_owned()),
    )
}
