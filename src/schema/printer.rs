//! SDL rendering of the members visible through a [`Warden`].
//!
//! Definitions are sorted by name, and so are the fields, arguments, enum
//! values, interfaces and union members inside them. Printing a loaded
//! printout reproduces it byte for byte.

use std::sync::Arc;

use arcstr::ArcStr;
use itertools::Itertools as _;

use super::{
    directives::{DEFAULT_DEPRECATION_REASON, DirectiveType, Directives},
    meta::{Argument, Field, MetaType},
    model::{OperationType, Schema},
    visibility::{DuplicateNamesError, Warden},
};
use crate::{ast::InputValue, types::coercion::default_literal};

/// Lines of descriptions longer than this (minus the indentation) are
/// wrapped.
const MAX_LINE_LENGTH: usize = 120;

/// Renders the schema visible through `warden` as SDL.
///
/// Built-in scalars, built-in directives and introspection types are left
/// out. A `schema` block is only printed for unconventional root names or
/// schema directives.
///
/// # Errors
///
/// If same-named members are visible together.
pub fn print_schema(warden: &Warden) -> Result<String, DuplicateNamesError> {
    let printer = Printer { warden };
    let mut blocks = Vec::new();
    blocks.extend(printer.schema_definition());
    for d in warden
        .directives()
        .into_iter()
        .filter(|d| !d.is_builtin())
        .sorted_by(|a, b| a.name.cmp(&b.name))
    {
        blocks.push(printer.directive_definition(d)?);
    }
    for ty in warden
        .types()?
        .into_iter()
        .filter(|t| !t.is_builtin())
        .sorted_by(|a, b| a.name().cmp(b.name()))
    {
        blocks.push(printer.type_definition(ty)?);
    }
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// Renders one type definition, without a trailing newline.
///
/// # Errors
///
/// If same-named members of `ty` are visible together.
pub fn print_type(warden: &Warden, ty: &MetaType) -> Result<String, DuplicateNamesError> {
    Printer { warden }.type_definition(ty)
}

/// Renders the built-in directives and the introspection types.
///
/// # Errors
///
/// If same-named introspection members are visible together.
pub fn print_introspection_schema(schema: &Schema) -> Result<String, DuplicateNamesError> {
    let warden = schema.unfiltered_warden();
    let printer = Printer { warden: &warden };
    let mut blocks = vec!["schema {\n  query: Root\n}".to_owned()];
    for d in DirectiveType::built_ins() {
        blocks.push(printer.directive_definition(&d)?);
    }
    for ty in schema
        .type_list()
        .iter()
        .filter(|t| t.is_introspection())
        .sorted_by(|a, b| a.name().cmp(b.name()))
    {
        blocks.push(printer.type_definition(ty)?);
    }
    Ok(blocks.join("\n\n"))
}

impl Schema {
    /// SDL of the members visible in `ctx`.
    ///
    /// # Errors
    ///
    /// If `ctx` selects an unknown visibility profile, or same-named members
    /// are visible in it.
    pub fn to_definition(&self, ctx: &crate::Context) -> Result<String, crate::GraphQLError> {
        let warden = self.warden(ctx)?;
        Ok(print_schema(&warden)?)
    }
}

struct Printer<'w> {
    warden: &'w Warden,
}

impl Printer<'_> {
    fn schema_definition(&self) -> Option<String> {
        let schema = self.warden.schema();
        let directives = self.directives(schema.schema_directives());
        if !schema.has_custom_root_names() && directives.is_empty() {
            return None;
        }
        let mut out = format!("schema{directives} {{\n");
        for op in [
            OperationType::Query,
            OperationType::Mutation,
            OperationType::Subscription,
        ] {
            if let Some(root) = self.warden.root_type(op) {
                out.push_str(&format!("  {op}: {}\n", root.name()));
            }
        }
        out.push('}');
        Some(out)
    }

    fn directive_definition(&self, d: &DirectiveType) -> Result<String, DuplicateNamesError> {
        let mut out = String::new();
        push_description(&mut out, d.description.as_deref(), "", true);
        out.push_str("directive @");
        out.push_str(&d.name);
        let arguments = self.warden.arguments(&format!("@{}", d.name), &d.arguments)?;
        out.push_str(&self.arguments(&arguments, ""));
        if d.is_repeatable {
            out.push_str(" repeatable");
        }
        out.push_str(" on ");
        out.push_str(&d.locations_signature());
        Ok(out)
    }

    fn type_definition(&self, ty: &MetaType) -> Result<String, DuplicateNamesError> {
        let mut out = String::new();
        push_description(&mut out, ty.description().map(ArcStr::as_str), "", true);
        let name = ty.name();
        let directives = self.directives(ty.directives());
        match ty {
            MetaType::Scalar(_) => out.push_str(&format!("scalar {name}{directives}")),
            MetaType::Object(_) | MetaType::Interface(_) => {
                let keyword = if matches!(ty, MetaType::Object(_)) {
                    "type"
                } else {
                    "interface"
                };
                out.push_str(&format!("{keyword} {name}"));
                let interfaces = self
                    .warden
                    .interfaces(ty)
                    .into_iter()
                    .map(|i| i.name().as_str())
                    .sorted()
                    .join(" & ");
                if !interfaces.is_empty() {
                    out.push_str(" implements ");
                    out.push_str(&interfaces);
                }
                out.push_str(&directives);
                let fields = self
                    .warden
                    .fields(ty)?
                    .into_iter()
                    .sorted_by(|a, b| a.name.cmp(&b.name))
                    .collect::<Vec<_>>();
                let mut lines = Vec::with_capacity(fields.len());
                for f in fields {
                    lines.push((f.description.as_deref(), self.field_definition(f)?));
                }
                out.push_str(&block(lines));
            }
            MetaType::Union(_) => {
                out.push_str(&format!("union {name}{directives}"));
                let members = self
                    .warden
                    .possible_types(ty)
                    .into_iter()
                    .map(|t| t.name().as_str())
                    .sorted()
                    .join(" | ");
                if !members.is_empty() {
                    out.push_str(" = ");
                    out.push_str(&members);
                }
            }
            MetaType::Enum(_) => {
                out.push_str(&format!("enum {name}{directives}"));
                let lines = self
                    .warden
                    .enum_values(ty)?
                    .into_iter()
                    .sorted_by(|a, b| a.name.cmp(&b.name))
                    .map(|v| {
                        let line = format!("{}{}", v.name, self.directives(&v.directives));
                        (v.description.as_deref(), line)
                    })
                    .collect();
                out.push_str(&block(lines));
            }
            MetaType::InputObject(input) => {
                out.push_str(&format!("input {name}{directives}"));
                let lines = self
                    .warden
                    .arguments(name, &input.input_fields)?
                    .into_iter()
                    .sorted_by(|a, b| a.name.cmp(&b.name))
                    .map(|a| (a.description.as_deref(), self.argument_definition(a)))
                    .collect();
                out.push_str(&block(lines));
            }
        }
        Ok(out)
    }

    fn field_definition(&self, field: &Field) -> Result<String, DuplicateNamesError> {
        let arguments = self.warden.arguments(&field.path(), &field.arguments)?;
        Ok(format!(
            "{}{}: {}{}",
            field.name,
            self.arguments(&arguments, "  "),
            field.field_type,
            self.directives(&field.directives),
        ))
    }

    /// Argument list, inline unless an argument has a description.
    fn arguments(&self, arguments: &[&Arc<Argument>], indent: &str) -> String {
        if arguments.is_empty() {
            return String::new();
        }
        let sorted = arguments
            .iter()
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect::<Vec<_>>();
        if sorted.iter().all(|a| a.description.is_none()) {
            return format!(
                "({})",
                sorted.iter().map(|a| self.argument_definition(a)).join(", "),
            );
        }
        let inner = format!("  {indent}");
        let mut out = "(\n".to_owned();
        for (i, a) in sorted.iter().enumerate() {
            push_description(&mut out, a.description.as_deref(), &inner, i == 0);
            out.push_str(&inner);
            out.push_str(&self.argument_definition(a));
            if i + 1 < sorted.len() {
                out.push('\n');
            }
        }
        out.push('\n');
        out.push_str(indent);
        out.push(')');
        out
    }

    fn argument_definition(&self, arg: &Argument) -> String {
        let mut out = format!("{}: {}", arg.name, arg.arg_type);
        match default_literal(self.warden, arg) {
            Some(Ok(value)) => {
                out.push_str(" = ");
                out.push_str(&value.sorted().to_string());
            }
            Some(Err(e)) => {
                tracing::warn!(argument = arg.name.as_str(), error = e.as_str(), "default isn't printable");
            }
            None => {}
        }
        out.push_str(&self.directives(&arg.directives));
        out
    }

    /// Applications whose directive is visible, each preceded by a space.
    fn directives(&self, directives: &Directives) -> String {
        let mut out = String::new();
        for app in directives.iter() {
            if self.warden.get_directive(app.name()).is_none() {
                continue;
            }
            out.push_str(" @");
            out.push_str(app.name());
            let bare = app.name() == "deprecated"
                && app
                    .argument_value("reason")
                    .and_then(InputValue::as_string_value)
                    .is_none_or(|r| r == DEFAULT_DEPRECATION_REASON);
            if bare || app.arguments().is_empty() {
                continue;
            }
            let arguments = app
                .arguments()
                .iter()
                .sorted_by(|a, b| a.0.cmp(&b.0))
                .map(|(name, value)| format!("{name}: {}", value.sorted()))
                .join(", ");
            out.push_str(&format!("({arguments})"));
        }
        out
    }
}

/// `{ .. }` block of definition lines, or nothing when there are none.
///
/// A described line is set apart from the previous one by a blank line.
fn block(lines: Vec<(Option<&str>, String)>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = " {\n".to_owned();
    for (i, (description, line)) in lines.into_iter().enumerate() {
        push_description(&mut out, description, "  ", i == 0);
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push('}');
    out
}

/// Object literals with their keys in name order.
fn push_description(out: &mut String, description: Option<&str>, indent: &str, first_in_block: bool) {
    let Some(description) = description else {
        return;
    };
    if !indent.is_empty() && !first_in_block {
        out.push('\n');
    }
    out.push_str(indent);
    out.push_str("\"\"\"\n");
    let width = MAX_LINE_LENGTH.saturating_sub(indent.len());
    for line in description.trim_end_matches('\n').split('\n') {
        if line.is_empty() {
            out.push('\n');
            continue;
        }
        for subline in break_line(line, width) {
            out.push_str(indent);
            out.push_str(&subline.replace("\"\"\"", "\\\"\"\""));
            out.push('\n');
        }
    }
    out.push_str(indent);
    out.push_str("\"\"\"\n");
}

/// Wraps an overly long description line at spaces.
fn break_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() < width + 5 {
        return vec![line.to_owned()];
    }
    let max = width.saturating_sub(40);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{break_line, print_introspection_schema, print_schema, print_type};
    use crate::{
        Context, FieldValue,
        ast::InputValue,
        schema::{
            builder::SchemaBuilder,
            directives::{DirectiveApplication, DirectiveLocation, DirectiveType},
            meta::{
                Argument, EnumMeta, EnumValue, Field, InputObjectMeta, InterfaceMeta, ObjectMeta,
                ScalarMeta, UnionMeta,
            },
            model::Schema,
        },
        value::Value,
    };

    fn schema() -> Schema {
        SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .description("The query root of this schema")
                    .field(
                        Field::new("post", "Post")
                            .argument(Argument::new("id", "ID!").description("Post ID"))
                            .argument(Argument::new("varied", "Varied").default_value(
                                InputValue::object([
                                    ("id", InputValue::from("123")),
                                    ("int", 234.into()),
                                    ("someEnum", InputValue::enum_value("FOO")),
                                ]),
                            ))
                            .argument(
                                Argument::new("deprecated_arg", "String")
                                    .deprecated("Use something else"),
                            ),
                    )
                    .field(Field::new("example_media", "Media"))
                    .field(
                        Field::new("no_fields_type", "NoFields")
                            .argument(Argument::new("no_arguments_input", "NoArguments!")),
                    ),
            )
            .register(
                ObjectMeta::new("Post")
                    .description("A blog post")
                    .field(Field::new("id", "ID!"))
                    .field(Field::new("title", "String!"))
                    .field(
                        Field::new("comments_count", "Int!")
                            .camelize(false)
                            .deprecated("Use \"comments\"."),
                    ),
            )
            .register(
                ObjectMeta::new("Comment")
                    .description("A blog comment")
                    .interfaces(&["Node"])
                    .field(Field::new("id", "ID!")),
            )
            .register(InterfaceMeta::new("Node").field(Field::new("id", "ID!")))
            .register(ObjectMeta::new("Image").field(Field::new("width", "Int!")))
            .register(ObjectMeta::new("Audio").field(Field::new("duration", "Int!")))
            .register(UnionMeta::new("Media", &["Image", "Audio"]).description("Media objects"))
            .register(ObjectMeta::new("NoFields"))
            .register(InputObjectMeta::new("NoArguments"))
            .register(
                EnumMeta::new("Choice")
                    .value(EnumValue::new("FOO"))
                    .value(EnumValue::new("BAR"))
                    .value(EnumValue::new("BAZ").deprecated(
                        "Use \"BAR\" instead.\n\nIt's the replacement for this value.\n",
                    ))
                    .value(EnumValue::new("WOZ").deprecated(None)),
            )
            .register(
                InputObjectMeta::new("Varied")
                    .argument(Argument::new("id", "ID"))
                    .argument(Argument::new("int", "Int"))
                    .argument(
                        Argument::new("some_enum", "Choice").default_value(InputValue::enum_value("FOO")),
                    ),
            )
            .orphan_types(&["Comment", "Choice"])
            .build()
            .unwrap()
    }

    #[test]
    fn prints_sorted_definitions() {
        let expected = r#"type Audio {
  duration: Int!
}

enum Choice {
  BAR
  BAZ @deprecated(reason: "Use \"BAR\" instead.\n\nIt's the replacement for this value.\n")
  FOO
  WOZ @deprecated
}

"""
A blog comment
"""
type Comment implements Node {
  id: ID!
}

type Image {
  width: Int!
}

"""
Media objects
"""
union Media = Audio | Image

input NoArguments

type NoFields

interface Node {
  id: ID!
}

"""
A blog post
"""
type Post {
  comments_count: Int! @deprecated(reason: "Use \"comments\".")
  id: ID!
  title: String!
}

"""
The query root of this schema
"""
type Query {
  exampleMedia: Media
  noFieldsType(noArgumentsInput: NoArguments!): NoFields
  post(
    deprecatedArg: String @deprecated(reason: "Use something else")

    """
    Post ID
    """
    id: ID!
    varied: Varied = {id: "123", int: 234, someEnum: FOO}
  ): Post
}

input Varied {
  id: ID
  int: Int
  someEnum: Choice = FOO
}
"#;
        let schema = schema();
        assert_eq!(print_schema(&schema.unfiltered_warden()).unwrap(), expected);
    }

    #[test]
    fn prints_schema_block_for_custom_roots() {
        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("OddlyNamedQuery").field(Field::new("int", "Int!")))
            .build()
            .unwrap();
        assert_eq!(
            print_schema(&schema.unfiltered_warden()).unwrap(),
            "schema {\n  query: OddlyNamedQuery\n}\n\ntype OddlyNamedQuery {\n  int: Int!\n}\n",
        );
    }

    #[test]
    fn prints_without_directives() {
        let schema = SchemaBuilder::new()
            .query(ObjectMeta::new("Query").field(Field::new("foobar", "Int!")))
            .build()
            .unwrap();
        assert_eq!(
            schema.to_definition(&Context::new()).unwrap(),
            "type Query {\n  foobar: Int!\n}\n",
        );
    }

    #[test]
    fn prints_custom_directives() {
        let some = DirectiveType::new("someDirective", &[DirectiveLocation::Object]);
        let int_dir = DirectiveType::new("intDir", &[DirectiveLocation::InputFieldDefinition])
            .argument(Argument::new("a", "Int!"));
        let tag = DirectiveType::new("tag", &[DirectiveLocation::Object, DirectiveLocation::Enum])
            .repeatable()
            .argument(Argument::new("name", "String"));
        let (some, int_dir) = (std::sync::Arc::new(some), std::sync::Arc::new(int_dir));
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .directive(DirectiveApplication::new(&some))
                    .field(Field::new("e", "Int").argument(Argument::new("i", "I"))),
            )
            .register(InputObjectMeta::new("I").argument(
                Argument::new("i1", "Int").directive(DirectiveApplication::new(&int_dir).argument("a", 1)),
            ))
            .directive(some)
            .directive(int_dir)
            .directive(tag)
            .build()
            .unwrap();
        let expected = "directive @intDir(a: Int!) on INPUT_FIELD_DEFINITION

directive @someDirective on OBJECT

directive @tag(name: String) repeatable on ENUM | OBJECT

input I {
  i1: Int @intDir(a: 1)
}

type Query @someDirective {
  e(i: I): Int
}
";
        assert_eq!(print_schema(&schema.unfiltered_warden()).unwrap(), expected);
    }

    #[test]
    fn prints_internal_defaults_through_result_coercion() {
        let some_type = ScalarMeta::new("SomeType")
            .coerce_input(|v, _| Ok(FieldValue::from(v.to_value())))
            .coerce_result(|v, _| {
                v.get("value")
                    .and_then(|v| v.to_plain())
                    .ok_or_else(|| "not a backing object".to_owned())
            });
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query").field(
                    Field::new("example", "SomeType").argument(
                        Argument::new("input", "SomeType").default_internal(FieldValue::map([(
                            "value",
                            Value::scalar("Howdy"),
                        )])),
                    ),
                ),
            )
            .register(some_type)
            .build()
            .unwrap();
        let warden = schema.unfiltered_warden();
        let query = warden.get_type("Query").unwrap().unwrap();
        assert_eq!(
            print_type(&warden, query).unwrap(),
            "type Query {\n  example(input: SomeType = \"Howdy\"): SomeType\n}",
        );
    }

    #[test]
    fn hides_invisible_members() {
        let schema = SchemaBuilder::new()
            .query(
                ObjectMeta::new("Query")
                    .field(Field::new("public", "Int"))
                    .field(Field::new("secret", "Secret").visible(|ctx: &Context| ctx.flag("admin"))),
            )
            .register(ObjectMeta::new("Secret").field(Field::new("a", "Int")))
            .build()
            .unwrap();
        assert_eq!(
            schema.to_definition(&Context::new()).unwrap(),
            "type Query {\n  public: Int\n}\n",
        );
        assert!(
            schema
                .to_definition(&Context::new().with_value("admin", true))
                .unwrap()
                .contains("type Secret {"),
        );
    }

    #[test]
    fn prints_introspection_types() {
        let printed = print_introspection_schema(&schema()).unwrap();
        assert!(printed.starts_with("schema {\n  query: Root\n}\n\n\"\"\"\nMarks an element"));
        assert!(printed.contains("\ndirective @oneOf on INPUT_OBJECT\n"));
        assert!(printed.contains("\ntype __Schema {\n"));
        assert!(printed.contains("\nenum __TypeKind {\n"));
        assert!(!printed.contains("type Query"));
    }

    #[test]
    fn wraps_long_description_lines() {
        let line = ["word"; 40].join(" ");
        let wrapped = break_line(&line, 120);
        assert_eq!(wrapped.len(), 3);
        assert!(wrapped.iter().all(|l| l.len() <= 80));
        assert_eq!(break_line("short", 120), vec!["short".to_owned()]);
    }
}
