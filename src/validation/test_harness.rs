use std::sync::LazyLock;

use super::{MultiVisitorNil, RuleError, ValidatorContext, Visitor, visit};
use crate::{
    config::SchemaConfig,
    parser::{SourcePosition, parse_query},
    schema::{
        builder::SchemaBuilder,
        directives::{DirectiveLocation, DirectiveType},
        meta::{
            Argument, EnumMeta, Field, InputObjectMeta, InterfaceMeta, ObjectMeta, UnionMeta,
        },
        model::Schema,
    },
};

fn build(config: SchemaConfig) -> Schema {
    SchemaBuilder::new()
        .query(
            ObjectMeta::new("Query")
                .field(Field::new("dog", "Dog"))
                .field(Field::new("cat", "Cat"))
                .field(Field::new("pet", "Pet"))
                .field(Field::new("cat_or_dog", "CatOrDog"))
                .field(Field::new("human", "Human").argument(Argument::new("id", "ID")))
                .field(Field::new("complicated_args", "ComplicatedArgs")),
        )
        .mutation(
            ObjectMeta::new("Mutation").field(
                Field::new("test_input", "Boolean").argument(Argument::new("input", "ComplexInput")),
            ),
        )
        .register(InterfaceMeta::new("Pet").field(Field::new("name", "String")))
        .register(
            ObjectMeta::new("Dog")
                .interfaces(&["Pet"])
                .field(Field::new("nickname", "String"))
                .field(Field::new("bark_volume", "Int"))
                .field(Field::new("barks", "Boolean"))
                .field(
                    Field::new("does_know_command", "Boolean")
                        .argument(Argument::new("dog_command", "DogCommand")),
                )
                .field(
                    Field::new("is_housetrained", "Boolean")
                        .argument(Argument::new("at_other_homes", "Boolean").default_value(true)),
                )
                .field(Field::new("owner", "Human")),
        )
        .register(
            ObjectMeta::new("Cat")
                .interfaces(&["Pet"])
                .field(Field::new("meows", "Boolean"))
                .field(Field::new("fur_color", "FurColor")),
        )
        .register(UnionMeta::new("CatOrDog", &["Cat", "Dog"]))
        .register(
            ObjectMeta::new("Human")
                .field(Field::new("name", "String").argument(Argument::new("surname", "Boolean")))
                .field(Field::new("pets", "[Pet]"))
                .field(Field::new("relatives", "[Human]")),
        )
        .register(EnumMeta::new("DogCommand").values(&["SIT", "HEEL", "DOWN"]))
        .register(EnumMeta::new("FurColor").values(&["BROWN", "BLACK", "TAN", "SPOTTED"]))
        .register(
            InputObjectMeta::new("ComplexInput")
                .argument(Argument::new("required_field", "Boolean!"))
                .argument(Argument::new("int_field", "Int"))
                .argument(Argument::new("string_field", "String"))
                .argument(Argument::new("boolean_field", "Boolean"))
                .argument(Argument::new("string_list_field", "[String]")),
        )
        .register(
            InputObjectMeta::new("OneOfInput")
                .argument(Argument::new("a", "Int"))
                .argument(Argument::new("b", "String"))
                .one_of(),
        )
        .register(
            ObjectMeta::new("ComplicatedArgs")
                .field(Field::new("int_arg_field", "String").argument(Argument::new("int_arg", "Int")))
                .field(
                    Field::new("non_null_int_arg_field", "String")
                        .argument(Argument::new("non_null_int_arg", "Int!")),
                )
                .field(
                    Field::new("string_arg_field", "String")
                        .argument(Argument::new("string_arg", "String")),
                )
                .field(
                    Field::new("boolean_arg_field", "String")
                        .argument(Argument::new("boolean_arg", "Boolean")),
                )
                .field(
                    Field::new("enum_arg_field", "String")
                        .argument(Argument::new("enum_arg", "FurColor")),
                )
                .field(
                    Field::new("float_arg_field", "String")
                        .argument(Argument::new("float_arg", "Float")),
                )
                .field(Field::new("id_arg_field", "String").argument(Argument::new("id_arg", "ID")))
                .field(
                    Field::new("string_list_arg_field", "String")
                        .argument(Argument::new("string_list_arg", "[String]")),
                )
                .field(
                    Field::new("complex_arg_field", "String")
                        .argument(Argument::new("complex_arg", "ComplexInput")),
                )
                .field(
                    Field::new("one_of_arg_field", "String")
                        .argument(Argument::new("one_of_arg", "OneOfInput")),
                )
                .field(
                    Field::new("multiple_reqs", "String")
                        .argument(Argument::new("req1", "Int!"))
                        .argument(Argument::new("req2", "Int!")),
                )
                .field(
                    Field::new("multiple_opts", "String")
                        .argument(Argument::new("opt1", "Int").default_value(0))
                        .argument(Argument::new("opt2", "Int").default_value(0)),
                ),
        )
        .directive(
            DirectiveType::new("on_query", &[DirectiveLocation::Query])
                .argument(Argument::new("tag", "String")),
        )
        .directive(DirectiveType::new("on_field", &[DirectiveLocation::Field]))
        .config(config)
        .build()
        .unwrap_or_else(|e| panic!("test schema doesn't build: {e}"))
}

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| build(SchemaConfig::default()));

/// Schema every rule is tested against.
pub(crate) fn schema() -> &'static Schema {
    &SCHEMA
}

/// Same schema with custom analyzer settings.
pub(crate) fn schema_with(config: SchemaConfig) -> Schema {
    build(config)
}

fn validate<'a, V, F>(schema: &Schema, query: &str, factory: F) -> Vec<RuleError>
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let doc = parse_query(query).unwrap_or_else(|e| panic!("invalid test query: {e}"));
    // The document and warden have to outlive the visitor's borrows.
    let doc: &'a _ = Box::leak(Box::new(doc));
    let warden: &'a _ = Box::leak(Box::new(schema.unfiltered_warden()));

    let mut ctx = ValidatorContext::new(warden, doc);
    let mut mv = MultiVisitorNil.with(factory());
    visit(&mut mv, &mut ctx, doc);
    ctx.into_errors()
}

pub(crate) fn expect_passes_rule<'a, V, F>(factory: F, query: &str)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    expect_passes_rule_with_schema(schema(), factory, query);
}

pub(crate) fn expect_passes_rule_with_schema<'a, V, F>(schema: &Schema, factory: F, query: &str)
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let errs = validate(schema, query, factory);
    if !errs.is_empty() {
        print_errors(&errs);
        panic!("Expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule<'a, V, F>(factory: F, query: &str, expected: &[RuleError])
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    expect_fails_rule_with_schema(schema(), factory, query, expected);
}

pub(crate) fn expect_fails_rule_with_schema<'a, V, F>(
    schema: &Schema,
    factory: F,
    query: &str,
    expected: &[RuleError],
) where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let errs = validate(schema, query, factory);
    if errs.is_empty() {
        panic!("Expected rule to fail, but no errors were found");
    }
    let mut expected = expected.to_vec();
    expected.sort();
    if errs != expected {
        println!("==> Expected errors:");
        print_errors(&expected);
        println!("\n==> Actual errors:");
        print_errors(&errs);
        panic!("Unexpected set of errors found");
    }
}

/// Like [`expect_fails_rule`], comparing messages only.
pub(crate) fn expect_fails_with_messages<'a, V, F>(factory: F, query: &str, expected: &[&str])
where
    V: Visitor<'a> + 'a,
    F: Fn() -> V,
{
    let errs = validate(schema(), query, factory);
    let mut messages = errs.iter().map(RuleError::message).collect::<Vec<_>>();
    let mut expected = expected.to_vec();
    messages.sort_unstable();
    expected.sort_unstable();
    if messages != expected {
        println!("==> Expected messages: {expected:#?}");
        println!("==> Actual errors:");
        print_errors(&errs);
        panic!("Unexpected set of errors found");
    }
}

fn print_errors(errs: &[RuleError]) {
    for err in errs {
        for p in err.locations() {
            print!("[{:>3},{:>3}] ", p.line, p.column);
        }
        println!("{}", err.message());
    }
}

/// Shorthand for a 1-based source position.
pub(crate) fn at(line: usize, column: usize) -> SourcePosition {
    SourcePosition::new(line, column)
}
