use std::collections::HashSet;

use graphql_parser::query::{Directive, Field, FragmentDefinition, FragmentSpread};

use super::{References, Scope, operation_label};
use crate::{
    executor::Operation,
    parser::Document,
    schema::directives::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUndefinedVariables<'a> {
    references: References<'a>,
    operations: Vec<(Scope<'a>, String, HashSet<&'a str>)>,
}

pub fn factory<'a>() -> NoUndefinedVariables<'a> {
    NoUndefinedVariables {
        references: References::default(),
        operations: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        for (scope, label, defined) in &self.operations {
            for (name, pos) in self.references.used_variables(*scope) {
                if !defined.contains(name) {
                    ctx.report_error(&error_message(name, label), &[pos.into()]);
                }
            }
        }
    }

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, op: Operation<'a>) {
        let scope = self.references.enter_operation();
        let defined = op.variable_definitions.iter().map(|v| v.name.as_str()).collect();
        self.operations.push((scope, operation_label(&op), defined));
    }

    fn exit_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {
        self.references.exit();
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.enter_fragment(f);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.exit();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        self.references.add_field(field);
    }

    fn enter_directive(
        &mut self,
        _: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        self.references.add_directive(directive);
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        self.references.add_spread(spread);
    }
}

fn error_message(var_name: &str, op_label: &str) -> String {
    format!("Variable ${var_name} is used by {op_label} but not declared")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn all_variables_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: String, $c: String) {
            field(a: $a, b: $b, c: $c)
          }
        "#,
        );
    }

    #[test]
    fn all_variables_deeply_defined_in_inline_fragments() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: String, $c: String) {
            ... on Query {
              field(a: $a) {
                field(b: $b) {
                  ... on Query {
                    field(c: $c)
                  }
                }
              }
            }
          }
        "#,
        );
    }

    #[test]
    fn all_variables_in_fragments_deeply_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String, $b: String, $c: String) {
            ...FragA
          }
          fragment FragA on Query {
            field(a: $a) {
              ...FragB
            }
          }
          fragment FragB on Query {
            field(b: $b) {
              ...FragC
            }
          }
          fragment FragC on Query {
            field(c: $c)
          }
        "#,
        );
    }

    #[test]
    fn variable_within_recursive_fragment_defined() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($a: String) {
            ...FragA
          }
          fragment FragA on Query {
            field(a: $a) {
              ...FragA
            }
          }
        "#,
        );
    }

    #[test]
    fn variable_in_directive_and_nested_literal() {
        expect_passes_rule(
            factory,
            r#"
          query Foo($cond: Boolean!, $b: String) {
            dog @include(if: $cond) { name }
            field(input: { list: [$b] })
          }
        "#,
        );
    }

    #[test]
    fn variable_not_defined() {
        expect_fails_rule(
            factory,
            "query Foo($a: String) {\n  field(a: $a, d: $d)\n}",
            &[RuleError::new(&error_message("d", "Foo"), &[at(2, 3)])],
        );
    }

    #[test]
    fn variable_not_defined_by_anonymous_query() {
        expect_fails_with_messages(
            factory,
            "{ field(a: $a) }",
            &["Variable $a is used by anonymous query but not declared"],
        );
    }

    #[test]
    fn variables_in_fragment_not_defined_by_each_operation() {
        expect_fails_with_messages(
            factory,
            r#"
          query Foo($a: String) {
            ...FragAB
          }
          mutation Bar($b: String) {
            ...FragAB
          }
          fragment FragAB on Query {
            field(a: $a, b: $b)
          }
        "#,
            &[
                "Variable $a is used by Bar but not declared",
                "Variable $b is used by Foo but not declared",
            ],
        );
    }
}
