use std::collections::HashSet;

use graphql_parser::query::{Definition, FragmentDefinition};

use crate::{
    executor::Operation,
    parser::Document,
    validation::{ValidatorContext, Visitor},
};

/// Operation, fragment and variable names must be unique, and operations
/// must be named when there are several.
pub struct UniqueNames<'a> {
    operations: HashSet<&'a str>,
    fragments: HashSet<&'a str>,
    operation_count: usize,
}

pub fn factory<'a>() -> UniqueNames<'a> {
    UniqueNames {
        operations: HashSet::new(),
        fragments: HashSet::new(),
        operation_count: 0,
    }
}

impl<'a> Visitor<'a> for UniqueNames<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document) {
        self.operation_count = doc
            .definitions
            .iter()
            .filter(|d| matches!(d, Definition::Operation(_)))
            .count();
    }

    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        match op.name {
            Some(name) => {
                if !self.operations.insert(name) {
                    ctx.report_error(
                        &format!("Operation name \"{name}\" must be unique"),
                        &[op.position.into()],
                    );
                }
            }
            None if self.operation_count > 1 => ctx.report_error(
                "Operation name is required when multiple operations are present",
                &[op.position.into()],
            ),
            None => {}
        }

        let mut variables = HashSet::new();
        for var in op.variable_definitions {
            if !variables.insert(var.name.as_str()) {
                ctx.report_error(
                    &format!("There can only be one variable named \"{}\"", var.name),
                    &[var.position.into()],
                );
            }
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        if !self.fragments.insert(&f.name) {
            ctx.report_error(
                &format!("Fragment name \"{}\" must be unique", f.name),
                &[f.position.into()],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn one_anonymous_operation() {
        expect_passes_rule(factory, "{ dog { name } }");
    }

    #[test]
    fn multiple_named_operations() {
        expect_passes_rule(
            factory,
            r#"
          query Foo { dog { name } }
          query Bar { dog { name } }
          fragment A on Dog { name }
          fragment B on Dog { name }
        "#,
        );
    }

    #[test]
    fn same_name_for_operation_and_fragment() {
        expect_passes_rule(
            factory,
            "query Foo { dog { ...Foo } } fragment Foo on Dog { name }",
        );
    }

    #[test]
    fn duplicate_operation_names() {
        expect_fails_rule(
            factory,
            "query Foo { dog { name } }\nmutation Foo { testInput }",
            &[RuleError::new("Operation name \"Foo\" must be unique", &[at(2, 1)])],
        );
    }

    #[test]
    fn anonymous_among_several_operations() {
        expect_fails_with_messages(
            factory,
            "{ dog { name } } query Foo { dog { name } }",
            &["Operation name is required when multiple operations are present"],
        );
    }

    #[test]
    fn duplicate_fragment_names() {
        expect_fails_with_messages(
            factory,
            r#"
          { dog { ...A } }
          fragment A on Dog { name }
          fragment A on Dog { barks }
        "#,
            &["Fragment name \"A\" must be unique"],
        );
    }

    #[test]
    fn duplicate_variable_names() {
        expect_fails_rule(
            factory,
            "query A($x: Int, $x: Int) { dog { name } }",
            &[RuleError::new("There can only be one variable named \"x\"", &[at(1, 18)])],
        );
    }
}
