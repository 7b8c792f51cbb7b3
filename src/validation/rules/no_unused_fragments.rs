use std::collections::HashSet;

use graphql_parser::{
    Pos,
    query::{FragmentDefinition, FragmentSpread},
};

use super::{References, Scope};
use crate::{
    executor::Operation,
    parser::Document,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUnusedFragments<'a> {
    references: References<'a>,
    operations: Vec<Scope<'a>>,
    defined: Vec<(&'a str, Pos)>,
}

pub fn factory<'a>() -> NoUnusedFragments<'a> {
    NoUnusedFragments {
        references: References::default(),
        operations: Vec::new(),
        defined: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        let used = self
            .operations
            .iter()
            .flat_map(|op| self.references.reachable(*op))
            .collect::<HashSet<_>>();
        for (name, pos) in &self.defined {
            if !used.contains(&Scope::Fragment(*name)) {
                ctx.report_error(&error_message(name), &[(*pos).into()]);
            }
        }
    }

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {
        let scope = self.references.enter_operation();
        self.operations.push(scope);
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
        self.defined.push((&f.name, f.position));
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.exit();
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        self.references.add_spread(spread);
    }
}

fn error_message(frag_name: &str) -> String {
    format!("Fragment {frag_name} was defined, but not used")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn all_fragment_names_are_used() {
        expect_passes_rule(
            factory,
            r#"
          {
            human(id: 4) {
              ...HumanFields1
              ... on Human {
                ...HumanFields2
              }
            }
          }
          fragment HumanFields1 on Human {
            name
            ...HumanFields3
          }
          fragment HumanFields2 on Human {
            name
          }
          fragment HumanFields3 on Human {
            name
          }
        "#,
        );
    }

    #[test]
    fn used_by_several_operations() {
        expect_passes_rule(
            factory,
            r#"
          query Foo { human { ...HumanFields1 } }
          query Bar { human { ...HumanFields2 } }
          fragment HumanFields1 on Human { name }
          fragment HumanFields2 on Human { name }
        "#,
        );
    }

    #[test]
    fn unused_fragment() {
        expect_fails_rule(
            factory,
            "{ dog { name } }\nfragment Unused on Dog { name }",
            &[RuleError::new(&error_message("Unused"), &[at(2, 1)])],
        );
    }

    #[test]
    fn unused_cycle_of_fragments() {
        expect_fails_with_messages(
            factory,
            r#"
          { human { ...HumanFields1 } }
          fragment HumanFields1 on Human { name }
          fragment Unused1 on Human { ...Unused2 }
          fragment Unused2 on Human { ...Unused1 }
        "#,
            &[
                "Fragment Unused1 was defined, but not used",
                "Fragment Unused2 was defined, but not used",
            ],
        );
    }
}
