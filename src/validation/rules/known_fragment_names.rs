use graphql_parser::query::FragmentSpread;

use crate::validation::{ValidatorContext, Visitor};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        let name = &spread.fragment_name;
        if !ctx.is_known_fragment(name) {
            ctx.report_error(&error_message(name), &[spread.position.into()]);
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!("Fragment {frag_name} was used, but not defined")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn known() {
        expect_passes_rule(
            factory,
            r#"
          {
            human(id: "4") {
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
    fn unknown() {
        expect_fails_rule(
            factory,
            "{ human { ...UnknownFragment1 ... on Human { ...UnknownFragment2 } } }",
            &[
                RuleError::new(&error_message("UnknownFragment1"), &[at(1, 14)]),
                RuleError::new(&error_message("UnknownFragment2"), &[at(1, 49)]),
            ],
        );
    }
}
