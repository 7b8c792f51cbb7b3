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

pub struct NoFragmentCycles<'a> {
    references: References<'a>,
    fragments: Vec<(&'a str, Pos)>,
}

pub fn factory<'a>() -> NoFragmentCycles<'a> {
    NoFragmentCycles {
        references: References::default(),
        fragments: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        for (name, pos) in &self.fragments {
            let me = Scope::Fragment(*name);
            let loops = self
                .references
                .spreads_of(me)
                .iter()
                .any(|next| self.references.reachable(Scope::Fragment(*next)).contains(&me));
            if loops {
                ctx.report_error(&error_message(name), &[(*pos).into()]);
            }
        }
    }

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {
        self.references.enter_operation();
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
        self.fragments.push((&f.name, f.position));
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
    format!("Fragment {frag_name} contains an infinite loop")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn single_reference_is_valid() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn spreading_twice_is_not_circular() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn spreading_twice_indirectly_is_not_circular() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragC }
          fragment fragB on Dog { ...fragC }
          fragment fragC on Dog { name }
        "#,
        );
    }

    #[test]
    fn no_spreading_itself_directly() {
        expect_fails_rule(
            factory,
            "fragment fragA on Dog { ...fragA }",
            &[RuleError::new(&error_message("fragA"), &[at(1, 1)])],
        );
    }

    #[test]
    fn no_spreading_itself_within_inline_fragment() {
        expect_fails_with_messages(
            factory,
            r#"
          fragment fragA on Pet {
            ... on Dog {
              ...fragA
            }
          }
        "#,
            &["Fragment fragA contains an infinite loop"],
        );
    }

    #[test]
    fn no_spreading_itself_indirectly() {
        expect_fails_with_messages(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { ...fragC }
          fragment fragC on Dog { ...fragA }
          fragment fragD on Dog { ...fragA }
        "#,
            &[
                "Fragment fragA contains an infinite loop",
                "Fragment fragB contains an infinite loop",
                "Fragment fragC contains an infinite loop",
            ],
        );
    }
}
