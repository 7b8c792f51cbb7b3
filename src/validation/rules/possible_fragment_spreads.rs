use std::sync::Arc;

use graphql_parser::query::{FragmentSpread, InlineFragment, TypeCondition};

use crate::{
    schema::{meta::MetaType, visibility::Warden},
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads;

pub fn factory() -> PossibleFragmentSpreads {
    PossibleFragmentSpreads
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &'a InlineFragment<'static, String>,
    ) {
        let (Some(parent), Some(TypeCondition::On(_)), Some(frag_type)) =
            (ctx.parent_type(), &frag.type_condition, ctx.current_type())
        else {
            return;
        };
        if !overlap(ctx.warden, parent, frag_type) {
            let message = format!(
                "Fragment on {} can't be spread inside {}",
                frag_type.name(),
                parent.name(),
            );
            ctx.report_error(&message, &[frag.position.into()]);
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        let Some(frag) = ctx.fragment(&spread.fragment_name) else {
            return;
        };
        let TypeCondition::On(on) = &frag.type_condition;
        let Some(frag_type) = ctx.type_named(on) else {
            return;
        };
        if !overlap(ctx.warden, parent, frag_type) {
            let message = format!(
                "Fragment {} on {} can't be spread inside {}",
                spread.fragment_name,
                frag_type.name(),
                parent.name(),
            );
            ctx.report_error(&message, &[spread.position.into()]);
        }
    }
}

/// Whether some object type may satisfy both types. Non-composite types
/// are left to other rules.
fn overlap(warden: &Warden, a: &Arc<MetaType>, b: &Arc<MetaType>) -> bool {
    if !is_composite(a) || !is_composite(b) {
        return true;
    }
    let in_b = warden.possible_types(b);
    warden
        .possible_types(a)
        .iter()
        .any(|t| in_b.iter().any(|u| t.name() == u.name()))
}

fn is_composite(t: &MetaType) -> bool {
    matches!(t, MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_))
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn same_object() {
        expect_passes_rule(factory, "fragment objectWithinObject on Dog { ...dogFragment } fragment dogFragment on Dog { barkVolume }");
    }

    #[test]
    fn object_into_implemented_interface() {
        expect_passes_rule(factory, "fragment objectWithinInterface on Pet { ... on Dog { barkVolume } }");
    }

    #[test]
    fn union_into_contained_object() {
        expect_passes_rule(
            factory,
            "fragment unionWithinObject on Dog { ...catOrDogFragment } \
             fragment catOrDogFragment on CatOrDog { __typename }",
        );
    }

    #[test]
    fn interface_into_overlapping_union() {
        expect_passes_rule(factory, "fragment interfaceWithinUnion on CatOrDog { ... on Pet { name } }");
    }

    #[test]
    fn different_object_into_object() {
        expect_fails_rule(
            factory,
            "fragment f on Cat { ... on Dog { barkVolume } }",
            &[RuleError::new(
                "Fragment on Dog can't be spread inside Cat",
                &[at(1, 25)],
            )],
        );
    }

    #[test]
    fn named_fragment_into_unrelated_object() {
        expect_fails_with_messages(
            factory,
            "fragment invalidObjectWithinObject on Cat { ...dogFragment } \
             fragment dogFragment on Dog { barkVolume }",
            &["Fragment dogFragment on Dog can't be spread inside Cat"],
        );
    }

    #[test]
    fn unrelated_object_into_union() {
        expect_fails_with_messages(
            factory,
            "fragment f on CatOrDog { ... on Human { name } }",
            &["Fragment on Human can't be spread inside CatOrDog"],
        );
    }
}
