use graphql_parser::{
    Pos,
    query::{FragmentDefinition, InlineFragment, TypeCondition},
};

use crate::{
    schema::meta::TypeKind,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        let TypeCondition::On(name) = &f.type_condition;
        check(ctx, name, f.position);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a InlineFragment<'static, String>,
    ) {
        if let Some(TypeCondition::On(name)) = &f.type_condition {
            check(ctx, name, f.position);
        }
    }
}

fn check(ctx: &mut ValidatorContext<'_>, type_name: &str, pos: Pos) {
    let message = match ctx.type_named(type_name).map(|t| t.kind()) {
        None => format!("No such type {type_name}, so it can't be a fragment condition"),
        Some(TypeKind::Object | TypeKind::Interface | TypeKind::Union) => return,
        Some(_) => format!("Invalid fragment on type {type_name} (must be Union, Interface or Object)"),
    };
    ctx.report_error(&message, &[pos.into()]);
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn on_object() {
        expect_passes_rule(factory, "fragment validFragment on Dog { barks }");
    }

    #[test]
    fn on_interface() {
        expect_passes_rule(factory, "fragment validFragment on Pet { name }");
    }

    #[test]
    fn on_union() {
        expect_passes_rule(
            factory,
            "fragment validFragment on CatOrDog { __typename }",
        );
    }

    #[test]
    fn inline_without_type_condition() {
        expect_passes_rule(factory, "fragment validFragment on Pet { ... { name } }");
    }

    #[test]
    fn not_on_scalar() {
        expect_fails_rule(
            factory,
            "fragment scalarFragment on Boolean { bad }",
            &[RuleError::new(
                "Invalid fragment on type Boolean (must be Union, Interface or Object)",
                &[at(1, 1)],
            )],
        );
    }

    #[test]
    fn not_on_enum_or_input_object() {
        expect_fails_with_messages(
            factory,
            r#"
          fragment enumFragment on FurColor { bad }
          fragment inputFragment on ComplexInput { stringField }
        "#,
            &[
                "Invalid fragment on type ComplexInput (must be Union, Interface or Object)",
                "Invalid fragment on type FurColor (must be Union, Interface or Object)",
            ],
        );
    }

    #[test]
    fn unknown_type_condition() {
        expect_fails_with_messages(
            factory,
            "{ dog { ... on Lizard { name } } }",
            &["No such type Lizard, so it can't be a fragment condition"],
        );
    }
}
