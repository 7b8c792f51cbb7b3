use graphql_parser::query::Field;

use crate::{
    introspection,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };
        match introspection::field_of(ctx.warden, parent_type, &field.name) {
            Ok(Some(_)) => {}
            Ok(None) => ctx.report_error(
                &error_message(&field.name, parent_type.name()),
                &[field.position.into()],
            ),
            Err(e) => ctx.report_duplicate(e, &[field.position.into()]),
        }
    }
}

fn error_message(field: &str, type_name: &str) -> String {
    format!("Field '{field}' doesn't exist on type '{type_name}'")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn selection_on_object() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectFieldSelection on Dog {
            __typename
            name
          }
        "#,
        );
    }

    #[test]
    fn aliased_selection_on_interface() {
        expect_passes_rule(
            factory,
            r#"
          fragment aliasedInterfaceFieldSelection on Pet {
            otherName : name
          }
        "#,
        );
    }

    #[test]
    fn typename_on_union() {
        expect_passes_rule(
            factory,
            r#"
          fragment objectFieldSelection on CatOrDog {
            __typename
            ... on Dog { barkVolume }
          }
        "#,
        );
    }

    #[test]
    fn camelized_names_are_the_graphql_names() {
        expect_passes_rule(factory, "{ dog { barkVolume doesKnowCommand } }");
        expect_fails_with_messages(
            factory,
            "{ dog { bark_volume } }",
            &["Field 'bark_volume' doesn't exist on type 'Dog'"],
        );
    }

    #[test]
    fn unknown_field_on_object() {
        expect_fails_rule(
            factory,
            "{ dog { meowVolume } }",
            &[RuleError::new(&error_message("meowVolume", "Dog"), &[at(1, 9)])],
        );
    }

    #[test]
    fn unknown_fields_in_nested_selections() {
        expect_fails_with_messages(
            factory,
            r#"
          fragment deepFieldNotDefined on Dog {
            unknownField {
              deeperUnknownField
            }
          }
        "#,
            &["Field 'unknownField' doesn't exist on type 'Dog'"],
        );
    }

    #[test]
    fn field_of_a_member_on_union() {
        expect_fails_with_messages(
            factory,
            "fragment f on CatOrDog { name }",
            &["Field 'name' doesn't exist on type 'CatOrDog'"],
        );
    }

    #[test]
    fn schema_field_outside_query_root() {
        expect_fails_with_messages(
            factory,
            "{ dog { __schema { types { name } } } }",
            &["Field '__schema' doesn't exist on type 'Dog'"],
        );
    }
}
