use graphql_parser::query::{Field, Selection};

use crate::{
    schema::meta::MetaType,
    validation::{ValidatorContext, Visitor},
};

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        let Some(field_type) = ctx.current_type() else {
            return;
        };
        let has_selections = !field.selection_set.items.is_empty();
        let message = match (&**field_type, has_selections) {
            (MetaType::Scalar(_), true) => no_allowed_error_message("scalars", field, field_type.name()),
            (MetaType::Enum(_), true) => no_allowed_error_message("enums", field, field_type.name()),
            (MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_), false) => {
                required_error_message(&field.name, field_type.name())
            }
            _ => return,
        };
        ctx.report_error(&message, &[field.position.into()]);
    }
}

fn no_allowed_error_message(kind: &str, field: &Field<'static, String>, type_name: &str) -> String {
    let selections = field
        .selection_set
        .items
        .iter()
        .filter_map(|s| match s {
            Selection::Field(f) => Some(format!("{:?}", f.name)),
            Selection::FragmentSpread(s) => Some(format!("{:?}", s.fragment_name)),
            Selection::InlineFragment(_) => None,
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Selections can't be made on {kind} (field '{}' returns {type_name} but has selections \
         [{selections}])",
        field.name,
    )
}

fn required_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        "Field must have selections (field '{field_name}' returns {type_name} but has no \
         selections. Did you mean '{field_name} {{ ... }}'?)",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, required_error_message};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn valid_scalar_selection() {
        expect_passes_rule(factory, "fragment scalarSelection on Dog { barks }");
    }

    #[test]
    fn object_type_missing_selection() {
        expect_fails_rule(
            factory,
            "query directQueryOnObjectWithoutSubFields { human }",
            &[RuleError::new(&required_error_message("human", "Human"), &[at(1, 45)])],
        );
    }

    #[test]
    fn interface_type_missing_selection() {
        expect_fails_with_messages(
            factory,
            "{ human { pets } }",
            &["Field must have selections (field 'pets' returns Pet but has no selections. \
               Did you mean 'pets { ... }'?)"],
        );
    }

    #[test]
    fn valid_scalar_selection_with_args() {
        expect_passes_rule(
            factory,
            "fragment scalarSelectionWithArgs on Dog { doesKnowCommand(dogCommand: SIT) }",
        );
    }

    #[test]
    fn scalar_selection_not_allowed_on_boolean() {
        expect_fails_with_messages(
            factory,
            "fragment scalarSelectionsNotAllowedOnBoolean on Dog { barks { sinceWhen } }",
            &["Selections can't be made on scalars (field 'barks' returns Boolean but has \
               selections [\"sinceWhen\"])"],
        );
    }

    #[test]
    fn scalar_selection_not_allowed_on_enum() {
        expect_fails_with_messages(
            factory,
            "fragment scalarSelectionsNotAllowedOnEnum on Cat { furColor { inHexdec r } }",
            &["Selections can't be made on enums (field 'furColor' returns FurColor but has \
               selections [\"inHexdec\", \"r\"])"],
        );
    }
}
