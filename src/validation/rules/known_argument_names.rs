use graphql_parser::query::{Directive, Field};

use super::{directive_arguments, directive_owner, field_arguments, field_owner};
use crate::{
    schema::directives::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownArgumentNames;

pub fn factory() -> KnownArgumentNames {
    KnownArgumentNames
}

impl<'a> Visitor<'a> for KnownArgumentNames {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        let Some(known) = field_arguments(ctx) else {
            return;
        };
        let owner = field_owner(field);
        for (name, _) in &field.arguments {
            if !known.iter().any(|a| a.name == name.as_str()) {
                ctx.report_error(&error_message(&owner, name), &[field.position.into()]);
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        let Some(known) = directive_arguments(ctx, directive) else {
            return;
        };
        let owner = directive_owner(directive);
        for (name, _) in &directive.arguments {
            if !known.iter().any(|a| a.name == name.as_str()) {
                ctx.report_error(&error_message(&owner, name), &[directive.position.into()]);
            }
        }
    }
}

fn error_message(owner: &str, arg_name: &str) -> String {
    format!("{owner} doesn't accept argument '{arg_name}'")
}
