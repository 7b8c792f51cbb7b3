use std::sync::Arc;

use graphql_parser::{
    Pos,
    query::{Directive, Field, Value},
};

use super::{directive_arguments, directive_owner, field_arguments, field_owner};
use crate::{
    ast::InputValue,
    schema::{directives::DirectiveLocation, meta::Argument},
    types::coercion::validate_literal,
    validation::{ValidatorContext, Visitor},
};

pub struct ArgumentsOfCorrectType;

pub fn factory() -> ArgumentsOfCorrectType {
    ArgumentsOfCorrectType
}

impl<'a> Visitor<'a> for ArgumentsOfCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        if let Some(known) = field_arguments(ctx) {
            check(ctx, &field_owner(field), &known, &field.arguments, field.position);
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        if let Some(known) = directive_arguments(ctx, directive) {
            let owner = directive_owner(directive);
            check(ctx, &owner, &known, &directive.arguments, directive.position);
        }
    }
}

fn check(
    ctx: &mut ValidatorContext<'_>,
    owner: &str,
    known: &[Arc<Argument>],
    given: &[(String, Value<'static, String>)],
    pos: Pos,
) {
    for (name, value) in given {
        let Some(arg) = known.iter().find(|a| a.name == name.as_str()) else {
            continue;
        };
        let literal = InputValue::from_parsed(value);
        if let Err(e) = validate_literal(ctx.warden, &arg.arg_type, &literal) {
            let message = e.message(owner, name, &literal, &arg.arg_type);
            ctx.report_error(&message, &[pos.into()]);
        }
    }
}
