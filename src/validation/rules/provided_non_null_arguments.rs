use std::sync::Arc;

use graphql_parser::{
    Pos,
    query::{Directive, Field, Value},
};

use super::{directive_arguments, directive_owner, field_arguments, field_owner};
use crate::{
    schema::{directives::DirectiveLocation, meta::Argument},
    validation::{ValidatorContext, Visitor},
};

pub struct ProvidedNonNullArguments;

pub fn factory() -> ProvidedNonNullArguments {
    ProvidedNonNullArguments
}

impl<'a> Visitor<'a> for ProvidedNonNullArguments {
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
    let missing = known
        .iter()
        .filter(|a| a.is_required() && !given.iter().any(|(name, _)| a.name == name.as_str()))
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        ctx.report_error(&error_message(owner, &missing), &[pos.into()]);
    }
}

fn error_message(owner: &str, missing: &[&str]) -> String {
    format!("{owner} is missing required arguments: {}", missing.join(", "))
}
