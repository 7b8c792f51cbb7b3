use std::collections::HashSet;

use graphql_parser::{
    Pos,
    query::{Directive, Field, Value},
};

use crate::{
    schema::directives::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueArgumentNames;

pub fn factory() -> UniqueArgumentNames {
    UniqueArgumentNames
}

impl<'a> Visitor<'a> for UniqueArgumentNames {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        check(ctx, &field.arguments, field.position);
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        check(ctx, &directive.arguments, directive.position);
    }
}

fn check(ctx: &mut ValidatorContext<'_>, arguments: &[(String, Value<'static, String>)], pos: Pos) {
    let mut seen = HashSet::new();
    for (name, _) in arguments {
        if !seen.insert(name.as_str()) {
            ctx.report_error(&error_message(name), &[pos.into()]);
        }
    }
}

fn error_message(arg_name: &str) -> String {
    format!("There can be only one argument named \"{arg_name}\"")
}
