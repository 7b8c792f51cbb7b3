use graphql_parser::query::VariableDefinition;

use crate::{
    ast::{InputValue, Type},
    types::coercion::validate_literal,
    validation::{ValidatorContext, Visitor},
};

pub struct DefaultValuesOfCorrectType;

pub fn factory() -> DefaultValuesOfCorrectType {
    DefaultValuesOfCorrectType
}

impl<'a> Visitor<'a> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        var: &'a VariableDefinition<'static, String>,
    ) {
        let Some(default) = &var.default_value else {
            return;
        };
        let ty = Type::from(&var.var_type);
        if ctx.type_named(ty.innermost_name()).is_none() {
            return;
        }
        let literal = InputValue::from_parsed(default);
        if validate_literal(ctx.warden, &ty, &literal).is_err() {
            ctx.report_error(
                &format!("Default value for ${} doesn't match type {ty}", var.name),
                &[var.position.into()],
            );
        }
    }
}
