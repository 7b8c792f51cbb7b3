use graphql_parser::query::VariableDefinition;

use crate::{
    ast::Type,
    validation::{ValidatorContext, Visitor},
};

pub struct VariablesAreInputTypes;

pub fn factory() -> VariablesAreInputTypes {
    VariablesAreInputTypes
}

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        var: &'a VariableDefinition<'static, String>,
    ) {
        let ty = Type::from(&var.var_type);
        let type_name = ty.innermost_name();
        let message = match ctx.type_named(type_name) {
            None => format!("{type_name} isn't a defined input type (on ${})", var.name),
            Some(t) if t.is_input() => return,
            Some(_) => format!("{type_name} isn't a valid input type (on ${})", var.name),
        };
        ctx.report_error(&message, &[var.position.into()]);
    }
}
