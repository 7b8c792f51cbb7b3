use std::collections::HashSet;

use graphql_parser::{
    Pos,
    query::{Directive, Field, FragmentDefinition, FragmentSpread},
};

use super::{References, Scope, operation_label};
use crate::{
    executor::Operation,
    parser::Document,
    schema::directives::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct NoUnusedVariables<'a> {
    references: References<'a>,
    operations: Vec<(Scope<'a>, String, Vec<(&'a str, Pos)>)>,
}

pub fn factory<'a>() -> NoUnusedVariables<'a> {
    NoUnusedVariables {
        references: References::default(),
        operations: Vec::new(),
    }
}

impl<'a> Visitor<'a> for NoUnusedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        for (scope, label, defined) in &self.operations {
            let used = self
                .references
                .used_variables(*scope)
                .into_iter()
                .map(|(name, _)| name)
                .collect::<HashSet<_>>();
            for (name, pos) in defined {
                if !used.contains(name) {
                    ctx.report_error(&error_message(name, label), &[(*pos).into()]);
                }
            }
        }
    }

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, op: Operation<'a>) {
        let scope = self.references.enter_operation();
        let defined = op
            .variable_definitions
            .iter()
            .map(|v| (v.name.as_str(), v.position))
            .collect();
        self.operations.push((scope, operation_label(&op), defined));
    }

    fn exit_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {
        self.references.exit();
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.enter_fragment(f);
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.exit();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        self.references.add_field(field);
    }

    fn enter_directive(
        &mut self,
        _: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        self.references.add_directive(directive);
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        self.references.add_spread(spread);
    }
}

fn error_message(var_name: &str, op_label: &str) -> String {
    format!("Variable ${var_name} is declared by {op_label} but not used")
}
