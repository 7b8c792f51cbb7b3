use graphql_parser::query::{
    Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment, SelectionSet,
    VariableDefinition,
};

use super::ValidatorContext;
use crate::{executor::Operation, parser::Document, schema::directives::DirectiveLocation};

#[doc(hidden)]
pub trait Visitor<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, _: &'a Document) {}
    fn exit_document(&mut self, _: &mut ValidatorContext<'a>, _: &'a Document) {}

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {}
    fn exit_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {}

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a VariableDefinition<'static, String>,
    ) {
    }

    fn enter_directive(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
    }

    fn enter_selection_set(&mut self, _: &mut ValidatorContext<'a>, _: &'a SelectionSet<'static, String>) {}
    fn exit_selection_set(&mut self, _: &mut ValidatorContext<'a>, _: &'a SelectionSet<'static, String>) {}

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Field<'static, String>) {}
    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Field<'static, String>) {}

    fn enter_fragment_spread(&mut self, _: &mut ValidatorContext<'a>, _: &'a FragmentSpread<'static, String>) {}

    fn enter_inline_fragment(&mut self, _: &mut ValidatorContext<'a>, _: &'a InlineFragment<'static, String>) {}
    fn exit_inline_fragment(&mut self, _: &mut ValidatorContext<'a>, _: &'a InlineFragment<'static, String>) {}
}
