use graphql_parser::query::{
    Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment, SelectionSet,
    VariableDefinition,
};

use super::{ValidatorContext, Visitor};
use crate::{executor::Operation, parser::Document, schema::directives::DirectiveLocation};

#[doc(hidden)]
pub struct MultiVisitorNil;

impl MultiVisitorNil {
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

#[doc(hidden)]
pub struct MultiVisitorCons<A, B>(A, B);

impl<A, B> MultiVisitorCons<A, B> {
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

impl Visitor<'_> for MultiVisitorNil {}

/// Runs an optional rule, such as a configured analyzer.
impl<'a, V: Visitor<'a>> Visitor<'a> for Option<V> {
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        if let Some(v) = self {
            v.enter_document(ctx, doc);
        }
    }
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        if let Some(v) = self {
            v.exit_document(ctx, doc);
        }
    }
    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        if let Some(v) = self {
            v.enter_operation_definition(ctx, op);
        }
    }
    fn exit_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        if let Some(v) = self {
            v.exit_operation_definition(ctx, op);
        }
    }
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        if let Some(v) = self {
            v.enter_fragment_definition(ctx, f);
        }
    }
    fn exit_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        if let Some(v) = self {
            v.exit_fragment_definition(ctx, f);
        }
    }
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a VariableDefinition<'static, String>,
    ) {
        if let Some(v) = self {
            v.enter_variable_definition(ctx, def);
        }
    }
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        d: &'a Directive<'static, String>,
        location: DirectiveLocation,
    ) {
        if let Some(v) = self {
            v.enter_directive(ctx, d, location);
        }
    }
    fn enter_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a SelectionSet<'static, String>) {
        if let Some(v) = self {
            v.enter_selection_set(ctx, s);
        }
    }
    fn exit_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a SelectionSet<'static, String>) {
        if let Some(v) = self {
            v.exit_selection_set(ctx, s);
        }
    }
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a Field<'static, String>) {
        if let Some(v) = self {
            v.enter_field(ctx, f);
        }
    }
    fn exit_field(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a Field<'static, String>) {
        if let Some(v) = self {
            v.exit_field(ctx, f);
        }
    }
    fn enter_fragment_spread(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a FragmentSpread<'static, String>) {
        if let Some(v) = self {
            v.enter_fragment_spread(ctx, s);
        }
    }
    fn enter_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a InlineFragment<'static, String>) {
        if let Some(v) = self {
            v.enter_inline_fragment(ctx, f);
        }
    }
    fn exit_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a InlineFragment<'static, String>) {
        if let Some(v) = self {
            v.exit_inline_fragment(ctx, f);
        }
    }
}

impl<'a, A, B> Visitor<'a> for MultiVisitorCons<A, B>
where
    A: Visitor<'a> + 'a,
    B: Visitor<'a> + 'a,
{
    fn enter_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        self.0.enter_document(ctx, doc);
        self.1.enter_document(ctx, doc);
    }
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
        self.0.exit_document(ctx, doc);
        self.1.exit_document(ctx, doc);
    }

    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        self.0.enter_operation_definition(ctx, op);
        self.1.enter_operation_definition(ctx, op);
    }
    fn exit_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        self.0.exit_operation_definition(ctx, op);
        self.1.exit_operation_definition(ctx, op);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        self.0.enter_fragment_definition(ctx, f);
        self.1.enter_fragment_definition(ctx, f);
    }
    fn exit_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        self.0.exit_fragment_definition(ctx, f);
        self.1.exit_fragment_definition(ctx, f);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a VariableDefinition<'static, String>,
    ) {
        self.0.enter_variable_definition(ctx, def);
        self.1.enter_variable_definition(ctx, def);
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        d: &'a Directive<'static, String>,
        location: DirectiveLocation,
    ) {
        self.0.enter_directive(ctx, d, location);
        self.1.enter_directive(ctx, d, location);
    }

    fn enter_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a SelectionSet<'static, String>) {
        self.0.enter_selection_set(ctx, s);
        self.1.enter_selection_set(ctx, s);
    }
    fn exit_selection_set(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a SelectionSet<'static, String>) {
        self.0.exit_selection_set(ctx, s);
        self.1.exit_selection_set(ctx, s);
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a Field<'static, String>) {
        self.0.enter_field(ctx, f);
        self.1.enter_field(ctx, f);
    }
    fn exit_field(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a Field<'static, String>) {
        self.0.exit_field(ctx, f);
        self.1.exit_field(ctx, f);
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidatorContext<'a>, s: &'a FragmentSpread<'static, String>) {
        self.0.enter_fragment_spread(ctx, s);
        self.1.enter_fragment_spread(ctx, s);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a InlineFragment<'static, String>) {
        self.0.enter_inline_fragment(ctx, f);
        self.1.enter_inline_fragment(ctx, f);
    }
    fn exit_inline_fragment(&mut self, ctx: &mut ValidatorContext<'a>, f: &'a InlineFragment<'static, String>) {
        self.0.exit_inline_fragment(ctx, f);
        self.1.exit_inline_fragment(ctx, f);
    }
}
