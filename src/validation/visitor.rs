use graphql_parser::query::{
    Definition, Directive, OperationDefinition, Selection, SelectionSet, TypeCondition,
};

use super::{ValidatorContext, Visitor};
use crate::{
    executor::operation_of,
    introspection,
    parser::Document,
    schema::directives::DirectiveLocation,
};

#[doc(hidden)]
pub fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut ValidatorContext<'a>, d: &'a Document) {
    v.enter_document(ctx, d);
    for def in &d.definitions {
        visit_definition(v, ctx, def);
    }
    v.exit_document(ctx, d);
}

fn visit_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    def: &'a Definition<'static, String>,
) {
    match def {
        Definition::Operation(op) => {
            let operation = operation_of(op);
            let root = ctx.warden.root_type(operation.kind);
            let (directives, location) = match op {
                OperationDefinition::SelectionSet(_) => (&[][..], DirectiveLocation::Query),
                OperationDefinition::Query(q) => (&q.directives[..], DirectiveLocation::Query),
                OperationDefinition::Mutation(m) => (&m.directives[..], DirectiveLocation::Mutation),
                OperationDefinition::Subscription(s) => {
                    (&s.directives[..], DirectiveLocation::Subscription)
                }
            };
            ctx.with_pushed_type(root, |ctx| {
                v.enter_operation_definition(ctx, operation);
                for var in operation.variable_definitions {
                    v.enter_variable_definition(ctx, var);
                }
                visit_directives(v, ctx, directives, location);
                visit_selection_set(v, ctx, operation.selection_set);
                v.exit_operation_definition(ctx, operation);
            });
        }
        Definition::Fragment(f) => {
            let TypeCondition::On(on) = &f.type_condition;
            let ty = ctx.type_named(on);
            ctx.with_pushed_type(ty, |ctx| {
                v.enter_fragment_definition(ctx, f);
                visit_directives(v, ctx, &f.directives, DirectiveLocation::FragmentDefinition);
                visit_selection_set(v, ctx, &f.selection_set);
                v.exit_fragment_definition(ctx, f);
            });
        }
    }
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    directives: &'a [Directive<'static, String>],
    location: DirectiveLocation,
) {
    for d in directives {
        v.enter_directive(ctx, d, location);
    }
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    set: &'a SelectionSet<'static, String>,
) {
    ctx.with_pushed_parent_type(|ctx| {
        v.enter_selection_set(ctx, set);
        for selection in &set.items {
            visit_selection(v, ctx, selection);
        }
        v.exit_selection_set(ctx, set);
    });
}

fn visit_selection<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut ValidatorContext<'a>,
    selection: &'a Selection<'static, String>,
) {
    match selection {
        Selection::Field(f) => {
            let def = ctx
                .parent_type()
                .and_then(|t| introspection::field_of(ctx.warden, t, &f.name).ok().flatten());
            let ty = def
                .as_ref()
                .and_then(|d| ctx.type_named(d.field_type.innermost_name()));
            ctx.with_pushed_field(def, |ctx| {
                ctx.with_pushed_type(ty, |ctx| {
                    v.enter_field(ctx, f);
                    visit_directives(v, ctx, &f.directives, DirectiveLocation::Field);
                    if !f.selection_set.items.is_empty() {
                        visit_selection_set(v, ctx, &f.selection_set);
                    }
                    v.exit_field(ctx, f);
                });
            });
        }
        Selection::FragmentSpread(spread) => {
            v.enter_fragment_spread(ctx, spread);
            visit_directives(v, ctx, &spread.directives, DirectiveLocation::FragmentSpread);
        }
        Selection::InlineFragment(inline) => {
            let ty = match &inline.type_condition {
                Some(TypeCondition::On(on)) => ctx.type_named(on),
                None => ctx.parent_type(),
            };
            ctx.with_pushed_type(ty, |ctx| {
                v.enter_inline_fragment(ctx, inline);
                visit_directives(v, ctx, &inline.directives, DirectiveLocation::InlineFragment);
                visit_selection_set(v, ctx, &inline.selection_set);
                v.exit_inline_fragment(ctx, inline);
            });
        }
    }
}
