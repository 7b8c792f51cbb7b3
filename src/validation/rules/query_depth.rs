use graphql_parser::query::{Selection, SelectionSet};

use crate::{
    executor::Operation,
    validation::{ValidatorContext, Visitor},
};

/// Rejects operations nested deeper than `max` fields. Introspection fields
/// and their selections don't count.
pub struct QueryDepth {
    max: usize,
}

pub fn factory(max: usize) -> QueryDepth {
    QueryDepth { max }
}

impl<'a> Visitor<'a> for QueryDepth {
    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        let depth = depth_of(ctx, op.selection_set, &mut Vec::new());
        if depth > self.max {
            ctx.report_error(
                &format!(
                    "Query has depth of {depth}, which exceeds max depth of {}",
                    self.max,
                ),
                &[],
            );
        }
    }
}

fn depth_of<'a>(
    ctx: &ValidatorContext<'a>,
    set: &'a SelectionSet<'static, String>,
    visiting: &mut Vec<&'a str>,
) -> usize {
    set.items
        .iter()
        .map(|s| match s {
            Selection::Field(f) if f.name.starts_with("__") => 0,
            Selection::Field(f) => 1 + depth_of(ctx, &f.selection_set, visiting),
            Selection::InlineFragment(i) => depth_of(ctx, &i.selection_set, visiting),
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                match ctx.fragment(name) {
                    Some(frag) if !visiting.contains(&name) => {
                        visiting.push(name);
                        let depth = depth_of(ctx, &frag.selection_set, visiting);
                        visiting.pop();
                        depth
                    }
                    _ => 0,
                }
            }
        })
        .max()
        .unwrap_or(0)
}
