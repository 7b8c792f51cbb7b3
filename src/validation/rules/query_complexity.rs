use std::sync::Arc;

use graphql_parser::query::{Selection, SelectionSet, TypeCondition};
use indexmap::IndexMap;

use crate::{
    ast::InputValue,
    executor::Operation,
    introspection,
    schema::meta::{Complexity, MetaType},
    validation::{ValidatorContext, Visitor},
};

/// Rejects operations whose complexity exceeds `max`.
///
/// A field costs its configured complexity plus the cost of its
/// selections. Selections on an abstract type cost as much as the most
/// expensive possible type.
pub struct QueryComplexity {
    max: usize,
}

pub fn factory(max: usize) -> QueryComplexity {
    QueryComplexity { max }
}

impl<'a> Visitor<'a> for QueryComplexity {
    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        let root = ctx.warden.root_type(op.kind);
        let complexity = complexity_of(ctx, root, op.selection_set, &mut Vec::new());
        if complexity > self.max {
            ctx.report_error(
                &format!(
                    "Query has complexity of {complexity}, which exceeds max complexity of {}",
                    self.max,
                ),
                &[],
            );
        }
    }
}

fn complexity_of<'a>(
    ctx: &ValidatorContext<'a>,
    parent: Option<&Arc<MetaType>>,
    set: &'a SelectionSet<'static, String>,
    visiting: &mut Vec<&'a str>,
) -> usize {
    let Some(parent) = parent else {
        return 0;
    };
    if set.items.is_empty() {
        return 0;
    }
    if parent.is_abstract() {
        ctx.warden
            .possible_types(parent)
            .into_iter()
            .map(|object| selections_on(ctx, object, set, visiting))
            .max()
            .unwrap_or(0)
    } else {
        selections_on(ctx, parent, set, visiting)
    }
}

/// Cost of the selections of `set` that apply to the object type `object`.
fn selections_on<'a>(
    ctx: &ValidatorContext<'a>,
    object: &Arc<MetaType>,
    set: &'a SelectionSet<'static, String>,
    visiting: &mut Vec<&'a str>,
) -> usize {
    set.items
        .iter()
        .map(|s| match s {
            Selection::Field(f) => {
                let Ok(Some(def)) = introspection::field_of(ctx.warden, object, &f.name) else {
                    return 0;
                };
                let child_type = ctx.type_named(def.field_type.innermost_name());
                let child = complexity_of(ctx, child_type, &f.selection_set, visiting);
                match &def.complexity {
                    Complexity::Static(n) => n + child,
                    Complexity::Dynamic(cost) => {
                        let args = f
                            .arguments
                            .iter()
                            .map(|(k, v)| (k.clone(), InputValue::from_parsed(v)))
                            .collect::<IndexMap<_, _>>();
                        cost(&args, child)
                    }
                }
            }
            Selection::InlineFragment(i) => {
                let applies = match &i.type_condition {
                    Some(TypeCondition::On(on)) => applies_to(ctx, on, object),
                    None => true,
                };
                if applies {
                    selections_on(ctx, object, &i.selection_set, visiting)
                } else {
                    0
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                let Some(frag) = ctx.fragment(name) else {
                    return 0;
                };
                let TypeCondition::On(on) = &frag.type_condition;
                if visiting.contains(&name) || !applies_to(ctx, on, object) {
                    return 0;
                }
                visiting.push(name);
                let cost = selections_on(ctx, object, &frag.selection_set, visiting);
                visiting.pop();
                cost
            }
        })
        .sum()
}

fn applies_to(ctx: &ValidatorContext<'_>, condition: &str, object: &MetaType) -> bool {
    if condition == object.name().as_str() {
        return true;
    }
    ctx.type_named(condition)
        .is_some_and(|t| t.is_abstract() && ctx.warden.is_possible_type(t, object.name()))
}

#[cfg(test)]
mod tests {
    use super::factory;
    use crate::{
        config::SchemaConfig,
        validation::{
            RuleError,
            test_harness::{
                expect_fails_rule_with_schema, expect_passes_rule_with_schema, schema_with,
            },
        },
    };

    #[test]
    fn fields_cost_one_plus_their_selections() {
        let schema = schema_with(SchemaConfig::default());
        expect_passes_rule_with_schema(&schema, || factory(3), "{ dog { name barks } }");
        expect_fails_rule_with_schema(
            &schema,
            || factory(2),
            "{ dog { name barks } }",
            &[RuleError::new(
                "Query has complexity of 3, which exceeds max complexity of 2",
                &[],
            )],
        );
    }

    #[test]
    fn abstract_selections_take_the_most_expensive_type() {
        let schema = schema_with(SchemaConfig::default());
        let query = r#"
          {
            pet {
              name
              ... on Dog { barks barkVolume }
              ... on Cat { meows }
              ...CatBits
            }
          }
          fragment CatBits on Cat { furColor }
        "#;
        expect_passes_rule_with_schema(&schema, || factory(4), query);
        expect_fails_rule_with_schema(
            &schema,
            || factory(3),
            query,
            &[RuleError::new(
                "Query has complexity of 4, which exceeds max complexity of 3",
                &[],
            )],
        );
    }
}
