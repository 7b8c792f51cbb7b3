mod arguments_of_correct_type;
mod default_values_of_correct_type;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_root_types;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod overlapping_fields_can_be_merged;
mod possible_fragment_spreads;
mod provided_non_null_arguments;
mod query_complexity;
mod query_depth;
mod scalar_leafs;
mod unique_argument_names;
mod unique_names;
mod variables_are_input_types;
mod variables_in_allowed_position;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use graphql_parser::{
    Pos,
    query::{Directive, Field, FragmentDefinition, FragmentSpread, Value as ParsedValue},
};

use super::{MultiVisitorNil, ValidatorContext, visit, variables_in};
use crate::{executor::Operation, parser::Document, schema::meta::Argument};

pub(crate) fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    let mut mv = MultiVisitorNil
        .with(self::arguments_of_correct_type::factory())
        .with(self::default_values_of_correct_type::factory())
        .with(self::fields_on_correct_type::factory())
        .with(self::fragments_on_composite_types::factory())
        .with(self::known_argument_names::factory())
        .with(self::known_directives::factory())
        .with(self::known_fragment_names::factory())
        .with(self::known_root_types::factory())
        .with(self::no_fragment_cycles::factory())
        .with(self::no_undefined_variables::factory())
        .with(self::no_unused_fragments::factory())
        .with(self::no_unused_variables::factory())
        .with(self::overlapping_fields_can_be_merged::factory())
        .with(self::possible_fragment_spreads::factory())
        .with(self::provided_non_null_arguments::factory())
        .with(self::scalar_leafs::factory())
        .with(self::unique_argument_names::factory())
        .with(self::unique_names::factory())
        .with(self::variables_are_input_types::factory())
        .with(self::variables_in_allowed_position::factory());

    visit(&mut mv, ctx, doc);
}

/// Runs the depth and complexity analyzers the schema configures.
pub(crate) fn visit_analyzers<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    let config = ctx.warden.schema().config();
    let (max_depth, max_complexity) = (config.max_depth, config.max_complexity);
    if max_depth.is_none() && max_complexity.is_none() {
        return;
    }
    let mut mv = MultiVisitorNil
        .with(max_depth.map(self::query_depth::factory))
        .with(max_complexity.map(self::query_complexity::factory));

    visit(&mut mv, ctx, doc);
}

/// Owner of argument lists, as it's named in messages.
pub(super) fn field_owner(field: &Field<'static, String>) -> String {
    format!("Field '{}'", field.name)
}

pub(super) fn directive_owner(directive: &Directive<'static, String>) -> String {
    format!("Directive '{}'", directive.name)
}

/// Visible argument definitions of the field being visited.
pub(super) fn field_arguments(ctx: &ValidatorContext<'_>) -> Option<Vec<Arc<Argument>>> {
    let def = ctx.current_field()?;
    let visible = ctx.warden.arguments(&def.name, &def.arguments).ok()?;
    Some(visible.into_iter().cloned().collect())
}

/// Visible argument definitions of a directive.
pub(super) fn directive_arguments(
    ctx: &ValidatorContext<'_>,
    directive: &Directive<'static, String>,
) -> Option<Vec<Arc<Argument>>> {
    let def = ctx.warden.get_directive(&directive.name)?;
    let visible = ctx.warden.arguments(&def.name, &def.arguments).ok()?;
    Some(visible.into_iter().cloned().collect())
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(super) enum Scope<'a> {
    /// Operations are numbered in document order.
    Operation(usize),
    Fragment(&'a str),
}

/// Variable and fragment references made by each operation and fragment.
#[derive(Default)]
pub(super) struct References<'a> {
    operations: usize,
    current: Option<Scope<'a>>,
    variables: HashMap<Scope<'a>, Vec<(&'a str, Pos)>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
}

impl<'a> References<'a> {
    pub(super) fn enter_operation(&mut self) -> Scope<'a> {
        let scope = Scope::Operation(self.operations);
        self.operations += 1;
        self.current = Some(scope);
        scope
    }

    pub(super) fn enter_fragment(&mut self, fragment: &'a FragmentDefinition<'static, String>) {
        self.current = Some(Scope::Fragment(&fragment.name));
    }

    pub(super) fn exit(&mut self) {
        self.current = None;
    }

    pub(super) fn add_field(&mut self, field: &'a Field<'static, String>) {
        self.add_arguments(&field.arguments, field.position);
    }

    pub(super) fn add_directive(&mut self, directive: &'a Directive<'static, String>) {
        self.add_arguments(&directive.arguments, directive.position);
    }

    fn add_arguments(&mut self, arguments: &'a [(String, ParsedValue<'static, String>)], pos: Pos) {
        let Some(scope) = self.current else {
            return;
        };
        let used = self.variables.entry(scope).or_default();
        for (_, value) in arguments {
            used.extend(variables_in(value).into_iter().map(|v| (v, pos)));
        }
    }

    pub(super) fn add_spread(&mut self, spread: &'a FragmentSpread<'static, String>) {
        if let Some(scope) = self.current {
            self.spreads.entry(scope).or_default().push(&spread.fragment_name);
        }
    }

    /// Scopes reachable from `root` through fragment spreads, `root`
    /// included.
    pub(super) fn reachable(&self, root: Scope<'a>) -> Vec<Scope<'a>> {
        let mut seen = HashSet::from([root]);
        let mut order = vec![root];
        let mut to_visit = vec![root];
        while let Some(scope) = to_visit.pop() {
            for name in self.spreads.get(&scope).into_iter().flatten() {
                let next = Scope::Fragment(*name);
                if seen.insert(next) {
                    order.push(next);
                    to_visit.push(next);
                }
            }
        }
        order
    }

    /// Variables used by `root` and the fragments it reaches.
    pub(super) fn used_variables(&self, root: Scope<'a>) -> Vec<(&'a str, Pos)> {
        self.reachable(root)
            .into_iter()
            .flat_map(|s| self.variables.get(&s).into_iter().flatten().copied())
            .collect()
    }

    pub(super) fn spreads_of(&self, scope: Scope<'a>) -> &[&'a str] {
        self.spreads.get(&scope).map_or(&[], Vec::as_slice)
    }
}

/// Display name of an operation in variable messages.
pub(super) fn operation_label(op: &Operation<'_>) -> String {
    match op.name {
        Some(name) => name.to_owned(),
        None => format!("anonymous {}", op.kind),
    }
}
