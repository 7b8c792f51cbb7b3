//! Inspection of the selections below a field before resolving it.

use graphql_parser::query::{self, Selection, TypeCondition};

use super::engine::{Fragments, is_excluded};
use crate::ast::{InputValue, Variables};

/// Whether a selection applies to every type or only inside a fragment on a
/// given type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Applies {
    /// The selection is made independently of the type.
    All,

    /// The selection is only made for the given type.
    OnlyType(String),
}

/// A field selection, along with the selections made below it.
///
/// Variables are already substituted in the arguments, and `@skip` or
/// `@include` directives are already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct LookAhead {
    name: String,
    alias: Option<String>,
    arguments: Vec<(String, InputValue)>,
    applies_for: Applies,
    children: Vec<LookAhead>,
}

impl LookAhead {
    pub(crate) fn of_fields(
        nodes: &[&query::Field<'static, String>],
        fragments: &Fragments<'_>,
        variables: &Variables,
    ) -> Self {
        let mut this = Self {
            name: nodes.first().map(|f| f.name.clone()).unwrap_or_default(),
            alias: nodes.first().and_then(|f| f.alias.clone()),
            arguments: nodes
                .first()
                .map(|f| {
                    f.arguments
                        .iter()
                        .map(|(k, v)| {
                            let v = InputValue::from_parsed(v)
                                .into_const(variables)
                                .unwrap_or(InputValue::Null);
                            (k.clone(), v)
                        })
                        .collect()
                })
                .unwrap_or_default(),
            applies_for: Applies::All,
            children: Vec::new(),
        };
        for node in nodes {
            collect(
                &node.selection_set.items,
                &Applies::All,
                fragments,
                variables,
                &mut this.children,
            );
        }
        this
    }

    /// Name of the selected field.
    pub fn field_name(&self) -> &str {
        &self.name
    }

    /// Key the field appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Arguments given to the field.
    pub fn arguments(&self) -> &[(String, InputValue)] {
        &self.arguments
    }

    /// Looks an argument up by name.
    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments
            .iter()
            .find_map(|(k, v)| (k == name).then_some(v))
    }

    /// Whether this selection is only made for some type.
    pub fn applies_for(&self) -> &Applies {
        &self.applies_for
    }

    /// Selections below this one, in query order.
    pub fn children(&self) -> &[LookAhead] {
        &self.children
    }

    /// First selection of the named field below this one.
    pub fn child(&self, field_name: &str) -> Option<&LookAhead> {
        self.children.iter().find(|c| c.name == field_name)
    }

    /// Indicates whether the named field is selected below this one.
    pub fn selects(&self, field_name: &str) -> bool {
        self.child(field_name).is_some()
    }

    /// Response keys of the selections below this one.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(Self::response_key).collect()
    }
}

fn collect(
    selections: &[Selection<'static, String>],
    applies_for: &Applies,
    fragments: &Fragments<'_>,
    variables: &Variables,
    out: &mut Vec<LookAhead>,
) {
    for selection in selections {
        match selection {
            Selection::Field(f) => {
                if is_excluded(&f.directives, variables) {
                    continue;
                }
                let mut child = LookAhead::of_fields(&[f], fragments, variables);
                child.applies_for = applies_for.clone();
                match out.iter_mut().find(|c| {
                    c.response_key() == child.response_key() && c.applies_for == child.applies_for
                }) {
                    Some(existing) => existing.children.extend(child.children),
                    None => out.push(child),
                }
            }
            Selection::FragmentSpread(spread) => {
                if is_excluded(&spread.directives, variables) {
                    continue;
                }
                if let Some(fragment) = fragments.get(spread.fragment_name.as_str()) {
                    let TypeCondition::On(on) = &fragment.type_condition;
                    collect(
                        &fragment.selection_set.items,
                        &Applies::OnlyType(on.clone()),
                        fragments,
                        variables,
                        out,
                    );
                }
            }
            Selection::InlineFragment(inline) => {
                if is_excluded(&inline.directives, variables) {
                    continue;
                }
                let applies = match &inline.type_condition {
                    Some(TypeCondition::On(on)) => Applies::OnlyType(on.clone()),
                    None => applies_for.clone(),
                };
                collect(&inline.selection_set.items, &applies, fragments, variables, out);
            }
        }
    }
}
