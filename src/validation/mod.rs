//! Query validation related methods and data structures

mod context;
mod multi_visitor;
mod rules;
mod traits;
mod visitor;

#[cfg(test)]
pub(crate) mod test_harness;

use graphql_parser::query::Value as ParsedValue;

pub use self::{
    context::{RuleError, ValidatorContext},
    multi_visitor::{MultiVisitorCons, MultiVisitorNil},
    traits::Visitor,
    visitor::visit,
};
use crate::{GraphQLError, parser::Document, schema::visibility::Warden};

/// Validates a document against the types visible through `warden`.
///
/// The depth and complexity analyzers run only when the document passes
/// every other rule and the schema configures a maximum. A selected field the
/// request can't disambiguate fails the whole document with
/// [`GraphQLError::DuplicateNames`].
pub(crate) fn validate(warden: &Warden, document: &Document) -> Result<(), GraphQLError> {
    let mut ctx = ValidatorContext::new(warden, document);
    rules::visit_all_rules(&mut ctx, document);
    if let Some(e) = ctx.take_duplicate() {
        return Err(GraphQLError::DuplicateNames(e));
    }
    if !ctx.has_errors() {
        rules::visit_analyzers(&mut ctx, document);
    }
    let errors = ctx.into_errors();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GraphQLError::ValidationError(errors))
    }
}

/// Names of the variables a literal refers to, in order of appearance.
pub(crate) fn variables_in<'a>(value: &'a ParsedValue<'static, String>) -> Vec<&'a str> {
    let mut out = Vec::new();
    collect_variables(value, &mut out);
    out
}

fn collect_variables<'a>(value: &'a ParsedValue<'static, String>, out: &mut Vec<&'a str>) {
    match value {
        ParsedValue::Variable(name) => out.push(name),
        ParsedValue::List(items) => items.iter().for_each(|v| collect_variables(v, out)),
        ParsedValue::Object(fields) => fields.values().for_each(|v| collect_variables(v, out)),
        _ => {}
    }
}
