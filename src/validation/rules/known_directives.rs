use graphql_parser::query::Directive;

use crate::{
    schema::directives::DirectiveLocation,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownDirectives;

pub fn factory() -> KnownDirectives {
    KnownDirectives
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        location: DirectiveLocation,
    ) {
        let message = match ctx.warden.get_directive(&directive.name) {
            None => unknown_error_message(&directive.name),
            Some(def) if def.locations.contains(&location) => return,
            Some(def) => misplaced_error_message(&directive.name, location, &def.locations),
        };
        ctx.report_error(&message, &[directive.position.into()]);
    }
}

/// Plural name of a location, as in "can't be applied to queries".
fn location_name(location: DirectiveLocation) -> String {
    match location {
        DirectiveLocation::Query => "queries".into(),
        other => format!("{}s", other.as_str().to_lowercase().replace('_', " ")),
    }
}

fn unknown_error_message(directive_name: &str) -> String {
    format!("Directive @{directive_name} is not defined")
}

fn misplaced_error_message(
    directive_name: &str,
    location: DirectiveLocation,
    allowed: &[DirectiveLocation],
) -> String {
    let allowed = allowed
        .iter()
        .map(|l| location_name(*l))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "'@{directive_name}' can't be applied to {} (allowed: {allowed})",
        location_name(location),
    )
}
