use std::{collections::HashMap, sync::Arc};

use graphql_parser::{
    Pos,
    query::{Directive, Field, FragmentDefinition, FragmentSpread, Value as ParsedValue},
};

use super::{References, Scope, directive_arguments, field_arguments};
use crate::{
    ast::Type,
    executor::Operation,
    parser::Document,
    schema::{directives::DirectiveLocation, meta::{Argument, MetaType}, visibility::Warden},
    validation::{ValidatorContext, Visitor},
};

/// A variable standing where a value of `expected` type goes.
struct Usage<'a> {
    variable: &'a str,
    expected: Type,
    argument: &'a str,
    pos: Pos,
}

/// Declared type of a variable, and whether it has a non-null default.
type Declared<'a> = HashMap<&'a str, (Type, bool)>;

pub struct VariablesInAllowedPosition<'a> {
    references: References<'a>,
    current: Option<Scope<'a>>,
    usages: HashMap<Scope<'a>, Vec<Usage<'a>>>,
    operations: Vec<(Scope<'a>, Declared<'a>)>,
}

pub fn factory<'a>() -> VariablesInAllowedPosition<'a> {
    VariablesInAllowedPosition {
        references: References::default(),
        current: None,
        usages: HashMap::new(),
        operations: Vec::new(),
    }
}

impl<'a> VariablesInAllowedPosition<'a> {
    fn collect(
        &mut self,
        warden: &Warden,
        known: &[Arc<Argument>],
        given: &'a [(String, ParsedValue<'static, String>)],
        pos: Pos,
    ) {
        let Some(scope) = self.current else {
            return;
        };
        let mut found = Vec::new();
        for (name, value) in given {
            if let Some(arg) = known.iter().find(|a| a.name == name.as_str()) {
                collect_usages(warden, &arg.arg_type, name, value, pos, &mut found);
            }
        }
        self.usages.entry(scope).or_default().extend(found);
    }
}

fn collect_usages<'a>(
    warden: &Warden,
    expected: &Type,
    argument: &'a str,
    value: &'a ParsedValue<'static, String>,
    pos: Pos,
    out: &mut Vec<Usage<'a>>,
) {
    match value {
        ParsedValue::Variable(variable) => out.push(Usage {
            variable,
            expected: expected.clone(),
            argument,
            pos,
        }),
        ParsedValue::List(items) => {
            let item_type = expected.list_item().unwrap_or(expected);
            for item in items {
                collect_usages(warden, item_type, argument, item, pos, out);
            }
        }
        ParsedValue::Object(fields) => {
            let Ok(Some(meta)) = warden.get_type(expected.innermost_name()) else {
                return;
            };
            let MetaType::InputObject(input) = &**meta else {
                return;
            };
            let Ok(input_fields) = warden.arguments(&input.name, &input.input_fields) else {
                return;
            };
            for (key, v) in fields {
                if let Some(f) = input_fields.iter().find(|f| f.name == key.as_str()) {
                    collect_usages(warden, &f.arg_type, key, v, pos, out);
                }
            }
        }
        _ => {}
    }
}

/// Why a variable of type `var` can't stand where `expected` goes.
fn mismatch(var: &Type, expected: &Type) -> Option<&'static str> {
    if expected.is_non_null() && !var.is_non_null() {
        return Some("Nullability mismatch");
    }
    match (var.list_item(), expected.list_item()) {
        (Some(v), Some(e)) => mismatch(v, e),
        (None, None) => (var.innermost_name() != expected.innermost_name()).then_some("Type mismatch"),
        _ => Some("List dimension mismatch"),
    }
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        for (scope, declared) in &self.operations {
            for reached in self.references.reachable(*scope) {
                for usage in self.usages.get(&reached).into_iter().flatten() {
                    let Some((var_type, non_null_default)) = declared.get(usage.variable) else {
                        continue;
                    };
                    let effective = if *non_null_default {
                        var_type.clone().non_null()
                    } else {
                        var_type.clone()
                    };
                    if let Some(reason) = mismatch(&effective, &usage.expected) {
                        let message = format!(
                            "{reason} on variable ${} and argument {} ({var_type} / {})",
                            usage.variable, usage.argument, usage.expected,
                        );
                        ctx.report_error(&message, &[usage.pos.into()]);
                    }
                }
            }
        }
    }

    fn enter_operation_definition(&mut self, _: &mut ValidatorContext<'a>, op: Operation<'a>) {
        let scope = self.references.enter_operation();
        self.current = Some(scope);
        let declared = op
            .variable_definitions
            .iter()
            .map(|v| {
                let non_null_default = v
                    .default_value
                    .as_ref()
                    .is_some_and(|d| !matches!(d, ParsedValue::Null));
                (v.name.as_str(), (Type::from(&v.var_type), non_null_default))
            })
            .collect();
        self.operations.push((scope, declared));
    }

    fn exit_operation_definition(&mut self, _: &mut ValidatorContext<'a>, _: Operation<'a>) {
        self.references.exit();
        self.current = None;
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.enter_fragment(f);
        self.current = Some(Scope::Fragment(&f.name));
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a FragmentDefinition<'static, String>,
    ) {
        self.references.exit();
        self.current = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Field<'static, String>) {
        if let Some(known) = field_arguments(ctx) {
            self.collect(ctx.warden, &known, &field.arguments, field.position);
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Directive<'static, String>,
        _: DirectiveLocation,
    ) {
        if let Some(known) = directive_arguments(ctx, directive) {
            self.collect(ctx.warden, &known, &directive.arguments, directive.position);
        }
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a FragmentSpread<'static, String>,
    ) {
        self.references.add_spread(spread);
    }
}
