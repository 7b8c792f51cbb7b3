use std::{cell::RefCell, collections::HashMap, sync::Arc};

use graphql_parser::query::{
    Field, FragmentDefinition, Selection, SelectionSet, TypeCondition, Value as ParsedValue,
};
use indexmap::IndexMap;

use crate::{
    ast::Type,
    introspection,
    parser::SourcePosition,
    schema::meta::{Field as FieldDef, MetaType},
    validation::{ValidatorContext, Visitor},
};

#[derive(Debug)]
struct Conflict(ConflictReason, Vec<SourcePosition>, Vec<SourcePosition>);

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct ConflictReason(String, ConflictReasonMessage);

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum ConflictReasonMessage {
    Message(String),
    Nested(Vec<ConflictReason>),
}

/// A selected field with the name of the type it's selected on and its
/// definition there, if any.
struct AstAndDef<'a>(Option<&'a str>, &'a Field<'static, String>, Option<Arc<FieldDef>>);

type AstAndDefCollection<'a> = IndexMap<&'a str, Vec<AstAndDef<'a>>>;

/// Fragment pairs already compared, and whether that comparison assumed
/// mutually exclusive parents.
#[derive(Default)]
struct PairSet<'a> {
    data: HashMap<&'a str, HashMap<&'a str, bool>>,
}

impl<'a> PairSet<'a> {
    fn contains(&self, a: &str, b: &str, mutex: bool) -> bool {
        match self.data.get(a).and_then(|s| s.get(b)) {
            // A non-exclusive comparison also covers the exclusive one.
            Some(result) => mutex || !result,
            None => false,
        }
    }

    fn insert(&mut self, a: &'a str, b: &'a str, mutex: bool) {
        self.data.entry(a).or_default().insert(b, mutex);
        self.data.entry(b).or_default().insert(a, mutex);
    }
}

pub struct OverlappingFieldsCanBeMerged<'a> {
    compared_fragments: RefCell<PairSet<'a>>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        compared_fragments: RefCell::new(PairSet::default()),
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn find_conflicts_within_selection_set(
        &self,
        parent_type: Option<&'a Arc<MetaType>>,
        selection_set: &'a SelectionSet<'static, String>,
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let (field_map, fragment_names) =
            self.get_fields_and_fragment_names(parent_type, selection_set, ctx);

        self.collect_conflicts_within(&mut conflicts, &field_map, ctx);

        for (i, frag_name1) in fragment_names.iter().enumerate() {
            self.collect_conflicts_between_fields_and_fragment(
                &mut conflicts,
                &field_map,
                frag_name1,
                false,
                ctx,
            );

            for frag_name2 in &fragment_names[i + 1..] {
                self.collect_conflicts_between_fragments(
                    &mut conflicts,
                    frag_name1,
                    frag_name2,
                    false,
                    ctx,
                );
            }
        }

        conflicts
    }

    fn collect_conflicts_between_fragments(
        &self,
        conflicts: &mut Vec<Conflict>,
        fragment_name1: &'a str,
        fragment_name2: &'a str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        if fragment_name1 == fragment_name2 {
            return;
        }
        let (Some(fragment1), Some(fragment2)) =
            (ctx.fragment(fragment_name1), ctx.fragment(fragment_name2))
        else {
            return;
        };

        if self
            .compared_fragments
            .borrow()
            .contains(fragment_name1, fragment_name2, mutually_exclusive)
        {
            return;
        }
        self.compared_fragments
            .borrow_mut()
            .insert(fragment_name1, fragment_name2, mutually_exclusive);

        let (field_map1, fragment_names1) =
            self.get_referenced_fields_and_fragment_names(fragment1, ctx);
        let (field_map2, fragment_names2) =
            self.get_referenced_fields_and_fragment_names(fragment2, ctx);

        self.collect_conflicts_between(
            conflicts,
            mutually_exclusive,
            &field_map1,
            &field_map2,
            ctx,
        );

        for fragment_name2 in &fragment_names2 {
            self.collect_conflicts_between_fragments(
                conflicts,
                fragment_name1,
                fragment_name2,
                mutually_exclusive,
                ctx,
            );
        }

        for fragment_name1 in &fragment_names1 {
            self.collect_conflicts_between_fragments(
                conflicts,
                fragment_name1,
                fragment_name2,
                mutually_exclusive,
                ctx,
            );
        }
    }

    fn collect_conflicts_between_fields_and_fragment(
        &self,
        conflicts: &mut Vec<Conflict>,
        field_map: &AstAndDefCollection<'a>,
        fragment_name: &str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) {
        self.fields_and_fragment(
            conflicts,
            field_map,
            fragment_name,
            mutually_exclusive,
            ctx,
            &mut Vec::new(),
        );
    }

    /// `visited` guards against fragment cycles, which are reported by
    /// another rule.
    fn fields_and_fragment(
        &self,
        conflicts: &mut Vec<Conflict>,
        field_map: &AstAndDefCollection<'a>,
        fragment_name: &str,
        mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
        visited: &mut Vec<&'a str>,
    ) {
        let Some(fragment) = ctx.fragment(fragment_name) else {
            return;
        };
        if visited.contains(&fragment.name.as_str()) {
            return;
        }
        visited.push(&fragment.name);

        let (field_map2, fragment_names2) =
            self.get_referenced_fields_and_fragment_names(fragment, ctx);

        self.collect_conflicts_between(conflicts, mutually_exclusive, field_map, &field_map2, ctx);

        for fragment_name2 in fragment_names2 {
            self.fields_and_fragment(
                conflicts,
                field_map,
                fragment_name2,
                mutually_exclusive,
                ctx,
                visited,
            );
        }
    }

    fn collect_conflicts_between(
        &self,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        field_map1: &AstAndDefCollection<'a>,
        field_map2: &AstAndDefCollection<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, fields1) in field_map1 {
            let Some(fields2) = field_map2.get(response_name) else {
                continue;
            };
            for field1 in fields1 {
                for field2 in fields2 {
                    if let Some(conflict) =
                        self.find_conflict(response_name, field1, field2, mutually_exclusive, ctx)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn collect_conflicts_within(
        &self,
        conflicts: &mut Vec<Conflict>,
        field_map: &AstAndDefCollection<'a>,
        ctx: &ValidatorContext<'a>,
    ) {
        for (response_name, fields) in field_map {
            for (i, field1) in fields.iter().enumerate() {
                for field2 in &fields[i + 1..] {
                    if let Some(conflict) =
                        self.find_conflict(response_name, field1, field2, false, ctx)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn find_conflict(
        &self,
        response_name: &str,
        field1: &AstAndDef<'a>,
        field2: &AstAndDef<'a>,
        parents_mutually_exclusive: bool,
        ctx: &ValidatorContext<'a>,
    ) -> Option<Conflict> {
        let AstAndDef(parent_type1, ast1, def1) = field1;
        let AstAndDef(parent_type2, ast2, def2) = field2;
        let (pos1, pos2) = (SourcePosition::from(ast1.position), SourcePosition::from(ast2.position));

        let mutually_exclusive = parents_mutually_exclusive
            || (parent_type1 != parent_type2
                && is_object_type(ctx, *parent_type1)
                && is_object_type(ctx, *parent_type2));

        if !mutually_exclusive {
            if ast1.name != ast2.name {
                return Some(Conflict(
                    ConflictReason(
                        response_name.to_owned(),
                        ConflictReasonMessage::Message(format!(
                            "{} and {} are different fields",
                            ast1.name, ast2.name,
                        )),
                    ),
                    vec![pos1],
                    vec![pos2],
                ));
            }

            if !is_same_arguments(&ast1.arguments, &ast2.arguments) {
                return Some(Conflict(
                    ConflictReason(
                        response_name.to_owned(),
                        ConflictReasonMessage::Message("they have differing arguments".to_owned()),
                    ),
                    vec![pos1],
                    vec![pos2],
                ));
            }
        }

        let t1 = def1.as_ref().map(|def| &def.field_type);
        let t2 = def2.as_ref().map(|def| &def.field_type);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            if is_type_conflict(ctx, t1, t2) {
                return Some(Conflict(
                    ConflictReason(
                        response_name.to_owned(),
                        ConflictReasonMessage::Message(format!(
                            "they return conflicting types {t1} and {t2}",
                        )),
                    ),
                    vec![pos1],
                    vec![pos2],
                ));
            }
        }

        if ast1.selection_set.items.is_empty() || ast2.selection_set.items.is_empty() {
            return None;
        }
        let conflicts = self.find_conflicts_between_sub_selection_sets(
            mutually_exclusive,
            t1.and_then(|t| ctx.type_named(t.innermost_name())),
            &ast1.selection_set,
            t2.and_then(|t| ctx.type_named(t.innermost_name())),
            &ast2.selection_set,
            ctx,
        );

        subfield_conflicts(&conflicts, response_name, pos1, pos2)
    }

    fn find_conflicts_between_sub_selection_sets(
        &self,
        mutually_exclusive: bool,
        parent_type1: Option<&'a Arc<MetaType>>,
        selection_set1: &'a SelectionSet<'static, String>,
        parent_type2: Option<&'a Arc<MetaType>>,
        selection_set2: &'a SelectionSet<'static, String>,
        ctx: &ValidatorContext<'a>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        let (field_map1, fragment_names1) =
            self.get_fields_and_fragment_names(parent_type1, selection_set1, ctx);
        let (field_map2, fragment_names2) =
            self.get_fields_and_fragment_names(parent_type2, selection_set2, ctx);

        self.collect_conflicts_between(
            &mut conflicts,
            mutually_exclusive,
            &field_map1,
            &field_map2,
            ctx,
        );

        for fragment_name in &fragment_names2 {
            self.collect_conflicts_between_fields_and_fragment(
                &mut conflicts,
                &field_map1,
                fragment_name,
                mutually_exclusive,
                ctx,
            );
        }

        for fragment_name in &fragment_names1 {
            self.collect_conflicts_between_fields_and_fragment(
                &mut conflicts,
                &field_map2,
                fragment_name,
                mutually_exclusive,
                ctx,
            );
        }

        for fragment_name1 in &fragment_names1 {
            for fragment_name2 in &fragment_names2 {
                self.collect_conflicts_between_fragments(
                    &mut conflicts,
                    fragment_name1,
                    fragment_name2,
                    mutually_exclusive,
                    ctx,
                );
            }
        }

        conflicts
    }

    fn get_referenced_fields_and_fragment_names(
        &self,
        fragment: &'a FragmentDefinition<'static, String>,
        ctx: &ValidatorContext<'a>,
    ) -> (AstAndDefCollection<'a>, Vec<&'a str>) {
        let TypeCondition::On(on) = &fragment.type_condition;
        self.get_fields_and_fragment_names(ctx.type_named(on), &fragment.selection_set, ctx)
    }

    fn get_fields_and_fragment_names(
        &self,
        parent_type: Option<&'a Arc<MetaType>>,
        selection_set: &'a SelectionSet<'static, String>,
        ctx: &ValidatorContext<'a>,
    ) -> (AstAndDefCollection<'a>, Vec<&'a str>) {
        let mut ast_and_defs = IndexMap::new();
        let mut fragment_names = Vec::new();

        collect_fields_and_fragment_names(
            parent_type,
            selection_set,
            ctx,
            &mut ast_and_defs,
            &mut fragment_names,
        );

        (ast_and_defs, fragment_names)
    }
}

fn collect_fields_and_fragment_names<'a>(
    parent_type: Option<&'a Arc<MetaType>>,
    selection_set: &'a SelectionSet<'static, String>,
    ctx: &ValidatorContext<'a>,
    ast_and_defs: &mut AstAndDefCollection<'a>,
    fragment_names: &mut Vec<&'a str>,
) {
    for selection in &selection_set.items {
        match selection {
            Selection::Field(f) => {
                let field_def = parent_type
                    .and_then(|t| introspection::field_of(ctx.warden, t, &f.name).ok().flatten());
                let response_name = f.alias.as_deref().unwrap_or(&f.name);

                ast_and_defs.entry(response_name).or_default().push(AstAndDef(
                    parent_type.map(|t| t.name().as_str()),
                    f,
                    field_def,
                ));
            }
            Selection::FragmentSpread(spread) => {
                if !fragment_names.contains(&spread.fragment_name.as_str()) {
                    fragment_names.push(&spread.fragment_name);
                }
            }
            Selection::InlineFragment(inline) => {
                let parent_type = match &inline.type_condition {
                    Some(TypeCondition::On(on)) => ctx.type_named(on),
                    None => parent_type,
                };

                collect_fields_and_fragment_names(
                    parent_type,
                    &inline.selection_set,
                    ctx,
                    ast_and_defs,
                    fragment_names,
                );
            }
        }
    }
}

fn subfield_conflicts(
    conflicts: &[Conflict],
    response_name: &str,
    pos1: SourcePosition,
    pos2: SourcePosition,
) -> Option<Conflict> {
    if conflicts.is_empty() {
        return None;
    }

    Some(Conflict(
        ConflictReason(
            response_name.to_owned(),
            ConflictReasonMessage::Nested(conflicts.iter().map(|c| c.0.clone()).collect()),
        ),
        std::iter::once(pos1)
            .chain(conflicts.iter().flat_map(|Conflict(_, fs1, _)| fs1.iter().copied()))
            .collect(),
        std::iter::once(pos2)
            .chain(conflicts.iter().flat_map(|Conflict(_, _, fs2)| fs2.iter().copied()))
            .collect(),
    ))
}

fn is_type_conflict(ctx: &ValidatorContext<'_>, t1: &Type, t2: &Type) -> bool {
    match (t1, t2) {
        (Type::List(inner1), Type::List(inner2))
        | (Type::NonNullList(inner1), Type::NonNullList(inner2)) => {
            is_type_conflict(ctx, inner1, inner2)
        }
        (Type::NonNullNamed(n1), Type::NonNullNamed(n2)) | (Type::Named(n1), Type::Named(n2)) => {
            let is_leaf = |n: &str| ctx.type_named(n).is_some_and(|t| t.is_leaf());
            (is_leaf(n1.as_str()) || is_leaf(n2.as_str())) && n1 != n2
        }
        _ => true,
    }
}

/// Arguments match regardless of the order they're written in.
fn is_same_arguments(
    args1: &[(String, ParsedValue<'static, String>)],
    args2: &[(String, ParsedValue<'static, String>)],
) -> bool {
    args1.len() == args2.len()
        && args1.iter().all(|(n1, v1)| {
            args2
                .iter()
                .find(|(n2, _)| n1 == n2)
                .is_some_and(|(_, v2)| v1 == v2)
        })
}

fn is_object_type(ctx: &ValidatorContext<'_>, type_name: Option<&str>) -> bool {
    matches!(
        type_name.and_then(|n| ctx.type_named(n)).map(|t| &**t),
        Some(MetaType::Object(_)),
    )
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &'a SelectionSet<'static, String>,
    ) {
        for Conflict(ConflictReason(reason_name, reason_msg), mut p1, mut p2) in
            self.find_conflicts_within_selection_set(ctx.parent_type(), selection_set, ctx)
        {
            p1.append(&mut p2);
            ctx.report_error(&error_message(&reason_name, &reason_msg), &p1);
        }
    }
}

fn error_message(reason_name: &str, reason: &ConflictReasonMessage) -> String {
    let suffix = "Use different aliases on the fields to fetch both if this was intentional";
    format!(
        r#"Fields "{reason_name}" conflict because {}. {suffix}"#,
        format_reason(reason),
    )
}

fn format_reason(reason: &ConflictReasonMessage) -> String {
    match reason {
        ConflictReasonMessage::Message(name) => name.clone(),
        ConflictReasonMessage::Nested(nested) => nested
            .iter()
            .map(|ConflictReason(name, subreason)| {
                format!(
                    r#"subfields "{name}" conflict because {}"#,
                    format_reason(subreason),
                )
            })
            .collect::<Vec<_>>()
            .join(" and "),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConflictReason, ConflictReasonMessage::*, error_message, factory};
    use crate::validation::{
        RuleError,
        test_harness::{at, expect_fails_rule, expect_fails_with_messages, expect_passes_rule},
    };

    #[test]
    fn unique_fields() {
        expect_passes_rule(factory, "fragment uniqueFields on Dog { name nickname }");
    }

    #[test]
    fn identical_fields() {
        expect_passes_rule(factory, "fragment mergeIdenticalFields on Dog { name name }");
    }

    #[test]
    fn identical_fields_with_identical_args() {
        expect_passes_rule(
            factory,
            "fragment f on Dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: SIT) }",
        );
    }

    #[test]
    fn different_args_with_different_aliases() {
        expect_passes_rule(
            factory,
            "fragment f on Dog { knowsSit: doesKnowCommand(dogCommand: SIT) \
             knowsDown: doesKnowCommand(dogCommand: DOWN) }",
        );
    }

    #[test]
    fn same_aliases_with_different_field_targets() {
        expect_fails_rule(
            factory,
            "fragment f on Dog { fido: name fido: nickname }",
            &[RuleError::new(
                &error_message("fido", &Message("name and nickname are different fields".into())),
                &[at(1, 21), at(1, 32)],
            )],
        );
    }

    #[test]
    fn conflicting_args() {
        expect_fails_rule(
            factory,
            "fragment f on Dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: HEEL) }",
            &[RuleError::new(
                &error_message("doesKnowCommand", &Message("they have differing arguments".into())),
                &[at(1, 21), at(1, 54)],
            )],
        );
    }

    #[test]
    fn aliased_fields_with_different_argument_values() {
        expect_fails_with_messages(
            factory,
            "{ complicatedArgs { a: intArgField(intArg: 1) a: intArgField(intArg: 2) } }",
            &[&error_message("a", &Message("they have differing arguments".into()))],
        );
    }

    #[test]
    fn argument_order_does_not_matter() {
        expect_passes_rule(
            factory,
            "{ complicatedArgs { multipleOpts(opt1: 1, opt2: 2) multipleOpts(opt2: 2, opt1: 1) } }",
        );
    }

    #[test]
    fn different_fields_on_mutually_exclusive_parents() {
        expect_passes_rule(
            factory,
            "{ pet { ... on Dog { name: nickname } ... on Cat { name } } }",
        );
    }

    #[test]
    fn conflicting_return_types_on_mutually_exclusive_parents() {
        expect_fails_with_messages(
            factory,
            "{ pet { ... on Dog { x: barkVolume } ... on Cat { x: meows } } }",
            &[&error_message("x", &Message("they return conflicting types Int and Boolean".into()))],
        );
    }

    #[test]
    fn nested_conflicts() {
        expect_fails_rule(
            factory,
            "{ dog { x: name } dog { x: nickname } }",
            &[RuleError::new(
                &error_message(
                    "dog",
                    &Nested(vec![ConflictReason(
                        "x".into(),
                        Message("name and nickname are different fields".into()),
                    )]),
                ),
                &[at(1, 3), at(1, 9), at(1, 19), at(1, 25)],
            )],
        );
    }

    #[test]
    fn conflicts_through_fragments() {
        expect_fails_with_messages(
            factory,
            "{ dog { ...A ...B } } \
             fragment A on Dog { x: name } \
             fragment B on Dog { x: nickname }",
            &[&error_message("x", &Message("name and nickname are different fields".into()))],
        );
    }

    #[test]
    fn fragment_cycles_terminate() {
        expect_passes_rule(
            factory,
            "{ dog { ...A } } fragment A on Dog { name ...B } fragment B on Dog { name ...A }",
        );
    }

    #[test]
    fn nested_messages_join_subfields() {
        assert_eq!(
            error_message(
                "dog",
                &Nested(vec![
                    ConflictReason("x".into(), Message("a and b are different fields".into())),
                    ConflictReason("y".into(), Message("they have differing arguments".into())),
                ]),
            ),
            "Fields \"dog\" conflict because subfields \"x\" conflict because a and b are \
             different fields and subfields \"y\" conflict because they have differing \
             arguments. Use different aliases on the fields to fetch both if this was intentional",
        );
    }
}
