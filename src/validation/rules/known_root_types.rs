use crate::{
    executor::Operation,
    schema::model::OperationType,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownRootTypes;

pub fn factory() -> KnownRootTypes {
    KnownRootTypes
}

impl<'a> Visitor<'a> for KnownRootTypes {
    fn enter_operation_definition(&mut self, ctx: &mut ValidatorContext<'a>, op: Operation<'a>) {
        if op.kind != OperationType::Query && ctx.warden.root_type(op.kind).is_none() {
            ctx.report_error(
                &format!("Schema is not configured for {}s", op.kind),
                &[op.position.into()],
            );
        }
    }
}
