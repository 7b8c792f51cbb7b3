//! Stages a field goes through before its value is completed.

use std::sync::Arc;

use arcstr::ArcStr;
use futures::future::join_all;

use super::{
    Authorization, FieldError, FieldValue, LoadApplicationObjectFailedError, Outcome,
    ResolverContext, UnauthorizedError,
    engine::Executor,
    extension::{FinalResolver, Next},
    lazy::Lazy,
};
use crate::{
    ast::InputValue,
    schema::meta::{Argument, Field, MetaType},
};

/// Runs every stage of `field` on `ctx`, then hands errors to the schema's
/// rescue handlers.
pub(crate) async fn run(
    exec: &Executor<'_>,
    owner: &MetaType,
    field: &Arc<Field>,
    ctx: ResolverContext,
    subscription_root: bool,
) -> Outcome {
    let outcome = stages(exec, owner, field, ctx, subscription_root).await;
    rescue(exec, outcome)
}

async fn stages(
    exec: &Executor<'_>,
    owner: &MetaType,
    field: &Arc<Field>,
    mut ctx: ResolverContext,
    subscription_root: bool,
) -> Outcome {
    for arg in &field.arguments {
        let key = arg.keyword_name();
        let Some(mut value) = ctx.args_mut().remove(&key) else {
            continue;
        };

        if let Some(prepare) = &arg.prepare {
            value = match prepare(value, exec.context).resolve().await {
                Outcome::Value(v) => v,
                other => {
                    tracing::trace!(field = %field.path(), argument = %arg.name, "prepare short-circuited");
                    return other;
                }
            };
        }

        if let Some(type_name) = arg.loads_type() {
            if !value.is_null() {
                value = match load(exec, arg, type_name, value).await {
                    Outcome::Value(v) => v,
                    other => {
                        tracing::trace!(field = %field.path(), argument = %arg.name, "load short-circuited");
                        return other;
                    }
                };
            }
        }

        if let Some(authorized) = &arg.authorized {
            match authorized(ctx.object(), &value, exec.context).resolve().await {
                Ok(true) => {}
                Ok(false) => return unauthorized_field(exec, owner, field, ctx.object()),
                Err(e) => return Outcome::Err(e),
            }
        }

        ctx.args_mut().insert(key, value);
    }

    if let Some(authorized) = &field.authorized {
        match authorized(ctx.object(), ctx.args(), exec.context).resolve().await {
            Ok(Authorization::Allowed) => {}
            Ok(Authorization::Denied) => return unauthorized_field(exec, owner, field, ctx.object()),
            Ok(Authorization::Resolved(v)) => return Outcome::Value(v),
            Err(e) => return Outcome::Err(e),
        }
    }

    let default = move |ctx: ResolverContext| default_resolver(&ctx, subscription_root);
    let resolver: FinalResolver<'_> = match &field.resolver {
        Some(r) => &**r,
        None => &default,
    };
    Next::new(&field.extensions, resolver).run(ctx).await
}

/// Resolver of fields declaring none: a lookup of the field's key on the
/// parent, or the event on subscription roots.
fn default_resolver(ctx: &ResolverContext, subscription_root: bool) -> Lazy<Outcome> {
    if subscription_root {
        return Lazy::ready(
            ctx.context()
                .subscription_event()
                .cloned()
                .map_or(Outcome::NoUpdate, Outcome::Value),
        );
    }
    let field = ctx.field();
    let object = ctx.object();
    let found = object.get(field.method_key()).or_else(|| {
        if field.method.is_none() {
            object.get(&field.name)
        } else {
            None
        }
    });
    Lazy::ready(match found {
        Some(v) => Outcome::Value(v),
        None if matches!(object.untagged(), FieldValue::Opaque(_)) => Outcome::Err(FieldError::from(
            format!(
                "Failed to implement {}, tried a `{}` entry on an opaque object",
                field.path(),
                field.method_key(),
            ),
        )),
        None => Outcome::Value(FieldValue::Null),
    })
}

/// Loads the application objects an argument identifies.
async fn load(exec: &Executor<'_>, arg: &Argument, type_name: &ArcStr, ids: FieldValue) -> Outcome {
    if arg.arg_type.is_list() {
        let Some(ids) = ids.to_list() else {
            return load_one(exec, arg, type_name, ids).await;
        };
        let loaded = join_all(ids.into_iter().map(|id| load_one(exec, arg, type_name, id))).await;
        let mut out = Vec::with_capacity(loaded.len());
        for outcome in loaded {
            match outcome {
                Outcome::Value(v) => out.push(v),
                other => return other,
            }
        }
        return Outcome::Value(FieldValue::List(out));
    }
    load_one(exec, arg, type_name, ids).await
}

async fn load_one(exec: &Executor<'_>, arg: &Argument, type_name: &ArcStr, id: FieldValue) -> Outcome {
    let schema = exec.warden.schema();
    let Some(object_from_id) = &schema.hooks.object_from_id else {
        return Outcome::Err(FieldError::from("Schema doesn't define `object_from_id`"));
    };
    let meta = match exec.warden.get_type(type_name) {
        Ok(Some(meta)) => meta,
        Ok(None) => return Outcome::Err(FieldError::from(format!("Type '{type_name}' isn't visible"))),
        Err(e) => return Outcome::Err(FieldError::from(e)),
    };

    let found = match object_from_id(&id, meta, exec.context).resolve().await {
        Ok(found) => found,
        Err(e) => return Outcome::Err(e),
    };
    let concrete = found.as_ref().and_then(|object| {
        if meta.is_abstract() {
            exec.concrete_type_name(meta, object)
                .filter(|name| exec.warden.is_possible_type(meta, name))
                .and_then(|name| exec.warden.get_type(&name).ok().flatten())
        } else {
            match object.type_tag() {
                Some(tag) if tag != meta.name() => None,
                _ => Some(meta),
            }
        }
    });

    let (Some(object), Some(concrete)) = (found.clone(), concrete) else {
        let error = LoadApplicationObjectFailedError {
            argument: arg.name.clone(),
            id: id.to_plain().map_or(InputValue::Null, InputValue::from),
            type_name: type_name.clone(),
            object: found,
        };
        return match &schema.hooks.load_application_object_failed {
            Some(hook) => hook(error, exec.context),
            None => Outcome::Err(FieldError::from_source(error)),
        };
    };
    authorize_object(exec, concrete, object).await
}

/// Runs the `authorized` check of an object type on one of its objects.
pub(crate) async fn authorize_object(exec: &Executor<'_>, meta: &MetaType, object: FieldValue) -> Outcome {
    let MetaType::Object(ty) = meta else {
        return Outcome::Value(object);
    };
    let Some(authorized) = &ty.authorized else {
        return Outcome::Value(object);
    };
    match authorized(&object, exec.context).resolve().await {
        Ok(true) => Outcome::Value(object),
        Ok(false) => {
            let error = UnauthorizedError {
                object,
                type_name: ty.name.clone(),
                field: None,
            };
            match &exec.warden.schema().hooks.unauthorized_object {
                Some(hook) => {
                    let outcome = hook(error, exec.context);
                    if matches!(outcome, Outcome::Err(_)) {
                        tracing::warn!(r#type = %ty.name, "unauthorized object reported as an error");
                    }
                    outcome
                }
                None => {
                    tracing::trace!(r#type = %ty.name, "object unauthorized");
                    Outcome::Unauthorized
                }
            }
        }
        Err(e) => Outcome::Err(e),
    }
}

fn unauthorized_field(exec: &Executor<'_>, owner: &MetaType, field: &Field, object: &FieldValue) -> Outcome {
    let error = UnauthorizedError {
        object: object.clone(),
        type_name: owner.name().clone(),
        field: Some(field.name.clone()),
    };
    match &exec.warden.schema().hooks.unauthorized_field {
        Some(hook) => {
            let outcome = hook(error, exec.context);
            if matches!(outcome, Outcome::Err(_)) {
                tracing::warn!(field = %field.path(), "unauthorized field reported as an error");
            }
            outcome
        }
        None => Outcome::Unauthorized,
    }
}

/// Gives the rescue handlers a chance to turn an error into another outcome.
fn rescue(exec: &Executor<'_>, outcome: Outcome) -> Outcome {
    let Outcome::Err(e) = outcome else {
        return outcome;
    };
    if let Some(source) = e.source() {
        for handler in &exec.warden.schema().hooks.rescues {
            if let Some(handled) = handler(source, exec.context) {
                return handled;
            }
        }
    }
    Outcome::Err(e)
}
