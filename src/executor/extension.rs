//! Resolver middleware.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Outcome, ResolverContext};
use crate::schema::meta::Field;

/// Middleware wrapping the resolution of a field.
///
/// Extensions run in the order they were added to the field. Each one
/// decides whether to call [`Next::run()`], so it can adjust the arguments
/// first or short-circuit the resolver. [`FieldExtension::after_resolve()`]
/// runs on the way back, in reverse order, but only for extensions which
/// called their [`Next`].
///
/// ```rust
/// # use async_trait::async_trait;
/// # use trellis::{FieldExtension, FieldValue, Next, Outcome, executor::ResolverContext};
/// struct Upcase;
///
/// #[async_trait]
/// impl FieldExtension for Upcase {
///     async fn after_resolve(&self, _: &ResolverContext, value: Outcome) -> Outcome {
///         value.map(|v| match v.as_str() {
///             Some(s) => FieldValue::from(s.to_uppercase()),
///             None => v,
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait FieldExtension: Send + Sync + 'static {
    /// Adjusts the field this extension is added to, such as adding
    /// arguments. Must be idempotent.
    fn apply(&self, _field: &mut Field) {}

    /// Resolves the field, usually by calling `next`.
    async fn resolve(&self, ctx: ResolverContext, next: Next<'_>) -> Outcome {
        next.run(ctx).await
    }

    /// Transforms the value produced by the rest of the chain.
    async fn after_resolve(&self, _ctx: &ResolverContext, value: Outcome) -> Outcome {
        value
    }
}

pub(crate) type FinalResolver<'a> = &'a (dyn Fn(ResolverContext) -> super::Lazy<Outcome> + Send + Sync);

/// Rest of an extension chain, ending with the field's resolver.
pub struct Next<'a> {
    chain: &'a [Arc<dyn FieldExtension>],
    owner: Option<&'a Arc<dyn FieldExtension>>,
    resolver: FinalResolver<'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn FieldExtension>], resolver: FinalResolver<'a>) -> Self {
        Self {
            chain,
            owner: None,
            resolver,
        }
    }

    /// Runs the remaining extensions and the resolver.
    pub async fn run(self, ctx: ResolverContext) -> Outcome {
        let value = match self.chain.split_first() {
            Some((ext, rest)) => {
                let next = Next {
                    chain: rest,
                    owner: Some(ext),
                    resolver: self.resolver,
                };
                ext.resolve(ctx.clone(), next).await
            }
            None => (self.resolver)(ctx.clone()).resolve().await,
        };
        match self.owner {
            Some(owner) => owner.after_resolve(&ctx, value).await,
            None => value,
        }
    }
}
