//! Explicit deferred values and hook outcomes.

use std::{fmt, future::Future};

use futures::{FutureExt as _, future::BoxFuture};

use super::{FieldError, FieldResult, FieldValue};

/// A value which is either available right away or produced by a future.
///
/// Every suspension point of field resolution goes through this type. The
/// executor checks [`Lazy::is_pending()`] and awaits [`Lazy::resolve()`]
/// without blocking sibling fields.
pub enum Lazy<T> {
    /// Already computed value.
    Ready(T),

    /// Value produced once the future completes.
    Pending(BoxFuture<'static, T>),
}

impl<T: Send + 'static> Lazy<T> {
    /// Wraps a ready value.
    pub fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    /// Wraps a future.
    pub fn pending(fut: impl Future<Output = T> + Send + 'static) -> Self {
        Self::Pending(fut.boxed())
    }

    /// Indicates whether resolving this value requires awaiting.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Returns the ready value without awaiting, if it's there.
    pub fn into_ready(self) -> Result<T, Self> {
        match self {
            Self::Ready(v) => Ok(v),
            pending @ Self::Pending(_) => Err(pending),
        }
    }

    /// Produces the value.
    pub async fn resolve(self) -> T {
        match self {
            Self::Ready(v) => v,
            Self::Pending(fut) => fut.await,
        }
    }

    /// Maps the eventual value.
    pub fn map<U: Send + 'static>(self, f: impl FnOnce(T) -> U + Send + 'static) -> Lazy<U> {
        match self {
            Self::Ready(v) => Lazy::Ready(f(v)),
            Self::Pending(fut) => Lazy::Pending(fut.map(f).boxed()),
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Lazy::Ready(..)"),
            Self::Pending(_) => f.write_str("Lazy::Pending(..)"),
        }
    }
}

impl<T: Send + 'static> From<T> for Lazy<T> {
    fn from(v: T) -> Self {
        Self::Ready(v)
    }
}

/// Result of a resolver or a hook.
///
/// The silent outcomes are values of this type, not errors to be caught.
#[derive(Clone, Debug)]
pub enum Outcome<T = FieldValue> {
    /// Regular result.
    Value(T),

    /// Authorization failed. The field becomes `null` without an error entry.
    Unauthorized,

    /// No update should be delivered, used by subscriptions. The field becomes
    /// `null` in ordinary execution.
    NoUpdate,

    /// A user-visible error recorded with the field's path.
    Err(FieldError),
}

impl<T> Outcome<T> {
    /// Converts this outcome into a [`FieldResult`], treating silent outcomes
    /// as [`None`].
    pub fn into_result(self) -> FieldResult<Option<T>> {
        match self {
            Self::Value(v) => Ok(Some(v)),
            Self::Unauthorized | Self::NoUpdate => Ok(None),
            Self::Err(e) => Err(e),
        }
    }

    /// Maps the regular result.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Value(v) => Outcome::Value(f(v)),
            Self::Unauthorized => Outcome::Unauthorized,
            Self::NoUpdate => Outcome::NoUpdate,
            Self::Err(e) => Outcome::Err(e),
        }
    }
}

impl<T: Into<FieldValue>> From<FieldResult<T>> for Outcome {
    fn from(r: FieldResult<T>) -> Self {
        match r {
            Ok(v) => Self::Value(v.into()),
            Err(e) => Self::Err(e),
        }
    }
}

impl From<FieldValue> for Outcome {
    fn from(v: FieldValue) -> Self {
        Self::Value(v)
    }
}

impl From<FieldError> for Outcome {
    fn from(e: FieldError) -> Self {
        Self::Err(e)
    }
}

/// Decision of a field-level `authorized` hook.
#[derive(Clone, Debug)]
pub enum Authorization {
    /// Continue with the resolver.
    Allowed,

    /// Stop. Routed through the schema's `unauthorized_field` hook.
    Denied,

    /// Skip the resolver and use this value as the field's result. A `null`
    /// payload is a legitimate result here.
    Resolved(FieldValue),
}

impl From<bool> for Authorization {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}
