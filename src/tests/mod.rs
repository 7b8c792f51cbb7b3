//! Library tests and fixtures

mod authorization;
pub(crate) mod util;
mod visibility;
