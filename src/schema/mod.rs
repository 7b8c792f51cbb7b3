//! Schema definition, filtering and SDL.

pub mod builder;
pub mod directives;
pub mod loader;
pub mod meta;
pub mod model;
pub mod printer;
pub mod relay;
pub mod visibility;
