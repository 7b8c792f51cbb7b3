//! Declarative macros for building values in a JSON-like syntax.

#[macro_use]
mod graphql_value;
#[macro_use]
mod graphql_input_value;
#[macro_use]
mod graphql_vars;
