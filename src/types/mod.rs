pub(crate) mod coercion;
pub(crate) mod scalars;
