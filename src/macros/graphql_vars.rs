//! [`graphql_vars!`] macro implementation.
//!
//! [`graphql_vars!`]: graphql_vars

/// Constructs [`Variables`](crate::Variables) via JSON-like syntax.
///
/// Values follow the [`graphql_input_value!`](crate::graphql_input_value)
/// syntax.
///
/// ```rust
/// # use trellis::{graphql_vars, InputValue};
/// let vars = graphql_vars! {"id": "1", "ids": [1, 2], "genre": FICTION};
/// assert_eq!(vars.get("id"), Some(&InputValue::from("1")));
/// assert_eq!(vars.get("genre"), Some(&InputValue::enum_value("FICTION")));
/// ```
#[macro_export]
macro_rules! graphql_vars {
    ////////////
    // Object //
    ////////////

    // Done.
    (@object $object:ident () () ()) => {};

    // Insert the current entry followed by a trailing comma.
    (@object $object:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        let _ = $object.insert(::std::string::String::from($($key)+), $value);
        $crate::graphql_vars! {@object $object () ($($rest)*) ($($rest)*)};
    };

    // Current entry followed by an unexpected token.
    (@object $object:ident [$($key:tt)+] ($value:expr) $unexpected:tt $($rest:tt)*) => {
        $crate::graphql_vars! {@unexpected $unexpected};
    };

    // Insert the last entry without a trailing comma.
    (@object $object:ident [$($key:tt)+] ($value:expr)) => {
        let _ = $object.insert(::std::string::String::from($($key)+), $value);
    };

    // Next value is `null`.
    (@object $object:ident ($($key:tt)+) (: null $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!(null)) $($rest)*
        };
    };

    // Next value is `None`.
    (@object $object:ident ($($key:tt)+) (: None $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!(None)) $($rest)*
        };
    };

    // Next value is a variable.
    (@object $object:ident ($($key:tt)+) (: @$var:ident $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!(@$var)) $($rest)*
        };
    };

    // Next value is a list.
    (@object $object:ident ($($key:tt)+) (: [$($array:tt)*] $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!([$($array)*])) $($rest)*
        };
    };

    // Next value is an object.
    (@object $object:ident ($($key:tt)+) (: {$($map:tt)*} $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!({$($map)*})) $($rest)*
        };
    };

    // Next value is an enum followed by a comma.
    (@object $object:ident ($($key:tt)+) (: $ident:ident , $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!($ident)) , $($rest)*
        };
    };

    // Last value is an enum with no trailing comma.
    (@object $object:ident ($($key:tt)+) (: $last:ident) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!($last))
        };
    };

    // Next value is an expression followed by a comma.
    (@object $object:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!($value)) , $($rest)*
        };
    };

    // Last value is an expression with no trailing comma.
    (@object $object:ident ($($key:tt)+) (: $value:expr) $copy:tt) => {
        $crate::graphql_vars! {
            @object $object [$($key)+] ($crate::graphql_input_value!($value))
        };
    };

    // Missing value for the last entry.
    (@object $object:ident ($($key:tt)+) (:) $copy:tt) => {
        $crate::graphql_vars! {};
    };

    // Missing colon and value for the last entry.
    (@object $object:ident ($($key:tt)+) () $copy:tt) => {
        $crate::graphql_vars! {};
    };

    // Misplaced colon.
    (@object $object:ident () (: $($rest:tt)*) ($colon:tt $($copy:tt)*)) => {
        $crate::graphql_vars! {@unexpected $colon};
    };

    // Found a comma inside a key.
    (@object $object:ident ($($key:tt)*) (, $($rest:tt)*) ($comma:tt $($copy:tt)*)) => {
        $crate::graphql_vars! {@unexpected $comma};
    };

    // Key is fully parenthesized.
    (@object $object:ident () (($key:expr) : $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {@object $object ($key) (: $($rest)*) (: $($rest)*)};
    };

    // Refuse to absorb colon token into key expression.
    (@object $object:ident ($($key:tt)*) (: $($unexpected:tt)+) $copy:tt) => {
        $crate::graphql_vars! {@unexpected $($unexpected)+};
    };

    // Munch a token into the current key.
    (@object $object:ident ($($key:tt)*) ($tt:tt $($rest:tt)*) $copy:tt) => {
        $crate::graphql_vars! {@object $object ($($key)* $tt) ($($rest)*) ($($rest)*)};
    };

    ////////////
    // Errors //
    ////////////

    (@unexpected) => {};

    //////////////
    // Defaults //
    //////////////

    () => {{ $crate::Variables::new() }};

    ( $($map:tt)+ ) => {{
        let mut object = $crate::Variables::new();
        $crate::graphql_vars! {@object object () ($($map)*) ($($map)*)};
        object
    }};
}
