//! [`graphql_input_value!`] macro implementation.
//!
//! [`graphql_input_value!`]: graphql_input_value

/// Constructs an [`InputValue`](crate::InputValue) via JSON-like syntax.
///
/// Bare identifiers are enum literals and `@name` is a variable reference.
/// Wrap an identifier in parentheses to treat it as an expression.
///
/// ```rust
/// # use trellis::{graphql_input_value, InputValue};
/// let page = 2;
/// let v: InputValue = graphql_input_value!({
///     "genre": FICTION,
///     "page": (page),
///     "offset": -1,
///     "after": @cursor,
/// });
/// assert_eq!(v.to_string(), r#"{genre: FICTION, page: 2, offset: -1, after: $cursor}"#);
/// ```
#[macro_export]
macro_rules! graphql_input_value {
    ///////////
    // Array //
    ///////////

    // Done with trailing comma.
    (@@array [$($elems:expr,)*]) => {
        $crate::InputValue::List(vec![$( $elems, )*])
    };

    // Done without trailing comma.
    (@@array [$($elems:expr),*]) => {
        $crate::InputValue::List(vec![$( $elems, )*])
    };

    // Next element is `null`.
    (@@array [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!(null)] $($rest)*
        )
    };

    // Next element is `None`.
    (@@array [$($elems:expr,)*] None $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!(None)] $($rest)*
        )
    };

    // Next element is a variable.
    (@@array [$($elems:expr,)*] @$var:ident $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!(@$var)] $($rest)*
        )
    };

    // Next element is a list.
    (@@array [$($elems:expr,)*] [$($array:tt)*] $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!([$($array)*])] $($rest)*
        )
    };

    // Next element is an object.
    (@@array [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!({$($map)*})] $($rest)*
        )
    };

    // Next element is an enum followed by a comma.
    (@@array [$($elems:expr,)*] $ident:ident, $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!($ident),] $($rest)*
        )
    };

    // Last element is an enum with no trailing comma.
    (@@array [$($elems:expr,)*] $last:ident) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!($last)]
        )
    };

    // Next element is an expression followed by a comma.
    (@@array [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!($next),] $($rest)*
        )
    };

    // Last element is an expression with no trailing comma.
    (@@array [$($elems:expr,)*] $last:expr) => {
        $crate::graphql_input_value!(
            @@array [$($elems,)* $crate::graphql_input_value!($last)]
        )
    };

    // Comma after the most recent element.
    (@@array [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::graphql_input_value!(@@array [$($elems,)*] $($rest)*)
    };

    // Unexpected token after the most recent element.
    (@@array [$($elems:expr),*] $unexpected:tt $($rest:tt)*) => {
        $crate::graphql_input_value!(@@unexpected $unexpected)
    };

    ////////////
    // Object //
    ////////////

    // Done.
    (@@object $object:ident () () ()) => {};

    // Insert the current entry followed by a trailing comma.
    (@@object $object:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        $object.push((::std::string::String::from($($key)+), $value));
        $crate::graphql_input_value!(@@object $object () ($($rest)*) ($($rest)*));
    };

    // Current entry followed by an unexpected token.
    (@@object $object:ident [$($key:tt)+] ($value:expr) $unexpected:tt $($rest:tt)*) => {
        $crate::graphql_input_value!(@@unexpected $unexpected);
    };

    // Insert the last entry without a trailing comma.
    (@@object $object:ident [$($key:tt)+] ($value:expr)) => {
        $object.push((::std::string::String::from($($key)+), $value));
    };

    // Next value is `null`.
    (@@object $object:ident ($($key:tt)+) (: null $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!(null)) $($rest)*
        );
    };

    // Next value is `None`.
    (@@object $object:ident ($($key:tt)+) (: None $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!(None)) $($rest)*
        );
    };

    // Next value is a variable.
    (@@object $object:ident ($($key:tt)+) (: @$var:ident $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!(@$var)) $($rest)*
        );
    };

    // Next value is a list.
    (@@object $object:ident ($($key:tt)+) (: [$($array:tt)*] $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!([$($array)*])) $($rest)*
        );
    };

    // Next value is an object.
    (@@object $object:ident ($($key:tt)+) (: {$($map:tt)*} $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!({$($map)*})) $($rest)*
        );
    };

    // Next value is an enum followed by a comma.
    (@@object $object:ident ($($key:tt)+) (: $ident:ident , $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!($ident)) , $($rest)*
        );
    };

    // Last value is an enum with no trailing comma.
    (@@object $object:ident ($($key:tt)+) (: $last:ident) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!($last))
        );
    };

    // Next value is an expression followed by a comma.
    (@@object $object:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!($value)) , $($rest)*
        );
    };

    // Last value is an expression with no trailing comma.
    (@@object $object:ident ($($key:tt)+) (: $value:expr) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object [$($key)+] ($crate::graphql_input_value!($value))
        );
    };

    // Missing value for the last entry.
    (@@object $object:ident ($($key:tt)+) (:) $copy:tt) => {
        $crate::graphql_input_value!();
    };

    // Missing colon and value for the last entry.
    (@@object $object:ident ($($key:tt)+) () $copy:tt) => {
        $crate::graphql_input_value!();
    };

    // Misplaced colon.
    (@@object $object:ident () (: $($rest:tt)*) ($colon:tt $($copy:tt)*)) => {
        $crate::graphql_input_value!(@@unexpected $colon);
    };

    // Found a comma inside a key.
    (@@object $object:ident ($($key:tt)*) (, $($rest:tt)*) ($comma:tt $($copy:tt)*)) => {
        $crate::graphql_input_value!(@@unexpected $comma);
    };

    // Key is fully parenthesized.
    (@@object $object:ident () (($key:expr) : $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(@@object $object ($key) (: $($rest)*) (: $($rest)*));
    };

    // Refuse to absorb colon token into key expression.
    (@@object $object:ident ($($key:tt)*) (: $($unexpected:tt)+) $copy:tt) => {
        $crate::graphql_input_value!(@@unexpected $($unexpected)+);
    };

    // Munch a token into the current key.
    (@@object $object:ident ($($key:tt)*) ($tt:tt $($rest:tt)*) $copy:tt) => {
        $crate::graphql_input_value!(
            @@object $object ($($key)* $tt) ($($rest)*) ($($rest)*)
        );
    };

    ////////////
    // Errors //
    ////////////

    (@@unexpected) => {};

    //////////////
    // Defaults //
    //////////////

    ([ $($arr:tt)* ]$(,)?) => {
        $crate::graphql_input_value!(@@array [] $($arr)*)
    };

    ({}$(,)?) => {
        $crate::InputValue::Object(vec![])
    };

    ({ $($map:tt)+ }$(,)?) => {
        $crate::InputValue::Object({
            let mut object = ::std::vec::Vec::<(::std::string::String, $crate::InputValue)>::new();
            $crate::graphql_input_value!(@@object object () ($($map)*) ($($map)*));
            object
        })
    };

    (null$(,)?) => ($crate::InputValue::Null);

    (None$(,)?) => ($crate::InputValue::Null);

    (true$(,)?) => ($crate::InputValue::from(true));

    (false$(,)?) => ($crate::InputValue::from(false));

    (@$var:ident$(,)?) => ($crate::InputValue::Variable(stringify!($var).into()));

    ($enum:ident$(,)?) => ($crate::InputValue::enum_value(stringify!($enum)));

    (($e:expr)$(,)?) => ($crate::InputValue::from($e));

    ($e:expr$(,)?) => ($crate::InputValue::from($e));
}
