//! [`graphql_value!`] macro implementation.
//!
//! [`graphql_value!`]: graphql_value

/// Constructs a [`Value`](crate::Value) via JSON-like syntax.
///
/// Nested values may be literals, `null`, lists, objects or any expression
/// convertible into a [`Value`](crate::Value).
///
/// ```rust
/// # use trellis::{graphql_value, Value};
/// let code = 200;
/// let v: Value = graphql_value!({
///     "code": code,
///     "offset": -3,
///     "payload": ["key", null, 1.5],
/// });
/// assert_eq!(
///     v.to_string(),
///     r#"{"code": 200, "offset": -3, "payload": ["key", null, 1.5]}"#,
/// );
/// ```
#[macro_export]
macro_rules! graphql_value {
    ///////////
    // Array //
    ///////////

    // Done with trailing comma.
    (@array [$($elems:expr,)*]) => {
        $crate::Value::list(vec![$( $elems, )*])
    };

    // Done without trailing comma.
    (@array [$($elems:expr),*]) => {
        $crate::Value::list(vec![$( $elems, )*])
    };

    // Next element is `null`.
    (@array [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!(null)] $($rest)*
        )
    };

    // Next element is `None`.
    (@array [$($elems:expr,)*] None $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!(None)] $($rest)*
        )
    };

    // Next element is a list.
    (@array [$($elems:expr,)*] [$($array:tt)*] $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!([$($array)*])] $($rest)*
        )
    };

    // Next element is an object.
    (@array [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!({$($map)*})] $($rest)*
        )
    };

    // Next element is an expression followed by a comma.
    (@array [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!($next),] $($rest)*
        )
    };

    // Last element is an expression with no trailing comma.
    (@array [$($elems:expr,)*] $last:expr) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!($last)]
        )
    };

    // Comma after the most recent element.
    (@array [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::graphql_value!(@array [$($elems,)*] $($rest)*)
    };

    // Unexpected token after the most recent element.
    (@array [$($elems:expr),*] $unexpected:tt $($rest:tt)*) => {
        $crate::graphql_value!(@unexpected $unexpected)
    };

    ////////////
    // Object //
    ////////////

    // Done.
    (@object $object:ident () () ()) => {};

    // Insert the current entry followed by a trailing comma.
    (@object $object:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        let _ = $object.add_field(($($key)+), $value);
        $crate::graphql_value!(@object $object () ($($rest)*) ($($rest)*));
    };

    // Current entry followed by an unexpected token.
    (@object $object:ident [$($key:tt)+] ($value:expr) $unexpected:tt $($rest:tt)*) => {
        $crate::graphql_value!(@unexpected $unexpected);
    };

    // Insert the last entry without a trailing comma.
    (@object $object:ident [$($key:tt)+] ($value:expr)) => {
        let _ = $object.add_field(($($key)+), $value);
    };

    // Next value is `null`.
    (@object $object:ident ($($key:tt)+) (: null $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!(null)) $($rest)*
        );
    };

    // Next value is `None`.
    (@object $object:ident ($($key:tt)+) (: None $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!(None)) $($rest)*
        );
    };

    // Next value is a list.
    (@object $object:ident ($($key:tt)+) (: [$($array:tt)*] $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!([$($array)*])) $($rest)*
        );
    };

    // Next value is an object.
    (@object $object:ident ($($key:tt)+) (: {$($map:tt)*} $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!({$($map)*})) $($rest)*
        );
    };

    // Next value is an expression followed by a comma.
    (@object $object:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!($value)) , $($rest)*
        );
    };

    // Last value is an expression with no trailing comma.
    (@object $object:ident ($($key:tt)+) (: $value:expr) $copy:tt) => {
        $crate::graphql_value!(
            @object $object [$($key)+] ($crate::graphql_value!($value))
        );
    };

    // Missing value for the last entry.
    (@object $object:ident ($($key:tt)+) (:) $copy:tt) => {
        $crate::graphql_value!();
    };

    // Missing colon and value for the last entry.
    (@object $object:ident ($($key:tt)+) () $copy:tt) => {
        $crate::graphql_value!();
    };

    // Misplaced colon.
    (@object $object:ident () (: $($rest:tt)*) ($colon:tt $($copy:tt)*)) => {
        $crate::graphql_value!(@unexpected $colon);
    };

    // Found a comma inside a key.
    (@object $object:ident ($($key:tt)*) (, $($rest:tt)*) ($comma:tt $($copy:tt)*)) => {
        $crate::graphql_value!(@unexpected $comma);
    };

    // Key is fully parenthesized.
    (@object $object:ident () (($key:expr) : $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(@object $object ($key) (: $($rest)*) (: $($rest)*));
    };

    // Refuse to absorb colon token into key expression.
    (@object $object:ident ($($key:tt)*) (: $($unexpected:tt)+) $copy:tt) => {
        $crate::graphql_value!(@unexpected $($unexpected)+);
    };

    // Munch a token into the current key.
    (@object $object:ident ($($key:tt)*) ($tt:tt $($rest:tt)*) $copy:tt) => {
        $crate::graphql_value!(
            @object $object ($($key)* $tt) ($($rest)*) ($($rest)*)
        );
    };

    ////////////
    // Errors //
    ////////////

    (@unexpected) => {};

    //////////////
    // Defaults //
    //////////////

    ([ $($arr:tt)* ]$(,)?) => {
        $crate::graphql_value!(@array [] $($arr)*)
    };

    ({}$(,)?) => {
        $crate::Value::object($crate::Object::with_capacity(0))
    };

    ({ $($map:tt)+ }$(,)?) => {
        $crate::Value::object({
            let mut object = $crate::Object::with_capacity(0);
            $crate::graphql_value!(@object object () ($($map)*) ($($map)*));
            object
        })
    };

    (null$(,)?) => ($crate::Value::null());

    (None$(,)?) => ($crate::Value::null());

    ($e:expr$(,)?) => ($crate::Value::from($e));
}

#[cfg(test)]
mod tests {
    use crate::{Object, Value};

    type V = Value;

    #[test]
    fn scalars() {
        let val = 42;
        assert_eq!(graphql_value!(null), V::Null);
        assert_eq!(graphql_value!(1), V::scalar(1));
        assert_eq!(graphql_value!(-7), V::scalar(-7));
        assert_eq!(graphql_value!("val"), V::scalar("val"));
        assert_eq!(graphql_value!(1.34), V::scalar(1.34));
        assert_eq!(graphql_value!(false), V::scalar(false));
        assert_eq!(graphql_value!(1 + 2), V::scalar(3));
        assert_eq!(graphql_value!(val), V::scalar(42));
    }

    #[test]
    fn lists() {
        assert_eq!(graphql_value!([]), V::list(vec![]));
        assert_eq!(graphql_value!([null]), V::list(vec![V::Null]));
        assert_eq!(
            graphql_value!([1, [-2], 3,]),
            V::list(vec![V::scalar(1), V::list(vec![V::scalar(-2)]), V::scalar(3)]),
        );
        assert_eq!(
            graphql_value!([{"k": 1}, null]),
            V::list(vec![graphql_value!({"k": 1}), V::Null]),
        );
    }

    #[test]
    fn objects() {
        let mut expected = Object::with_capacity(2);
        let _ = expected.add_field("key", V::scalar(-1));
        let _ = expected.add_field("list", V::list(vec![V::scalar(1), V::Null]));
        assert_eq!(graphql_value!({"key": -1, "list": [1, null],}), V::object(expected));
        assert_eq!(graphql_value!({}), V::object(Object::with_capacity(0)));
    }
}
