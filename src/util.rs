use std::borrow::Cow;

/// Converts a definition name into camel case, e.g. `comments_count` into
/// `commentsCount`.
pub fn to_camel_case(s: &str) -> Cow<'_, str> {
    if !s.trim_start_matches('_').contains('_') {
        return Cow::Borrowed(s.trim_start_matches('_'));
    }

    let mut dest = String::with_capacity(s.len());
    for (i, part) in s.trim_start_matches('_').split('_').enumerate() {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if i > 0 => {
                dest.extend(first.to_uppercase());
                dest.push_str(chars.as_str());
            }
            Some(_) => dest.push_str(part),
            None => {}
        }
    }
    Cow::Owned(dest)
}

/// Converts a camel-cased GraphQL name into snake case, e.g. `instrumentId`
/// into `instrument_id`.
pub fn to_snake_case(s: &str) -> String {
    let mut dest = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                dest.push('_');
            }
            dest.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            dest.push(c);
        }
    }
    dest
}

/// Derives the keyword a `loads` argument is delivered under: `x_id` becomes
/// `x` and `x_ids` becomes `xs`.
pub fn loads_keyword(definition_name: &str) -> String {
    if let Some(base) = definition_name.strip_suffix("_ids") {
        format!("{base}s")
    } else if let Some(base) = definition_name.strip_suffix("_id") {
        base.to_owned()
    } else if let Some(base) = definition_name.strip_suffix("Ids") {
        format!("{base}s")
    } else if let Some(base) = definition_name.strip_suffix("Id") {
        base.to_owned()
    } else {
        definition_name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{loads_keyword, to_camel_case, to_snake_case};

    #[test]
    fn camel_case() {
        assert_eq!(to_camel_case("test"), "test");
        assert_eq!(to_camel_case("_test"), "test");
        assert_eq!(to_camel_case("first_second"), "firstSecond");
        assert_eq!(to_camel_case("first_"), "first");
        assert_eq!(to_camel_case("a_b_c"), "aBC");
        assert_eq!(to_camel_case("alreadyCamel"), "alreadyCamel");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("instrumentId"), "instrument_id");
        assert_eq!(to_snake_case("requiredWithDefaultArg"), "required_with_default_arg");
        assert_eq!(to_snake_case("a1B"), "a1_b");
        assert_eq!(to_snake_case("plain"), "plain");
    }

    #[test]
    fn loads_keywords() {
        assert_eq!(loads_keyword("instrument_id"), "instrument");
        assert_eq!(loads_keyword("instrument_ids"), "instruments");
        assert_eq!(loads_keyword("starId"), "star");
        assert_eq!(loads_keyword("thing"), "thing");
    }
}
