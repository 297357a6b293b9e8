//! Attribute-name to column-name translation.
//!
//! Request attributes use `camelCase` (`firstName`, `releaseDate`) while the
//! store uses `snake_case` columns (`first_name`, `release_date`).

/// Convert a mixed-case attribute name to its storage column name.
///
/// A boundary is inserted before an upper-case character when the previous
/// character is lower-case or a digit, and before the last capital of an
/// acronym when a lower-case continuation follows it. Runs of capitals
/// otherwise stay together.
///
/// ```
/// use filmotek_core::to_column_name;
///
/// assert_eq!(to_column_name("firstName"), "first_name");
/// assert_eq!(to_column_name("HTTPStatus"), "http_status");
/// ```
pub fn to_column_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();

                let should_underscore = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(char::is_lowercase));

                if should_underscore {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
