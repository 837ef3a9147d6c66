// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Identifier and name normalization.

/// Returns true if `identifier` is an email address rather than a phone number.
pub fn is_email(identifier: &str) -> bool {
    identifier.contains('@')
}

/// Canonical form of a message handle, used as the contact cache key.
///
/// Emails are returned unchanged. Phone numbers lose whitespace, `+`, `-`
/// and parentheses; an 11-digit number starting with `1` loses its US
/// country code when `strip_us_country_code` is set. Other international
/// numbers keep their digits as they are.
///
/// # Example
/// ```
/// use recover_core::contact::normalize_identifier;
///
/// assert_eq!(normalize_identifier("+1 (555) 123-4567", true), "5551234567");
/// assert_eq!(normalize_identifier("+44 20 7946 0958", true), "442079460958");
/// assert_eq!(normalize_identifier("jo@example.com", true), "jo@example.com");
/// ```
pub fn normalize_identifier(identifier: &str, strip_us_country_code: bool) -> String {
    if is_email(identifier) {
        return identifier.to_string();
    }

    let stripped: String = identifier
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '+' | '-' | '(' | ')'))
        .collect();

    let us_with_country_code = stripped.len() == 11
        && stripped.starts_with('1')
        && stripped.bytes().all(|b| b.is_ascii_digit());
    if strip_us_country_code && us_with_country_code {
        stripped[1..].to_string()
    } else {
        stripped
    }
}

/// Uppercase first letter of every word, ignoring non-letters.
///
/// Returns an empty string when the name has no letters (e.g. a bare
/// phone number).
pub fn initials(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphabetic()))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Escapes `%`, `_` and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
