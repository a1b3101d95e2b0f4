//! SOQL literal and identifier helpers.
//!
//! Salesforce has no bind parameters for SOQL over REST, so every value that
//! ends up inside a query string goes through one of these functions.

use crate::error::{ErrorKind, Result};

/// Validates an sObject (or field) name before it is interpolated into a
/// query.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
/// Custom objects (`Invoice__c`) pass; anything that could alter the query
/// (whitespace, quotes, parentheses, dots) does not.
///
/// # Examples
///
/// ```
/// use crosscloud_source::soql::validate_identifier;
/// assert!(validate_identifier("Account").is_ok());
/// assert!(validate_identifier("Invoice__c").is_ok());
/// assert!(validate_identifier("Account) OR (Id != null").is_err());
/// assert!(validate_identifier("").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        _ => false,
    };
    if !valid {
        exn::bail!(ErrorKind::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}

/// Quotes a string as a SOQL literal, escaping backslashes and single quotes.
///
/// ```
/// use crosscloud_source::soql::quote;
/// assert_eq!(quote("0681"), "'0681'");
/// assert_eq!(quote("O'Brien"), r"'O\'Brien'");
/// ```
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Renders the body of an `IN (...)` clause.
///
/// ```
/// use crosscloud_source::soql::in_list;
/// assert_eq!(in_list(["a", "b"]), "'a', 'b'");
/// ```
pub fn in_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values.into_iter().map(quote).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Account")]
    #[case("Opportunity")]
    #[case("Invoice__c")]
    #[case("_private")]
    fn accepts_identifiers(#[case] name: &str) {
        assert_eq!(validate_identifier(name).unwrap(), name);
    }

    #[rstest]
    #[case("")]
    #[case("1Account")]
    #[case("Account Contact")]
    #[case("Account.Name")]
    #[case("Account'")]
    #[case("Account)")]
    fn rejects_non_identifiers(#[case] name: &str) {
        let err = validate_identifier(name).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidIdentifier(name.to_string()));
    }

    #[test]
    fn quote_escapes_backslash_before_quote() {
        assert_eq!(quote(r"a\'b"), r"'a\\\'b'");
    }

    #[test]
    fn empty_in_list() {
        assert_eq!(in_list(std::iter::empty::<&str>()), "");
    }
}
