//! Column resolution by alias list.
//!
//! Keys and aliases go through the same [`normalize_header`]. For each alias
//! in order, an exact key match is tried first, then the first key that
//! contains the alias or is contained by it. The first alias that yields a
//! non-empty value wins.

use crate::models::{normalize_header, RawRow};

/// Find the value of the first alias that resolves to a non-empty cell.
///
/// The returned value is trimmed.
pub fn resolve<'a, S: AsRef<str>>(row: &'a RawRow, aliases: &[S]) -> Option<&'a str> {
    for alias in aliases {
        let alias = normalize_header(alias.as_ref());
        if alias.is_empty() {
            continue;
        }

        if let Some(value) = non_empty(row.iter().find(|(key, _)| *key == alias)) {
            return Some(value);
        }

        let partial = row
            .iter()
            .find(|(key, _)| key.contains(alias.as_str()) || alias.contains(key));
        if let Some(value) = non_empty(partial) {
            return Some(value);
        }
    }
    None
}

/// Whether any alias matches any key, ignoring cell contents.
pub fn has_column<S: AsRef<str>>(row: &RawRow, aliases: &[S]) -> bool {
    aliases.iter().any(|alias| {
        let alias = normalize_header(alias.as_ref());
        !alias.is_empty()
            && row
                .keys()
                .any(|key| key == alias || key.contains(alias.as_str()) || alias.contains(key))
    })
}

fn non_empty<'a>(entry: Option<(&'a str, &'a str)>) -> Option<&'a str> {
    entry
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
