//! Importance labels to [`Importance`].

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization as _;

use crate::models::Importance;

/// Lower-case and strip diacritics (NFD, combining marks removed).
pub fn fold_accents(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Map a free-text label to an importance level. Unknown labels are `None`.
pub fn normalize_importance(raw: Option<&str>) -> Option<Importance> {
    match fold_accents(raw?).as_str() {
        "alta" | "a" => Some(Importance::High),
        "media" | "m" => Some(Importance::Medium),
        "baixa" | "b" => Some(Importance::Low),
        "base" => Some(Importance::Base),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary() {
        assert_eq!(normalize_importance(Some("Alta")), Some(Importance::High));
        assert_eq!(normalize_importance(Some("A")), Some(Importance::High));
        assert_eq!(normalize_importance(Some("Média")), Some(Importance::Medium));
        assert_eq!(normalize_importance(Some("MEDIA")), Some(Importance::Medium));
        assert_eq!(normalize_importance(Some(" m ")), Some(Importance::Medium));
        assert_eq!(normalize_importance(Some("baixa")), Some(Importance::Low));
        assert_eq!(normalize_importance(Some("b")), Some(Importance::Low));
        assert_eq!(normalize_importance(Some("Base")), Some(Importance::Base));
    }

    #[test]
    fn test_unknown_is_none() {
        assert_eq!(normalize_importance(Some("x")), None);
        assert_eq!(normalize_importance(Some("")), None);
        assert_eq!(normalize_importance(Some("altíssima")), None);
        assert_eq!(normalize_importance(None), None);
    }

    #[test]
    fn test_fold_accents_decomposed_input() {
        // "Média" written with a combining acute accent
        assert_eq!(fold_accents("Me\u{301}dia"), "media");
        assert_eq!(fold_accents("  Física "), "fisica");
    }
}
