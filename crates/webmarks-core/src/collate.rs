//! Collation keys for name sorting

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Build a collation key: NFKD, strip combining marks, lowercase.
///
/// Approximates locale collation for bookmark names: case-insensitive and
/// diacritic-insensitive, with all scripts preserved.
pub fn collation_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two names by collation key, with a code-point tiebreak so
/// equal-key names still order deterministically.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_folds_case() {
        assert_eq!(collation_key("Banana"), "banana");
        assert_eq!(collation_key("APPLE"), "apple");
    }

    #[test]
    fn key_strips_diacritics() {
        assert_eq!(collation_key("Études"), "etudes");
        assert_eq!(collation_key("naïve"), "naive");
    }

    #[test]
    fn mixed_case_names_interleave() {
        let mut names = vec!["Banana", "apple", "Cherry"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let mut names = vec!["Zebra", "Éclair", "Apple"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["Apple", "Éclair", "Zebra"]);
    }

    #[test]
    fn equal_keys_break_ties_by_code_point() {
        assert_eq!(compare_names("Apple", "apple"), Ordering::Less);
        assert_eq!(compare_names("apple", "apple"), Ordering::Equal);
    }
}
