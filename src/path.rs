//! Path normalization shared by catalog image references and remote listings.

/// Normalize an image path so catalog references and remote hrefs compare equal.
///
/// Backslashes become forward slashes, the path is lower-cased, and surrounding
/// whitespace and slashes are stripped. Whitespace uncovered by stripping a
/// slash is stripped too, so the result is always a fixed point:
/// `normalize_path(&normalize_path(s)) == normalize_path(s)`.
///
/// An empty result means the input carried no usable path.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .to_lowercase()
        .trim_matches(|c: char| c == '/' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_path;
    use proptest::prelude::*;

    #[test]
    fn converts_backslashes_and_case() {
        assert_eq!(normalize_path("A\\B/"), "a/b");
        assert_eq!(normalize_path("Images\\Large\\P1.JPG"), "images/large/p1.jpg");
    }

    #[test]
    fn strips_any_number_of_edge_slashes() {
        assert_eq!(normalize_path("///images/p1.jpg//"), "images/p1.jpg");
        assert_eq!(normalize_path("  /images/p1.jpg  "), "images/p1.jpg");
    }

    #[test]
    fn keeps_interior_slashes() {
        assert_eq!(normalize_path("a//b"), "a//b");
    }

    #[test]
    fn empty_and_slash_only_inputs_normalize_to_empty() {
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("////"), "");
        assert_eq!(normalize_path(" \\ / "), "");
    }

    #[test]
    fn whitespace_behind_a_slash_is_stripped() {
        assert_eq!(normalize_path("/ a.jpg"), "a.jpg");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[ a-zA-Z0-9_./\\\\ÄÖéß-]{0,48}") {
            let once = normalize_path(&s);
            prop_assert_eq!(normalize_path(&once), once);
        }
    }
}
