//! Slug derivation for article URLs

/// Convert a title to a slug (URL-friendly format)
///
/// # Examples
///
/// ```
/// use minipress_common::slug::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Test Article"), "test-article");
/// assert_eq!(slugify("Special!@#Characters"), "special-characters");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'a'..='z' | '0'..='9' => ch,
            _ => '-',
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Check whether a string is already slug-shaped: lowercase ASCII
/// alphanumerics separated by single hyphens, no leading or trailing hyphen.
pub fn is_slug(text: &str) -> bool {
    !text.is_empty() && slugify(text) == text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello  World"), "hello-world");
        assert_eq!(slugify("Hello-World"), "hello-world");
        assert_eq!(slugify("Test 123"), "test-123");
        assert_eq!(slugify("Special!@#Characters"), "special-characters");
    }

    #[test]
    fn test_slugify_test_article() {
        assert_eq!(slugify("Test Article"), "test-article");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_multiple_dashes() {
        assert_eq!(slugify("hello---world"), "hello-world");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  padded title  "), "padded-title");
        assert_eq!(slugify("-leading-and-trailing-"), "leading-and-trailing");
    }

    #[test]
    fn test_is_slug() {
        assert!(is_slug("test-article"));
        assert!(is_slug("a1-b2"));
        assert!(!is_slug(""));
        assert!(!is_slug("Test-Article"));
        assert!(!is_slug("double--dash"));
        assert!(!is_slug("-leading"));
    }
}
