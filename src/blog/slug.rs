const MAX_SLUG_LEN: usize = 80;

/// URL slug: lowercase ASCII alphanumerics separated by single dashes.
///
/// Non-ASCII characters are dropped; an input with nothing usable becomes `"post"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_spaces_collapse_to_single_dashes() {
        assert_eq!(slugify("  Hello,   World! "), "hello-world");
        assert_eq!(slugify("MVP: 3 steps -- fast"), "mvp-3-steps-fast");
    }

    #[test]
    fn unusable_titles_get_a_default() {
        assert_eq!(slugify("!!!"), "post");
        assert_eq!(slugify("日本語"), "post");
    }

    #[test]
    fn long_titles_are_capped() {
        let slug = slugify(&"word ".repeat(50));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }
}
