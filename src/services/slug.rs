//! Slug generation
//!
//! Titles become URL-friendly slugs. Because slugs are unique per table,
//! a taken base slug gets a numeric suffix: `title`, `title-2`, `title-3`.

use std::future::Future;

use anyhow::Result;

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, maps separators and ASCII punctuation to hyphens, collapses
/// hyphen runs, and trims hyphens from the ends. Non-ASCII characters are
/// kept as-is.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

/// Find the first free slug for `base` under the given existence check.
///
/// Tries `base` first, then `base-2`, `base-3`, and so on.
pub async fn unique_slug<F, Fut>(base: &str, exists: F) -> Result<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if !exists(base.to_string()).await? {
        return Ok(base.to_string());
    }

    let mut n: u64 = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_slug_simple() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_punctuation() {
        assert_eq!(generate_slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_generate_slug_collapses_hyphen_runs() {
        assert_eq!(generate_slug("a  --  b"), "a-b");
    }

    #[test]
    fn test_generate_slug_keeps_non_ascii() {
        assert_eq!(generate_slug("Café au lait"), "café-au-lait");
    }

    #[tokio::test]
    async fn test_unique_slug_free_base() {
        let slug = unique_slug("title", |_| async { Ok(false) }).await.unwrap();
        assert_eq!(slug, "title");
    }

    #[tokio::test]
    async fn test_unique_slug_appends_suffix() {
        let taken = ["title".to_string(), "title-2".to_string()];
        let slug = unique_slug("title", |candidate| {
            let taken = taken.clone();
            async move { Ok(taken.contains(&candidate)) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "title-3");
    }

    proptest! {
        #[test]
        fn property_slug_is_url_safe(title in "\\PC{1,60}") {
            let slug = generate_slug(&title);
            for c in slug.chars() {
                prop_assert!(
                    c.is_ascii_alphanumeric() || c == '-' || !c.is_ascii(),
                    "slug contains unsafe ASCII character: {:?}",
                    c
                );
            }
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn property_slug_is_idempotent(title in "[a-zA-Z0-9 ]{1,40}") {
            let once = generate_slug(&title);
            let twice = generate_slug(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
