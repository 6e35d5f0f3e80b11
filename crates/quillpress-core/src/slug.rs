//! Slug generation and per-collection uniqueness.
//!
//! [`slugify`] turns a display name into a URL-safe slug. Blogs, categories
//! and tags each keep their slugs unique within their own table;
//! [`ensure_unique`] finds the first free variant of a candidate by appending
//! `-1`, `-2`, ... and asking the caller whether each one is taken.
//!
//! The storage layer still enforces uniqueness with a constraint. Two
//! concurrent creators can both see a slug as free; the loser gets a
//! duplicate-entry error from the database.

use std::future::Future;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '_' || c == '-'
}

/// Converts text into a slug.
///
/// Steps, in order: lowercase, trim, drop everything that is not a word
/// character, whitespace or hyphen, collapse runs of whitespace, underscores
/// and hyphens into one hyphen, strip hyphens from both ends.
///
/// ```
/// use quillpress_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!  Test_2024"), "hello-world-test-2024");
/// assert_eq!(slugify("   "), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept = lowered
        .trim()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace() || *c == '-');

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for c in kept {
        if is_separator(c) {
            if !in_separator {
                slug.push('-');
            }
            in_separator = true;
        } else {
            slug.push(c);
            in_separator = false;
        }
    }

    slug.trim_matches('-').to_string()
}

/// Returns the first slug derived from `candidate` that is free.
///
/// Tries `candidate`, then `candidate-1`, `candidate-2`, ... until `exists`
/// reports a free slug. When `exclude` is given (the entity's current slug on
/// rename), reaching it counts as success without a lookup, so an entity
/// renamed to its own name keeps its slug.
pub async fn ensure_unique<F, Fut, E>(
    candidate: &str,
    exclude: Option<&str>,
    mut exists: F,
) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut current = candidate.to_string();
    let mut counter: u64 = 1;

    loop {
        if exclude == Some(current.as_str()) {
            return Ok(current);
        }
        if !exists(current.clone()).await? {
            return Ok(current);
        }
        current = format!("{}-{}", candidate, counter);
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::convert::Infallible;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("Hello, World!  Test_2024"), "hello-world-test-2024");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Rust"), "rust");
        assert_eq!(
            slugify("  --Leading and trailing--  "),
            "leading-and-trailing"
        );
        assert_eq!(slugify("a - b _ c"), "a-b-c");
        assert_eq!(slugify("Tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Crème"), "caf-crme");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_punctuation_between_words() {
        assert_eq!(slugify("what's new?"), "whats-new");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_idempotent() {
        let inputs = [
            "Hello, World!  Test_2024",
            "   ",
            "__init__",
            "-a--b-",
            "Ünïcödé Têxt",
            "mixed_CASE and-dashes",
            "1. First Post!!",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_ensure_unique_free_candidate() {
        let existing = taken(&["bar"]);
        let slug = ensure_unique("foo", None, |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "foo");
    }

    #[tokio::test]
    async fn test_ensure_unique_appends_counter() {
        let existing = taken(&["foo", "foo-1"]);
        let slug = ensure_unique("foo", None, |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "foo-2");
    }

    #[tokio::test]
    async fn test_ensure_unique_rename_keeps_own_slug() {
        let existing = taken(&["foo"]);
        let lookups = RefCell::new(0);
        let slug = ensure_unique("foo", Some("foo"), |s| {
            *lookups.borrow_mut() += 1;
            let hit = existing.contains(&s);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "foo");
        assert_eq!(*lookups.borrow(), 0);
    }

    #[tokio::test]
    async fn test_ensure_unique_rename_lands_on_own_suffixed_slug() {
        let existing = taken(&["foo", "foo-1", "foo-2"]);
        let slug = ensure_unique("foo", Some("foo-1"), |s| {
            let hit = existing.contains(&s);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .unwrap();
        assert_eq!(slug, "foo-1");
    }

    #[tokio::test]
    async fn test_ensure_unique_propagates_errors() {
        let result = ensure_unique("foo", None, |_| async { Err::<bool, _>("storage down") }).await;
        assert_eq!(result, Err("storage down"));
    }
}
