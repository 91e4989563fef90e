//! URL-safe slugs derived from form titles.

use std::collections::HashSet;

const FALLBACK_SLUG: &str = "form";

/// Lowercase `title`, collapse every run of characters outside `[a-z0-9]`
/// into one `-`, and trim hyphens from both ends. Empty results become
/// `form`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// [`slugify`] then append `-2`, `-3`, ... until the slug is not in
/// `existing`.
pub fn unique_slug(title: &str, existing: &HashSet<String>) -> String {
    let base = slugify(title);
    if !existing.contains(&base) {
        return base;
    }
    let mut n = 2u64;
    loop {
        let candidate = format!("{base}-{n}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("Weight Loss Intake"), "weight-loss-intake");
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("Q&A -- 2024"), "q-a-2024");
        assert_eq!(slugify("Café Menu"), "caf-menu");
    }

    #[test]
    fn empty_slug_falls_back() {
        assert_eq!(slugify(""), "form");
        assert_eq!(slugify("!!!"), "form");
    }

    #[test]
    fn collision_gets_numeric_suffix() {
        let existing = set(&["weight-loss-intake"]);
        assert_eq!(unique_slug("Weight Loss Intake", &existing), "weight-loss-intake-2");
    }

    #[test]
    fn skips_taken_suffixes() {
        let existing = set(&["quick-check", "quick-check-2", "quick-check-3"]);
        assert_eq!(unique_slug("Quick Check", &existing), "quick-check-4");
    }

    #[test]
    fn deterministic() {
        let existing = set(&["form"]);
        assert_eq!(unique_slug("???", &existing), unique_slug("???", &existing));
        assert_eq!(unique_slug("???", &existing), "form-2");
    }
}
