//! Tag Normalization
//!
//! Keeps tags consistent across independently entered records without a
//! central tag registry. Every comparison is case-insensitive; the first casing
//! seen in the existing corpus is the canonical one.

use std::collections::{HashMap, HashSet};

/// Anything that carries a list of tags.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

impl Tagged for Vec<String> {
    fn tags(&self) -> &[String] {
        self
    }
}

/// Case-folded lookup key for a tag.
fn fold(tag: &str) -> String {
    tag.to_lowercase()
}

/// Upper-case the first character and keep the rest as typed.
fn capitalize_first(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the folded -> canonical map for a corpus. First-seen casing wins.
fn canonical_map<T: Tagged>(existing: &[T]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for entity in existing {
        for tag in entity.tags() {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            map.entry(fold(trimmed))
                .or_insert_with(|| trimmed.to_string());
        }
    }
    map
}

/// Normalize candidate tags against the tags already used by `existing`.
///
/// Each candidate is trimmed (empty ones are dropped), then replaced by the
/// corpus casing when a case-insensitive match exists, otherwise its first
/// character is upper-cased. Duplicates are removed case-insensitively,
/// keeping the first occurrence.
pub fn normalize_tags<T: Tagged>(candidates: &[String], existing: &[T]) -> Vec<String> {
    let corpus = canonical_map(existing);
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        let normalized = match corpus.get(&fold(trimmed)) {
            Some(canonical) => canonical.clone(),
            None => capitalize_first(trimmed),
        };
        if seen.insert(fold(&normalized)) {
            out.push(normalized);
        }
    }

    out
}

/// Trim, drop blanks and remove case-insensitive duplicates. The first
/// occurrence keeps its casing.
pub fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && seen.insert(fold(tag)))
        .map(str::to_string)
        .collect()
}

/// Distinct tags across a corpus, in first-seen order and casing.
pub fn collect_tags<T: Tagged>(existing: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for entity in existing {
        for tag in entity.tags() {
            let trimmed = tag.trim();
            if !trimmed.is_empty() && seen.insert(fold(trimmed)) {
                out.push(trimmed.to_string());
            }
        }
    }
    out
}

/// Auto-complete suggestions for a partially typed tag.
///
/// Returns corpus tags containing `partial` that are not already selected in
/// `current` and are not exactly `partial` itself.
pub fn suggest_tags<T: Tagged>(
    partial: &str,
    existing: &[T],
    current: &[String],
    limit: usize,
) -> Vec<String> {
    let needle = fold(partial.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    let selected: HashSet<String> = current.iter().map(|t| fold(t)).collect();

    collect_tags(existing)
        .into_iter()
        .filter(|tag| {
            let folded = fold(tag);
            folded.contains(&needle) && folded != needle && !selected.contains(&folded)
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_existing_casing_wins() {
        let corpus = vec![tags(&["ai"])];
        let result = normalize_tags(&tags(&["AI", "ml"]), &corpus);
        assert_eq!(result, tags(&["ai", "Ml"]));
    }

    #[test]
    fn test_first_seen_corpus_casing() {
        let corpus = vec![tags(&["Rust"]), tags(&["RUST", "web"])];
        let result = normalize_tags(&tags(&["rust", "WEB"]), &corpus);
        assert_eq!(result, tags(&["Rust", "web"]));
    }

    #[test]
    fn test_new_tag_keeps_rest_of_casing() {
        let corpus: Vec<Vec<String>> = Vec::new();
        let result = normalize_tags(&tags(&["gpt4Turbo", "iOS"]), &corpus);
        assert_eq!(result, tags(&["Gpt4Turbo", "IOS"]));
    }

    #[test]
    fn test_trims_and_drops_empty() {
        let corpus: Vec<Vec<String>> = Vec::new();
        let result = normalize_tags(&tags(&["  writing ", "", "   "]), &corpus);
        assert_eq!(result, tags(&["Writing"]));
    }

    #[test]
    fn test_dedupes_after_normalization() {
        let corpus = vec![tags(&["ai"])];
        let result = normalize_tags(&tags(&["ml", "AI", "Ml", "ai", "ML "]), &corpus);
        assert_eq!(result, tags(&["Ml", "ai"]));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let corpus = vec![tags(&["ai", "Coding"]), tags(&["summary"])];
        let candidates = tags(&[" CODING", "new-tag", "Ai", "other", "NEW-TAG"]);

        let first = normalize_tags(&candidates, &corpus);

        let mut extended = corpus.clone();
        extended.push(first.clone());
        let second = normalize_tags(&first, &extended);

        assert_eq!(first, tags(&["Coding", "New-tag", "ai", "Other"]));
        assert_eq!(second, first);
    }

    #[test]
    fn test_dedupe_tags_keeps_casing() {
        let result = dedupe_tags(&tags(&["AI", "ai", "Ml", "Ai"]));
        assert_eq!(result, tags(&["AI", "Ml"]));

        let result = dedupe_tags(&tags(&["ai", "AI", " Ai", "  ", "ml "]));
        assert_eq!(result, tags(&["ai", "ml"]));
    }

    #[test]
    fn test_collect_tags() {
        let corpus = vec![tags(&["ai", " Writing"]), tags(&["AI", "ml"])];
        assert_eq!(collect_tags(&corpus), tags(&["ai", "Writing", "ml"]));
    }

    #[test]
    fn test_suggest_tags() {
        let corpus = vec![tags(&["Programming", "Prompting", "Writing", "pro"])];
        let current = tags(&["prompting"]);
        let result = suggest_tags("pro", &corpus, &current, 5);
        assert_eq!(result, tags(&["Programming"]));
    }

    #[test]
    fn test_suggest_tags_limit_and_empty() {
        let corpus = vec![tags(&["a1", "a2", "a3"])];
        assert_eq!(suggest_tags("a", &corpus, &[], 2), tags(&["a1", "a2"]));
        assert!(suggest_tags("  ", &corpus, &[], 5).is_empty());
    }
}
