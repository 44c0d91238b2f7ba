//! Prompt Search and Filtering
//!
//! Pure functions over a prompt slice; results borrow from the input and
//! keep collection order unless a sort is requested.

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::prompt::Prompt;
use crate::utils::time::parse_timestamp;

/// Text and tag filter.
///
/// A prompt passes when the trimmed `query` is empty or is a case-insensitive
/// substring of its title, content, sample, comments, category or any tag,
/// AND when `selected_tags` is empty or shares at least one tag with it.
pub fn filter_prompts<'a>(
    all: &'a [Prompt],
    query: &str,
    selected_tags: &[String],
) -> Vec<&'a Prompt> {
    let needle = query.trim().to_lowercase();
    let wanted: HashSet<String> = selected_tags.iter().map(|t| t.to_lowercase()).collect();

    all.iter()
        .filter(|p| needle.is_empty() || matches_text(p, &needle))
        .filter(|p| wanted.is_empty() || p.tags.iter().any(|t| wanted.contains(&t.to_lowercase())))
        .collect()
}

fn matches_text(prompt: &Prompt, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(prompt.title.as_str())
        || hit(prompt.content.as_str())
        || prompt.sample.as_deref().is_some_and(hit)
        || prompt.comments.as_deref().is_some_and(hit)
        || hit(prompt.category.as_str())
        || prompt.tags.iter().any(|t| hit(t.as_str()))
}

/// Most recently updated first; ties (and unparseable timestamps) keep
/// their relative order.
pub fn sort_by_recent(prompts: &mut [&Prompt]) {
    prompts.sort_by_key(|p| Reverse(updated_key(p)));
}

fn updated_key(prompt: &Prompt) -> DateTime<Utc> {
    parse_timestamp(&prompt.updated_at).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptSort {
    /// Collection order
    #[default]
    Original,
    RecentlyUpdated,
    MostUsed,
}

/// Full library query as offered by the list view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptQuery {
    pub text: String,
    pub tags: Vec<String>,
    /// Exact category; `None` or `"all"` disables the filter
    pub category: Option<String>,
    pub favorites_only: bool,
    /// Archived prompts are hidden unless set
    pub include_archived: bool,
    pub sort: PromptSort,
}

impl PromptQuery {
    pub fn apply<'a>(&self, all: &'a [Prompt]) -> Vec<&'a Prompt> {
        let category = self
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "all");

        let mut results: Vec<&Prompt> = filter_prompts(all, &self.text, &self.tags)
            .into_iter()
            .filter(|p| self.include_archived || !p.is_archived)
            .filter(|p| !self.favorites_only || p.is_favorite)
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect();

        match self.sort {
            PromptSort::Original => {}
            PromptSort::RecentlyUpdated => sort_by_recent(&mut results),
            PromptSort::MostUsed => results.sort_by_key(|p| Reverse(p.usage)),
        }
        results
    }
}
