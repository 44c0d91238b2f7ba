//! Prompt Models
//!
//! Data structures for the prompt library.

use serde::{Deserialize, Serialize};

use prompt_stash_core::{CoreError, CoreResult, Tagged};

/// Highest allowed rating (0 means unrated)
pub const MAX_RATING: u8 = 5;

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "other";

/// Categories offered by the library
pub const CATEGORIES: &[&str] = &[
    "coding",
    "writing",
    "analysis",
    "creative",
    "business",
    "education",
    "other",
];

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A reusable prompt in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Example output or input for the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// Number of times the prompt has been used
    #[serde(default)]
    pub usage: u32,
    /// 0-5, 0 = unrated
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Prompt {
    /// Check record invariants that the type system cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::validation("prompt id cannot be empty"));
        }
        validate_rating(self.rating)
    }
}

impl Tagged for Prompt {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Reject ratings above [`MAX_RATING`]
pub fn validate_rating(rating: u8) -> CoreResult<()> {
    if rating > MAX_RATING {
        return Err(CoreError::validation(format!(
            "rating must be between 0 and {}, got {}",
            MAX_RATING, rating
        )));
    }
    Ok(())
}

/// Request to create a new prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptCreateRequest {
    pub title: String,
    pub content: String,
    pub sample: Option<String>,
    pub comments: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
}

/// Request to update an existing prompt (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub sample: Option<String>,
    pub comments: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

impl PromptUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.sample.is_none()
            && self.comments.is_none()
            && self.tags.is_none()
            && self.category.is_none()
    }
}
