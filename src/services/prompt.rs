//! Prompt Service
//!
//! Business logic for the prompt library. Every operation reads the
//! collection through the store and writes it back; nothing is cached.

use uuid::Uuid;

use crate::models::prompt::{
    validate_rating, Prompt, PromptCreateRequest, PromptUpdateRequest, DEFAULT_CATEGORY,
};
use crate::services::search::PromptQuery;
use crate::storage::kv::{KvStore, PROMPTS_KEY};
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::now_iso;
use prompt_stash_core::{collect_tags, normalize_tags, suggest_tags};

/// Default number of tag suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Service for managing prompts
#[derive(Debug, Clone)]
pub struct PromptService {
    kv: KvStore,
}

impl PromptService {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// All prompts in collection order
    pub fn list_prompts(&self) -> Vec<Prompt> {
        self.kv.get(PROMPTS_KEY, Vec::new())
    }

    /// Prompts matching `query`
    pub fn query_prompts(&self, query: &PromptQuery) -> Vec<Prompt> {
        let all = self.list_prompts();
        query.apply(&all).into_iter().cloned().collect()
    }

    /// Get a single prompt by ID
    pub fn get_prompt(&self, id: &str) -> AppResult<Prompt> {
        self.list_prompts()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Create a new prompt; tags are normalized against the library
    pub fn create_prompt(&self, req: PromptCreateRequest) -> AppResult<Prompt> {
        let title = required("title", &req.title)?;
        required("content", &req.content)?;

        let mut prompts = self.list_prompts();
        let now = now_iso();
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            title,
            content: req.content,
            sample: non_blank(req.sample),
            comments: non_blank(req.comments),
            tags: normalize_tags(&req.tags, &prompts),
            category: non_blank(req.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            is_favorite: false,
            is_archived: false,
            usage: 0,
            rating: 0,
            created_at: now.clone(),
            updated_at: now,
        };

        prompts.push(prompt.clone());
        self.kv.set(PROMPTS_KEY, &prompts);
        tracing::info!(id = %prompt.id, tags = prompt.tags.len(), "created prompt");
        Ok(prompt)
    }

    /// Update an existing prompt; only provided fields change
    pub fn update_prompt(&self, id: &str, req: PromptUpdateRequest) -> AppResult<Prompt> {
        if req.is_empty() {
            return Err(AppError::validation("nothing to update"));
        }
        let title = req.title.as_deref().map(|t| required("title", t)).transpose()?;
        if let Some(content) = &req.content {
            required("content", content)?;
        }

        let mut prompts = self.list_prompts();
        let index = position(&prompts, id)?;

        let tags = req.tags.as_ref().map(|candidates| {
            let others: Vec<Vec<String>> = prompts
                .iter()
                .filter(|p| p.id != id)
                .map(|p| p.tags.clone())
                .collect();
            normalize_tags(candidates, &others)
        });

        let prompt = &mut prompts[index];
        if let Some(title) = title {
            prompt.title = title;
        }
        if let Some(content) = req.content {
            prompt.content = content;
        }
        if let Some(sample) = req.sample {
            prompt.sample = non_blank(Some(sample));
        }
        if let Some(comments) = req.comments {
            prompt.comments = non_blank(Some(comments));
        }
        if let Some(category) = req.category {
            prompt.category =
                non_blank(Some(category)).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }
        if let Some(tags) = tags {
            prompt.tags = tags;
        }
        prompt.updated_at = now_iso();

        let updated = prompt.clone();
        self.kv.set(PROMPTS_KEY, &prompts);
        tracing::info!(id, "updated prompt");
        Ok(updated)
    }

    /// Delete a prompt. Chats linked to it are left untouched.
    pub fn delete_prompt(&self, id: &str) -> AppResult<()> {
        let mut prompts = self.list_prompts();
        let index = position(&prompts, id)?;
        prompts.remove(index);
        self.kv.set(PROMPTS_KEY, &prompts);
        tracing::info!(id, "deleted prompt");
        Ok(())
    }

    /// Record usage of a prompt (increment usage)
    pub fn record_use(&self, id: &str) -> AppResult<Prompt> {
        self.modify(id, |p| {
            p.usage = p.usage.saturating_add(1);
            Ok(())
        })
    }

    /// Set the 0-5 rating
    pub fn set_rating(&self, id: &str, rating: u8) -> AppResult<Prompt> {
        validate_rating(rating)?;
        self.modify(id, |p| {
            p.rating = rating;
            Ok(())
        })
    }

    /// Toggle favorite status
    pub fn toggle_favorite(&self, id: &str) -> AppResult<Prompt> {
        self.modify(id, |p| {
            p.is_favorite = !p.is_favorite;
            Ok(())
        })
    }

    /// Toggle archived status
    pub fn toggle_archived(&self, id: &str) -> AppResult<Prompt> {
        self.modify(id, |p| {
            p.is_archived = !p.is_archived;
            Ok(())
        })
    }

    /// Distinct tags across the library, first-seen casing
    pub fn list_tags(&self) -> Vec<String> {
        collect_tags(&self.list_prompts())
    }

    /// Auto-complete for a partially typed tag
    pub fn suggest_tags(&self, partial: &str, current: &[String], limit: usize) -> Vec<String> {
        suggest_tags(partial, &self.list_prompts(), current, limit)
    }

    /// Apply `f` to one prompt, bump `updatedAt` and write back
    fn modify<F>(&self, id: &str, f: F) -> AppResult<Prompt>
    where
        F: FnOnce(&mut Prompt) -> AppResult<()>,
    {
        let mut prompts = self.list_prompts();
        let index = position(&prompts, id)?;
        let prompt = &mut prompts[index];
        f(prompt)?;
        prompt.updated_at = now_iso();

        let updated = prompt.clone();
        self.kv.set(PROMPTS_KEY, &prompts);
        Ok(updated)
    }
}

fn position(prompts: &[Prompt], id: &str) -> AppResult<usize> {
    prompts
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("prompt {}", id))
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
