use std::fmt;

use thiserror::Error;

use crate::{
    domain::{parse_review_date, Difficulty},
    protocol::ProblemDraft,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Difficulty,
    Platform,
    Url,
    LastReviewed,
    NextReview,
    ReviewCount,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Difficulty => "difficulty",
            Field::Platform => "platform",
            Field::Url => "url",
            Field::LastReviewed => "lastReviewed",
            Field::NextReview => "nextReview",
            Field::ReviewCount => "reviewCount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().map(|error| error.field)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks a draft before it is submitted. Optional fields are only checked when present.
pub fn validate_draft(draft: &ProblemDraft) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    let mut reject = |field, message| errors.push(FieldError { field, message });

    if draft.title.trim().is_empty() {
        reject(Field::Title, "Title is required");
    }

    if draft.difficulty.trim().is_empty() {
        reject(Field::Difficulty, "Difficulty is required");
    } else if Difficulty::from_label(&draft.difficulty).is_none() {
        reject(Field::Difficulty, "Difficulty must be Easy, Medium or Hard");
    }

    if draft.platform.trim().is_empty() {
        reject(Field::Platform, "Platform is required");
    }

    if let Some(url) = non_blank(&draft.url) {
        if url::Url::parse(url).is_err() {
            reject(Field::Url, "Please enter a valid URL");
        }
    }

    if let Some(date) = non_blank(&draft.last_reviewed) {
        if parse_review_date(date).is_none() {
            reject(Field::LastReviewed, "Invalid date format");
        }
    }
    if let Some(date) = non_blank(&draft.next_review) {
        if parse_review_date(date).is_none() {
            reject(Field::NextReview, "Invalid date format");
        }
    }

    if draft.review_count < 0 {
        reject(Field::ReviewCount, "Review count cannot be negative");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
