use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, Problem, ProblemId};

pub const API_PREFIX: &str = "/api";
pub const HELLO_MESSAGE: &str = "Hello from algotrack!";

pub fn hello_route() -> &'static str {
    "/hello"
}

pub fn problems_route() -> &'static str {
    "/problems"
}

pub fn problem_route(id: ProblemId) -> String {
    format!("{}/{}", problems_route(), id.0)
}

/// Body of create and update requests: every problem field except the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub last_reviewed: Option<String>,
    #[serde(default)]
    pub next_review: Option<String>,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for ProblemDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            difficulty: Difficulty::Medium.as_str().to_string(),
            platform: String::new(),
            url: None,
            last_reviewed: None,
            next_review: None,
            review_count: 0,
            notes: None,
        }
    }
}

impl ProblemDraft {
    /// Prefills a draft for editing an existing problem.
    pub fn from_problem(problem: &Problem) -> Self {
        Self {
            title: problem.title.clone(),
            description: problem.description.clone(),
            difficulty: if problem.difficulty.is_empty() {
                Difficulty::Medium.as_str().to_string()
            } else {
                problem.difficulty.clone()
            },
            platform: problem.platform.clone(),
            url: problem.url.clone(),
            last_reviewed: problem.last_reviewed.clone(),
            next_review: problem.next_review.clone(),
            review_count: problem.review_count(),
            notes: problem.notes.clone(),
        }
    }

    /// Collapses blank optional text to `None` so empty inputs are stored as null.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.description,
            &mut self.url,
            &mut self.last_reviewed,
            &mut self.next_review,
            &mut self.notes,
        ] {
            if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }

    pub fn into_problem(self, id: ProblemId) -> Problem {
        Problem {
            id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            platform: self.platform,
            url: self.url,
            last_reviewed: self.last_reviewed,
            next_review: self.next_review,
            review_count: Some(self.review_count),
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_drops_blank_optionals() {
        let draft = ProblemDraft {
            title: "Two Sum".into(),
            platform: "LeetCode".into(),
            url: Some(String::new()),
            notes: Some("  ".into()),
            description: Some("hash map".into()),
            ..ProblemDraft::default()
        }
        .normalized();

        assert_eq!(draft.url, None);
        assert_eq!(draft.notes, None);
        assert_eq!(draft.description.as_deref(), Some("hash map"));
    }

    #[test]
    fn draft_defaults_missing_fields() {
        let draft: ProblemDraft =
            serde_json::from_str(r#"{"title":"Two Sum","difficulty":"Easy","platform":"LeetCode"}"#)
                .expect("draft");
        assert_eq!(draft.review_count, 0);
        assert_eq!(draft.next_review, None);
    }

    #[test]
    fn problem_route_embeds_id() {
        assert_eq!(problem_route(ProblemId(42)), "/problems/42");
    }
}
