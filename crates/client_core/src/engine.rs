//! Filtering, sorting and search over the in-memory problem list.
//!
//! Everything here is a pure function of the full collection and a [`FilterState`].
//! Callers re-run [`derive`] whenever either input changes; nothing is patched
//! incrementally.

use std::{cmp::Ordering, collections::HashSet, convert::Infallible, fmt, str::FromStr};

use shared::domain::{Difficulty, Problem};
use unicase::UniCase;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
    Difficulty,
    ReviewCount,
    NextReview,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::Difficulty,
        SortKey::ReviewCount,
        SortKey::NextReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::Difficulty => "difficulty",
            SortKey::ReviewCount => "review-count",
            SortKey::NextReview => "next-review",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|key| key.as_str()).collect();
                format!("unknown sort key '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyFilter::All => f.write_str(ALL_LABEL),
            DifficultyFilter::Only(difficulty) => write!(f, "{difficulty}"),
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(DifficultyFilter::All);
        }
        s.parse().map(DifficultyFilter::Only)
    }
}

/// Platform filter values. `Only` matches the platform label exactly, case included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(String),
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFilter::All => f.write_str(ALL_LABEL),
            PlatformFilter::Only(platform) => f.write_str(platform),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_LABEL {
            Ok(PlatformFilter::All)
        } else {
            Ok(PlatformFilter::Only(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub search_query: String,
    pub difficulty: DifficultyFilter,
    pub platform: PlatformFilter,
    pub sort: SortKey,
}

impl FilterState {
    /// True when any field differs from its default, including the sort key.
    pub fn has_active_filters(&self) -> bool {
        *self != Self::default()
    }

    pub fn clear(&mut self) {
        *self = clear_filters();
    }
}

pub fn has_active_filters(state: &FilterState) -> bool {
    state.has_active_filters()
}

pub fn clear_filters() -> FilterState {
    FilterState::default()
}

/// Produces the visible sequence: search, difficulty and platform predicates ANDed
/// together, then a stable sort by `state.sort`. Ties keep collection order.
pub fn derive<'a>(problems: &'a [Problem], state: &FilterState) -> Vec<&'a Problem> {
    let query = fold_case(state.search_query.trim());

    let mut visible: Vec<&Problem> = problems
        .iter()
        .filter(|problem| matches_search(problem, &query))
        .filter(|problem| matches_difficulty(problem, state.difficulty))
        .filter(|problem| matches_platform(problem, &state.platform))
        .collect();

    sort_problems(&mut visible, state.sort);
    visible
}

/// `All` followed by each distinct non-empty platform, in first-seen order.
pub fn platform_facet(problems: &[Problem]) -> Vec<PlatformFilter> {
    let mut seen = HashSet::new();
    let mut facet = vec![PlatformFilter::All];
    for problem in problems {
        let platform = problem.platform.as_str();
        if platform.is_empty() {
            continue;
        }
        if seen.insert(platform) {
            facet.push(PlatformFilter::Only(platform.to_string()));
        }
    }
    facet
}

pub fn sort_problems(problems: &mut [&Problem], key: SortKey) {
    match key {
        SortKey::Newest => problems.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::Oldest => problems.sort_by(|a, b| a.id.cmp(&b.id)),
        SortKey::TitleAsc => problems.sort_by(|a, b| collate(&a.title, &b.title)),
        SortKey::TitleDesc => problems.sort_by(|a, b| collate(&b.title, &a.title)),
        SortKey::Difficulty => {
            problems.sort_by_key(|problem| difficulty_rank(problem));
        }
        SortKey::ReviewCount => {
            problems.sort_by(|a, b| b.review_count().cmp(&a.review_count()));
        }
        SortKey::NextReview => problems.sort_by(|a, b| compare_next_review(a, b)),
    }
}

fn matches_search(problem: &Problem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    [
        Some(problem.title.as_str()),
        problem.description.as_deref(),
        Some(problem.platform.as_str()),
        problem.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| fold_case(field).contains(query))
}

fn matches_difficulty(problem: &Problem, filter: DifficultyFilter) -> bool {
    match filter {
        DifficultyFilter::All => true,
        DifficultyFilter::Only(difficulty) => problem.difficulty_level() == Some(difficulty),
    }
}

fn matches_platform(problem: &Problem, filter: &PlatformFilter) -> bool {
    match filter {
        PlatformFilter::All => true,
        PlatformFilter::Only(platform) => problem.platform == *platform,
    }
}

fn difficulty_rank(problem: &Problem) -> u8 {
    problem.difficulty_level().map_or(0, Difficulty::rank)
}

fn fold_case(text: &str) -> String {
    UniCase::new(text).to_folded_case()
}

/// Base letters with accents stripped, case folded.
fn collation_key(text: &str) -> String {
    let base: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    fold_case(&base)
}

/// Compares base letters first, then accents, then case. Raw code points only break
/// exact ties.
fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| fold_case(a).cmp(&fold_case(b)))
        .then_with(|| a.cmp(b))
}

// Undated (or unparseable) reviews sort after every dated one.
fn compare_next_review(a: &Problem, b: &Problem) -> Ordering {
    match (a.next_review_date(), b.next_review_date()) {
        (Some(date_a), Some(date_b)) => date_a.cmp(&date_b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
