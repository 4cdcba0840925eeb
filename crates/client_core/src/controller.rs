//! List screen state: fetch lifecycle, filter state, form submission and the
//! delete confirmation flow. Front ends render [`ListController::view`] and forward
//! user actions to the setters and `submit_*`/`*_delete` methods.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Problem, ProblemId},
    protocol::ProblemDraft,
    validation::validate_draft,
};
use tracing::{debug, info, warn};

use crate::{
    engine::{self, DifficultyFilter, FilterState, PlatformFilter, SortKey},
    error::{ClientError, ControllerError},
    notice::{NoticeBoard, DEFAULT_NOTICE_TTL},
    ProblemRepository,
};

pub const DELETE_DIALOG_TITLE: &str = "Delete Problem?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Loading,
    Failed(String),
    Ready,
}

/// Identifies one issued fetch. Only the most recently issued ticket may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Failed { message: &'a str },
    /// The collection itself is empty.
    Empty,
    /// Problems exist but none pass the current filters.
    NoMatches { total: usize },
    Items { visible: Vec<&'a Problem>, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    problem: Problem,
}

impl PendingDeletion {
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn title(&self) -> &'static str {
        DELETE_DIALOG_TITLE
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete \"{}\"? This action cannot be undone.",
            self.problem.title
        )
    }
}

pub struct ListController {
    repository: Arc<dyn ProblemRepository>,
    problems: Vec<Problem>,
    platforms: Vec<PlatformFilter>,
    filters: FilterState,
    status: FetchStatus,
    generation: u64,
    pending_deletion: Option<PendingDeletion>,
    notices: NoticeBoard,
}

impl ListController {
    pub fn new(repository: Arc<dyn ProblemRepository>) -> Self {
        Self::with_notice_ttl(repository, DEFAULT_NOTICE_TTL)
    }

    pub fn with_notice_ttl(repository: Arc<dyn ProblemRepository>, notice_ttl: Duration) -> Self {
        Self {
            repository,
            problems: Vec::new(),
            platforms: engine::platform_facet(&[]),
            filters: FilterState::default(),
            status: FetchStatus::Loading,
            generation: 0,
            pending_deletion: None,
            notices: NoticeBoard::new(notice_ttl),
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn find(&self, id: ProblemId) -> Option<&Problem> {
        self.problems.iter().find(|problem| problem.id == id)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn platforms(&self) -> &[PlatformFilter] {
        &self.platforms
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn pending_deletion(&self) -> Option<&PendingDeletion> {
        self.pending_deletion.as_ref()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filters.search_query = query.into();
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultyFilter) {
        self.filters.difficulty = difficulty;
    }

    pub fn set_platform(&mut self, platform: PlatformFilter) {
        self.filters.platform = platform;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.filters.sort = sort;
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.has_active_filters()
    }

    pub fn visible(&self) -> Vec<&Problem> {
        engine::derive(&self.problems, &self.filters)
    }

    pub fn view(&self) -> ListView<'_> {
        match &self.status {
            FetchStatus::Loading => ListView::Loading,
            FetchStatus::Failed(message) => ListView::Failed { message },
            FetchStatus::Ready if self.problems.is_empty() => ListView::Empty,
            FetchStatus::Ready => {
                let total = self.problems.len();
                let visible = self.visible();
                if visible.is_empty() {
                    ListView::NoMatches { total }
                } else {
                    ListView::Items { visible, total }
                }
            }
        }
    }

    /// Issues a new fetch ticket. A loaded list stays on screen while it refreshes.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        if self.status != FetchStatus::Ready {
            self.status = FetchStatus::Loading;
        }
        FetchTicket(self.generation)
    }

    /// Applies a fetch result. Returns `Ok(false)` when a newer fetch was issued
    /// after `ticket`; that result is discarded. A failed fetch keeps the previous
    /// collection and hands the error back.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<Problem>, ClientError>,
    ) -> Result<bool, ClientError> {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "dropping superseded fetch result"
            );
            return Ok(false);
        }
        match outcome {
            Ok(problems) => {
                debug!(count = problems.len(), "problem list loaded");
                self.replace_collection(problems);
                self.status = FetchStatus::Ready;
                Ok(true)
            }
            Err(error) => {
                warn!(%error, "failed to fetch problems");
                self.status = FetchStatus::Failed(error.to_string());
                Err(error)
            }
        }
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let ticket = self.begin_fetch();
        let repository = Arc::clone(&self.repository);
        let outcome = repository.list_all().await;
        self.complete_fetch(ticket, outcome).map(|_| ())
    }

    /// Validates locally, creates on the server, then reloads the list. Nothing is
    /// sent when validation fails.
    pub async fn submit_create(&mut self, draft: ProblemDraft) -> Result<Problem, ControllerError> {
        let draft = draft.normalized();
        validate_draft(&draft)?;
        let created = self.repository.create(&draft).await?;
        info!(id = %created.id, "problem created");
        self.notices
            .success(format!("Successfully created \"{}\"", created.title));
        self.refresh_after_mutation().await;
        Ok(created)
    }

    pub async fn submit_update(
        &mut self,
        id: ProblemId,
        draft: ProblemDraft,
    ) -> Result<Problem, ControllerError> {
        let draft = draft.normalized();
        validate_draft(&draft)?;
        let updated = self.repository.update(id, &draft).await?;
        info!(id = %updated.id, "problem updated");
        self.notices
            .success(format!("Successfully updated \"{}\"", updated.title));
        self.refresh_after_mutation().await;
        Ok(updated)
    }

    pub fn request_delete(&mut self, id: ProblemId) -> Result<&PendingDeletion, ControllerError> {
        let problem = self
            .find(id)
            .cloned()
            .ok_or(ControllerError::UnknownProblem(id.0))?;
        Ok(&*self.pending_deletion.insert(PendingDeletion { problem }))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_deletion = None;
    }

    /// Removes the pending problem. On failure the confirmation stays pending so the
    /// user can retry or cancel.
    pub async fn confirm_delete(&mut self) -> Result<Problem, ControllerError> {
        let problem = self
            .pending_deletion
            .as_ref()
            .map(|pending| pending.problem.clone())
            .ok_or(ControllerError::NothingToConfirm)?;

        if let Err(error) = self.repository.remove(problem.id).await {
            self.notices
                .error(format!("Failed to delete problem: {error}"));
            return Err(error.into());
        }

        info!(id = %problem.id, "problem deleted");
        self.pending_deletion = None;
        self.notices
            .success(format!("Successfully deleted \"{}\"", problem.title));
        self.refresh_after_mutation().await;
        Ok(problem)
    }

    // The mutation already succeeded; a failed reload only shows up in `status`.
    async fn refresh_after_mutation(&mut self) {
        if let Err(error) = self.refresh().await {
            debug!(%error, "reload after mutation failed");
        }
    }

    fn replace_collection(&mut self, problems: Vec<Problem>) {
        self.platforms = engine::platform_facet(&problems);
        self.problems = problems;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
