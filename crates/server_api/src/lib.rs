use shared::{
    domain::{Difficulty, Problem, ProblemId},
    error::{ApiError, ErrorCode},
    protocol::{ProblemDraft, HELLO_MESSAGE},
    validation::validate_draft,
};
use storage::Storage;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub fn hello() -> &'static str {
    HELLO_MESSAGE
}

pub async fn list_problems(ctx: &ApiContext) -> Result<Vec<Problem>, ApiError> {
    ctx.storage.list_problems().await.map_err(internal)
}

pub async fn get_problem(ctx: &ApiContext, id: ProblemId) -> Result<Problem, ApiError> {
    ctx.storage
        .get_problem(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))
}

pub async fn create_problem(ctx: &ApiContext, draft: ProblemDraft) -> Result<Problem, ApiError> {
    let draft = accept_draft(draft)?;
    let problem = ctx
        .storage
        .create_problem(&draft)
        .await
        .map_err(internal)?;
    info!(problem_id = problem.id.0, title = %problem.title, "problem created");
    Ok(problem)
}

/// Full replacement of every mutable field, mirroring PUT semantics.
pub async fn update_problem(
    ctx: &ApiContext,
    id: ProblemId,
    draft: ProblemDraft,
) -> Result<Problem, ApiError> {
    let draft = accept_draft(draft)?;
    let problem = ctx
        .storage
        .update_problem(id, &draft)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    info!(problem_id = id.0, "problem updated");
    Ok(problem)
}

pub async fn delete_problem(ctx: &ApiContext, id: ProblemId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_problem(id).await.map_err(internal)?;
    if !removed {
        return Err(not_found(id));
    }
    info!(problem_id = id.0, "problem deleted");
    Ok(())
}

fn accept_draft(draft: ProblemDraft) -> Result<ProblemDraft, ApiError> {
    let mut draft = draft.normalized();
    if let Err(errors) = validate_draft(&draft) {
        warn!(%errors, "rejected problem draft");
        return Err(ApiError::new(ErrorCode::Validation, errors.to_string()));
    }
    draft.title = draft.title.trim().to_string();
    draft.platform = draft.platform.trim().to_string();
    if let Some(difficulty) = Difficulty::from_label(&draft.difficulty) {
        draft.difficulty = difficulty.as_str().to_string();
    }
    Ok(draft)
}

fn not_found(id: ProblemId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("problem {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
