use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use server_api::{
    create_problem, delete_problem, get_problem, hello, list_problems, update_problem, ApiContext,
};
use shared::{
    domain::{Problem, ProblemId},
    error::ApiError,
    protocol::{hello_route, problems_route, ProblemDraft, API_PREFIX},
};
use storage::Storage;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;

    let cors_origin = HeaderValue::from_str(&settings.cors_origin)?;
    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), cors_origin);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, cors_origin = %settings.cors_origin, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .route(hello_route(), get(http_hello))
        .route(
            problems_route(),
            get(http_list_problems).post(http_create_problem),
        )
        .route(
            "/problems/:id",
            get(http_get_problem)
                .put(http_update_problem)
                .delete(http_delete_problem),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

fn http_error(err: ApiError) -> HttpError {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = ?err.code, message = %err.message, "request failed");
    } else {
        warn!(code = ?err.code, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

async fn http_hello() -> &'static str {
    hello()
}

async fn http_list_problems(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Problem>>, HttpError> {
    let problems = list_problems(&state.api).await.map_err(http_error)?;
    Ok(Json(problems))
}

async fn http_get_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Problem>, HttpError> {
    let problem = get_problem(&state.api, ProblemId(id))
        .await
        .map_err(http_error)?;
    Ok(Json(problem))
}

async fn http_create_problem(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ProblemDraft>,
) -> Result<(StatusCode, Json<Problem>), HttpError> {
    let problem = create_problem(&state.api, draft)
        .await
        .map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(problem)))
}

async fn http_update_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(draft): Json<ProblemDraft>,
) -> Result<Json<Problem>, HttpError> {
    let problem = update_problem(&state.api, ProblemId(id), draft)
        .await
        .map_err(http_error)?;
    Ok(Json(problem))
}

async fn http_delete_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    delete_problem(&state.api, ProblemId(id))
        .await
        .map_err(http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
