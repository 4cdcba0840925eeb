use super::*;
use axum::{
    extract::{Path, State},
    http::StatusCode as AxumStatus,
    routing::get,
    Json, Router,
};
use shared::{error::ErrorCode, protocol::HELLO_MESSAGE};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

type Shared = Arc<Mutex<Vec<Problem>>>;
type HttpResult<T> = Result<T, (AxumStatus, Json<ApiError>)>;

fn not_found(id: i64) -> (AxumStatus, Json<ApiError>) {
    (
        AxumStatus::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("problem {id} not found"),
        )),
    )
}

async fn list(State(store): State<Shared>) -> Json<Vec<Problem>> {
    Json(store.lock().await.clone())
}

async fn get_one(State(store): State<Shared>, Path(id): Path<i64>) -> HttpResult<Json<Problem>> {
    store
        .lock()
        .await
        .iter()
        .find(|p| p.id.0 == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn create(
    State(store): State<Shared>,
    Json(draft): Json<ProblemDraft>,
) -> (AxumStatus, Json<Problem>) {
    let mut problems = store.lock().await;
    let id = problems.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
    let problem = draft.into_problem(ProblemId(id));
    problems.push(problem.clone());
    (AxumStatus::CREATED, Json(problem))
}

async fn update(
    State(store): State<Shared>,
    Path(id): Path<i64>,
    Json(draft): Json<ProblemDraft>,
) -> HttpResult<Json<Problem>> {
    let mut problems = store.lock().await;
    let slot = problems
        .iter_mut()
        .find(|p| p.id.0 == id)
        .ok_or_else(|| not_found(id))?;
    *slot = draft.into_problem(ProblemId(id));
    Ok(Json(slot.clone()))
}

async fn remove(State(store): State<Shared>, Path(id): Path<i64>) -> HttpResult<AxumStatus> {
    let mut problems = store.lock().await;
    let before = problems.len();
    problems.retain(|p| p.id.0 != id);
    if problems.len() == before {
        return Err(not_found(id));
    }
    Ok(AxumStatus::NO_CONTENT)
}

async fn spawn_problem_server() -> (String, Shared) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let store: Shared = Arc::new(Mutex::new(Vec::new()));

    let api = Router::new()
        .route("/hello", get(|| async { HELLO_MESSAGE }))
        .route("/problems", get(list).post(create))
        .route("/problems/:id", get(get_one).put(update).delete(remove))
        .route(
            "/broken",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "database is locked") }),
        )
        .route(
            "/silent",
            get(|| async { AxumStatus::SERVICE_UNAVAILABLE }),
        )
        .route("/garbage", get(|| async { "{not json" }))
        .with_state(store.clone());
    let app = Router::new().nest("/api", api);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), store)
}

fn draft(title: &str) -> ProblemDraft {
    ProblemDraft {
        title: title.to_string(),
        difficulty: "Medium".to_string(),
        platform: "LeetCode".to_string(),
        next_review: Some("2024-01-05".to_string()),
        review_count: 1,
        ..ProblemDraft::default()
    }
}

#[tokio::test]
async fn hello_returns_server_text() {
    let (base_url, _) = spawn_problem_server().await;
    let client = ProblemClient::new(format!("{base_url}/"));
    assert_eq!(client.base_url(), base_url);
    assert_eq!(client.hello().await.expect("hello"), HELLO_MESSAGE);
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let (base_url, store) = spawn_problem_server().await;
    let client = ProblemClient::new(base_url);

    assert!(client.list_all().await.expect("empty list").is_empty());

    let created = client.create(&draft("Merge Intervals")).await.expect("create");
    assert_eq!(created.id, ProblemId(1));
    assert_eq!(created.next_review.as_deref(), Some("2024-01-05"));
    assert_eq!(store.lock().await.len(), 1);

    let fetched = client.get_by_id(created.id).await.expect("get");
    assert_eq!(fetched, created);

    let mut edit = ProblemDraft::from_problem(&created);
    edit.title = "Merge Intervals II".to_string();
    let updated = client.update(created.id, &edit).await.expect("update");
    assert_eq!(updated.title, "Merge Intervals II");

    client.remove(created.id).await.expect("remove");
    assert!(client.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn api_error_body_supplies_the_message() {
    let (base_url, _) = spawn_problem_server().await;
    let client = ProblemClient::new(base_url);

    let err = client.get_by_id(ProblemId(9)).await.expect_err("missing");
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "HTTP 404: problem 9 not found");

    let err = client.remove(ProblemId(9)).await.expect_err("missing");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn plain_body_or_status_reason_become_the_message() {
    let (base_url, _) = spawn_problem_server().await;
    let client = ProblemClient::new(base_url.clone());

    let err = client
        .send(client.http.get(client.endpoint("/broken")))
        .await
        .expect_err("500");
    assert!(matches!(
        err,
        ClientError::Http { status: 500, ref message } if message == "database is locked"
    ));

    let err = client
        .send(client.http.get(client.endpoint("/silent")))
        .await
        .expect_err("503");
    assert!(matches!(
        err,
        ClientError::Http { status: 503, ref message } if message == "Service Unavailable"
    ));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (base_url, _) = spawn_problem_server().await;
    let client = ProblemClient::new(base_url);
    let err = client
        .send_json::<Vec<Problem>>(client.http.get(client.endpoint("/garbage")))
        .await
        .expect_err("garbage");
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = ProblemClient::new(format!("http://{addr}/api"));
    let err = client.list_all().await.expect_err("unreachable");
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn error_message_prefers_api_error_json() {
    let body = serde_json::to_string(&ApiError::new(ErrorCode::Validation, "title: Title is required"))
        .expect("json");
    assert_eq!(
        error_message(StatusCode::BAD_REQUEST, &body),
        "title: Title is required"
    );
    assert_eq!(error_message(StatusCode::NOT_FOUND, "  "), "Not Found");
}
