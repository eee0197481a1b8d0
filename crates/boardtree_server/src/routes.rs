//! REST and SSE surface over the board service.
//!
//! # Responsibility
//! - Map HTTP verbs and paths onto `BoardService` calls.
//! - Translate domain errors into the fixed wire statuses and messages.
//! - Bridge the broadcast bus onto a Server-Sent Events stream.
//!
//! # Invariants
//! - Error payloads are always `{"error": message}`.
//! - Each handler locks the shared connection for the whole service call and
//!   releases it before anything awaits.
//! - Validation order per request matches the service layer: target board
//!   first, then parent reference, then structural checks.

use std::convert::Infallible;
use std::sync::{Arc, MutexGuard};
use std::time::Instant;

use axum::{
    extract::{Path, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::sse::{Event, KeepAlive, Sse},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use log::{error, info};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use boardtree_core::{
    Board, BoardId, BoardNode, BoardService, BoardServiceError, SqliteBoardRepository,
};

use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

/// Builds the application router over shared state.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/boards", post(create_board).get(list_boards))
        .route("/boards/:id", get(get_board).delete(delete_board))
        .route("/boards/:id/move", put(move_board))
        .route("/hello", get(hello))
        .route("/events", get(subscribe_events))
        .layer(middleware::from_fn(log_requests))
        .layer(build_cors_layer())
        .with_state(state)
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let outcome = if status.is_server_error() { "error" } else { "ok" };
    info!(
        "event=http_request module=routes status={outcome} method={method} path={path} code={} elapsed_ms={}",
        status.as_u16(),
        started.elapsed().as_millis()
    );
    response
}

#[derive(Debug, Default, Deserialize)]
struct CreateBoardBody {
    name: Option<String>,
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoveBoardBody {
    /// Absent stays `None`; an explicit JSON null arrives as `Some(None)`.
    #[serde(default, deserialize_with = "nullable_field")]
    new_parent_id: Option<Option<String>>,
}

fn nullable_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

async fn create_board(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateBoardBody>>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let name = body.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Board name is required"));
    }

    let parent_id = match body.parent_id {
        None => None,
        // An empty parent reference means a root-level create.
        Some(raw) if raw.is_empty() => None,
        Some(raw) => Some(parse_board_id(&raw).ok_or_else(|| {
            api_error(StatusCode::NOT_FOUND, "Parent board not found")
        })?),
    };

    let conn = lock_db(&state, "create_board", "Failed to create board")?;
    let repo = open_repo(&conn, "create_board", "Failed to create board")?;
    let service = BoardService::new(repo, state.bus.clone());

    let board = service
        .create_board(name, parent_id)
        .map_err(map_create_error)?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn delete_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_board_id(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Board not found"))?;

    let conn = lock_db(&state, "delete_board", "Failed to delete board")?;
    let repo = open_repo(&conn, "delete_board", "Failed to delete board")?;
    let service = BoardService::new(repo, state.bus.clone());

    service.remove_board(id).map_err(map_delete_error)?;
    Ok(Json(json!({ "message": "Board deleted successfully" })))
}

async fn move_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<MoveBoardBody>>,
) -> Result<Json<Board>, ApiError> {
    let id = parse_board_id(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Board not found"))?;

    let conn = lock_db(&state, "move_board", "Failed to move board")?;
    let repo = open_repo(&conn, "move_board", "Failed to move board")?;
    let service = BoardService::new(repo, state.bus.clone());

    let new_parent_id = match body.and_then(|Json(body)| body.new_parent_id) {
        // Explicit null re-parents to root level.
        Some(None) => None,
        Some(Some(raw)) => match parse_board_id(&raw) {
            Some(parent_id) => Some(parent_id),
            None => return Err(unresolvable_parent(&service, id)),
        },
        // A request without the field names no usable parent; a missing move
        // target still takes precedence in the reply.
        None => return Err(unresolvable_parent(&service, id)),
    };

    let board = service
        .move_board(id, new_parent_id)
        .map_err(map_move_error)?;
    Ok(Json(board))
}

async fn list_boards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BoardNode>>, ApiError> {
    let conn = lock_db(&state, "list_boards", "Failed to retrieve boards")?;
    let repo = open_repo(&conn, "list_boards", "Failed to retrieve boards")?;
    let service = BoardService::new(repo, state.bus.clone());

    let forest = service
        .list_boards()
        .map_err(|err| store_failure("list_boards", "Failed to retrieve boards", &err))?;
    Ok(Json(forest))
}

async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BoardNode>, ApiError> {
    let id = parse_board_id(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Board not found"))?;

    let conn = lock_db(&state, "get_board", "Failed to retrieve board")?;
    let repo = open_repo(&conn, "get_board", "Failed to retrieve board")?;
    let service = BoardService::new(repo, state.bus.clone());

    let node = service.get_board(id).map_err(map_get_error)?;
    Ok(Json(node))
}

async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello from Backend!" }))
}

async fn subscribe_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.bus.subscribe())
        // Lagged subscribers skip lost events and keep the stream open.
        .filter_map(|event| event.ok())
        .map(|event| {
            Ok::<Event, Infallible>(
                Event::default()
                    .event(event.event)
                    .data(event.data.to_string()),
            )
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn parse_board_id(raw: &str) -> Option<BoardId> {
    Uuid::parse_str(raw).ok()
}

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn lock_db<'a>(
    state: &'a AppState,
    op: &'static str,
    fail_message: &'static str,
) -> Result<MutexGuard<'a, Connection>, ApiError> {
    state.db.lock().map_err(|_| {
        error!("event=db_lock module=routes status=error op={op}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, fail_message)
    })
}

fn open_repo<'conn>(
    conn: &'conn Connection,
    op: &'static str,
    fail_message: &'static str,
) -> Result<SqliteBoardRepository<'conn>, ApiError> {
    SqliteBoardRepository::try_new(conn).map_err(|err| {
        error!("event=repo_open module=routes status=error op={op} error={err}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, fail_message)
    })
}

fn store_failure(op: &'static str, fail_message: &'static str, err: &BoardServiceError) -> ApiError {
    error!("event={op} module=routes status=error error={err}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, fail_message)
}

/// Resolves the reply for a parent reference that cannot name any board:
/// the move target is reported first when it does not exist either.
fn unresolvable_parent<R, N>(service: &BoardService<R, N>, id: BoardId) -> ApiError
where
    R: boardtree_core::BoardRepository,
    N: boardtree_core::BoardNotifier,
{
    match service.get_board(id) {
        Err(BoardServiceError::BoardNotFound(_)) => {
            api_error(StatusCode::NOT_FOUND, "Board not found")
        }
        _ => api_error(StatusCode::NOT_FOUND, "New parent board not found"),
    }
}

fn map_create_error(err: BoardServiceError) -> ApiError {
    match err {
        BoardServiceError::InvalidName => {
            api_error(StatusCode::BAD_REQUEST, "Board name is required")
        }
        BoardServiceError::ParentNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "Parent board not found")
        }
        BoardServiceError::DepthExceeded { .. } => {
            api_error(StatusCode::BAD_REQUEST, "Maximum board depth (10) exceeded")
        }
        BoardServiceError::InvalidParentRef(_) => api_error(
            StatusCode::BAD_REQUEST,
            "Parent reference to nonexistent board",
        ),
        other => store_failure("create_board", "Failed to create board", &other),
    }
}

fn map_delete_error(err: BoardServiceError) -> ApiError {
    match err {
        BoardServiceError::BoardNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "Board not found")
        }
        other => store_failure("delete_board", "Failed to delete board", &other),
    }
}

fn map_move_error(err: BoardServiceError) -> ApiError {
    match err {
        BoardServiceError::BoardNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "Board not found")
        }
        BoardServiceError::ParentNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "New parent board not found")
        }
        BoardServiceError::SelfParent(_) => {
            api_error(StatusCode::BAD_REQUEST, "Board cannot be its own parent")
        }
        BoardServiceError::DescendantCycle { .. } => api_error(
            StatusCode::BAD_REQUEST,
            "Cannot move a board to its descendant",
        ),
        BoardServiceError::DepthExceeded { .. } => api_error(
            StatusCode::BAD_REQUEST,
            "Moving this board would exceed maximum depth (10)",
        ),
        BoardServiceError::InvalidParentRef(_) => api_error(
            StatusCode::BAD_REQUEST,
            "Parent reference to nonexistent board",
        ),
        other => store_failure("move_board", "Failed to move board", &other),
    }
}

fn map_get_error(err: BoardServiceError) -> ApiError {
    match err {
        BoardServiceError::BoardNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "Board not found")
        }
        other => store_failure("get_board", "Failed to retrieve board", &other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_body_distinguishes_absent_from_null_parent() {
        let absent: MoveBoardBody = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.new_parent_id, None);

        let null: MoveBoardBody = serde_json::from_str(r#"{"new_parent_id":null}"#).unwrap();
        assert_eq!(null.new_parent_id, Some(None));

        let id = "11111111-2222-4333-8444-555555555555";
        let set: MoveBoardBody =
            serde_json::from_str(&format!(r#"{{"new_parent_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.new_parent_id, Some(Some(id.to_string())));
    }

    #[test]
    fn board_ids_parse_only_as_uuids() {
        assert!(parse_board_id("11111111-2222-4333-8444-555555555555").is_some());
        assert!(parse_board_id("42").is_none());
        assert!(parse_board_id("").is_none());
    }
}
