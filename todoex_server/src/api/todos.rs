//! Todo API handlers.
//!
//! Every handler runs behind the auth gate and scopes its query by the
//! caller's user id.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use todoex::todo::{NewTodo, Todo, TodoId, TodoPatch};

use super::{AppState, auth::MessageResponse, error::ApiError, middleware::AuthenticatedUser};

/// `GET /api/todos`: the caller's active todos, newest first.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list(caller.user_id()).await?;
    Ok(Json(todos))
}

/// `POST /api/todos`: create a pending todo.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(new) = payload?;
    let todo = state.todos.create(caller.user_id(), new).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PATCH /api/todos/{id}`: partial update, returns the updated todo.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    id: Result<Path<TodoId>, PathRejection>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let todo = state.todos.update(caller.user_id(), id, patch).await?;
    Ok(Json(todo))
}

/// `DELETE /api/todos/{id}`: soft delete.
pub async fn archive_todo(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.todos.archive(caller.user_id(), id).await?;
    Ok(Json(MessageResponse {
        message: "Todo archived".to_string(),
    }))
}
