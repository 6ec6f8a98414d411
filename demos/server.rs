//! Simple REST API server example for the points and leaderboard engine.
//!
//! Run with: `cargo run --example server`
//!
//! The `X-User-Id` header stands in for the authentication layer, which is
//! out of scope for this crate.
//!
//! ## Endpoints
//!
//! - `POST /users` - Register a profile
//! - `POST /posts` - Create a post
//! - `POST /posts/{id}/comments` - Comment on a post
//! - `POST /posts/{id}/like` - Toggle a post like
//! - `POST /comments/{id}/like` - Toggle a comment like
//! - `POST /comments/{id}/reply` - Reply to a comment
//! - `GET /leaderboard?period={last_30_days|all_time}&limit=<n>` - Ranked leaderboard
//! - `GET /leaderboard/me` - Current user's points overview
//! - `GET /notifications` - Current user's notifications
//!
//! ## Example Usage
//!
//! ```bash
//! # Register two users
//! curl -X POST http://localhost:3000/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Ada", "last_name": "Lovelace"}'
//! curl -X POST http://localhost:3000/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Grace", "last_name": "Hopper"}'
//!
//! # Ada posts, Grace likes it
//! curl -X POST http://localhost:3000/posts \
//!   -H "X-User-Id: 1" -H "Content-Type: application/json" \
//!   -d '{"content": "morning run done"}'
//! curl -X POST http://localhost:3000/posts/1/like -H "X-User-Id: 2"
//!
//! # Leaderboard
//! curl "http://localhost:3000/leaderboard?period=last_30_days&limit=20"
//! ```

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fitrank::{
    CommentId, Community, Leaderboard, LeaderboardPeriod, Notification, NotificationStore,
    PointsEngine, PointsError, PostId, UserId, UserOverview,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub period: Option<String>,
    pub limit: Option<usize>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the community and its engine.
#[derive(Clone)]
pub struct AppState {
    pub community: Arc<Community>,
}

// === Error Handling ===

/// Wrapper for converting `PointsError` into HTTP responses.
pub struct AppError(PointsError);

impl From<PointsError> for AppError {
    fn from(err: PointsError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            PointsError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            PointsError::PostNotFound => (StatusCode::NOT_FOUND, "POST_NOT_FOUND"),
            PointsError::CommentNotFound => (StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND"),
            PointsError::NotOwner => (StatusCode::FORBIDDEN, "NOT_OWNER"),
            PointsError::InvalidPeriod => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Reads the calling user from the `X-User-Id` header.
fn current_user(headers: &HeaderMap) -> Result<UserId, AppError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(UserId)
        .ok_or(AppError(PointsError::UserNotFound))
}

// === Handlers ===

/// POST /users - Register a profile.
async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> (StatusCode, Json<RegisterResponse>) {
    let user_id = state.community.engine().register_user(
        request.name,
        request.last_name,
        request.profile_picture_url,
    );
    (StatusCode::CREATED, Json(RegisterResponse { user_id }))
}

/// POST /posts - Create a post.
async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<PostId>), AppError> {
    let user = current_user(&headers)?;
    let post_id = state.community.create_post(user, request.content)?;
    Ok((StatusCode::CREATED, Json(post_id)))
}

/// POST /posts/{id}/comments - Comment on a post.
async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<CommentId>), AppError> {
    let user = current_user(&headers)?;
    let comment_id = state
        .community
        .create_comment(PostId(id), user, request.content)?;
    Ok((StatusCode::CREATED, Json(comment_id)))
}

/// POST /comments/{id}/reply - Reply to a comment.
async fn reply_to_comment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<CommentId>), AppError> {
    let user = current_user(&headers)?;
    let comment_id = state
        .community
        .reply_to_comment(CommentId(id), user, request.content)?;
    Ok((StatusCode::CREATED, Json(comment_id)))
}

/// POST /posts/{id}/like - Toggle a post like.
async fn toggle_post_like(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<fitrank::LikeToggle>, AppError> {
    let user = current_user(&headers)?;
    let toggle = state.community.toggle_post_like(PostId(id), user)?;
    Ok(Json(toggle))
}

/// POST /comments/{id}/like - Toggle a comment like.
async fn toggle_comment_like(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<fitrank::LikeToggle>, AppError> {
    let user = current_user(&headers)?;
    let toggle = state.community.toggle_comment_like(CommentId(id), user)?;
    Ok(Json(toggle))
}

/// GET /leaderboard - Ranked leaderboard for a period.
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Leaderboard>, AppError> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<LeaderboardPeriod>()?,
        None => LeaderboardPeriod::default(),
    };
    let limit = query.limit.unwrap_or(20);

    Ok(Json(state.community.engine().leaderboard(period, limit)))
}

/// GET /leaderboard/me - Current user's points overview.
async fn get_my_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserOverview>, AppError> {
    let user = current_user(&headers)?;
    let overview = state.community.engine().user_overview(user)?;
    Ok(Json(overview))
}

/// GET /notifications - Current user's notifications, newest first.
async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = current_user(&headers)?;
    Ok(Json(state.community.notifications().for_user(user)))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user))
        .route("/posts", post(create_post))
        .route("/posts/{id}/comments", post(create_comment))
        .route("/posts/{id}/like", post(toggle_post_like))
        .route("/comments/{id}/like", post(toggle_comment_like))
        .route("/comments/{id}/reply", post(reply_to_comment))
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/me", get(get_my_overview))
        .route("/notifications", get(get_notifications))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    let engine = Arc::new(PointsEngine::new());
    let notifications = Arc::new(NotificationStore::new());
    let community = Arc::new(Community::new(engine, notifications));

    let state = AppState { community };
    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Fitrank API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /users                  - Register a profile");
    println!("  POST /posts                  - Create a post");
    println!("  POST /posts/:id/comments     - Comment on a post");
    println!("  POST /posts/:id/like         - Toggle a post like");
    println!("  POST /comments/:id/like      - Toggle a comment like");
    println!("  POST /comments/:id/reply     - Reply to a comment");
    println!("  GET  /leaderboard            - Ranked leaderboard");
    println!("  GET  /leaderboard/me         - My points overview");
    println!("  GET  /notifications          - My notifications");

    axum::serve(listener, app).await.unwrap();
}
