use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use warble_types::api::{CreatePostRequest, HomeResponse, UserResponse};
use warble_types::models::PostId;

use crate::error::AppError;
use crate::middleware::{CurrentUser, current_user};
use crate::state::AppState;

/// GET / — every post, newest first, plus whoever is logged in.
pub async fn home(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&state, &jar)?;
    let posts = state.posts.list_posts()?;

    Ok(Json(HomeResponse {
        app_name: state.app_name.clone(),
        logged_in: user.is_some(),
        user: user.as_ref().map(UserResponse::from),
        posts,
    }))
}

/// GET /post/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.posts.get_post(post_id)?))
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.posts.add_post(&req.title, &req.content, &user)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /like/{id} — every call counts, repeat likes included.
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.posts.increment_likes(post_id)?))
}

/// POST /delete/{id} — the requester is whoever the session resolves to.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    state.posts.delete_post(post_id, &user.username)?;
    Ok(StatusCode::NO_CONTENT)
}
