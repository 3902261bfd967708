use axum::{
    Extension, Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use warble_types::api::{ProfileResponse, UserResponse};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.posts.posts_by_author(&user.username)?;

    Ok(Json(ProfileResponse {
        user: UserResponse::from(&user),
        posts,
    }))
}

/// GET /avatar/{username} — the stored PNG.
pub async fn avatar(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_username(&username)?
        .ok_or(AppError::UnknownUser(username))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], user.avatar))
}

/// POST /profile/avatar — re-render the caller's avatar.
pub async fn regenerate_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || st.users.regenerate_avatar(user.id)).await??;

    Ok(Json(UserResponse::from(&user)))
}
