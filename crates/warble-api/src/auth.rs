use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use warble_types::api::{LoginRequest, RegisterRequest, UserResponse};

use crate::error::AppError;
use crate::middleware::{clear_session_cookie, existing_handle, start_session};
use crate::state::AppState;

/// POST /register — creates the account but does not log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Avatar rendering is CPU-bound; keep it off the async workers
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || st.users.register(&req.username)).await??;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /login — username-only sign in.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_username(&req.username)?
        .ok_or_else(|| AppError::UnknownLogin(req.username.clone()))?;

    let (jar, handle) = start_session(&state, jar);
    state.sessions.bind(handle, user.id);
    info!(user_id = user.id, username = %user.username, "User logged in");

    Ok((jar, Json(UserResponse::from(&user))))
}

/// POST /guest — allocate a guest identity and log it in.
pub async fn guest(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let st = state.clone();
    let user = tokio::task::spawn_blocking(move || st.users.create_guest()).await??;

    let (jar, handle) = start_session(&state, jar);
    state.sessions.bind(handle, user.id);
    info!(user_id = user.id, username = %user.username, "Guest logged in");

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(&user))))
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(handle) = existing_handle(&jar) {
        state.sessions.unbind(handle);
    }

    (clear_session_cookie(jar), Redirect::to("/"))
}
