use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use warble_store::StoreError;
use warble_types::models::{SessionHandle, User};

use crate::error::AppError;
use crate::state::{AppState, AppStateInner};

pub const SESSION_COOKIE: &str = "warble_session";

/// The authenticated user, inserted by [`require_login`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Session handle carried by the request cookie, if it parses.
pub fn existing_handle(jar: &CookieJar) -> Option<SessionHandle> {
    jar.get(SESSION_COOKIE).and_then(|c| c.value().parse().ok())
}

/// Start a fresh session for a login. Whatever handle the request carried
/// is unbound and replaced, so a client-chosen handle is never authenticated.
pub fn start_session(state: &AppStateInner, jar: CookieJar) -> (CookieJar, SessionHandle) {
    if let Some(previous) = existing_handle(&jar) {
        state.sessions.unbind(previous);
    }

    let handle = SessionHandle::new();
    let max_age = time::Duration::try_from(state.session_ttl()).unwrap_or(time::Duration::MAX);
    let cookie = Cookie::build((SESSION_COOKIE, handle.to_string()))
        .path("/")
        .http_only(true)
        .max_age(max_age);
    (jar.add(cookie), handle)
}

pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Resolve the logged-in user for a request, if there is one.
/// A session pointing at a user that no longer exists counts as logged out.
pub fn current_user(state: &AppStateInner, jar: &CookieJar) -> Result<Option<User>, StoreError> {
    let Some(handle) = existing_handle(jar) else {
        return Ok(None);
    };

    match state.sessions.require_authenticated(handle) {
        Ok(user_id) => state.users.find_by_id(user_id),
        Err(StoreError::NotAuthenticated) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reject requests without a logged-in session; the error renders as a
/// redirect to `/login`.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = current_user(&state, &jar)?.ok_or(StoreError::NotAuthenticated)?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
