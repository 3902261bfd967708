use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::require_login;
use crate::state::AppState;
use crate::{auth, posts, profile};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(posts::home))
        .route("/post/{id}", get(posts::get_post))
        .route("/avatar/{username}", get(profile::avatar))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/guest", post(auth::guest))
        .route("/logout", get(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/like/{id}", post(posts::like_post))
        .route("/delete/{id}", post(posts::delete_post))
        .route("/profile", get(profile::profile))
        .route("/profile/avatar", post(profile::regenerate_avatar))
        .layer(middleware::from_fn_with_state(state.clone(), require_login))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
}
