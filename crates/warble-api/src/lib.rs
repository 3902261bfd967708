pub mod auth;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AppStateInner};
