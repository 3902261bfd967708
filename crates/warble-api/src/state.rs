use std::sync::Arc;
use std::time::Duration;

use warble_store::{MemorySessions, PostStore, SessionBinder, UserRegistry};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserRegistry,
    pub posts: PostStore,
    pub sessions: SessionBinder<MemorySessions>,
    pub app_name: String,
}

impl AppStateInner {
    pub fn new(
        users: UserRegistry,
        posts: PostStore,
        app_name: impl Into<String>,
        session_ttl: Duration,
    ) -> AppState {
        Arc::new(Self {
            users,
            posts,
            sessions: SessionBinder::new(MemorySessions::with_ttl(session_ttl)),
            app_name: app_name.into(),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.slots().ttl()
    }
}
