use thiserror::Error;
use warble_avatar::AvatarError;
use warble_types::models::{PostId, UserId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("no free guest name after {0} attempts")]
    GuestAllocationExhausted(usize),

    #[error("post not found: {0}")]
    PostNotFound(PostId),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("{requester} may not modify post {post_id}")]
    Unauthorized { post_id: PostId, requester: String },

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid post: {0}")]
    InvalidPost(&'static str),

    #[error("username must not be empty")]
    InvalidUsername,

    #[error("avatar rendering failed: {0}")]
    Avatar(#[from] AvatarError),

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
