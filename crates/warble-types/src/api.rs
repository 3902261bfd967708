use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Post, User, UserId};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub avatar_url: String,
    pub member_since: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar_url: format!("/avatar/{}", user.username),
            member_since: user.member_since,
        }
    }
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

// -- Pages --

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub app_name: String,
    pub logged_in: bool,
    pub user: Option<UserResponse>,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub posts: Vec<Post>,
}
