use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};
use warble_avatar::AvatarGenerator;
use warble_types::models::{User, UserId};

use crate::error::{Result, StoreError};
use crate::guest::GuestNameGenerator;

/// Bound on guest-name collisions before giving up.
pub const DEFAULT_GUEST_ATTEMPTS: usize = 16;

#[derive(Default)]
struct UserTable {
    users: BTreeMap<UserId, User>,
    by_username: HashMap<String, UserId>,
    last_id: UserId,
}

/// Owns every known user. Usernames are unique and case-sensitive; ids are
/// handed out in increasing order and never reused.
pub struct UserRegistry {
    table: Mutex<UserTable>,
    avatars: AvatarGenerator,
    guest_names: GuestNameGenerator,
    max_guest_attempts: usize,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new(AvatarGenerator::default(), GuestNameGenerator::default())
    }
}

impl UserRegistry {
    pub fn new(avatars: AvatarGenerator, guest_names: GuestNameGenerator) -> Self {
        Self {
            table: Mutex::new(UserTable::default()),
            avatars,
            guest_names,
            max_guest_attempts: DEFAULT_GUEST_ATTEMPTS,
        }
    }

    pub fn with_max_guest_attempts(mut self, attempts: usize) -> Self {
        self.max_guest_attempts = attempts;
        self
    }

    fn with_table<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserTable) -> Result<T>,
    {
        let mut table = self.table.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut table)
    }

    fn render_avatar(&self, username: &str) -> Result<Bytes> {
        let letter = username.chars().next().ok_or(StoreError::InvalidUsername)?;
        Ok(Bytes::from(self.avatars.generate_default(letter)?))
    }

    pub fn register(&self, username: &str) -> Result<User> {
        if username.is_empty() {
            return Err(StoreError::InvalidUsername);
        }

        // Rendering is CPU-bound; keep it outside the critical section
        let avatar = self.render_avatar(username)?;

        let user = self.with_table(|table| {
            if table.by_username.contains_key(username) {
                return Err(StoreError::DuplicateUsername(username.to_string()));
            }

            table.last_id += 1;
            let user = User {
                id: table.last_id,
                username: username.to_string(),
                avatar,
                member_since: Utc::now(),
            };
            table.by_username.insert(user.username.clone(), user.id);
            table.users.insert(user.id, user.clone());
            Ok(user)
        })?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Register a user under a generated name, retrying on collisions up to
    /// the configured bound.
    pub fn create_guest(&self) -> Result<User> {
        for candidate in self.guest_names.candidates().take(self.max_guest_attempts) {
            if self.find_by_username(&candidate)?.is_some() {
                debug!(candidate = %candidate, "Guest name taken, retrying");
                continue;
            }

            // A concurrent registration may still win the name between the
            // lookup above and the insert; register re-checks under the lock.
            match self.register(&candidate) {
                Err(StoreError::DuplicateUsername(_)) => {
                    debug!(candidate = %candidate, "Guest name lost to concurrent registration");
                }
                other => return other,
            }
        }

        Err(StoreError::GuestAllocationExhausted(self.max_guest_attempts))
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_table(|table| {
            Ok(table
                .by_username
                .get(username)
                .and_then(|id| table.users.get(id))
                .cloned())
        })
    }

    pub fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        self.with_table(|table| Ok(table.users.get(&id).cloned()))
    }

    /// Re-render the avatar for a user's first letter and store it.
    pub fn regenerate_avatar(&self, id: UserId) -> Result<User> {
        let username = self
            .find_by_id(id)?
            .ok_or(StoreError::UserNotFound(id))?
            .username;
        let avatar = self.render_avatar(&username)?;

        self.with_table(|table| {
            let user = table.users.get_mut(&id).ok_or(StoreError::UserNotFound(id))?;
            user.avatar = avatar;
            debug!(user_id = id, "Avatar regenerated");
            Ok(user.clone())
        })
    }

    pub fn len(&self) -> Result<usize> {
        self.with_table(|table| Ok(table.users.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
