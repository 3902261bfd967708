use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use warble_types::models::{Post, PostId, User};

use crate::error::{Result, StoreError};

#[derive(Default)]
struct PostTable {
    posts: BTreeMap<PostId, Post>,
    last_id: PostId,
    last_created_at: Option<DateTime<Utc>>,
}

impl PostTable {
    /// Creation timestamps never run backwards, so id order and
    /// `created_at` order agree even if the wall clock steps back.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = self.last_created_at.map_or(now, |last| last.max(now));
        self.last_created_at = Some(ts);
        ts
    }
}

/// Owns every post. Ids are allocated under the same lock as inserts and
/// are never reused, even after deletion.
#[derive(Default)]
pub struct PostStore {
    table: Mutex<PostTable>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PostTable) -> Result<T>,
    {
        let mut table = self.table.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut table)
    }

    /// All posts, most recent first.
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        self.with_table(|table| Ok(table.posts.values().rev().cloned().collect()))
    }

    /// Posts written by `username`, most recent first.
    pub fn posts_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.with_table(|table| {
            Ok(table
                .posts
                .values()
                .rev()
                .filter(|p| p.author_username == username)
                .cloned()
                .collect())
        })
    }

    pub fn get_post(&self, id: PostId) -> Result<Post> {
        self.with_table(|table| table.posts.get(&id).cloned().ok_or(StoreError::PostNotFound(id)))
    }

    pub fn add_post(&self, title: &str, content: &str, author: &User) -> Result<Post> {
        if title.trim().is_empty() {
            return Err(StoreError::InvalidPost("title must not be empty"));
        }

        let post = self.with_table(|table| {
            table.last_id += 1;
            let post = Post {
                id: table.last_id,
                title: title.to_string(),
                content: content.to_string(),
                author_username: author.username.clone(),
                created_at: table.next_timestamp(),
                like_count: 0,
            };
            table.posts.insert(post.id, post.clone());
            Ok(post)
        })?;

        info!(post_id = post.id, author = %post.author_username, "Post created");
        Ok(post)
    }

    /// Likes are not de-duplicated per viewer; every call counts.
    pub fn increment_likes(&self, id: PostId) -> Result<Post> {
        self.with_table(|table| {
            let post = table.posts.get_mut(&id).ok_or(StoreError::PostNotFound(id))?;
            post.like_count += 1;
            debug!(post_id = id, likes = post.like_count, "Post liked");
            Ok(post.clone())
        })
    }

    /// Remove a post. Only its author may do so.
    pub fn delete_post(&self, id: PostId, requester_username: &str) -> Result<()> {
        self.with_table(|table| {
            let post = table.posts.get(&id).ok_or(StoreError::PostNotFound(id))?;
            if post.author_username != requester_username {
                warn!(post_id = id, requester = %requester_username, "Rejected delete by non-author");
                return Err(StoreError::Unauthorized {
                    post_id: id,
                    requester: requester_username.to_string(),
                });
            }

            table.posts.remove(&id);
            info!(post_id = id, author = %requester_username, "Post deleted");
            Ok(())
        })
    }

    pub fn len(&self) -> Result<usize> {
        self.with_table(|table| Ok(table.posts.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashSet;
    use std::thread;

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
            avatar: Bytes::new(),
            member_since: Utc::now(),
        }
    }

    fn ids(posts: &[Post]) -> Vec<PostId> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn list_is_newest_first() {
        let store = PostStore::new();
        let alice = user(1, "Alice");
        let a = store.add_post("A", "first", &alice).unwrap();
        let b = store.add_post("B", "second", &alice).unwrap();
        let c = store.add_post("C", "third", &alice).unwrap();

        let posts = store.list_posts().unwrap();
        assert_eq!(ids(&posts), vec![c.id, b.id, a.id]);
        assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        // Fresh call recomputes from current state
        assert_eq!(store.list_posts().unwrap(), posts);
    }

    #[test]
    fn new_post_fields() {
        let store = PostStore::new();
        let post = store.add_post("Hello", "world", &user(7, "Alice")).unwrap();

        assert_eq!(post.id, 1);
        assert_eq!(post.author_username, "Alice");
        assert_eq!(post.like_count, 0);
        assert_eq!(store.get_post(1).unwrap(), post);
    }

    #[test]
    fn empty_title_rejected() {
        let store = PostStore::new();
        let err = store.add_post("   ", "body", &user(1, "Alice")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPost(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn ids_never_reused_after_delete() {
        let store = PostStore::new();
        let alice = user(1, "Alice");
        let first = store.add_post("one", "", &alice).unwrap();
        let second = store.add_post("two", "", &alice).unwrap();

        store.delete_post(second.id, "Alice").unwrap();
        let third = store.add_post("three", "", &alice).unwrap();

        assert!(first.id < second.id && second.id < third.id);
        assert_eq!(ids(&store.list_posts().unwrap()), vec![third.id, first.id]);
    }

    #[test]
    fn only_author_may_delete() {
        let store = PostStore::new();
        let alice = user(1, "Alice");
        for _ in 0..4 {
            store.add_post("filler", "", &alice).unwrap();
        }
        let post = store.add_post("mine", "", &alice).unwrap();
        assert_eq!(post.id, 5);

        let err = store.delete_post(5, "Bob").unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized { post_id: 5, .. }));
        assert!(store.get_post(5).is_ok());

        store.delete_post(5, "Alice").unwrap();
        assert!(!ids(&store.list_posts().unwrap()).contains(&5));
        assert!(matches!(store.delete_post(5, "Alice"), Err(StoreError::PostNotFound(5))));
    }

    #[test]
    fn likes_accumulate() {
        let store = PostStore::new();
        let post = store.add_post("likeable", "", &user(1, "Alice")).unwrap();

        assert_eq!(store.increment_likes(post.id).unwrap().like_count, 1);
        for _ in 0..4 {
            store.increment_likes(post.id).unwrap();
        }
        assert_eq!(store.get_post(post.id).unwrap().like_count, 5);
    }

    #[test]
    fn like_missing_post() {
        let store = PostStore::new();
        assert!(matches!(store.increment_likes(3), Err(StoreError::PostNotFound(3))));
    }

    #[test]
    fn posts_by_author_filters() {
        let store = PostStore::new();
        let alice = user(1, "Alice");
        let bob = user(2, "Bob");
        let a1 = store.add_post("a1", "", &alice).unwrap();
        store.add_post("b1", "", &bob).unwrap();
        let a2 = store.add_post("a2", "", &alice).unwrap();

        assert_eq!(ids(&store.posts_by_author("Alice").unwrap()), vec![a2.id, a1.id]);
        assert!(store.posts_by_author("Carol").unwrap().is_empty());
    }

    #[test]
    fn concurrent_adds_allocate_distinct_ids() {
        let store = PostStore::new();
        let alice = user(1, "Alice");

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        store.add_post("t", "c", &alice).unwrap();
                    }
                });
            }
        });

        let posts = store.list_posts().unwrap();
        let unique: HashSet<_> = ids(&posts).into_iter().collect();
        assert_eq!(posts.len(), 200);
        assert_eq!(unique.len(), 200);
        assert_eq!(posts.first().unwrap().id, 200);
    }
}
