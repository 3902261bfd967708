use tracing::info;

use crate::error::Result;
use crate::posts::PostStore;
use crate::users::UserRegistry;

const DEMO: [(&str, &str, &str); 3] = [
    ("SampleUser", "Sample Post", "This is a sample post."),
    ("AnotherUser", "Another Post", "This is another sample post."),
    ("YetAnotherUser", "Yet Another Post", "This is yet another sample post."),
];

/// Populate empty stores with a few demo users, one post each.
/// Goes through the public operations so ids and uniqueness hold as usual.
pub fn seed_demo(users: &UserRegistry, posts: &PostStore) -> Result<()> {
    for (username, title, content) in DEMO {
        let user = users.register(username)?;
        posts.add_post(title, content, &user)?;
    }

    info!(users = DEMO.len(), posts = DEMO.len(), "Demo data seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn seeds_users_and_posts() {
        let users = UserRegistry::default();
        let posts = PostStore::new();
        seed_demo(&users, &posts).unwrap();

        assert_eq!(users.len().unwrap(), 3);
        let listed = posts.list_posts().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].author_username, "YetAnotherUser");
        assert_eq!(listed[2].title, "Sample Post");
    }

    #[test]
    fn seeding_twice_hits_uniqueness() {
        let users = UserRegistry::default();
        let posts = PostStore::new();
        seed_demo(&users, &posts).unwrap();

        assert!(matches!(
            seed_demo(&users, &posts),
            Err(StoreError::DuplicateUsername(_))
        ));
    }
}
