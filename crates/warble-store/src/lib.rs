//! In-memory identity and content stores.
//!
//! Each store keeps its entities behind a single mutex together with its id
//! counter, so check-then-insert and id allocation are atomic per instance.

pub mod error;
pub mod guest;
pub mod posts;
pub mod seed;
pub mod session;
pub mod users;

pub use error::{Result, StoreError};
pub use guest::GuestNameGenerator;
pub use posts::PostStore;
pub use session::{DEFAULT_SESSION_TTL, MemorySessions, SessionBinder, SessionSlots};
pub use users::UserRegistry;
