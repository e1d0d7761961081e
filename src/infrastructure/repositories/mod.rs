//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - Accounts and profile search
//! - **PgFollowRepository** - The directed follow graph
//! - **PgPostRepository** - Posts with their likes and comments
//! - **PgNotificationRepository** - Like, follow and post notifications
//! - **PgMessageRepository** - Direct messages with soft deletion
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use sociostack::infrastructure::repositories::{PgPostRepository, PgUserRepository};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let users = PgUserRepository::new(pool.clone());
//!     let posts = PgPostRepository::new(pool);
//! }
//! ```

pub mod follow_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod post_repository;
pub mod user_repository;

pub use follow_repository::PgFollowRepository;
pub use message_repository::PgMessageRepository;
pub use notification_repository::PgNotificationRepository;
pub use post_repository::PgPostRepository;
pub use user_repository::PgUserRepository;
