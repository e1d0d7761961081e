//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the service.
//! All entities map directly to their corresponding database tables.
//!
//! - **User**: account identity and profile
//! - **Follow**: directed edge of the social graph
//! - **Post**: authored content with like edges and comments
//! - **Notification**: like/follow/post event addressed to a user
//! - **DirectMessage**: text sent from one user to another
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod follow;
mod message;
mod notification;
mod post;
mod user;

pub use follow::FollowRepository;
pub use message::{
    DirectMessage, MessageRepository, NewMessage, CHAT_HISTORY_LIMIT, MAX_MESSAGE_LENGTH,
};
pub use notification::{Notification, NotificationKind, NotificationRepository};
pub use post::{Comment, NewComment, NewPost, Post, PostFilter, PostLike, PostRepository};
pub use user::{NewUser, User, UserRepository, DEFAULT_BIO, DEFAULT_LINK};
