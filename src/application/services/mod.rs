//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Signup, login, session tokens, password hashing
//! - **UserService**: Search, follow graph, suggestions, profile management
//! - **PostService**: Posts, likes, comments, listings
//! - **NotificationService**: Notification inbox
//! - **MessageService**: Direct messages and read receipts

pub mod auth_service;
pub mod message_service;
pub mod notification_service;
pub mod post_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{AuthError, AuthService, AuthServiceImpl, Claims};

// Re-export user service types
pub use user_service::{UserError, UserService, UserServiceImpl};

// Re-export post service types
pub use post_service::{PostError, PostService, PostServiceImpl};

// Re-export notification service types
pub use notification_service::{
    NotificationError, NotificationService, NotificationServiceImpl,
};

// Re-export message service types
pub use message_service::{MessageError, MessageService, MessageServiceImpl};
