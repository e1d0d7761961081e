//! # Domain Layer
//!
//! The domain layer contains the core business objects of the service.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (User, Post, Notification, DirectMessage)
//!   and their repository traits
//! - **value_objects**: Immutable value types (image inputs and folders)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts

pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
