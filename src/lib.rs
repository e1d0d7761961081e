//! # Sociostack
//!
//! Backend of a small social network:
//! - RESTful HTTP API for accounts, posts, likes, comments, follows,
//!   notifications and direct messages
//! - WebSocket relay pushing messages and read receipts in real time
//! - PostgreSQL storage, or an in-memory store for development and tests
//! - Optional Redis pub/sub so the relay spans several instances
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities and repository traits
//! - **Application Layer**: Services, DTOs and the relay event contract
//! - **Infrastructure Layer**: Stores, Redis, image host and metrics
//! - **Presentation Layer**: HTTP handlers, middleware and the WebSocket relay
//!
//! ## Module Structure
//!
//! ```text
//! sociostack/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects and repository traits
//! +-- application/    Services, DTOs, relay events, image policy
//! +-- infrastructure/ PostgreSQL, memory store, Redis, images, metrics
//! +-- presentation/   HTTP routes, middleware and WebSocket relay
//! +-- shared/         Errors and request validation
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Presentation layer
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
