//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL) and the in-memory store
//! - Redis connection and relay pub/sub
//! - The image hosting API client
//! - Prometheus metrics

pub mod cache;
pub mod database;
pub mod images;
pub mod memory;
pub mod metrics;
pub mod pubsub;
pub mod repositories;
