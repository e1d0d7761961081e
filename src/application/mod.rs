//! Application Layer
//!
//! Contains business logic services, data transfer objects (DTOs), and
//! the relay event contract. This layer orchestrates the flow of data
//! between the presentation and domain layers.

pub mod dto;
pub mod events;
pub mod images;
pub mod services;
