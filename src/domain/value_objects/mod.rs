//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **ImageInput**: keep / clear / replace request for an image field
//! - **ImageFolder**: destination folder on the image host

mod image;

pub use image::*;
