//! API endpoint tests, one module per resource.

mod auth_tests;
mod health_tests;
mod message_tests;
mod notification_tests;
mod post_tests;
mod socket_tests;
mod user_tests;
