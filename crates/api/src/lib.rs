//! JSON API for LinkGator.
//!
//! This crate provides the REST API behind the admin and client pages:
//!
//! - **Plugins**: listing plugins and updating their settings
//! - **Themes**: theme plugins and their CSS variables
//! - **Posts and followers**: read/write through the database capability
//! - **Auth**: sign-up, sign-in and sessions through the auth capability
//! - **Metrics**: federation counters
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
