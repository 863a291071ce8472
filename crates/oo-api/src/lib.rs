//! # oo-api
//!
//! JSON API handlers for OfficeOps RS.
//!
//! Handlers authenticate the bearer token, decode the request (JSON or
//! multipart), call one service and render the result through the
//! representers. Every failure is an [`error::ApiError`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod representers;
pub mod routes;

pub use extractors::AppState;
pub use representers::DisplayFormats;
pub use routes::router;
