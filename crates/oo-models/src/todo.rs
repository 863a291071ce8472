//! Todo model and its lifecycle
//!
//! A todo moves through
//! `not_started -> in_progress -> checking -> {completed | evaluating}`,
//! with the rework loop `evaluating -> reworked -> {completed | evaluating}`.

pub mod model;
pub mod lifecycle;

pub use model::*;
pub use lifecycle::*;
