//! # oo-core
//!
//! Core types, traits, and utilities for OfficeOps RS.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and the `OoResult` alias
//! - Core traits (Entity, Identifiable)
//! - Roles and locales
//! - Pagination types
//! - Clock and regional time helpers
//! - Configuration types

pub mod error;
pub mod result;
pub mod traits;
pub mod types;
pub mod pagination;
pub mod time;
pub mod config;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use types::*;
pub use pagination::*;
pub use time::*;
