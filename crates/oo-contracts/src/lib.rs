//! # oo-contracts
//!
//! Contract validation for OfficeOps RS.
//!
//! Contracts check input before a service touches storage: attribute
//! constraints, evidence batches, evaluation payloads and visitor images.
//! Permission helpers turn the caller's role and ownership into
//! `Forbidden`/`NotFound` errors.

pub mod base;
pub mod files;
pub mod todos;
pub mod visitors;

pub use base::*;
pub use files::{FileRules, UploadedFile};
pub use todos::{EvaluateTodo, EvaluationAction, EvaluationContract, EvaluationScope, EvidenceBatchContract};
pub use visitors::{VisitorImages, VisitorImagesContract};
