//! # oo-models
//!
//! Domain models for OfficeOps RS.
//!
//! Every entity implements the core traits from `oo-core` (Entity,
//! Identifiable). State changes are expressed as functions that
//! take the current value and return a new one or a [`TransitionError`].

pub use oo_core::traits::{Entity, Id, Identifiable};

pub mod transition;

// Todo workflow
pub mod todo;
pub mod todo_warning;
pub mod user;

// Office resources
pub mod request_item;
pub mod procurement;
pub mod asset;
pub mod meeting;
pub mod visitor;

// Re-exports for convenience
pub use transition::TransitionError;
pub use todo::{EvaluationRecord, NewTodo, Todo, TodoAction, TodoStatus, UpdateTodo};
pub use todo_warning::{TodoWarning, WarningLevel, MAX_WARNING_POINTS};
pub use user::User;
pub use request_item::{NewRequestItem, RequestItem, RequestStatus};
pub use procurement::{NewProcurement, Procurement};
pub use asset::{Asset, AssetStatus, NewAsset};
pub use meeting::{Meeting, MeetingStatus, NewMeeting};
pub use visitor::{NewVisitor, Visitor, VisitorStatus};
