//! Rejected state transitions

use oo_core::OoError;
use thiserror::Error;

/// Why a status change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The action is never valid from the current status
    #[error("cannot {action} {entity} in status {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    /// The record is not waiting for this kind of action
    #[error("{entity} in status {from} is not in {expected} phase")]
    InvalidPhase {
        entity: &'static str,
        from: String,
        expected: &'static str,
    },
}

impl TransitionError {
    pub fn invalid(entity: &'static str, from: impl ToString, action: &'static str) -> Self {
        TransitionError::InvalidTransition {
            entity,
            from: from.to_string(),
            action,
        }
    }

    pub fn phase(entity: &'static str, from: impl ToString, expected: &'static str) -> Self {
        TransitionError::InvalidPhase {
            entity,
            from: from.to_string(),
            expected,
        }
    }
}

impl From<TransitionError> for OoError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition {
                entity,
                from,
                action,
            } => OoError::invalid_transition(entity, from, action),
            TransitionError::InvalidPhase {
                entity,
                from,
                expected,
            } => OoError::invalid_phase(entity, from, expected),
        }
    }
}
