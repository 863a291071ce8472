//! Todo contracts
//!
//! Attribute rules for create/update live on the model input structs;
//! this module covers evidence batches and evaluations.

use oo_core::error::ValidationErrors;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::base::{AttributesContract, Contract, ValidationResult};
use crate::files::{FileRules, UploadedFile};

/// Limits for one evidence submission
#[derive(Debug, Clone)]
pub struct EvidenceBatchContract {
    pub max_files: usize,
    pub rules: FileRules,
}

impl EvidenceBatchContract {
    pub fn new(max_files: usize, rules: FileRules) -> Self {
        Self { max_files, rules }
    }
}

impl<F: UploadedFile + Sync> Contract<[F]> for EvidenceBatchContract {
    /// A batch needs 1..=max_files acceptable files; larger batches are
    /// rejected as a whole, never truncated
    fn validate(&self, files: &[F]) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if files.is_empty() {
            errors.add("evidence", "is required");
        } else if files.len() > self.max_files {
            errors.add(
                "evidence",
                format!(
                    "may contain at most {} files ({} given)",
                    self.max_files,
                    files.len()
                ),
            );
        }

        for file in files {
            self.rules.check("evidence", file, &mut errors);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationAction {
    Approve,
    Rework,
}

impl EvaluationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationAction::Approve => "approve",
            EvaluationAction::Rework => "rework",
        }
    }
}

/// Whether the evaluator judged one todo or the owner's whole workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationScope {
    #[default]
    Individual,
    Overall,
}

/// Evaluation payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluateTodo {
    pub action: EvaluationAction,
    #[serde(default, alias = "type")]
    pub scope: EvaluationScope,
    pub notes: Option<String>,
    /// Only used when approving
    #[validate(range(min = 0, max = 300, message = "must be between 0 and 300"))]
    pub warning_points: Option<i32>,
}

impl EvaluateTodo {
    pub fn approve() -> Self {
        Self {
            action: EvaluationAction::Approve,
            scope: EvaluationScope::Individual,
            notes: None,
            warning_points: None,
        }
    }

    pub fn rework() -> Self {
        Self {
            action: EvaluationAction::Rework,
            ..Self::approve()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_warning_points(mut self, points: i32) -> Self {
        self.warning_points = Some(points);
        self
    }

    /// Points that actually produce a warning
    pub fn effective_points(&self) -> i32 {
        match self.action {
            EvaluationAction::Approve => self.warning_points.unwrap_or(0),
            EvaluationAction::Rework => 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EvaluationContract;

impl Contract<EvaluateTodo> for EvaluationContract {
    fn validate(&self, input: &EvaluateTodo) -> ValidationResult {
        AttributesContract.validate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::test_support::{file, FakeFile};

    fn contract() -> EvidenceBatchContract {
        let exts: Vec<String> = ["jpg", "png", "pdf"].iter().map(|s| s.to_string()).collect();
        EvidenceBatchContract::new(5, FileRules::new(2 * 1024 * 1024, &exts))
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let files: Vec<FakeFile> = vec![];
        let errors = contract().validate(files.as_slice()).unwrap_err();
        assert_eq!(errors.get("evidence"), Some(&vec!["is required".to_string()]));
    }

    #[test]
    fn test_five_files_pass_six_fail() {
        let five: Vec<FakeFile> = (0..5).map(|_| file("a.png", 100)).collect();
        assert!(contract().validate(five.as_slice()).is_ok());

        let six: Vec<FakeFile> = (0..6).map(|_| file("a.png", 100)).collect();
        let errors = contract().validate(six.as_slice()).unwrap_err();
        assert!(errors.has_error("evidence"));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let files = vec![file("notes.docx", 100)];
        assert!(contract().validate(files.as_slice()).is_err());
    }

    #[test]
    fn test_warning_points_bounds() {
        let contract = EvaluationContract;
        assert!(contract.validate(&EvaluateTodo::approve().with_warning_points(300)).is_ok());
        assert!(contract.validate(&EvaluateTodo::approve().with_warning_points(301)).is_err());
        assert!(contract.validate(&EvaluateTodo::approve().with_warning_points(-1)).is_err());
    }

    #[test]
    fn test_rework_never_carries_points() {
        let input = EvaluateTodo::rework().with_warning_points(50);
        assert_eq!(input.effective_points(), 0);
        assert_eq!(EvaluateTodo::approve().with_warning_points(50).effective_points(), 50);
    }

    #[test]
    fn test_scope_accepts_type_alias() {
        let input: EvaluateTodo =
            serde_json::from_str(r#"{"action":"approve","type":"overall"}"#).unwrap();
        assert_eq!(input.scope, EvaluationScope::Overall);
    }
}
