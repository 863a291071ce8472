//! Todo lifecycle transitions
//!
//! Every operation takes the current todo by reference and returns the next
//! value. The input is never modified, so a rejected transition leaves the
//! caller's copy untouched.

use chrono::{DateTime, Utc};
use oo_core::traits::Id;
use oo_core::types::Locale;

use super::model::{Todo, TodoStatus, UpdateTodo};
use crate::transition::TransitionError;

const ENTITY: &str = "todo";

/// Actions that move a todo through its workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    Start,
    SubmitForChecking,
    /// Text edits before checking
    EditDetails,
    /// Full evidence replacement while checking
    ResubmitEvidence,
    Approve,
    Rework,
    SubmitImprovement,
}

impl TodoAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoAction::Start => "start",
            TodoAction::SubmitForChecking => "submit",
            TodoAction::EditDetails => "update",
            TodoAction::ResubmitEvidence => "update evidence of",
            TodoAction::Approve => "approve",
            TodoAction::Rework => "rework",
            TodoAction::SubmitImprovement => "submit improvement for",
        }
    }
}

impl TodoStatus {
    /// The status reached by applying `action`, if the edge exists
    pub fn apply(self, action: TodoAction) -> Result<TodoStatus, TransitionError> {
        use TodoAction::*;
        use TodoStatus::*;

        match (self, action) {
            (NotStarted, Start) => Ok(InProgress),
            (InProgress, SubmitForChecking) => Ok(Checking),
            (NotStarted | InProgress, EditDetails) => Ok(self),
            (Checking, ResubmitEvidence) => Ok(Checking),
            (Checking | Reworked, Approve) => Ok(Completed),
            (Checking | Reworked, Rework) => Ok(Evaluating),
            (Evaluating, SubmitImprovement) => Ok(Reworked),
            (_, Approve | Rework) => Err(TransitionError::phase(ENTITY, self, "evaluation")),
            (_, SubmitImprovement) => Err(TransitionError::phase(ENTITY, self, "improvement")),
            _ => Err(TransitionError::invalid(ENTITY, self, action.as_str())),
        }
    }
}

/// Who evaluated a todo and what they wrote
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub evaluator_id: Id,
    /// e.g. "Dina (GA)"
    pub checker_display: String,
    /// Replaces the todo notes when present
    pub notes: Option<String>,
}

impl Todo {
    /// A fresh todo in `not_started`
    pub fn create(
        user_id: Id,
        title: String,
        description: Option<String>,
        due_date: Option<chrono::NaiveDate>,
        scheduled_date: Option<chrono::NaiveDate>,
        daily_sequence: i32,
        now: DateTime<Utc>,
    ) -> Todo {
        Todo {
            user_id,
            title,
            description,
            due_date,
            scheduled_date,
            daily_sequence: daily_sequence.max(1),
            created_at: Some(now),
            updated_at: Some(now),
            ..Todo::default()
        }
    }

    pub fn start(&self, now: DateTime<Utc>) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::Start)?;
        Ok(Todo {
            status,
            started_at: Some(now),
            updated_at: Some(now),
            ..self.clone()
        })
    }

    /// Attaches the first evidence batch and records the work time
    pub fn submit_for_checking(
        &self,
        evidence_paths: Vec<String>,
        now: DateTime<Utc>,
        locale: Locale,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::SubmitForChecking)?;

        let started_at = self.started_at.unwrap_or(now);
        let submitted_at = now.max(started_at);
        let minutes = (submitted_at - started_at).num_minutes().max(0);

        Ok(Todo {
            status,
            started_at: Some(started_at),
            submitted_at: Some(submitted_at),
            total_work_time: Some(minutes),
            work_duration: Some(locale.duration_label(minutes)),
            evidence_paths,
            updated_at: Some(now),
            ..self.clone()
        })
    }

    /// Applies text edits; only allowed before checking
    pub fn with_details(
        &self,
        changes: &UpdateTodo,
        now: DateTime<Utc>,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::EditDetails)?;
        let mut next = self.clone();
        next.status = status;
        if let Some(title) = &changes.title {
            next.title = title.clone();
        }
        if let Some(description) = &changes.description {
            next.description = Some(description.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string);
        }
        if changes.due_date.is_some() {
            next.due_date = changes.due_date;
        }
        if changes.scheduled_date.is_some() {
            next.scheduled_date = changes.scheduled_date;
        }
        next.updated_at = Some(now);
        Ok(next)
    }

    /// Replaces every evidence file while checking
    pub fn resubmit_evidence(
        &self,
        evidence_paths: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::ResubmitEvidence)?;
        Ok(Todo {
            status,
            evidence_paths,
            updated_at: Some(now),
            ..self.clone()
        })
    }

    /// Completes the todo; `evidence_paths` are the renamed files
    pub fn approve(
        &self,
        evaluation: &EvaluationRecord,
        evidence_paths: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::Approve)?;
        Ok(self.evaluated(status, evaluation, evidence_paths, now))
    }

    /// Sends the todo back to its owner
    pub fn send_back(
        &self,
        evaluation: &EvaluationRecord,
        evidence_paths: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::Rework)?;
        Ok(self.evaluated(status, evaluation, evidence_paths, now))
    }

    /// Owner answers a rework request, optionally with new evidence
    pub fn submit_improvement(
        &self,
        replacement: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> Result<Todo, TransitionError> {
        let status = self.status.apply(TodoAction::SubmitImprovement)?;
        Ok(Todo {
            status,
            evidence_paths: replacement.unwrap_or_else(|| self.evidence_paths.clone()),
            updated_at: Some(now),
            ..self.clone()
        })
    }

    /// Evaluator notes; allowed in any status
    pub fn with_notes(&self, notes: Option<String>, now: DateTime<Utc>) -> Todo {
        Todo {
            notes,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    /// Same todo pointing at different evidence files
    pub fn with_evidence(&self, evidence_paths: Vec<String>) -> Todo {
        Todo {
            evidence_paths,
            ..self.clone()
        }
    }

    fn evaluated(
        &self,
        status: TodoStatus,
        evaluation: &EvaluationRecord,
        evidence_paths: Vec<String>,
        now: DateTime<Utc>,
    ) -> Todo {
        Todo {
            status,
            evidence_paths,
            checked_by: Some(evaluation.evaluator_id),
            checker_display: Some(evaluation.checker_display.clone()),
            notes: evaluation.notes.clone().or_else(|| self.notes.clone()),
            updated_at: Some(now),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 2, 0, 0).unwrap()
    }

    fn todo() -> Todo {
        Todo::create(7, "Write report".into(), None, None, None, 1, now())
    }

    fn evaluation() -> EvaluationRecord {
        EvaluationRecord {
            evaluator_id: 2,
            checker_display: "Dina (GA)".into(),
            notes: Some("Looks good".into()),
        }
    }

    #[test]
    fn test_only_defined_edges_are_accepted() {
        use TodoAction::*;
        use TodoStatus::*;

        let actions = [
            Start,
            SubmitForChecking,
            EditDetails,
            ResubmitEvidence,
            Approve,
            Rework,
            SubmitImprovement,
        ];
        let allowed = [
            (NotStarted, Start, InProgress),
            (InProgress, SubmitForChecking, Checking),
            (NotStarted, EditDetails, NotStarted),
            (InProgress, EditDetails, InProgress),
            (Checking, ResubmitEvidence, Checking),
            (Checking, Approve, Completed),
            (Reworked, Approve, Completed),
            (Checking, Rework, Evaluating),
            (Reworked, Rework, Evaluating),
            (Evaluating, SubmitImprovement, Reworked),
        ];

        for status in TodoStatus::ALL {
            for action in actions {
                let expected = allowed
                    .iter()
                    .find(|(from, a, _)| *from == status && *a == action)
                    .map(|(_, _, to)| *to);
                match expected {
                    Some(to) => assert_eq!(status.apply(action), Ok(to)),
                    None => assert!(status.apply(action).is_err(), "{status} {action:?}"),
                }
            }
        }
    }

    #[test]
    fn test_evaluation_outside_phase_is_invalid_phase() {
        let err = TodoStatus::Evaluating.apply(TodoAction::Approve).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidPhase { .. }));

        let err = TodoStatus::Checking.apply(TodoAction::SubmitImprovement).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidPhase { .. }));

        let err = TodoStatus::Checking.apply(TodoAction::Start).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn test_completed_is_terminal() {
        for action in [
            TodoAction::Start,
            TodoAction::SubmitForChecking,
            TodoAction::EditDetails,
            TodoAction::ResubmitEvidence,
            TodoAction::Approve,
            TodoAction::Rework,
            TodoAction::SubmitImprovement,
        ] {
            assert!(TodoStatus::Completed.apply(action).is_err());
        }
    }

    #[test]
    fn test_submit_records_work_time() {
        let started = todo().start(now()).unwrap();
        let submitted = started
            .submit_for_checking(
                vec!["evidence/a.png".into()],
                now() + Duration::minutes(125),
                Locale::Id,
            )
            .unwrap();

        assert_eq!(submitted.status, TodoStatus::Checking);
        assert_eq!(submitted.total_work_time, Some(125));
        assert_eq!(submitted.work_duration.as_deref(), Some("2 jam 5 menit"));
        assert!(submitted.started_at <= submitted.submitted_at);
    }

    #[test]
    fn test_submitted_at_never_precedes_start() {
        let started = todo().start(now()).unwrap();
        let submitted = started
            .submit_for_checking(vec!["a".into()], now() - Duration::minutes(5), Locale::En)
            .unwrap();
        assert_eq!(submitted.submitted_at, submitted.started_at);
        assert_eq!(submitted.total_work_time, Some(0));
    }

    #[test]
    fn test_rejected_transition_leaves_input_unchanged() {
        let original = todo();
        let before = original.clone();
        assert!(original.submit_for_checking(vec!["a".into()], now(), Locale::Id).is_err());
        assert_eq!(original, before);
    }

    #[test]
    fn test_edits_only_before_checking() {
        let changes = UpdateTodo {
            title: Some("Write final report".into()),
            ..Default::default()
        };
        let edited = todo().with_details(&changes, now()).unwrap();
        assert_eq!(edited.title, "Write final report");

        let checking = todo()
            .start(now())
            .unwrap()
            .submit_for_checking(vec!["a".into()], now(), Locale::Id)
            .unwrap();
        assert!(checking.with_details(&changes, now()).is_err());
    }

    #[test]
    fn test_blank_description_clears_it() {
        let described = todo()
            .with_details(
                &UpdateTodo {
                    description: Some("Both floors".into()),
                    ..Default::default()
                },
                now(),
            )
            .unwrap();
        assert_eq!(described.description.as_deref(), Some("Both floors"));

        let untouched = described.with_details(&UpdateTodo::default(), now()).unwrap();
        assert_eq!(untouched.description.as_deref(), Some("Both floors"));

        let cleared = described
            .with_details(
                &UpdateTodo {
                    description: Some(String::new()),
                    ..Default::default()
                },
                now(),
            )
            .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[test]
    fn test_rework_loop() {
        let checking = todo()
            .start(now())
            .unwrap()
            .submit_for_checking(vec!["a".into()], now(), Locale::Id)
            .unwrap();

        let sent_back = checking
            .send_back(&evaluation(), vec!["a-Rework".into()], now())
            .unwrap();
        assert_eq!(sent_back.status, TodoStatus::Evaluating);
        assert_eq!(sent_back.checked_by, Some(2));

        let improved = sent_back.submit_improvement(None, now()).unwrap();
        assert_eq!(improved.status, TodoStatus::Reworked);
        assert_eq!(improved.evidence_paths, vec!["a-Rework".to_string()]);

        let done = improved
            .approve(&evaluation(), vec!["a-Approved".into()], now())
            .unwrap();
        assert_eq!(done.status, TodoStatus::Completed);
        assert_eq!(done.checker_display.as_deref(), Some("Dina (GA)"));
        assert_eq!(done.notes.as_deref(), Some("Looks good"));
    }

    #[test]
    fn test_missing_evaluation_notes_keep_existing() {
        let checking = todo()
            .with_notes(Some("Remember the receipts".into()), now())
            .start(now())
            .unwrap()
            .submit_for_checking(vec!["a".into()], now(), Locale::Id)
            .unwrap();

        let record = EvaluationRecord {
            notes: None,
            ..evaluation()
        };
        let done = checking.approve(&record, vec!["a".into()], now()).unwrap();
        assert_eq!(done.notes.as_deref(), Some("Remember the receipts"));
    }
}
