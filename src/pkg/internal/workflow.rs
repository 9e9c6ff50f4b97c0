//! Resume review state machine.
//!
//! Every status change in the system goes through [`apply`], which consults
//! the single transition table below. No other code constructs a status
//! value for a stored record, and no handler performs its own role check
//! for a transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pkg::internal::adaptors::resumes::spec::{ResumeContent, ResumeRecord};
use crate::pkg::internal::auth::{Role, User};
use crate::prelude::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resume_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    Draft,
    PendingReview,
    ChangesRequested,
    ForwardedToAdmin,
    Hired,
    Rejected,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Draft => "draft",
            ResumeStatus::PendingReview => "pending_review",
            ResumeStatus::ChangesRequested => "changes_requested",
            ResumeStatus::ForwardedToAdmin => "forwarded_to_admin",
            ResumeStatus::Hired => "hired",
            ResumeStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    RequestChanges,
    Forward,
    Resubmit,
    DecideHire,
    DecideReject,
    ReturnToQueue,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Submit => "submit",
            Operation::RequestChanges => "request_changes",
            Operation::Forward => "forward",
            Operation::Resubmit => "resubmit",
            Operation::DecideHire => "decide_hire",
            Operation::DecideReject => "decide_reject",
            Operation::ReturnToQueue => "return_to_queue",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct Transition {
    pub op: Operation,
    pub from: ResumeStatus,
    pub allowed: &'static [Role],
    pub to: ResumeStatus,
}

/// The whitelist of status mutations. `hired` and `rejected` are terminal:
/// no row leads out of them.
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        op: Operation::Submit,
        from: ResumeStatus::Draft,
        allowed: &[Role::Candidate],
        to: ResumeStatus::PendingReview,
    },
    Transition {
        op: Operation::RequestChanges,
        from: ResumeStatus::PendingReview,
        allowed: &[Role::Mediator, Role::Admin],
        to: ResumeStatus::ChangesRequested,
    },
    Transition {
        op: Operation::Forward,
        from: ResumeStatus::PendingReview,
        allowed: &[Role::Mediator, Role::Admin],
        to: ResumeStatus::ForwardedToAdmin,
    },
    Transition {
        op: Operation::Resubmit,
        from: ResumeStatus::ChangesRequested,
        allowed: &[Role::Candidate],
        to: ResumeStatus::PendingReview,
    },
    Transition {
        op: Operation::DecideHire,
        from: ResumeStatus::ForwardedToAdmin,
        allowed: &[Role::Admin],
        to: ResumeStatus::Hired,
    },
    Transition {
        op: Operation::DecideReject,
        from: ResumeStatus::ForwardedToAdmin,
        allowed: &[Role::Admin],
        to: ResumeStatus::Rejected,
    },
    Transition {
        op: Operation::ReturnToQueue,
        from: ResumeStatus::ForwardedToAdmin,
        allowed: &[Role::Admin],
        to: ResumeStatus::PendingReview,
    },
];

fn transition_for(op: Operation) -> &'static Transition {
    TRANSITIONS
        .iter()
        .find(|t| t.op == op)
        .expect("every operation has exactly one transition table row")
}

/// Pure authorization guard, decoupled from routing: may `role` cause `op`
/// on a record currently in `state`?
pub fn can_perform(role: Role, op: Operation, state: ResumeStatus) -> bool {
    let t = transition_for(op);
    t.from == state && t.allowed.contains(&role)
}

/// Role gate alone, without a record in hand. Handlers refuse before the
/// lookup so the response never reveals whether an id exists to a role that
/// could not act on it anyway.
pub fn role_may_perform(role: Role, op: Operation) -> bool {
    transition_for(op).allowed.contains(&role)
}

/// Content edits are only allowed while the owner still controls the record.
pub fn can_edit_content(state: ResumeStatus) -> bool {
    matches!(
        state,
        ResumeStatus::Draft | ResumeStatus::ChangesRequested
    )
}

/// Submit guard: a resume needs a name, a way to reach the candidate and at
/// least one experience entry before it enters the review queue.
pub fn validate_submittable(content: &ResumeContent) -> Result<()> {
    if content.full_name.trim().is_empty() {
        return Err(Error::ValidationFailed(
            "full name must not be empty".into(),
        ));
    }
    if content.email.trim().is_empty() && content.phone.trim().is_empty() {
        return Err(Error::ValidationFailed(
            "at least one contact field (email or phone) is required".into(),
        ));
    }
    if content.experience.is_empty() {
        return Err(Error::ValidationFailed(
            "at least one experience entry is required".into(),
        ));
    }
    Ok(())
}

/// Applies `op` to the record in memory, enforcing role, ownership, current
/// state and content guards. On error the record is left untouched; the
/// caller persists the mutated record with a versioned compare-and-swap.
pub fn apply(
    record: &mut ResumeRecord,
    op: Operation,
    actor: &User,
    feedback: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let t = transition_for(op);

    if !t.allowed.contains(&actor.role) {
        return Err(Error::InvalidTransition(format!(
            "operation {} is not permitted for role {}",
            op, actor.role
        )));
    }
    if matches!(op, Operation::Submit | Operation::Resubmit) && actor.user_id != record.owner_id
    {
        return Err(Error::InvalidTransition(format!(
            "only the resume owner may {}",
            op
        )));
    }
    if record.status != t.from {
        return Err(Error::InvalidTransition(format!(
            "operation {} is not permitted while the resume is {}",
            op, record.status
        )));
    }

    let feedback = feedback.map(str::trim).filter(|f| !f.is_empty());
    match op {
        Operation::Submit | Operation::Resubmit => validate_submittable(&record.content)?,
        Operation::RequestChanges => {
            if feedback.is_none() {
                return Err(Error::ValidationFailed(
                    "feedback must not be empty when requesting changes".into(),
                ));
            }
        }
        _ => {}
    }

    match op {
        // a fresh submission carries no stale reviewer note
        Operation::Submit => record.feedback = None,
        Operation::RequestChanges => record.feedback = feedback.map(String::from),
        Operation::Forward | Operation::DecideHire | Operation::DecideReject => {
            if let Some(f) = feedback {
                record.feedback = Some(f.to_string());
            }
        }
        // resubmit keeps the reviewer's note until the next review pass
        Operation::Resubmit | Operation::ReturnToQueue => {}
    }

    record.status = t.to;
    record.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::resumes::spec::Experience;
    use sqlx::types::Json;
    use tracing_test::traced_test;

    fn user(id: &str, role: Role) -> User {
        User {
            user_id: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            role,
        }
    }

    fn submittable_content() -> ResumeContent {
        ResumeContent {
            full_name: "Jordan Lee".into(),
            email: "jordan@example.com".into(),
            summary: "Aspiring product designer".into(),
            experience: Json(vec![Experience {
                role: "Designer".into(),
                company: "Acme".into(),
                duration: "2020-2023".into(),
                description: "Led design".into(),
            }]),
            ..Default::default()
        }
    }

    fn record(owner: &str, status: ResumeStatus) -> ResumeRecord {
        ResumeRecord {
            id: "resume-1".into(),
            owner_id: owner.to_string(),
            status,
            feedback: None,
            version: 1,
            content: submittable_content(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn every_operation_has_one_table_row() {
        for op in [
            Operation::Submit,
            Operation::RequestChanges,
            Operation::Forward,
            Operation::Resubmit,
            Operation::DecideHire,
            Operation::DecideReject,
            Operation::ReturnToQueue,
        ] {
            assert_eq!(TRANSITIONS.iter().filter(|t| t.op == op).count(), 1);
        }
    }

    #[test]
    fn submit_without_experience_fails_validation() {
        let mut rec = record("cand-1", ResumeStatus::Draft);
        rec.content.experience = Json(vec![]);
        let err = apply(
            &mut rec,
            Operation::Submit,
            &user("cand-1", Role::Candidate),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
        assert_eq!(rec.status, ResumeStatus::Draft);
    }

    #[test]
    fn submit_without_contact_names_the_missing_requirement() {
        let mut rec = record("cand-1", ResumeStatus::Draft);
        rec.content.email = "".into();
        rec.content.phone = "".into();
        let err = apply(
            &mut rec,
            Operation::Submit,
            &user("cand-1", Role::Candidate),
            None,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            Error::ValidationFailed(msg) => assert!(msg.contains("contact")),
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn submit_moves_draft_to_pending_and_clears_stale_feedback() {
        let mut rec = record("cand-1", ResumeStatus::Draft);
        rec.feedback = Some("old note".into());
        apply(
            &mut rec,
            Operation::Submit,
            &user("cand-1", Role::Candidate),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rec.status, ResumeStatus::PendingReview);
        assert_eq!(rec.feedback, None);
    }

    #[test]
    fn only_the_owner_can_submit() {
        let mut rec = record("cand-1", ResumeStatus::Draft);
        let err = apply(
            &mut rec,
            Operation::Submit,
            &user("cand-2", Role::Candidate),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[test]
    fn mediator_forward_sets_feedback_and_status() {
        let mut rec = record("cand-1", ResumeStatus::PendingReview);
        apply(
            &mut rec,
            Operation::Forward,
            &user("mediator-1", Role::Mediator),
            Some("Looks solid"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rec.status, ResumeStatus::ForwardedToAdmin);
        assert_eq!(rec.feedback.as_deref(), Some("Looks solid"));
    }

    #[test]
    fn forward_is_not_idempotent() {
        let mut rec = record("cand-1", ResumeStatus::PendingReview);
        let mediator = user("mediator-1", Role::Mediator);
        apply(&mut rec, Operation::Forward, &mediator, None, Utc::now()).unwrap();
        let err = apply(&mut rec, Operation::Forward, &mediator, None, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        assert_eq!(rec.status, ResumeStatus::ForwardedToAdmin);
    }

    #[test]
    fn request_changes_requires_feedback() {
        let mut rec = record("cand-1", ResumeStatus::PendingReview);
        let err = apply(
            &mut rec,
            Operation::RequestChanges,
            &user("mediator-1", Role::Mediator),
            Some("   "),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
        assert_eq!(rec.status, ResumeStatus::PendingReview);
    }

    #[traced_test]
    #[test]
    fn review_round_trip_retains_feedback() {
        let mut rec = record("cand-1", ResumeStatus::Draft);
        let candidate = user("cand-1", Role::Candidate);
        apply(&mut rec, Operation::Submit, &candidate, None, Utc::now()).unwrap();
        apply(
            &mut rec,
            Operation::RequestChanges,
            &user("mediator-1", Role::Mediator),
            Some("tighten the summary"),
            Utc::now(),
        )
        .unwrap();
        apply(&mut rec, Operation::Resubmit, &candidate, None, Utc::now()).unwrap();
        assert_eq!(rec.status, ResumeStatus::PendingReview);
        assert_eq!(rec.feedback.as_deref(), Some("tighten the summary"));
    }

    #[test]
    fn owner_cannot_decide_hire_regardless_of_state() {
        let candidate = user("cand-1", Role::Candidate);
        for status in [
            ResumeStatus::Draft,
            ResumeStatus::PendingReview,
            ResumeStatus::ChangesRequested,
            ResumeStatus::ForwardedToAdmin,
            ResumeStatus::Hired,
            ResumeStatus::Rejected,
        ] {
            let mut rec = record("cand-1", status);
            let err =
                apply(&mut rec, Operation::DecideHire, &candidate, None, Utc::now()).unwrap_err();
            assert!(matches!(err, Error::InvalidTransition(_)));
            assert_eq!(rec.status, status);
        }
    }

    #[test]
    fn mediator_cannot_reach_terminal_states() {
        let mediator = user("mediator-1", Role::Mediator);
        let mut rec = record("cand-1", ResumeStatus::ForwardedToAdmin);
        for op in [Operation::DecideHire, Operation::DecideReject] {
            let err = apply(&mut rec, op, &mediator, None, Utc::now()).unwrap_err();
            assert!(matches!(err, Error::InvalidTransition(_)));
        }
    }

    #[test]
    fn admin_decisions_and_return_to_queue() {
        let admin = user("admin-1", Role::Admin);
        let mut rec = record("cand-1", ResumeStatus::ForwardedToAdmin);
        apply(
            &mut rec,
            Operation::ReturnToQueue,
            &admin,
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rec.status, ResumeStatus::PendingReview);

        let mut rec = record("cand-1", ResumeStatus::ForwardedToAdmin);
        apply(
            &mut rec,
            Operation::DecideHire,
            &admin,
            Some("welcome aboard"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rec.status, ResumeStatus::Hired);
        assert_eq!(rec.feedback.as_deref(), Some("welcome aboard"));
    }

    #[test]
    fn rejected_is_terminal() {
        let admin = user("admin-1", Role::Admin);
        let mut rec = record("cand-1", ResumeStatus::ForwardedToAdmin);
        apply(&mut rec, Operation::DecideReject, &admin, None, Utc::now()).unwrap();
        assert_eq!(rec.status, ResumeStatus::Rejected);

        let err = apply(
            &mut rec,
            Operation::ReturnToQueue,
            &admin,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        assert_eq!(rec.status, ResumeStatus::Rejected);
    }

    #[test]
    fn no_operation_leaves_terminal_states() {
        let all_ops = [
            Operation::Submit,
            Operation::RequestChanges,
            Operation::Forward,
            Operation::Resubmit,
            Operation::DecideHire,
            Operation::DecideReject,
            Operation::ReturnToQueue,
        ];
        for status in [ResumeStatus::Hired, ResumeStatus::Rejected] {
            for op in all_ops {
                for role in [Role::Candidate, Role::Mediator, Role::Admin] {
                    assert!(!can_perform(role, op, status));
                }
                let mut rec = record("cand-1", status);
                let actor = user("cand-1", Role::Admin);
                assert!(apply(&mut rec, op, &actor, Some("x"), Utc::now()).is_err());
                assert_eq!(rec.status, status);
            }
        }
    }

    #[test]
    fn role_gate_holds_without_a_record_in_hand() {
        assert!(!role_may_perform(Role::Candidate, Operation::DecideHire));
        assert!(!role_may_perform(Role::Candidate, Operation::Forward));
        assert!(!role_may_perform(Role::Mediator, Operation::DecideHire));
        assert!(!role_may_perform(Role::Admin, Operation::Submit));
        assert!(role_may_perform(Role::Mediator, Operation::RequestChanges));
        assert!(role_may_perform(Role::Admin, Operation::ReturnToQueue));
    }

    #[test]
    fn can_perform_matches_the_table() {
        assert!(can_perform(
            Role::Mediator,
            Operation::Forward,
            ResumeStatus::PendingReview
        ));
        assert!(can_perform(
            Role::Admin,
            Operation::RequestChanges,
            ResumeStatus::PendingReview
        ));
        assert!(!can_perform(
            Role::Candidate,
            Operation::Forward,
            ResumeStatus::PendingReview
        ));
        assert!(!can_perform(
            Role::Mediator,
            Operation::Forward,
            ResumeStatus::Draft
        ));
    }

    #[test]
    fn content_edits_only_while_owner_controls_the_record() {
        assert!(can_edit_content(ResumeStatus::Draft));
        assert!(can_edit_content(ResumeStatus::ChangesRequested));
        for status in [
            ResumeStatus::PendingReview,
            ResumeStatus::ForwardedToAdmin,
            ResumeStatus::Hired,
            ResumeStatus::Rejected,
        ] {
            assert!(!can_edit_content(status));
        }
    }
}
