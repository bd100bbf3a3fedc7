// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality gate: the accept/retry/reject state machine.
//
// `QualityGate::apply` is a pure `(state, event) -> state` function: it does
// no I/O and reads no clock, so every transition can be tested without a
// renderer or a network. The controller in `passcheck-app` owns the single
// live instance and feeds it events as acquisition and scoring complete.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::error::PasscheckError;
use crate::human_errors::humanize_error;
use crate::types::{AttemptCounter, ImageSource, QualityReport, QualityScore, SubmissionId};

pub const MSG_ACCEPTED: &str = "The Passport image is of good quality.";
pub const MSG_UPLOADED: &str = "Passport uploaded successfully!";
pub const MSG_RETRY: &str = "The image is not clear. Please upload a better version.";
pub const MSG_REJECTED: &str =
    "The image quality is still poor. Please try uploading it again with better quality.";

/// Thresholds the gate decides with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatePolicy {
    /// Scores at or above this are accepted.
    pub accept_threshold: f64,
    /// Total submissions before a poor photo is rejected.
    pub max_attempts: u8,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            accept_threshold: 0.6,
            max_attempts: 2,
        }
    }
}

impl From<&AppConfig> for GatePolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            accept_threshold: config.accept_threshold,
            max_attempts: config.max_attempts.max(1),
        }
    }
}

/// Where the current photo is in its check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// Nothing in flight.
    Idle,
    /// A scoring request is outstanding.
    Submitted,
    /// Score met the threshold.
    Accepted,
    /// Poor score with attempts left; the image was cleared.
    RetryRequested,
    /// Poor score on the final attempt.
    Rejected,
    /// The check itself failed (transport or unusable response).
    Failed,
}

impl GatePhase {
    /// Phases that close an attempt cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// Inputs that move the gate.
#[derive(Debug)]
pub enum GateEvent {
    /// A file was read or a URL accepted.
    Acquired(ImageSource),
    /// A crop of the current photo replaced it. Same photo, same cycle.
    Exported(ImageSource),
    /// Acquisition input was invalid (e.g. empty URL). No request is made.
    InputRejected(PasscheckError),
    /// A scoring request left with this id.
    Submitted(SubmissionId),
    /// The service returned a usable score.
    Scored {
        id: SubmissionId,
        score: QualityScore,
        checked_at: DateTime<Utc>,
    },
    /// The request failed or the response had no usable score.
    CheckFailed {
        id: SubmissionId,
        error: PasscheckError,
    },
    /// Cropping or re-encoding failed before anything was sent.
    ExportFailed(PasscheckError),
}

/// Snapshot of the upload flow.
#[derive(Debug, Clone)]
pub struct QualityGate {
    policy: GatePolicy,
    phase: GatePhase,
    attempt: AttemptCounter,
    /// Set once the cycle reached Accepted or Rejected; the next new photo
    /// starts over at attempt 1.
    cycle_closed: bool,
    image: Option<ImageSource>,
    pending: Option<SubmissionId>,
    message: Option<String>,
    success_message: Option<String>,
    last_report: Option<QualityReport>,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(GatePolicy::default())
    }
}

impl QualityGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            phase: GatePhase::Idle,
            attempt: AttemptCounter::FIRST,
            cycle_closed: false,
            image: None,
            pending: None,
            message: None,
            success_message: None,
            last_report: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn attempt(&self) -> AttemptCounter {
        self.attempt
    }

    /// The photo currently shown in the preview, if any.
    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    pub fn pending(&self) -> Option<SubmissionId> {
        self.pending
    }

    /// Quality or error message for the user.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Shown only after an accepted photo.
    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    pub fn last_report(&self) -> Option<&QualityReport> {
        self.last_report.as_ref()
    }

    // -- Transitions ----------------------------------------------------------

    /// Apply one event and return the next state.
    #[must_use]
    pub fn apply(mut self, event: GateEvent) -> Self {
        match event {
            GateEvent::Acquired(image) => {
                if self.cycle_closed {
                    self.attempt = AttemptCounter::FIRST;
                    self.cycle_closed = false;
                }
                self.replace_image(image);
            }

            GateEvent::Exported(image) => self.replace_image(image),

            GateEvent::InputRejected(error) => {
                self.success_message = None;
                self.message = Some(humanize_error(&error).message);
            }

            GateEvent::Submitted(id) => {
                self.phase = GatePhase::Submitted;
                self.pending = Some(id);
                self.clear_messages();
            }

            GateEvent::Scored {
                id,
                score,
                checked_at,
            } => {
                if !self.is_pending(id) {
                    return self;
                }
                self.pending = None;
                let accepted = score.meets(self.policy.accept_threshold);
                self.last_report = Some(QualityReport {
                    submission: id,
                    score,
                    accepted,
                    attempt: self.attempt,
                    checked_at,
                });

                if accepted {
                    self.phase = GatePhase::Accepted;
                    self.message = Some(MSG_ACCEPTED.into());
                    self.success_message = Some(MSG_UPLOADED.into());
                } else if self.attempt.has_retry_left(self.policy.max_attempts) {
                    self.phase = GatePhase::RetryRequested;
                    self.image = None;
                    self.attempt = self.attempt.advance(self.policy.max_attempts);
                    self.message = Some(MSG_RETRY.into());
                } else {
                    self.phase = GatePhase::Rejected;
                    self.message = Some(MSG_REJECTED.into());
                }
                self.cycle_closed = self.phase.is_terminal();
            }

            GateEvent::CheckFailed { id, error } => {
                if !self.is_pending(id) {
                    return self;
                }
                self.pending = None;
                self.phase = GatePhase::Failed;
                self.message = Some(humanize_error(&error).message);
            }

            GateEvent::ExportFailed(error) => {
                self.message = Some(humanize_error(&error).message);
            }
        }
        self
    }

    fn replace_image(&mut self, image: ImageSource) {
        self.phase = GatePhase::Idle;
        self.image = Some(image);
        self.pending = None;
        self.clear_messages();
    }

    fn is_pending(&self, id: SubmissionId) -> bool {
        self.phase == GatePhase::Submitted && self.pending == Some(id)
    }

    fn clear_messages(&mut self) {
        self.message = None;
        self.success_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> ImageSource {
        ImageSource::from_bytes(vec![0xFF, 0xD8, 0xFF], name, "image/jpeg")
    }

    fn score(v: f64) -> QualityScore {
        QualityScore::new(v).unwrap()
    }

    /// Acquire, submit, and score one photo.
    fn check(gate: QualityGate, name: &str, value: f64) -> QualityGate {
        let id = SubmissionId::new();
        gate.apply(GateEvent::Acquired(photo(name)))
            .apply(GateEvent::Submitted(id))
            .apply(GateEvent::Scored {
                id,
                score: score(value),
                checked_at: Utc::now(),
            })
    }

    #[test]
    fn good_score_is_accepted_on_first_attempt() {
        let gate = check(QualityGate::default(), "a.jpg", 0.91);
        assert_eq!(gate.phase(), GatePhase::Accepted);
        assert_eq!(gate.message(), Some(MSG_ACCEPTED));
        assert_eq!(gate.success_message(), Some(MSG_UPLOADED));
        assert_eq!(gate.attempt().get(), 1);
        assert!(gate.image().is_some());
    }

    #[test]
    fn threshold_itself_is_accepted() {
        let gate = check(QualityGate::default(), "a.jpg", 0.6);
        assert_eq!(gate.phase(), GatePhase::Accepted);
    }

    #[test]
    fn good_score_is_accepted_on_second_attempt() {
        let gate = check(QualityGate::default(), "a.jpg", 0.2);
        let gate = check(gate, "b.jpg", 0.75);
        assert_eq!(gate.phase(), GatePhase::Accepted);
        assert_eq!(gate.attempt().get(), 2);
    }

    #[test]
    fn first_poor_score_requests_retry_and_clears_image() {
        let gate = check(QualityGate::default(), "a.jpg", 0.42);
        assert_eq!(gate.phase(), GatePhase::RetryRequested);
        assert_eq!(gate.message(), Some(MSG_RETRY));
        assert_eq!(gate.attempt().get(), 2);
        assert!(gate.image().is_none());
        assert!(gate.success_message().is_none());
    }

    #[test]
    fn second_poor_score_is_rejected_without_third_attempt() {
        let gate = check(QualityGate::default(), "a.jpg", 0.42);
        let gate = check(gate, "b.jpg", 0.30);
        assert_eq!(gate.phase(), GatePhase::Rejected);
        assert_eq!(gate.message(), Some(MSG_REJECTED));
        assert_eq!(gate.attempt().get(), 2);
        assert!(gate.image().is_some());
    }

    #[test]
    fn new_acquisition_after_rejection_resets_attempts() {
        let gate = check(QualityGate::default(), "a.jpg", 0.1);
        let gate = check(gate, "b.jpg", 0.1);
        assert_eq!(gate.phase(), GatePhase::Rejected);

        let gate = gate.apply(GateEvent::Acquired(photo("c.jpg")));
        assert_eq!(gate.phase(), GatePhase::Idle);
        assert_eq!(gate.attempt().get(), 1);
        assert!(gate.message().is_none());
    }

    #[test]
    fn cropping_a_rejected_photo_gives_no_new_attempts() {
        let gate = check(QualityGate::default(), "a.jpg", 0.4);
        let gate = check(gate, "b.jpg", 0.3);
        assert_eq!(gate.phase(), GatePhase::Rejected);

        let id = SubmissionId::new();
        let gate = gate
            .apply(GateEvent::Exported(photo("cropped.jpg")))
            .apply(GateEvent::Submitted(id));
        assert_eq!(gate.attempt().get(), 2);

        let gate = gate.apply(GateEvent::Scored {
            id,
            score: score(0.2),
            checked_at: Utc::now(),
        });
        assert_eq!(gate.phase(), GatePhase::Rejected);
        assert_eq!(gate.message(), Some(MSG_REJECTED));
        assert_eq!(gate.attempt().get(), 2);
    }

    #[test]
    fn new_photo_after_cropped_rejection_still_resets() {
        let gate = check(QualityGate::default(), "a.jpg", 0.4);
        let gate = check(gate, "b.jpg", 0.3);
        let gate = gate.apply(GateEvent::Exported(photo("cropped.jpg")));
        assert_eq!(gate.phase(), GatePhase::Idle);
        assert_eq!(gate.attempt().get(), 2);

        let gate = gate.apply(GateEvent::Acquired(photo("c.jpg")));
        assert_eq!(gate.attempt().get(), 1);
    }

    #[test]
    fn export_keeps_retry_attempt() {
        let gate = check(QualityGate::default(), "a.jpg", 0.4);
        let gate = gate
            .apply(GateEvent::Acquired(photo("b.jpg")))
            .apply(GateEvent::Exported(photo("cropped.jpg")));
        assert_eq!(gate.attempt().get(), 2);
        assert_eq!(gate.image().map(ImageSource::label), Some("cropped.jpg"));
    }

    #[test]
    fn missing_data_never_changes_attempts() {
        let id = SubmissionId::new();
        let gate = QualityGate::default()
            .apply(GateEvent::Acquired(photo("a.jpg")))
            .apply(GateEvent::Submitted(id))
            .apply(GateEvent::CheckFailed {
                id,
                error: PasscheckError::MissingScore,
            });
        assert_eq!(gate.phase(), GatePhase::Failed);
        assert_eq!(gate.attempt().get(), 1);
        assert_eq!(
            gate.message(),
            Some("Quality score missing in the response. Please try again.")
        );

        // After a retry prompt the counter is also left alone.
        let gate = check(QualityGate::default(), "a.jpg", 0.2);
        let id = SubmissionId::new();
        let gate = gate
            .apply(GateEvent::Acquired(photo("b.jpg")))
            .apply(GateEvent::Submitted(id))
            .apply(GateEvent::CheckFailed {
                id,
                error: PasscheckError::MissingQuality,
            });
        assert_eq!(gate.attempt().get(), 2);
        assert_eq!(
            gate.message(),
            Some("Quality data missing in the response. Please try again.")
        );
    }

    #[test]
    fn failure_keeps_attempts_for_the_next_acquisition() {
        let gate = check(QualityGate::default(), "a.jpg", 0.2);
        let id = SubmissionId::new();
        let gate = gate
            .apply(GateEvent::Acquired(photo("b.jpg")))
            .apply(GateEvent::Submitted(id))
            .apply(GateEvent::CheckFailed {
                id,
                error: PasscheckError::Transport("connection refused".into()),
            });
        let gate = check(gate, "c.jpg", 0.2);
        assert_eq!(gate.phase(), GatePhase::Rejected);
    }

    #[test]
    fn stale_response_is_ignored() {
        let old = SubmissionId::new();
        let current = SubmissionId::new();
        let gate = QualityGate::default()
            .apply(GateEvent::Acquired(photo("a.jpg")))
            .apply(GateEvent::Submitted(old))
            .apply(GateEvent::Acquired(photo("b.jpg")))
            .apply(GateEvent::Submitted(current))
            .apply(GateEvent::Scored {
                id: old,
                score: score(0.1),
                checked_at: Utc::now(),
            });
        assert_eq!(gate.phase(), GatePhase::Submitted);
        assert_eq!(gate.pending(), Some(current));
        assert_eq!(gate.attempt().get(), 1);
    }

    #[test]
    fn input_rejection_only_sets_message() {
        let gate = QualityGate::default()
            .apply(GateEvent::InputRejected(PasscheckError::InvalidUrl("empty".into())));
        assert_eq!(gate.phase(), GatePhase::Idle);
        assert_eq!(gate.attempt().get(), 1);
        assert_eq!(gate.message(), Some("Please provide a valid image URL."));
    }

    #[test]
    fn export_failure_leaves_phase_and_image() {
        let gate = QualityGate::default()
            .apply(GateEvent::Acquired(photo("a.jpg")))
            .apply(GateEvent::ExportFailed(PasscheckError::Image("decode".into())));
        assert_eq!(gate.phase(), GatePhase::Idle);
        assert!(gate.image().is_some());
        assert!(gate.message().is_some());
    }

    #[test]
    fn report_records_attempt_and_decision() {
        let gate = check(QualityGate::default(), "a.jpg", 0.42);
        let report = gate.last_report().unwrap();
        assert!(!report.accepted);
        assert_eq!(report.attempt.get(), 1);
        assert!((report.score.value() - 0.42).abs() < 1e-9);
    }

    #[test]
    fn single_attempt_policy_rejects_immediately() {
        let gate = QualityGate::new(GatePolicy {
            accept_threshold: 0.6,
            max_attempts: 1,
        });
        let gate = check(gate, "a.jpg", 0.5);
        assert_eq!(gate.phase(), GatePhase::Rejected);
        assert_eq!(gate.attempt().get(), 1);
    }
}
