// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people uploading their passport photo.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the UI presents the message.

use crate::error::PasscheckError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or flaky service: trying again may work.
    Transient,
    /// The user has to change their input (fix the URL, pick another file).
    ActionRequired,
    /// Cannot be fixed from the UI, e.g. missing credentials.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown inline under the uploader).
    pub message: String,
    /// What the user should try next.
    pub suggestion: String,
    /// Whether submitting the same photo again could succeed.
    pub retriable: bool,
    /// Severity level (drives colour in the UI).
    pub severity: Severity,
}

/// Convert a `PasscheckError` into a `HumanError`.
pub fn humanize_error(err: &PasscheckError) -> HumanError {
    match err {
        // -- Acquisition --
        PasscheckError::InvalidUrl(_) => HumanError {
            message: "Please provide a valid image URL.".into(),
            suggestion: "Paste a full link starting with http:// or https://.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PasscheckError::UnsupportedImage(detail) => HumanError {
            message: "That file doesn't look like a photo.".into(),
            suggestion: format!("Choose a JPEG or PNG image instead. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PasscheckError::Image(_) => HumanError {
            message: "We couldn't crop this image.".into(),
            suggestion: "Try a different crop, or upload the photo without cropping.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Scoring service --
        PasscheckError::Transport(_) => HumanError {
            message: "Error checking image quality. Please try again.".into(),
            suggestion: "Check your internet connection, then submit the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PasscheckError::MissingQuality => HumanError {
            message: "Quality data missing in the response. Please try again.".into(),
            suggestion: "The checking service answered without a result. Submit the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PasscheckError::MissingScore => HumanError {
            message: "Quality score missing in the response. Please try again.".into(),
            suggestion: "The checking service answered without a score. Submit the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Local --
        PasscheckError::Config(detail) => HumanError {
            message: "Photo checking isn't set up on this device.".into(),
            suggestion: format!("Ask your administrator to configure the checking service. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PasscheckError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the photo somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading the file.".into(),
                    suggestion: "Try choosing the file again.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        PasscheckError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_asks_for_valid_url() {
        let human = humanize_error(&PasscheckError::InvalidUrl("empty".into()));
        assert_eq!(human.message, "Please provide a valid image URL.");
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn transport_failure_is_transient() {
        let human = humanize_error(&PasscheckError::Transport("connection reset".into()));
        assert_eq!(human.message, "Error checking image quality. Please try again.");
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_quality_and_score_are_distinct() {
        let quality = humanize_error(&PasscheckError::MissingQuality);
        let score = humanize_error(&PasscheckError::MissingScore);
        assert_ne!(quality.message, score.message);
        assert!(score.message.starts_with("Quality score missing"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = PasscheckError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn config_error_is_permanent() {
        let err = PasscheckError::Config("PASSCHECK_API_USER is not set".into());
        assert_eq!(humanize_error(&err).severity, Severity::Permanent);
    }
}
