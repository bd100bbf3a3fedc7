// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interpretation of scoring service responses.
//
// The only shape that counts as success is an object carrying
// `quality.score`, a number in [0, 1]. Everything else is "missing data",
// which the gate reports without spending an attempt.

use passcheck_core::error::{PasscheckError, Result};
use passcheck_core::types::QualityScore;
use serde_json::Value;
use tracing::warn;

/// Extract the quality score from a decoded response body.
pub fn parse_quality_response(body: &Value) -> Result<QualityScore> {
    if body.get("status").and_then(Value::as_str) == Some("failure") {
        let reason = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        warn!(reason, "scoring service reported failure");
    }

    let quality = body
        .get("quality")
        .filter(|q| q.is_object())
        .ok_or(PasscheckError::MissingQuality)?;

    let raw = quality
        .get("score")
        .and_then(Value::as_f64)
        .ok_or(PasscheckError::MissingScore)?;

    QualityScore::new(raw).ok_or_else(|| {
        warn!(raw, "quality score outside [0, 1]");
        PasscheckError::MissingScore
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_score() {
        let body = json!({
            "status": "success",
            "request": { "id": "req_1" },
            "quality": { "score": 0.87 },
            "media": { "id": "med_1", "uri": "passport.jpg" }
        });
        let score = parse_quality_response(&body).unwrap();
        assert!((score.value() - 0.87).abs() < 1e-9);
    }

    #[test]
    fn integer_scores_are_numbers_too() {
        let score = parse_quality_response(&json!({ "quality": { "score": 1 } })).unwrap();
        assert!((score.value() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_quality_object() {
        let body = json!({
            "status": "failure",
            "error": { "type": "credentials_error", "message": "Incorrect API user or secret" }
        });
        assert!(matches!(
            parse_quality_response(&body),
            Err(PasscheckError::MissingQuality)
        ));
        assert!(matches!(
            parse_quality_response(&json!({ "quality": 0.9 })),
            Err(PasscheckError::MissingQuality)
        ));
    }

    #[test]
    fn missing_or_non_numeric_score() {
        for body in [
            json!({ "quality": {} }),
            json!({ "quality": { "score": null } }),
            json!({ "quality": { "score": "0.9" } }),
        ] {
            assert!(
                matches!(parse_quality_response(&body), Err(PasscheckError::MissingScore)),
                "body {body} should lack a score"
            );
        }
    }

    #[test]
    fn out_of_range_score_is_missing() {
        assert!(matches!(
            parse_quality_response(&json!({ "quality": { "score": 1.7 } })),
            Err(PasscheckError::MissingScore)
        ));
    }
}
