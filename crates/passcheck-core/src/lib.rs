// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Passcheck — Core types, error definitions, configuration, and the quality
// gate state machine shared across all crates.

pub mod config;
pub mod error;
pub mod gate;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, ScoringCredentials};
pub use error::PasscheckError;
pub use gate::{GateEvent, GatePhase, QualityGate};
pub use types::*;
