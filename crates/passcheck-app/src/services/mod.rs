// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer that bridges the Dioxus UI to the passcheck backend crates.

pub mod config_dir;
pub mod controller;
pub mod preview;
