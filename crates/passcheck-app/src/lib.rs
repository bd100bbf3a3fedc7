// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Passcheck desktop app: uploader page, app state, and the services behind
// them. The `passcheck` binary only launches it.

pub mod pages;
pub mod services;
pub mod state;
