// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Passcheck — passport photo uploader with crop and quality check
//
// Entry point. Initialises logging, loads settings, builds app state, and
// launches the Dioxus UI.

use dioxus::prelude::*;

use passcheck_app::pages::uploader::Uploader;
use passcheck_app::services::config_dir;
use passcheck_app::state::AppState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Passcheck starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    use_context_provider(|| {
        let config = config_dir::load_config();
        Signal::new(AppState::new(config))
    });

    rsx! {
        div { class: "app-container",
            style: "min-height: 100vh; padding: 16px; font-family: system-ui, -apple-system, sans-serif;",
            Uploader {}
        }
    }
}
