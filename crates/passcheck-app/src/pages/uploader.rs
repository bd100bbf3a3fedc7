// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uploader page: pick a photo by URL or file, adjust the crop, check quality.

use dioxus::prelude::*;

use passcheck_core::types::UploadMethod;
use passcheck_core::GatePhase;
use passcheck_scoring::ScoringClient;

use crate::services::controller::{
    PendingCheck, UploadController, export_source, initial_crop, run_check,
};
use crate::services::preview::preview_src;
use crate::state::AppState;

const INPUT_STYLE: &str =
    "padding: 6px; border: 1px solid #ccc; border-radius: 4px; font-size: 14px;";

/// Run one `start_*_check` step on the controller and finish the check in
/// the background.
fn start_check(
    mut state: Signal<AppState>,
    step: impl FnOnce(&mut UploadController<ScoringClient>) -> Option<PendingCheck>,
) {
    let started = {
        let mut guard = state.write();
        guard
            .controller
            .as_mut()
            .and_then(|ctrl| step(ctrl).map(|check| (check, ctrl.scorer().clone())))
    };
    let Some((check, scorer)) = started else {
        return;
    };

    spawn(async move {
        let result = run_check(&scorer, &check.image).await;
        if let Some(ctrl) = state.write().controller.as_mut() {
            ctrl.complete_check(check.id, result);
        }
    });
}

/// Reset the crop controls to the whole of the current photo once its size
/// is known. URL photos are downloaded for that.
fn reset_crop(mut state: Signal<AppState>) {
    let job = {
        let guard = state.read();
        guard.controller.as_ref().and_then(|ctrl| {
            ctrl.state()
                .image()
                .cloned()
                .map(|image| (image, ctrl.http().clone(), ctrl.config().clone()))
        })
    };
    let Some((image, http, config)) = job else {
        return;
    };

    spawn(async move {
        match initial_crop(&http, &config, image.clone()).await {
            Ok(full) => {
                let mut guard = state.write();
                let current = guard.gate().and_then(|g| g.image()) == Some(&image);
                if current {
                    guard.crop = full;
                }
            }
            Err(e) => tracing::warn!(error = %e, image = image.label(), "could not read image size"),
        }
    });
}

#[component]
pub fn Uploader() -> Element {
    let mut state = use_context::<Signal<AppState>>();

    let method = state.read().method;
    let busy = state.read().busy();
    let setup_error = state.read().setup_error.clone();
    let crop = state.read().crop;
    let crop_empty = crop.pixel_rect().is_empty();

    let (phase, attempt, max_attempts, preview, message, success, report) = {
        let guard = state.read();
        match guard.gate() {
            Some(gate) => (
                gate.phase(),
                gate.attempt().get(),
                gate.policy().max_attempts,
                gate.image().map(preview_src),
                gate.message().map(str::to_string),
                gate.success_message().map(str::to_string),
                gate.last_report().cloned(),
            ),
            None => (GatePhase::Idle, 1, 1, None, None, None, None),
        }
    };
    let disabled = busy || setup_error.is_some();
    let url_input = state.read().url_input.clone();
    let transform = format!("rotate({}deg) scale({})", crop.rotation, crop.zoom);
    let zoom_label = format!("Zoom: {:.1}x", crop.zoom);
    let rotation_label = format!("Rotation: {:.0}\u{00B0}", crop.rotation);
    let report_line = report.map(|r| {
        format!(
            "Score {} on attempt {} at {}",
            r.score,
            r.attempt,
            r.checked_at.format("%H:%M:%S")
        )
    });

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto;",
            h1 { "Passport Photo" }

            if let Some(ref err) = setup_error {
                div { style: "padding: 12px; border-radius: 8px; background: #f8d7da; color: #721c24; margin-bottom: 16px;",
                    "{err}"
                }
            }

            // Method toggle
            section { style: "display: flex; gap: 16px; margin: 12px 0;",
                label {
                    input {
                        r#type: "radio",
                        name: "method",
                        checked: method == UploadMethod::Url,
                        onchange: move |_| state.write().method = UploadMethod::Url,
                    }
                    " Image URL"
                }
                label {
                    input {
                        r#type: "radio",
                        name: "method",
                        checked: method == UploadMethod::File,
                        onchange: move |_| state.write().method = UploadMethod::File,
                    }
                    " Upload file"
                }
            }

            if method == UploadMethod::Url {
                section { style: "display: flex; gap: 8px; margin: 12px 0;",
                    input {
                        r#type: "url",
                        placeholder: "https://example.com/passport.jpg",
                        style: "flex: 1; {INPUT_STYLE}",
                        value: "{url_input}",
                        oninput: move |evt| state.write().url_input = evt.value(),
                    }
                    button {
                        style: "padding: 8px 16px; border-radius: 8px; border: none; background: #007aff; color: white;",
                        disabled: disabled,
                        onclick: move |_| {
                            let input = state.read().url_input.clone();
                            start_check(state, |ctrl| ctrl.start_url_check(&input));
                            reset_crop(state);
                        },
                        "Submit"
                    }
                }
            } else {
                button {
                    style: "padding: 12px 24px; border-radius: 8px; border: 1px solid #007aff; color: #007aff; background: white; font-size: 16px; margin: 12px 0;",
                    disabled: disabled,
                    onclick: move |_| {
                        let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp", "gif"])
                            .pick_file()
                        else {
                            return;
                        };

                        start_check(state, |ctrl| ctrl.start_file_check(&path));
                        reset_crop(state);
                    },
                    "Choose Photo"
                }
            }

            // Preview
            if let Some(ref src) = preview {
                div { style: "margin: 16px 0; text-align: center; background: #f4f4f4; border-radius: 8px; padding: 8px;",
                    img {
                        src: "{src}",
                        style: "max-width: 100%; max-height: 360px; transform: {transform};",
                    }
                }

                // Crop controls
                section { style: "margin: 16px 0;",
                    h3 { "Crop" }
                    div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 8px; align-items: center;",
                        CropNumber { label: "X", value: crop.x, onchange: move |v| state.write().crop.x = v }
                        CropNumber { label: "Y", value: crop.y, onchange: move |v| state.write().crop.y = v }
                        CropNumber { label: "Width", value: crop.width, onchange: move |v| state.write().crop.width = v }
                        CropNumber { label: "Height", value: crop.height, onchange: move |v| state.write().crop.height = v }

                        label { "{zoom_label}" }
                        input {
                            r#type: "range",
                            min: "1",
                            max: "3",
                            step: "0.1",
                            value: "{crop.zoom}",
                            oninput: move |evt| {
                                if let Ok(v) = evt.value().parse::<f64>() {
                                    state.write().crop.zoom = v;
                                }
                            },
                        }

                        label { "{rotation_label}" }
                        input {
                            r#type: "range",
                            min: "-180",
                            max: "180",
                            step: "1",
                            value: "{crop.rotation}",
                            oninput: move |evt| {
                                if let Ok(v) = evt.value().parse::<f64>() {
                                    state.write().crop.rotation = v;
                                }
                            },
                        }
                    }
                }

                button {
                    style: "width: 100%; padding: 14px; border-radius: 12px; border: none; background: #34c759; color: white; font-size: 17px; font-weight: bold;",
                    disabled: disabled || crop_empty,
                    onclick: move |_| {
                        let job = {
                            let mut guard = state.write();
                            let geometry = guard.crop;
                            let job = guard.controller.as_ref().and_then(|ctrl| {
                                ctrl.state().image().cloned().map(|image| {
                                    (image, ctrl.http().clone(), ctrl.config().clone(), geometry)
                                })
                            });
                            if job.is_some() {
                                guard.exporting = true;
                            }
                            job
                        };
                        let Some((image, http, config, geometry)) = job else {
                            return;
                        };

                        spawn(async move {
                            let exported = export_source(&http, &config, image, geometry).await;
                            state.write().exporting = false;
                            start_check(state, move |ctrl| ctrl.start_export_check(exported));
                        });
                    },
                    if busy { "Checking..." } else { "Crop & Check" }
                }
            }

            // Result
            if phase == GatePhase::Submitted {
                p { style: "color: #007aff; text-align: center;", "Checking image quality..." }
            }
            if let Some(ref msg) = message {
                {
                    let (bg, fg) = match phase {
                        GatePhase::Accepted => ("#d4edda", "#155724"),
                        GatePhase::RetryRequested => ("#fff3cd", "#856404"),
                        _ => ("#f8d7da", "#721c24"),
                    };
                    rsx! {
                        div { style: "margin-top: 16px; padding: 12px; border-radius: 8px; background: {bg}; color: {fg}; text-align: center;",
                            "{msg}"
                        }
                    }
                }
            }
            if let Some(ref msg) = success {
                p { style: "color: #155724; font-weight: bold; text-align: center;", "{msg}" }
            }
            if let Some(ref line) = report_line {
                p { style: "color: #888; font-size: 12px; text-align: center;", "{line}" }
            }
            if setup_error.is_none() {
                p { style: "color: #888; font-size: 12px; text-align: center;",
                    "Attempt {attempt} of {max_attempts}"
                }
            }
        }
    }
}

#[component]
fn CropNumber(label: &'static str, value: f64, onchange: EventHandler<f64>) -> Element {
    rsx! {
        label { "{label}:" }
        input {
            r#type: "number",
            step: "1",
            value: "{value}",
            style: INPUT_STYLE,
            onchange: move |evt: FormEvent| {
                match evt.value().parse::<f64>() {
                    Ok(v) => onchange.call(v),
                    Err(e) => tracing::debug!(error = %e, "ignoring non-numeric crop value"),
                }
            },
        }
    }
}
