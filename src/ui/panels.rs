use eframe::egui::{self, Color32, RichText, Ui};

use crate::pipeline::Stage;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – upload summary and stage progress
// ---------------------------------------------------------------------------

/// Render the left summary panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Upload");
    ui.separator();

    if ui.button("Choose CSV file…").clicked() {
        open_file_dialog(state);
    }
    ui.label(RichText::new("or drop a .csv onto the window").weak());
    ui.add_space(8.0);

    let Some(run) = &state.run else {
        ui.label("No dataset loaded.");
        return;
    };

    if let Some(source) = &state.source {
        ui.strong(source);
    }
    if let Some(diag) = &run.report.diagnostics {
        ui.label(format!("{} rows × {} columns", diag.rows, diag.columns));
    }
    ui.separator();

    ui.strong("Stages");
    let failed = run.failure.as_ref().map(|f| f.stage);
    for stage in Stage::ALL {
        let (mark, color) = if run.completed(stage) {
            ("✔", Color32::from_rgb(60, 160, 80))
        } else if failed == Some(stage) {
            ("✖", Color32::RED)
        } else {
            ("–", Color32::GRAY)
        };
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(mark).color(color));
            ui.label(stage.to_string());
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_report = state.run.is_some();
            if ui
                .add_enabled(has_report, egui::Button::new("Copy report as JSON"))
                .clicked()
            {
                copy_report(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(run) = &state.run {
            if let Some(diag) = &run.report.diagnostics {
                ui.label(format!(
                    "{} rows, {} duplicates",
                    diag.rows, diag.duplicates
                ));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn copy_report(ctx: &egui::Context, state: &mut AppState) {
    match state.report_json() {
        Some(Ok(json)) => {
            ctx.copy_text(json);
            log::info!("Report copied to clipboard");
        }
        Some(Err(e)) => {
            log::error!("Failed to serialize report: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Upload: file dialog and drag-and-drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload air-quality dataset")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            state.upload_failed(e);
        }
    }
}

/// Ingest the first file dropped onto the window this frame.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
    let Some(file) = dropped else {
        return;
    };

    let result = if let Some(path) = &file.path {
        state.load_path(path)
    } else if let Some(bytes) = &file.bytes {
        state.load_bytes(&file.name, bytes)
    } else {
        Err(anyhow::anyhow!("dropped file {} has no content", file.name))
    };
    if let Err(e) = result {
        state.upload_failed(e);
    }
}
