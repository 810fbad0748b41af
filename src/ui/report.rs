use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::cleaning::CleaningSummary;
use crate::data::diagnostics::{Diagnostics, MissingCount};
use crate::pipeline::{PipelineRun, Preview, Stage};
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – the dashboard, section by section
// ---------------------------------------------------------------------------

/// Render every completed section of the last run, then the failure (if any).
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let run = match &state.run {
        Some(run) => run,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Upload a CSV file to start the analysis  (File → Open…)");
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Air Pollution and Weather Dashboard");
            ui.add_space(8.0);
            sections(ui, run);

            if let Some(failure) = &run.failure {
                ui.add_space(12.0);
                ui.label(
                    RichText::new(format!("Analysis stopped at the {} stage: {}", failure.stage, failure.error))
                        .color(Color32::RED)
                        .strong(),
                );
                ui.label("Fix the file and upload it again.");
            }
        });
}

fn sections(ui: &mut Ui, run: &PipelineRun) {
    let report = &run.report;

    ui.heading("1. Dataset");
    if let Some(preview) = &report.preview {
        preview_table(ui, preview);
    }

    let Some(diag) = &report.diagnostics else {
        return;
    };
    ui.add_space(12.0);
    ui.heading("2. Assessing data");
    diagnostics(ui, diag);

    let Some(summary) = &report.cleaning else {
        return;
    };
    ui.add_space(12.0);
    ui.heading("3. Cleaning data");
    ui.label("• Numeric columns: linear interpolation (forward direction).");
    ui.label("• Wind direction: forward fill.");
    cleaning(ui, summary, report.missing_after_cleaning.as_deref().unwrap_or(&[]));

    if !run.completed(Stage::RainfallScatter) {
        return;
    }
    ui.add_space(12.0);
    ui.heading("4. Exploratory data analysis");
    if let Some(series) = &report.rainfall {
        ui.strong("a. Effect of rainfall on PM2.5, NO2 and CO");
        plot::rainfall_scatter(ui, series);
    }

    if let Some(profiles) = &report.time_profiles {
        ui.add_space(8.0);
        ui.strong("b. Pollution over time (year, month, hour)");
        for profile in profiles {
            plot::time_profile(ui, profile);
        }
    }

    let Some(correlation) = &report.correlation else {
        return;
    };
    ui.add_space(8.0);
    ui.strong("c. Correlation between pollutants");
    plot::correlation_heatmap(ui, correlation);

    ui.add_space(12.0);
    conclusion(ui);
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn preview_table(ui: &mut Ui, preview: &Preview) {
    ui.label(format!(
        "First {} of {} rows",
        preview.rows.len(),
        preview.total_rows
    ));
    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(48.0), preview.columns.len())
                .header(20.0, |mut header| {
                    for name in &preview.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &preview.rows {
                        body.row(18.0, |mut table_row| {
                            for value in row {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(value);
                                });
                            }
                        });
                    }
                });
        });
}

fn missing_grid(ui: &mut Ui, id: &str, counts: &[MissingCount]) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        for m in counts {
            ui.label(&m.column);
            ui.label(m.missing.to_string());
            ui.end_row();
        }
    });
}

fn diagnostics(ui: &mut Ui, diag: &Diagnostics) {
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("a. Missing values");
        missing_grid(&mut cols[0], "missing_before", &diag.missing);

        cols[1].strong("c. Column types");
        egui::Grid::new("dtypes").striped(true).show(&mut cols[1], |ui: &mut Ui| {
            for t in &diag.dtypes {
                ui.label(&t.column);
                ui.monospace(t.dtype.to_string());
                ui.end_row();
            }
        });
    });
    ui.label(format!("Missing cells in total: {}", diag.total_missing()));
    ui.add_space(4.0);
    ui.strong("b. Duplicate rows");
    ui.label(format!("Duplicate rows: {}", diag.duplicates));
}

fn cleaning(ui: &mut Ui, summary: &CleaningSummary, after: &[MissingCount]) {
    ui.label(format!(
        "{} cells filled, {} left missing in leading gaps.",
        summary.total_filled(),
        summary.total_unresolved()
    ));
    for c in summary.columns.iter().filter(|c| c.unresolved > 0) {
        ui.label(
            RichText::new(format!(
                "{}: {} leading cell(s) stay missing, no earlier value exists.",
                c.column, c.unresolved
            ))
            .color(Color32::from_rgb(200, 140, 0)),
        );
    }
    egui::CollapsingHeader::new("Missing values after cleaning")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            missing_grid(ui, "missing_after", after);
        });
}

// ---------------------------------------------------------------------------
// Conclusion
// ---------------------------------------------------------------------------

const CONCLUSION: &[(&str, &[&str])] = &[
    (
        "Rainfall and air pollution",
        &[
            "At low rainfall (0-10 mm) the concentrations of PM2.5, NO2 and CO drop noticeably.",
            "At moderate to heavy rainfall the drop no longer keeps pace with intensity, \
             suggesting a threshold beyond which rain stops washing pollutants out.",
            "Rain mainly helps with PM2.5, whose particles are captured by droplets and carried to the ground.",
        ],
    ),
    (
        "Pollution over time",
        &[
            "Hourly: PM2.5 fluctuates through the day, peaking in the late afternoon \
             (around 15:00-17:00) with commuter traffic, and falls after 22:00.",
            "Monthly: PM2.5 is highest in winter (December-February), when colder air and \
             temperature inversions trap pollution near the ground; NO2 and CO rise as well.",
            "Yearly: concentrations rise in later years, possibly with urbanisation and \
             industrial activity; the trend needs further study.",
        ],
    ),
];

fn conclusion(ui: &mut Ui) {
    ui.heading("5. Conclusions");
    for (title, points) in CONCLUSION {
        ui.strong(*title);
        for p in *points {
            ui.label(format!("• {p}"));
        }
        ui.add_space(4.0);
    }
}
