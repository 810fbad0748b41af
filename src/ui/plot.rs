use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, Vec2};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{HueMap, coolwarm, text_on};
use crate::data::analysis::{Correlation, CorrelationMatrix, ScatterSeries, TimeProfile};

// ---------------------------------------------------------------------------
// Rainfall scatter plots
// ---------------------------------------------------------------------------

/// Three side-by-side scatter plots of rainfall against a pollutant.
pub fn rainfall_scatter(ui: &mut Ui, series: &[ScatterSeries]) {
    ui.columns(series.len().max(1), |cols: &mut [Ui]| {
        for (ui, s) in cols.iter_mut().zip(series) {
            ui.label(format!("Rainfall vs {}", s.y_column));
            let points: PlotPoints = s.points.iter().copied().collect();
            Plot::new(format!("scatter_{}_{}", s.x_column, s.y_column))
                .height(260.0)
                .x_axis_label(s.x_column.as_str())
                .y_axis_label(s.y_column.as_str())
                .allow_boxed_zoom(true)
                .allow_drag(true)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new(points)
                            .radius(2.0)
                            .color(Color32::from_rgb(31, 119, 180))
                            .name(&s.y_column),
                    );
                });
        }
    });
}

// ---------------------------------------------------------------------------
// Time profile line panels
// ---------------------------------------------------------------------------

/// One line per hue group, with its 95% confidence band.
pub fn time_profile(ui: &mut Ui, profile: &TimeProfile) {
    ui.label(format!(
        "{} by {} per {}",
        profile.value_column, profile.x_column, profile.hue_column
    ));

    let hues = HueMap::new(profile.groups.iter().map(|g| g.key));

    Plot::new(format!("profile_{}_{}", profile.x_column, profile.hue_column))
        .height(300.0)
        .legend(Legend::default())
        .x_axis_label(profile.x_column.as_str())
        .y_axis_label(profile.value_column.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for group in &profile.groups {
                let color = hues.color_for(group.key);
                let name = format!("{} {}", profile.hue_column, group.key);

                // One quad per segment; egui only fills convex polygons.
                for pair in group.points.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    let (xa, xb) = (a.x as f64, b.x as f64);
                    let band: PlotPoints = vec![
                        [xa, a.mean - a.ci95],
                        [xb, b.mean - b.ci95],
                        [xb, b.mean + b.ci95],
                        [xa, a.mean + a.ci95],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(band)
                            .fill_color(color.gamma_multiply(0.15))
                            .stroke(Stroke::NONE)
                            .name(&name),
                    );
                }

                let line: PlotPoints = group
                    .points
                    .iter()
                    .map(|p| [p.x as f64, p.mean])
                    .collect();
                plot_ui.line(Line::new(line).color(color).width(1.5).name(&name));
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const CELL: Vec2 = Vec2::new(64.0, 32.0);
const LABEL_WIDTH: f32 = 56.0;

/// Annotated heatmap of a correlation result.
pub fn correlation_heatmap(ui: &mut Ui, correlation: &Correlation) {
    match correlation {
        Correlation::Matrix(matrix) => heatmap_grid(ui, matrix),
        Correlation::InsufficientData { rows } => {
            ui.label(format!(
                "Insufficient data: {rows} row(s), at least two are needed for correlation."
            ));
        }
    }
}

fn heatmap_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    let font = FontId::proportional(12.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.add_space(LABEL_WIDTH);
        for name in &matrix.columns {
            let (rect, _) = ui.allocate_exact_size(CELL, Sense::hover());
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                name,
                font.clone(),
                ui.visuals().text_color(),
            );
        }
    });

    for i in 0..n {
        ui.horizontal(|ui: &mut Ui| {
            let (label_rect, _) =
                ui.allocate_exact_size(Vec2::new(LABEL_WIDTH, CELL.y), Sense::hover());
            ui.painter().text(
                label_rect.right_center(),
                Align2::RIGHT_CENTER,
                &matrix.columns[i],
                font.clone(),
                ui.visuals().text_color(),
            );

            for j in 0..n {
                let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());
                let (fill, text) = match matrix.get(i, j) {
                    Some(r) => (coolwarm(r), format!("{r:.2}")),
                    None => (Color32::DARK_GRAY, "n/a".to_string()),
                };
                let painter = ui.painter();
                painter.rect_filled(rect.shrink(1.0), 2.0, fill);
                painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), text_on(fill));
                response.on_hover_text(format!(
                    "{} × {}",
                    matrix.columns[i], matrix.columns[j]
                ));
            }
        });
    }

    ui.add_space(4.0);
    legend_bar(ui);
}

/// Colour scale from -1 to 1 under the heatmap.
fn legend_bar(ui: &mut Ui) {
    const STEPS: usize = 40;
    ui.horizontal(|ui: &mut Ui| {
        ui.add_space(LABEL_WIDTH);
        ui.label("-1");
        let (rect, _) = ui.allocate_exact_size(Vec2::new(CELL.x * 4.0, 12.0), Sense::hover());
        let step = rect.width() / STEPS as f32;
        for k in 0..STEPS {
            let value = -1.0 + 2.0 * (k as f64 + 0.5) / STEPS as f64;
            let x = rect.left() + step * k as f32;
            let cell = egui::Rect::from_min_size(egui::pos2(x, rect.top()), Vec2::new(step, rect.height()));
            ui.painter().rect_filled(cell, 0.0, coolwarm(value));
        }
        ui.label("1");
    });
}
