use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{PipelineError, Result};
use super::model::Dataset;
use super::schema::{DAY, HOUR, MONTH, PM25, RAIN, RAINFALL_TARGETS, TEMPORAL, YEAR};

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where fewer than two paired observations exist or a series is
    /// constant.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Correlation {
    Matrix(CorrelationMatrix),
    InsufficientData { rows: usize },
}

/// Pearson correlation over rows where both values are present.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation matrix of the given columns. Datasets with fewer than two rows
/// yield [`Correlation::InsufficientData`].
pub fn correlation_matrix(dataset: &Dataset, columns: &[&str]) -> Result<Correlation> {
    let series = columns
        .iter()
        .map(|c| dataset.numeric(c))
        .collect::<Result<Vec<_>>>()?;

    if dataset.len() < 2 {
        return Ok(Correlation::InsufficientData {
            rows: dataset.len(),
        });
    }

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = pearson(series[i], series[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(series[i], series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(Correlation::Matrix(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    }))
}

// ---------------------------------------------------------------------------
// Scatter views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<[f64; 2]>,
}

/// Raw `(x, y)` pairs for every row where both are present.
pub fn scatter(dataset: &Dataset, x: &str, y: &str) -> Result<ScatterSeries> {
    let xs = dataset.numeric(x)?;
    let ys = dataset.numeric(y)?;
    let points = xs
        .iter()
        .zip(ys)
        .filter_map(|(a, b)| Some([(*a)?, (*b)?]))
        .collect();
    Ok(ScatterSeries {
        x_column: x.to_string(),
        y_column: y.to_string(),
        points,
    })
}

/// Rainfall against PM2.5, NO2 and CO.
pub fn rainfall_scatter(dataset: &Dataset) -> Result<Vec<ScatterSeries>> {
    RAINFALL_TARGETS
        .iter()
        .map(|target| scatter(dataset, RAIN, target))
        .collect()
}

// ---------------------------------------------------------------------------
// Time profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub x: i64,
    pub mean: f64,
    /// Half-width of the normal-approximation 95% confidence interval.
    pub ci95: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HueGroup {
    pub key: i64,
    pub points: Vec<ProfilePoint>,
}

/// Mean of `value` along `x`, one line per distinct `hue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeProfile {
    pub x_column: String,
    pub hue_column: String,
    pub value_column: String,
    pub groups: Vec<HueGroup>,
}

/// Running mean/variance (Welford).
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Accumulator {
    fn push(&mut self, v: f64) {
        self.count += 1;
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (v - self.mean);
    }

    fn ci95(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let sd = (self.m2 / (n - 1.0)).sqrt();
        1.96 * sd / n.sqrt()
    }
}

fn integral_key(column: &str, row: usize, value: f64) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(PipelineError::NotIntegral {
            column: column.to_string(),
            row,
            value,
        });
    }
    Ok(value as i64)
}

/// Group `value` by (`hue`, `x`). Rows with a missing key or value are
/// skipped.
pub fn time_profile(dataset: &Dataset, x: &str, hue: &str, value: &str) -> Result<TimeProfile> {
    let xs = dataset.numeric(x)?;
    let hues = dataset.numeric(hue)?;
    let values = dataset.numeric(value)?;

    let mut groups: BTreeMap<i64, BTreeMap<i64, Accumulator>> = BTreeMap::new();
    for (row, ((xv, hv), v)) in xs.iter().zip(hues).zip(values).enumerate() {
        let (Some(xv), Some(hv), Some(v)) = (*xv, *hv, *v) else {
            continue;
        };
        let x_key = integral_key(x, row, xv)?;
        let hue_key = integral_key(hue, row, hv)?;
        groups
            .entry(hue_key)
            .or_default()
            .entry(x_key)
            .or_default()
            .push(v);
    }

    let groups = groups
        .into_iter()
        .map(|(key, by_x)| HueGroup {
            key,
            points: by_x
                .into_iter()
                .map(|(x, acc)| ProfilePoint {
                    x,
                    mean: acc.mean,
                    ci95: acc.ci95(),
                    count: acc.count,
                })
                .collect(),
        })
        .collect();

    Ok(TimeProfile {
        x_column: x.to_string(),
        hue_column: hue.to_string(),
        value_column: value.to_string(),
        groups,
    })
}

/// PM2.5 by hour per day, by hour per month, and by month per year.
///
/// Every time column is checked before any grouping starts.
pub fn time_profiles(dataset: &Dataset) -> Result<Vec<TimeProfile>> {
    for column in TEMPORAL {
        dataset.numeric(column)?;
    }
    [(HOUR, DAY), (HOUR, MONTH), (MONTH, YEAR)]
        .iter()
        .map(|(x, hue)| time_profile(dataset, x, hue, PM25))
        .collect()
}
