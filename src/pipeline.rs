use std::fmt;

use serde::{Serialize, Serializer};

use crate::data::analysis::{self, Correlation, ScatterSeries, TimeProfile};
use crate::data::cleaning::{self, CleaningSummary};
use crate::data::diagnostics::{self, Diagnostics, MissingCount};
use crate::data::error::{PipelineError, Result};
use crate::data::model::Dataset;
use crate::data::schema::POLLUTANTS;

/// Rows shown in the dataset preview.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preview,
    Diagnostics,
    Cleaning,
    RainfallScatter,
    TimeProfiles,
    Correlation,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Preview,
        Stage::Diagnostics,
        Stage::Cleaning,
        Stage::RainfallScatter,
        Stage::TimeProfiles,
        Stage::Correlation,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Preview => "preview",
            Stage::Diagnostics => "diagnostics",
            Stage::Cleaning => "cleaning",
            Stage::RainfallScatter => "rainfall scatter",
            Stage::TimeProfiles => "time profiles",
            Stage::Correlation => "correlation",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl Preview {
    pub fn of(dataset: &Dataset, n: usize) -> Self {
        Preview {
            columns: dataset.column_names(),
            rows: dataset.head(n),
            total_rows: dataset.len(),
        }
    }
}

/// Outputs of every stage that completed. A slot stays `None` when its
/// stage failed or was never reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardReport {
    pub preview: Option<Preview>,
    pub diagnostics: Option<Diagnostics>,
    pub cleaning: Option<CleaningSummary>,
    pub missing_after_cleaning: Option<Vec<MissingCount>>,
    pub rainfall: Option<Vec<ScatterSeries>>,
    pub time_profiles: Option<Vec<TimeProfile>>,
    pub correlation: Option<Correlation>,
}

#[derive(Debug, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    #[serde(serialize_with = "serialize_display")]
    pub error: PipelineError,
}

fn serialize_display<S: Serializer>(error: &PipelineError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Result of one run: everything computed before the first failure.
#[derive(Debug, Serialize)]
pub struct PipelineRun {
    pub report: DashboardReport,
    pub failure: Option<StageFailure>,
}

impl PipelineRun {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Whether `stage` produced its output.
    pub fn completed(&self, stage: Stage) -> bool {
        let r = &self.report;
        match stage {
            Stage::Preview => r.preview.is_some(),
            Stage::Diagnostics => r.diagnostics.is_some(),
            Stage::Cleaning => r.cleaning.is_some(),
            Stage::RainfallScatter => r.rainfall.is_some(),
            Stage::TimeProfiles => r.time_profiles.is_some(),
            Stage::Correlation => r.correlation.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn stage<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> std::result::Result<T, StageFailure> {
    match f() {
        Ok(out) => {
            log::info!("stage {stage} done");
            Ok(out)
        }
        Err(error) => {
            log::error!("stage {stage} failed: {error}");
            Err(StageFailure { stage, error })
        }
    }
}

fn run_stages(
    dataset: &mut Dataset,
    report: &mut DashboardReport,
) -> std::result::Result<(), StageFailure> {
    report.preview = Some(stage(Stage::Preview, || Ok(Preview::of(dataset, PREVIEW_ROWS)))?);
    report.diagnostics = Some(stage(Stage::Diagnostics, || Ok(Diagnostics::compute(dataset)))?);

    let summary = stage(Stage::Cleaning, || cleaning::clean(dataset))?;
    report.cleaning = Some(summary);
    report.missing_after_cleaning = Some(diagnostics::missing_values(dataset));

    report.rainfall = Some(stage(Stage::RainfallScatter, || analysis::rainfall_scatter(dataset))?);
    report.time_profiles = Some(stage(Stage::TimeProfiles, || analysis::time_profiles(dataset))?);
    report.correlation = Some(stage(Stage::Correlation, || {
        analysis::correlation_matrix(dataset, &POLLUTANTS)
    })?);
    Ok(())
}

/// Run every stage on an uploaded dataset, stopping at the first failure.
pub fn run(mut dataset: Dataset) -> PipelineRun {
    let mut report = DashboardReport::default();
    let failure = run_stages(&mut dataset, &mut report).err();
    PipelineRun { report, failure }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    const HEADER: &str = "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn dataset(rows: &[&str]) -> Dataset {
        let mut csv = format!("{HEADER}\n");
        for r in rows {
            csv.push_str(r);
            csv.push('\n');
        }
        load_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn full_run_fills_every_slot() {
        let ds = dataset(&[
            "1,2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,0,NNW,4.4,Aotizhongxin",
            "2,2013,3,1,1,,8,4,7,300,77,-1.1,1023.2,-18.2,0,,4.7,Aotizhongxin",
            "3,2013,3,1,2,7,7,5,10,300,73,-1.1,1023.5,-18.2,0,NNW,5.6,Aotizhongxin",
            "4,2013,3,1,3,6,6,11,11,,72,-1.4,1024.5,-19.4,0,NW,3.1,Aotizhongxin",
            "4,2013,3,1,3,6,6,11,11,,72,-1.4,1024.5,-19.4,0,NW,3.1,Aotizhongxin",
        ]);
        let run = run(ds);
        assert!(run.succeeded(), "{:?}", run.failure);
        assert!(Stage::ALL.iter().all(|s| run.completed(*s)));

        let report = &run.report;
        assert_eq!(report.preview.as_ref().unwrap().rows.len(), 5);
        let diag = report.diagnostics.as_ref().unwrap();
        assert_eq!(diag.duplicates, 1);
        assert_eq!(diag.total_missing(), 4);
        assert!(report
            .missing_after_cleaning
            .as_ref()
            .unwrap()
            .iter()
            .all(|m| m.missing == 0));
        assert_eq!(report.rainfall.as_ref().unwrap().len(), 3);
        assert_eq!(report.time_profiles.as_ref().unwrap().len(), 3);
        assert!(matches!(report.correlation, Some(Correlation::Matrix(_))));
    }

    #[test]
    fn empty_upload_does_not_fail() {
        let run = run(dataset(&[]));
        assert!(run.succeeded());
        let diag = run.report.diagnostics.as_ref().unwrap();
        assert_eq!(diag.duplicates, 0);
        assert!(diag.missing.iter().all(|m| m.missing == 0));
        assert_eq!(
            run.report.correlation,
            Some(Correlation::InsufficientData { rows: 0 })
        );
    }

    #[test]
    fn missing_rain_aborts_with_column_not_found() {
        let csv = "year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,wd,WSPM\n\
                   2013,3,1,0,4,4,4,7,300,77,-0.7,1023,-18.8,NNW,4.4\n";
        let run = run(load_bytes(csv.as_bytes()).unwrap());
        let failure = run.failure.as_ref().unwrap();
        assert_eq!(failure.stage, Stage::Cleaning);
        assert!(matches!(
            &failure.error,
            PipelineError::ColumnNotFound { column } if column == "RAIN"
        ));
        // earlier stages still rendered, later ones never ran
        assert!(run.completed(Stage::Diagnostics));
        assert!(!run.completed(Stage::RainfallScatter));
        assert!(run.report.correlation.is_none());
    }

    #[test]
    fn report_serializes_with_failure_message() {
        let run = run(load_bytes(b"a\n1\n").unwrap());
        let json = run.to_json().unwrap();
        assert!(json.contains("\"stage\": \"cleaning\""));
        assert!(json.contains("column 'PM2.5' not found"));
    }
}
