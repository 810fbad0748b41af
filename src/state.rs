use std::path::Path;

use anyhow::Context;

use crate::data::loader;
use crate::data::model::Dataset;
use crate::pipeline::{self, PipelineRun};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Outcome of the last pipeline run (None until a file is uploaded).
    pub run: Option<PipelineRun>,

    /// Name of the uploaded file.
    pub source: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Run the pipeline on a freshly uploaded dataset.
    pub fn ingest(&mut self, source: String, dataset: Dataset) {
        log::info!(
            "Loaded {source}: {} rows, columns {:?}",
            dataset.len(),
            dataset.column_names()
        );
        if dataset.is_empty() {
            log::warn!("{source} has a header but no data rows");
        }
        let run = pipeline::run(dataset);
        if run.succeeded() {
            log::info!("Dashboard ready for {source}");
        }
        self.status_message = run
            .failure
            .as_ref()
            .map(|f| format!("Error in {} stage: {}", f.stage, f.error));
        self.run = Some(run);
        self.source = Some(source);
    }

    /// Upload from a file on disk.
    pub fn load_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let dataset = loader::load_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.ingest(name, dataset);
        Ok(())
    }

    /// Upload from in-memory bytes (drag-and-drop without a path).
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let dataset = loader::load_bytes(bytes).with_context(|| format!("reading CSV {name}"))?;
        self.ingest(name.to_string(), dataset);
        Ok(())
    }

    /// Record a failed upload; nothing of the previous run is kept.
    pub fn upload_failed(&mut self, error: anyhow::Error) {
        log::error!("Failed to load file: {error:#}");
        self.run = None;
        self.source = None;
        self.status_message = Some(format!("Error: {error:#}"));
    }

    /// Pretty JSON of the current report, if any.
    pub fn report_json(&self) -> Option<anyhow::Result<String>> {
        self.run
            .as_ref()
            .map(|run| run.to_json().context("serializing report"))
    }
}
