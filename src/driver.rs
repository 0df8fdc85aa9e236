use crate::config::EtlConfig;
use crate::discovery::find_data_files;
use crate::error::EtlError;
use crate::handlers::{EventLogHandler, FileHandler, SongCatalogHandler};
use crate::report::BatchReport;
use crate::warehouse::Warehouse;
use clap::ValueEnum;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// What to do with a data file that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MalformedFilePolicy {
    /// Log the file and carry on with the next one.
    #[default]
    Skip,
    /// Stop the run with `EtlError::MalformedFile`.
    Abort,
}

/// Reports of a full load, one per input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub songs: BatchReport,
    pub events: BatchReport,
}

/// Runs file handlers over data roots, committing after each file.
pub struct BatchDriver<W: Warehouse> {
    warehouse: W,
    extension: String,
    on_malformed: MalformedFilePolicy,
}

impl<W: Warehouse> BatchDriver<W> {
    pub fn new(warehouse: W) -> Self {
        Self {
            warehouse,
            extension: DEFAULT_FILE_EXTENSION.to_string(),
            on_malformed: MalformedFilePolicy::default(),
        }
    }

    pub fn from_config(warehouse: W, config: &EtlConfig) -> Self {
        Self::new(warehouse)
            .with_extension(&config.file_extension)
            .with_malformed_policy(config.on_malformed)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedFilePolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn into_warehouse(self) -> W {
        self.warehouse
    }

    /// Applies `handler` to every data file under `root`.
    ///
    /// Each file ends with a commit, so a crash after file N leaves files
    /// 1..=N durably loaded. Per-row failures are counted in the report;
    /// store failures end the run.
    pub fn process(
        &mut self,
        root: &Path,
        handler: &dyn FileHandler,
    ) -> Result<BatchReport, EtlError> {
        let data_files = find_data_files(root, &self.extension)?;
        let total = data_files.count();
        info!("{} files found in {}", total, data_files.root.display());
        if data_files.is_empty() {
            warn!(
                "No .{} files under {}, nothing to load",
                self.extension,
                data_files.root.display()
            );
        }

        let mut report = BatchReport::new(handler.name(), total);
        for (index, path) in data_files.files.iter().enumerate() {
            match handler.handle(path, &mut self.warehouse) {
                Ok(file_report) => report.add_file(&file_report),
                Err(err @ EtlError::MalformedFile { .. }) => match self.on_malformed {
                    MalformedFilePolicy::Skip => {
                        warn!("{}, skipping", err);
                        report.files_skipped += 1;
                    }
                    MalformedFilePolicy::Abort => return Err(err),
                },
                Err(err) => return Err(err),
            }
            self.warehouse.commit()?;
            info!("{}/{} files processed.", index + 1, total);
        }

        report.log_summary();
        Ok(report)
    }

    /// Loads the song catalog, then the activity log.
    pub fn load_all(&mut self, config: &EtlConfig) -> Result<LoadReport, EtlError> {
        let songs = self.process(&config.song_data, &SongCatalogHandler)?;
        let events = self.process(
            &config.log_data,
            &EventLogHandler::new(config.song_play_page.as_str()),
        )?;
        Ok(LoadReport { songs, events })
    }
}
