use crate::error::{EtlError, WriteError, WriteOutcome, WriteResult};
use crate::schema::{TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIME, TABLE_USERS};
use std::fmt::Display;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl Target {
    pub fn table_name(&self) -> &'static str {
        match self {
            Target::Songs => TABLE_SONGS,
            Target::Artists => TABLE_ARTISTS,
            Target::Users => TABLE_USERS,
            Target::Time => TABLE_TIME,
            Target::Songplays => TABLE_SONGPLAYS,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub inserted: usize,
    pub ignored: usize,
    pub updated: usize,
}

impl TableCounts {
    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted => self.inserted += 1,
            WriteOutcome::Ignored => self.ignored += 1,
            WriteOutcome::Updated => self.updated += 1,
        }
    }

    fn add(&mut self, other: &TableCounts) {
        self.inserted += other.inserted;
        self.ignored += other.ignored;
        self.updated += other.updated;
    }
}

/// What loading a single file did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Records parsed from the file.
    pub records: usize,
    /// Events dropped by the page filter.
    pub filtered_out: usize,
    /// Song plays that could not produce rows.
    pub invalid: usize,
    /// Song plays with no matching catalog entry.
    pub unmatched: usize,
    /// Recoverable write failures.
    pub write_errors: usize,
    pub songs: TableCounts,
    pub artists: TableCounts,
    pub users: TableCounts,
    pub time: TableCounts,
    pub songplays: TableCounts,
}

impl FileReport {
    pub fn counts(&self, target: Target) -> &TableCounts {
        match target {
            Target::Songs => &self.songs,
            Target::Artists => &self.artists,
            Target::Users => &self.users,
            Target::Time => &self.time,
            Target::Songplays => &self.songplays,
        }
    }

    fn counts_mut(&mut self, target: Target) -> &mut TableCounts {
        match target {
            Target::Songs => &mut self.songs,
            Target::Artists => &mut self.artists,
            Target::Users => &mut self.users,
            Target::Time => &mut self.time,
            Target::Songplays => &mut self.songplays,
        }
    }

    /// Accounts for one write. Recoverable failures are logged and counted,
    /// fatal ones are returned.
    pub fn record<K: Display>(
        &mut self,
        target: Target,
        key: K,
        path: &Path,
        result: WriteResult,
    ) -> Result<(), EtlError> {
        match result {
            Ok(outcome) => {
                self.counts_mut(target).record(outcome);
                Ok(())
            }
            Err(WriteError::Recoverable(reason)) => {
                error!(
                    "Could not write {} row {} from {:?}: {}",
                    target.table_name(),
                    key,
                    path,
                    reason
                );
                self.write_errors += 1;
                Ok(())
            }
            Err(fatal) => Err(fatal.into()),
        }
    }

    fn add(&mut self, other: &FileReport) {
        self.records += other.records;
        self.filtered_out += other.filtered_out;
        self.invalid += other.invalid;
        self.unmatched += other.unmatched;
        self.write_errors += other.write_errors;
        self.songs.add(&other.songs);
        self.artists.add(&other.artists);
        self.users.add(&other.users);
        self.time.add(&other.time);
        self.songplays.add(&other.songplays);
    }
}

/// Totals for one handler run over one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub handler: &'static str,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub totals: FileReport,
}

impl BatchReport {
    pub fn new(handler: &'static str, files_found: usize) -> Self {
        Self {
            handler,
            files_found,
            files_processed: 0,
            files_skipped: 0,
            totals: FileReport::default(),
        }
    }

    pub fn add_file(&mut self, file: &FileReport) {
        self.files_processed += 1;
        self.totals.add(file);
    }

    pub fn log_summary(&self) {
        info!("");
        info!("{} load summary", self.handler);
        info!("Files: {} found, {} processed", self.files_found, self.files_processed);
        info!("Records read: {}", self.totals.records);
        for target in [
            Target::Songs,
            Target::Artists,
            Target::Users,
            Target::Time,
            Target::Songplays,
        ] {
            let counts = self.totals.counts(target);
            if *counts == TableCounts::default() {
                continue;
            }
            info!(
                "  {}: {} inserted, {} ignored, {} updated",
                target.table_name(),
                counts.inserted,
                counts.ignored,
                counts.updated
            );
        }
        if self.totals.filtered_out > 0 {
            info!("Events filtered out: {}", self.totals.filtered_out);
        }
        if self.totals.unmatched > 0 {
            info!("Song plays without catalog match: {}", self.totals.unmatched);
        }
        if self.totals.invalid > 0 {
            warn!("Invalid song play events: {}", self.totals.invalid);
        }
        if self.totals.write_errors > 0 {
            warn!("Row write errors: {}", self.totals.write_errors);
        }
        if self.files_skipped > 0 {
            warn!("Malformed files skipped: {}", self.files_skipped);
        }
    }
}
