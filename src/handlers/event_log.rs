use super::{malformed, read_json_lines, FileHandler};
use crate::error::{EtlError, WriteError};
use crate::models::LogEvent;
use crate::report::{FileReport, Target};
use crate::transform::{is_song_play, song_play_event, SongPlayEvent};
use crate::warehouse::Warehouse;
use std::path::Path;
use tracing::{debug, error, warn};

pub const DEFAULT_SONG_PLAY_PAGE: &str = "NextSong";

/// Loads an activity log file into `time`, `users` and `songplays`.
#[derive(Debug, Clone)]
pub struct EventLogHandler {
    song_play_page: String,
}

impl Default for EventLogHandler {
    fn default() -> Self {
        Self::new(DEFAULT_SONG_PLAY_PAGE)
    }
}

impl EventLogHandler {
    pub fn new<S: Into<String>>(song_play_page: S) -> Self {
        Self {
            song_play_page: song_play_page.into(),
        }
    }

    fn song_plays(&self, path: &Path, events: &[LogEvent], report: &mut FileReport) -> Vec<SongPlayEvent> {
        let mut plays = Vec::new();
        for (index, event) in events.iter().enumerate() {
            if !is_song_play(event, &self.song_play_page) {
                report.filtered_out += 1;
                continue;
            }
            match song_play_event(event) {
                Ok(play) => plays.push(play),
                Err(reason) => {
                    warn!("Skipping event #{} of {:?}: {}", index + 1, path, reason);
                    report.invalid += 1;
                }
            }
        }
        plays
    }
}

impl FileHandler for EventLogHandler {
    fn name(&self) -> &'static str {
        "event log"
    }

    fn handle(&self, path: &Path, warehouse: &mut dyn Warehouse) -> Result<FileReport, EtlError> {
        let events: Vec<LogEvent> = read_json_lines(path).map_err(malformed(path))?;

        let mut report = FileReport {
            records: events.len(),
            ..FileReport::default()
        };
        let plays = self.song_plays(path, &events, &mut report);

        for play in &plays {
            report.record(
                Target::Time,
                &play.time.start_time,
                path,
                warehouse.insert_time(&play.time),
            )?;
        }

        for play in &plays {
            report.record(
                Target::Users,
                play.user.user_id,
                path,
                warehouse.upsert_user(&play.user),
            )?;
        }

        for play in &plays {
            let Some(song) = &play.song else {
                debug!(
                    "Song play at {} has no song, artist or length",
                    play.time.start_time
                );
                report.unmatched += 1;
                continue;
            };
            let resolved = match warehouse.find_song_artist(
                &song.title,
                &song.artist_name,
                song.duration,
            ) {
                Ok(Some(resolved)) => resolved,
                Ok(None) => {
                    debug!(
                        "No catalog entry for \"{}\" by \"{}\" ({})",
                        song.title, song.artist_name, song.duration
                    );
                    report.unmatched += 1;
                    continue;
                }
                Err(WriteError::Recoverable(reason)) => {
                    error!(
                        "Lookup of \"{}\" by \"{}\" failed: {}",
                        song.title, song.artist_name, reason
                    );
                    report.write_errors += 1;
                    continue;
                }
                Err(fatal) => return Err(fatal.into()),
            };

            let songplay = play.to_song_play(resolved);
            report.record(
                Target::Songplays,
                &songplay.start_time,
                path,
                warehouse.insert_songplay(&songplay),
            )?;
        }

        Ok(report)
    }
}
