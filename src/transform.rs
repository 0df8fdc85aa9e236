//! Pure derivations from raw input records to table rows.

use crate::models::{
    ArtistRow, LogEvent, SongArtistMatch, SongPlayRow, SongRecord, SongRow, TimeRow, UserRow,
};
use chrono::{DateTime, Datelike, Timelike, Utc};
use thiserror::Error;

pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Reasons a song play event cannot produce rows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidEvent {
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),

    #[error("missing user id")]
    MissingUserId,

    #[error("invalid user id \"{0}\"")]
    InvalidUserId(String),
}

/// What the log says was played, matched against the catalog as is.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayedSong {
    pub title: String,
    pub artist_name: String,
    pub duration: f64,
}

/// A log event that passed the page filter.
///
/// Time and user rows are always derivable. `song` is None when the event
/// lacks any of title, artist or length, in which case no song play can be
/// resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct SongPlayEvent {
    pub time: TimeRow,
    pub user: UserRow,
    pub song: Option<PlayedSong>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongPlayEvent {
    pub fn to_song_play(&self, resolved: SongArtistMatch) -> SongPlayRow {
        SongPlayRow {
            start_time: self.time.start_time.clone(),
            user_id: self.user.user_id,
            level: self.user.level.clone(),
            song_id: resolved.song_id,
            artist_id: resolved.artist_id,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

pub fn song_row(record: &SongRecord) -> SongRow {
    SongRow {
        song_id: record.song_id.clone(),
        title: record.title.clone(),
        artist_id: record.artist_id.clone(),
        year: record.year,
        duration: record.duration,
    }
}

pub fn artist_row(record: &SongRecord) -> ArtistRow {
    ArtistRow {
        artist_id: record.artist_id.clone(),
        name: record.artist_name.clone(),
        location: record.artist_location.clone(),
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    }
}

/// Decomposes a millisecond epoch timestamp into the time dimension.
pub fn time_row(ts_millis: i64) -> Result<TimeRow, InvalidEvent> {
    let start: DateTime<Utc> = DateTime::from_timestamp_millis(ts_millis)
        .ok_or(InvalidEvent::TimestampOutOfRange(ts_millis))?;
    Ok(TimeRow {
        start_time: start.format(START_TIME_FORMAT).to_string(),
        hour: start.hour(),
        day: start.day(),
        week: start.iso_week().week(),
        month: start.month(),
        year: start.year(),
        weekday: start.format("%A").to_string(),
    })
}

pub fn user_row(event: &LogEvent) -> Result<UserRow, InvalidEvent> {
    let raw_id = event.user_id.as_deref().ok_or(InvalidEvent::MissingUserId)?;
    let user_id = raw_id
        .parse::<i64>()
        .map_err(|_| InvalidEvent::InvalidUserId(raw_id.to_string()))?;
    Ok(UserRow {
        user_id,
        first_name: event.first_name.clone(),
        last_name: event.last_name.clone(),
        gender: event.gender.clone(),
        level: event.level.clone(),
    })
}

pub fn is_song_play(event: &LogEvent, song_play_page: &str) -> bool {
    event.page == song_play_page
}

fn played_song(event: &LogEvent) -> Option<PlayedSong> {
    Some(PlayedSong {
        title: event.song.clone()?,
        artist_name: event.artist.clone()?,
        duration: event.length?,
    })
}

/// Only the timestamp and the user id are required.
pub fn song_play_event(event: &LogEvent) -> Result<SongPlayEvent, InvalidEvent> {
    Ok(SongPlayEvent {
        time: time_row(event.ts)?,
        user: user_row(event)?,
        song: played_song(event),
        session_id: event.session_id,
        location: event.location.clone(),
        user_agent: event.user_agent.clone(),
    })
}
