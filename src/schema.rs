//! Star schema for the Sparkify warehouse.
//!
//! One fact table (`songplays`) and four dimension tables (`songs`,
//! `artists`, `users`, `time`). Dimension tables are keyed by their natural
//! key; `songplays` uses an auto-assigned surrogate key. The statements at
//! the bottom of this module carry each table's conflict policy.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

pub const TABLE_SONGS: &str = "songs";
pub const TABLE_ARTISTS: &str = "artists";
pub const TABLE_USERS: &str = "users";
pub const TABLE_TIME: &str = "time";
pub const TABLE_SONGPLAYS: &str = "songplays";

// =============================================================================
// Version 1 - Star schema
// =============================================================================

/// Songs dimension, first write wins.
const SONGS_TABLE_V1: Table = Table {
    name: TABLE_SONGS,
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("artist_id", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("duration", &SqlType::Real),
    ],
    indices: &[("idx_songs_title", "title")],
};

/// Artists dimension, first write wins.
const ARTISTS_TABLE_V1: Table = Table {
    name: TABLE_ARTISTS,
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
};

/// Users dimension, only `level` changes after the first write.
const USERS_TABLE_V1: Table = Table {
    name: TABLE_USERS,
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true, non_null = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("level", &SqlType::Text),
    ],
    indices: &[],
};

/// Time dimension, every column is derived from `start_time`.
const TIME_TABLE_V1: Table = Table {
    name: TABLE_TIME,
    columns: &[
        sqlite_column!("start_time", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("hour", &SqlType::Integer),
        sqlite_column!("day", &SqlType::Integer),
        sqlite_column!("week", &SqlType::Integer),
        sqlite_column!("month", &SqlType::Integer),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("weekday", &SqlType::Text),
    ],
    indices: &[],
};

const TIME_FK: ForeignKey = ForeignKey {
    foreign_table: TABLE_TIME,
    foreign_column: "start_time",
};
const USER_FK: ForeignKey = ForeignKey {
    foreign_table: TABLE_USERS,
    foreign_column: "user_id",
};
const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: TABLE_SONGS,
    foreign_column: "song_id",
};
const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: TABLE_ARTISTS,
    foreign_column: "artist_id",
};

/// Song plays fact table.
const SONGPLAYS_TABLE_V1: Table = Table {
    name: TABLE_SONGPLAYS,
    columns: &[
        sqlite_column!("songplay_id", &SqlType::Integer, is_primary_key = true), // rowid alias
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TIME_FK)
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("level", &SqlType::Text),
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("session_id", &SqlType::Integer),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_songplays_start_time", "start_time"),
        ("idx_songplays_user_id", "user_id"),
    ],
};

/// Tables are listed so that every table comes after the ones it references.
pub const SPARKIFY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        SONGS_TABLE_V1,
        ARTISTS_TABLE_V1,
        USERS_TABLE_V1,
        TIME_TABLE_V1,
        SONGPLAYS_TABLE_V1,
    ],
}];

pub fn current_schema() -> &'static VersionedSchema {
    &SPARKIFY_VERSIONED_SCHEMAS[SPARKIFY_VERSIONED_SCHEMAS.len() - 1]
}

// =============================================================================
// Statements
// =============================================================================

pub const INSERT_SONG: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration) \
     VALUES (?1, ?2, ?3, ?4, ?5) \
     ON CONFLICT (song_id) DO NOTHING";

pub const INSERT_ARTIST: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude) \
     VALUES (?1, ?2, ?3, ?4, ?5) \
     ON CONFLICT (artist_id) DO NOTHING";

pub const INSERT_TIME: &str = "INSERT INTO time (start_time, hour, day, week, month, year, weekday) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
     ON CONFLICT (start_time) DO NOTHING";

pub const UPSERT_USER: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level) \
     VALUES (?1, ?2, ?3, ?4, ?5) \
     ON CONFLICT (user_id) DO UPDATE SET level = excluded.level";

pub const USER_EXISTS: &str = "SELECT 1 FROM users WHERE user_id = ?1";

pub const INSERT_SONGPLAY: &str = "INSERT INTO songplays \
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

pub const SELECT_SONG_ARTIST: &str = "SELECT songs.song_id, artists.artist_id \
     FROM songs \
     JOIN artists ON songs.artist_id = artists.artist_id \
     WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3 \
     ORDER BY songs.song_id";
