//! Data trees and warehouse creation for integration tests

use super::constants::*;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;
use sparkify_etl::{EtlConfig, SchemaProvisioner, SqliteWarehouse};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestDataset {
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
    _temp_dir: TempDir, // Keep temp dir alive
}

impl TestDataset {
    pub fn config(&self) -> EtlConfig {
        EtlConfig {
            database: self.db_path.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            ..EtlConfig::default()
        }
    }

    pub fn open_warehouse(&self) -> SqliteWarehouse {
        SqliteWarehouse::open_for_load(&self.db_path).unwrap()
    }
}

/// Writes `content` at `root/relative`, creating parent directories.
pub fn write_data_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn song_file(
    song_id: &str,
    title: &str,
    duration: f64,
    artist_id: &str,
    artist_name: &str,
    year: i32,
) -> String {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": year,
    })
    .to_string()
}

/// One activity log line. Song fields are only set for song plays.
pub fn log_line(
    page: &str,
    ts: i64,
    user_id: i64,
    first_name: &str,
    level: &str,
    song: Option<(&str, &str, f64)>,
) -> String {
    let (title, artist, length) = match song {
        Some((title, artist, length)) => (json!(title), json!(artist), json!(length)),
        None => (json!(null), json!(null), json!(null)),
    };
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": first_name,
        "gender": "M",
        "itemInSession": 0,
        "lastName": "Klein",
        "length": length,
        "level": level,
        "location": "Tampa-St. Petersburg-Clearwater, FL",
        "method": "PUT",
        "page": page,
        "registration": 1540558108796.0,
        "sessionId": 518,
        "song": title,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4)",
        "userId": user_id.to_string(),
    })
    .to_string()
}

/// Creates a temporary dataset with a provisioned warehouse:
/// - song_data: two songs by two artists, song 1 duplicated in a second file
/// - log_data: two days of events, with two matching plays, one unmatched
///   play, and two non-play events
pub fn create_test_dataset() -> Result<TestDataset> {
    let dir = TempDir::new()?;
    let song_data = dir.path().join("song_data");
    let log_data = dir.path().join("log_data");

    let song_1 = song_file(
        SONG_1_ID,
        SONG_1_TITLE,
        SONG_1_DURATION,
        ARTIST_1_ID,
        ARTIST_1_NAME,
        1969,
    );
    write_data_file(&song_data, "A/A/A/TRAAAAW128F429D538.json", &song_1);
    write_data_file(&song_data, "A/B/C/TRABCEI128F424C983.json", &song_1);
    write_data_file(
        &song_data,
        "A/A/B/TRAABJL12903CDCF1A.json",
        &song_file(
            SONG_2_ID,
            SONG_2_TITLE,
            SONG_2_DURATION,
            ARTIST_2_ID,
            ARTIST_2_NAME,
            0,
        ),
    );

    let day_1 = [
        log_line("Home", TS_HOME, USER_1_ID, USER_1_FIRST_NAME, "free", None),
        log_line(
            "NextSong",
            TS_PLAY_1,
            USER_1_ID,
            USER_1_FIRST_NAME,
            "free",
            Some((SONG_1_TITLE, ARTIST_1_NAME, SONG_1_DURATION)),
        ),
        log_line(
            "NextSong",
            TS_UNMATCHED,
            USER_2_ID,
            "Kaylee",
            "free",
            Some(("You Gotta Be", "Des'ree", 246.30812)),
        ),
    ];
    let day_2 = [
        log_line(
            "NextSong",
            TS_PLAY_2,
            USER_1_ID,
            "Jake",
            "paid",
            Some((SONG_2_TITLE, ARTIST_2_NAME, SONG_2_DURATION)),
        ),
        log_line("Logout", TS_LOGOUT, USER_1_ID, USER_1_FIRST_NAME, "paid", None),
    ];
    write_data_file(&log_data, "2018/11/2018-11-01-events.json", &day_1.join("\n"));
    write_data_file(&log_data, "2018/11/2018-11-03-events.json", &day_2.join("\n"));

    let db_path = dir.path().join("sparkify.db");
    SqliteWarehouse::open(&db_path)?.apply_schema()?;

    Ok(TestDataset {
        song_data,
        log_data,
        db_path,
        _temp_dir: dir,
    })
}

/// Runs a single-value query against the warehouse file.
pub fn query_string(db_path: &Path, sql: &str) -> String {
    let conn = Connection::open(db_path).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}
