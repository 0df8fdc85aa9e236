#![allow(dead_code)]

//! Shared constants for integration tests
//!
//! When the fixture data changes, update only this file.

// ============================================================================
// Catalog
// ============================================================================

pub const SONG_1_ID: &str = "SOCIWDW12A8C13D406";
pub const SONG_1_TITLE: &str = "Soul Deep";
pub const SONG_1_DURATION: f64 = 148.03546;
pub const ARTIST_1_ID: &str = "ARMJAGH1187FB546F3";
pub const ARTIST_1_NAME: &str = "The Box Tops";

pub const SONG_2_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_2_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_2_DURATION: f64 = 152.92036;
pub const ARTIST_2_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_2_NAME: &str = "Line Renaud";

// ============================================================================
// Activity log
// ============================================================================

/// Plays both catalog songs, first on the free tier then on the paid one.
pub const USER_1_ID: i64 = 10;
pub const USER_1_FIRST_NAME: &str = "Jacob";

/// Plays a song missing from the catalog.
pub const USER_2_ID: i64 = 20;

/// 2018-11-01 20:56:40.796, a Home page view by user 1
pub const TS_HOME: i64 = 1_541_105_800_796;
/// 2018-11-01 20:57:10.796, user 1 plays song 1 (free)
pub const TS_PLAY_1: i64 = 1_541_105_830_796;
/// 2018-11-01 21:01:46.796, user 2 plays an unknown song
pub const TS_UNMATCHED: i64 = 1_541_106_106_796;
/// 2018-11-03 01:04:33.796, user 1 plays song 2 (paid)
pub const TS_PLAY_2: i64 = 1_541_207_073_796;
/// 2018-11-03 01:05:50.796, user 1 logs out
pub const TS_LOGOUT: i64 = 1_541_207_150_796;

pub const START_TIME_PLAY_1: &str = "2018-11-01 20:57:10.796";
