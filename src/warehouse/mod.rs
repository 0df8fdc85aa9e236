mod memory_warehouse;
mod sqlite_warehouse;

pub use memory_warehouse::MemoryWarehouse;
pub use sqlite_warehouse::SqliteWarehouse;

use crate::error::{WriteError, WriteResult};
use crate::models::{ArtistRow, SongArtistMatch, SongPlayRow, SongRow, TimeRow, UserRow};
use anyhow::Result;

/// The store client the load engine writes through.
///
/// Every write reports its own outcome so the caller decides whether to
/// continue or abort. Implementations are used from a single thread and
/// owned by the batch driver for the whole run.
pub trait Warehouse {
    /// Insert-or-ignore on `song_id`.
    fn insert_song(&mut self, song: &SongRow) -> WriteResult;

    /// Insert-or-ignore on `artist_id`.
    fn insert_artist(&mut self, artist: &ArtistRow) -> WriteResult;

    /// Insert-or-ignore on `start_time`.
    fn insert_time(&mut self, time: &TimeRow) -> WriteResult;

    /// Inserts the user, or overwrites only its level if the id exists.
    fn upsert_user(&mut self, user: &UserRow) -> WriteResult;

    /// Resolves a played song to catalog keys by exact title, artist name
    /// and duration. Returns None when the catalog has no such entry.
    fn find_song_artist(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongArtistMatch>, WriteError>;

    /// Plain insert with a store-assigned surrogate key.
    fn insert_songplay(&mut self, songplay: &SongPlayRow) -> WriteResult;

    /// Makes every write since the previous commit durable.
    fn commit(&mut self) -> Result<(), WriteError>;
}

/// Schema provisioning, kept apart from loading.
pub trait SchemaProvisioner {
    /// Creates the five tables if absent.
    fn apply_schema(&mut self) -> Result<()>;

    /// Drops the five tables.
    fn reset_schema(&mut self) -> Result<()>;
}
