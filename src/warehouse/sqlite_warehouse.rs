use super::{SchemaProvisioner, Warehouse};
use crate::error::{WriteError, WriteOutcome, WriteResult};
use crate::models::{ArtistRow, SongArtistMatch, SongPlayRow, SongRow, TimeRow, UserRow};
use crate::schema::{
    current_schema, INSERT_ARTIST, INSERT_SONG, INSERT_SONGPLAY, INSERT_TIME,
    SELECT_SONG_ARTIST, UPSERT_USER, USER_EXISTS,
};
use crate::sqlite_persistence::VersionedSchema;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, Params};
use std::path::Path;
use tracing::{debug, info};

/// Warehouse backed by a single SQLite connection.
///
/// Writes open a transaction lazily; `commit` closes it. Dropping the
/// warehouse with uncommitted writes rolls them back.
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    /// Opens (or creates) the database file without looking at its schema.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open warehouse database at {:?}", path))?;
        Self::from_connection(conn)
    }

    /// Opens the database and checks it carries the current schema.
    pub fn open_for_load<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let warehouse = Self::open(db_path)?;
        warehouse.verify_schema()?;
        Ok(warehouse)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn verify_schema(&self) -> Result<()> {
        let schema = current_schema();
        match VersionedSchema::stamped_version(&self.conn)? {
            Some(version) if version == schema.version => schema
                .validate(&self.conn)
                .with_context(|| format!("Schema validation failed for version {}", version)),
            Some(version) => bail!(
                "Warehouse schema version {} does not match expected version {}",
                version,
                schema.version
            ),
            None => bail!("Warehouse schema has not been applied, run `sparkify-schema apply` first"),
        }
    }

    pub fn table_count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to count rows of {}", table))?;
        Ok(count as usize)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin_if_needed(&self) -> Result<(), WriteError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN").map_err(classify)?;
        }
        Ok(())
    }

    fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize, WriteError> {
        self.begin_if_needed()?;
        self.conn
            .prepare_cached(sql)
            .and_then(|mut stmt| stmt.execute(params))
            .map_err(classify)
    }
}

/// Splits SQLite failures into the ones that only affect the current row
/// and the ones that leave the store unusable.
pub(crate) fn classify(err: rusqlite::Error) -> WriteError {
    match err.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::NotADatabase
            | ErrorCode::ReadOnly
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::OutOfMemory
            | ErrorCode::PermissionDenied,
        ) => WriteError::Fatal(err.to_string()),
        _ => WriteError::Recoverable(err.to_string()),
    }
}

fn ignored_if_unchanged(changed: usize) -> WriteOutcome {
    if changed == 0 {
        WriteOutcome::Ignored
    } else {
        WriteOutcome::Inserted
    }
}

impl Warehouse for SqliteWarehouse {
    fn insert_song(&mut self, song: &SongRow) -> WriteResult {
        let changed = self.execute(
            INSERT_SONG,
            params![song.song_id, song.title, song.artist_id, song.year, song.duration],
        )?;
        Ok(ignored_if_unchanged(changed))
    }

    fn insert_artist(&mut self, artist: &ArtistRow) -> WriteResult {
        let changed = self.execute(
            INSERT_ARTIST,
            params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude
            ],
        )?;
        Ok(ignored_if_unchanged(changed))
    }

    fn insert_time(&mut self, time: &TimeRow) -> WriteResult {
        let changed = self.execute(
            INSERT_TIME,
            params![
                time.start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday
            ],
        )?;
        Ok(ignored_if_unchanged(changed))
    }

    fn upsert_user(&mut self, user: &UserRow) -> WriteResult {
        let existed = self
            .conn
            .prepare_cached(USER_EXISTS)
            .and_then(|mut stmt| stmt.exists(params![user.user_id]))
            .map_err(classify)?;
        self.execute(
            UPSERT_USER,
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level
            ],
        )?;
        Ok(if existed {
            WriteOutcome::Updated
        } else {
            WriteOutcome::Inserted
        })
    }

    fn find_song_artist(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongArtistMatch>, WriteError> {
        let mut stmt = self
            .conn
            .prepare_cached(SELECT_SONG_ARTIST)
            .map_err(classify)?;
        let matches: Vec<SongArtistMatch> = stmt
            .query_map(params![title, artist_name, duration], |row| {
                Ok(SongArtistMatch {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .and_then(|rows| rows.collect())
            .map_err(classify)?;

        if matches.len() > 1 {
            debug!(
                "{} catalog entries match \"{}\" by \"{}\" ({}), using {}",
                matches.len(),
                title,
                artist_name,
                duration,
                matches[0].song_id
            );
        }
        Ok(matches.into_iter().next())
    }

    fn insert_songplay(&mut self, songplay: &SongPlayRow) -> WriteResult {
        self.execute(
            INSERT_SONGPLAY,
            params![
                songplay.start_time,
                songplay.user_id,
                songplay.level,
                songplay.song_id,
                songplay.artist_id,
                songplay.session_id,
                songplay.location,
                songplay.user_agent
            ],
        )?;
        Ok(WriteOutcome::Inserted)
    }

    fn commit(&mut self) -> Result<(), WriteError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT").map_err(classify)?;
        }
        Ok(())
    }
}

impl SchemaProvisioner for SqliteWarehouse {
    fn apply_schema(&mut self) -> Result<()> {
        self.commit()?;
        let schema = current_schema();
        let tx = self.conn.transaction()?;
        schema.create(&tx)?;
        schema
            .validate(&tx)
            .context("Existing tables do not match the declared schema")?;
        tx.commit()?;
        info!("Warehouse schema version {} applied", schema.version);
        Ok(())
    }

    fn reset_schema(&mut self) -> Result<()> {
        self.commit()?;
        let tx = self.conn.transaction()?;
        current_schema().drop(&tx)?;
        tx.commit()?;
        info!("Warehouse tables dropped");
        Ok(())
    }
}
