use super::{SchemaProvisioner, Warehouse};
use crate::error::{WriteError, WriteOutcome, WriteResult};
use crate::models::{ArtistRow, SongArtistMatch, SongPlayRow, SongRow, TimeRow, UserRow};
use anyhow::Result;
use std::collections::BTreeMap;

/// In-memory warehouse with the same conflict policies and reference checks
/// as the SQLite one. Song plays are staged until `commit`.
#[derive(Default)]
pub struct MemoryWarehouse {
    songs: BTreeMap<String, SongRow>,
    artists: BTreeMap<String, ArtistRow>,
    users: BTreeMap<i64, UserRow>,
    time: BTreeMap<String, TimeRow>,
    songplays: Vec<(i64, SongPlayRow)>,
    committed_songplays: usize,
    commits: usize,
    songplay_failure: Option<WriteError>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent song play insert fail with `err`.
    pub fn fail_songplays_with(&mut self, err: WriteError) {
        self.songplay_failure = Some(err);
    }

    pub fn songs(&self) -> &BTreeMap<String, SongRow> {
        &self.songs
    }

    pub fn artists(&self) -> &BTreeMap<String, ArtistRow> {
        &self.artists
    }

    pub fn users(&self) -> &BTreeMap<i64, UserRow> {
        &self.users
    }

    pub fn time_rows(&self) -> &BTreeMap<String, TimeRow> {
        &self.time
    }

    /// All song plays with their surrogate ids, committed or not.
    pub fn songplays(&self) -> &[(i64, SongPlayRow)] {
        &self.songplays
    }

    pub fn committed_songplays(&self) -> &[(i64, SongPlayRow)] {
        &self.songplays[..self.committed_songplays]
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }
}

impl Warehouse for MemoryWarehouse {
    fn insert_song(&mut self, song: &SongRow) -> WriteResult {
        if self.songs.contains_key(&song.song_id) {
            return Ok(WriteOutcome::Ignored);
        }
        self.songs.insert(song.song_id.clone(), song.clone());
        Ok(WriteOutcome::Inserted)
    }

    fn insert_artist(&mut self, artist: &ArtistRow) -> WriteResult {
        if self.artists.contains_key(&artist.artist_id) {
            return Ok(WriteOutcome::Ignored);
        }
        self.artists.insert(artist.artist_id.clone(), artist.clone());
        Ok(WriteOutcome::Inserted)
    }

    fn insert_time(&mut self, time: &TimeRow) -> WriteResult {
        if self.time.contains_key(&time.start_time) {
            return Ok(WriteOutcome::Ignored);
        }
        self.time.insert(time.start_time.clone(), time.clone());
        Ok(WriteOutcome::Inserted)
    }

    fn upsert_user(&mut self, user: &UserRow) -> WriteResult {
        match self.users.get_mut(&user.user_id) {
            Some(existing) => {
                existing.level = user.level.clone();
                Ok(WriteOutcome::Updated)
            }
            None if user.first_name.is_none() || user.last_name.is_none() => Err(
                WriteError::Recoverable("NOT NULL constraint failed: users name".to_string()),
            ),
            None => {
                self.users.insert(user.user_id, user.clone());
                Ok(WriteOutcome::Inserted)
            }
        }
    }

    fn find_song_artist(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongArtistMatch>, WriteError> {
        let found = self.songs.values().find(|song| {
            song.title == title
                && song.duration == duration
                && self
                    .artists
                    .get(&song.artist_id)
                    .is_some_and(|artist| artist.name == artist_name)
        });
        Ok(found.map(|song| SongArtistMatch {
            song_id: song.song_id.clone(),
            artist_id: song.artist_id.clone(),
        }))
    }

    fn insert_songplay(&mut self, songplay: &SongPlayRow) -> WriteResult {
        if let Some(err) = &self.songplay_failure {
            return Err(err.clone());
        }
        let references_ok = self.time.contains_key(&songplay.start_time)
            && self.users.contains_key(&songplay.user_id)
            && self.songs.contains_key(&songplay.song_id)
            && self.artists.contains_key(&songplay.artist_id);
        if !references_ok {
            return Err(WriteError::Recoverable(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        let id = self.songplays.len() as i64 + 1;
        self.songplays.push((id, songplay.clone()));
        Ok(WriteOutcome::Inserted)
    }

    fn commit(&mut self) -> Result<(), WriteError> {
        self.committed_songplays = self.songplays.len();
        self.commits += 1;
        Ok(())
    }
}

impl SchemaProvisioner for MemoryWarehouse {
    fn apply_schema(&mut self) -> Result<()> {
        Ok(())
    }

    fn reset_schema(&mut self) -> Result<()> {
        let commits = self.commits;
        *self = Self {
            commits,
            ..Self::default()
        };
        Ok(())
    }
}
