use super::{malformed, read_json_values, FileHandler};
use crate::error::EtlError;
use crate::models::SongRecord;
use crate::report::{FileReport, Target};
use crate::transform::{artist_row, song_row};
use crate::warehouse::Warehouse;
use std::path::Path;

/// Loads a song catalog file into `songs` and `artists`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SongCatalogHandler;

impl FileHandler for SongCatalogHandler {
    fn name(&self) -> &'static str {
        "song catalog"
    }

    fn handle(&self, path: &Path, warehouse: &mut dyn Warehouse) -> Result<FileReport, EtlError> {
        let records: Vec<SongRecord> = read_json_values(path).map_err(malformed(path))?;

        let mut report = FileReport {
            records: records.len(),
            ..FileReport::default()
        };
        for record in &records {
            // The two writes are independent: a failed song does not stop the artist.
            let song = song_row(record);
            report.record(Target::Songs, &song.song_id, path, warehouse.insert_song(&song))?;

            let artist = artist_row(record);
            report.record(
                Target::Artists,
                &artist.artist_id,
                path,
                warehouse.insert_artist(&artist),
            )?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{WriteError, WriteResult};
    use crate::models::{ArtistRow, SongArtistMatch, SongPlayRow, SongRow, TimeRow, UserRow};
    use crate::warehouse::MemoryWarehouse;
    use std::fs;
    use tempfile::TempDir;

    const SONG_FILE: &str = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;

    fn write_song_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("TRAAAAW128F429D538.json");
        fs::write(&path, SONG_FILE).unwrap();
        path
    }

    #[test]
    fn test_loads_song_and_artist() {
        let dir = TempDir::new().unwrap();
        let path = write_song_file(&dir);
        let mut warehouse = MemoryWarehouse::new();

        let report = SongCatalogHandler.handle(&path, &mut warehouse).unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.songs.inserted, 1);
        assert_eq!(report.artists.inserted, 1);
        let song = &warehouse.songs()["SOMZWCG12A8C13C480"];
        assert_eq!(song.title, "I Didn't Mean To");
        assert_eq!(song.duration, 218.93179);
        assert_eq!(warehouse.artists()["ARD7TVE1187B99BFB1"].name, "Casual");
    }

    #[test]
    fn test_loading_twice_keeps_one_row_each() {
        let dir = TempDir::new().unwrap();
        let path = write_song_file(&dir);
        let mut warehouse = MemoryWarehouse::new();

        SongCatalogHandler.handle(&path, &mut warehouse).unwrap();
        let second = SongCatalogHandler.handle(&path, &mut warehouse).unwrap();

        assert_eq!(second.songs.ignored, 1);
        assert_eq!(second.artists.ignored, 1);
        assert_eq!(second.write_errors, 0);
        assert_eq!(warehouse.songs().len(), 1);
        assert_eq!(warehouse.artists().len(), 1);
    }

    #[test]
    fn test_malformed_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"song_id\": \"SO1\", ").unwrap();
        let mut warehouse = MemoryWarehouse::new();

        let result = SongCatalogHandler.handle(&path, &mut warehouse);

        assert!(matches!(result, Err(EtlError::MalformedFile { .. })));
        assert!(warehouse.songs().is_empty());
    }

    /// Rejects every song so the artist write can be observed on its own.
    #[derive(Default)]
    struct SongRejectingWarehouse {
        inner: MemoryWarehouse,
    }

    impl Warehouse for SongRejectingWarehouse {
        fn insert_song(&mut self, _song: &SongRow) -> WriteResult {
            Err(WriteError::Recoverable("CHECK constraint failed".to_string()))
        }
        fn insert_artist(&mut self, artist: &ArtistRow) -> WriteResult {
            self.inner.insert_artist(artist)
        }
        fn insert_time(&mut self, time: &TimeRow) -> WriteResult {
            self.inner.insert_time(time)
        }
        fn upsert_user(&mut self, user: &UserRow) -> WriteResult {
            self.inner.upsert_user(user)
        }
        fn find_song_artist(
            &mut self,
            title: &str,
            artist_name: &str,
            duration: f64,
        ) -> Result<Option<SongArtistMatch>, WriteError> {
            self.inner.find_song_artist(title, artist_name, duration)
        }
        fn insert_songplay(&mut self, songplay: &SongPlayRow) -> WriteResult {
            self.inner.insert_songplay(songplay)
        }
        fn commit(&mut self) -> Result<(), WriteError> {
            self.inner.commit()
        }
    }

    #[test]
    fn test_failed_song_write_does_not_block_artist() {
        let dir = TempDir::new().unwrap();
        let path = write_song_file(&dir);
        let mut warehouse = SongRejectingWarehouse::default();

        let report = SongCatalogHandler.handle(&path, &mut warehouse).unwrap();

        assert_eq!(report.write_errors, 1);
        assert_eq!(report.songs.inserted, 0);
        assert_eq!(report.artists.inserted, 1);
        assert_eq!(warehouse.inner.artists().len(), 1);
        assert!(warehouse.inner.songs().is_empty());
    }
}
