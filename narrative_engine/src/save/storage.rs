//! File-backed save storage.
//!
//! One pretty-printed JSON file per record under `<base>/saves/`, plus a
//! lightweight marker file recording "at least one save exists" so UI gating
//! never has to scan the collection:
//!
//! ```text
//! base_dir/
//! ├── saves/
//! │   ├── save_auto_1730000000000_1.json
//! │   └── save_manual_1730000060000_2.json
//! └── has_saves
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::Result;

use super::SaveData;

/// Asynchronous save-record store.
///
/// Writes are durable before success is reported: each record lands in a
/// temp file, is synced, and is renamed into place. Operations on `&mut self`
/// commit in issuance order, which the auto-retention logic depends on.
#[derive(Debug)]
pub struct SaveStorage {
    base_dir: PathBuf,
}

impl SaveStorage {
    /// Open a store rooted at the given directory, creating the layout on
    /// first use.
    pub async fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("saves")).await?;
        Ok(Self { base_dir })
    }

    /// Persist a record. Returns only after the bytes are on disk.
    pub async fn put(&mut self, save: &SaveData) -> Result<()> {
        let path = self.record_path(&save.id);
        let json = serde_json::to_string_pretty(save)?;

        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, &path).await?;

        self.write_marker().await?;
        debug!(save = %save.id, "persisted save record");
        Ok(())
    }

    /// Load a record by id. Unknown ids yield `None`.
    pub async fn get(&self, id: &str) -> Result<Option<SaveData>> {
        let path = self.record_path(id);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_str(&json)?))
    }

    /// All records ordered by timestamp descending (most recent first),
    /// regardless of directory enumeration order. The running save counter
    /// breaks timestamp ties.
    pub async fn list(&self) -> Result<Vec<SaveData>> {
        let mut saves = Vec::new();
        let mut entries = fs::read_dir(self.base_dir.join("saves")).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path).await?;
            saves.push(serde_json::from_str::<SaveData>(&json)?);
        }

        saves.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.metadata.save_count.cmp(&a.metadata.save_count))
        });
        Ok(saves)
    }

    /// Delete a record. Idempotent: an unknown id is not an error.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => info!(save = %id, "deleted save record"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        self.refresh_marker().await
    }

    /// Delete every record.
    pub async fn clear(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(self.base_dir.join("saves")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                fs::remove_file(path).await?;
            }
        }

        self.remove_marker().await?;
        info!("cleared all save records");
        Ok(())
    }

    /// Whether at least one save exists, answered from the marker file
    /// without scanning the collection.
    pub async fn has_saves(&self) -> bool {
        fs::try_exists(self.marker_path()).await.unwrap_or(false)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.base_dir.join("saves").join(format!("{id}.json"))
    }

    fn marker_path(&self) -> PathBuf {
        self.base_dir.join("has_saves")
    }

    async fn write_marker(&self) -> Result<()> {
        fs::write(self.marker_path(), b"1").await?;
        Ok(())
    }

    async fn remove_marker(&self) -> Result<()> {
        match fs::remove_file(self.marker_path()).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Re-derive the marker after a deletion emptied (or didn't empty) the
    /// collection.
    async fn refresh_marker(&self) -> Result<()> {
        if self.list().await?.is_empty() {
            self.remove_marker().await
        } else {
            self.write_marker().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::SaveType;
    use chrono::{TimeZone, Utc};
    use game_state::GameState;
    use tempfile::TempDir;

    fn record(save_type: SaveType, secs: i64, count: u64) -> SaveData {
        let timestamp = Utc.timestamp_opt(secs, 0).single().expect("valid test timestamp");
        SaveData::build(GameState::new(), save_type, None, timestamp, count)
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut storage = SaveStorage::open(dir.path()).await.unwrap();

        let mut state = GameState::new();
        state.set_flag("viewed_wechat", true);
        state.add_discovered_clue("clue_whale_sticker");
        let save = SaveData::build(
            state,
            SaveType::Manual,
            None,
            Utc.timestamp_opt(1_730_000_000, 0).single().unwrap(),
            1,
        );

        storage.put(&save).await.unwrap();
        let loaded = storage.get(&save.id).await.unwrap().unwrap();
        assert_eq!(loaded, save);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = SaveStorage::open(dir.path()).await.unwrap();
        assert!(storage.get("save_manual_0_0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_timestamp_descending() {
        let dir = TempDir::new().unwrap();
        let mut storage = SaveStorage::open(dir.path()).await.unwrap();

        // Inserted out of order on purpose.
        storage.put(&record(SaveType::Manual, 200, 2)).await.unwrap();
        storage.put(&record(SaveType::Auto, 300, 3)).await.unwrap();
        storage.put(&record(SaveType::Manual, 100, 1)).await.unwrap();

        let saves = storage.list().await.unwrap();
        let stamps: Vec<_> = saves.iter().map(|s| s.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut storage = SaveStorage::open(dir.path()).await.unwrap();

        let save = record(SaveType::Manual, 100, 1);
        storage.put(&save).await.unwrap();

        storage.delete(&save.id).await.unwrap();
        storage.delete(&save.id).await.unwrap();
        assert!(storage.get(&save.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_marker_tracks_existence() {
        let dir = TempDir::new().unwrap();
        let mut storage = SaveStorage::open(dir.path()).await.unwrap();
        assert!(!storage.has_saves().await);

        let save = record(SaveType::Auto, 100, 1);
        storage.put(&save).await.unwrap();
        assert!(storage.has_saves().await);

        storage.delete(&save.id).await.unwrap();
        assert!(!storage.has_saves().await);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let dir = TempDir::new().unwrap();
        let mut storage = SaveStorage::open(dir.path()).await.unwrap();

        for i in 0..3 {
            storage.put(&record(SaveType::Auto, 100 + i, i as u64)).await.unwrap();
        }
        storage.clear().await.unwrap();

        assert!(storage.list().await.unwrap().is_empty());
        assert!(!storage.has_saves().await);
    }
}
