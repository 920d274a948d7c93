//! The save manager - categories, retention, and the auto-save timer.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use game_state::GameState;

use crate::config::{AutoSaveConfig, EngineConfig};
use crate::error::Result;

use super::{SaveData, SaveStorage, SaveType};

/// Owns the save store and enforces the category rules.
///
/// All operations take `&mut self`, so saves issued back-to-back commit in
/// issuance order; the spawned auto-save timer serializes through the same
/// mutex the caller holds.
#[derive(Debug)]
pub struct SaveManager {
    storage: SaveStorage,
    config: AutoSaveConfig,

    /// Running counter stamped into each record; resumes past the highest
    /// counter already on disk.
    save_count: u64,

    last_auto_save: Option<Instant>,
}

impl SaveManager {
    /// Open a manager over the configured save directory.
    pub async fn open(config: &EngineConfig) -> Result<Self> {
        Self::open_at(config.save_dir(), config.auto_save.clone()).await
    }

    /// Open a manager over an explicit directory.
    pub async fn open_at(dir: impl AsRef<std::path::Path>, config: AutoSaveConfig) -> Result<Self> {
        let storage = SaveStorage::open(dir).await?;
        let save_count = storage
            .list()
            .await?
            .iter()
            .map(|s| s.metadata.save_count)
            .max()
            .unwrap_or(0);

        Ok(Self {
            storage,
            config,
            save_count,
            last_auto_save: None,
        })
    }

    /// Create a save from a snapshot of the given state.
    ///
    /// The snapshot is captured before the first await, so mutations racing
    /// the write never leak into the record. Auto saves enforce retention
    /// before inserting; manual and checkpoint saves are exempt.
    pub async fn create_save(
        &mut self,
        state: &GameState,
        save_type: SaveType,
        custom_name: Option<String>,
    ) -> Result<SaveData> {
        self.create_save_at(state, save_type, custom_name, Utc::now()).await
    }

    /// Create a save with an explicit creation timestamp.
    pub async fn create_save_at(
        &mut self,
        state: &GameState,
        save_type: SaveType,
        custom_name: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<SaveData> {
        let snapshot = state.clone();

        if save_type == SaveType::Auto {
            self.evict_oldest_auto_saves().await?;
        }

        self.save_count += 1;
        let save = SaveData::build(snapshot, save_type, custom_name, timestamp, self.save_count);
        self.storage.put(&save).await?;
        info!(save = %save.id, kind = %save_type, "created save");

        if save_type == SaveType::Auto {
            self.last_auto_save = Some(Instant::now());
        }
        Ok(save)
    }

    /// Create a checkpoint at a narrative key event, named from the event.
    ///
    /// Returns `None` when key-event saving is disabled.
    pub async fn create_checkpoint(
        &mut self,
        state: &GameState,
        event_name: &str,
    ) -> Result<Option<SaveData>> {
        if !self.config.save_on_key_events {
            return Ok(None);
        }

        let name = format!("Checkpoint: {event_name}");
        let save = self.create_save(state, SaveType::Checkpoint, Some(name)).await?;
        Ok(Some(save))
    }

    /// Load the snapshot from a save record. Unknown ids yield `None`; the
    /// record itself is never mutated by loading.
    pub async fn load_save(&self, id: &str) -> Result<Option<GameState>> {
        let Some(save) = self.storage.get(id).await? else {
            return Ok(None);
        };

        info!(save = %id, "loaded save");
        Ok(Some(save.game_state))
    }

    /// Delete a save record. Idempotent.
    pub async fn delete_save(&mut self, id: &str) -> Result<()> {
        self.storage.delete(id).await
    }

    /// All saves, most recent first.
    pub async fn get_all_saves(&self) -> Result<Vec<SaveData>> {
        self.storage.list().await
    }

    /// The most recent save of any category.
    pub async fn get_latest_save(&self) -> Result<Option<SaveData>> {
        Ok(self.storage.list().await?.into_iter().next())
    }

    /// Whether at least one save exists; answered without scanning.
    pub async fn has_saves(&self) -> bool {
        self.storage.has_saves().await
    }

    /// Delete every save record.
    pub async fn clear_all_saves(&mut self) -> Result<()> {
        self.storage.clear().await
    }

    /// Create an auto save when the configured interval has elapsed since
    /// the last one. The interval is independent of manual and checkpoint
    /// saves. The first check after startup is always due.
    pub async fn maybe_auto_save(&mut self, state: &GameState) -> Result<Option<SaveData>> {
        self.maybe_auto_save_at(state, Instant::now()).await
    }

    /// Threshold check against an explicit current instant.
    pub async fn maybe_auto_save_at(
        &mut self,
        state: &GameState,
        now: Instant,
    ) -> Result<Option<SaveData>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let due = match self.last_auto_save {
            None => true,
            Some(last) => now.duration_since(last) >= Duration::from_millis(self.config.interval_ms),
        };
        if !due {
            return Ok(None);
        }

        let save = self.create_save(state, SaveType::Auto, None).await?;
        Ok(Some(save))
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    /// Evict oldest auto saves until one slot is free under the cap.
    ///
    /// Ranked strictly by creation timestamp ascending, counter as tie-break;
    /// manual and checkpoint saves are neither counted nor touched.
    async fn evict_oldest_auto_saves(&mut self) -> Result<()> {
        if self.config.max_auto_saves == 0 {
            return Ok(());
        }

        let mut auto_saves: Vec<SaveData> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(SaveData::is_auto)
            .collect();

        // list() is newest-first; eviction wants oldest-first.
        auto_saves.reverse();

        while auto_saves.len() >= self.config.max_auto_saves {
            let oldest = auto_saves.remove(0);
            info!(save = %oldest.id, "evicting oldest auto save");
            self.storage.delete(&oldest.id).await?;
        }
        Ok(())
    }
}

/// Handle to a running auto-save timer task.
#[derive(Debug)]
pub struct AutoSaveHandle {
    handle: JoinHandle<()>,
}

impl AutoSaveHandle {
    /// Cancel the timer. Safe to call during teardown; no further saves are
    /// issued after this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn the periodic auto-save timer.
///
/// Every `tick_ms` the task snapshots the current state through the provided
/// closure and asks the manager whether an auto save is due. Persistence
/// failures inside the loop are logged and swallowed: losing an auto save
/// never tears down the session.
pub fn spawn_auto_save<F>(manager: Arc<Mutex<SaveManager>>, snapshot: F) -> AutoSaveHandle
where
    F: Fn() -> GameState + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let tick = {
            let manager = manager.lock().await;
            Duration::from_millis(manager.config.tick_ms.max(1))
        };
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let state = snapshot();
            let mut manager = manager.lock().await;
            if let Err(err) = manager.maybe_auto_save(&state).await {
                warn!(error = %err, "auto save failed; session continues in memory");
            }
        }
    });

    AutoSaveHandle { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid test timestamp")
    }

    async fn manager(dir: &TempDir) -> SaveManager {
        SaveManager::open_at(dir.path(), AutoSaveConfig::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_load_round_trip_is_deep_equal() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;

        let mut state = GameState::new();
        state.enter_scene(1, "desktop");
        state.set_flag("viewed_wechat", true);
        state.add_discovered_clue("clue_whale_sticker");
        state.mark_file_read("file_notes");
        state.add_play_time(42_000);
        state.clock.boot();

        let save = manager.create_save(&state, SaveType::Manual, None).await.unwrap();
        let loaded = manager.load_save(&save.id).await.unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_load_unknown_save_is_none() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir).await;
        assert!(manager.load_save("save_manual_0_0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_auto_save_retention_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;
        let state = GameState::new();

        // Six auto saves against a cap of five: the oldest is evicted.
        for i in 0..6 {
            manager
                .create_save_at(&state, SaveType::Auto, None, at(1_000 + i))
                .await
                .unwrap();
        }

        let autos: Vec<SaveData> = manager
            .get_all_saves()
            .await
            .unwrap()
            .into_iter()
            .filter(SaveData::is_auto)
            .collect();
        assert_eq!(autos.len(), 5);

        let stamps: Vec<_> = autos.iter().map(|s| s.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![1_005, 1_004, 1_003, 1_002, 1_001]);
    }

    #[tokio::test]
    async fn test_retention_ignores_manual_and_checkpoint_saves() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;
        let state = GameState::new();

        manager.create_save_at(&state, SaveType::Manual, None, at(500)).await.unwrap();
        manager
            .create_save_at(&state, SaveType::Checkpoint, Some("Checkpoint: intro".into()), at(501))
            .await
            .unwrap();

        for i in 0..7 {
            manager
                .create_save_at(&state, SaveType::Auto, None, at(1_000 + i))
                .await
                .unwrap();
        }

        let saves = manager.get_all_saves().await.unwrap();
        let autos = saves.iter().filter(|s| s.is_auto()).count();
        let others = saves.len() - autos;

        assert_eq!(autos, 5);
        // The old manual and checkpoint saves survive untouched.
        assert_eq!(others, 2);
    }

    #[tokio::test]
    async fn test_listing_is_timestamp_descending_regardless_of_insertion() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;
        let state = GameState::new();

        manager.create_save_at(&state, SaveType::Manual, None, at(300)).await.unwrap();
        manager.create_save_at(&state, SaveType::Manual, None, at(100)).await.unwrap();
        manager.create_save_at(&state, SaveType::Manual, None, at(200)).await.unwrap();

        let stamps: Vec<_> = manager
            .get_all_saves()
            .await
            .unwrap()
            .iter()
            .map(|s| s.timestamp.timestamp())
            .collect();
        assert_eq!(stamps, vec![300, 200, 100]);

        let latest = manager.get_latest_save().await.unwrap().unwrap();
        assert_eq!(latest.timestamp.timestamp(), 300);
    }

    #[tokio::test]
    async fn test_checkpoint_named_from_event() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;

        let save = manager
            .create_checkpoint(&GameState::new(), "archive discovered")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(save.name, "Checkpoint: archive discovered");
        assert_eq!(save.metadata.save_type, SaveType::Checkpoint);
    }

    #[tokio::test]
    async fn test_checkpoint_respects_key_event_toggle() {
        let dir = TempDir::new().unwrap();
        let config = AutoSaveConfig {
            save_on_key_events: false,
            ..Default::default()
        };
        let mut manager = SaveManager::open_at(dir.path(), config).await.unwrap();

        let result = manager.create_checkpoint(&GameState::new(), "ignored").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_auto_save_threshold() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;
        let state = GameState::new();
        let start = Instant::now();

        // First check is always due.
        assert!(manager.maybe_auto_save_at(&state, start).await.unwrap().is_some());

        // Within the interval: nothing.
        assert!(manager
            .maybe_auto_save_at(&state, start + Duration::from_secs(30))
            .await
            .unwrap()
            .is_none());

        // Past the interval: due again.
        assert!(manager
            .maybe_auto_save_at(&state, start + Duration::from_secs(61))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_manual_save_does_not_reset_auto_timer() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager(&dir).await;
        let state = GameState::new();
        let start = Instant::now();

        manager.maybe_auto_save_at(&state, start).await.unwrap();
        manager.create_save(&state, SaveType::Manual, None).await.unwrap();

        // Still within the auto interval despite the manual save.
        assert!(manager
            .maybe_auto_save_at(&state, start + Duration::from_secs(30))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_disabled_auto_save_never_fires() {
        let dir = TempDir::new().unwrap();
        let config = AutoSaveConfig {
            enabled: false,
            ..Default::default()
        };
        let mut manager = SaveManager::open_at(dir.path(), config).await.unwrap();

        let result = manager.maybe_auto_save(&GameState::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_counter_resumes_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut manager = manager(&dir).await;
            manager.create_save(&GameState::new(), SaveType::Manual, None).await.unwrap();
            manager.create_save(&GameState::new(), SaveType::Manual, None).await.unwrap();
        }

        // A fresh manager over the same directory continues the counter.
        let mut reopened = manager(&dir).await;
        let save = reopened.create_save(&GameState::new(), SaveType::Manual, None).await.unwrap();
        assert_eq!(save.metadata.save_count, 3);
    }

    #[tokio::test]
    async fn test_auto_save_timer_fires_and_stops() {
        let dir = TempDir::new().unwrap();
        let config = AutoSaveConfig {
            interval_ms: 0,
            tick_ms: 10,
            ..Default::default()
        };
        let manager = Arc::new(Mutex::new(
            SaveManager::open_at(dir.path(), config).await.unwrap(),
        ));

        let handle = spawn_auto_save(Arc::clone(&manager), GameState::new);
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();

        let saves = manager.lock().await.get_all_saves().await.unwrap();
        assert!(!saves.is_empty());

        // No further saves after cancellation.
        let count = saves.len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.lock().await.get_all_saves().await.unwrap().len(), count);
        assert!(handle.is_stopped());
    }
}
