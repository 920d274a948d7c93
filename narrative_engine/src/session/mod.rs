//! The game session - the explicitly constructed context all consumers share.
//!
//! A [`GameSession`] owns the progress state, the file tree, the window
//! manager, the trigger set, the notification center, and the save manager.
//! There are no ambient singletons: consumers receive the session and go
//! through its methods, which keeps the trigger evaluation point explicit -
//! it runs synchronously after each flag mutation, never through framework
//! reactivity.

use std::time::Instant;
use tracing::info;

use game_state::{FileSystem, GameState, VariableValue, VirtualFile, WindowId, WindowManager};

use crate::chapter_one;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::notifications::{Notification, NotificationCenter};
use crate::save::{SaveData, SaveManager, SaveType};
use crate::script::{DialogLine, NarrativeScript};
use crate::triggers::{FiredTrigger, TriggerSystem};

/// One running game session.
pub struct GameSession {
    state: GameState,
    files: FileSystem,
    windows: WindowManager,
    triggers: TriggerSystem,
    notifications: NotificationCenter,
    saves: SaveManager,
    script: NarrativeScript,

    /// Authored tree kept pristine so loads and resets can rebuild it.
    pristine_files: FileSystem,

    notification_duration: std::time::Duration,
}

impl GameSession {
    /// Create a session over an empty world.
    pub async fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_content(
            config,
            FileSystem::new(),
            TriggerSystem::new(),
            NarrativeScript::default(),
        )
        .await
    }

    /// Create a session wired with the chapter-one content.
    pub async fn chapter_one(config: &EngineConfig) -> Result<Self> {
        Self::with_content(
            config,
            chapter_one::files(),
            chapter_one::triggers(),
            chapter_one::script(),
        )
        .await
    }

    /// Create a session from explicit content.
    pub async fn with_content(
        config: &EngineConfig,
        files: FileSystem,
        triggers: TriggerSystem,
        script: NarrativeScript,
    ) -> Result<Self> {
        let saves = SaveManager::open(config).await?;
        let duration = std::time::Duration::from_millis(config.notification_duration_ms);

        Ok(Self {
            state: GameState::new(),
            pristine_files: files.clone(),
            files,
            windows: WindowManager::new(),
            triggers,
            notifications: NotificationCenter::new(duration),
            saves,
            script,
            notification_duration: duration,
        })
    }

    // ------------------------------------------------------------------
    // State mutation - every entry point runs the trigger pass afterwards.
    // ------------------------------------------------------------------

    /// Set a narrative flag, then evaluate triggers.
    ///
    /// Each trigger fired by this mutation posts exactly one notification;
    /// the fired set is returned so callers can react (play cues, etc).
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) -> Vec<FiredTrigger> {
        self.state.set_flag(key, value);
        self.run_triggers()
    }

    /// Set a free-form variable.
    pub fn set_variable(&mut self, key: impl Into<String>, value: VariableValue) {
        self.state.set_variable(key, value);
    }

    /// Record a discovered clue. Returns whether it was new.
    pub fn discover_clue(&mut self, id: impl Into<String>) -> bool {
        self.state.add_discovered_clue(id)
    }

    /// Open a file: mark it read and give it a viewer window.
    ///
    /// Unknown ids yield `None` and change nothing; the caller presents the
    /// not-found state.
    pub fn open_file(&mut self, file_id: &str) -> Option<VirtualFile> {
        let file = self.files.get(file_id)?.clone();

        self.state.mark_file_read(file_id);
        self.windows.open(
            viewer_app(&file),
            file.name.as_str(),
            Some(serde_json::json!({ "fileId": file.id })),
        );
        Some(file)
    }

    /// Record a visit in the in-fiction browser history.
    pub fn visit_page(&mut self, url: impl Into<String>) {
        self.state.os_state.browser_history.push(url.into());
    }

    /// Advance the dialogue script and return the new current line.
    pub fn advance_narrative(&mut self) -> Option<DialogLine> {
        self.script.advance(&mut self.state).cloned()
    }

    /// Advance the in-fiction clock.
    pub fn tick_clock(&mut self, minutes: u32) {
        self.state.clock.advance_minutes(minutes);
    }

    /// Accumulate play time in milliseconds.
    pub fn add_play_time(&mut self, ms: u64) {
        self.state.add_play_time(ms);
    }

    /// Expire notifications whose display time has elapsed.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.expire(now);
    }

    /// Reset to a fresh welcome-state world. Saves on disk are untouched.
    pub fn reset_game(&mut self) {
        info!("resetting game session");
        self.state.reset();
        self.files = self.pristine_files.clone();
        self.windows = WindowManager::new();
        self.notifications = NotificationCenter::new(self.notification_duration);
    }

    // ------------------------------------------------------------------
    // Persistence - async storage paths; the session stays usable while
    // a save is in flight.
    // ------------------------------------------------------------------

    /// Create a manual save.
    pub async fn save(&mut self, name: Option<String>) -> Result<SaveData> {
        self.capture_os_state();
        self.saves.create_save(&self.state, SaveType::Manual, name).await
    }

    /// Create a checkpoint at a narrative key event.
    pub async fn checkpoint(&mut self, event_name: &str) -> Result<Option<SaveData>> {
        self.capture_os_state();
        self.saves.create_checkpoint(&self.state, event_name).await
    }

    /// Create an auto save when the interval has elapsed.
    pub async fn auto_save_tick(&mut self) -> Result<Option<SaveData>> {
        self.capture_os_state();
        self.saves.maybe_auto_save(&self.state).await
    }

    /// Load a save, replacing the whole session state.
    ///
    /// Returns `Ok(false)` when the id is unknown; the running session is
    /// untouched in that case.
    pub async fn load(&mut self, save_id: &str) -> Result<bool> {
        let Some(loaded) = self.saves.load_save(save_id).await? else {
            return Ok(false);
        };

        self.state = loaded;
        self.restore_os_state();
        Ok(true)
    }

    /// Whether any save exists; gates the "continue" affordance.
    pub async fn has_saves(&self) -> bool {
        self.saves.has_saves().await
    }

    /// All saves, most recent first.
    pub async fn all_saves(&self) -> Result<Vec<SaveData>> {
        self.saves.get_all_saves().await
    }

    /// The most recent save of any category, for the "continue" entry.
    pub async fn latest_save(&self) -> Result<Option<SaveData>> {
        self.saves.get_latest_save().await
    }

    /// Delete a save. Idempotent.
    pub async fn delete_save(&mut self, save_id: &str) -> Result<()> {
        self.saves.delete_save(save_id).await
    }

    /// Delete every save on disk.
    pub async fn clear_saves(&mut self) -> Result<()> {
        self.saves.clear_all_saves().await
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn files(&self) -> &FileSystem {
        &self.files
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowManager {
        &mut self.windows
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub fn script(&self) -> &NarrativeScript {
        &self.script
    }

    /// Toggle hidden-file visibility in the explorer.
    pub fn set_show_hidden_files(&mut self, show: bool) {
        self.files.set_show_hidden(show);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run_triggers(&mut self) -> Vec<FiredTrigger> {
        let fired = self.triggers.evaluate(&mut self.state, &mut self.files);
        for trigger in &fired {
            self.notifications.post(Notification {
                trigger_id: trigger.trigger_id.clone(),
                title: trigger.title.clone(),
                message: trigger.message.clone(),
            });
        }
        fired
    }

    /// Snapshot the desktop sub-state into the progress state before a save.
    fn capture_os_state(&mut self) {
        let os = &mut self.state.os_state;
        os.windows = self.windows.snapshot();
        os.active_window = self.windows.active_id();
        os.show_hidden_files = self.files.show_hidden();
        os.revealed_files = self.files.revealed().to_vec();
    }

    /// Rebuild the desktop from a freshly loaded progress state.
    fn restore_os_state(&mut self) {
        let os = &self.state.os_state;
        self.windows = WindowManager::from_snapshot(os.windows.clone(), os.active_window);

        self.files = self.pristine_files.clone();
        self.files.set_show_hidden(os.show_hidden_files);
        let revealed = os.revealed_files.clone();
        self.files.apply_revealed(&revealed);
    }
}

/// Map a file to the application that renders it.
fn viewer_app(file: &VirtualFile) -> &'static str {
    use game_state::FileTypeTag;

    if file.is_folder() {
        return "explorer";
    }
    match file.type_tag {
        Some(FileTypeTag::Pdf) => "pdf_reader",
        Some(FileTypeTag::Image) => "image_viewer",
        Some(FileTypeTag::Spreadsheet) | Some(FileTypeTag::Document) => "office",
        Some(FileTypeTag::Executable) => "shell",
        Some(FileTypeTag::Text) | None => "notepad",
    }
}

/// Convenience for presentation code holding a window id.
impl GameSession {
    /// Focus a window; no-op on unknown ids.
    pub fn focus_window(&mut self, id: WindowId) {
        self.windows.focus(id);
    }

    /// Close a window.
    pub fn close_window(&mut self, id: WindowId) {
        self.windows.close(id);
    }
}
