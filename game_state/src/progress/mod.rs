//! Progress state - the flag/variable store driving the narrative.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::clock::SystemClock;
use crate::windows::{WindowId, WindowInstance};

/// Variable value types for free-form narrative counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Persisted snapshot of the desktop sub-state.
///
/// Captured at save time and re-applied on load so the player returns to the
/// same set of open windows and revealed files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsState {
    pub windows: Vec<WindowInstance>,
    pub active_window: Option<WindowId>,
    pub show_hidden_files: bool,

    /// File ids revealed at runtime, in reveal order.
    pub revealed_files: Vec<String>,

    /// Pages visited in the in-fiction browser, oldest first.
    pub browser_history: Vec<String>,
}

/// The complete narrative progress of a session.
///
/// This is the single process-wide source of truth: every mutation is
/// synchronous and immediately observable. The whole struct is snapshotted
/// for saves and replaced wholesale on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Chapter marker; 0 means the welcome page, before the story starts.
    pub current_chapter: u32,
    pub current_scene: String,

    /// Narrative flags. Set-only during normal play; absent means false.
    pub flags: HashMap<String, bool>,

    /// Free-form narrative counters.
    pub variables: HashMap<String, VariableValue>,

    /// Accumulated play time in milliseconds.
    pub play_time_ms: u64,

    /// The in-fiction clock of the simulated machine.
    pub clock: SystemClock,

    /// Clue identifiers discovered so far; duplicates suppressed.
    pub discovered_clues: HashSet<String>,

    /// File ids the player has opened.
    pub read_files: HashSet<String>,

    /// Cursor into the current dialogue script.
    pub narrative_index: usize,

    /// Desktop sub-state captured for persistence.
    pub os_state: OsState,
}

impl GameState {
    /// Create the initial welcome-page state.
    pub fn new() -> Self {
        Self {
            current_chapter: 0,
            current_scene: "welcome".to_string(),
            flags: HashMap::new(),
            variables: HashMap::new(),
            play_time_ms: 0,
            clock: SystemClock::new(),
            discovered_clues: HashSet::new(),
            read_files: HashSet::new(),
            narrative_index: 0,
            os_state: OsState::default(),
        }
    }

    /// Set a narrative flag. Setting an already-equal value is a no-op.
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.flags.insert(key.into(), value);
    }

    /// Read a flag; absent flags are false.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Set a free-form variable.
    pub fn set_variable(&mut self, key: impl Into<String>, value: VariableValue) {
        self.variables.insert(key.into(), value);
    }

    /// Read a variable.
    pub fn variable(&self, key: &str) -> Option<&VariableValue> {
        self.variables.get(key)
    }

    /// Accumulate play time.
    pub fn add_play_time(&mut self, ms: u64) {
        self.play_time_ms += ms;
    }

    /// Record a discovered clue. Returns whether it was newly discovered.
    pub fn add_discovered_clue(&mut self, id: impl Into<String>) -> bool {
        self.discovered_clues.insert(id.into())
    }

    /// Mark a file as opened. Returns whether it was newly marked.
    pub fn mark_file_read(&mut self, id: impl Into<String>) -> bool {
        self.read_files.insert(id.into())
    }

    /// Move the dialogue cursor.
    pub fn advance_narrative(&mut self, index: usize) {
        self.narrative_index = index;
    }

    /// Move to a new chapter and scene.
    pub fn enter_scene(&mut self, chapter: u32, scene: impl Into<String>) {
        self.current_chapter = chapter;
        self.current_scene = scene.into();
    }

    /// Reset to the initial welcome state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
