//! Save persistence - durable snapshots of the game state.
//!
//! Saves come in three categories:
//! - **Manual**: player-initiated, never auto-evicted
//! - **Auto**: timer-driven, capped by a retention limit (oldest evicted first)
//! - **Checkpoint**: created at narrative milestones, never auto-evicted

mod manager;
mod storage;

pub use manager::*;
pub use storage::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use game_state::GameState;

/// Schema version stamped into every save record.
pub const SAVE_SCHEMA_VERSION: &str = "1.0.0";

/// Save categories, governing naming and retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveType {
    Auto,
    Manual,
    Checkpoint,
}

impl SaveType {
    /// Short identifier used in save ids and file names.
    pub fn slug(&self) -> &'static str {
        match self {
            SaveType::Auto => "auto",
            SaveType::Manual => "manual",
            SaveType::Checkpoint => "checkpoint",
        }
    }

    /// Human label used in generated save names.
    pub fn label(&self) -> &'static str {
        match self {
            SaveType::Auto => "Auto save",
            SaveType::Manual => "Manual save",
            SaveType::Checkpoint => "Checkpoint",
        }
    }
}

impl std::fmt::Display for SaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Bookkeeping stored alongside each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub play_time_ms: u64,

    /// Running count of saves created by this session's manager.
    pub save_count: u64,

    /// Schema version of the record.
    pub version: String,

    pub save_type: SaveType,

    /// Denormalized progress summary for listing display.
    pub description: String,
}

/// One persisted save record.
///
/// Records are immutable once written; the only mutation is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub id: String,

    /// Human label, auto-generated from type and time unless supplied.
    pub name: String,

    pub timestamp: DateTime<Utc>,

    /// Denormalized progress markers for listing display.
    pub chapter_id: u32,
    pub scene_id: String,

    /// Full snapshot, deep-copied at creation time.
    pub game_state: GameState,

    pub metadata: SaveMetadata,
}

impl SaveData {
    /// Build a save record from a state snapshot.
    ///
    /// The id derives from the save type and creation timestamp; the running
    /// save counter disambiguates records created within the same
    /// millisecond.
    pub fn build(
        game_state: GameState,
        save_type: SaveType,
        custom_name: Option<String>,
        timestamp: DateTime<Utc>,
        save_count: u64,
    ) -> Self {
        let id = format!(
            "save_{}_{}_{}",
            save_type.slug(),
            timestamp.timestamp_millis(),
            save_count
        );
        let name = custom_name.unwrap_or_else(|| {
            format!("{} - {}", save_type.label(), timestamp.format("%m-%d %H:%M"))
        });
        let description = format!(
            "Chapter {} - {}",
            game_state.current_chapter, game_state.current_scene
        );

        Self {
            id,
            name,
            timestamp,
            chapter_id: game_state.current_chapter,
            scene_id: game_state.current_scene.clone(),
            metadata: SaveMetadata {
                play_time_ms: game_state.play_time_ms,
                save_count,
                version: SAVE_SCHEMA_VERSION.to_string(),
                save_type,
                description,
            },
            game_state,
        }
    }

    /// Whether this record participates in auto retention.
    pub fn is_auto(&self) -> bool {
        self.metadata.save_type == SaveType::Auto
    }
}
