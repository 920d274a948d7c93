//! Narrative triggers - flag conjunctions firing one-shot side effects.
//!
//! A trigger maps a set of required flags (logical AND) to a list of effects
//! and a notification. Firing state is itself stored as a flag
//! (`"{id}_fired"`), so at-most-once semantics survive the same persistence
//! mechanism as every other narrative flag.

use serde::{Deserialize, Serialize};
use tracing::info;

use game_state::{FileSystem, GameState};

/// Side effects a trigger can apply when it fires.
///
/// Effects are data, not callbacks: the evaluation pass interprets them
/// against the world, which keeps firing behavior inspectable in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEffect {
    /// Clear the hidden bit on a virtual file.
    RevealFile(String),

    /// Set a narrative flag.
    SetFlag { key: String, value: bool },

    /// Ask the presentation layer to play a sound cue. The core never
    /// interprets the cue name.
    PlaySound(String),
}

/// One declared trigger rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,

    /// Flags that must all be true for the trigger to fire.
    pub required_flags: Vec<String>,

    /// Notification title shown when the trigger fires.
    pub title: String,

    /// Notification body shown when the trigger fires.
    pub message: String,

    pub effects: Vec<TriggerEffect>,
}

impl Trigger {
    /// Create a new trigger with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            required_flags: Vec::new(),
            title: String::new(),
            message: String::new(),
            effects: Vec::new(),
        }
    }

    /// Require a flag to be true.
    pub fn requires(mut self, flag: impl Into<String>) -> Self {
        self.required_flags.push(flag.into());
        self
    }

    /// Set the notification shown on firing.
    pub fn with_notification(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.title = title.into();
        self.message = message.into();
        self
    }

    /// Add an effect applied on firing.
    pub fn with_effect(mut self, effect: TriggerEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The flag recording that this trigger already fired.
    pub fn fired_flag(&self) -> String {
        format!("{}_fired", self.id)
    }

    /// Check whether every required flag is set in the given state.
    pub fn is_satisfied(&self, state: &GameState) -> bool {
        self.required_flags.iter().all(|flag| state.flag(flag))
    }
}

/// Result of one trigger firing: feeds one notification, carries any sound
/// cues for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTrigger {
    pub trigger_id: String,
    pub title: String,
    pub message: String,
    pub sound_cues: Vec<String>,
}

/// The registered trigger set and its evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct TriggerSystem {
    triggers: Vec<Trigger>,
}

impl TriggerSystem {
    /// Create an empty trigger set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger.
    pub fn register(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// Number of registered triggers.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Re-scan all triggers against the current flags.
    ///
    /// Called synchronously after each mutation batch. A trigger whose
    /// fired-flag is set is skipped; one whose condition newly holds has its
    /// fired-flag set *before* its effects run, so an effect that mutates
    /// flags cannot re-enter it. Each firing yields its own entry in the
    /// result; nothing is coalesced. A trigger referencing a flag that never
    /// gets set simply never fires.
    pub fn evaluate(&self, state: &mut GameState, fs: &mut FileSystem) -> Vec<FiredTrigger> {
        let mut fired = Vec::new();

        for trigger in &self.triggers {
            let fired_flag = trigger.fired_flag();
            if state.flag(&fired_flag) {
                continue;
            }
            if !trigger.is_satisfied(state) {
                continue;
            }

            state.set_flag(fired_flag, true);
            info!(trigger = %trigger.id, "narrative trigger fired");

            let mut sound_cues = Vec::new();
            for effect in &trigger.effects {
                match effect {
                    TriggerEffect::RevealFile(id) => {
                        fs.reveal(id);
                    }
                    TriggerEffect::SetFlag { key, value } => {
                        state.set_flag(key.clone(), *value);
                    }
                    TriggerEffect::PlaySound(cue) => {
                        sound_cues.push(cue.clone());
                    }
                }
            }

            fired.push(FiredTrigger {
                trigger_id: trigger.id.clone(),
                title: trigger.title.clone(),
                message: trigger.message.clone(),
                sound_cues,
            });
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_state::VirtualFile;

    fn archive_trigger() -> Trigger {
        Trigger::new("trigger_archive_reveal")
            .requires("viewed_wechat")
            .requires("viewed_browser_history")
            .with_notification("System Notice", "A new hidden file was detected.")
            .with_effect(TriggerEffect::RevealFile("folder_archive".to_string()))
            .with_effect(TriggerEffect::PlaySound("notification".to_string()))
            .with_effect(TriggerEffect::SetFlag {
                key: "archive_revealed".to_string(),
                value: true,
            })
    }

    fn world() -> (GameState, FileSystem) {
        let mut fs = FileSystem::new();
        fs.insert(VirtualFile::folder("folder_work", game_state::DESKTOP_ID, "Work"));
        fs.insert(VirtualFile::folder("folder_archive", "folder_work", "archive").hidden());
        (GameState::new(), fs)
    }

    #[test]
    fn test_fires_once_when_conjunction_holds() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();
        system.register(archive_trigger());

        state.set_flag("viewed_wechat", true);
        assert!(system.evaluate(&mut state, &mut fs).is_empty());

        state.set_flag("viewed_browser_history", true);
        let fired = system.evaluate(&mut state, &mut fs);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "trigger_archive_reveal");
        assert_eq!(fired[0].sound_cues, vec!["notification"]);

        // Effects applied: file revealed, follow-up flag set.
        assert!(!fs.get("folder_archive").unwrap().hidden);
        assert!(state.flag("archive_revealed"));
    }

    #[test]
    fn test_never_fires_twice() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();
        system.register(archive_trigger());

        state.set_flag("viewed_wechat", true);
        state.set_flag("viewed_browser_history", true);
        assert_eq!(system.evaluate(&mut state, &mut fs).len(), 1);

        // Re-setting a satisfied flag must not re-fire.
        state.set_flag("viewed_browser_history", true);
        assert!(system.evaluate(&mut state, &mut fs).is_empty());
        assert!(system.evaluate(&mut state, &mut fs).is_empty());
    }

    #[test]
    fn test_fired_flag_set_before_effects_blocks_reentrancy() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();

        // The trigger's own effect satisfies a second evaluation of itself;
        // the fired-flag guard must still hold it to one firing.
        system.register(
            Trigger::new("self_feeding")
                .requires("spark")
                .with_notification("System", "loop")
                .with_effect(TriggerEffect::SetFlag {
                    key: "spark".to_string(),
                    value: true,
                }),
        );

        state.set_flag("spark", true);
        assert_eq!(system.evaluate(&mut state, &mut fs).len(), 1);
        assert!(system.evaluate(&mut state, &mut fs).is_empty());
    }

    #[test]
    fn test_triggers_satisfied_in_same_pass_fire_independently() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();
        system.register(
            Trigger::new("a")
                .requires("shared")
                .with_notification("System", "a"),
        );
        system.register(
            Trigger::new("b")
                .requires("shared")
                .with_notification("System", "b"),
        );

        state.set_flag("shared", true);
        let fired = system.evaluate(&mut state, &mut fs);
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_unknown_flag_is_a_permanent_noop() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();
        system.register(Trigger::new("never").requires("flag_nobody_sets"));

        for _ in 0..3 {
            assert!(system.evaluate(&mut state, &mut fs).is_empty());
        }
        assert!(!state.flag("never_fired"));
    }

    #[test]
    fn test_durable_fired_flag_survives_state_round_trip() {
        let (mut state, mut fs) = world();
        let mut system = TriggerSystem::new();
        system.register(archive_trigger());

        state.set_flag("viewed_wechat", true);
        state.set_flag("viewed_browser_history", true);
        system.evaluate(&mut state, &mut fs);

        // A state restored from a save re-evaluates without re-firing.
        let mut restored = state.clone();
        assert!(system.evaluate(&mut restored, &mut fs).is_empty());
    }
}
