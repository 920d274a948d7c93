//! Dialogue scripts - ordered lines consumed strictly in order.

use serde::{Deserialize, Serialize};

use game_state::GameState;

/// Side-effect tag attached to a line, handled by the presentation layer
/// after the line is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundAction {
    FadeToBlack,
    ShowDesktop,
}

/// One line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogLine {
    pub id: String,
    pub text: String,

    /// Speaker label; narration lines carry none.
    pub speaker: Option<String>,

    /// When true the line advances on a timer instead of player confirmation.
    pub auto_continue: bool,

    /// Delay before an auto-continue line advances, in milliseconds.
    pub wait_after_ms: Option<u64>,

    /// Sound cue played when the line appears.
    pub sound_effect: Option<String>,

    pub background_action: Option<BackgroundAction>,
}

impl DialogLine {
    /// Create a narration line.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            speaker: None,
            auto_continue: false,
            wait_after_ms: None,
            sound_effect: None,
            background_action: None,
        }
    }

    /// Attribute the line to a speaker.
    pub fn spoken_by(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Advance automatically after the given delay.
    pub fn auto_after_ms(mut self, delay: u64) -> Self {
        self.auto_continue = true;
        self.wait_after_ms = Some(delay);
        self
    }

    /// Play a sound cue when the line appears.
    pub fn with_sound(mut self, cue: impl Into<String>) -> Self {
        self.sound_effect = Some(cue.into());
        self
    }

    /// Attach a post-display side-effect tag.
    pub fn with_background_action(mut self, action: BackgroundAction) -> Self {
        self.background_action = Some(action);
        self
    }
}

/// How the player moves past a displayed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Advance after the given delay in milliseconds.
    Auto(u64),
    /// Wait for explicit confirmation.
    Confirm,
}

/// An ordered dialogue sequence.
///
/// The playback cursor lives in [`GameState::narrative_index`] so it rides
/// along with saves; the script itself is static authored data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeScript {
    lines: Vec<DialogLine>,
}

impl NarrativeScript {
    /// Create a script from authored lines.
    pub fn new(lines: Vec<DialogLine>) -> Self {
        Self { lines }
    }

    /// The line at the given cursor, if any.
    pub fn line_at(&self, index: usize) -> Option<&DialogLine> {
        self.lines.get(index)
    }

    /// The line the given state's cursor points at.
    pub fn current<'a>(&'a self, state: &GameState) -> Option<&'a DialogLine> {
        self.line_at(state.narrative_index)
    }

    /// Move the state's cursor to the next line and return it.
    ///
    /// The cursor clamps one past the final line, where the script reports
    /// finished and `current` yields nothing.
    pub fn advance<'a>(&'a self, state: &mut GameState) -> Option<&'a DialogLine> {
        let next = (state.narrative_index + 1).min(self.lines.len());
        state.advance_narrative(next);
        self.line_at(next)
    }

    /// How the given line advances.
    ///
    /// Auto-continue lines fall back to a short beat when the author gave no
    /// explicit delay.
    pub fn advance_mode(line: &DialogLine) -> AdvanceMode {
        if line.auto_continue {
            AdvanceMode::Auto(line.wait_after_ms.unwrap_or(1_000))
        } else {
            AdvanceMode::Confirm
        }
    }

    /// Whether the cursor has consumed every line.
    pub fn is_finished(&self, state: &GameState) -> bool {
        state.narrative_index >= self.lines.len()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
