//! # Narrative Engine
//!
//! The engine crate of The Construct Layer. It interfaces with `game_state`,
//! evaluates narrative triggers against the flag store, plays back dialogue
//! scripts, and persists save snapshots to local storage.
//!
//! ## Core Components
//!
//! - **triggers**: flag-conjunction rules firing one-shot side effects
//! - **script**: ordered dialogue playback with auto-advance
//! - **save**: durable save records with auto/manual/checkpoint categories
//! - **session**: the explicitly constructed context tying everything together
//!
//! ## Design Philosophy
//!
//! - **Single event loop**: all state mutation is synchronous; only storage
//!   I/O suspends
//! - **Explicit evaluation**: triggers are re-scanned at a defined point after
//!   each mutation batch, never through implicit reactivity
//! - **Durable before reported**: a save is on disk before its creation
//!   resolves

pub mod chapter_one;
pub mod config;
pub mod error;
pub mod notifications;
pub mod save;
pub mod script;
pub mod session;
pub mod triggers;

pub use config::*;
pub use error::*;
pub use notifications::*;
pub use save::*;
pub use script::*;
pub use session::*;
pub use triggers::*;
