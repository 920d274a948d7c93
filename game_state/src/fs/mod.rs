//! Virtual file system - the static tree of documents the player explores.
//!
//! The tree consists of:
//! - **Files**: typed content payloads (plain text, paged documents, binary)
//! - **Folders**: ordered lists of child ids
//! - **Hidden nodes**: entries excluded from listings until a trigger reveals them

mod file;
mod tree;

pub use file::*;
pub use tree::*;
