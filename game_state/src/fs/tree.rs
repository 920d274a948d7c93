//! The file tree - indexed storage and listing of virtual files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{FileKind, VirtualFile};

/// Id of the desktop root folder. Every other node descends from it.
pub const DESKTOP_ID: &str = "desktop";

/// The virtual file tree of the simulated machine.
///
/// The tree is authored statically per chapter and is read-mostly: the only
/// runtime mutation is clearing the `hidden` bit on individual nodes, driven
/// by the narrative trigger system. Listing order follows the authored order
/// of each folder's `children` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSystem {
    files: HashMap<String, VirtualFile>,

    /// Session toggle: include hidden entries in listings.
    show_hidden: bool,

    /// Ids revealed at runtime, in reveal order. Persisted so a loaded
    /// session can re-apply reveals on the authored tree.
    revealed: Vec<String>,
}

impl FileSystem {
    /// Create a tree containing only the desktop root.
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(
            DESKTOP_ID.to_string(),
            VirtualFile {
                id: DESKTOP_ID.to_string(),
                parent_id: None,
                name: "Desktop".to_string(),
                kind: FileKind::Folder,
                content: None,
                type_tag: None,
                children: Vec::new(),
                hidden: false,
                metadata: Default::default(),
            },
        );

        Self {
            files,
            show_hidden: false,
            revealed: Vec::new(),
        }
    }

    /// Insert a node and wire it into its parent's ordered child list.
    ///
    /// Returns `false` without inserting when the parent does not exist;
    /// authored data is expected to be inserted parents-first.
    pub fn insert(&mut self, file: VirtualFile) -> bool {
        let Some(parent_id) = file.parent_id.clone() else {
            warn!(id = %file.id, "refusing to insert a second root node");
            return false;
        };

        let Some(parent) = self.files.get_mut(&parent_id) else {
            warn!(id = %file.id, parent = %parent_id, "parent folder does not exist");
            return false;
        };

        if !parent.children.contains(&file.id) {
            parent.children.push(file.id.clone());
        }
        self.files.insert(file.id.clone(), file);
        true
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&VirtualFile> {
        self.files.get(id)
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// List the children of a folder in authored order.
    ///
    /// Hidden entries are filtered out unless the session's hidden-files
    /// toggle is on. An unknown or non-folder id yields an empty listing.
    pub fn list_children(&self, folder_id: &str) -> Vec<&VirtualFile> {
        let Some(folder) = self.files.get(folder_id) else {
            return Vec::new();
        };

        folder
            .children
            .iter()
            .filter_map(|id| self.files.get(id))
            .filter(|file| self.show_hidden || !file.hidden)
            .collect()
    }

    /// List the entries sitting directly on the desktop.
    pub fn desktop_files(&self) -> Vec<&VirtualFile> {
        self.list_children(DESKTOP_ID)
    }

    /// Clear the hidden bit on a node. Idempotent.
    ///
    /// Returns `false` when the id is unknown; the caller decides what a
    /// missing node means.
    pub fn reveal(&mut self, id: &str) -> bool {
        let Some(file) = self.files.get_mut(id) else {
            return false;
        };

        if file.hidden {
            file.hidden = false;
            debug!(id = %id, "revealed hidden file");
        }
        if !self.revealed.iter().any(|r| r == id) {
            self.revealed.push(id.to_string());
        }
        true
    }

    /// Ids revealed at runtime, in reveal order.
    pub fn revealed(&self) -> &[String] {
        &self.revealed
    }

    /// Re-apply a persisted reveal list onto the authored tree.
    pub fn apply_revealed(&mut self, ids: &[String]) {
        for id in ids {
            self.reveal(id);
        }
    }

    /// Toggle whether listings include hidden entries.
    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}
