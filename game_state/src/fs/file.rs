//! File definitions - nodes in the virtual file tree.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Node kinds in the virtual file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Folder,
}

/// Classifier governing which viewer application opens a file.
///
/// This is a presentation hint only; the core never branches on it beyond
/// carrying it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileTypeTag {
    Text,
    Image,
    Pdf,
    Spreadsheet,
    Document,
    Executable,
}

/// A single page of a paged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub number: u32,
    pub body: String,

    /// Text revealed only when the player explicitly toggles the layer view.
    pub hidden_layer: Option<String>,
}

impl DocumentPage {
    /// Create a new page with the given body text.
    pub fn new(number: u32, body: impl Into<String>) -> Self {
        Self {
            number,
            body: body.into(),
            hidden_layer: None,
        }
    }

    /// Attach a hidden text layer to this page.
    pub fn with_hidden_layer(mut self, text: impl Into<String>) -> Self {
        self.hidden_layer = Some(text.into());
        self
    }

    /// Check whether this page carries a hidden layer.
    pub fn has_hidden_layer(&self) -> bool {
        self.hidden_layer.is_some()
    }
}

/// A structured multi-page document (in-fiction PDFs and office files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedDocument {
    pub title: String,
    pub pages: Vec<DocumentPage>,
}

impl PagedDocument {
    /// Create a new empty document with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Append a page to the document.
    pub fn with_page(mut self, page: DocumentPage) -> Self {
        self.pages.push(page);
        self
    }

    /// Check whether any page carries a hidden layer.
    pub fn has_hidden_layer(&self) -> bool {
        self.pages.iter().any(DocumentPage::has_hidden_layer)
    }
}

/// Content payload of a file, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileContent {
    /// Plain text shown in the notepad viewer.
    PlainText(String),

    /// A paged document with optional hidden layers.
    Paged(PagedDocument),

    /// Opaque content (images, executables); bytes live in the asset layer.
    Binary,
}

/// Display-only timestamps and size for a file node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    /// Size in bytes, shown in the explorer detail view.
    pub size: Option<u64>,
}

/// A node in the virtual file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub id: String,

    /// Containing folder; `None` only for the desktop root.
    pub parent_id: Option<String>,

    pub name: String,
    pub kind: FileKind,

    /// Content payload; folders carry none.
    pub content: Option<FileContent>,

    /// Viewer hint for the presentation layer.
    pub type_tag: Option<FileTypeTag>,

    /// Ordered child ids (folders only).
    pub children: Vec<String>,

    /// Excluded from listings until explicitly revealed.
    pub hidden: bool,

    pub metadata: FileMetadata,
}

impl VirtualFile {
    /// Create a new file node under the given parent folder.
    pub fn file(id: impl Into<String>, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            name: name.into(),
            kind: FileKind::File,
            content: None,
            type_tag: None,
            children: Vec::new(),
            hidden: false,
            metadata: FileMetadata::default(),
        }
    }

    /// Create a new folder node under the given parent folder.
    pub fn folder(id: impl Into<String>, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            name: name.into(),
            kind: FileKind::Folder,
            content: None,
            type_tag: None,
            children: Vec::new(),
            hidden: false,
            metadata: FileMetadata::default(),
        }
    }

    /// Set the content payload.
    pub fn with_content(mut self, content: FileContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Convenience: plain text content with the text viewer tag.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(FileContent::PlainText(text.into()))
            .with_type_tag(FileTypeTag::Text)
    }

    /// Set the viewer hint.
    pub fn with_type_tag(mut self, tag: FileTypeTag) -> Self {
        self.type_tag = Some(tag);
        self
    }

    /// Mark this node as hidden until revealed.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set display metadata.
    pub fn with_metadata(mut self, metadata: FileMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_builder() {
        let file = VirtualFile::file("file_notes", "folder_life", "reading_notes.txt")
            .with_text("Out of Control, excerpt:\nEmergence appears once the parts are many enough.");

        assert_eq!(file.id, "file_notes");
        assert_eq!(file.parent_id.as_deref(), Some("folder_life"));
        assert!(!file.is_folder());
        assert_eq!(file.type_tag, Some(FileTypeTag::Text));
        assert!(matches!(file.content, Some(FileContent::PlainText(_))));
        assert!(!file.hidden);
    }

    #[test]
    fn test_hidden_folder() {
        let folder = VirtualFile::folder("folder_system", "desktop", ".system").hidden();
        assert!(folder.is_folder());
        assert!(folder.hidden);
        assert!(folder.content.is_none());
    }

    #[test]
    fn test_paged_document_hidden_layer() {
        let doc = PagedDocument::new("Case notes")
            .with_page(DocumentPage::new(1, "Collected cases."))
            .with_page(DocumentPage::new(2, "Common threads.").with_hidden_layer("All eight of them were me."));

        assert_eq!(doc.pages.len(), 2);
        assert!(!doc.pages[0].has_hidden_layer());
        assert!(doc.pages[1].has_hidden_layer());
        assert!(doc.has_hidden_layer());
    }
}
