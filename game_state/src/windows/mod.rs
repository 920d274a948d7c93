//! Window manager - the flat, z-ordered collection of open application windows.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for window instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub Uuid);

impl WindowId {
    /// Create a new random window ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open application window on the simulated desktop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInstance {
    pub id: WindowId,

    /// Which application renders inside this window.
    pub app_id: String,

    pub title: String,
    pub is_minimized: bool,
    pub is_maximized: bool,

    /// Stacking position; assigned from a monotonic counter, never reused.
    pub z_index: u64,

    /// Opaque payload from the opener (e.g. which file id to display).
    pub data: Option<serde_json::Value>,
}

/// Base below which no window z-index is ever assigned.
const Z_INDEX_BASE: u64 = 100;

/// Manages all open windows as peers in a flat collection.
///
/// Focus is exclusive: at most one window is active, tracked by id. The
/// z-index counter increases on every open and focus, so stacking order is a
/// total order across the session and ids are never ambiguous. All mutation
/// happens synchronously on the session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowManager {
    windows: Vec<WindowInstance>,
    active: Option<WindowId>,
    next_z_index: u64,
}

impl WindowManager {
    /// Create an empty desktop.
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            active: None,
            next_z_index: Z_INDEX_BASE,
        }
    }

    /// Open a new window and make it active.
    ///
    /// Always succeeds; the window receives a fresh id and the next top-most
    /// z-index.
    pub fn open(
        &mut self,
        app_id: impl Into<String>,
        title: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> WindowId {
        let id = WindowId::new();
        self.next_z_index += 1;

        let window = WindowInstance {
            id,
            app_id: app_id.into(),
            title: title.into(),
            is_minimized: false,
            is_maximized: false,
            z_index: self.next_z_index,
            data,
        };
        debug!(window = %id, app = %window.app_id, z = window.z_index, "opened window");

        self.windows.push(window);
        self.active = Some(id);
        id
    }

    /// Close a window.
    ///
    /// If it was active, activation falls to the window with the highest
    /// remaining z-index. Unknown ids are ignored.
    pub fn close(&mut self, id: WindowId) {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        if self.windows.len() == before {
            return;
        }
        debug!(window = %id, "closed window");

        if self.active == Some(id) {
            self.active = self.top_window().map(|w| w.id);
        }
    }

    /// Bring a window to the front, activate it, and clear its minimized state.
    ///
    /// No-op when the id is unknown.
    pub fn focus(&mut self, id: WindowId) {
        let Some(pos) = self.windows.iter().position(|w| w.id == id) else {
            return;
        };

        self.next_z_index += 1;
        let window = &mut self.windows[pos];
        window.z_index = self.next_z_index;
        window.is_minimized = false;
        self.active = Some(id);
    }

    /// Minimize a window.
    ///
    /// Neither the z-index nor the window list order changes, and the active
    /// reference stays where it was - a minimized window is still open.
    pub fn minimize(&mut self, id: WindowId) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.is_minimized = true;
        }
    }

    /// Toggle a window between maximized and restored.
    pub fn toggle_maximize(&mut self, id: WindowId) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.is_maximized = !window.is_maximized;
        }
    }

    /// Get a window by id.
    pub fn get(&self, id: WindowId) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// The currently active window, if any.
    pub fn active_window(&self) -> Option<&WindowInstance> {
        self.active.and_then(|id| self.get(id))
    }

    /// Id of the currently active window.
    pub fn active_id(&self) -> Option<WindowId> {
        self.active
    }

    /// All windows in back-to-front stacking order.
    pub fn iter(&self) -> impl Iterator<Item = &WindowInstance> {
        let mut ordered: Vec<&WindowInstance> = self.windows.iter().collect();
        ordered.sort_by_key(|w| w.z_index);
        ordered.into_iter()
    }

    /// The top-most window regardless of minimized state.
    pub fn top_window(&self) -> Option<&WindowInstance> {
        self.windows.iter().max_by_key(|w| w.z_index)
    }

    /// Clone the window list for persistence.
    pub fn snapshot(&self) -> Vec<WindowInstance> {
        self.windows.clone()
    }

    /// Rebuild a manager from a persisted snapshot.
    ///
    /// The z-index counter resumes above the highest snapshotted value, and a
    /// dangling active reference is dropped rather than restored.
    pub fn from_snapshot(windows: Vec<WindowInstance>, active: Option<WindowId>) -> Self {
        let next_z_index = windows
            .iter()
            .map(|w| w.z_index)
            .max()
            .unwrap_or(Z_INDEX_BASE)
            .max(Z_INDEX_BASE);
        let active = active.filter(|id| windows.iter().any(|w| w.id == *id));

        Self {
            windows,
            active,
            next_z_index,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}
