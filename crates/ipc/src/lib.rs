//! SmoothDock IPC Protocol
//!
//! Shared types for daemon-CLI communication over a Unix domain socket.
//! Every message is one JSON object followed by a newline.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smoothdock_core_layout::{ItemPlacement, PanelState, Rect, TaskInfo, WindowId};
use thiserror::Error;

/// File name of the daemon socket inside the runtime directory.
pub const SOCKET_NAME: &str = "smoothdock.sock";

/// Maximum size of a single IPC message (64 KiB).
pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024;

/// Socket path: `$XDG_RUNTIME_DIR/smoothdock.sock`, falling back to the
/// temporary directory.
pub fn socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(SOCKET_NAME)
}

/// Framing errors.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("Message of {0} bytes exceeds the {max} byte limit", max = MAX_IPC_MESSAGE_SIZE)]
    MessageTooLarge(usize),

    #[error("Empty message")]
    Empty,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a message as one newline-terminated line.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, IpcError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    if line.len() > MAX_IPC_MESSAGE_SIZE {
        return Err(IpcError::MessageTooLarge(line.len()));
    }
    Ok(line)
}

/// Parse one line read from the socket.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, IpcError> {
    if line.len() > MAX_IPC_MESSAGE_SIZE {
        return Err(IpcError::MessageTooLarge(line.len()));
    }
    let line = line.trim();
    if line.is_empty() {
        return Err(IpcError::Empty);
    }
    Ok(serde_json::from_str(line)?)
}

/// Commands that can be sent from the CLI (or a task watcher) to the daemon.
///
/// Pointer coordinates are relative to the dock's window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    /// The pointer entered a dock window.
    PointerEnter { dock: usize },
    /// The pointer moved inside a dock window.
    PointerMove { dock: usize, x: i32, y: i32 },
    /// The pointer left a dock window.
    PointerLeave { dock: usize },
    /// A mouse button was released over a dock window.
    Click {
        dock: usize,
        x: i32,
        y: i32,
        #[serde(default)]
        button: MouseButton,
    },

    /// A task window appeared.
    TaskAdded { task: TaskInfo },
    /// A task window closed.
    TaskRemoved { window_id: WindowId },
    /// A task window's title, desktop, screen or attention state changed.
    TaskChanged { task: TaskInfo },
    /// The current desktop (1-based) or the number of desktops changed.
    DesktopChanged {
        desktop: u32,
        #[serde(default)]
        count: Option<u32>,
    },

    /// Pin the program at `index` so it stays without tasks.
    Pin { dock: usize, index: usize },
    /// Unpin the program at `index`; it goes away once it has no tasks.
    Unpin { dock: usize, index: usize },

    /// Query one dock's state and geometry.
    QueryPanel { dock: usize },
    /// Query one dock's items.
    QueryItems { dock: usize },
    /// Query daemon status.
    QueryStatus,

    /// Reload configuration from file.
    Reload,
    /// Stop the daemon.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// What the host should do for a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickAction {
    /// Start a new instance of a program.
    Launch { command: String },
    /// Raise an existing task window.
    Activate { window_id: WindowId },
    /// Open the application menu at `x`, `y` (screen coordinates).
    ShowApplicationMenu { x: i32, y: i32 },
    /// Open the item's context menu.
    ShowContextMenu { index: usize },
    /// Switch to a desktop (1-based).
    SwitchDesktop { desktop: u32 },
    /// Toggle showing the desktop.
    ToggleShowDesktop,
    /// Lock the screen with `command` once the dock has collapsed.
    LockScreen { command: String },
    /// Nothing to do.
    None,
}

/// Responses from the daemon to the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed with an error.
    Error {
        /// Error message describing what went wrong.
        message: String,
    },
    /// Dock state query response.
    PanelState {
        dock: usize,
        state: PanelState,
        /// Window rectangle in screen coordinates.
        window: Rect,
        /// Background rectangle in window coordinates.
        background: Rect,
        item_count: usize,
        /// Bumped on every re-layout caused by an item-set change.
        layout_generation: u64,
    },
    /// Dock item query response.
    Items {
        dock: usize,
        items: Vec<ItemPlacement>,
    },
    /// Daemon status query response.
    Status {
        docks: usize,
        tasks: usize,
        desktop: u32,
        desktop_count: u32,
        animating: bool,
        config_path: Option<String>,
    },
    /// Click response.
    Clicked {
        dock: usize,
        /// Index of the item under the pointer, if any.
        index: Option<usize>,
        #[serde(flatten)]
        action: ClickAction,
    },
}

impl IpcResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
