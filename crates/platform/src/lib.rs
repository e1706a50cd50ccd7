//! SmoothDock Platform
//!
//! Boundary between the layout engine and the display server.
//!
//! This crate handles:
//! - The [`WindowManager`] trait the daemon drives: panel placement, struts,
//!   stacking layer and tooltips
//! - Task scoping: which task windows belong on which dock
//! - Display-less adapters for running headless and for tests

pub mod headless;

pub use headless::{estimate_tooltip_size, CallLog, HeadlessPanel, HeadlessWindowManager, RecordingWindowManager, WmCall};

use smoothdock_core_layout::{PanelVisibility, Rect, StrutRequest, TaskInfo, TooltipRequest};
use thiserror::Error;

/// Index of a dock as configured.
pub type PanelId = usize;

/// Errors that can occur while talking to the window manager.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Panel {0} is not registered")]
    UnknownPanel(PanelId),

    #[error("Window manager rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },
}

/// Stacking layer of a panel window relative to normal windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingLayer {
    Above,
    Below,
}

/// Whether other windows may cover the panel while the pointer is away.
pub fn windows_can_cover(visibility: PanelVisibility) -> bool {
    matches!(
        visibility,
        PanelVisibility::WindowsCanCover | PanelVisibility::WindowsCanCoverQuiet
    )
}

/// Layer a panel sits in while the pointer is outside it.
pub fn resting_layer(visibility: PanelVisibility) -> StackingLayer {
    if windows_can_cover(visibility) {
        StackingLayer::Below
    } else {
        StackingLayer::Above
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Parse `#rrggbb`, with `alpha` as the alpha channel.
    pub fn from_hex(hex: &str, alpha: u8) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: alpha,
        })
    }
}

/// How a panel window is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelStyle {
    pub background: Color,
    /// Border color; no border when `None`.
    pub border: Option<Color>,
    /// Clock items show 24-hour time.
    pub use_24_hour_clock: bool,
}

/// Operations the daemon needs from the window manager.
pub trait WindowManager: Send {
    /// Create or reset the panel window. Panels show on all desktops.
    fn register_panel(&mut self, panel: PanelId, visibility: PanelVisibility) -> Result<(), PlatformError>;

    /// Move and resize the panel window (screen coordinates).
    fn place_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), PlatformError>;

    /// Reserve screen space along the panel's edge.
    fn set_strut(&mut self, panel: PanelId, strut: &StrutRequest) -> Result<(), PlatformError>;

    fn set_layer(&mut self, panel: PanelId, layer: StackingLayer) -> Result<(), PlatformError>;

    /// Colors and clock format the panel is drawn with.
    fn set_style(&mut self, panel: PanelId, style: &PanelStyle) -> Result<(), PlatformError>;

    fn show_tooltip(&mut self, panel: PanelId, request: &TooltipRequest) -> Result<(), PlatformError>;

    fn hide_tooltip(&mut self, panel: PanelId) -> Result<(), PlatformError>;
}

/// Which tasks a dock shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskScope {
    /// Only tasks on this screen, if set.
    pub screen: Option<usize>,
    /// Only tasks on this desktop (or on all desktops), if set.
    pub desktop: Option<u32>,
}

impl TaskScope {
    pub fn new(screen: usize, current_desktop: u32, current_screen_only: bool, current_desktop_only: bool) -> Self {
        Self {
            screen: current_screen_only.then_some(screen),
            desktop: current_desktop_only.then_some(current_desktop),
        }
    }

    /// Whether a task belongs in this scope. Tasks with unknown placement
    /// always do.
    pub fn contains(&self, task: &TaskInfo) -> bool {
        let on_screen = match (self.screen, task.screen) {
            (Some(screen), Some(task_screen)) => screen == task_screen,
            _ => true,
        };
        let on_desktop = match (self.desktop, task.desktop) {
            (Some(desktop), Some(task_desktop)) => desktop == task_desktop,
            _ => true,
        };
        on_screen && on_desktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(desktop: Option<u32>, screen: Option<usize>) -> TaskInfo {
        TaskInfo {
            desktop,
            screen,
            ..TaskInfo::new(1, "konsole", "konsole")
        }
    }

    #[test]
    fn test_unrestricted_scope_accepts_everything() {
        let scope = TaskScope::new(0, 2, false, false);
        assert_eq!(scope, TaskScope::default());
        assert!(scope.contains(&task(Some(5), Some(3))));
    }

    #[test]
    fn test_desktop_scope() {
        let scope = TaskScope::new(0, 2, false, true);
        assert!(scope.contains(&task(Some(2), None)));
        assert!(!scope.contains(&task(Some(1), None)));
        // Sticky windows show everywhere.
        assert!(scope.contains(&task(None, None)));
    }

    #[test]
    fn test_screen_scope() {
        let scope = TaskScope::new(1, 1, true, false);
        assert!(scope.contains(&task(None, Some(1))));
        assert!(!scope.contains(&task(None, Some(0))));
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(
            Color::from_hex("#638abd", 107),
            Some(Color {
                r: 0x63,
                g: 0x8a,
                b: 0xbd,
                a: 107
            })
        );
        assert_eq!(Color::from_hex("638abd", 255), None);
        assert_eq!(Color::from_hex("#12345g", 255), None);
        assert_eq!(Color::from_hex("#fff", 255), None);
        assert_eq!(Color::from_hex("#ééé", 255), None);
    }

    #[test]
    fn test_resting_layer() {
        assert_eq!(resting_layer(PanelVisibility::AlwaysVisible), StackingLayer::Above);
        assert_eq!(resting_layer(PanelVisibility::AutoHide), StackingLayer::Above);
        assert_eq!(resting_layer(PanelVisibility::WindowsGoBelow), StackingLayer::Above);
        assert_eq!(resting_layer(PanelVisibility::WindowsCanCover), StackingLayer::Below);
        assert_eq!(resting_layer(PanelVisibility::WindowsCanCoverQuiet), StackingLayer::Below);
    }
}
