//! SmoothDock Core Layout Engine
//!
//! Platform-agnostic layout and animation engine for a parabolic-zoom dock.
//!
//! This crate implements the dock strip where:
//! - Items are laid out contiguously along the edge the panel is anchored to
//! - Items near the pointer are magnified with a parabolic size profile
//! - The panel animates between a minimized and a maximized state in fixed steps
//!
//! Nothing in here touches a display server. Hosts feed pointer, task and
//! timer events into a [`DockPanel`] and read back item rectangles, the
//! panel window geometry and tooltip requests.

mod animation;
mod collection;
mod geometry;
mod item;
mod panel;
mod parabolic;
mod solver;

pub use animation::{lerp, retarget_start, AnimationController, Direction, PanelState};
pub use collection::{
    same_command, AppEntry, ApplicationRegistry, InsertOutcome, ItemCollection, RemoveOutcome,
    StaticRegistry,
};
pub use geometry::{PanelGeometry, StrutRequest, TooltipRequest, TOOLTIP_SPACING};
pub use item::{
    DockItem, ItemFrame, ItemKind, LauncherConfig, Program, ProgramTask, TaskInfo, GENERIC_ICON,
    SEPARATOR_COMMAND, SHOW_DESKTOP_COMMAND,
};
pub use panel::{
    DockPanel, ItemPlacement, PanelFeatures, PanelParams, TooltipUpdate, MAX_ANIMATION_SPEED,
};
pub use parabolic::ParabolicProfile;
pub use solver::{LayoutMetrics, LayoutSolver, AUTO_HIDE_THICKNESS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a task window, as reported by task discovery.
pub type WindowId = u64;

/// Errors that can occur during layout operations.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Item index {0} is out of bounds (len: {1})")]
    ItemOutOfBounds(usize, usize),

    #[error("Item {0} is not a program and cannot be pinned")]
    NotAProgram(usize),

    #[error("Minimum icon size must be positive, got {0}")]
    InvalidMinSize(i32),

    #[error("Maximum icon size {max} is smaller than minimum size {min}")]
    MaxBelowMin { min: i32, max: i32 },

    #[error("Spacing factor {0} is outside [0, 1]")]
    InvalidSpacingFactor(f32),
}

/// A rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Check if this rectangle contains a point.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Translate by an offset.
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis along which items are laid out and magnified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Top or bottom panel; items run left to right.
    Horizontal,
    /// Left or right panel; items run top to bottom.
    Vertical,
}

/// Screen edge the panel is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelEdge {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl PanelEdge {
    /// Orientation implied by this edge.
    pub fn orientation(self) -> Orientation {
        match self {
            PanelEdge::Top | PanelEdge::Bottom => Orientation::Horizontal,
            PanelEdge::Left | PanelEdge::Right => Orientation::Vertical,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.orientation() == Orientation::Horizontal
    }
}

/// How the panel interacts with other windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVisibility {
    /// Always shown; the minimized thickness is reserved as strut.
    #[default]
    AlwaysVisible,
    /// Collapses to a 1px strip while idle.
    AutoHide,
    /// Windows may cover the panel; raised on hover.
    WindowsCanCover,
    /// Like `WindowsCanCover` without reserving the 1px activation strut.
    WindowsCanCoverQuiet,
    /// Windows go below the panel; nothing is reserved.
    WindowsGoBelow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains(10, 10));
        assert!(r.contains(29, 29));
        assert!(!r.contains(30, 10));
        assert!(!r.contains(9, 15));
    }

    #[test]
    fn test_rect_edges_and_translate() {
        let r = Rect::new(5, 7, 10, 20);
        assert_eq!(r.right(), 15);
        assert_eq!(r.bottom(), 27);
        assert_eq!(r.translated(3, -2), Rect::new(8, 5, 10, 20));
    }

    #[test]
    fn test_edge_orientation() {
        assert_eq!(PanelEdge::Top.orientation(), Orientation::Horizontal);
        assert_eq!(PanelEdge::Bottom.orientation(), Orientation::Horizontal);
        assert_eq!(PanelEdge::Left.orientation(), Orientation::Vertical);
        assert_eq!(PanelEdge::Right.orientation(), Orientation::Vertical);
        assert!(PanelEdge::default().is_horizontal());
    }
}
