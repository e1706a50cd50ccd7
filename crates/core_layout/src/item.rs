//! Dock items: the visual slots of a panel.

use crate::animation::lerp;
use crate::collection::same_command;
use crate::{Orientation, Rect, WindowId};
use serde::{Deserialize, Serialize};

/// Icon used for programs the application registry does not know.
pub const GENERIC_ICON: &str = "xapp";

/// Launcher command that stands for a separator instead of a program.
pub const SEPARATOR_COMMAND: &str = "SEPARATOR";

/// Launcher command that toggles showing the desktop.
pub const SHOW_DESKTOP_COMMAND: &str = "SHOW_DESKTOP";

/// A task (top-level window) as reported by task discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Window identity.
    pub window_id: WindowId,
    /// Program name, used as the label when no application matches.
    pub program: String,
    /// Command line of the owning process.
    pub command: String,
    /// Window title.
    #[serde(default)]
    pub title: String,
    /// Desktop the window lives on; `None` means all desktops.
    #[serde(default)]
    pub desktop: Option<u32>,
    /// Screen the window is on, if known.
    #[serde(default)]
    pub screen: Option<usize>,
    /// Whether the window asks for the user's attention.
    #[serde(default)]
    pub demands_attention: bool,
}

impl TaskInfo {
    /// Create a task with only the fields the layout engine needs.
    pub fn new(window_id: WindowId, program: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            window_id,
            program: program.into(),
            command: command.into(),
            title: String::new(),
            desktop: None,
            screen: None,
            demands_attention: false,
        }
    }
}

/// A pinned launcher entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Display name.
    pub name: String,
    /// Icon name.
    pub icon: String,
    /// Launch command, or [`SEPARATOR_COMMAND`].
    pub command: String,
    /// Command used to match running tasks. Derived from `command` if absent.
    #[serde(default)]
    pub task_command: Option<String>,
}

impl LauncherConfig {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            command: command.into(),
            task_command: None,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.command == SEPARATOR_COMMAND
    }

    /// Command used to match running tasks against this launcher.
    pub fn task_command(&self) -> String {
        self.task_command
            .clone()
            .unwrap_or_else(|| task_command_for(&self.command))
    }
}

/// Derive the task-matching command from a launch command: the executable
/// name without directory or arguments.
pub(crate) fn task_command_for(command: &str) -> String {
    let program = command.split_whitespace().next().unwrap_or("");
    program.rsplit('/').next().unwrap_or(program).to_string()
}

/// A window attached to a program item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTask {
    pub window_id: WindowId,
    pub title: String,
    pub demands_attention: bool,
}

/// A program, pinned or task-backed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub icon: String,
    pub command: String,
    pub task_command: String,
    tasks: Vec<ProgramTask>,
    demands_attention: bool,
}

impl Program {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        command: impl Into<String>,
        task_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            command: command.into(),
            task_command: task_command.into(),
            tasks: Vec::new(),
            demands_attention: false,
        }
    }

    pub fn from_launcher(launcher: &LauncherConfig) -> Self {
        Self::new(
            launcher.name.clone(),
            launcher.icon.clone(),
            launcher.command.clone(),
            launcher.task_command(),
        )
    }

    pub fn tasks(&self) -> &[ProgramTask] {
        &self.tasks
    }

    pub fn demands_attention(&self) -> bool {
        self.demands_attention
    }

    pub fn has_task(&self, window_id: WindowId) -> bool {
        self.tasks.iter().any(|t| t.window_id == window_id)
    }

    /// Attach a task if it belongs to this program.
    pub fn add_task(&mut self, task: &TaskInfo) -> bool {
        if !same_command(&self.task_command, &task.command) {
            return false;
        }
        self.tasks.push(ProgramTask {
            window_id: task.window_id,
            title: task.title.clone(),
            demands_attention: task.demands_attention,
        });
        if task.demands_attention {
            self.demands_attention = true;
        }
        true
    }

    /// Refresh an attached task's state.
    pub fn update_task(&mut self, task: &TaskInfo) -> bool {
        if !same_command(&self.task_command, &task.command) {
            return false;
        }
        let Some(existing) = self.tasks.iter_mut().find(|t| t.window_id == task.window_id) else {
            return false;
        };
        existing.demands_attention = task.demands_attention;
        existing.title = task.title.clone();
        self.demands_attention = self.tasks.iter().any(|t| t.demands_attention);
        true
    }

    /// Detach a task by window id.
    pub fn remove_task(&mut self, window_id: WindowId) -> bool {
        let Some(pos) = self.tasks.iter().position(|t| t.window_id == window_id) else {
            return false;
        };
        self.tasks.remove(pos);
        self.demands_attention = self.tasks.iter().any(|t| t.demands_attention);
        true
    }

    pub fn label(&self) -> String {
        if self.tasks.len() > 1 {
            format!("{} ({} instances)", self.name, self.tasks.len())
        } else {
            self.name.clone()
        }
    }
}

/// The closed set of item variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// Opens the application menu. Always first when present.
    MenuTrigger { label: String, icon: String },
    /// Switches to a desktop (1-based).
    PagerCell { desktop: u32 },
    /// A pinned program; survives having no tasks.
    Launcher(Program),
    /// An unpinned program; removed once its last task goes away.
    TaskProgram(Program),
    /// A thin divider between launcher groups.
    Separator,
    /// Clock face. Always last when present.
    Clock,
}

impl ItemKind {
    /// Short tag for reporting.
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::MenuTrigger { .. } => "menu",
            ItemKind::PagerCell { .. } => "pager",
            ItemKind::Launcher(_) => "launcher",
            ItemKind::TaskProgram(_) => "task",
            ItemKind::Separator => "separator",
            ItemKind::Clock => "clock",
        }
    }
}

/// Size and position of an item in one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFrame {
    pub size: i32,
    pub left: i32,
    pub top: i32,
}

impl ItemFrame {
    pub fn new(size: i32, left: i32, top: i32) -> Self {
        Self { size, left, top }
    }

    pub fn translated(self, dx: i32, dy: i32) -> ItemFrame {
        ItemFrame::new(self.size, self.left + dx, self.top + dy)
    }

    /// Linear interpolation between two frames.
    pub fn interpolate(start: ItemFrame, end: ItemFrame, step: u32, total: u32) -> ItemFrame {
        ItemFrame {
            size: lerp(start.size, end.size, step, total),
            left: lerp(start.left, end.left, step, total),
            top: lerp(start.top, end.top, step, total),
        }
    }
}

/// One visual slot in a panel.
#[derive(Debug, Clone)]
pub struct DockItem {
    kind: ItemKind,
    orientation: Orientation,
    min_size: i32,
    max_size: i32,
    pub(crate) size: i32,
    pub(crate) left: i32,
    pub(crate) top: i32,
    /// Rest-layout center along the magnification axis.
    pub(crate) min_center: i32,
    pub(crate) start: ItemFrame,
    pub(crate) end: ItemFrame,
}

impl DockItem {
    pub fn new(kind: ItemKind, orientation: Orientation, min_size: i32, max_size: i32) -> Self {
        Self {
            kind,
            orientation,
            min_size,
            max_size,
            size: min_size,
            left: 0,
            top: 0,
            min_center: 0,
            start: ItemFrame::default(),
            end: ItemFrame::default(),
        }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn min_size(&self) -> i32 {
        self.min_size
    }

    pub fn max_size(&self) -> i32 {
        self.max_size
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn min_center(&self) -> i32 {
        self.min_center
    }

    pub fn frame(&self) -> ItemFrame {
        ItemFrame::new(self.size, self.left, self.top)
    }

    pub(crate) fn set_frame(&mut self, frame: ItemFrame) {
        self.size = frame.size;
        self.left = frame.left;
        self.top = frame.top;
    }

    pub fn animation_start(&self) -> ItemFrame {
        self.start
    }

    pub fn animation_end(&self) -> ItemFrame {
        self.end
    }

    /// Length along the magnification axis at the given size.
    pub fn length_for(&self, size: i32) -> i32 {
        match self.kind {
            ItemKind::Separator => (size / 4).max(2),
            _ => size,
        }
    }

    /// Current length along the magnification axis.
    pub fn length(&self) -> i32 {
        self.length_for(self.size)
    }

    /// Rest length along the magnification axis.
    pub fn min_length(&self) -> i32 {
        self.length_for(self.min_size)
    }

    pub fn width(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.length(),
            Orientation::Vertical => self.size,
        }
    }

    pub fn height(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.size,
            Orientation::Vertical => self.length(),
        }
    }

    /// Leading edge along the magnification axis.
    pub fn leading(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.left,
            Orientation::Vertical => self.top,
        }
    }

    /// Current rectangle in panel window coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }

    pub fn label(&self) -> String {
        match &self.kind {
            ItemKind::MenuTrigger { label, .. } => label.clone(),
            ItemKind::PagerCell { desktop } => format!("Desktop {}", desktop),
            ItemKind::Launcher(program) | ItemKind::TaskProgram(program) => program.label(),
            ItemKind::Separator => String::new(),
            ItemKind::Clock => "Clock".to_string(),
        }
    }

    pub fn program(&self) -> Option<&Program> {
        match &self.kind {
            ItemKind::Launcher(program) | ItemKind::TaskProgram(program) => Some(program),
            _ => None,
        }
    }

    fn program_mut(&mut self) -> Option<&mut Program> {
        match &mut self.kind {
            ItemKind::Launcher(program) | ItemKind::TaskProgram(program) => Some(program),
            _ => None,
        }
    }

    /// Whether the item persists regardless of task presence.
    pub fn is_pinned(&self) -> bool {
        !matches!(self.kind, ItemKind::TaskProgram(_))
    }

    /// Pin or unpin a program. Returns false for non-program items.
    pub fn set_pinned(&mut self, pinned: bool) -> bool {
        let kind = std::mem::replace(&mut self.kind, ItemKind::Separator);
        let (kind, ok) = match (kind, pinned) {
            (ItemKind::Launcher(p) | ItemKind::TaskProgram(p), true) => (ItemKind::Launcher(p), true),
            (ItemKind::Launcher(p) | ItemKind::TaskProgram(p), false) => {
                (ItemKind::TaskProgram(p), true)
            }
            (other, _) => (other, false),
        };
        self.kind = kind;
        ok
    }

    pub fn has_task(&self, window_id: WindowId) -> bool {
        self.program().is_some_and(|p| p.has_task(window_id))
    }

    pub fn task_count(&self) -> usize {
        self.program().map_or(0, |p| p.tasks().len())
    }

    pub fn add_task(&mut self, task: &TaskInfo) -> bool {
        self.program_mut().is_some_and(|p| p.add_task(task))
    }

    pub fn update_task(&mut self, task: &TaskInfo) -> bool {
        self.program_mut().is_some_and(|p| p.update_task(task))
    }

    pub fn remove_task(&mut self, window_id: WindowId) -> bool {
        self.program_mut().is_some_and(|p| p.remove_task(window_id))
    }

    /// Task-backed items with no tasks left are removed from the panel.
    pub fn should_be_removed(&self) -> bool {
        match &self.kind {
            ItemKind::TaskProgram(program) => program.tasks().is_empty(),
            _ => false,
        }
    }

    /// Whether a new task program for `command` belongs after this item.
    pub fn sorts_before(&self, command: &str) -> bool {
        match &self.kind {
            ItemKind::MenuTrigger { .. }
            | ItemKind::PagerCell { .. }
            | ItemKind::Launcher(_)
            | ItemKind::Separator => true,
            ItemKind::TaskProgram(program) => program.task_command.as_str() < command,
            ItemKind::Clock => false,
        }
    }

    pub(crate) fn set_animation_start_as_current(&mut self) {
        self.start = self.frame();
    }

    pub(crate) fn set_animation_end_as_current(&mut self) {
        self.end = self.frame();
    }

    /// Move to the interpolated frame for `step` of `total`.
    pub(crate) fn apply_animation_step(&mut self, step: u32, total: u32) {
        let frame = ItemFrame::interpolate(self.start, self.end, step, total);
        self.set_frame(frame);
    }
}
