//! Ordered item storage with task-affinity and insertion-order rules.

use crate::item::{task_command_for, DockItem, ItemKind, LauncherConfig, Program, TaskInfo, GENERIC_ICON};
use crate::{LayoutError, Orientation, WindowId};

/// A known application: display name, icon and canonical commands.
pub type AppEntry = LauncherConfig;

/// Maps a launch command to a known application.
pub trait ApplicationRegistry {
    fn find_application(&self, command: &str) -> Option<AppEntry>;
}

/// Registry backed by a fixed list, matched by executable name.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    apps: Vec<AppEntry>,
}

impl StaticRegistry {
    pub fn new(apps: Vec<AppEntry>) -> Self {
        Self { apps }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl ApplicationRegistry for StaticRegistry {
    fn find_application(&self, command: &str) -> Option<AppEntry> {
        self.apps
            .iter()
            .find(|app| same_command(&app.task_command(), command))
            .cloned()
    }
}

/// Whether two commands launch the same executable.
pub fn same_command(a: &str, b: &str) -> bool {
    let a = task_command_for(a);
    !a.is_empty() && a == task_command_for(b)
}

/// Result of [`ItemCollection::insert_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The window was already represented by the item at this index.
    AlreadyPresent(usize),
    /// The task joined the existing program at this index.
    Attached(usize),
    /// A new task program was created at this index.
    Created(usize),
}

impl InsertOutcome {
    /// Whether the item set changed shape.
    pub fn created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }
}

/// Result of [`ItemCollection::remove_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No item owned the window.
    NotFound,
    /// The task left the item at this index; the item stays.
    Detached(usize),
    /// The item at this index lost its last task and was deleted.
    Removed(usize),
}

/// Ordered sequence of dock items.
///
/// Order is layout order: menu trigger, pager cells, launchers, task
/// programs, clock.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    items: Vec<DockItem>,
    orientation: Orientation,
    min_size: i32,
    max_size: i32,
}

impl ItemCollection {
    /// Create an empty collection whose items are sized with these bounds.
    pub fn new(orientation: Orientation, min_size: i32, max_size: i32) -> Self {
        Self {
            items: Vec::new(),
            orientation,
            min_size,
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DockItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DockItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[DockItem] {
        &self.items
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [DockItem] {
        &mut self.items
    }

    /// Build an item of the given kind with this collection's sizing.
    pub fn make_item(&self, kind: ItemKind) -> DockItem {
        DockItem::new(kind, self.orientation, self.min_size, self.max_size)
    }

    /// Append an item.
    pub fn push(&mut self, kind: ItemKind) {
        let item = self.make_item(kind);
        self.items.push(item);
    }

    /// Append a launcher, or a separator for the separator command.
    pub fn push_launcher(&mut self, launcher: &LauncherConfig) {
        if launcher.is_separator() {
            self.push(ItemKind::Separator);
        } else {
            self.push(ItemKind::Launcher(Program::from_launcher(launcher)));
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of leading items that never move on task changes: the menu
    /// trigger and the pager cells.
    pub fn pinned_prefix_len(&self) -> usize {
        self.items
            .iter()
            .take_while(|item| {
                matches!(item.kind(), ItemKind::MenuTrigger { .. } | ItemKind::PagerCell { .. })
            })
            .count()
    }

    /// Drop everything after the pinned prefix.
    pub fn truncate_to_prefix(&mut self) {
        let keep = self.pinned_prefix_len();
        self.items.truncate(keep);
    }

    /// Index of the item owning a window.
    pub fn find_task(&self, window_id: WindowId) -> Option<usize> {
        self.items.iter().position(|item| item.has_task(window_id))
    }

    /// Add a task: attach it to a matching program or create a new one in
    /// sorted position.
    pub fn insert_task(
        &mut self,
        task: &TaskInfo,
        registry: &dyn ApplicationRegistry,
    ) -> InsertOutcome {
        if let Some(index) = self.find_task(task.window_id) {
            return InsertOutcome::AlreadyPresent(index);
        }

        if let Some(index) = self.items.iter_mut().position(|item| item.add_task(task)) {
            return InsertOutcome::Attached(index);
        }

        let program = match registry.find_application(&task.command) {
            Some(app) => Program::new(app.name.clone(), app.icon.clone(), app.command.clone(), app.task_command()),
            None => Program::new(
                task.program.clone(),
                GENERIC_ICON,
                task.command.clone(),
                task.command.clone(),
            ),
        };

        let index = self
            .items
            .iter()
            .take_while(|item| item.sorts_before(&program.task_command))
            .count();
        let mut item = self.make_item(ItemKind::TaskProgram(program));
        item.add_task(task);
        self.items.insert(index, item);
        InsertOutcome::Created(index)
    }

    /// Detach a window; delete its item if nothing keeps it alive.
    pub fn remove_task(&mut self, window_id: WindowId) -> RemoveOutcome {
        let Some(index) = self.items.iter_mut().position(|item| item.remove_task(window_id)) else {
            return RemoveOutcome::NotFound;
        };
        if self.items[index].should_be_removed() {
            self.items.remove(index);
            RemoveOutcome::Removed(index)
        } else {
            RemoveOutcome::Detached(index)
        }
    }

    /// Refresh an attached task. Returns whether any item owned it.
    pub fn update_task(&mut self, task: &TaskInfo) -> bool {
        self.items.iter_mut().any(|item| item.update_task(task))
    }

    /// Remove the first item that should no longer be shown.
    pub fn prune_invalid(&mut self) -> bool {
        match self.items.iter().position(DockItem::should_be_removed) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pin or unpin the program at `index`.
    pub fn set_pinned(&mut self, index: usize, pinned: bool) -> Result<(), LayoutError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(LayoutError::ItemOutOfBounds(index, len))?;
        if item.set_pinned(pinned) {
            Ok(())
        } else {
            Err(LayoutError::NotAProgram(index))
        }
    }
}
