//! One dock panel: items, layout, animation and window geometry driven by
//! pointer, task and timer events.

use std::time::Duration;

use crate::animation::{retarget_start, AnimationController, Direction, PanelState};
use crate::collection::{ApplicationRegistry, InsertOutcome, ItemCollection, RemoveOutcome};
use crate::geometry::{PanelGeometry, StrutRequest, TooltipRequest};
use crate::item::{DockItem, ItemFrame, ItemKind, LauncherConfig, TaskInfo};
use crate::solver::{LayoutMetrics, LayoutSolver};
use crate::{LayoutError, Orientation, PanelEdge, PanelVisibility, Point, Rect, Size, WindowId};
use serde::{Deserialize, Serialize};

/// Fastest animation speed; the tick interval is `32 - speed` ms.
pub const MAX_ANIMATION_SPEED: u32 = 16;

/// Appearance and placement parameters of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelParams {
    pub edge: PanelEdge,
    pub visibility: PanelVisibility,
    /// Geometry of the screen the panel lives on.
    pub screen: Rect,
    pub min_size: i32,
    pub max_size: i32,
    /// Spacing between items as a fraction of `min_size`.
    pub spacing_factor: f32,
    pub animation_steps: u32,
    pub animation_speed: u32,
}

impl Default for PanelParams {
    fn default() -> Self {
        Self {
            edge: PanelEdge::Bottom,
            visibility: PanelVisibility::AlwaysVisible,
            screen: Rect::new(0, 0, 1920, 1080),
            min_size: 48,
            max_size: 128,
            spacing_factor: 0.5,
            animation_steps: 20,
            animation_speed: MAX_ANIMATION_SPEED,
        }
    }
}

impl PanelParams {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.min_size <= 0 {
            return Err(LayoutError::InvalidMinSize(self.min_size));
        }
        if self.max_size < self.min_size {
            return Err(LayoutError::MaxBelowMin {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if !(0.0..=1.0).contains(&self.spacing_factor) {
            return Err(LayoutError::InvalidSpacingFactor(self.spacing_factor));
        }
        Ok(())
    }

    /// Interval between animation ticks.
    pub fn tick_interval(&self) -> Duration {
        let speed = self.animation_speed.min(MAX_ANIMATION_SPEED);
        Duration::from_millis(u64::from(32 - speed))
    }
}

/// Which items a panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelFeatures {
    pub show_application_menu: bool,
    pub menu_label: String,
    pub menu_icon: String,
    pub show_pager: bool,
    pub show_task_manager: bool,
    pub show_clock: bool,
    pub launchers: Vec<LauncherConfig>,
}

impl Default for PanelFeatures {
    fn default() -> Self {
        Self {
            show_application_menu: true,
            menu_label: "Applications".to_string(),
            menu_icon: "start-here-kde".to_string(),
            show_pager: false,
            show_task_manager: true,
            show_clock: false,
            launchers: Vec::new(),
        }
    }
}

/// Snapshot of one item for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub index: usize,
    pub kind: String,
    pub label: String,
    pub size: i32,
    /// Rectangle in panel window coordinates.
    pub rect: Rect,
    pub pinned: bool,
    pub task_count: usize,
    pub demands_attention: bool,
}

/// What the host should do with the tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipUpdate {
    Show(TooltipRequest),
    Hide,
}

/// A dock panel.
#[derive(Debug, Clone)]
pub struct DockPanel {
    params: PanelParams,
    features: PanelFeatures,
    desktop_count: u32,
    items: ItemCollection,
    solver: LayoutSolver,
    metrics: LayoutMetrics,
    animation: AnimationController,
    geometry: PanelGeometry,
    /// Set by pointer enter; the next qualifying move starts zooming in.
    entering: bool,
    /// Last pointer position in window coordinates.
    pointer: Point,
    layout_generation: u64,
}

impl DockPanel {
    /// Create a minimized panel with its menu, pager, launchers and clock.
    pub fn new(params: PanelParams, features: PanelFeatures, desktop_count: u32) -> Result<Self, LayoutError> {
        params.validate()?;
        let solver = solver_for(&params);
        let items = ItemCollection::new(params.edge.orientation(), params.min_size, params.max_size);
        let mut panel = Self {
            metrics: solver.metrics(&[]),
            animation: AnimationController::new(params.animation_steps),
            geometry: PanelGeometry::new(params.edge, params.screen),
            params,
            features,
            desktop_count,
            items,
            solver,
            entering: false,
            pointer: Point::default(),
            layout_generation: 0,
        };
        panel.init_items(&[], &crate::StaticRegistry::default());
        panel.minimize();
        Ok(panel)
    }

    /// Apply new parameters and rebuild every item.
    pub fn reload(
        &mut self,
        params: PanelParams,
        features: PanelFeatures,
        desktop_count: u32,
        tasks: &[TaskInfo],
        registry: &dyn ApplicationRegistry,
    ) -> Result<(), LayoutError> {
        params.validate()?;
        self.solver = solver_for(&params);
        self.items = ItemCollection::new(params.edge.orientation(), params.min_size, params.max_size);
        self.animation = AnimationController::new(params.animation_steps);
        self.geometry = PanelGeometry::new(params.edge, params.screen);
        self.params = params;
        self.features = features;
        self.desktop_count = desktop_count;
        self.init_items(tasks, registry);
        self.layout_generation += 1;
        self.minimize();
        Ok(())
    }

    /// Rebuild everything after the pager from scratch, e.g. when the
    /// current desktop changed.
    pub fn reload_tasks(&mut self, tasks: &[TaskInfo], registry: &dyn ApplicationRegistry) {
        if !self.features.show_task_manager {
            return;
        }
        self.items.truncate_to_prefix();
        self.push_launchers();
        for task in tasks {
            self.items.insert_task(task, registry);
        }
        self.push_clock();
        self.relayout_after_mutation(None);
    }

    fn init_items(&mut self, tasks: &[TaskInfo], registry: &dyn ApplicationRegistry) {
        self.items.clear();
        if self.features.show_application_menu {
            self.items.push(ItemKind::MenuTrigger {
                label: self.features.menu_label.clone(),
                icon: self.features.menu_icon.clone(),
            });
        }
        if self.features.show_pager {
            for desktop in 1..=self.desktop_count {
                self.items.push(ItemKind::PagerCell { desktop });
            }
        }
        self.push_launchers();
        if self.features.show_task_manager {
            for task in tasks {
                self.items.insert_task(task, registry);
            }
        }
        self.push_clock();
    }

    fn push_launchers(&mut self) {
        for launcher in &self.features.launchers {
            self.items.push_launcher(launcher);
        }
    }

    fn push_clock(&mut self) {
        if self.features.show_clock {
            self.items.push(ItemKind::Clock);
        }
    }

    pub fn params(&self) -> &PanelParams {
        &self.params
    }

    pub fn features(&self) -> &PanelFeatures {
        &self.features
    }

    pub fn desktop_count(&self) -> u32 {
        self.desktop_count
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    pub fn state(&self) -> PanelState {
        self.animation.state()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    /// Last pointer position in window coordinates.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Number of re-layouts caused by item-set changes and reloads.
    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    pub fn tick_interval(&self) -> Duration {
        self.params.tick_interval()
    }

    /// Panel window rectangle in screen coordinates.
    pub fn window_rect(&self) -> Rect {
        self.geometry.window()
    }

    /// Background rectangle in window coordinates.
    pub fn background_rect(&self) -> Rect {
        self.geometry.background_rect(self.animation.background())
    }

    /// Screen space to reserve for the panel's visibility mode.
    pub fn strut(&self) -> StrutRequest {
        self.geometry.strut(self.params.visibility, self.metrics.min_size())
    }

    /// Screen space to reserve while the application menu of `menu` size is
    /// open. `None` without a menu trigger.
    pub fn application_menu_strut(&self, menu: Size) -> Option<StrutRequest> {
        self.has_menu_trigger()
            .then(|| self.geometry.application_menu_strut(self.metrics.min_size(), menu))
    }

    pub fn application_menu_position(&self, menu: Size) -> Point {
        self.geometry.application_menu_position(self.metrics.min_size(), menu)
    }

    pub fn application_sub_menu_position(&self, menu: Size, submenu: Rect) -> Point {
        self.geometry
            .application_sub_menu_position(self.metrics.min_size(), menu, submenu)
    }

    fn has_menu_trigger(&self) -> bool {
        self.items
            .get(0)
            .is_some_and(|item| matches!(item.kind(), ItemKind::MenuTrigger { .. }))
    }

    /// Snapshot of every item.
    pub fn placements(&self) -> Vec<ItemPlacement> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemPlacement {
                index,
                kind: item.kind().name().to_string(),
                label: item.label(),
                size: item.size(),
                rect: item.rect(),
                pinned: item.is_pinned(),
                task_count: item.task_count(),
                demands_attention: item.program().is_some_and(|p| p.demands_attention()),
            })
            .collect()
    }

    fn auto_hide(&self) -> bool {
        self.params.visibility == PanelVisibility::AutoHide
    }

    fn along(&self, point: Point) -> i32 {
        match self.solver.orientation() {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    fn window_length(&self) -> i32 {
        let window = self.geometry.window();
        match self.solver.orientation() {
            Orientation::Horizontal => window.width,
            Orientation::Vertical => window.height,
        }
    }

    /// Offset that moves a rest frame into the maximized window, given the
    /// shift along the item axis.
    fn rest_offset(&self, along: i32) -> (i32, i32) {
        let m = &self.metrics;
        match self.params.edge {
            PanelEdge::Top => (along, m.min_thickness - m.item_distance),
            PanelEdge::Bottom => (along, m.max_thickness - m.min_thickness),
            PanelEdge::Left => (m.min_thickness - m.item_distance, along),
            PanelEdge::Right => (m.max_thickness - m.min_thickness, along),
        }
    }

    fn entering_offset(&self) -> (i32, i32) {
        self.rest_offset(self.metrics.bulge() / 2)
    }

    /// The minimized window's origin relative to the current window.
    fn leaving_offset(&self) -> (i32, i32) {
        let origin = self.geometry.origin_for(self.metrics.min_size());
        let window = self.geometry.window();
        let along = match self.solver.orientation() {
            Orientation::Horizontal => origin.x - window.x,
            Orientation::Vertical => origin.y - window.y,
        };
        self.rest_offset(along)
    }

    /// Rest layout in a minimized window.
    fn minimize(&mut self) {
        self.metrics = self.solver.metrics(self.items.as_slice());
        self.solver.rest_layout(self.items.as_mut_slice());
        let min = self.metrics.min_size();
        self.geometry.resize(min, min, true);
        self.animation.settle(PanelState::Minimized, self.metrics.rest_background());
    }

    /// The pointer entered the panel window.
    pub fn pointer_enter(&mut self) {
        self.entering = true;
    }

    /// The pointer moved to `point` in window coordinates.
    pub fn pointer_move(&mut self, point: Point) -> Option<TooltipUpdate> {
        if self.entering
            && !self.auto_hide()
            && self.geometry.near_inner_border(point, self.metrics.spacing)
        {
            return None;
        }
        if self.animation.is_animating() {
            return None;
        }

        let tooltip = (!self.entering).then(|| self.tooltip_at(point));
        self.zoom_to(point);
        tooltip
    }

    fn zoom_to(&mut self, point: Point) {
        let was_minimized = self.state() == PanelState::Minimized;
        let entering = self.entering && was_minimized;
        self.entering = false;

        let offset = self.entering_offset();
        if entering {
            for item in self.items.as_mut_slice() {
                item.start = item.frame().translated(offset.0, offset.1);
            }
        }

        let pointer = self.along(point);
        let window_length = self.window_length();
        self.solver
            .pointer_layout(self.items.as_mut_slice(), &self.metrics, pointer, window_length);
        self.geometry
            .resize(self.metrics.max_size(), self.metrics.min_size(), was_minimized);

        if entering {
            let total = self.animation.total_steps();
            for item in self.items.as_mut_slice() {
                item.set_animation_end_as_current();
                item.apply_animation_step(0, total);
            }
            self.animation
                .begin(Direction::Entering, self.metrics.min_size(), self.metrics.zoomed_background());
            self.pointer = match self.solver.orientation() {
                Orientation::Horizontal => Point::new(point.x + offset.0, point.y),
                Orientation::Vertical => Point::new(point.x, point.y + offset.1),
            };
        } else {
            self.animation
                .settle(PanelState::Maximized, self.metrics.zoomed_background());
            self.pointer = point;
        }
    }

    /// The pointer left the panel window.
    pub fn pointer_leave(&mut self) -> Option<TooltipUpdate> {
        self.entering = false;
        if self.state() == PanelState::Minimized {
            return None;
        }

        let background_start = self.animation.background();
        for item in self.items.as_mut_slice() {
            item.set_animation_start_as_current();
        }
        let (dx, dy) = self.leaving_offset();
        self.solver.rest_layout(self.items.as_mut_slice());
        let total = self.animation.total_steps();
        for item in self.items.as_mut_slice() {
            item.end = item.frame().translated(dx, dy);
            item.apply_animation_step(0, total);
        }
        self.animation
            .begin(Direction::Leaving, background_start, self.metrics.min_size());
        Some(TooltipUpdate::Hide)
    }

    /// Advance a running transition by one step.
    pub fn tick(&mut self) -> Option<TooltipUpdate> {
        if !self.animation.is_animating() {
            return None;
        }
        let finished = self.animation.advance();
        let (step, total) = (self.animation.step(), self.animation.total_steps());
        for item in self.items.as_mut_slice() {
            item.apply_animation_step(step, total);
        }
        finished.and_then(|direction| self.finish_animation(direction))
    }

    fn finish_animation(&mut self, direction: Direction) -> Option<TooltipUpdate> {
        match direction {
            Direction::Leaving => {
                self.minimize();
                None
            }
            Direction::Entering => {
                self.animation
                    .settle(PanelState::Maximized, self.metrics.zoomed_background());
                Some(self.tooltip_at(self.pointer))
            }
        }
    }

    /// Tooltip for the item under a window-relative point.
    pub fn tooltip_at(&self, point: Point) -> TooltipUpdate {
        let Some(index) = self.hit_test(point) else {
            return TooltipUpdate::Hide;
        };
        let Some(item) = self.items.get(index) else {
            return TooltipUpdate::Hide;
        };
        TooltipUpdate::Show(TooltipRequest {
            item_index: index,
            label: item.label(),
            edge: self.params.edge,
            item_rect: self.geometry.to_screen(item.rect()),
            panel_rect: self.geometry.window(),
            max_size: self.metrics.max_size(),
        })
    }

    /// Index of the item under a window-relative point.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.solver.hit_test(self.items.as_slice(), self.along(point))
    }

    /// The item a click at `point` activates. Clicks during a transition are
    /// ignored.
    pub fn click(&self, point: Point) -> Option<&DockItem> {
        if self.animation.is_animating() {
            return None;
        }
        self.hit_test(point).and_then(|index| self.items.get(index))
    }

    /// Add a task window.
    pub fn insert_task(&mut self, task: &TaskInfo, registry: &dyn ApplicationRegistry) -> InsertOutcome {
        let outcome = self.items.insert_task(task, registry);
        if let InsertOutcome::Created(index) = outcome {
            self.relayout_after_mutation(Some(index));
        }
        outcome
    }

    /// Remove a task window.
    pub fn remove_task(&mut self, window_id: WindowId) -> RemoveOutcome {
        let outcome = self.items.remove_task(window_id);
        if let RemoveOutcome::Removed(_) = outcome {
            self.relayout_after_mutation(None);
        }
        outcome
    }

    /// Refresh a task's title and attention state.
    pub fn update_task(&mut self, task: &TaskInfo) -> bool {
        self.items.update_task(task)
    }

    /// Remove one stale item, if any.
    pub fn prune_invalid(&mut self) -> bool {
        let removed = self.items.prune_invalid();
        if removed {
            self.relayout_after_mutation(None);
        }
        removed
    }

    /// Pin or unpin the program at `index`. An unpinned program without
    /// tasks disappears.
    pub fn set_pinned(&mut self, index: usize, pinned: bool) -> Result<(), LayoutError> {
        self.items.set_pinned(index, pinned)?;
        if !pinned {
            self.prune_invalid();
        }
        Ok(())
    }

    fn relayout_after_mutation(&mut self, inserted: Option<usize>) {
        self.layout_generation += 1;
        // `tick` settles a transition on its last step, so a mutation never
        // sees a finished but unsettled animation.
        debug_assert!(!self.animation.is_finished());
        self.metrics = self.solver.metrics(self.items.as_slice());

        match self.animation.state() {
            PanelState::Minimized => self.minimize(),
            PanelState::Maximized => {
                let m = self.metrics;
                self.geometry.resize(m.max_size(), m.min_size(), false);
                self.animation.set_background(m.zoomed_background());
                let prefix = self.items.pinned_prefix_len();
                let pointer = self.along(self.pointer);
                self.solver
                    .partial_layout(self.items.as_mut_slice(), &m, prefix, pointer, m.max_length);
            }
            PanelState::Entering | PanelState::Leaving => self.retarget(inserted),
        }
    }

    /// Recompute transition ends after a mutation, keeping every item where
    /// it currently is.
    fn retarget(&mut self, inserted: Option<usize>) {
        let Some(direction) = self.animation.direction() else {
            return;
        };
        let m = self.metrics;
        let (step, total) = (self.animation.step(), self.animation.total_steps());
        let current: Vec<ItemFrame> = self.items.iter().map(DockItem::frame).collect();
        let (dx, dy) = match direction {
            Direction::Entering => (0, 0),
            Direction::Leaving => self.leaving_offset(),
        };
        let pointer = self.along(self.pointer);

        let items = self.items.as_mut_slice();
        self.solver.rest_layout(items);
        let background_end = match direction {
            Direction::Entering => {
                self.solver.pointer_layout(items, &m, pointer, m.max_length);
                m.zoomed_background()
            }
            Direction::Leaving => m.min_size(),
        };

        for (i, item) in items.iter_mut().enumerate() {
            let end = item.frame().translated(dx, dy);
            item.end = end;
            if Some(i) == inserted {
                item.start = end;
                item.set_frame(end);
            } else {
                let now = current[i];
                item.start = ItemFrame::new(
                    retarget_start(now.size, end.size, step, total),
                    retarget_start(now.left, end.left, step, total),
                    retarget_start(now.top, end.top, step, total),
                );
                item.set_frame(now);
            }
        }
        self.animation.retarget_background(background_end);
        self.geometry.resize(m.max_size(), m.min_size(), false);
    }
}

fn solver_for(params: &PanelParams) -> LayoutSolver {
    LayoutSolver::new(
        params.edge,
        params.min_size,
        params.max_size,
        params.spacing_factor,
        params.visibility == PanelVisibility::AutoHide,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticRegistry;

    fn launchers(count: usize) -> Vec<LauncherConfig> {
        (0..count)
            .map(|i| LauncherConfig::new(format!("app{}", i), "icon", format!("app{}", i)))
            .collect()
    }

    fn features(launcher_count: usize) -> PanelFeatures {
        PanelFeatures {
            show_application_menu: false,
            launchers: launchers(launcher_count),
            ..PanelFeatures::default()
        }
    }

    fn panel(launcher_count: usize) -> DockPanel {
        DockPanel::new(PanelParams::default(), features(launcher_count), 1).unwrap()
    }

    fn run_to_end(panel: &mut DockPanel) -> Option<TooltipUpdate> {
        let mut last = None;
        for _ in 0..panel.animation().total_steps() {
            last = panel.tick();
        }
        last
    }

    fn maximize(panel: &mut DockPanel, point: Point) -> Option<TooltipUpdate> {
        panel.pointer_enter();
        panel.pointer_move(point);
        assert_eq!(panel.state(), PanelState::Entering);
        run_to_end(panel)
    }

    #[test]
    fn test_new_panel_is_minimized_at_rest() {
        let panel = panel(5);
        assert_eq!(panel.state(), PanelState::Minimized);
        assert_eq!(panel.items().len(), 5);
        assert_eq!(panel.window_rect(), Rect::new(780, 1008, 360, 72));
        assert_eq!(panel.background_rect(), Rect::new(0, 0, 360, 72));
        let first = panel.items().get(0).unwrap();
        assert_eq!(first.frame(), ItemFrame::new(48, 12, 12));
    }

    #[test]
    fn test_params_validation() {
        let bad = PanelParams {
            min_size: 0,
            ..PanelParams::default()
        };
        assert_eq!(bad.validate(), Err(LayoutError::InvalidMinSize(0)));
        let bad = PanelParams {
            max_size: 20,
            ..PanelParams::default()
        };
        assert_eq!(bad.validate(), Err(LayoutError::MaxBelowMin { min: 48, max: 20 }));
        let bad = PanelParams {
            spacing_factor: 1.5,
            ..PanelParams::default()
        };
        assert!(matches!(bad.validate(), Err(LayoutError::InvalidSpacingFactor(_))));
        assert!(DockPanel::new(bad, features(1), 1).is_err());
    }

    #[test]
    fn test_tick_interval() {
        assert_eq!(PanelParams::default().tick_interval(), Duration::from_millis(16));
        let slow = PanelParams {
            animation_speed: 0,
            ..PanelParams::default()
        };
        assert_eq!(slow.tick_interval(), Duration::from_millis(32));
        let clamped = PanelParams {
            animation_speed: 99,
            ..PanelParams::default()
        };
        assert_eq!(clamped.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_enter_zooms_in_and_shows_tooltip() {
        let mut panel = panel(5);
        let update = maximize(&mut panel, Point::new(180, 40));
        assert_eq!(panel.state(), PanelState::Maximized);
        assert_eq!(panel.items().get(2).unwrap().size(), 128);
        for item in panel.items().iter() {
            assert_eq!(item.frame(), item.animation_end());
        }
        match update {
            Some(TooltipUpdate::Show(request)) => {
                assert_eq!(request.item_index, 2);
                assert_eq!(request.label, "app2");
            }
            other => panic!("expected a tooltip, got {:?}", other),
        }
        let m = *panel.metrics();
        assert_eq!(panel.window_rect().width, m.max_length);
        assert_eq!(panel.window_rect().height, m.max_thickness);
        assert_eq!(panel.background_rect().height, m.item_distance);
    }

    #[test]
    fn test_entering_starts_from_translated_rest_layout() {
        let mut panel = panel(5);
        panel.pointer_enter();
        panel.pointer_move(Point::new(180, 40));
        let m = *panel.metrics();
        let first = panel.items().get(0).unwrap();
        let expected = ItemFrame::new(48, 12 + m.bulge() / 2, 12 + (m.max_thickness - m.min_thickness));
        assert_eq!(first.animation_start(), expected);
        assert_eq!(first.frame(), expected);
    }

    #[test]
    fn test_move_near_inner_border_is_ignored() {
        let mut panel = panel(5);
        panel.pointer_enter();
        assert_eq!(panel.pointer_move(Point::new(180, 5)), None);
        assert_eq!(panel.state(), PanelState::Minimized);
        panel.pointer_move(Point::new(180, 30));
        assert_eq!(panel.state(), PanelState::Entering);
    }

    #[test]
    fn test_moves_during_animation_are_ignored() {
        let mut panel = panel(5);
        panel.pointer_enter();
        panel.pointer_move(Point::new(180, 40));
        panel.tick();
        let frames: Vec<_> = panel.items().iter().map(DockItem::frame).collect();
        assert_eq!(panel.pointer_move(Point::new(20, 40)), None);
        let after: Vec<_> = panel.items().iter().map(DockItem::frame).collect();
        assert_eq!(frames, after);
        assert!(panel.click(Point::new(20, 40)).is_none());
    }

    #[test]
    fn test_move_while_maximized_updates_tooltip() {
        let mut panel = panel(5);
        maximize(&mut panel, Point::new(180, 40));
        let update = panel.pointer_move(Point::new(5, 100));
        assert_eq!(update, Some(TooltipUpdate::Hide));
        assert_eq!(panel.state(), PanelState::Maximized);
        assert_eq!(panel.pointer(), Point::new(5, 100));
    }

    #[test]
    fn test_leave_returns_to_rest() {
        let mut panel = panel(5);
        maximize(&mut panel, Point::new(180, 40));
        assert_eq!(panel.pointer_leave(), Some(TooltipUpdate::Hide));
        assert_eq!(panel.state(), PanelState::Leaving);
        assert_eq!(run_to_end(&mut panel), None);
        assert_eq!(panel.state(), PanelState::Minimized);
        assert_eq!(panel.window_rect(), Rect::new(780, 1008, 360, 72));
        assert_eq!(panel.items().get(0).unwrap().frame(), ItemFrame::new(48, 12, 12));
    }

    #[test]
    fn test_leave_targets_minimized_window_position() {
        let mut panel = panel(5);
        maximize(&mut panel, Point::new(180, 40));
        let window_x = panel.window_rect().x;
        panel.pointer_leave();
        let m = *panel.metrics();
        let first = panel.items().get(0).unwrap();
        // Rest frame shifted to where the minimized window will sit.
        assert_eq!(
            first.animation_end(),
            ItemFrame::new(48, 12 + 780 - window_x, 12 + m.max_thickness - m.min_thickness)
        );
        assert_eq!(first.frame(), first.animation_start());
    }

    fn vertical_panel(edge: PanelEdge) -> DockPanel {
        let params = PanelParams {
            edge,
            ..PanelParams::default()
        };
        DockPanel::new(params, features(5), 1).unwrap()
    }

    #[test]
    fn test_vertical_panels_enter_and_leave() {
        for edge in [PanelEdge::Left, PanelEdge::Right] {
            let mut panel = vertical_panel(edge);
            let rest = panel.window_rect();
            let m = *panel.metrics();
            assert_eq!(rest.height, m.min_length);
            assert_eq!(rest.y, (1080 - m.min_length) / 2);
            let rest_frame = panel.items().get(0).unwrap().frame();

            // Stay clear of the inner border on either side.
            let x = match edge {
                PanelEdge::Left => 10,
                _ => rest.width - 10,
            };
            panel.pointer_enter();
            panel.pointer_move(Point::new(x, rest.height / 2));
            assert_eq!(panel.state(), PanelState::Entering, "{:?}", edge);
            let dx = match edge {
                PanelEdge::Left => m.min_thickness - m.item_distance,
                _ => m.max_thickness - m.min_thickness,
            };
            assert_eq!(
                panel.items().get(0).unwrap().animation_start(),
                rest_frame.translated(dx, m.bulge() / 2),
                "{:?}",
                edge
            );

            let update = run_to_end(&mut panel);
            assert_eq!(panel.state(), PanelState::Maximized);
            assert!(matches!(update, Some(TooltipUpdate::Show(_))), "{:?}", edge);
            let zoomed = panel.window_rect();
            assert_eq!(zoomed.height, m.max_length);
            assert_eq!(zoomed.width, m.max_thickness);
            match edge {
                PanelEdge::Left => assert_eq!(zoomed.x, 0),
                _ => assert_eq!(zoomed.right(), 1920),
            }
            for pair in panel.items().as_slice().windows(2) {
                assert!(pair[0].top() < pair[1].top(), "{:?}", edge);
            }

            assert_eq!(panel.pointer_leave(), Some(TooltipUpdate::Hide));
            run_to_end(&mut panel);
            assert_eq!(panel.state(), PanelState::Minimized);
            assert_eq!(panel.window_rect(), rest);
            assert_eq!(panel.items().get(0).unwrap().frame(), rest_frame);
        }
    }

    #[test]
    fn test_leave_while_minimized_is_noop() {
        let mut panel = panel(3);
        panel.pointer_enter();
        assert_eq!(panel.pointer_leave(), None);
        assert_eq!(panel.state(), PanelState::Minimized);
        assert_eq!(panel.tick(), None);
    }

    #[test]
    fn test_remove_task_relayouts_once() {
        let mut panel = panel(2);
        let registry = StaticRegistry::default();
        let outcome = panel.insert_task(&TaskInfo::new(7, "zathura", "zathura"), &registry);
        assert_eq!(outcome, InsertOutcome::Created(2));
        assert_eq!(panel.metrics().item_count, 3);

        let generation = panel.layout_generation();
        assert_eq!(panel.remove_task(7), RemoveOutcome::Removed(2));
        assert_eq!(panel.layout_generation(), generation + 1);
        assert_eq!(panel.metrics().item_count, 2);
        assert_eq!(panel.window_rect().width, 2 * 72);

        assert_eq!(panel.remove_task(7), RemoveOutcome::NotFound);
        assert_eq!(panel.layout_generation(), generation + 1);
    }

    #[test]
    fn test_attach_does_not_relayout() {
        let mut panel = panel(2);
        let generation = panel.layout_generation();
        let outcome = panel.insert_task(&TaskInfo::new(1, "app0", "/usr/bin/app0"), &StaticRegistry::default());
        assert_eq!(outcome, InsertOutcome::Attached(0));
        assert_eq!(panel.layout_generation(), generation);
    }

    #[test]
    fn test_insert_while_maximized_keeps_prefix() {
        let features = PanelFeatures {
            show_application_menu: true,
            show_pager: true,
            launchers: launchers(2),
            ..PanelFeatures::default()
        };
        let mut panel = DockPanel::new(PanelParams::default(), features, 2).unwrap();
        assert_eq!(panel.items().pinned_prefix_len(), 3);
        maximize(&mut panel, Point::new(200, 40));
        let prefix: Vec<_> = panel.items().iter().take(3).map(DockItem::frame).collect();

        panel.insert_task(&TaskInfo::new(9, "zed", "zed"), &StaticRegistry::default());
        assert_eq!(panel.state(), PanelState::Maximized);
        let kept: Vec<_> = panel.items().iter().take(3).map(DockItem::frame).collect();
        assert_eq!(prefix, kept);
        let m = *panel.metrics();
        assert_eq!(m.item_count, 6);
        assert_eq!(panel.window_rect().width, m.max_length);
        assert_eq!(panel.background_rect().width, m.max_length);
    }

    #[test]
    fn test_insert_during_entering_converges() {
        let mut panel = panel(5);
        panel.pointer_enter();
        panel.pointer_move(Point::new(180, 40));
        for _ in 0..5 {
            panel.tick();
        }
        let before: Vec<_> = panel.items().iter().map(DockItem::frame).collect();
        panel.insert_task(&TaskInfo::new(3, "zed", "zed"), &StaticRegistry::default());
        assert_eq!(panel.state(), PanelState::Entering);
        assert_eq!(panel.animation().step(), 5);

        // Existing items did not jump; the new one sits at its end frame.
        let after: Vec<_> = panel.items().iter().take(5).map(DockItem::frame).collect();
        assert_eq!(before, after);
        let new_item = panel.items().get(5).unwrap();
        assert_eq!(new_item.animation_start(), new_item.animation_end());

        run_to_end(&mut panel);
        assert_eq!(panel.state(), PanelState::Maximized);
        for item in panel.items().iter() {
            assert_eq!(item.frame(), item.animation_end());
        }
        assert_eq!(panel.background_rect().width, panel.metrics().max_length);
    }

    #[test]
    fn test_insert_on_last_tick_relayouts_settled_panel() {
        let mut panel = panel(5);
        panel.pointer_enter();
        panel.pointer_move(Point::new(180, 40));
        let total = panel.animation().total_steps();
        for _ in 1..total {
            panel.tick();
        }
        assert_eq!(panel.state(), PanelState::Entering);
        panel.tick();
        assert_eq!(panel.state(), PanelState::Maximized);

        panel.insert_task(&TaskInfo::new(4, "zed", "zed"), &StaticRegistry::default());
        assert_eq!(panel.state(), PanelState::Maximized);
        assert!(!panel.is_animating());
        assert_eq!(panel.items().len(), 6);
        assert_eq!(panel.window_rect().width, panel.metrics().max_length);
        assert_eq!(panel.tick(), None);
    }

    #[test]
    fn test_insert_one_step_before_end_converges_on_next_tick() {
        let mut panel = panel(5);
        panel.pointer_enter();
        panel.pointer_move(Point::new(180, 40));
        let total = panel.animation().total_steps();
        for _ in 1..total {
            panel.tick();
        }
        panel.insert_task(&TaskInfo::new(4, "zed", "zed"), &StaticRegistry::default());
        assert_eq!(panel.state(), PanelState::Entering);
        panel.tick();
        assert_eq!(panel.state(), PanelState::Maximized);
        for item in panel.items().iter() {
            assert_eq!(item.frame(), item.animation_end());
        }
    }

    #[test]
    fn test_remove_during_leaving_converges_to_rest() {
        let mut panel = panel(4);
        panel.insert_task(&TaskInfo::new(1, "zed", "zed"), &StaticRegistry::default());
        maximize(&mut panel, Point::new(150, 40));
        panel.pointer_leave();
        for _ in 0..7 {
            panel.tick();
        }
        panel.remove_task(1);
        assert_eq!(panel.state(), PanelState::Leaving);
        run_to_end(&mut panel);
        assert_eq!(panel.state(), PanelState::Minimized);
        assert_eq!(panel.window_rect().width, 4 * 72);
    }

    #[test]
    fn test_unpin_without_tasks_removes_item() {
        let mut panel = panel(3);
        assert_eq!(panel.set_pinned(1, false), Ok(()));
        assert_eq!(panel.items().len(), 2);
        assert_eq!(panel.items().get(1).unwrap().label(), "app2");
        assert_eq!(panel.set_pinned(9, true), Err(LayoutError::ItemOutOfBounds(9, 2)));
    }

    #[test]
    fn test_reload_tasks_rebuilds_after_prefix() {
        let features = PanelFeatures {
            show_pager: true,
            show_clock: true,
            launchers: launchers(1),
            ..PanelFeatures::default()
        };
        let mut panel = DockPanel::new(PanelParams::default(), features, 3).unwrap();
        let registry = StaticRegistry::default();
        panel.insert_task(&TaskInfo::new(1, "old", "old"), &registry);
        panel.reload_tasks(&[TaskInfo::new(2, "new", "new")], &registry);
        let labels: Vec<_> = panel.placements().into_iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            ["Applications", "Desktop 1", "Desktop 2", "Desktop 3", "app0", "new", "Clock"]
        );
    }

    #[test]
    fn test_reload_applies_new_params() {
        let mut panel = panel(3);
        maximize(&mut panel, Point::new(100, 40));
        let params = PanelParams {
            edge: PanelEdge::Left,
            min_size: 32,
            max_size: 64,
            spacing_factor: 0.25,
            ..PanelParams::default()
        };
        panel
            .reload(params, features(3), 1, &[], &StaticRegistry::default())
            .unwrap();
        assert_eq!(panel.state(), PanelState::Minimized);
        // 3 * (32 + 8)
        assert_eq!(panel.window_rect(), Rect::new(0, (1080 - 120) / 2, 40, 120));
    }

    #[test]
    fn test_struts() {
        let panel = DockPanel::new(PanelParams::default(), PanelFeatures::default(), 1).unwrap();
        assert_eq!(panel.strut().thickness, 72);
        let menu = Size::new(300, 500);
        assert_eq!(panel.application_menu_strut(menu).map(|s| s.thickness), Some(572));
        assert_eq!(panel.application_menu_position(menu), Point::new((1920 - 72) / 2, 1008 - 500));

        let auto_hide = PanelParams {
            visibility: PanelVisibility::AutoHide,
            ..PanelParams::default()
        };
        let panel = DockPanel::new(auto_hide, features(2), 1).unwrap();
        assert_eq!(panel.strut().thickness, 1);
        assert_eq!(panel.window_rect().height, 1);
        assert_eq!(panel.application_menu_strut(menu), None);
    }

    #[test]
    fn test_auto_hide_ignores_border_guard() {
        let params = PanelParams {
            visibility: PanelVisibility::AutoHide,
            ..PanelParams::default()
        };
        let mut panel = DockPanel::new(params, features(3), 1).unwrap();
        panel.pointer_enter();
        panel.pointer_move(Point::new(100, 0));
        assert_eq!(panel.state(), PanelState::Entering);
    }

    #[test]
    fn test_click_hits_item() {
        let mut panel = panel(3);
        maximize(&mut panel, Point::new(100, 40));
        let hit = panel.click(panel.pointer()).map(DockItem::label);
        assert!(hit.is_some());
        assert!(panel.click(Point::new(0, 40)).is_none());
    }

    #[test]
    fn test_item_leading_edge_hits_that_item() {
        for spacing_factor in [0.5, 0.0] {
            let params = PanelParams {
                spacing_factor,
                ..PanelParams::default()
            };
            let panel = DockPanel::new(params, features(3), 1).unwrap();
            for placement in panel.placements() {
                let rect = placement.rect;
                assert!(rect.contains(rect.x, rect.y));
                assert_eq!(
                    panel.hit_test(Point::new(rect.x, rect.y + 1)),
                    Some(placement.index),
                    "spacing {} item {}",
                    spacing_factor,
                    placement.index
                );
            }
        }
    }

    #[test]
    fn test_placements_snapshot() {
        let panel = panel(2);
        let placements = panel.placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].kind, "launcher");
        assert_eq!(placements[1].rect, Rect::new(84, 12, 48, 48));
        assert!(placements[1].pinned);
    }
}
