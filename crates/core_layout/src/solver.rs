//! Layout solver.
//!
//! Computes item sizes and positions along the magnification axis, for the
//! rest (minimized) state and for a pointer position, plus the panel
//! dimensions both states need.

use crate::item::DockItem;
use crate::parabolic::ParabolicProfile;
use crate::{Orientation, PanelEdge, Size};

/// Thickness of an auto-hidden panel while idle.
pub const AUTO_HIDE_THICKNESS: i32 = 1;

/// Panel dimensions derived from the item set and appearance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub orientation: Orientation,
    pub item_count: usize,
    pub spacing: i32,
    /// Panel length along the magnification axis at rest.
    pub min_length: i32,
    /// Panel length along the magnification axis when zoomed.
    pub max_length: i32,
    /// Panel thickness at rest (1 px when auto-hidden).
    pub min_thickness: i32,
    /// Panel thickness when zoomed.
    pub max_thickness: i32,
    /// Distance between rest centers of neighbors, also the visible rest
    /// thickness.
    pub item_distance: i32,
}

impl LayoutMetrics {
    pub fn leading_margin(&self) -> i32 {
        self.spacing / 2
    }

    pub fn trailing_margin(&self) -> i32 {
        self.spacing - self.spacing / 2
    }

    /// Growth of the panel length when zoomed.
    pub fn bulge(&self) -> i32 {
        self.max_length - self.min_length
    }

    fn size_of(&self, length: i32, thickness: i32) -> Size {
        match self.orientation {
            Orientation::Horizontal => Size::new(length, thickness),
            Orientation::Vertical => Size::new(thickness, length),
        }
    }

    /// Window size while minimized.
    pub fn min_size(&self) -> Size {
        self.size_of(self.min_length, self.min_thickness)
    }

    /// Window size while maximized.
    pub fn max_size(&self) -> Size {
        self.size_of(self.max_length, self.max_thickness)
    }

    /// Background size at rest, with the visible thickness even when the
    /// window itself is auto-hidden.
    pub fn rest_background(&self) -> Size {
        self.size_of(self.min_length, self.item_distance)
    }

    /// Background size when zoomed.
    pub fn zoomed_background(&self) -> Size {
        self.size_of(self.max_length, self.item_distance)
    }
}

/// Computes layouts for one panel configuration.
#[derive(Debug, Clone)]
pub struct LayoutSolver {
    edge: PanelEdge,
    min_size: i32,
    max_size: i32,
    spacing: i32,
    auto_hide: bool,
    profile: ParabolicProfile,
}

impl LayoutSolver {
    pub fn new(edge: PanelEdge, min_size: i32, max_size: i32, spacing_factor: f32, auto_hide: bool) -> Self {
        let spacing = (min_size as f32 * spacing_factor) as i32;
        Self {
            edge,
            min_size,
            max_size,
            spacing,
            auto_hide,
            profile: ParabolicProfile::from_spacing(min_size, max_size, spacing),
        }
    }

    pub fn edge(&self) -> PanelEdge {
        self.edge
    }

    pub fn orientation(&self) -> Orientation {
        self.edge.orientation()
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn profile(&self) -> &ParabolicProfile {
        &self.profile
    }

    /// Panel dimensions for the given items.
    pub fn metrics(&self, items: &[DockItem]) -> LayoutMetrics {
        let gaps = items.len().saturating_sub(1) as i32 * self.spacing;
        let min_length = items.iter().map(DockItem::min_length).sum::<i32>() + gaps + self.spacing;
        let item_distance = self.min_size + self.spacing;

        LayoutMetrics {
            orientation: self.orientation(),
            item_count: items.len(),
            spacing: self.spacing,
            min_length,
            max_length: min_length + self.bulge(items.len()),
            min_thickness: if self.auto_hide { AUTO_HIDE_THICKNESS } else { item_distance },
            max_thickness: self.spacing + self.max_size,
            item_distance,
        }
    }

    /// Magnification gain with the pointer on an item center: the item
    /// itself plus up to two neighbors on each side.
    fn bulge(&self, item_count: usize) -> i32 {
        let d = self.min_size + self.spacing;
        let mut remaining = item_count;
        let mut total = 0;
        for (distance, count) in [(0, 1), (d, 2), (2 * d, 2)] {
            let taken = count.min(remaining);
            total += taken as i32 * (self.profile.size(distance) - self.min_size);
            remaining -= taken;
        }
        total
    }

    fn set_leading(&self, item: &mut DockItem, value: i32) {
        match self.orientation() {
            Orientation::Horizontal => item.left = value,
            Orientation::Vertical => item.top = value,
        }
    }

    /// Align the item's cross-axis coordinate with the anchored edge.
    fn anchor_cross(&self, item: &mut DockItem) {
        let margin = self.spacing / 2;
        match self.edge {
            PanelEdge::Top => item.top = margin,
            PanelEdge::Bottom => item.top = margin + self.max_size - item.height(),
            PanelEdge::Left => item.left = margin,
            PanelEdge::Right => item.left = margin + self.max_size - item.width(),
        }
    }

    /// Minimum sizes, contiguous positions and rest centers.
    pub fn rest_layout(&self, items: &mut [DockItem]) {
        let margin = self.spacing / 2;
        let mut leading = margin;
        for item in items.iter_mut() {
            item.size = item.min_size();
            item.left = margin;
            item.top = margin;
            self.set_leading(item, leading);
            item.min_center = leading + item.min_length() / 2;
            leading += item.min_length() + self.spacing;
        }
    }

    /// Recompute rest centers from `from` onward without touching sizes or
    /// positions.
    pub fn update_rest_centers(&self, items: &mut [DockItem], from: usize) {
        let mut leading = self.spacing / 2;
        for (i, item) in items.iter_mut().enumerate() {
            if i >= from {
                item.min_center = leading + item.min_length() / 2;
            }
            leading += item.min_length() + self.spacing;
        }
    }

    /// Map a pointer coordinate in a window of `window_length` onto the rest
    /// layout's axis.
    pub fn project(&self, metrics: &LayoutMetrics, pointer: i32, window_length: i32) -> i32 {
        pointer - (window_length - metrics.min_length) / 2
    }

    /// Magnified layout for a pointer at `pointer` along the axis of a
    /// window `window_length` long. Rest centers must be current.
    pub fn pointer_layout(&self, items: &mut [DockItem], metrics: &LayoutMetrics, pointer: i32, window_length: i32) {
        self.magnify(items, metrics, 0, pointer, window_length);
    }

    /// Re-layout after the item set changed while zoomed. Items before
    /// `prefix` keep their frames.
    pub fn partial_layout(
        &self,
        items: &mut [DockItem],
        metrics: &LayoutMetrics,
        prefix: usize,
        pointer: i32,
        window_length: i32,
    ) {
        self.update_rest_centers(items, prefix);
        self.magnify(items, metrics, prefix, pointer, window_length);
    }

    fn magnify(&self, items: &mut [DockItem], metrics: &LayoutMetrics, from: usize, pointer: i32, window_length: i32) {
        let n = items.len();
        if from >= n {
            return;
        }
        let projected = self.project(metrics, pointer, window_length);
        let spacing = self.spacing;

        // Forward pass with magnified sizes.
        let mut first = None;
        let mut last = None;
        for i in from..n {
            let distance = (items[i].min_center - projected).abs();
            if self.profile.affects(distance) {
                first.get_or_insert(i);
                last = Some(i);
            }
            let leading = match i {
                0 => spacing / 2,
                _ => items[i - 1].leading() + items[i - 1].length() + spacing,
            };
            let item = &mut items[i];
            item.size = self.profile.size(distance);
            self.anchor_cross(item);
            self.set_leading(item, leading);
        }

        // Items past the affected window hug the far edge.
        let anchored_from = match last {
            Some(last) => last + 1,
            None => from + items[from..].iter().take_while(|item| item.min_center <= projected).count(),
        };
        let mut next_leading = metrics.max_length - metrics.trailing_margin() + spacing;
        for i in (anchored_from..n).rev() {
            let leading = next_leading - items[i].min_length() - spacing;
            self.set_leading(&mut items[i], leading);
            next_leading = leading;
        }

        // Window touching the start: pack affected items against the first
        // anchored one instead of the leading margin.
        if from == 0 {
            if let (Some(0), Some(last)) = (first, last) {
                if last + 1 < n {
                    for i in (0..=last).rev() {
                        let leading = items[i + 1].leading() - items[i].length() - spacing;
                        self.set_leading(&mut items[i], leading);
                    }
                }
            }
        }
    }

    /// Index of the item under `coordinate` along the axis.
    pub fn hit_test(&self, items: &[DockItem], coordinate: i32) -> Option<usize> {
        let index = items
            .iter()
            .take_while(|item| item.leading() <= coordinate)
            .count()
            .checked_sub(1)?;
        let item = &items[index];
        (coordinate < item.leading() + item.length() + self.spacing).then_some(index)
    }
}
