//! Edge-aware coordinates for the panel window, its background, tooltips,
//! menus and reserved screen space.

use crate::{PanelEdge, PanelVisibility, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Gap between a maximized panel and its tooltip.
pub const TOOLTIP_SPACING: i32 = 10;

/// Screen space reserved along one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrutRequest {
    pub edge: PanelEdge,
    /// Reserved thickness in pixels; 0 releases the reservation.
    pub thickness: i32,
    /// Start of the covered span along the edge, in screen coordinates.
    pub span_start: i32,
    /// End of the covered span (exclusive).
    pub span_end: i32,
}

/// A tooltip to show next to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipRequest {
    pub item_index: usize,
    pub label: String,
    pub edge: PanelEdge,
    /// Item rectangle in screen coordinates.
    pub item_rect: Rect,
    /// Panel window rectangle in screen coordinates.
    pub panel_rect: Rect,
    /// Size of the maximized panel.
    pub max_size: Size,
}

impl TooltipRequest {
    /// Top-left corner for a tooltip of the given rendered size.
    pub fn position(&self, tooltip: Size) -> Point {
        let panel = self.panel_rect;
        let item = self.item_rect;
        let centered_x = item.x - tooltip.width / 2 + item.width / 2;
        let centered_y = item.y - tooltip.height / 2 + item.height / 2;
        match self.edge {
            PanelEdge::Top => Point::new(centered_x, panel.y + self.max_size.height + TOOLTIP_SPACING),
            PanelEdge::Bottom => Point::new(centered_x, panel.y - tooltip.height),
            PanelEdge::Left => Point::new(panel.x + self.max_size.width + TOOLTIP_SPACING, centered_y),
            PanelEdge::Right => Point::new(panel.x - tooltip.width - TOOLTIP_SPACING, centered_y),
        }
    }
}

/// Window placement for one panel on one screen.
#[derive(Debug, Clone)]
pub struct PanelGeometry {
    edge: PanelEdge,
    screen: Rect,
    window: Rect,
    minimized_origin: Point,
}

impl PanelGeometry {
    pub fn new(edge: PanelEdge, screen: Rect) -> Self {
        Self {
            edge,
            screen,
            window: Rect::new(screen.x, screen.y, 0, 0),
            minimized_origin: Point::new(screen.x, screen.y),
        }
    }

    pub fn edge(&self) -> PanelEdge {
        self.edge
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Current window rectangle in screen coordinates.
    pub fn window(&self) -> Rect {
        self.window
    }

    /// Window origin last cached while at the minimized size.
    pub fn minimized_origin(&self) -> Point {
        self.minimized_origin
    }

    /// Origin that centers a window of `size` on the anchored edge.
    pub fn origin_for(&self, size: Size) -> Point {
        let screen = self.screen;
        let (x, y) = match self.edge {
            PanelEdge::Top => ((screen.width - size.width) / 2, 0),
            PanelEdge::Bottom => ((screen.width - size.width) / 2, screen.height - size.height),
            PanelEdge::Left => (0, (screen.height - size.height) / 2),
            PanelEdge::Right => (screen.width - size.width, (screen.height - size.height) / 2),
        };
        Point::new(x + screen.x, y + screen.y)
    }

    /// Resize the window. With `reposition` the window is re-centered on its
    /// edge; otherwise it keeps its origin. The origin for `minimized` is
    /// cached whenever the window takes that size.
    pub fn resize(&mut self, size: Size, minimized: Size, reposition: bool) {
        let origin = self.origin_for(size);
        if reposition {
            self.window = Rect::new(origin.x, origin.y, size.width, size.height);
        } else {
            self.window.width = size.width;
            self.window.height = size.height;
        }
        if size == minimized {
            self.minimized_origin = origin;
        }
    }

    /// Background rectangle in window coordinates: centered along the item
    /// axis and flush with the anchored edge.
    pub fn background_rect(&self, background: Size) -> Rect {
        let window = self.window;
        match self.edge {
            PanelEdge::Top => Rect::new((window.width - background.width) / 2, 0, background.width, background.height),
            PanelEdge::Bottom => Rect::new(
                (window.width - background.width) / 2,
                window.height - background.height,
                background.width,
                background.height,
            ),
            PanelEdge::Left => Rect::new(0, (window.height - background.height) / 2, background.width, background.height),
            PanelEdge::Right => Rect::new(
                window.width - background.width,
                (window.height - background.height) / 2,
                background.width,
                background.height,
            ),
        }
    }

    /// Convert a window-relative rectangle to screen coordinates.
    pub fn to_screen(&self, rect: Rect) -> Rect {
        rect.translated(self.window.x, self.window.y)
    }

    /// Whether a window-relative point lies within half a spacing of the
    /// border facing the screen interior.
    pub fn near_inner_border(&self, point: Point, spacing: i32) -> bool {
        let half = spacing / 2;
        match self.edge {
            PanelEdge::Bottom => point.y < half,
            PanelEdge::Top => point.y > self.window.height - half,
            PanelEdge::Left => point.x > self.window.width - half,
            PanelEdge::Right => point.x < half,
        }
    }

    /// Where the application menu opens, adjacent to the minimized panel.
    pub fn application_menu_position(&self, minimized: Size, menu: Size) -> Point {
        let origin = self.minimized_origin;
        match self.edge {
            PanelEdge::Top => Point::new(origin.x, origin.y + minimized.height),
            PanelEdge::Bottom => Point::new(origin.x, origin.y - menu.height),
            PanelEdge::Left => Point::new(origin.x + minimized.width, origin.y),
            PanelEdge::Right => Point::new(origin.x - menu.width, origin.y),
        }
    }

    /// Adjust a submenu proposed at `submenu` so it stays on the menu's side
    /// of the panel.
    pub fn application_sub_menu_position(&self, minimized: Size, menu: Size, submenu: Rect) -> Point {
        let origin = self.minimized_origin;
        match self.edge {
            PanelEdge::Top => {
                let below = origin.y + minimized.height;
                let floor = below.max(below + menu.height - submenu.height);
                Point::new(submenu.x, submenu.y.min(floor))
            }
            PanelEdge::Bottom => Point::new(submenu.x, submenu.y.min(origin.y - submenu.height)),
            PanelEdge::Left | PanelEdge::Right => Point::new(submenu.x, submenu.y),
        }
    }

    /// Strut for a visibility mode.
    pub fn strut(&self, visibility: PanelVisibility, minimized: Size) -> StrutRequest {
        let thickness = match visibility {
            PanelVisibility::AlwaysVisible => self.thickness_of(minimized),
            PanelVisibility::AutoHide | PanelVisibility::WindowsCanCover => 1,
            PanelVisibility::WindowsCanCoverQuiet | PanelVisibility::WindowsGoBelow => 0,
        };
        self.strut_of(thickness)
    }

    /// Strut that also keeps the open application menu uncovered. Vertical
    /// panels reserve room for one submenu as well.
    pub fn application_menu_strut(&self, minimized: Size, menu: Size) -> StrutRequest {
        let thickness = if self.edge.is_horizontal() {
            minimized.height + menu.height
        } else {
            minimized.width + 2 * menu.width
        };
        self.strut_of(thickness)
    }

    fn thickness_of(&self, size: Size) -> i32 {
        if self.edge.is_horizontal() {
            size.height
        } else {
            size.width
        }
    }

    fn strut_of(&self, thickness: i32) -> StrutRequest {
        let screen = self.screen;
        let (span_start, span_end) = if self.edge.is_horizontal() {
            (screen.x, screen.right())
        } else {
            (screen.y, screen.bottom())
        };
        StrutRequest {
            edge: self.edge,
            thickness,
            span_start,
            span_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_origin_per_edge() {
        let size = Size::new(400, 72);
        assert_eq!(PanelGeometry::new(PanelEdge::Top, SCREEN).origin_for(size), Point::new(760, 0));
        assert_eq!(PanelGeometry::new(PanelEdge::Bottom, SCREEN).origin_for(size), Point::new(760, 1008));

        let size = Size::new(72, 400);
        assert_eq!(PanelGeometry::new(PanelEdge::Left, SCREEN).origin_for(size), Point::new(0, 340));
        assert_eq!(PanelGeometry::new(PanelEdge::Right, SCREEN).origin_for(size), Point::new(1848, 340));
    }

    #[test]
    fn test_origin_on_second_screen() {
        let screen = Rect::new(1920, 0, 1280, 1024);
        let geometry = PanelGeometry::new(PanelEdge::Bottom, screen);
        assert_eq!(geometry.origin_for(Size::new(280, 72)), Point::new(1920 + 500, 952));
    }

    #[test]
    fn test_resize_caches_minimized_origin() {
        let mut geometry = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        let min = Size::new(400, 72);
        geometry.resize(min, min, true);
        assert_eq!(geometry.window(), Rect::new(760, 1008, 400, 72));
        assert_eq!(geometry.minimized_origin(), Point::new(760, 1008));

        geometry.resize(Size::new(600, 152), min, true);
        assert_eq!(geometry.window(), Rect::new(660, 928, 600, 152));
        assert_eq!(geometry.minimized_origin(), Point::new(760, 1008));

        geometry.resize(Size::new(650, 152), min, false);
        assert_eq!(geometry.window(), Rect::new(660, 928, 650, 152));
    }

    #[test]
    fn test_background_rect() {
        let mut geometry = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        geometry.resize(Size::new(600, 152), Size::new(400, 72), true);
        assert_eq!(geometry.background_rect(Size::new(500, 72)), Rect::new(50, 80, 500, 72));

        let mut geometry = PanelGeometry::new(PanelEdge::Top, SCREEN);
        geometry.resize(Size::new(600, 152), Size::new(400, 72), true);
        assert_eq!(geometry.background_rect(Size::new(500, 72)), Rect::new(50, 0, 500, 72));

        let mut geometry = PanelGeometry::new(PanelEdge::Right, SCREEN);
        geometry.resize(Size::new(152, 600), Size::new(72, 400), true);
        assert_eq!(geometry.background_rect(Size::new(72, 600)), Rect::new(80, 0, 72, 600));
    }

    #[test]
    fn test_tooltip_position() {
        let request = TooltipRequest {
            item_index: 0,
            label: "Terminal".into(),
            edge: PanelEdge::Bottom,
            item_rect: Rect::new(700, 940, 100, 100),
            panel_rect: Rect::new(600, 928, 700, 152),
            max_size: Size::new(700, 152),
        };
        let tooltip = Size::new(80, 20);
        assert_eq!(request.position(tooltip), Point::new(710, 908));

        let top = TooltipRequest {
            edge: PanelEdge::Top,
            item_rect: Rect::new(700, 12, 100, 100),
            panel_rect: Rect::new(600, 0, 700, 152),
            ..request.clone()
        };
        assert_eq!(top.position(tooltip), Point::new(710, 162));

        let right = TooltipRequest {
            edge: PanelEdge::Right,
            item_rect: Rect::new(1780, 400, 100, 100),
            panel_rect: Rect::new(1768, 300, 152, 700),
            max_size: Size::new(152, 700),
            ..request
        };
        assert_eq!(right.position(tooltip), Point::new(1768 - 80 - 10, 440));
    }

    #[test]
    fn test_application_menu_positions() {
        let min = Size::new(400, 72);
        let mut bottom = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        bottom.resize(min, min, true);
        let menu = Size::new(300, 500);
        assert_eq!(bottom.application_menu_position(min, menu), Point::new(760, 508));
        // A submenu reaching below the panel top is pulled up.
        let sub = Rect::new(1060, 900, 250, 300);
        assert_eq!(bottom.application_sub_menu_position(min, menu, sub), Point::new(1060, 708));
        let sub = Rect::new(1060, 500, 250, 300);
        assert_eq!(bottom.application_sub_menu_position(min, menu, sub), Point::new(1060, 500));

        let mut top = PanelGeometry::new(PanelEdge::Top, SCREEN);
        top.resize(min, min, true);
        assert_eq!(top.application_menu_position(min, menu), Point::new(760, 72));
        // Taller than the menu: aligned with the panel.
        let sub = Rect::new(1060, 400, 250, 600);
        assert_eq!(top.application_sub_menu_position(min, menu, sub), Point::new(1060, 72));
        // Shorter: bottom aligned with the menu's bottom at most.
        let sub = Rect::new(1060, 500, 250, 100);
        assert_eq!(top.application_sub_menu_position(min, menu, sub), Point::new(1060, 472));

        let min = Size::new(72, 400);
        let mut right = PanelGeometry::new(PanelEdge::Right, SCREEN);
        right.resize(min, min, true);
        assert_eq!(right.application_menu_position(min, menu), Point::new(1848 - 300, 340));
        let sub = Rect::new(5, 6, 7, 8);
        assert_eq!(right.application_sub_menu_position(min, menu, sub), Point::new(5, 6));
    }

    #[test]
    fn test_strut_by_visibility() {
        let geometry = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        let min = Size::new(400, 72);
        assert_eq!(geometry.strut(PanelVisibility::AlwaysVisible, min).thickness, 72);
        assert_eq!(geometry.strut(PanelVisibility::AutoHide, min).thickness, 1);
        assert_eq!(geometry.strut(PanelVisibility::WindowsCanCover, min).thickness, 1);
        assert_eq!(geometry.strut(PanelVisibility::WindowsCanCoverQuiet, min).thickness, 0);
        assert_eq!(geometry.strut(PanelVisibility::WindowsGoBelow, min).thickness, 0);

        let strut = geometry.strut(PanelVisibility::AlwaysVisible, min);
        assert_eq!((strut.span_start, strut.span_end), (0, 1920));
    }

    #[test]
    fn test_application_menu_strut() {
        let menu = Size::new(300, 500);
        let bottom = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        assert_eq!(bottom.application_menu_strut(Size::new(400, 72), menu).thickness, 572);

        let left = PanelGeometry::new(PanelEdge::Left, Rect::new(0, 100, 1920, 980));
        let strut = left.application_menu_strut(Size::new(72, 400), menu);
        assert_eq!(strut.thickness, 672);
        assert_eq!((strut.span_start, strut.span_end), (100, 1080));
    }

    #[test]
    fn test_near_inner_border() {
        let mut geometry = PanelGeometry::new(PanelEdge::Bottom, SCREEN);
        geometry.resize(Size::new(400, 72), Size::new(400, 72), true);
        assert!(geometry.near_inner_border(Point::new(50, 11), 24));
        assert!(!geometry.near_inner_border(Point::new(50, 12), 24));

        let mut geometry = PanelGeometry::new(PanelEdge::Top, SCREEN);
        geometry.resize(Size::new(400, 72), Size::new(400, 72), true);
        assert!(geometry.near_inner_border(Point::new(50, 61), 24));
        assert!(!geometry.near_inner_border(Point::new(50, 60), 24));
    }
}
