//! Window managers that draw nothing.
//!
//! [`HeadlessWindowManager`] keeps the last state sent for each panel and
//! logs every request, which is what the daemon uses when no display
//! server backend is compiled in. [`RecordingWindowManager`] appends every
//! call to a shared log so tests can assert on the exact sequence.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use smoothdock_core_layout::{PanelVisibility, Point, Rect, Size, StrutRequest, TooltipRequest};

use crate::{resting_layer, PanelId, PanelStyle, PlatformError, StackingLayer, WindowManager};

/// Rough tooltip size for a label rendered at `font_size` points.
pub fn estimate_tooltip_size(label: &str, font_size: i32) -> Size {
    let font_size = font_size.max(1);
    let chars = label.chars().count() as i32;
    let padding = font_size / 2;
    Size::new(chars * font_size * 6 / 10 + 2 * padding, font_size * 3 / 2 + 2 * padding)
}

/// Last known state of one panel window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessPanel {
    pub visibility: PanelVisibility,
    pub rect: Rect,
    pub strut: Option<StrutRequest>,
    pub layer: StackingLayer,
    pub style: PanelStyle,
    pub tooltip: Option<(String, Point)>,
}

#[derive(Debug, Default)]
pub struct HeadlessWindowManager {
    tooltip_font_size: i32,
    panels: BTreeMap<PanelId, HeadlessPanel>,
}

impl HeadlessWindowManager {
    pub fn new(tooltip_font_size: i32) -> Self {
        Self {
            tooltip_font_size,
            panels: BTreeMap::new(),
        }
    }

    pub fn panel(&self, panel: PanelId) -> Option<&HeadlessPanel> {
        self.panels.get(&panel)
    }

    fn panel_mut(&mut self, panel: PanelId) -> Result<&mut HeadlessPanel, PlatformError> {
        self.panels.get_mut(&panel).ok_or(PlatformError::UnknownPanel(panel))
    }
}

impl WindowManager for HeadlessWindowManager {
    fn register_panel(&mut self, panel: PanelId, visibility: PanelVisibility) -> Result<(), PlatformError> {
        tracing::debug!("Panel {} registered ({:?}, all desktops)", panel, visibility);
        self.panels.insert(
            panel,
            HeadlessPanel {
                visibility,
                rect: Rect::default(),
                strut: None,
                layer: resting_layer(visibility),
                style: PanelStyle::default(),
                tooltip: None,
            },
        );
        Ok(())
    }

    fn place_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), PlatformError> {
        let state = self.panel_mut(panel)?;
        if state.rect != rect {
            tracing::trace!(
                "Panel {} placed at ({}, {}) {}x{}",
                panel,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
            state.rect = rect;
        }
        Ok(())
    }

    fn set_strut(&mut self, panel: PanelId, strut: &StrutRequest) -> Result<(), PlatformError> {
        let state = self.panel_mut(panel)?;
        if state.strut.as_ref() != Some(strut) {
            tracing::debug!(
                "Panel {} strut {:?} thickness {} span {}..{}",
                panel,
                strut.edge,
                strut.thickness,
                strut.span_start,
                strut.span_end
            );
            state.strut = Some(*strut);
        }
        Ok(())
    }

    fn set_layer(&mut self, panel: PanelId, layer: StackingLayer) -> Result<(), PlatformError> {
        let state = self.panel_mut(panel)?;
        if state.layer != layer {
            tracing::debug!("Panel {} layer {:?}", panel, layer);
            state.layer = layer;
        }
        Ok(())
    }

    fn set_style(&mut self, panel: PanelId, style: &PanelStyle) -> Result<(), PlatformError> {
        let state = self.panel_mut(panel)?;
        if state.style != *style {
            tracing::debug!(
                "Panel {} background {:?} border {:?} {}-hour clock",
                panel,
                style.background,
                style.border,
                if style.use_24_hour_clock { 24 } else { 12 }
            );
            state.style = *style;
        }
        Ok(())
    }

    fn show_tooltip(&mut self, panel: PanelId, request: &TooltipRequest) -> Result<(), PlatformError> {
        let size = estimate_tooltip_size(&request.label, self.tooltip_font_size);
        let position = request.position(size);
        let state = self.panel_mut(panel)?;
        tracing::debug!(
            "Panel {} tooltip '{}' at ({}, {})",
            panel,
            request.label,
            position.x,
            position.y
        );
        state.tooltip = Some((request.label.clone(), position));
        Ok(())
    }

    fn hide_tooltip(&mut self, panel: PanelId) -> Result<(), PlatformError> {
        let state = self.panel_mut(panel)?;
        if state.tooltip.take().is_some() {
            tracing::debug!("Panel {} tooltip hidden", panel);
        }
        Ok(())
    }
}

/// One window-manager call, as seen by [`RecordingWindowManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmCall {
    Register(PanelId, PanelVisibility),
    Place(PanelId, Rect),
    Strut(PanelId, StrutRequest),
    Layer(PanelId, StackingLayer),
    Style(PanelId, PanelStyle),
    ShowTooltip(PanelId, String),
    HideTooltip(PanelId),
}

/// Shared handle to the calls a [`RecordingWindowManager`] received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<WmCall>>>);

impl CallLog {
    fn push(&self, call: WmCall) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    pub fn calls(&self) -> Vec<WmCall> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Accepts every request and records it.
#[derive(Debug, Default)]
pub struct RecordingWindowManager {
    log: CallLog,
}

impl RecordingWindowManager {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl WindowManager for RecordingWindowManager {
    fn register_panel(&mut self, panel: PanelId, visibility: PanelVisibility) -> Result<(), PlatformError> {
        self.log.push(WmCall::Register(panel, visibility));
        Ok(())
    }

    fn place_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), PlatformError> {
        self.log.push(WmCall::Place(panel, rect));
        Ok(())
    }

    fn set_strut(&mut self, panel: PanelId, strut: &StrutRequest) -> Result<(), PlatformError> {
        self.log.push(WmCall::Strut(panel, *strut));
        Ok(())
    }

    fn set_layer(&mut self, panel: PanelId, layer: StackingLayer) -> Result<(), PlatformError> {
        self.log.push(WmCall::Layer(panel, layer));
        Ok(())
    }

    fn set_style(&mut self, panel: PanelId, style: &PanelStyle) -> Result<(), PlatformError> {
        self.log.push(WmCall::Style(panel, *style));
        Ok(())
    }

    fn show_tooltip(&mut self, panel: PanelId, request: &TooltipRequest) -> Result<(), PlatformError> {
        self.log.push(WmCall::ShowTooltip(panel, request.label.clone()));
        Ok(())
    }

    fn hide_tooltip(&mut self, panel: PanelId) -> Result<(), PlatformError> {
        self.log.push(WmCall::HideTooltip(panel));
        Ok(())
    }
}
