//! Minimized/maximized state machine and step interpolation.

use crate::Size;
use serde::{Deserialize, Serialize};

/// Linear interpolation at `step` of `total`. Exact at both ends.
pub fn lerp(start: i32, end: i32, step: u32, total: u32) -> i32 {
    if total == 0 || step >= total {
        return end;
    }
    let delta = i64::from(end) - i64::from(start);
    (i64::from(start) + delta * i64::from(step) / i64::from(total)) as i32
}

/// Start value that keeps the interpolated value at `current` for this step
/// after the end moved to `end`.
pub fn retarget_start(current: i32, end: i32, step: u32, total: u32) -> i32 {
    if step >= total {
        return end;
    }
    let (current, end) = (i64::from(current), i64::from(end));
    let (step, total) = (i64::from(step), i64::from(total));
    ((current * total - end * step) / (total - step)) as i32
}

/// Which way a transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Entering,
    Leaving,
}

/// Panel zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    #[default]
    Minimized,
    Entering,
    Maximized,
    Leaving,
}

impl PanelState {
    pub fn is_animating(self) -> bool {
        matches!(self, PanelState::Entering | PanelState::Leaving)
    }
}

/// Step counter and background interpolation for one panel.
///
/// Item frames interpolate themselves; the controller owns the shared step
/// and the background size.
#[derive(Debug, Clone)]
pub struct AnimationController {
    state: PanelState,
    step: u32,
    total_steps: u32,
    background: Size,
    background_start: Size,
    background_end: Size,
}

impl AnimationController {
    pub fn new(total_steps: u32) -> Self {
        Self {
            state: PanelState::Minimized,
            step: 0,
            total_steps: total_steps.max(1),
            background: Size::default(),
            background_start: Size::default(),
            background_end: Size::default(),
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.state {
            PanelState::Entering => Some(Direction::Entering),
            PanelState::Leaving => Some(Direction::Leaving),
            _ => None,
        }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn background(&self) -> Size {
        self.background
    }

    pub fn background_end(&self) -> Size {
        self.background_end
    }

    /// Start a transition from step 0.
    pub fn begin(&mut self, direction: Direction, background_start: Size, background_end: Size) {
        self.state = match direction {
            Direction::Entering => PanelState::Entering,
            Direction::Leaving => PanelState::Leaving,
        };
        self.step = 0;
        self.background_start = background_start;
        self.background_end = background_end;
        self.background = background_start;
    }

    /// Advance one step. Returns the direction of a transition that just
    /// completed; the caller settles the panel.
    pub fn advance(&mut self) -> Option<Direction> {
        let direction = self.direction()?;
        self.step = (self.step + 1).min(self.total_steps);
        self.background = Size::new(
            lerp(self.background_start.width, self.background_end.width, self.step, self.total_steps),
            lerp(self.background_start.height, self.background_end.height, self.step, self.total_steps),
        );
        (self.step == self.total_steps).then_some(direction)
    }

    /// Whether the running transition has reached its last step.
    pub fn is_finished(&self) -> bool {
        self.is_animating() && self.step >= self.total_steps
    }

    /// Move the background end without a visible jump at the current step.
    pub fn retarget_background(&mut self, end: Size) {
        let (step, total) = (self.step, self.total_steps);
        self.background_start = Size::new(
            retarget_start(self.background.width, end.width, step, total),
            retarget_start(self.background.height, end.height, step, total),
        );
        self.background_end = end;
    }

    /// Enter a resting state with a fixed background.
    pub fn settle(&mut self, state: PanelState, background: Size) {
        debug_assert!(!state.is_animating());
        self.state = state;
        self.step = 0;
        self.background = background;
        self.background_start = background;
        self.background_end = background;
    }

    /// Change the background while resting, e.g. after a re-layout.
    pub fn set_background(&mut self, background: Size) {
        self.background = background;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(10, 90, 0, 20), 10);
        assert_eq!(lerp(10, 90, 20, 20), 90);
        assert_eq!(lerp(90, 10, 20, 20), 10);
        assert_eq!(lerp(10, 90, 5, 20), 30);
        assert_eq!(lerp(10, 90, 0, 0), 90);
    }

    #[test]
    fn test_lerp_truncates_toward_start() {
        // 0 + 7 * 1 / 20 = 0
        assert_eq!(lerp(0, 7, 1, 20), 0);
        // 7 - 7 * 1 / 20 = 7
        assert_eq!(lerp(7, 0, 1, 20), 7);
    }

    #[test]
    fn test_retarget_keeps_current_value() {
        let total = 20;
        for step in 0..total {
            for (current, end) in [(100, 400), (400, 100), (55, 55), (-30, 250)] {
                let start = retarget_start(current, end, step, total);
                let value = lerp(start, end, step, total);
                assert!(
                    (value - current).abs() <= 1,
                    "step {} current {} end {}: {}",
                    step,
                    current,
                    end,
                    value
                );
                assert_eq!(lerp(start, end, total, total), end);
            }
        }
        assert_eq!(retarget_start(10, 99, 20, 20), 99);
    }

    #[test]
    fn test_converges_after_total_ticks() {
        let mut anim = AnimationController::new(20);
        anim.begin(Direction::Entering, Size::new(100, 72), Size::new(400, 72));
        assert_eq!(anim.state(), PanelState::Entering);
        for _ in 0..19 {
            assert_eq!(anim.advance(), None);
        }
        assert_eq!(anim.advance(), Some(Direction::Entering));
        assert_eq!(anim.background(), Size::new(400, 72));
        assert!(anim.is_finished());
    }

    #[test]
    fn test_advance_when_idle_does_nothing() {
        let mut anim = AnimationController::new(20);
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.step(), 0);
        anim.settle(PanelState::Maximized, Size::new(5, 5));
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.background(), Size::new(5, 5));
    }

    #[test]
    fn test_retarget_background_mid_transition() {
        let mut anim = AnimationController::new(20);
        anim.begin(Direction::Leaving, Size::new(600, 72), Size::new(300, 72));
        for _ in 0..10 {
            anim.advance();
        }
        let before = anim.background();
        anim.retarget_background(Size::new(372, 72));
        assert_eq!(anim.step(), 10);
        assert_eq!(anim.background(), before);
        for _ in 0..10 {
            anim.advance();
        }
        assert_eq!(anim.background(), Size::new(372, 72));
        assert_eq!(anim.state(), PanelState::Leaving);
    }

    #[test]
    fn test_zero_steps_is_clamped() {
        let anim = AnimationController::new(0);
        assert_eq!(anim.total_steps(), 1);
    }
}
