//! Middle-button auto-scroll.
//!
//! A middle click arms auto-scroll at the pointer. While armed, the
//! pointer's displacement from that origin sets a target velocity, and the
//! actual velocity eases toward it every frame with exponential smoothing:
//!
//! ```text
//! v += (target - v) * (1 - e^(-smoothing * dt))
//! ```
//!
//! A second middle click, Escape or any other button disarms. Releasing the
//! middle button after dragging it past the threshold disarms as well, so
//! press-drag-release works like a held scroll.

use serde::Deserialize;
use serde::Serialize;

use crate::scroll::ScrollState;

/// Auto-scroll tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfig {
    /// Pixels of displacement per unit of velocity.
    pub divisor: f64,
    /// Velocity cap per axis, in pixels per frame.
    pub max_speed: f64,
    /// Smoothing rate of the velocity easing, per second.
    pub smoothing: f64,
    /// Longest frame interval fed to the easing, in seconds.
    pub max_dt: f64,
    /// Pointer travel that turns a click into a held drag, in pixels.
    pub drag_threshold: f64,
    /// Velocities below this snap to zero.
    pub rest_epsilon: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            divisor: 14.0,
            max_speed: 20.0,
            smoothing: 12.0,
            max_dt: 0.05,
            drag_threshold: 6.0,
            rest_epsilon: 0.01,
        }
    }
}

/// A pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

/// Velocity on both axes, in pixels per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Auto-scroll state.
#[derive(Debug, Clone, Default)]
pub struct AutoScroll {
    config: AutoScrollConfig,
    armed: bool,
    origin: (f64, f64),
    dragged: bool,
    target: Velocity,
    velocity: Velocity,
    last_tick: Option<f64>,
}

impl AutoScroll {
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn target(&self) -> Velocity {
        self.target
    }

    /// Where auto-scroll was armed.
    pub fn origin(&self) -> Option<(f64, f64)> {
        self.armed.then_some(self.origin)
    }

    /// Handles a button press.
    ///
    /// Returns `true` if the press was consumed and should not reach the
    /// grid (middle presses always are).
    pub fn press(&mut self, button: PointerButton, x: f64, y: f64) -> bool {
        match (button, self.armed) {
            (PointerButton::Middle, true) => {
                self.disarm();
                true
            }
            (PointerButton::Middle, false) => {
                self.armed = true;
                self.origin = (x, y);
                self.dragged = false;
                self.last_tick = None;
                log::trace!("Auto-scroll armed at ({x}, {y})");
                true
            }
            (_, true) => {
                self.disarm();
                false
            }
            (_, false) => false,
        }
    }

    /// Handles a button release.
    pub fn release(&mut self, button: PointerButton) {
        if button == PointerButton::Middle && self.armed && self.dragged {
            self.disarm();
        }
    }

    /// Handles pointer movement.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.armed {
            return;
        }
        let (dx, dy) = (x - self.origin.0, y - self.origin.1);
        if dx.hypot(dy) > self.config.drag_threshold {
            self.dragged = true;
        }
        let speed = |d: f64| (d / self.config.divisor).clamp(-self.config.max_speed, self.config.max_speed);
        self.target = Velocity {
            x: speed(dx),
            y: speed(dy),
        };
    }

    /// Handles Escape.
    pub fn escape(&mut self) {
        if self.armed {
            self.disarm();
        }
    }

    /// Stops immediately.
    pub fn disarm(&mut self) {
        self.armed = false;
        self.dragged = false;
        self.target = Velocity::default();
        self.velocity = Velocity::default();
        self.last_tick = None;
        log::trace!("Auto-scroll disarmed");
    }

    /// Advances one frame at `now_ms` and scrolls both axes.
    ///
    /// Returns `true` while armed, i.e. while more frames are wanted.
    pub fn tick(&mut self, now_ms: f64, horizontal: &mut ScrollState, vertical: &mut ScrollState) -> bool {
        if !self.armed {
            return false;
        }
        let dt = self
            .last_tick
            .map(|last| ((now_ms - last) / 1000.0).clamp(0.0, self.config.max_dt))
            .unwrap_or(0.0);
        self.last_tick = Some(now_ms);

        let ease = 1.0 - (-self.config.smoothing * dt).exp();
        let epsilon = self.config.rest_epsilon;
        let step = |v: f64, target: f64| {
            let v = v + (target - v) * ease;
            if v.abs() < epsilon { 0.0 } else { v }
        };
        self.velocity.x = step(self.velocity.x, self.target.x);
        self.velocity.y = step(self.velocity.y, self.target.y);

        drive(horizontal, &mut self.velocity.x, &mut self.target.x);
        drive(vertical, &mut self.velocity.y, &mut self.target.y);
        true
    }
}

/// Scrolls one axis and stops it at a boundary it is pushed against.
fn drive(scroll: &mut ScrollState, velocity: &mut f64, target: &mut f64) {
    if *velocity != 0.0 {
        scroll.apply_delta(*velocity);
    }
    let into_start = scroll.at_start() && (*velocity < 0.0 || *target < 0.0);
    let into_end = scroll.at_end() && (*velocity > 0.0 || *target > 0.0);
    if into_start || into_end {
        *velocity = 0.0;
        *target = 0.0;
    }
}
