//! Control panel widgets: a particle-count slider and two buttons.
//!
//! Widgets never mutate the simulation directly. [`ControlPanel::handle`]
//! consumes one [`InputEvent`] and reports what the loop should do as a
//! list of [`PanelAction`]s.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::input::InputEvent;

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub rect: Rect,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub label: String,
    dragging: bool,
}

impl Slider {
    pub fn new(rect: Rect, min: f64, max: f64, value: f64, label: impl Into<String>) -> Self {
        Self {
            rect,
            min,
            max,
            value: value.clamp(min, max),
            label: label.into(),
            dragging: false,
        }
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Value position along the track in [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    /// Returns true if the value changed.
    fn handle(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::MouseDown { position } => {
                if self.rect.contains(position) {
                    self.dragging = true;
                }
                false
            }
            InputEvent::MouseUp { .. } => {
                self.dragging = false;
                false
            }
            InputEvent::MouseMove { position } if self.dragging => {
                let rel = (position.x - self.rect.x) / self.rect.w;
                let next = (self.min + rel * (self.max - self.min)).clamp(self.min, self.max);
                let changed = next != self.value;
                self.value = next;
                changed
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// Removes every attractor.
    Reset,
    /// Removes every attractor and every particle.
    ClearAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub rect: Rect,
    pub text: String,
    pub kind: ButtonKind,
    pub hovered: bool,
}

impl Button {
    pub fn new(rect: Rect, text: impl Into<String>, kind: ButtonKind) -> Self {
        Self {
            rect,
            text: text.into(),
            kind,
            hovered: false,
        }
    }

    fn handle(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::MouseMove { position } => {
                self.hovered = self.rect.contains(position);
                false
            }
            InputEvent::MouseDown { position } => self.rect.contains(position),
            _ => false,
        }
    }
}

/// What the loop should do in response to a panel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    SetTargetCount(usize),
    ClearAttractors,
    ClearAll,
}

/// Top-of-screen chrome. Clicks inside [`ControlPanel::region`] never place
/// attractors, even when they miss every widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    pub region: Rect,
    pub slider: Slider,
    pub buttons: Vec<Button>,
}

/// Height of the chrome bar.
pub const PANEL_HEIGHT: f64 = 100.0;

impl ControlPanel {
    /// The stock layout: particle slider [0, 2000] starting at `initial`,
    /// then "Reset" and "Clear All".
    pub fn standard(screen_width: f64, initial: usize) -> Self {
        Self {
            region: Rect::new(0.0, 0.0, screen_width, PANEL_HEIGHT),
            slider: Slider::new(
                Rect::new(50.0, 50.0, 200.0, 20.0),
                0.0,
                2000.0,
                initial as f64,
                "Particles",
            ),
            buttons: vec![
                Button::new(Rect::new(270.0, 40.0, 120.0, 40.0), "Reset", ButtonKind::Reset),
                Button::new(
                    Rect::new(400.0, 40.0, 120.0, 40.0),
                    "Clear All",
                    ButtonKind::ClearAll,
                ),
            ],
        }
    }

    /// True if `p` falls on the chrome rather than the play field. The
    /// bottom edge belongs to the chrome: attractors need `y > height`.
    pub fn covers(&self, p: DVec2) -> bool {
        let r = &self.region;
        p.x >= r.x && p.x < r.x + r.w && p.y >= r.y && p.y <= r.y + r.h
    }

    /// Slider value as a particle count.
    pub fn target_count(&self) -> usize {
        self.slider.value.max(0.0) as usize
    }

    /// Routes one event through every widget.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        if self.slider.handle(event) {
            actions.push(PanelAction::SetTargetCount(self.target_count()));
        }
        for button in &mut self.buttons {
            if button.handle(event) {
                actions.push(match button.kind {
                    ButtonKind::Reset => PanelAction::ClearAttractors,
                    ButtonKind::ClearAll => PanelAction::ClearAll,
                });
            }
        }
        actions
    }

    /// Moves the slider to `count` without an input event.
    pub fn set_target_count(&mut self, count: usize) {
        self.slider.value = (count as f64).clamp(self.slider.min, self.slider.max);
    }
}
