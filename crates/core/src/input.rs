//! Input events consumed by the simulation loop.
//!
//! Platform events (or a replay script) are translated into [`InputEvent`]
//! values and handed to the loop once per frame; there are no callbacks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed at `position` (screen pixels).
    MouseDown { position: DVec2 },
    /// Primary button released.
    MouseUp { position: DVec2 },
    /// Pointer moved, with or without a button held.
    MouseMove { position: DVec2 },
    /// Sets the particle target directly, bypassing the slider.
    SetTargetCount { count: usize },
    /// Window-close signal.
    Quit,
}

impl InputEvent {
    pub fn click(x: f64, y: f64) -> Self {
        InputEvent::MouseDown {
            position: DVec2::new(x, y),
        }
    }

    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<DVec2> {
        match *self {
            InputEvent::MouseDown { position }
            | InputEvent::MouseUp { position }
            | InputEvent::MouseMove { position } => Some(position),
            InputEvent::SetTargetCount { .. } | InputEvent::Quit => None,
        }
    }
}

/// An event scheduled for delivery at the start of a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub frame: u64,
    pub event: InputEvent,
}

/// Events for `frame`, in script order.
pub fn events_for_frame(script: &[ScriptedEvent], frame: u64) -> impl Iterator<Item = InputEvent> + '_ {
    script
        .iter()
        .filter(move |s| s.frame == frame)
        .map(|s| s.event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn position_is_reported_for_pointer_events_only() {
        assert_eq!(InputEvent::click(1.0, 2.0).position(), Some(DVec2::new(1.0, 2.0)));
        assert_eq!(InputEvent::Quit.position(), None);
        assert_eq!(InputEvent::SetTargetCount { count: 3 }.position(), None);
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let e: InputEvent =
            serde_json::from_value(json!({"type": "mouse_down", "position": [10.0, 20.0]})).unwrap();
        assert_eq!(e, InputEvent::click(10.0, 20.0));
        let q: InputEvent = serde_json::from_value(json!({"type": "quit"})).unwrap();
        assert_eq!(q, InputEvent::Quit);
    }

    #[test]
    fn events_for_frame_preserves_order_and_filters() {
        let script = [
            ScriptedEvent { frame: 0, event: InputEvent::click(1.0, 1.0) },
            ScriptedEvent { frame: 3, event: InputEvent::click(2.0, 2.0) },
            ScriptedEvent { frame: 0, event: InputEvent::Quit },
        ];
        let at_zero: Vec<_> = events_for_frame(&script, 0).collect();
        assert_eq!(at_zero, vec![InputEvent::click(1.0, 1.0), InputEvent::Quit]);
        assert_eq!(events_for_frame(&script, 1).count(), 0);
        assert_eq!(events_for_frame(&script, 3).count(), 1);
    }
}
