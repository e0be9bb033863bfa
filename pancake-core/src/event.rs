//! Synthesized pointer events.

use serde::{Deserialize, Serialize};

/// Which mouse button an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary (usually left) button.
    Primary,
    /// Secondary (usually right) button.
    Secondary,
}

/// A mouse event, as a host would receive from `dispatchEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Event type, e.g. `"click"`.
    pub event_type: String,
    /// Whether the event bubbles.
    pub bubbles: bool,
    /// Whether the event can be cancelled.
    pub cancelable: bool,
    /// Click count.
    pub detail: i32,
    /// Screen X coordinate.
    pub screen_x: i32,
    /// Screen Y coordinate.
    pub screen_y: i32,
    /// Client X coordinate.
    pub client_x: i32,
    /// Client Y coordinate.
    pub client_y: i32,
    /// Ctrl held.
    pub ctrl_key: bool,
    /// Alt held.
    pub alt_key: bool,
    /// Shift held.
    pub shift_key: bool,
    /// Meta held.
    pub meta_key: bool,
    /// Button that changed state.
    pub button: MouseButton,
}

impl MouseEvent {
    /// A plain synthesized primary click: bubbling, cancelable, at the
    /// origin, with no modifier keys.
    #[must_use]
    pub fn click() -> Self {
        Self {
            event_type: "click".to_string(),
            bubbles: true,
            cancelable: true,
            detail: 0,
            screen_x: 0,
            screen_y: 0,
            client_x: 0,
            client_y: 0,
            ctrl_key: false,
            alt_key: false,
            shift_key: false,
            meta_key: false,
            button: MouseButton::Primary,
        }
    }

    /// Check whether this event activates links.
    #[must_use]
    pub fn is_activation(&self) -> bool {
        self.event_type == "click" && self.button == MouseButton::Primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_defaults() {
        let event = MouseEvent::click();
        assert_eq!(event.event_type, "click");
        assert!(event.bubbles);
        assert!(event.cancelable);
        assert!(event.is_activation());
        assert!(!(event.ctrl_key || event.alt_key || event.shift_key || event.meta_key));
        assert_eq!((event.client_x, event.client_y), (0, 0));
    }

    #[test]
    fn test_secondary_button_does_not_activate() {
        let event = MouseEvent {
            button: MouseButton::Secondary,
            ..MouseEvent::click()
        };
        assert!(!event.is_activation());
    }
}
