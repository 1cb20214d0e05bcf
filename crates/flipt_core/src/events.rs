//! Event types and payloads
//!
//! Platform-agnostic input events delivered through [`Document::dispatch`].
//!
//! [`Document::dispatch`]: crate::dom::Document::dispatch

use crate::dom::{ElementId, EventTarget};

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_ENTER: EventType = 4;
    pub const POINTER_LEAVE: EventType = 5;
    pub const FOCUS: EventType = 10;
    pub const BLUR: EventType = 11;
    /// Bubbling companion of `BLUR`
    pub const FOCUS_OUT: EventType = 12;
    pub const KEY_DOWN: EventType = 20;
    pub const KEY_UP: EventType = 21;

    // Touch events
    pub const TOUCH_START: EventType = 90;
    pub const TOUCH_MOVE: EventType = 91;
    pub const TOUCH_END: EventType = 92;

    /// Whether events of this type propagate to ancestors after the target.
    ///
    /// Enter/leave and focus/blur only fire on the element they concern.
    /// `FOCUS_OUT` bubbles so ancestors see focus leaving their subtree.
    pub const fn bubbles(event_type: EventType) -> bool {
        !matches!(event_type, POINTER_ENTER | POINTER_LEAVE | FOCUS | BLUR)
    }
}

/// A UI event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    /// The node the event was dispatched at
    pub target: EventTarget,
    /// The node whose listeners are currently running
    pub current_target: EventTarget,
    /// Secondary element (the element gaining focus for a blur)
    pub related_target: Option<ElementId>,
    pub data: EventData,
    /// Whether `prevent_default` has any effect
    pub cancelable: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

/// Event-specific data
#[derive(Clone, Debug)]
pub enum EventData {
    Pointer {
        x: f32,
        y: f32,
        /// Compatibility event emulated from touch input
        synthetic: bool,
    },
    Touch {
        x: f32,
        y: f32,
    },
    Key {
        key: KeyCode,
    },
    None,
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    /// Unknown/unmapped key
    pub const UNKNOWN: KeyCode = KeyCode(0);

    /// Keys that activate a focused control
    pub fn is_activation(self) -> bool {
        self == KeyCode::ENTER || self == KeyCode::SPACE
    }
}

impl Event {
    /// Create an event of the given type at a target
    pub fn new(event_type: EventType, target: impl Into<EventTarget>, data: EventData) -> Self {
        let target = target.into();
        Self {
            event_type,
            target,
            current_target: target,
            related_target: None,
            data,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Pointer event from a real pointing device
    pub fn pointer(event_type: EventType, target: impl Into<EventTarget>, x: f32, y: f32) -> Self {
        Self::new(
            event_type,
            target,
            EventData::Pointer {
                x,
                y,
                synthetic: false,
            },
        )
    }

    /// Pointer event emulated from a preceding touch sequence
    pub fn synthetic_pointer(
        event_type: EventType,
        target: impl Into<EventTarget>,
        x: f32,
        y: f32,
    ) -> Self {
        Self::new(
            event_type,
            target,
            EventData::Pointer {
                x,
                y,
                synthetic: true,
            },
        )
    }

    pub fn touch(event_type: EventType, target: impl Into<EventTarget>, x: f32, y: f32) -> Self {
        Self::new(event_type, target, EventData::Touch { x, y })
    }

    pub fn key_down(target: impl Into<EventTarget>, key: KeyCode) -> Self {
        Self::new(event_types::KEY_DOWN, target, EventData::Key { key })
    }

    /// Blur event; `related` is the element receiving focus, if any
    pub fn blur(target: impl Into<EventTarget>, related: Option<ElementId>) -> Self {
        let mut event = Self::new(event_types::BLUR, target, EventData::None);
        event.related_target = related;
        event.cancelable = false;
        event
    }

    /// Focus-out event; like [`Event::blur`] but bubbles
    pub fn focus_out(target: impl Into<EventTarget>, related: Option<ElementId>) -> Self {
        let mut event = Self::blur(target, related);
        event.event_type = event_types::FOCUS_OUT;
        event
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Suppress the platform's default action. No-op for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Key code for keyboard events
    pub fn key(&self) -> Option<KeyCode> {
        match self.data {
            EventData::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.data, EventData::Pointer { synthetic: true, .. })
    }
}
