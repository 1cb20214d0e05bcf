//! Flipt Core Runtime
//!
//! This crate provides the foundational primitives the flip panel is built on:
//!
//! - **Document**: A headless element tree with listener registration
//! - **Event Dispatch**: Target/bubble dispatch with default-prevention
//! - **State Machines**: Flat state machines for widget interaction states
//! - **Scene**: A styled node tree describing what a widget renders
//!
//! # Example
//!
//! ```rust
//! use flipt_core::dom::{Document, EventTarget};
//! use flipt_core::events::{event_types, Event};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let doc = Document::new();
//! let card = doc.create_element(None);
//!
//! let hits = Rc::new(Cell::new(0));
//! let counter = hits.clone();
//! doc.add_listener(EventTarget::Element(card), event_types::POINTER_MOVE, move |_| {
//!     counter.set(counter.get() + 1);
//! });
//!
//! doc.dispatch(Event::pointer(event_types::POINTER_MOVE, card, 4.0, 2.0));
//! assert_eq!(hits.get(), 1);
//! ```

pub mod dom;
pub mod events;
pub mod fsm;
pub mod scene;

pub use dom::{Document, ElementId, ElementSource, EventTarget, ListenerId};
pub use events::{Event, EventData, EventType, KeyCode};
pub use fsm::{StateId, StateMachine};
pub use scene::{RenderNode, Style};
