//! Event routing
//!
//! Turns raw input on the panel surface, on control elements, or on the
//! whole document into flip intents. Guards are evaluated against the panel
//! state at the moment each event arrives.

use flipt_core::dom::{Document, ElementId, ElementSource, EventHandler, EventTarget, ListenerId};
use flipt_core::events::{event_types, Event, EventType};
use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;

/// Event types routed from control elements and the document
pub const ROUTED_EVENTS: [EventType; 8] = [
    event_types::POINTER_ENTER,
    event_types::POINTER_MOVE,
    event_types::POINTER_LEAVE,
    event_types::TOUCH_START,
    event_types::TOUCH_MOVE,
    event_types::TOUCH_END,
    event_types::KEY_DOWN,
    event_types::BLUR,
];

/// Event types routed from the panel surface.
///
/// The surface watches focus leaving its whole subtree, so it takes the
/// bubbling focus-out in place of blur.
pub const SURFACE_EVENTS: [EventType; 8] = [
    event_types::POINTER_ENTER,
    event_types::POINTER_MOVE,
    event_types::POINTER_LEAVE,
    event_types::TOUCH_START,
    event_types::TOUCH_MOVE,
    event_types::TOUCH_END,
    event_types::KEY_DOWN,
    event_types::FOCUS_OUT,
];

/// What an input event asks the panel to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Show the back face
    Activate,
    /// Show the front face
    Deactivate,
    /// Show the other face
    Toggle,
}

/// Panel state the guards look at
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteState {
    /// Interactive flipping is off (forced face or disabled)
    pub locked: bool,
    pub flipped: bool,
}

/// Maps events to intents.
///
/// Remembers whether a touch sequence just ended so the pointer events the
/// platform emulates afterwards are not taken for a second activation.
#[derive(Debug, Default)]
pub struct EventRouter {
    swallow_synthetic: Cell<bool>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether emulated pointer events are currently being ignored
    pub fn is_swallowing(&self) -> bool {
        self.swallow_synthetic.get()
    }

    /// Route one event. May call `prevent_default` on it.
    pub fn route(&self, document: &Document, event: &mut Event, state: RouteState) -> Option<Intent> {
        match event.event_type {
            event_types::POINTER_ENTER | event_types::POINTER_MOVE | event_types::TOUCH_START
            | event_types::TOUCH_MOVE => {
                if self.swallowed(event) {
                    return None;
                }
                (!state.locked && !state.flipped).then_some(Intent::Activate)
            }
            event_types::POINTER_LEAVE => {
                if self.swallowed(event) {
                    return None;
                }
                (!state.locked && state.flipped).then_some(Intent::Deactivate)
            }
            event_types::TOUCH_END => {
                event.prevent_default();
                self.swallow_synthetic.set(event.default_prevented);
                (!state.locked && state.flipped).then_some(Intent::Deactivate)
            }
            event_types::KEY_DOWN => {
                if !event.key().is_some_and(|key| key.is_activation()) {
                    return None;
                }
                if from_descendant(document, event) {
                    tracing::trace!("keydown from a descendant ignored");
                    return None;
                }
                event.prevent_default();
                (!state.locked).then_some(Intent::Toggle)
            }
            event_types::BLUR | event_types::FOCUS_OUT => {
                if focus_stays_inside(document, event) {
                    tracing::trace!(event_type = event.event_type, "focus moved to a descendant");
                    return None;
                }
                (!state.locked && state.flipped).then_some(Intent::Deactivate)
            }
            _ => None,
        }
    }

    /// Track the emulated-pointer window. Returns true if `event` falls in it.
    fn swallowed(&self, event: &Event) -> bool {
        if event.is_synthetic() {
            if self.swallow_synthetic.get() {
                tracing::trace!(event_type = event.event_type, "emulated pointer event swallowed");
                return true;
            }
        } else {
            self.swallow_synthetic.set(false);
        }
        false
    }
}

/// The event started on an element strictly inside the element listening
fn from_descendant(document: &Document, event: &Event) -> bool {
    match event.current_target {
        EventTarget::Element(_) => {
            event.target != event.current_target && document.contains(event.current_target, event.target)
        }
        EventTarget::Document => false,
    }
}

/// Focus moves to an element inside the element listening
fn focus_stays_inside(document: &Document, event: &Event) -> bool {
    match (event.current_target, event.related_target) {
        (EventTarget::Element(_), Some(related)) => document.contains(event.current_target, related.into()),
        _ => false,
    }
}

/// Shared slot a host fills with an element once it exists
#[derive(Clone, Debug, Default)]
pub struct ElementRef(Rc<Cell<Option<ElementId>>>);

impl ElementRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, element: Option<ElementId>) {
        self.0.set(element);
    }

    pub fn get(&self) -> Option<ElementId> {
        self.0.get()
    }
}

impl ElementSource for ElementRef {
    fn element(&self) -> Option<ElementId> {
        self.get()
    }
}

/// An external element that drives the panel
#[derive(Clone)]
pub enum ControlTarget {
    Element(ElementId),
    /// Slot filled in later by the host
    Ref(ElementRef),
    /// Anything exposing an element, such as another panel's handle
    Handle(Rc<dyn ElementSource>),
    Document,
}

impl std::fmt::Debug for ControlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlTarget::Element(id) => f.debug_tuple("Element").field(id).finish(),
            ControlTarget::Ref(slot) => f.debug_tuple("Ref").field(&slot.get()).finish(),
            ControlTarget::Handle(source) => f.debug_tuple("Handle").field(&source.element()).finish(),
            ControlTarget::Document => f.write_str("Document"),
        }
    }
}

impl From<ElementId> for ControlTarget {
    fn from(id: ElementId) -> Self {
        ControlTarget::Element(id)
    }
}

impl From<ElementRef> for ControlTarget {
    fn from(slot: ElementRef) -> Self {
        ControlTarget::Ref(slot)
    }
}

impl ControlTarget {
    pub fn from_source(source: impl ElementSource + 'static) -> Self {
        ControlTarget::Handle(Rc::new(source))
    }

    /// Resolve to a live listening target
    pub fn resolve(&self, document: &Document) -> Option<EventTarget> {
        let element = match self {
            ControlTarget::Document => return Some(EventTarget::Document),
            ControlTarget::Element(id) => Some(*id),
            ControlTarget::Ref(slot) => slot.get(),
            ControlTarget::Handle(source) => source.element(),
        };
        element
            .filter(|id| document.is_alive(*id))
            .map(EventTarget::Element)
    }
}

/// Resolve control targets, skipping unresolvable ones and duplicates
pub fn resolve_targets(document: &Document, targets: &[ControlTarget]) -> SmallVec<[EventTarget; 4]> {
    let mut resolved = SmallVec::<[EventTarget; 4]>::new();
    for target in targets {
        match target.resolve(document) {
            Some(t) if !resolved.contains(&t) => resolved.push(t),
            Some(_) => {}
            None => tracing::trace!(?target, "control target not resolvable, skipped"),
        }
    }
    resolved
}

/// Listeners registered on behalf of one owner, removed together
#[derive(Default)]
pub struct ListenerSet {
    document: Option<Document>,
    ids: SmallVec<[ListenerId; 16]>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on `target` for each of `event_types`
    pub fn attach(
        &mut self,
        document: &Document,
        target: EventTarget,
        types: impl IntoIterator<Item = EventType>,
        handler: &EventHandler,
    ) {
        if self.document.is_none() {
            self.document = Some(document.clone());
        }
        for event_type in types {
            self.ids
                .push(document.add_shared_listener(target, event_type, handler.clone()));
        }
    }

    /// Remove every listener in the set. Returns how many were still registered.
    pub fn detach_all(&mut self) -> usize {
        let Some(document) = self.document.take() else {
            return 0;
        };
        self.ids
            .drain(..)
            .filter(|id| document.remove_listener(*id))
            .count()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        self.detach_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipt_core::events::KeyCode;

    const OPEN: RouteState = RouteState {
        locked: false,
        flipped: false,
    };
    const SHOWING_BACK: RouteState = RouteState {
        locked: false,
        flipped: true,
    };

    fn at(event: Event, current: EventTarget) -> Event {
        let mut event = event;
        event.current_target = current;
        event
    }

    #[test]
    fn test_pointer_intents() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();

        let mut enter = Event::pointer(event_types::POINTER_ENTER, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut enter, OPEN), Some(Intent::Activate));
        assert_eq!(router.route(&doc, &mut enter, SHOWING_BACK), None);

        let mut leave = Event::pointer(event_types::POINTER_LEAVE, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut leave, SHOWING_BACK), Some(Intent::Deactivate));
        assert_eq!(router.route(&doc, &mut leave, OPEN), None);
    }

    #[test]
    fn test_locked_rejects_everything() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();
        let locked = RouteState {
            locked: true,
            flipped: true,
        };

        let mut events = [
            Event::pointer(event_types::POINTER_MOVE, card, 0.0, 0.0),
            Event::pointer(event_types::POINTER_LEAVE, card, 0.0, 0.0),
            Event::touch(event_types::TOUCH_END, card, 0.0, 0.0),
            Event::key_down(card, KeyCode::ENTER),
            Event::blur(card, None),
        ];
        for event in &mut events {
            assert_eq!(router.route(&doc, event, locked), None);
        }
    }

    #[test]
    fn test_touch_end_swallows_emulated_pointer() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();

        let mut end = Event::touch(event_types::TOUCH_END, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut end, SHOWING_BACK), Some(Intent::Deactivate));
        assert!(end.default_prevented);
        assert!(router.is_swallowing());

        let mut emulated = Event::synthetic_pointer(event_types::POINTER_MOVE, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut emulated, OPEN), None);

        let mut real = Event::pointer(event_types::POINTER_MOVE, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut real, OPEN), Some(Intent::Activate));
        assert!(!router.is_swallowing());
    }

    #[test]
    fn test_touch_start_ends_swallow_window() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();

        router.route(&doc, &mut Event::touch(event_types::TOUCH_END, card, 0.0, 0.0), OPEN);
        let mut start = Event::touch(event_types::TOUCH_START, card, 0.0, 0.0);
        assert_eq!(router.route(&doc, &mut start, OPEN), Some(Intent::Activate));
        assert!(!router.is_swallowing());
    }

    #[test]
    fn test_uncancelable_touch_end_does_not_swallow() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();

        let mut end = Event::touch(event_types::TOUCH_END, card, 0.0, 0.0).with_cancelable(false);
        router.route(&doc, &mut end, OPEN);
        assert!(!router.is_swallowing());
    }

    #[test]
    fn test_keyboard_toggle() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let router = EventRouter::new();

        let mut enter = Event::key_down(card, KeyCode::ENTER);
        assert_eq!(router.route(&doc, &mut enter, OPEN), Some(Intent::Toggle));
        assert!(enter.default_prevented);

        let mut space = Event::key_down(card, KeyCode::SPACE);
        assert_eq!(router.route(&doc, &mut space, SHOWING_BACK), Some(Intent::Toggle));

        let mut tab = Event::key_down(card, KeyCode::TAB);
        assert_eq!(router.route(&doc, &mut tab, OPEN), None);
        assert!(!tab.default_prevented);
    }

    #[test]
    fn test_keydown_from_descendant_ignored() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let button = doc.create_element(Some(card));
        let router = EventRouter::new();

        let mut event = at(Event::key_down(button, KeyCode::ENTER), card.into());
        assert_eq!(router.route(&doc, &mut event, OPEN), None);
        assert!(!event.default_prevented);

        // Document listeners see every key press
        let mut event = at(Event::key_down(button, KeyCode::ENTER), EventTarget::Document);
        assert_eq!(router.route(&doc, &mut event, OPEN), Some(Intent::Toggle));
    }

    #[test]
    fn test_blur_rules() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let inner = doc.create_element(Some(card));
        let outside = doc.create_element(None);
        let router = EventRouter::new();

        let mut into_child = Event::blur(card, Some(inner));
        assert_eq!(router.route(&doc, &mut into_child, SHOWING_BACK), None);

        let mut away = Event::blur(card, Some(outside));
        assert_eq!(router.route(&doc, &mut away, SHOWING_BACK), Some(Intent::Deactivate));

        let mut nowhere = Event::blur(card, None);
        assert_eq!(router.route(&doc, &mut nowhere, SHOWING_BACK), Some(Intent::Deactivate));
        assert_eq!(router.route(&doc, &mut nowhere, OPEN), None);
    }

    #[test]
    fn test_focus_out_from_descendant() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let link = doc.create_element(Some(card));
        let sibling = doc.create_element(Some(card));
        let outside = doc.create_element(None);
        let router = EventRouter::new();

        // Bubbled to the card listener
        let mut within = Event::focus_out(link, Some(sibling));
        within.current_target = card.into();
        assert_eq!(router.route(&doc, &mut within, SHOWING_BACK), None);

        let mut away = Event::focus_out(link, Some(outside));
        away.current_target = card.into();
        assert_eq!(router.route(&doc, &mut away, SHOWING_BACK), Some(Intent::Deactivate));
    }

    #[test]
    fn test_control_target_resolution() {
        let doc = Document::new();
        let button = doc.create_element(None);
        let slot = ElementRef::new();

        assert_eq!(ControlTarget::Ref(slot.clone()).resolve(&doc), None);
        slot.set(Some(button));
        assert_eq!(
            ControlTarget::Ref(slot.clone()).resolve(&doc),
            Some(EventTarget::Element(button))
        );
        assert_eq!(
            ControlTarget::from_source(slot).resolve(&doc),
            Some(EventTarget::Element(button))
        );
        assert_eq!(ControlTarget::Document.resolve(&doc), Some(EventTarget::Document));

        doc.remove_element(button);
        assert_eq!(ControlTarget::Element(button).resolve(&doc), None);
    }

    #[test]
    fn test_resolve_targets_dedups_and_skips() {
        let doc = Document::new();
        let a = doc.create_element(None);
        let targets = [
            ControlTarget::Element(a),
            ControlTarget::Ref(ElementRef::new()),
            ControlTarget::Element(a),
        ];
        let resolved = resolve_targets(&doc, &targets);
        assert_eq!(resolved.as_slice(), &[EventTarget::Element(a)]);
    }

    #[test]
    fn test_listener_set_detaches() {
        let doc = Document::new();
        let card = doc.create_element(None);
        let handler: EventHandler = Rc::new(|_| {});

        let mut set = ListenerSet::new();
        set.attach(&doc, card.into(), ROUTED_EVENTS, &handler);
        assert_eq!(set.len(), ROUTED_EVENTS.len());
        assert_eq!(doc.total_listeners(), ROUTED_EVENTS.len());

        assert_eq!(set.detach_all(), ROUTED_EVENTS.len());
        assert_eq!(doc.total_listeners(), 0);
        assert_eq!(set.detach_all(), 0);

        set.attach(&doc, EventTarget::Document, ROUTED_EVENTS, &handler);
        drop(set);
        assert_eq!(doc.total_listeners(), 0);
    }
}
