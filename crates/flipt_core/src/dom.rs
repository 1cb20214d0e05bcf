//! Headless element tree
//!
//! A minimal document model: elements with parent links, listener
//! registration per target and event type, and dispatch with target and
//! bubble phases. Widgets attach listeners to their own surface element or to
//! the document itself; hosts feed platform input in through [`Document::dispatch`].
//!
//! `Document` is a cheap, clonable handle. Handlers run with no internal
//! borrow held, so they may query the tree or register listeners themselves.

use crate::events::{event_types, Event, EventType};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Unique identifier for an element in a document
    pub struct ElementId;
    /// Registration token returned by [`Document::add_listener`]
    pub struct ListenerId;
}

/// Where an event is dispatched or a listener is registered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Element(ElementId),
    /// The document itself, last stop of every bubbling event
    Document,
}

impl From<ElementId> for EventTarget {
    fn from(id: ElementId) -> Self {
        EventTarget::Element(id)
    }
}

impl EventTarget {
    pub fn element(self) -> Option<ElementId> {
        match self {
            EventTarget::Element(id) => Some(id),
            EventTarget::Document => None,
        }
    }
}

/// Anything that can point at a live element
pub trait ElementSource {
    fn element(&self) -> Option<ElementId>;
}

impl ElementSource for ElementId {
    fn element(&self) -> Option<ElementId> {
        Some(*self)
    }
}

impl<T: ElementSource + ?Sized> ElementSource for Rc<T> {
    fn element(&self) -> Option<ElementId> {
        (**self).element()
    }
}

/// Event handler function type
pub type EventHandler = Rc<dyn Fn(&mut Event)>;

struct Node {
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
}

struct Listener {
    target: EventTarget,
    event_type: EventType,
    handler: EventHandler,
}

#[derive(Default)]
struct DocumentInner {
    nodes: SlotMap<ElementId, Node>,
    listeners: SlotMap<ListenerId, Listener>,
    by_target: FxHashMap<(EventTarget, EventType), SmallVec<[ListenerId; 2]>>,
    focused: Option<ElementId>,
}

impl DocumentInner {
    fn unregister(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        let key = (listener.target, listener.event_type);
        if let Some(ids) = self.by_target.get_mut(&key) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.by_target.remove(&key);
            }
        }
        true
    }
}

/// Shared handle to an element tree and its listeners
#[derive(Clone, Default)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("elements", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .field("focused", &inner.focused)
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element. A dead or absent parent makes it a top-level element.
    pub fn create_element(&self, parent: Option<ElementId>) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let parent = parent.filter(|p| inner.nodes.contains_key(*p));
        let id = inner.nodes.insert(Node {
            parent,
            children: SmallVec::new(),
        });
        if let Some(node) = parent.and_then(|p| inner.nodes.get_mut(p)) {
            node.children.push(id);
        }
        id
    }

    /// Remove an element, its subtree, and every listener registered on them
    pub fn remove_element(&self, id: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(parent) = inner.nodes.get(id).map(|n| n.parent) else {
            return false;
        };
        if let Some(node) = parent.and_then(|p| inner.nodes.get_mut(p)) {
            node.children.retain(|c| *c != id);
        }

        let mut stack = vec![id];
        let mut removed = Vec::new();
        while let Some(next) = stack.pop() {
            if let Some(node) = inner.nodes.remove(next) {
                stack.extend(node.children);
                removed.push(next);
            }
        }

        let doomed: Vec<ListenerId> = inner
            .listeners
            .iter()
            .filter(|(_, l)| matches!(l.target, EventTarget::Element(e) if removed.contains(&e)))
            .map(|(lid, _)| lid)
            .collect();
        for lid in doomed {
            inner.unregister(lid);
        }

        if inner.focused.is_some_and(|f| removed.contains(&f)) {
            inner.focused = None;
        }
        tracing::trace!("removed {} element(s)", removed.len());
        true
    }

    pub fn is_alive(&self, id: ElementId) -> bool {
        self.inner.borrow().nodes.contains_key(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.borrow().nodes.get(id).and_then(|n| n.parent)
    }

    /// Inclusive containment, like the DOM's `Node.contains`.
    ///
    /// The document contains every target; an element never contains the document.
    pub fn contains(&self, ancestor: EventTarget, node: EventTarget) -> bool {
        match (ancestor, node) {
            (EventTarget::Document, _) => true,
            (EventTarget::Element(_), EventTarget::Document) => false,
            (EventTarget::Element(a), EventTarget::Element(n)) => {
                let inner = self.inner.borrow();
                let mut current = Some(n);
                while let Some(id) = current {
                    if id == a {
                        return true;
                    }
                    current = inner.nodes.get(id).and_then(|node| node.parent);
                }
                false
            }
        }
    }

    /// Register a handler for an event type on a target
    pub fn add_listener<F>(&self, target: EventTarget, event_type: EventType, handler: F) -> ListenerId
    where
        F: Fn(&mut Event) + 'static,
    {
        self.add_shared_listener(target, event_type, Rc::new(handler))
    }

    /// Register an already shared handler
    pub fn add_shared_listener(
        &self,
        target: EventTarget,
        event_type: EventType,
        handler: EventHandler,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.listeners.insert(Listener {
            target,
            event_type,
            handler,
        });
        inner
            .by_target
            .entry((target, event_type))
            .or_default()
            .push(id);
        id
    }

    /// Unregister a listener. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().unregister(id)
    }

    /// Number of listeners for a target and event type
    pub fn listener_count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.inner
            .borrow()
            .by_target
            .get(&(target, event_type))
            .map_or(0, |ids| ids.len())
    }

    /// Number of listeners registered anywhere in the document
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.inner.borrow().focused
    }

    /// Move focus, dispatching blur then focus-out to the previously focused
    /// element (with the new element as related target) and focus to the new one.
    pub fn focus(&self, next: Option<ElementId>) {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            let next = next.filter(|id| inner.nodes.contains_key(*id));
            if inner.focused == next {
                return;
            }
            std::mem::replace(&mut inner.focused, next)
        };
        if let Some(prev) = previous {
            self.dispatch(Event::blur(prev, next));
            self.dispatch(Event::focus_out(prev, next));
        }
        if let Some(next) = next {
            let mut focus = Event::blur(next, previous);
            focus.event_type = event_types::FOCUS;
            self.dispatch(focus);
        }
    }

    fn propagation_path(&self, event: &Event) -> SmallVec<[EventTarget; 8]> {
        let inner = self.inner.borrow();
        let mut path = SmallVec::new();
        match event.target {
            EventTarget::Document => path.push(EventTarget::Document),
            EventTarget::Element(id) => {
                if !inner.nodes.contains_key(id) {
                    return path;
                }
                path.push(EventTarget::Element(id));
                if event_types::bubbles(event.event_type) {
                    let mut current = inner.nodes.get(id).and_then(|n| n.parent);
                    while let Some(ancestor) = current {
                        path.push(EventTarget::Element(ancestor));
                        current = inner.nodes.get(ancestor).and_then(|n| n.parent);
                    }
                    path.push(EventTarget::Document);
                }
            }
        }
        path
    }

    fn handlers_for(&self, target: EventTarget, event_type: EventType) -> Vec<(ListenerId, EventHandler)> {
        let inner = self.inner.borrow();
        inner
            .by_target
            .get(&(target, event_type))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.listeners.get(*id).map(|l| (*id, l.handler.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dispatch an event through its propagation path.
    ///
    /// Returns the event so callers can inspect `default_prevented`.
    pub fn dispatch(&self, mut event: Event) -> Event {
        let path = self.propagation_path(&event);
        if path.is_empty() {
            tracing::trace!("dispatch to dead target {:?} dropped", event.target);
            return event;
        }

        for node in path {
            event.current_target = node;
            for (id, handler) in self.handlers_for(node, event.event_type) {
                if event.propagation_stopped {
                    break;
                }
                // A handler earlier in this pass may have detached this one
                if !self.inner.borrow().listeners.contains_key(id) {
                    continue;
                }
                handler(&mut event);
            }
            if event.propagation_stopped {
                break;
            }
        }
        event.current_target = event.target;
        event
    }
}
