//! Imperative handle
//!
//! A panel exposes one [`UnifiedHandle`]: its own flip controls plus the
//! mounted engine's tilt handle. Hosts hold a [`HandleRef`], a stable slot the
//! panel republishes into whenever the engine mounts, unmounts, or remounts.
//! Before the engine mounts (and after it unmounts) the tilt half falls back
//! to an inert handle.

use flipt_animation::AnimationCompletion;
use flipt_core::dom::{ElementId, ElementSource};
use flipt_tilt::{Angle, InertHandle, TiltHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// Resolves when a flip's rotation settles or a later flip supersedes it
pub type FlipCompletion = AnimationCompletion;

/// Flip half of the handle
pub trait FlipControl {
    /// Flip to the other face. Resolves when the rotation comes to rest.
    fn flip(&self) -> FlipCompletion;

    fn is_flipped(&self) -> bool;
}

/// Flip controls and engine handle in one value
#[derive(Clone)]
pub struct UnifiedHandle {
    control: Rc<dyn FlipControl>,
    engine: Option<Rc<dyn TiltHandle>>,
}

impl UnifiedHandle {
    pub fn new(control: Rc<dyn FlipControl>, engine: Option<Rc<dyn TiltHandle>>) -> Self {
        Self { control, engine }
    }

    /// Whether the engine half is a live engine handle
    pub fn is_engine_mounted(&self) -> bool {
        self.engine.is_some()
    }

    /// The engine's handle, if mounted
    pub fn engine(&self) -> Option<&Rc<dyn TiltHandle>> {
        self.engine.as_ref()
    }

    fn tilt_handle(&self) -> &dyn TiltHandle {
        match &self.engine {
            Some(handle) => handle.as_ref(),
            None => &InertHandle,
        }
    }
}

impl std::fmt::Debug for UnifiedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedHandle")
            .field("flipped", &self.control.is_flipped())
            .field("element", &self.element())
            .finish()
    }
}

impl FlipControl for UnifiedHandle {
    fn flip(&self) -> FlipCompletion {
        self.control.flip()
    }

    fn is_flipped(&self) -> bool {
        self.control.is_flipped()
    }
}

impl ElementSource for UnifiedHandle {
    fn element(&self) -> Option<ElementId> {
        self.tilt_handle().element()
    }
}

impl TiltHandle for UnifiedHandle {
    fn angle(&self) -> Angle {
        self.tilt_handle().angle()
    }

    fn reset(&self) {
        self.tilt_handle().reset();
    }

    fn tilt(&self, angle: Angle) {
        self.tilt_handle().tilt(angle);
    }

    fn update_will_change(&self, enabled: bool) {
        self.tilt_handle().update_will_change(enabled);
    }
}

/// Stable slot holding a panel's current handle
#[derive(Clone, Default)]
pub struct HandleRef(Rc<RefCell<Option<UnifiedHandle>>>);

impl HandleRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current handle, if a panel has published one
    pub fn get(&self) -> Option<UnifiedHandle> {
        self.0.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn publish(&self, handle: UnifiedHandle) {
        *self.0.borrow_mut() = Some(handle);
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

impl std::fmt::Debug for HandleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HandleRef").field(&self.get()).finish()
    }
}

impl ElementSource for HandleRef {
    fn element(&self) -> Option<ElementId> {
        self.get().and_then(|handle| handle.element())
    }
}

/// Keeps a [`HandleRef`] in step with the engine the panel has mounted
pub struct HandleBridge {
    handle_ref: HandleRef,
    control: Rc<dyn FlipControl>,
    engine: Option<Rc<dyn TiltHandle>>,
    published: bool,
}

impl HandleBridge {
    pub fn new(handle_ref: HandleRef, control: Rc<dyn FlipControl>) -> Self {
        Self {
            handle_ref,
            control,
            engine: None,
            published: false,
        }
    }

    pub fn handle_ref(&self) -> &HandleRef {
        &self.handle_ref
    }

    /// Publish a fresh handle if the engine handle changed identity.
    /// Returns true if a handle was published.
    pub fn sync(&mut self, engine: Option<Rc<dyn TiltHandle>>) -> bool {
        let same = match (&self.engine, &engine) {
            (Some(current), Some(next)) => Rc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if same && self.published {
            return false;
        }

        self.engine = engine;
        self.handle_ref
            .publish(UnifiedHandle::new(self.control.clone(), self.engine.clone()));
        self.published = true;
        tracing::trace!(mounted = self.engine.is_some(), "handle published");
        true
    }
}
