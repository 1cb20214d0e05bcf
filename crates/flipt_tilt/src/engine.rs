//! Engine contract

use crate::handle::TiltHandle;
use crate::options::{EngineKind, EngineSettings};
use flipt_core::dom::{Document, ElementId};
use flipt_core::scene::{RenderNode, Style};
use std::rc::Rc;

/// Wraps the engine's children before they are placed on the tilt surface
pub type RenderWrapper = Rc<dyn Fn(Vec<RenderNode>) -> RenderNode>;

/// Everything a host passes to an engine at mount time
#[derive(Clone, Default)]
pub struct EngineProps {
    pub kind: EngineKind,
    pub settings: EngineSettings,
    /// Style for the tilting surface, already merged with host overrides
    pub style: Style,
    pub wrapper: Option<RenderWrapper>,
}

impl std::fmt::Debug for EngineProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineProps")
            .field("kind", &self.kind)
            .field("settings", &self.settings)
            .field("style", &self.style)
            .field("wrapper", &self.wrapper.is_some())
            .finish()
    }
}

/// A pointer-tracking surface a widget can render inside
pub trait TiltEngine {
    /// Create the engine's root element under `parent` and return its handle.
    ///
    /// Mounting an already mounted engine remounts it.
    fn mount(
        &mut self,
        document: &Document,
        parent: Option<ElementId>,
        props: EngineProps,
    ) -> Rc<dyn TiltHandle>;

    /// Remove the root element. No-op when not mounted.
    fn unmount(&mut self);

    /// Handle of the mounted engine
    fn handle(&self) -> Option<Rc<dyn TiltHandle>>;

    /// Render `children` on the tilt surface, through the render wrapper if
    /// one was supplied. `None` when not mounted.
    fn render(&self, children: Vec<RenderNode>) -> Option<RenderNode>;
}
