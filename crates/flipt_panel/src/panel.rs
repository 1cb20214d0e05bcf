//! Flip panel widget
//!
//! A two-sided panel that flips to its back face on hover, touch, or the
//! keyboard and flips back when the pointer leaves, the touch ends, or focus
//! moves away. The back face sits on a tilt or parallax engine surface; the
//! front face is pre-rotated so both share one grid cell.
//!
//! The host drives the panel:
//!
//! - [`FlipPanel::mount`] once the document exists
//! - [`Document::dispatch`] for platform input
//! - [`FlipPanel::tick`] once per frame
//! - [`FlipPanel::render`] whenever `tick` reports a change
//!
//! ```rust
//! use flipt_core::dom::Document;
//! use flipt_core::events::{event_types, Event};
//! use flipt_panel::FlipPanel;
//!
//! let doc = Document::new();
//! let panel = FlipPanel::builder().front("front.png").back("back.png").build();
//! let surface = panel.mount(&doc, None).unwrap();
//!
//! doc.dispatch(Event::pointer(event_types::POINTER_ENTER, surface, 10.0, 10.0));
//! assert!(panel.is_flipped());
//!
//! while panel.tick(1.0 / 60.0) {}
//! assert_eq!(panel.rotation(), 0.0);
//! ```

use crate::config::FlipConfig;
use crate::error::Result;
use crate::handle::{FlipCompletion, FlipControl, HandleBridge, HandleRef, UnifiedHandle};
use crate::render::{self, FaceContent};
use crate::router::{self, ControlTarget, EventRouter, ListenerSet, RouteState, ROUTED_EVENTS, SURFACE_EVENTS};
use crate::state::{FlipSide, FlipStateMachine, LayerHints};
use flipt_animation::AnimationCompletion;
use flipt_core::dom::{Document, ElementId, ElementSource, EventHandler, EventTarget};
use flipt_core::events::{Event, EventType};
use flipt_core::scene::{RenderNode, Style};
use flipt_tilt::{EngineProps, HeadlessEngine, RenderWrapper, TiltEngine, TiltHandle};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Called with the panel's root element when a flip starts
pub type FlipCallback = Rc<dyn Fn(ElementId)>;

struct Mount {
    document: Document,
    parent: Option<ElementId>,
}

struct PanelInner {
    config: FlipConfig,
    state: FlipStateMachine,
    router: EventRouter,
    engine: Box<dyn TiltEngine>,
    mount: Option<Mount>,
    front: FaceContent,
    back: FaceContent,
    tilt_style: Style,
    control_targets: Vec<ControlTarget>,
    on_flip: Option<FlipCallback>,
    on_flip_back: Option<FlipCallback>,
    host_handlers: FxHashMap<EventType, EventHandler>,
    surface_listeners: ListenerSet,
    control_listeners: ListenerSet,
    bridge: HandleBridge,
}

impl PanelInner {
    fn root_element(&self) -> Option<ElementId> {
        let mount = self.mount.as_ref()?;
        self.engine
            .handle()
            .and_then(|handle| handle.element())
            .filter(|id| mount.document.is_alive(*id))
    }

    fn route_state(&self) -> RouteState {
        RouteState {
            locked: self.config.is_flip_locked(),
            flipped: self.state.is_flipped(),
        }
    }

    /// Whether the panel's own surface drives flips
    fn surface_listening(&self) -> bool {
        !self.config.full_page_listening
            && (self.control_targets.is_empty() || !self.config.control_element_only)
    }

    /// Targets other than the surface that drive flips
    fn listening_targets(&self, document: &Document) -> SmallVec<[EventTarget; 4]> {
        if self.config.full_page_listening {
            let mut targets = SmallVec::new();
            targets.push(EventTarget::Document);
            targets
        } else {
            router::resolve_targets(document, &self.control_targets)
        }
    }

    /// Event types the surface listens for
    fn surface_event_types(&self) -> SmallVec<[EventType; 12]> {
        let mut types: SmallVec<[EventType; 12]> = SURFACE_EVENTS.iter().copied().collect();
        for event_type in self.host_handlers.keys() {
            if !types.contains(event_type) {
                types.push(*event_type);
            }
        }
        types
    }

    fn engine_props(&self, weak: &Weak<RefCell<PanelInner>>) -> EngineProps {
        EngineProps {
            kind: self.config.engine_kind(),
            settings: self.config.engine_settings(),
            style: render::engine_style(&self.tilt_style),
            wrapper: Some(render_wrapper(weak.clone())),
        }
    }
}

/// Renders the rotating container around whatever the engine hands in
fn render_wrapper(weak: Weak<RefCell<PanelInner>>) -> RenderWrapper {
    Rc::new(move |children: Vec<RenderNode>| match weak.upgrade() {
        Some(inner) => {
            let panel = inner.borrow();
            render::container(
                &panel.config,
                panel.state.rotation(),
                panel.state.hints(),
                render::front_layer(&panel.config, &panel.front),
                children,
            )
        }
        None => RenderNode::container().children(children),
    })
}

/// Flip to the other face.
///
/// Borrows are released around the callbacks so they may call back into the
/// panel (including through its handle).
fn flip_panel(inner: &Rc<RefCell<PanelInner>>) -> AnimationCompletion {
    let (side, element, callback) = {
        let mut panel = inner.borrow_mut();
        let Some(element) = panel.root_element() else {
            tracing::trace!("flip requested before mount");
            return AnimationCompletion::ready();
        };
        let side = panel.state.begin();
        let callback = match side {
            FlipSide::Back => panel.on_flip.clone(),
            FlipSide::Front => panel.on_flip_back.clone(),
        };
        (side, element, callback)
    };
    tracing::debug!(?side, "flip");

    if let Some(callback) = callback {
        callback(element);
    }

    let mut panel = inner.borrow_mut();
    // A callback that flipped again has already started the newer animation
    if panel.state.side() != side {
        return AnimationCompletion::ready();
    }
    panel.state.animate(side)
}

fn route_event(inner: &Rc<RefCell<PanelInner>>, event: &mut Event) {
    let intent = {
        let panel = inner.borrow();
        let Some(mount) = panel.mount.as_ref() else {
            return;
        };
        panel.router.route(&mount.document, event, panel.route_state())
    };
    if let Some(intent) = intent {
        tracing::trace!(?intent, event_type = event.event_type, "routed");
        flip_panel(inner);
    }
}

fn control_handler(weak: Weak<RefCell<PanelInner>>) -> EventHandler {
    Rc::new(move |event: &mut Event| {
        if let Some(inner) = weak.upgrade() {
            route_event(&inner, event);
        }
    })
}

fn surface_handler(weak: Weak<RefCell<PanelInner>>) -> EventHandler {
    Rc::new(move |event: &mut Event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let (listening, host) = {
            let panel = inner.borrow();
            (
                panel.surface_listening(),
                panel.host_handlers.get(&event.event_type).cloned(),
            )
        };
        if listening && SURFACE_EVENTS.contains(&event.event_type) {
            route_event(&inner, event);
        }
        if let Some(host) = host {
            host(event);
        }
    })
}

/// Flip controls backing a panel's handle
struct PanelControl {
    inner: Weak<RefCell<PanelInner>>,
}

impl FlipControl for PanelControl {
    fn flip(&self) -> FlipCompletion {
        match self.inner.upgrade() {
            Some(inner) => flip_panel(&inner),
            None => AnimationCompletion::ready(),
        }
    }

    fn is_flipped(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.borrow().state.is_flipped())
    }
}

/// Two-sided flipping panel
pub struct FlipPanel {
    inner: Rc<RefCell<PanelInner>>,
}

impl FlipPanel {
    pub fn builder() -> FlipPanelBuilder {
        FlipPanelBuilder::new()
    }

    /// Panel with the headless engine and no content
    pub fn new(config: FlipConfig) -> Self {
        FlipPanelBuilder::new().config(config).build()
    }

    /// Mount the engine under `parent` and start listening.
    ///
    /// Returns the panel's root element. Mounting a mounted panel remounts it.
    pub fn mount(&self, document: &Document, parent: Option<ElementId>) -> Option<ElementId> {
        self.unmount();

        let weak = Rc::downgrade(&self.inner);
        let mut panel = self.inner.borrow_mut();
        let props = panel.engine_props(&weak);
        let handle = panel.engine.mount(document, parent, props);
        panel.mount = Some(Mount {
            document: document.clone(),
            parent,
        });
        panel.bridge.sync(Some(handle));

        attach_surface(&mut panel, &weak);
        attach_controls(&mut panel, &weak);

        let root = panel.root_element();
        tracing::debug!(?root, engine = panel.config.engine.name(), "flip panel mounted");
        root
    }

    /// Detach every listener and unmount the engine. No-op when not mounted.
    pub fn unmount(&self) {
        let mut panel = self.inner.borrow_mut();
        if panel.mount.take().is_none() {
            return;
        }
        let detached = panel.surface_listeners.detach_all() + panel.control_listeners.detach_all();
        panel.engine.unmount();
        panel.bridge.sync(None);
        tracing::debug!(detached, "flip panel unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mount.is_some()
    }

    /// The engine's root element while mounted
    pub fn root_element(&self) -> Option<ElementId> {
        self.inner.borrow().root_element()
    }

    /// Flip to the other face, regardless of `disabled` or a forced face.
    ///
    /// The returned completion resolves when the rotation settles or a later
    /// flip supersedes it. Before mount this is a no-op.
    pub fn flip(&self) -> FlipCompletion {
        flip_panel(&self.inner)
    }

    pub fn is_flipped(&self) -> bool {
        self.inner.borrow().state.is_flipped()
    }

    /// Current rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.inner.borrow().state.rotation()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().state.is_animating()
    }

    pub fn hints(&self) -> LayerHints {
        self.inner.borrow().state.hints()
    }

    /// Advance one frame. Returns true if the panel needs to re-render.
    pub fn tick(&self, dt: f32) -> bool {
        self.inner.borrow_mut().state.tick(dt)
    }

    /// Render the panel. `None` when not mounted.
    pub fn render(&self) -> Option<RenderNode> {
        let panel = self.inner.borrow();
        panel.mount.as_ref()?;
        let back = render::back_layer(&panel.config, &panel.back);
        panel.engine.render(vec![back])
    }

    /// The panel's current handle
    pub fn handle(&self) -> Option<UnifiedHandle> {
        self.inner.borrow().bridge.handle_ref().get()
    }

    /// The stable slot the panel publishes its handle into
    pub fn handle_ref(&self) -> HandleRef {
        self.inner.borrow().bridge.handle_ref().clone()
    }

    /// The mounted engine's handle
    pub fn engine_handle(&self) -> Option<Rc<dyn TiltHandle>> {
        self.inner.borrow().engine.handle()
    }

    pub fn config(&self) -> FlipConfig {
        self.inner.borrow().config.clone()
    }

    /// Number of listeners registered on the surface and on control targets
    pub fn listener_count(&self) -> usize {
        let panel = self.inner.borrow();
        panel.surface_listeners.len() + panel.control_listeners.len()
    }

    /// Replace the control elements and re-register listeners
    pub fn set_control_targets(&self, targets: impl IntoIterator<Item = ControlTarget>) {
        self.inner.borrow_mut().control_targets = targets.into_iter().collect();
        self.refresh_listeners();
    }

    pub fn set_full_page_listening(&self, enabled: bool) {
        self.inner.borrow_mut().config.full_page_listening = enabled;
        self.refresh_listeners();
    }

    pub fn set_control_element_only(&self, enabled: bool) {
        self.inner.borrow_mut().config.control_element_only = enabled;
        self.refresh_listeners();
    }

    /// Resolve control targets again, e.g. after a host filled an
    /// [`ElementRef`](crate::router::ElementRef).
    pub fn refresh_listeners(&self) {
        let weak = Rc::downgrade(&self.inner);
        let mut panel = self.inner.borrow_mut();
        if panel.mount.is_some() {
            attach_controls(&mut panel, &weak);
        }
    }

    /// Apply a new configuration.
    ///
    /// Engine-facing changes remount the engine (publishing a new handle).
    /// A forced face that disagrees with the face showing flips the panel,
    /// or, before mount, becomes the face the panel mounts with.
    pub fn reconfigure(&self, config: FlipConfig) {
        let (remount, flip_needed) = {
            let mut panel = self.inner.borrow_mut();
            let remount = panel.mount.is_some()
                && (panel.config.engine_kind() != config.engine_kind()
                    || panel.config.engine_settings() != config.engine_settings());
            let mismatch = config
                .flipped
                .is_some_and(|forced| forced != panel.state.is_flipped());
            if mismatch && panel.mount.is_none() {
                // Nothing on screen to animate: start at the forced face's rest
                tracing::debug!(flipped = ?config.flipped, "forced face applied before mount");
                panel.state = FlipStateMachine::new(&config);
            } else {
                panel.state.set_config(&config);
            }
            panel.config = config;
            (remount, mismatch && panel.mount.is_some())
        };

        if remount {
            let target = self
                .inner
                .borrow()
                .mount
                .as_ref()
                .map(|m| (m.document.clone(), m.parent));
            if let Some((document, parent)) = target {
                self.mount(&document, parent);
            }
        } else {
            self.refresh_listeners();
        }

        if flip_needed {
            flip_panel(&self.inner);
        }
    }
}

impl std::fmt::Debug for FlipPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let panel = self.inner.borrow();
        f.debug_struct("FlipPanel")
            .field("flipped", &panel.state.is_flipped())
            .field("rotation", &panel.state.rotation())
            .field("mounted", &panel.mount.is_some())
            .finish()
    }
}

impl Drop for FlipPanel {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn attach_surface(panel: &mut PanelInner, weak: &Weak<RefCell<PanelInner>>) {
    panel.surface_listeners.detach_all();
    let (Some(mount), Some(root)) = (panel.mount.as_ref(), panel.root_element()) else {
        return;
    };
    let document = mount.document.clone();
    let types = panel.surface_event_types();
    panel
        .surface_listeners
        .attach(&document, root.into(), types, &surface_handler(weak.clone()));
}

fn attach_controls(panel: &mut PanelInner, weak: &Weak<RefCell<PanelInner>>) {
    panel.control_listeners.detach_all();
    let Some(document) = panel.mount.as_ref().map(|m| m.document.clone()) else {
        return;
    };
    let handler = control_handler(weak.clone());
    for target in panel.listening_targets(&document) {
        panel
            .control_listeners
            .attach(&document, target, ROUTED_EVENTS, &handler);
    }
    tracing::trace!(
        listeners = panel.control_listeners.len(),
        surface = panel.surface_listening(),
        "control listeners attached"
    );
}

/// Builder for [`FlipPanel`]
pub struct FlipPanelBuilder {
    config: FlipConfig,
    front: FaceContent,
    back: FaceContent,
    tilt_style: Style,
    control_targets: Vec<ControlTarget>,
    on_flip: Option<FlipCallback>,
    on_flip_back: Option<FlipCallback>,
    host_handlers: FxHashMap<EventType, EventHandler>,
    handle_ref: Option<HandleRef>,
    engine: Option<Box<dyn TiltEngine>>,
}

impl Default for FlipPanelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlipPanelBuilder {
    pub fn new() -> Self {
        Self {
            config: FlipConfig::default(),
            front: FaceContent::Empty,
            back: FaceContent::Empty,
            tilt_style: Style::new(),
            control_targets: Vec::new(),
            on_flip: None,
            on_flip_back: None,
            host_handlers: FxHashMap::default(),
            handle_ref: None,
            engine: None,
        }
    }

    pub fn config(mut self, config: FlipConfig) -> Self {
        self.config = config;
        self
    }

    pub fn front(mut self, content: impl Into<FaceContent>) -> Self {
        self.front = content.into();
        self
    }

    pub fn back(mut self, content: impl Into<FaceContent>) -> Self {
        self.back = content.into();
        self
    }

    /// Extra style for the engine surface
    pub fn tilt_style(mut self, style: Style) -> Self {
        self.tilt_style = style;
        self
    }

    pub fn control_element(mut self, target: impl Into<ControlTarget>) -> Self {
        self.control_targets.push(target.into());
        self
    }

    pub fn control_elements(mut self, targets: impl IntoIterator<Item = ControlTarget>) -> Self {
        self.control_targets.extend(targets);
        self
    }

    /// Called when the panel starts flipping to its back face
    pub fn on_flip<F: Fn(ElementId) + 'static>(mut self, callback: F) -> Self {
        self.on_flip = Some(Rc::new(callback));
        self
    }

    /// Called when the panel starts flipping to its front face
    pub fn on_flip_back<F: Fn(ElementId) + 'static>(mut self, callback: F) -> Self {
        self.on_flip_back = Some(Rc::new(callback));
        self
    }

    /// Host handler for a surface event, run after the panel's own handling
    pub fn on_event<F: Fn(&mut Event) + 'static>(mut self, event_type: EventType, handler: F) -> Self {
        self.host_handlers.insert(event_type, Rc::new(handler));
        self
    }

    /// Publish the panel's handle into an existing slot
    pub fn handle_ref(mut self, handle_ref: HandleRef) -> Self {
        self.handle_ref = Some(handle_ref);
        self
    }

    /// Use a specific engine instead of the headless one
    pub fn engine(mut self, engine: impl TiltEngine + 'static) -> Self {
        self.engine = Some(Box::new(engine));
        self
    }

    /// Validate the configuration, then build
    pub fn try_build(self) -> Result<FlipPanel> {
        self.config.validate()?;
        Ok(self.build())
    }

    pub fn build(self) -> FlipPanel {
        let handle_ref = self.handle_ref.unwrap_or_default();
        let engine: Box<dyn TiltEngine> = match self.engine {
            Some(engine) => engine,
            None => Box::new(HeadlessEngine::new()),
        };
        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<PanelInner>>| {
            let control: Rc<dyn FlipControl> = Rc::new(PanelControl { inner: weak.clone() });
            RefCell::new(PanelInner {
                state: FlipStateMachine::new(&self.config),
                config: self.config,
                router: EventRouter::new(),
                engine,
                mount: None,
                front: self.front,
                back: self.back,
                tilt_style: self.tilt_style,
                control_targets: self.control_targets,
                on_flip: self.on_flip,
                on_flip_back: self.on_flip_back,
                host_handlers: self.host_handlers,
                surface_listeners: ListenerSet::new(),
                control_listeners: ListenerSet::new(),
                bridge: HandleBridge::new(handle_ref, control),
            })
        });
        inner.borrow_mut().bridge.sync(None);
        FlipPanel { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipt_core::events::event_types;
    use std::cell::Cell;

    #[test]
    fn test_flip_before_mount_is_noop() {
        let panel = FlipPanel::new(FlipConfig::default());
        let done = panel.flip();
        assert!(done.is_complete());
        assert!(!panel.is_flipped());
        assert_eq!(panel.rotation(), -180.0);
        assert!(panel.render().is_none());
    }

    #[test]
    fn test_handle_published_at_build() {
        let slot = HandleRef::new();
        let panel = FlipPanel::builder().handle_ref(slot.clone()).build();
        let handle = slot.get().unwrap();
        assert!(!handle.is_engine_mounted());
        assert!(!handle.is_flipped());
        drop(panel);
    }

    #[test]
    fn test_mount_and_unmount() {
        let doc = Document::new();
        let panel = FlipPanel::new(FlipConfig::default());
        let root = panel.mount(&doc, None).unwrap();
        assert!(panel.is_mounted());
        assert_eq!(doc.listener_count(root.into(), event_types::POINTER_ENTER), 1);
        assert_eq!(panel.listener_count(), SURFACE_EVENTS.len());

        panel.unmount();
        assert!(!panel.is_mounted());
        assert!(!doc.is_alive(root));
        assert_eq!(doc.total_listeners(), 0);
        assert!(!panel.handle().unwrap().is_engine_mounted());
    }

    #[test]
    fn test_drop_releases_listeners() {
        let doc = Document::new();
        let button = doc.create_element(None);
        let panel = FlipPanel::builder().control_element(button).build();
        panel.mount(&doc, None);
        assert!(doc.total_listeners() > 0);

        drop(panel);
        assert_eq!(doc.total_listeners(), 0);
    }

    #[test]
    fn test_callback_sees_new_state() {
        let doc = Document::new();
        let seen = Rc::new(Cell::new(None));
        let slot = HandleRef::new();

        let seen_in = seen.clone();
        let slot_in = slot.clone();
        let panel = FlipPanel::builder()
            .handle_ref(slot.clone())
            .on_flip(move |_| {
                let flipped = slot_in.get().map(|h| h.is_flipped());
                seen_in.set(flipped);
            })
            .build();
        panel.mount(&doc, None);
        panel.flip();

        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    fn test_host_handler_runs_after_panel() {
        let doc = Document::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let order_in = order.clone();
        let slot = HandleRef::new();
        let slot_in = slot.clone();

        let panel = FlipPanel::builder()
            .handle_ref(slot)
            .on_event(event_types::POINTER_ENTER, move |_| {
                let flipped = slot_in.get().is_some_and(|h| h.is_flipped());
                order_in.borrow_mut().push(flipped);
            })
            .build();
        let root = panel.mount(&doc, None).unwrap();

        doc.dispatch(Event::pointer(event_types::POINTER_ENTER, root, 0.0, 0.0));
        assert_eq!(*order.borrow(), vec![true]);
    }

    #[test]
    fn test_host_handler_for_unrouted_event() {
        let doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let hits_in = hits.clone();
        let panel = FlipPanel::builder()
            .on_event(event_types::FOCUS, move |_| hits_in.set(hits_in.get() + 1))
            .build();
        let root = panel.mount(&doc, None).unwrap();

        doc.focus(Some(root));
        assert_eq!(hits.get(), 1);
        assert!(!panel.is_flipped());
    }

    #[test]
    fn test_try_build_rejects_bad_spring() {
        let result = FlipPanel::builder()
            .config(FlipConfig::new().mass(-1.0))
            .try_build();
        assert!(result.is_err());
    }
}
