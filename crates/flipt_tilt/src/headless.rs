//! Headless engine
//!
//! Mounts a root surface element and keeps the tilt angle and will-change
//! hint in memory. It does not track the pointer on its own; hosts drive it
//! through [`TiltHandle::tilt`] and [`TiltHandle::reset`].

use crate::engine::{EngineProps, TiltEngine};
use crate::handle::{Angle, TiltHandle};
use crate::options::EngineKind;
use flipt_core::dom::{Document, ElementId, ElementSource};
use flipt_core::scene::{RenderNode, Style};
use std::cell::Cell;
use std::rc::Rc;

/// Handle of a mounted [`HeadlessEngine`]
#[derive(Debug)]
pub struct HeadlessHandle {
    element: ElementId,
    angle: Cell<Angle>,
    will_change: Cell<bool>,
    max_angle: (f32, f32),
    reverse: bool,
    disabled: bool,
}

impl HeadlessHandle {
    pub fn will_change(&self) -> bool {
        self.will_change.get()
    }
}

impl ElementSource for HeadlessHandle {
    fn element(&self) -> Option<ElementId> {
        Some(self.element)
    }
}

impl TiltHandle for HeadlessHandle {
    fn angle(&self) -> Angle {
        self.angle.get()
    }

    fn reset(&self) {
        self.angle.set(Angle::ZERO);
    }

    fn tilt(&self, angle: Angle) {
        if self.disabled {
            return;
        }
        let sign = if self.reverse { -1.0 } else { 1.0 };
        let (max_x, max_y) = self.max_angle;
        self.angle.set(Angle {
            angle_x: (angle.angle_x * sign).clamp(-max_x, max_x),
            angle_y: (angle.angle_y * sign).clamp(-max_y, max_y),
        });
    }

    fn update_will_change(&self, enabled: bool) {
        self.will_change.set(enabled);
    }
}

struct Mounted {
    document: Document,
    handle: Rc<HeadlessHandle>,
    props: EngineProps,
}

/// Engine with a real surface element and no pointer tracking
#[derive(Default)]
pub struct HeadlessEngine {
    mounted: Option<Mounted>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Props received at the last mount
    pub fn props(&self) -> Option<&EngineProps> {
        self.mounted.as_ref().map(|m| &m.props)
    }

    fn surface_style(mounted: &Mounted) -> Style {
        let props = &mounted.props;
        let angle = mounted.handle.angle();
        let mut style = Style::new()
            .with("border-radius", props.settings.border_radius.clone())
            .with("transform-style", "preserve-3d");

        if angle != Angle::ZERO {
            style.set(
                "transform",
                format!(
                    "perspective(1000px) rotateX({}deg) rotateY({}deg)",
                    angle.angle_x, angle.angle_y
                ),
            );
        }
        if mounted.handle.will_change() {
            style.set("will-change", "transform");
        }
        if let EngineKind::Parallax(options) = &props.kind {
            if options.overflow_hidden_enable {
                style.set("overflow", "hidden");
            }
        }
        style.merged(&props.style)
    }
}

impl TiltEngine for HeadlessEngine {
    fn mount(
        &mut self,
        document: &Document,
        parent: Option<ElementId>,
        props: EngineProps,
    ) -> Rc<dyn TiltHandle> {
        self.unmount();

        let element = document.create_element(parent);
        let handle = Rc::new(HeadlessHandle {
            element,
            angle: Cell::new(Angle::ZERO),
            will_change: Cell::new(false),
            max_angle: (props.settings.tilt_max_angle_x, props.settings.tilt_max_angle_y),
            reverse: props.settings.tilt_reverse,
            disabled: props.settings.disabled,
        });
        tracing::debug!(engine = props.kind.name(), ?element, "engine mounted");

        self.mounted = Some(Mounted {
            document: document.clone(),
            handle: handle.clone(),
            props,
        });
        handle
    }

    fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.document.remove_element(mounted.handle.element);
            tracing::debug!(element = ?mounted.handle.element, "engine unmounted");
        }
    }

    fn handle(&self) -> Option<Rc<dyn TiltHandle>> {
        self.mounted
            .as_ref()
            .map(|m| m.handle.clone() as Rc<dyn TiltHandle>)
    }

    fn render(&self, children: Vec<RenderNode>) -> Option<RenderNode> {
        let mounted = self.mounted.as_ref()?;
        let test_ids = mounted.props.settings.test_id_enable;

        let content = match &mounted.props.wrapper {
            Some(wrapper) => vec![wrapper(children)],
            None => children,
        };

        let surface = RenderNode::container()
            .test_id_if(test_ids, "tilt")
            .style(Self::surface_style(mounted))
            .children(content);

        Some(
            RenderNode::container()
                .test_id_if(test_ids, "container")
                .style(Style::new().with("display", "grid"))
                .child(surface),
        )
    }
}

impl Drop for HeadlessEngine {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{EngineSettings, ParallaxOptions};

    fn props(test_ids: bool) -> EngineProps {
        EngineProps {
            settings: EngineSettings {
                test_id_enable: test_ids,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_mount_creates_surface_element() {
        let doc = Document::new();
        let host = doc.create_element(None);
        let mut engine = HeadlessEngine::new();
        assert!(engine.handle().is_none());

        let handle = engine.mount(&doc, Some(host), props(false));
        let element = handle.element().unwrap();
        assert!(doc.is_alive(element));
        assert_eq!(doc.parent(element), Some(host));

        engine.unmount();
        assert!(!doc.is_alive(element));
        assert!(engine.handle().is_none());
    }

    #[test]
    fn test_tilt_clamps_and_resets() {
        let doc = Document::new();
        let mut engine = HeadlessEngine::new();
        let handle = engine.mount(&doc, None, props(false));

        handle.tilt(Angle::new(45.0, -5.0));
        assert_eq!(handle.angle(), Angle::new(20.0, -5.0));

        handle.reset();
        assert_eq!(handle.angle(), Angle::ZERO);
    }

    #[test]
    fn test_disabled_engine_ignores_tilt() {
        let doc = Document::new();
        let mut engine = HeadlessEngine::new();
        let mut p = props(false);
        p.settings.disabled = true;
        let handle = engine.mount(&doc, None, p);

        handle.tilt(Angle::new(10.0, 10.0));
        assert_eq!(handle.angle(), Angle::ZERO);
    }

    #[test]
    fn test_render_uses_wrapper_and_style() {
        let doc = Document::new();
        let mut engine = HeadlessEngine::new();
        let mut p = props(true);
        p.style = Style::new().with("color", "green");
        p.wrapper = Some(Rc::new(|children| {
            RenderNode::container().test_id("wrapped").children(children)
        }));
        engine.mount(&doc, None, p);

        let tree = engine.render(vec![RenderNode::text("Back")]).unwrap();
        let tilt = tree.find("tilt").unwrap();
        assert_eq!(tilt.style.get("color"), Some("green"));
        assert_eq!(tilt.style.get("border-radius"), Some("8px"));
        assert_eq!(tree.find("wrapped").map(|w| w.children.len()), Some(1));
    }

    #[test]
    fn test_render_reflects_handle_state() {
        let doc = Document::new();
        let mut engine = HeadlessEngine::new();
        let handle = engine.mount(&doc, None, props(true));

        handle.update_will_change(true);
        handle.tilt(Angle::new(5.0, 0.0));
        let tree = engine.render(Vec::new()).unwrap();
        let tilt = tree.find("tilt").unwrap();
        assert_eq!(tilt.style.get("will-change"), Some("transform"));
        assert!(tilt.style.get("transform").unwrap().contains("rotateX(5deg)"));
    }

    #[test]
    fn test_parallax_overflow_hidden() {
        let doc = Document::new();
        let mut engine = HeadlessEngine::new();
        let mut p = props(true);
        p.kind = EngineKind::Parallax(ParallaxOptions {
            overflow_hidden_enable: true,
            ..Default::default()
        });
        engine.mount(&doc, None, p);

        let tree = engine.render(Vec::new()).unwrap();
        assert_eq!(tree.find("tilt").unwrap().style.get("overflow"), Some("hidden"));
    }

    #[test]
    fn test_render_without_mount() {
        assert!(HeadlessEngine::new().render(Vec::new()).is_none());
    }
}
