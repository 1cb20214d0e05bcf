//! Scene composition
//!
//! The panel renders as:
//!
//! ```text
//! engine surface (tilt or parallax)
//! └── container        rotates; preserve-3d; one grid cell
//!     ├── front wrapper   pre-rotated 180deg, backface hidden
//!     └── back wrapper    bordered, backface hidden
//! ```
//!
//! Both wrappers share the container's single grid cell, so whichever face
//! points at the viewer is the one visible.

use crate::config::{Direction, FlipConfig};
use crate::state::{FlipSide, LayerHints};
use flipt_core::scene::{RenderNode, Style};

/// Content of one face
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FaceContent {
    #[default]
    Empty,
    /// Image source, rendered as a decorative full-size image
    Image(String),
    Node(RenderNode),
}

impl FaceContent {
    pub fn is_image(&self) -> bool {
        matches!(self, FaceContent::Image(_))
    }
}

impl From<&str> for FaceContent {
    fn from(src: &str) -> Self {
        FaceContent::Image(src.to_string())
    }
}

impl From<String> for FaceContent {
    fn from(src: String) -> Self {
        FaceContent::Image(src)
    }
}

impl From<RenderNode> for FaceContent {
    fn from(node: RenderNode) -> Self {
        FaceContent::Node(node)
    }
}

/// Transform value for a rotation about the panel's axis
pub fn rotation_transform(direction: Direction, degrees: f32) -> String {
    if degrees == 0.0 {
        "none".to_string()
    } else {
        format!("{}({}deg)", direction.rotate_fn(), degrees)
    }
}

/// Style for the engine surface: fill the cell, then host overrides
pub fn engine_style(tilt_style: &Style) -> Style {
    Style::new()
        .with("grid-area", "1 / 1 / 1 / 1")
        .with("width", "100%")
        .with("height", "100%")
        .merged(tilt_style)
}

fn image_node(src: &str, side: FlipSide, test_ids: bool) -> RenderNode {
    let id = match side {
        FlipSide::Front => "front-image",
        FlipSide::Back => "back-image",
    };
    RenderNode::image(src)
        .test_id_if(test_ids, id)
        .attr("alt", "")
        .attr("loading", "lazy")
        .attr("aria-hidden", "true")
        .style(
            Style::new()
                .with("display", "block")
                .with("width", "100%")
                .with("height", "100%")
                .with("vertical-align", "middle")
                .with("pointer-events", "none")
                .with("touch-action", "none")
                .with("user-select", "none"),
        )
}

fn face_children(content: &FaceContent, side: FlipSide, test_ids: bool) -> Vec<RenderNode> {
    match content {
        FaceContent::Empty => Vec::new(),
        FaceContent::Image(src) => vec![image_node(src, side, test_ids)],
        FaceContent::Node(node) => vec![node.clone()],
    }
}

fn face_style(config: &FlipConfig) -> Style {
    Style::new()
        .with("width", "100%")
        .with("height", "100%")
        .with("grid-area", "1 / 1 / 1 / 1")
        .with("border-radius", config.border_radius.clone())
        .with("backface-visibility", "hidden")
        .with("transform-style", "preserve-3d")
}

/// Front face wrapper, pre-rotated so it faces away at rotation 0
pub fn front_layer(config: &FlipConfig, content: &FaceContent) -> RenderNode {
    let mut style = face_style(config).with(
        "transform",
        format!("{}(180deg)", config.direction.rotate_fn()),
    );
    if content.is_image() || config.overflow_hidden_enable {
        style.set("overflow", "hidden");
    }
    RenderNode::container()
        .test_id_if(config.test_id_enable, "front-wrapper")
        .style(style)
        .children(face_children(content, FlipSide::Front, config.test_id_enable))
}

/// Back face wrapper, carrying the configured border
pub fn back_layer(config: &FlipConfig, content: &FaceContent) -> RenderNode {
    let mut style = face_style(config)
        .with("box-sizing", "border-box")
        .with("border-width", config.border_width.clone())
        .with("border-style", config.border_style.clone())
        .with("border-color", config.border_color.clone());
    if content.is_image() || config.overflow_hidden_enable {
        style.set("overflow", "hidden");
    }
    RenderNode::container()
        .test_id_if(config.test_id_enable, "back-wrapper")
        .style(style)
        .children(face_children(content, FlipSide::Back, config.test_id_enable))
}

/// The rotating container holding both faces
pub fn container(
    config: &FlipConfig,
    rotation: f32,
    hints: LayerHints,
    front: RenderNode,
    children: Vec<RenderNode>,
) -> RenderNode {
    let mut style = Style::new()
        .with("display", "grid")
        .with("grid-auto-rows", "100%")
        .with("width", "100%")
        .with("height", "100%")
        .with("border-radius", config.border_radius.clone())
        .with("transform-style", "preserve-3d")
        .with("transform", rotation_transform(config.direction, rotation));
    if hints.will_change {
        style.set("will-change", "transform");
    }
    if hints.pointer_events_suppressed {
        style.set("pointer-events", "none");
    }

    RenderNode::container()
        .test_id_if(config.test_id_enable, "motion")
        .style(style)
        .child(front)
        .children(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipt_core::scene::NodeKind;

    fn config() -> FlipConfig {
        FlipConfig::new().test_ids(true)
    }

    #[test]
    fn test_rotation_transform() {
        assert_eq!(rotation_transform(Direction::Horizontal, 0.0), "none");
        assert_eq!(rotation_transform(Direction::Horizontal, -180.0), "rotateY(-180deg)");
        assert_eq!(rotation_transform(Direction::Vertical, 45.5), "rotateX(45.5deg)");
    }

    #[test]
    fn test_front_layer_prerotated() {
        let front = front_layer(&config(), &FaceContent::Empty);
        assert_eq!(front.test_id.as_deref(), Some("front-wrapper"));
        assert_eq!(front.style.get("transform"), Some("rotateY(180deg)"));
        assert_eq!(front.style.get("backface-visibility"), Some("hidden"));
        assert_eq!(front.style.get("overflow"), None);

        let vertical = front_layer(&config().vertical(), &FaceContent::Empty);
        assert_eq!(vertical.style.get("transform"), Some("rotateX(180deg)"));
    }

    #[test]
    fn test_image_faces() {
        let front = front_layer(&config(), &"front.png".into());
        assert_eq!(front.style.get("overflow"), Some("hidden"));

        let image = front.find("front-image").unwrap();
        assert_eq!(image.kind, NodeKind::Image { src: "front.png".to_string() });
        assert_eq!(image.attributes.get("loading").map(String::as_str), Some("lazy"));
        assert_eq!(image.attributes.get("aria-hidden").map(String::as_str), Some("true"));
        assert_eq!(image.attributes.get("alt").map(String::as_str), Some(""));

        let back = back_layer(&config(), &"back.png".into());
        assert!(back.find("back-image").is_some());
    }

    #[test]
    fn test_back_layer_border() {
        let back = back_layer(
            &config().border_width("4px").border_color("red").border_style("dashed"),
            &FaceContent::Node(RenderNode::text("Back")),
        );
        assert_eq!(back.style.get("border-width"), Some("4px"));
        assert_eq!(back.style.get("border-color"), Some("red"));
        assert_eq!(back.style.get("border-style"), Some("dashed"));
        assert_eq!(back.style.get("box-sizing"), Some("border-box"));
        assert_eq!(back.style.get("overflow"), None);
        assert_eq!(back.children.len(), 1);
    }

    #[test]
    fn test_overflow_hidden_for_node_faces() {
        let config = config().overflow_hidden(true);
        let node = FaceContent::Node(RenderNode::text("x"));
        assert_eq!(front_layer(&config, &node).style.get("overflow"), Some("hidden"));
        assert_eq!(back_layer(&config, &node).style.get("overflow"), Some("hidden"));
    }

    #[test]
    fn test_container_hints() {
        let config = config();
        let plain = container(&config, 0.0, LayerHints::default(), RenderNode::container(), Vec::new());
        assert_eq!(plain.style.get("transform"), Some("none"));
        assert_eq!(plain.style.get("will-change"), None);
        assert_eq!(plain.style.get("pointer-events"), None);

        let busy = container(
            &config,
            -90.0,
            LayerHints {
                will_change: true,
                pointer_events_suppressed: true,
            },
            RenderNode::container(),
            vec![RenderNode::text("back")],
        );
        assert_eq!(busy.style.get("transform"), Some("rotateY(-90deg)"));
        assert_eq!(busy.style.get("will-change"), Some("transform"));
        assert_eq!(busy.style.get("pointer-events"), Some("none"));
        assert_eq!(busy.children.len(), 2);
    }

    #[test]
    fn test_test_ids_off_by_default() {
        let front = front_layer(&FlipConfig::default(), &"a.png".into());
        assert!(front.test_id.is_none());
        assert!(front.find("front-image").is_none());
    }

    #[test]
    fn test_engine_style_merges_overrides() {
        let style = engine_style(&Style::new().with("height", "50%").with("color", "red"));
        assert_eq!(style.get("grid-area"), Some("1 / 1 / 1 / 1"));
        assert_eq!(style.get("height"), Some("50%"));
        assert_eq!(style.get("color"), Some("red"));
    }
}
