//! Render scene description
//!
//! Widgets describe their output as a tree of [`RenderNode`]s carrying
//! CSS-like style properties. Property order is preserved so the serialized
//! style is stable between frames.

use indexmap::IndexMap;

/// Ordered set of style properties
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    props: IndexMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.props.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.props.shift_remove(name)
    }

    /// Apply `other` on top of this style; its values win
    pub fn merge(&mut self, other: &Style) {
        for (name, value) in &other.props {
            self.props.insert(name.clone(), value.clone());
        }
    }

    pub fn merged(mut self, other: &Style) -> Self {
        self.merge(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as an inline style attribute (`name: value; ...`)
    pub fn to_css(&self) -> String {
        self.props
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}

/// What a node draws
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain box holding children
    Container,
    /// Image loaded from a source string
    Image { src: String },
    /// Text run
    Text(String),
}

/// A node in a widget's render output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderNode {
    pub kind: NodeKind,
    pub test_id: Option<String>,
    pub style: Style,
    /// Non-style attributes (`loading`, `aria-hidden`, ...)
    pub attributes: IndexMap<String, String>,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            test_id: None,
            style: Style::new(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn container() -> Self {
        Self::with_kind(NodeKind::Container)
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Image { src: src.into() })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text(content.into()))
    }

    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Set the test id only when `enabled`
    pub fn test_id_if(self, enabled: bool, id: &str) -> Self {
        if enabled {
            self.test_id(id)
        } else {
            self
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: RenderNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Depth-first search for a node by test id
    pub fn find(&self, test_id: &str) -> Option<&RenderNode> {
        if self.test_id.as_deref() == Some(test_id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(test_id))
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(RenderNode::node_count).sum::<usize>()
    }
}
