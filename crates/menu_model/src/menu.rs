//! Menu nodes: regular menus, image-grid graphic menus and their entries

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Smallest allowed graphic image edge, in pixels
pub const MIN_IMAGE_SIZE: u32 = 16;
/// Largest allowed graphic image edge, in pixels
pub const MAX_IMAGE_SIZE: u32 = 250;
pub const MIN_COLUMNS: u32 = 1;
pub const MAX_COLUMNS: u32 = 10;

pub const DEFAULT_IMAGE_SIZE: u32 = 64;
pub const DEFAULT_COLUMNS: u32 = 3;

/// A general container for sub-menus, functions, PDFs, separators and
/// graphic menus. The root of every design is a regular menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegularMenu {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) children: Vec<NodeId>,
}

impl RegularMenu {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            name,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Node for RegularMenu {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::RegularMenu
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        Some(&mut self.children)
    }
}

/// A menu rendered as an image grid. Every child is a [`GraphicEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicMenu {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) children: Vec<NodeId>,
    image_width: u32,
    image_height: u32,
    min_columns: u32,
}

impl GraphicMenu {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            name,
            children: Vec::new(),
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            min_columns: DEFAULT_COLUMNS,
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn min_columns(&self) -> u32 {
        self.min_columns
    }

    /// Set the image width, clamped to [`MIN_IMAGE_SIZE`]..=[`MAX_IMAGE_SIZE`]
    pub fn set_image_width(&mut self, width: i64) {
        self.image_width = clamp(width, MIN_IMAGE_SIZE, MAX_IMAGE_SIZE);
    }

    /// Set the image height, clamped to [`MIN_IMAGE_SIZE`]..=[`MAX_IMAGE_SIZE`]
    pub fn set_image_height(&mut self, height: i64) {
        self.image_height = clamp(height, MIN_IMAGE_SIZE, MAX_IMAGE_SIZE);
    }

    /// Set the minimum column count, clamped to [`MIN_COLUMNS`]..=[`MAX_COLUMNS`]
    pub fn set_min_columns(&mut self, columns: i64) {
        self.min_columns = clamp(columns, MIN_COLUMNS, MAX_COLUMNS);
    }
}

fn clamp(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(min as i64, max as i64) as u32
}

impl Node for GraphicMenu {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::GraphicMenu
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        Some(&mut self.children)
    }
}

/// One cell of a graphic menu: an image paired with exactly one function.
///
/// The entry's name mirrors the name of its function; the owning
/// [`MenuDesign`](crate::MenuDesign) keeps the two in step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicEntry {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: String,
    pub(crate) children: Vec<NodeId>,
    pub image_path: String,
    pub tooltip: String,
}

impl GraphicEntry {
    pub(crate) fn new(name: String) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            name,
            children: Vec::new(),
            image_path: String::new(),
            tooltip: String::new(),
        }
    }

    /// The single function this entry invokes
    pub fn function_id(&self) -> Option<NodeId> {
        self.children.first().copied()
    }
}

impl Node for GraphicEntry {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::GraphicEntry
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        Some(&mut self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphic_menu_defaults() {
        let menu = GraphicMenu::new("Plots".into());
        assert_eq!(menu.image_width(), DEFAULT_IMAGE_SIZE);
        assert_eq!(menu.image_height(), DEFAULT_IMAGE_SIZE);
        assert_eq!(menu.min_columns(), DEFAULT_COLUMNS);
    }

    #[test]
    fn test_graphic_menu_clamps() {
        let mut menu = GraphicMenu::new("Plots".into());
        menu.set_image_width(300);
        assert_eq!(menu.image_width(), 250);
        menu.set_image_height(-4);
        assert_eq!(menu.image_height(), 16);
        menu.set_min_columns(0);
        assert_eq!(menu.min_columns(), 1);
        menu.set_min_columns(42);
        assert_eq!(menu.min_columns(), 10);
        menu.set_image_width(100);
        assert_eq!(menu.image_width(), 100);
    }

    #[test]
    fn test_root_detection() {
        let mut menu = RegularMenu::new("Root".into());
        assert!(menu.is_root());
        menu.set_parent(Some(NodeId::new()));
        assert!(!menu.is_root());
    }
}
