//! Component trait and kinds shared by every node in the menu tree

use crate::{MenuModelError, NodeId, Result};
use serde::{Deserialize, Serialize};

/// Kinds of components that can appear in a menu tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    RegularMenu,
    GraphicMenu,
    GraphicEntry,
    Function,
    PdfFile,
    Separator,
}

impl NodeType {
    /// Whether nodes of this kind keep an ordered child list
    pub fn is_menu(self) -> bool {
        matches!(
            self,
            NodeType::RegularMenu | NodeType::GraphicMenu | NodeType::GraphicEntry
        )
    }

    /// Whether a parent of this kind accepts a child of kind `child`
    pub fn accepts(self, child: NodeType) -> bool {
        match self {
            NodeType::RegularMenu => !matches!(child, NodeType::GraphicEntry),
            NodeType::GraphicMenu => child == NodeType::GraphicEntry,
            NodeType::GraphicEntry => child == NodeType::Function,
            NodeType::Function | NodeType::PdfFile | NodeType::Separator => false,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NodeType::RegularMenu => "menu",
            NodeType::GraphicMenu => "graphic menu",
            NodeType::GraphicEntry => "graphic entry",
            NodeType::Function => "function",
            NodeType::PdfFile => "PDF file",
            NodeType::Separator => "separator",
        };
        f.write_str(label)
    }
}

/// Common interface for all menu tree components
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the kind of this node
    fn node_type(&self) -> NodeType;

    /// Display name of this node
    fn name(&self) -> &str;

    /// Get the ID of the owning menu (None for the root menu)
    fn parent(&self) -> Option<NodeId>;

    /// Set the owning menu
    fn set_parent(&mut self, parent: Option<NodeId>);

    /// Ordered child IDs; empty for leaves
    fn children(&self) -> &[NodeId] {
        &[]
    }

    /// Mutable child list, `None` for leaves
    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        None
    }

    fn can_have_children(&self) -> bool {
        self.node_type().is_menu()
    }
}

/// Trim a component name and reject it if nothing is left
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MenuModelError::InvalidArgument(
            "name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
