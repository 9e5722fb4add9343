//! Leaf components: PDF manual references and separators

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Display name of every separator
pub const SEPARATOR_NAME: &str = "Separator";

/// A PDF document listed in a menu. Its path is its identity and its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfFile {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) path: String,
}

impl PdfFile {
    pub(crate) fn new(path: String) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            path,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path component, used as the archive entry name
    pub fn file_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

impl Node for PdfFile {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::PdfFile
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Separator {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
}

impl Separator {
    pub(crate) fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
        }
    }
}

impl Node for Separator {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Separator
    }

    fn name(&self) -> &str {
        SEPARATOR_NAME
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

/// Last component of a `/` or `\` separated path
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}
