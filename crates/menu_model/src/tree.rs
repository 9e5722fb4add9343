//! Arena storage for the component tree
//!
//! Nodes live in per-kind maps keyed by [`NodeId`]. Each child stores its
//! parent id and each menu an ordered child-id list, so the tree has no
//! reference cycles. Structural edits here are raw: they do not know about
//! the document registries or the dirty flag, which is the job of
//! [`MenuDesign`](crate::MenuDesign).

use crate::{
    Function, GraphicEntry, GraphicMenu, MenuModelError, Node, NodeId, NodeType, PdfFile,
    RegularMenu, Result, Separator,
};
use std::collections::HashMap;

/// Storage for the different component kinds
#[derive(Debug, Clone, Default)]
pub struct NodeStorage {
    pub regular_menus: HashMap<NodeId, RegularMenu>,
    pub graphic_menus: HashMap<NodeId, GraphicMenu>,
    pub graphic_entries: HashMap<NodeId, GraphicEntry>,
    pub functions: HashMap<NodeId, Function>,
    pub pdf_files: HashMap<NodeId, PdfFile>,
    pub separators: HashMap<NodeId, Separator>,
}

impl NodeStorage {
    fn len(&self) -> usize {
        self.regular_menus.len()
            + self.graphic_menus.len()
            + self.graphic_entries.len()
            + self.functions.len()
            + self.pdf_files.len()
            + self.separators.len()
    }
}

/// One owned component of any kind, used to move nodes in and out of the arena
#[derive(Debug, Clone)]
pub enum ComponentNode {
    RegularMenu(RegularMenu),
    GraphicMenu(GraphicMenu),
    GraphicEntry(GraphicEntry),
    Function(Function),
    PdfFile(PdfFile),
    Separator(Separator),
}

impl ComponentNode {
    pub fn as_node(&self) -> &dyn Node {
        match self {
            ComponentNode::RegularMenu(n) => n,
            ComponentNode::GraphicMenu(n) => n,
            ComponentNode::GraphicEntry(n) => n,
            ComponentNode::Function(n) => n,
            ComponentNode::PdfFile(n) => n,
            ComponentNode::Separator(n) => n,
        }
    }

    fn as_node_mut(&mut self) -> &mut dyn Node {
        match self {
            ComponentNode::RegularMenu(n) => n,
            ComponentNode::GraphicMenu(n) => n,
            ComponentNode::GraphicEntry(n) => n,
            ComponentNode::Function(n) => n,
            ComponentNode::PdfFile(n) => n,
            ComponentNode::Separator(n) => n,
        }
    }

    pub fn id(&self) -> NodeId {
        self.as_node().id()
    }

    fn set_id(&mut self, id: NodeId) {
        match self {
            ComponentNode::RegularMenu(n) => n.id = id,
            ComponentNode::GraphicMenu(n) => n.id = id,
            ComponentNode::GraphicEntry(n) => n.id = id,
            ComponentNode::Function(n) => n.id = id,
            ComponentNode::PdfFile(n) => n.id = id,
            ComponentNode::Separator(n) => n.id = id,
        }
    }

    /// Rewrite this node's own, parent and child ids through `map`.
    /// A parent outside the map is cleared.
    pub(crate) fn remap(&mut self, map: &HashMap<NodeId, NodeId>) {
        let id = self.id();
        if let Some(new_id) = map.get(&id) {
            self.set_id(*new_id);
        }
        let node = self.as_node_mut();
        let parent = node.parent().and_then(|p| map.get(&p).copied());
        node.set_parent(parent);
        if let Some(children) = node.children_mut() {
            for child in children.iter_mut() {
                if let Some(new_child) = map.get(child) {
                    *child = *new_child;
                }
            }
        }
    }
}

/// The component tree of one menu design
#[derive(Debug, Clone)]
pub struct MenuTree {
    root: NodeId,
    nodes: NodeStorage,
}

impl MenuTree {
    /// Create a tree holding only a root menu with the given (validated) name
    pub(crate) fn new(root_name: String) -> Self {
        let root = RegularMenu::new(root_name);
        let root_id = root.id;
        let mut nodes = NodeStorage::default();
        nodes.regular_menus.insert(root_id, root);
        Self { root: root_id, nodes }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of components in the tree, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Look up any component by id
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        if let Some(n) = self.nodes.regular_menus.get(&id) {
            return Some(n);
        }
        if let Some(n) = self.nodes.graphic_menus.get(&id) {
            return Some(n);
        }
        if let Some(n) = self.nodes.graphic_entries.get(&id) {
            return Some(n);
        }
        if let Some(n) = self.nodes.functions.get(&id) {
            return Some(n);
        }
        if let Some(n) = self.nodes.pdf_files.get(&id) {
            return Some(n);
        }
        if let Some(n) = self.nodes.separators.get(&id) {
            return Some(n);
        }
        None
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn Node> {
        let nodes = &mut self.nodes;
        if nodes.regular_menus.contains_key(&id) {
            return nodes.regular_menus.get_mut(&id).map(|n| n as &mut dyn Node);
        }
        if nodes.graphic_menus.contains_key(&id) {
            return nodes.graphic_menus.get_mut(&id).map(|n| n as &mut dyn Node);
        }
        if nodes.graphic_entries.contains_key(&id) {
            return nodes.graphic_entries.get_mut(&id).map(|n| n as &mut dyn Node);
        }
        if nodes.functions.contains_key(&id) {
            return nodes.functions.get_mut(&id).map(|n| n as &mut dyn Node);
        }
        if nodes.pdf_files.contains_key(&id) {
            return nodes.pdf_files.get_mut(&id).map(|n| n as &mut dyn Node);
        }
        nodes.separators.get_mut(&id).map(|n| n as &mut dyn Node)
    }

    /// Look up a component, failing with `NodeNotFound`
    pub fn require(&self, id: NodeId) -> Result<&dyn Node> {
        self.node(id)
            .ok_or(MenuModelError::NodeNotFound(id.as_uuid()))
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.node(id).map(|n| n.node_type())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent())
    }

    /// Ordered children of a menu; empty for leaves and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub(crate) fn children_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        self.node_mut(id).and_then(|n| n.children_mut())
    }

    pub fn get_regular_menu(&self, id: NodeId) -> Option<&RegularMenu> {
        self.nodes.regular_menus.get(&id)
    }

    pub fn get_graphic_menu(&self, id: NodeId) -> Option<&GraphicMenu> {
        self.nodes.graphic_menus.get(&id)
    }

    pub(crate) fn get_graphic_menu_mut(&mut self, id: NodeId) -> Option<&mut GraphicMenu> {
        self.nodes.graphic_menus.get_mut(&id)
    }

    pub fn get_graphic_entry(&self, id: NodeId) -> Option<&GraphicEntry> {
        self.nodes.graphic_entries.get(&id)
    }

    pub(crate) fn get_graphic_entry_mut(&mut self, id: NodeId) -> Option<&mut GraphicEntry> {
        self.nodes.graphic_entries.get_mut(&id)
    }

    pub fn get_function(&self, id: NodeId) -> Option<&Function> {
        self.nodes.functions.get(&id)
    }

    pub(crate) fn get_function_mut(&mut self, id: NodeId) -> Option<&mut Function> {
        self.nodes.functions.get_mut(&id)
    }

    pub fn get_pdf_file(&self, id: NodeId) -> Option<&PdfFile> {
        self.nodes.pdf_files.get(&id)
    }

    /// Put a detached component into the arena
    pub(crate) fn insert(&mut self, node: ComponentNode) {
        match node {
            ComponentNode::RegularMenu(n) => {
                self.nodes.regular_menus.insert(n.id, n);
            }
            ComponentNode::GraphicMenu(n) => {
                self.nodes.graphic_menus.insert(n.id, n);
            }
            ComponentNode::GraphicEntry(n) => {
                self.nodes.graphic_entries.insert(n.id, n);
            }
            ComponentNode::Function(n) => {
                self.nodes.functions.insert(n.id, n);
            }
            ComponentNode::PdfFile(n) => {
                self.nodes.pdf_files.insert(n.id, n);
            }
            ComponentNode::Separator(n) => {
                self.nodes.separators.insert(n.id, n);
            }
        }
    }

    /// Owned copy of one component
    pub(crate) fn snapshot(&self, id: NodeId) -> Option<ComponentNode> {
        if let Some(n) = self.nodes.regular_menus.get(&id) {
            return Some(ComponentNode::RegularMenu(n.clone()));
        }
        if let Some(n) = self.nodes.graphic_menus.get(&id) {
            return Some(ComponentNode::GraphicMenu(n.clone()));
        }
        if let Some(n) = self.nodes.graphic_entries.get(&id) {
            return Some(ComponentNode::GraphicEntry(n.clone()));
        }
        if let Some(n) = self.nodes.functions.get(&id) {
            return Some(ComponentNode::Function(n.clone()));
        }
        if let Some(n) = self.nodes.pdf_files.get(&id) {
            return Some(ComponentNode::PdfFile(n.clone()));
        }
        if let Some(n) = self.nodes.separators.get(&id) {
            return Some(ComponentNode::Separator(n.clone()));
        }
        None
    }

    fn take(&mut self, id: NodeId) -> Option<ComponentNode> {
        if let Some(n) = self.nodes.regular_menus.remove(&id) {
            return Some(ComponentNode::RegularMenu(n));
        }
        if let Some(n) = self.nodes.graphic_menus.remove(&id) {
            return Some(ComponentNode::GraphicMenu(n));
        }
        if let Some(n) = self.nodes.graphic_entries.remove(&id) {
            return Some(ComponentNode::GraphicEntry(n));
        }
        if let Some(n) = self.nodes.functions.remove(&id) {
            return Some(ComponentNode::Function(n));
        }
        if let Some(n) = self.nodes.pdf_files.remove(&id) {
            return Some(ComponentNode::PdfFile(n));
        }
        if let Some(n) = self.nodes.separators.remove(&id) {
            return Some(ComponentNode::Separator(n));
        }
        None
    }

    /// Link `child` under `parent`, appending or inserting at `index`
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        let children = self
            .children_mut(parent)
            .ok_or(MenuModelError::NodeNotFound(parent.as_uuid()))?;
        match index {
            Some(idx) if idx <= children.len() => children.insert(idx, child),
            _ => children.push(child),
        }
        let node = self
            .node_mut(child)
            .ok_or(MenuModelError::NodeNotFound(child.as_uuid()))?;
        node.set_parent(Some(parent));
        Ok(())
    }

    /// Unlink `child` from its parent; returns the position it occupied
    pub(crate) fn detach(&mut self, child: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.parent(child) else {
            return Ok(None);
        };
        let mut position = None;
        if let Some(children) = self.children_mut(parent) {
            position = children.iter().position(|&id| id == child);
            if let Some(pos) = position {
                children.remove(pos);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.set_parent(None);
        }
        Ok(position)
    }

    /// Remove a node and its whole subtree from the arena
    pub(crate) fn delete_subtree(&mut self, id: NodeId) -> Result<Vec<ComponentNode>> {
        self.require(id)?;
        self.detach(id)?;
        let ids = self.descendants(id);
        Ok(ids.into_iter().filter_map(|n| self.take(n)).collect())
    }

    /// Depth-first pre-order walk starting at (and including) `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Ancestor chain from the root down to `id`, inclusive
    pub fn path(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = vec![id];
        let mut current = self.require(id)?.parent();
        while let Some(parent) = current {
            chain.push(parent);
            current = self.require(parent)?.parent();
        }
        chain.reverse();
        Ok(chain)
    }

    /// The root reached by following parent links from `id`
    pub fn root_of(&self, id: NodeId) -> Result<NodeId> {
        let path = self.path(id)?;
        Ok(path[0])
    }

    /// True if `ancestor` lies on the path from the root to `id`
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Index of `id` within its parent's child list
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub(crate) fn set_name(&mut self, id: NodeId, name: String) -> Result<()> {
        if let Some(n) = self.nodes.regular_menus.get_mut(&id) {
            n.name = name;
        } else if let Some(n) = self.nodes.graphic_menus.get_mut(&id) {
            n.name = name;
        } else if let Some(n) = self.nodes.graphic_entries.get_mut(&id) {
            n.name = name;
        } else if let Some(n) = self.nodes.functions.get_mut(&id) {
            n.name = name;
        } else if let Some(n) = self.nodes.pdf_files.get_mut(&id) {
            n.path = name;
        } else if self.nodes.separators.contains_key(&id) {
            return Err(MenuModelError::InvalidArgument(
                "separators cannot be renamed".to_string(),
            ));
        } else {
            return Err(MenuModelError::NodeNotFound(id.as_uuid()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_children(count: usize) -> (MenuTree, Vec<NodeId>) {
        let mut tree = MenuTree::new("Root".into());
        let root = tree.root_id();
        let mut ids = Vec::new();
        for i in 0..count {
            let menu = RegularMenu::new(format!("m{}", i));
            let id = menu.id;
            tree.insert(ComponentNode::RegularMenu(menu));
            tree.attach(root, id, None).unwrap();
            ids.push(id);
        }
        (tree, ids)
    }

    #[test]
    fn test_attach_sets_parent() {
        let (tree, ids) = tree_with_children(2);
        assert_eq!(tree.parent(ids[0]), Some(tree.root_id()));
        assert_eq!(tree.children(tree.root_id()), ids.as_slice());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_attach_at_index() {
        let (mut tree, ids) = tree_with_children(2);
        let extra = Separator::new();
        let extra_id = extra.id;
        tree.insert(ComponentNode::Separator(extra));
        tree.attach(tree.root_id(), extra_id, Some(1)).unwrap();
        assert_eq!(tree.children(tree.root_id()), [ids[0], extra_id, ids[1]]);
        assert_eq!(tree.index_in_parent(extra_id), Some(1));
    }

    #[test]
    fn test_delete_subtree_removes_descendants() {
        let (mut tree, ids) = tree_with_children(1);
        let f = Function::new("f".into());
        let f_id = f.id;
        tree.insert(ComponentNode::Function(f));
        tree.attach(ids[0], f_id, None).unwrap();

        let removed = tree.delete_subtree(ids[0]).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!tree.contains(f_id));
        assert!(tree.children(tree.root_id()).is_empty());
    }

    #[test]
    fn test_path_and_root() {
        let (mut tree, ids) = tree_with_children(1);
        let f = Function::new("f".into());
        let f_id = f.id;
        tree.insert(ComponentNode::Function(f));
        tree.attach(ids[0], f_id, None).unwrap();

        assert_eq!(tree.path(f_id).unwrap(), [tree.root_id(), ids[0], f_id]);
        assert_eq!(tree.root_of(f_id).unwrap(), tree.root_id());
        assert!(tree.is_ancestor_or_self(ids[0], f_id));
        assert!(!tree.is_ancestor_or_self(f_id, ids[0]));
    }

    #[test]
    fn test_descendants_pre_order() {
        let (mut tree, ids) = tree_with_children(2);
        let f = Function::new("f".into());
        let f_id = f.id;
        tree.insert(ComponentNode::Function(f));
        tree.attach(ids[0], f_id, None).unwrap();

        let order = tree.descendants(tree.root_id());
        assert_eq!(order, [tree.root_id(), ids[0], f_id, ids[1]]);
    }

    #[test]
    fn test_remap_clears_outside_parent() {
        let (tree, ids) = tree_with_children(1);
        let mut node = tree.snapshot(ids[0]).unwrap();
        let new_id = NodeId::new();
        let map = HashMap::from([(ids[0], new_id)]);
        node.remap(&map);
        assert_eq!(node.id(), new_id);
        assert_eq!(node.as_node().parent(), None);
    }

    #[test]
    fn test_unknown_node() {
        let (tree, _) = tree_with_children(0);
        let missing = NodeId::new();
        assert!(matches!(
            tree.path(missing),
            Err(MenuModelError::NodeNotFound(_))
        ));
        assert!(tree.children(missing).is_empty());
    }
}
