//! The menu design document
//!
//! [`MenuDesign`] owns the component tree, the design metadata, the
//! document-wide dirty flag and two derived registries: every reachable
//! [`PdfFile`] and every reachable [`GraphicMenu`]. All tree mutations go
//! through this type so the registries never disagree with the tree.

use crate::tree::ComponentNode;
use crate::{
    validate_name, Function, GraphicEntry, GraphicMenu, MenuModelError, MenuTree, Node, NodeId,
    NodeType, PdfFile, RegularMenu, Result, Separator,
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Separator used by [`MenuDesign::path_as_string`]
pub const PATH_SEPARATOR: &str = " > ";

/// An application's full menu tree plus metadata
#[derive(Debug, Clone)]
pub struct MenuDesign {
    tree: MenuTree,
    author_email: Option<String>,
    date: NaiveDate,
    source_archive: Option<String>,
    binaries_archive: Option<String>,
    pdf_registry: Vec<NodeId>,
    graphic_registry: Vec<NodeId>,
    dirty: bool,
}

impl MenuDesign {
    /// Create an empty design whose root menu carries `name`, dated today
    pub fn new(name: &str) -> Result<Self> {
        let name = validate_name(name)?;
        Ok(Self {
            tree: MenuTree::new(name),
            author_email: None,
            date: chrono::Local::now().date_naive(),
            source_archive: None,
            binaries_archive: None,
            pdf_registry: Vec::new(),
            graphic_registry: Vec::new(),
            dirty: false,
        })
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Design name, which is the name of the root menu
    pub fn name(&self) -> &str {
        self.tree.name(self.tree.root_id()).unwrap_or_default()
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.rename(self.tree.root_id(), name)
    }

    pub fn author_email(&self) -> Option<&str> {
        self.author_email.as_deref()
    }

    /// Set or clear the author email. A blank value clears it; anything else
    /// must contain `@`.
    pub fn set_author_email(&mut self, email: Option<&str>) -> Result<()> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        if let Some(email) = email {
            if !email.contains('@') {
                return Err(MenuModelError::InvalidArgument(format!(
                    "author email '{}' must contain '@'",
                    email
                )));
            }
        }
        self.author_email = email.map(str::to_string);
        self.touch();
        Ok(())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.touch();
    }

    pub fn source_archive(&self) -> Option<&str> {
        self.source_archive.as_deref()
    }

    pub fn set_source_archive(&mut self, path: Option<String>) {
        self.source_archive = path.filter(|p| !p.trim().is_empty());
        self.touch();
    }

    pub fn binaries_archive(&self) -> Option<&str> {
        self.binaries_archive.as_deref()
    }

    pub fn set_binaries_archive(&mut self, path: Option<String>) {
        self.binaries_archive = path.filter(|p| !p.trim().is_empty());
        self.touch();
    }

    /// Whether the design changed since it was created, loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the in-memory state matches its persisted form
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root_id()
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.tree.node_type(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn function(&self, id: NodeId) -> Option<&Function> {
        self.tree.get_function(id)
    }

    pub fn graphic_menu(&self, id: NodeId) -> Option<&GraphicMenu> {
        self.tree.get_graphic_menu(id)
    }

    pub fn graphic_entry(&self, id: NodeId) -> Option<&GraphicEntry> {
        self.tree.get_graphic_entry(id)
    }

    pub fn pdf_file(&self, id: NodeId) -> Option<&PdfFile> {
        self.tree.get_pdf_file(id)
    }

    pub fn regular_menu(&self, id: NodeId) -> Option<&RegularMenu> {
        self.tree.get_regular_menu(id)
    }

    /// Mutable access to a function's properties; marks the design dirty.
    ///
    /// Renaming goes through [`MenuDesign::rename`] so graphic entries stay
    /// in step with their function.
    pub fn function_mut(&mut self, id: NodeId) -> Result<&mut Function> {
        let node = self
            .tree
            .get_function_mut(id)
            .ok_or(MenuModelError::NodeNotFound(id.as_uuid()))?;
        self.dirty = true;
        Ok(node)
    }

    /// Mutable access to a graphic menu's image settings; marks the design dirty
    pub fn graphic_menu_mut(&mut self, id: NodeId) -> Result<&mut GraphicMenu> {
        let node = self
            .tree
            .get_graphic_menu_mut(id)
            .ok_or(MenuModelError::NodeNotFound(id.as_uuid()))?;
        self.dirty = true;
        Ok(node)
    }

    /// Mutable access to a graphic entry's image path and tooltip; marks the
    /// design dirty
    pub fn graphic_entry_mut(&mut self, id: NodeId) -> Result<&mut GraphicEntry> {
        let node = self
            .tree
            .get_graphic_entry_mut(id)
            .ok_or(MenuModelError::NodeNotFound(id.as_uuid()))?;
        self.dirty = true;
        Ok(node)
    }

    /// All reachable PDF file nodes, in registration order
    pub fn pdf_files(&self) -> &[NodeId] {
        &self.pdf_registry
    }

    /// All reachable graphic menus, in registration order
    pub fn graphic_menus(&self) -> &[NodeId] {
        &self.graphic_registry
    }

    /// Deduplicated PDF paths referenced by the design, in display order
    pub fn pdf_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tree
            .descendants(self.tree.root_id())
            .into_iter()
            .filter_map(|id| self.tree.get_pdf_file(id))
            .map(|pdf| pdf.path().to_string())
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Deduplicated image paths of every graphic entry, in display order
    pub fn graphic_file_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tree
            .descendants(self.tree.root_id())
            .into_iter()
            .filter_map(|entry| self.tree.get_graphic_entry(entry))
            .map(|entry| entry.image_path.clone())
            .filter(|path| !path.is_empty() && seen.insert(path.clone()))
            .collect()
    }

    /// Depth-first pre-order walk of a subtree
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.descendants(id)
    }

    /// Every function in display order
    pub fn functions(&self) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root_id())
            .into_iter()
            .filter(|id| self.tree.get_function(*id).is_some())
            .collect()
    }

    /// First function with the given name, in display order
    pub fn find_function(&self, name: &str) -> Option<NodeId> {
        self.functions()
            .into_iter()
            .find(|id| self.tree.name(*id) == Some(name))
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Ancestor chain from the root down to `id`
    pub fn path(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.tree.path(id)
    }

    /// Names along the ancestor chain, joined with [`PATH_SEPARATOR`]
    pub fn path_as_string(&self, id: NodeId) -> Result<String> {
        let names: Vec<&str> = self
            .tree
            .path(id)?
            .into_iter()
            .filter_map(|n| self.tree.name(n))
            .collect();
        Ok(names.join(PATH_SEPARATOR))
    }

    /// The root reached from `id` through parent links
    pub fn root_of(&self, id: NodeId) -> Result<NodeId> {
        self.tree.root_of(id)
    }

    // =========================================================================
    // Construction (nodes are created attached to their parent)
    // =========================================================================

    pub fn add_regular_menu(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let menu = RegularMenu::new(validate_name(name)?);
        self.insert_new(parent, ComponentNode::RegularMenu(menu))
    }

    pub fn add_graphic_menu(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let menu = GraphicMenu::new(validate_name(name)?);
        self.insert_new(parent, ComponentNode::GraphicMenu(menu))
    }

    /// Create a graphic entry together with its function, both named `name`
    pub fn add_graphic_entry(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let name = validate_name(name)?;
        let entry = GraphicEntry::new(name.clone());
        let entry_id = self.insert_new(parent, ComponentNode::GraphicEntry(entry))?;
        let function = Function::new(name);
        self.insert_new(entry_id, ComponentNode::Function(function))?;
        Ok(entry_id)
    }

    /// Create a function. Under a graphic entry this replaces the entry's
    /// existing function.
    pub fn add_function(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let function = Function::new(validate_name(name)?);
        self.insert_new(parent, ComponentNode::Function(function))
    }

    pub fn add_pdf_file(&mut self, parent: NodeId, path: &str) -> Result<NodeId> {
        let pdf = PdfFile::new(validate_name(path)?);
        self.insert_new(parent, ComponentNode::PdfFile(pdf))
    }

    pub fn add_separator(&mut self, parent: NodeId) -> Result<NodeId> {
        self.insert_new(parent, ComponentNode::Separator(Separator::new()))
    }

    fn insert_new(&mut self, parent: NodeId, node: ComponentNode) -> Result<NodeId> {
        let child_type = node.as_node().node_type();
        self.check_accepts(parent, child_type)?;
        let id = node.id();
        self.tree.insert(node);
        self.link(parent, id, None)?;
        Ok(id)
    }

    fn check_accepts(&self, parent: NodeId, child: NodeType) -> Result<()> {
        let parent_type = self.tree.require(parent)?.node_type();
        if !parent_type.accepts(child) {
            return Err(MenuModelError::InvalidArgument(format!(
                "a {} cannot contain a {}",
                parent_type, child
            )));
        }
        Ok(())
    }

    /// Attach an arena node to `parent`, replacing a graphic entry's existing
    /// function, and update registries and names.
    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        if self.tree.node_type(parent) == Some(NodeType::GraphicEntry) {
            let existing: Vec<NodeId> = self.tree.children(parent).to_vec();
            for old in existing {
                let removed = self.tree.delete_subtree(old)?;
                self.unregister(&removed);
            }
            if let Some(name) = self.tree.name(child).map(str::to_string) {
                self.tree.set_name(parent, name)?;
            }
        }
        self.tree.attach(parent, child, index)?;
        self.register_subtree(child);
        self.touch();
        Ok(())
    }

    fn register_subtree(&mut self, id: NodeId) {
        for node in self.tree.descendants(id) {
            match self.tree.node_type(node) {
                Some(NodeType::PdfFile) => self.pdf_registry.push(node),
                Some(NodeType::GraphicMenu) => self.graphic_registry.push(node),
                _ => {}
            }
        }
    }

    fn unregister_ids(&mut self, ids: &HashSet<NodeId>) {
        self.pdf_registry.retain(|id| !ids.contains(id));
        self.graphic_registry.retain(|id| !ids.contains(id));
    }

    fn unregister(&mut self, removed: &[ComponentNode]) {
        let ids: HashSet<NodeId> = removed.iter().map(ComponentNode::id).collect();
        self.unregister_ids(&ids);
    }

    // =========================================================================
    // Menu operations
    // =========================================================================

    /// Move an existing node under `parent` (cut and paste)
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_type = self.tree.require(child)?.node_type();
        self.check_accepts(parent, child_type)?;
        if self.tree.is_ancestor_or_self(child, parent) {
            return Err(MenuModelError::InvalidArgument(
                "a node cannot be moved into its own subtree".to_string(),
            ));
        }
        if let Some(old_parent) = self.tree.parent(child) {
            if old_parent == parent {
                return Ok(());
            }
            self.check_removable_from(old_parent)?;
        }
        let moved: HashSet<NodeId> = self.tree.descendants(child).into_iter().collect();
        self.unregister_ids(&moved);
        self.tree.detach(child)?;
        self.link(parent, child, None)
    }

    /// Remove `child` (and its subtree) from `parent`
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tree.require(parent)?;
        self.check_removable_from(parent)?;
        if !self.tree.children(parent).contains(&child) {
            return Err(MenuModelError::NotFound(format!(
                "'{}' is not a child of '{}'",
                self.tree.name(child).unwrap_or("?"),
                self.tree.name(parent).unwrap_or("?"),
            )));
        }
        self.delete(child)
    }

    /// Remove the child at `index` of `parent`
    pub fn remove_at(&mut self, parent: NodeId, index: usize) -> Result<()> {
        self.tree.require(parent)?;
        self.check_removable_from(parent)?;
        let child = self.tree.children(parent).get(index).copied().ok_or_else(|| {
            MenuModelError::InvalidArgument(format!("child index {} out of range", index))
        })?;
        self.delete(child)
    }

    /// Remove a node from its own parent
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let parent = self.tree.require(id)?.parent().ok_or_else(|| {
            MenuModelError::InvalidArgument("the root menu cannot be removed".to_string())
        })?;
        self.remove(parent, id)
    }

    fn check_removable_from(&self, parent: NodeId) -> Result<()> {
        if self.tree.node_type(parent) == Some(NodeType::GraphicEntry) {
            return Err(MenuModelError::InvalidArgument(
                "graphic entries do not support removing their function".to_string(),
            ));
        }
        Ok(())
    }

    fn delete(&mut self, id: NodeId) -> Result<()> {
        let removed = self.tree.delete_subtree(id)?;
        tracing::trace!(node = %id, count = removed.len(), "removed subtree");
        self.unregister(&removed);
        self.touch();
        Ok(())
    }

    /// Find a direct child of `menu` by name
    pub fn look_up(&self, menu: NodeId, name: &str) -> Result<NodeId> {
        self.tree.require(menu)?;
        self.tree
            .children(menu)
            .iter()
            .copied()
            .find(|id| self.tree.name(*id) == Some(name))
            .ok_or_else(|| {
                MenuModelError::NotFound(format!(
                    "'{}' in '{}'",
                    name,
                    self.tree.name(menu).unwrap_or("?")
                ))
            })
    }

    /// Exchange the children at `i` and `j` of `menu`.
    ///
    /// Out-of-range indices leave the menu untouched and are not an error.
    pub fn swap(&mut self, menu: NodeId, i: usize, j: usize) -> Result<()> {
        self.tree.require(menu)?;
        let Some(children) = self.tree.children_mut(menu) else {
            return Ok(());
        };
        if i == j || i >= children.len() || j >= children.len() {
            return Ok(());
        }
        children.swap(i, j);
        self.touch();
        Ok(())
    }

    pub fn swap_with_previous(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.tree.require(id)?.parent() else {
            return Ok(());
        };
        match self.tree.index_in_parent(id) {
            Some(index) if index > 0 => self.swap(parent, index - 1, index),
            _ => Ok(()),
        }
    }

    pub fn swap_with_next(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.tree.require(id)?.parent() else {
            return Ok(());
        };
        match self.tree.index_in_parent(id) {
            Some(index) => self.swap(parent, index, index + 1),
            None => Ok(()),
        }
    }

    /// Rename a component. Graphic entries and their function share a name.
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let node_type = self.tree.require(id)?.node_type();
        self.tree.set_name(id, name.clone())?;
        match node_type {
            NodeType::GraphicEntry => {
                if let Some(function) = self.tree.children(id).first().copied() {
                    self.tree.set_name(function, name)?;
                }
            }
            NodeType::Function => {
                if let Some(parent) = self.tree.parent(id) {
                    if self.tree.node_type(parent) == Some(NodeType::GraphicEntry) {
                        self.tree.set_name(parent, name)?;
                    }
                }
            }
            _ => {}
        }
        self.touch();
        Ok(())
    }

    /// Deep-copy `id` and its subtree under `new_parent`, returning the id of
    /// the copy. The copy shares nothing with the original.
    pub fn copy(&mut self, id: NodeId, new_parent: NodeId) -> Result<NodeId> {
        let source_type = self.tree.require(id)?.node_type();
        self.check_accepts(new_parent, source_type)?;

        let ids = self.tree.descendants(id);
        let map: HashMap<NodeId, NodeId> = ids.iter().map(|old| (*old, NodeId::new())).collect();
        let mut copies = Vec::with_capacity(ids.len());
        for old in &ids {
            let mut node = self
                .tree
                .snapshot(*old)
                .ok_or(MenuModelError::NodeNotFound(old.as_uuid()))?;
            node.remap(&map);
            copies.push(node);
        }

        let copy_id = map[&id];
        for node in copies {
            self.tree.insert(node);
        }
        self.link(new_parent, copy_id, None)?;
        Ok(copy_id)
    }

    /// Check the registry and structure invariants; used by tests and after
    /// decoding
    pub fn validate(&self) -> Result<()> {
        let reachable = self.tree.descendants(self.tree.root_id());
        if reachable.len() != self.tree.len() {
            return Err(MenuModelError::InvalidArgument(format!(
                "{} unreachable nodes in the tree",
                self.tree.len() - reachable.len()
            )));
        }
        let pdfs: HashSet<NodeId> = reachable
            .iter()
            .copied()
            .filter(|id| self.tree.node_type(*id) == Some(NodeType::PdfFile))
            .collect();
        let graphics: HashSet<NodeId> = reachable
            .iter()
            .copied()
            .filter(|id| self.tree.node_type(*id) == Some(NodeType::GraphicMenu))
            .collect();
        if pdfs != self.pdf_registry.iter().copied().collect::<HashSet<_>>()
            || pdfs.len() != self.pdf_registry.len()
        {
            return Err(MenuModelError::InvalidArgument(
                "PDF registry out of sync with the tree".to_string(),
            ));
        }
        if graphics != self.graphic_registry.iter().copied().collect::<HashSet<_>>()
            || graphics.len() != self.graphic_registry.len()
        {
            return Err(MenuModelError::InvalidArgument(
                "graphic menu registry out of sync with the tree".to_string(),
            ));
        }
        for id in reachable {
            if let Some(entry) = self.tree.get_graphic_entry(id) {
                if entry.children.len() != 1 {
                    return Err(MenuModelError::InvalidArgument(format!(
                        "graphic entry '{}' has {} children",
                        entry.name,
                        entry.children.len()
                    )));
                }
            }
        }
        Ok(())
    }
}
