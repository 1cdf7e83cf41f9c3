//! Layout Tree Management
//!
//! Identity-indexed, parent-linked tree of name/value facts decoded from a
//! file layout query. The store owns every node; parents hold the ids of
//! their children and children hold a back-reference id to their parent.
//! Views pull from it through `children`, `is_leaf` and `cell_text`.

use log::warn;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Process-unique node identity, assigned once and never reused
pub type NodeId = u64;

// ============================================================================
// Layout Node
// ============================================================================

/// One display row: a decoded fact and its place in the hierarchy
#[derive(Debug, Clone, Default)]
pub struct LayoutNode {
    pub id: NodeId,
    pub name: String,
    pub value: String,
    /// Owning parent (None for roots and detached nodes)
    pub parent: Option<NodeId>,
    /// Owned children, in insertion order
    pub children: Vec<NodeId>,
    pub expanded: bool,
    pub selected: bool,
    pub visible: bool,
}

impl LayoutNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

// ============================================================================
// Columns and Sorting
// ============================================================================

/// The two columns a view can ask text for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Value,
}

impl Column {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Column::Name),
            1 => Some(Column::Value),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Value => "Value",
        }
    }
}

/// Sort key requested by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Insertion order
    #[default]
    Index,
    /// Display name, case-insensitive
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Natural (hierarchical) order
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Descending => ordering.reverse(),
            _ => ordering,
        }
    }
}

/// Compare two nodes under a key and direction. Equal keys compare equal, so
/// a stable sort keeps their insertion order.
pub fn compare_nodes(a: &LayoutNode, b: &LayoutNode, key: SortKey, order: SortOrder) -> Ordering {
    let ordering = match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Index => a.id.cmp(&b.id),
    };
    order.apply(ordering)
}

/// Result of revealing a set of nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    /// First visible node of the request; focus goes here
    pub leader: NodeId,
    /// True when an ancestor had to be expanded
    pub needs_restructure: bool,
}

/// Serializable nested view of the tree
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

// ============================================================================
// Layout Tree
// ============================================================================

/// Node store for one enumeration session
#[derive(Debug, Default)]
pub struct LayoutTree {
    /// Every live node by identity
    nodes: HashMap<NodeId, LayoutNode>,
    /// Live node ids in creation order
    order: Vec<NodeId>,
    /// Root node ids in attach order
    roots: Vec<NodeId>,
    /// Last identity handed out
    last_id: NodeId,
    sort_key: SortKey,
    sort_order: SortOrder,
}

impl LayoutTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with the next identity
    pub fn create_node(&mut self, name: impl Into<String>, value: impl Into<String>) -> NodeId {
        self.last_id += 1;
        let id = self.last_id;

        self.nodes.insert(
            id,
            LayoutNode {
                id,
                name: name.into(),
                value: value.into(),
                visible: true,
                ..Default::default()
            },
        );
        self.order.push(id);

        id
    }

    /// Attach a detached node under `parent`, or as a root when `parent` is
    /// None. Returns false when either node is unknown, `id` already has a
    /// place in the tree or `parent` lies inside the subtree of `id`.
    pub fn attach(&mut self, parent: Option<NodeId>, id: NodeId) -> bool {
        if self.roots.contains(&id) {
            return false;
        }
        match self.nodes.get(&id) {
            Some(node) if node.parent.is_none() => {}
            _ => return false,
        }
        if let Some(parent_id) = parent {
            if self.is_within(parent_id, id) {
                return false;
            }
        }

        match parent {
            Some(parent_id) => match self.nodes.get_mut(&parent_id) {
                Some(parent_node) => parent_node.children.push(id),
                None => return false,
            },
            None => self.roots.push(id),
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
            node.expanded = true;
        }

        true
    }

    /// Create a node and attach it in one step
    pub fn add_child(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> NodeId {
        let id = self.create_node(name, value);
        if !self.attach(parent, id) {
            warn!("node {} left detached: parent {:?} not in tree", id, parent);
        }
        id
    }

    /// True when `id` is `ancestor` or sits somewhere below it
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(&node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Look up a node by identity
    pub fn find(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        self.nodes.get_mut(&id)
    }

    /// Remove a node and the subtree it owns
    pub fn remove(&mut self, id: NodeId) -> bool {
        let parent = match self.nodes.get(&id) {
            Some(node) => node.parent,
            None => return false,
        };

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let mut removed = HashSet::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                pending.extend(node.children.iter().copied());
                removed.insert(current);
            }
        }
        self.order.retain(|node_id| !removed.contains(node_id));

        true
    }

    /// Destroy every node; the store stays usable and identities keep
    /// counting up
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every live node in creation order
    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    // ------------------------------------------------------------------------
    // Selection and expansion
    // ------------------------------------------------------------------------

    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.selected = selected;
                true
            }
            None => false,
        }
    }

    /// First selected node in creation order
    pub fn selected_node(&self) -> Option<NodeId> {
        self.iter().find(|node| node.selected).map(|node| node.id)
    }

    /// All selected nodes in creation order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|node| node.selected)
            .map(|node| node.id)
            .collect()
    }

    pub fn deselect_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
    }

    /// Set the expanded flag on every node with children. Returns true if
    /// any flag changed.
    pub fn expand_all(&mut self, expand: bool) -> bool {
        let mut changed = false;

        for node in self.nodes.values_mut() {
            if node.has_children() && node.expanded != expand {
                node.expanded = expand;
                changed = true;
            }
        }

        changed
    }

    /// Replace the selection with the visible nodes of `ids`, expanding
    /// every ancestor so they can be shown. None when no target is visible.
    pub fn select_and_ensure_visible(&mut self, ids: &[NodeId]) -> Option<Reveal> {
        self.deselect_all();

        let visible: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| self.nodes.get(id).is_some_and(|node| node.visible))
            .collect();
        let leader = *visible.first()?;
        let mut needs_restructure = false;

        for id in visible {
            let mut ancestor = self.nodes.get(&id).and_then(|node| node.parent);
            while let Some(ancestor_id) = ancestor {
                let Some(node) = self.nodes.get_mut(&ancestor_id) else {
                    break;
                };
                if !node.expanded {
                    needs_restructure = true;
                }
                node.expanded = true;
                ancestor = node.parent;
            }

            self.set_selected(id, true);
        }

        Some(Reveal {
            leader,
            needs_restructure,
        })
    }

    // ------------------------------------------------------------------------
    // Sorting and the presentation protocol
    // ------------------------------------------------------------------------

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.sort_key = key;
        self.sort_order = order;
    }

    pub fn sort(&self) -> (SortKey, SortOrder) {
        (self.sort_key, self.sort_order)
    }

    pub fn is_natural_order(&self) -> bool {
        self.sort_order == SortOrder::None
    }

    /// Children of `parent` (roots for None) as the view should list them.
    ///
    /// Under a sort order the hierarchy is flattened: the root level lists
    /// every node sorted and nodes list nothing.
    pub fn children(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        if !self.is_natural_order() {
            return match parent {
                None => self.sorted_ids(self.order.clone()),
                Some(_) => Vec::new(),
            };
        }

        match parent {
            None => self.roots.clone(),
            Some(id) => self
                .nodes
                .get(&id)
                .map(|node| node.children.clone())
                .unwrap_or_default(),
        }
    }

    /// Children of `parent` in natural hierarchy, sorted by an explicit key
    pub fn sorted_children(&self, parent: Option<NodeId>, key: SortKey, order: SortOrder) -> Vec<NodeId> {
        let ids = match parent {
            None => self.roots.clone(),
            Some(id) => self
                .nodes
                .get(&id)
                .map(|node| node.children.clone())
                .unwrap_or_default(),
        };
        self.sort_ids_by(ids, key, order)
    }

    fn sorted_ids(&self, ids: Vec<NodeId>) -> Vec<NodeId> {
        self.sort_ids_by(ids, self.sort_key, self.sort_order)
    }

    fn sort_ids_by(&self, mut ids: Vec<NodeId>, key: SortKey, order: SortOrder) -> Vec<NodeId> {
        if order == SortOrder::None {
            return ids;
        }

        ids.sort_by(|a, b| match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => compare_nodes(a, b, key, order),
            _ => Ordering::Equal,
        });
        ids
    }

    /// Leaf status as the view sees it: every node is a leaf while a sort
    /// order is active
    pub fn is_leaf(&self, id: NodeId) -> bool {
        if !self.is_natural_order() {
            return true;
        }

        self.nodes
            .get(&id)
            .map(|node| !node.has_children())
            .unwrap_or(true)
    }

    pub fn cell_text(&self, id: NodeId, column: Column) -> Option<&str> {
        let node = self.nodes.get(&id)?;
        Some(match column {
            Column::Name => node.name.as_str(),
            Column::Value => node.value.as_str(),
        })
    }

    /// Nested copy of the natural hierarchy for export
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.roots
            .iter()
            .filter_map(|&id| self.snapshot_node(id))
            .collect()
    }

    fn snapshot_node(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&id)?;
        Some(NodeSnapshot {
            name: node.name.clone(),
            value: node.value.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&child| self.snapshot_node(child))
                .collect(),
        })
    }
}
