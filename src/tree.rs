use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::markup::{self, OutlineItem};

/// Handle of a node inside a [`Tree`]; nodes are numbered in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accessibility role assigned to an element of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Tree,
    TreeItem,
    Group,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tree => "tree",
            Role::TreeItem => "treeitem",
            Role::Group => "group",
        }
    }
}

/// Expand/collapse indicator shown in front of a group owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Expanded,
    Collapsed,
}

/// Glyphs drawn for the indicators; every tree carries its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorAssets {
    pub expanded: String,
    pub collapsed: String,
}

impl Default for IndicatorAssets {
    fn default() -> Self {
        Self {
            expanded: "▼".to_string(),
            collapsed: "▶".to_string(),
        }
    }
}

impl IndicatorAssets {
    pub fn glyph(&self, indicator: Indicator) -> &str {
        match indicator {
            Indicator::Expanded => &self.expanded,
            Indicator::Collapsed => &self.collapsed,
        }
    }
}

/// Accessibility attributes carried by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriaAttributes {
    pub role: Role,
    pub tab_index: i32,
    /// `aria-expanded`, only present on group owners
    pub expanded: Option<bool>,
    /// `aria-selected`, absent until the first focus update
    pub selected: Option<bool>,
    /// `aria-hidden` of the owned group, absent until first toggled
    pub group_hidden: Option<bool>,
}

/// A single item of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    id: NodeId,
    label: String,
    dom_id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    has_children: bool,
    expanded: bool,
    visible: bool,
    aria: AriaAttributes,
    indicator: Option<Indicator>,
}

impl TreeNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dom_id(&self) -> Option<&str> {
        self.dom_id.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True when the item owns a nested group, even an empty one
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    pub fn is_expanded(&self) -> bool {
        self.has_children && self.expanded
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn aria(&self) -> &AriaAttributes {
        &self.aria
    }

    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator
    }

    pub fn is_selected(&self) -> bool {
        self.aria.selected == Some(true)
    }

    /// First character of the label, used for type-ahead
    pub fn initial(&self) -> Option<char> {
        self.label.chars().next()
    }

    /// Case-insensitive comparison of the label's first character
    pub fn starts_with_ignore_case(&self, ch: char) -> bool {
        self.initial()
            .map(|initial| initial.to_lowercase().eq(ch.to_lowercase()))
            .unwrap_or(false)
    }
}

/// The tree model: every item in document order plus the visible-node cache
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    parents: Vec<NodeId>,
    visible: Vec<NodeId>,
    root_role: Role,
    indicators: IndicatorAssets,
}

impl Tree {
    /// Build a tree from an outline. Every group starts expanded, so the
    /// initial visible list holds all items.
    pub fn new(outline: Vec<OutlineItem>, indicators: IndicatorAssets) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(outline.iter().map(OutlineItem::count).sum()),
            roots: Vec::new(),
            parents: Vec::new(),
            visible: Vec::new(),
            root_role: Role::Tree,
            indicators,
        };

        for item in outline {
            let id = tree.push_item(item, None, 0);
            tree.roots.push(id);
        }
        tree.refresh_visible();

        log::debug!(
            "Tree: built {} items, {} groups",
            tree.nodes.len(),
            tree.parents.len()
        );
        tree
    }

    /// Parse nested-list markup and build a tree from it
    pub fn from_markup(markup: &str, indicators: IndicatorAssets) -> Result<Self> {
        Ok(Self::new(markup::parse(markup)?, indicators))
    }

    fn push_item(&mut self, item: OutlineItem, parent: Option<NodeId>, depth: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let has_children = item.has_group;

        self.nodes.push(TreeNode {
            id,
            label: item.label,
            dom_id: item.dom_id,
            parent,
            children: Vec::with_capacity(item.children.len()),
            depth,
            has_children,
            expanded: has_children,
            visible: true,
            aria: AriaAttributes {
                role: if has_children { Role::Group } else { Role::TreeItem },
                tab_index: -1,
                expanded: has_children.then_some(true),
                selected: None,
                group_hidden: None,
            },
            indicator: has_children.then_some(Indicator::Expanded),
        });
        if has_children {
            self.parents.push(id);
        }

        for child in item.children {
            let child_id = self.push_item(child, Some(id), depth + 1);
            self.nodes[id.0].children.push(child_id);
        }

        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// All items in document order
    pub fn items(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Top-level items in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Items that own a nested group
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Currently visible items in document order
    pub fn visible_nodes(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn visible_index(&self, id: NodeId) -> Option<usize> {
        self.visible.iter().position(|&visible| visible == id)
    }

    pub fn root_role(&self) -> Role {
        self.root_role
    }

    pub fn indicators(&self) -> &IndicatorAssets {
        &self.indicators
    }

    /// Glyph of the node's indicator, if it owns a group
    pub fn indicator_glyph(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .and_then(|node| node.indicator)
            .map(|indicator| self.indicators.glyph(indicator))
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(TreeNode::label)
    }

    /// First item (in document order) with the given label
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().find(|node| node.label == label).map(|node| node.id)
    }

    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.dom_id.as_deref() == Some(dom_id))
            .map(|node| node.id)
    }

    pub fn first_top_level(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    pub fn last_visible(&self) -> Option<NodeId> {
        self.visible.last().copied()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.children.first().copied())
    }

    /// Reveal the node's group. Returns false when nothing changed.
    pub fn expand_group(&mut self, id: NodeId) -> bool {
        self.set_expanded(id, true)
    }

    /// Hide the node's group. Returns false when nothing changed.
    pub fn collapse_group(&mut self, id: NodeId) -> bool {
        self.set_expanded(id, false)
    }

    pub fn toggle_group(&mut self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) if node.has_children => {
                if node.expanded {
                    self.collapse_group(id)
                } else {
                    self.expand_group(id)
                }
            }
            _ => false,
        }
    }

    /// Expand every group; returns how many were collapsed before
    pub fn expand_all(&mut self) -> usize {
        let parents = self.parents.clone();
        parents
            .into_iter()
            .filter(|&id| self.expand_group(id))
            .count()
    }

    fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        if !node.has_children {
            return false;
        }

        let changed = node.expanded != expanded;
        node.expanded = expanded;
        node.aria.expanded = Some(expanded);
        node.aria.group_hidden = Some(!expanded);
        node.indicator = Some(if expanded {
            Indicator::Expanded
        } else {
            Indicator::Collapsed
        });

        if changed {
            log::debug!(
                "Tree: {} '{}' {}",
                id,
                node.label,
                if expanded { "expanded" } else { "collapsed" }
            );
            self.refresh_visible();
        }
        changed
    }

    /// Recompute visibility flags and the visible-node list. Parents precede
    /// their children in document order, so one forward pass suffices.
    fn refresh_visible(&mut self) {
        self.visible.clear();
        for index in 0..self.nodes.len() {
            let visible = match self.nodes[index].parent {
                Some(parent) => {
                    let parent = &self.nodes[parent.0];
                    parent.visible && parent.expanded
                }
                None => true,
            };
            self.nodes[index].visible = visible;
            if visible {
                self.visible.push(NodeId(index));
            }
        }
    }

    /// Clear the selected marking from every item and mark `id` as the
    /// selected, keyboard-focusable item.
    pub(crate) fn mark_selected(&mut self, id: NodeId) {
        for node in &mut self.nodes {
            node.aria.selected = Some(false);
            node.aria.tab_index = -1;
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.aria.selected = Some(true);
            node.aria.tab_index = 0;
        }
    }

    /// Ids of groups that are currently collapsed
    pub fn collapsed_groups(&self) -> Vec<NodeId> {
        self.parents
            .iter()
            .copied()
            .filter(|&id| !self.nodes[id.0].expanded)
            .collect()
    }

    /// Labels of the visible nodes, mostly useful for assertions and logs
    pub fn visible_labels(&self) -> Vec<String> {
        self.visible
            .iter()
            .map(|&id| self.nodes[id.0].label.clone())
            .collect()
    }
}
