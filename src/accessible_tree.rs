//! Accessible tree widget
//!
//! Wraps a [`Tree`] with the focus, keyboard and mouse protocols of an ARIA
//! tree: it tracks the active node and tells a [`SelectionListener`] whenever
//! the selection is (re)applied.

use crate::input::{EventOutcome, Key, KeyInput, Modifiers};
use crate::tree::{NodeId, Tree, TreeNode};

/// Receives the node every time the tree applies its selection marking
#[cfg_attr(test, mockall::automock)]
pub trait SelectionListener {
    fn node_selected(&mut self, node: &TreeNode);
}

/// Listener that keeps every reported selection in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRecorder {
    history: Vec<NodeId>,
}

impl SelectionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(history: Vec<NodeId>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    pub fn last(&self) -> Option<NodeId> {
        self.history.last().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl SelectionListener for SelectionRecorder {
    fn node_selected(&mut self, node: &TreeNode) {
        self.history.push(node.id());
    }
}

/// Tree plus the interaction state around it
#[derive(Debug)]
pub struct AccessibleTree<L> {
    tree: Tree,
    active: Option<NodeId>,
    listener: L,
}

impl<L: SelectionListener> AccessibleTree<L> {
    pub fn new(tree: Tree, listener: L) -> Self {
        Self {
            tree,
            active: None,
            listener,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// The node that most recently received focus or selection; `None`
    /// until the tree has been focused.
    pub fn active_node(&self) -> Option<NodeId> {
        self.active
    }

    pub fn active(&self) -> Option<&TreeNode> {
        self.active.and_then(|id| self.tree.node(id))
    }

    /// Restore a previously saved active node without notifying the listener
    pub fn restore_active(&mut self, id: Option<NodeId>) {
        self.active = id.filter(|&id| self.tree.node(id).is_some());
        if let Some(id) = self.active {
            self.tree.mark_selected(id);
        }
    }

    /// Node that keyboard input is delivered to: the active node, or the
    /// first visible node when the tree has never been focused.
    pub fn focus_target(&self) -> Option<NodeId> {
        self.active
            .or_else(|| self.tree.visible_nodes().first().copied())
    }

    pub fn expand_group(&mut self, id: NodeId) -> bool {
        self.tree.expand_group(id)
    }

    pub fn collapse_group(&mut self, id: NodeId) -> bool {
        self.tree.collapse_group(id)
    }

    pub fn toggle_group(&mut self, id: NodeId) -> bool {
        self.tree.toggle_group(id)
    }

    pub fn expand_all(&mut self) -> usize {
        self.tree.expand_all()
    }

    /// Mark `id` as the only selected item and report it to the listener
    pub fn update_focus(&mut self, id: NodeId) {
        if self.tree.node(id).is_none() {
            return;
        }
        self.tree.mark_selected(id);
        if let Some(node) = self.tree.node(id) {
            log::debug!("AccessibleTree: selected {} '{}'", id, node.label());
            self.listener.node_selected(node);
        }
    }

    /// Make `id` active and give it focus
    fn move_active(&mut self, id: NodeId) {
        self.active = Some(id);
        self.handle_focus(id);
    }

    /// Deliver a key to `target`: the key-down phase first, then the
    /// key-press phase for printable keys the first phase left alone.
    pub fn handle_key(&mut self, target: NodeId, input: KeyInput) -> EventOutcome {
        match self.handle_key_down(target, input) {
            EventOutcome::Handled => EventOutcome::Handled,
            EventOutcome::Propagate if input.key.printable().is_some() => {
                self.handle_key_press(target, input)
            }
            EventOutcome::Propagate => EventOutcome::Propagate,
        }
    }

    /// Key-down phase: navigation and group keys
    pub fn handle_key_down(&mut self, target: NodeId, input: KeyInput) -> EventOutcome {
        let Modifiers { alt, ctrl, shift } = input.modifiers;
        if alt || ctrl || (shift && input.key != Key::Tab) {
            return EventOutcome::Propagate;
        }
        let Some(node) = self.tree.node(target) else {
            return EventOutcome::Propagate;
        };
        let has_children = node.has_children();
        let expanded = node.is_expanded();
        let current_index = self.tree.visible_index(target);

        match input.key {
            Key::Home => {
                if let Some(first) = self.tree.first_top_level() {
                    self.move_active(first);
                }
            }
            Key::End => {
                if let Some(last) = self.tree.last_visible() {
                    self.move_active(last);
                }
            }
            Key::Enter | Key::Space => {
                if has_children {
                    self.tree.toggle_group(target);
                }
            }
            Key::Left => {
                if has_children && expanded {
                    self.tree.collapse_group(target);
                } else if let Some(parent) = self.tree.parent_of(target) {
                    self.move_active(parent);
                }
            }
            Key::Right => {
                if has_children && !expanded {
                    self.tree.expand_group(target);
                } else if let Some(child) = self.tree.first_child(target) {
                    self.move_active(child);
                }
            }
            Key::Up => {
                if let Some(index) = current_index.filter(|&index| index > 0) {
                    let previous = self.tree.visible_nodes()[index - 1];
                    self.move_active(previous);
                }
            }
            Key::Down => {
                let next = match current_index {
                    Some(index) => self.tree.visible_nodes().get(index + 1).copied(),
                    None => self.tree.visible_nodes().first().copied(),
                };
                if let Some(next) = next {
                    self.move_active(next);
                }
            }
            Key::Asterisk => {
                let count = self.tree.expand_all();
                log::debug!("AccessibleTree: expanded {} groups", count);
            }
            _ => return EventOutcome::Propagate,
        }

        EventOutcome::Handled
    }

    /// Key-press phase: type-ahead for printable characters
    pub fn handle_key_press(&mut self, target: NodeId, input: KeyInput) -> EventOutcome {
        if input.modifiers.any() {
            return EventOutcome::Propagate;
        }

        match input.key {
            Key::Tab => EventOutcome::Propagate,
            key if key.is_navigation() => EventOutcome::Handled,
            key => match key.printable() {
                Some(ch) => {
                    if let Some(found) = self.find_type_ahead(target, ch) {
                        self.move_active(found);
                    }
                    EventOutcome::Handled
                }
                None => EventOutcome::Propagate,
            },
        }
    }

    /// Next visible node after `from`, wrapping around, whose label starts
    /// with `ch`. `from` itself is never compared, so a character that only
    /// matches the current node finds nothing.
    pub fn find_type_ahead(&self, from: NodeId, ch: char) -> Option<NodeId> {
        let visible = self.tree.visible_nodes();
        let len = visible.len();
        if len == 0 {
            return None;
        }

        let (start, count) = match self.tree.visible_index(from) {
            Some(index) => (index + 1, len - 1),
            None => (0, len),
        };

        (0..count)
            .map(|step| visible[(start + step) % len])
            .find(|&id| {
                self.tree
                    .node(id)
                    .map(|node| node.starts_with_ignore_case(ch))
                    .unwrap_or(false)
            })
    }

    pub fn handle_click(&mut self, target: NodeId, modifiers: Modifiers) -> EventOutcome {
        if modifiers.any() || self.tree.node(target).is_none() {
            return EventOutcome::Propagate;
        }

        self.active = Some(target);
        self.update_focus(target);
        EventOutcome::Handled
    }

    /// Double-click only applies to group owners
    pub fn handle_double_click(&mut self, target: NodeId, modifiers: Modifiers) -> EventOutcome {
        let is_parent = self
            .tree
            .node(target)
            .map(TreeNode::has_children)
            .unwrap_or(false);
        if modifiers.any() || !is_parent {
            return EventOutcome::Propagate;
        }

        self.active = Some(target);
        self.update_focus(target);
        self.tree.toggle_group(target);
        EventOutcome::Handled
    }

    /// An item gained focus. The first focused item becomes active; after
    /// that focus only refreshes the marking of the active node.
    pub fn handle_focus(&mut self, target: NodeId) -> EventOutcome {
        if self.tree.node(target).is_none() {
            return EventOutcome::Propagate;
        }
        let active = *self.active.get_or_insert(target);
        self.update_focus(active);
        EventOutcome::Propagate
    }

    pub fn handle_blur(&mut self, _target: NodeId) -> EventOutcome {
        EventOutcome::Propagate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::OutlineItem;
    use crate::tree::IndicatorAssets;
    use assert_matches::assert_matches;
    use mockall::predicate::function;

    /// A (group) -> [B, C], D
    fn sample() -> AccessibleTree<SelectionRecorder> {
        let tree = Tree::new(
            vec![
                OutlineItem::group("A", vec![OutlineItem::leaf("B"), OutlineItem::leaf("C")]),
                OutlineItem::leaf("D"),
            ],
            IndicatorAssets::default(),
        );
        AccessibleTree::new(tree, SelectionRecorder::new())
    }

    fn id(tree: &AccessibleTree<SelectionRecorder>, label: &str) -> NodeId {
        tree.tree().find_by_label(label).unwrap()
    }

    fn press(tree: &mut AccessibleTree<SelectionRecorder>, key: Key) -> EventOutcome {
        let target = tree.focus_target().unwrap();
        tree.handle_key(target, KeyInput::new(key))
    }

    fn active_label(tree: &AccessibleTree<SelectionRecorder>) -> Option<&str> {
        tree.active().map(TreeNode::label)
    }

    #[test]
    fn test_active_unset_before_focus() {
        let tree = sample();
        assert_eq!(tree.active_node(), None);
        assert!(tree.listener().is_empty());
    }

    #[test]
    fn test_first_focus_sets_active() {
        let mut tree = sample();
        let c = id(&tree, "C");

        assert_matches!(tree.handle_focus(c), EventOutcome::Propagate);
        assert_eq!(tree.active_node(), Some(c));
        assert_eq!(tree.listener().history(), &[c]);
        assert!(tree.tree().node(c).unwrap().is_selected());
    }

    #[test]
    fn test_later_focus_keeps_active_node() {
        let mut tree = sample();
        let b = id(&tree, "B");
        let d = id(&tree, "D");

        tree.handle_focus(b);
        tree.handle_focus(d);

        assert_eq!(tree.active_node(), Some(b));
        assert_eq!(tree.listener().history(), &[b, b]);
        assert!(!tree.tree().node(d).unwrap().is_selected());
    }

    #[test]
    fn test_update_focus_notifies_listener_once() {
        let tree = Tree::new(vec![OutlineItem::leaf("Only")], IndicatorAssets::default());
        let mut listener = MockSelectionListener::new();
        listener
            .expect_node_selected()
            .with(function(|node: &TreeNode| node.label() == "Only"))
            .times(1)
            .return_const(());

        let mut tree = AccessibleTree::new(tree, listener);
        tree.update_focus(NodeId::new(0));
    }

    #[test]
    fn test_update_focus_ignores_unknown_node() {
        let tree = Tree::new(vec![OutlineItem::leaf("Only")], IndicatorAssets::default());
        let mut listener = MockSelectionListener::new();
        listener.expect_node_selected().times(0);

        let mut tree = AccessibleTree::new(tree, listener);
        tree.update_focus(NodeId::new(7));
    }

    #[test]
    fn test_down_and_up_move_through_visible_nodes() {
        let mut tree = sample();
        tree.handle_focus(id(&tree, "A"));

        press(&mut tree, Key::Down);
        assert_eq!(active_label(&tree), Some("B"));
        press(&mut tree, Key::Down);
        press(&mut tree, Key::Down);
        assert_eq!(active_label(&tree), Some("D"));

        // Boundary: still handled, no movement
        assert_matches!(press(&mut tree, Key::Down), EventOutcome::Handled);
        assert_eq!(active_label(&tree), Some("D"));

        press(&mut tree, Key::Up);
        assert_eq!(active_label(&tree), Some("C"));
    }

    #[test]
    fn test_up_at_first_node_is_noop() {
        let mut tree = sample();
        tree.handle_focus(id(&tree, "A"));
        let before = tree.listener().len();

        assert_matches!(press(&mut tree, Key::Up), EventOutcome::Handled);
        assert_eq!(active_label(&tree), Some("A"));
        assert_eq!(tree.listener().len(), before);
    }

    #[test]
    fn test_collapse_then_down_skips_hidden_children() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.handle_focus(a);

        press(&mut tree, Key::Left);
        assert_eq!(tree.tree().visible_labels(), vec!["A", "D"]);
        assert_eq!(active_label(&tree), Some("A"));

        press(&mut tree, Key::Down);
        assert_eq!(active_label(&tree), Some("D"));
    }

    #[test]
    fn test_left_on_child_moves_to_parent() {
        let mut tree = sample();
        tree.handle_focus(id(&tree, "C"));

        press(&mut tree, Key::Left);
        assert_eq!(active_label(&tree), Some("A"));
    }

    #[test]
    fn test_left_on_top_level_leaf_is_noop() {
        let mut tree = sample();
        tree.handle_focus(id(&tree, "D"));

        assert_matches!(press(&mut tree, Key::Left), EventOutcome::Handled);
        assert_eq!(active_label(&tree), Some("D"));
    }

    #[test]
    fn test_right_expands_then_enters_group() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.collapse_group(a);
        tree.handle_focus(a);

        press(&mut tree, Key::Right);
        assert!(tree.tree().node(a).unwrap().is_expanded());
        assert_eq!(active_label(&tree), Some("A"));

        press(&mut tree, Key::Right);
        assert_eq!(active_label(&tree), Some("B"));

        // Leaf: nothing to enter
        press(&mut tree, Key::Right);
        assert_eq!(active_label(&tree), Some("B"));
    }

    #[test]
    fn test_enter_and_space_toggle_groups_only() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.handle_focus(a);

        press(&mut tree, Key::Enter);
        assert!(!tree.tree().node(a).unwrap().is_expanded());
        press(&mut tree, Key::Space);
        assert!(tree.tree().node(a).unwrap().is_expanded());

        press(&mut tree, Key::End);
        let visible = tree.tree().visible_nodes().to_vec();
        assert_matches!(press(&mut tree, Key::Enter), EventOutcome::Handled);
        assert_eq!(tree.tree().visible_nodes(), visible.as_slice());
    }

    #[test]
    fn test_home_and_end() {
        let mut tree = sample();
        tree.handle_focus(id(&tree, "C"));

        press(&mut tree, Key::End);
        assert_eq!(active_label(&tree), Some("D"));
        press(&mut tree, Key::Home);
        assert_eq!(active_label(&tree), Some("A"));
    }

    #[test]
    fn test_asterisk_expands_everything() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.collapse_group(a);
        tree.handle_focus(a);

        assert_matches!(press(&mut tree, Key::Asterisk), EventOutcome::Handled);
        assert_eq!(tree.tree().visible_labels(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_modified_chords_propagate() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.handle_focus(a);

        for modifiers in [Modifiers::CTRL, Modifiers::ALT, Modifiers::SHIFT] {
            let outcome = tree.handle_key(a, KeyInput::with_modifiers(Key::Down, modifiers));
            assert_matches!(outcome, EventOutcome::Propagate);
        }
        let outcome = tree.handle_key(a, KeyInput::with_modifiers(Key::Char('d'), Modifiers::CTRL));
        assert_matches!(outcome, EventOutcome::Propagate);
        assert_eq!(active_label(&tree), Some("A"));
    }

    #[test]
    fn test_tab_propagates() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.handle_focus(a);

        assert_matches!(tree.handle_key(a, KeyInput::new(Key::Tab)), EventOutcome::Propagate);
        assert_matches!(
            tree.handle_key(a, KeyInput::with_modifiers(Key::Tab, Modifiers::SHIFT)),
            EventOutcome::Propagate
        );
        assert_matches!(tree.handle_key(a, KeyInput::new(Key::PageDown)), EventOutcome::Propagate);
    }

    #[test]
    fn test_key_press_swallows_navigation_keys() {
        let mut tree = sample();
        let a = id(&tree, "A");
        assert_matches!(tree.handle_key_press(a, KeyInput::new(Key::Up)), EventOutcome::Handled);
        assert_matches!(tree.handle_key_press(a, KeyInput::new(Key::Tab)), EventOutcome::Propagate);
        assert_matches!(tree.handle_key_press(a, KeyInput::new(Key::Escape)), EventOutcome::Propagate);
    }

    #[test]
    fn test_type_ahead_wraps_and_skips_current() {
        let tree = Tree::new(
            ["Apple", "Banana", "Cherry", "Avocado"]
                .into_iter()
                .map(OutlineItem::leaf)
                .collect(),
            IndicatorAssets::default(),
        );
        let mut tree = AccessibleTree::new(tree, SelectionRecorder::new());
        tree.handle_focus(NodeId::new(0));

        press(&mut tree, Key::Char('a'));
        assert_eq!(active_label(&tree), Some("Avocado"));
        press(&mut tree, Key::Char('a'));
        assert_eq!(active_label(&tree), Some("Apple"));
        press(&mut tree, Key::Char('C'));
        assert_eq!(active_label(&tree), Some("Cherry"));
    }

    #[test]
    fn test_type_ahead_single_match_on_current_does_not_move() {
        let mut tree = sample();
        let d = id(&tree, "D");
        tree.handle_focus(d);
        let before = tree.listener().len();

        assert_matches!(press(&mut tree, Key::Char('d')), EventOutcome::Handled);
        assert_eq!(tree.active_node(), Some(d));
        assert_eq!(tree.listener().len(), before);
        assert_eq!(tree.find_type_ahead(d, 'd'), None);
        assert_eq!(tree.find_type_ahead(d, 'z'), None);
    }

    #[test]
    fn test_type_ahead_ignores_hidden_nodes() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.collapse_group(a);
        assert_eq!(tree.find_type_ahead(a, 'b'), None);
    }

    #[test]
    fn test_click_sets_active_and_reports() {
        let mut tree = sample();
        let c = id(&tree, "C");

        assert_matches!(tree.handle_click(c, Modifiers::NONE), EventOutcome::Handled);
        assert_eq!(tree.active_node(), Some(c));
        assert_eq!(tree.listener().last(), Some(c));

        let d = id(&tree, "D");
        assert_matches!(tree.handle_click(d, Modifiers::CTRL), EventOutcome::Propagate);
        assert_eq!(tree.active_node(), Some(c));
    }

    #[test]
    fn test_double_click_toggles_groups_only() {
        let mut tree = sample();
        let a = id(&tree, "A");
        let d = id(&tree, "D");

        assert_matches!(tree.handle_double_click(a, Modifiers::NONE), EventOutcome::Handled);
        assert!(!tree.tree().node(a).unwrap().is_expanded());
        assert_eq!(tree.active_node(), Some(a));

        assert_matches!(tree.handle_double_click(d, Modifiers::NONE), EventOutcome::Propagate);
        assert_eq!(tree.active_node(), Some(a));

        assert_matches!(tree.handle_double_click(a, Modifiers::SHIFT), EventOutcome::Propagate);
        assert!(!tree.tree().node(a).unwrap().is_expanded());
    }

    #[test]
    fn test_blur_changes_nothing() {
        let mut tree = sample();
        let a = id(&tree, "A");
        tree.handle_focus(a);
        let history = tree.listener().len();

        assert_matches!(tree.handle_blur(a), EventOutcome::Propagate);
        assert_eq!(tree.active_node(), Some(a));
        assert_eq!(tree.listener().len(), history);
    }

    #[test]
    fn test_empty_tree_degrades_to_noops() {
        let mut tree = AccessibleTree::new(
            Tree::new(Vec::new(), IndicatorAssets::default()),
            SelectionRecorder::new(),
        );
        assert_eq!(tree.focus_target(), None);
        assert_matches!(
            tree.handle_key(NodeId::new(0), KeyInput::new(Key::Down)),
            EventOutcome::Propagate
        );
        assert_matches!(tree.handle_focus(NodeId::new(0)), EventOutcome::Propagate);
        assert_eq!(tree.active_node(), None);
    }

    #[test]
    fn test_restore_active_does_not_notify() {
        let mut tree = sample();
        let c = id(&tree, "C");
        tree.restore_active(Some(c));

        assert_eq!(tree.active_node(), Some(c));
        assert!(tree.listener().is_empty());
        assert!(tree.tree().node(c).unwrap().is_selected());

        tree.restore_active(Some(NodeId::new(42)));
        assert_eq!(tree.active_node(), None);
    }
}
