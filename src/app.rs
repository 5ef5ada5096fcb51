use ratatui::layout::{Position, Rect};
use ratatui::widgets::ListState;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use crate::accessible_tree::{AccessibleTree, SelectionRecorder};
use crate::config::Config;
use crate::error::Result;
use crate::input::{EventOutcome, KeyInput, Modifiers};
use crate::session::SessionState;
use crate::tree::{NodeId, Tree};

/// Outline shown when no markup file is given
pub const SAMPLE_MARKUP: &str = r#"<div class="tree">
  <ul>
    <li id="science"><span>Science</span>
      <ul>
        <li>Biology</li>
        <li>Chemistry</li>
        <li id="physics"><span>Physics</span>
          <ul>
            <li>Mechanics</li>
            <li>Optics</li>
          </ul>
        </li>
      </ul>
    </li>
    <li id="arts"><span>Arts</span>
      <ul>
        <li>Music</li>
        <li>Painting</li>
      </ul>
    </li>
    <li>Languages</li>
  </ul>
</div>
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelFocus {
    #[default]
    Tree,
    Details,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub active_panel: PanelFocus,
    pub status_message: String,
    pub force_redraw: bool,
    /// Where the tree list was last drawn, for mouse hit-testing
    pub tree_area: Rect,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_panel: PanelFocus::Tree,
            status_message: "Ready".to_string(),
            force_redraw: false,
            tree_area: Rect::default(),
        }
    }
}

pub struct App {
    pub tree: AccessibleTree<SelectionRecorder>,
    pub markup: String,
    pub config: Config,
    pub ui: UiState,
    pub tree_list_state: ListState,
    pub should_quit: bool,
    last_press: Option<(NodeId, Instant)>,
}

impl App {
    pub fn new(tree: Tree, markup: String, config: Config) -> Self {
        Self {
            tree: AccessibleTree::new(tree, SelectionRecorder::new()),
            markup,
            config,
            ui: UiState::default(),
            tree_list_state: ListState::default(),
            should_quit: false,
            last_press: None,
        }
    }

    pub fn from_markup(markup: &str, config: Config) -> Result<Self> {
        let tree = Tree::from_markup(markup, config.indicators.clone())?;
        log::info!("App: loaded tree with {} items", tree.len());
        Ok(Self::new(tree, markup.to_string(), config))
    }

    pub fn sample(config: Config) -> Result<Self> {
        Self::from_markup(SAMPLE_MARKUP, config)
    }

    /// Rebuild an app from a saved session
    pub fn from_session(state: &SessionState, config: Config) -> Result<Self> {
        let tree = Tree::from_markup(&state.markup, config.indicators.clone())?;
        let mut app = Self::new(tree, state.markup.clone(), config);

        for &index in &state.collapsed {
            app.tree.collapse_group(NodeId::new(index));
        }
        *app.tree.listener_mut() =
            SelectionRecorder::from_history(state.selections.iter().copied().map(NodeId::new).collect());
        app.tree.restore_active(state.active.map(NodeId::new));
        app.ui.active_panel = state.active_panel;
        if !state.status_message.is_empty() {
            app.ui.status_message = state.status_message.clone();
        }
        Ok(app)
    }

    pub fn is_tree_focused(&self) -> bool {
        self.ui.active_panel == PanelFocus::Tree
    }

    /// Move focus between the tree and the details panel
    pub fn next_panel(&mut self) {
        match self.ui.active_panel {
            PanelFocus::Tree => self.blur_tree(),
            PanelFocus::Details => self.focus_tree(),
        }
    }

    /// Give the tree focus: the active node, or the first visible node when
    /// nothing is active yet, receives the focus event.
    pub fn focus_tree(&mut self) {
        self.ui.active_panel = PanelFocus::Tree;
        let selections_before = self.tree.listener().len();
        if let Some(target) = self.tree.focus_target() {
            self.tree.handle_focus(target);
        }
        self.report(selections_before, "Tree focused".to_string());
    }

    pub fn blur_tree(&mut self) {
        if let Some(active) = self.tree.active_node() {
            self.tree.handle_blur(active);
        }
        self.ui.active_panel = PanelFocus::Details;
        self.ui.status_message = "Focus left the tree".to_string();
    }

    /// Deliver a key to the focused tree item
    pub fn handle_tree_key(&mut self, input: KeyInput) -> EventOutcome {
        let Some(target) = self.tree.focus_target() else {
            self.ui.status_message = "Tree is empty".to_string();
            return EventOutcome::Propagate;
        };

        let selections_before = self.tree.listener().len();
        let visible_before = self.tree.tree().visible_nodes().len();
        let outcome = self.tree.handle_key(target, input);
        let visible_after = self.tree.tree().visible_nodes().len();

        let fallback = if visible_before != visible_after {
            format!("{} of {} items visible", visible_after, self.tree.tree().len())
        } else if outcome.is_handled() {
            format!("{}: no change", input)
        } else {
            format!("{}: passed through", input)
        };
        self.report(selections_before, fallback);
        outcome
    }

    /// A mouse press on a tree row. A second press on the same node within
    /// the double-click window also delivers a double-click.
    pub fn press_node(&mut self, id: NodeId, modifiers: Modifiers, now: Instant) -> EventOutcome {
        let window = Duration::from_millis(self.config.behavior.double_click_ms);
        let is_double = matches!(
            self.last_press,
            Some((previous, at)) if previous == id && now.saturating_duration_since(at) <= window
        );

        if is_double {
            self.last_press = None;
            self.double_click_node(id, modifiers)
        } else {
            self.last_press = Some((id, now));
            self.click_node(id, modifiers)
        }
    }

    pub fn click_node(&mut self, id: NodeId, modifiers: Modifiers) -> EventOutcome {
        let selections_before = self.tree.listener().len();
        if !self.is_tree_focused() {
            self.ui.active_panel = PanelFocus::Tree;
            self.tree.handle_focus(id);
        }
        let outcome = self.tree.handle_click(id, modifiers);
        self.report(selections_before, "Click passed through".to_string());
        outcome
    }

    /// Click followed by the double-click event, as a browser delivers them
    pub fn double_click_node(&mut self, id: NodeId, modifiers: Modifiers) -> EventOutcome {
        self.click_node(id, modifiers);
        let visible_before = self.tree.tree().visible_nodes().len();
        let outcome = self.tree.handle_double_click(id, modifiers);
        if self.tree.tree().visible_nodes().len() != visible_before {
            self.ui.status_message = format!(
                "{} of {} items visible",
                self.tree.tree().visible_nodes().len(),
                self.tree.tree().len()
            );
        }
        outcome
    }

    /// Tree node drawn at the given screen cell, if any
    pub fn node_at(&self, column: u16, row: u16) -> Option<NodeId> {
        let area = self.ui.tree_area;
        if !area.contains(Position::new(column, row)) || area.height < 3 {
            return None;
        }
        // Skip the border rows
        if row <= area.y || row >= area.bottom() - 1 {
            return None;
        }
        let index = (row - area.y - 1) as usize + self.tree_list_state.offset();
        self.tree.tree().visible_nodes().get(index).copied()
    }

    pub fn active_label(&self) -> Option<&str> {
        self.tree.active().map(|node| node.label())
    }

    /// Update the status line: a new selection wins over `fallback`
    fn report(&mut self, selections_before: usize, fallback: String) {
        let recorder = self.tree.listener();
        self.ui.status_message = if recorder.len() > selections_before {
            let label = recorder
                .last()
                .and_then(|id| self.tree.tree().label(id))
                .unwrap_or("");
            format!("Selected: {}", label)
        } else {
            fallback
        };
    }

    /// Hash of everything that affects what is drawn
    pub fn ui_state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tree.active_node().hash(&mut hasher);
        self.tree.tree().visible_nodes().hash(&mut hasher);
        self.tree.listener().len().hash(&mut hasher);
        self.ui.active_panel.hash(&mut hasher);
        self.ui.status_message.hash(&mut hasher);
        self.ui.force_redraw.hash(&mut hasher);
        self.should_quit.hash(&mut hasher);
        hasher.finish()
    }
}
