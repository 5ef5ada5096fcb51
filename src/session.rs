use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::app::{App, PanelFocus, SAMPLE_MARKUP};
use crate::error::Result;
use crate::tree::NodeId;

/// Serializable snapshot of an [`App`], used by `execute`, `screenshot`
/// and `save-state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub markup: String,
    /// Document-order indices of collapsed groups
    #[serde(default)]
    pub collapsed: Vec<usize>,
    #[serde(default)]
    pub active: Option<usize>,
    #[serde(default)]
    pub active_panel: PanelFocus,
    #[serde(default)]
    pub status_message: String,
    /// Every node reported to the selection listener, oldest first
    #[serde(default)]
    pub selections: Vec<usize>,
    /// Labels of the visible nodes; written for readability, never read back
    #[serde(default, skip_deserializing)]
    pub visible: Vec<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::from_markup(SAMPLE_MARKUP)
    }
}

impl SessionState {
    /// Fresh session for the given markup: everything expanded, nothing active
    pub fn from_markup(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            collapsed: Vec::new(),
            active: None,
            active_panel: PanelFocus::Tree,
            status_message: String::new(),
            selections: Vec::new(),
            visible: Vec::new(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let state: SessionState = serde_json::from_str(&content)?;
        Ok(state)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_app(app: &App) -> Self {
        let tree = app.tree.tree();
        SessionState {
            markup: app.markup.clone(),
            collapsed: tree.collapsed_groups().into_iter().map(NodeId::index).collect(),
            active: app.tree.active_node().map(NodeId::index),
            active_panel: app.ui.active_panel,
            status_message: app.ui.status_message.clone(),
            selections: app
                .tree
                .listener()
                .history()
                .iter()
                .map(|id| id.index())
                .collect(),
            visible: tree.visible_labels(),
        }
    }
}
