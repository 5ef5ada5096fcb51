pub mod accessible_tree;
pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod executor;
pub mod input;
pub mod main_lib;
pub mod markup;
pub mod screenshot;
pub mod session;
pub mod test_runner;
pub mod theme;
pub mod tree;
pub mod ui;

pub use accessible_tree::{AccessibleTree, SelectionListener, SelectionRecorder};
pub use error::{AriaTreeError, Result};
pub use input::{EventOutcome, Key, KeyInput, Modifiers};
pub use tree::{NodeId, Tree, TreeNode};
