use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "aria-tree")]
#[command(about = "A keyboard- and mouse-navigable accessible tree in the terminal")]
pub struct Cli {
    /// Optional JSON configuration (indicator glyphs, layout, double-click window)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run {
        /// Nested-list markup to load (defaults to a built-in sample outline)
        #[arg(short, long)]
        markup: Option<PathBuf>,
    },
    /// Render a saved session state to text
    Screenshot {
        /// Path to the JSON session state
        #[arg(short, long)]
        state: PathBuf,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Terminal width for rendering
        #[arg(long, default_value = "80")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "24")]
        height: u16,
    },
    /// Execute a command against a session state and output the new state
    Execute {
        /// Path to the JSON session state
        #[arg(short, long)]
        state: PathBuf,
        /// Command to execute (e.g., "key:down", "char:m", "click:Arts")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting state (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also generate a screenshot of the result
        #[arg(long)]
        screenshot: bool,
        /// Terminal width for screenshot (if enabled)
        #[arg(long, default_value = "80")]
        width: u16,
        /// Terminal height for screenshot (if enabled)
        #[arg(long, default_value = "24")]
        height: u16,
    },
    /// Write the initial session state for a markup file
    SaveState {
        /// Nested-list markup to load
        #[arg(short, long)]
        markup: PathBuf,
        /// Output file for the state (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a headless test script
    Test {
        /// Path to the script
        #[arg(short, long)]
        script: PathBuf,
        /// Markup to test against (defaults to the built-in sample outline)
        #[arg(short, long)]
        markup: Option<PathBuf>,
        /// Write screenshots instead of comparing them
        #[arg(long)]
        overwrite: bool,
        /// Log to stderr while running
        #[arg(short, long)]
        verbose: bool,
    },
}
