use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app::{App, PanelFocus};
use crate::command::Command;
use crate::error::{AriaTreeError, Result};
use crate::executor::Executor;
use crate::screenshot::render_to_string;

/// Test file format for headless testing
///
/// Each line is one step:
/// - `key:<keyname>` - Send a key (e.g., `key:down`, `key:shift+tab`, `key:*`)
/// - `char:<c>` - Send a character for type-ahead
/// - `click:<label>` / `dblclick:<label>` - Press on the row with that label
/// - `focus`, `blur`, `next_panel`, `quit`, `sequence:[...]`
/// - `assert:<property>:<value>` - Assert application state
/// - `screenshot:<name>` - Compare the screen with `<name>.txt`
/// - `# comment` - Comments (ignored)
///
/// Examples:
/// ```text
/// # Collapse the first group and jump to the last item
/// focus
/// key:left
/// assert:visible:Science,Arts,Music,Painting,Languages
/// key:end
/// assert:active:Languages
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Command(Command),
    Assert(String),
    Screenshot(String),
}

#[derive(Debug, Clone)]
pub struct ScriptLine {
    pub line: usize,
    pub step: ScriptStep,
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    pub script: Vec<ScriptLine>,
    pub overwrite_mode: bool,
    pub screenshot_base_dir: Option<PathBuf>,
    pub screen_width: u16,
    pub screen_height: u16,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    pub fn new() -> Self {
        TestRunner {
            script: Vec::new(),
            overwrite_mode: false,
            screenshot_base_dir: None,
            screen_width: 80,
            screen_height: 24,
        }
    }

    /// Load a script; screenshots resolve relative to the script's directory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut runner = Self::from_string(&content)?;
        runner.screenshot_base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(runner)
    }

    pub fn from_string(content: &str) -> Result<Self> {
        let mut script = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let step = if let Some(assertion) = line.strip_prefix("assert:") {
                ScriptStep::Assert(assertion.to_string())
            } else if let Some(name) = line.strip_prefix("screenshot:") {
                if name.is_empty() {
                    return Err(AriaTreeError::Script {
                        line: line_number,
                        message: "screenshot needs a name".to_string(),
                    });
                }
                ScriptStep::Screenshot(name.to_string())
            } else {
                let command = Command::from_string(line).map_err(|e| AriaTreeError::Script {
                    line: line_number,
                    message: e.to_string(),
                })?;
                ScriptStep::Command(command)
            };

            script.push(ScriptLine {
                line: line_number,
                step,
            });
        }

        Ok(TestRunner {
            script,
            ..TestRunner::new()
        })
    }

    pub fn run(&self, app: &mut App) -> TestResult {
        let start_time = Instant::now();
        let mut commands_executed = 0;
        let mut assertions_passed = 0;
        let mut assertions_failed = 0;
        let mut errors = Vec::new();

        log::info!("🧪 Starting test run with {} steps", self.script.len());

        for ScriptLine { line, step } in &self.script {
            log::debug!("🧪 Line {}: {:?}", line, step);

            match step {
                ScriptStep::Command(command) => match Executor::apply(app, command) {
                    Ok(()) => commands_executed += 1,
                    Err(e) => errors.push(format!("Line {}: {}", line, e)),
                },
                ScriptStep::Assert(assertion) => match self.evaluate_assertion(app, assertion) {
                    Ok(true) => {
                        assertions_passed += 1;
                        log::debug!("🧪 Assertion passed: {}", assertion);
                    }
                    Ok(false) => {
                        assertions_failed += 1;
                        errors.push(format!(
                            "Line {}: assertion failed: {} (actual: {})",
                            line,
                            assertion,
                            self.describe_property(app, assertion)
                        ));
                    }
                    Err(e) => {
                        assertions_failed += 1;
                        errors.push(format!("Line {}: assertion error: {}", line, e));
                    }
                },
                ScriptStep::Screenshot(name) => {
                    if let Err(e) = self.take_screenshot(app, name) {
                        errors.push(format!("Line {}: {}", line, e));
                    }
                }
            }
        }

        let duration = start_time.elapsed();
        log::info!("🧪 Test run completed in {:?}", duration);

        let success = assertions_failed == 0 && errors.is_empty();
        TestResult {
            duration,
            commands_executed,
            assertions_passed,
            assertions_failed,
            errors,
            success,
        }
    }

    /// Evaluate `property:value`. Label-keyed properties take the form
    /// `property:label:value`.
    pub fn evaluate_assertion(&self, app: &App, assertion: &str) -> Result<bool> {
        let (property, expected) = assertion
            .split_once(':')
            .ok_or_else(|| AriaTreeError::from("Assertion must be in format 'property:value'"))?;
        let tree = app.tree.tree();

        match property {
            "active" => Ok(match app.active_label() {
                Some(label) => label == expected,
                None => expected == "none" || expected.is_empty(),
            }),
            "visible" => Ok(tree.visible_labels().join(",") == expected),
            "visible_count" => {
                let count = parse_value::<usize>(property, expected)?;
                Ok(tree.visible_nodes().len() == count)
            }
            "expanded" => {
                let (label, value) = split_label_value(expected)?;
                let id = find_label(app, label)?;
                let expected_bool = parse_value::<bool>(property, value)?;
                Ok(tree.node(id).map(|node| node.is_expanded()) == Some(expected_bool))
            }
            "selected" => {
                let (label, value) = split_label_value(expected)?;
                let id = find_label(app, label)?;
                let expected_bool = parse_value::<bool>(property, value)?;
                Ok(tree.node(id).map(|node| node.is_selected()) == Some(expected_bool))
            }
            "panel" => {
                let actual = match app.ui.active_panel {
                    PanelFocus::Tree => "Tree",
                    PanelFocus::Details => "Details",
                };
                Ok(actual == expected)
            }
            "selections" => {
                let count = parse_value::<usize>(property, expected)?;
                Ok(app.tree.listener().len() == count)
            }
            "last_selection" => {
                let last = app.tree.listener().last().and_then(|id| tree.label(id));
                Ok(last.unwrap_or("none") == expected)
            }
            "status" => Ok(app.ui.status_message.contains(expected)),
            "should_quit" => {
                let expected_bool = parse_value::<bool>(property, expected)?;
                Ok(app.should_quit == expected_bool)
            }
            _ => Err(AriaTreeError::Generic(format!(
                "Unknown assertion property: {}",
                property
            ))),
        }
    }

    /// Actual value of the asserted property, for failure messages
    fn describe_property(&self, app: &App, assertion: &str) -> String {
        let property = assertion.split(':').next().unwrap_or_default();
        let tree = app.tree.tree();
        match property {
            "active" => app.active_label().unwrap_or("none").to_string(),
            "visible" => tree.visible_labels().join(","),
            "visible_count" => tree.visible_nodes().len().to_string(),
            "panel" => format!("{:?}", app.ui.active_panel),
            "selections" => app.tree.listener().len().to_string(),
            "status" => app.ui.status_message.clone(),
            _ => "?".to_string(),
        }
    }

    fn take_screenshot(&self, app: &mut App, name: &str) -> Result<()> {
        let content = render_to_string(app, self.screen_width, self.screen_height)?;

        let filename = format!("{}.txt", name);
        let final_path = match &self.screenshot_base_dir {
            Some(base_dir) => base_dir.join(filename),
            None => PathBuf::from(filename),
        };

        if self.overwrite_mode {
            std::fs::write(&final_path, content)?;
            println!("📸 Screenshot saved to: {}", final_path.display());
            return Ok(());
        }

        match std::fs::read_to_string(&final_path) {
            Ok(existing_content) if existing_content == content => {
                log::debug!("🧪 Screenshot verification passed: {}", final_path.display());
                Ok(())
            }
            Ok(_) => Err(AriaTreeError::Generic(format!(
                "Screenshot verification failed: {}. Content differs from expected. Use --overwrite to update.",
                final_path.display()
            ))),
            Err(_) => Err(AriaTreeError::Generic(format!(
                "Screenshot verification failed: {} does not exist. Use --overwrite to create.",
                final_path.display()
            ))),
        }
    }
}

fn parse_value<T: std::str::FromStr>(property: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| AriaTreeError::Generic(format!("{} cannot use value '{}'", property, value)))
}

fn split_label_value(expected: &str) -> Result<(&str, &str)> {
    expected
        .rsplit_once(':')
        .ok_or_else(|| AriaTreeError::from("Expected '<label>:<value>'"))
}

fn find_label(app: &App, label: &str) -> Result<crate::tree::NodeId> {
    app.tree
        .tree()
        .find_by_label(label)
        .ok_or_else(|| AriaTreeError::Generic(format!("No item labelled '{}'", label)))
}

#[derive(Debug, Clone)]
pub struct TestResult {
    pub duration: Duration,
    pub commands_executed: usize,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    pub errors: Vec<String>,
    pub success: bool,
}

impl TestResult {
    pub fn print_summary(&self) {
        println!("🧪 Test Results:");
        println!("   Duration: {:?}", self.duration);
        println!("   Commands executed: {}", self.commands_executed);
        println!("   Assertions passed: {}", self.assertions_passed);
        println!("   Assertions failed: {}", self.assertions_failed);

        if !self.errors.is_empty() {
            println!("   Errors:");
            for error in &self.errors {
                println!("     - {}", error);
            }
        }

        if self.success {
            println!("   Status: ✅ PASSED");
        } else {
            println!("   Status: ❌ FAILED");
        }
    }
}
