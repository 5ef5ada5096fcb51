// Library module containing the non-interactive subcommands of main.rs

use std::fs;
use std::path::Path;

use crate::app::App;
use crate::command::Command;
use crate::config::Config;
use crate::error::{AriaTreeError, Result};
use crate::executor::Executor;
use crate::screenshot::render_to_string;
use crate::session::SessionState;
use crate::test_runner::{TestResult, TestRunner};

/// Read a markup file, or fall back to the built-in sample outline
pub fn load_app(markup_path: Option<&Path>, config: Config) -> Result<App> {
    match markup_path {
        Some(path) => {
            let markup = fs::read_to_string(path)?;
            log::info!("Loading markup from {}", path.display());
            App::from_markup(&markup, config)
        }
        None => App::sample(config),
    }
}

fn write_output(output_path: Option<&Path>, content: &str, what: &str) -> Result<()> {
    match output_path {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} saved to: {}", what, path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

pub fn execute_command(
    state_path: &Path,
    command_str: &str,
    output_path: Option<&Path>,
    generate_screenshot: bool,
    width: u16,
    height: u16,
    config: &Config,
) -> Result<()> {
    let state = SessionState::load_from_file(state_path)?;
    let command = Command::from_string(command_str)?;

    let result = Executor::execute(&state, config, &command)?;
    let result_json = result.state.to_json()?;
    write_output(output_path, &result_json, "Result")?;

    // Show execution summary
    if let Some(status) = &result.status_message {
        eprintln!("Status: {}", status);
    }
    if result.should_quit {
        eprintln!("Command resulted in quit");
    }

    if generate_screenshot {
        let screenshot_path = output_path
            .map(|p| p.with_extension("screenshot.txt"))
            .unwrap_or_else(|| "command_result_screenshot.txt".into());

        let mut app = App::from_session(&result.state, config.clone())?;
        fs::write(&screenshot_path, render_to_string(&mut app, width, height)?)?;
        eprintln!("Screenshot saved to: {}", screenshot_path.display());
    }

    Ok(())
}

pub fn save_state(markup_path: &Path, output_path: Option<&Path>, config: &Config) -> Result<()> {
    let app = load_app(Some(markup_path), config.clone())?;
    let state_json = SessionState::from_app(&app).to_json()?;
    write_output(output_path, &state_json, "State")
}

pub fn run_script(
    script_path: &Path,
    markup_path: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<TestResult> {
    log::info!("🧪 Script: {}", script_path.display());

    let mut app = load_app(markup_path, config.clone())?;
    let mut runner = TestRunner::from_file(script_path)?;
    runner.overwrite_mode = overwrite;

    let result = runner.run(&mut app);
    result.print_summary();

    if result.success {
        log::info!("🧪 Test completed successfully");
        Ok(result)
    } else {
        log::error!("🧪 Test failed");
        Err(AriaTreeError::Generic(format!(
            "Test failed with {} error(s)",
            result.errors.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = "<ul><li><span>A</span><ul><li>B</li><li>C</li></ul></li><li>D</li></ul>";

    #[test]
    fn test_save_state_then_execute() {
        let dir = tempfile::tempdir().unwrap();
        let markup_path = dir.path().join("tree.html");
        let state_path = dir.path().join("state.json");
        let result_path = dir.path().join("result.json");
        fs::write(&markup_path, MARKUP).unwrap();

        save_state(&markup_path, Some(state_path.as_path()), &Config::default()).unwrap();
        let state = SessionState::load_from_file(&state_path).unwrap();
        assert_eq!(state.markup, MARKUP);
        assert_eq!(state.active, None);

        execute_command(
            &state_path,
            "key:left",
            Some(result_path.as_path()),
            true,
            60,
            12,
            &Config::default(),
        )
        .unwrap();

        let result = SessionState::load_from_file(&result_path).unwrap();
        assert_eq!(result.collapsed, vec![0]);
        let screen = fs::read_to_string(dir.path().join("result.screenshot.txt")).unwrap();
        assert!(screen.contains("▶ A"));
    }

    #[test]
    fn test_execute_rejects_bad_command() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        SessionState::default().save_to_file(&state_path).unwrap();

        let result = execute_command(&state_path, "fly", None, false, 80, 24, &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_run_script_against_markup() {
        let dir = tempfile::tempdir().unwrap();
        let markup_path = dir.path().join("tree.html");
        let script_path = dir.path().join("nav.script");
        fs::write(&markup_path, MARKUP).unwrap();
        fs::write(&script_path, "focus\nkey:left\nassert:visible:A,D\nkey:down\nassert:active:D\n")
            .unwrap();

        let result =
            run_script(&script_path, Some(markup_path.as_path()), false, &Config::default()).unwrap();
        assert_eq!(result.assertions_passed, 2);
    }
}
