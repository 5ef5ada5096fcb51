use aria_tree::{
    app::App,
    cli::{Cli, Commands},
    config::Config,
    error::Result,
    event, main_lib, screenshot, ui,
};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::Path, time::Duration};

fn main() -> Result<()> {
    // Initialize logger only if ARIA_TREE_LOG environment variable is set
    let log_to_file = match std::env::var("ARIA_TREE_LOG") {
        Ok(log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)?;
            env_logger::Builder::new()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .filter_level(log::LevelFilter::Debug)
                .init();
            log::info!("aria-tree starting up");
            true
        }
        Err(_) => false,
    };

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run { markup: None }) {
        Commands::Run { markup } => run_interactive(markup.as_deref(), config),
        Commands::Screenshot {
            state,
            output,
            width,
            height,
        } => screenshot::generate_screenshot(&state, output.as_deref(), width, height, &config),
        Commands::Execute {
            state,
            command,
            output,
            screenshot,
            width,
            height,
        } => main_lib::execute_command(
            &state,
            &command,
            output.as_deref(),
            screenshot,
            width,
            height,
            &config,
        ),
        Commands::SaveState { markup, output } => {
            main_lib::save_state(&markup, output.as_deref(), &config)
        }
        Commands::Test {
            script,
            markup,
            overwrite,
            verbose,
        } => {
            if verbose && !log_to_file {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .init();
            }
            log::info!("🧪 Starting headless test run");
            main_lib::run_script(&script, markup.as_deref(), overwrite, &config).map(|_| ())
        }
    }
}

fn run_interactive(markup_path: Option<&Path>, config: Config) -> Result<()> {
    let tick_rate = Duration::from_millis(config.behavior.tick_rate_ms);
    let mut app = main_lib::load_app(markup_path, config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, tick_rate);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut needs_redraw = true;

    loop {
        // Handle forced screen redraw
        if app.ui.force_redraw {
            terminal.clear()?;
            app.ui.force_redraw = false;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw(f, app))?;
            needs_redraw = false;
        }

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            match event::handle_event(event, app) {
                Ok(changed) => needs_redraw = changed,
                Err(e) => {
                    log::error!("Error handling event: {}", e);
                    app.ui.status_message = format!("Error handling event: {}", e);
                    needs_redraw = true;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
