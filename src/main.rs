use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};

use dirview::app::App;
use dirview::async_task::Fetchers;
use dirview::cli::{Cli, Commands, LocationArgs};
use dirview::config::Config;
use dirview::controller::DirectoryViewController;
use dirview::error::{DirViewError, Result};
use dirview::graphql::HttpQueryService;
use dirview::navigation::NavigationParameters;
use dirview::query::{full_query, SearchScope};
use dirview::search::{build_search_url, UrlSubmitter};
use dirview::{event, screenshot, ui};

const LOG_ENV: &str = "DIRVIEW_LOG";

fn init_logging(verbose: bool) -> Result<()> {
    // Interactive runs log to a file only, never to the terminal.
    if let Ok(log_file) = std::env::var(LOG_ENV) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| DirViewError::Config(format!("Failed to open log file {}: {}", log_file, e)))?;
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else if verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Show { verbose, .. } | Commands::Search { verbose, .. } => *verbose,
        Commands::Browse { .. } => false,
    };
    init_logging(verbose)?;
    log::info!("dirview starting up");

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Commands::Browse { location } => run_interactive(&config, &location).await,
        Commands::Show {
            location,
            output,
            width,
            height,
            ..
        } => show_once(&config, &location, output.as_deref(), width, height).await,
        Commands::Search { location, query, .. } => {
            print_search_url(&config, &location.to_parameters(), &query);
            Ok(())
        }
    }
}

fn mount_controller(config: &Config, params: NavigationParameters) -> Result<DirectoryViewController> {
    let service = HttpQueryService::new(config)?;
    let fetchers = Fetchers::new(Arc::new(service), config.cache_capacity);
    let submitter = UrlSubmitter::new(config.endpoint.clone(), config.open_search_in_browser);
    Ok(DirectoryViewController::mount(fetchers, Arc::new(submitter), params))
}

fn print_search_url(config: &Config, params: &NavigationParameters, query: &str) {
    let scope = SearchScope::for_parameters(params);
    println!("{}", build_search_url(&config.endpoint, &full_query(params, query), scope));
}

async fn show_once(
    config: &Config,
    location: &LocationArgs,
    output_path: Option<&str>,
    width: u16,
    height: u16,
) -> Result<()> {
    let mut controller = mount_controller(config, location.to_parameters())?;

    let limit = Duration::from_secs(config.request_timeout_secs);
    if tokio::time::timeout(limit, controller.settle()).await.is_err() {
        log::warn!("show: page did not settle within {:?}", limit);
    }
    controller.unmount();

    let app = App::new(controller, config.endpoint.clone(), config.colors.clone())
        .with_description(location.description.clone());
    let page = screenshot::render_to_string(&app, width, height)?;

    match output_path {
        Some(path) => {
            std::fs::write(path, page)?;
            println!("Page saved to: {}", path);
        }
        None => print!("{}", page),
    }
    Ok(())
}

async fn run_interactive(config: &Config, location: &LocationArgs) -> Result<()> {
    let controller = mount_controller(config, location.to_parameters())?;
    let mut app = App::new(controller, config.endpoint.clone(), config.colors.clone())
        .with_description(location.description.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    app.controller.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut needs_redraw = true;

    loop {
        if app.sync_results() {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw(f, app))?;
            needs_redraw = false;
        }

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            needs_redraw = event::handle_event(event, app);
        }

        if app.should_quit {
            break;
        }

        // Let the fetch tasks make progress between polls.
        tokio::task::yield_now().await;
    }

    Ok(())
}
