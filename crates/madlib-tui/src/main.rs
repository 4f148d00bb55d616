use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use madlib_core::{Config, Generator, ModelRole, OllamaClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod canvas_view;
mod handler;
mod tui;
mod ui;

use app::{App, Screen};
use tui::{EventHandler, Tui};

const DEFAULT_FILTER: &str = "madlib=info,madlib_core=info";

#[derive(Parser)]
#[command(name = "madlib")]
#[command(version, about = "Co-write stories and arrange visual poetry with a local language model")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Generate service base URL
    #[arg(long, global = true, env = "MADLIB_ENDPOINT")]
    endpoint: Option<String>,

    /// Directory for exported stories and images
    #[arg(long, global = true, env = "MADLIB_EXPORT_DIR")]
    export_dir: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Co-write a short story (default)
    Story,
    /// Arrange suggested words on a canvas
    Poetry,
    /// List models installed on the generate service
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Story);

    init_logging(matches!(command, Commands::Models))?;

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    write_default_config();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = Some(dir);
    }

    match command {
        Commands::Story => run_tui(config, Screen::Story).await,
        Commands::Poetry => run_tui(config, Screen::Poetry).await,
        Commands::Models => list_models(&config).await,
    }
}

/// Leave an editable config behind on first run
fn write_default_config() {
    let Ok(path) = Config::get_config_path() else {
        return;
    };
    if path.exists() {
        return;
    }
    // Defaults only, so environment overrides are not persisted
    match Config::new().save() {
        Ok(()) => info!(path = %path.display(), "wrote default config"),
        Err(e) => warn!(error = %e, "could not write default config"),
    }
}

/// The TUI owns the terminal, so interactive sessions log to a file
fn init_logging(to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let log_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("machine-madlib");
    fs::create_dir_all(&log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("madlib.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn client_for(config: &Config) -> OllamaClient {
    OllamaClient::with_timeout(&config.endpoint, config.request_timeout())
}

async fn run_tui(config: Config, screen: Screen) -> Result<()> {
    info!(endpoint = %config.endpoint, "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let generator: Arc<dyn Generator> = Arc::new(client_for(&config));
    let mut app = App::new(&config, generator, events.sender(), screen);
    if screen == Screen::Story {
        app.start_story();
    }

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn list_models(config: &Config) -> Result<()> {
    let client = client_for(config);
    let installed = client.list_models().await?;

    for name in &installed {
        println!("{}", name);
    }

    let models = config.models();
    for role in ModelRole::all() {
        let wanted = models.model(role);
        // Tags default to ":latest" when omitted
        let present = installed
            .iter()
            .any(|name| name == wanted || name.split(':').next() == Some(wanted));
        if !present {
            warn!(role = role.display_name(), model = wanted, "model not installed");
        }
    }
    Ok(())
}
