use std::path::Path;
use std::sync::Arc;

use muxdeck::cli::{Cli, Commands, SessionAction};
use muxdeck::config::Config;
use muxdeck::remote::{RestClient, SessionStore};
use muxdeck::session::SessionController;
use muxdeck::transport::WebSocketConnector;
use muxdeck::ui::cli as output;
use muxdeck::ui::ui_manager::UIManager;
use muxdeck::{AppResult, init_logging};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load_or_default(&cli.config_file);
    let log_level = if cli.verbose {
        cli.effective_log_level()
    } else if cli.log_level == "info" {
        config.log_level.clone()
    } else {
        cli.log_level.clone()
    };

    if cli.is_dry_run_mode() {
        init_logging(&log_level, None)?;
        return output::display_dry_run(&cli, &config);
    }

    // The TUI owns the screen, so interactive logs go to a file
    let log_file = cli
        .is_interactive_mode()
        .then(|| Path::new(&config.log.file_path));
    let _log_guard = init_logging(&log_level, log_file)?;

    tracing::info!("muxdeck starting...");
    tracing::debug!("CLI arguments: {:?}", cli);

    let client = RestClient::new(config.server.api_url.clone(), config.request_timeout());

    match cli.command() {
        Commands::Interactive => {
            let connector = WebSocketConnector::new(config.server.ws_url.clone());
            let controller = SessionController::start(
                Arc::new(client),
                Arc::new(connector),
                config.controller_settings(),
            )
            .await;

            let mut ui_manager = UIManager::new(controller, &config);
            ui_manager.run().await?;
        }
        Commands::Sessions { action } => run_session_action(&client, action).await?,
        Commands::Agents => match client.list_agents().await {
            Ok(agents) => output::display_agents(&agents)?,
            Err(e) => fail("Failed to list agents", &e)?,
        },
        Commands::Tools => match client.list_available_tools().await {
            Ok(tools) => output::display_tools(&tools)?,
            Err(e) => fail("Failed to list tools", &e)?,
        },
        Commands::Theme { theme } => match client.set_theme(theme).await {
            Ok(()) => output::display_theme_saved(theme)?,
            Err(e) => fail("Failed to save theme", &e)?,
        },
        Commands::Config { action } => {
            Config::handle_command(&action, &cli.config_file)?;
        }
    }

    Ok(())
}

async fn run_session_action(client: &RestClient, action: SessionAction) -> AppResult<()> {
    match action {
        SessionAction::List => match client.list_sessions().await {
            Ok(sessions) => output::display_sessions(&sessions),
            Err(e) => fail("Failed to list sessions", &e),
        },
        SessionAction::Create { name } => {
            match client.create_session(name.as_deref().unwrap_or("")).await {
                Ok(session) => output::display_session("Created", &session),
                Err(e) => fail("Failed to create session", &e),
            }
        }
        SessionAction::Rename { id, name } => match client.rename_session(&id, &name).await {
            Ok(session) => output::display_session("Renamed", &session),
            Err(e) => fail("Failed to rename session", &e),
        },
        SessionAction::Delete { id } => match client.delete_session(&id).await {
            Ok(()) => output::display_deleted(&id),
            Err(e) => fail("Failed to delete session", &e),
        },
    }
}

fn fail(context: &str, error: &muxdeck::remote::StoreError) -> AppResult<()> {
    tracing::error!("{}: {}", context, error);
    output::display_error(context, error);
    Err(format!("{}: {}", context, error).into())
}
