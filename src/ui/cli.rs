//! Simple CLI output implementation
//!
//! Provides plain command-line output for the one-shot subcommands.

use colored::Colorize;

use crate::AppResult;
use crate::cli::Cli;
use crate::config::Config;
use crate::remote::{AgentSummary, SessionRecord};
use crate::surface::Theme;

/// Display the session listing
pub fn display_sessions(sessions: &[SessionRecord]) -> AppResult<()> {
    println!("{}", "Sessions:".bold());
    if sessions.is_empty() {
        println!("   (No sessions)");
    } else {
        for (i, session) in sessions.iter().enumerate() {
            println!(
                "   {}. {} {}",
                i + 1,
                session.name.cyan(),
                format!("[{}]", session.id).dimmed()
            );
        }
    }

    Ok(())
}

/// Confirm a created or renamed session
pub fn display_session(verb: &str, session: &SessionRecord) -> AppResult<()> {
    println!(
        "{} {} {}",
        verb.green(),
        session.name.cyan(),
        format!("[{}]", session.id).dimmed()
    );
    Ok(())
}

pub fn display_deleted(id: &str) -> AppResult<()> {
    println!("{} {}", "Deleted".green(), id);
    Ok(())
}

/// Display configured agents
pub fn display_agents(agents: &[AgentSummary]) -> AppResult<()> {
    println!("{}", "Agents:".bold());
    if agents.is_empty() {
        println!("   (No agents configured)");
    }
    for agent in agents {
        println!("   {} {}", agent.name.cyan(), format!("[{}]", agent.id).dimmed());
        if !agent.description.is_empty() {
            println!("      {}", agent.description);
        }
        if let Some(model) = &agent.model {
            println!("      Model: {}", model);
        }
        if !agent.tools.is_empty() {
            println!("      Tools: {}", agent.tools.join(", "));
        }
        if !agent.mcp_servers.is_empty() {
            println!("      MCP servers: {}", agent.mcp_servers.join(", "));
        }
    }

    Ok(())
}

/// Display tool names
pub fn display_tools(tools: &[String]) -> AppResult<()> {
    println!("{}", "Available tools:".bold());
    if tools.is_empty() {
        println!("   (None)");
    }
    for tool in tools {
        println!("   • {}", tool);
    }
    Ok(())
}

pub fn display_theme_saved(theme: Theme) -> AppResult<()> {
    println!("{} {}", "Theme saved:".green(), theme.as_str().bold());
    Ok(())
}

/// Report a failed one-shot command
pub fn display_error(context: &str, error: &dyn std::fmt::Display) {
    eprintln!("{} {}: {}", "error:".red().bold(), context, error);
}

/// Show the resolved configuration without connecting
pub fn display_dry_run(cli: &Cli, config: &Config) -> AppResult<()> {
    println!("┌─ muxdeck dry run ──────────────────────────────────────────────────┐");
    println!("│   Config file: {:<52}│", cli.config_file);
    println!("│   Log level:   {:<52}│", cli.effective_log_level());
    println!("│   API:         {:<52}│", config.server.api_url);
    println!("│   Streams:     {:<52}│", format!("{}/ws/{{id}}", config.server.ws_url.trim_end_matches('/')));
    println!(
        "│   Terminal:    {:<52}│",
        format!(
            "max {} cols, {} lines scrollback",
            config.terminal.max_cols, config.terminal.scrollback
        )
    );
    println!(
        "│   Resize:      {:<52}│",
        format!("{}ms debounce", config.ui.resize_debounce_ms)
    );
    println!("│   Theme:       {:<52}│", config.ui.default_theme.as_str());
    println!("│   Log file:    {:<52}│", config.log.file_path);
    println!("└────────────────────────────────────────────────────────────────────┘");
    Ok(())
}
