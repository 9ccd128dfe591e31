//! Configuration management module
//!
//! Handles loading, validation, and management of application configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::session::ControllerSettings;
use crate::surface::{TerminalOptions, Theme};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Logging level
    pub log_level: String,

    /// Backend endpoints
    pub server: ServerConfig,

    /// Terminal emulator settings
    pub terminal: TerminalConfig,

    /// UI-specific configuration
    pub ui: UiConfig,

    /// File-based logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// REST API base URL
    pub api_url: String,

    /// WebSocket base URL; sessions live under `/ws/{id}`
    pub ws_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Fitted width never exceeds this many columns
    pub max_cols: u16,

    /// Lines kept in scrollback
    pub scrollback: usize,

    pub cursor_blink: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw cadence in milliseconds
    pub refresh_rate_ms: u64,

    /// Resize debounce window in milliseconds
    pub resize_debounce_ms: u64,

    /// Theme used when no preference is stored
    pub default_theme: Theme,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Absolute or relative path to the rolling log file
    pub file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            terminal: TerminalConfig::default(),
            ui: UiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        let options = TerminalOptions::default();
        Self {
            max_cols: options.max_cols,
            scrollback: options.scrollback,
            cursor_blink: options.cursor_blink,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            resize_debounce_ms: 100,
            default_theme: Theme::Dark,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: "logs/muxdeck.log".to_string(),
        }
    }
}

fn parse_into<T: std::str::FromStr>(value: Option<String>, target: &mut T) {
    if let Some(parsed) = value.and_then(|v| v.trim().parse::<T>().ok()) {
        *target = parsed;
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply `MUXDECK_*` environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // MUXDECK_API_URL / MUXDECK_WS_URL - backend endpoints
        if let Some(api_url) = lookup("MUXDECK_API_URL").filter(|v| !v.trim().is_empty()) {
            self.server.api_url = api_url;
        }
        if let Some(ws_url) = lookup("MUXDECK_WS_URL").filter(|v| !v.trim().is_empty()) {
            self.server.ws_url = ws_url;
        }
        parse_into(
            lookup("MUXDECK_TIMEOUT_SECONDS"),
            &mut self.server.timeout_seconds,
        );

        // MUXDECK_LOG_LEVEL - logging level
        if let Some(log_level) = lookup("MUXDECK_LOG_LEVEL") {
            self.log_level = log_level;
        }

        // MUXDECK_LOG_FILE_PATH - logging destination file
        if let Some(file_path) = lookup("MUXDECK_LOG_FILE_PATH") {
            if !file_path.trim().is_empty() {
                self.log.file_path = file_path;
            }
        }

        parse_into(
            lookup("MUXDECK_REFRESH_RATE_MS"),
            &mut self.ui.refresh_rate_ms,
        );
        parse_into(
            lookup("MUXDECK_RESIZE_DEBOUNCE_MS"),
            &mut self.ui.resize_debounce_ms,
        );
        parse_into(
            lookup("MUXDECK_DEFAULT_THEME"),
            &mut self.ui.default_theme,
        );

        parse_into(
            lookup("MUXDECK_TERMINAL_MAX_COLS"),
            &mut self.terminal.max_cols,
        );
        parse_into(
            lookup("MUXDECK_TERMINAL_SCROLLBACK"),
            &mut self.terminal.scrollback,
        );
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, url, schemes) in [
            ("server.api_url", &self.server.api_url, ["http://", "https://"]),
            ("server.ws_url", &self.server.ws_url, ["ws://", "wss://"]),
        ] {
            if !schemes.iter().any(|scheme| url.starts_with(scheme)) {
                anyhow::bail!("{} must start with {}: {}", name, schemes.join(" or "), url);
            }
        }

        if self.server.timeout_seconds == 0 {
            anyhow::bail!("Timeout must be greater than 0");
        }

        if self.ui.refresh_rate_ms == 0 {
            anyhow::bail!("Refresh rate must be greater than 0");
        }

        if self.terminal.max_cols < 20 {
            anyhow::bail!("terminal.max_cols must be at least 20");
        }

        if self.log.file_path.trim().is_empty() {
            anyhow::bail!("Log file path must not be empty");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds)
    }

    pub fn terminal_options(&self) -> TerminalOptions {
        TerminalOptions {
            max_cols: self.terminal.max_cols,
            scrollback: self.terminal.scrollback,
            cursor_blink: self.terminal.cursor_blink,
        }
    }

    /// Controller tuning derived from this configuration
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            resize_debounce: Duration::from_millis(self.ui.resize_debounce_ms),
            terminal: self.terminal_options(),
            default_theme: self.ui.default_theme,
        }
    }

    /// Display formatted configuration
    pub fn display(&self) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        println!("Current configuration:");
        println!("{}", content);
        Ok(())
    }

    /// Display configuration management help
    pub fn display_help() -> Result<()> {
        println!("Configuration management commands:");
        println!("  muxdeck config show    - Show current configuration");
        println!("  muxdeck config reset   - Reset to default configuration");
        Ok(())
    }

    /// Handle configuration command
    pub fn handle_command(action: &Option<crate::cli::ConfigAction>, path: &str) -> Result<()> {
        match action {
            Some(crate::cli::ConfigAction::Show) => {
                let config = Config::load_or_default(path);
                config.display()?;
            }
            Some(crate::cli::ConfigAction::Reset) => {
                let default_config = Config::default();
                default_config.save_to_file(path)?;
                println!("Configuration reset: {}", path);
                default_config.display()?;
            }
            None => {
                Config::display_help()?;
            }
        }
        Ok(())
    }
}
