//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, ValueEnum};

use crate::services::{AlertDispatcher, CommandAlert, LogAlert, TerminalBell};

/// How finished timers are announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertMode {
    /// Log only
    Log,
    /// Ring the terminal bell
    Bell,
    /// Run --alert-command
    Command,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "tab-timers")]
#[command(about = "A local multi-timer daemon with tabbed groups, persistence and completion alerts")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the saved state
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "data_dir")]
    pub in_memory: bool,

    /// How to play completion alerts
    #[arg(long, value_enum, default_value = "bell")]
    pub alert: AlertMode,

    /// Player for `--alert command`; the sound name is appended
    #[arg(long, required_if_eq("alert", "command"))]
    pub alert_command: Option<String>,

    /// Pause a running timer when it enters edit mode
    #[arg(long)]
    pub pause_on_edit: bool,

    /// Count measured elapsed seconds per tick instead of exactly one
    #[arg(long)]
    pub catch_up: bool,

    /// Delete all saved data and exit
    #[arg(long)]
    pub reset: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Data directory, defaulting to `$XDG_STATE_HOME/tab-timers`, then
    /// `~/.local/state/tab-timers`, then the current directory
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home).join("tab-timers");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state").join("tab-timers");
        }
        PathBuf::from(".")
    }

    /// Build the alert dispatcher selected on the command line
    pub fn alert_dispatcher(&self) -> anyhow::Result<Arc<dyn AlertDispatcher>> {
        Ok(match self.alert {
            AlertMode::Log => Arc::new(LogAlert),
            AlertMode::Bell => Arc::new(TerminalBell),
            AlertMode::Command => {
                let line = self.alert_command.as_deref().unwrap_or_default();
                let command = CommandAlert::from_command_line(line)
                    .ok_or_else(|| anyhow::anyhow!("--alert command needs a non-empty --alert-command"))?;
                Arc::new(command)
            }
        })
    }
}
