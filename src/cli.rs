//! Command-line host for the dashboard.
//!
//! Stands in for the page UI: every subcommand maps onto one dashboard
//! operation, and destructive ones require `--yes` as their confirmation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::dashboard::Dashboard;
use crate::modules::deletion::TabDeletion;
use crate::storage::{FileStorage, StateStorage};

#[derive(Parser, Debug)]
#[command(name = "modern-homepage")]
#[command(about = "Manage the tabs and quick links of a new tab dashboard", long_about = None)]
pub struct Cli {
    /// Directory holding the saved dashboard
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show tabs in display order with the links of the active tab
    List,

    /// Tab operations
    #[command(subcommand)]
    Tab(TabCommand),

    /// Quick link operations on the active tab
    #[command(subcommand)]
    Link(LinkCommand),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Export a backup (to stdout unless --out is given)
    Export {
        /// Directory to write a dated backup file into
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace everything with the contents of a backup file
    Import {
        file: PathBuf,

        /// Confirm replacing all current data
        #[arg(long)]
        yes: bool,
    },

    /// Delete all tabs and settings
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TabCommand {
    Add {
        name: String,

        /// Do not switch to the new tab
        #[arg(long)]
        background: bool,
    },
    Rename {
        id: String,
        name: String,
    },
    /// Pin or unpin
    Pin {
        id: String,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,

        /// Confirm deleting a tab that still has links
        #[arg(long)]
        yes: bool,
    },
    /// Move using positions as shown by `list` (0-based)
    Move {
        from: usize,
        to: usize,
    },
    Switch {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    Add {
        title: String,
        url: String,

        /// Target tab id instead of the active tab
        #[arg(long)]
        tab: Option<String>,
    },
    Edit {
        id: String,
        title: String,
        url: String,
    },
    Delete {
        id: String,
    },
    Duplicate {
        id: String,
    },
    /// Move by 0-based position within the active tab
    Move {
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Set a key; the value is read as JSON, or as a plain string otherwise
    Set {
        key: String,
        value: String,
    },
    Reset,
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("modern-homepage"))
        .unwrap_or_else(|| PathBuf::from(".modern-homepage"))
}

/// Opens the file-backed dashboard and runs one command, printing its output.
pub fn run(cli: Cli) -> Result<(), String> {
    let dir = cli.data_dir.unwrap_or_else(default_data_dir);
    log::debug!("[Cli] Using data dir {}", dir.display());

    let mut dashboard = Dashboard::open(FileStorage::new(dir));
    let output = execute(&mut dashboard, cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn refused(what: &str) -> String {
    format!("{} was refused (unknown id, or the tab is default/pinned)", what)
}

/// Applies `command` and returns the text to show the user.
pub fn execute<S: StateStorage>(
    dashboard: &mut Dashboard<S>,
    command: Command,
) -> Result<String, String> {
    match command {
        Command::List => Ok(render_list(dashboard)),
        Command::Tab(command) => execute_tab(dashboard, command),
        Command::Link(command) => execute_link(dashboard, command),
        Command::Settings(command) => execute_settings(dashboard, command),
        Command::Export { out: None } => dashboard.export_document().map_err(|e| e.to_string()),
        Command::Export { out: Some(dir) } => dashboard
            .write_backup(&dir)
            .map(|path| format!("Exported to {}", path.display()))
            .map_err(|e| e.to_string()),
        Command::Import { yes: false, .. } => {
            Err("Import replaces all current data; pass --yes to continue".to_string())
        }
        Command::Import { file, yes: true } => {
            dashboard.import_file(&file).map_err(|e| e.to_string())?;
            Ok(format!("Imported {} tabs", dashboard.state().tabs.len()))
        }
        Command::Reset { yes: false } => {
            Err("Reset deletes all data; pass --yes to continue".to_string())
        }
        Command::Reset { yes: true } => {
            dashboard.reset_to_default();
            Ok("Reset to defaults".to_string())
        }
    }
}

fn execute_tab<S: StateStorage>(
    dashboard: &mut Dashboard<S>,
    command: TabCommand,
) -> Result<String, String> {
    match command {
        TabCommand::Add { name, background } => {
            let tab = dashboard.create_tab(&name, !background);
            Ok(format!("Created tab '{}' ({})", tab.name, tab.id))
        }
        TabCommand::Rename { id, name } => {
            if name.trim().is_empty() {
                return Err("Tab name cannot be empty".to_string());
            }
            if dashboard.rename_tab(&id, &name) {
                Ok(format!("Renamed {}", id))
            } else {
                Err(refused("Rename"))
            }
        }
        TabCommand::Pin { id } => {
            if !dashboard.toggle_pin(&id) {
                return Err(refused("Pin"));
            }
            let pinned = dashboard.state().tab(&id).map(|t| t.pinned).unwrap_or_default();
            let label = if pinned { "Pinned" } else { "Unpinned" };
            Ok(label.to_string())
        }
        TabCommand::Duplicate { id } => dashboard
            .duplicate_tab(&id)
            .map(|tab| format!("Created tab '{}' ({})", tab.name, tab.id))
            .ok_or_else(|| format!("No tab {}", id)),
        TabCommand::Delete { id, yes } => match dashboard.request_tab_deletion(&id) {
            TabDeletion::Deleted { .. } => Ok("Tab deleted".to_string()),
            TabDeletion::Rejected { reason, .. } => Err(reason.to_string()),
            pending @ TabDeletion::AwaitingConfirmation { .. } if yes => {
                match dashboard.confirm_tab_deletion(pending) {
                    TabDeletion::Deleted { .. } => Ok("Tab deleted".to_string()),
                    TabDeletion::Rejected { reason, .. } => Err(reason.to_string()),
                    other => Err(format!("Unexpected deletion state {:?}", other)),
                }
            }
            TabDeletion::AwaitingConfirmation { link_count, .. } => Err(format!(
                "Tab has {} links; pass --yes to delete it anyway",
                link_count
            )),
            TabDeletion::Cancelled { .. } => Ok("Cancelled".to_string()),
        },
        TabCommand::Move { from, to } => {
            if dashboard.move_tab_in_display(from, to) {
                Ok("Moved".to_string())
            } else {
                Err("Tab not moved (default and pinned tabs stay in place)".to_string())
            }
        }
        TabCommand::Switch { id } => {
            if dashboard.set_active(&id) {
                Ok(format!("Active tab is now {}", id))
            } else {
                Err(format!("No tab {}", id))
            }
        }
    }
}

fn execute_link<S: StateStorage>(
    dashboard: &mut Dashboard<S>,
    command: LinkCommand,
) -> Result<String, String> {
    let not_found = |id: &str| format!("No link {} in the active tab", id);

    match command {
        LinkCommand::Add { title, url, tab } => {
            let link = match tab {
                Some(tab_id) => dashboard.add_link_to(&tab_id, &title, &url),
                None => dashboard.add_link(&title, &url),
            };
            link.map(|l| format!("Added '{}' -> {} ({})", l.title, l.url, l.id))
                .ok_or_else(|| "Title and URL are required, and the tab must exist".to_string())
        }
        LinkCommand::Edit { id, title, url } => {
            if dashboard.edit_link(&id, &title, &url) {
                Ok("Link updated".to_string())
            } else {
                Err(not_found(&id))
            }
        }
        LinkCommand::Delete { id } => {
            if dashboard.delete_link(&id) {
                Ok("Link deleted".to_string())
            } else {
                Err(not_found(&id))
            }
        }
        LinkCommand::Duplicate { id } => dashboard
            .duplicate_link(&id)
            .map(|l| format!("Duplicated as {}", l.id))
            .ok_or_else(|| not_found(&id)),
        LinkCommand::Move { from, to } => {
            if dashboard.reorder_link(from, to) {
                Ok("Moved".to_string())
            } else {
                Err("Link not moved".to_string())
            }
        }
    }
}

fn execute_settings<S: StateStorage>(
    dashboard: &mut Dashboard<S>,
    command: SettingsCommand,
) -> Result<String, String> {
    match command {
        SettingsCommand::Show => {
            serde_json::to_string_pretty(dashboard.settings()).map_err(|e| e.to_string())
        }
        SettingsCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            if dashboard.update_setting(&key, value) {
                Ok(format!("Updated {}", key))
            } else {
                Err(format!("Cannot set {}", key))
            }
        }
        SettingsCommand::Reset => {
            dashboard.reset_settings();
            Ok("Settings reset".to_string())
        }
    }
}

fn render_list<S: StateStorage>(dashboard: &Dashboard<S>) -> String {
    let active = dashboard.state().active_tab_id.as_deref();
    let mut out = String::new();

    for (position, tab) in dashboard.display_order().into_iter().enumerate() {
        let marker = if Some(tab.id.as_str()) == active { '*' } else { ' ' };
        let flag = if tab.is_default {
            " [default]"
        } else if tab.pinned {
            " [pinned]"
        } else {
            ""
        };
        let _ = writeln!(out, "{} {}. {}{} ({})", marker, position, tab.name, flag, tab.id);

        if Some(tab.id.as_str()) == active {
            for (index, link) in tab.quick_links.iter().enumerate() {
                let _ = writeln!(out, "      {}. {} - {} ({})", index, link.title, link.url, link.id);
            }
        }
    }

    out.trim_end().to_string()
}
