mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabtree_core::TabId;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tabtree")]
#[command(about = "Tree-aware tab management over a simulated browser window", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base directory for config, session and window state (default ~/.tabtree)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tab command against the window
    Exec {
        /// Command name (see `tabtree commands`)
        command: String,
    },

    /// Deliver a browser event to the engine
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Print the tab forest
    Tree,

    /// List available tab commands
    Commands,

    /// Inspect and edit the simulated window
    Window {
        #[command(subcommand)]
        command: WindowCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum EventCommands {
    /// A tab was created, optionally by an opener
    Created {
        id: TabId,
        #[arg(long)]
        opener: Option<TabId>,
    },
    /// A tab was closed
    Removed { id: TabId },
    /// A tab finished navigating
    Navigated { id: TabId },
    /// The highlighted set changed
    Highlighted {
        #[arg(required = true)]
        ids: Vec<TabId>,
    },
}

#[derive(Subcommand)]
enum WindowCommands {
    /// Show the tabs of the window
    Show {
        /// Print raw JSON state
        #[arg(long)]
        json: bool,
    },
    /// Open a new tab
    Open {
        /// URL to load (new-tab page if omitted)
        #[arg(long)]
        url: Option<String>,
        /// Tab that opened the new tab
        #[arg(long)]
        opener: Option<TabId>,
        /// Keep the current tab active
        #[arg(long)]
        background: bool,
    },
    /// Navigate a tab to a URL
    Navigate { id: TabId, url: String },
    /// Highlight tabs by index, the first becoming active
    Highlight {
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Replace the window with fresh tabs and clear the session
    Reset {
        /// Number of tabs to start with
        #[arg(long, default_value_t = 1)]
        tabs: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Get a config value by dot-separated key (e.g. navigation.cycleScope)
    Get { key: String },
    /// Set a config value by dot-separated key
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Reset config to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let home = cli.home;

    match cli.command {
        Commands::Exec { command } => {
            commands::exec::run(home, &command).await?;
        }
        Commands::Event { command } => {
            let event = match command {
                EventCommands::Created { id, opener } => commands::event::Incoming::Created { id, opener },
                EventCommands::Removed { id } => commands::event::Incoming::Removed { id },
                EventCommands::Navigated { id } => commands::event::Incoming::Navigated { id },
                EventCommands::Highlighted { ids } => commands::event::Incoming::Highlighted { ids },
            };
            commands::event::run(home, event).await?;
        }
        Commands::Tree => {
            commands::exec::tree(home).await?;
        }
        Commands::Commands => {
            commands::exec::list();
        }
        Commands::Window { command } => match command {
            WindowCommands::Show { json } => {
                commands::window::show(home, json).await?;
            }
            WindowCommands::Open {
                url,
                opener,
                background,
            } => {
                commands::window::open(home, url, opener, !background).await?;
            }
            WindowCommands::Navigate { id, url } => {
                commands::window::navigate(home, id, &url).await?;
            }
            WindowCommands::Highlight { indices } => {
                commands::window::highlight(home, &indices).await?;
            }
            WindowCommands::Reset { tabs } => {
                commands::window::reset(home, tabs).await?;
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show(home).await?;
            }
            ConfigCommands::Get { key } => {
                commands::config_cmd::get(home, &key).await?;
            }
            ConfigCommands::Set { key, value } => {
                commands::config_cmd::set(home, &key, &value).await?;
            }
            ConfigCommands::Path => {
                commands::config_cmd::path(home);
            }
            ConfigCommands::Reset { force } => {
                commands::config_cmd::reset(home, force).await?;
            }
        },
    }

    Ok(())
}
