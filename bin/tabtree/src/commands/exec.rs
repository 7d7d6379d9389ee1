use std::path::PathBuf;
use tabtree_core::Command;

use super::Workspace;

/// Run a named tab command and persist the resulting window.
pub async fn run(home: Option<PathBuf>, name: &str) -> anyhow::Result<()> {
    let command: Command = name.parse()?;
    let ws = Workspace::open(home).await?;

    if command == Command::PrintDebugInfo {
        print!("{}", ws.manager.debug_report().await?);
        return Ok(());
    }

    ws.manager.dispatch(command).await?;
    ws.save().await?;

    println!("✓ {}", command);
    ws.print_mutations().await?;
    Ok(())
}

pub async fn tree(home: Option<PathBuf>) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;
    print!("{}", ws.manager.debug_report().await?);
    Ok(())
}

pub fn list() {
    println!();
    println!("Tab commands ({})", Command::ALL.len());
    println!();
    for command in Command::ALL {
        println!("  {:<20} {}", command.name(), command.description());
    }
}
