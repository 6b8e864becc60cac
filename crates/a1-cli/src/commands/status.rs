//! Status command implementation

use anyhow::Result;

use a1_panel::CommandGateway;

use super::AppContext;
use crate::output::{format_status, print_error, print_info};

/// Execute the status command
pub async fn status_command(ctx: &AppContext, json: bool) -> Result<()> {
    let snapshot = match ctx.gateway().get_status().await {
        Ok(s) => s,
        Err(e) => {
            print_error(&format!("Failed to get terminal status: {}", e));
            print_info(&format!("Is the terminal service listening on {}?", ctx.address));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", format_status(&snapshot));
    }

    Ok(())
}
