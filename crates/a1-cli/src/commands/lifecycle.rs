//! Start and stop commands
//!
//! Each runs a single transition through the lifecycle controller so the
//! same guards apply as in the interactive panel.

use anyhow::Result;

use a1_panel::Outcome;

use super::{fail_with_notice, refresh_or_fail, AppContext};
use crate::output::{format_credentials, print_info, print_success, print_warning};

/// Start a terminal session and print its credentials
pub async fn start_command(ctx: &AppContext) -> Result<()> {
    let controller = ctx.controller();
    refresh_or_fail(&controller).await?;

    match controller.request_start().await {
        Outcome::Succeeded => {
            print_success("Terminal started");
            println!("{}", format_credentials(&controller.snapshot()));
            Ok(())
        }
        Outcome::Skipped => {
            print_warning("Terminal is already running");
            println!("{}", format_credentials(&controller.snapshot()));
            Ok(())
        }
        Outcome::Failed => Err(fail_with_notice(&controller, "start terminal")),
    }
}

/// Stop the running terminal session
pub async fn stop_command(ctx: &AppContext) -> Result<()> {
    let controller = ctx.controller();
    refresh_or_fail(&controller).await?;

    match controller.request_stop().await {
        Outcome::Succeeded => {
            print_success("Terminal stopped");
            Ok(())
        }
        Outcome::Skipped => {
            print_info("Terminal is not running");
            Ok(())
        }
        Outcome::Failed => Err(fail_with_notice(&controller, "stop terminal")),
    }
}
