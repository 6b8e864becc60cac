//! Copy command implementation

use anyhow::Result;

use a1_panel::Outcome;

use super::{fail_with_notice, refresh_or_fail, AppContext};
use crate::output::{print_success, print_warning};

/// Copy the running session's URL to the clipboard
pub async fn copy_command(ctx: &AppContext) -> Result<()> {
    let controller = ctx.controller();
    refresh_or_fail(&controller).await?;

    match controller.copy_url().await {
        Outcome::Succeeded => {
            print_success(&format!("Copied {}", controller.snapshot().url()));
            Ok(())
        }
        Outcome::Skipped => {
            print_warning("Terminal is not running; nothing to copy");
            anyhow::bail!("No session URL to copy")
        }
        Outcome::Failed => Err(fail_with_notice(&controller, "copy session URL")),
    }
}
