//! CLI command implementations

pub mod config;
pub mod copy;
pub mod lifecycle;
pub mod panel;
pub mod status;

pub use config::{config_get, config_init, config_path, config_set, config_show};
pub use copy::copy_command;
pub use lifecycle::{start_command, stop_command};
pub use panel::panel_command;
pub use status::status_command;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use a1_core::config::{load_panel_config, PanelConfig};
use a1_panel::{EventSubscriber, IpcGateway, LifecycleController, Outcome, SystemClipboard};

use crate::output::print_error;

/// Settings shared by the commands that talk to the terminal service
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: PanelConfig,
    /// Service address; `--address` wins over the configured port
    pub address: String,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>, address: Option<String>) -> Result<Self> {
        let config = load_panel_config(config_path)
            .context("Failed to load configuration")?;
        let address = address.unwrap_or_else(|| config.ipc_address());
        Ok(Self { config, address })
    }

    pub fn gateway(&self) -> IpcGateway {
        IpcGateway::new(&self.address).with_timeout(self.config.request_timeout)
    }

    pub fn subscriber(&self) -> EventSubscriber {
        EventSubscriber::new(&self.address).with_buffer(self.config.event_buffer)
    }

    pub fn controller(&self) -> LifecycleController {
        LifecycleController::new(
            Arc::new(self.gateway()),
            Arc::new(SystemClipboard::new()),
            &self.config,
        )
    }
}

/// Fetch the current status into `controller`, failing with its notice
pub(crate) async fn refresh_or_fail(controller: &LifecycleController) -> Result<()> {
    match controller.refresh().await {
        Outcome::Failed => Err(fail_with_notice(controller, "get terminal status")),
        _ => Ok(()),
    }
}

/// Report the notice raised by a failed action and turn it into an error
pub(crate) fn fail_with_notice(controller: &LifecycleController, action: &str) -> anyhow::Error {
    if let Some(notice) = controller.notice() {
        print_error(&notice.message);
    }
    anyhow::anyhow!("Failed to {}", action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_uses_configured_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[panel]\nipc_port = 4100\n").unwrap();

        let ctx = AppContext::load(Some(&path), None).unwrap();
        assert_eq!(ctx.address, "127.0.0.1:4100");
        assert_eq!(ctx.gateway().address(), "127.0.0.1:4100");
    }

    #[test]
    fn test_context_address_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let ctx = AppContext::load(Some(&path), Some("127.0.0.1:5000".to_string())).unwrap();
        assert_eq!(ctx.address, "127.0.0.1:5000");
        assert_eq!(ctx.config, PanelConfig::default());
    }
}
