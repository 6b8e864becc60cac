//! a1-panel: Session lifecycle control for the A1 Shell panel
//!
//! The [`LifecycleController`] merges results of start/stop commands sent
//! through a [`CommandGateway`] with status pushes arriving on the event
//! channel, and publishes one consistent [`PanelView`] to whatever renders
//! the panel.

pub mod clipboard;
pub mod controller;
pub mod events;
pub mod gateway;
pub mod notice;
pub mod state;

pub use clipboard::{Clipboard, ClipboardTool, SystemClipboard};
pub use controller::{LifecycleController, Outcome};
pub use events::EventSubscriber;
pub use gateway::{CommandGateway, IpcGateway};
pub use notice::{ErrorNotice, FailureClassifier};
pub use state::{LifecyclePhase, PanelState, PanelView};
