//! Interactive control panel
//!
//! Redraws on every published [`PanelView`] and maps single keys to
//! controller actions. Actions run as their own tasks so the panel keeps
//! rendering progress while a command is in flight.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use a1_panel::{LifecycleController, PanelView};

use super::AppContext;
use crate::output::format_credentials;

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks the panel to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Start,
    Stop,
    CopyUrl,
    Quit,
}

/// Map a key event to a panel action
pub fn action_for_key(key: KeyEvent) -> Option<PanelAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PanelAction::Quit)
        }
        KeyCode::Char('s') => Some(PanelAction::Start),
        KeyCode::Char('x') => Some(PanelAction::Stop),
        KeyCode::Char('c') => Some(PanelAction::CopyUrl),
        KeyCode::Char('q') | KeyCode::Esc => Some(PanelAction::Quit),
        _ => None,
    }
}

/// Lines drawn for one view
pub fn render_lines(view: &PanelView) -> Vec<String> {
    let mut lines = vec![
        "A1 Shell".to_string(),
        String::new(),
        format!("Status: {}", view.snapshot.label()),
    ];

    if let Some(progress) = view.progress {
        lines.push(progress.to_string());
    }

    if view.snapshot.is_running() {
        lines.push(String::new());
        lines.extend(format_credentials(&view.snapshot).lines().map(String::from));
    }

    if let Some(notice) = &view.notice {
        lines.push(String::new());
        lines.extend(notice.message.lines().map(|l| format!("! {}", l)));
    }

    lines.push(String::new());
    lines.push(key_hints(view));
    lines
}

fn key_hints(view: &PanelView) -> String {
    let mut hints = Vec::new();
    if view.can_start() {
        hints.push("[s] start");
    }
    if view.can_stop() {
        hints.push("[x] stop");
        hints.push("[c] copy URL");
    }
    hints.push("[q] quit");
    hints.join("  ")
}

/// Raw mode on the alternate screen, restored on drop
struct RawTerminal;

impl RawTerminal {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn draw(view: &PanelView) -> io::Result<()> {
    let mut stdout = io::stdout();
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in render_lines(view) {
        queue!(stdout, Print(line), Print("\r\n"))?;
    }
    stdout.flush()
}

/// Read keys on a blocking thread until cancelled or the receiver is gone
fn spawn_key_reader(cancel: CancellationToken) -> mpsc::Receiver<PanelAction> {
    let (tx, rx) = mpsc::channel(16);

    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("Failed to poll terminal input: {}", e);
                    return;
                }
            }

            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(action) = action_for_key(key) {
                        if tx.blocking_send(action).is_err() {
                            return;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to read terminal input: {}", e);
                    return;
                }
            }
        }
    });

    rx
}

fn dispatch(controller: &LifecycleController, action: PanelAction) {
    let controller = controller.clone();
    tokio::spawn(async move {
        let outcome = match action {
            PanelAction::Start => controller.request_start().await,
            PanelAction::Stop => controller.request_stop().await,
            PanelAction::CopyUrl => controller.copy_url().await,
            PanelAction::Quit => return,
        };
        tracing::debug!(?action, ?outcome, "Panel action finished");
    });
}

/// Run the interactive panel until the user quits
pub async fn panel_command(ctx: &AppContext) -> Result<()> {
    let controller = ctx.controller();
    let subscriber = ctx.subscriber();
    let mut views = controller.subscribe();
    let listener = controller.initialize(subscriber.start()).await;

    let cancel = CancellationToken::new();
    let terminal = RawTerminal::enter().context("Failed to enter interactive mode")?;
    let mut actions = spawn_key_reader(cancel.clone());

    let initial = views.borrow_and_update().clone();
    let mut result = draw(&initial);

    while result.is_ok() {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                result = draw(&view);
            }

            action = actions.recv() => match action {
                Some(PanelAction::Quit) | None => break,
                Some(action) => dispatch(&controller, action),
            },

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    cancel.cancel();
    subscriber.stop();
    listener.abort();
    drop(terminal);

    result.context("Failed to draw panel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use a1_core::{StatusSnapshot, TerminalInfo};
    use a1_panel::ErrorNotice;

    fn running() -> StatusSnapshot {
        StatusSnapshot::running(TerminalInfo {
            url: "https://quiet-owl.trycloudflare.com/?t=ABCDEFGHIJKLMNOPQRSTUVWXYZ012345"
                .to_string(),
            username: "quietowl7".to_string(),
            password: "246810".to_string(),
            port: 7681,
        })
        .unwrap()
    }

    #[test]
    fn test_key_mapping() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(action_for_key(key('s')), Some(PanelAction::Start));
        assert_eq!(action_for_key(key('x')), Some(PanelAction::Stop));
        assert_eq!(action_for_key(key('c')), Some(PanelAction::CopyUrl));
        assert_eq!(action_for_key(key('q')), Some(PanelAction::Quit));
        assert_eq!(action_for_key(key('z')), None);
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(PanelAction::Quit)
        );
    }

    #[test]
    fn test_render_stopped() {
        let lines = render_lines(&PanelView::default());
        assert!(lines.contains(&"Status: Not Running".to_string()));
        assert!(lines.last().unwrap().contains("[s] start"));
        assert!(!lines.last().unwrap().contains("[x] stop"));
    }

    #[test]
    fn test_render_running_with_notice() {
        let view = PanelView {
            snapshot: running(),
            busy: false,
            progress: None,
            notice: Some(ErrorNotice {
                id: 1,
                message: "Failed to copy to clipboard".to_string(),
                raised_at: 0,
            }),
        };

        let text = render_lines(&view).join("\n");
        assert!(text.contains("Status: Running"));
        assert!(text.contains("quietowl7"));
        assert!(text.contains("! Failed to copy to clipboard"));
        assert!(text.contains("[x] stop"));
        assert!(!text.contains("[s] start"));
    }

    #[test]
    fn test_render_busy_hides_actions() {
        let view = PanelView {
            busy: true,
            progress: Some("Starting terminal..."),
            ..PanelView::default()
        };

        let lines = render_lines(&view);
        assert!(lines.contains(&"Starting terminal...".to_string()));
        assert_eq!(lines.last().unwrap(), "[q] quit");
    }
}
