//! a1-shell: Command-line control panel for A1 Shell
//!
//! Provides the `a1-shell` binary for checking, starting and stopping the
//! terminal session, plus an interactive panel.

pub mod commands;
pub mod output;
