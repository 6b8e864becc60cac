//! Output formatting for the CLI
//!
//! Session details are rendered as tables; one-line messages get a colored
//! symbol prefix.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};

use a1_core::StatusSnapshot;

#[derive(Tabled)]
struct CredentialRow {
    #[tabled(rename = "FIELD")]
    field: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Format the connection details of a running session as a table
///
/// Returns an empty string for a snapshot that is not running.
pub fn format_credentials(snapshot: &StatusSnapshot) -> String {
    if !snapshot.is_running() {
        return String::new();
    }

    let rows = vec![
        CredentialRow {
            field: "URL",
            value: snapshot.url().to_string(),
        },
        CredentialRow {
            field: "Username",
            value: snapshot.username().to_string(),
        },
        CredentialRow {
            field: "Password",
            value: snapshot.password().to_string(),
        },
        CredentialRow {
            field: "Port",
            value: snapshot
                .port()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
        },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format a status snapshot as a human-readable string
pub fn format_status(snapshot: &StatusSnapshot) -> String {
    let mut output = format!("Terminal Status: {}\n", snapshot.label());
    if snapshot.is_running() {
        output.push_str(&format_credentials(snapshot));
        output.push('\n');
    }
    output
}

fn print_tagged(mut out: impl Write, color: Color, symbol: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(symbol),
        Print(" "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green to stdout
pub fn print_success(msg: &str) {
    print_tagged(std::io::stdout(), Color::Green, "✓", msg);
}

/// Print an error message in red to stderr
pub fn print_error(msg: &str) {
    print_tagged(std::io::stderr(), Color::Red, "✗", msg);
}

/// Print a warning in yellow to stderr
pub fn print_warning(msg: &str) {
    print_tagged(std::io::stderr(), Color::Yellow, "⚠", msg);
}

/// Print an informational message in cyan to stdout
pub fn print_info(msg: &str) {
    print_tagged(std::io::stdout(), Color::Cyan, "ℹ", msg);
}
