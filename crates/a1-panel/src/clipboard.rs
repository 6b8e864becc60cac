//! Platform clipboard access
//!
//! Text is piped into the first clipboard utility found on `PATH`.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use a1_core::ClipboardError;

/// Destination for copied text
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// A command-line program that reads clipboard contents from stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: String,
    pub args: Vec<String>,
}

impl ClipboardTool {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Tools tried in order on this platform
pub fn platform_tools() -> Vec<ClipboardTool> {
    if cfg!(target_os = "macos") {
        vec![ClipboardTool::new("pbcopy", &[])]
    } else if cfg!(target_os = "windows") {
        vec![ClipboardTool::new("clip", &[])]
    } else {
        vec![
            ClipboardTool::new("wl-copy", &[]),
            ClipboardTool::new("xclip", &["-selection", "clipboard"]),
            ClipboardTool::new("xsel", &["--clipboard", "--input"]),
        ]
    }
}

/// Clipboard backed by the platform's command-line utilities
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    tools: Vec<ClipboardTool>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_tools(platform_tools())
    }

    pub fn with_tools(tools: Vec<ClipboardTool>) -> Self {
        Self { tools }
    }

    fn resolve(&self) -> Result<(PathBuf, &ClipboardTool), ClipboardError> {
        self.tools
            .iter()
            .find_map(|tool| which::which(&tool.program).ok().map(|path| (path, tool)))
            .ok_or_else(|| {
                let tried: Vec<&str> = self.tools.iter().map(|t| t.program.as_str()).collect();
                ClipboardError::Unavailable(tried.join(", "))
            })
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let (path, tool) = self.resolve()?;
        let io_error = |source| ClipboardError::Io {
            tool: tool.program.clone(),
            source,
        };

        tracing::debug!("Copying {} bytes with {:?}", text.len(), path);

        let mut child = Command::new(&path)
            .args(&tool.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(io_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(io_error)?;
            // stdin is closed on drop so the tool sees EOF
        }

        let status = child.wait().await.map_err(io_error)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Failed {
                tool: tool.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_tool_available() {
        let clipboard = SystemClipboard::with_tools(vec![
            ClipboardTool::new("a1-shell-no-such-clipboard", &[]),
            ClipboardTool::new("a1-shell-no-such-clipboard-either", &[]),
        ]);

        match clipboard.copy("text").await {
            Err(ClipboardError::Unavailable(tried)) => {
                assert!(tried.contains("a1-shell-no-such-clipboard-either"));
            }
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pipes_into_tool() {
        let clipboard = SystemClipboard::with_tools(vec![ClipboardTool::new("cat", &[])]);
        clipboard.copy("https://example.test").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool() {
        let clipboard = SystemClipboard::with_tools(vec![ClipboardTool::new("false", &[])]);
        // `false` may exit before reading, so a broken pipe is also acceptable
        assert!(matches!(
            clipboard.copy("x").await,
            Err(ClipboardError::Failed { .. }) | Err(ClipboardError::Io { .. })
        ));
    }
}
