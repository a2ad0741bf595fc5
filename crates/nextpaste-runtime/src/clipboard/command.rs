//! Clipboard access through platform command-line tools.

use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use nextpaste_core::{
    ClipboardBackend, ClipboardError, ClipboardKind, DEFAULT_IMAGE_MIME, DEFAULT_TEXT_MIME,
};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable set inside a Wayland session.
const WAYLAND_DISPLAY_ENV: &str = "WAYLAND_DISPLAY";

/// A set of clipboard tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    /// macOS `pbpaste`/`pbcopy` (text only).
    Pbpaste,
    /// Wayland `wl-paste`/`wl-copy`.
    WlClipboard,
    /// X11 `xclip`.
    Xclip,
}

impl ClipboardTool {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pbpaste => "pbpaste",
            Self::WlClipboard => "wl-clipboard",
            Self::Xclip => "xclip",
        }
    }

    /// Binaries that must be on `PATH` for this tool set.
    const fn binaries(self) -> &'static [&'static str] {
        match self {
            Self::Pbpaste => &["pbpaste", "pbcopy"],
            Self::WlClipboard => &["wl-paste", "wl-copy"],
            Self::Xclip => &["xclip"],
        }
    }

    pub const fn supports(self, kind: ClipboardKind) -> bool {
        !matches!((self, kind), (Self::Pbpaste, ClipboardKind::Image))
    }

    fn is_installed(self) -> bool {
        self.binaries().iter().all(|bin| which::which(bin).is_ok())
    }

    /// Program and arguments that print the clipboard to stdout.
    fn read_command(self, kind: ClipboardKind) -> (&'static str, Vec<&'static str>) {
        match (self, kind) {
            (Self::Pbpaste, _) => ("pbpaste", vec![]),
            // Without a type wl-paste falls back to any offered type, images included.
            (Self::WlClipboard, ClipboardKind::Text) => {
                ("wl-paste", vec!["--no-newline", "--type", DEFAULT_TEXT_MIME])
            }
            (Self::WlClipboard, ClipboardKind::Image) => {
                ("wl-paste", vec!["--type", DEFAULT_IMAGE_MIME])
            }
            (Self::Xclip, ClipboardKind::Text) => ("xclip", vec!["-selection", "clipboard", "-o"]),
            (Self::Xclip, ClipboardKind::Image) => (
                "xclip",
                vec!["-selection", "clipboard", "-t", DEFAULT_IMAGE_MIME, "-o"],
            ),
        }
    }

    /// Program and arguments that take new clipboard contents on stdin.
    fn write_command(self, kind: ClipboardKind) -> (&'static str, Vec<&'static str>) {
        match (self, kind) {
            (Self::Pbpaste, _) => ("pbcopy", vec![]),
            (Self::WlClipboard, ClipboardKind::Text) => ("wl-copy", vec![]),
            (Self::WlClipboard, ClipboardKind::Image) => {
                ("wl-copy", vec!["--type", DEFAULT_IMAGE_MIME])
            }
            (Self::Xclip, ClipboardKind::Text) => ("xclip", vec!["-selection", "clipboard"]),
            (Self::Xclip, ClipboardKind::Image) => (
                "xclip",
                vec!["-selection", "clipboard", "-t", DEFAULT_IMAGE_MIME],
            ),
        }
    }
}

/// Clipboard backend that shells out to [`ClipboardTool`] binaries.
#[derive(Debug, Clone, Copy)]
pub struct CommandClipboard {
    tool: ClipboardTool,
}

impl CommandClipboard {
    pub const fn new(tool: ClipboardTool) -> Self {
        Self { tool }
    }

    /// Pick the first tool set installed on this host.
    ///
    /// Wayland sessions prefer `wl-clipboard` over `xclip`.
    pub fn detect() -> Result<Self, ClipboardError> {
        let wayland = std::env::var_os(WAYLAND_DISPLAY_ENV).is_some_and(|v| !v.is_empty());
        let candidates: &[ClipboardTool] = if cfg!(target_os = "macos") {
            &[ClipboardTool::Pbpaste]
        } else if wayland {
            &[ClipboardTool::WlClipboard, ClipboardTool::Xclip]
        } else {
            &[ClipboardTool::Xclip, ClipboardTool::WlClipboard]
        };

        candidates
            .iter()
            .copied()
            .find(|tool| tool.is_installed())
            .map(Self::new)
            .ok_or_else(|| {
                let names: Vec<_> = candidates.iter().map(|t| t.name()).collect();
                ClipboardError::Unavailable(format!("none of {} found on PATH", names.join(", ")))
            })
    }

    pub const fn tool(&self) -> ClipboardTool {
        self.tool
    }

    fn check_supported(&self, kind: ClipboardKind) -> Result<(), ClipboardError> {
        if self.tool.supports(kind) {
            Ok(())
        } else {
            Err(ClipboardError::Unsupported {
                backend: self.tool.name(),
                kind,
            })
        }
    }
}

#[async_trait]
impl ClipboardBackend for CommandClipboard {
    async fn read(&self, kind: ClipboardKind) -> Result<Option<Bytes>, ClipboardError> {
        self.check_supported(kind)?;
        let (program, args) = self.tool.read_command(kind);

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| ClipboardError::Read(format!("{program}: {e}")))?;

        // The tools exit non-zero when the clipboard holds nothing of this type.
        if !output.status.success() {
            debug!(program, status = %output.status, "clipboard read returned no data");
            return Ok(None);
        }
        if output.stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(Bytes::from(output.stdout)))
    }

    async fn write(&self, kind: ClipboardKind, data: &[u8]) -> Result<(), ClipboardError> {
        self.check_supported(kind)?;
        let (program, args) = self.tool.write_command(kind);

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Write(format!("{program}: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClipboardError::Write(format!("{program}: stdin unavailable")))?;
        stdin
            .write_all(data)
            .await
            .map_err(|e| ClipboardError::Write(format!("{program}: {e}")))?;
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| ClipboardError::Write(format!("{program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Write(format!("{program} exited with {status}")))
        }
    }

    fn name(&self) -> &'static str {
        self.tool.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbpaste_is_text_only() {
        assert!(ClipboardTool::Pbpaste.supports(ClipboardKind::Text));
        assert!(!ClipboardTool::Pbpaste.supports(ClipboardKind::Image));
        assert!(ClipboardTool::Xclip.supports(ClipboardKind::Image));
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_rejected_before_spawning() {
        let clipboard = CommandClipboard::new(ClipboardTool::Pbpaste);
        let err = clipboard.read(ClipboardKind::Image).await.unwrap_err();
        assert!(matches!(
            err,
            ClipboardError::Unsupported {
                backend: "pbpaste",
                kind: ClipboardKind::Image
            }
        ));
        let err = clipboard.write(ClipboardKind::Image, b"x").await.unwrap_err();
        assert!(matches!(err, ClipboardError::Unsupported { .. }));
    }

    #[test]
    fn test_text_reads_request_plain_text() {
        let (program, args) = ClipboardTool::WlClipboard.read_command(ClipboardKind::Text);
        assert_eq!(program, "wl-paste");
        assert_eq!(args, vec!["--no-newline", "--type", "text/plain"]);

        let (program, args) = ClipboardTool::Xclip.read_command(ClipboardKind::Text);
        assert_eq!(program, "xclip");
        assert!(!args.contains(&"-t"));
    }

    #[test]
    fn test_image_commands_request_png() {
        let (program, args) = ClipboardTool::WlClipboard.read_command(ClipboardKind::Image);
        assert_eq!(program, "wl-paste");
        assert_eq!(args, vec!["--type", "image/png"]);

        let (program, args) = ClipboardTool::Xclip.write_command(ClipboardKind::Image);
        assert_eq!(program, "xclip");
        assert!(args.contains(&"image/png"));
        assert!(!args.contains(&"-o"));
    }
}
