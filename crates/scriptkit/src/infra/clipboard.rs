//! Copying rendered prompts to the system clipboard.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

/// Which mechanism ended up holding the copied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    System,
    Command(&'static str),
}

impl fmt::Display for ClipboardBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardBackend::System => f.write_str("system clipboard"),
            ClipboardBackend::Command(program) => write!(f, "{program}"),
        }
    }
}

/// Copy `text` to the clipboard, trying arboard first and then platform helper programs.
pub fn copy_to_clipboard(text: &str) -> Result<ClipboardBackend> {
    if let Ok(mut clipboard) = arboard::Clipboard::new()
        && clipboard.set_text(text.to_owned()).is_ok()
    {
        return Ok(ClipboardBackend::System);
    }

    for command in helper_commands() {
        match pipe_into(command, text) {
            Ok(()) => return Ok(ClipboardBackend::Command(command[0])),
            Err(err) => tracing::debug!(program = command[0], error = %err, "clipboard helper failed"),
        }
    }

    bail!("no clipboard backend available")
}

fn pipe_into(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write to {program}"))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("{program} did not exit cleanly"))?;
    if !status.success() {
        bail!("{program} exited with status {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn helper_commands() -> &'static [&'static [&'static str]] {
    &[&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn helper_commands() -> &'static [&'static [&'static str]] {
    &[&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "--clipboard", "--input"]]
}

#[cfg(target_os = "windows")]
fn helper_commands() -> &'static [&'static [&'static str]] {
    &[&["clip.exe"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn helper_commands() -> &'static [&'static [&'static str]] {
    &[]
}
