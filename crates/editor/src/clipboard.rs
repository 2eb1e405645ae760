use std::fmt;
use std::io::Write;
use std::process::Command;
use std::process::Stdio;

use anyhow::anyhow;
use anyhow::ensure;
use anyhow::Result;

use crate::options::ClipboardKind;

/// Return the clipboard provided if it is supported
macro_rules! try_clipboard {
    ( $e:ident ) => {
        match $e::new() {
            Ok(x) => {
                log::debug!("Using {} clipboard", stringify!($e));
                return Box::new(x);
            }
            Err(e) => log::debug!("{e}"),
        }
    };
}

/// Text clipboard. Bytes are moved through it as hex text.
pub trait Clipboard: fmt::Debug {
    fn copy(&mut self, text: &str) -> Result<()>;

    /// Returns None if there is nothing to paste
    fn paste(&mut self) -> Result<Option<String>>;
}

pub fn new_clipboard(kind: ClipboardKind) -> Box<dyn Clipboard> {
    match kind {
        ClipboardKind::System => DefaultClipboard::new_default(),
        ClipboardKind::Internal => Box::new(Internal::new()),
    }
}

pub(crate) struct DefaultClipboard;
impl DefaultClipboard {
    pub fn new_default() -> Box<dyn Clipboard> {
        let session = std::env::var("XDG_SESSION_TYPE").ok();

        match session.as_deref() {
            Some("wayland") => {
                try_clipboard!(WaylandClipboard);
            }
            Some("x11") => {
                try_clipboard!(XClip);
                try_clipboard!(XSel);
            }
            _ => {
                try_clipboard!(WaylandClipboard);
                try_clipboard!(XClip);
                try_clipboard!(XSel);
            }
        }

        // Fallback
        Box::new(Internal::new())
    }
}

#[derive(Debug, Default)]
pub struct Internal {
    content: Option<String>,
}

impl Internal {
    pub fn new() -> Internal {
        Internal { content: None }
    }
}

impl Clipboard for Internal {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.content = Some(text.into());
        Ok(())
    }

    fn paste(&mut self) -> Result<Option<String>> {
        Ok(self.content.clone())
    }
}

#[derive(Debug)]
pub struct XClip;

impl XClip {
    pub fn new() -> Result<XClip> {
        ensure!(is_executable("xclip"), "xclip not executable");
        Ok(XClip)
    }
}

impl Clipboard for XClip {
    fn copy(&mut self, text: &str) -> Result<()> {
        pipe_to(Command::new("xclip").args(["-in", "-selection", "clipboard"]), text)
    }

    fn paste(&mut self) -> Result<Option<String>> {
        read_from(Command::new("xclip").args(["-out", "-selection", "clipboard"]))
    }
}

#[derive(Debug)]
pub struct XSel;

impl XSel {
    pub fn new() -> Result<XSel> {
        ensure!(is_executable("xsel"), "xsel not executable");
        Ok(XSel)
    }
}

impl Clipboard for XSel {
    fn copy(&mut self, text: &str) -> Result<()> {
        pipe_to(Command::new("xsel").args(["--input", "--clipboard"]), text)
    }

    fn paste(&mut self) -> Result<Option<String>> {
        read_from(Command::new("xsel").args(["--output", "--clipboard"]))
    }
}

#[derive(Debug)]
pub struct WaylandClipboard;

impl WaylandClipboard {
    pub fn new() -> Result<WaylandClipboard> {
        ensure!(is_executable("wl-copy"), "wl-copy not executable");
        ensure!(is_executable("wl-paste"), "wl-paste not executable");
        Ok(WaylandClipboard)
    }
}

impl Clipboard for WaylandClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        pipe_to(&mut Command::new("wl-copy"), text)
    }

    fn paste(&mut self) -> Result<Option<String>> {
        read_from(Command::new("wl-paste").args(["-n"]))
    }
}

fn pipe_to(cmd: &mut Command, text: &str) -> Result<()> {
    let mut child = cmd.stdin(Stdio::piped()).stdout(Stdio::null()).spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("Failed to open stdin"))?;
    stdin.write_all(text.as_bytes())?;
    drop(stdin);

    let status = child.wait()?;
    ensure!(status.success(), "Clipboard command failed: {status}");
    Ok(())
}

fn read_from(cmd: &mut Command) -> Result<Option<String>> {
    let output = cmd.stdin(Stdio::null()).stdout(Stdio::piped()).output()?;

    // Clipboard tools exit with an error when the clipboard is empty
    if !output.status.success() && output.stdout.is_empty() {
        log::debug!(
            "Clipboard command exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(None);
    }
    ensure!(
        output.status.success(),
        "Clipboard command failed: {}",
        output.status
    );

    let pasted = String::from_utf8(output.stdout)?;
    if pasted.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(pasted))
}

fn is_executable(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn internal() {
        let mut clipboard = new_clipboard(ClipboardKind::Internal);
        assert_eq!(None, clipboard.paste().unwrap());

        clipboard.copy("AB CD").unwrap();
        assert_eq!(Some("AB CD".to_string()), clipboard.paste().unwrap());
        assert_eq!(Some("AB CD".to_string()), clipboard.paste().unwrap());
    }

    #[test]
    fn empty_system_clipboard() {
        let pasted = read_from(Command::new("sh").args(["-c", "exit 1"])).unwrap();
        assert_eq!(None, pasted);

        let pasted = read_from(Command::new("sh").args(["-c", "printf ' \\n'"])).unwrap();
        assert_eq!(None, pasted);
    }

    #[test]
    fn system_clipboard_failure() {
        let result = read_from(Command::new("sh").args(["-c", "printf AB; exit 1"]));
        assert!(result.is_err());

        let result = read_from(&mut Command::new("hexed-no-such-clipboard-tool"));
        assert!(result.is_err());
    }

    #[test]
    fn system_clipboard_content() {
        let pasted = read_from(Command::new("sh").args(["-c", "printf 'AB CD'"])).unwrap();
        assert_eq!(Some("AB CD".to_string()), pasted);
    }
}
