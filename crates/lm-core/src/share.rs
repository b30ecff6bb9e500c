//! One-way hand-off of a result's analysis text.
//!
//! Terminals have no share sheet, so sharing means one of: copying to the
//! system clipboard through the OSC 52 escape sequence, exporting to a
//! file, or printing.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use base64::Engine;
use thiserror::Error;

use crate::config::{ShareConfig, ShareMethod};

/// Title attached to shared results.
pub const SHARE_TITLE: &str = "AI恋爱契合度测试结果";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("share failed: {0}")]
    Io(#[from] io::Error),
    #[error("clipboard sharing needs a terminal on stdout")]
    NoTerminal,
}

/// Where a shared result ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Copied,
    Written(PathBuf),
    Printed,
}

impl ShareOutcome {
    /// Confirmation shown to the user.
    pub fn message(&self) -> String {
        match self {
            ShareOutcome::Copied => "结果已复制到剪贴板！".to_string(),
            ShareOutcome::Written(path) => format!("结果已保存到 {}", path.display()),
            ShareOutcome::Printed => String::new(),
        }
    }
}

pub trait ShareTarget {
    fn share(&mut self, title: &str, text: &str) -> Result<ShareOutcome, ShareError>;
}

/// Copies text to the clipboard via `ESC ] 52 ; c ; <base64> BEL`.
pub struct Osc52Clipboard<W: Write> {
    writer: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Build the OSC 52 clipboard sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

impl<W: Write> ShareTarget for Osc52Clipboard<W> {
    fn share(&mut self, _title: &str, text: &str) -> Result<ShareOutcome, ShareError> {
        self.writer.write_all(osc52_sequence(text).as_bytes())?;
        self.writer.flush()?;
        Ok(ShareOutcome::Copied)
    }
}

/// Writes title and text to a file, replacing previous contents.
pub struct FileExport {
    path: PathBuf,
}

impl FileExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ShareTarget for FileExport {
    fn share(&mut self, title: &str, text: &str) -> Result<ShareOutcome, ShareError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{title}\n\n{text}\n"))?;
        Ok(ShareOutcome::Written(self.path.clone()))
    }
}

/// Prints title and text.
pub struct PrintShare<W: Write> {
    writer: W,
}

impl<W: Write> PrintShare<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ShareTarget for PrintShare<W> {
    fn share(&mut self, title: &str, text: &str) -> Result<ShareOutcome, ShareError> {
        writeln!(self.writer, "{title}\n\n{text}")?;
        self.writer.flush()?;
        Ok(ShareOutcome::Printed)
    }
}

/// Pick the share target for the configured method. `stdout_is_tty`
/// decides what `auto` means and whether the clipboard is reachable.
pub fn target_for(
    config: &ShareConfig,
    stdout_is_tty: bool,
) -> Result<Box<dyn ShareTarget>, ShareError> {
    match config.method {
        ShareMethod::Auto if stdout_is_tty => Ok(Box::new(Osc52Clipboard::new(io::stdout()))),
        ShareMethod::Auto | ShareMethod::Print => Ok(Box::new(PrintShare::new(io::stdout()))),
        ShareMethod::Clipboard if stdout_is_tty => {
            Ok(Box::new(Osc52Clipboard::new(io::stdout())))
        }
        ShareMethod::Clipboard => Err(ShareError::NoTerminal),
        ShareMethod::File => Ok(Box::new(FileExport::new(config.resolve_export_path()))),
    }
}
