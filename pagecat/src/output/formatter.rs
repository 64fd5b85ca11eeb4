//! User-facing messages.
//!
//! Informational output goes to stdout; warnings and errors go to stderr so
//! they survive `> file` redirection. Quiet mode keeps only the latter.
//!
//! # Examples
//!
//! ```
//! use pagecat::output::formatter::OutputFormatter;
//!
//! let out = OutputFormatter::plain(false, false);
//! out.info("Queued 3 pages");
//! out.warning("scan.tiff: unsupported file type");
//! ```

use std::io::{self, IsTerminal};

use crate::config::Config;

/// Kind of message, which picks its prefix, colour and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Plain status line.
    Info,
    /// Completed operation.
    Success,
    /// Recoverable problem.
    Warning,
    /// Failed operation.
    Error,
    /// Only shown with `--verbose`.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Error => Some("\x1b[31m"),
            Self::Debug => Some("\x1b[36m"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Prints messages according to the quiet/verbose settings.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Formatter with colour when stdout is a terminal and `NO_COLOR` is unset.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        let colored = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            quiet,
            verbose,
            colored,
        }
    }

    /// Formatter that never emits escape codes.
    pub fn plain(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: false,
        }
    }

    /// Formatter for a run configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Whether quiet mode is on.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether `level` is printed at the current verbosity.
    pub fn shows(&self, level: MessageLevel) -> bool {
        match level {
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Debug => self.verbose && !self.quiet,
            MessageLevel::Info | MessageLevel::Success => !self.quiet,
        }
    }

    /// The text printed for `message` at `level`.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        match level.color() {
            Some(color) if self.colored => format!("{color}{prefix}{message}\x1b[0m"),
            _ => format!("{prefix}{message}"),
        }
    }

    /// Print `message` at `level` if the verbosity allows it.
    pub fn emit(&self, level: MessageLevel, message: &str) {
        if !self.shows(level) {
            return;
        }
        let line = self.render(level, message);
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Print an informational line.
    pub fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }

    /// Print a success line.
    pub fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    /// Print a warning, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    /// Print an error, even in quiet mode.
    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    /// Print a verbose-only line.
    pub fn debug(&self, message: &str) {
        self.emit(MessageLevel::Debug, message);
    }

    /// Print an indented `label: value` pair in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.shows(MessageLevel::Debug) {
            println!("  {label}: {value}");
        }
    }

    /// Print a blank line followed by `title`.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a numbered list entry.
    pub fn list_item(&self, number: usize, text: &str) {
        if !self.quiet {
            println!("{number:>4}. {text}");
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
