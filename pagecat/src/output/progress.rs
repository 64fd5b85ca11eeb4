//! Terminal progress indicator.
//!
//! Drawn on stderr so that stdout stays clean for summaries, and only when
//! stderr is a terminal.
//!
//! # Examples
//!
//! ```
//! use pagecat::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(3, ProgressStyle::Bar);
//! progress.set_message("Exporting");
//! for done in 1..=3 {
//!     progress.update(done);
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// `[=====>    ] 50% 5/10 0.4s`
    Bar,
    /// `5/10 0.4s`
    Counter,
}

/// Progress indicator for the export loop.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_draw: Option<Instant>,
    min_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    const WIDTH: usize = 30;

    /// Create a progress indicator for `total` steps.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_draw: None,
            min_interval: Duration::from_millis(80),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Create an indicator that never draws.
    pub fn disabled() -> Self {
        let mut bar = Self::new(0, ProgressStyle::Counter);
        bar.enabled = false;
        bar
    }

    /// Whether the indicator draws anything.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the label drawn before the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Record progress and redraw, at most every few dozen milliseconds
    /// except for the final step.
    pub fn update(&mut self, current: usize) {
        self.current = current;
        if !self.enabled {
            return;
        }
        let due = self
            .last_draw
            .is_none_or(|t| t.elapsed() >= self.min_interval);
        if due || self.current >= self.total {
            self.last_draw = Some(Instant::now());
            self.draw();
        }
    }

    /// Draw the completed state and end the line.
    pub fn finish(&mut self) {
        if self.enabled {
            self.current = self.total;
            self.draw();
            eprintln!();
        }
    }

    /// Erase the indicator.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            io::stderr().flush().ok();
        }
    }

    /// Completed fraction as a percentage.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64 * 100.0
        }
    }

    /// The line that would be drawn now.
    pub fn line(&self) -> String {
        let elapsed = format!("{:.1}s", self.start_time.elapsed().as_secs_f64());
        let counter = format!("{}/{}", self.current, self.total);

        let mut parts = Vec::with_capacity(5);
        if let Some(msg) = &self.message {
            parts.push(msg.clone());
        }
        if self.style == ProgressStyle::Bar {
            let filled = (Self::WIDTH * self.current / self.total.max(1)).min(Self::WIDTH);
            let bar = match filled {
                0 => " ".repeat(Self::WIDTH),
                n => format!("{}>{}", "=".repeat(n - 1), " ".repeat(Self::WIDTH - n)),
            };
            parts.push(format!("[{bar}]"));
            parts.push(format!("{:.0}%", self.percent()));
        }
        parts.push(counter);
        parts.push(elapsed);
        parts.join(" ")
    }

    fn draw(&self) {
        eprint!("\r\x1b[K{}", self.line());
        io::stderr().flush().ok();
    }
}
