//=========================================================================
// Log Box
//=========================================================================
//
// Rolling on-screen log. Keeps the newest `capacity` lines and mirrors
// every line to the `session` log target.
//
//=========================================================================

use std::collections::VecDeque;

use log::info;

/// Fixed-size, append-only line buffer backing the UI log text.
#[derive(Debug, Clone)]
pub struct LogBox {
    lines: VecDeque<String>,
    capacity: usize,
    written: usize,
}

impl LogBox {
    /// # Panics
    /// If `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "log capacity must be > 0");
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            written: 0,
        }
    }

    /// Appends a line, dropping the oldest once full.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "session", "{}", line);

        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.written += 1;
    }

    /// Lines pushed since creation, including ones already dropped.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Lines pushed after the first `seen`, as far as they are still held.
    pub fn since(&self, seen: usize) -> impl Iterator<Item = &str> {
        let fresh = self.written.saturating_sub(seen).min(self.lines.len());
        self.lines
            .iter()
            .skip(self.lines.len() - fresh)
            .map(String::as_str)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Display text: every line followed by a newline.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
