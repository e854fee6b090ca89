//! Incremental log tailing
//!
//! Each monitored log source keeps a watermark: the number of lines already
//! seen. A drain emits only the lines past the watermark and advances it to
//! the new total. Watermarks live in process memory and are scoped to one
//! recording session.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Line-count watermark over one log source.
#[derive(Debug, Default)]
pub struct LogCursor {
    watermark: usize,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watermark(&self) -> usize {
        self.watermark
    }

    /// Drain the lines appended to `path` since the previous drain.
    ///
    /// On the first drain (unset watermark) the current line count is
    /// recorded and an empty excerpt returned: pre-existing log content is
    /// not replayed into the session. Afterwards, every line past the
    /// watermark is passed to `on_line` and appended to the excerpt with a
    /// trailing newline.
    ///
    /// The watermark only advances once the whole scan succeeds; an
    /// `on_line` or read error leaves it untouched, so the aborted tick's
    /// lines reappear in the next successful drain.
    pub fn drain<F>(&mut self, path: &Path, mut on_line: F) -> Result<String>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let file = File::open(path)
            .with_context(|| format!("Failed to open log source: {}", path.display()))?;
        let reader = BufReader::new(file);

        if self.watermark == 0 {
            let mut count = 0;
            for line in reader.lines() {
                line.with_context(|| format!("Failed to read log source: {}", path.display()))?;
                count += 1;
            }
            self.watermark = count;
            return Ok(String::new());
        }

        let mut excerpt = String::new();
        let mut count = 0;
        for line in reader.lines() {
            let line =
                line.with_context(|| format!("Failed to read log source: {}", path.display()))?;
            count += 1;
            if count > self.watermark {
                on_line(&line)?;
                excerpt.push_str(&line);
                excerpt.push('\n');
            }
        }

        // A source that shrank (rotation) emits nothing; the watermark
        // never decreases within a session.
        if count > self.watermark {
            self.watermark = count;
        }

        Ok(excerpt)
    }
}
