//! Line-based terminal prompts.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use daytrack_core::format::{format_hms, format_time};
use daytrack_core::track::TrackDefaults;
use daytrack_core::{FillAnswer, FillPrompter, Gap, IntervalError};

/// Reads answers line by line from `input`, writing prompts to `output`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Show the numbered tag list and read a tag answer.
    pub fn ask_tag(&mut self, tags: &[String]) -> io::Result<String> {
        if !tags.is_empty() {
            let listing: Vec<String> = tags
                .iter()
                .enumerate()
                .map(|(i, tag)| format!("{}. {}", i + 1, tag))
                .collect();
            writeln!(self.output, "{}", listing.join("  "))?;
        }
        self.ask("tag (number, name or new)? ")
    }

    /// Read start and end for `track`, showing the defaults.
    pub fn ask_track_times(&mut self, defaults: &TrackDefaults) -> io::Result<(String, String)> {
        let start = self.ask(&format!(
            "start time (HHMM) or {}? ",
            format_time(defaults.start)
        ))?;
        let end = self.ask(&format!("end time (HHMM) or {}? ", format_time(defaults.end)))?;
        Ok((start, end))
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> FillPrompter for TerminalPrompter<R, W> {
    fn answer(
        &mut self,
        date: NaiveDate,
        gap: &Gap,
        tags: &[String],
    ) -> daytrack_core::Result<FillAnswer> {
        writeln!(
            self.output,
            "\n{}  [{} - {}], total {}",
            date,
            format_time(gap.start),
            format_time(gap.end),
            format_hms(gap.span())
        )?;
        let tag = self.ask_tag(tags)?;
        let times = self.ask("custom times (HHMM-HHMM, -HHMM, HHMM-) or whole gap? ")?;
        Ok(FillAnswer::new(tag, times))
    }

    fn rejected(&mut self, _gap: &Gap, reason: &IntervalError) {
        // Prompt output is best effort; the next read surfaces a broken terminal.
        let _ = writeln!(self.output, "Not recorded: {}", reason);
    }
}
