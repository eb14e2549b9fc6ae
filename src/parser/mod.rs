// FlowScope: Reconstruction of Per-Flow Behavior from Network Simulator Traces
// Copyright (C) 2025 The FlowScope Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Parsers for the line-based trace files written by the simulator.
//!
//! Every trace kind is a newline-delimited text file with whitespace-separated fields. Parsing is
//! tolerant: trailing fields are ignored, and lines that are too short or hold an unparseable
//! number are skipped without aborting the stream.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader, ErrorKind},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::records::LogRecord;

pub mod congestion;
pub mod message;
pub mod switch;
pub mod throughput;

pub use congestion::CongestionLogParser;
pub use message::MessageTraceParser;
pub use switch::{QueueLogParser, TokenLogParser};
pub use throughput::ThroughputLogParser;

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Source unavailable: {0:?}")]
    SourceUnavailable(PathBuf),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

/// Line statistics of a parsed trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Number of non-empty lines
    pub lines: usize,
    /// Number of lines turned into a record
    pub parsed: usize,
    /// Number of malformed lines that were skipped
    pub skipped: usize,
}

/// Records of a trace together with the statistics of the parsing run.
#[derive(Debug, Clone)]
pub struct Parsed<R> {
    pub records: Vec<R>,
    pub stats: ParseStats,
}

pub trait TraceParser {
    type Record: LogRecord;

    /// Return a description of the trace kind.
    fn description() -> &'static str;

    /// Minimum number of fields a line must have.
    fn min_fields() -> usize;

    /// Turn the fields of a single line into a record. The slice has at least `min_fields()`
    /// elements. Return `None` if the line is malformed.
    fn parse_fields(fields: &[&str]) -> Option<Self::Record>;

    /// Parse a single line.
    fn parse_line(line: &str) -> Option<Self::Record> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < Self::min_fields() {
            return None;
        }
        Self::parse_fields(&fields)
    }

    /// Parse a sequence of lines. `None` stands for a line that could not be decoded and counts
    /// as malformed. Blank lines are ignored.
    fn parse_lines<'a>(
        lines: impl Iterator<Item = Option<Cow<'a, str>>>,
    ) -> Parsed<Self::Record> {
        let mut records = Vec::new();
        let mut stats = ParseStats::default();

        for line in lines {
            let Some(line) = line else {
                log::trace!("[{}] skipping line with invalid UTF-8", Self::description());
                stats.lines += 1;
                stats.skipped += 1;
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;
            match Self::parse_line(&line) {
                Some(record) => {
                    stats.parsed += 1;
                    records.push(record);
                }
                None => {
                    log::trace!("[{}] skipping malformed line {line:?}", Self::description());
                    stats.skipped += 1;
                }
            }
        }

        Parsed { records, stats }
    }

    /// Parse all lines from a reader. Lines that are not valid UTF-8 count as malformed.
    fn parse_reader<B: BufRead>(reader: B) -> Result<Parsed<Self::Record>, ParserError> {
        let mut error = None;
        let lines = reader.split(b'\n').map_while(|line| match line {
            Ok(line) => Some(String::from_utf8(line).ok().map(Cow::Owned)),
            Err(e) => {
                error = Some(e);
                None
            }
        });
        let parsed = Self::parse_lines(lines);
        match error {
            Some(e) => Err(e.into()),
            None => Ok(parsed),
        }
    }

    /// Parse an in-memory trace.
    fn parse_str(text: &str) -> Parsed<Self::Record> {
        Self::parse_lines(text.lines().map(|line| Some(Cow::Borrowed(line))))
    }

    /// Read and parse a trace file. A missing file yields [`ParserError::SourceUnavailable`].
    fn read_file(path: impl AsRef<Path>) -> Result<Parsed<Self::Record>, ParserError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ParserError::SourceUnavailable(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let parsed = Self::parse_reader(BufReader::new(file))?;

        log::info!(
            "Read {} {} records from {path:?} ({} malformed lines skipped)",
            parsed.stats.parsed,
            Self::description(),
            parsed.stats.skipped,
        );
        if parsed.stats.skipped > 0 && parsed.stats.parsed == 0 {
            log::warn!(
                "[{}] none of the {} lines in {path:?} could be parsed",
                Self::description(),
                parsed.stats.lines
            );
        }

        Ok(parsed)
    }
}

pub fn parse_num<T: FromStr>(num: impl AsRef<str>) -> Option<T> {
    T::from_str(num.as_ref()).ok()
}

#[cfg(test)]
#[track_caller]
/// Test whether a given line parses into the expected record (or is rejected if `exp` is `None`).
pub(crate) fn test_line<P>(line: &str, exp: Option<P::Record>)
where
    P: TraceParser,
    P::Record: std::fmt::Debug + PartialEq,
{
    match (P::parse_line(line), exp) {
        (Some(got), Some(want)) => assert_eq!(got, want, "Unexpected record for {line:?}"),
        (None, None) => {}
        (Some(got), None) => panic!("Line {line:?} should be rejected but parsed as {got:?}"),
        (None, Some(want)) => panic!("Line {line:?} did not parse. Expected {want:?}"),
    }
}
