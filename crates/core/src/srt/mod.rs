//! This module is responsible for SRT parsing and serialization.
//! It exposes helpers to read subtitle files and to append translated
//! blocks to an output stream while preserving index and timing.

use crate::error::SrtError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::trace;

/// A SubRip timestamp kept as its components so it is written back exactly
/// as it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

/// Represents a single SRT block (index, time range, text).
/// Multi-line text is joined with `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtBlock {
    pub index: u32,
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

/// Text encodings accepted for input files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "Latin-1",
        }
    }

    /// Decode raw file bytes. Latin-1 maps every byte, so only UTF-8 can fail.
    fn decode(self, bytes: Vec<u8>) -> Option<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).ok(),
            Encoding::Latin1 => Some(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Read and parse the subtitle file at `path`.
pub fn read(path: &Path, encoding: Encoding) -> Result<Vec<SrtBlock>, SrtError> {
    trace!("read path={} encoding={:?}", path.display(), encoding);
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SrtError::NotFound(path.to_path_buf())
        } else {
            SrtError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let text = encoding.decode(bytes).ok_or_else(|| SrtError::Encoding {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })?;
    parse(&text)
}

/// Parse SRT text into a list of blocks.
/// This function reads indices, times and text lines preserving order.
pub fn parse(input: &str) -> Result<Vec<SrtBlock>, SrtError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut blocks = Vec::new();
    let mut lines = input.lines().enumerate().map(|(i, l)| (i + 1, l));
    loop {
        let (line_no, index_line) = match lines.next() {
            Some((_, l)) if l.trim().is_empty() => continue,
            Some((n, l)) => (n, l.trim()),
            None => break,
        };
        let index: u32 = index_line
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid index {index_line:?}")))?;
        let (time_no, time_line) = lines
            .next()
            .ok_or_else(|| parse_error(line_no + 1, "missing time range".to_string()))?;
        let (start, end) = parse_times(time_line).map_err(|m| parse_error(time_no, m))?;
        let mut text = Vec::new();
        for (_, line) in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
            text.push(line);
        }
        blocks.push(SrtBlock {
            index,
            start,
            end,
            text: text.join("\n"),
        });
    }
    trace!("parsed {} blocks", blocks.len());
    Ok(blocks)
}

/// Render one block as its four-line SubRip layout.
pub fn format_block(block: &SrtBlock) -> String {
    format!(
        "{}\n{} --> {}\n{}\n\n",
        block.index, block.start, block.end, block.text
    )
}

/// Format SRT blocks back to text.
pub fn format(blocks: &[SrtBlock]) -> String {
    blocks.iter().map(format_block).collect()
}

/// Append a block to `out` and flush it, so entries written so far stay
/// complete if a later entry fails or the process is interrupted.
pub fn write_block<W: Write>(out: &mut W, block: &SrtBlock) -> io::Result<()> {
    out.write_all(format_block(block).as_bytes())?;
    out.flush()
}

fn parse_error(line: usize, message: String) -> SrtError {
    SrtError::Parse { line, message }
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000`.
/// Anything after the end time (player position hints) is ignored.
fn parse_times(line: &str) -> Result<(Timestamp, Timestamp), String> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| format!("invalid time range {line:?}"))?;
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("missing end time in {line:?}"))?;
    Ok((parse_time(start.trim())?, parse_time(end)?))
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`).
fn parse_time(t: &str) -> Result<Timestamp, String> {
    let parts: Vec<&str> = t.split([':', ',', '.']).collect();
    if parts.len() != 4 {
        return Err(format!("invalid timestamp {t:?}"));
    }
    let field = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| format!("invalid timestamp {t:?}"))
    };
    Ok(Timestamp {
        hours: field(parts[0])?,
        minutes: field(parts[1])?,
        seconds: field(parts[2])?,
        millis: field(parts[3])?,
    })
}
