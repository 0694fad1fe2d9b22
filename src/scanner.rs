//src/scanner.rs

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::{Result, ScanError};

/// Field separator for tabular members.
pub const FIELD_DELIMITER: u8 = b'\t';

/// Longest field value kept for numeric parsing. Longer values are
/// reported as not numeric.
pub const MAX_FIELD_BYTES: usize = 1024;

/// Bytes needed to decode any single UTF-8 character.
const MAX_CHAR_BYTES: usize = 4;

/// Streams a member file and answers structural questions about it.
///
/// Every query is a fresh single pass: the file is opened, walked through
/// the `BufReader` buffer chunk by chunk, and closed when the query
/// returns (on success or error). No line is ever held in full, so memory
/// stays bounded by the reader buffer even for newline-free uploads.
/// Lines and columns are 1-indexed. Files ending in `.gz` are
/// decompressed on the fly.
#[derive(Debug, Clone)]
pub struct RowScanner {
    path: PathBuf,
}

impl RowScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<LineCursor<'_, Box<dyn BufRead>>> {
        let f = File::open(&self.path).map_err(|e| ScanError::io(&self.path, e))?;

        let is_gz = self
            .path
            .extension()
            .map(|ext| ext == "gz")
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(f)))
        } else {
            Box::new(BufReader::new(f))
        };
        Ok(LineCursor::new(reader, &self.path))
    }

    /// Number of tab-separated fields on one line, or `None` past EOF.
    pub fn field_count(&self, line_index: usize) -> Result<Option<usize>> {
        self.open()?.field_count(line_index)
    }

    /// First character of one line. `None` past EOF or for an empty line.
    pub fn first_char(&self, line_index: usize) -> Result<Option<char>> {
        self.open()?.first_char(line_index)
    }

    /// Whether every byte of one line satisfies `accept`. `None` past EOF.
    pub fn line_all<F: FnMut(u8) -> bool>(
        &self,
        line_index: usize,
        accept: F,
    ) -> Result<Option<bool>> {
        self.open()?.line_all(line_index, accept)
    }

    /// Sum of one column across every line.
    ///
    /// Lines too short to have the column contribute nothing. A present
    /// value that does not parse as a number fails the whole scan.
    pub fn column_sum(&self, column_index: usize) -> Result<f64> {
        self.open()?.column_sum(column_index)
    }

    /// Line numbers, in file order, whose field count is not `expected`.
    pub fn malformed_line_numbers(&self, expected: usize) -> Result<Vec<usize>> {
        self.open()?.malformed_line_numbers(expected)
    }
}

/// Facts about the current line, gathered while its bytes stream past.
struct LineFacts {
    column: Option<usize>,
    tabs: usize,
    field: Vec<u8>,
    truncated: bool,
}

impl LineFacts {
    fn new(column: Option<usize>) -> Self {
        Self {
            column,
            tabs: 0,
            field: Vec::new(),
            truncated: false,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b == FIELD_DELIMITER {
                self.tabs += 1;
            } else if self.column == Some(self.tabs + 1) {
                if self.field.len() < MAX_FIELD_BYTES {
                    self.field.push(b);
                } else {
                    self.truncated = true;
                }
            }
        }
    }

    fn field_count(&self) -> usize {
        self.tabs + 1
    }

    /// Tracked column value, `None` when the line is too short to have it.
    fn field(&self) -> Option<Cow<'_, str>> {
        match self.column {
            Some(col) if col <= self.field_count() => Some(String::from_utf8_lossy(&self.field)),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.tabs = 0;
        self.field.clear();
        self.truncated = false;
    }
}

/// Line-oriented walk over any buffered reader.
///
/// Work happens directly on the slices returned by `fill_buf`; a line is
/// seen as a sequence of chunks, never as one allocation. A trailing `\r`
/// before `\n` (or before EOF) belongs to the terminator.
pub(crate) struct LineCursor<'a, R> {
    reader: R,
    path: &'a Path,
}

impl<'a, R: BufRead> LineCursor<'a, R> {
    pub(crate) fn new(reader: R, path: &'a Path) -> Self {
        Self { reader, path }
    }

    fn fill(&mut self) -> Result<&[u8]> {
        let path = self.path;
        self.reader.fill_buf().map_err(|e| ScanError::io(path, e))
    }

    /// Skip `n` lines. False if EOF came first.
    fn skip_lines(&mut self, n: usize) -> Result<bool> {
        for _ in 0..n {
            loop {
                let (consumed, ended) = {
                    let chunk = self.fill()?;
                    if chunk.is_empty() {
                        return Ok(false);
                    }
                    match chunk.iter().position(|&b| b == b'\n') {
                        Some(pos) => (pos + 1, true),
                        None => (chunk.len(), false),
                    }
                };
                self.reader.consume(consumed);
                if ended {
                    break;
                }
            }
        }
        Ok(true)
    }

    /// Stream the chunks of one line (without `\n`) through `visit`.
    ///
    /// Returns `None` past EOF, `Some(Continue)` once the whole line was
    /// seen, `Some(Break)` if `visit` stopped early.
    fn visit_line<F>(&mut self, line_index: usize, mut visit: F) -> Result<Option<ControlFlow<()>>>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>,
    {
        if line_index == 0 || !self.skip_lines(line_index - 1)? {
            return Ok(None);
        }

        let mut started = false;
        loop {
            let (consumed, ended, flow) = {
                let chunk = self.fill()?;
                if chunk.is_empty() {
                    return Ok(started.then_some(ControlFlow::Continue(())));
                }
                let (body, consumed, ended) = match chunk.iter().position(|&b| b == b'\n') {
                    Some(pos) => (&chunk[..pos], pos + 1, true),
                    None => (chunk, chunk.len(), false),
                };
                (consumed, ended, visit(body))
            };
            started = true;
            self.reader.consume(consumed);

            if flow.is_break() {
                return Ok(Some(flow));
            }
            if ended {
                return Ok(Some(ControlFlow::Continue(())));
            }
        }
    }

    /// Feed every line to `visit` with the facts gathered for it, tracking
    /// the value of `column` if one is given.
    fn for_each_line<F>(&mut self, column: Option<usize>, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &LineFacts) -> Result<ControlFlow<()>>,
    {
        let mut facts = LineFacts::new(column);
        let mut line_no = 0usize;
        let mut open_line = false;

        loop {
            let (consumed, ended) = {
                let chunk = self.fill()?;
                if chunk.is_empty() {
                    break; // EOF
                }
                match chunk.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        facts.feed(&chunk[..pos]);
                        (pos + 1, true)
                    }
                    None => {
                        facts.feed(chunk);
                        (chunk.len(), false)
                    }
                }
            };
            self.reader.consume(consumed);

            if !ended {
                open_line = true;
                continue;
            }
            open_line = false;
            line_no += 1;
            if visit(line_no, &facts)?.is_break() {
                return Ok(());
            }
            facts.clear();
        }

        if open_line {
            visit(line_no + 1, &facts)?;
        }
        Ok(())
    }

    pub(crate) fn field_count(mut self, line_index: usize) -> Result<Option<usize>> {
        let mut facts = LineFacts::new(None);
        let seen = self.visit_line(line_index, |body| {
            facts.feed(body);
            ControlFlow::Continue(())
        })?;
        Ok(seen.map(|_| facts.field_count()))
    }

    pub(crate) fn first_char(mut self, line_index: usize) -> Result<Option<char>> {
        let mut prefix: Vec<u8> = Vec::with_capacity(MAX_CHAR_BYTES);
        let seen = self.visit_line(line_index, |body| {
            let take = (MAX_CHAR_BYTES - prefix.len()).min(body.len());
            prefix.extend_from_slice(&body[..take]);
            if prefix.len() == MAX_CHAR_BYTES {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

        match seen {
            None => Ok(None),
            // A lone `\r` is the terminator of an empty line.
            Some(ControlFlow::Continue(())) if prefix == b"\r" => Ok(None),
            Some(_) => Ok(String::from_utf8_lossy(&prefix).chars().next()),
        }
    }

    pub(crate) fn line_all<F: FnMut(u8) -> bool>(
        mut self,
        line_index: usize,
        mut accept: F,
    ) -> Result<Option<bool>> {
        let mut ok = true;
        let mut pending_cr = false;
        let seen = self.visit_line(line_index, |body| {
            for &b in body {
                if pending_cr {
                    pending_cr = false;
                    if !accept(b'\r') {
                        ok = false;
                        return ControlFlow::Break(());
                    }
                }
                if b == b'\r' {
                    pending_cr = true;
                } else if !accept(b) {
                    ok = false;
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })?;
        Ok(seen.map(|_| ok))
    }

    pub(crate) fn column_sum(mut self, column_index: usize) -> Result<f64> {
        let mut sum = 0.0f64;
        if column_index == 0 {
            return Ok(sum);
        }
        self.for_each_line(Some(column_index), |no, facts| {
            if let Some(raw) = facts.field() {
                let value = if facts.truncated { None } else { parse_number(&raw) };
                sum += value.ok_or_else(|| ScanError::NotNumeric {
                    line: no,
                    column: column_index,
                    value: display_value(&raw, facts.truncated),
                })?;
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(sum)
    }

    pub(crate) fn malformed_line_numbers(mut self, expected: usize) -> Result<Vec<usize>> {
        let mut malformed = Vec::new();
        self.for_each_line(None, |no, facts| {
            if facts.field_count() != expected {
                malformed.push(no);
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(malformed)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn display_value(raw: &str, truncated: bool) -> String {
    let value = raw.trim_end_matches('\r');
    if truncated {
        format!("{value}...")
    } else {
        value.to_string()
    }
}
