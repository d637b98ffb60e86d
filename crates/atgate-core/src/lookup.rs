//! Membership lookup: exact-line search of a user name in a list file.
//!
//! List files hold one user name per line. A line matches only when its
//! bytes, minus one trailing `\n`, equal the name exactly. There is no
//! trimming, no comment syntax, and no wildcard.
//!
//! # Line bound
//!
//! Lines are read through a buffer of [`LINE_BUFFER_LEN`] bytes, one slot of
//! which is reserved, so at most [`MAX_COMPARED_LEN`] bytes of a physical
//! line take part in the comparison. The rest of an overlong line is skipped
//! up to and including its terminator. A name longer than the bound can
//! therefore never match, and a long line whose prefix equals a name does.
//! Existing list files rely on this behaviour, so it is kept as is.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

/// Size of the per-line read buffer, counting the reserved terminator slot.
pub const LINE_BUFFER_LEN: usize = 256;

/// Maximum number of bytes of one physical line that are compared.
pub const MAX_COMPARED_LEN: usize = LINE_BUFFER_LEN - 1;

/// Result of looking up a name in a list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    /// The name appears as a line of the file.
    Found,
    /// The file was read and the name is not one of its lines.
    NotFound,
    /// The file could not be opened.
    Unreadable(io::ErrorKind),
}

impl LookupResult {
    /// Whether the file could be consulted at all.
    pub const fn is_readable(&self) -> bool {
        !matches!(self, LookupResult::Unreadable(_))
    }
}

/// What a scan over a list observed.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// The name matched a line.
    pub found: bool,
    /// Physical lines examined before the scan stopped comparing.
    pub lines: usize,
    /// The input ends with a line that has no terminator.
    pub incomplete_last_line: bool,
    /// A read error that ended the scan early.
    pub interrupted: Option<io::Error>,
}

/// Look up `name` in the list file at `path`.
///
/// Never fails: an unopenable file is reported as [`LookupResult::Unreadable`],
/// a read error after opening ends the scan with whatever was seen so far.
/// A missing terminator on the final line is logged as a warning regardless
/// of the outcome.
pub fn lookup(path: impl AsRef<Path>, name: &str) -> LookupResult {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "list file unreadable");
            return LookupResult::Unreadable(e.kind());
        }
    };

    let report = scan_lines(BufReader::new(file), name);

    if let Some(ref e) = report.interrupted {
        warn!(
            path = %path.display(),
            error = %e,
            lines = report.lines,
            "read error in list file, scan stopped early"
        );
    }
    if report.incomplete_last_line {
        warn!(path = %path.display(), "incomplete last line");
    }

    if report.found {
        LookupResult::Found
    } else {
        LookupResult::NotFound
    }
}

/// Scan `reader` line by line for an exact match of `name`.
///
/// Stops comparing at the first match, then drains the remaining input
/// without comparing so the final-line check still sees how the input ends.
pub fn scan_lines<R: BufRead>(mut reader: R, name: &str) -> ScanReport {
    let mut report = ScanReport::default();
    let mut segment = Vec::with_capacity(LINE_BUFFER_LEN);

    loop {
        segment.clear();
        match read_segment(&mut reader, &mut segment) {
            Ok(0) => return report,
            Ok(_) => {}
            Err(e) => {
                report.interrupted = Some(e);
                return report;
            }
        }
        report.lines += 1;

        if segment.last() == Some(&b'\n') {
            segment.pop();
        } else {
            // Overlong line, or the last line of the input.
            match skip_line(&mut reader) {
                Ok(true) => {}
                Ok(false) => report.incomplete_last_line = true,
                Err(e) => {
                    report.interrupted = Some(e);
                    report.found = segment == name.as_bytes();
                    return report;
                }
            }
        }

        if segment == name.as_bytes() {
            report.found = true;
            break;
        }
    }

    if !report.incomplete_last_line {
        match drain(&mut reader) {
            Ok(Some(last)) if last != b'\n' => report.incomplete_last_line = true,
            Ok(_) => {}
            Err(e) => report.interrupted = Some(e),
        }
    }

    report
}

/// Read at most [`MAX_COMPARED_LEN`] bytes, stopping after a `\n`.
fn read_segment<R: BufRead>(reader: &mut R, out: &mut Vec<u8>) -> io::Result<usize> {
    reader
        .by_ref()
        .take(MAX_COMPARED_LEN as u64)
        .read_until(b'\n', out)
}

/// Discard input through the next `\n`. Returns `false` if input ended first.
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    loop {
        let (terminated, used) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(false);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (true, i + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        if terminated {
            return Ok(true);
        }
    }
}

/// Discard the rest of the input, returning its last byte if there was any.
fn drain<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut last = None;
    loop {
        let used = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            match available.last() {
                Some(&b) => last = Some(b),
                None => return Ok(last),
            }
            available.len()
        };
        reader.consume(used);
    }
}
