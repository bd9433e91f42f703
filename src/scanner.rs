//! Line-aligned scanning of one byte range.
//!
//! Range boundaries are arbitrary byte offsets and usually fall inside a line. A
//! scan over `[start, end)` owns exactly the lines whose first byte lies in
//! `[start, end)`:
//! - when `start != 0` the line containing byte `start - 1` belongs to the previous
//!   range, so it is read and discarded first;
//! - the last owned line is read to its newline even when that lies past `end`;
//! - a line starting at or after `end` stops the scan.
//!
//! Adjacent ranges therefore never count a line twice and never drop one.
//!
//! At most `Config::max_line` bytes of a line are buffered. The rest of a longer line
//! is consumed without being stored and the line is skipped as malformed.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hyperloglog::HyperLogLog;
use crate::ipv4::parse_ipv4_bytes;
use crate::partition::ByteRange;
use crate::progress::ProgressCounter;

use tracing::debug;

/// Partial result of one worker.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Sketch of all valid addresses in the range
    pub sketch: HyperLogLog,
    /// Number of lines holding a valid address
    pub lines: u64,
}

/// Open `path` and scan `range` of it.
pub fn scan_file(
    path: &Path,
    range: ByteRange,
    config: &Config,
    progress: &ProgressCounter,
) -> Result<ChunkResult> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    scan_range(file, range, config, progress)
}

/// Scan `range` of `source` into a fresh sketch of `config.precision`.
///
/// Accepted lines are published to `progress` every `config.progress_batch` lines,
/// and the remainder once the range is done.
pub fn scan_range<R: Read + Seek>(
    mut source: R,
    range: ByteRange,
    config: &Config,
    progress: &ProgressCounter,
) -> Result<ChunkResult> {
    let mut sketch = HyperLogLog::new(config.precision)?;
    let batch = config.progress_batch.max(1);

    let mut cursor = range.start.saturating_sub(1);
    source.seek(SeekFrom::Start(cursor))?;
    let mut reader = BufReader::with_capacity(config.read_buffer.max(1), source);
    let mut line = Vec::with_capacity(64);

    if range.start != 0 {
        cursor += read_line_bounded(&mut reader, &mut line, 0)?.0;
    }

    let mut lines = 0u64;
    while cursor < range.end {
        line.clear();
        let (read, truncated) = read_line_bounded(&mut reader, &mut line, config.max_line)?;
        if read == 0 {
            break;
        }
        if truncated {
            debug!(offset = cursor, len = read, "skipping overlong line");
        }
        cursor += read;
        if truncated {
            continue;
        }

        let Some(addr) = parse_ipv4_bytes(trim_line(&line)) else {
            continue;
        };
        sketch.add(addr);
        lines += 1;
        if lines % batch == 0 {
            progress.add(batch);
        }
    }
    progress.add(lines % batch);

    Ok(ChunkResult { sketch, lines })
}

/// Consume `reader` through the next newline, appending at most `limit` bytes of the
/// line to `line`. Returns the number of bytes consumed and whether any were dropped.
fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    line: &mut Vec<u8>,
    limit: usize,
) -> io::Result<(u64, bool)> {
    let mut consumed = 0u64;
    let mut truncated = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok((consumed, truncated));
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(newline) => (newline + 1, true),
            None => (available.len(), false),
        };
        let room = limit.saturating_sub(line.len());
        if used > room {
            truncated = true;
        }
        line.extend_from_slice(&available[..used.min(room)]);
        reader.consume(used);
        consumed += used as u64;
        if done {
            return Ok((consumed, truncated));
        }
    }
}

/// Strip surrounding whitespace, including Unicode spaces such as U+00A0.
fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.trim_ascii();
    let non_ascii_edge = |b: Option<&u8>| b.is_some_and(|b| !b.is_ascii());
    if !non_ascii_edge(line.first()) && !non_ascii_edge(line.last()) {
        return line;
    }
    match std::str::from_utf8(line) {
        Ok(text) => text.trim().as_bytes(),
        Err(_) => line,
    }
}
