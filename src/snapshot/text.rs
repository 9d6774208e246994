//! Line-oriented text snapshots
//!
//! Each entry is written as `key:value\n`. Reading splits on the first
//! delimiter, so a value may contain `:` but a key may not.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::Result;

/// Separator between key and value
pub const DELIMITER: char = ':';

pub(super) fn encode<W, K, V, I>(writer: &mut W, entries: I) -> Result<usize>
where
    W: Write,
    K: Display,
    V: Display,
    I: IntoIterator<Item = (K, V)>,
{
    let mut written = 0;
    let mut ambiguous = 0;

    for (key, value) in entries {
        let key = key.to_string();
        let value = value.to_string();

        if key.contains(DELIMITER) || key.contains('\n') || value.contains('\n') {
            ambiguous += 1;
        }

        writeln!(writer, "{}{}{}", key, DELIMITER, value)?;
        written += 1;
    }

    if ambiguous > 0 {
        tracing::warn!(
            "{} of {} entries contain '{}' in the key or a newline and will not reload intact",
            ambiguous,
            written,
            DELIMITER
        );
    }

    Ok(written)
}

/// Parse one snapshot line into a key/value pair
///
/// Returns `None` if the line has no delimiter or either half fails to
/// parse. A trailing `\r` is ignored.
pub fn parse_line<K: FromStr, V: FromStr>(line: &str) -> Option<(K, V)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (key, value) = line.split_once(DELIMITER)?;
    Some((key.parse().ok()?, value.parse().ok()?))
}

/// Returns `(loaded, skipped)`
///
/// Lines that are not UTF-8 count as skipped, like any other malformed line.
pub(super) fn decode<R, K, V, F>(mut reader: R, mut sink: F) -> Result<(usize, usize)>
where
    R: BufRead,
    K: FromStr,
    V: FromStr,
    F: FnMut(K, V),
{
    let mut loaded = 0;
    let mut skipped = 0;
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let entry = std::str::from_utf8(raw).ok().and_then(parse_line);
        match entry {
            Some((key, value)) => {
                sink(key, value);
                loaded += 1;
            }
            None => {
                tracing::debug!("Skipping malformed snapshot line {}", line_no);
                skipped += 1;
            }
        }
    }

    Ok((loaded, skipped))
}
