//! Framed snapshots
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic (4) | Version: u16 (2) | Count: u64 (8)         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entry Block (variable)                                  │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! │   ... repeated for each entry, ascending key order ...  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                        │
//! │   EntryCRC: u32                                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The magic is `0xFF` followed by `SKV`. All integers are little-endian.
//! Keys and values are the UTF-8 text of their `Display` form.

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SkipKvError};

/// Magic bytes identifying a framed snapshot. `0xFF` never occurs in
/// UTF-8, so no text snapshot can start with it.
pub const MAGIC: &[u8; 4] = b"\xffSKV";

/// Current framed format version
pub const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + EntryCount (8) = 14 bytes
pub const HEADER_SIZE: usize = 14;

/// Footer size: EntryCRC (4)
pub const FOOTER_SIZE: usize = 4;

/// Per-entry prefix: KeyLen (4) + ValLen (4)
const ENTRY_PREFIX_SIZE: usize = 8;

pub(super) fn encode<W, K, V, I>(writer: &mut W, entries: I) -> Result<usize>
where
    W: Write,
    K: Display,
    V: Display,
    I: IntoIterator<Item = (K, V)>,
{
    let mut body = BytesMut::new();
    let mut count: u64 = 0;

    for (key, value) in entries {
        let key = key.to_string();
        let value = value.to_string();

        body.put_u32_le(frame_len(&key)?);
        body.put_u32_le(frame_len(&value)?);
        body.put_slice(key.as_bytes());
        body.put_slice(value.as_bytes());
        count += 1;
    }

    let mut header = BytesMut::with_capacity(HEADER_SIZE);
    header.put_slice(MAGIC);
    header.put_u16_le(VERSION);
    header.put_u64_le(count);

    writer.write_all(&header)?;
    writer.write_all(&body)?;
    writer.write_all(&crc32fast::hash(&body).to_le_bytes())?;

    Ok(count as usize)
}

fn frame_len(text: &str) -> Result<u32> {
    u32::try_from(text.len()).map_err(|_| {
        SkipKvError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("snapshot field of {} bytes exceeds u32 length prefix", text.len()),
        ))
    })
}

/// Returns `(loaded, skipped)`
pub(super) fn decode<R, K, V, F>(mut reader: R, mut sink: F) -> Result<(usize, usize)>
where
    R: Read,
    K: FromStr,
    V: FromStr,
    F: FnMut(K, V),
{
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    let mut buf = Bytes::from(data);

    if buf.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(SkipKvError::Corruption(format!(
            "framed snapshot truncated to {} bytes",
            buf.len()
        )));
    }

    let magic = buf.split_to(MAGIC.len());
    if &magic[..] != MAGIC {
        return Err(SkipKvError::Corruption(format!(
            "invalid snapshot magic: {:?}",
            &magic[..]
        )));
    }

    let version = buf.get_u16_le();
    if version != VERSION {
        return Err(SkipKvError::Corruption(format!(
            "unsupported snapshot version: {}",
            version
        )));
    }

    let count = buf.get_u64_le();
    let mut body = buf.split_to(buf.len() - FOOTER_SIZE);
    let expected_crc = buf.get_u32_le();
    let actual_crc = crc32fast::hash(&body);
    if expected_crc != actual_crc {
        return Err(SkipKvError::Corruption(format!(
            "entry checksum mismatch: expected {:#010x}, got {:#010x}",
            expected_crc, actual_crc
        )));
    }

    // Decode everything before handing out a single entry
    let mut entries = Vec::new();
    let mut skipped = 0;
    for index in 0..count {
        if body.remaining() < ENTRY_PREFIX_SIZE {
            return Err(SkipKvError::Corruption(format!(
                "entry {} of {} truncated",
                index, count
            )));
        }
        let key_len = body.get_u32_le() as usize;
        let value_len = body.get_u32_le() as usize;
        if body.remaining() < key_len + value_len {
            return Err(SkipKvError::Corruption(format!(
                "entry {} of {} truncated",
                index, count
            )));
        }

        let key = body.split_to(key_len);
        let value = body.split_to(value_len);
        match (parse_field::<K>(&key, index)?, parse_field::<V>(&value, index)?) {
            (Some(key), Some(value)) => entries.push((key, value)),
            _ => {
                tracing::warn!("Skipping snapshot entry {} that does not parse", index);
                skipped += 1;
            }
        }
    }

    if body.has_remaining() {
        return Err(SkipKvError::Corruption(format!(
            "{} trailing bytes after {} entries",
            body.remaining(),
            count
        )));
    }

    let loaded = entries.len();
    for (key, value) in entries {
        sink(key, value);
    }

    Ok((loaded, skipped))
}

/// Invalid UTF-8 is corruption; text that does not parse as `T` is a skip.
fn parse_field<T: FromStr>(raw: &[u8], index: u64) -> Result<Option<T>> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        SkipKvError::Corruption(format!("entry {} is not valid UTF-8: {}", index, e))
    })?;
    Ok(text.parse().ok())
}
