//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Reader for the binary lastlog file.
//!
//! The file is a sparse array of fixed-size records, one slot per uid:
//!
//! ```text
//! offset  size  field
//!      0     4  ll_time  (u32, little endian, seconds since the epoch)
//!      4    32  ll_line  (NUL padded)
//!     36   256  ll_host  (NUL padded)
//! ```
//!
//! Slot `uid` starts at `uid * LASTLOG_SIZE`.  A slot that lies beyond the
//! end of the file has never been written and reads as "never logged in".

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub const LASTLOG_PATH: &str = "/var/log/lastlog";

pub const LL_TIME_SIZE: usize = 4;
pub const UT_LINESIZE: usize = 32;
pub const UT_HOSTSIZE: usize = 256;

pub const LASTLOG_SIZE: usize = LL_TIME_SIZE + UT_LINESIZE + UT_HOSTSIZE;

const LINE_OFFSET: usize = LL_TIME_SIZE;
const HOST_OFFSET: usize = LINE_OFFSET + UT_LINESIZE;

/// The most recent login recorded for one uid.
///
/// `Lastlog::default()` is the never-logged-in sentinel: timestamp zero,
/// empty line and host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lastlog {
    pub timestamp: i64,
    pub line: String,
    pub host: String,
}

impl Lastlog {
    pub fn never_logged_in(&self) -> bool {
        self.timestamp == 0
    }
}

/// Convert a NUL-padded field to a string, dropping every NUL byte in it.
///
/// Embedded NULs are removed too, not only the trailing padding.
pub fn strip_nuls(field: &[u8]) -> String {
    let bytes: Vec<u8> = field.iter().copied().filter(|&b| b != 0).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn decode(raw: &[u8; LASTLOG_SIZE]) -> Lastlog {
    let mut time_bytes = [0u8; LL_TIME_SIZE];
    time_bytes.copy_from_slice(&raw[..LINE_OFFSET]);

    Lastlog {
        timestamp: i64::from(u32::from_le_bytes(time_bytes)),
        line: strip_nuls(&raw[LINE_OFFSET..HOST_OFFSET]),
        host: strip_nuls(&raw[HOST_OFFSET..]),
    }
}

/// Build the on-disk form of `entry`.
///
/// Fields longer than their slot are truncated; the timestamp keeps its
/// low 32 bits.
pub fn encode(entry: &Lastlog) -> [u8; LASTLOG_SIZE] {
    let mut raw = [0u8; LASTLOG_SIZE];

    raw[..LINE_OFFSET].copy_from_slice(&(entry.timestamp as u32).to_le_bytes());

    let line = entry.line.as_bytes();
    let n = line.len().min(UT_LINESIZE);
    raw[LINE_OFFSET..LINE_OFFSET + n].copy_from_slice(&line[..n]);

    let host = entry.host.as_bytes();
    let n = host.len().min(UT_HOSTSIZE);
    raw[HOST_OFFSET..HOST_OFFSET + n].copy_from_slice(&host[..n]);

    raw
}

/// Byte offset of the slot for `uid`.
pub fn record_offset(uid: u32) -> u64 {
    u64::from(uid) * LASTLOG_SIZE as u64
}

/// An open lastlog file together with its length.
pub struct LastlogFile<R> {
    file: R,
    size: u64,
}

impl LastlogFile<File> {
    /// Open `path` read-only and record its current length.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<LastlogFile<File>> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        log::debug!("lastlog: {} is {} bytes", path.as_ref().display(), size);
        Ok(LastlogFile::new(file, size))
    }
}

impl<R: Read + Seek> LastlogFile<R> {
    /// Wrap a handle whose total length is `size` bytes.
    pub fn new(file: R, size: u64) -> LastlogFile<R> {
        LastlogFile { file, size }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Fetch the record for `uid`.
    ///
    /// A slot that does not fit entirely inside the file yields the
    /// sentinel; seek and read failures are returned as errors.
    pub fn lookup(&mut self, uid: u32) -> io::Result<Lastlog> {
        let offset = record_offset(uid);
        if offset + LASTLOG_SIZE as u64 > self.size {
            log::trace!("lastlog: uid {uid} beyond end of file");
            return Ok(Lastlog::default());
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let mut raw = [0u8; LASTLOG_SIZE];
        self.file.read_exact(&mut raw)?;

        let entry = decode(&raw);
        log::trace!("lastlog: uid {uid} at offset {offset}: {entry:?}");
        Ok(entry)
    }
}
