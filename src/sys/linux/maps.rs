//! `/proc/<pid>/maps` parsing
//!
//! Each line has the form
//! `start-end perms offset dev inode [pathname]`, for example
//! `00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/ls`.
//! Lines are sorted by start address and never overlap.

use crate::core::types::{Access, Address, Protection, RegionInfo};
use crate::sys::KernelStatus;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// One parsed maps line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct MapEntry {
    pub start: u64,
    pub end: u64,
    pub protection: Protection,
}

impl MapEntry {
    fn into_region(self) -> RegionInfo {
        RegionInfo {
            base: Address::new(self.start),
            size: self.end - self.start,
            depth: 0,
            protection: self.protection,
        }
    }
}

/// Parses one raw maps line, `None` for anything malformed
///
/// Only the range and permission fields are looked at. The pathname may hold
/// arbitrary bytes and is never decoded.
pub(super) fn parse_line(line: &[u8]) -> Option<MapEntry> {
    let mut fields = line
        .split(|byte| byte.is_ascii_whitespace())
        .filter(|field| !field.is_empty());
    let range = fields.next()?;
    let perms = fields.next()?;

    let dash = range.iter().position(|&byte| byte == b'-')?;
    let start = parse_hex(&range[..dash])?;
    let end = parse_hex(&range[dash + 1..])?;
    if end <= start || perms.len() < 3 {
        return None;
    }

    Some(MapEntry {
        start,
        end,
        protection: Protection {
            read: perms[0] == b'r',
            write: perms[1] == b'w',
            execute: perms[2] == b'x',
        },
    })
}

fn parse_hex(digits: &[u8]) -> Option<u64> {
    u64::from_str_radix(std::str::from_utf8(digits).ok()?, 16).ok()
}

/// Splits a maps stream into entries, surfacing read errors
pub(super) fn parse_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<MapEntry, KernelStatus>> {
    reader.split(b'\n').filter_map(|line| match line {
        Ok(line) => parse_line(&line).map(Ok),
        Err(err) => Some(Err(KernelStatus::from(err))),
    })
}

fn entries(
    pid: libc::pid_t,
) -> Result<impl Iterator<Item = Result<MapEntry, KernelStatus>>, KernelStatus> {
    let file = File::open(format!("/proc/{}/maps", pid))?;
    Ok(parse_lines(BufReader::new(file)))
}

/// First entry whose end lies beyond `address`
pub(super) fn first_ending_after<I>(
    entries: I,
    address: u64,
) -> Result<Option<RegionInfo>, KernelStatus>
where
    I: IntoIterator<Item = Result<MapEntry, KernelStatus>>,
{
    for entry in entries {
        let entry = entry?;
        if entry.end > address {
            return Ok(Some(entry.into_region()));
        }
    }
    Ok(None)
}

/// Region containing `address` or the first one after it
pub(super) fn query(pid: libc::pid_t, address: u64) -> Result<Option<RegionInfo>, KernelStatus> {
    first_ending_after(entries(pid)?, address)
}

/// Whether `[start, end)` is covered by contiguous entries that all allow
/// `access`
pub(super) fn range_allows<I>(
    entries: I,
    start: u64,
    end: u64,
    access: Access,
) -> Result<bool, KernelStatus>
where
    I: IntoIterator<Item = Result<MapEntry, KernelStatus>>,
{
    let mut cursor = start;
    for entry in entries {
        let entry = entry?;
        if entry.end <= cursor {
            continue;
        }
        if entry.start > cursor || !entry.protection.allows(access) {
            return Ok(false);
        }
        cursor = entry.end;
        if cursor >= end {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Live-map form of [`range_allows`]
pub(super) fn accessible(
    pid: libc::pid_t,
    start: u64,
    end: u64,
    access: Access,
) -> Result<bool, KernelStatus> {
    range_allows(entries(pid)?, start, end, access)
}
