// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Timestamp normalization
//!
//! Backup databases count from 2001-01-01T00:00:00Z. Newer schemas store
//! nanoseconds, older ones seconds; both become Unix seconds here.

use std::fmt;

use chrono::{DateTime, SecondsFormat};
use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Raw values above this are nanosecond-scaled.
const NANOSECOND_THRESHOLD: i64 = 1_000_000_000;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Whole seconds since the Unix epoch; `0` means "no timestamp".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NormalizedTimestamp(i64);

impl NormalizedTimestamp {
    pub fn from_unix_seconds(seconds: i64) -> Self {
        NormalizedTimestamp(seconds)
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0
    }

    /// True when the source row carried no date.
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// ISO-8601 UTC rendering, `None` when unset or out of range.
    pub fn to_rfc3339(&self) -> Option<String> {
        if self.is_unset() {
            return None;
        }
        DateTime::from_timestamp(self.0, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl fmt::Display for NormalizedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(iso) => f.write_str(&iso),
            None => f.write_str("-"),
        }
    }
}

/// Converts a raw backup date to Unix seconds.
///
/// # Example
/// ```
/// use recover_core::query::normalize_timestamp;
///
/// assert_eq!(normalize_timestamp(0).unix_seconds(), 0);
/// assert_eq!(normalize_timestamp(100).unix_seconds(), 978_307_300);
/// assert_eq!(normalize_timestamp(5_000_000_000).unix_seconds(), 978_307_205);
/// ```
pub fn normalize_timestamp(raw: i64) -> NormalizedTimestamp {
    if raw > NANOSECOND_THRESHOLD {
        NormalizedTimestamp(raw / NANOS_PER_SECOND + APPLE_EPOCH_OFFSET)
    } else if raw != 0 {
        NormalizedTimestamp(raw + APPLE_EPOCH_OFFSET)
    } else {
        NormalizedTimestamp(0)
    }
}

/// Reads a raw date column, tolerating NULL, REAL and numeric TEXT values.
///
/// Anything that is not a number reads as `0`.
pub(crate) fn raw_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(value) => value,
        ValueRef::Real(value) => value as i64,
        ValueRef::Text(text) => std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|v| v as i64)
            .unwrap_or(0),
        ValueRef::Null | ValueRef::Blob(_) => 0,
    })
}
