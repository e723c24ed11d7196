// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time at the precision Firestore keeps (microseconds).
///
/// Truncating up front means a timestamp read back from the store compares
/// equal to the one that was written.
pub fn store_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
