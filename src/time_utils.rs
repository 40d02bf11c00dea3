// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for timestamps.

use chrono::Utc;

/// Current time as epoch milliseconds, the unit stored on every record.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
