// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 100 ns ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Timestamp as 100 ns ticks since 1601-01-01 UTC. Zero means "not set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct DateTime(pub i64);

impl DateTime {
    pub const MIN: DateTime = DateTime(0);

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn ticks(&self) -> i64 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Seconds since the Unix epoch, negative before 1970.
    pub fn unix_seconds(&self) -> i64 {
        (self.0 - UNIX_EPOCH_TICKS).div_euclid(TICKS_PER_SECOND)
    }
}

impl From<SystemTime> for DateTime {
    fn from(value: SystemTime) -> Self {
        let ticks = match value.duration_since(UNIX_EPOCH) {
            Ok(d) => UNIX_EPOCH_TICKS.saturating_add((d.as_nanos() / 100) as i64),
            Err(e) => UNIX_EPOCH_TICKS.saturating_sub((e.duration().as_nanos() / 100) as i64),
        };
        DateTime(ticks.max(0))
    }
}

impl From<DateTime> for SystemTime {
    fn from(value: DateTime) -> Self {
        let delta = value.0 - UNIX_EPOCH_TICKS;
        let magnitude = Duration::from_nanos(delta.unsigned_abs().saturating_mul(100));
        if delta >= 0 {
            UNIX_EPOCH + magnitude
        } else {
            UNIX_EPOCH - magnitude
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("<unset>");
        }
        let frac = (self.0 - UNIX_EPOCH_TICKS).rem_euclid(TICKS_PER_SECOND);
        write!(f, "unix:{}.{:07}", self.unix_seconds(), frac)
    }
}
