use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::StorageError;

use super::{exceeded, Ceiling};

const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// Whole hours since the Unix epoch.
pub fn hour_bucket(now_millis: u64) -> u64 {
    now_millis / MILLIS_PER_HOUR
}

/// Whole minutes since the Unix epoch.
pub fn minute_bucket(now_millis: u64) -> u64 {
    now_millis / MILLIS_PER_MINUTE
}

/// Write tallies keyed by time bucket.
///
/// Stale buckets are never purged; they simply stop being incremented. An
/// unlimited ceiling never creates a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteQuota {
    per_hour: BTreeMap<u64, u64>,
    per_minute: BTreeMap<u64, u64>,
}

/// Buckets cleared by [`WriteQuota::check`], to be incremented once the write
/// as a whole commits.
#[must_use = "a reservation does nothing until committed"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReservation {
    hour: Option<u64>,
    minute: Option<u64>,
}

impl WriteReservation {
    pub fn commit(self, writes: &mut WriteQuota) {
        if let Some(hour) = self.hour {
            *writes.per_hour.entry(hour).or_insert(0) += 1;
        }
        if let Some(minute) = self.minute {
            *writes.per_minute.entry(minute).or_insert(0) += 1;
        }
    }
}

impl WriteQuota {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether one more write fits, without recording it.
    ///
    /// The hourly ceiling is checked first, so when both would be exceeded the
    /// hourly one is reported.
    pub fn check(
        &self,
        max_per_hour: Option<u64>,
        max_per_minute: Option<u64>,
        now_millis: u64,
    ) -> Result<WriteReservation, StorageError> {
        let hour = match max_per_hour {
            Some(max) => {
                let bucket = hour_bucket(now_millis);
                if self.writes_in_hour(bucket) + 1 > max {
                    return Err(exceeded(
                        Ceiling::MaxWriteOperationsPerHour,
                        format!(
                            "Quota exceeded: MAX_WRITE_OPERATIONS_PER_HOUR ({}) was exceeded.",
                            max
                        ),
                    ));
                }
                Some(bucket)
            }
            None => None,
        };

        let minute = match max_per_minute {
            Some(max) => {
                let bucket = minute_bucket(now_millis);
                if self.writes_in_minute(bucket) + 1 > max {
                    return Err(exceeded(
                        Ceiling::MaxWriteOperationsPerMinute,
                        format!(
                            "Quota exceeded: MAX_WRITE_OPERATIONS_PER_MINUTE ({}) was exceeded.",
                            max
                        ),
                    ));
                }
                Some(bucket)
            }
            None => None,
        };

        Ok(WriteReservation { hour, minute })
    }

    /// Check and commit in one step.
    pub fn record_write(
        &mut self,
        max_per_hour: Option<u64>,
        max_per_minute: Option<u64>,
        now_millis: u64,
    ) -> Result<(), StorageError> {
        self.check(max_per_hour, max_per_minute, now_millis)?
            .commit(self);
        Ok(())
    }

    pub fn writes_in_hour(&self, bucket: u64) -> u64 {
        self.per_hour.get(&bucket).copied().unwrap_or(0)
    }

    pub fn writes_in_minute(&self, bucket: u64) -> u64 {
        self.per_minute.get(&bucket).copied().unwrap_or(0)
    }

    pub fn per_hour(&self) -> &BTreeMap<u64, u64> {
        &self.per_hour
    }

    pub fn per_minute(&self) -> &BTreeMap<u64, u64> {
        &self.per_minute
    }
}
