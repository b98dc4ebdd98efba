//! Quota - ceilings on what an area may hold and how often it may be written.
//!
//! A [`Quota`] table holds six optional ceilings; `None` means unlimited. Content
//! ceilings (`MAX_ITEMS`, `QUOTA_BYTES`, `QUOTA_BYTES_PER_ITEM`) are checked
//! against the proposed snapshot of a `set`. Rate ceilings are tracked by
//! [`WriteQuota`] in hour and minute buckets.
//!
//! Tables deserialize from JSON using the host's field names:
//!
//! ```
//! use mock_storagearea::Quota;
//!
//! let quota = Quota::from_json(r#"{"QUOTA_BYTES_PER_ITEM": 32}"#).unwrap();
//! assert_eq!(quota.quota_bytes_per_item, Some(32));
//! assert_eq!(quota.max_items, None);
//! ```

mod clock;
mod write_quota;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::snapshot::Mutation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use write_quota::{hour_bucket, minute_bucket, WriteQuota, WriteReservation};

/// A named quota ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ceiling {
    MaxItems,
    MaxSustainedWriteOperationsPerMinute,
    MaxWriteOperationsPerHour,
    MaxWriteOperationsPerMinute,
    QuotaBytes,
    QuotaBytesPerItem,
}

impl Ceiling {
    pub const ALL: [Ceiling; 6] = [
        Ceiling::MaxItems,
        Ceiling::MaxSustainedWriteOperationsPerMinute,
        Ceiling::MaxWriteOperationsPerHour,
        Ceiling::MaxWriteOperationsPerMinute,
        Ceiling::QuotaBytes,
        Ceiling::QuotaBytesPerItem,
    ];

    /// The host's constant name.
    pub fn name(self) -> &'static str {
        match self {
            Ceiling::MaxItems => "MAX_ITEMS",
            Ceiling::MaxSustainedWriteOperationsPerMinute => {
                "MAX_SUSTAINED_WRITE_OPERATIONS_PER_MINUTE"
            }
            Ceiling::MaxWriteOperationsPerHour => "MAX_WRITE_OPERATIONS_PER_HOUR",
            Ceiling::MaxWriteOperationsPerMinute => "MAX_WRITE_OPERATIONS_PER_MINUTE",
            Ceiling::QuotaBytes => "QUOTA_BYTES",
            Ceiling::QuotaBytesPerItem => "QUOTA_BYTES_PER_ITEM",
        }
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quota ceilings for one storage area. `None` is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct Quota {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Carried for completeness; never enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sustained_write_operations_per_minute: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_write_operations_per_hour: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_write_operations_per_minute: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes_per_item: Option<u64>,
}

impl Quota {
    pub const UNLIMITED: Quota = Quota {
        max_items: None,
        max_sustained_write_operations_per_minute: None,
        max_write_operations_per_hour: None,
        max_write_operations_per_minute: None,
        quota_bytes: None,
        quota_bytes_per_item: None,
    };

    /// Default ceilings of the `local` area.
    pub const fn local() -> Quota {
        Quota {
            quota_bytes: Some(10_485_760),
            ..Quota::UNLIMITED
        }
    }

    /// Default ceilings of the `session` area (same as `local`).
    pub const fn session() -> Quota {
        Quota::local()
    }

    /// Default ceilings of the `sync` area.
    pub const fn sync() -> Quota {
        Quota {
            max_items: Some(512),
            max_sustained_write_operations_per_minute: Some(1_000_000),
            max_write_operations_per_hour: Some(1_800),
            max_write_operations_per_minute: Some(120),
            quota_bytes: Some(102_400),
            quota_bytes_per_item: Some(8_192),
        }
    }

    /// Parses a (possibly partial) table from JSON.
    pub fn from_json(text: &str) -> Result<Quota, StorageError> {
        serde_json::from_str(text).map_err(|e| StorageError::Config(e.to_string()))
    }

    /// Layers `overrides` over `self`; ceilings set in `overrides` win.
    pub fn merge(&self, overrides: &Quota) -> Quota {
        Quota {
            max_items: overrides.max_items.or(self.max_items),
            max_sustained_write_operations_per_minute: overrides
                .max_sustained_write_operations_per_minute
                .or(self.max_sustained_write_operations_per_minute),
            max_write_operations_per_hour: overrides
                .max_write_operations_per_hour
                .or(self.max_write_operations_per_hour),
            max_write_operations_per_minute: overrides
                .max_write_operations_per_minute
                .or(self.max_write_operations_per_minute),
            quota_bytes: overrides.quota_bytes.or(self.quota_bytes),
            quota_bytes_per_item: overrides.quota_bytes_per_item.or(self.quota_bytes_per_item),
        }
    }

    pub fn limit(&self, ceiling: Ceiling) -> Option<u64> {
        match ceiling {
            Ceiling::MaxItems => self.max_items,
            Ceiling::MaxSustainedWriteOperationsPerMinute => {
                self.max_sustained_write_operations_per_minute
            }
            Ceiling::MaxWriteOperationsPerHour => self.max_write_operations_per_hour,
            Ceiling::MaxWriteOperationsPerMinute => self.max_write_operations_per_minute,
            Ceiling::QuotaBytes => self.quota_bytes,
            Ceiling::QuotaBytesPerItem => self.quota_bytes_per_item,
        }
    }

    /// The finite ceilings, in declaration order. Unlimited ones are left out.
    pub fn finite_limits(&self) -> Vec<(Ceiling, u64)> {
        Ceiling::ALL
            .into_iter()
            .filter_map(|ceiling| self.limit(ceiling).map(|limit| (ceiling, limit)))
            .collect()
    }

    /// Checks the proposed snapshot of a `set` against the content ceilings.
    ///
    /// Item count is checked first, then total bytes, then each entry's size.
    pub fn check_mutation(&self, mutation: &Mutation) -> Result<(), StorageError> {
        let (before, after) = (&mutation.before, &mutation.after);

        if let Some(max) = self.max_items {
            if after.count() as u64 > max {
                return Err(exceeded(
                    Ceiling::MaxItems,
                    format!(
                        "Quota exceeded: MAX_ITEMS ({}) was exceeded. Previous size: {}, new size: {}.",
                        max,
                        before.count(),
                        after.count()
                    ),
                ));
            }
        }

        if let Some(max) = self.quota_bytes {
            if after.total_bytes() as u64 > max {
                return Err(exceeded(
                    Ceiling::QuotaBytes,
                    format!(
                        "Quota exceeded: QUOTA_BYTES ({}) was exceeded. Previous size: {}, new size: {}.",
                        max,
                        before.total_bytes(),
                        after.total_bytes()
                    ),
                ));
            }
        }

        if let Some(max) = self.quota_bytes_per_item {
            let oversized = after
                .size_in_bytes()
                .into_iter()
                .find(|(_, size)| *size as u64 > max);
            if let Some((key, size)) = oversized {
                return Err(exceeded(
                    Ceiling::QuotaBytesPerItem,
                    format!(
                        "Quota exceeded: QUOTA_BYTES_PER_ITEM ({}) was exceeded by property \"{}\" ({})",
                        max, key, size
                    ),
                ));
            }
        }

        Ok(())
    }
}

pub(crate) fn exceeded(ceiling: Ceiling, message: String) -> StorageError {
    StorageError::QuotaExceeded { ceiling, message }
}
