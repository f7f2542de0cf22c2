//! # quartz-cron
//!
//! quartz-cron is a lightweight Rust library for parsing and evaluating
//! Quartz-style cron expressions with second granularity and an optional
//! year field.
//!
//! ## Features
//! - Parses the full Quartz field grammar, including `L`, `W` and `LW` day
//!   forms, named months and weekdays, wrapping ranges, and steps.
//! - Finds fire times forward and backward from any instant.
//! - Supports time zone-aware scheduling through `chrono`, including
//!   sensible handling of DST gaps and overlaps.
//! - Reports malformed expressions with the exact diagnostics established
//!   by the Quartz scheduler.
//!
//! ## Example
//! The following example parses an expression and finds the next fire time
//! after the current moment:
//!
//! ```rust
//! use chrono::Utc;
//! use quartz_cron::CronExpression;
//!
//! // Fire at 10:15:00 on the last weekday of every month
//! let cron = CronExpression::new("0 15 10 LW * ?").expect("valid expression");
//!
//! if let Some(next) = cron.next_fire_time_after(&Utc::now()) {
//!     println!("\"{}\" fires next at {}", cron, next);
//! }
//! ```
//!
//! ## Expression format
//!
//! ```text
//! // ┌──────────────── second (0 - 59)
//! // │ ┌────────────── minute (0 - 59)
//! // │ │ ┌──────────── hour (0 - 23)
//! // │ │ │ ┌────────── day of month (1 - 31)
//! // │ │ │ │ ┌──────── month (1 - 12, JAN-DEC)
//! // │ │ │ │ │ ┌────── day of week (1 - 7, SUN-SAT; 1 is Sunday)
//! // │ │ │ │ │ │ ┌──── (optional) year (1970 - 2199)
//! // │ │ │ │ │ │ │
//! // *  *  *  *  *  ?  *
//! ```
//!
//! | Field        | Required | Allowed values  | Allowed special characters |
//! | ------------ | -------- | --------------- | -------------------------- |
//! | Seconds      | Yes      | 0-59            | * , - /                    |
//! | Minutes      | Yes      | 0-59            | * , - /                    |
//! | Hours        | Yes      | 0-23            | * , - /                    |
//! | Day of Month | Yes      | 1-31            | * , - / ? L W              |
//! | Month        | Yes      | 1-12 or JAN-DEC | * , - /                    |
//! | Day of Week  | Yes      | 1-7 or SUN-SAT  | * , - / ? L                |
//! | Year         | No       | 1970-2199       | * , - /                    |
//!
//! Exactly one of the two day fields must be `?`; the other one governs
//! which calendar days match. `0` is accepted as an alias for Sunday in the
//! day-of-week field.

mod descriptor;
mod errors;
mod field;
mod iterator;
mod parser;
mod resolve;
mod search;

pub use descriptor::ScheduleDescriptor;
pub use errors::CronError;
pub use field::{CronField, ValueSet, YEAR_LOWER_LIMIT, YEAR_UPPER_LIMIT};
pub use iterator::CronIterator;
pub use search::Direction;

use std::str::FromStr;

use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};

/// A parsed, immutable cron schedule bound to a time zone.
///
/// Parsing is the only fallible operation; every query on a constructed
/// expression is infallible, with "no such fire time" expressed as `None`.
/// The time zone is the one piece of mutable state and can be swapped with
/// [`set_time_zone`](CronExpression::set_time_zone) without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CronExpression<Tz = Utc>
where
    Tz: TimeZone,
{
    descriptor: ScheduleDescriptor,
    time_zone: Tz,
}

impl CronExpression<Utc> {
    /// Parses `expression` into a schedule evaluated in UTC.
    pub fn new(expression: &str) -> Result<Self, CronError> {
        Ok(Self {
            descriptor: parser::parse(expression)?,
            time_zone: Utc,
        })
    }

    /// Returns whether `expression` would parse, without keeping the result.
    pub fn is_valid_expression(expression: &str) -> bool {
        parser::parse(expression).is_ok()
    }
}

impl<Tz> CronExpression<Tz>
where
    Tz: TimeZone,
{
    /// The parsed field representation behind this schedule.
    pub fn descriptor(&self) -> &ScheduleDescriptor {
        &self.descriptor
    }

    /// Canonical textual form: uppercased fields joined by single spaces.
    /// Re-parsing it yields an equivalent schedule.
    pub fn expression_string(&self) -> &str {
        self.descriptor.expression_string()
    }

    /// The time zone all wall-clock evaluation happens in.
    pub fn time_zone(&self) -> &Tz {
        &self.time_zone
    }

    /// Rebinds the schedule to another time zone in place.
    pub fn set_time_zone(&mut self, time_zone: Tz) {
        self.time_zone = time_zone;
    }

    /// Copy of this schedule bound to another time zone, possibly of a
    /// different kind.
    pub fn with_time_zone<Tz2: TimeZone>(&self, time_zone: Tz2) -> CronExpression<Tz2> {
        CronExpression {
            descriptor: self.descriptor.clone(),
            time_zone,
        }
    }

    /// Whether the given instant, viewed in the schedule's time zone,
    /// matches every field. Sub-second precision is ignored.
    pub fn is_satisfied_by(&self, time: &DateTime<Tz>) -> bool {
        let local = time.with_timezone(&self.time_zone).naive_local();
        self.descriptor.matches_naive(local)
    }

    /// First fire time strictly after `after`, or `None` when the schedule
    /// never fires again within the supported year range.
    pub fn next_fire_time_after(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.occurrence_from(after, false, Direction::Forward)
    }

    /// Last fire time strictly before `before`, or `None` when the schedule
    /// never fired within the supported year range.
    pub fn previous_fire_time_before(&self, before: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.occurrence_from(before, false, Direction::Backward)
    }

    /// Iterator over fire times strictly after `start_time`.
    pub fn iter_after(&self, start_time: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_time, false, Direction::Forward)
    }

    /// Iterator over fire times at or after `start_time`.
    pub fn iter_from(&self, start_time: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_time, true, Direction::Forward)
    }

    /// Iterator over fire times strictly before `start_time`, latest first.
    pub fn iter_before(&self, start_time: DateTime<Tz>) -> CronIterator<Tz> {
        CronIterator::new(self.clone(), start_time, false, Direction::Backward)
    }

    // Shared engine behind the public queries and the iterator.
    //
    // The naive search works purely on wall-clock fields; this wrapper maps
    // each naive hit back into the time zone. A hit inside a DST gap has no
    // instant and is skipped. A hit inside a DST overlap has two instants;
    // the earlier one is taken going forward and the later one going
    // backward. The bound re-check keeps results strictly monotonic even
    // across those adjustments.
    pub(crate) fn occurrence_from(
        &self,
        from: &DateTime<Tz>,
        inclusive: bool,
        direction: Direction,
    ) -> Option<DateTime<Tz>> {
        let step = match direction {
            Direction::Forward => Duration::seconds(1),
            Direction::Backward => Duration::seconds(-1),
        };

        let mut naive = from.with_timezone(&self.time_zone).naive_local();
        if !inclusive {
            naive = naive.checked_add_signed(step)?;
        }

        loop {
            let hit = search::find_fire_time(&self.descriptor, naive, direction)?;
            let candidate = match self.time_zone.from_local_datetime(&hit) {
                LocalResult::Single(t) => Some(t),
                LocalResult::Ambiguous(earliest, latest) => Some(match direction {
                    Direction::Forward => earliest,
                    Direction::Backward => latest,
                }),
                LocalResult::None => None,
            };

            if let Some(t) = candidate {
                let within_bound = match (direction, inclusive) {
                    (Direction::Forward, false) => t > *from,
                    (Direction::Forward, true) => t >= *from,
                    (Direction::Backward, false) => t < *from,
                    (Direction::Backward, true) => t <= *from,
                };
                if within_bound {
                    return Some(t);
                }
            }

            naive = hit.checked_add_signed(step)?;
        }
    }
}

impl FromStr for CronExpression<Utc> {
    type Err = CronError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        CronExpression::new(expression)
    }
}

impl<Tz> std::fmt::Display for CronExpression<Tz>
where
    Tz: TimeZone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor.expression_string())
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::*;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serializes as the canonical expression string. The time zone binding
    /// is not part of the serialized form.
    impl<Tz> Serialize for CronExpression<Tz>
    where
        Tz: TimeZone,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.expression_string())
        }
    }

    impl<'de> Deserialize<'de> for CronExpression<Utc> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let expression = String::deserialize(deserializer)?;
            CronExpression::new(&expression).map_err(Error::custom)
        }
    }
}
