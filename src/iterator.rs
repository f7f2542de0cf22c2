use chrono::{DateTime, TimeZone};

use crate::{CronExpression, Direction};

/// Iterator over the fire times of a [`CronExpression`], in either
/// direction.
///
/// The iterator ends (returns `None`) when the search leaves the supported
/// year range, so schedules that can never fire again yield a finite
/// sequence rather than spinning.
#[derive(Debug, Clone)]
pub struct CronIterator<Tz>
where
    Tz: TimeZone,
{
    expression: CronExpression<Tz>,
    cursor: DateTime<Tz>,
    start_inclusive: bool,
    started: bool,
    direction: Direction,
}

impl<Tz> CronIterator<Tz>
where
    Tz: TimeZone,
{
    /// Creates a new `CronIterator`.
    ///
    /// # Arguments
    ///
    /// * `expression` - The schedule to iterate.
    /// * `start_time` - The instant to start iterating from.
    /// * `inclusive` - Whether `start_time` itself may be yielded if it matches.
    /// * `direction` - The direction to iterate in (forward or backward).
    pub fn new(
        expression: CronExpression<Tz>,
        start_time: DateTime<Tz>,
        inclusive: bool,
        direction: Direction,
    ) -> Self {
        CronIterator {
            expression,
            cursor: start_time,
            start_inclusive: inclusive,
            started: false,
            direction,
        }
    }
}

impl<Tz> Iterator for CronIterator<Tz>
where
    Tz: TimeZone,
{
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        // Only the very first search may be inclusive; afterwards the
        // cursor parks on the last yield and the exclusive search moves
        // strictly beyond it, so consecutive seconds stay reachable.
        let inclusive = if self.started {
            false
        } else {
            self.started = true;
            self.start_inclusive
        };

        let found = self
            .expression
            .occurrence_from(&self.cursor, inclusive, self.direction)?;

        self.cursor = found.clone();

        Some(found)
    }
}
