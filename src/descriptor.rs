use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::field::ValueSet;
use crate::resolve;

/// A day-of-month entry that cannot be expanded to a fixed day number at
/// parse time because its meaning depends on the month and year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DomSpecial {
    /// `L`, `L-n`, `LW`, `L-nW`: the last day of the month minus `offset`,
    /// shifted to the nearest weekday when `weekday` is set.
    Last { offset: u32, weekday: bool },
    /// `nW`: the weekday nearest to day `n`, within the same month.
    NearestWeekday(u32),
}

/// The parsed day-of-month field: concrete days plus deferred specials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DayOfMonth {
    pub values: ValueSet,
    pub specials: Vec<DomSpecial>,
    /// The field was `*` or `?`.
    pub wildcard: bool,
}

/// The parsed day-of-week field.
///
/// `L` combined with a single weekday (`5L`, `FRIL`) selects the last
/// occurrence of that weekday in the month and excludes every other form,
/// so the two shapes are mutually exclusive variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DayOfWeek {
    Values { set: ValueSet, wildcard: bool },
    LastOfMonth(u32),
}

/// Which of the two day fields governs day matching. Exactly one of them is
/// `?`; the other one decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayGovernor {
    DayOfMonth,
    DayOfWeek,
}

/// The parsed, validated, immutable representation of one cron expression.
///
/// A descriptor owns no external resources and never changes after
/// construction; the time zone lives on [`CronExpression`](crate::CronExpression)
/// so that rebinding it does not require a re-parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDescriptor {
    pub(crate) seconds: ValueSet,
    pub(crate) minutes: ValueSet,
    pub(crate) hours: ValueSet,
    pub(crate) days_of_month: DayOfMonth,
    pub(crate) months: ValueSet,
    pub(crate) days_of_week: DayOfWeek,
    /// `None` when the year field was `*` or omitted (all years accepted).
    pub(crate) years: Option<ValueSet>,
    pub(crate) day_governor: DayGovernor,
    /// Canonical expression text: uppercased fields joined by single spaces.
    pub(crate) expression: String,
}

impl ScheduleDescriptor {
    /// The canonical textual form of the expression. Re-parsing it yields a
    /// descriptor with identical fire-time behavior.
    pub fn expression_string(&self) -> &str {
        &self.expression
    }

    pub(crate) fn year_matches(&self, year: i32) -> bool {
        match &self.years {
            Some(set) => year >= 0 && set.contains(year as u32),
            None => true,
        }
    }

    /// Tests a wall-clock datetime (already in the schedule's time zone)
    /// against every field. Sub-second components are ignored.
    pub(crate) fn matches_naive(&self, t: NaiveDateTime) -> bool {
        self.seconds.contains(t.second())
            && self.minutes.contains(t.minute())
            && self.hours.contains(t.hour())
            && self.months.contains(t.month())
            && self.year_matches(t.year())
            && resolve::days_for_month(self, t.year(), t.month()).contains(&t.day())
    }
}

impl std::fmt::Display for ScheduleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}
