//! Fire-time search over the wall-clock calendar.
//!
//! The search treats a datetime as a mixed-radix counter
//! (year, month, day, hour, minute, second) and aligns it field by field,
//! most significant first. When a field has no acceptable value at or beyond
//! the candidate, the next more significant field is bumped and all lower
//! fields reset; the loop then re-aligns from the top. Bumps may leave a
//! transiently invalid value (day 32, hour 24) but such values are only ever
//! used as range-query bounds, never to build a date directly.
//!
//! Day candidates come from [`resolve::days_for_month`], so `L`/`W` forms
//! and the day-of-week governor are already folded into concrete day numbers
//! for each month under consideration.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use strum::EnumIs;

use crate::descriptor::ScheduleDescriptor;
use crate::field::{YEAR_LOWER_LIMIT, YEAR_UPPER_LIMIT};
use crate::resolve;

/// Direction of a fire-time search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum Direction {
    Forward,
    Backward,
}

/// First matching wall-clock time at or beyond `from` in the given
/// direction, or `None` when the search leaves the supported year range.
pub(crate) fn find_fire_time(
    descriptor: &ScheduleDescriptor,
    from: NaiveDateTime,
    direction: Direction,
) -> Option<NaiveDateTime> {
    match direction {
        Direction::Forward => next_match(descriptor, from),
        Direction::Backward => prev_match(descriptor, from),
    }
}

fn next_match(d: &ScheduleDescriptor, from: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut year = from.year();
    let mut month = from.month();
    let mut day = from.day();
    let mut hour = from.hour();
    let mut minute = from.minute();
    let mut second = from.second();

    if year < YEAR_LOWER_LIMIT {
        year = YEAR_LOWER_LIMIT;
        month = 1;
        day = 1;
        hour = 0;
        minute = 0;
        second = 0;
    }

    'align: while year <= YEAR_UPPER_LIMIT {
        if !d.year_matches(year) {
            year += 1;
            month = 1;
            day = 1;
            hour = 0;
            minute = 0;
            second = 0;
            continue 'align;
        }

        match d.months.next_from(month) {
            Some(m) => {
                if m != month {
                    month = m;
                    day = 1;
                    hour = 0;
                    minute = 0;
                    second = 0;
                }
            }
            None => {
                year += 1;
                month = 1;
                day = 1;
                hour = 0;
                minute = 0;
                second = 0;
                continue 'align;
            }
        }

        let days = resolve::days_for_month(d, year, month);
        match days.range(day..).next().copied() {
            Some(dd) => {
                if dd != day {
                    day = dd;
                    hour = 0;
                    minute = 0;
                    second = 0;
                }
            }
            None => {
                month += 1;
                day = 1;
                hour = 0;
                minute = 0;
                second = 0;
                continue 'align;
            }
        }

        match d.hours.next_from(hour) {
            Some(h) => {
                if h != hour {
                    hour = h;
                    minute = 0;
                    second = 0;
                }
            }
            None => {
                day += 1;
                hour = 0;
                minute = 0;
                second = 0;
                continue 'align;
            }
        }

        match d.minutes.next_from(minute) {
            Some(m) => {
                if m != minute {
                    minute = m;
                    second = 0;
                }
            }
            None => {
                hour += 1;
                minute = 0;
                second = 0;
                continue 'align;
            }
        }

        match d.seconds.next_from(second) {
            Some(s) => second = s,
            None => {
                minute += 1;
                second = 0;
                continue 'align;
            }
        }

        return NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second));
    }

    None
}

fn prev_match(d: &ScheduleDescriptor, from: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut year = from.year();
    let mut month = from.month();
    let mut day = from.day();
    let mut hour = from.hour();
    let mut minute = from.minute();
    let mut second = from.second();

    if year > YEAR_UPPER_LIMIT {
        year = YEAR_UPPER_LIMIT;
        month = 12;
        day = 31;
        hour = 23;
        minute = 59;
        second = 59;
    }

    'align: while year >= YEAR_LOWER_LIMIT {
        if !d.year_matches(year) {
            year -= 1;
            month = 12;
            day = 31;
            hour = 23;
            minute = 59;
            second = 59;
            continue 'align;
        }

        match d.months.prev_from(month) {
            Some(m) => {
                if m != month {
                    month = m;
                    day = 31;
                    hour = 23;
                    minute = 59;
                    second = 59;
                }
            }
            None => {
                year -= 1;
                month = 12;
                day = 31;
                hour = 23;
                minute = 59;
                second = 59;
                continue 'align;
            }
        }

        let days = resolve::days_for_month(d, year, month);
        match days.range(..=day).next_back().copied() {
            Some(dd) => {
                if dd != day {
                    day = dd;
                    hour = 23;
                    minute = 59;
                    second = 59;
                }
            }
            None => {
                // Underflows to month 0 when January is exhausted; the
                // prev_from query above then fails and the year steps back.
                month = month.wrapping_sub(1);
                day = 31;
                hour = 23;
                minute = 59;
                second = 59;
                if month == 0 {
                    year -= 1;
                    month = 12;
                }
                continue 'align;
            }
        }

        match d.hours.prev_from(hour) {
            Some(h) => {
                if h != hour {
                    hour = h;
                    minute = 59;
                    second = 59;
                }
            }
            None => {
                if day == 1 {
                    month = month.wrapping_sub(1);
                    day = 31;
                    if month == 0 {
                        year -= 1;
                        month = 12;
                    }
                } else {
                    day -= 1;
                }
                hour = 23;
                minute = 59;
                second = 59;
                continue 'align;
            }
        }

        match d.minutes.prev_from(minute) {
            Some(m) => {
                if m != minute {
                    minute = m;
                    second = 59;
                }
            }
            None => {
                if hour == 0 {
                    if day == 1 {
                        month = month.wrapping_sub(1);
                        day = 31;
                        if month == 0 {
                            year -= 1;
                            month = 12;
                        }
                    } else {
                        day -= 1;
                    }
                    hour = 23;
                } else {
                    hour -= 1;
                }
                minute = 59;
                second = 59;
                continue 'align;
            }
        }

        match d.seconds.prev_from(second) {
            Some(s) => second = s,
            None => {
                if minute == 0 {
                    if hour == 0 {
                        if day == 1 {
                            month = month.wrapping_sub(1);
                            day = 31;
                            if month == 0 {
                                year -= 1;
                                month = 12;
                            }
                        } else {
                            day -= 1;
                        }
                        hour = 23;
                    } else {
                        hour -= 1;
                    }
                    minute = 59;
                } else {
                    minute -= 1;
                }
                second = 59;
                continue 'align;
            }
        }

        // `day` can exceed the month's length after a reset to 31; the day
        // query clamps it back into the resolved set before we get here, so
        // the constructor cannot fail on a matched candidate.
        return NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second));
    }

    None
}
