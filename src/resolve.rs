//! Per-month resolution of day constraints.
//!
//! Special day tokens (`L`, `L-n`, `nW`, `LW`, `<n>L`) cannot be expanded at
//! parse time because their meaning depends on the length and weekday layout
//! of the concrete month. The fire-time search calls [`days_for_month`] once
//! per candidate month to materialize them; nothing is cached across months
//! since month length and leap-year status vary.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::descriptor::{DayGovernor, DayOfWeek, DomSpecial, ScheduleDescriptor};

/// Number of days in the given month, leap-year aware.
pub(crate) fn month_length(year: i32, month: u32) -> u32 {
    // The first of the next month minus one day.
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

// Quartz weekday code: 1 = Sunday .. 7 = Saturday.
fn weekday_code(w: Weekday) -> u32 {
    w.num_days_from_sunday() + 1
}

fn weekday_of(year: i32, month: u32, day: u32) -> Option<Weekday> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday())
}

/// The weekday (Mon-Fri) nearest to `day`, staying inside the month.
///
/// Saturday shifts to the preceding Friday unless that would leave the
/// month, in which case the following Monday is used; Sunday mirrors this.
/// `day` is clamped to the month's last day first.
fn nearest_weekday(year: i32, month: u32, day: u32) -> u32 {
    let last = month_length(year, month);
    let day = day.min(last);
    match weekday_of(year, month, day) {
        Some(Weekday::Sat) => {
            if day > 1 {
                day - 1
            } else {
                day + 2
            }
        }
        Some(Weekday::Sun) => {
            if day < last {
                day + 1
            } else {
                day - 2
            }
        }
        _ => day,
    }
}

/// Day of the last occurrence of the weekday with Quartz code `code` in the
/// given month.
fn last_weekday_occurrence(year: i32, month: u32, code: u32) -> Option<u32> {
    let last = month_length(year, month);
    (1..=last)
        .rev()
        .find(|&day| weekday_of(year, month, day).map(weekday_code) == Some(code))
}

/// Resolves the governing day constraint into the set of matching calendar
/// days for one `(year, month)` pair.
pub(crate) fn days_for_month(
    descriptor: &ScheduleDescriptor,
    year: i32,
    month: u32,
) -> BTreeSet<u32> {
    let last = month_length(year, month);
    let mut days = BTreeSet::new();

    match descriptor.day_governor {
        DayGovernor::DayOfMonth => {
            let dom = &descriptor.days_of_month;
            for day in dom.values.iter().filter(|&d| d <= last) {
                days.insert(day);
            }
            for special in &dom.specials {
                match special {
                    DomSpecial::Last { offset, weekday } => {
                        // Clamped so the offset never rolls into the
                        // previous month.
                        let base = last.saturating_sub(*offset).max(1);
                        let day = if *weekday {
                            nearest_weekday(year, month, base)
                        } else {
                            base
                        };
                        days.insert(day);
                    }
                    DomSpecial::NearestWeekday(n) => {
                        days.insert(nearest_weekday(year, month, *n));
                    }
                }
            }
        }
        DayGovernor::DayOfWeek => match &descriptor.days_of_week {
            DayOfWeek::Values { set, .. } => {
                for day in 1..=last {
                    if let Some(w) = weekday_of(year, month, day) {
                        if set.contains(weekday_code(w)) {
                            days.insert(day);
                        }
                    }
                }
            }
            DayOfWeek::LastOfMonth(code) => {
                if let Some(day) = last_weekday_occurrence(year, month, *code) {
                    days.insert(day);
                }
            }
        },
    }

    days
}
