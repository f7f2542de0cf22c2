use std::collections::BTreeSet;
use std::str::FromStr;

use strum::EnumString;

use crate::errors::CronError;

/// The lowest year a schedule can name or a search can reach.
pub const YEAR_LOWER_LIMIT: i32 = 1970;
/// The highest year a schedule can name or a search can reach.
pub const YEAR_UPPER_LIMIT: i32 = 2199;

/// Identifies one of the seven positional fields of a cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CronField {
    Seconds,
    Minutes,
    Hours,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl CronField {
    /// Inclusive domain of the field's numeric values.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CronField::Seconds | CronField::Minutes => (0, 59),
            CronField::Hours => (0, 23),
            CronField::DayOfMonth => (1, 31),
            CronField::Month => (1, 12),
            CronField::DayOfWeek => (1, 7),
            CronField::Year => (YEAR_LOWER_LIMIT as u32, YEAR_UPPER_LIMIT as u32),
        }
    }

    /// Step increments must stay strictly below this; `None` disables the
    /// check (year field).
    pub fn modulus(&self) -> Option<u32> {
        match self {
            CronField::Seconds | CronField::Minutes => Some(60),
            CronField::Hours => Some(24),
            CronField::DayOfMonth => Some(31),
            CronField::Month => Some(12),
            CronField::DayOfWeek => Some(7),
            CronField::Year => None,
        }
    }
}

impl std::fmt::Display for CronField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            CronField::Seconds => "Seconds",
            CronField::Minutes => "Minutes",
            CronField::Hours => "Hours",
            CronField::DayOfMonth => "Day-of-Month",
            CronField::Month => "Month",
            CronField::DayOfWeek => "Day-of-Week",
            CronField::Year => "Year",
        };
        write!(f, "{name}")
    }
}

// Month names map to the 1-based codes used in the month field. Both the
// three-letter abbreviation and the full name are accepted.
#[derive(Debug, Clone, Copy, EnumString)]
#[strum(ascii_case_insensitive)]
pub(crate) enum MonthName {
    #[strum(serialize = "JAN", serialize = "JANUARY")]
    Jan = 1,
    #[strum(serialize = "FEB", serialize = "FEBRUARY")]
    Feb = 2,
    #[strum(serialize = "MAR", serialize = "MARCH")]
    Mar = 3,
    #[strum(serialize = "APR", serialize = "APRIL")]
    Apr = 4,
    #[strum(serialize = "MAY")]
    May = 5,
    #[strum(serialize = "JUN", serialize = "JUNE")]
    Jun = 6,
    #[strum(serialize = "JUL", serialize = "JULY")]
    Jul = 7,
    #[strum(serialize = "AUG", serialize = "AUGUST")]
    Aug = 8,
    #[strum(serialize = "SEP", serialize = "SEPTEMBER")]
    Sep = 9,
    #[strum(serialize = "OCT", serialize = "OCTOBER")]
    Oct = 10,
    #[strum(serialize = "NOV", serialize = "NOVEMBER")]
    Nov = 11,
    #[strum(serialize = "DEC", serialize = "DECEMBER")]
    Dec = 12,
}

// Day-of-week names map to the Quartz 1-based codes, 1 = Sunday.
#[derive(Debug, Clone, Copy, EnumString)]
#[strum(ascii_case_insensitive)]
pub(crate) enum DayName {
    #[strum(serialize = "SUN", serialize = "SUNDAY")]
    Sun = 1,
    #[strum(serialize = "MON", serialize = "MONDAY")]
    Mon = 2,
    #[strum(serialize = "TUE", serialize = "TUESDAY")]
    Tue = 3,
    #[strum(serialize = "WED", serialize = "WEDNESDAY")]
    Wed = 4,
    #[strum(serialize = "THU", serialize = "THURSDAY")]
    Thu = 5,
    #[strum(serialize = "FRI", serialize = "FRIDAY")]
    Fri = 6,
    #[strum(serialize = "SAT", serialize = "SATURDAY")]
    Sat = 7,
}

/// An ascending set of concrete integer values for one cron field.
///
/// Fields are defined as sets of accepted values; the fire-time search asks
/// for the next accepted value at or after (or at or before) a candidate, so
/// an ordered set is the natural representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueSet {
    values: BTreeSet<u32>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: u32) {
        self.values.insert(value);
    }

    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Smallest accepted value greater than or equal to `value`.
    pub fn next_from(&self, value: u32) -> Option<u32> {
        self.values.range(value..).next().copied()
    }

    /// Largest accepted value less than or equal to `value`.
    pub fn prev_from(&self, value: u32) -> Option<u32> {
        self.values.range(..=value).next_back().copied()
    }

    pub fn min(&self) -> Option<u32> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<u32> {
        self.values.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }
}

/// Parses a single numeric or named value within `field`'s domain.
///
/// Day-of-week accepts `0` as a Sunday alias and normalizes it to `1`; `7`
/// keeps its place as Saturday.
pub(crate) fn parse_value(field: CronField, token: &str) -> Result<u32, CronError> {
    if let Ok(num) = token.parse::<u32>() {
        return check_bounds(field, num);
    }
    match field {
        CronField::Month => MonthName::from_str(token)
            .map(|m| m as u32)
            .map_err(|_| CronError::InvalidNamedValue {
                field,
                token: token.to_string(),
            }),
        CronField::DayOfWeek => DayName::from_str(token)
            .map(|d| d as u32)
            .map_err(|_| CronError::InvalidNamedValue {
                field,
                token: token.to_string(),
            }),
        _ => Err(illegal_char(field, token)),
    }
}

fn check_bounds(field: CronField, value: u32) -> Result<u32, CronError> {
    // Sunday aliasing happens before the bounds check so that `0` is legal.
    if field == CronField::DayOfWeek && value == 0 {
        return Ok(1);
    }
    let (min, max) = field.bounds();
    if value < min || value > max {
        return Err(CronError::ValueOutOfBounds { field, value });
    }
    Ok(value)
}

fn illegal_char(field: CronField, token: &str) -> CronError {
    let ch = token
        .chars()
        .find(|c| !c.is_ascii_digit())
        .unwrap_or('-');
    CronError::IllegalCharacter { field, ch }
}

/// Expands a field sub-expression of `field` into `set`.
///
/// Handles `*`, plain values, names, `a-b` ranges (wrapping when `a > b`),
/// `a/n`, `*/n`, `/n`, `a-b/n` steps, and comma-joined lists of any of
/// these. Special day tokens (`L`, `W`) are recognized by the parser before
/// this is called.
pub(crate) fn expand_into(
    field: CronField,
    set: &mut ValueSet,
    token: &str,
) -> Result<(), CronError> {
    if token.contains(',') {
        for part in token.split(',') {
            let part = part.trim();
            if !part.is_empty() {
                expand_into(field, set, part)?;
            }
        }
        return Ok(());
    }

    let (min, max) = field.bounds();

    if token == "*" {
        for value in min..=max {
            set.insert(value);
        }
        return Ok(());
    }

    if let Some(slash) = token.find('/') {
        let (range_part, step_part) = (&token[..slash], &token[slash + 1..]);
        let step = step_part
            .parse::<u32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or(CronError::MissingIncrementValue)?;
        if let Some(modulus) = field.modulus() {
            if step >= modulus {
                return Err(CronError::InvalidIncrement {
                    limit: modulus,
                    value: step,
                });
            }
        }
        // A blank or `*` start runs from the field minimum, Quartz-style.
        let (start, end, wraps) = if range_part.is_empty() || range_part == "*" {
            (min, max, false)
        } else if let Some(dash) = range_part.find('-') {
            let a = parse_value(field, &range_part[..dash])?;
            let b = parse_value(field, &range_part[dash + 1..])?;
            (a, b, a > b)
        } else {
            (parse_value(field, range_part)?, max, false)
        };
        for value in stepped(start, end, wraps, min, max, step) {
            set.insert(value);
        }
        return Ok(());
    }

    if let Some(dash) = token.find('-') {
        let a = parse_value(field, &token[..dash])?;
        let b = parse_value(field, &token[dash + 1..])?;
        if a <= b {
            for value in a..=b {
                set.insert(value);
            }
        } else {
            // Descending ranges wrap around the field's domain.
            for value in (a..=max).chain(min..=b) {
                set.insert(value);
            }
        }
        return Ok(());
    }

    set.insert(parse_value(field, token)?);
    Ok(())
}

// Every step-th value of the (possibly wrapping) range, starting at `start`.
fn stepped(start: u32, end: u32, wraps: bool, min: u32, max: u32, step: u32) -> Vec<u32> {
    let ordered: Vec<u32> = if wraps {
        (start..=max).chain(min..=end).collect()
    } else {
        (start..=end).collect()
    };
    ordered.into_iter().step_by(step as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(field: CronField, token: &str) -> Result<ValueSet, CronError> {
        let mut set = ValueSet::new();
        expand_into(field, &mut set, token)?;
        Ok(set)
    }

    #[test]
    fn test_wildcard_fills_domain() {
        let set = expand(CronField::Hours, "*").unwrap();
        assert_eq!(set.len(), 24);
        assert!(set.contains(0) && set.contains(23));
    }

    #[test]
    fn test_plain_number_and_bounds() {
        let set = expand(CronField::Minutes, "42").unwrap();
        assert!(set.contains(42));
        assert_eq!(
            expand(CronField::Minutes, "60").unwrap_err(),
            CronError::ValueOutOfBounds {
                field: CronField::Minutes,
                value: 60
            }
        );
    }

    #[test]
    fn test_comma_list_expansion() {
        let set = expand(CronField::Hours, "1,3,5").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
        // Mixed list members each expand on their own.
        let set = expand(CronField::Minutes, "5,10-12,40/10").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![5, 10, 11, 12, 40, 50]);
    }

    #[test]
    fn test_range_expands_inclusive() {
        let set = expand(CronField::Seconds, "10-15").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_descending_range_wraps() {
        let set = expand(CronField::Hours, "21-3").unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 21, 22, 23]
        );
    }

    #[test]
    fn test_step_from_value_runs_to_max() {
        let set = expand(CronField::Minutes, "5/15").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![5, 20, 35, 50]);
    }

    #[test]
    fn test_step_with_blank_start_runs_from_min() {
        let set = expand(CronField::Minutes, "/20").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 20, 40]);
    }

    #[test]
    fn test_step_over_wrapping_range() {
        let set = expand(CronField::Hours, "22-2/2").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2, 22]);
    }

    #[test]
    fn test_increment_at_modulus_is_rejected() {
        assert_eq!(
            expand(CronField::Seconds, "0/60").unwrap_err(),
            CronError::InvalidIncrement {
                limit: 60,
                value: 60
            }
        );
        assert_eq!(
            expand(CronField::DayOfWeek, "1/7").unwrap_err(),
            CronError::InvalidIncrement { limit: 7, value: 7 }
        );
    }

    #[test]
    fn test_missing_increment_value() {
        assert_eq!(
            expand(CronField::Minutes, "0/").unwrap_err(),
            CronError::MissingIncrementValue
        );
        assert_eq!(
            expand(CronField::Minutes, "/").unwrap_err(),
            CronError::MissingIncrementValue
        );
    }

    #[test]
    fn test_month_names_full_and_abbreviated() {
        assert_eq!(parse_value(CronField::Month, "FEB").unwrap(), 2);
        assert_eq!(parse_value(CronField::Month, "february").unwrap(), 2);
        assert_eq!(
            parse_value(CronField::Month, "FOO").unwrap_err(),
            CronError::InvalidNamedValue {
                field: CronField::Month,
                token: "FOO".to_string()
            }
        );
    }

    #[test]
    fn test_day_names_map_to_quartz_codes() {
        assert_eq!(parse_value(CronField::DayOfWeek, "SUN").unwrap(), 1);
        assert_eq!(parse_value(CronField::DayOfWeek, "SAT").unwrap(), 7);
    }

    #[test]
    fn test_zero_aliases_sunday() {
        assert_eq!(parse_value(CronField::DayOfWeek, "0").unwrap(), 1);
        assert_eq!(parse_value(CronField::DayOfWeek, "8").unwrap_err(),
            CronError::ValueOutOfBounds { field: CronField::DayOfWeek, value: 8 });
    }

    #[test]
    fn test_weekday_range_across_sunday_alias() {
        // 6-0 normalizes the end to Sunday (1) and wraps: FRI, SAT, SUN.
        let set = expand(CronField::DayOfWeek, "6-0").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 6, 7]);
    }

    #[test]
    fn test_named_range() {
        let set = expand(CronField::Month, "FEB-MAR").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_value_set_queries() {
        let set = expand(CronField::Minutes, "10,20,30").unwrap();
        assert_eq!(set.next_from(11), Some(20));
        assert_eq!(set.next_from(30), Some(30));
        assert_eq!(set.next_from(31), None);
        assert_eq!(set.prev_from(29), Some(20));
        assert_eq!(set.prev_from(9), None);
        assert_eq!(set.min(), Some(10));
        assert_eq!(set.max(), Some(30));
    }
}
