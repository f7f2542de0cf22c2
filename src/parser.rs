//! Parser for Quartz-style cron expressions.
//!
//! An expression consists of six or seven whitespace-separated fields:
//!
//! ```text
//! seconds minutes hours day-of-month month day-of-week [year]
//! ```
//!
//! Each field is split on commas and every sub-token is expanded through the
//! value-set builder in [`field`](crate::field), except the two day fields,
//! which additionally recognize the `L` and `W` forms. Exactly one of
//! day-of-month and day-of-week must be `?`; the other governs day matching.
//!
//! Parsing is all-or-nothing: any malformed field rejects the whole
//! expression with a typed [`CronError`], and a successfully built
//! [`ScheduleDescriptor`] is internally consistent, making every later query
//! infallible.

use crate::descriptor::{DayGovernor, DayOfMonth, DayOfWeek, DomSpecial, ScheduleDescriptor};
use crate::errors::CronError;
use crate::field::{self, CronField, ValueSet};

pub(crate) fn parse(expression: &str) -> Result<ScheduleDescriptor, CronError> {
    let canonical = expression.trim().to_uppercase();
    let fields: Vec<&str> = canonical.split_whitespace().collect();

    if !(6..=7).contains(&fields.len()) {
        return Err(CronError::WrongFieldCount {
            found: fields.len(),
        });
    }

    check_legal_characters(&fields)?;

    let dom_is_question = fields[3] == "?";
    let dow_is_question = fields[5] == "?";
    // Quartz requires the literal `?` in exactly one of the two day fields;
    // even a `*` in both is rejected.
    if dom_is_question == dow_is_question {
        return Err(CronError::AmbiguousDayConstraint);
    }

    let seconds = parse_simple(CronField::Seconds, fields[0])?;
    let minutes = parse_simple(CronField::Minutes, fields[1])?;
    let hours = parse_simple(CronField::Hours, fields[2])?;
    let days_of_month = parse_day_of_month(fields[3])?;
    let months = parse_simple(CronField::Month, fields[4])?;
    let days_of_week = parse_day_of_week(fields[5])?;
    let years = match fields.get(6) {
        None => None,
        Some(&"*") => None,
        Some(text) => Some(parse_simple(CronField::Year, text)?),
    };

    Ok(ScheduleDescriptor {
        seconds,
        minutes,
        hours,
        days_of_month,
        months,
        days_of_week,
        years,
        day_governor: if dom_is_question {
            DayGovernor::DayOfWeek
        } else {
            DayGovernor::DayOfMonth
        },
        expression: fields.join(" "),
    })
}

// Per-field sets of legal characters. Name letters are only legal where
// names are (month, day-of-week); `W` only in day-of-month; `?` only in the
// day fields. `#` is not part of this grammar anywhere.
fn check_legal_characters(fields: &[&str]) -> Result<(), CronError> {
    const FIELD_ORDER: [CronField; 7] = [
        CronField::Seconds,
        CronField::Minutes,
        CronField::Hours,
        CronField::DayOfMonth,
        CronField::Month,
        CronField::DayOfWeek,
        CronField::Year,
    ];

    for (text, &cron_field) in fields.iter().zip(FIELD_ORDER.iter()) {
        for ch in text.chars() {
            let legal = ch.is_ascii_digit()
                || matches!(ch, '*' | ',' | '-' | '/')
                || match cron_field {
                    CronField::DayOfMonth => matches!(ch, 'L' | 'W' | '?'),
                    CronField::Month => ch.is_ascii_alphabetic(),
                    CronField::DayOfWeek => ch.is_ascii_alphabetic() || ch == '?',
                    _ => false,
                };
            if !legal {
                return Err(CronError::IllegalCharacter {
                    field: cron_field,
                    ch,
                });
            }
        }
        // `?` stands alone; trailing characters are not allowed.
        if text.contains('?') && *text != "?" {
            let ch = text.chars().find(|&c| c != '?').unwrap_or('?');
            return Err(CronError::IllegalCharacter {
                field: cron_field,
                ch,
            });
        }
    }
    Ok(())
}

/// Expands a field with no special tokens into its value set.
fn parse_simple(cron_field: CronField, text: &str) -> Result<ValueSet, CronError> {
    let mut set = ValueSet::new();
    field::expand_into(cron_field, &mut set, text)?;
    if set.is_empty() {
        return Err(CronError::EmptyExpansion { field: cron_field });
    }
    Ok(set)
}

fn parse_day_of_month(text: &str) -> Result<DayOfMonth, CronError> {
    if text == "*" || text == "?" {
        let mut values = ValueSet::new();
        field::expand_into(CronField::DayOfMonth, &mut values, "*")?;
        return Ok(DayOfMonth {
            values,
            specials: Vec::new(),
            wildcard: true,
        });
    }

    let mut values = ValueSet::new();
    let mut specials = Vec::new();
    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(special) = parse_dom_special(token)? {
            specials.push(special);
        } else {
            field::expand_into(CronField::DayOfMonth, &mut values, token)?;
        }
    }
    if values.is_empty() && specials.is_empty() {
        return Err(CronError::EmptyExpansion {
            field: CronField::DayOfMonth,
        });
    }
    Ok(DayOfMonth {
        values,
        specials,
        wildcard: false,
    })
}

// Recognizes `L`, `LW`, `L-n`, `L-nW` and `nW`; returns `None` for plain
// numeric tokens.
fn parse_dom_special(token: &str) -> Result<Option<DomSpecial>, CronError> {
    match token {
        "L" => {
            return Ok(Some(DomSpecial::Last {
                offset: 0,
                weekday: false,
            }))
        }
        "LW" => {
            return Ok(Some(DomSpecial::Last {
                offset: 0,
                weekday: true,
            }))
        }
        _ => {}
    }

    if let Some(rest) = token.strip_prefix("L-") {
        let (digits, weekday) = match rest.strip_suffix('W') {
            Some(digits) => (digits, true),
            None => (rest, false),
        };
        let offset = digits.parse::<u32>().map_err(|_| CronError::IllegalCharacter {
            field: CronField::DayOfMonth,
            ch: digits.chars().find(|c| !c.is_ascii_digit()).unwrap_or('L'),
        })?;
        if offset > 30 {
            return Err(CronError::LastDayOffsetOutOfRange { value: offset });
        }
        return Ok(Some(DomSpecial::Last { offset, weekday }));
    }

    if let Some(digits) = token.strip_suffix('W') {
        // `W` attaches to a single day number; ranges and steps cannot
        // carry it.
        let day = digits.parse::<u32>().map_err(|_| CronError::IllegalCharacter {
            field: CronField::DayOfMonth,
            ch: 'W',
        })?;
        if day == 0 {
            return Err(CronError::ValueOutOfBounds {
                field: CronField::DayOfMonth,
                value: 0,
            });
        }
        if day > 31 {
            return Err(CronError::NearestWeekdayOutOfRange { value: day });
        }
        return Ok(Some(DomSpecial::NearestWeekday(day)));
    }

    Ok(None)
}

fn parse_day_of_week(text: &str) -> Result<DayOfWeek, CronError> {
    if text == "*" || text == "?" {
        let mut set = ValueSet::new();
        field::expand_into(CronField::DayOfWeek, &mut set, "*")?;
        return Ok(DayOfWeek::Values {
            set,
            wildcard: true,
        });
    }

    let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
    let mut set = ValueSet::new();

    for token in &tokens {
        if token.is_empty() {
            continue;
        }
        if *token == "L" {
            // A lone `L` is plain Saturday; in company it is ambiguous.
            if tokens.len() > 1 {
                return Err(CronError::UnsupportedLCombination);
            }
            set.insert(7);
            continue;
        }
        if let Some(prefix) = token.strip_suffix('L') {
            // A full weekday name also ends the token without being an `L`
            // form, so only treat the suffix as `L` when the prefix itself
            // is a valid single value.
            if let Ok(code) = field::parse_value(CronField::DayOfWeek, prefix) {
                if tokens.len() > 1 {
                    return Err(CronError::UnsupportedLCombination);
                }
                return Ok(DayOfWeek::LastOfMonth(code));
            }
            if prefix.contains('-') || prefix.contains('/') {
                return Err(CronError::UnsupportedLCombination);
            }
        }
        if let Some(prefix) = token.strip_suffix('W') {
            // Nearest-weekday belongs to day-of-month. Only a bare or
            // digit-prefixed W is the operator; weekday names keep their
            // letters.
            if prefix.is_empty() || prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(CronError::IllegalCharacter {
                    field: CronField::DayOfWeek,
                    ch: 'W',
                });
            }
        }
        field::expand_into(CronField::DayOfWeek, &mut set, token)?;
    }

    if set.is_empty() {
        return Err(CronError::EmptyExpansion {
            field: CronField::DayOfWeek,
        });
    }
    Ok(DayOfWeek::Values {
        set,
        wildcard: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_and_seven_field_forms() {
        assert!(parse("0 15 10 * * ?").is_ok());
        assert!(parse("0 15 10 * * ? 2005").is_ok());
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            parse("0 15 10 * * ? 2005 *").unwrap_err(),
            CronError::WrongFieldCount { found: 8 }
        );
        assert_eq!(
            parse("0 15 10 * *").unwrap_err(),
            CronError::WrongFieldCount { found: 5 }
        );
        let msg = parse("0 15 10 * * ? 2005 *").unwrap_err().to_string();
        assert!(msg.contains("too many"));
        let msg = parse("15 10 * * ?").unwrap_err().to_string();
        assert!(msg.contains("too few"));
    }

    #[test]
    fn test_question_mark_required_in_one_day_field() {
        assert_eq!(
            parse("0 0 * * * *").unwrap_err(),
            CronError::AmbiguousDayConstraint
        );
        assert_eq!(
            parse("0 0 * 4 * *").unwrap_err(),
            CronError::AmbiguousDayConstraint
        );
        assert_eq!(
            parse("0 0 * * * 4").unwrap_err(),
            CronError::AmbiguousDayConstraint
        );
        assert_eq!(
            parse("0 0 * ? * ?").unwrap_err(),
            CronError::AmbiguousDayConstraint
        );
    }

    #[test]
    fn test_question_mark_rejected_elsewhere() {
        let err = parse("? 0 0 * * ?").unwrap_err();
        assert_eq!(
            err,
            CronError::IllegalCharacter {
                field: CronField::Seconds,
                ch: '?'
            }
        );
        assert_eq!(
            err.to_string(),
            "'?' can only be specified for Day-of-Month or Day-of-Week."
        );
    }

    #[test]
    fn test_nth_weekday_operator_is_not_supported() {
        assert!(matches!(
            parse("0 0 12 ? * 6#3").unwrap_err(),
            CronError::IllegalCharacter {
                field: CronField::DayOfWeek,
                ch: '#'
            }
        ));
    }

    #[test]
    fn test_day_of_month_specials() {
        let d = parse("0 15 10 L * ?").unwrap();
        assert_eq!(
            d.days_of_month.specials,
            vec![DomSpecial::Last {
                offset: 0,
                weekday: false
            }]
        );

        let d = parse("0 15 10 L-2 * ?").unwrap();
        assert_eq!(
            d.days_of_month.specials,
            vec![DomSpecial::Last {
                offset: 2,
                weekday: false
            }]
        );

        let d = parse("0 15 10 LW * ?").unwrap();
        assert_eq!(
            d.days_of_month.specials,
            vec![DomSpecial::Last {
                offset: 0,
                weekday: true
            }]
        );

        let d = parse("0 15 10 L-5W * ?").unwrap();
        assert_eq!(
            d.days_of_month.specials,
            vec![DomSpecial::Last {
                offset: 5,
                weekday: true
            }]
        );

        let d = parse("0 15 10 2W,16 * ?").unwrap();
        assert_eq!(d.days_of_month.specials, vec![DomSpecial::NearestWeekday(2)]);
        assert!(d.days_of_month.values.contains(16));
    }

    #[test]
    fn test_nearest_weekday_out_of_range() {
        assert_eq!(
            parse("0/5 * * 32W 1 ?").unwrap_err(),
            CronError::NearestWeekdayOutOfRange { value: 32 }
        );
        // Day 0 fails the same way with or without the W.
        assert_eq!(
            parse("0 0 0 0W * ?").unwrap_err(),
            CronError::ValueOutOfBounds {
                field: CronField::DayOfMonth,
                value: 0
            }
        );
        let msg = parse("0/5 * * 32W 1 ?").unwrap_err().to_string();
        assert!(msg.starts_with("The 'W' option does not make sense with values larger than"));
    }

    #[test]
    fn test_last_day_offset_out_of_range() {
        assert_eq!(
            parse("0 0 0 L-31 * ?").unwrap_err(),
            CronError::LastDayOffsetOutOfRange { value: 31 }
        );
    }

    #[test]
    fn test_last_of_weekday_forms() {
        assert_eq!(
            parse("0 43 9 ? * 5L").unwrap().days_of_week,
            DayOfWeek::LastOfMonth(5)
        );
        assert_eq!(
            parse("0 43 9 ? * FRIL").unwrap().days_of_week,
            DayOfWeek::LastOfMonth(6)
        );
        // A lone L is plain Saturday.
        match parse("0 43 9 ? * L").unwrap().days_of_week {
            DayOfWeek::Values { set, wildcard } => {
                assert!(!wildcard);
                assert_eq!(set.iter().collect::<Vec<_>>(), vec![7]);
            }
            other => panic!("unexpected day-of-week: {other:?}"),
        }
    }

    #[test]
    fn test_l_combined_with_other_weekdays_is_rejected() {
        for expr in ["0 43 9 ? * SAT,SUN,L", "0 43 9 ? * 6,7,L", "0 43 9 ? * 5L,2"] {
            assert_eq!(
                parse(expr).unwrap_err(),
                CronError::UnsupportedLCombination,
                "{expr}"
            );
        }
        let msg = parse("0 43 9 ? * SAT,SUN,L").unwrap_err().to_string();
        assert!(msg.starts_with("Support for specifying 'L' with other days of the week"));
    }

    #[test]
    fn test_invalid_month_names() {
        assert_eq!(
            parse("0 * * * FOO ?").unwrap_err(),
            CronError::InvalidNamedValue {
                field: CronField::Month,
                token: "FOO".to_string()
            }
        );
        assert_eq!(
            parse("0 * * * JAN-FOO ?").unwrap_err(),
            CronError::InvalidNamedValue {
                field: CronField::Month,
                token: "FOO".to_string()
            }
        );
        let msg = parse("0 * * * FOO ?").unwrap_err().to_string();
        assert!(msg.starts_with("Invalid Month value:"));
    }

    #[test]
    fn test_year_field_forms() {
        assert!(parse("0 0 0 1 1 ? *").unwrap().years.is_none());
        let d = parse("0 0 0 1 1 ? 2005-2007").unwrap();
        let years = d.years.unwrap();
        assert_eq!(years.iter().collect::<Vec<_>>(), vec![2005, 2006, 2007]);
        assert_eq!(
            parse("0 0 0 1 1 ? 1969").unwrap_err(),
            CronError::ValueOutOfBounds {
                field: CronField::Year,
                value: 1969
            }
        );
    }

    #[test]
    fn test_w_in_day_of_week_is_illegal() {
        assert!(matches!(
            parse("0 0 12 ? * 3W").unwrap_err(),
            CronError::IllegalCharacter {
                field: CronField::DayOfWeek,
                ch: 'W'
            }
        ));
    }

    #[test]
    fn test_canonical_expression_string() {
        let d = parse("  0 15   10 l-2 jan-mar ?  ").unwrap();
        assert_eq!(d.expression_string(), "0 15 10 L-2 JAN-MAR ?");
    }

    #[test]
    fn test_empty_expansion() {
        assert_eq!(
            parse("0 , 0 * * ?").unwrap_err(),
            CronError::EmptyExpansion {
                field: CronField::Minutes
            }
        );
    }
}
