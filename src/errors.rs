use crate::field::CronField;

/// Represents errors that can occur while parsing a cron expression.
///
/// `CronError` is raised at parse time only. Once an expression has been
/// parsed successfully, every query operation on it is infallible; the
/// absence of a matching fire time is an ordinary `None`, not an error.
///
/// The `Display` output of each variant follows the wording established by
/// the Quartz scheduler, so callers matching on message text keep working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    /// The expression did not contain six or seven whitespace-separated
    /// fields.
    WrongFieldCount { found: usize },

    /// A field contains a character that is not legal at that position.
    ///
    /// `?` outside of day-of-month/day-of-week is reported through this
    /// variant as well, with the dedicated Quartz wording.
    IllegalCharacter { field: CronField, ch: char },

    /// A month or day-of-week name could not be resolved.
    InvalidNamedValue { field: CronField, token: String },

    /// A step increment equals or exceeds the field's modulus.
    InvalidIncrement { limit: u32, value: u32 },

    /// A `/` was not followed by a positive integer.
    MissingIncrementValue,

    /// Both day-of-month and day-of-week were constrained; one of the two
    /// must be `?`.
    AmbiguousDayConstraint,

    /// `L` in the day-of-week field was combined with other values.
    UnsupportedLCombination,

    /// `nW` was given a day number larger than 31.
    NearestWeekdayOutOfRange { value: u32 },

    /// `L-n` was given an offset larger than 30.
    LastDayOffsetOutOfRange { value: u32 },

    /// A numeric value lies outside the field's domain.
    ValueOutOfBounds { field: CronField, value: u32 },

    /// A field expanded to an empty set of values.
    EmptyExpansion { field: CronField },
}

impl std::fmt::Display for CronError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CronError::WrongFieldCount { found } => {
                if *found > 7 {
                    write!(f, "Cron expression contains too many terms: {found}")
                } else {
                    write!(f, "Cron expression contains too few terms: {found}")
                }
            }
            CronError::IllegalCharacter { field, ch } => {
                if *ch == '?' {
                    write!(f, "'?' can only be specified for Day-of-Month or Day-of-Week.")
                } else {
                    write!(f, "Illegal character '{ch}' in the {field} field")
                }
            }
            CronError::InvalidNamedValue { field, token } => {
                write!(f, "Invalid {field} value: '{token}'")
            }
            CronError::InvalidIncrement { limit, value } => {
                write!(f, "Increment >= {limit} : {value}")
            }
            CronError::MissingIncrementValue => {
                write!(f, "'/' must be followed by an integer.")
            }
            CronError::AmbiguousDayConstraint => write!(
                f,
                "Support for specifying both a day-of-week AND a day-of-month parameter is not implemented."
            ),
            CronError::UnsupportedLCombination => write!(
                f,
                "Support for specifying 'L' with other days of the week is not implemented"
            ),
            CronError::NearestWeekdayOutOfRange { value } => write!(
                f,
                "The 'W' option does not make sense with values larger than 31 : {value}"
            ),
            CronError::LastDayOffsetOutOfRange { value } => {
                write!(f, "Offset from last day must be <= 30 : {value}")
            }
            CronError::ValueOutOfBounds { field, value } => {
                let bounds = match field {
                    CronField::Seconds | CronField::Minutes => {
                        "Minute and Second values must be between 0 and 59"
                    }
                    CronField::Hours => "Hour values must be between 0 and 23",
                    CronField::DayOfMonth => "Day of month values must be between 1 and 31",
                    CronField::Month => "Month values must be between 1 and 12",
                    CronField::DayOfWeek => "Day-of-Week values must be between 1 and 7",
                    CronField::Year => "Year values must be between 1970 and 2199",
                };
                write!(f, "{bounds} : {value}")
            }
            CronError::EmptyExpansion { field } => {
                write!(f, "The {field} field expands to an empty set of values")
            }
        }
    }
}

impl std::error::Error for CronError {}
