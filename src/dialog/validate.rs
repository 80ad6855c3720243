//! Input rules for each dialog step.
//!
//! Validators are pure: they either return the parsed value or the reason
//! the input was rejected, and never touch the context themselves.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::context::EventType;
use crate::error::ValidationError;

pub const MAX_QUESTION_CHARS: usize = 500;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_OPTION_CHARS: usize = 100;

/// Callback payload prefix of the event type buttons.
pub const EVENT_TYPE_CALLBACK_PREFIX: &str = "event_type:";
pub const CONFIRM_YES: &str = "confirm:yes";
pub const CONFIRM_NO: &str = "confirm:no";

/// Deadline formats accepted from the administrator, in the display timezone.
const DEADLINE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%d.%m.%Y %H:%M"];

/// Trimmed, non-empty question text.
pub fn question(text: &str) -> Result<String, ValidationError> {
    let question = text.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ValidationError::QuestionTooLong {
            max: MAX_QUESTION_CHARS,
        });
    }
    Ok(question.to_string())
}

/// Event type from a button payload (`event_type:binary`) or typed name.
pub fn event_type(input: &str) -> Result<EventType, ValidationError> {
    let raw = input.trim();
    let name = raw
        .strip_prefix(EVENT_TYPE_CALLBACK_PREFIX)
        .unwrap_or(raw)
        .to_lowercase()
        .replace(['-', ' '], "_");
    EventType::from_str(&name).map_err(|_| ValidationError::UnknownEventType(raw.to_string()))
}

/// One option per line. Blank lines are ignored; options must be distinct
/// regardless of letter case.
pub fn options(text: &str) -> Result<Vec<String>, ValidationError> {
    let options: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(ValidationError::TooFewOptions { min: MIN_OPTIONS });
    }
    if options.len() > MAX_OPTIONS {
        return Err(ValidationError::TooManyOptions { max: MAX_OPTIONS });
    }

    let mut seen = HashSet::new();
    for option in &options {
        if option.chars().count() > MAX_OPTION_CHARS {
            return Err(ValidationError::OptionTooLong {
                max: MAX_OPTION_CHARS,
            });
        }
        if !seen.insert(option.to_lowercase()) {
            return Err(ValidationError::DuplicateOption(option.clone()));
        }
    }
    Ok(options)
}

/// Deadline typed in the display timezone, strictly after `now`.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// times skipped by a DST jump are rejected as unparsable.
pub fn deadline(text: &str, tz: Tz, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    let raw = text.trim();
    let naive = DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| ValidationError::UnparsableDeadline(raw.to_string()))?;

    let deadline = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ValidationError::UnparsableDeadline(raw.to_string()))?
        .with_timezone(&Utc);

    if deadline <= now {
        return Err(ValidationError::DeadlineNotInFuture);
    }
    Ok(deadline)
}

/// `true` for the confirm button, `false` for the cancel button.
pub fn confirmation(data: &str) -> Result<bool, ValidationError> {
    match data {
        CONFIRM_YES => Ok(true),
        CONFIRM_NO => Ok(false),
        other => Err(ValidationError::UnknownConfirmation(other.to_string())),
    }
}
