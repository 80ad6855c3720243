//! Lookup of user-facing text.

use std::collections::HashMap;

/// Maps a label key and a locale to display text.
///
/// Returned strings are used as-is. Implementations should fall back to the
/// key itself rather than fail when a translation is missing.
pub trait Localizer: Send + Sync {
    fn text(&self, locale: &str, key: &str) -> String;
}

/// A localizer backed by an in-memory table of `(locale, key) -> text`.
///
/// Missing translations fall back to the key.
#[derive(Debug, Clone, Default)]
pub struct StaticLocalizer {
    entries: HashMap<(String, String), String>,
}

impl StaticLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one translation.
    pub fn with(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.entries.insert((locale.into(), key.into()), text.into());
        self
    }

    /// English texts for every key the dialog uses.
    pub fn english() -> Self {
        ENGLISH
            .iter()
            .fold(Self::new(), |localizer, (key, text)| {
                localizer.with("en", *key, *text)
            })
    }
}

impl Localizer for StaticLocalizer {
    fn text(&self, locale: &str, key: &str) -> String {
        self.entries
            .get(&(locale.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("prompt.question", "Send the question for the new event."),
    ("prompt.event_type", "Choose the event type."),
    ("prompt.options", "Send the options, one per line."),
    ("prompt.deadline", "Send the deadline as YYYY-MM-DD HH:MM."),
    ("prompt.confirm", "Create this event?"),
    ("event_type.binary", "Yes / No"),
    ("event_type.multi_option", "Multiple options"),
    ("event_type.probability", "Probability"),
    ("option.yes", "Yes"),
    ("option.no", "No"),
    ("button.yes", "Create"),
    ("button.no", "Cancel"),
    ("summary.question", "Question"),
    ("summary.event_type", "Type"),
    ("summary.options", "Options"),
    ("summary.deadline", "Deadline"),
    ("summary.event_id", "Event ID"),
    ("summary.publication", "Published"),
    ("dialog.created", "Event created."),
    ("dialog.cancelled", "Event creation cancelled."),
    ("dialog.no_session", "There is no active event creation. Start a new one."),
    ("dialog.session_expired", "Your event creation timed out. Start a new one."),
    ("error.question_empty", "The question cannot be empty."),
    ("error.question_too_long", "The question is too long."),
    ("error.event_type_unknown", "Please choose one of the offered event types."),
    ("error.options_too_few", "Send at least two different options."),
    ("error.options_too_many", "Too many options."),
    ("error.option_duplicate", "Every option must be different."),
    ("error.option_too_long", "One of the options is too long."),
    ("error.deadline_format", "Could not read the deadline. Use YYYY-MM-DD HH:MM."),
    ("error.deadline_past", "The deadline must be in the future."),
    ("error.use_buttons", "Please use the buttons."),
    ("error.expected_text", "Please answer with a text message."),
    ("error.confirmation_unknown", "Please use the buttons."),
    ("error.create_failed", "The event could not be created. Try again."),
];
