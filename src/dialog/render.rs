//! Prompt texts, keyboards and event summaries.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use strum::IntoEnumIterator;

use crate::context::{EventCreationContext, EventType};
use crate::dialog::validate::{CONFIRM_NO, CONFIRM_YES, EVENT_TYPE_CALLBACK_PREFIX};
use crate::events::CreatedEvent;
use crate::locale::Localizer;
use crate::transport::{Button, Keyboard};

const DEADLINE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// Deadline shown in the display timezone, e.g. `2030-07-01 18:30 CEST`.
pub fn format_deadline(deadline: DateTime<Utc>, tz: Tz) -> String {
    deadline
        .with_timezone(&tz)
        .format(DEADLINE_DISPLAY_FORMAT)
        .to_string()
}

/// One button per event type.
pub fn event_type_keyboard(localizer: &dyn Localizer, locale: &str) -> Keyboard {
    EventType::iter().fold(Keyboard::default(), |keyboard, event_type| {
        keyboard.row(vec![Button::new(
            localizer.text(locale, event_type.label_key()),
            format!("{EVENT_TYPE_CALLBACK_PREFIX}{}", event_type.as_str()),
        )])
    })
}

/// Create / cancel buttons under the confirmation prompt.
pub fn confirm_keyboard(localizer: &dyn Localizer, locale: &str) -> Keyboard {
    Keyboard::default().row(vec![
        Button::new(localizer.text(locale, "button.yes"), CONFIRM_YES),
        Button::new(localizer.text(locale, "button.no"), CONFIRM_NO),
    ])
}

/// Preview of the pending event: question, type, every option and the
/// deadline converted to `tz`. Fields not collected yet render as `-`.
pub fn render_summary(
    ctx: &EventCreationContext,
    localizer: &dyn Localizer,
    locale: &str,
    tz: Tz,
) -> String {
    let event_type = ctx
        .event_type
        .map(|t| localizer.text(locale, t.label_key()))
        .unwrap_or_else(|| "-".to_string());
    let deadline = ctx
        .deadline
        .map(|d| format_deadline(d, tz))
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("{}: {}", localizer.text(locale, "summary.question"), ctx.question),
        format!("{}: {}", localizer.text(locale, "summary.event_type"), event_type),
        format!("{}:", localizer.text(locale, "summary.options")),
    ];
    lines.extend(
        ctx.options
            .iter()
            .enumerate()
            .map(|(index, option)| format!("{}. {}", index + 1, option)),
    );
    lines.push(format!("{}: {}", localizer.text(locale, "summary.deadline"), deadline));
    lines.join("\n")
}

/// Summary sent after the event was created, with its id and publication
/// reference when one was supplied.
pub fn render_final_summary(
    ctx: &EventCreationContext,
    created: &CreatedEvent,
    localizer: &dyn Localizer,
    locale: &str,
    tz: Tz,
) -> String {
    let mut lines = vec![
        localizer.text(locale, "dialog.created"),
        String::new(),
        render_summary(ctx, localizer, locale, tz),
        format!("{}: {}", localizer.text(locale, "summary.event_id"), created.id),
    ];
    if let Some(reference) = created
        .publication_ref
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        lines.push(format!(
            "{}: {}",
            localizer.text(locale, "summary.publication"),
            reference
        ));
    }
    lines.join("\n")
}
