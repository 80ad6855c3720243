//! Flat string-map encoding of [`EventCreationContext`].
//!
//! The session table stores the context as a `BTreeMap<String, String>` so
//! that the on-disk shape is independent of Rust type layout. The key set is
//! fixed and versioned by the `v` entry; decoding rejects missing keys,
//! unknown keys and malformed values instead of defaulting them.
//!
//! | Key                              | Value                                         |
//! |----------------------------------|-----------------------------------------------|
//! | `v`                              | format version, currently `1`                 |
//! | `question`                       | question text                                 |
//! | `event_type`                     | empty, or `binary` / `multi_option` / `probability` |
//! | `options_count`                  | number of options `N`                         |
//! | `option_0` .. `option_{N-1}`     | option labels in order                        |
//! | `deadline`                       | empty, or RFC 3339 UTC with second precision  |
//! | `group_id`, `chat_id`            | platform identifiers                          |
//! | `last_*_message_id`              | message identifier, `0` for none              |

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::context::{EventCreationContext, EventType};
use crate::error::CodecError;
use crate::types::{ChatId, MessageId};

/// The serialized form of a context.
pub type ContextMap = BTreeMap<String, String>;

/// Current format version written by [`to_map`].
pub const CODEC_VERSION: &str = "1";

const KEY_VERSION: &str = "v";
const KEY_QUESTION: &str = "question";
const KEY_EVENT_TYPE: &str = "event_type";
const KEY_OPTIONS_COUNT: &str = "options_count";
const KEY_OPTION_PREFIX: &str = "option_";
const KEY_DEADLINE: &str = "deadline";
const KEY_GROUP_ID: &str = "group_id";
const KEY_CHAT_ID: &str = "chat_id";
const KEY_LAST_BOT: &str = "last_bot_message_id";
const KEY_LAST_USER: &str = "last_user_message_id";
const KEY_LAST_ERROR: &str = "last_error_message_id";
const KEY_LAST_CONFIRMATION: &str = "last_confirmation_message_id";

/// Keys present in every encoded context besides the `option_*` entries.
const FIXED_KEYS: [&str; 11] = [
    KEY_VERSION,
    KEY_QUESTION,
    KEY_EVENT_TYPE,
    KEY_OPTIONS_COUNT,
    KEY_DEADLINE,
    KEY_GROUP_ID,
    KEY_CHAT_ID,
    KEY_LAST_BOT,
    KEY_LAST_USER,
    KEY_LAST_ERROR,
    KEY_LAST_CONFIRMATION,
];

/// Upper bound accepted for `options_count` when decoding untrusted input.
const MAX_ENCODED_OPTIONS: usize = 1024;

/// Encodes every field of `ctx`.
pub fn to_map(ctx: &EventCreationContext) -> ContextMap {
    let mut map = ContextMap::new();
    map.insert(KEY_VERSION.to_string(), CODEC_VERSION.to_string());
    map.insert(KEY_QUESTION.to_string(), ctx.question.clone());
    map.insert(
        KEY_EVENT_TYPE.to_string(),
        ctx.event_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    );
    map.insert(KEY_OPTIONS_COUNT.to_string(), ctx.options.len().to_string());
    for (index, option) in ctx.options.iter().enumerate() {
        map.insert(format!("{KEY_OPTION_PREFIX}{index}"), option.clone());
    }
    map.insert(
        KEY_DEADLINE.to_string(),
        ctx.deadline
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
    );
    map.insert(KEY_GROUP_ID.to_string(), ctx.group_id.to_string());
    map.insert(KEY_CHAT_ID.to_string(), ctx.chat_id.0.to_string());
    map.insert(KEY_LAST_BOT.to_string(), encode_message_id(ctx.last_bot_message_id));
    map.insert(KEY_LAST_USER.to_string(), encode_message_id(ctx.last_user_message_id));
    map.insert(KEY_LAST_ERROR.to_string(), encode_message_id(ctx.last_error_message_id));
    map.insert(
        KEY_LAST_CONFIRMATION.to_string(),
        encode_message_id(ctx.last_confirmation_message_id),
    );
    map
}

/// Decodes a map produced by [`to_map`].
pub fn from_map(map: &ContextMap) -> Result<EventCreationContext, CodecError> {
    let version = required(map, KEY_VERSION)?;
    if version != CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion(version.to_string()));
    }

    let count_raw = required(map, KEY_OPTIONS_COUNT)?;
    let count = count_raw
        .parse::<usize>()
        .ok()
        .filter(|count| *count <= MAX_ENCODED_OPTIONS)
        .ok_or_else(|| CodecError::InvalidOptionCount(count_raw.to_string()))?;

    // Any key outside the fixed set must be one of the announced option slots.
    for key in map.keys() {
        if FIXED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let in_range = key
            .strip_prefix(KEY_OPTION_PREFIX)
            .and_then(parse_canonical_index)
            .is_some_and(|index| index < count);
        if !in_range {
            return Err(CodecError::UnknownKey(key.clone()));
        }
    }

    let options = (0..count)
        .map(|index| required(map, &format!("{KEY_OPTION_PREFIX}{index}")).map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;

    let event_type = match required(map, KEY_EVENT_TYPE)? {
        "" => None,
        raw => Some(
            EventType::from_str(raw).map_err(|_| CodecError::InvalidEventType(raw.to_string()))?,
        ),
    };

    let deadline = match required(map, KEY_DEADLINE)? {
        "" => None,
        raw => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| CodecError::InvalidTimestamp {
                    key: KEY_DEADLINE.to_string(),
                    value: raw.to_string(),
                })?
                .with_timezone(&Utc),
        ),
    };

    Ok(EventCreationContext {
        question: required(map, KEY_QUESTION)?.to_string(),
        event_type,
        options,
        deadline,
        group_id: parse_number(map, KEY_GROUP_ID)?,
        chat_id: ChatId(parse_number(map, KEY_CHAT_ID)?),
        last_bot_message_id: decode_message_id(map, KEY_LAST_BOT)?,
        last_user_message_id: decode_message_id(map, KEY_LAST_USER)?,
        last_error_message_id: decode_message_id(map, KEY_LAST_ERROR)?,
        last_confirmation_message_id: decode_message_id(map, KEY_LAST_CONFIRMATION)?,
    })
}

fn required<'a>(map: &'a ContextMap, key: &str) -> Result<&'a str, CodecError> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| CodecError::MissingKey(key.to_string()))
}

fn parse_number<T: FromStr>(map: &ContextMap, key: &str) -> Result<T, CodecError> {
    let raw = required(map, key)?;
    raw.parse::<T>().map_err(|_| CodecError::InvalidNumber {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Accepts `0`, `1`, `12`, but not `01` or `+1`, so each slot has one spelling.
fn parse_canonical_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

fn encode_message_id(id: Option<MessageId>) -> String {
    id.map_or(0, |id| id.0).to_string()
}

fn decode_message_id(map: &ContextMap, key: &str) -> Result<Option<MessageId>, CodecError> {
    let raw: i32 = parse_number(map, key)?;
    Ok((raw != 0).then_some(MessageId(raw)))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn full_context() -> EventCreationContext {
        EventCreationContext {
            question: "Will it rain in Lisbon on Friday?".to_string(),
            event_type: Some(EventType::MultiOption),
            options: vec![
                "Yes, all day".to_string(),
                "Only, in the morning; maybe".to_string(),
                "option_7".to_string(),
                String::new(),
            ],
            deadline: Some(Utc.with_ymd_and_hms(2031, 5, 17, 18, 30, 0).unwrap()),
            group_id: -100_123_456,
            chat_id: ChatId(987_654),
            last_bot_message_id: Some(MessageId(11)),
            last_user_message_id: None,
            last_error_message_id: Some(MessageId(13)),
            last_confirmation_message_id: None,
        }
    }

    #[test]
    fn populated_context_round_trips() {
        let ctx = full_context();
        assert_eq!(from_map(&to_map(&ctx)).unwrap(), ctx);
    }

    #[test]
    fn fresh_context_round_trips() {
        let ctx = EventCreationContext::new(ChatId(5), 6);
        let map = to_map(&ctx);
        assert_eq!(map["event_type"], "");
        assert_eq!(map["deadline"], "");
        assert_eq!(map["last_bot_message_id"], "0");
        assert_eq!(from_map(&map).unwrap(), ctx);
    }

    #[test]
    fn sub_second_deadline_is_truncated_within_a_second() {
        let mut ctx = full_context();
        let precise = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap()
            + Duration::milliseconds(750);
        ctx.deadline = Some(precise);

        let decoded = from_map(&to_map(&ctx)).unwrap();
        let drift = precise - decoded.deadline.unwrap();
        assert!(drift >= Duration::zero() && drift < Duration::seconds(1));
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut map = to_map(&full_context());
        map.remove("chat_id");
        assert_eq!(
            from_map(&map),
            Err(CodecError::MissingKey("chat_id".to_string()))
        );
    }

    #[test]
    fn missing_option_slot_is_rejected() {
        let mut map = to_map(&full_context());
        map.remove("option_2");
        assert_eq!(
            from_map(&map),
            Err(CodecError::MissingKey("option_2".to_string()))
        );
    }

    #[test]
    fn unknown_and_out_of_range_keys_are_rejected() {
        let mut map = to_map(&full_context());
        map.insert("colour".to_string(), "blue".to_string());
        assert_eq!(from_map(&map), Err(CodecError::UnknownKey("colour".to_string())));

        let mut map = to_map(&full_context());
        map.insert("option_4".to_string(), "extra".to_string());
        assert_eq!(from_map(&map), Err(CodecError::UnknownKey("option_4".to_string())));

        let mut map = to_map(&full_context());
        map.insert("option_01".to_string(), "alias".to_string());
        assert_eq!(from_map(&map), Err(CodecError::UnknownKey("option_01".to_string())));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut map = to_map(&full_context());
        map.insert("group_id".to_string(), "12abc".to_string());
        assert!(matches!(from_map(&map), Err(CodecError::InvalidNumber { .. })));

        let mut map = to_map(&full_context());
        map.insert("deadline".to_string(), "tomorrow".to_string());
        assert!(matches!(from_map(&map), Err(CodecError::InvalidTimestamp { .. })));

        let mut map = to_map(&full_context());
        map.insert("event_type".to_string(), "lottery".to_string());
        assert_eq!(
            from_map(&map),
            Err(CodecError::InvalidEventType("lottery".to_string()))
        );

        let mut map = to_map(&full_context());
        map.insert("last_error_message_id".to_string(), "99999999999".to_string());
        assert!(matches!(from_map(&map), Err(CodecError::InvalidNumber { .. })));
    }

    #[test]
    fn absurd_option_count_is_rejected_without_allocating() {
        let mut map = to_map(&full_context());
        map.insert("options_count".to_string(), usize::MAX.to_string());
        assert!(matches!(from_map(&map), Err(CodecError::InvalidOptionCount(_))));

        map.insert("options_count".to_string(), "-1".to_string());
        assert!(matches!(from_map(&map), Err(CodecError::InvalidOptionCount(_))));
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut map = to_map(&full_context());
        map.insert("v".to_string(), "2".to_string());
        assert_eq!(
            from_map(&map),
            Err(CodecError::UnsupportedVersion("2".to_string()))
        );
    }
}
