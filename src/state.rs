//! The states an event-creation dialog moves through.

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Persisted position of a dialog.
///
/// Only non-terminal states are ever stored: completing or cancelling a
/// dialog deletes its session. The string form is what lands in the `state`
/// column, so renaming a variant is a storage format change.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum DialogState {
    AskQuestion,
    AskEventType,
    AskOptions,
    AskDeadline,
    Confirm,
}

impl DialogState {
    /// Column value for this state.
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}
