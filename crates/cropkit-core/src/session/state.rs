//! Session lifecycle as an explicit state machine.
//!
//! ```text
//! Idle -> FileSelected -> Editing -> Processing -> Uploaded
//!                     \_____________/          \-> Failed -> Editing (retry)
//!                      (no editor)                  Failed -> Processing (re-upload)
//! ```
//!
//! Any state except `Processing` can be cancelled back to `Idle`, and a new
//! file can be selected from any state except `Processing`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    FileSelected,
    Editing,
    Processing,
    Uploaded,
    Failed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected => "fileSelected",
            SessionState::Editing => "editing",
            SessionState::Processing => "processing",
            SessionState::Uploaded => "uploaded",
            SessionState::Failed => "failed",
        }
    }

    /// True when an upload call is outstanding.
    pub fn is_busy(self) -> bool {
        self == SessionState::Processing
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// A file passed validation and was decoded.
    FileAccepted,
    /// The target uses the editor.
    EditorOpened,
    /// The target skips the editor; upload the full image.
    EditorSkipped,
    Commit,
    UploadSucceeded,
    /// Render, encode, or storage failure.
    ProcessingFailed,
    /// Go back to the editor after a failure.
    Retry,
    Cancel,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::FileAccepted => "select a file",
            SessionEvent::EditorOpened => "open the editor",
            SessionEvent::EditorSkipped => "skip the editor",
            SessionEvent::Commit => "commit",
            SessionEvent::UploadSucceeded => "complete an upload",
            SessionEvent::ProcessingFailed => "fail an upload",
            SessionEvent::Retry => "retry",
            SessionEvent::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Errors for operations that do not fit the current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {event} while the session is {state}")]
    InvalidTransition {
        state: SessionState,
        event: SessionEvent,
    },

    #[error("An upload is already in progress")]
    UploadInFlight,

    #[error("No image is being edited (session is {state})")]
    NotEditing { state: SessionState },
}

/// The state reached from `state` on `event`, or `None` if not permitted.
///
/// `Commit` while `Processing` maps to `Processing`: a second commit is a
/// no-op rather than an error.
pub fn transition(state: SessionState, event: SessionEvent) -> Option<SessionState> {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Processing, E::Commit) => Some(S::Processing),
        (S::Processing, E::UploadSucceeded) => Some(S::Uploaded),
        (S::Processing, E::ProcessingFailed) => Some(S::Failed),
        (S::Processing, _) => None,

        (_, E::FileAccepted) => Some(S::FileSelected),
        (_, E::Cancel) => Some(S::Idle),

        (S::FileSelected, E::EditorOpened) => Some(S::Editing),
        (S::FileSelected, E::EditorSkipped) => Some(S::Processing),
        (S::Editing, E::Commit) => Some(S::Processing),
        (S::Failed, E::Commit) => Some(S::Processing),
        (S::Failed, E::Retry) => Some(S::Editing),

        _ => None,
    }
}
