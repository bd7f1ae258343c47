//! Per-image editing session and its lifecycle.

mod editing;
mod preview;
mod state;

pub use editing::EditingSession;
pub use preview::{NoPreview, PreviewError, PreviewHandle, PreviewProvider};
pub use state::{transition, SessionError, SessionEvent, SessionState};
