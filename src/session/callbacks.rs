use std::fmt;
use std::sync::Arc;

use crate::protocol::{FinalTranscript, StatusUpdate};

type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
type FinalCallback = Arc<dyn Fn(&FinalTranscript) + Send + Sync>;
type StatusCallback = Arc<dyn Fn(&StatusUpdate) + Send + Sync>;
type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Event listeners registered on a session
///
/// Built with the `on_*` methods and installed with
/// `TurnSession::set_callbacks`; unset listeners are skipped.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub(crate) partial: Option<TextCallback>,
    pub(crate) final_result: Option<FinalCallback>,
    pub(crate) status: Option<StatusCallback>,
    pub(crate) error: Option<TextCallback>,
    pub(crate) close: Option<CloseCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interim transcript text
    pub fn on_partial(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.partial = Some(Arc::new(f));
        self
    }

    /// Finalized transcript and translation
    pub fn on_final(mut self, f: impl Fn(&FinalTranscript) + Send + Sync + 'static) -> Self {
        self.final_result = Some(Arc::new(f));
        self
    }

    /// Server status updates plus local `listening` / `paused`
    pub fn on_status(mut self, f: impl Fn(&StatusUpdate) + Send + Sync + 'static) -> Self {
        self.status = Some(Arc::new(f));
        self
    }

    /// Server error text (verbatim) or a generic transport error
    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(f));
        self
    }

    /// The session's connection ended
    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("partial", &self.partial.is_some())
            .field("final", &self.final_result.is_some())
            .field("status", &self.status.is_some())
            .field("error", &self.error.is_some())
            .field("close", &self.close.is_some())
            .finish()
    }
}

/// Something to tell the listeners, collected under the state lock and
/// delivered after it is released
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Status(StatusUpdate),
    Partial(String),
    Final(FinalTranscript),
    Error(String),
    Closed,
}

impl Notification {
    pub(crate) fn deliver(&self, callbacks: &Callbacks) {
        match self {
            Notification::Status(update) => {
                if let Some(cb) = &callbacks.status {
                    cb(update);
                }
            }
            Notification::Partial(text) => {
                if let Some(cb) = &callbacks.partial {
                    cb(text);
                }
            }
            Notification::Final(result) => {
                if let Some(cb) = &callbacks.final_result {
                    cb(result);
                }
            }
            Notification::Error(message) => {
                if let Some(cb) = &callbacks.error {
                    cb(message);
                }
            }
            Notification::Closed => {
                if let Some(cb) = &callbacks.close {
                    cb();
                }
            }
        }
    }
}
