//! Holds every configured transceiver session and picks a connected one for
//! submission.

use std::sync::Arc;

use crate::error::GatewayError;
use crate::session::{SessionStatus, TransceiverSession};

/// Holds every configured session; `pick()` picks the first one currently
/// `Connected`. Membership is fixed at startup so a plain `Vec` needs no
/// locking — only each session's atomic status is read.
pub struct SessionPool {
    sessions: Vec<Arc<TransceiverSession>>,
}

impl SessionPool {
    pub fn new(sessions: Vec<Arc<TransceiverSession>>) -> Self {
        Self { sessions }
    }

    /// Starts every session's bind + receive loop (non-blocking).
    pub fn start_all(&self) {
        for session in &self.sessions {
            session.start();
        }
    }

    /// First-match selection: returns the first session currently
    /// `Connected`, not a round-robin rotation.
    pub fn pick(&self) -> Result<Arc<TransceiverSession>, GatewayError> {
        self.sessions
            .iter()
            .find(|s| s.status() == SessionStatus::Connected)
            .cloned()
            .ok_or(GatewayError::NoTransceiversConnected)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
