//! Capture session state machine.
//!
//! A session is the per-arm-attempt state: the accumulating buffer, the
//! composing flag, and a generation token. Arming always displaces the
//! previous session first, so at most one session per surface is ever live
//! and a stale timer or observer callback can never act on a moved focus
//! target: each callback validates its token against the registry before
//! taking effect.

use crate::error::RejectReason;

/// Generation token returned by every arm call. Resolution and rejection
/// paths check the token is still current before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// How a session ended. Every session terminates exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Finalized text, either composed or from the ASCII fast path.
    Text(String),
    Rejected(RejectReason),
}

/// One arm attempt over a specific cell.
#[derive(Debug)]
pub struct CaptureSession {
    token: SessionToken,
    row: u32,
    col_id: String,
    buffer: String,
    composing: bool,
    outcome: Option<CaptureOutcome>,
}

impl CaptureSession {
    fn new(token: SessionToken, row: u32, col_id: &str) -> Self {
        Self {
            token,
            row,
            col_id: col_id.to_string(),
            buffer: String::new(),
            composing: false,
            outcome: None,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn cell(&self) -> (u32, &str) {
        (self.row, &self.col_id)
    }

    pub fn is_live(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn outcome(&self) -> Option<&CaptureOutcome> {
        self.outcome.as_ref()
    }

    /// Plain keystroke text accumulated while armed.
    pub fn push_text(&mut self, text: &str) {
        if self.is_live() {
            self.buffer.push_str(text);
        }
    }

    /// Replace the buffer with the host input's current value. The host
    /// element is authoritative for plain-text capture.
    pub fn sync_buffer(&mut self, value: &str) {
        if self.is_live() {
            self.buffer.clear();
            self.buffer.push_str(value);
        }
    }

    /// `compositionstart`: suspend the ASCII fast path and buffer until the
    /// composition commits.
    pub fn begin_composition(&mut self) {
        if self.is_live() {
            self.composing = true;
        }
    }

    fn settle(&mut self, outcome: CaptureOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

/// Owns the single live session for one surface and mints tokens.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_token: u64,
    current: Option<CaptureSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session over a cell. Any prior session is rejected with
    /// `Rearm` first and returned so the caller can settle its consumers.
    pub fn arm(&mut self, row: u32, col_id: &str) -> (SessionToken, Option<CaptureSession>) {
        let displaced = self.cancel(RejectReason::Rearm);
        self.next_token += 1;
        let token = SessionToken(self.next_token);
        self.current = Some(CaptureSession::new(token, row, col_id));
        (token, displaced)
    }

    /// Reject and remove the current session, if any.
    pub fn cancel(&mut self, reason: RejectReason) -> Option<CaptureSession> {
        let mut session = self.current.take()?;
        session.settle(CaptureOutcome::Rejected(reason));
        Some(session)
    }

    pub fn current(&self) -> Option<&CaptureSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CaptureSession> {
        self.current.as_mut()
    }

    /// Whether `token` still names the live session.
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.token == token && s.is_live())
    }

    /// ASCII fast path: the idle timer fired with no composition under way.
    /// Resolves with the buffer only if the token is still current.
    pub fn resolve_idle(&mut self, token: SessionToken) -> Option<CaptureSession> {
        if !self.is_current(token) {
            return None;
        }
        if self.current.as_ref().is_some_and(CaptureSession::is_composing) {
            // Composition started after the timer was scheduled; stale fire.
            return None;
        }
        let mut session = self.current.take()?;
        let text = std::mem::take(&mut session.buffer);
        session.settle(CaptureOutcome::Text(text));
        Some(session)
    }

    /// `compositionend`: resolve with the committed text.
    pub fn resolve_composed(&mut self, token: SessionToken, text: &str) -> Option<CaptureSession> {
        if !self.is_current(token) {
            return None;
        }
        let mut session = self.current.take()?;
        session.composing = false;
        session.settle(CaptureOutcome::Text(text.to_string()));
        Some(session)
    }
}
