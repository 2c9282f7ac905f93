//! Forced edit-mode exit after paste.
//!
//! The underlying widget's stop-editing call is not guaranteed to take
//! effect on the first attempt, so a paste signal opens a short pending
//! window; once the grid reports paste-end (or starts editing) inside that
//! window, stop-editing is retried a bounded number of times.

use crate::config::InteractionConfig;
use crate::host::StopEditOutcome;

/// What the caller should do after feeding an event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteExitStep {
    /// Nothing to schedule.
    None,
    /// Start (or restart) the pending-reset timer with this delay.
    StartResetTimer(u32),
    /// Schedule an immediate stop-editing attempt.
    AttemptExit,
    /// Retry stop-editing after this delay.
    RetryAfter(u32),
}

#[derive(Debug)]
pub struct PasteExitController {
    reset_ms: u32,
    retry_ms: u32,
    max_attempts: u8,
    pending: bool,
    /// A follow-up arrived and exit attempts are in flight.
    in_cycle: bool,
    attempts: u8,
}

impl PasteExitController {
    pub fn new(cfg: &InteractionConfig) -> Self {
        Self {
            reset_ms: cfg.paste_reset_ms,
            retry_ms: cfg.paste_retry_ms,
            max_attempts: cfg.paste_max_attempts,
            pending: false,
            in_cycle: false,
            attempts: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// A paste signal arrived (key combo or native paste event). Supersedes
    /// any running retry cycle: the new pending window gets a fresh count.
    pub fn on_paste_signal(&mut self) -> PasteExitStep {
        self.pending = true;
        self.in_cycle = false;
        self.attempts = 0;
        PasteExitStep::StartResetTimer(self.reset_ms)
    }

    /// The reset timer fired with no follow-up event. A stale fire while a
    /// retry cycle is running must not reset the per-cycle attempt count.
    pub fn on_reset_timer(&mut self) {
        if self.in_cycle {
            return;
        }
        self.pending = false;
        self.attempts = 0;
    }

    /// The grid reported paste-end, or editing started while pending.
    pub fn on_follow_up(&mut self) -> PasteExitStep {
        if self.pending {
            self.pending = false;
            self.in_cycle = true;
            PasteExitStep::AttemptExit
        } else {
            PasteExitStep::None
        }
    }

    /// Feed the outcome of one stop-editing attempt.
    pub fn on_attempt(&mut self, outcome: StopEditOutcome) -> PasteExitStep {
        self.attempts = self.attempts.saturating_add(1);
        match outcome {
            StopEditOutcome::Stopped | StopEditOutcome::NoApi => {
                self.end_cycle();
                PasteExitStep::None
            }
            StopEditOutcome::Rejected => {
                if self.attempts >= self.max_attempts {
                    log::debug!(
                        "paste-exit gave up after {} attempts",
                        self.attempts
                    );
                    self.end_cycle();
                    PasteExitStep::None
                } else {
                    PasteExitStep::RetryAfter(self.retry_ms)
                }
            }
        }
    }

    fn end_cycle(&mut self) {
        self.in_cycle = false;
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    fn controller() -> PasteExitController {
        PasteExitController::new(&InteractionConfig::default())
    }

    #[test]
    fn lone_paste_signal_resets() {
        let mut pe = controller();
        assert_eq!(pe.on_paste_signal(), PasteExitStep::StartResetTimer(250));
        assert!(pe.is_pending());
        pe.on_reset_timer();
        assert!(!pe.is_pending());
        assert_eq!(pe.on_follow_up(), PasteExitStep::None);
    }

    #[test]
    fn retry_limit_is_six() {
        let mut pe = controller();
        pe.on_paste_signal();
        assert_eq!(pe.on_follow_up(), PasteExitStep::AttemptExit);
        let mut attempts = 0;
        loop {
            attempts += 1;
            match pe.on_attempt(StopEditOutcome::Rejected) {
                PasteExitStep::RetryAfter(ms) => assert_eq!(ms, 24),
                PasteExitStep::None => break,
                other => panic!("unexpected step {other:?}"),
            }
        }
        assert_eq!(attempts, 6);
        // Counter resets for the next cycle.
        pe.on_paste_signal();
        pe.on_follow_up();
        assert_eq!(
            pe.on_attempt(StopEditOutcome::Rejected),
            PasteExitStep::RetryAfter(24)
        );
    }

    #[test]
    fn stale_reset_fire_does_not_extend_a_running_cycle() {
        let mut pe = controller();
        pe.on_paste_signal();
        assert_eq!(pe.on_follow_up(), PasteExitStep::AttemptExit);
        let mut attempts = 2;
        pe.on_attempt(StopEditOutcome::Rejected);
        pe.on_attempt(StopEditOutcome::Rejected);
        // The 250ms timer fires mid-cycle; the count must survive.
        pe.on_reset_timer();
        loop {
            attempts += 1;
            if pe.on_attempt(StopEditOutcome::Rejected) == PasteExitStep::None {
                break;
            }
        }
        assert_eq!(attempts, 6);
    }

    #[test]
    fn no_api_finishes_immediately() {
        let mut pe = controller();
        pe.on_paste_signal();
        pe.on_follow_up();
        assert_eq!(pe.on_attempt(StopEditOutcome::NoApi), PasteExitStep::None);
    }
}
