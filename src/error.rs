//! Structured error types for gridcap.
//!
//! Capture-session terminations are not errors: they are modelled as
//! [`RejectReason`] values threaded through session outcomes and swallowed
//! by the controller. `GridCapError` is reserved for genuinely unexpected
//! failures (host capability calls, marshalling).

/// All errors that can occur while driving the grid host.
#[derive(Debug, thiserror::Error)]
pub enum GridCapError {
    /// The grid host adapter is missing a required capability.
    #[error("grid host capability missing: {0}")]
    HostCapability(String),

    /// A call into the grid host failed.
    #[error("grid host call failed: {0}")]
    HostCall(String),

    /// Column or row data could not be interpreted.
    #[error("invalid grid data: {0}")]
    Data(String),

    /// Configuration error at construction time.
    #[error("configuration: {0}")]
    Config(String),

    /// Catch-all for string errors crossing the JS boundary.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridCapError>;

impl From<String> for GridCapError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridCapError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridCapError> for wasm_bindgen::JsValue {
    fn from(e: GridCapError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

/// Why a capture session terminated without producing text.
///
/// Every variant except [`RejectReason::EditorWaitTimeout`] corresponds to a
/// normal lifecycle event and is logged at `debug` only. The timeout variant
/// is recovered by re-arming and logged at `warn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Escape pressed while armed.
    Cancelled,
    /// A newer session displaced this one.
    Rearm,
    /// The grid started its own editor underneath us.
    EditingStarted,
    /// Focus coordinates were cleared before arming completed.
    FocusCleared,
    /// The DOM cell region for the coordinates could not be located.
    CellMissing,
    /// The owning proxy was destroyed.
    Destroyed,
    /// Viewport scrolled; the armed position is stale.
    Scroll,
    /// Viewport resized; the armed position is stale.
    Resize,
    /// Focus moved by keyboard navigation.
    FocusMove,
    /// The real cell editor never appeared within the bounded wait.
    EditorWaitTimeout,
}

impl RejectReason {
    /// Stable string code, used in logs and across the JS boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Rearm => "rearm",
            Self::EditingStarted => "editing-started",
            Self::FocusCleared => "focus-cleared",
            Self::CellMissing => "cell-missing",
            Self::Destroyed => "destroyed",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::FocusMove => "focus-move",
            Self::EditorWaitTimeout => "editor-wait-timeout",
        }
    }

    /// True for reasons that are part of the normal capture lifecycle.
    ///
    /// Expected rejections are swallowed without user-visible error; the
    /// editor-wait timeout is recovered by re-arming instead.
    pub fn is_expected(self) -> bool {
        !matches!(self, Self::EditorWaitTimeout)
    }

    /// True for reasons that also abandon an in-flight editor hand-off,
    /// the bounded wait that writes captured text into the real editor.
    ///
    /// Lifecycle rejections arriving after a capture resolved must leave
    /// the hand-off running. In particular the grid reporting
    /// editing-started is how a resolved capture's `start_editing` call
    /// comes back, and cancelling the wait on it would drop the text.
    pub fn aborts_editor_handoff(self) -> bool {
        matches!(self, Self::Destroyed | Self::Cancelled)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_reasons_abandon_the_editor_handoff() {
        for reason in [
            RejectReason::EditingStarted,
            RejectReason::Scroll,
            RejectReason::Resize,
            RejectReason::FocusMove,
            RejectReason::Rearm,
        ] {
            assert!(!reason.aborts_editor_handoff(), "{reason}");
        }
        assert!(RejectReason::Destroyed.aborts_editor_handoff());
        assert!(RejectReason::Cancelled.aborts_editor_handoff());
    }
}
