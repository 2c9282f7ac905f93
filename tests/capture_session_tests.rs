//! Capture session and key classification tests: the single-live-session
//! property, token staleness, composition handling, and reason codes.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridcap::capture::{classify, CaptureOutcome, KeyClass, ProxyKey, SessionRegistry};
use gridcap::error::RejectReason;
use test_case::test_case;

#[test]
fn arming_displaces_the_previous_session() {
    let mut reg = SessionRegistry::new();
    let (first, displaced) = reg.arm(0, "c0");
    assert!(displaced.is_none());

    let (second, displaced) = reg.arm(3, "c1");
    let displaced = displaced.unwrap();
    assert_eq!(
        displaced.outcome(),
        Some(&CaptureOutcome::Rejected(RejectReason::Rearm))
    );
    assert_eq!(displaced.cell(), (0, "c0"));
    assert_ne!(first, second);
    assert!(reg.is_current(second));
    assert!(!reg.is_current(first));
}

#[test]
fn every_session_terminates_exactly_once() {
    let mut reg = SessionRegistry::new();
    let (token, _) = reg.arm(0, "c0");
    reg.current_mut().unwrap().sync_buffer("ab");

    let resolved = reg.resolve_idle(token).unwrap();
    assert_eq!(
        resolved.outcome(),
        Some(&CaptureOutcome::Text("ab".to_string()))
    );
    // Nothing left to resolve or cancel.
    assert!(reg.resolve_idle(token).is_none());
    assert!(reg.cancel(RejectReason::Cancelled).is_none());
}

#[test]
fn idle_fire_after_composition_start_is_stale() {
    let mut reg = SessionRegistry::new();
    let (token, _) = reg.arm(0, "c0");
    reg.current_mut().unwrap().sync_buffer("n");
    reg.current_mut().unwrap().begin_composition();

    assert!(reg.resolve_idle(token).is_none());
    // The session is still live, awaiting compositionend.
    assert!(reg.is_current(token));

    let done = reg.resolve_composed(token, "に").unwrap();
    assert_eq!(done.outcome(), Some(&CaptureOutcome::Text("に".to_string())));
}

#[test]
fn buffer_sync_replaces_rather_than_appends() {
    let mut reg = SessionRegistry::new();
    let (token, _) = reg.arm(0, "c0");
    let session = reg.current_mut().unwrap();
    session.sync_buffer("a");
    session.sync_buffer("ab");
    session.sync_buffer("abc");
    let resolved = reg.resolve_idle(token).unwrap();
    assert_eq!(
        resolved.outcome(),
        Some(&CaptureOutcome::Text("abc".to_string()))
    );
}

#[test]
fn editing_started_after_resolution_leaves_the_handoff_alone() {
    let mut reg = SessionRegistry::new();
    let (token, _) = reg.arm(2, "c1");
    reg.current_mut().unwrap().sync_buffer("hi");
    let resolved = reg.resolve_idle(token).unwrap();
    assert_eq!(
        resolved.outcome(),
        Some(&CaptureOutcome::Text("hi".to_string()))
    );

    // The grid attaching its editor is the hand-off coming back: there is
    // no session left to reject, and the pending editor fill survives.
    assert!(reg.cancel(RejectReason::EditingStarted).is_none());
    assert!(!RejectReason::EditingStarted.aborts_editor_handoff());
}

#[test]
fn cancel_reasons_are_classified() {
    for reason in [
        RejectReason::Cancelled,
        RejectReason::Rearm,
        RejectReason::EditingStarted,
        RejectReason::FocusCleared,
        RejectReason::CellMissing,
        RejectReason::Destroyed,
        RejectReason::Scroll,
        RejectReason::Resize,
        RejectReason::FocusMove,
    ] {
        assert!(reason.is_expected(), "{reason} should be routine");
    }
    assert!(
        !RejectReason::EditorWaitTimeout.is_expected(),
        "editor never appearing warrants a warning"
    );
}

#[test]
fn reason_codes_are_kebab_case() {
    assert_eq!(RejectReason::EditingStarted.as_str(), "editing-started");
    assert_eq!(RejectReason::FocusMove.as_str(), "focus-move");
    assert_eq!(RejectReason::EditorWaitTimeout.as_str(), "editor-wait-timeout");
}

// --- key classification -----------------------------------------------

#[test_case("ArrowUp", ProxyKey::ArrowUp)]
#[test_case("ArrowDown", ProxyKey::ArrowDown)]
#[test_case("ArrowLeft", ProxyKey::ArrowLeft)]
#[test_case("ArrowRight", ProxyKey::ArrowRight)]
#[test_case("Enter", ProxyKey::Enter)]
#[test_case("Tab", ProxyKey::Tab)]
#[test_case("Delete", ProxyKey::Delete)]
#[test_case("Backspace", ProxyKey::Backspace)]
#[test_case("F2", ProxyKey::EditStart)]
fn named_keys_are_forwarded(key: &str, expected: ProxyKey) {
    assert_eq!(classify(key, false), KeyClass::Forward(expected));
}

#[test]
fn escape_cancels_in_place() {
    assert_eq!(classify("Escape", false), KeyClass::CancelCapture);
}

#[test_case("a")]
#[test_case("Z")]
#[test_case("7")]
#[test_case("ん")]
fn single_characters_pass_through(key: &str) {
    assert_eq!(classify(key, false), KeyClass::Printable);
}

#[test]
fn copy_shortcut_needs_the_modifier() {
    assert_eq!(classify("c", true), KeyClass::Forward(ProxyKey::Copy));
    assert_eq!(classify("c", false), KeyClass::Printable);
    // Other chords are left for the browser.
    assert_eq!(classify("a", true), KeyClass::Ignore);
}

#[test]
fn unknown_named_keys_are_ignored() {
    assert_eq!(classify("PageDown", false), KeyClass::Ignore);
    assert_eq!(classify("Shift", false), KeyClass::Ignore);
}
