//! Keystroke classification for the armed capture host.
//!
//! Printable keys pass through untouched so composition and the ASCII fast
//! path see them; non-printable keys are forwarded to the controller's key
//! handler and suppressed in the host element.

/// Non-printable keys the controller cares about while a capture is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Tab,
    Delete,
    Backspace,
    /// Ctrl/Cmd+C.
    Copy,
    /// F2, the explicit edit-start shortcut.
    EditStart,
}

/// What to do with a keystroke received by the capture host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Let the host element receive it (text / composition input).
    Printable,
    /// Forward to the key handler; suppress in the host.
    Forward(ProxyKey),
    /// Escape: cancel the live capture inside the host, never forwarded.
    CancelCapture,
    /// Modifier or unknown function key; ignore entirely.
    Ignore,
}

/// Classify a DOM `KeyboardEvent.key` value.
pub fn classify(key: &str, ctrl_or_meta: bool) -> KeyClass {
    if ctrl_or_meta {
        return match key {
            "c" | "C" => KeyClass::Forward(ProxyKey::Copy),
            // Other chords (paste, select-all) belong to the grid/host.
            _ => KeyClass::Ignore,
        };
    }
    match key {
        "ArrowUp" => KeyClass::Forward(ProxyKey::ArrowUp),
        "ArrowDown" => KeyClass::Forward(ProxyKey::ArrowDown),
        "ArrowLeft" => KeyClass::Forward(ProxyKey::ArrowLeft),
        "ArrowRight" => KeyClass::Forward(ProxyKey::ArrowRight),
        "Enter" => KeyClass::Forward(ProxyKey::Enter),
        "Tab" => KeyClass::Forward(ProxyKey::Tab),
        "Delete" => KeyClass::Forward(ProxyKey::Delete),
        "Backspace" => KeyClass::Forward(ProxyKey::Backspace),
        "Escape" => KeyClass::CancelCapture,
        "F2" => KeyClass::Forward(ProxyKey::EditStart),
        // DOM reports printable keys as the produced character; everything
        // longer than one grapheme-ish unit is a named function key.
        _ if key.chars().count() == 1 => KeyClass::Printable,
        _ => KeyClass::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_pass_through() {
        assert_eq!(classify("a", false), KeyClass::Printable);
        assert_eq!(classify("な", false), KeyClass::Printable);
        assert_eq!(classify(" ", false), KeyClass::Printable);
    }

    #[test]
    fn navigation_keys_forward() {
        assert_eq!(
            classify("ArrowDown", false),
            KeyClass::Forward(ProxyKey::ArrowDown)
        );
        assert_eq!(classify("Enter", false), KeyClass::Forward(ProxyKey::Enter));
        assert_eq!(classify("F2", false), KeyClass::Forward(ProxyKey::EditStart));
    }

    #[test]
    fn copy_chord_forwards_other_chords_ignored() {
        assert_eq!(classify("c", true), KeyClass::Forward(ProxyKey::Copy));
        assert_eq!(classify("v", true), KeyClass::Ignore);
    }

    #[test]
    fn escape_cancels_without_forwarding() {
        assert_eq!(classify("Escape", false), KeyClass::CancelCapture);
    }

    #[test]
    fn named_function_keys_ignored() {
        assert_eq!(classify("Shift", false), KeyClass::Ignore);
        assert_eq!(classify("F5", false), KeyClass::Ignore);
    }
}
