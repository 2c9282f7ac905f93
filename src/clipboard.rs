//! Copy handling: structured copy from the index column, otherwise literal
//! text, written through the async clipboard API with a hidden-textarea
//! fallback.

use crate::focus::FocusState;
use crate::host::{GridHost, INDEX_COLUMN_ID};

/// What a copy shortcut should do, decided before touching the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    /// Invoke the "copy as template" hook with the row identity.
    Template(u32),
    /// Invoke the "copy referenced section" hook with the row identity.
    Section(u32),
    /// Write the text to the system clipboard.
    Literal(String),
    /// Nothing to copy.
    None,
}

/// Resolve a copy shortcut against the focused cell.
///
/// The structured path only applies when the focus is on the index column
/// AND the event target is exactly that cell (not a descendant), and the
/// cell's value parses as an integer row identity. Hooks are tried in
/// order; with neither registered, or on a parse failure, the copy falls
/// through to literal text.
pub fn resolve_copy(
    state: &FocusState,
    host: &dyn GridHost,
    exact_index_target: bool,
    has_template_hook: bool,
    has_section_hook: bool,
) -> CopyAction {
    let Some((row, col_id)) = state.coords().resolved() else {
        return CopyAction::None;
    };

    if col_id == INDEX_COLUMN_ID && exact_index_target && (has_template_hook || has_section_hook) {
        if let Some(identity) = host
            .cell_value(row, INDEX_COLUMN_ID)
            .and_then(|v| parse_row_identity(&v))
        {
            if has_template_hook {
                return CopyAction::Template(identity);
            }
            return CopyAction::Section(identity);
        }
    }

    let columns = host.displayed_columns();
    let Some(column) = columns.iter().find(|c| c.id == col_id) else {
        return CopyAction::None;
    };
    let text = host
        .cell_value(row, column.value_key())
        .unwrap_or_default();
    CopyAction::Literal(text)
}

fn parse_row_identity(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn identity_parses_trimmed_integers_only() {
        assert_eq!(parse_row_identity("7"), Some(7));
        assert_eq!(parse_row_identity(" 12 "), Some(12));
        assert_eq!(parse_row_identity("x12"), None);
        assert_eq!(parse_row_identity(""), None);
    }
}

// ============================================================================
// WASM32: clipboard write path
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use write::copy_text_to_clipboard;

#[cfg(target_arch = "wasm32")]
mod write {
    use log::{debug, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlTextAreaElement;

    /// Write text through `navigator.clipboard`, falling back to a hidden
    /// textarea and `execCommand("copy")` when the async API is missing or
    /// rejects (non-secure contexts, denied permission).
    pub async fn copy_text_to_clipboard(text: String) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let clipboard = window.navigator().clipboard();
        let promise = clipboard.write_text(&text);
        match JsFuture::from(promise).await {
            Ok(_) => debug!("clipboard write ok ({} chars)", text.len()),
            Err(err) => {
                debug!("async clipboard rejected: {err:?}");
                if !exec_command_fallback(&text) {
                    warn!("clipboard copy failed on both paths");
                }
            }
        }
    }

    fn exec_command_fallback(text: &str) -> bool {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return false;
        };
        let Some(body) = document.body() else {
            return false;
        };
        let Ok(element) = document.create_element("textarea") else {
            return false;
        };
        let Ok(textarea) = element.dyn_into::<HtmlTextAreaElement>() else {
            return false;
        };
        textarea.set_value(text);
        let style = textarea.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("left", "-10000px");
        if body.append_child(&textarea).is_err() {
            return false;
        }
        textarea.select();
        let copied = document.exec_command("copy").unwrap_or(false);
        let _ = body.remove_child(&textarea);
        copied
    }
}
