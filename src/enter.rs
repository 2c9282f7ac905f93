//! Enter-at-last-row coordination.
//!
//! A two-state machine (idle / pending) that debounces repeated Enter
//! triggers while the grid's edit-stop machinery settles and the external
//! row insertion runs, and resolves which column id to report.

use crate::host::{ColumnDef, GridHost, INDEX_COLUMN_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnterState {
    Idle,
    Pending,
}

/// Inputs to column-id resolution, in priority order.
#[derive(Debug, Default, Clone)]
pub struct EnterContext<'a> {
    /// Column id carried by the triggering cell event, if any.
    pub event_col: Option<&'a str>,
    /// Column of the active cell editor.
    pub editor_col: Option<&'a str>,
    /// The grid's own notion of the focused column.
    pub grid_focused_col: Option<&'a str>,
    /// Column from our focus state store.
    pub stored_focus_col: Option<&'a str>,
    /// Currently displayed columns.
    pub displayed: &'a [ColumnDef],
}

#[derive(Debug, Default)]
pub struct EnterCoordinator {
    state: EnterState,
}

impl Default for EnterState {
    fn default() -> Self {
        Self::Idle
    }
}

impl EnterCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter arrived at the last displayed row. Returns true if the caller
    /// should run the add-row sequence; false while a previous trigger is
    /// still pending (the anti-double-submit guard).
    pub fn trigger(&mut self) -> bool {
        match self.state {
            EnterState::Idle => {
                self.state = EnterState::Pending;
                true
            }
            EnterState::Pending => {
                log::trace!("enter trigger ignored while pending");
                false
            }
        }
    }

    /// The add-row sequence completed (or failed); accept triggers again.
    pub fn complete(&mut self) {
        self.state = EnterState::Idle;
    }

    pub fn is_pending(&self) -> bool {
        self.state == EnterState::Pending
    }

    /// Resolve the column id to report to the add-row callback.
    ///
    /// Priority chain: explicit event column, active editor's column, grid
    /// focused column, stored focus state, first non-reserved displayed
    /// column, and finally the index-column literal.
    pub fn resolve_column(ctx: &EnterContext<'_>) -> String {
        ctx.event_col
            .or(ctx.editor_col)
            .or(ctx.grid_focused_col)
            .or(ctx.stored_focus_col)
            .map(str::to_string)
            .or_else(|| {
                ctx.displayed
                    .iter()
                    .find(|c| !c.is_reserved())
                    .map(|c| c.id.clone())
            })
            .unwrap_or_else(|| INDEX_COLUMN_ID.to_string())
    }

    /// Resolve the column at completion time and stop any active edit.
    ///
    /// The host-derived links are read before the edit stop: stopping
    /// clears the grid's editor column, and the chain must see the column
    /// the editor occupied.
    pub fn resolve_for_completion(
        event_col: Option<&str>,
        stored_focus_col: Option<&str>,
        host: &mut dyn GridHost,
    ) -> String {
        let displayed = host.displayed_columns();
        let editor_col = host.editing_col_id();
        let grid_focused_col = host.focused_col_id();
        let _ = host.stop_editing();
        Self::resolve_column(&EnterContext {
            event_col,
            editor_col: editor_col.as_deref(),
            grid_focused_col: grid_focused_col.as_deref(),
            stored_focus_col,
            displayed: &displayed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ColumnDef, ColumnKind};

    #[test]
    fn pending_swallows_repeat_triggers() {
        let mut coordinator = EnterCoordinator::new();
        assert!(coordinator.trigger());
        assert!(!coordinator.trigger());
        assert!(!coordinator.trigger());
        coordinator.complete();
        assert!(coordinator.trigger());
    }

    #[test]
    fn resolution_priority_chain() {
        let displayed = vec![
            {
                let mut c = ColumnDef::data("idx");
                c.kind = ColumnKind::Index;
                c
            },
            ColumnDef::data("title"),
        ];

        let full = EnterContext {
            event_col: Some("ev"),
            editor_col: Some("ed"),
            grid_focused_col: Some("gf"),
            stored_focus_col: Some("sf"),
            displayed: &displayed,
        };
        assert_eq!(EnterCoordinator::resolve_column(&full), "ev");

        let no_event = EnterContext {
            event_col: None,
            ..full.clone()
        };
        assert_eq!(EnterCoordinator::resolve_column(&no_event), "ed");

        let only_displayed = EnterContext {
            displayed: &displayed,
            ..EnterContext::default()
        };
        // First non-reserved column wins over the index column.
        assert_eq!(EnterCoordinator::resolve_column(&only_displayed), "title");

        let nothing = EnterContext::default();
        assert_eq!(EnterCoordinator::resolve_column(&nothing), INDEX_COLUMN_ID);
    }
}
