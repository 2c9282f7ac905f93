//! Focus navigation over the host grid: clamped arrow moves, delete-key
//! value clearing, and pending-shift application after Enter commits.

use log::debug;

use crate::focus::{FocusState, PendingShift};
use crate::host::GridHost;

/// A committed cell edit, reported to the embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditReport {
    pub row: u32,
    pub col_id: String,
    pub old_value: String,
    pub new_value: String,
}

/// Clamp a relative move against grid bounds. Row clamps to
/// `[0, row_count)`; the column index clamps to the displayed column list.
/// Returns `None` when the grid is empty on either axis.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
pub fn clamp_move(
    row: u32,
    col_index: usize,
    row_delta: i32,
    col_delta: i32,
    row_count: u32,
    col_count: usize,
) -> Option<(u32, usize)> {
    if row_count == 0 || col_count == 0 {
        return None;
    }
    let new_row = (i64::from(row) + i64::from(row_delta))
        .clamp(0, i64::from(row_count) - 1) as u32;
    let new_col = (col_index as i64 + i64::from(col_delta))
        .clamp(0, col_count as i64 - 1) as usize;
    Some((new_row, new_col))
}

/// Move focus by the given deltas. Returns true if focus was set (including
/// a clamped move back onto the same cell).
pub fn move_focus(
    state: &mut FocusState,
    host: &mut dyn GridHost,
    row_delta: i32,
    col_delta: i32,
) -> bool {
    let Some((row, col_id)) = state.coords().resolved().map(|(r, c)| (r, c.to_owned()))
    else {
        return false;
    };
    let columns = host.displayed_columns();
    let Some(col_index) = columns.iter().position(|c| c.id == col_id) else {
        return false;
    };
    let Some((new_row, new_col)) = clamp_move(
        row,
        col_index,
        row_delta,
        col_delta,
        host.displayed_row_count(),
        columns.len(),
    ) else {
        return false;
    };
    let Some(new_col_id) = columns.get(new_col).map(|c| c.id.clone()) else {
        return false;
    };
    debug!(
        "focus move ({row},{col_id}) -> ({new_row},{new_col_id})"
    );
    state.set_coords(new_row, &new_col_id);
    host.ensure_cell_visible(new_row, &new_col_id);
    host.set_focused_cell(new_row, &new_col_id);
    true
}

/// Delete/Backspace on a focused, non-editing cell clears its value.
/// Reserved columns, non-editable cells, and already-empty cells are
/// left alone. Returns the edit report when a clear happened.
pub fn handle_delete_key(
    state: &FocusState,
    host: &mut dyn GridHost,
) -> Option<CellEditReport> {
    if state.is_editing() {
        return None;
    }
    let (row, col_id) = state.coords().resolved()?;
    let columns = host.displayed_columns();
    let column = columns.iter().find(|c| c.id == col_id)?;
    if column.is_reserved() {
        return None;
    }
    let row_data = host.row_data(row)?;
    if !column.is_editable(&row_data) {
        return None;
    }
    let old_value = host.cell_value(row, column.value_key()).unwrap_or_default();
    if old_value.is_empty() {
        return None;
    }
    host.set_cell_value(row, column.value_key(), "");
    Some(CellEditReport {
        row,
        col_id: col_id.to_owned(),
        old_value,
        new_value: String::new(),
    })
}

/// Outcome of an Enter forwarded by the capture proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterDisposition {
    /// Focus moved (or clamped) within existing rows.
    Moved,
    /// Enter on the last displayed row: row insertion should run.
    AtLastRow,
    /// No focus; nothing happened.
    NoFocus,
}

/// Enter while not editing: Shift+Enter moves up; plain Enter moves down,
/// except on the last displayed row where row insertion takes over.
pub fn handle_proxy_enter(
    state: &mut FocusState,
    host: &mut dyn GridHost,
    shift: bool,
) -> EnterDisposition {
    let Some((row, _)) = state.coords().resolved() else {
        return EnterDisposition::NoFocus;
    };
    if shift {
        move_focus(state, host, -1, 0);
        return EnterDisposition::Moved;
    }
    let row_count = host.displayed_row_count();
    if row_count > 0 && row + 1 >= row_count {
        return EnterDisposition::AtLastRow;
    }
    move_focus(state, host, 1, 0);
    EnterDisposition::Moved
}

/// Queue the one-row-down shift applied after an external row insertion.
pub fn queue_post_insert_shift(state: &mut FocusState) {
    state.queue_shift(PendingShift {
        row_delta: 1,
        col_delta: 0,
    });
}

/// Apply a queued shift once the model has settled. If the move cannot be
/// made yet (focus lost mid-update), the shift is re-queued so the next
/// model update retries it.
pub fn apply_pending_shift(state: &mut FocusState, host: &mut dyn GridHost) -> bool {
    let Some(shift) = state.pending_shift() else {
        return false;
    };
    state.clear_shift();
    if move_focus(state, host, shift.row_delta, shift.col_delta) {
        true
    } else {
        state.queue_shift(shift);
        false
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn clamp_stays_in_bounds() {
        assert_eq!(clamp_move(0, 0, -1, 0, 10, 3), Some((0, 0)));
        assert_eq!(clamp_move(9, 2, 1, 1, 10, 3), Some((9, 2)));
        assert_eq!(clamp_move(4, 1, 2, -1, 10, 3), Some((6, 0)));
    }

    #[test]
    fn clamp_empty_grid_is_none() {
        assert_eq!(clamp_move(0, 0, 1, 0, 0, 3), None);
        assert_eq!(clamp_move(0, 0, 0, 1, 5, 0), None);
    }
}
