//! Focus navigation tests: clamped moves, delete-to-clear, Enter
//! dispositions, and deferred focus shifts.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use common::FakeGrid;
use gridcap::focus::{FocusState, SurfaceId};
use gridcap::host::EditRule;
use gridcap::navigate::{
    apply_pending_shift, handle_delete_key, handle_proxy_enter, move_focus, EnterDisposition,
};

fn focused_at(row: u32, col_id: &str) -> FocusState {
    let mut state = FocusState::new(SurfaceId(0));
    state.set_coords(row, col_id);
    state
}

#[test]
fn move_clamps_at_grid_edges() {
    let mut grid = FakeGrid::plain(3, 10);
    let mut state = focused_at(0, "c0");

    assert!(move_focus(&mut state, &mut grid, -1, -1), "clamped move still lands");
    assert_eq!(state.coords().resolved(), Some((0, "c0")));

    state.set_coords(9, "c2");
    assert!(move_focus(&mut state, &mut grid, 5, 5));
    assert_eq!(state.coords().resolved(), Some((9, "c2")));
}

#[test]
fn move_updates_grid_focus_and_visibility() {
    let mut grid = FakeGrid::plain(3, 10);
    let mut state = focused_at(4, "c1");

    assert!(move_focus(&mut state, &mut grid, 1, 1));
    assert_eq!(state.coords().resolved(), Some((5, "c2")));
    assert_eq!(grid.focused, Some((5, "c2".to_string())));
    assert_eq!(grid.visible_calls, vec![(5, "c2".to_string())]);
}

#[test]
fn move_without_focus_is_a_noop() {
    let mut grid = FakeGrid::plain(3, 10);
    let mut state = FocusState::new(SurfaceId(0));
    assert!(!move_focus(&mut state, &mut grid, 1, 0));
    assert!(grid.focused.is_none());
}

#[test]
fn move_on_empty_grid_is_a_noop() {
    let mut grid = FakeGrid::plain(3, 0);
    let mut state = focused_at(0, "c0");
    assert!(!move_focus(&mut state, &mut grid, 1, 0));
}

#[test]
fn delete_clears_value_and_reports_old() {
    let mut grid = FakeGrid::plain(2, 3);
    grid.rows[1] = serde_json::json!({ "c0": "hello" });
    let state = focused_at(1, "c0");

    let report = handle_delete_key(&state, &mut grid).unwrap();
    assert_eq!(report.row, 1);
    assert_eq!(report.col_id, "c0");
    assert_eq!(report.old_value, "hello");
    assert_eq!(report.new_value, "");
    assert_eq!(grid.rows[1]["c0"], serde_json::json!(""));
}

#[test]
fn delete_skips_empty_cells() {
    let mut grid = FakeGrid::plain(2, 3);
    let state = focused_at(1, "c0");
    assert!(handle_delete_key(&state, &mut grid).is_none());
}

#[test]
fn delete_skips_reserved_columns() {
    let mut grid = FakeGrid::plain(1, 3).with_index_column();
    grid.rows[0] = serde_json::json!({ "index": "1" });
    let state = focused_at(0, "index");
    assert!(handle_delete_key(&state, &mut grid).is_none());
}

#[test]
fn delete_respects_dynamic_editability() {
    let mut grid = FakeGrid::plain(1, 1);
    grid.columns[0].edit_rule = EditRule::Predicate(Rc::new(|row| {
        row.get("locked") != Some(&serde_json::json!(true))
    }));
    grid.rows[0] = serde_json::json!({ "c0": "x", "locked": true });
    let state = focused_at(0, "c0");
    assert!(handle_delete_key(&state, &mut grid).is_none());

    grid.rows[0]["locked"] = serde_json::json!(false);
    assert!(handle_delete_key(&state, &mut grid).is_some());
}

#[test]
fn delete_while_editing_is_a_noop() {
    let mut grid = FakeGrid::plain(1, 1);
    grid.rows[0] = serde_json::json!({ "c0": "x" });
    let mut state = focused_at(0, "c0");
    state.set_editing(true);
    assert!(handle_delete_key(&state, &mut grid).is_none());
}

#[test]
fn enter_moves_down_except_on_last_row() {
    let mut grid = FakeGrid::plain(1, 3);
    let mut state = focused_at(0, "c0");

    assert_eq!(
        handle_proxy_enter(&mut state, &mut grid, false),
        EnterDisposition::Moved
    );
    assert_eq!(state.coords().resolved(), Some((1, "c0")));

    state.set_coords(2, "c0");
    assert_eq!(
        handle_proxy_enter(&mut state, &mut grid, false),
        EnterDisposition::AtLastRow
    );
    assert_eq!(state.coords().resolved(), Some((2, "c0")), "focus unchanged");
}

#[test]
fn shift_enter_moves_up_even_on_last_row() {
    let mut grid = FakeGrid::plain(1, 3);
    let mut state = focused_at(2, "c0");
    assert_eq!(
        handle_proxy_enter(&mut state, &mut grid, true),
        EnterDisposition::Moved
    );
    assert_eq!(state.coords().resolved(), Some((1, "c0")));
}

#[test]
fn pending_shift_applies_after_new_row_renders() {
    let mut grid = FakeGrid::plain(1, 3);
    let mut state = focused_at(2, "c0");
    gridcap::navigate::queue_post_insert_shift(&mut state);

    // Focus lost mid-update: the shift cannot apply and stays queued.
    state.clear_coords();
    assert!(!apply_pending_shift(&mut state, &mut grid));
    assert!(state.pending_shift().is_some(), "shift re-queued");

    // Row rendered, focus restored: the shift lands.
    state.set_coords(2, "c0");
    grid.rows.push(serde_json::json!({}));
    assert!(apply_pending_shift(&mut state, &mut grid));
    assert_eq!(state.coords().resolved(), Some((3, "c0")));
    assert!(state.pending_shift().is_none());
}
