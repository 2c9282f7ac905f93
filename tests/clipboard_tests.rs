//! Copy resolution tests: the index-column structured-copy rule and the
//! literal-text path.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::FakeGrid;
use gridcap::clipboard::{resolve_copy, CopyAction};
use gridcap::focus::{FocusState, SurfaceId};
use gridcap::host::ColumnDef;

fn focused_at(row: u32, col_id: &str) -> FocusState {
    let mut state = FocusState::new(SurfaceId(0));
    state.set_coords(row, col_id);
    state
}

fn grid_with_index() -> FakeGrid {
    let mut grid = FakeGrid::plain(1, 2).with_index_column();
    grid.rows[0] = serde_json::json!({ "index": "7", "c0": "alpha" });
    grid.rows[1] = serde_json::json!({ "index": "oops", "c0": "beta" });
    grid
}

#[test]
fn no_focus_means_no_copy() {
    let grid = grid_with_index();
    let state = FocusState::new(SurfaceId(0));
    assert_eq!(resolve_copy(&state, &grid, false, true, true), CopyAction::None);
}

#[test]
fn index_column_with_exact_target_copies_structured() {
    let grid = grid_with_index();
    let state = focused_at(0, "index");
    assert_eq!(
        resolve_copy(&state, &grid, true, true, true),
        CopyAction::Template(7)
    );
    // Template hook absent: the section hook is next in line.
    assert_eq!(
        resolve_copy(&state, &grid, true, false, true),
        CopyAction::Section(7)
    );
}

#[test]
fn descendant_target_falls_back_to_literal() {
    let grid = grid_with_index();
    let state = focused_at(0, "index");
    assert_eq!(
        resolve_copy(&state, &grid, false, true, true),
        CopyAction::Literal("7".to_string())
    );
}

#[test]
fn unparseable_row_identity_falls_back_to_literal() {
    let grid = grid_with_index();
    let state = focused_at(1, "index");
    assert_eq!(
        resolve_copy(&state, &grid, true, true, true),
        CopyAction::Literal("oops".to_string())
    );
}

#[test]
fn no_hooks_registered_means_literal() {
    let grid = grid_with_index();
    let state = focused_at(0, "index");
    assert_eq!(
        resolve_copy(&state, &grid, true, false, false),
        CopyAction::Literal("7".to_string())
    );
}

#[test]
fn literal_path_prefers_field_over_id() {
    let mut col = ColumnDef::data("c0");
    col.field = Some("name".to_string());
    let mut grid = FakeGrid::new(vec![col], vec![serde_json::json!({
        "c0": "by-id",
        "name": "by-field"
    })]);
    grid.container = (800.0, 600.0);
    let state = focused_at(0, "c0");
    assert_eq!(
        resolve_copy(&state, &grid, false, false, false),
        CopyAction::Literal("by-field".to_string())
    );
}

#[test]
fn missing_value_copies_empty_text() {
    let grid = FakeGrid::plain(1, 1);
    let state = focused_at(0, "c0");
    assert_eq!(
        resolve_copy(&state, &grid, false, false, false),
        CopyAction::Literal(String::new())
    );
}
