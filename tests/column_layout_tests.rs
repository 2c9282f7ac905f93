//! Column layout engine tests: initialization across the three width
//! sources, minimum-fill redistribution, clamping, and manual resizes.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::FakeGrid;
use gridcap::columns::{ColumnLayoutManager, WidthSource};
use gridcap::config::InteractionConfig;
use gridcap::host::{ColumnDef, GridHost};

fn manager() -> ColumnLayoutManager {
    ColumnLayoutManager::new(&InteractionConfig::default())
}

#[test]
fn initialize_skips_unmeasured_container() {
    let mut grid = FakeGrid::plain(3, 5);
    grid.container = (0.0, 0.0);
    let mut layout = manager();
    assert!(!layout.initialize(&mut grid));
    assert!(!layout.is_initialized());
    assert!(grid.widths.is_empty());
}

#[test]
fn natural_widths_grow_to_minimum_fill() {
    // 80 + 60 + 70 = 210 natural, well under 90% of a 1000px container.
    let mut grid = FakeGrid::plain(3, 5);
    grid.natural.insert("c0".into(), 80.0);
    grid.natural.insert("c1".into(), 60.0);
    grid.natural.insert("c2".into(), 70.0);

    let mut layout = manager();
    assert!(layout.initialize(&mut grid));

    let total: f32 = grid.widths.values().sum();
    assert!(total >= 900.0 - 0.5, "total {total} must reach 90% of 1000");
    for (id, w) in &grid.widths {
        assert!(*w <= 600.0, "{id} exceeds max: {w}");
        assert!(*w >= 50.0, "{id} below min: {w}");
    }
    // Proportional growth preserves relative ordering.
    assert!(grid.widths["c0"] > grid.widths["c1"]);
    assert!(grid.widths["c2"] > grid.widths["c1"]);
}

#[test]
fn natural_widths_clamp_to_bounds() {
    let mut grid = FakeGrid::plain(2, 1);
    grid.natural.insert("c0".into(), 12.0);
    grid.natural.insert("c1".into(), 4000.0);

    let mut layout = manager();
    layout.initialize(&mut grid);

    assert_eq!(layout.record("c0").unwrap().min_width, 50.0);
    assert!(grid.widths["c0"] >= 50.0);
    assert!(grid.widths["c1"] <= 600.0);
}

#[test]
fn configured_width_wins_over_measurement() {
    let mut grid = FakeGrid::plain(2, 1);
    grid.columns[0].configured_width = Some(120.0);
    grid.natural.insert("c0".into(), 300.0);
    grid.natural.insert("c1".into(), 850.0);
    // Keep the fill pass quiet for this case.
    grid.container = (200.0, 600.0);

    let mut layout = manager();
    layout.initialize(&mut grid);

    assert_eq!(grid.widths["c0"], 120.0);
    assert_eq!(grid.widths["c1"], 600.0, "auto width clamped to max");
}

#[test]
fn remembered_manual_width_keeps_only_lower_bound() {
    let mut grid = FakeGrid::plain(2, 1);
    grid.container = (200.0, 600.0);
    let mut layout = manager();
    layout.remember_width("c0", 900.0);
    layout.remember_width("c1", 10.0);
    layout.initialize(&mut grid);

    assert_eq!(grid.widths["c0"], 900.0, "manual width above max survives");
    assert_eq!(grid.widths["c1"], 50.0, "manual width below min is raised");
    assert_eq!(layout.record("c0").unwrap().source, WidthSource::Manual);
}

#[test]
fn minimum_fill_never_touches_manual_widths() {
    let mut grid = FakeGrid::plain(2, 1);
    grid.natural.insert("c1".into(), 100.0);
    let mut layout = manager();
    layout.remember_width("c0", 80.0);
    layout.initialize(&mut grid);

    assert_eq!(grid.widths["c0"], 80.0);
    assert!(grid.widths["c1"] > 100.0, "auto column absorbs the shortfall");
}

#[test]
fn reserved_and_flex_columns_are_ignored() {
    let mut grid = FakeGrid::plain(2, 1).with_index_column();
    grid.columns[2].flex = true; // c1
    grid.natural.insert("c0".into(), 100.0);

    let mut layout = manager();
    layout.initialize(&mut grid);

    assert!(!grid.widths.contains_key("index"));
    assert!(!grid.widths.contains_key("c1"));
    assert!(grid.widths.contains_key("c0"));
}

#[test]
fn steady_state_redistributes_viewport_deficit() {
    let mut grid = FakeGrid::plain(2, 1);
    grid.natural.insert("c0".into(), 400.0);
    grid.natural.insert("c1".into(), 500.0);
    let mut layout = manager();
    layout.initialize(&mut grid);

    // Container grows; the grid reports its current (now too small) widths.
    grid.container = (1400.0, 600.0);
    layout.apply_steady_state(&mut grid);

    let total: f32 = grid.widths.values().sum();
    // Both columns cap at 600, so 1200 is the best achievable.
    assert!(total >= 1200.0 - 0.5, "total {total}");
    assert!(grid.widths.values().all(|w| *w <= 600.0));
}

#[test]
fn manual_resize_is_remembered_and_reported() {
    let mut grid = FakeGrid::plain(2, 1);
    let mut layout = manager();
    layout.initialize(&mut grid);

    let pair = layout.on_manual_resize(&mut grid, "c0", 750.0).unwrap();
    assert_eq!(pair.field, "c0");
    assert_eq!(pair.width, 750.0, "drag above max is honored");

    let pair = layout.on_manual_resize(&mut grid, "c0", 5.0).unwrap();
    assert_eq!(pair.width, 50.0, "drag below min is raised");
    assert_eq!(layout.record("c0").unwrap().source, WidthSource::Manual);
}

#[test]
fn manual_resize_of_reserved_column_is_refused() {
    let mut grid = FakeGrid::plain(1, 1).with_index_column();
    let mut layout = manager();
    layout.initialize(&mut grid);
    assert!(layout.on_manual_resize(&mut grid, "index", 200.0).is_none());
}

#[test]
fn width_pairs_use_field_name_over_id() {
    let mut col = ColumnDef::data("c0");
    col.field = Some("title".to_string());
    let mut grid = FakeGrid::new(vec![col], vec![serde_json::json!({})]);
    grid.natural.insert("c0".into(), 100.0);

    let mut layout = manager();
    layout.initialize(&mut grid);
    let pairs = layout.width_pairs(&grid.displayed_columns());
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].field, "title");
}
