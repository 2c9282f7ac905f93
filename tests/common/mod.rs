//! Common test utilities: an in-memory grid host with recorded commands.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::collections::HashMap;

use serde_json::Value;

use gridcap::host::{ColumnDef, ColumnKind, GridHost, StopEditOutcome};

/// In-memory [`GridHost`] that records the commands issued to it, so tests
/// can assert on what the controller asked the grid to do.
pub struct FakeGrid {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Value>,
    pub container: (f32, f32),
    /// Widths as the grid currently renders them.
    pub widths: HashMap<String, f32>,
    /// Content-measured widths returned by size-to-fit.
    pub natural: HashMap<String, f32>,
    pub focused: Option<(u32, String)>,
    pub editing: Option<(u32, String)>,
    pub stop_response: StopEditOutcome,
    // recorded commands
    pub stop_calls: u32,
    pub refresh_calls: u32,
    pub visible_calls: Vec<(u32, String)>,
    pub start_edit_calls: Vec<(u32, String)>,
}

impl FakeGrid {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Value>) -> Self {
        Self {
            columns,
            rows,
            container: (1000.0, 600.0),
            widths: HashMap::new(),
            natural: HashMap::new(),
            focused: None,
            editing: None,
            stop_response: StopEditOutcome::Stopped,
            stop_calls: 0,
            refresh_calls: 0,
            visible_calls: Vec::new(),
            start_edit_calls: Vec::new(),
        }
    }

    /// A grid of `cols` editable data columns named c0..cN over `rows`
    /// empty rows.
    pub fn plain(cols: usize, rows: usize) -> Self {
        let columns = (0..cols).map(|i| ColumnDef::data(format!("c{i}"))).collect();
        let rows = (0..rows).map(|_| serde_json::json!({})).collect();
        Self::new(columns, rows)
    }

    /// Prepend a reserved index column.
    pub fn with_index_column(mut self) -> Self {
        let mut index = ColumnDef::data("index");
        index.kind = ColumnKind::Index;
        self.columns.insert(0, index);
        self
    }
}

impl GridHost for FakeGrid {
    fn displayed_columns(&self) -> Vec<ColumnDef> {
        self.columns.clone()
    }

    fn displayed_row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn row_data(&self, row: u32) -> Option<Value> {
        self.rows.get(row as usize).cloned()
    }

    fn cell_value(&self, row: u32, key: &str) -> Option<String> {
        let value = self.rows.get(row as usize)?.get(key)?;
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn focused_col_id(&self) -> Option<String> {
        self.focused.as_ref().map(|(_, c)| c.clone())
    }

    fn editing_col_id(&self) -> Option<String> {
        self.editing.as_ref().map(|(_, c)| c.clone())
    }

    fn actual_column_width(&self, col_id: &str) -> Option<f32> {
        self.widths.get(col_id).copied()
    }

    fn container_size(&self) -> (f32, f32) {
        self.container
    }

    fn natural_column_width(&self, col_id: &str) -> Option<f32> {
        self.natural.get(col_id).copied()
    }

    fn set_focused_cell(&mut self, row: u32, col_id: &str) {
        self.focused = Some((row, col_id.to_string()));
    }

    fn ensure_cell_visible(&mut self, row: u32, col_id: &str) {
        self.visible_calls.push((row, col_id.to_string()));
    }

    fn start_editing(&mut self, row: u32, col_id: &str) {
        self.start_edit_calls.push((row, col_id.to_string()));
        self.editing = Some((row, col_id.to_string()));
    }

    fn stop_editing(&mut self) -> StopEditOutcome {
        self.stop_calls += 1;
        if self.stop_response == StopEditOutcome::Stopped {
            self.editing = None;
        }
        self.stop_response
    }

    fn set_cell_value(&mut self, row: u32, key: &str, value: &str) {
        if let Some(obj) = self.rows.get_mut(row as usize) {
            obj[key] = Value::String(value.to_string());
        }
    }

    fn set_column_width(&mut self, col_id: &str, width: f32) {
        self.widths.insert(col_id.to_string(), width);
    }

    fn refresh_header_and_cells(&mut self) {
        self.refresh_calls += 1;
    }
}
