//! The grid-host seam.
//!
//! The third-party grid widget is consumed through the [`GridHost`] trait:
//! a narrow capability surface of queries and commands. On wasm the trait is
//! implemented by [`JsGrid`], an adapter around a JS object whose methods
//! are resolved with `js_sys::Reflect`. Native tests implement it with an
//! in-memory fake.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Column id reported to the add-row callback when every other resolution
/// step fails.
pub const INDEX_COLUMN_ID: &str = "index";

/// What a column is for. Everything except `Data` is reserved: excluded
/// from text editing, deletion, and width management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// The row-number / row-identity column.
    Index,
    /// Status indicator column.
    Status,
    /// Internal selection checkbox column.
    Selection,
    /// A regular data column.
    Data,
}

impl ColumnKind {
    pub fn is_reserved(self) -> bool {
        !matches!(self, Self::Data)
    }
}

/// Whether a cell in this column accepts edits.
///
/// The dynamic variant is a typed capability check evaluated against the
/// row's data, replacing loosely-typed predicate lookups on the column
/// definition object.
#[derive(Clone)]
pub enum EditRule {
    Always,
    Never,
    Predicate(Rc<dyn Fn(&Value) -> bool>),
}

impl fmt::Debug for EditRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Never => f.write_str("Never"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// The slice of a column definition this crate cares about: identity, width
/// bookkeeping, and editability. Construction of full definitions stays with
/// the host application.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub id: String,
    /// Field name in the row data; preferred over `id` when reading values.
    pub field: Option<String>,
    pub kind: ColumnKind,
    pub edit_rule: EditRule,
    /// Explicit width from the column definition, if any.
    pub configured_width: Option<f32>,
    /// Flex columns manage their own width; the layout engine skips them.
    pub flex: bool,
}

impl ColumnDef {
    /// A plain editable data column. Test and doc convenience.
    pub fn data(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field: None,
            kind: ColumnKind::Data,
            edit_rule: EditRule::Always,
            configured_width: None,
            flex: false,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.kind.is_reserved()
    }

    /// `Column.isEditable(row)`: reserved columns never are; otherwise the
    /// rule decides, with the dynamic predicate evaluated against the row.
    pub fn is_editable(&self, row: &Value) -> bool {
        if self.is_reserved() {
            return false;
        }
        match &self.edit_rule {
            EditRule::Always => true,
            EditRule::Never => false,
            EditRule::Predicate(p) => p(row),
        }
    }

    /// Key used to read this column's value out of row data.
    pub fn value_key(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.id)
    }
}

/// Result of asking the grid to leave edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopEditOutcome {
    /// The grid confirmed editing stopped.
    Stopped,
    /// The grid exposes no stop-editing API; nothing more to do.
    NoApi,
    /// The call was made but the grid stayed in edit mode.
    Rejected,
}

/// Capabilities consumed from the grid widget. Queries are `&self`,
/// commands `&mut self`; subscriptions arrive through the controller's
/// event entry points instead.
pub trait GridHost {
    // --- queries ---
    fn displayed_columns(&self) -> Vec<ColumnDef>;
    fn displayed_row_count(&self) -> u32;
    fn row_data(&self, row: u32) -> Option<Value>;
    fn cell_value(&self, row: u32, key: &str) -> Option<String>;
    /// Column id of the grid's own focused cell, if it tracks one.
    fn focused_col_id(&self) -> Option<String>;
    /// Column id of the active cell editor, if any.
    fn editing_col_id(&self) -> Option<String>;
    fn actual_column_width(&self, col_id: &str) -> Option<f32>;
    fn container_size(&self) -> (f32, f32);
    /// Content-measured width for a column (the grid's size-to-fit result).
    fn natural_column_width(&self, col_id: &str) -> Option<f32>;

    // --- commands ---
    fn set_focused_cell(&mut self, row: u32, col_id: &str);
    fn ensure_cell_visible(&mut self, row: u32, col_id: &str);
    fn start_editing(&mut self, row: u32, col_id: &str);
    fn stop_editing(&mut self) -> StopEditOutcome;
    fn set_cell_value(&mut self, row: u32, key: &str, value: &str);
    fn set_column_width(&mut self, col_id: &str, width: f32);
    fn refresh_header_and_cells(&mut self);
}

// ============================================================================
// WASM32: JS adapter implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use js_grid::JsGrid;

#[cfg(target_arch = "wasm32")]
mod js_grid {
    use super::*;
    use js_sys::{Array, Function, Reflect};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    /// Adapter over a JS object exposing the grid capability surface as
    /// camelCase methods (`displayedRowCount`, `startEditing`, ...).
    ///
    /// Missing methods degrade to `None`/no-op rather than throwing; the
    /// only capability whose absence is meaningful is `stopEditing`, which
    /// reports [`StopEditOutcome::NoApi`].
    pub struct JsGrid {
        adapter: JsValue,
    }

    impl JsGrid {
        pub fn new(adapter: JsValue) -> Self {
            Self { adapter }
        }

        fn method(&self, name: &str) -> Option<Function> {
            Reflect::get(&self.adapter, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.dyn_into::<Function>().ok())
        }

        fn call(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
            let f = self.method(name)?;
            let arr = Array::new();
            for a in args {
                arr.push(a);
            }
            match Reflect::apply(&f, &self.adapter, &arr) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::error!("grid host call {name} failed: {e:?}");
                    None
                }
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        fn call_f32(&self, name: &str, args: &[JsValue]) -> Option<f32> {
            self.call(name, args)
                .and_then(|v| v.as_f64())
                .map(|v| v as f32)
        }

        fn call_string(&self, name: &str, args: &[JsValue]) -> Option<String> {
            self.call(name, args).and_then(|v| v.as_string())
        }

        /// Build an edit rule for a parsed column. Columns flagged with a
        /// dynamic predicate delegate to the adapter's `isCellEditable`.
        fn edit_rule_for(&self, raw: &RawColumn) -> EditRule {
            if raw.editable_predicate {
                let adapter = self.adapter.clone();
                let col_id = raw.id.clone();
                return EditRule::Predicate(Rc::new(move |row: &Value| {
                    let Some(f) = Reflect::get(&adapter, &JsValue::from_str("isCellEditable"))
                        .ok()
                        .and_then(|v| v.dyn_into::<Function>().ok())
                    else {
                        return false;
                    };
                    let row_js = serde_wasm_bindgen::to_value(row).unwrap_or(JsValue::NULL);
                    f.call2(&adapter, &row_js, &JsValue::from_str(&col_id))
                        .ok()
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false)
                }));
            }
            if raw.editable {
                EditRule::Always
            } else {
                EditRule::Never
            }
        }
    }

    /// Wire shape of a column definition coming from the adapter.
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawColumn {
        id: String,
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        editable: bool,
        #[serde(default)]
        editable_predicate: bool,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        flex: bool,
    }

    fn parse_kind(kind: Option<&str>) -> ColumnKind {
        match kind {
            Some("index") => ColumnKind::Index,
            Some("status") => ColumnKind::Status,
            Some("selection") => ColumnKind::Selection,
            _ => ColumnKind::Data,
        }
    }

    impl GridHost for JsGrid {
        fn displayed_columns(&self) -> Vec<ColumnDef> {
            let Some(v) = self.call("displayedColumns", &[]) else {
                return Vec::new();
            };
            let raw: Vec<RawColumn> = match serde_wasm_bindgen::from_value(v) {
                Ok(raw) => raw,
                Err(e) => {
                    log::error!("displayedColumns: bad column shape: {e}");
                    return Vec::new();
                }
            };
            raw.into_iter()
                .map(|r| {
                    let edit_rule = self.edit_rule_for(&r);
                    ColumnDef {
                        kind: parse_kind(r.kind.as_deref()),
                        edit_rule,
                        id: r.id,
                        field: r.field,
                        configured_width: r.width,
                        flex: r.flex,
                    }
                })
                .collect()
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn displayed_row_count(&self) -> u32 {
            self.call("displayedRowCount", &[])
                .and_then(|v| v.as_f64())
                .map(|v| v.max(0.0) as u32)
                .unwrap_or(0)
        }

        fn row_data(&self, row: u32) -> Option<Value> {
            let v = self.call("rowData", &[JsValue::from_f64(f64::from(row))])?;
            if v.is_null() || v.is_undefined() {
                return None;
            }
            serde_wasm_bindgen::from_value(v).ok()
        }

        fn cell_value(&self, row: u32, key: &str) -> Option<String> {
            self.call_string(
                "cellValue",
                &[JsValue::from_f64(f64::from(row)), JsValue::from_str(key)],
            )
        }

        fn focused_col_id(&self) -> Option<String> {
            self.call_string("focusedColId", &[])
        }

        fn editing_col_id(&self) -> Option<String> {
            self.call_string("editingColId", &[])
        }

        fn actual_column_width(&self, col_id: &str) -> Option<f32> {
            self.call_f32("actualColumnWidth", &[JsValue::from_str(col_id)])
        }

        #[allow(clippy::cast_possible_truncation)]
        fn container_size(&self) -> (f32, f32) {
            let Some(v) = self.call("containerSize", &[]) else {
                return (0.0, 0.0);
            };
            let arr: Array = match v.dyn_into() {
                Ok(arr) => arr,
                Err(_) => return (0.0, 0.0),
            };
            let w = arr.get(0).as_f64().unwrap_or(0.0) as f32;
            let h = arr.get(1).as_f64().unwrap_or(0.0) as f32;
            (w, h)
        }

        fn natural_column_width(&self, col_id: &str) -> Option<f32> {
            self.call_f32("naturalColumnWidth", &[JsValue::from_str(col_id)])
        }

        fn set_focused_cell(&mut self, row: u32, col_id: &str) {
            let _ = self.call(
                "setFocusedCell",
                &[JsValue::from_f64(f64::from(row)), JsValue::from_str(col_id)],
            );
        }

        fn ensure_cell_visible(&mut self, row: u32, col_id: &str) {
            let _ = self.call(
                "ensureCellVisible",
                &[JsValue::from_f64(f64::from(row)), JsValue::from_str(col_id)],
            );
        }

        fn start_editing(&mut self, row: u32, col_id: &str) {
            let _ = self.call(
                "startEditing",
                &[JsValue::from_f64(f64::from(row)), JsValue::from_str(col_id)],
            );
        }

        fn stop_editing(&mut self) -> StopEditOutcome {
            if self.method("stopEditing").is_none() {
                return StopEditOutcome::NoApi;
            }
            match self.call("stopEditing", &[]).and_then(|v| v.as_bool()) {
                Some(true) | None => StopEditOutcome::Stopped,
                Some(false) => StopEditOutcome::Rejected,
            }
        }

        fn set_cell_value(&mut self, row: u32, key: &str, value: &str) {
            let _ = self.call(
                "setCellValue",
                &[
                    JsValue::from_f64(f64::from(row)),
                    JsValue::from_str(key),
                    JsValue::from_str(value),
                ],
            );
        }

        fn set_column_width(&mut self, col_id: &str, width: f32) {
            let _ = self.call(
                "setColumnWidth",
                &[JsValue::from_str(col_id), JsValue::from_f64(f64::from(width))],
            );
        }

        fn refresh_header_and_cells(&mut self) {
            let _ = self.call("refreshHeaderAndCells", &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_columns_are_never_editable() {
        let mut col = ColumnDef::data("status");
        col.kind = ColumnKind::Status;
        assert!(!col.is_editable(&json!({})));
    }

    #[test]
    fn predicate_rule_sees_row_data() {
        let mut col = ColumnDef::data("done");
        col.edit_rule = EditRule::Predicate(Rc::new(|row| {
            row.get("locked").and_then(Value::as_bool) != Some(true)
        }));
        assert!(col.is_editable(&json!({ "locked": false })));
        assert!(!col.is_editable(&json!({ "locked": true })));
    }

    #[test]
    fn value_key_prefers_field_over_id() {
        let mut col = ColumnDef::data("c1");
        assert_eq!(col.value_key(), "c1");
        col.field = Some("title".to_string());
        assert_eq!(col.value_key(), "title");
    }
}
