//! Deterministic column widths under three width sources: a remembered
//! manual width, an explicit configured width, or content measurement.
//!
//! The manager owns width provenance and drives the grid host; the
//! iterative numeric kernels live in [`width`].

pub mod width;

use std::collections::HashMap;

use crate::config::InteractionConfig;
use crate::host::{ColumnDef, GridHost};

pub use width::{ColumnWidthRecord, WidthPair, WidthSource};

/// Column width engine for one grid instance.
pub struct ColumnLayoutManager {
    min_width: f32,
    max_width: f32,
    min_fill_ratio: f32,
    tolerance: f32,
    /// Width records for non-reserved, non-flex displayed columns.
    records: HashMap<String, ColumnWidthRecord>,
    /// Widths restored from the external store before first layout.
    remembered: HashMap<String, f32>,
    initialized: bool,
}

impl ColumnLayoutManager {
    pub fn new(cfg: &InteractionConfig) -> Self {
        Self {
            min_width: cfg.min_col_width,
            max_width: cfg.max_col_width,
            min_fill_ratio: cfg.min_fill_ratio,
            tolerance: cfg.fill_tolerance_px,
            records: HashMap::new(),
            remembered: HashMap::new(),
            initialized: false,
        }
    }

    /// Seed a remembered manual width (from the external width store).
    pub fn remember_width(&mut self, col_id: impl Into<String>, width: f32) {
        self.remembered.insert(col_id.into(), width);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Columns the width engine manages: displayed, not reserved, not flex.
    fn managed<'a>(columns: &'a [ColumnDef]) -> impl Iterator<Item = &'a ColumnDef> {
        columns.iter().filter(|c| !c.is_reserved() && !c.flex)
    }

    /// First full layout pass.
    ///
    /// Skips entirely while the container has no measured size (the grid is
    /// not laid out yet); the caller retries on the next layout trigger.
    /// Returns true if any width was applied.
    pub fn initialize(&mut self, host: &mut dyn GridHost) -> bool {
        let (cw, ch) = host.container_size();
        if cw <= 0.0 || ch <= 0.0 {
            log::debug!("column layout: container not measured yet, skipping");
            return false;
        }

        let columns = host.displayed_columns();
        self.records.clear();

        for col in Self::managed(&columns) {
            let record = if let Some(&w) = self.remembered.get(&col.id) {
                // Remembered manual width: lower-bound clamp only.
                ColumnWidthRecord::new(&col.id, w, WidthSource::Manual, self.min_width, self.max_width)
            } else if let Some(w) = col.configured_width {
                ColumnWidthRecord::new(&col.id, w, WidthSource::Auto, self.min_width, self.max_width)
            } else {
                // No width anywhere: measure content.
                let natural = host
                    .natural_column_width(&col.id)
                    .unwrap_or(self.min_width);
                ColumnWidthRecord::new(&col.id, natural, WidthSource::Auto, self.min_width, self.max_width)
            };
            self.records.insert(col.id.clone(), record);
        }

        let mut ordered = self.ordered_records(&columns);
        let filled = width::ensure_minimum_fill(
            &mut ordered,
            cw,
            self.min_fill_ratio,
            self.tolerance,
            false,
        );
        let clamped = width::clamp_and_redistribute(&mut ordered, 0.0, self.tolerance);
        self.store_records(ordered);

        let mut applied = false;
        for col in Self::managed(&columns) {
            if let Some(rec) = self.records.get(&col.id) {
                host.set_column_width(&col.id, rec.width);
                applied = true;
            }
        }
        if applied && (filled || clamped) {
            host.refresh_header_and_cells();
        }
        self.initialized = true;
        applied
    }

    /// Steady-state pass on every layout trigger after initialization:
    /// clamp actual widths into bounds, grow into any viewport deficit, and
    /// push changes back to the grid.
    pub fn apply_steady_state(&mut self, host: &mut dyn GridHost) {
        if !self.initialized {
            self.initialize(host);
            return;
        }
        let (cw, _) = host.container_size();
        if cw <= 0.0 {
            return;
        }

        let columns = host.displayed_columns();
        // Sync records with what the grid actually rendered.
        for col in Self::managed(&columns) {
            let Some(actual) = host.actual_column_width(&col.id) else {
                continue;
            };
            match self.records.get_mut(&col.id) {
                Some(rec) => rec.width = actual,
                None => {
                    self.records.insert(
                        col.id.clone(),
                        ColumnWidthRecord::new(
                            &col.id,
                            actual,
                            WidthSource::Auto,
                            self.min_width,
                            self.max_width,
                        ),
                    );
                }
            }
        }

        let mut ordered = self.ordered_records(&columns);
        let before: Vec<f32> = ordered.iter().map(|r| r.width).collect();
        width::clamp_and_redistribute(&mut ordered, cw, self.tolerance);

        let mut dirty = false;
        for (rec, old) in ordered.iter().zip(before.iter()) {
            if (rec.width - old).abs() > self.tolerance {
                host.set_column_width(&rec.col_id, rec.width);
                dirty = true;
            }
        }
        self.store_records(ordered);
        if dirty {
            host.refresh_header_and_cells();
        }
    }

    /// A user-driven resize finished: lower-bound clamp only (explicit
    /// intent is never shrunk), remember the width as manual, and return
    /// the pair to report to the external resize callback.
    pub fn on_manual_resize(
        &mut self,
        host: &mut dyn GridHost,
        col_id: &str,
        new_width: f32,
    ) -> Option<WidthPair> {
        let columns = host.displayed_columns();
        let col = columns.iter().find(|c| c.id == col_id)?;
        if col.is_reserved() || col.flex {
            return None;
        }

        let width = new_width.max(self.min_width);
        self.records.insert(
            col_id.to_string(),
            ColumnWidthRecord::new(col_id, width, WidthSource::Manual, self.min_width, self.max_width),
        );
        self.remembered.insert(col_id.to_string(), width);
        if (width - new_width).abs() > self.tolerance {
            host.set_column_width(col_id, width);
        }
        Some(WidthPair {
            field: col.value_key().to_string(),
            width,
        })
    }

    /// Current widths as plain `{field, width}` pairs for the external
    /// width store, in displayed column order.
    pub fn width_pairs(&self, columns: &[ColumnDef]) -> Vec<WidthPair> {
        Self::managed(columns)
            .filter_map(|col| {
                self.records.get(&col.id).map(|rec| WidthPair {
                    field: col.value_key().to_string(),
                    width: rec.width,
                })
            })
            .collect()
    }

    pub fn record(&self, col_id: &str) -> Option<&ColumnWidthRecord> {
        self.records.get(col_id)
    }

    /// Records in displayed-column order, for the order-sensitive kernels.
    fn ordered_records(&self, columns: &[ColumnDef]) -> Vec<ColumnWidthRecord> {
        Self::managed(columns)
            .filter_map(|col| self.records.get(&col.id).cloned())
            .collect()
    }

    fn store_records(&mut self, ordered: Vec<ColumnWidthRecord>) {
        for rec in ordered {
            self.records.insert(rec.col_id.clone(), rec);
        }
    }
}
