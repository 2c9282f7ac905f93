//! Width records and the iterative redistribution kernels.
//!
//! These are pure functions over [`ColumnWidthRecord`] slices so the
//! convergence behavior can be tested without a grid host.

use serde::Serialize;

/// Where a column's current width came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSource {
    /// The user dragged the column to this width.
    Manual,
    /// Measured or redistributed automatically.
    Auto,
}

/// Width bookkeeping for one column.
///
/// Invariant: `min_width <= width` always; `width <= max_width` unless
/// `source == Manual`. An explicit drag is never shrunk, only growth at
/// automatic-fill time is capped.
#[derive(Debug, Clone)]
pub struct ColumnWidthRecord {
    pub col_id: String,
    pub width: f32,
    pub source: WidthSource,
    pub min_width: f32,
    pub max_width: f32,
}

impl ColumnWidthRecord {
    pub fn new(col_id: impl Into<String>, width: f32, source: WidthSource, min: f32, max: f32) -> Self {
        let mut rec = Self {
            col_id: col_id.into(),
            width,
            source,
            min_width: min,
            max_width: max,
        };
        rec.width = rec.clamped(width);
        rec
    }

    /// Clamp a candidate width per the provenance rule: manual widths get
    /// the lower bound only.
    pub fn clamped(&self, width: f32) -> f32 {
        match self.source {
            WidthSource::Manual => width.max(self.min_width),
            WidthSource::Auto => width.clamp(self.min_width, self.max_width),
        }
    }

    /// Re-apply bounds to the stored width. Returns true if it changed.
    pub fn reclamp(&mut self, tolerance: f32) -> bool {
        let clamped = self.clamped(self.width);
        if (clamped - self.width).abs() > tolerance {
            self.width = clamped;
            true
        } else {
            false
        }
    }

    /// Room left before this column hits its automatic-growth cap.
    fn headroom(&self) -> f32 {
        (self.max_width - self.width).max(0.0)
    }
}

/// Plain `{field, width}` pair handed to the external width store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WidthPair {
    pub field: String,
    pub width: f32,
}

/// Grow the selected columns toward `target` total width, proportionally to
/// their current width, iterating because each column is individually capped
/// at its `max_width`. Columns that hit the cap drop out of the adjustable
/// set and the remaining shortfall is re-spread among the rest.
///
/// Terminates when the shortfall drops below `tolerance` or no column can
/// absorb more width. Returns true if any width changed.
///
/// `include_manual` widens the adjustable set to manually sized columns
/// (used when the caller explicitly allows touching user widths).
pub fn fill_to_target(
    records: &mut [ColumnWidthRecord],
    target: f32,
    tolerance: f32,
    include_manual: bool,
) -> bool {
    let mut changed = false;
    loop {
        let total: f32 = records.iter().map(|r| r.width).sum();
        let mut shortfall = target - total;
        if shortfall <= tolerance {
            break;
        }

        let adjustable: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                (include_manual || r.source == WidthSource::Auto) && r.headroom() > tolerance
            })
            .map(|(i, _)| i)
            .collect();
        if adjustable.is_empty() {
            break;
        }

        let adjustable_total: f32 = adjustable
            .iter()
            .filter_map(|&i| records.get(i))
            .map(|r| r.width)
            .sum();
        if adjustable_total <= 0.0 {
            break;
        }

        let mut absorbed = 0.0_f32;
        for &i in &adjustable {
            let Some(rec) = records.get_mut(i) else {
                continue;
            };
            let share = shortfall * (rec.width / adjustable_total);
            let grow = share.min(rec.headroom());
            if grow > 0.0 {
                rec.width += grow;
                absorbed += grow;
                changed = true;
            }
        }

        shortfall -= absorbed;
        // No progress this round means every candidate is effectively capped.
        if absorbed <= tolerance || shortfall <= tolerance {
            break;
        }
    }
    changed
}

/// Minimum-fill pass: if the total width of `records` is below
/// `ratio * container_width`, distribute the shortfall across auto-sized
/// columns (or manual ones too, when allowed).
pub fn ensure_minimum_fill(
    records: &mut [ColumnWidthRecord],
    container_width: f32,
    ratio: f32,
    tolerance: f32,
    include_manual: bool,
) -> bool {
    if container_width <= 0.0 {
        return false;
    }
    let target = container_width * ratio;
    let total: f32 = records.iter().map(|r| r.width).sum();
    if total >= target {
        return false;
    }
    fill_to_target(records, target, tolerance, include_manual)
}

/// Steady-state pass: clamp every record into bounds, then grow resizable
/// columns proportionally until the viewport deficit is absorbed or nothing
/// can grow further.
pub fn clamp_and_redistribute(
    records: &mut [ColumnWidthRecord],
    viewport_width: f32,
    tolerance: f32,
) -> bool {
    let mut changed = false;
    for rec in records.iter_mut() {
        if rec.reclamp(tolerance) {
            changed = true;
        }
    }
    if viewport_width > 0.0 && fill_to_target(records, viewport_width, tolerance, false) {
        changed = true;
    }
    changed
}
