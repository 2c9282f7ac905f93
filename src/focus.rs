//! Focus state store.
//!
//! Pure state: the focused cell, the editing flag, the owning surface, and
//! a deferred focus shift. Mutated only through the accessors here, always
//! synchronously from the UI thread.

/// Identifies the window/frame context a grid instance lives in.
///
/// Proxies are kept in an arena keyed by this id with explicit teardown,
/// rather than weakly keyed by a document reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// The focused cell. `None` fields mean "no focus."
///
/// While `editing == false` these must always reference a currently
/// displayed row and column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusCoords {
    pub row: Option<u32>,
    pub col_id: Option<String>,
}

impl FocusCoords {
    pub fn at(row: u32, col_id: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            col_id: Some(col_id.into()),
        }
    }

    /// Both coordinates present.
    pub fn resolved(&self) -> Option<(u32, &str)> {
        match (self.row, self.col_id.as_deref()) {
            (Some(row), Some(col)) => Some((row, col)),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.row.is_some() && self.col_id.is_some()
    }
}

/// A focus move queued because its target does not exist yet, e.g. the row
/// being inserted by the host application. Applied after the grid re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingShift {
    pub row_delta: i32,
    pub col_delta: i32,
}

/// Per-controller focus state.
#[derive(Debug)]
pub struct FocusState {
    coords: FocusCoords,
    editing: bool,
    surface: SurfaceId,
    pending_shift: Option<PendingShift>,
}

impl FocusState {
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            coords: FocusCoords::default(),
            editing: false,
            surface,
            pending_shift: None,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn coords(&self) -> &FocusCoords {
        &self.coords
    }

    pub fn set_coords(&mut self, row: u32, col_id: impl Into<String>) {
        self.coords = FocusCoords::at(row, col_id);
    }

    pub fn clear_coords(&mut self) {
        self.coords = FocusCoords::default();
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Queue a deferred shift; replaces any previously queued one.
    pub fn queue_shift(&mut self, shift: PendingShift) {
        self.pending_shift = Some(shift);
    }

    pub fn pending_shift(&self) -> Option<PendingShift> {
        self.pending_shift
    }

    pub fn clear_shift(&mut self) {
        self.pending_shift = None;
    }

    /// Reset everything except the surface binding. Used at teardown.
    pub fn reset(&mut self) {
        self.coords = FocusCoords::default();
        self.editing = false;
        self.pending_shift = None;
    }
}
