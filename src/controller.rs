//! The interaction façade: owns the focus store and the component set,
//! dispatches grid lifecycle events to them, and reports outcomes to the
//! embedder's registered callbacks.
//!
//! The controller core is platform-free. Anything that needs a timer or the
//! capture proxy is returned as an [`Effect`] for the wasm shell to execute;
//! native tests assert on the effect stream directly.

use std::rc::Rc;

use log::debug;

use crate::capture::ProxyKey;
use crate::clipboard::{self, CopyAction};
use crate::columns::ColumnLayoutManager;
use crate::columns::width::WidthPair;
use crate::config::InteractionConfig;
use crate::enter::EnterCoordinator;
use crate::error::RejectReason;
use crate::focus::{FocusState, SurfaceId};
use crate::host::GridHost;
use crate::navigate::{self, CellEditReport, EnterDisposition};
use crate::paste_exit::{PasteExitController, PasteExitStep};
use crate::viewport::ActivityReason;

/// Outbound integration points. All optional; unset callbacks make the
/// corresponding report a no-op.
#[derive(Default, Clone)]
pub struct HostCallbacks {
    pub cell_edit: Option<Rc<dyn Fn(&CellEditReport)>>,
    /// Row insertion request, with the resolved column id.
    pub enter_at_last_row: Option<Rc<dyn Fn(&str)>>,
    /// A finished manual column resize, already re-clamped and remembered.
    pub column_resize: Option<Rc<dyn Fn(&WidthPair)>>,
    /// Ordered field list after a column move.
    pub column_reorder: Option<Rc<dyn Fn(&[String])>>,
    /// A link-bearing cell was activated.
    pub open_cell_link: Option<Rc<dyn Fn(&str)>>,
    /// Structured copy: "copy row as template", by row identity.
    pub copy_template: Option<Rc<dyn Fn(u32)>>,
    /// Structured copy: "copy referenced section", by row identity.
    pub copy_section: Option<Rc<dyn Fn(u32)>>,
}

/// Work the platform shell must carry out after an event was dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)arm the capture proxy over the cell.
    ArmProxy { row: u32, col_id: String },
    /// Cancel any live capture session.
    CancelProxy(RejectReason),
    /// Run the two chained settle delays, then call
    /// [`InteractionController::complete_enter`].
    ScheduleEnterSettle,
    /// Write text to the system clipboard.
    CopyText(String),
    /// Start (or restart) the paste-exit reset timer.
    StartPasteResetTimer(u32),
    /// Call [`InteractionController::paste_retry_tick`] after the delay.
    SchedulePasteRetry(u32),
}

pub struct InteractionController {
    cfg: InteractionConfig,
    focus: FocusState,
    enter: EnterCoordinator,
    paste_exit: PasteExitController,
    columns: ColumnLayoutManager,
    callbacks: HostCallbacks,
    /// Column id captured when the Enter trigger fired, for resolution.
    enter_event_col: Option<String>,
    destroyed: bool,
}

impl InteractionController {
    pub fn new(cfg: InteractionConfig, surface: SurfaceId) -> Self {
        Self {
            focus: FocusState::new(surface),
            enter: EnterCoordinator::new(),
            paste_exit: PasteExitController::new(&cfg),
            columns: ColumnLayoutManager::new(&cfg),
            callbacks: HostCallbacks::default(),
            enter_event_col: None,
            destroyed: false,
            cfg,
        }
    }

    pub fn set_callbacks(&mut self, callbacks: HostCallbacks) {
        self.callbacks = callbacks;
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.cfg
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    pub fn columns(&self) -> &ColumnLayoutManager {
        &self.columns
    }

    /// Arm effect for the current focus, or nothing if focus is absent or
    /// an editor is already up.
    fn arm_at_focus(&self) -> Option<Effect> {
        if self.destroyed || self.focus.is_editing() {
            return None;
        }
        let (row, col_id) = self.focus.coords().resolved()?;
        Some(Effect::ArmProxy {
            row,
            col_id: col_id.to_owned(),
        })
    }

    // --- grid lifecycle events -------------------------------------------

    /// The grid reported a focused cell.
    pub fn on_cell_focused(&mut self, _host: &mut dyn GridHost, row: u32, col_id: &str) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        self.focus.set_coords(row, col_id);
        self.arm_at_focus().into_iter().collect()
    }

    /// A key went down on a grid cell outside the proxy (e.g. before the
    /// proxy was armed). Keeps focus fresh and re-arms.
    pub fn on_cell_key_down(&mut self, host: &mut dyn GridHost, row: u32, col_id: &str) -> Vec<Effect> {
        self.on_cell_focused(host, row, col_id)
    }

    /// The grid's own editor appeared.
    pub fn on_editing_started(&mut self, host: &mut dyn GridHost, row: u32, col_id: &str) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        self.focus.set_coords(row, col_id);
        self.focus.set_editing(true);
        let mut effects = vec![Effect::CancelProxy(RejectReason::EditingStarted)];
        // Editing-started while a paste is pending doubles as the paste-end
        // signal.
        if let PasteExitStep::AttemptExit = self.paste_exit.on_follow_up() {
            effects.extend(self.attempt_paste_exit(host));
        }
        effects
    }

    /// The grid's editor went away.
    pub fn on_editing_stopped(&mut self, _host: &mut dyn GridHost) -> Vec<Effect> {
        self.focus.set_editing(false);
        self.arm_at_focus().into_iter().collect()
    }

    /// First-render: the grid is laid out, measure and set column widths.
    pub fn on_first_render(&mut self, host: &mut dyn GridHost) {
        if self.destroyed {
            return;
        }
        self.columns.initialize(host);
    }

    /// Rows changed underneath us: apply any deferred focus shift, then
    /// re-settle column widths.
    pub fn on_model_updated(&mut self, host: &mut dyn GridHost) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if navigate::apply_pending_shift(&mut self.focus, host) {
            effects.extend(self.arm_at_focus());
        }
        self.columns.apply_steady_state(host);
        effects
    }

    /// Scroll/resize activity: the armed position is stale. A resize is
    /// also a layout trigger, so the steady-state width pass runs here.
    pub fn on_viewport_activity(
        &mut self,
        host: &mut dyn GridHost,
        reason: ActivityReason,
    ) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        let reject = match reason {
            ActivityReason::Scroll => RejectReason::Scroll,
            ActivityReason::Resize => {
                self.columns.apply_steady_state(host);
                RejectReason::Resize
            }
        };
        let mut effects = vec![Effect::CancelProxy(reject)];
        effects.extend(self.arm_at_focus());
        effects
    }

    /// A user column resize finished.
    pub fn on_column_resized(
        &mut self,
        host: &mut dyn GridHost,
        col_id: &str,
        new_width: f32,
        finished: bool,
    ) {
        if self.destroyed || !finished {
            return;
        }
        if let Some(pair) = self.columns.on_manual_resize(host, col_id, new_width) {
            if let Some(cb) = &self.callbacks.column_resize {
                cb(&pair);
            }
        }
    }

    /// Columns were reordered; report the resulting field order.
    pub fn on_column_moved(&mut self, host: &mut dyn GridHost) {
        if self.destroyed {
            return;
        }
        let Some(cb) = &self.callbacks.column_reorder else {
            return;
        };
        let order: Vec<String> = host
            .displayed_columns()
            .iter()
            .filter(|c| !c.is_reserved())
            .map(|c| c.value_key().to_owned())
            .collect();
        cb(&order);
    }

    // --- proxy-forwarded keys --------------------------------------------

    /// A non-printable key forwarded by the capture proxy while armed.
    ///
    /// `exact_index_target` reports whether the event target was exactly the
    /// index column's cell element (the structured-copy precondition).
    pub fn on_proxy_key(
        &mut self,
        host: &mut dyn GridHost,
        key: ProxyKey,
        shift: bool,
        exact_index_target: bool,
    ) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        match key {
            ProxyKey::ArrowUp => self.move_and_rearm(host, -1, 0),
            ProxyKey::ArrowDown => self.move_and_rearm(host, 1, 0),
            ProxyKey::ArrowLeft => self.move_and_rearm(host, 0, -1),
            ProxyKey::ArrowRight => self.move_and_rearm(host, 0, 1),
            ProxyKey::Tab => {
                let delta = if shift { -1 } else { 1 };
                self.move_and_rearm(host, 0, delta)
            }
            ProxyKey::Enter => self.handle_enter(host, shift),
            ProxyKey::Delete | ProxyKey::Backspace => {
                if let Some(report) = navigate::handle_delete_key(&self.focus, host) {
                    if let Some(cb) = &self.callbacks.cell_edit {
                        cb(&report);
                    }
                }
                self.arm_at_focus().into_iter().collect()
            }
            ProxyKey::Copy => self.handle_copy(host, exact_index_target),
            ProxyKey::EditStart => {
                if let Some((row, col_id)) = self.focus.coords().resolved() {
                    let col_id = col_id.to_owned();
                    host.start_editing(row, &col_id);
                }
                Vec::new()
            }
        }
    }

    fn move_and_rearm(&mut self, host: &mut dyn GridHost, row_delta: i32, col_delta: i32) -> Vec<Effect> {
        let mut effects = vec![Effect::CancelProxy(RejectReason::FocusMove)];
        if navigate::move_focus(&mut self.focus, host, row_delta, col_delta) {
            effects.extend(self.arm_at_focus());
        }
        effects
    }

    fn handle_enter(&mut self, host: &mut dyn GridHost, shift: bool) -> Vec<Effect> {
        match navigate::handle_proxy_enter(&mut self.focus, host, shift) {
            EnterDisposition::Moved => {
                let mut effects = vec![Effect::CancelProxy(RejectReason::FocusMove)];
                effects.extend(self.arm_at_focus());
                effects
            }
            EnterDisposition::AtLastRow => {
                if self.enter.trigger() {
                    self.enter_event_col =
                        self.focus.coords().resolved().map(|(_, c)| c.to_owned());
                    vec![Effect::ScheduleEnterSettle]
                } else {
                    debug!("enter ignored: insertion already pending");
                    Vec::new()
                }
            }
            EnterDisposition::NoFocus => Vec::new(),
        }
    }

    fn handle_copy(&mut self, host: &mut dyn GridHost, exact_index_target: bool) -> Vec<Effect> {
        let action = clipboard::resolve_copy(
            &self.focus,
            host,
            exact_index_target,
            self.callbacks.copy_template.is_some(),
            self.callbacks.copy_section.is_some(),
        );
        let effects = match action {
            CopyAction::Template(identity) => {
                if let Some(cb) = &self.callbacks.copy_template {
                    cb(identity);
                }
                Vec::new()
            }
            CopyAction::Section(identity) => {
                if let Some(cb) = &self.callbacks.copy_section {
                    cb(identity);
                }
                Vec::new()
            }
            CopyAction::Literal(text) => vec![Effect::CopyText(text)],
            CopyAction::None => return Vec::new(),
        };
        // Any taken copy action also asks the grid to leave edit mode.
        let _ = host.stop_editing();
        effects
    }

    /// A forwarded activation on a link-bearing cell.
    pub fn on_cell_link_activated(&mut self, host: &mut dyn GridHost, row: u32, col_id: &str) {
        let columns = host.displayed_columns();
        let Some(column) = columns.iter().find(|c| c.id == col_id) else {
            return;
        };
        let Some(value) = host.cell_value(row, column.value_key()) else {
            return;
        };
        let trimmed = value.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Some(cb) = &self.callbacks.open_cell_link {
                cb(trimmed);
            }
        }
    }

    // --- enter settle -----------------------------------------------------

    /// Called by the shell after the settle delays have elapsed: resolve
    /// the column to report, stop any active edit, invoke the add-row
    /// callback, queue the post-insert shift.
    pub fn complete_enter(&mut self, host: &mut dyn GridHost) {
        if self.destroyed || !self.enter.is_pending() {
            return;
        }
        let stored = self
            .focus
            .coords()
            .resolved()
            .map(|(_, c)| c.to_owned());
        let col_id = EnterCoordinator::resolve_for_completion(
            self.enter_event_col.as_deref(),
            stored.as_deref(),
            host,
        );
        if let Some(cb) = &self.callbacks.enter_at_last_row {
            cb(&col_id);
        }
        navigate::queue_post_insert_shift(&mut self.focus);
        self.enter_event_col = None;
        self.enter.complete();
    }

    // --- paste exit -------------------------------------------------------

    /// A paste signal (key combo or native paste event) was observed.
    pub fn on_paste_signal(&mut self) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        match self.paste_exit.on_paste_signal() {
            PasteExitStep::StartResetTimer(ms) => vec![Effect::StartPasteResetTimer(ms)],
            _ => Vec::new(),
        }
    }

    /// The grid reported the paste finished.
    pub fn on_paste_end(&mut self, host: &mut dyn GridHost) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        match self.paste_exit.on_follow_up() {
            PasteExitStep::AttemptExit => self.attempt_paste_exit(host),
            _ => Vec::new(),
        }
    }

    /// Reset timer fired with nothing having happened.
    pub fn paste_reset_tick(&mut self) {
        self.paste_exit.on_reset_timer();
    }

    /// Retry timer fired; try to leave edit mode again.
    pub fn paste_retry_tick(&mut self, host: &mut dyn GridHost) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        self.attempt_paste_exit(host)
    }

    fn attempt_paste_exit(&mut self, host: &mut dyn GridHost) -> Vec<Effect> {
        let outcome = host.stop_editing();
        match self.paste_exit.on_attempt(outcome) {
            PasteExitStep::RetryAfter(ms) => vec![Effect::SchedulePasteRetry(ms)],
            _ => Vec::new(),
        }
    }

    // --- teardown ---------------------------------------------------------

    /// Idempotent. Clears focus state and invalidates any live capture.
    pub fn destroy(&mut self) -> Vec<Effect> {
        if self.destroyed {
            return Vec::new();
        }
        self.destroyed = true;
        self.focus.reset();
        self.enter_event_col = None;
        vec![Effect::CancelProxy(RejectReason::Destroyed)]
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn enter_pending(&self) -> bool {
        self.enter.is_pending()
    }
}
