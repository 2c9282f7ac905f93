//! Hidden DOM input host that captures the first keystrokes of a cell-entry
//! attempt, including multi-stage IME composition, before the grid's own
//! editor exists.
//!
//! The proxy owns a single always-reusable `<input>` per surface. Arming
//! positions it exactly over the focused cell and focuses it; keystrokes
//! land in the input (so composition works natively) while non-printable
//! keys are forwarded to the controller. All timer and observer callbacks
//! carry a session token and validate it before acting.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    CompositionEvent, Document, Element, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent,
    MutationObserver, MutationObserverInit,
};

use super::keys::{classify, KeyClass, ProxyKey};
use super::session::{CaptureOutcome, SessionRegistry, SessionToken};
use crate::error::RejectReason;
use crate::focus::FocusCoords;

/// Selector for the rendered cell region of a (row, column) pair.
fn cell_selector(row: u32, col_id: &str) -> String {
    format!("[data-grid-cell][data-row='{row}'][data-col-id='{col_id}']")
}

/// Selector for the real editor's input element once the grid enters edit
/// mode.
const EDITOR_INPUT_SELECTOR: &str =
    "[data-grid-editing] input, [data-grid-editing] textarea";

/// Invoked with `(row, col_id, text)` when a capture resolves; expected to
/// start real cell editing at those coordinates.
pub type ResolveSink = Rc<dyn Fn(u32, &str, &str)>;

/// Invoked with `(key, shift, ctrl)` for forwarded non-printable keys.
pub type KeyHandler = Rc<dyn Fn(ProxyKey, bool, bool)>;

pub(crate) struct ProxyShared {
    document: Document,
    input: Option<HtmlInputElement>,
    pub(crate) registry: SessionRegistry,
    ascii_idle_ms: u32,
    editor_wait_ms: u32,
    idle_timer: Option<i32>,
    editor_wait_timer: Option<i32>,
    editor_observer: Option<MutationObserver>,
    key_handler: Option<KeyHandler>,
    resolve_sink: Option<ResolveSink>,
    destroyed: bool,
}

/// One capture proxy per rendering surface.
pub struct CaptureProxy {
    state: Rc<RefCell<ProxyShared>>,
    // Kept alive for the lifetime of the host input element.
    #[allow(dead_code)]
    listeners: Vec<(&'static str, Closure<dyn FnMut(web_sys::Event)>)>,
}

impl CaptureProxy {
    pub fn new(document: Document, ascii_idle_ms: u32, editor_wait_ms: u32) -> Self {
        let state = Rc::new(RefCell::new(ProxyShared {
            document,
            input: None,
            registry: SessionRegistry::new(),
            ascii_idle_ms,
            editor_wait_ms,
            idle_timer: None,
            editor_wait_timer: None,
            editor_observer: None,
            key_handler: None,
            resolve_sink: None,
            destroyed: false,
        }));
        let mut proxy = Self {
            state,
            listeners: Vec::new(),
        };
        proxy.ensure_host_input();
        proxy
    }

    pub fn set_key_handler(&self, handler: Option<KeyHandler>) {
        self.state.borrow_mut().key_handler = handler;
    }

    pub fn set_resolve_sink(&self, sink: Option<ResolveSink>) {
        self.state.borrow_mut().resolve_sink = sink;
    }

    /// Arm the hidden host over the cell at `coords`.
    ///
    /// Cancels any prior session (`rearm`) first. Logs and returns without
    /// arming when focus is absent or the cell region cannot be located.
    pub fn arm_for_cell(&self, coords: &FocusCoords) {
        Self::arm_state(&self.state, coords);
    }

    /// Reject any live session. For lifecycle reasons this leaves a
    /// post-resolution editor wait running: once a capture resolved, the
    /// grid reporting editing-started is the hand-off succeeding, not a
    /// reason to abandon it.
    pub fn cancel(&self, reason: RejectReason) {
        let mut s = self.state.borrow_mut();
        Self::clear_idle_timer(&mut s);
        if reason.aborts_editor_handoff() {
            Self::clear_editor_wait(&mut s);
        }
        if let Some(session) = s.registry.cancel(reason) {
            log::debug!(
                "capture cancelled ({reason}) at {:?}",
                session.cell()
            );
        }
    }

    /// Tear down the host input and reject any pending session. Idempotent.
    pub fn destroy(&self) {
        let mut s = self.state.borrow_mut();
        if s.destroyed {
            return;
        }
        s.destroyed = true;
        Self::clear_timers(&mut s);
        s.registry.cancel(RejectReason::Destroyed);
        if let Some(input) = s.input.take() {
            if let Some(parent) = input.parent_node() {
                let _ = parent.remove_child(&input);
            }
        }
        s.key_handler = None;
        s.resolve_sink = None;
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn arm_state(state: &Rc<RefCell<ProxyShared>>, coords: &FocusCoords) {
        let Some((row, col_id)) = coords.resolved() else {
            let mut s = state.borrow_mut();
            Self::clear_timers(&mut s);
            s.registry.cancel(RejectReason::FocusCleared);
            log::debug!("arm skipped: focus-cleared");
            return;
        };
        let col_id = col_id.to_string();

        let cell: Option<Element> = {
            let s = state.borrow();
            if s.destroyed {
                return;
            }
            s.document
                .query_selector(&cell_selector(row, &col_id))
                .ok()
                .flatten()
        };
        let Some(cell) = cell else {
            let mut s = state.borrow_mut();
            Self::clear_timers(&mut s);
            s.registry.cancel(RejectReason::CellMissing);
            log::debug!("arm skipped: cell-missing at ({row}, {col_id})");
            return;
        };

        let rect = cell.get_bounding_client_rect();
        let mut s = state.borrow_mut();
        Self::clear_timers(&mut s);
        let (_token, displaced) = s.registry.arm(row, &col_id);
        if let Some(old) = displaced {
            log::debug!("capture displaced (rearm) at {:?}", old.cell());
        }

        let Some(input) = s.input.clone() else {
            return;
        };
        let style = input.style();
        let _ = style.set_property("left", &format!("{}px", rect.left()));
        let _ = style.set_property("top", &format!("{}px", rect.top()));
        let _ = style.set_property("width", &format!("{}px", rect.width().max(1.0)));
        let _ = style.set_property("height", &format!("{}px", rect.height().max(1.0)));
        input.set_value("");
        drop(s);
        let _ = input.focus();
    }

    fn clear_timers(s: &mut ProxyShared) {
        Self::clear_idle_timer(s);
        Self::clear_editor_wait(s);
    }

    fn clear_idle_timer(s: &mut ProxyShared) {
        if let Some(id) = s.idle_timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
        }
    }

    fn clear_editor_wait(s: &mut ProxyShared) {
        if let Some(id) = s.editor_wait_timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
        }
        if let Some(observer) = s.editor_observer.take() {
            observer.disconnect();
        }
    }

    /// (Re)start the ASCII idle timer for the current session. Cancel any
    /// previous timer first; the fire validates its token.
    #[allow(clippy::cast_possible_wrap)]
    fn restart_idle_timer(state: &Rc<RefCell<ProxyShared>>, token: SessionToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let delay = {
            let mut s = state.borrow_mut();
            if let Some(id) = s.idle_timer.take() {
                window.clear_timeout_with_handle(id);
            }
            s.ascii_idle_ms
        };

        let weak = Rc::downgrade(state);
        let closure = Closure::once_into_js(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            Self::handle_idle_fire(&state, token);
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            delay as i32,
        ) {
            Ok(id) => state.borrow_mut().idle_timer = Some(id),
            Err(_) => state.borrow_mut().idle_timer = None,
        }
    }

    fn handle_idle_fire(state: &Rc<RefCell<ProxyShared>>, token: SessionToken) {
        let resolved = {
            let mut s = state.borrow_mut();
            s.idle_timer = None;
            s.registry.resolve_idle(token)
        };
        if let Some(session) = resolved {
            Self::deliver_resolution(state, &session);
        }
    }

    fn deliver_resolution(state: &Rc<RefCell<ProxyShared>>, session: &super::session::CaptureSession) {
        let Some(CaptureOutcome::Text(text)) = session.outcome().cloned() else {
            return;
        };
        let (row, col_id) = session.cell();
        let col_id = col_id.to_string();
        log::trace!("capture resolved at ({row}, {col_id}): {} chars", text.chars().count());

        let sink = state.borrow().resolve_sink.clone();
        if let Some(sink) = sink {
            sink(row, &col_id, &text);
        }
        Self::begin_editor_wait(state, row, col_id, text);
    }

    /// Bounded wait for the real editor's input element, via mutation
    /// observation of the editing DOM. On success write the captured text,
    /// caret at end, and focus; on timeout warn and re-arm the same cell.
    #[allow(clippy::cast_possible_wrap)]
    fn begin_editor_wait(state: &Rc<RefCell<ProxyShared>>, row: u32, col_id: String, text: String) {
        let Some(window) = web_sys::window() else {
            return;
        };
        // The editor may already be in the DOM by the time we look.
        if Self::try_fill_editor(state, &text) {
            return;
        }

        let weak = Rc::downgrade(state);
        let text_for_observer = text.clone();
        let observer_cb = Closure::wrap(Box::new(
            move |_records: js_sys::Array, observer: MutationObserver| {
                let Some(state) = weak.upgrade() else {
                    observer.disconnect();
                    return;
                };
                if Self::try_fill_editor(&state, &text_for_observer) {
                    observer.disconnect();
                    let mut s = state.borrow_mut();
                    s.editor_observer = None;
                    if let Some(id) = s.editor_wait_timer.take() {
                        if let Some(window) = web_sys::window() {
                            window.clear_timeout_with_handle(id);
                        }
                    }
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = match MutationObserver::new(observer_cb.as_ref().unchecked_ref()) {
            Ok(o) => o,
            Err(_) => return,
        };
        observer_cb.forget();

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        let body = state.borrow().document.body();
        if let Some(body) = body {
            let _ = observer.observe_with_options(&body, &init);
        }

        let delay = {
            let mut s = state.borrow_mut();
            if let Some(old) = s.editor_observer.replace(observer) {
                old.disconnect();
            }
            s.editor_wait_ms
        };

        let weak = Rc::downgrade(state);
        let timeout_cb = Closure::once_into_js(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            {
                let mut s = state.borrow_mut();
                s.editor_wait_timer = None;
                if let Some(observer) = s.editor_observer.take() {
                    observer.disconnect();
                }
            }
            log::warn!("editor-wait-timeout at ({row}, {col_id}); re-arming");
            Self::arm_state(&state, &FocusCoords::at(row, col_id.clone()));
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            timeout_cb.unchecked_ref(),
            delay as i32,
        ) {
            Ok(id) => state.borrow_mut().editor_wait_timer = Some(id),
            Err(_) => state.borrow_mut().editor_wait_timer = None,
        }
    }

    /// Locate the real editor input; on success write the text, put the
    /// caret at the end, and focus it.
    #[allow(clippy::cast_possible_truncation)]
    fn try_fill_editor(state: &Rc<RefCell<ProxyShared>>, text: &str) -> bool {
        let element = {
            let s = state.borrow();
            s.document
                .query_selector(EDITOR_INPUT_SELECTOR)
                .ok()
                .flatten()
        };
        let Some(element) = element else {
            return false;
        };
        let end = text.encode_utf16().count() as u32;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(text);
            let _ = input.set_selection_range(end, end);
            let _ = input.focus();
            return true;
        }
        if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(text);
            let _ = area.set_selection_range(end, end);
            let _ = area.focus();
            return true;
        }
        false
    }

    /// Create the hidden, reusable host input and wire its listeners.
    fn ensure_host_input(&mut self) {
        let input = {
            let s = self.state.borrow();
            let Ok(el) = s.document.create_element("input") else {
                return;
            };
            let Ok(input) = el.dyn_into::<HtmlInputElement>() else {
                return;
            };
            input.set_type("text");
            let style = input.style();
            let _ = style.set_property("position", "fixed");
            let _ = style.set_property("z-index", "1000");
            let _ = style.set_property("box-sizing", "border-box");
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("border", "none");
            let _ = style.set_property("outline", "none");
            let _ = style.set_property("padding", "0");
            let _ = style.set_property("background", "transparent");
            if let Some(body) = s.document.body() {
                let _ = body.append_child(&input);
            }
            input
        };

        // Keydown: classify and either pass through, forward, or ignore.
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                Self::handle_key_down(&state, event);
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ = input
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            self.listeners.push(("keydown", closure));
        }

        // Input: sync the session buffer and restart the idle timer.
        {
            let state = Rc::clone(&self.state);
            let input_for_read = input.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let value = input_for_read.value();
                let token = {
                    let mut s = state.borrow_mut();
                    let Some(session) = s.registry.current_mut() else {
                        return;
                    };
                    session.sync_buffer(&value);
                    if session.is_composing() {
                        None
                    } else {
                        Some(session.token())
                    }
                };
                if let Some(token) = token {
                    Self::restart_idle_timer(&state, token);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ =
                input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            self.listeners.push(("input", closure));
        }

        // Composition start: suspend the ASCII fast path.
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                let mut s = state.borrow_mut();
                if let Some(session) = s.registry.current_mut() {
                    session.begin_composition();
                }
                if let Some(id) = s.idle_timer.take() {
                    if let Some(window) = web_sys::window() {
                        window.clear_timeout_with_handle(id);
                    }
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ = input.add_event_listener_with_callback(
                "compositionstart",
                closure.as_ref().unchecked_ref(),
            );
            self.listeners.push(("compositionstart", closure));
        }

        // Composition end: resolve with the committed text.
        {
            let state = Rc::clone(&self.state);
            let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let committed = event
                    .dyn_ref::<CompositionEvent>()
                    .and_then(|e| e.data())
                    .unwrap_or_default();
                let resolved = {
                    let mut s = state.borrow_mut();
                    let Some(token) = s.registry.current().map(|c| c.token()) else {
                        return;
                    };
                    s.registry.resolve_composed(token, &committed)
                };
                if let Some(session) = resolved {
                    Self::deliver_resolution(&state, &session);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);
            let _ = input.add_event_listener_with_callback(
                "compositionend",
                closure.as_ref().unchecked_ref(),
            );
            self.listeners.push(("compositionend", closure));
        }

        self.state.borrow_mut().input = Some(input);
    }

    fn handle_key_down(state: &Rc<RefCell<ProxyShared>>, event: &KeyboardEvent) {
        let key = event.key();
        let ctrl = event.ctrl_key() || event.meta_key();
        let (composing, handler) = {
            let s = state.borrow();
            let composing = s
                .registry
                .current()
                .is_some_and(|session| session.is_composing());
            (composing, s.key_handler.clone())
        };
        // While composing, everything belongs to the IME.
        if composing {
            return;
        }
        match classify(&key, ctrl) {
            KeyClass::Printable | KeyClass::Ignore => {}
            KeyClass::CancelCapture => {
                event.prevent_default();
                event.stop_propagation();
                let mut s = state.borrow_mut();
                Self::clear_timers(&mut s);
                if s.registry.cancel(RejectReason::Cancelled).is_some() {
                    log::debug!("capture cancelled (escape)");
                }
            }
            KeyClass::Forward(pk) => {
                event.prevent_default();
                event.stop_propagation();
                if let Some(handler) = handler {
                    handler(pk, event.shift_key(), ctrl);
                }
            }
        }
    }
}

impl Drop for CaptureProxy {
    fn drop(&mut self) {
        self.destroy();
    }
}
