//! gridcap - IME-safe input capture and column layout for spreadsheet grids
//!
//! Sits between a third-party grid widget and the page via WebAssembly:
//! - First-keystroke capture ahead of the grid's own cell editor, including
//!   multi-stage IME composition
//! - Keyboard navigation, delete-to-clear, Enter-at-last-row row insertion
//! - Deterministic column widths across auto-sized, configured, and
//!   manually resized columns
//! - Structured and literal clipboard copy
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridInput } from 'gridcap';
//! await init();
//! const input = GridInput.attach(gridAdapter, container, { asciiIdleMs: 180 });
//! input.on_cell_edit((row, colId, oldValue, newValue) => { ... });
//! input.notify_first_render();
//! ```

pub mod capture;
pub mod clipboard;
pub mod columns;
pub mod config;
pub mod controller;
pub mod enter;
pub mod error;
pub mod focus;
pub mod host;
pub mod navigate;
pub mod paste_exit;
pub mod viewport;

pub use config::InteractionConfig;
pub use controller::{Effect, HostCallbacks, InteractionController};
pub use error::{GridCapError, RejectReason, Result};
pub use focus::{FocusCoords, FocusState, SurfaceId};
pub use host::{ColumnDef, ColumnKind, EditRule, GridHost, StopEditOutcome};

use wasm_bindgen::prelude::wasm_bindgen;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// WASM32: JS-facing facade
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use facade::GridInput;

#[cfg(target_arch = "wasm32")]
mod facade {
    use std::cell::RefCell;
    use std::rc::Rc;

    use js_sys::Function;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, Element, HtmlElement};

    use crate::capture::arena::ProxyArena;
    use crate::config::ENTER_SETTLE_MS;
    use crate::clipboard::copy_text_to_clipboard;
    use crate::config::InteractionConfig;
    use crate::controller::{Effect, HostCallbacks, InteractionController};
    use crate::error::GridCapError;
    use crate::focus::{FocusCoords, SurfaceId};
    use crate::host::{GridHost, JsGrid, INDEX_COLUMN_ID};
    use crate::navigate::CellEditReport;
    use crate::viewport::ViewportManager;

    /// Selector for the grid's internal scrollable regions.
    const SCROLL_REGION_SELECTOR: &str = "[data-grid-scroll]";

    struct AppShared {
        controller: InteractionController,
        host: JsGrid,
        proxies: ProxyArena,
        viewport: Option<ViewportManager>,
        callbacks: HostCallbacks,
        surface: SurfaceId,
        document: Document,
        paste_reset_timer: Option<i32>,
    }

    /// The JS-facing entry point: one instance per grid.
    ///
    /// The embedder forwards grid lifecycle events through the `notify_*`
    /// methods and registers outbound callbacks through the `on_*` methods.
    #[wasm_bindgen]
    pub struct GridInput {
        app: Rc<RefCell<AppShared>>,
    }

    #[wasm_bindgen]
    impl GridInput {
        /// Attach to a grid. `adapter` is the capability object (camelCase
        /// methods), `container` the grid's outer element, `config` an
        /// optional plain-object override of the defaults.
        #[wasm_bindgen]
        pub fn attach(
            adapter: JsValue,
            container: HtmlElement,
            config: JsValue,
        ) -> std::result::Result<GridInput, JsValue> {
            console_error_panic_hook::set_once();
            let cfg: InteractionConfig = if config.is_null() || config.is_undefined() {
                InteractionConfig::default()
            } else {
                serde_wasm_bindgen::from_value(config)
                    .map_err(|e| GridCapError::Config(e.to_string()))?
            };
            if let Some(level) = cfg.verbosity.to_level() {
                let _ = console_log::init_with_level(level);
            }

            let document = container.owner_document().ok_or_else(|| {
                GridCapError::HostCapability("container is not in a document".to_string())
            })?;
            let surface = SurfaceId(0);

            let controller = InteractionController::new(cfg.clone(), surface);
            let app = Rc::new(RefCell::new(AppShared {
                controller,
                host: JsGrid::new(adapter),
                proxies: ProxyArena::new(),
                viewport: None,
                callbacks: HostCallbacks::default(),
                surface,
                document,
                paste_reset_timer: None,
            }));

            Self::wire_proxy(&app);
            Self::wire_viewport(&app, &container);

            Ok(GridInput { app })
        }

        // --- lifecycle events from the grid ------------------------------

        pub fn notify_cell_focused(&self, row: u32, col_id: &str) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_cell_focused(host, row, col_id)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_cell_key_down(&self, row: u32, col_id: &str) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_cell_key_down(host, row, col_id)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_editing_started(&self, row: u32, col_id: &str) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_editing_started(host, row, col_id)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_editing_stopped(&self) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_editing_stopped(host)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_first_render(&self) {
            let mut a = self.app.borrow_mut();
            let AppShared {
                controller, host, ..
            } = &mut *a;
            controller.on_first_render(host);
        }

        pub fn notify_model_updated(&self) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_model_updated(host)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_column_resized(&self, col_id: &str, new_width: f32, finished: bool) {
            let mut a = self.app.borrow_mut();
            let AppShared {
                controller, host, ..
            } = &mut *a;
            controller.on_column_resized(host, col_id, new_width, finished);
        }

        pub fn notify_column_moved(&self) {
            let mut a = self.app.borrow_mut();
            let AppShared {
                controller, host, ..
            } = &mut *a;
            controller.on_column_moved(host);
        }

        pub fn notify_paste_signal(&self) {
            let effects = self.app.borrow_mut().controller.on_paste_signal();
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_paste_end(&self) {
            let effects = {
                let mut a = self.app.borrow_mut();
                let AppShared {
                    controller, host, ..
                } = &mut *a;
                controller.on_paste_end(host)
            };
            Self::run_effects(&self.app, effects);
        }

        pub fn notify_cell_link_activated(&self, row: u32, col_id: &str) {
            let mut a = self.app.borrow_mut();
            let AppShared {
                controller, host, ..
            } = &mut *a;
            controller.on_cell_link_activated(host, row, col_id);
        }

        // --- outbound callbacks ------------------------------------------

        pub fn on_cell_edit(&self, callback: Function) {
            let cb = move |report: &CellEditReport| {
                let args = js_sys::Array::of4(
                    &JsValue::from_f64(f64::from(report.row)),
                    &JsValue::from_str(&report.col_id),
                    &JsValue::from_str(&report.old_value),
                    &JsValue::from_str(&report.new_value),
                );
                let _ = js_sys::Reflect::apply(&callback, &JsValue::NULL, &args);
            };
            self.update_callbacks(|c| c.cell_edit = Some(Rc::new(cb)));
        }

        pub fn on_enter_at_last_row(&self, callback: Function) {
            let cb = move |col_id: &str| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(col_id));
            };
            self.update_callbacks(|c| c.enter_at_last_row = Some(Rc::new(cb)));
        }

        pub fn on_column_resize(&self, callback: Function) {
            let cb = move |pair: &crate::columns::WidthPair| {
                let _ = callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(&pair.field),
                    &JsValue::from_f64(f64::from(pair.width)),
                );
            };
            self.update_callbacks(|c| c.column_resize = Some(Rc::new(cb)));
        }

        pub fn on_column_reorder(&self, callback: Function) {
            let cb = move |order: &[String]| {
                let arr = js_sys::Array::new();
                for field in order {
                    arr.push(&JsValue::from_str(field));
                }
                let _ = callback.call1(&JsValue::NULL, &arr);
            };
            self.update_callbacks(|c| c.column_reorder = Some(Rc::new(cb)));
        }

        pub fn on_open_cell_link(&self, callback: Function) {
            let cb = move |url: &str| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(url));
            };
            self.update_callbacks(|c| c.open_cell_link = Some(Rc::new(cb)));
        }

        pub fn on_copy_template(&self, callback: Function) {
            let cb = move |identity: u32| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_f64(f64::from(identity)));
            };
            self.update_callbacks(|c| c.copy_template = Some(Rc::new(cb)));
        }

        pub fn on_copy_section(&self, callback: Function) {
            let cb = move |identity: u32| {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_f64(f64::from(identity)));
            };
            self.update_callbacks(|c| c.copy_section = Some(Rc::new(cb)));
        }

        /// Subscribe to debounced, size-filtered container resize reports,
        /// independent of the internal re-arm path.
        pub fn on_viewport_resize(&self, callback: Function) {
            let a = self.app.borrow();
            if let Some(viewport) = &a.viewport {
                viewport.on_viewport_resize(Rc::new(
                    move |activity: crate::viewport::ViewportActivity| {
                        let _ = callback
                            .call1(&JsValue::NULL, &JsValue::from_str(activity.reason.as_str()));
                    },
                ));
            }
        }

        /// Detach everything: listeners, timers, the capture proxy, focus
        /// state. Idempotent.
        pub fn destroy(&self) {
            let effects = {
                let mut a = self.app.borrow_mut();
                if let Some(mut viewport) = a.viewport.take() {
                    viewport.detach();
                }
                if let Some(id) = a.paste_reset_timer.take() {
                    if let Some(window) = web_sys::window() {
                        window.clear_timeout_with_handle(id);
                    }
                }
                a.controller.destroy()
            };
            Self::run_effects(&self.app, effects);
            self.app.borrow_mut().proxies.teardown_all();
        }
    }

    impl GridInput {
        fn update_callbacks(&self, f: impl FnOnce(&mut HostCallbacks)) {
            let mut a = self.app.borrow_mut();
            f(&mut a.callbacks);
            let callbacks = a.callbacks.clone();
            a.controller.set_callbacks(callbacks);
        }

        /// Wire the capture proxy's key handler and resolve sink into the
        /// controller.
        fn wire_proxy(app: &Rc<RefCell<AppShared>>) {
            let (surface, document, idle_ms, wait_ms) = {
                let a = app.borrow();
                (
                    a.surface,
                    a.document.clone(),
                    a.controller.config().ascii_idle_ms,
                    a.controller.config().editor_wait_ms,
                )
            };

            let key_app = Rc::downgrade(app);
            let key_handler = Rc::new(move |key: crate::capture::ProxyKey, shift: bool, _ctrl: bool| {
                let Some(app) = key_app.upgrade() else {
                    return;
                };
                let effects = {
                    let mut a = app.borrow_mut();
                    // The proxy sits exactly over the focused cell, so a
                    // copy while armed on the index column targets it
                    // exactly.
                    let exact = a
                        .controller
                        .focus()
                        .coords()
                        .resolved()
                        .is_some_and(|(_, c)| c == INDEX_COLUMN_ID);
                    let AppShared {
                        controller, host, ..
                    } = &mut *a;
                    controller.on_proxy_key(host, key, shift, exact)
                };
                GridInput::run_effects(&app, effects);
            });

            let sink_app = Rc::downgrade(app);
            let resolve_sink = Rc::new(move |row: u32, col_id: &str, _text: &str| {
                let Some(app) = sink_app.upgrade() else {
                    return;
                };
                // The proxy fills and focuses the editor itself once it
                // appears; our part is starting the edit.
                app.borrow_mut().host.start_editing(row, col_id);
            });

            let mut a = app.borrow_mut();
            let proxy = a
                .proxies
                .get_or_create(surface, &document, idle_ms, wait_ms);
            proxy.set_key_handler(Some(key_handler));
            proxy.set_resolve_sink(Some(resolve_sink));
        }

        fn wire_viewport(app: &Rc<RefCell<AppShared>>, container: &HtmlElement) {
            let (debounce_ms, epsilon) = {
                let a = app.borrow();
                (
                    a.controller.config().resize_debounce_ms,
                    a.controller.config().resize_epsilon_px,
                )
            };
            let mut regions: Vec<Element> = Vec::new();
            if let Ok(list) = container.query_selector_all(SCROLL_REGION_SELECTOR) {
                for i in 0..list.length() {
                    if let Some(node) = list.get(i) {
                        if let Ok(element) = node.dyn_into::<Element>() {
                            regions.push(element);
                        }
                    }
                }
            }
            let viewport = ViewportManager::new(container, &regions, debounce_ms, epsilon);

            let activity_app = Rc::downgrade(app);
            viewport.set_activity_callback(Some(Rc::new(move |activity: crate::viewport::ViewportActivity| {
                let Some(app) = activity_app.upgrade() else {
                    return;
                };
                let effects = {
                    let mut a = app.borrow_mut();
                    let AppShared {
                        controller, host, ..
                    } = &mut *a;
                    controller.on_viewport_activity(host, activity.reason)
                };
                GridInput::run_effects(&app, effects);
            })));

            app.borrow_mut().viewport = Some(viewport);
        }

        fn run_effects(app: &Rc<RefCell<AppShared>>, effects: Vec<Effect>) {
            for effect in effects {
                match effect {
                    Effect::ArmProxy { row, col_id } => {
                        let a = app.borrow();
                        if let Some(proxy) = a.proxies.get(a.surface) {
                            proxy.arm_for_cell(&FocusCoords::at(row, col_id));
                        }
                    }
                    Effect::CancelProxy(reason) => {
                        let a = app.borrow();
                        if let Some(proxy) = a.proxies.get(a.surface) {
                            proxy.cancel(reason);
                        }
                    }
                    Effect::ScheduleEnterSettle => Self::schedule_enter_settle(app),
                    Effect::CopyText(text) => {
                        wasm_bindgen_futures::spawn_local(copy_text_to_clipboard(text));
                    }
                    Effect::StartPasteResetTimer(ms) => Self::start_paste_reset(app, ms),
                    Effect::SchedulePasteRetry(ms) => Self::schedule_paste_retry(app, ms),
                }
            }
        }

        /// Two chained short delays before the row insertion runs, letting
        /// the grid's edit-stop machinery settle.
        fn schedule_enter_settle(app: &Rc<RefCell<AppShared>>) {
            let weak = Rc::downgrade(app);
            Self::set_timeout(
                ENTER_SETTLE_MS[0],
                Box::new(move || {
                    let Some(app) = weak.upgrade() else {
                        return;
                    };
                    let inner = Rc::downgrade(&app);
                    Self::set_timeout(
                        ENTER_SETTLE_MS[1],
                        Box::new(move || {
                            let Some(app) = inner.upgrade() else {
                                return;
                            };
                            let mut a = app.borrow_mut();
                            let AppShared {
                                controller, host, ..
                            } = &mut *a;
                            controller.complete_enter(host);
                        }),
                    );
                }),
            );
        }

        fn start_paste_reset(app: &Rc<RefCell<AppShared>>, ms: u32) {
            {
                let mut a = app.borrow_mut();
                if let Some(id) = a.paste_reset_timer.take() {
                    if let Some(window) = web_sys::window() {
                        window.clear_timeout_with_handle(id);
                    }
                }
            }
            let weak = Rc::downgrade(app);
            let id = Self::set_timeout(
                ms,
                Box::new(move || {
                    let Some(app) = weak.upgrade() else {
                        return;
                    };
                    let mut a = app.borrow_mut();
                    a.paste_reset_timer = None;
                    a.controller.paste_reset_tick();
                }),
            );
            app.borrow_mut().paste_reset_timer = id;
        }

        fn schedule_paste_retry(app: &Rc<RefCell<AppShared>>, ms: u32) {
            let weak = Rc::downgrade(app);
            Self::set_timeout(
                ms,
                Box::new(move || {
                    let Some(app) = weak.upgrade() else {
                        return;
                    };
                    let effects = {
                        let mut a = app.borrow_mut();
                        let AppShared {
                            controller, host, ..
                        } = &mut *a;
                        controller.paste_retry_tick(host)
                    };
                    GridInput::run_effects(&app, effects);
                }),
            );
        }

        #[allow(clippy::cast_possible_wrap)]
        fn set_timeout(ms: u32, f: Box<dyn FnOnce()>) -> Option<i32> {
            let window = web_sys::window()?;
            let closure = Closure::once_into_js(f);
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.unchecked_ref(),
                    ms as i32,
                )
                .ok()
        }
    }

    impl Drop for GridInput {
        fn drop(&mut self) {
            self.destroy();
        }
    }
}
