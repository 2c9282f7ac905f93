//! Viewport activity: scroll reported immediately, resize debounced and
//! epsilon-filtered.
//!
//! The size filter exists because applying column widths can itself nudge
//! the container by sub-pixel amounts; reporting those would loop layout
//! forever. The debounce/filter kernel is pure; listener wiring is wasm.

/// Why the viewport changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityReason {
    Scroll,
    Resize,
}

impl ActivityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }
}

/// Ephemeral activity event handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportActivity {
    pub reason: ActivityReason,
}

/// Size-change filter backing the resize debounce.
#[derive(Debug)]
pub struct ResizeDebouncer {
    epsilon: f32,
    last_width: f32,
    last_height: f32,
}

impl ResizeDebouncer {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            last_width: -1.0,
            last_height: -1.0,
        }
    }

    /// Record a measured container size once the debounce window closed.
    /// Returns true if the size actually changed beyond the epsilon and the
    /// resize should be reported.
    pub fn observe(&mut self, width: f32, height: f32) -> bool {
        let changed = (width - self.last_width).abs() > self.epsilon
            || (height - self.last_height).abs() > self.epsilon;
        self.last_width = width;
        self.last_height = height;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_epsilon_changes_suppressed() {
        let mut debouncer = ResizeDebouncer::new(0.5);
        assert!(debouncer.observe(800.0, 600.0), "first measurement reports");
        assert!(!debouncer.observe(800.3, 600.2));
        assert!(debouncer.observe(801.0, 600.2));
        assert!(debouncer.observe(801.0, 540.0));
    }
}

// ============================================================================
// WASM32: listener wiring
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use manager::ViewportManager;

#[cfg(target_arch = "wasm32")]
mod manager {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Element, HtmlElement, ResizeObserver};

    type ActivityCallback = Rc<dyn Fn(ViewportActivity)>;

    struct ManagerState {
        debouncer: ResizeDebouncer,
        debounce_ms: u32,
        debounce_timer: Option<i32>,
        /// Single internal activity callback (re-arms the capture proxy).
        activity: Option<ActivityCallback>,
        /// Independent resize subscriber stream.
        resize_subscribers: Vec<ActivityCallback>,
        container: HtmlElement,
    }

    /// Watches the grid's scrollable regions, its container, and the window
    /// for scroll/resize activity.
    pub struct ViewportManager {
        state: Rc<RefCell<ManagerState>>,
        #[allow(dead_code)]
        listeners: Vec<(web_sys::EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>)>,
        resize_observer: Option<ResizeObserver>,
        #[allow(dead_code)]
        resize_observer_cb: Option<Closure<dyn FnMut(js_sys::Array)>>,
    }

    impl ViewportManager {
        /// Attach listeners: scroll/wheel on each internal scrollable region
        /// and the container, a resize observer on the container, and a
        /// window resize listener.
        pub fn new(
            container: &HtmlElement,
            scroll_regions: &[Element],
            debounce_ms: u32,
            epsilon: f32,
        ) -> Self {
            let state = Rc::new(RefCell::new(ManagerState {
                debouncer: ResizeDebouncer::new(epsilon),
                debounce_ms,
                debounce_timer: None,
                activity: None,
                resize_subscribers: Vec::new(),
                container: container.clone(),
            }));

            let mut listeners = Vec::new();
            let mut targets: Vec<web_sys::EventTarget> =
                vec![container.clone().into()];
            for region in scroll_regions {
                targets.push(region.clone().into());
            }

            for target in &targets {
                for event_name in ["scroll", "wheel"] {
                    let state_for_event = Rc::clone(&state);
                    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                        Self::report_scroll(&state_for_event);
                    })
                        as Box<dyn FnMut(web_sys::Event)>);
                    let _ = target.add_event_listener_with_callback(
                        event_name,
                        closure.as_ref().unchecked_ref(),
                    );
                    listeners.push((target.clone(), event_name, closure));
                }
            }

            // Window resize participates in the same debounce.
            if let Some(window) = web_sys::window() {
                let state_for_resize = Rc::clone(&state);
                let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                    Self::schedule_resize_check(&state_for_resize);
                }) as Box<dyn FnMut(web_sys::Event)>);
                let _ = window
                    .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
                listeners.push((window.into(), "resize", closure));
            }

            // Resize observer on the container.
            let state_for_observer = Rc::clone(&state);
            let observer_cb = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
                Self::schedule_resize_check(&state_for_observer);
            }) as Box<dyn FnMut(js_sys::Array)>);
            let resize_observer = ResizeObserver::new(observer_cb.as_ref().unchecked_ref()).ok();
            if let Some(observer) = &resize_observer {
                observer.observe(container);
            }

            Self {
                state,
                listeners,
                resize_observer,
                resize_observer_cb: Some(observer_cb),
            }
        }

        /// Replace the single internal activity callback.
        pub fn set_activity_callback(&self, callback: Option<ActivityCallback>) {
            self.state.borrow_mut().activity = callback;
        }

        /// Subscribe to debounced, filtered resize events.
        pub fn on_viewport_resize(&self, callback: ActivityCallback) {
            self.state.borrow_mut().resize_subscribers.push(callback);
        }

        pub fn detach(&mut self) {
            if let Some(observer) = self.resize_observer.take() {
                observer.disconnect();
            }
            for (target, name, closure) in &self.listeners {
                let _ = target
                    .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            }
            let mut s = self.state.borrow_mut();
            if let Some(id) = s.debounce_timer.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(id);
                }
            }
            s.activity = None;
            s.resize_subscribers.clear();
        }

        fn report_scroll(state: &Rc<RefCell<ManagerState>>) {
            let activity = state.borrow().activity.clone();
            if let Some(activity) = activity {
                activity(ViewportActivity {
                    reason: ActivityReason::Scroll,
                });
            }
        }

        /// Debounce: cancel any pending check and start a new window.
        #[allow(clippy::cast_possible_wrap)]
        fn schedule_resize_check(state: &Rc<RefCell<ManagerState>>) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let delay = {
                let mut s = state.borrow_mut();
                if let Some(id) = s.debounce_timer.take() {
                    window.clear_timeout_with_handle(id);
                }
                s.debounce_ms
            };

            let weak = Rc::downgrade(state);
            let closure = Closure::once_into_js(move || {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                Self::run_resize_check(&state);
            });
            match window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.unchecked_ref(),
                delay as i32,
            ) {
                Ok(id) => state.borrow_mut().debounce_timer = Some(id),
                Err(_) => state.borrow_mut().debounce_timer = None,
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        fn run_resize_check(state: &Rc<RefCell<ManagerState>>) {
            let (report, activity, subscribers) = {
                let mut s = state.borrow_mut();
                s.debounce_timer = None;
                let rect = s.container.get_bounding_client_rect();
                let report = s
                    .debouncer
                    .observe(rect.width() as f32, rect.height() as f32);
                (report, s.activity.clone(), s.resize_subscribers.clone())
            };
            if !report {
                return;
            }
            let event = ViewportActivity {
                reason: ActivityReason::Resize,
            };
            if let Some(activity) = activity {
                activity(event);
            }
            for subscriber in subscribers {
                subscriber(event);
            }
        }
    }

    impl Drop for ViewportManager {
        fn drop(&mut self) {
            self.detach();
        }
    }
}
