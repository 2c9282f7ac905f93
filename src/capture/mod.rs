//! Input capture: the session state machine, key classification, and the
//! DOM capture proxy.
//!
//! The session and key modules are pure and tested natively; the proxy and
//! its per-surface arena exist only on wasm.

pub mod keys;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod arena;
#[cfg(target_arch = "wasm32")]
pub mod proxy;

pub use keys::{classify, KeyClass, ProxyKey};
pub use session::{CaptureOutcome, CaptureSession, SessionRegistry, SessionToken};
