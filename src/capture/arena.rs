//! Per-surface proxy arena.
//!
//! Proxies are created on first use for a surface id and torn down
//! explicitly when the surface goes away. No weak references: the hosting
//! application owns surface lifecycle and must call [`ProxyArena::teardown`].

use std::collections::HashMap;

use web_sys::Document;

use super::proxy::CaptureProxy;
use crate::focus::SurfaceId;

#[derive(Default)]
pub struct ProxyArena {
    proxies: HashMap<SurfaceId, CaptureProxy>,
}

impl ProxyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the proxy for a surface, creating it on first use.
    pub fn get_or_create(
        &mut self,
        surface: SurfaceId,
        document: &Document,
        ascii_idle_ms: u32,
        editor_wait_ms: u32,
    ) -> &CaptureProxy {
        self.proxies.entry(surface).or_insert_with(|| {
            log::debug!("creating capture proxy for surface {}", surface.0);
            CaptureProxy::new(document.clone(), ascii_idle_ms, editor_wait_ms)
        })
    }

    pub fn get(&self, surface: SurfaceId) -> Option<&CaptureProxy> {
        self.proxies.get(&surface)
    }

    /// Destroy and remove the proxy for a surface. Idempotent.
    pub fn teardown(&mut self, surface: SurfaceId) {
        if let Some(proxy) = self.proxies.remove(&surface) {
            proxy.destroy();
        }
    }

    /// Destroy every proxy. Used at controller teardown.
    pub fn teardown_all(&mut self) {
        for (_, proxy) in self.proxies.drain() {
            proxy.destroy();
        }
    }
}
