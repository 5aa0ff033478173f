//! Page-level mutation throttle.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Single throttle gate shared across a whole page.
///
/// Admits at most one scan execution per window, and holds a `scanning`
/// latch so a new mutation scan is skipped (not queued) while a
/// previous one is still resolving its verification call. Batches
/// rejected by the gate are dropped, never queued.
pub struct ThrottleGate {
    window: Duration,
    state: Mutex<GateState>,
}

struct GateState {
    last_fired: Option<Instant>,
    scanning: bool,
}

impl ThrottleGate {
    /// Create a gate with the given window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: Mutex::new(GateState {
                last_fired: None,
                scanning: false,
            }),
        }
    }

    /// Try to admit a scan. On success the caller owns the `scanning`
    /// latch and must call [`finish`](Self::finish) when the scan
    /// resolves.
    #[must_use]
    pub fn try_begin(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };

        if state.scanning {
            return false;
        }
        if let Some(last) = state.last_fired {
            if last.elapsed() < self.window {
                return false;
            }
        }

        state.scanning = true;
        state.last_fired = Some(Instant::now());
        true
    }

    /// Release the `scanning` latch.
    pub fn finish(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.scanning = false;
        }
    }

    /// Release the latch without consuming the window.
    ///
    /// For admissions that turned out to have nothing to scan: the next
    /// batch may begin immediately instead of waiting out a window no
    /// scan actually used.
    pub fn abort(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.scanning = false;
            state.last_fired = None;
        }
    }
}

/// Nodes already scanned on this page.
///
/// Marking happens only when a node's text is actually handed to a
/// scan, so content dropped by the gate stays eligible for the next
/// window.
#[derive(Default)]
pub struct ScannedNodes {
    ids: Mutex<HashSet<u64>>,
}

impl ScannedNodes {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a node scanned; returns `false` if it already was.
    #[must_use]
    pub fn mark(&self, node_id: u64) -> bool {
        self.ids.lock().map_or(false, |mut ids| ids.insert(node_id))
    }

    /// Forget all marks (page teardown).
    pub fn reset(&self) {
        if let Ok(mut ids) = self.ids.lock() {
            ids.clear();
        }
    }
}
