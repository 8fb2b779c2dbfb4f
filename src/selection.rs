//! Shared selection state and the view synchronization protocol.
//!
//! The selection is an ordered set of country codes owned by the app root and
//! handed to both views as a [`SharedSelection`] handle; views never hold
//! private copies. Mutation happens only through [`SelectionState::toggle`]
//! and [`SelectionState::clear`]. After each mutation the app calls
//! [`ViewSynchronizer::notify_all`], which raises every registered view's
//! dirty flag synchronously, in registration order — map before chart. No
//! payload is pushed; a notified view self-queries the shared state on its
//! next render pass ("dirty, pull-on-notify").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// SelectionState
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered, duplicate-free set of selected location codes.
///
/// Insertion order is semantically irrelevant to filtering but feeds the
/// first-seen color assignment of the filtered view, so it is preserved.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    codes: Vec<String>,
    generation: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a code: remove it if present, append it otherwise.
    ///
    /// Returns `true` if the code is selected afterwards. Unknown codes are
    /// accepted silently — click targets are always rendered entities, so
    /// validation happens upstream.
    pub fn toggle(&mut self, code: &str) -> bool {
        self.generation = self.generation.wrapping_add(1);
        if let Some(pos) = self.codes.iter().position(|c| c == code) {
            self.codes.remove(pos);
            false
        } else {
            self.codes.push(code.to_string());
            true
        }
    }

    /// Empty the selection unconditionally.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.codes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Monotonic mutation counter. Views compare this against the generation
    /// they last rendered from to detect staleness without diffing.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SharedSelection
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable handle to the session's single [`SelectionState`].
///
/// All reads and writes serialize through the inner mutex, preserving the
/// single-owner semantics even if a host embeds the views off-thread.
#[derive(Clone, Default)]
pub struct SharedSelection {
    inner: Arc<Mutex<SelectionState>>,
}

impl SharedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&self, code: &str) -> bool {
        self.inner.lock().unwrap().toggle(code)
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.inner.lock().unwrap().contains(code)
    }

    pub fn codes(&self) -> Vec<String> {
        self.inner.lock().unwrap().codes().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().unwrap().generation()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewSynchronizer
// ─────────────────────────────────────────────────────────────────────────────

/// A view's "needs re-derive" marker, shared between the view and the
/// synchronizer.
#[derive(Clone, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consume the flag: returns `true` once per raise.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Explicit observer list notified after every selection mutation.
///
/// Notification order equals registration order and is a protocol invariant:
/// the map registers before the chart, because the chart's overlay color
/// derivation is allowed to depend on map-driven group membership, never the
/// other way around.
#[derive(Default)]
pub struct ViewSynchronizer {
    observers: Vec<(String, DirtyFlag)>,
}

impl ViewSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, flag: DirtyFlag) {
        self.observers.push((name.into(), flag));
    }

    /// Raise every observer's flag, in registration order. Raising an
    /// already-raised flag is a no-op, so repeated notification with an
    /// unchanged selection stays idempotent.
    pub fn notify_all(&self) {
        for (_name, flag) in &self.observers {
            flag.raise();
        }
    }

    /// Registered observer names, in notification order.
    pub fn order(&self) -> Vec<&str> {
        self.observers.iter().map(|(n, _)| n.as_str()).collect()
    }
}
