//! Registry of configured backends and the currently active one.

use crate::error::{CaptchaError, Result};
use crate::models::Backend;
use parking_lot::RwLock;
use std::sync::Arc;

struct State {
    backends: Vec<Arc<Backend>>,
    active: usize,
}

/// Ordered set of backends with an "active" cursor.
///
/// The cursor is only a default for calls that name no backend. Backends are
/// never removed, so the cursor always points at a registered entry.
pub struct BackendRegistry {
    state: RwLock<State>,
}

impl BackendRegistry {
    /// Create a registry; the first backend becomes active.
    pub fn new(backends: Vec<Backend>) -> Result<Self> {
        if backends.is_empty() {
            return Err(CaptchaError::Config(
                "at least one backend must be configured".into(),
            ));
        }

        Ok(Self {
            state: RwLock::new(State {
                backends: backends.into_iter().map(Arc::new).collect(),
                active: 0,
            }),
        })
    }

    /// Make the first backend called `name` active and return it.
    ///
    /// Leaves the cursor untouched on failure.
    pub fn select(&self, name: &str) -> Result<Arc<Backend>> {
        let mut state = self.state.write();
        let index = Self::position(&state.backends, name)?;
        state.active = index;
        tracing::debug!(backend = name, "Selected backend");
        Ok(state.backends[index].clone())
    }

    /// Move the cursor to the next backend in registration order, wrapping.
    pub fn advance(&self) -> Arc<Backend> {
        let mut state = self.state.write();
        state.active = (state.active + 1) % state.backends.len();
        let backend = state.backends[state.active].clone();
        tracing::debug!(backend = backend.label(), "Advanced to next backend");
        backend
    }

    /// Append backends. Names are not de-duplicated; `select` picks the first match.
    pub fn register(&self, backends: impl IntoIterator<Item = Backend>) {
        let mut state = self.state.write();
        state.backends.extend(backends.into_iter().map(Arc::new));
    }

    /// Resolve a backend without moving the cursor.
    ///
    /// `None` resolves to the active backend.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<Backend>> {
        let state = self.state.read();
        match name {
            Some(name) => {
                let index = Self::position(&state.backends, name)?;
                Ok(state.backends[index].clone())
            }
            None => Ok(state.backends[state.active].clone()),
        }
    }

    /// The active backend.
    pub fn active(&self) -> Arc<Backend> {
        let state = self.state.read();
        state.backends[state.active].clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().backends.len()
    }

    /// Always false once constructed.
    pub fn is_empty(&self) -> bool {
        self.state.read().backends.is_empty()
    }

    /// Snapshot of all registered backends in order.
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        self.state.read().backends.clone()
    }

    fn position(backends: &[Arc<Backend>], name: &str) -> Result<usize> {
        backends
            .iter()
            .position(|b| b.name.as_deref() == Some(name))
            .ok_or_else(|| CaptchaError::UnknownBackend {
                name: name.to_string(),
            })
    }
}
