//! Debounced surface fitting
//!
//! Geometry observations are coalesced into a single pending slot: a newer
//! observation replaces the older one and restarts the window, and only the
//! latest geometry is fitted once the window elapses.

use std::time::{Duration, Instant};

use tracing::debug;

use super::Geometry;
use crate::transport::BindingId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingFit {
    geometry: Geometry,
    deadline: Instant,
}

/// Keeps one bound surface fitted to its container
#[derive(Debug)]
pub struct ResizeCoordinator {
    binding: BindingId,
    debounce: Duration,
    fitted: Geometry,
    pending: Option<PendingFit>,
    attached: bool,
}

impl ResizeCoordinator {
    /// Start observing for the surface of `binding`, currently sized to `fitted`
    pub fn attach(binding: BindingId, fitted: Geometry, debounce: Duration) -> Self {
        Self {
            binding,
            debounce,
            fitted,
            pending: None,
            attached: true,
        }
    }

    /// Record a container geometry change
    pub fn observe(&mut self, geometry: Geometry, now: Instant) {
        if !self.attached || geometry.is_empty() {
            return;
        }

        if geometry == self.fitted {
            // Back at the fitted size: nothing left to do
            self.pending = None;
            return;
        }

        self.pending = Some(PendingFit {
            geometry,
            deadline: now + self.debounce,
        });
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending fit once its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<Geometry> {
        match self.pending {
            Some(pending) if pending.deadline <= now => {
                self.pending = None;
                self.fitted = pending.geometry;
                Some(pending.geometry)
            }
            _ => None,
        }
    }

    /// Cancel any pending fit and stop observing
    pub fn detach(&mut self) {
        if self.pending.take().is_some() {
            debug!("Cancelled pending fit for binding {}", self.binding);
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
