//! Which attached surfaces are in view, and whether any of them is.
//!
//! The tracker holds the set of registered surfaces (the view set) with one
//! visibility flag each, and a derived boolean "at least one surface is
//! visible".  The derived value is reported only when it flips, so the host
//! property is written on transitions and never on every recompute.
//!
//! Two sources update the tracker:
//!
//! - [`VisibilityTracker::rescan`] replaces the registered set with the
//!   surfaces that are attached right now.  It runs on attach, shortly after
//!   detach, and periodically as a backstop for missed notifications.
//! - [`VisibilityTracker::update`] applies visibility changes for individual
//!   surfaces, as delivered by the host's intersection observer (which only
//!   reports surfaces whose visibility changed).

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::surface::SurfaceId;

/// The view set and its derived visibility.
#[derive(Debug, Default)]
pub struct VisibilityTracker {
    views: BTreeMap<SurfaceId, bool>,
    has_visible: bool,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered surfaces in a stable order.
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.views.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Last reported derived value.
    pub fn has_visible_views(&self) -> bool {
        self.has_visible
    }

    /// Replaces the registered set with `attached`.
    ///
    /// Surfaces that remain registered keep their flag; new ones start out
    /// invisible until the host reports otherwise.  Returns the new derived
    /// value if it changed.
    pub fn rescan(&mut self, attached: &[SurfaceId]) -> Option<bool> {
        let previous = std::mem::take(&mut self.views);
        self.views = attached
            .iter()
            .map(|id| (*id, previous.get(id).copied().unwrap_or(false)))
            .collect();
        trace!("visibility rescan: {} surfaces registered", self.views.len());
        self.recompute()
    }

    /// Applies visibility flags for the surfaces that changed.
    ///
    /// Unregistered ids are ignored.  Returns the new derived value if it
    /// changed.
    pub fn update(&mut self, changes: &[(SurfaceId, bool)]) -> Option<bool> {
        for (id, visible) in changes {
            if let Some(flag) = self.views.get_mut(id) {
                *flag = *visible;
            }
        }
        self.recompute()
    }

    fn recompute(&mut self) -> Option<bool> {
        let has_visible = self.views.values().any(|visible| *visible);
        if has_visible == self.has_visible {
            return None;
        }
        self.has_visible = has_visible;
        Some(has_visible)
    }
}
