//! Headless rendering surfaces.
//!
//! There is no screen: a surface "shows" a frame by remembering its source
//! locator, and "loads" it instantly, so every display call is answered with
//! a [`HostEvent::ContentLoaded`] per observed surface.  Observed surfaces are
//! always in view.
//!
//! When a dump directory is configured, every binary frame is written there
//! as `frame-NNNNNN.<subtype>` at the moment its transient resource is
//! created, i.e. exactly when the scheduler applies it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use rfb_core::{FrameSink, FrameSource, StyleUpdate, SurfaceId, TransientResource};

use crate::application::{HostEvent, ViewerError};

#[derive(Debug, Default)]
struct SurfaceState {
    observed: Vec<SurfaceId>,
    shown: HashMap<SurfaceId, String>,
    live: HashSet<String>,
    created: u64,
    styles: Vec<StyleUpdate>,
}

pub struct HeadlessSurfaces {
    attached: Vec<SurfaceId>,
    state: Mutex<SurfaceState>,
    events: UnboundedSender<HostEvent>,
    dump_dir: Option<PathBuf>,
}

impl HeadlessSurfaces {
    /// Creates `count` attached surfaces.
    pub fn new(count: usize, events: UnboundedSender<HostEvent>, dump_dir: Option<PathBuf>) -> Self {
        Self {
            attached: (0..count).map(|_| SurfaceId::new_random()).collect(),
            state: Mutex::new(SurfaceState::default()),
            events,
            dump_dir,
        }
    }

    /// The source locator `surface` currently shows.
    pub fn shown(&self, surface: SurfaceId) -> Option<String> {
        self.state().shown.get(&surface).cloned()
    }

    /// Number of transient resources created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.state().live.len()
    }

    /// Style updates applied so far, oldest first.
    pub fn styles(&self) -> Vec<StyleUpdate> {
        self.state().styles.clone()
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            trace!("session gone; surface event dropped");
        }
    }
}

impl FrameSink for HeadlessSurfaces {
    fn surfaces(&self) -> Vec<SurfaceId> {
        self.attached.clone()
    }

    fn observe(&self, surfaces: &[SurfaceId]) {
        self.state().observed = surfaces.to_vec();
        if !surfaces.is_empty() {
            self.post(HostEvent::Visibility(
                surfaces.iter().map(|id| (*id, true)).collect(),
            ));
        }
    }

    fn display(&self, surfaces: &[SurfaceId], source: FrameSource<'_>) {
        let loaded: Vec<SurfaceId> = {
            let mut state = self.state();
            for surface in surfaces {
                state.shown.insert(*surface, source.src().to_string());
            }
            surfaces
                .iter()
                .filter(|id| state.observed.contains(*id))
                .copied()
                .collect()
        };
        for surface in loaded {
            self.post(HostEvent::ContentLoaded(surface));
        }
    }

    fn create_transient(&self, data: &[u8], mime_type: &str) -> TransientResource {
        let url = format!("blob:rfb-viewer/{}", Uuid::new_v4());
        let sequence = {
            let mut state = self.state();
            state.created += 1;
            state.live.insert(url.clone());
            state.created
        };
        if let Some(dir) = &self.dump_dir {
            if let Err(e) = dump_frame(dir, sequence, data, mime_type) {
                warn!("{e}");
            }
        }
        TransientResource::new(url)
    }

    fn release_transient(&self, resource: TransientResource) {
        if !self.state().live.remove(resource.url()) {
            debug!("released unknown resource {}", resource.url());
        }
    }

    fn apply_style(&self, update: &StyleUpdate) {
        debug!("style {update:?}");
        self.state().styles.push(update.clone());
    }
}

/// Writes one binary frame into `dir`.
///
/// The file extension is the MIME subtype (`image/jpeg` → `jpeg`).
///
/// # Errors
///
/// Returns [`ViewerError::DumpFrame`] if the file cannot be written.
pub fn dump_frame(dir: &Path, sequence: u64, data: &[u8], mime_type: &str) -> Result<PathBuf, ViewerError> {
    let extension = mime_type.rsplit('/').next().unwrap_or("bin");
    let path = dir.join(format!("frame-{sequence:06}.{extension}"));
    std::fs::write(&path, data).map_err(|source| ViewerError::DumpFrame {
        path: path.clone(),
        source,
    })?;
    trace!("dumped {} bytes to {}", data.len(), path.display());
    Ok(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
