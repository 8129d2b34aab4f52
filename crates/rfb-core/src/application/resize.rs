//! Detects real changes of the surface size or pixel density.

use crate::domain::surface::{StyleUpdate, SurfaceGeometry};

/// Last reported geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeState {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl SizeState {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }
}

/// The target size to give a display box the host has not sized yet.
#[derive(Debug, Clone, Copy)]
pub struct TargetSize<'a> {
    pub css_width: &'a str,
    pub css_height: &'a str,
    /// Lower bound of the max-size cap in pixels.
    pub min_size_cap: u32,
}

/// What an observation amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeOutcome {
    /// Nothing to report.
    Unchanged,
    /// The box had no size yet; apply these styles and report nothing.
    ApplyTargetSize(Vec<StyleUpdate>),
    /// The geometry changed; a `resize` event should be sent.
    Changed(SizeState),
}

/// Compares each geometry observation against the last reported one.
#[derive(Debug)]
pub struct ResizeDetector {
    reported: SizeState,
}

impl Default for ResizeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeDetector {
    /// A detector that has reported nothing yet (`0 x 0` at ratio 1).
    pub fn new() -> Self {
        Self::with_reported(SizeState::new(0.0, 0.0, 1.0))
    }

    /// A detector whose last report was `reported`.
    pub fn with_reported(reported: SizeState) -> Self {
        Self { reported }
    }

    pub fn reported(&self) -> SizeState {
        self.reported
    }

    /// Handles one geometry observation.
    ///
    /// If the host has not assigned the box a size and `target` names a
    /// width, the target size is applied instead, capped at the larger of
    /// `min_size_cap` and the viewport.  An all-zero size (a surface that is
    /// not laid out) is ignored.
    pub fn observe(&mut self, geometry: &SurfaceGeometry, target: Option<TargetSize<'_>>) -> ResizeOutcome {
        if !geometry.size_assigned {
            if let Some(target) = target.filter(|t| !t.css_width.is_empty()) {
                let cap = f64::from(target.min_size_cap);
                return ResizeOutcome::ApplyTargetSize(vec![
                    StyleUpdate::Width(target.css_width.to_string()),
                    StyleUpdate::Height(target.css_height.to_string()),
                    StyleUpdate::MaxSize {
                        width: cap.max(geometry.viewport_width) as u32,
                        height: cap.max(geometry.viewport_height) as u32,
                    },
                ]);
            }
        }

        if geometry.width == 0.0 && geometry.height == 0.0 {
            return ResizeOutcome::Unchanged;
        }

        let observed = SizeState::new(geometry.width, geometry.height, geometry.pixel_ratio);
        if observed == self.reported {
            return ResizeOutcome::Unchanged;
        }
        self.reported = observed;
        ResizeOutcome::Changed(observed)
    }
}
