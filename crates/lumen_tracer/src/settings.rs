//! Render configuration.
//!
//! Everything is fixed when the renderer starts; there is no command-line or
//! runtime negotiation.

use crate::RenderError;

/// Default image width in pixels.
pub const IMAGE_WIDTH: u32 = 1200;
/// Default image height in pixels.
pub const IMAGE_HEIGHT: u32 = 800;
/// Full-image passes in batch mode.
pub const BATCH_PASSES: u32 = 10;
/// Maximum ray bounce depth.
pub const MAX_DEPTH: u32 = 50;
/// Upper bound on the automatically chosen worker count.
pub const MAX_WORKERS: usize = 8;
/// Minimum ray parameter for secondary hits (avoids shadow acne).
pub const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Full-image passes in batch mode
    pub passes: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker threads; `None` picks `min(cpus, MAX_WORKERS)`
    pub workers: Option<usize>,
    /// Base seed for the per-worker generators; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            passes: BATCH_PASSES,
            max_depth: MAX_DEPTH,
            workers: None,
            seed: None,
        }
    }
}

impl RenderSettings {
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of worker threads to spawn.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().clamp(1, MAX_WORKERS))
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.worker_count() == 0 {
            return Err(RenderError::InvalidSettings(
                "at least one worker thread is required".to_string(),
            ));
        }
        Ok(())
    }
}
