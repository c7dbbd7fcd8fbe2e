//! Progressive renderer: scene, camera, workers and accumulation buffer
//! wired together.
//!
//! The batch loop (`render_passes`) runs a fixed number of full-image passes.
//! The interactive loop (`tick` / `run_interactive`) runs one round at a time
//! and hands the refreshed display buffer to a [`DisplaySink`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::accumulation::AccumulationBuffer;
use crate::display::DisplaySink;
use crate::error::RenderResult;
use crate::renderer::render_scanline;
use crate::scheduler::{Round, ScanlineScheduler};
use crate::settings::RenderSettings;
use crate::{Camera, Hittable};

/// Owns the worker group and the accumulated image.
pub struct ProgressiveRenderer {
    scheduler: ScanlineScheduler,
    buffer: AccumulationBuffer,
    settings: RenderSettings,
}

impl ProgressiveRenderer {
    /// Validate `settings` and start the workers.
    ///
    /// Worker `i` gets its own generator, seeded with `seed + i` when the
    /// settings carry a seed and from entropy otherwise.
    pub fn new(
        world: Arc<dyn Hittable>,
        camera: Camera,
        settings: RenderSettings,
    ) -> RenderResult<Self> {
        settings.validate()?;

        let (width, height) = (settings.width, settings.height);
        let worker_count = settings.worker_count();
        let camera = Arc::new(camera);
        let shared_settings = Arc::new(settings.clone());

        log::info!(
            "Starting progressive render: {}x{}, {} workers, max depth {}",
            width,
            height,
            worker_count,
            settings.max_depth
        );

        let scheduler = ScanlineScheduler::new(width, height, worker_count, |worker_index| {
            let world = Arc::clone(&world);
            let camera = Arc::clone(&camera);
            let settings = Arc::clone(&shared_settings);
            let mut rng = match settings.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker_index as u64)),
                None => StdRng::from_entropy(),
            };
            move |row: u32, colors: &mut [crate::Color]| {
                render_scanline(&camera, world.as_ref(), row, &settings, &mut rng, colors);
            }
        })?;

        Ok(Self {
            scheduler,
            buffer: AccumulationBuffer::new(width, height),
            settings,
        })
    }

    /// Run one round and let `sink` show the updated rows.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> RenderResult<Round> {
        let round = self.scheduler.advance(&mut self.buffer)?;
        sink.draw(
            self.buffer.display(),
            self.buffer.width(),
            self.buffer.height(),
            round.last_row,
            round.row_count,
        );
        Ok(round)
    }

    /// Interactive loop: set up `sink`, then tick until `keep_going` returns
    /// false after a round.
    pub fn run_interactive<F>(&mut self, sink: &mut dyn DisplaySink, mut keep_going: F) -> RenderResult<()>
    where
        F: FnMut(&Round) -> bool,
    {
        sink.setup(self.buffer.width(), self.buffer.height());
        loop {
            let round = self.tick(sink)?;
            if !keep_going(&round) {
                return Ok(());
            }
        }
    }

    /// Batch loop: run `passes` full-image passes.
    ///
    /// `on_round` sees every round along with the overall fraction done.
    pub fn render_passes<F>(&mut self, passes: u32, mut on_round: F) -> RenderResult<()>
    where
        F: FnMut(&Round, f32),
    {
        let target = self.scheduler.passes_completed() + passes;
        while self.scheduler.passes_completed() < target {
            let round = self.scheduler.advance(&mut self.buffer)?;
            on_round(&round, self.progress_towards(target, passes));
        }
        Ok(())
    }

    fn progress_towards(&self, target: u32, passes: u32) -> f32 {
        if passes == 0 {
            return 1.0;
        }
        let done = passes - (target - self.scheduler.passes_completed());
        if done == passes {
            1.0
        } else {
            (done as f32 + self.scheduler.pass_progress()) / passes as f32
        }
    }

    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn passes_completed(&self) -> u32 {
        self.scheduler.passes_completed()
    }

    /// Fraction of the current pass already rendered.
    pub fn pass_progress(&self) -> f32 {
        self.scheduler.pass_progress()
    }

    pub fn worker_count(&self) -> usize {
        self.scheduler.worker_count()
    }

    /// Stop the workers and hand back the accumulated image.
    pub fn finish(mut self) -> RenderResult<AccumulationBuffer> {
        self.scheduler.terminate()?;
        log::info!("Render finished after {} passes", self.scheduler.passes_completed());
        Ok(self.buffer)
    }
}
