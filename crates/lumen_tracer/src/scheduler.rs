//! Scanline scheduler: splits the image into per-worker rows, one round at
//! a time.
//!
//! The scheduler holds a shared row cursor. In a round, worker `i` renders
//! row `cursor - i` (skipped when that is below zero) into its own row
//! buffer and sends it back; once the round's barrier is passed the rows are
//! folded into the accumulation buffer and the cursor moves down by the
//! worker count. Rows within a round never overlap, and only the thread that
//! owns the accumulation buffer writes to it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::accumulation::AccumulationBuffer;
use crate::error::{RenderError, RenderResult};
use crate::workers::WorkerGroup;
use crate::Color;

/// One row of fresh samples produced by a worker.
#[derive(Debug)]
pub struct RowSamples {
    pub row: u32,
    pub colors: Vec<Color>,
}

/// The band of rows touched by one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    /// Topmost row rendered this round (the cursor position)
    pub last_row: i64,
    /// Worker count; the band is `(last_row - row_count, last_row]`
    pub row_count: usize,
    /// Zero-based index of the full-image pass this round belongs to
    pub pass: u32,
    /// True if this round finished a pass
    pub completed_pass: bool,
}

impl Round {
    /// Rows actually written this round, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = u32> {
        let low = (self.last_row - self.row_count as i64 + 1).max(0);
        (low..=self.last_row).rev().map(|row| row as u32)
    }
}

/// Drives a [`WorkerGroup`] over the rows of an image.
pub struct ScanlineScheduler {
    workers: WorkerGroup,
    cursor: Arc<AtomicI64>,
    results: Receiver<RowSamples>,
    width: u32,
    height: u32,
    passes_completed: u32,
}

impl ScanlineScheduler {
    /// Spawn `worker_count` workers.
    ///
    /// `make_renderer(worker_index)` is called once per worker on the calling
    /// thread; the closure it returns is moved into that worker and called
    /// as `render(row, &mut colors)` for every row the worker is given.
    pub fn new<M, R>(
        width: u32,
        height: u32,
        worker_count: usize,
        mut make_renderer: M,
    ) -> RenderResult<Self>
    where
        M: FnMut(usize) -> R,
        R: FnMut(u32, &mut [Color]) + Send + 'static,
    {
        if worker_count == 0 {
            return Err(RenderError::InvalidSettings(
                "scheduler needs at least one worker".to_string(),
            ));
        }

        let cursor = Arc::new(AtomicI64::new(height as i64 - 1));
        let (result_tx, results) = crossbeam_channel::unbounded();
        let mut workers = WorkerGroup::new();

        for worker_index in 0..worker_count {
            let task = row_task(
                worker_index,
                width,
                Arc::clone(&cursor),
                result_tx.clone(),
                make_renderer(worker_index),
            );
            workers.add_worker(task)?;
        }

        log::debug!("Scheduler started with {} workers", worker_count);

        Ok(Self {
            workers,
            cursor,
            results,
            width,
            height,
            passes_completed: 0,
        })
    }

    /// Run one round at the current cursor and fold the rows into `buffer`.
    ///
    /// Moves the cursor down by the worker count afterwards, wrapping back to
    /// the top row and counting a finished pass when it runs off the bottom.
    ///
    /// If a worker is lost, the rows the others delivered are still folded in
    /// and the cursor still moves before the error is returned, so a caller
    /// that keeps going makes progress with the remaining workers.
    pub fn advance(&mut self, buffer: &mut AccumulationBuffer) -> RenderResult<Round> {
        let last_row = self.cursor.load(Ordering::Acquire);
        let outcome = self.workers.run();

        for samples in self.results.try_iter() {
            buffer.add_row(samples.row, &samples.colors);
        }

        let row_count = self.workers.len();
        let pass = self.passes_completed;
        let next = last_row - row_count as i64;
        let completed_pass = next < 0;
        if completed_pass {
            self.passes_completed += 1;
            self.cursor.store(self.height as i64 - 1, Ordering::Release);
            log::debug!("Pass {} complete", self.passes_completed);
        } else {
            self.cursor.store(next, Ordering::Release);
        }

        outcome?;
        Ok(Round {
            last_row,
            row_count,
            pass,
            completed_pass,
        })
    }

    /// Row the next round starts from.
    pub fn cursor(&self) -> i64 {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn passes_completed(&self) -> u32 {
        self.passes_completed
    }

    /// Fraction of the current pass already rendered, in `[0, 1)`.
    pub fn pass_progress(&self) -> f32 {
        (self.height as i64 - 1 - self.cursor()) as f32 / self.height as f32
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stop and join all workers.
    pub fn terminate(&mut self) -> RenderResult<()> {
        self.workers.terminate()?;
        Ok(())
    }
}

fn row_task<R>(
    worker_index: usize,
    width: u32,
    cursor: Arc<AtomicI64>,
    results: Sender<RowSamples>,
    mut render: R,
) -> impl FnMut() + Send + 'static
where
    R: FnMut(u32, &mut [Color]) + Send + 'static,
{
    move || {
        let row = cursor.load(Ordering::Acquire) - worker_index as i64;
        if row < 0 {
            return;
        }
        let row = row as u32;
        let mut colors = vec![Color::ZERO; width as usize];
        render(row, &mut colors);
        if results.send(RowSamples { row, colors }).is_err() {
            log::warn!("Worker {} could not deliver row {}", worker_index, row);
        }
    }
}
