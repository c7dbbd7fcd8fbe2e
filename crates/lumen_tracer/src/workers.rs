//! Persistent worker pool with synchronous fork/join rounds.
//!
//! Each worker is a long-lived named thread bound to one task closure. A call
//! to [`WorkerGroup::run`] wakes every worker, lets each run its task exactly
//! once, and returns only after all of them have acknowledged. Workers sit
//! idle on their command channel between rounds.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::WorkerError;

enum Command {
    Run,
    Exit,
}

struct WorkerHandle {
    index: usize,
    commands: Sender<Command>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

/// A fixed set of persistent worker threads driven in lockstep.
pub struct WorkerGroup {
    workers: Vec<WorkerHandle>,
    terminated: bool,
}

impl WorkerGroup {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
            terminated: false,
        }
    }

    /// Spawn one worker thread bound to `task`.
    ///
    /// The task runs once per [`run`](Self::run) call, on the same thread
    /// every time, so it can own per-worker state such as a generator.
    pub fn add_worker<F>(&mut self, task: F) -> Result<(), WorkerError>
    where
        F: FnMut() + Send + 'static,
    {
        if self.terminated {
            return Err(WorkerError::Terminated);
        }

        let index = self.workers.len();
        let (command_tx, command_rx) = crossbeam_channel::bounded(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        let thread = thread::Builder::new()
            .name(format!("lumen-worker-{index}"))
            .spawn(move || worker_loop(index, command_rx, done_tx, task))?;

        self.workers.push(WorkerHandle {
            index,
            commands: command_tx,
            done: done_rx,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Run every worker's task once and wait for all of them.
    ///
    /// A worker whose task panicked shows up as
    /// [`WorkerError::WorkerLost`]; the surviving workers still finish the
    /// round before the error is returned.
    pub fn run(&self) -> Result<(), WorkerError> {
        if self.terminated {
            return Err(WorkerError::Terminated);
        }

        let mut first_error = None;
        let mut signalled = Vec::with_capacity(self.workers.len());

        for worker in &self.workers {
            match worker.commands.send(Command::Run) {
                Ok(()) => signalled.push(worker),
                Err(_) => {
                    first_error.get_or_insert(WorkerError::WorkerLost(worker.index));
                }
            }
        }

        for worker in signalled {
            if worker.done.recv().is_err() {
                first_error.get_or_insert(WorkerError::WorkerLost(worker.index));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stop every worker and join its thread.
    ///
    /// Calling this a second time returns [`WorkerError::Terminated`].
    pub fn terminate(&mut self) -> Result<(), WorkerError> {
        if self.terminated {
            return Err(WorkerError::Terminated);
        }
        self.terminated = true;

        for worker in &self.workers {
            // A worker that already died has dropped its receiver
            let _ = worker.commands.send(Command::Exit);
        }

        let mut first_error = None;
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    log::warn!("Worker {} panicked", worker.index);
                    first_error.get_or_insert(WorkerError::WorkerLost(worker.index));
                }
            }
        }

        log::debug!("Terminated {} workers", self.workers.len());
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Default for WorkerGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerGroup {
    fn drop(&mut self) {
        if !self.terminated {
            if let Err(err) = self.terminate() {
                log::warn!("Error while shutting down workers: {}", err);
            }
        }
    }
}

fn worker_loop<F: FnMut()>(
    index: usize,
    commands: Receiver<Command>,
    done: Sender<()>,
    mut task: F,
) {
    log::debug!("Worker {} started", index);

    while let Ok(Command::Run) = commands.recv() {
        task();
        if done.send(()).is_err() {
            break;
        }
    }

    log::debug!("Worker {} exiting", index);
}
