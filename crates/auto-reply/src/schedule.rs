//! Delayed-task seam for the profile follow-up.
//!
//! The 30-second gap between bridge and profile is the one piece of timing
//! the flow depends on, so it goes through a trait: production backs it with
//! tokio timers, tests fire queued tasks by hand.

use std::{
    future::Future,
    pin::Pin,
    sync::Mutex,
    time::Duration,
};

/// A deferred unit of work. Owns everything it needs to run.
pub type DelayedTask = Pin<Box<dyn Future<Output = ()> + Send>>;

pub trait Scheduler: Send + Sync {
    /// Run `task` after `delay`. Fire-and-forget; there is no cancellation
    /// handle, callers guard with state re-checks at fire time instead.
    fn schedule_after(&self, delay: Duration, task: DelayedTask);
}

/// Production scheduler backed by tokio timers.
#[derive(Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: DelayedTask) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}

/// Test scheduler that queues tasks until told to fire them.
#[derive(Default)]
pub struct ManualScheduler {
    queued: Mutex<Vec<(Duration, DelayedTask)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.queued.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Delay the next queued task was scheduled with, if any.
    pub fn next_delay(&self) -> Option<Duration> {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .first()
            .map(|(delay, _)| *delay)
    }

    /// Drain the queue and run every task, in scheduling order.
    pub async fn fire_all(&self) {
        let tasks: Vec<_> = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for (_, task) in tasks {
            task.await;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, task: DelayedTask) {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((delay, task));
    }
}
