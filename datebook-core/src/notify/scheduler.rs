//! Periodic reminder loop.
//!
//! One tokio task ticks on a fixed period, reads the current events from an
//! [`EventSource`], runs [`tick`](super::tick) and sends each due reminder
//! down a channel. The fired set lives inside the task and is handed back by
//! [`ReminderScheduler::stop`]. Ticks never overlap: the next one starts only
//! after the previous one returned, and missed ticks are skipped.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Clock, EventSource, FiredSet, Reminder, tick};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Reminder scheduler is already running")]
    AlreadyRunning,

    #[error("Reminder scheduler is not running")]
    NotRunning,

    #[error("Reminder tick period must be greater than zero")]
    ZeroPeriod,

    #[error("Reminder task failed: {0}")]
    Join(#[from] JoinError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Owns the reminder task and its cancellation.
pub struct ReminderScheduler<S, C> {
    source: Arc<S>,
    clock: Arc<C>,
    period: Duration,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<FiredSet>>,
}

impl<S: EventSource, C: Clock> ReminderScheduler<S, C> {
    pub fn new(source: S, clock: C, period: Duration) -> Self {
        ReminderScheduler {
            source: Arc::new(source),
            clock: Arc::new(clock),
            period,
            cancellation: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the reminder task on the current tokio runtime.
    ///
    /// Reminders arrive on the returned receiver. Dropping the receiver ends
    /// the task at its next due reminder.
    pub fn start(&mut self) -> SchedulerResult<mpsc::UnboundedReceiver<Reminder>> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }

        self.cancellation = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run_loop(
            self.source.clone(),
            self.clock.clone(),
            self.period,
            self.cancellation.clone(),
            tx,
        ));
        self.handle = Some(handle);

        info!(period = ?self.period, "reminder scheduler started");
        Ok(rx)
    }

    /// Cancel the task, wait for it and return the final fired set.
    pub async fn stop(&mut self) -> SchedulerResult<FiredSet> {
        let handle = self.handle.take().ok_or(SchedulerError::NotRunning)?;

        self.cancellation.cancel();
        let fired = handle.await?;

        info!(fired = fired.len(), "reminder scheduler stopped");
        Ok(fired)
    }
}

impl<S, C> Drop for ReminderScheduler<S, C> {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn run_loop<S: EventSource, C: Clock>(
    source: Arc<S>,
    clock: Arc<C>,
    period: Duration,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<Reminder>,
) -> FiredSet {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut fired = FiredSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let events = source.snapshot();
                let now = clock.now();
                let outcome = tick(now, &events, &fired);

                let mut delivered = true;
                for event in &outcome.due {
                    debug!(event_id = %event.id, %now, "reminder due");
                    if tx.send(Reminder::for_event(event)).is_err() {
                        delivered = false;
                        break;
                    }
                }

                fired = outcome.fired;
                fired.prune_started(now);

                if !delivered {
                    warn!("reminder receiver dropped; stopping reminder loop");
                    break;
                }
            }
        }
    }

    fired
}
