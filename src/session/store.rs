//! Shared session state
//!
//! Holds the snapshot, the polling task handle and the poll generation
//! behind one mutex, and notifies watchers on every change. The mutex is
//! never held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use super::{error::SessionError, snapshot::SessionSnapshot};
use crate::state::Timer;

/// What to do with the adopted timer when a command fails
#[derive(Debug)]
pub(crate) enum OnFailure {
    /// Keep the previous timer
    Keep,
    /// Forget the timer entirely
    Clear,
    /// Adopt a timer produced by an earlier step of the command
    Replace(Timer),
}

/// Result of applying one poll response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    /// Timer still running, keep polling
    Continue,
    /// Fetch failed; previous timer retained
    Failed,
    /// Timer left `running`, polling is over
    Finished,
    /// Response belongs to a cancelled loop and was discarded
    Stale,
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: SessionSnapshot,
    poll_generation: u64,
    poller: Option<JoinHandle<()>>,
    closed: bool,
}

#[derive(Debug)]
pub(crate) struct SessionStore {
    inner: Mutex<Inner>,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Mutex::new(Inner::default()),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every mutation leaves `Inner` consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        self.updates.send_replace(snapshot.clone());
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Record an error that happened before any request was issued
    pub(crate) fn reject(&self, error: SessionError) -> SessionError {
        let mut inner = self.lock();
        inner.snapshot.error = Some(error.clone());
        self.publish(&inner.snapshot);
        error
    }

    /// Gate a command behind the loading flag. Returns the adopted timer's
    /// id when `needs_timer` is set.
    pub(crate) fn begin_command(&self, needs_timer: bool) -> Result<Option<String>, SessionError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(SessionError::Closed);
        }
        if inner.snapshot.loading {
            return Err(SessionError::Busy);
        }

        let timer_id = inner.snapshot.timer.as_ref().map(|t| t.id.clone());
        if needs_timer && timer_id.is_none() {
            let error = SessionError::NoActiveTimer;
            inner.snapshot.error = Some(error.clone());
            self.publish(&inner.snapshot);
            return Err(error);
        }

        inner.snapshot.loading = true;
        inner.snapshot.error = None;
        self.publish(&inner.snapshot);
        Ok(timer_id)
    }

    /// Cancel the polling loop, if any. Responses still in flight for it are
    /// discarded by the generation check.
    pub(crate) fn halt_polling(&self) {
        let mut inner = self.lock();
        Self::halt_locked(&mut inner);
    }

    /// Cancel polling and refuse every later command
    pub(crate) fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        Self::halt_locked(&mut inner);
    }

    fn halt_locked(inner: &mut Inner) {
        inner.poll_generation = inner.poll_generation.wrapping_add(1);
        if let Some(handle) = inner.poller.take() {
            debug!("Cancelling timer polling");
            handle.abort();
        }
    }

    /// Start polling for the adopted timer when it is running and no loop is
    /// active. Called with the lock held so a concurrent command cannot slip
    /// in between adoption and spawn.
    fn ensure_polling_locked<F>(inner: &mut Inner, spawn: F)
    where
        F: FnOnce(String, u64) -> JoinHandle<()>,
    {
        if inner.closed {
            return;
        }
        let Some(timer_id) = inner
            .snapshot
            .timer
            .as_ref()
            .filter(|t| t.is_running())
            .map(|t| t.id.clone())
        else {
            return;
        };
        if inner.poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        inner.poll_generation = inner.poll_generation.wrapping_add(1);
        info!("Polling timer {}", timer_id);
        inner.poller = Some(spawn(timer_id, inner.poll_generation));
    }

    /// Finish a successful command: adopt `timer`, clear the loading flag and
    /// poll if it is running
    pub(crate) fn complete_command<F>(&self, timer: Timer, spawn: F) -> Timer
    where
        F: FnOnce(String, u64) -> JoinHandle<()>,
    {
        let timer = timer.classified();
        let mut inner = self.lock();
        inner.snapshot.timer = Some(timer.clone());
        inner.snapshot.loading = false;
        inner.snapshot.error = None;
        Self::ensure_polling_locked(&mut inner, spawn);
        self.publish(&inner.snapshot);
        timer
    }

    /// Finish a failed command. A retained running timer resumes polling.
    pub(crate) fn fail_command<F>(&self, error: SessionError, on_failure: OnFailure, spawn: F) -> SessionError
    where
        F: FnOnce(String, u64) -> JoinHandle<()>,
    {
        warn!("Timer command failed: {}", error);
        let mut inner = self.lock();
        match on_failure {
            OnFailure::Keep => {}
            OnFailure::Clear => inner.snapshot.timer = None,
            OnFailure::Replace(timer) => inner.snapshot.timer = Some(timer.classified()),
        }
        inner.snapshot.loading = false;
        inner.snapshot.error = Some(error.clone());
        Self::ensure_polling_locked(&mut inner, spawn);
        self.publish(&inner.snapshot);
        error
    }

    /// Apply a poll response if it belongs to the active loop
    pub(crate) fn apply_poll(&self, generation: u64, result: Result<Timer, SessionError>) -> PollOutcome {
        let mut inner = self.lock();
        if inner.poll_generation != generation || inner.poller.is_none() {
            debug!("Discarding response from cancelled poll loop");
            return PollOutcome::Stale;
        }

        let outcome = match result {
            Ok(timer) => {
                let timer = timer.classified();
                let running = timer.is_running();
                if !running {
                    info!("Timer {} is now {}, polling stopped", timer.id, timer.status);
                    inner.poller = None;
                }
                inner.snapshot.timer = Some(timer);
                if inner.snapshot.error.as_ref().is_some_and(SessionError::is_transient) {
                    inner.snapshot.error = None;
                }
                if running {
                    PollOutcome::Continue
                } else {
                    PollOutcome::Finished
                }
            }
            Err(error) => {
                warn!("Timer poll failed: {}", error);
                inner.snapshot.error = Some(error);
                PollOutcome::Failed
            }
        };

        self.publish(&inner.snapshot);
        outcome
    }

    /// Called by a loop that gives up on its own. Watchers are notified so
    /// they can observe that polling is over.
    pub(crate) fn end_polling(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.poll_generation == generation && inner.poller.take().is_some() {
            self.publish(&inner.snapshot);
        }
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.lock().poller.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}
