//! Timer session controller

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::info;

use super::{
    error::{Operation, SessionError},
    snapshot::{Controls, SessionSnapshot},
    store::{OnFailure, SessionStore},
};
use crate::{
    config::SessionConfig,
    services::TimerService,
    state::Timer,
    tasks::poll_timer_task,
};

/// Client-side owner of one timer and its synchronization with the timer
/// service.
///
/// Commands are serialized by a loading flag: a command issued while another
/// is in flight fails with [`SessionError::Busy`]. While the adopted timer is
/// running a background task polls the service; it is cancelled by `stop`,
/// `reset`, `shutdown` and on drop. After `shutdown` the session refuses
/// further commands.
pub struct TimerSession<S: TimerService + ?Sized + 'static> {
    service: Arc<S>,
    store: Arc<SessionStore>,
    config: SessionConfig,
}

impl<S: TimerService + ?Sized + 'static> TimerSession<S> {
    pub fn new(service: Arc<S>, config: SessionConfig) -> Self {
        Self {
            service,
            store: Arc::new(SessionStore::new()),
            config,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    pub fn timer(&self) -> Option<Timer> {
        self.snapshot().timer
    }

    pub fn controls(&self) -> Controls {
        self.snapshot().controls()
    }

    pub fn is_polling(&self) -> bool {
        self.store.is_polling()
    }

    fn spawner(&self) -> impl FnOnce(String, u64) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let store = Arc::downgrade(&self.store);
        let config = self.config.clone();
        move |timer_id, generation| {
            tokio::spawn(poll_timer_task(service, store, timer_id, generation, config))
        }
    }

    fn adopt(&self, timer: Timer) -> Timer {
        let timer = self.store.complete_command(timer, self.spawner());
        info!(
            "Timer {} is {} ({}s of {}s elapsed, urgency {})",
            timer.id, timer.status, timer.elapsed_time, timer.duration, timer.urgency_level
        );
        timer
    }

    fn fail(&self, error: SessionError, on_failure: OnFailure) -> SessionError {
        self.store.fail_command(error, on_failure, self.spawner())
    }

    fn validate_duration(&self, duration: i64) -> Result<(), SessionError> {
        if duration <= 0 {
            return Err(self.store.reject(SessionError::InvalidDuration(format!(
                "duration must be a positive number of seconds, got {}",
                duration
            ))));
        }
        Ok(())
    }

    fn begin(&self) -> Result<String, SessionError> {
        self.store
            .begin_command(true)?
            .ok_or(SessionError::NoActiveTimer)
    }

    /// Create a timer of `duration` seconds and start it. On failure the
    /// session is left without a timer.
    pub async fn create_and_start(&self, duration: i64) -> Result<Timer, SessionError> {
        self.validate_duration(duration)?;
        self.store.begin_command(false)?;
        self.store.halt_polling();
        info!("Creating and starting a {}s timer", duration);

        let created = match self.service.create(duration).await {
            Ok(timer) => timer,
            Err(e) => {
                return Err(self.fail(SessionError::failed(Operation::Create, e), OnFailure::Clear));
            }
        };

        match self.service.start(&created.id).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(SessionError::failed(Operation::Start, e), OnFailure::Clear)),
        }
    }

    /// Start or resume the adopted timer
    pub async fn start(&self) -> Result<Timer, SessionError> {
        let id = self.begin()?;
        info!("Starting timer {}", id);

        match self.service.start(&id).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(SessionError::failed(Operation::Start, e), OnFailure::Keep)),
        }
    }

    /// Pause the adopted timer. Polling halts before the request goes out;
    /// if the request fails and the timer is still running, polling resumes.
    pub async fn stop(&self) -> Result<Timer, SessionError> {
        let id = self.begin()?;
        self.store.halt_polling();
        info!("Stopping timer {}", id);

        match self.service.stop(&id).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(SessionError::failed(Operation::Stop, e), OnFailure::Keep)),
        }
    }

    /// Reset the adopted timer to idle, keeping its duration
    pub async fn reset(&self) -> Result<Timer, SessionError> {
        let id = self.begin()?;
        self.store.halt_polling();
        info!("Resetting timer {}", id);

        match self.service.reset(&id).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(SessionError::failed(Operation::Reset, e), OnFailure::Keep)),
        }
    }

    /// Reset the adopted timer and give it a new duration
    pub async fn reset_with_duration(&self, duration: i64) -> Result<Timer, SessionError> {
        self.validate_duration(duration)?;
        let id = self.begin()?;
        self.store.halt_polling();
        info!("Resetting timer {} with a new duration of {}s", id, duration);

        let reset = match self.service.reset(&id).await {
            Ok(timer) => timer,
            Err(e) => {
                return Err(self.fail(SessionError::failed(Operation::Reset, e), OnFailure::Keep));
            }
        };

        match self.service.set_duration(&id, duration).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(
                SessionError::failed(Operation::Reset, e),
                OnFailure::Replace(reset),
            )),
        }
    }

    /// Fetch the adopted timer once, outside the polling loop
    pub async fn refresh(&self) -> Result<Timer, SessionError> {
        let id = self.begin()?;

        match self.service.get(&id).await {
            Ok(timer) => Ok(self.adopt(timer)),
            Err(e) => Err(self.fail(SessionError::failed(Operation::Poll, e), OnFailure::Keep)),
        }
    }

    /// Stop polling for good. The adopted timer stays visible; every later
    /// command fails with [`SessionError::Closed`].
    pub fn shutdown(&self) {
        info!("Shutting down timer session");
        self.store.close();
    }
}

impl<S: TimerService + ?Sized + 'static> Drop for TimerSession<S> {
    fn drop(&mut self) {
        self.store.halt_polling();
    }
}
