#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use countdown_face::{
    services::{ServiceError, TimerService},
    session::SessionSnapshot,
    state::{Timer, TimerStatus},
};

#[derive(Default)]
struct FakeState {
    timers: HashMap<String, Timer>,
    next_id: u64,
    calls: Vec<String>,
    fail_next: HashMap<&'static str, ServiceError>,
    fail_gets: bool,
    get_delay: Duration,
    command_delay: Duration,
}

/// In-memory timer service. Time only moves when a test says so.
#[derive(Default)]
pub struct FakeTimerService {
    state: Mutex<FakeState>,
    gets_in_flight: AtomicUsize,
    max_gets_in_flight: AtomicUsize,
}

impl FakeTimerService {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &str) -> (Option<ServiceError>, Duration) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        let op = call.split(':').next().unwrap_or(call);
        let failure = state.fail_next.remove(op);
        (failure, state.command_delay)
    }

    fn mutate<F>(&self, id: &str, f: F) -> Result<Timer, ServiceError>
    where
        F: FnOnce(&mut Timer),
    {
        let mut state = self.state.lock().unwrap();
        let timer = state
            .timers
            .get_mut(id)
            .ok_or_else(|| ServiceError::status(404, Some("Timer not found".to_string())))?;
        f(timer);
        timer.updated_at = Some(Utc::now());
        Ok(timer.clone())
    }

    async fn command<F>(&self, op: &str, id: &str, f: F) -> Result<Timer, ServiceError>
    where
        F: FnOnce(&mut Timer),
    {
        let (failure, delay) = self.record(&format!("{op}:{id}"));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = failure {
            return Err(err);
        }
        self.mutate(id, f)
    }

    pub fn set_elapsed(&self, id: &str, elapsed_time: i64) {
        self.mutate(id, |t| t.elapsed_time = elapsed_time).unwrap();
    }

    pub fn set_status(&self, id: &str, status: TimerStatus) {
        self.mutate(id, |t| t.status = status).unwrap();
    }

    /// Make the next call of `op` (`create`, `start`, `stop`, `reset`,
    /// `set_duration`) fail with `error`
    pub fn fail_next(&self, op: &'static str, error: ServiceError) {
        self.state.lock().unwrap().fail_next.insert(op, error);
    }

    pub fn set_fail_gets(&self, fail: bool) {
        self.state.lock().unwrap().fail_gets = fail;
    }

    pub fn set_get_delay(&self, delay: Duration) {
        self.state.lock().unwrap().get_delay = delay;
    }

    pub fn set_command_delay(&self, delay: Duration) {
        self.state.lock().unwrap().command_delay = delay;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn get_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("get:")).count()
    }

    pub fn max_gets_in_flight(&self) -> usize {
        self.max_gets_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimerService for FakeTimerService {
    async fn create(&self, duration: i64) -> Result<Timer, ServiceError> {
        let (failure, delay) = self.record(&format!("create:{duration}"));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let now = Utc::now();
        let timer = Timer {
            id: format!("timer-{}", state.next_id),
            duration,
            elapsed_time: 0,
            status: TimerStatus::Idle,
            urgency_level: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.timers.insert(timer.id.clone(), timer.clone());
        Ok(timer)
    }

    async fn start(&self, id: &str) -> Result<Timer, ServiceError> {
        self.command("start", id, |t| t.status = TimerStatus::Running).await
    }

    async fn stop(&self, id: &str) -> Result<Timer, ServiceError> {
        self.command("stop", id, |t| t.status = TimerStatus::Paused).await
    }

    async fn reset(&self, id: &str) -> Result<Timer, ServiceError> {
        self.command("reset", id, |t| {
            t.status = TimerStatus::Idle;
            t.elapsed_time = 0;
            t.urgency_level = 0;
        })
        .await
    }

    async fn set_duration(&self, id: &str, duration: i64) -> Result<Timer, ServiceError> {
        self.command("set_duration", id, |t| t.duration = duration).await
    }

    async fn list(&self) -> Result<Vec<Timer>, ServiceError> {
        self.record("list");
        Ok(self.state.lock().unwrap().timers.values().cloned().collect())
    }

    /// Captures the timer when the request arrives and answers after the
    /// configured delay, like a slow server would
    async fn get(&self, id: &str) -> Result<Timer, ServiceError> {
        self.record(&format!("get:{id}"));
        let (captured, fail, delay) = {
            let state = self.state.lock().unwrap();
            (state.timers.get(id).cloned(), state.fail_gets, state.get_delay)
        };

        let in_flight = self.gets_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_gets_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.gets_in_flight.fetch_sub(1, Ordering::SeqCst);

        if fail {
            return Err(ServiceError::Transport("connection reset".to_string()));
        }
        captured.ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}

/// Wait until a snapshot satisfies `predicate`, failing after a minute of
/// (virtual) time
pub async fn wait_for<F>(updates: &mut watch::Receiver<SessionSnapshot>, predicate: F) -> SessionSnapshot
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), updates.wait_for(predicate))
        .await
        .expect("timed out waiting for session state")
        .expect("session dropped")
        .clone()
}
