//! Timer polling background task

use std::sync::{Arc, Weak};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    config::SessionConfig,
    services::TimerService,
    session::{
        error::{Operation, SessionError},
        store::{PollOutcome, SessionStore},
    },
};

/// Background task that refreshes a running timer from the service.
///
/// Each fetch is awaited before the next tick is taken, so at most one
/// request is outstanding; ticks missed while a request is slow are delayed
/// rather than fired in a burst. The loop ends when the store discards a
/// response as stale, the timer stops running, the session is gone, or
/// `max_poll_failures` fetches fail in a row.
pub(crate) async fn poll_timer_task<S>(
    service: Arc<S>,
    store: Weak<SessionStore>,
    timer_id: String,
    generation: u64,
    config: SessionConfig,
) where
    S: TimerService + ?Sized,
{
    debug!("Starting poll loop {} for timer {}", generation, timer_id);

    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the adopted state is already fresh
    ticker.tick().await;

    let mut consecutive_failures: u32 = 0;

    loop {
        ticker.tick().await;

        let result = service
            .get(&timer_id)
            .await
            .map_err(|e| SessionError::failed(Operation::Poll, e));

        let Some(session) = store.upgrade() else {
            debug!("Session dropped, ending poll loop for timer {}", timer_id);
            break;
        };

        match session.apply_poll(generation, result) {
            PollOutcome::Continue => consecutive_failures = 0,
            PollOutcome::Failed => {
                consecutive_failures += 1;
                if config.max_poll_failures > 0 && consecutive_failures >= config.max_poll_failures {
                    warn!(
                        "Giving up polling timer {} after {} consecutive failures",
                        timer_id, consecutive_failures
                    );
                    session.end_polling(generation);
                    break;
                }
            }
            PollOutcome::Finished => break,
            PollOutcome::Stale => {
                info!("Poll loop {} for timer {} was cancelled", generation, timer_id);
                break;
            }
        }
    }
}
