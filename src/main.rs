//! Countdown Face - a countdown timer whose character escalates its
//! expression as the deadline approaches
//!
//! This is the terminal front-end: it creates and starts one timer on the
//! configured service and prints a status line whenever the session changes.

use std::sync::Arc;

use tracing::{error, info, warn};

use countdown_face::{
    config::Config,
    services::{HttpTimerService, TimerService},
    session::{SessionSnapshot, TimerSession},
    state::{parse_duration, TimerStatus},
    utils::shutdown_signal,
};

fn render(snapshot: &SessionSnapshot) -> Option<String> {
    let timer = snapshot.timer.as_ref()?;
    let flash = if snapshot.should_flash() { "  <<!>>" } else { "" };
    let error = snapshot
        .error
        .as_ref()
        .map(|e| format!("  ({})", e))
        .unwrap_or_default();

    Some(format!(
        "[{}] {:<8} face={:<7} urgency={}{}{}",
        snapshot.clock(),
        timer.status,
        snapshot.expression(),
        timer.urgency_level,
        flash,
        error
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_face={}", config.log_level()))
        .init();

    info!("Starting countdown-face v1.0.0");
    info!(
        "Configuration: server={}, duration={}, poll={}ms",
        config.server, config.duration, config.poll_interval_ms
    );

    let duration = parse_duration(&config.duration)?;
    let service = Arc::new(HttpTimerService::new(config.server.clone(), config.request_timeout())?);

    // The service has to be reachable before a timer can be created
    if let Err(e) = service.health().await {
        error!("Timer service at {} is not available: {}", service.base_url(), e);
        std::process::exit(1);
    }

    let session = TimerSession::new(service, config.session_config());
    let mut updates = session.subscribe();

    session.create_and_start(duration).await?;

    let watch_timer = async {
        let mut last_line = None;
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if let Some(line) = render(&snapshot) {
                if last_line.as_ref() != Some(&line) {
                    println!("{}", line);
                    last_line = Some(line);
                }
            }

            if !snapshot.loading && !session.is_polling() {
                match snapshot.status() {
                    Some(TimerStatus::Running) => warn!("Lost contact with the timer service"),
                    status => info!("Timer ended in state {:?}", status),
                }
                break;
            }

            if updates.changed().await.is_err() {
                break;
            }
        }
    };

    let interrupted = async {
        if let Err(e) = shutdown_signal().await {
            error!("Failed to listen for shutdown signals: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = watch_timer => {}
        _ = interrupted => {
            if session.snapshot().status() == Some(TimerStatus::Running) {
                info!("Shutdown signal received, stopping timer");
                if let Err(e) = session.stop().await {
                    warn!("Failed to stop timer on shutdown: {}", e);
                }
            }
        }
    }

    session.shutdown();
    info!("Session closed");
    Ok(())
}
