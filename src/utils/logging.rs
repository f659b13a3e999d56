//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the VolunteerHub service.

use crate::config::LoggingConfig;
use crate::utils::errors::Result;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging based on configuration
///
/// Returns the worker guard for the non-blocking file writer. The caller
/// must keep it alive for the lifetime of the process or buffered log
/// lines are lost on shutdown.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "volunteerhub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event lifecycle transitions with structured data
pub fn log_lifecycle_transition(event_id: i64, from: &str, to: &str) {
    info!(
        event_id = event_id,
        from = from,
        to = to,
        "Event lifecycle transition"
    );
}

/// Log registration attempts and outcomes
pub fn log_registration(event_id: i64, position_id: i64, user_id: i64, outcome: &str) {
    info!(
        event_id = event_id,
        position_id = position_id,
        user_id = user_id,
        outcome = outcome,
        "Registration processed"
    );
}

/// Log completion sweep results
pub fn log_sweep_result(candidates: usize, transitioned: u64) {
    if transitioned > 0 {
        info!(
            candidates = candidates,
            transitioned = transitioned,
            "Completion sweep finished"
        );
    } else {
        debug!(candidates = candidates, "Completion sweep found nothing to do");
    }
}

/// Log notification fan-out statistics
pub fn log_fan_out(batch_id: &str, kind: &str, sent: u64, failed: u64) {
    if failed > 0 {
        warn!(
            batch_id = batch_id,
            kind = kind,
            sent = sent,
            failed = failed,
            "Notification fan-out completed with failures"
        );
    } else {
        info!(
            batch_id = batch_id,
            kind = kind,
            sent = sent,
            "Notification fan-out completed"
        );
    }
}

/// Log task management actions
pub fn log_task_action(task_id: i64, action: &str, user_id: i64) {
    info!(
        task_id = task_id,
        action = action,
        user_id = user_id,
        "Task action performed"
    );
}
