//! Completion sweep scheduling
//!
//! This module owns the recurring task that advances elapsed approved
//! events to the completed state. The sweep itself lives in the lifecycle
//! service; the sweeper only drives it on a fixed interval.

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::services::EventLifecycleService;

/// Recurring driver for the lifecycle completion sweep
pub struct CompletionSweeper {
    lifecycle: EventLifecycleService,
    sweep_interval: Duration,
    sweep_handle: Option<tokio::task::JoinHandle<()>>,
}

impl CompletionSweeper {
    /// Create a new CompletionSweeper instance
    pub fn new(lifecycle: EventLifecycleService, config: &SchedulerConfig) -> Self {
        Self {
            lifecycle,
            sweep_interval: Duration::from_secs(config.sweep_interval_seconds),
            sweep_handle: None,
        }
    }

    /// Start the recurring sweep task
    ///
    /// The first sweep runs immediately, so elapsed events are caught up
    /// after a restart; subsequent sweeps follow the configured interval.
    pub fn start(&mut self) {
        if self.sweep_handle.is_some() {
            warn!("Completion sweep task is already running");
            return;
        }

        let lifecycle = self.lifecycle.clone();
        let interval = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut sweep_interval = tokio::time::interval(interval);

            loop {
                sweep_interval.tick().await;

                match lifecycle.sweep_completions(Utc::now()).await {
                    Ok(transitioned) => {
                        if transitioned > 0 {
                            info!("Completion sweep transitioned {} events", transitioned);
                        }
                    }
                    Err(e) => {
                        error!("Completion sweep failed: {}", e);
                    }
                }
            }
        });

        self.sweep_handle = Some(handle);
        info!("Started completion sweep task with interval {:?}", self.sweep_interval);
    }

    /// Stop the recurring sweep task
    pub fn stop(&mut self) {
        if let Some(handle) = self.sweep_handle.take() {
            handle.abort();
            info!("Stopped completion sweep task");
        }
    }

    /// Whether the sweep task is currently running
    pub fn is_running(&self) -> bool {
        self.sweep_handle.is_some()
    }
}

impl Drop for CompletionSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
