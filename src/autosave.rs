//! Background history checkpoint scheduling.
//!
//! The autosave timer is the only time-driven trigger in the core: a spawned
//! task ticks at the configured interval and sends
//! [`Action::SaveHistory`] over a channel for the host to dispatch. The
//! reducer already skips checkpoints identical to the current one, so idle
//! ticks are harmless. Dropping the handle aborts the task; no tick can fire
//! after the owning session ends.

#[cfg(test)]
#[path = "autosave_test.rs"]
mod autosave_test;

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::action::Action;
use crate::doc::EditorSettings;

/// Handle to a running autosave task. Aborts the task on drop.
#[derive(Debug)]
pub struct Autosave {
    handle: JoinHandle<()>,
}

impl Autosave {
    /// Spawn a ticker that emits a `SaveHistory` action every
    /// `interval_ms` milliseconds until the receiver closes or the handle
    /// drops.
    #[must_use]
    pub fn spawn(interval_ms: u64, tx: UnboundedSender<Action>) -> Self {
        let period = Duration::from_millis(interval_ms.max(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so saves start one full period after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let action = Action::SaveHistory { description: "Autosave".to_string() };
                if tx.send(action).is_err() {
                    debug!("autosave receiver closed; stopping");
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Spawn from editor settings, if autosave is enabled there.
    #[must_use]
    pub fn from_settings(settings: &EditorSettings, tx: UnboundedSender<Action>) -> Option<Self> {
        if !settings.auto_save {
            return None;
        }
        Some(Self::spawn(settings.auto_save_interval_ms, tx))
    }

    /// Stop the task explicitly (dropping the handle does the same).
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
