// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! The reminder engine
//!
//! An external scheduler triggers [`ReminderService::run_batch`] periodically. Every batch loads
//! the events starting within the lookahead window, keeps those with a due schedule entry and
//! notifies their pending guests.

use crate::settings::SharedSettings;
use crate::store::{ReminderStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

mod batch_lock;
mod dispatcher;
pub mod evaluator;

pub use batch_lock::{BatchGuard, LockError};
pub use dispatcher::{ChannelPlan, DispatchCounters, Dispatcher};

#[cfg(test)]
pub(crate) use dispatcher::tests::RecordingSender;

/// Outcome of a reminder batch
pub type BatchReport = DispatchCounters;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("a reminder batch is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Lock(LockError),
    #[error("failed to load upcoming events: {0}")]
    Store(#[from] StoreError),
}

impl From<LockError> for BatchError {
    fn from(e: LockError) -> Self {
        match e {
            LockError::Busy => Self::AlreadyRunning,
            e => Self::Lock(e),
        }
    }
}

pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
    dispatcher: Dispatcher,
    settings: SharedSettings,
    guard: BatchGuard,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        dispatcher: Dispatcher,
        settings: SharedSettings,
        guard: BatchGuard,
    ) -> Self {
        Self {
            store,
            dispatcher,
            settings,
            guard,
        }
    }

    /// Run one reminder batch now
    pub async fn run_batch(&self) -> Result<BatchReport, BatchError> {
        self.run_batch_at(Utc::now()).await
    }

    /// Run one reminder batch evaluating schedules at `now`
    ///
    /// Fails if another batch holds the lock or the upcoming events cannot be loaded. Failures
    /// of single events or guests are logged and counted.
    #[tracing::instrument(skip(self))]
    pub async fn run_batch_at(&self, now: DateTime<Utc>) -> Result<BatchReport, BatchError> {
        let settings = self.settings.load_full();

        let permit = self.guard.acquire(settings.reminders.batch_lock_ttl).await?;

        let result = self.process(now, &settings).await;

        permit.release().await;

        if let Ok(report) = &result {
            log::info!(
                "Reminder batch done, {} emails and {} SMS sent, {} errors",
                report.emails_sent,
                report.sms_sent,
                report.errors
            );
        }

        result
    }

    async fn process(
        &self,
        now: DateTime<Utc>,
        settings: &crate::settings::Settings,
    ) -> Result<BatchReport, BatchError> {
        let (after, until) = evaluator::candidate_window(now);

        let events = self.store.upcoming_events(after, until).await?;

        let mut report = BatchReport::default();
        let mut work = Vec::new();

        for event in events {
            let schedule = evaluator::effective_schedule(&event);

            let Some(entry) = evaluator::due_entry(&schedule, now, event.starts_at) else {
                continue;
            };

            log::debug!("Reminder '{}' is due for event {}", entry, event.id);

            let guests = match self.store.reminder_candidates(event.id).await {
                Ok(guests) => guests,
                Err(e) => {
                    log::error!("Failed to load guests of event {}: {}", event.id, e);
                    report.errors += 1;
                    continue;
                }
            };

            let event = Arc::new(event);

            work.extend(guests.into_iter().map(|guest| (event.clone(), guest)));
        }

        report += self
            .dispatcher
            .dispatch(work, &settings.urls, settings.reminders.concurrency)
            .await;

        Ok(report)
    }
}
