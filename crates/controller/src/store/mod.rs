// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Persistence seams of the reminder engine and the RSVP state machine
//!
//! Both only see the traits defined here. [`PostgresStore`] is the production implementation.

use crate::BlockingError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::DatabaseError;
use db_storage::events::Event;
use db_storage::guests::Guest;
use types::core::{EventId, GuestId, GuestStatus, GuestToken};

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Blocking(#[from] BlockingError),
}

/// A guest together with the event it is invited to and its additional guests
#[derive(Debug, Clone)]
pub struct Invitation {
    pub guest: Guest,
    pub event: Event,
    pub additional_guests: Vec<String>,
}

/// A guest response to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: GuestStatus,
    pub responded_at: DateTime<Utc>,
    /// `None` keeps the current notes, `Some(None)` clears them
    pub dietary_notes: Option<Option<String>>,
    /// `None` keeps the current list
    pub additional_guests: Option<Vec<String>>,
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Events starting in `(after, until]`
    async fn upcoming_events(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Pending guests of an event which still miss a reminder on at least one channel
    async fn reminder_candidates(&self, event_id: EventId) -> Result<Vec<Guest>, StoreError>;

    /// Set the given idempotency timestamps of a guest in one atomic update
    ///
    /// Timestamps which are already set must be kept.
    async fn mark_reminders_sent(
        &self,
        guest_id: GuestId,
        email_sent_at: Option<DateTime<Utc>>,
        sms_sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn invitation_by_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<Invitation>, StoreError>;

    async fn save_response(
        &self,
        guest_id: GuestId,
        response: StoredResponse,
    ) -> Result<(), StoreError>;
}
