// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use super::{Invitation, ReminderStore, RsvpStore, StoreError, StoredResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::Db;
use db_storage::events::Event;
use db_storage::guests::{AdditionalGuest, Guest, UpdateGuestResponse};
use std::sync::Arc;
use types::core::{EventId, GuestId, GuestToken};

/// Store backed by the postgres connection pool
///
/// Every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct PostgresStore {
    db: Arc<Db>,
}

impl PostgresStore {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for PostgresStore {
    async fn upcoming_events(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let db = self.db.clone();

        let events = crate::block(move || {
            let mut conn = db.get_conn()?;

            Event::get_starting_between(&mut conn, after, until)
        })
        .await??;

        Ok(events)
    }

    async fn reminder_candidates(&self, event_id: EventId) -> Result<Vec<Guest>, StoreError> {
        let db = self.db.clone();

        let guests = crate::block(move || {
            let mut conn = db.get_conn()?;

            Guest::get_reminder_candidates(&mut conn, event_id)
        })
        .await??;

        Ok(guests)
    }

    async fn mark_reminders_sent(
        &self,
        guest_id: GuestId,
        email_sent_at: Option<DateTime<Utc>>,
        sms_sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let db = self.db.clone();

        crate::block(move || {
            let mut conn = db.get_conn()?;

            Guest::mark_reminders_sent(&mut conn, guest_id, email_sent_at, sms_sent_at)
        })
        .await??;

        Ok(())
    }
}

#[async_trait]
impl RsvpStore for PostgresStore {
    async fn invitation_by_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<Invitation>, StoreError> {
        let db = self.db.clone();
        let token = token.clone();

        let invitation = crate::block(move || -> database::Result<_> {
            let mut conn = db.get_conn()?;

            let Some((guest, event)) = Guest::get_by_token(&mut conn, &token)? else {
                return Ok(None);
            };

            let additional_guests = AdditionalGuest::get_names_for_guest(&mut conn, guest.id)?;

            Ok(Some(Invitation {
                guest,
                event,
                additional_guests,
            }))
        })
        .await??;

        Ok(invitation)
    }

    async fn save_response(
        &self,
        guest_id: GuestId,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        let db = self.db.clone();

        crate::block(move || {
            let mut conn = db.get_conn()?;

            let changeset = UpdateGuestResponse {
                status: response.status,
                responded_at: response.responded_at,
                dietary_notes: response.dietary_notes,
            };

            changeset.apply(&mut conn, guest_id, response.additional_guests)
        })
        .await??;

        Ok(())
    }
}
