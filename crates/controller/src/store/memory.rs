// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use super::{Invitation, ReminderStore, RsvpStore, StoreError, StoredResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::DatabaseError;
use db_storage::events::Event;
use db_storage::guests::Guest;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use types::core::{EventId, GuestId, GuestStatus, GuestToken};

#[derive(Default)]
struct State {
    events: Vec<Event>,
    guests: Vec<Guest>,
    additional_guests: HashMap<GuestId, Vec<String>>,
}

/// In-memory store used by the controller tests
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_timestamp_updates: AtomicBool,
    token_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn with(events: Vec<Event>, guests: Vec<Guest>) -> Self {
        Self {
            state: Mutex::new(State {
                events,
                guests,
                additional_guests: HashMap::new(),
            }),
            fail_timestamp_updates: AtomicBool::new(false),
            token_lookups: AtomicUsize::new(0),
        }
    }

    pub fn set_additional_guests(&self, guest_id: GuestId, names: Vec<String>) {
        self.state.lock().additional_guests.insert(guest_id, names);
    }

    /// Let every following [`ReminderStore::mark_reminders_sent`] call fail
    pub fn fail_timestamp_updates(&self) {
        self.fail_timestamp_updates.store(true, Ordering::SeqCst);
    }

    /// Number of [`RsvpStore::invitation_by_token`] calls so far
    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    pub fn guest(&self, guest_id: GuestId) -> Guest {
        self.state
            .lock()
            .guests
            .iter()
            .find(|guest| guest.id == guest_id)
            .cloned()
            .expect("unknown guest")
    }

    pub fn additional_guests(&self, guest_id: GuestId) -> Vec<String> {
        self.state
            .lock()
            .additional_guests
            .get(&guest_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn upcoming_events(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .state
            .lock()
            .events
            .iter()
            .filter(|event| event.starts_at > after && event.starts_at <= until)
            .cloned()
            .collect();

        events.sort_by_key(|event| event.starts_at);

        Ok(events)
    }

    async fn reminder_candidates(&self, event_id: EventId) -> Result<Vec<Guest>, StoreError> {
        let guests = self
            .state
            .lock()
            .guests
            .iter()
            .filter(|guest| guest.event_id == event_id && guest.status == GuestStatus::Pending)
            .filter(|guest| {
                let needs_email = guest.notify_by_email && guest.reminder_sent_at.is_none();
                let needs_sms = guest.notify_by_sms
                    && guest.phone.is_some()
                    && guest.sms_reminder_sent_at.is_none();

                needs_email || needs_sms
            })
            .cloned()
            .collect();

        Ok(guests)
    }

    async fn mark_reminders_sent(
        &self,
        guest_id: GuestId,
        email_sent_at: Option<DateTime<Utc>>,
        sms_sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        if self.fail_timestamp_updates.load(Ordering::SeqCst) {
            return Err(DatabaseError::Custom("timestamp update failed".into()).into());
        }

        let mut state = self.state.lock();

        let guest = state
            .guests
            .iter_mut()
            .find(|guest| guest.id == guest_id)
            .ok_or(DatabaseError::NotFound)?;

        guest.reminder_sent_at = guest.reminder_sent_at.or(email_sent_at);
        guest.sms_reminder_sent_at = guest.sms_reminder_sent_at.or(sms_sent_at);

        Ok(())
    }
}

#[async_trait]
impl RsvpStore for MemoryStore {
    async fn invitation_by_token(
        &self,
        token: &GuestToken,
    ) -> Result<Option<Invitation>, StoreError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock();

        let Some(guest) = state.guests.iter().find(|guest| &guest.token == token) else {
            return Ok(None);
        };

        let event = state
            .events
            .iter()
            .find(|event| event.id == guest.event_id)
            .ok_or(DatabaseError::NotFound)?;

        Ok(Some(Invitation {
            guest: guest.clone(),
            event: event.clone(),
            additional_guests: state
                .additional_guests
                .get(&guest.id)
                .cloned()
                .unwrap_or_default(),
        }))
    }

    async fn save_response(
        &self,
        guest_id: GuestId,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();

        let guest = state
            .guests
            .iter_mut()
            .find(|guest| guest.id == guest_id)
            .ok_or(DatabaseError::NotFound)?;

        guest.status = response.status;
        guest.responded_at = Some(response.responded_at);

        if let Some(dietary_notes) = response.dietary_notes {
            guest.dietary_notes = dietary_notes;
        }

        if let Some(names) = response.additional_guests {
            state.additional_guests.insert(guest_id, names);
        }

        Ok(())
    }
}
