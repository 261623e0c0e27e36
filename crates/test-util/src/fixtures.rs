// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Builders for database rows without a database
//!
//! ```ignore,rust
//! let event = fixtures::event(starts_at).rsvp_deadline(deadline).build();
//! let guest = fixtures::guest(&event).phone("+16502530000").build();
//! ```

use chrono::{DateTime, Duration, Utc};
use db_storage::events::Event;
use db_storage::guests::Guest;
use types::core::{EventId, GuestId, GuestStatus, GuestToken};
use uuid::Uuid;

/// Start building an event starting at `starts_at`
pub fn event(starts_at: DateTime<Utc>) -> EventBuilder {
    let created_at = starts_at - Duration::days(30);

    EventBuilder(Event {
        id: EventId::from(Uuid::new_v4()),
        title: "Test event".into(),
        description: String::new(),
        starts_at,
        ends_at: None,
        rsvp_deadline: None,
        reminder_schedule: None,
        max_guests_per_invitee: None,
        created_at,
        updated_at: created_at,
    })
}

pub struct EventBuilder(Event);

impl EventBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.0.title = title.into();
        self
    }

    pub fn rsvp_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.0.rsvp_deadline = Some(deadline);
        self
    }

    /// Set the raw persisted schedule
    pub fn reminder_schedule(mut self, schedule: &str) -> Self {
        self.0.reminder_schedule = Some(schedule.into());
        self
    }

    pub fn max_guests_per_invitee(mut self, cap: i32) -> Self {
        self.0.max_guests_per_invitee = Some(cap);
        self
    }

    pub fn build(self) -> Event {
        self.0
    }
}

/// Start building a pending guest of `event` who wants email reminders only
pub fn guest(event: &Event) -> GuestBuilder {
    let id = Uuid::new_v4();

    GuestBuilder(Guest {
        id: GuestId::from(id),
        event_id: event.id,
        name: "Test guest".into(),
        email: format!("{}@example.org", id.simple()),
        phone: None,
        status: GuestStatus::Pending,
        notify_by_email: true,
        notify_by_sms: false,
        token: GuestToken::generate(),
        reminder_sent_at: None,
        sms_reminder_sent_at: None,
        max_guests: None,
        dietary_notes: None,
        responded_at: None,
        created_at: event.created_at,
    })
}

pub struct GuestBuilder(Guest);

impl GuestBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.0.name = name.into();
        self
    }

    pub fn status(mut self, status: GuestStatus) -> Self {
        self.0.status = status;
        self
    }

    /// Set a phone number and enable SMS reminders
    pub fn phone(mut self, phone: &str) -> Self {
        self.0.phone = Some(phone.into());
        self.0.notify_by_sms = true;
        self
    }

    pub fn notify_by_email(mut self, notify: bool) -> Self {
        self.0.notify_by_email = notify;
        self
    }

    pub fn notify_by_sms(mut self, notify: bool) -> Self {
        self.0.notify_by_sms = notify;
        self
    }

    pub fn reminder_sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.0.reminder_sent_at = Some(sent_at);
        self
    }

    pub fn sms_reminder_sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.0.sms_reminder_sent_at = Some(sent_at);
        self
    }

    pub fn max_guests(mut self, cap: i32) -> Self {
        self.0.max_guests = Some(cap);
        self
    }

    pub fn dietary_notes(mut self, notes: &str) -> Self {
        self.0.dietary_notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Guest {
        self.0
    }
}
