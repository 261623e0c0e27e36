// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Messages published by the controller for the notification worker
//!
//! The worker renders and sends the actual mails. Every task carries a `version` tag so the
//! worker can keep accepting older messages while the controller moves on.

use serde::Deserialize;
#[cfg(any(test, feature = "client"))]
use serde::Serialize;
pub mod v1;

/// Versioned Notification Task Protocol
#[derive(Deserialize, PartialEq, Eq, Debug)]
#[cfg_attr(any(test, feature = "client"), derive(Serialize))]
#[serde(tag = "version")]
pub enum NotificationTask {
    #[serde(rename = "1")]
    V1(v1::Message),
}

#[cfg(feature = "client")]
impl NotificationTask {
    /// Creates a NotificationTask reminding a guest who has not responded yet
    pub fn event_reminder<R, E>(recipient: R, event: E, links: v1::RsvpLinks) -> NotificationTask
    where
        R: Into<v1::Recipient>,
        E: Into<v1::Event>,
    {
        Self::V1(v1::Message::EventReminder(v1::EventReminder {
            recipient: recipient.into(),
            event: event.into(),
            links,
        }))
    }

    pub fn as_kind_str(&self) -> &'static str {
        match self {
            NotificationTask::V1(message) => match message {
                v1::Message::EventReminder(_) => "event_reminder",
            },
        }
    }
}

#[cfg(feature = "client")]
impl From<&db_storage::guests::Guest> for v1::Recipient {
    fn from(guest: &db_storage::guests::Guest) -> Self {
        Self {
            name: guest.name.clone(),
            email: guest.email.clone().into(),
        }
    }
}

#[cfg(feature = "client")]
impl From<&db_storage::events::Event> for v1::Event {
    fn from(event: &db_storage::events::Event) -> Self {
        Self {
            id: *event.id.inner(),
            title: event.title.clone(),
            description: event.description.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            rsvp_deadline: event.rsvp_deadline,
        }
    }
}
