// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

mod reminders;

pub use reminders::{EventReminder, RsvpLinks};

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Email(String);

impl Email {
    pub fn new(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Email {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct Recipient {
    pub name: String,
    pub email: Email,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp_deadline: Option<DateTime<Utc>>,
}

/// The different kinds of NotificationTasks that are currently supported
#[derive(Deserialize, PartialEq, Eq, Debug)]
#[cfg_attr(any(test, feature = "client"), derive(Serialize))]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum Message {
    /// A mail sent to guests who have not responded before the event
    EventReminder(EventReminder),
}

/// Link to a page of the RSVP frontend or API
pub type Link = Url;
