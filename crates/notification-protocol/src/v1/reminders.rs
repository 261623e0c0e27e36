// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use super::{Event, Link, Recipient};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
pub struct EventReminder {
    pub recipient: Recipient,
    pub event: Event,
    pub links: RsvpLinks,
}

/// Links embedded in a reminder
///
/// `form` opens the full RSVP form, the others answer with a single click.
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone)]
pub struct RsvpLinks {
    pub form: Link,
    pub attending: Link,
    pub not_attending: Link,
    pub maybe: Link,
}
