// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Sends reminders to guests over their channels
//!
//! Each guest gets a [`ChannelPlan`]. The planned channels are sent concurrently and the
//! successful ones are recorded with a single store update per guest. A failed channel keeps its
//! timestamp unset so a later tick retries it.

use crate::services::{
    links, DeliveryError, EmailReminderSender, Reminder, SmsReminderSender,
};
use crate::store::ReminderStore;
use chrono::Utc;
use controller_shared::settings::Urls;
use db_storage::events::Event;
use db_storage::guests::Guest;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::ops::AddAssign;
use std::sync::Arc;

/// The channels a guest still needs a reminder on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelPlan {
    pub email: bool,
    pub sms: bool,
}

impl ChannelPlan {
    pub fn for_guest(guest: &Guest) -> Self {
        Self {
            email: guest.notify_by_email && guest.reminder_sent_at.is_none(),
            sms: guest.notify_by_sms
                && guest.phone.is_some()
                && guest.sms_reminder_sent_at.is_none(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.email || self.sms)
    }
}

/// Counters of a dispatch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchCounters {
    pub emails_sent: u32,
    pub sms_sent: u32,
    pub errors: u32,
}

impl AddAssign for DispatchCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.emails_sent += rhs.emails_sent;
        self.sms_sent += rhs.sms_sent;
        self.errors += rhs.errors;
    }
}

pub struct Dispatcher {
    store: Arc<dyn ReminderStore>,
    email: Arc<dyn EmailReminderSender>,
    sms: Arc<dyn SmsReminderSender>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        email: Arc<dyn EmailReminderSender>,
        sms: Arc<dyn SmsReminderSender>,
    ) -> Self {
        Self { store, email, sms }
    }

    /// Notify all `guests`, at most `concurrency` at a time
    ///
    /// Never fails, every problem is logged and counted as an error.
    pub async fn dispatch(
        &self,
        guests: Vec<(Arc<Event>, Guest)>,
        urls: &Urls,
        concurrency: usize,
    ) -> DispatchCounters {
        stream::iter(guests)
            .map(|(event, guest)| async move { self.notify_guest(&event, &guest, urls).await })
            .buffer_unordered(concurrency.max(1))
            .fold(DispatchCounters::default(), |mut counters, outcome| async move {
                counters += outcome;
                counters
            })
            .await
    }

    #[tracing::instrument(skip_all, fields(guest_id = %guest.id, event_id = %event.id))]
    async fn notify_guest(&self, event: &Event, guest: &Guest, urls: &Urls) -> DispatchCounters {
        let mut counters = DispatchCounters::default();

        let plan = ChannelPlan::for_guest(guest);

        if plan.is_empty() || !guest.status.is_pending() {
            return counters;
        }

        let links = match links::rsvp_links(urls, &guest.token) {
            Ok(links) => links,
            Err(e) => {
                log::error!("Cannot build RSVP links for guest {}: {}", guest.id, e);
                counters.errors += 1;
                return counters;
            }
        };

        let reminder = Reminder {
            guest,
            event,
            links: &links,
        };

        let email = async {
            if plan.email {
                Some(self.email.send_email_reminder(&reminder).await)
            } else {
                None
            }
        };

        let sms = async {
            if plan.sms {
                Some(self.sms.send_sms_reminder(&reminder).await)
            } else {
                None
            }
        };

        let (email, sms) = futures::join!(email, sms);

        let now = Utc::now();

        let email_sent_at = email
            .and_then(|result| delivered("email", guest, event, result, &mut counters))
            .map(|_| now);

        let sms_sent_at = sms
            .and_then(|result| delivered("sms", guest, event, result, &mut counters))
            .map(|_| now);

        if email_sent_at.is_some() {
            counters.emails_sent += 1;
        }

        if sms_sent_at.is_some() {
            counters.sms_sent += 1;
        }

        if email_sent_at.is_none() && sms_sent_at.is_none() {
            return counters;
        }

        if let Err(e) = self
            .store
            .mark_reminders_sent(guest.id, email_sent_at, sms_sent_at)
            .await
        {
            log::error!(
                "Failed to record sent reminders of guest {} for event {}: {}",
                guest.id,
                event.id,
                e
            );
            counters.errors += 1;
        }

        counters
    }
}

/// Log and count a failed delivery, returns `Some` for a successful one
fn delivered(
    channel: &str,
    guest: &Guest,
    event: &Event,
    result: Result<crate::services::DeliveryReceipt, DeliveryError>,
    counters: &mut DispatchCounters,
) -> Option<()> {
    match result {
        Ok(receipt) => {
            log::debug!(
                "Sent {} reminder to guest {} for event {} (message id {:?})",
                channel,
                guest.id,
                event.id,
                receipt.message_id
            );

            Some(())
        }
        Err(e) => {
            log::warn!(
                "Failed to send {} reminder to guest {} for event {}: {}",
                channel,
                guest.id,
                event.id,
                e
            );
            counters.errors += 1;

            None
        }
    }
}
