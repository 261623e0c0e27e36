// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Delivery channels used by the reminder dispatcher
//!
//! The dispatcher only knows the [`EmailReminderSender`] and [`SmsReminderSender`] capabilities.
//! [`MailService`] hands emails to the notification worker via RabbitMQ, [`SmsService`] talks to
//! an HTTP SMS gateway.

use async_trait::async_trait;
use db_storage::events::Event;
use db_storage::guests::Guest;
use notification_proto::v1::RsvpLinks;

pub mod links;
mod mail;
mod sms;

pub use mail::MailService;
pub use sms::SmsService;

/// Everything a channel needs to render a reminder for one guest
#[derive(Debug, Clone, Copy)]
pub struct Reminder<'a> {
    pub guest: &'a Guest,
    pub event: &'a Event,
    pub links: &'a RsvpLinks,
}

/// Result of a successful delivery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Message id assigned by the provider, if it returned one
    pub message_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("{0} delivery is not configured")]
    NotConfigured(&'static str),
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("rejected by provider: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait EmailReminderSender: Send + Sync {
    async fn send_email_reminder(
        &self,
        reminder: &Reminder<'_>,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

#[async_trait]
pub trait SmsReminderSender: Send + Sync {
    async fn send_sms_reminder(
        &self,
        reminder: &Reminder<'_>,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
