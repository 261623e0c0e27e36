// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! MailService
//!
//! Publishes reminder mails as [`NotificationTask`]s to the RabbitMQ queue of the notification
//! worker, which renders and sends them.

use super::{DeliveryError, DeliveryReceipt, EmailReminderSender, Reminder};
use anyhow::Context;
use async_trait::async_trait;
use controller_shared::settings::SharedSettings;
use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use notification_proto::NotificationTask;
use uuid::Uuid;

#[derive(Clone)]
pub struct MailService {
    settings: SharedSettings,
    rabbit_mq_channel: Option<lapin::Channel>,
}

impl MailService {
    pub fn new(settings: SharedSettings, rabbit_mq_channel: Option<lapin::Channel>) -> Self {
        Self {
            settings,
            rabbit_mq_channel,
        }
    }

    async fn send_to_rabbitmq(
        &self,
        task: NotificationTask,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let queue_name = self.settings.load().rabbit_mq.notification_queue.clone();

        let (Some(queue_name), Some(channel)) = (queue_name, &self.rabbit_mq_channel) else {
            return Err(DeliveryError::NotConfigured("email"));
        };

        let task_id = Uuid::new_v4().to_string();

        let payload = serde_json::to_vec(&task)
            .context("Failed to serialize notification task")
            .map_err(DeliveryError::Transport)?;

        let properties = BasicProperties::default()
            .with_message_id(task_id.clone().into())
            .with_content_type("application/json".into());

        channel
            .basic_publish(
                "",
                &queue_name,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await
            .context("Failed to publish notification task")
            .map_err(DeliveryError::Transport)?;

        log::debug!("Published {} task {}", task.as_kind_str(), task_id);

        Ok(DeliveryReceipt {
            message_id: Some(task_id),
        })
    }
}

#[async_trait]
impl EmailReminderSender for MailService {
    async fn send_email_reminder(
        &self,
        reminder: &Reminder<'_>,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if reminder.guest.email.trim().is_empty() {
            return Err(DeliveryError::InvalidRecipient(
                "guest has no email address".into(),
            ));
        }

        let task = NotificationTask::event_reminder(
            reminder.guest,
            reminder.event,
            reminder.links.clone(),
        );

        self.send_to_rabbitmq(task).await
    }
}
