// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! SMS reminders via an HTTP gateway
//!
//! The gateway receives `POST {gateway_url}` with a JSON body `{from, to, text}` and the
//! configured api key as bearer token. It may answer with `{"id": "..."}`.

use super::{DeliveryError, DeliveryReceipt, Reminder, SmsReminderSender};
use async_trait::async_trait;
use controller_shared::settings::SharedSettings;
use phonenumber::PhoneNumber;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    id: Option<String>,
}

#[derive(Clone)]
pub struct SmsService {
    settings: SharedSettings,
    client: reqwest::Client,
}

impl SmsService {
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SmsReminderSender for SmsService {
    async fn send_sms_reminder(
        &self,
        reminder: &Reminder<'_>,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let Some(sms) = self.settings.load().sms.clone() else {
            return Err(DeliveryError::NotConfigured("sms"));
        };

        let phone = reminder
            .guest
            .phone
            .as_deref()
            .ok_or_else(|| DeliveryError::InvalidRecipient("guest has no phone number".into()))?;

        let region = sms
            .default_region
            .as_deref()
            .and_then(|region| region.parse::<phonenumber::country::Id>().ok());

        let to = parse_phone_number(phone, region)
            .map(|number| number.format().mode(phonenumber::Mode::E164).to_string())
            .ok_or_else(|| DeliveryError::InvalidRecipient("invalid phone number".into()))?;

        let text = reminder_text(reminder);

        let response = self
            .client
            .post(sms.gateway_url.clone())
            .bearer_auth(&sms.api_key)
            .json(&SmsRequest {
                from: &sms.sender,
                to: &to,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.into()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(DeliveryError::Rejected(format!(
                "gateway answered with {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DeliveryError::Transport(e.into()))?;

        let message_id = serde_json::from_slice::<SmsResponse>(&body)
            .ok()
            .and_then(|response| response.id);

        Ok(DeliveryReceipt { message_id })
    }
}

/// Try to parse a phone number and check its validity
///
/// Numbers without international prefix are resolved with `region`.
/// Returns [`None`] if the phone number is invalid or cannot be parsed.
fn parse_phone_number(
    phone_number: &str,
    region: Option<phonenumber::country::Id>,
) -> Option<PhoneNumber> {
    // user input may contain formatting characters in arbitrary places
    let phone_number = phone_number.replace(['(', ')', ' ', '-', '/'], "");

    // the phonenumber crate panics on some malformed input
    let result = std::panic::catch_unwind(move || phonenumber::parse(region, phone_number));

    let phone_number = match result {
        Ok(Ok(phone)) => phone,
        Ok(Err(err)) => {
            log::warn!("failed to parse phone number: {:?}", err);
            return None;
        }
        Err(err) => {
            log::error!(
                "phonenumber crate panicked while parsing phone number: {:?}",
                err
            );
            return None;
        }
    };

    if !phonenumber::is_valid(&phone_number) {
        return None;
    }

    Some(phone_number)
}

fn reminder_text(reminder: &Reminder<'_>) -> String {
    let event = reminder.event;

    let mut text = format!(
        "Reminder: {} starts {} UTC.",
        event.title,
        event.starts_at.format("%Y-%m-%d %H:%M")
    );

    if let Some(deadline) = event.rsvp_deadline {
        text.push_str(&format!(
            " Please respond by {} UTC.",
            deadline.format("%Y-%m-%d %H:%M")
        ));
    }

    text.push_str(&format!(" RSVP: {}", reminder.links.form));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::links;
    use chrono::{TimeZone, Utc};
    use controller_shared::settings::Urls;
    use pretty_assertions::assert_eq;
    use test_util::fixtures;
    use url::Url;

    fn e164(number: PhoneNumber) -> String {
        number.format().mode(phonenumber::Mode::E164).to_string()
    }

    #[test]
    fn international_number() {
        let number = parse_phone_number("+1 (650) 253-0000", None).unwrap();

        assert_eq!(e164(number), "+16502530000");
    }

    #[test]
    fn national_number_with_region() {
        let region = "US".parse::<phonenumber::country::Id>().ok();
        let number = parse_phone_number("650 253 0000", region).unwrap();

        assert_eq!(e164(number), "+16502530000");
    }

    #[test]
    fn invalid_number() {
        assert!(parse_phone_number("12", None).is_none());
        assert!(parse_phone_number("not a number", None).is_none());
    }

    #[test]
    fn text_contains_event_and_form_link() {
        let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let event = fixtures::event(starts_at)
            .title("Summer party")
            .rsvp_deadline(Utc.with_ymd_and_hms(2024, 5, 25, 12, 0, 0).unwrap())
            .build();
        let guest = fixtures::guest(&event).build();

        let urls = Urls {
            api: Url::parse("http://localhost:11311/").unwrap(),
            frontend: Url::parse("http://localhost:3000/").unwrap(),
        };
        let links = links::rsvp_links(&urls, &guest.token).unwrap();

        let text = reminder_text(&Reminder {
            guest: &guest,
            event: &event,
            links: &links,
        });

        assert_eq!(
            text,
            format!(
                "Reminder: Summer party starts 2024-06-01 18:00 UTC. \
                 Please respond by 2024-05-25 12:00 UTC. \
                 RSVP: http://localhost:3000/rsvp/{}",
                guest.token
            )
        );
    }
}
