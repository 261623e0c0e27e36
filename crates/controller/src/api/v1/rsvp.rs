// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! RSVP endpoints for invited guests
//!
//! Guests are not authenticated, the token of their invitation link identifies them. Unknown and
//! malformed tokens produce the same response.

use super::response::{ApiError, DefaultApiResult, ValidationErrorEntry};
use crate::rsvp::{self, RsvpRequest, TransitionError};
use crate::services::links;
use crate::settings::SharedSettingsActix;
use crate::store::{Invitation, RsvpStore};
use actix_web::http::header;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, patch, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use types::core::{GuestStatus, ResponseStatus};
use types::guest_limit::{check_guest_limit, effective_cap};
use validator::{Validate, ValidationError};

const MAX_GUEST_NAME_LENGTH: usize = 255;

/// The invitation as shown in the RSVP form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResource {
    pub event: RsvpEventResource,
    pub guest: RsvpGuestResource,
    pub guest_limit: GuestLimitResource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpEventResource {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    pub deadline_passed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpGuestResource {
    pub name: String,
    pub status: GuestStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub additional_guests: Vec<String>,
    pub dietary_notes: Option<String>,
}

/// Additional guest limits of the guest, `null` means unlimited
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestLimitResource {
    pub max_additional_guests: Option<u32>,
    pub remaining: Option<u32>,
}

impl RsvpResource {
    fn new(invitation: Invitation, now: DateTime<Utc>) -> Self {
        let Invitation {
            guest,
            event,
            additional_guests,
        } = invitation;

        let cap = effective_cap(event.max_guests_per_invitee, guest.max_guests);
        let check = check_guest_limit(
            event.max_guests_per_invitee,
            guest.max_guests,
            additional_guests.len(),
        );

        let deadline_passed = event.rsvp_deadline_passed(now);

        Self {
            event: RsvpEventResource {
                title: event.title,
                description: event.description,
                starts_at: event.starts_at,
                ends_at: event.ends_at,
                rsvp_deadline: event.rsvp_deadline,
                deadline_passed,
            },
            guest: RsvpGuestResource {
                name: guest.name,
                status: guest.status,
                responded_at: guest.responded_at,
                additional_guests,
                dietary_notes: guest.dietary_notes,
            },
            guest_limit: GuestLimitResource {
                max_additional_guests: cap
                    .map(|cap| u32::try_from(cap.saturating_sub(1)).unwrap_or_default()),
                remaining: check.remaining.as_option(),
            },
        }
    }
}

/// Body of the PATCH request for an RSVP
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchRsvpBody {
    pub status: ResponseStatus,
    #[validate(custom = "validate_guest_names")]
    pub additional_guests: Option<Vec<String>>,
    #[validate(length(max = 1000))]
    pub dietary_notes: Option<String>,
}

fn validate_guest_names(names: &[String]) -> Result<(), ValidationError> {
    if names
        .iter()
        .any(|name| name.trim().chars().count() > MAX_GUEST_NAME_LENGTH)
    {
        let mut error = ValidationError::new("length");
        error.message = Some("Names of additional guests are limited to 255 characters".into());

        return Err(error);
    }

    Ok(())
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::NotFound => Self::not_found(),
            TransitionError::DeadlinePassed => Self::forbidden()
                .with_code("deadline_passed")
                .with_message("The RSVP deadline of this event has passed"),
            TransitionError::GuestLimit(message) => {
                Self::unprocessable_entities([ValidationErrorEntry::new(
                    "additionalGuests",
                    "guest_limit_exceeded",
                    Some(message),
                )])
            }
            TransitionError::Store(e) => e.into(),
        }
    }
}

/// API Endpoint *GET /rsvp/{token}*
///
/// Returns the invitation behind the token
#[get("/rsvp/{token}")]
pub async fn get_rsvp(
    store: Data<dyn RsvpStore>,
    token: Path<String>,
) -> DefaultApiResult<Json<RsvpResource>> {
    let invitation = rsvp::load(store.get_ref(), &token).await?;

    Ok(Json(RsvpResource::new(invitation, Utc::now())))
}

/// API Endpoint *PATCH /rsvp/{token}*
///
/// Responds to the invitation. `additionalGuests` replaces the current list, an empty
/// `dietaryNotes` clears the notes. Omitted fields stay unchanged.
#[patch("/rsvp/{token}")]
pub async fn patch_rsvp(
    store: Data<dyn RsvpStore>,
    token: Path<String>,
    body: Json<PatchRsvpBody>,
) -> DefaultApiResult<Json<RsvpResource>> {
    let body = body.into_inner();

    body.validate()?;

    let request = RsvpRequest {
        status: body.status,
        additional_guests: body.additional_guests,
        dietary_notes: body.dietary_notes,
    };

    let now = Utc::now();

    let invitation = rsvp::respond(store.get_ref(), &token, request, now).await?;

    Ok(Json(RsvpResource::new(invitation, now)))
}

#[derive(Debug, Deserialize)]
pub struct QuickRsvpQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// API Endpoint *GET /rsvp/{token}/quick*
///
/// One click response from a reminder. Always redirects to the frontend, either to the RSVP form
/// with an `updated` or `error` flag or, for unknown tokens, to the landing page.
#[get("/rsvp/{token}/quick")]
pub async fn quick_rsvp(
    store: Data<dyn RsvpStore>,
    settings: SharedSettingsActix,
    token: Path<String>,
    query: Query<QuickRsvpQuery>,
) -> DefaultApiResult<HttpResponse> {
    let frontend = settings.load().urls.frontend.clone();

    let invitation = match rsvp::load(store.get_ref(), &token).await {
        Ok(invitation) => invitation,
        Err(TransitionError::NotFound) => {
            let url = links::landing_redirect(&frontend, "invalid_token")
                .map_err(anyhow::Error::from)?;

            return Ok(redirect(url));
        }
        Err(e) => return Err(e.into()),
    };

    let token = invitation.guest.token.clone();

    let status = query
        .status
        .as_deref()
        .and_then(|status| ResponseStatus::from_str(status).ok());

    let Some(status) = status else {
        let url = links::form_redirect(&frontend, &token, "error", "invalid_status")
            .map_err(anyhow::Error::from)?;

        return Ok(redirect(url));
    };

    let url = match rsvp::apply(
        store.get_ref(),
        invitation,
        RsvpRequest::status_only(status),
        Utc::now(),
    )
    .await
    {
        Ok(_) => links::form_redirect(&frontend, &token, "updated", status.as_ref()),
        Err(TransitionError::DeadlinePassed) => {
            links::form_redirect(&frontend, &token, "error", "deadline_passed")
        }
        Err(TransitionError::NotFound) => links::landing_redirect(&frontend, "invalid_token"),
        Err(e) => return Err(e.into()),
    }
    .map_err(anyhow::Error::from)?;

    Ok(redirect(url))
}

fn redirect(url: url::Url) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url.as_str()))
        .finish()
}
