// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Guest responses to an invitation
//!
//! A guest is identified by the token of their invitation link only. A response moves the guest
//! from any status to the chosen one, there is no terminal state. Responses are rejected once the
//! event's RSVP deadline passed.

use crate::store::{Invitation, RsvpStore, StoreError, StoredResponse};
use chrono::{DateTime, Utc};
use types::core::{GuestStatus, GuestToken, ResponseStatus};
use types::guest_limit::check_guest_limit;

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// The token is malformed or was never issued
    #[error("invitation not found")]
    NotFound,
    #[error("the RSVP deadline has passed")]
    DeadlinePassed,
    #[error("{0}")]
    GuestLimit(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A response as submitted by a guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpRequest {
    pub status: ResponseStatus,
    /// `None` keeps the current additional guests
    pub additional_guests: Option<Vec<String>>,
    /// `None` keeps the current notes, blank text clears them
    pub dietary_notes: Option<String>,
}

impl RsvpRequest {
    /// A response which only changes the status
    pub fn status_only(status: ResponseStatus) -> Self {
        Self {
            status,
            additional_guests: None,
            dietary_notes: None,
        }
    }
}

/// Load the invitation behind `token`
pub async fn load(store: &dyn RsvpStore, token: &str) -> Result<Invitation, TransitionError> {
    // Malformed tokens cannot exist in the store, both cases look the same to the caller
    let token: GuestToken = token.parse().map_err(|_| TransitionError::NotFound)?;

    store
        .invitation_by_token(&token)
        .await?
        .ok_or(TransitionError::NotFound)
}

/// Apply a guest response to the invitation behind `token` and return the updated invitation
pub async fn respond(
    store: &dyn RsvpStore,
    token: &str,
    request: RsvpRequest,
    now: DateTime<Utc>,
) -> Result<Invitation, TransitionError> {
    let invitation = load(store, token).await?;

    apply(store, invitation, request, now).await
}

/// Apply a guest response to an already loaded invitation
#[tracing::instrument(skip_all, fields(status = %request.status))]
pub async fn apply(
    store: &dyn RsvpStore,
    mut invitation: Invitation,
    request: RsvpRequest,
    now: DateTime<Utc>,
) -> Result<Invitation, TransitionError> {
    if invitation.event.rsvp_deadline_passed(now) {
        return Err(TransitionError::DeadlinePassed);
    }

    let additional_guests = match request.status {
        ResponseStatus::NotAttending => Some(Vec::new()),
        ResponseStatus::Attending | ResponseStatus::Maybe => request
            .additional_guests
            .map(|names| {
                let names: Vec<String> = names
                    .into_iter()
                    .map(|name| name.trim().to_owned())
                    .filter(|name| !name.is_empty())
                    .collect();

                let check = check_guest_limit(
                    invitation.event.max_guests_per_invitee,
                    invitation.guest.max_guests,
                    names.len(),
                );

                match check.error {
                    Some(message) if !check.valid => Err(TransitionError::GuestLimit(message)),
                    _ => Ok(names),
                }
            })
            .transpose()?,
    };

    let dietary_notes = request.dietary_notes.map(|notes| {
        let notes = notes.trim();

        if notes.is_empty() {
            None
        } else {
            Some(notes.to_owned())
        }
    });

    let response = StoredResponse {
        status: GuestStatus::from(request.status),
        responded_at: now,
        dietary_notes,
        additional_guests,
    };

    store
        .save_response(invitation.guest.id, response.clone())
        .await?;

    log::info!(
        "Guest {} responded {} to event {}",
        invitation.guest.id,
        request.status,
        invitation.event.id
    );

    invitation.guest.status = response.status;
    invitation.guest.responded_at = Some(response.responded_at);

    if let Some(notes) = response.dietary_notes {
        invitation.guest.dietary_notes = notes;
    }

    if let Some(names) = response.additional_guests {
        invitation.additional_guests = names;
    }

    Ok(invitation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use db_storage::events::Event;
    use db_storage::guests::Guest;
    use pretty_assertions::assert_eq;
    use test_util::fixtures;

    fn setup(event: Event, guest: Guest) -> MemoryStore {
        MemoryStore::with(vec![event], vec![guest])
    }

    fn request(status: ResponseStatus, names: &[&str]) -> RsvpRequest {
        RsvpRequest {
            status,
            additional_guests: Some(names.iter().map(|name| name.to_string()).collect()),
            dietary_notes: None,
        }
    }

    #[tokio::test]
    async fn attending_records_response_time() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7)).build();
        let guest = fixtures::guest(&event).build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());

        let invitation = respond(
            &store,
            token.as_str(),
            RsvpRequest::status_only(ResponseStatus::Attending),
            now,
        )
        .await
        .unwrap();

        assert_eq!(invitation.guest.status, GuestStatus::Attending);
        assert_eq!(invitation.guest.responded_at, Some(now));

        let stored = store.guest(guest.id);
        assert_eq!(stored.status, GuestStatus::Attending);
        assert_eq!(stored.responded_at, Some(now));
    }

    #[tokio::test]
    async fn unknown_and_malformed_tokens() {
        let store = MemoryStore::default();

        assert!(matches!(
            load(&store, "not a token").await,
            Err(TransitionError::NotFound)
        ));
        assert!(matches!(
            load(&store, GuestToken::generate().as_str()).await,
            Err(TransitionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deadline_passed() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7))
            .rsvp_deadline(now - Duration::hours(1))
            .build();
        let guest = fixtures::guest(&event).build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());

        let result = respond(
            &store,
            token.as_str(),
            RsvpRequest::status_only(ResponseStatus::Maybe),
            now,
        )
        .await;

        assert!(matches!(result, Err(TransitionError::DeadlinePassed)));
        assert_eq!(store.guest(guest.id).status, GuestStatus::Pending);
    }

    #[tokio::test]
    async fn guest_limit() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7))
            .max_guests_per_invitee(3)
            .build();
        let guest = fixtures::guest(&event).build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());

        let err = respond(
            &store,
            token.as_str(),
            request(ResponseStatus::Attending, &["Ann", "Bob", "Cid"]),
            now,
        )
        .await
        .unwrap_err();

        match err {
            TransitionError::GuestLimit(message) => {
                assert_eq!(message, "You can bring at most 2 additional guests")
            }
            e => panic!("unexpected error {e:?}"),
        }

        let invitation = respond(
            &store,
            token.as_str(),
            request(ResponseStatus::Attending, &[" Ann ", "", "Bob"]),
            now,
        )
        .await
        .unwrap();

        assert_eq!(invitation.additional_guests, vec!["Ann", "Bob"]);
        assert_eq!(store.additional_guests(guest.id), vec!["Ann", "Bob"]);
    }

    #[tokio::test]
    async fn declining_removes_additional_guests() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7)).build();
        let guest = fixtures::guest(&event).status(GuestStatus::Attending).build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());
        store.set_additional_guests(guest.id, vec!["Ann".into()]);

        let invitation = respond(
            &store,
            token.as_str(),
            request(ResponseStatus::NotAttending, &["Bob"]),
            now,
        )
        .await
        .unwrap();

        assert_eq!(invitation.guest.status, GuestStatus::NotAttending);
        assert!(invitation.additional_guests.is_empty());
        assert!(store.additional_guests(guest.id).is_empty());
    }

    #[tokio::test]
    async fn status_only_keeps_details() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7)).build();
        let guest = fixtures::guest(&event).dietary_notes("vegan").build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());
        store.set_additional_guests(guest.id, vec!["Ann".into()]);

        let invitation = respond(
            &store,
            token.as_str(),
            RsvpRequest::status_only(ResponseStatus::Maybe),
            now,
        )
        .await
        .unwrap();

        assert_eq!(invitation.guest.dietary_notes.as_deref(), Some("vegan"));
        assert_eq!(invitation.additional_guests, vec!["Ann"]);
    }

    #[tokio::test]
    async fn blank_dietary_notes_clear() {
        let now = Utc::now();
        let event = fixtures::event(now + Duration::days(7)).build();
        let guest = fixtures::guest(&event).dietary_notes("vegan").build();
        let token = guest.token.clone();
        let store = setup(event, guest.clone());

        let mut update = RsvpRequest::status_only(ResponseStatus::Attending);
        update.dietary_notes = Some("  ".into());

        respond(&store, token.as_str(), update, now).await.unwrap();
        assert_eq!(store.guest(guest.id).dietary_notes, None);

        let mut update = RsvpRequest::status_only(ResponseStatus::Attending);
        update.dietary_notes = Some(" no nuts ".into());

        respond(&store, token.as_str(), update, now).await.unwrap();
        assert_eq!(
            store.guest(guest.id).dietary_notes.as_deref(),
            Some("no nuts")
        );
    }
}
