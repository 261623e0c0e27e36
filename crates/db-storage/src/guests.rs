// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use crate::coalesce;
use crate::events::Event;
use crate::schema::{additional_guests, events, guests};
use chrono::{DateTime, Utc};
use database::{DbConnection, OptionalExt, Result};
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, Identifiable, QueryDsl, Queryable,
    RunQueryDsl,
};
use types::core::{AdditionalGuestId, EventId, GuestId, GuestStatus, GuestToken};

/// Diesel guest struct
///
/// Represents a guest invited to an event
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = guests)]
pub struct Guest {
    pub id: GuestId,
    pub event_id: EventId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: GuestStatus,
    pub notify_by_email: bool,
    pub notify_by_sms: bool,
    pub token: GuestToken,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub sms_reminder_sent_at: Option<DateTime<Utc>>,
    pub max_guests: Option<i32>,
    pub dietary_notes: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Guest {
    /// Returns the guest holding `token` together with its event
    #[tracing::instrument(err, skip_all)]
    pub fn get_by_token(
        conn: &mut DbConnection,
        token: &GuestToken,
    ) -> Result<Option<(Guest, Event)>> {
        let query = guests::table
            .inner_join(events::table)
            .filter(guests::token.eq(token));

        let guest_with_event = query.first::<(Guest, Event)>(conn).map_err(Into::into);

        guest_with_event.optional()
    }

    /// Returns the guests of an event which still need a reminder on at least one channel
    ///
    /// Only guests who have not responded yet are returned.
    #[tracing::instrument(err, skip_all, fields(%event_id))]
    pub fn get_reminder_candidates(
        conn: &mut DbConnection,
        event_id: EventId,
    ) -> Result<Vec<Guest>> {
        let needs_email = guests::notify_by_email
            .eq(true)
            .and(guests::reminder_sent_at.is_null());

        let needs_sms = guests::notify_by_sms
            .eq(true)
            .and(guests::phone.is_not_null())
            .and(guests::sms_reminder_sent_at.is_null());

        let query = guests::table
            .filter(guests::event_id.eq(event_id))
            .filter(guests::status.eq(GuestStatus::Pending))
            .filter(needs_email.or(needs_sms))
            .order(guests::created_at.asc());

        let guests = query.load(conn)?;

        Ok(guests)
    }

    /// Record delivered reminders of a guest in a single statement
    ///
    /// Timestamps which are already set are kept, so concurrent updates of the two
    /// channels cannot overwrite each other.
    #[tracing::instrument(err, skip_all, fields(%guest_id))]
    pub fn mark_reminders_sent(
        conn: &mut DbConnection,
        guest_id: GuestId,
        email_sent_at: Option<DateTime<Utc>>,
        sms_sent_at: Option<DateTime<Utc>>,
    ) -> Result<Guest> {
        let query = diesel::update(guests::table)
            .filter(guests::id.eq(guest_id))
            .set((
                guests::reminder_sent_at.eq(coalesce(guests::reminder_sent_at, email_sent_at)),
                guests::sms_reminder_sent_at
                    .eq(coalesce(guests::sms_reminder_sent_at, sms_sent_at)),
            ))
            .returning(guests::all_columns);

        let guest = query.get_result(conn)?;

        Ok(guest)
    }
}

/// Diesel guest struct
///
/// Represents the changeset of a guest responding to an invitation.
/// The token is never part of a changeset.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = guests)]
pub struct UpdateGuestResponse {
    pub status: GuestStatus,
    pub responded_at: DateTime<Utc>,
    pub dietary_notes: Option<Option<String>>,
}

impl UpdateGuestResponse {
    /// Apply the response and, if given, replace the additional guests of the guest
    #[tracing::instrument(err, skip_all, fields(%guest_id))]
    pub fn apply(
        self,
        conn: &mut DbConnection,
        guest_id: GuestId,
        additional_guests: Option<Vec<String>>,
    ) -> Result<Guest> {
        conn.transaction(|conn| {
            let query = diesel::update(guests::table)
                .filter(guests::id.eq(guest_id))
                .set(self)
                .returning(guests::all_columns);

            let guest: Guest = query.get_result(conn)?;

            if let Some(names) = additional_guests {
                AdditionalGuest::replace_for_guest(conn, guest_id, names)?;
            }

            Ok(guest)
        })
    }
}

/// Diesel additional guest struct
///
/// A named "plus one" of a guest without a status of its own
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = additional_guests)]
pub struct AdditionalGuest {
    pub id: AdditionalGuestId,
    pub guest_id: GuestId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = additional_guests)]
struct NewAdditionalGuest {
    guest_id: GuestId,
    name: String,
}

impl AdditionalGuest {
    /// Returns the names of all additional guests of a guest in insertion order
    #[tracing::instrument(err, skip_all, fields(%guest_id))]
    pub fn get_names_for_guest(conn: &mut DbConnection, guest_id: GuestId) -> Result<Vec<String>> {
        let query = additional_guests::table
            .select(additional_guests::name)
            .filter(additional_guests::guest_id.eq(guest_id))
            .order(additional_guests::created_at.asc());

        let names = query.load(conn)?;

        Ok(names)
    }

    /// Replaces all additional guests of a guest with `names`
    ///
    /// Must be called inside a transaction.
    fn replace_for_guest(
        conn: &mut DbConnection,
        guest_id: GuestId,
        names: Vec<String>,
    ) -> diesel::QueryResult<()> {
        diesel::delete(additional_guests::table)
            .filter(additional_guests::guest_id.eq(guest_id))
            .execute(conn)?;

        if names.is_empty() {
            return Ok(());
        }

        let rows: Vec<NewAdditionalGuest> = names
            .into_iter()
            .map(|name| NewAdditionalGuest { guest_id, name })
            .collect();

        diesel::insert_into(additional_guests::table)
            .values(&rows)
            .execute(conn)?;

        Ok(())
    }
}
