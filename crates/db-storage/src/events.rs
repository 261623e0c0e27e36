// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use crate::schema::events;
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::{ExpressionMethods, Identifiable, QueryDsl, Queryable, RunQueryDsl};
use types::core::EventId;

/// Diesel event struct
///
/// Represents an event in the database
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub rsvp_deadline: Option<DateTime<Utc>>,
    pub reminder_schedule: Option<String>,
    pub max_guests_per_invitee: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = events::table.filter(events::id.eq(event_id));

        let event = query.first(conn)?;

        Ok(event)
    }

    /// Returns all events starting in `(after, until]`, the earliest first
    #[tracing::instrument(err, skip_all, fields(%after, %until))]
    pub fn get_starting_between(
        conn: &mut DbConnection,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let query = events::table
            .filter(events::starts_at.gt(after))
            .filter(events::starts_at.le(until))
            .order(events::starts_at.asc());

        let events = query.load(conn)?;

        Ok(events)
    }

    /// Returns `true` if the event has an RSVP deadline which lies before `now`
    pub fn rsvp_deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.rsvp_deadline
            .map(|deadline| now > deadline)
            .unwrap_or(false)
    }
}

/// Diesel event struct
///
/// Represents a changeset of an event
#[derive(Debug, AsChangeset)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub updated_at: DateTime<Utc>,
    pub reminder_schedule: Option<Option<String>>,
    pub max_guests_per_invitee: Option<Option<i32>>,
}

impl UpdateEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = diesel::update(events::table)
            .filter(events::id.eq(event_id))
            .set(self)
            .returning(events::all_columns);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn event(rsvp_deadline: Option<DateTime<Utc>>) -> Event {
        let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();

        Event {
            id: EventId::from(Uuid::nil()),
            title: "Summer party".into(),
            description: String::new(),
            starts_at,
            ends_at: None,
            rsvp_deadline,
            reminder_schedule: None,
            max_guests_per_invitee: None,
            created_at: starts_at - Duration::days(30),
            updated_at: starts_at - Duration::days(30),
        }
    }

    #[test]
    fn deadline() {
        let deadline = Utc.with_ymd_and_hms(2024, 5, 25, 0, 0, 0).unwrap();
        let event = event(Some(deadline));

        assert!(!event.rsvp_deadline_passed(deadline - Duration::seconds(1)));
        assert!(!event.rsvp_deadline_passed(deadline));
        assert!(event.rsvp_deadline_passed(deadline + Duration::seconds(1)));
    }

    #[test]
    fn no_deadline() {
        assert!(!event(None).rsvp_deadline_passed(Utc::now()));
    }
}
