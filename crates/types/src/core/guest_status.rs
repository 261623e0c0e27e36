// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::imports::*;

/// The RSVP status of a guest
///
/// Stored as its upper case name in the `guests.status` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[cfg_attr(feature = "diesel", derive(AsExpression, FromSqlRow), diesel(sql_type = Text))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestStatus {
    /// The guest was invited but has not responded yet
    Pending,
    /// The guest will attend
    Attending,
    /// The guest declined
    NotAttending,
    /// The guest is undecided
    Maybe,
}

impl GuestStatus {
    /// Returns `true` while the guest has not responded and may still receive reminders
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl Default for GuestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A status a guest can pick when responding to an invitation
///
/// This is [`GuestStatus`] without `PENDING`, a guest can never respond with "not responded".
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The guest will attend
    Attending,
    /// The guest declined
    NotAttending,
    /// The guest is undecided
    Maybe,
}

impl From<ResponseStatus> for GuestStatus {
    fn from(status: ResponseStatus) -> Self {
        match status {
            ResponseStatus::Attending => Self::Attending,
            ResponseStatus::NotAttending => Self::NotAttending,
            ResponseStatus::Maybe => Self::Maybe,
        }
    }
}

#[cfg(feature = "diesel")]
impl ToSql<Text, Pg> for GuestStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        use std::io::Write;

        out.write_all(self.as_ref().as_bytes())?;
        Ok(IsNull::No)
    }
}

#[cfg(feature = "diesel")]
impl FromSql<Text, Pg> for GuestStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = std::str::from_utf8(bytes.as_bytes())?;

        Ok(value.parse()?)
    }
}
