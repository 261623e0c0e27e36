// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! This module contains the core types of the RSVP domain.
//!
//! All core types are simple types (e.g. newtypes of primitive or other simple types),
//! and typically used by other types in this crate.

mod additional_guest_id;
mod event_id;
mod guest_id;
mod guest_status;
mod guest_token;

pub use additional_guest_id::AdditionalGuestId;
pub use event_id::EventId;
pub use guest_id::GuestId;
pub use guest_status::{GuestStatus, ResponseStatus};
pub use guest_token::{GuestToken, MalformedGuestToken, GUEST_TOKEN_LENGTH};
