// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Limits on the number of additional guests an invitee may bring
//!
//! Caps count the invitee themself, a cap of 3 allows the invitee plus 2 additional guests.
//! The same check runs in RSVP forms and when the server stores a response.

use crate::imports::*;

/// How many more additional guests a guest may add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum GuestAllowance {
    /// No cap applies
    Unlimited,
    /// At most this many more
    Limited(u32),
}

impl GuestAllowance {
    /// The number of remaining slots, `None` if unlimited
    pub fn as_option(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(remaining) => Some(remaining),
        }
    }
}

/// Result of [`check_guest_limit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestLimitCheck {
    /// Whether the checked count is allowed
    pub valid: bool,
    /// Remaining slots after the checked count
    pub remaining: GuestAllowance,
    /// A message for the guest if the count is not allowed
    pub error: Option<String>,
}

/// Resolve the cap that applies to a guest
///
/// The personal override wins over the event wide cap. `None` means unlimited.
pub fn effective_cap(event_cap: Option<i32>, personal_cap: Option<i32>) -> Option<i32> {
    personal_cap.or(event_cap)
}

/// Check whether a guest may bring `additional` guests
///
/// `event_cap` is the event wide per-invitee cap, `personal_cap` the override of this guest.
pub fn check_guest_limit(
    event_cap: Option<i32>,
    personal_cap: Option<i32>,
    additional: usize,
) -> GuestLimitCheck {
    let Some(cap) = effective_cap(event_cap, personal_cap) else {
        return GuestLimitCheck {
            valid: true,
            remaining: GuestAllowance::Unlimited,
            error: None,
        };
    };

    let cap = i64::from(cap);
    let additional = i64::try_from(additional).unwrap_or(i64::MAX);

    let remaining = (cap - 1).saturating_sub(additional).max(0);
    let valid = additional.saturating_add(1) <= cap;

    let error = (!valid).then(|| {
        let max_additional = (cap - 1).max(0);
        let noun = if max_additional == 1 { "guest" } else { "guests" };

        format!("You can bring at most {max_additional} additional {noun}")
    });

    GuestLimitCheck {
        valid,
        remaining: GuestAllowance::Limited(u32::try_from(remaining).unwrap_or(u32::MAX)),
        error,
    }
}
