// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! REST API v1
//!
//! Current Endpoints. See their respective function:
//! - `/cron/reminders` ([POST](cron::run_reminders))
//! - `/rsvp/{token}` ([GET](rsvp::get_rsvp), [PATCH](rsvp::patch_rsvp))
//! - `/rsvp/{token}/quick` ([GET](rsvp::quick_rsvp))

pub use response::{ApiError, DefaultApiResult};

pub mod cron;
pub mod middleware;
pub mod response;
pub mod rsvp;
