// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

#![allow(clippy::extra_unused_lifetimes)]

//! Contains the database ORM and database migrations for the rsvp controller
//! Builds upon rsvp-database
//!
//! Every model exposes associated functions taking a `&mut DbConnection`:
//! ```ignore,rust
//! let mut conn = db.get_conn()?;
//! let guest = Guest::get_by_token(&mut conn, &token)?;
//! ```

#[macro_use]
extern crate diesel;

// postgres functions
use diesel::sql_types::{Nullable, Timestamptz};

mod schema;

pub mod events;
pub mod guests;
pub mod migrations;

sql_function!(fn coalesce(x: Nullable<Timestamptz>, y: Nullable<Timestamptz>) -> Nullable<Timestamptz>);
