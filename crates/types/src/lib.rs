// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Data types for the RSVP controller.
//!
//! This crate contains the data types that are shared between the RSVP web API,
//! the reminder engine and clients rendering the RSVP forms.
//!
//! # Features
//!
//! ## `default`
//!
//! This is the "easy" way to use this crate, unless you need specific
//! functionalities for the backend, then you should use the `backend`
//! feature instead.
//!
//! Depends on:
//! - `frontend`
//!
//! ## `backend`
//!
//! Set the `backend` feature for using the types anywhere in the backend
//! (e.g., the controller implementation or the storage layer).
//!
//! Depends on:
//! - `diesel`
//! - `rand`
//!
//! ## `frontend`
//!
//! Set the `frontend` feature for using the types in a client. The reminder
//! schedule codec and the guest limit validator are available without any
//! feature so a form can run the same checks as the server.
//!
//! ## `diesel`
//!
//! Adds [Diesel](https://diesel.rs/) type mappings to simple newtypes and
//! status enums, so they can be stored in a database through the ORM.
//!
//! ## `rand`
//!
//! Functions for generating values from random numbers are gated by this flag.
//! These are used on the backend for issuing new guest tokens.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    while_true
)]

mod macros;

pub mod core;
pub mod guest_limit;
pub mod reminder;

mod imports {
    #[cfg(feature = "diesel")]
    pub use diesel::{
        deserialize::{self, FromSql, FromSqlRow},
        expression::AsExpression,
        pg::{Pg, PgValue},
        serialize::{self, IsNull, Output, ToSql},
        sql_types::Text,
    };

    pub use serde::{Deserialize, Serialize};
}
