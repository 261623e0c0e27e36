// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Shared types for the rsvp controller.
//! One purpose is to optimize compile time during development.

pub mod settings;
