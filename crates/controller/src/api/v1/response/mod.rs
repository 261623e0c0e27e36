// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Response types for REST APIv1
//!
//! Successful responses are plain [`Json`](actix_web::web::Json) bodies, failures are [`ApiError`]s.

pub mod error;

pub use error::{ApiError, ValidationErrorEntry};

/// The default API Result
pub type DefaultApiResult<T> = Result<T, ApiError>;

pub const CODE_INVALID_LENGTH: &str = "invalid_length";
pub const CODE_OUT_OF_RANGE: &str = "out_of_range";
pub const CODE_VALUE_REQUIRED: &str = "value_required";
pub const CODE_INVALID_VALUE: &str = "invalid_value";
