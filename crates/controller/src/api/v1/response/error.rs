// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Error responses of the RSVP API
//!
//! Every error is rendered as a JSON body with a machine readable `code` and a human readable
//! `message`. Validation failures additionally carry a list of `errors`, one per invalid field.
use super::{CODE_INVALID_LENGTH, CODE_INVALID_VALUE, CODE_OUT_OF_RANGE, CODE_VALUE_REQUIRED};
use crate::store::StoreError;
use actix_web::error::JsonPayloadError;
use actix_web::http::header::{HeaderValue, TryIntoHeaderValue};
use actix_web::http::{header, StatusCode};
use actix_web::{body::BoxBody, HttpRequest, HttpResponse, ResponseError};
use actix_web_httpauth::headers::www_authenticate::bearer::{Bearer, Error};
use database::DatabaseError;
use itertools::Itertools;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Error handler for the actix JSON extractor
///
/// Malformed bodies, including unknown response statuses, become a `400 Bad Request`.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::error::Error {
    let code = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload_overflow"
        }
        JsonPayloadError::ContentType => "invalid_content_type",
        JsonPayloadError::Deserialize(_) => "invalid_json",
        _ => "invalid_payload",
    };

    ApiError::bad_request()
        .with_code(code)
        .with_message(err.to_string())
        .into()
}

/// A single invalid field of a request body
#[derive(Debug, Serialize)]
pub struct ValidationErrorEntry {
    /// Name of the field as it appears in the JSON body, absent for struct level errors
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Cow<'static, str>>,
    code: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
}

impl ValidationErrorEntry {
    pub fn new<F, C, M>(field: F, code: C, message: Option<M>) -> Self
    where
        F: Into<Cow<'static, str>>,
        C: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            field: Some(field.into()),
            code: code.into(),
            message: message.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: Cow<'static, str>,
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationErrorEntry>,
}

/// Reasons for rejecting a bearer token, sent in the `WWW-Authenticate` header
#[derive(Debug)]
pub enum AuthenticationError {
    InvalidCronSecret,
}

impl AuthenticationError {
    fn header_value(&self) -> Option<HeaderValue> {
        let (error, description) = match self {
            Self::InvalidCronSecret => (Error::InvalidToken, "The provided cron secret is invalid"),
        };

        Bearer::build()
            .error(error)
            .error_description(description)
            .finish()
            .try_into_value()
            .ok()
    }
}

/// The error type of all API handlers
///
/// Created through the status constructors, which set a default code and message that can be
/// replaced with [`ApiError::with_code`] and [`ApiError::with_message`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    www_authenticate: Option<HeaderValue>,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            www_authenticate: None,
            body: ErrorBody {
                code: code.into(),
                message: message.into(),
                errors: Vec::new(),
            },
        }
    }

    pub fn with_code<T>(mut self, code: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.code = code.into();
        self
    }

    pub fn with_message<T>(mut self, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.message = message.into();
        self
    }

    pub fn with_www_authenticate(mut self, authentication_error: AuthenticationError) -> Self {
        self.www_authenticate = authentication_error.header_value();
        self
    }

    pub fn bad_request() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "Invalid request due to malformed syntax",
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication failed",
        )
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Access to the requested resource is forbidden",
        )
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            "A requested resource could not be found",
        )
    }

    pub fn conflict() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "conflict",
            "The request conflicts with the state of the resource",
        )
    }

    /// Create a `422 Unprocessable Entity` error listing the invalid fields
    pub fn unprocessable_entities<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = ValidationErrorEntry>,
    {
        let mut error = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_failed",
            "Some provided values are invalid",
        );
        error.body.errors = errors.into_iter().collect();
        error
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "An internal server error occurred",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={}, code={}, message={}",
            self.status, self.body.code, self.body.message
        )?;

        if !self.body.errors.is_empty() {
            let fields = self
                .body
                .errors
                .iter()
                .map(|entry| entry.field.as_deref().unwrap_or("-"))
                .join(",");

            write!(f, ", fields={fields}")?;
        }

        Ok(())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::new(self.status);

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(www_authenticate) = self.www_authenticate.clone() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, www_authenticate);
        }

        let body = serde_json::to_string(&self.body).unwrap_or_else(|e| {
            log::error!("Failed to serialize API error body, {}", e);
            String::new()
        });

        response.set_body(BoxBody::new(body))
    }
}

impl From<crate::BlockingError> for ApiError {
    fn from(e: crate::BlockingError) -> Self {
        log::error!("REST API threw internal error from blocking error: {}", e);
        Self::internal()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        log::error!("REST API threw internal error from anyhow error: {:?}", e);
        Self::internal()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound => Self::not_found(),
            e => {
                log::error!("REST API threw internal error from database error: {}", e);
                Self::internal()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => e.into(),
            StoreError::Blocking(e) => e.into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    /// Lists every failed check as its own entry
    ///
    /// Field names are reported in camelCase like the request bodies. Nested structs are
    /// treated as flattened into their parent.
    fn from(validation_errors: ValidationErrors) -> Self {
        let mut entries = Vec::new();

        collect_validation_errors(validation_errors, &mut entries);

        Self::unprocessable_entities(entries)
    }
}

fn collect_validation_errors(errors: ValidationErrors, entries: &mut Vec<ValidationErrorEntry>) {
    for (field, kind) in errors.into_errors() {
        let field = (field != "__all__").then(|| Cow::Owned(camel_case(field)));

        match kind {
            ValidationErrorsKind::Field(errors) => {
                entries.extend(errors.into_iter().map(|error| ValidationErrorEntry {
                    field: field.clone(),
                    code: convert_validation_code(&error.code).into(),
                    message: error.message,
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(*inner, entries),
            ValidationErrorsKind::List(list) => {
                let indexes = list.keys().join(", ");

                entries.push(ValidationErrorEntry {
                    field,
                    code: CODE_INVALID_VALUE.into(),
                    message: Some(format!("Invalid values at index {indexes}").into()),
                });
            }
        }
    }
}

fn convert_validation_code(code: &str) -> &'static str {
    match code {
        "length" => CODE_INVALID_LENGTH,
        "range" => CODE_OUT_OF_RANGE,
        "required" => CODE_VALUE_REQUIRED,
        _ => CODE_INVALID_VALUE,
    }
}

fn camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let first = parts.next().unwrap_or_default().to_owned();

    parts.fold(first, |mut name, part| {
        let mut chars = part.chars();
        if let Some(c) = chars.next() {
            name.extend(c.to_uppercase());
            name.push_str(chars.as_str());
        }
        name
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_util::assert_eq_json;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct NotesForm {
        #[validate(length(max = 5))]
        dietary_notes: String,
        #[validate(range(max = 3, message = "Too many"))]
        guest_count: u32,
        #[validate(required)]
        status: Option<bool>,
    }

    #[test]
    fn validation_errors_use_camel_case_fields() {
        let form = NotesForm {
            dietary_notes: "no nuts please".into(),
            guest_count: 4,
            status: None,
        };

        let mut error = ApiError::from(form.validate().unwrap_err());
        error.body.errors.sort_by(|a, b| a.field.cmp(&b.field));

        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq_json!(
            error.body,
            {
                "code": "validation_failed",
                "message": "Some provided values are invalid",
                "errors": [
                    {
                        "field": "dietaryNotes",
                        "code": "invalid_length"
                    },
                    {
                        "field": "guestCount",
                        "code": "out_of_range",
                        "message": "Too many"
                    },
                    {
                        "field": "status",
                        "code": "value_required"
                    }
                ]
            }
        );
    }

    #[test]
    fn custom_code_and_message() {
        let error = ApiError::forbidden()
            .with_code("deadline_passed")
            .with_message("Too late");

        assert_eq_json!(
            error.body,
            {
                "code": "deadline_passed",
                "message": "Too late"
            }
        );
        assert_eq!(
            error.to_string(),
            "status=403 Forbidden, code=deadline_passed, message=Too late"
        );
    }

    #[test]
    fn unauthorized_with_www_authenticate() {
        let response = ApiError::unauthorized()
            .with_www_authenticate(AuthenticationError::InvalidCronSecret)
            .error_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .unwrap()
            .starts_with("Bearer"));
    }

    #[test]
    fn missing_rows_are_not_found() {
        let error = ApiError::from(StoreError::Database(DatabaseError::NotFound));

        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn camel_case_field_names() {
        assert_eq!(camel_case("additional_guests"), "additionalGuests");
        assert_eq!(camel_case("status"), "status");
    }
}
