// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Logging setup and the root span of HTTP requests
//!
//! Guest tokens grant access to an invitation, request spans therefore only record the
//! matched route pattern and never the requested path.

use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::USER_AGENT;
use actix_web::{Error, HttpMessage};
use anyhow::Result;
use controller_shared::settings::Logging;
use std::borrow::Cow;
use tracing::Span;
use tracing_actix_web::{RequestId, RootSpanBuilder};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Install the global subscriber
///
/// Directives from `RUST_LOG` are extended by the configured default directives.
pub fn init(settings: &Logging) -> Result<()> {
    let filter = settings
        .default_directives
        .iter()
        .try_fold(EnvFilter::from_default_env(), |filter, directive| {
            Ok::<_, anyhow::Error>(filter.add_directive(directive.parse()?))
        })?;

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::Layer::default())
        .init();

    Ok(())
}

pub struct ReducedSpanBuilder;

impl RootSpanBuilder for ReducedSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        request_span(request)
    }

    fn on_request_end<B>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        match outcome {
            Ok(response) => match response.response().error() {
                Some(error) => record_error(&span, error),
                None => {
                    span.record("http.status_code", response.response().status().as_u16());
                }
            },
            Err(error) => record_error(&span, error),
        }
    }
}

fn record_error(span: &Span, error: &Error) {
    let response_error = error.as_response_error();

    span.record("error", &tracing::field::display(response_error));
    span.record("http.status_code", response_error.status_code().as_u16());
}

/// The route pattern of a request, unmatched requests share one name
fn route_of(match_pattern: Option<String>) -> Cow<'static, str> {
    match_pattern
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed("unmatched"))
}

fn request_span(request: &ServiceRequest) -> Span {
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let route = route_of(request.match_pattern());

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_default();

    tracing::info_span!(
        "HTTP request",
        http.method = %request.method().as_str(),
        http.route = %route,
        http.flavor = ?request.version(),
        http.user_agent = %user_agent,
        http.status_code = tracing::field::Empty,
        request_id = %request_id,
        error = tracing::field::Empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn routes_hide_tokens() {
        assert_eq!(
            route_of(Some("/v1/rsvp/{token}/quick".into())),
            "/v1/rsvp/{token}/quick"
        );
        assert_eq!(route_of(None), "unmatched");
    }
}
