// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use crate::api::v1::response::error::AuthenticationError;
use crate::api::v1::response::ApiError;
use crate::settings::SharedSettingsActix;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::http::header::Header;
use actix_web::ResponseError;
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use core::future::{ready, Future, Ready};
use core::pin::Pin;
use core::task::{Context, Poll};
use ring::constant_time::verify_slices_are_equal;
use std::rc::Rc;

/// Middleware factory for [`CronAuthMiddleware`]
pub struct CronAuth {
    settings: SharedSettingsActix,
}

impl CronAuth {
    pub fn new(settings: SharedSettingsActix) -> Self {
        Self { settings }
    }
}

impl<S> Transform<S, ServiceRequest> for CronAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = CronAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CronAuthMiddleware {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

/// Middleware which checks the bearer token of the scheduler against the configured cron secret
///
/// Requests pass unchecked if no secret is configured. The secret is read per request, so it
/// can be changed by a settings reload.
pub struct CronAuthMiddleware<S> {
    service: Rc<S>,

    settings: SharedSettingsActix,
}

type ResultFuture<O, E> = Pin<Box<dyn Future<Output = Result<O, E>>>>;

impl<S> Service<ServiceRequest> for CronAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = ResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let settings = self.settings.load();

        if let Some(secret) = &settings.reminders.cron_secret {
            if let Err(error) = check_secret(&req, secret) {
                let response = req.into_response(error.error_response());
                return Box::pin(ready(Ok(response)));
            }
        }

        Box::pin(self.service.call(req))
    }
}

fn check_secret(req: &ServiceRequest, secret: &str) -> Result<(), ApiError> {
    let auth = match Authorization::<Bearer>::parse(req) {
        Ok(auth) => auth,
        Err(e) => {
            log::warn!("Unable to parse cron secret, {}", e);
            return Err(ApiError::unauthorized()
                .with_message("Unable to parse cron secret")
                .with_www_authenticate(AuthenticationError::InvalidCronSecret));
        }
    };

    let token = auth.into_scheme();

    if verify_slices_are_equal(token.token().as_bytes(), secret.as_bytes()).is_err() {
        log::warn!("Rejected reminder batch trigger with an invalid cron secret");
        return Err(ApiError::unauthorized()
            .with_www_authenticate(AuthenticationError::InvalidCronSecret));
    }

    Ok(())
}
