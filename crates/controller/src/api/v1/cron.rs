// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Entry point of the external scheduler
//!
//! Protected by the [`CronAuth`](super::middleware::cron_auth::CronAuth) middleware.

use super::response::{ApiError, DefaultApiResult};
use crate::reminders::{BatchError, DispatchCounters, ReminderService};
use actix_web::post;
use actix_web::web::{Data, Json};
use serde::Serialize;

/// Response body of [`run_reminders`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderBatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub counters: DispatchCounters,
}

/// API Endpoint *POST /cron/reminders*
///
/// Runs one reminder batch and returns its counters. Failed deliveries are part of the counters,
/// the request only fails if the batch could not run at all.
#[post("/reminders")]
pub async fn run_reminders(
    service: Data<ReminderService>,
) -> DefaultApiResult<Json<ReminderBatchResponse>> {
    let counters = service.run_batch().await?;

    Ok(Json(ReminderBatchResponse {
        success: true,
        counters,
    }))
}

impl From<BatchError> for ApiError {
    fn from(e: BatchError) -> Self {
        match e {
            BatchError::AlreadyRunning => Self::conflict()
                .with_code("reminder_batch_in_progress")
                .with_message("Another reminder batch is still running"),
            e => {
                log::error!("Reminder batch failed, {}", e);
                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::middleware::cron_auth::CronAuth;
    use super::*;
    use crate::reminders::{BatchGuard, Dispatcher, RecordingSender};
    use crate::settings::test::settings;
    use crate::store::MemoryStore;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use test_util::{assert_eq_json, fixtures};

    fn service(store: Arc<MemoryStore>, cron_secret: Option<&str>) -> ReminderService {
        ReminderService::new(
            store.clone(),
            Dispatcher::new(
                store,
                Arc::new(RecordingSender::default()),
                Arc::new(RecordingSender::default()),
            ),
            settings(cron_secret),
            BatchGuard::new(None),
        )
    }

    macro_rules! app {
        ($cron_secret:expr, $store:expr) => {{
            let service = service($store, $cron_secret);
            let settings = Data::from(settings($cron_secret));

            test::init_service(
                App::new().app_data(Data::new(service)).service(
                    web::scope("/v1").service(
                        web::scope("/cron")
                            .wrap(CronAuth::new(settings))
                            .service(run_reminders),
                    ),
                ),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn runs_batch() {
        let event = fixtures::event(Utc::now() + Duration::hours(40)).build();
        let guest = fixtures::guest(&event).build();
        let store = Arc::new(MemoryStore::with(vec![event], vec![guest]));

        let app = app!(Some("s3cr3t"), store);

        let req = test::TestRequest::post()
            .uri("/v1/cron/reminders")
            .insert_header((header::AUTHORIZATION, "Bearer s3cr3t"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq_json!(
            body,
            {
                "success": true,
                "emailsSent": 1,
                "smsSent": 0,
                "errors": 0
            }
        );
    }

    #[actix_rt::test]
    async fn rejects_wrong_secret() {
        let app = app!(Some("s3cr3t"), Arc::new(MemoryStore::default()));

        for auth in [None, Some("Bearer wrong"), Some("Basic czNjcjN0")] {
            let mut req = test::TestRequest::post().uri("/v1/cron/reminders");

            if let Some(auth) = auth {
                req = req.insert_header((header::AUTHORIZATION, auth));
            }

            let resp = test::call_service(&app, req.to_request()).await;

            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
        }
    }

    #[actix_rt::test]
    async fn open_without_secret() {
        let app = app!(None, Arc::new(MemoryStore::default()));

        let req = test::TestRequest::post()
            .uri("/v1/cron/reminders")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn batch_in_progress_is_a_conflict() {
        use actix_web::ResponseError;

        let error = ApiError::from(BatchError::AlreadyRunning);

        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }
}
