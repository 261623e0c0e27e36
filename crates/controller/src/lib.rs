// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Core library of the *RSVP Controller*
//!
//! # Example
//!
//! ```no_run
//! use rsvp_controller_core::Controller;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main()  {
//!     rsvp_controller_core::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!    if let Some(controller) = Controller::create("RSVP Controller").await? {
//!         controller.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::v1::middleware::cron_auth::CronAuth;
use crate::api::v1::response::error::json_error_handler;
use crate::reminders::{BatchGuard, Dispatcher, ReminderService};
use crate::services::{MailService, SmsService};
use crate::settings::{Settings, SharedSettings, SharedSettingsActix};
use crate::store::{PostgresStore, RsvpStore};
use crate::trace::ReducedSpanBuilder;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer, Scope};
use anyhow::{anyhow, Context, Result};
use arc_swap::ArcSwap;
use database::Db;
use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use std::fs::File;
use std::io::BufReader;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio_executor_trait::Tokio as TokioExecutor;
use tokio_reactor_trait::Tokio as TokioReactor;
use tracing_actix_web::TracingLogger;

#[cfg(not(doc))]
mod api;
#[cfg(doc)]
pub mod api;

mod cli;
pub mod reminders;
pub mod rsvp;
mod services;
pub mod settings;
pub mod store;
mod trace;

#[derive(Debug, thiserror::Error)]
#[error("Blocking thread has panicked")]
pub struct BlockingError;

/// Custom version of `actix_web::web::block` which retains the current tracing span
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    let fut = actix_rt::task::spawn_blocking(move || span.in_scope(f));

    fut.await.map_err(|_| BlockingError)
}

/// Wrapper of the main function. Correctly outputs the error to the logging utility or stderr.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Crashed with error: {:?}", err);
            } else {
                eprintln!("Crashed with error: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// Services used by the HTTP server and the `reminders run` command
pub(crate) struct Services {
    pub(crate) reminders: Arc<ReminderService>,
    pub(crate) rsvp_store: Arc<dyn RsvpStore>,
    /// Connection to the notification queue, `None` if no queue is configured
    pub(crate) rabbitmq: Option<lapin::Connection>,
}

impl Services {
    /// Connect to RabbitMQ and redis and build the reminder engine on top of `db`
    pub(crate) async fn setup(
        settings: &Settings,
        shared_settings: SharedSettings,
        db: Arc<Db>,
    ) -> Result<Self> {
        let rabbitmq = connect_rabbitmq(settings).await?;

        let rabbitmq_channel = match &rabbitmq {
            Some(connection) => Some(
                connection
                    .create_channel()
                    .await
                    .context("Could not create rabbitmq channel")?,
            ),
            None => None,
        };

        if let (Some(channel), Some(queue)) =
            (&rabbitmq_channel, &settings.rabbit_mq.notification_queue)
        {
            channel
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .with_context(|| format!("Failed to declare notification queue {queue}"))?;
        }

        // Build redis client. Does not check if redis is reachable.
        let redis = match &settings.redis {
            Some(redis) => {
                let client =
                    redis::Client::open(redis.url.clone()).context("Invalid redis url")?;

                Some(
                    redis::aio::ConnectionManager::new(client)
                        .await
                        .context("Failed to create redis connection manager")?,
                )
            }
            None => None,
        };

        let store = Arc::new(PostgresStore::new(db));

        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(MailService::new(shared_settings.clone(), rabbitmq_channel)),
            Arc::new(SmsService::new(shared_settings.clone())),
        );

        let reminders = Arc::new(ReminderService::new(
            store.clone(),
            dispatcher,
            shared_settings,
            BatchGuard::new(redis),
        ));

        Ok(Self {
            reminders,
            rsvp_store: store,
            rabbitmq,
        })
    }

    pub(crate) async fn close(self) {
        if let Some(connection) = self.rabbitmq {
            if let Err(e) = connection.close(0, "shutting down").await {
                log::error!("Failed to close RabbitMQ connection, {}", e);
            }
        }
    }
}

async fn connect_rabbitmq(settings: &Settings) -> Result<Option<lapin::Connection>> {
    if settings.rabbit_mq.notification_queue.is_none() {
        log::warn!("No notification queue configured, email reminders cannot be sent");
        return Ok(None);
    }

    let connection = lapin::Connection::connect(
        &settings.rabbit_mq.url,
        lapin::ConnectionProperties::default()
            .with_executor(TokioExecutor::current())
            .with_reactor(TokioReactor),
    )
    .await
    .context("Failed to connect to RabbitMQ")?;

    Ok(Some(connection))
}

/// Controller struct representation containing all fields required to drive the controller
pub struct Controller {
    /// Settings loaded on [Controller::create]
    pub startup_settings: Arc<Settings>,

    /// Cloneable shared settings, replaced in place on SIGHUP
    pub shared_settings: SharedSettings,

    /// CLI arguments
    args: cli::Args,

    services: Services,
}

impl Controller {
    /// Tries to create a controller from CLI arguments and then the settings.
    ///
    /// This can return Ok(None) which would indicate that the controller executed a CLI
    /// subprogram (e.g. `--reload`) and must now exit.
    ///
    /// Otherwise it will return itself which can be run using [`Controller::run`]
    pub async fn create(program_name: &str) -> Result<Option<Self>> {
        let args = cli::parse_args().await?;

        // Some args run commands by them self and thus should exit here
        if !args.controller_should_start() {
            return Ok(None);
        }

        let settings = settings::load_settings(&args)?;

        trace::init(&settings.logging)?;

        log::info!("Starting {}", program_name);

        let controller = Self::init(settings, args).await?;

        Ok(Some(controller))
    }

    #[tracing::instrument(err, skip(settings, args))]
    async fn init(settings: Settings, args: cli::Args) -> Result<Self> {
        let settings = Arc::new(settings);
        let shared_settings: SharedSettings = Arc::new(ArcSwap::from(settings.clone()));

        db_storage::migrations::migrate_from_url(&settings.database.url)
            .await
            .context("Failed to migrate database")?;

        // Connect to postgres
        let db = Arc::new(Db::connect(&settings.database).context("Failed to connect to database")?);

        let services = Services::setup(&settings, shared_settings.clone(), db).await?;

        if settings.reminders.cron_secret.is_none() {
            log::warn!("No cron secret configured, POST /v1/cron/reminders is open to everyone");
        }

        Ok(Self {
            startup_settings: settings,
            shared_settings,
            args,
            services,
        })
    }

    /// Runs the controller until a fatal error occurred or a shutdown is requested (e.g. SIGTERM).
    pub async fn run(self) -> Result<()> {
        // Start HTTP Server
        let http_server = {
            let cors = self.startup_settings.http.cors.clone();

            let shared_settings = self.shared_settings.clone();
            let reminders = Data::from(self.services.reminders.clone());
            let rsvp_store: Data<dyn RsvpStore> = Data::from(self.services.rsvp_store.clone());

            HttpServer::new(move || {
                let cors = setup_cors(&cors);

                let settings: SharedSettingsActix = Data::from(shared_settings.clone());

                App::new()
                    .wrap(TracingLogger::<ReducedSpanBuilder>::new())
                    .wrap(cors)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(settings.clone())
                    .app_data(reminders.clone())
                    .app_data(rsvp_store.clone())
                    .service(v1_scope(settings))
            })
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = if let Some(tls) = &self.startup_settings.http.tls {
            let config = setup_rustls(tls).context("Failed to setup TLS context")?;

            http_server.bind_rustls(address, config)
        } else {
            http_server.bind(address)
        };

        let http_server = http_server.with_context(|| {
            format!("Failed to bind http server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        let mut reload_signal =
            signal(SignalKind::hangup()).context("Failed to register SIGHUP signal handler")?;

        actix_rt::spawn(http_server);

        // Wait for either SIGTERM or SIGHUP and handle them accordingly
        loop {
            tokio::select! {
                _ = ctrl_c() => {
                    log::info!("Got termination signal, exiting");
                    break;
                }
                _ = reload_signal.recv() => {
                    log::info!("Got reload signal, reloading");

                    if let Err(e) = settings::reload_settings(self.shared_settings.clone(), &self.args.config) {
                        log::error!("Failed to reload settings, {}", e);
                    }
                }
            }
        }

        // Stop the HTTP server, a running reminder batch finishes first
        http_server_handle.stop(true).await;

        self.services.close().await;

        log::info!("Stopped, goodbye!");

        Ok(())
    }
}

fn v1_scope(settings: SharedSettingsActix) -> Scope {
    // the latest version contains the root services
    web::scope("/v1")
        .service(
            web::scope("/cron")
                .wrap(CronAuth::new(settings))
                .service(api::v1::cron::run_reminders),
        )
        .service(api::v1::rsvp::get_rsvp)
        .service(api::v1::rsvp::patch_rsvp)
        .service(api::v1::rsvp::quick_rsvp)
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    let mut cors = Cors::default();

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE)
        .allowed_header(header::AUTHORIZATION)
        .allow_any_method()
}

fn setup_rustls(tls: &settings::HttpTls) -> Result<rustls::ServerConfig> {
    let cert_file = File::open(&tls.certificate)
        .with_context(|| format!("Failed to open certificate file {:?}", &tls.certificate))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_file))
        .map_err(|_| anyhow!("Invalid certificate"))?;
    let certs = certs.into_iter().map(rustls::Certificate).collect();

    let private_key_file = File::open(&tls.private_key).with_context(|| {
        format!(
            "Failed to open pkcs8 private key file {:?}",
            &tls.private_key
        )
    })?;
    let key = rustls_pemfile::pkcs8_private_keys(&mut BufReader::new(private_key_file))
        .map_err(|_| anyhow!("Invalid pkcs8 private key"))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No pkcs8 private key found in {:?}", &tls.private_key))?;

    let config = rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, rustls::PrivateKey(key))?;

    Ok(config)
}
