// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use anyhow::{Context, Result};
use refinery::{embed_migrations, Report};
use refinery_core::tokio_postgres::{Config, NoTls};
use tokio::sync::oneshot;
use tracing::Instrument;

embed_migrations!(".");

#[tracing::instrument(skip(config))]
async fn migrate(config: Config) -> Result<Report> {
    log::debug!("config: {:?}", config);

    let (mut client, conn) = config
        .connect(NoTls)
        .await
        .context("Unable to connect to database")?;

    let (tx, rx) = oneshot::channel();

    tokio::spawn(
        async move {
            if let Err(e) = conn.await {
                log::error!("connection error: {}", e)
            }

            // the receiver only goes away if the migration future was dropped
            let _ = tx.send(());
        }
        .instrument(tracing::Span::current()),
    );

    let report = migrations::runner().run_async(&mut client).await?;

    for migration in report.applied_migrations() {
        log::info!(
            "Applied migration V{}__{}",
            migration.version(),
            migration.name()
        );
    }

    drop(client);

    // wait for the connection to close
    rx.await?;

    Ok(report)
}

/// Run all pending migrations against the database at `url`
pub async fn migrate_from_url(url: &str) -> Result<Report> {
    let config = url.parse::<Config>()?;
    migrate(config).await
}

mod type_polyfills {
    use barrel::types::{BaseType, Type};

    /// An SQL datetime type
    ///
    /// Barrel only supports TIMESTAMP which is without any timezone information
    pub fn datetime() -> Type {
        Type {
            nullable: false,
            unique: false,
            increments: false,
            indexed: false,
            primary: false,
            default: None,
            size: None,
            inner: BaseType::Custom("TIMESTAMPTZ"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::migrations::V1__initial;

    #[test]
    fn initial_migration_creates_tables() {
        let sql = V1__initial::migration();

        assert!(sql.contains("\"events\""));
        assert!(sql.contains("\"guests\""));
        assert!(sql.contains("\"additional_guests\""));
        assert!(sql.contains("UNIQUE (event_id, email)"));
    }
}
