// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use crate::reminders::evaluator;
use crate::Services;
use anyhow::{anyhow, bail, Context, Result};
use arc_swap::ArcSwap;
use chrono::Utc;
use clap::Subcommand;
use controller_shared::settings::Settings;
use database::Db;
use db_storage::events::{Event, UpdateEvent};
use std::sync::Arc;
use tabled::{Style, Table, Tabled};
use types::core::EventId;
use types::reminder::{self, ReminderDraft, ReminderUnit};
use uuid::Uuid;

#[derive(Subcommand, Debug, Clone)]
#[clap(rename_all = "kebab_case")]
pub enum Command {
    /// Run one reminder batch now and print the counters
    Run,
    /// Show the effective reminder schedule of an event
    Show {
        #[clap(long)]
        event_id: Uuid,
    },
    /// Replace the reminder schedule of an event
    ///
    /// Entries are written as `3d` or `6h`. Without entries the default schedule applies again.
    SetSchedule {
        #[clap(long)]
        event_id: Uuid,
        #[clap(value_parser = parse_entry)]
        entries: Vec<ReminderDraft>,
    },
}

pub async fn handle_command(settings: Settings, command: Command) -> Result<()> {
    match command {
        Command::Run => run_batch(settings).await,
        Command::Show { event_id } => show_schedule(settings, EventId::from(event_id)).await,
        Command::SetSchedule { event_id, entries } => {
            set_schedule(settings, EventId::from(event_id), entries).await
        }
    }
}

/// Parse a schedule entry like `3d` or `6h`
fn parse_entry(input: &str) -> Result<ReminderDraft, String> {
    let input = input.trim();

    let (value, unit) = match input.char_indices().last() {
        Some((idx, 'd')) => (&input[..idx], ReminderUnit::Day),
        Some((idx, 'h')) => (&input[..idx], ReminderUnit::Hour),
        _ => return Err(format!("'{input}' must end with 'd' (days) or 'h' (hours)")),
    };

    let value = value
        .parse::<i64>()
        .map_err(|_| format!("'{input}' does not start with a number"))?;

    Ok(ReminderDraft {
        unit,
        value: Some(value),
    })
}

/// Implementation of the `rsvp-controller reminders run` command
async fn run_batch(settings: Settings) -> Result<()> {
    let db = Arc::new(Db::connect(&settings.database).context("Failed to connect to database")?);
    let shared_settings = Arc::new(ArcSwap::from_pointee(settings.clone()));

    let services = Services::setup(&settings, shared_settings, db).await?;

    let result = services.reminders.run_batch().await;

    services.close().await;

    let report = result.context("Reminder batch failed")?;

    println!(
        "Sent {} emails and {} SMS, {} errors",
        report.emails_sent, report.sms_sent, report.errors
    );

    Ok(())
}

#[derive(Tabled)]
struct ScheduleTableRow {
    reminder: String,
    due: String,
}

/// Implementation of the `rsvp-controller reminders show` command
async fn show_schedule(settings: Settings, event_id: EventId) -> Result<()> {
    let event = load_event(settings, event_id).await?;

    let schedule = evaluator::effective_schedule(&event);
    let now = Utc::now();

    let rows: Vec<ScheduleTableRow> = schedule
        .entries()
        .iter()
        .map(|entry| ScheduleTableRow {
            reminder: entry.to_string(),
            due: if evaluator::entry_matches(entry, now, event.starts_at) {
                "now".into()
            } else {
                "-".into()
            },
        })
        .collect();

    println!(
        "{} ({} schedule), starts at {}",
        event.title,
        if schedule.is_custom() { "custom" } else { "default" },
        event.starts_at
    );
    println!("{}", Table::new(rows).with(Style::psql()));

    Ok(())
}

/// Implementation of the `rsvp-controller reminders set-schedule` command
async fn set_schedule(
    settings: Settings,
    event_id: EventId,
    entries: Vec<ReminderDraft>,
) -> Result<()> {
    let entries = reminder::validate(&entries, false).map_err(|e| anyhow!("{e}"))?;
    let serialized = reminder::serialize(&entries);

    if !entries.is_empty() && serialized.is_none() {
        bail!("Failed to serialize the reminder schedule");
    }

    let db = Db::connect(&settings.database).context("Failed to connect to database")?;

    let event = crate::block(move || -> Result<Event> {
        let mut conn = db.get_conn()?;

        let update = UpdateEvent {
            updated_at: Utc::now(),
            reminder_schedule: Some(serialized),
            max_guests_per_invitee: None,
        };

        Ok(update.apply(&mut conn, event_id)?)
    })
    .await??;

    match &event.reminder_schedule {
        Some(schedule) => println!("Set reminder schedule of '{}' to {}", event.title, schedule),
        None => println!("Reset '{}' to the default reminder schedule", event.title),
    }

    Ok(())
}

async fn load_event(settings: Settings, event_id: EventId) -> Result<Event> {
    let db = Db::connect(&settings.database).context("Failed to connect to database")?;

    crate::block(move || -> Result<Event> {
        let mut conn = db.get_conn()?;

        Ok(Event::get(&mut conn, event_id)?)
    })
    .await?
}
