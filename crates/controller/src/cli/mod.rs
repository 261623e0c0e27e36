// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use controller_shared::settings::Settings;
use std::path::PathBuf;

mod reload;
mod reminders;

#[derive(Parser, Debug, Clone)]
#[clap(name = "rsvp-controller")]
pub struct Args {
    #[clap(
        short,
        long,
        default_value = "config.toml",
        help = "Specify path to configuration file"
    )]
    pub config: PathBuf,

    /// Triggers a reload of the reloadable settings in all running controllers
    #[clap(long)]
    pub reload: bool,

    #[clap(subcommand)]
    cmd: Option<SubCommand>,
}

#[derive(Subcommand, Debug, Clone)]
#[clap(rename_all = "kebab_case")]
enum SubCommand {
    /// Migrate the db. This is done automatically during start of the controller,
    /// but can be done without starting the controller using this command.
    MigrateDb,
    /// Inspect and run event reminders
    #[clap(subcommand)]
    Reminders(reminders::Command),
}

impl Args {
    /// Returns true if we want to startup the controller after we finished the cli part
    pub fn controller_should_start(&self) -> bool {
        !(self.reload || self.cmd.is_some())
    }
}

/// Parses the CLI-Arguments into [`Args`]
///
/// Also runs (optional) cli commands if necessary
pub async fn parse_args() -> Result<Args> {
    let args = Args::parse();

    if args.reload {
        reload::trigger_reload()?;
    }
    if let Some(sub_command) = args.cmd.clone() {
        let settings = Settings::load(&args.config)?;
        match sub_command {
            SubCommand::MigrateDb => {
                db_storage::migrations::migrate_from_url(&settings.database.url)
                    .await
                    .context("Failed to migrate database")?;
            }
            SubCommand::Reminders(command) => {
                reminders::handle_command(settings, command).await?;
            }
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn subcommands_do_not_start_the_controller() {
        let args = Args::try_parse_from(["rsvp-controller", "migrate-db"]).unwrap();
        assert!(!args.controller_should_start());

        let args = Args::try_parse_from(["rsvp-controller", "--config", "rsvp.toml"]).unwrap();
        assert!(args.controller_should_start());
        assert_eq!(args.config, PathBuf::from("rsvp.toml"));
    }
}
