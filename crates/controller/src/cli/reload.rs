// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! `--reload`: asks running controllers to re-read their settings

use anyhow::{Context, Error, Result};
use nix::sys::signal::{kill, SIGHUP};
use sysinfo::{
    get_current_pid, Pid, PidExt, ProcessExt, ProcessRefreshKind, RefreshKind, System, SystemExt,
};

/// Sends SIGHUP to all other controller processes
///
/// Controllers are found by the name of the current executable.
pub fn trigger_reload() -> Result<()> {
    let controllers = find_other_controllers()?;

    if controllers.is_empty() {
        println!("There is currently no other controller process running");
        return Ok(());
    }

    for pid in controllers {
        kill(nix::unistd::Pid::from_raw(pid.as_u32() as i32), SIGHUP)
            .with_context(|| format!("Failed to send SIGHUP to controller {pid}"))?;

        println!("Sent reload signal to controller {pid}");
    }

    Ok(())
}

fn find_other_controllers() -> Result<Vec<Pid>> {
    let system = System::new_with_specifics(
        RefreshKind::default().with_processes(ProcessRefreshKind::everything()),
    );

    let own_pid = get_current_pid().map_err(Error::msg)?;
    let own_name = system
        .process(own_pid)
        .map(|process| process.name().to_owned())
        .context("Failed to inspect the current process")?;

    Ok(system
        .processes()
        .iter()
        .filter(|(pid, process)| **pid != own_pid && process.name() == own_name)
        .map(|(pid, _)| *pid)
        .collect())
}
