// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Loading and reloading of the controller settings
use crate::cli::Args;
use actix_web::web::Data;
use arc_swap::ArcSwap;
use config::ConfigError;
use std::path::Path;
use std::sync::Arc;

pub use controller_shared::settings::*;

pub type SharedSettingsActix = Data<ArcSwap<Settings>>;

/// Reload the settings from the `config_path` & the environment
///
/// Only the reloadable sections are replaced, see [`Settings::apply_reloadable`].
pub(crate) fn reload_settings(
    shared_settings: SharedSettings,
    config_path: &Path,
) -> Result<(), ConfigError> {
    let new_settings = Settings::load(config_path)?;
    let mut current_settings = (*shared_settings.load_full()).clone();

    current_settings.apply_reloadable(new_settings);

    // replace the shared settings with the modified ones
    shared_settings.store(Arc::new(current_settings));

    Ok(())
}

/// Loads settings from program arguments and config file
pub fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
    Settings::load(&args.config)
}
