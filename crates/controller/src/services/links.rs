// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Links pointing guests to the RSVP form and the quick RSVP endpoint

use controller_shared::settings::Urls;
use notification_proto::v1::RsvpLinks;
use types::core::{GuestToken, ResponseStatus};
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("URL {0} cannot be used as a base URL")]
pub struct InvalidBaseUrl(Url);

fn with_path(base: &Url, segments: &[&str]) -> Result<Url, InvalidBaseUrl> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|_| InvalidBaseUrl(base.clone()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// The RSVP form of a guest in the frontend
pub fn form_url(frontend: &Url, token: &GuestToken) -> Result<Url, InvalidBaseUrl> {
    with_path(frontend, &["rsvp", token.as_str()])
}

/// One click link answering the invitation with `status`
pub fn quick_rsvp_url(
    api: &Url,
    token: &GuestToken,
    status: ResponseStatus,
) -> Result<Url, InvalidBaseUrl> {
    let mut url = with_path(api, &["v1", "rsvp", token.as_str(), "quick"])?;

    url.query_pairs_mut().append_pair("status", status.as_ref());

    Ok(url)
}

/// All links embedded in a reminder
pub fn rsvp_links(urls: &Urls, token: &GuestToken) -> Result<RsvpLinks, InvalidBaseUrl> {
    Ok(RsvpLinks {
        form: form_url(&urls.frontend, token)?,
        attending: quick_rsvp_url(&urls.api, token, ResponseStatus::Attending)?,
        not_attending: quick_rsvp_url(&urls.api, token, ResponseStatus::NotAttending)?,
        maybe: quick_rsvp_url(&urls.api, token, ResponseStatus::Maybe)?,
    })
}

/// The RSVP form with a single query flag, e.g. `?updated=ATTENDING`
pub fn form_redirect(
    frontend: &Url,
    token: &GuestToken,
    key: &str,
    value: &str,
) -> Result<Url, InvalidBaseUrl> {
    let mut url = form_url(frontend, token)?;

    url.query_pairs_mut().append_pair(key, value);

    Ok(url)
}

/// The frontend landing page with an error flag
///
/// Does not depend on the token, so it cannot reveal anything about it.
pub fn landing_redirect(frontend: &Url, error: &str) -> Result<Url, InvalidBaseUrl> {
    let mut url = with_path(frontend, &[""])?;

    url.set_query(None);
    url.query_pairs_mut().append_pair("error", error);

    Ok(url)
}
