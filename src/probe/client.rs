use std::time::Duration;

use reqwest::{Client, redirect};
use url::Url;

use crate::error::{AppError, AppResult, HttpError};

/// Builds the probe's HTTP client.
///
/// Redirect following is disabled so 3xx responses stay observable;
/// a throttling proxy answers with a redirect to the blocked page, and
/// following it would hide the very signal this tool looks for.
///
/// # Errors
///
/// Returns an error when the client cannot be constructed.
pub fn build_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::none())
        .user_agent(concat!("limitprobe/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

/// Resolves a scenario target: a full URL override when given,
/// otherwise the path joined onto the base URL.
///
/// # Errors
///
/// Returns an error when the base URL or override is malformed, or the
/// path cannot be joined.
pub fn resolve_target(base_url: &str, path: &str, full_url: Option<&str>) -> AppResult<Url> {
    if let Some(full) = full_url {
        return Url::parse(full).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: full.to_owned(),
                source: err,
            })
        });
    }

    let base = Url::parse(base_url).map_err(|err| {
        AppError::http(HttpError::InvalidUrl {
            url: base_url.to_owned(),
            source: err,
        })
    })?;
    base.join(path).map_err(|err| {
        AppError::http(HttpError::JoinUrlFailed {
            base: base_url.to_owned(),
            path: path.to_owned(),
            source: err,
        })
    })
}
