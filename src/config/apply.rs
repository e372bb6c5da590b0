use clap::ArgMatches;
use clap::parser::ValueSource;
use std::time::Duration;

use crate::args::{PositiveU64, PositiveUsize, ProbeArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_duration(value: &DurationValue, field: &str) -> AppResult<Duration> {
    value.to_duration().map_err(|message| {
        AppError::config(ConfigError::InvalidDuration {
            field: field.to_owned(),
            message,
        })
    })
}

/// Applies config file values onto parsed args, keeping CLI precedence.
///
/// A config value only lands when the matching flag was not given on the
/// command line.
///
/// # Errors
///
/// Returns an error when a config value fails validation.
pub fn apply_config(
    args: &mut ProbeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = base_url;
    }

    if !is_cli(matches, "page_path")
        && let Some(path) = config.page_path.clone()
    {
        args.page_path = path;
    }

    if !is_cli(matches, "action_path")
        && let Some(path) = config.action_path.clone()
    {
        args.action_path = path;
    }

    if !is_cli(matches, "page_url")
        && let Some(url) = config.page_url.clone()
    {
        args.page_url = Some(url);
    }

    if !is_cli(matches, "action_url")
        && let Some(url) = config.action_url.clone()
    {
        args.action_url = Some(url);
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_usize(requests, "requests")?;
    }

    if !is_cli(matches, "delay")
        && let Some(delay) = config.delay.as_ref()
    {
        args.delay = ensure_duration(delay, "delay")?;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = ensure_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "reset_wait")
        && let Some(wait) = config.reset_wait.as_ref()
    {
        args.reset_wait = ensure_duration(wait, "reset_wait")?;
    }

    if !is_cli(matches, "code")
        && let Some(code) = config.code.clone()
    {
        args.code = code;
    }

    if !is_cli(matches, "rate_limit")
        && let Some(rate_limit) = config.rate_limit
    {
        args.rate_limit = ensure_positive_u64(rate_limit, "rate_limit")?;
    }

    if !is_cli(matches, "window")
        && let Some(window) = config.window.as_ref()
    {
        args.window = ensure_duration(window, "window")?;
    }

    if !is_cli(matches, "scenario")
        && let Some(scenario) = config.scenario
    {
        args.scenario = scenario;
    }

    if !is_cli(matches, "strict")
        && let Some(strict) = config.strict
    {
        args.strict = strict;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}
