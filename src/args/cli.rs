use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{PositiveU64, PositiveUsize, ScenarioKind};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "HTTP rate-limit smoke tester - fires sequential and burst request patterns at a running app and reports which requests the limiter let through."
)]
pub struct ProbeArgs {
    /// Base URL of the application under test
    #[arg(long = "base-url", short = 'u', default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Path fetched by the page and burst scenarios (GET)
    #[arg(long = "page-path", default_value = "/join")]
    pub page_path: String,

    /// Path targeted by the action scenario (POST)
    #[arg(long = "action-path", default_value = "/join")]
    pub action_path: String,

    /// Full URL for the page and burst scenarios (overrides --base-url/--page-path)
    #[arg(long = "page-url")]
    pub page_url: Option<String>,

    /// Full URL for the action scenario (overrides --base-url/--action-path)
    #[arg(long = "action-url")]
    pub action_url: Option<String>,

    /// Requests issued per scenario
    #[arg(
        long = "requests",
        short = 'n',
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub requests: PositiveUsize,

    /// Delay between sequential requests (supports ms/s/m/h)
    #[arg(long = "delay", default_value = "100ms", value_parser = parse_duration_arg)]
    pub delay: Duration,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Pause between scenarios so the server-side window can reset (supports ms/s/m/h)
    #[arg(long = "reset-wait", default_value = "12s", value_parser = parse_duration_arg)]
    pub reset_wait: Duration,

    /// Code submitted in the action scenario's JSON body
    #[arg(long = "code", default_value = "TESTCODE")]
    pub code: String,

    /// Requests the server is expected to allow per window (reported; asserted only with --strict)
    #[arg(long = "rate-limit", default_value = "5", value_parser = parse_positive_u64)]
    pub rate_limit: PositiveU64,

    /// Window the server is expected to enforce the limit over (supports ms/s/m/h)
    #[arg(long = "window", default_value = "10s", value_parser = parse_duration_arg)]
    pub window: Duration,

    /// Scenario to run
    #[arg(long = "scenario", default_value = "all", ignore_case = true)]
    pub scenario: ScenarioKind,

    /// Fail the run when observed behavior contradicts the configured rate limit
    #[arg(long = "strict")]
    pub strict: bool,

    /// Path to a limitprobe.toml or limitprobe.json config file
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
