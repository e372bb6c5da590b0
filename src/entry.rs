use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::time::sleep;
use url::Url;

use crate::args::{HttpMethod, ProbeArgs, ScenarioKind, parse_bool_env};
use crate::config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::probe::{
    ActionBody, Reporter, SequentialSpec, build_client, expectation, resolve_target, run_burst,
    run_sequential,
};
use crate::system::banner;

pub(crate) fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, &matches))
}

fn parse_args() -> AppResult<(ProbeArgs, ArgMatches)> {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let matches = ProbeArgs::command().get_matches_from(raw_args);
    let args = ProbeArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

struct ProbePlan {
    args: ProbeArgs,
    page_target: Url,
    action_target: Url,
    scenarios: Vec<ScenarioKind>,
}

async fn run_async(args: ProbeArgs, matches: &ArgMatches) -> AppResult<()> {
    let plan = build_plan(args, matches)?;
    execute_plan(plan).await
}

fn build_plan(mut args: ProbeArgs, matches: &ArgMatches) -> AppResult<ProbePlan> {
    if let Some(config) = config::load_config(args.config.as_deref())? {
        config::apply_config(&mut args, matches, &config)?;
    }
    apply_no_color_env(&mut args);

    let page_target = resolve_target(&args.base_url, &args.page_path, args.page_url.as_deref())?;
    let action_target =
        resolve_target(&args.base_url, &args.action_path, args.action_url.as_deref())?;

    let scenarios = match args.scenario {
        ScenarioKind::All => vec![
            ScenarioKind::Page,
            ScenarioKind::Action,
            ScenarioKind::Burst,
        ],
        single @ (ScenarioKind::Page | ScenarioKind::Action | ScenarioKind::Burst) => vec![single],
    };

    Ok(ProbePlan {
        args,
        page_target,
        action_target,
        scenarios,
    })
}

/// `NO_COLOR` in the environment disables color unless the flag already
/// did; an unparseable value still counts as set.
fn apply_no_color_env(args: &mut ProbeArgs) {
    if args.no_color {
        return;
    }
    if let Ok(value) = std::env::var("NO_COLOR")
        && !value.is_empty()
    {
        args.no_color = parse_bool_env(&value).unwrap_or(true);
    }
}

async fn execute_plan(plan: ProbePlan) -> AppResult<()> {
    let args = plan.args;
    tracing::debug!("Running scenario selection '{}'", args.scenario.as_str());
    let reporter = Reporter::new(args.no_color);
    banner::print_cli_banner(args.no_color);
    reporter.run_header(&args.base_url, args.rate_limit.get(), args.window);

    let client = build_client(args.timeout)?;
    let count = args.requests.get();
    let rate_limit = args.rate_limit.get();
    let mut violations = Vec::new();

    for (idx, kind) in plan.scenarios.iter().enumerate() {
        if idx > 0 {
            reporter.wait_notice(args.reset_wait);
            sleep(args.reset_wait).await;
        }

        let (title, ordered, result) = match kind {
            ScenarioKind::Page => {
                let title = "Page request test (GET)";
                reporter.scenario_header(
                    title,
                    &plan.page_target,
                    count,
                    Some(args.delay),
                    rate_limit,
                );
                let spec = SequentialSpec {
                    target: &plan.page_target,
                    count,
                    delay: args.delay,
                    method: HttpMethod::Get,
                    body: None,
                };
                (title, true, run_sequential(&client, &reporter, &spec).await)
            }
            ScenarioKind::Action => {
                let title = "Server action test (POST)";
                reporter.scenario_header(
                    title,
                    &plan.action_target,
                    count,
                    Some(args.delay),
                    rate_limit,
                );
                let body = ActionBody {
                    code: args.code.clone(),
                };
                let spec = SequentialSpec {
                    target: &plan.action_target,
                    count,
                    delay: args.delay,
                    method: HttpMethod::Post,
                    body: Some(&body),
                };
                (title, true, run_sequential(&client, &reporter, &spec).await)
            }
            ScenarioKind::Burst => {
                let title = "Burst test (concurrent GET)";
                reporter.scenario_header(title, &plan.page_target, count, None, rate_limit);
                (
                    title,
                    false,
                    run_burst(&client, &reporter, &plan.page_target, count).await,
                )
            }
            ScenarioKind::All => continue,
        };

        reporter.summary_block(&result.summary);

        if args.strict {
            violations.extend(expectation::check_run(title, ordered, &result, rate_limit));
        }
    }

    reporter.complete();

    if !violations.is_empty() {
        reporter.violations(&violations);
        return Err(AppError::validation(ValidationError::ExpectationsNotMet));
    }

    Ok(())
}
