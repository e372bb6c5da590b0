use super::driver::ScenarioResult;
use super::outcome::RequestOutcome;

/// Strict-mode check: does the observed run contradict the configured
/// limit? Returns human-readable violations; empty means the scenario
/// behaved as advertised.
///
/// The ordered check (successes before the first rate-limited response)
/// only applies to sequential scenarios; burst arrival order carries no
/// information.
#[must_use]
pub fn check_run(
    title: &str,
    ordered: bool,
    result: &ScenarioResult,
    rate_limit: u64,
) -> Vec<String> {
    let mut violations = Vec::new();
    let summary = &result.summary;
    let total = summary.total();

    if summary.rate_limited == 0 {
        if total > rate_limit {
            violations.push(format!(
                "{}: {} requests went through with no rate limiting (expected limiting after {}).",
                title, total, rate_limit
            ));
        }
        return violations;
    }

    if ordered {
        let before_limit = result
            .results
            .iter()
            .take_while(|classified| classified.outcome != RequestOutcome::RateLimited)
            .filter(|classified| classified.outcome == RequestOutcome::Success)
            .count();
        let before_limit = u64::try_from(before_limit).unwrap_or(u64::MAX);
        if before_limit < rate_limit {
            violations.push(format!(
                "{}: only {} requests succeeded before the first rate-limited response (expected {}).",
                title, before_limit, rate_limit
            ));
        }
    }

    violations
}
