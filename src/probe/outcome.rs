/// Path fragment the server redirects to when it throttles a request.
pub const BLOCKED_PATH_FRAGMENT: &str = "/blocked";

/// Redirect statuses a throttling proxy answers with.
const REDIRECT_STATUSES: [u16; 3] = [302, 307, 308];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    RateLimited,
    Unexpected,
    Error,
}

impl RequestOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestOutcome::Success => "SUCCESS",
            RequestOutcome::RateLimited => "RATE LIMITED",
            RequestOutcome::Unexpected => "UNEXPECTED",
            RequestOutcome::Error => "ERROR",
        }
    }
}

/// Classifies a completed HTTP exchange from its status code and
/// `Location` header. Transport failures never reach this function; the
/// driver resolves them to [`RequestOutcome::Error`] directly.
#[must_use]
pub fn classify(status: u16, location: Option<&str>) -> RequestOutcome {
    if REDIRECT_STATUSES.contains(&status)
        && location.is_some_and(|value| value.contains(BLOCKED_PATH_FRAGMENT))
    {
        return RequestOutcome::RateLimited;
    }
    if status == 200 {
        return RequestOutcome::Success;
    }
    RequestOutcome::Unexpected
}

/// One finished request as reported to the console.
///
/// `ordinal` is the printed request number: dispatch order for
/// sequential runs, arrival order for bursts.
#[derive(Debug, Clone)]
pub struct Classified {
    pub ordinal: usize,
    pub outcome: RequestOutcome,
    pub status: Option<u16>,
    pub location: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub success: u64,
    pub rate_limited: u64,
    pub unexpected: u64,
    pub errors: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Success => self.success = self.success.saturating_add(1),
            RequestOutcome::RateLimited => {
                self.rate_limited = self.rate_limited.saturating_add(1);
            }
            RequestOutcome::Unexpected => self.unexpected = self.unexpected.saturating_add(1),
            RequestOutcome::Error => self.errors = self.errors.saturating_add(1),
        }
    }

    /// Folds a completed result collection into counts. The burst path
    /// uses this so tallies never depend on arrival order.
    #[must_use]
    pub fn from_results(results: &[Classified]) -> Self {
        let mut summary = Self::default();
        for classified in results {
            summary.record(classified.outcome);
        }
        summary
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.success
            .saturating_add(self.rate_limited)
            .saturating_add(self.unexpected)
            .saturating_add(self.errors)
    }
}
