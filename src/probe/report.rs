use std::io::IsTerminal;
use std::time::Duration;

use crossterm::style::{Color, Stylize};
use url::Url;

use super::outcome::{Classified, RequestOutcome, RunSummary};

/// Width of the separator rule framing headers and summaries.
const RULE_WIDTH: usize = 60;

/// Console reporter for per-request lines and scenario blocks.
///
/// Color is applied only when stdout is a terminal and the user did not
/// opt out.
#[derive(Debug, Clone)]
pub struct Reporter {
    use_color: bool,
}

impl Reporter {
    #[must_use]
    pub fn new(no_color: bool) -> Self {
        Self {
            use_color: !no_color && std::io::stdout().is_terminal(),
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            format!("{}", text.with(color))
        } else {
            text.to_owned()
        }
    }

    fn rule(&self) {
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    pub fn run_header(&self, base_url: &str, rate_limit: u64, window: Duration) {
        self.rule();
        println!("Rate limiting smoke test");
        self.rule();
        println!("Target: {}", base_url);
        println!(
            "Advertised limit: {} requests per {}s window",
            rate_limit,
            window.as_secs()
        );
        self.rule();
    }

    /// Scenario header; `delay` is `None` for the burst pattern.
    pub fn scenario_header(
        &self,
        title: &str,
        target: &Url,
        count: usize,
        delay: Option<Duration>,
        rate_limit: u64,
    ) {
        println!();
        self.rule();
        println!("{}: {}", title, target);
        match delay {
            Some(delay) => {
                println!(
                    "Making {} requests with {}ms delay between each",
                    count,
                    delay.as_millis()
                );
                println!(
                    "Expected: first {} requests succeed, then rate limited",
                    rate_limit
                );
            }
            None => {
                println!("Firing {} concurrent requests with no delay", count);
            }
        }
        self.rule();
        println!();
    }

    pub fn request_line(&self, classified: &Classified) {
        let tag = match classified.outcome {
            RequestOutcome::Success => self.paint(classified.outcome.as_str(), Color::Green),
            RequestOutcome::RateLimited | RequestOutcome::Error => {
                self.paint(classified.outcome.as_str(), Color::Red)
            }
            RequestOutcome::Unexpected => self.paint(classified.outcome.as_str(), Color::Yellow),
        };

        let line = match classified.outcome {
            RequestOutcome::Success => format!(
                "Request {:2}: {} (Status: {})",
                classified.ordinal,
                tag,
                format_status(classified.status)
            ),
            RequestOutcome::RateLimited => format!(
                "Request {:2}: {} (Status: {}, Redirect: {})",
                classified.ordinal,
                tag,
                format_status(classified.status),
                classified.location.as_deref().unwrap_or("")
            ),
            RequestOutcome::Unexpected => format!(
                "Request {:2}: {} (Status: {})",
                classified.ordinal,
                tag,
                format_status(classified.status)
            ),
            RequestOutcome::Error => format!(
                "Request {:2}: {} - {}",
                classified.ordinal,
                tag,
                classified.detail.as_deref().unwrap_or("request failed")
            ),
        };
        println!("{}", line);
    }

    pub fn summary_block(&self, summary: &RunSummary) {
        println!();
        self.rule();
        println!("RESULTS:");
        println!("  Successful: {}", summary.success);
        println!("  Rate Limited: {}", summary.rate_limited);
        println!("  Unexpected: {}", summary.unexpected);
        println!("  Errors: {}", summary.errors);
        self.rule();
    }

    pub fn wait_notice(&self, wait: Duration) {
        println!();
        println!(
            "Waiting {}s for the rate limit window to reset...",
            wait.as_secs()
        );
    }

    pub fn violations(&self, violations: &[String]) {
        println!();
        println!("{}", self.paint("Strict checks failed:", Color::Red));
        for violation in violations {
            println!("  {}", self.paint(violation, Color::Red));
        }
    }

    pub fn complete(&self) {
        println!();
        println!("Testing complete.");
    }
}

fn format_status(status: Option<u16>) -> String {
    status.map_or_else(|| "-".to_owned(), |code| code.to_string())
}
