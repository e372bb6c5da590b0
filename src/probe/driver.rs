use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use crate::args::HttpMethod;

use super::outcome::{Classified, RequestOutcome, RunSummary, classify};
use super::report::Reporter;

/// JSON body submitted by the action scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ActionBody {
    pub code: String,
}

/// A completed scenario: the tally plus every classified request in
/// print order.
#[derive(Debug)]
pub struct ScenarioResult {
    pub summary: RunSummary,
    pub results: Vec<Classified>,
}

/// Parameters for a sequential request pattern.
#[derive(Debug)]
pub struct SequentialSpec<'spec> {
    pub target: &'spec Url,
    pub count: usize,
    pub delay: Duration,
    pub method: HttpMethod,
    pub body: Option<&'spec ActionBody>,
}

/// Issues `count` requests one at a time, printing and tallying each.
///
/// A failed call (timeout, refused connection, DNS failure) is recorded
/// as an `Error` outcome and the loop moves on; nothing aborts the run.
/// Sleeps `delay` between requests but not after the last.
pub async fn run_sequential(
    client: &Client,
    reporter: &Reporter,
    spec: &SequentialSpec<'_>,
) -> ScenarioResult {
    let mut summary = RunSummary::default();
    let mut results = Vec::with_capacity(spec.count);

    for ordinal in 1..=spec.count {
        let classified = classify_call(client, spec.method, spec.target, spec.body, ordinal).await;
        reporter.request_line(&classified);
        summary.record(classified.outcome);
        results.push(classified);

        if ordinal < spec.count {
            sleep(spec.delay).await;
        }
    }

    ScenarioResult { summary, results }
}

/// Issues `count` GET requests at once from a pool of `count` tasks.
///
/// Results fan in over a channel in completion order, which is
/// non-deterministic; lines print in arrival order and the summary is
/// folded from the completed collection only, so the tally never
/// depends on which request finished first.
pub async fn run_burst(
    client: &Client,
    reporter: &Reporter,
    target: &Url,
    count: usize,
) -> ScenarioResult {
    let (results_tx, mut results_rx) = mpsc::channel::<Classified>(count.max(1));
    let mut handles = Vec::with_capacity(count);

    for ordinal in 1..=count {
        let client = client.clone();
        let target = target.clone();
        let results_tx = results_tx.clone();
        handles.push(tokio::spawn(async move {
            let classified = classify_call(&client, HttpMethod::Get, &target, None, ordinal).await;
            drop(results_tx.send(classified).await);
        }));
    }
    drop(results_tx);

    let mut results = Vec::with_capacity(count);
    let mut arrival: usize = 0;
    while let Some(mut classified) = results_rx.recv().await {
        arrival = arrival.saturating_add(1);
        classified.ordinal = arrival;
        reporter.request_line(&classified);
        results.push(classified);
    }

    for handle in handles {
        if handle.await.is_err() {
            break;
        }
    }

    let summary = RunSummary::from_results(&results);
    ScenarioResult { summary, results }
}

async fn classify_call(
    client: &Client,
    method: HttpMethod,
    target: &Url,
    body: Option<&ActionBody>,
    ordinal: usize,
) -> Classified {
    match issue_request(client, method, target, body).await {
        Ok((status, location)) => Classified {
            ordinal,
            outcome: classify(status, location.as_deref()),
            status: Some(status),
            location,
            detail: None,
        },
        Err(err) => {
            debug!("{} request {} failed: {}", method.as_str(), ordinal, err);
            Classified {
                ordinal,
                outcome: RequestOutcome::Error,
                status: None,
                location: None,
                detail: Some(err.to_string()),
            }
        }
    }
}

async fn issue_request(
    client: &Client,
    method: HttpMethod,
    target: &Url,
    body: Option<&ActionBody>,
) -> Result<(u16, Option<String>), reqwest::Error> {
    let builder = match method {
        HttpMethod::Get => client.get(target.clone()),
        HttpMethod::Post => match body {
            Some(body) => client.post(target.clone()).json(body),
            None => client.post(target.clone()),
        },
    };

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    drain_response_body(response).await?;

    Ok((status, location))
}

/// Reads the body to completion so a failure mid-stream surfaces as a
/// transport error, matching how the whole exchange is classified.
async fn drain_response_body(response: reqwest::Response) -> Result<(), reqwest::Error> {
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let _bytes = chunk?;
    }
    Ok(())
}
