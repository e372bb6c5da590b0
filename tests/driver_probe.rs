mod support;

use std::future::Future;
use std::time::Duration;

use limitprobe::args::HttpMethod;
use limitprobe::probe::{
    ActionBody, Reporter, SequentialSpec, build_client, resolve_target, run_burst, run_sequential,
};
use support::{ResponseScript, spawn_http_server_or_skip, unreachable_url};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn target_for(url: &str) -> Result<url::Url, String> {
    resolve_target(url, "/join", None).map_err(|err| format!("resolve failed: {}", err))
}

#[test]
fn sequential_all_ok_yields_full_success() -> Result<(), String> {
    run_async_test(async {
        let Some((url, _server)) = spawn_http_server_or_skip(ResponseScript::AlwaysOk)? else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let spec = SequentialSpec {
            target: &target,
            count: 10,
            delay: Duration::from_millis(5),
            method: HttpMethod::Get,
            body: None,
        };
        let result = run_sequential(&client, &reporter, &spec).await;

        if result.summary.success != 10 {
            return Err(format!("Expected 10 successes: {:?}", result.summary));
        }
        if result.summary.total() != 10 {
            return Err(format!("Counts must sum to 10: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn sequential_classifies_blocked_redirects() -> Result<(), String> {
    run_async_test(async {
        let script = ResponseScript::OkThenBlocked {
            ok: 5,
            status: 307,
        };
        let Some((url, _server)) = spawn_http_server_or_skip(script)? else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let spec = SequentialSpec {
            target: &target,
            count: 10,
            delay: Duration::from_millis(5),
            method: HttpMethod::Get,
            body: None,
        };
        let result = run_sequential(&client, &reporter, &spec).await;

        if result.summary.success != 5 || result.summary.rate_limited != 5 {
            return Err(format!("Expected 5/5 split: {:?}", result.summary));
        }
        if result.summary.errors != 0 || result.summary.unexpected != 0 {
            return Err(format!("Expected no errors: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn sequential_post_sends_json_body() -> Result<(), String> {
    run_async_test(async {
        let Some((url, _server)) = spawn_http_server_or_skip(ResponseScript::AlwaysOk)? else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;
        let body = ActionBody {
            code: "TESTCODE".to_owned(),
        };

        let spec = SequentialSpec {
            target: &target,
            count: 3,
            delay: Duration::from_millis(5),
            method: HttpMethod::Post,
            body: Some(&body),
        };
        let result = run_sequential(&client, &reporter, &spec).await;

        if result.summary.success != 3 {
            return Err(format!("Expected 3 successes: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn sequential_redirect_elsewhere_is_unexpected() -> Result<(), String> {
    run_async_test(async {
        let Some((url, _server)) = spawn_http_server_or_skip(ResponseScript::RedirectElsewhere)?
        else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let spec = SequentialSpec {
            target: &target,
            count: 4,
            delay: Duration::from_millis(5),
            method: HttpMethod::Get,
            body: None,
        };
        let result = run_sequential(&client, &reporter, &spec).await;

        if result.summary.unexpected != 4 {
            return Err(format!("Expected 4 unexpected: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn sequential_survives_connection_refused() -> Result<(), String> {
    run_async_test(async {
        let url = unreachable_url()?;
        let client = build_client(Duration::from_secs(1)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let spec = SequentialSpec {
            target: &target,
            count: 3,
            delay: Duration::from_millis(5),
            method: HttpMethod::Get,
            body: None,
        };
        let result = run_sequential(&client, &reporter, &spec).await;

        // Every request fails locally; none may abort the run.
        if result.summary.errors != 3 {
            return Err(format!("Expected 3 errors: {:?}", result.summary));
        }
        if result.summary.total() != 3 {
            return Err(format!("Counts must sum to 3: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn burst_all_ok_regardless_of_completion_order() -> Result<(), String> {
    run_async_test(async {
        let Some((url, _server)) = spawn_http_server_or_skip(ResponseScript::AlwaysOk)? else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let result = run_burst(&client, &reporter, &target, 10).await;

        if result.summary.success != 10 {
            return Err(format!("Expected 10 successes: {:?}", result.summary));
        }
        if result.summary.total() != 10 {
            return Err(format!("Counts must sum to 10: {:?}", result.summary));
        }
        if result.results.len() != 10 {
            return Err(format!("Expected 10 results, got {}", result.results.len()));
        }
        Ok(())
    })
}

#[test]
fn burst_tallies_mixed_outcomes_exactly() -> Result<(), String> {
    run_async_test(async {
        let script = ResponseScript::OkThenBlocked {
            ok: 5,
            status: 302,
        };
        let Some((url, _server)) = spawn_http_server_or_skip(script)? else {
            return Ok(());
        };
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let result = run_burst(&client, &reporter, &target, 10).await;

        // The server admits exactly 5 connections before redirecting;
        // arrival order at the driver is free to vary.
        if result.summary.success != 5 || result.summary.rate_limited != 5 {
            return Err(format!("Expected 5/5 split: {:?}", result.summary));
        }
        if result.summary.total() != 10 {
            return Err(format!("Counts must sum to 10: {:?}", result.summary));
        }
        Ok(())
    })
}

#[test]
fn burst_survives_connection_refused() -> Result<(), String> {
    run_async_test(async {
        let url = unreachable_url()?;
        let client = build_client(Duration::from_secs(1)).map_err(|err| err.to_string())?;
        let reporter = Reporter::new(true);
        let target = target_for(&url)?;

        let result = run_burst(&client, &reporter, &target, 5).await;

        if result.summary.errors != 5 {
            return Err(format!("Expected 5 errors: {:?}", result.summary));
        }
        Ok(())
    })
}
