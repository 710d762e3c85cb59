use std::sync::Arc;
use std::time::Duration;

use lectern_client::ReadinessStatus;
use lectern_client::readiness::{ModelsState, PollerState, ReadinessPoller};
use serde::Serialize;

use crate::cmd::config::{build_client, report_api_error};
use crate::exit_codes;
use crate::output::{OutputFormat, print_error, print_result};
use crate::{ClientArgs, OutputArgs, RetryArgs};

#[derive(Serialize)]
struct StatusView {
    state: ModelsState,
    label: &'static str,
    #[serde(flatten)]
    status: ReadinessStatus,
}

fn print_status(output: &OutputArgs, status: &ReadinessStatus) {
    if output.quiet {
        return;
    }
    let state = status.models_state();
    if output.format == OutputFormat::Text {
        println!(
            "{} (summarizer: {}, generator: {})",
            state.label(),
            ready_word(status.summarizer_ready),
            ready_word(status.generator_ready),
        );
    } else {
        let view = StatusView {
            state,
            label: state.label(),
            status: *status,
        };
        print_result(output.format, output.quiet, &view);
    }
}

fn ready_word(ready: bool) -> &'static str {
    if ready { "ready" } else { "loading" }
}

pub async fn status_cmd(
    watch: bool,
    interval_ms: u64,
    wait_timeout: Option<u64>,
    output: OutputArgs,
    client: ClientArgs,
    retry: RetryArgs,
) -> i32 {
    if watch && interval_ms == 0 {
        print_error(output.format, output.quiet, "--interval must be greater than zero");
        return exit_codes::INPUT_ERROR;
    }
    let api = match build_client(&client, &retry, &output) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if !watch {
        return tokio::select! {
            res = api.models_status() => match res {
                Ok(status) => {
                    print_status(&output, &status);
                    exit_codes::SUCCESS
                }
                Err(e) => report_api_error(&output, &e),
            },
            _ = tokio::signal::ctrl_c() => exit_codes::CANCELLED,
        };
    }

    let events = api.retrying().event_sink();
    let poller = ReadinessPoller::new(Arc::new(api)).with_event_sink(events);
    let printer = output.clone();
    let sub = poller.subscribe(
        move |status| print_status(&printer, &status),
        Duration::from_millis(interval_ms),
    );

    let deadline = async {
        match wait_timeout {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        state = sub.wait() => match state {
            PollerState::Settled => exit_codes::SUCCESS,
            _ => exit_codes::CANCELLED,
        },
        _ = deadline => {
            sub.detach();
            print_error(
                output.format,
                output.quiet,
                &format!("models not ready after {}s", wait_timeout.unwrap_or_default()),
            );
            exit_codes::TIMED_OUT
        }
        _ = tokio::signal::ctrl_c() => {
            sub.detach();
            exit_codes::CANCELLED
        }
    }
}
