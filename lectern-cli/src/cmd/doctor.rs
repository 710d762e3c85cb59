use lectern_client::ApiClient;
use lectern_client::readiness::ModelsState;
use serde::Serialize;

use crate::cmd::config::{build_client, parse_base_url, resolve_base_url};
use crate::exit_codes;
use crate::output::{OutputFormat, print_result};
use crate::utils::redact_url_password;
use crate::{ClientArgs, OutputArgs, RetryArgs};

#[derive(Serialize)]
struct Check {
    name: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Check {
    fn new(name: &str, status: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct DoctorResult {
    base_url: String,
    checks: Vec<Check>,
    all_passed: bool,
}

pub async fn doctor_cmd(output: OutputArgs, client: ClientArgs, retry: RetryArgs) -> i32 {
    let raw = resolve_base_url(&client);
    let mut checks = vec![check_base_url(&raw)];

    // Remote checks only make sense against a usable URL.
    if checks[0].status == "ok" {
        let quiet_output = OutputArgs {
            quiet: true,
            ..output.clone()
        };
        match build_client(&client, &retry, &quiet_output) {
            Ok(api) => {
                checks.push(check_health(&api).await);
                checks.push(check_models(&api).await);
            }
            Err(_) => checks.push(Check::new(
                "client",
                "error",
                "failed to create http client",
            )),
        }
    }

    let all_passed = checks.iter().all(|c| c.status != "error");
    let result = DoctorResult {
        base_url: redact_url_password(&raw),
        checks,
        all_passed,
    };

    if output.format == OutputFormat::Text && !output.quiet {
        println!("Backend: {}", result.base_url);
        for c in &result.checks {
            let icon = match c.status.as_str() {
                "ok" => "✓",
                "warning" => "!",
                _ => "✗",
            };
            print!("  {} {}: {}", icon, c.name, c.status);
            if let Some(msg) = &c.message {
                print!(" - {msg}");
            }
            println!();
        }
        if result.all_passed {
            println!("\nAll checks passed.");
        } else {
            println!("\nSome checks failed.");
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if all_passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::REQUEST_FAILED
    }
}

fn check_base_url(raw: &str) -> Check {
    match parse_base_url(raw) {
        Ok(_) => Check::new("base_url", "ok", "valid"),
        Err(msg) => Check::new("base_url", "error", msg),
    }
}

async fn check_health(api: &ApiClient) -> Check {
    match api.health().await {
        Ok(h) if h.status.is_empty() => Check::new("health", "ok", "reachable"),
        Ok(h) => Check::new("health", "ok", h.status),
        Err(e) => Check::new("health", "error", e.to_string()),
    }
}

async fn check_models(api: &ApiClient) -> Check {
    match api.models_status().await {
        Ok(s) => {
            let state = s.models_state();
            let status = match state {
                ModelsState::Ready => "ok",
                ModelsState::Loading | ModelsState::Disabled => "warning",
            };
            Check::new("models", status, state.label())
        }
        Err(e) => Check::new("models", "error", e.to_string()),
    }
}
