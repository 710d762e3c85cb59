use serde::Serialize;

use crate::cmd::config::{build_client, read_text_input, report_api_error};
use crate::cmd::progress::RetryIndicator;
use crate::exit_codes;
use crate::output::{OutputFormat, print_result};
use crate::{ClientArgs, OutputArgs, RetryArgs, TextInputArgs};

#[derive(Serialize)]
struct SummarizeResult {
    summary: String,
    retries: u32,
}

pub async fn summarize_cmd(
    input: TextInputArgs,
    output: OutputArgs,
    client: ClientArgs,
    retry: RetryArgs,
) -> i32 {
    let text = match read_text_input(&input, &output) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let api = match build_client(&client, &retry, &output) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let indicator = RetryIndicator::new(&output);
    let (options, _interrupt) = indicator.submit_options();
    match api
        .summarize(&text, input.mock, options)
        .await
    {
        Ok(summary) => {
            if output.format == OutputFormat::Text {
                if !output.quiet {
                    println!("{}", summary.text());
                }
            } else {
                let result = SummarizeResult {
                    summary: summary.text().to_string(),
                    retries: indicator.retries(),
                };
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(e) => report_api_error(&output, &e),
    }
}
