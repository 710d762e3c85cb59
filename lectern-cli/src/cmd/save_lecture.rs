use std::path::Path;

use lectern_client::api::NewLecture;

use crate::cmd::config::{build_client, read_file, report_api_error};
use crate::cmd::progress::RetryIndicator;
use crate::exit_codes;
use crate::output::{OutputFormat, print_error, print_result};
use crate::{ClientArgs, OutputArgs, RetryArgs};

pub async fn save_lecture_cmd(
    title: &str,
    video_url: &str,
    transcript_file: Option<&Path>,
    summary: &str,
    output: OutputArgs,
    client: ClientArgs,
    retry: RetryArgs,
) -> i32 {
    if title.trim().is_empty() || video_url.trim().is_empty() {
        print_error(
            output.format,
            output.quiet,
            "title and video URL must not be empty",
        );
        return exit_codes::INPUT_ERROR;
    }
    let transcript = match transcript_file {
        Some(path) => match read_file(path, &output) {
            Ok(t) => t,
            Err(code) => return code,
        },
        None => String::new(),
    };
    let api = match build_client(&client, &retry, &output) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let lecture = NewLecture {
        title: title.to_string(),
        video_url: video_url.to_string(),
        transcript,
        summary: summary.to_string(),
    };
    let indicator = RetryIndicator::new(&output);
    let (options, _interrupt) = indicator.submit_options();
    let saved = match api.save_lecture(&lecture, options).await {
        Ok(s) => s,
        Err(e) => return report_api_error(&output, &e),
    };

    if output.format == OutputFormat::Text {
        if !output.quiet {
            match (saved.lecture_id, saved.message.as_deref()) {
                (Some(id), _) => println!("Lecture saved (id {id})."),
                (None, Some(msg)) => println!("{msg}"),
                (None, None) => println!("Lecture saved."),
            }
        }
    } else {
        print_result(output.format, output.quiet, &saved);
    }
    exit_codes::SUCCESS
}
