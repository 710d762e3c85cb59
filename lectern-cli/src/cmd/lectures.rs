use serde::Serialize;

use lectern_client::api::Lecture;

use crate::cmd::config::{build_client, report_api_error};
use crate::exit_codes;
use crate::output::{OutputFormat, print_result};
use crate::{ClientArgs, OutputArgs, RetryArgs};

#[derive(Serialize)]
struct LecturesResult {
    lectures: Vec<Lecture>,
}

pub async fn lectures_cmd(output: OutputArgs, client: ClientArgs, retry: RetryArgs) -> i32 {
    let api = match build_client(&client, &retry, &output) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let lectures = tokio::select! {
        res = api.my_lectures() => match res {
            Ok(l) => l,
            Err(e) => return report_api_error(&output, &e),
        },
        _ = tokio::signal::ctrl_c() => return exit_codes::CANCELLED,
    };

    if output.format == OutputFormat::Text {
        if !output.quiet {
            if lectures.is_empty() {
                println!("No lectures saved yet.");
            }
            for l in &lectures {
                println!("[{}] {} ({})", l.id, l.title, l.video_url);
            }
        }
    } else {
        print_result(output.format, output.quiet, &LecturesResult { lectures });
    }
    exit_codes::SUCCESS
}
