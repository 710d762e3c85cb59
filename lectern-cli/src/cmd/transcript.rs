use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use lectern_client::api::{embed_url, video_id};
use serde::Serialize;

use crate::cmd::config::{build_client, report_api_error};
use crate::cmd::progress::RetryIndicator;
use crate::exit_codes;
use crate::output::{OutputFormat, print_error, print_result};
use crate::utils::normalize_transcript;
use crate::{ClientArgs, OutputArgs, RetryArgs};

#[derive(Serialize)]
struct TranscriptResult {
    transcript: String,
    embed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
}

pub async fn transcript_cmd(
    url: &str,
    save_dir: Option<&Path>,
    output: OutputArgs,
    client: ClientArgs,
    retry: RetryArgs,
) -> i32 {
    if url.trim().is_empty() {
        print_error(output.format, output.quiet, "video URL must not be empty");
        return exit_codes::INPUT_ERROR;
    }
    let api = match build_client(&client, &retry, &output) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let indicator = RetryIndicator::new(&output);
    let (options, _interrupt) = indicator.submit_options();
    let transcript = match api.fetch_transcript(url, options).await {
        Ok(t) => t.transcript,
        Err(e) => return report_api_error(&output, &e),
    };

    let saved_to = match save_dir {
        Some(dir) => match save_transcript(dir, url, &transcript) {
            Ok(path) => Some(path),
            Err(e) => {
                print_error(
                    output.format,
                    output.quiet,
                    &format!("failed to save transcript: {e}"),
                );
                return exit_codes::RUNTIME_ERROR;
            }
        },
        None => None,
    };

    let result = TranscriptResult {
        transcript,
        embed_url: embed_url(url),
        saved_to,
    };
    if output.format == OutputFormat::Text {
        if !output.quiet {
            println!("Video: {}", result.embed_url);
            if let Some(path) = &result.saved_to {
                println!("Saved: {}", path.display());
            }
            println!();
            println!("{}", result.transcript);
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}

fn save_transcript(dir: &Path, url: &str, transcript: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let id = video_id(url).unwrap_or_else(|| "video".to_string());
    let path = dir.join(transcript_file_name(&id, ts));
    std::fs::write(&path, normalize_transcript(transcript))?;
    Ok(path)
}

fn transcript_file_name(video_id: &str, ts: u64) -> String {
    format!("transcript_{video_id}_{ts}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_carries_video_id_and_timestamp() {
        assert_eq!(
            transcript_file_name("dQw4w9WgXcQ", 1700000000),
            "transcript_dQw4w9WgXcQ_1700000000.txt"
        );
    }
}
