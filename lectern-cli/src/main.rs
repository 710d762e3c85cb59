use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "lectern", version, about = "Client for the lecture summarizer backend")]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,
    #[command(flatten)]
    client: ClientArgs,
    #[command(flatten)]
    retry: RetryArgs,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli));
    std::process::exit(exit_code);
}

async fn run_command(cli: Cli) -> i32 {
    let Cli {
        output,
        client,
        retry,
        command,
    } = cli;
    match command {
        Command::Summarize { input } => {
            cmd::summarize::summarize_cmd(input, output, client, retry).await
        }
        Command::Quiz { input } => cmd::quiz::quiz_cmd(input, output, client, retry).await,
        Command::Transcript { url, save_dir } => {
            cmd::transcript::transcript_cmd(&url, save_dir.as_deref(), output, client, retry).await
        }
        Command::SaveLecture {
            title,
            video_url,
            transcript_file,
            summary,
        } => {
            cmd::save_lecture::save_lecture_cmd(
                &title,
                &video_url,
                transcript_file.as_deref(),
                &summary,
                output,
                client,
                retry,
            )
            .await
        }
        Command::Lectures => cmd::lectures::lectures_cmd(output, client, retry).await,
        Command::Status {
            watch,
            interval,
            wait_timeout,
        } => cmd::status::status_cmd(watch, interval, wait_timeout, output, client, retry).await,
        Command::Doctor => cmd::doctor::doctor_cmd(output, client, retry).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_client::readiness::DEFAULT_POLL_INTERVAL;

    #[test]
    fn status_interval_defaults_to_poller_interval() {
        let cli = Cli::try_parse_from(["lectern", "status", "--watch"]).unwrap();
        match cli.command {
            Command::Status { interval, watch, .. } => {
                assert!(watch);
                assert_eq!(interval, DEFAULT_POLL_INTERVAL.as_millis() as u64);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_options_apply_after_the_subcommand() {
        let cli =
            Cli::try_parse_from(["lectern", "lectures", "--base-url", "http://x:1", "--format", "json"])
                .unwrap();
        assert_eq!(cli.client.base_url.as_deref(), Some("http://x:1"));
        assert_eq!(cli.output.format, output::OutputFormat::Json);
    }
}
