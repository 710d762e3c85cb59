use lectern_client::api::QuizQuestion;
use serde::Serialize;

use crate::cmd::config::{build_client, read_text_input, report_api_error};
use crate::cmd::progress::RetryIndicator;
use crate::exit_codes;
use crate::output::{OutputFormat, print_result};
use crate::{ClientArgs, OutputArgs, RetryArgs, TextInputArgs};

#[derive(Serialize)]
struct QuizResult {
    questions: Vec<QuizQuestion>,
    retries: u32,
}

pub async fn quiz_cmd(
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
    let questions = match api
        .generate_quiz(&text, input.mock, options)
        .await
    {
        Ok(q) => q,
        Err(e) => return report_api_error(&output, &e),
    };

    if output.format == OutputFormat::Text {
        if !output.quiet {
            print!("{}", render_quiz(&questions));
        }
    } else {
        let result = QuizResult {
            questions,
            retries: indicator.retries(),
        };
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}

fn render_quiz(questions: &[QuizQuestion]) -> String {
    if questions.is_empty() {
        return "No questions generated.\n".to_string();
    }
    let mut out = String::new();
    for (i, q) in questions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, q.question));
        for opt in &q.options {
            out.push_str(&format!("   - {opt}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_numbered_questions_with_options() {
        let qs = vec![
            QuizQuestion {
                question: "What is AI?".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
            },
            QuizQuestion {
                question: "Open question".to_string(),
                options: vec![],
            },
        ];
        assert_eq!(
            render_quiz(&qs),
            "1. What is AI?\n   - A\n   - B\n2. Open question\n"
        );
        assert_eq!(render_quiz(&[]), "No questions generated.\n");
    }
}
