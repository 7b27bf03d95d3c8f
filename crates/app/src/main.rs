mod input;
mod render;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quiz_core::model::{BankSource, DocumentId, OptionKey, QuestionCount};
use services::config::parse_base_url;
use services::{AppServices, Clock, QuizConfig, QuizSessionController, QuizState};
use tracing_subscriber::EnvFilter;

use crate::input::Command;

const DEFAULT_LOG_FILTER: &str = "services=info,quiz_api=info,app=info";

#[derive(Parser)]
#[command(name = "quiz")]
#[command(about = "Adaptive quiz sessions over a document or a topic", long_about = None)]
struct Cli {
    /// Quiz service base URL (overrides QUIZ_API_BASE_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Document to generate questions from (overrides QUIZ_DOCUMENT_ID)
    #[arg(long)]
    document_id: Option<String>,

    /// Generate a bank for this topic right away
    #[arg(long)]
    topic: Option<String>,

    /// Questions per quiz, 5-10 (overrides QUIZ_QUESTION_COUNT)
    #[arg(long)]
    questions: Option<u32>,

    /// Request timeout in seconds (overrides QUIZ_API_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Use the built-in stand-in service instead of the remote one
    #[arg(long)]
    offline: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut QuizConfig) -> Result<()> {
        if let Some(url) = &self.api_url {
            config.api_base_url = parse_base_url("--api-url", url)?;
        }
        if let Some(id) = self.document_id.as_deref().map(str::trim) {
            config.document_id = (!id.is_empty()).then(|| DocumentId::new(id));
        }
        if let Some(count) = self.questions {
            config.question_count = QuestionCount::new(count)?;
        }
        if let Some(secs) = self.timeout_secs {
            anyhow::ensure!(secs > 0, "--timeout-secs must be positive");
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = QuizConfig::from_env().context("reading QUIZ_* environment")?;
    cli.apply_to(&mut config)?;

    let services = if cli.offline {
        AppServices::new_in_memory(config, Clock::default())
    } else {
        AppServices::new_http(config, Clock::default())?
    };
    let mut controller = services.quiz_controller();

    if let Some(topic) = cli.topic {
        println!("Generating questions about {topic}...");
        if let Err(err) = controller.generate_bank(BankSource::Topic(topic)).await {
            println!("Error: {err}");
        }
    }

    run(&mut controller, services.config().question_count).await
}

async fn run(controller: &mut QuizSessionController, default_count: QuestionCount) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        println!();
        render::render(&mut stdout, controller)?;
        print!("{} > ", render::prompt(controller.phase()));
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match input::parse(controller.phase(), &line, option_keys(controller)) {
            Ok(Command::Quit) => break,
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        if command.is_remote() {
            println!("Working...");
        }
        if let Err(err) = input::apply(controller, command, default_count).await {
            println!("Error: {err}");
        }
    }

    Ok(())
}

fn option_keys(controller: &QuizSessionController) -> &[OptionKey] {
    match controller.state() {
        QuizState::InProgress(active) => active.session.current_question().keys(),
        _ => &[],
    }
}
