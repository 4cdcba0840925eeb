use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    engine::{DifficultyFilter, FilterState, PlatformFilter, SortKey},
    settings::load_client_settings,
    ControllerError, ListController, ProblemClient, ProblemRepository,
};
use shared::{domain::ProblemId, protocol::ProblemDraft};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "algotrack", about = "Track coding problems and their review schedule")]
struct Cli {
    /// Base URL of the problem API, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file to use instead of ./algotrack.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is reachable
    Hello,
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = DifficultyFilter::All)]
        difficulty: DifficultyFilter,
        #[arg(long, default_value_t = PlatformFilter::All)]
        platform: PlatformFilter,
        #[arg(long, default_value_t = SortKey::Newest)]
        sort: SortKey,
    },
    /// Platforms available as list filters
    Platforms,
    Show {
        id: i64,
    },
    Add(ProblemFields),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ProblemFields,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Field values for `add` and `edit`. An empty string clears an optional field.
#[derive(Args, Debug, Default)]
struct ProblemFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    platform: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    url: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    last_reviewed: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    next_review: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    review_count: Option<i64>,
    #[arg(long)]
    notes: Option<String>,
}

impl ProblemFields {
    fn apply(self, draft: &mut ProblemDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(difficulty) = self.difficulty {
            draft.difficulty = difficulty;
        }
        if let Some(platform) = self.platform {
            draft.platform = platform;
        }
        if let Some(review_count) = self.review_count {
            draft.review_count = review_count;
        }
        for (value, slot) in [
            (self.description, &mut draft.description),
            (self.url, &mut draft.url),
            (self.last_reviewed, &mut draft.last_reviewed),
            (self.next_review, &mut draft.next_review),
            (self.notes, &mut draft.notes),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings =
        load_client_settings(cli.config.as_deref()).context("failed to load client settings")?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    debug!(api_base_url = %settings.api_base_url, "using problem api");

    let client = Arc::new(ProblemClient::new(settings.api_base_url.clone()));
    let mut controller = ListController::with_notice_ttl(client.clone(), settings.notice_ttl());

    let code = match cli.command {
        Command::Hello => match client.hello().await {
            Ok(message) => {
                println!("Connected: {message}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                println!("Connection Failed: {error}");
                ExitCode::FAILURE
            }
        },
        Command::List {
            search,
            difficulty,
            platform,
            sort,
        } => {
            let fetched = controller.refresh().await;
            controller.set_filters(FilterState {
                search_query: search,
                difficulty,
                platform,
                sort,
            });
            print!("{}", render::render_list(&controller.view()));
            if fetched.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Platforms => {
            controller
                .refresh()
                .await
                .context("failed to fetch problems")?;
            print!("{}", render::render_platforms(controller.platforms()));
            ExitCode::SUCCESS
        }
        Command::Show { id } => {
            let problem = client
                .get_by_id(ProblemId(id))
                .await
                .with_context(|| format!("failed to load problem {id}"))?;
            print!("{}", render::render_problem(&problem));
            ExitCode::SUCCESS
        }
        Command::Add(fields) => {
            let mut draft = ProblemDraft::default();
            fields.apply(&mut draft);
            let outcome = controller.submit_create(draft).await;
            report_submit(outcome.map(|_| ()))?
        }
        Command::Edit { id, fields } => {
            let existing = client
                .get_by_id(ProblemId(id))
                .await
                .with_context(|| format!("failed to load problem {id}"))?;
            let mut draft = ProblemDraft::from_problem(&existing);
            fields.apply(&mut draft);
            let outcome = controller.submit_update(existing.id, draft).await;
            report_submit(outcome.map(|_| ()))?
        }
        Command::Delete { id, yes } => {
            controller
                .refresh()
                .await
                .context("failed to fetch problems")?;
            let pending = controller.request_delete(ProblemId(id))?;
            print!("{}", render::render_pending_deletion(pending));

            if !yes && !confirm_from_stdin()? {
                controller.cancel_delete();
                println!("Cancelled.");
                return Ok(ExitCode::SUCCESS);
            }
            match controller.confirm_delete().await {
                Ok(_) => ExitCode::SUCCESS,
                Err(error) => {
                    debug!(%error, "delete failed");
                    ExitCode::FAILURE
                }
            }
        }
    };

    print!("{}", render::render_notices(controller.notices()));
    Ok(code)
}

/// Validation problems are reported per field; other failures propagate.
fn report_submit(outcome: Result<(), ControllerError>) -> Result<ExitCode> {
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ControllerError::Validation(errors)) => {
            eprint!("{}", render::render_validation_errors(&errors));
            Ok(ExitCode::FAILURE)
        }
        Err(error) => Err(anyhow::Error::new(error).context("failed to save problem")),
    }
}

fn confirm_from_stdin() -> Result<bool> {
    print!("Delete? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
