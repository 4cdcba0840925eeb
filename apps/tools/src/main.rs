use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::{domain::Problem, protocol::ProblemDraft, validation::validate_draft};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/algotrack.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a handful of sample problems
    Seed {
        /// Seed even when the database already holds problems
        #[arg(long)]
        force: bool,
    },
    /// Write every problem as a JSON array
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn sample_drafts() -> Vec<ProblemDraft> {
    let draft = |title: &str, difficulty: &str, platform: &str, url: &str| ProblemDraft {
        title: title.to_string(),
        difficulty: difficulty.to_string(),
        platform: platform.to_string(),
        url: Some(url.to_string()),
        ..ProblemDraft::default()
    };

    let mut two_sum = draft(
        "Two Sum",
        "Easy",
        "LeetCode",
        "https://leetcode.com/problems/two-sum/",
    );
    two_sum.description = Some("Find two indices whose values add up to a target.".into());
    two_sum.last_reviewed = Some("2024-01-05".into());
    two_sum.next_review = Some("2024-01-12".into());
    two_sum.review_count = 2;
    two_sum.notes = Some("Store complements in a hash map.".into());

    let mut merge = draft(
        "Merge Intervals",
        "Medium",
        "LeetCode",
        "https://leetcode.com/problems/merge-intervals/",
    );
    merge.next_review = Some("2024-01-08".into());

    let mut graph = draft(
        "Shortest Routes I",
        "Hard",
        "CSES",
        "https://cses.fi/problemset/task/1671",
    );
    graph.notes = Some("Dijkstra with a binary heap.".into());
    graph.review_count = 1;

    vec![two_sum, merge, graph]
}

async fn seed(storage: &Storage, force: bool) -> Result<Vec<Problem>> {
    let existing = storage.count_problems().await?;
    if existing > 0 && !force {
        bail!("database already holds {existing} problem(s); pass --force to seed anyway");
    }

    let mut created = Vec::new();
    for draft in sample_drafts() {
        validate_draft(&draft).with_context(|| format!("sample '{}' is invalid", draft.title))?;
        created.push(storage.create_problem(&draft).await?);
    }
    Ok(created)
}

async fn export(storage: &Storage) -> Result<String> {
    let problems = storage.list_problems().await?;
    Ok(serde_json::to_string_pretty(&problems)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;

    match cli.command {
        Command::Seed { force } => {
            let created = seed(&storage, force).await?;
            for problem in &created {
                println!("created problem_id={} title={}", problem.id, problem.title);
            }
            info!(count = created.len(), "seeded sample problems");
        }
        Command::Export { output } => {
            let json = export(&storage).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "exported problems");
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
