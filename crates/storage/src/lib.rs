use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{Problem, ProblemId},
    protocol::ProblemDraft,
};

macro_rules! problem_columns {
    () => {
        "id, title, description, difficulty, platform, url, \
         last_reviewed, next_review, review_count, notes"
    };
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_problems(&self) -> Result<Vec<Problem>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            problem_columns!(),
            " FROM problems ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list problems")?;
        rows.iter().map(problem_from_row).collect()
    }

    pub async fn get_problem(&self, id: ProblemId) -> Result<Option<Problem>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            problem_columns!(),
            " FROM problems WHERE id = ?"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load problem {id}"))?;
        row.as_ref().map(problem_from_row).transpose()
    }

    pub async fn create_problem(&self, draft: &ProblemDraft) -> Result<Problem> {
        let row = sqlx::query(concat!(
            "INSERT INTO problems
                (title, description, difficulty, platform, url,
                 last_reviewed, next_review, review_count, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING ",
            problem_columns!()
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.difficulty)
        .bind(&draft.platform)
        .bind(&draft.url)
        .bind(&draft.last_reviewed)
        .bind(&draft.next_review)
        .bind(draft.review_count)
        .bind(&draft.notes)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert problem")?;
        problem_from_row(&row)
    }

    /// Replaces every mutable field of an existing problem. Returns `None` for unknown ids.
    pub async fn update_problem(
        &self,
        id: ProblemId,
        draft: &ProblemDraft,
    ) -> Result<Option<Problem>> {
        let row = sqlx::query(concat!(
            "UPDATE problems
             SET title = ?, description = ?, difficulty = ?, platform = ?, url = ?,
                 last_reviewed = ?, next_review = ?, review_count = ?, notes = ?,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = ?
             RETURNING ",
            problem_columns!()
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.difficulty)
        .bind(&draft.platform)
        .bind(&draft.url)
        .bind(&draft.last_reviewed)
        .bind(&draft.next_review)
        .bind(draft.review_count)
        .bind(&draft.notes)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update problem {id}"))?;
        row.as_ref().map(problem_from_row).transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_problem(&self, id: ProblemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM problems WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete problem {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_problems(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM problems")
            .fetch_one(&self.pool)
            .await
            .context("failed to count problems")?;
        Ok(count)
    }
}

fn problem_from_row(row: &SqliteRow) -> Result<Problem> {
    Ok(Problem {
        id: ProblemId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        difficulty: row.try_get("difficulty")?,
        platform: row.try_get("platform")?,
        url: row.try_get("url")?,
        last_reviewed: row.try_get("last_reviewed")?,
        next_review: row.try_get("next_review")?,
        review_count: Some(row.try_get("review_count")?),
        notes: row.try_get("notes")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
