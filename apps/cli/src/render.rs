use std::fmt::Write as _;

use client_core::{
    controller::{ListView, PendingDeletion},
    engine::PlatformFilter,
    notice::NoticeBoard,
};
use shared::{
    domain::{parse_review_date, Problem},
    validation::ValidationErrors,
};

const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";
const NOT_SET: &str = "Not set";

/// `Jan 5, 2024` for stored dates, `Not set` when absent. Text that is not a
/// recognizable date is shown as stored.
pub fn format_date(raw: Option<&str>) -> String {
    match raw {
        None => NOT_SET.to_string(),
        Some(raw) if raw.trim().is_empty() => NOT_SET.to_string(),
        Some(raw) => parse_review_date(raw)
            .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 problem".to_string()
    } else {
        format!("{count} problems")
    }
}

pub fn render_problem(problem: &Problem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {} [{}]", problem.id, problem.title, problem.difficulty);
    if let Some(description) = &problem.description {
        let _ = writeln!(out, "    {description}");
    }
    let _ = writeln!(out, "    Platform: {}", problem.platform);
    if let Some(url) = &problem.url {
        let _ = writeln!(out, "    Link: {url}");
    }
    let _ = writeln!(
        out,
        "    Reviews: {} | Last Reviewed: {} | Next Review: {}",
        problem.review_count(),
        format_date(problem.last_reviewed.as_deref()),
        format_date(problem.next_review.as_deref()),
    );
    if let Some(notes) = &problem.notes {
        let _ = writeln!(out, "    Notes: {notes}");
    }
    out
}

pub fn render_list(view: &ListView<'_>) -> String {
    match view {
        ListView::Loading => "Loading problems...\n".to_string(),
        ListView::Failed { message } => format!(
            "Oops! Something went wrong\n{message}\nCheck that the server is running, then retry.\n"
        ),
        ListView::Empty => format!(
            "{}\nNo problems yet! Add your first one with `algotrack add`.\n",
            count_label(0)
        ),
        ListView::NoMatches { total } => format!(
            "{}\nNo problems match the current filters.\n",
            count_label(*total)
        ),
        ListView::Items { visible, total } => {
            let mut out = if visible.len() == *total {
                count_label(*total)
            } else {
                format!("{} of {}", visible.len(), count_label(*total))
            };
            out.push('\n');
            for problem in visible {
                out.push('\n');
                out.push_str(&render_problem(problem));
            }
            out
        }
    }
}

pub fn render_platforms(platforms: &[PlatformFilter]) -> String {
    platforms
        .iter()
        .map(|platform| format!("{platform}\n"))
        .collect()
}

pub fn render_pending_deletion(pending: &PendingDeletion) -> String {
    format!("{}\n{}\n", pending.title(), pending.prompt())
}

pub fn render_validation_errors(errors: &ValidationErrors) -> String {
    let fields: Vec<String> = errors.fields().map(|field| field.to_string()).collect();
    let mut out = format!("Please fix the following fields: {}\n", fields.join(", "));
    for error in &errors.0 {
        let _ = writeln!(out, "  {}: {}", error.field, error.message);
    }
    out
}

pub fn render_notices(notices: &NoticeBoard) -> String {
    notices
        .active()
        .map(|notice| format!("{notice}\n"))
        .collect()
}
