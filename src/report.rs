use std::fmt::Write;

use chrono::NaiveDate;

use crate::aggregate;
use crate::models::{Assessment, UserLogs};

pub fn build_report(
    user_id: &str,
    since_date: Option<NaiveDate>,
    logs: &UserLogs,
    assessment: &Assessment,
) -> String {
    let mut output = String::new();
    let window = match since_date {
        Some(date) => format!("logs since {date}"),
        None => "all logs".to_string(),
    };

    let _ = writeln!(output, "# Burnout Report");
    let _ = writeln!(output, "Generated for {user_id} ({window})");
    let _ = writeln!(output);

    let burnout = assessment.burnout();
    let _ = writeln!(output, "## Burnout");
    let _ = writeln!(output, "- Level: {} ({})", burnout.level, burnout.color);
    let _ = writeln!(output, "- Score: {}/100", burnout.score);
    let _ = writeln!(output, "- {}", burnout.description);

    if let Assessment::Scored { snapshot, .. } = assessment {
        let metrics = &snapshot.metrics;
        let _ = writeln!(
            output,
            "- Averages: mood {:.1}, stress {:.1}, sleep {:.1}h, work {:.1}h/day",
            metrics.avg_mood, metrics.avg_stress, metrics.avg_sleep, metrics.avg_work_hours
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Advice");
    for item in assessment.advice() {
        let _ = writeln!(
            output,
            "- **{}** [{}]: {}",
            item.title,
            item.priority.as_str(),
            item.message
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Work by Client");
    let clients = aggregate::hours_by_client(&logs.work);
    if clients.is_empty() {
        let _ = writeln!(output, "No work logged for this window.");
    } else {
        for summary in clients.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.1}h across {} entries",
                summary.client, summary.hours, summary.entry_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Income by Type");
    let income = aggregate::income_by_type(&logs.income);
    if income.is_empty() {
        let _ = writeln!(output, "No income logged for this window.");
    } else {
        let total: f64 = income.iter().map(|summary| summary.total).sum();
        for summary in income.iter() {
            let _ = writeln!(
                output,
                "- {}: ${:.2} across {} entries",
                summary.income_type, summary.total, summary.entry_count
            );
        }
        let _ = writeln!(output, "- Total: ${total:.2}");
    }

    let mut notes: Vec<_> = logs
        .moods
        .iter()
        .filter(|entry| entry.notes.as_deref().is_some_and(|note| !note.trim().is_empty()))
        .collect();
    notes.sort_by(|a, b| {
        b.entry_date
            .cmp(&a.entry_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Mood Notes");
    if notes.is_empty() {
        let _ = writeln!(output, "No mood notes recorded for this window.");
    } else {
        for entry in notes.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} (mood {}, stress {}, sleep {:.1}h): {}",
                entry.entry_date,
                entry.mood,
                entry.stress,
                entry.sleep,
                entry.notes.as_deref().unwrap_or_default()
            );
        }
    }

    output
}

/// Lists each log set newest first, at most `limit` entries per set. Entries on
/// the same day are ordered by when they were logged.
pub fn build_history(logs: &UserLogs, limit: usize) -> String {
    let mut output = String::new();

    let mut moods: Vec<_> = logs.moods.iter().collect();
    moods.sort_by(|a, b| (b.entry_date, b.created_at).cmp(&(a.entry_date, a.created_at)));
    let _ = writeln!(output, "Mood check-ins:");
    for entry in moods.iter().take(limit) {
        let _ = writeln!(
            output,
            "- {} mood {} stress {} sleep {:.1}h {} (logged {}) [{}]",
            entry.entry_date,
            entry.mood,
            entry.stress,
            entry.sleep,
            entry.notes.as_deref().unwrap_or_default(),
            entry.created_at.format(LOGGED_AT_FORMAT),
            entry.id
        );
    }

    let mut work: Vec<_> = logs.work.iter().collect();
    work.sort_by(|a, b| (b.entry_date, b.created_at).cmp(&(a.entry_date, a.created_at)));
    let _ = writeln!(output, "Work:");
    for entry in work.iter().take(limit) {
        let _ = writeln!(
            output,
            "- {} {:.1}h {} / {} (logged {}) [{}]",
            entry.entry_date,
            entry.hours,
            entry.client,
            entry.project,
            entry.created_at.format(LOGGED_AT_FORMAT),
            entry.id
        );
    }

    let mut income: Vec<_> = logs.income.iter().collect();
    income.sort_by(|a, b| (b.entry_date, b.created_at).cmp(&(a.entry_date, a.created_at)));
    let _ = writeln!(output, "Income:");
    for entry in income.iter().take(limit) {
        let _ = writeln!(
            output,
            "- {} ${:.2} {} from {} (logged {}) [{}]",
            entry.entry_date,
            entry.amount,
            entry.income_type,
            entry.client,
            entry.created_at.format(LOGGED_AT_FORMAT),
            entry.id
        );
    }

    output
}

const LOGGED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";
