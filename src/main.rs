use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod advice;
mod aggregate;
mod burnout;
mod config;
mod db;
mod loading;
mod models;
mod report;

use crate::config::Config;
use crate::loading::LoadingState;
use crate::models::{Assessment, IncomeType, LogKind, UserLogs};

#[derive(Parser)]
#[command(name = "burnfree")]
#[command(about = "Burnout tracker for freelancers: log mood, work and income, get a score and advice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo user's logs
    Seed,
    /// Record a mood check-in
    LogMood {
        #[arg(long)]
        user: String,
        /// Mood from 1 (awful) to 10 (great)
        #[arg(long, value_parser = clap::value_parser!(i16).range(1..=10))]
        mood: i16,
        /// Stress from 1 (zen) to 10 (extreme)
        #[arg(long, value_parser = clap::value_parser!(i16).range(1..=10))]
        stress: i16,
        /// Hours slept
        #[arg(long, default_value_t = 8.0)]
        sleep: f64,
        #[arg(long)]
        notes: Option<String>,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record hours worked for a client
    LogWork {
        #[arg(long)]
        user: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record an income payment
    LogIncome {
        #[arg(long)]
        user: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        amount: f64,
        #[arg(long = "type", value_enum, default_value_t = IncomeType::Freelance)]
        income_type: IncomeType,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rewrite an existing mood check-in
    EditMood {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = clap::value_parser!(i16).range(1..=10))]
        mood: i16,
        #[arg(long, value_parser = clap::value_parser!(i16).range(1..=10))]
        stress: i16,
        #[arg(long, default_value_t = 8.0)]
        sleep: f64,
        #[arg(long)]
        notes: Option<String>,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rewrite an existing work entry
    EditWork {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rewrite an existing income entry
    EditIncome {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        user: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        amount: f64,
        #[arg(long = "type", value_enum, default_value_t = IncomeType::Freelance)]
        income_type: IncomeType,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete one of a user's entries
    Delete {
        #[arg(long, value_enum)]
        kind: LogKind,
        #[arg(long)]
        user: String,
        #[arg(long)]
        id: Uuid,
    },
    /// Import logs of one kind from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: LogKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// List a user's logs, newest first
    History {
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_SINCE_DAYS))]
        since_days: Option<i64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Compute the burnout score
    Score {
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_SINCE_DAYS))]
        since_days: Option<i64>,
        /// Print the full assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show advice derived from the burnout score
    Advice {
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_SINCE_DAYS))]
        since_days: Option<i64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        user: String,
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_SINCE_DAYS))]
        since_days: Option<i64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// Upper bound for `--since-days`, about a century.
const MAX_SINCE_DAYS: i64 = 36_500;

fn cutoff_date(since_days: Option<i64>) -> Option<NaiveDate> {
    since_days.map(|days| Utc::now().date_naive() - Duration::days(days.clamp(1, MAX_SINCE_DAYS)))
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// Fetches one consistent snapshot of the user's logs and assesses it.
async fn load_assessment(
    pool: &PgPool,
    loading: &LoadingState,
    user: &str,
    since_date: Option<NaiveDate>,
) -> anyhow::Result<(UserLogs, Assessment)> {
    let _guard = loading.begin();
    debug!(user, loading = loading.is_loading(), "loading snapshot");
    let logs = db::fetch_logs(pool, user, since_date).await?;
    let assessment = aggregate::assess(aggregate::aggregate_logs(&logs));
    Ok((logs, assessment))
}

fn print_assessment(assessment: &Assessment) {
    let burnout = assessment.burnout();
    match assessment {
        Assessment::NoData { .. } => println!("No data yet. {}", burnout.description),
        Assessment::Scored { snapshot, .. } => {
            println!(
                "Burnout score {} ({}): {}",
                burnout.score, burnout.level, burnout.description
            );
            println!(
                "Averages: mood {:.1}, stress {:.1}, sleep {:.1}h, work {:.1}h/day; income ${:.2}",
                snapshot.metrics.avg_mood,
                snapshot.metrics.avg_stress,
                snapshot.metrics.avg_sleep,
                snapshot.metrics.avg_work_hours,
                snapshot.total_income
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    debug!(max_connections = config.max_connections, "connected to Postgres");

    let loading = LoadingState::with_observer(|active| debug!(active, "fetch in progress"));

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted for {}.", db::SEED_USER);
        }
        Commands::LogMood {
            user,
            mood,
            stress,
            sleep,
            notes,
            date,
        } => {
            let row = db::MoodRow {
                user_id: user,
                mood,
                stress,
                sleep,
                notes,
                date: today_or(date),
                source_key: None,
            };
            if let Some(entry) = db::insert_mood(&pool, &row).await? {
                info!(id = %entry.id, user_id = %entry.user_id, "mood logged");
                println!("Logged mood {} / stress {} ({}).", entry.mood, entry.stress, entry.id);
            }
        }
        Commands::LogWork {
            user,
            client,
            project,
            hours,
            date,
        } => {
            let row = db::WorkRow {
                user_id: user,
                client,
                project,
                hours,
                date: today_or(date),
                source_key: None,
            };
            if let Some(entry) = db::insert_work(&pool, &row).await? {
                info!(id = %entry.id, user_id = %entry.user_id, "work logged");
                println!("Logged {:.1}h for {} ({}).", entry.hours, entry.client, entry.id);
            }
        }
        Commands::LogIncome {
            user,
            client,
            amount,
            income_type,
            date,
        } => {
            let row = db::IncomeRow {
                user_id: user,
                client,
                amount,
                income_type,
                date: today_or(date),
                source_key: None,
            };
            if let Some(entry) = db::insert_income(&pool, &row).await? {
                info!(id = %entry.id, user_id = %entry.user_id, "income logged");
                println!(
                    "Logged ${:.2} {} income from {} ({}).",
                    entry.amount, entry.income_type, entry.client, entry.id
                );
            }
        }
        Commands::EditMood {
            id,
            user,
            mood,
            stress,
            sleep,
            notes,
            date,
        } => {
            let row = db::MoodRow {
                user_id: user,
                mood,
                stress,
                sleep,
                notes,
                date: today_or(date),
                source_key: None,
            };
            match db::update_mood(&pool, id, &row).await? {
                Some(entry) => {
                    info!(id = %entry.id, user_id = %entry.user_id, "mood updated");
                    println!("Updated mood {} / stress {} ({}).", entry.mood, entry.stress, entry.id);
                }
                None => println!("No mood entry {id} found for {}.", row.user_id),
            }
        }
        Commands::EditWork {
            id,
            user,
            client,
            project,
            hours,
            date,
        } => {
            let row = db::WorkRow {
                user_id: user,
                client,
                project,
                hours,
                date: today_or(date),
                source_key: None,
            };
            match db::update_work(&pool, id, &row).await? {
                Some(entry) => {
                    info!(id = %entry.id, user_id = %entry.user_id, "work updated");
                    println!("Updated {:.1}h for {} ({}).", entry.hours, entry.client, entry.id);
                }
                None => println!("No work entry {id} found for {}.", row.user_id),
            }
        }
        Commands::EditIncome {
            id,
            user,
            client,
            amount,
            income_type,
            date,
        } => {
            let row = db::IncomeRow {
                user_id: user,
                client,
                amount,
                income_type,
                date: today_or(date),
                source_key: None,
            };
            match db::update_income(&pool, id, &row).await? {
                Some(entry) => {
                    info!(id = %entry.id, user_id = %entry.user_id, "income updated");
                    println!(
                        "Updated ${:.2} {} income from {} ({}).",
                        entry.amount, entry.income_type, entry.client, entry.id
                    );
                }
                None => println!("No income entry {id} found for {}.", row.user_id),
            }
        }
        Commands::Delete { kind, user, id } => {
            if db::delete_entry(&pool, kind, &user, id).await? {
                println!("Deleted {} entry {id}.", kind.label());
            } else {
                println!("No {} entry {id} found for {user}.", kind.label());
            }
        }
        Commands::Import { kind, csv } => {
            let inserted = db::import_csv(&pool, kind, &csv).await?;
            println!("Inserted {inserted} {} logs from {}.", kind.label(), csv.display());
        }
        Commands::History {
            user,
            since_days,
            limit,
        } => {
            let logs = {
                let _guard = loading.begin();
                db::fetch_logs(&pool, &user, cutoff_date(since_days)).await?
            };

            print!("{}", report::build_history(&logs, limit));
        }
        Commands::Score {
            user,
            since_days,
            json,
        } => {
            let (_, assessment) =
                load_assessment(&pool, &loading, &user, cutoff_date(since_days)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                print_assessment(&assessment);
            }
        }
        Commands::Advice {
            user,
            since_days,
            limit,
        } => {
            let (_, assessment) =
                load_assessment(&pool, &loading, &user, cutoff_date(since_days)).await?;
            print_assessment(&assessment);
            let advice = assessment.advice();
            for item in advice.iter().take(limit.unwrap_or(advice.len())) {
                println!("- [{}] {}: {}", item.priority.as_str(), item.title, item.message);
            }
        }
        Commands::Report {
            user,
            since_days,
            out,
        } => {
            let since_date = cutoff_date(since_days);
            let (logs, assessment) = load_assessment(&pool, &loading, &user, since_date).await?;
            let report = report::build_report(&user, since_date, &logs, &assessment);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_date_respects_since_days() {
        let cutoff = cutoff_date(Some(14));
        let expected = Utc::now().date_naive() - Duration::days(14);
        assert_eq!(cutoff, Some(expected));
        assert_eq!(cutoff_date(None), None);
    }

    #[test]
    fn cutoff_date_never_goes_below_one_day() {
        let expected = Utc::now().date_naive() - Duration::days(1);
        assert_eq!(cutoff_date(Some(0)), Some(expected));
    }

    #[test]
    fn cutoff_date_caps_huge_windows() {
        let expected = Utc::now().date_naive() - Duration::days(MAX_SINCE_DAYS);
        assert_eq!(cutoff_date(Some(i64::MAX)), Some(expected));
        assert_eq!(cutoff_date(Some(100_000_000)), Some(expected));
    }

    #[test]
    fn cli_rejects_since_days_outside_range() {
        for value in ["100000000", "0", "-3"] {
            let parsed = Cli::try_parse_from([
                "burnfree", "score", "--user", "avery", "--since-days", value,
            ]);
            assert!(parsed.is_err(), "--since-days {value} should be rejected");
        }

        let cli = Cli::try_parse_from([
            "burnfree", "report", "--user", "avery", "--since-days", "36500",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Report {
                since_days: Some(36_500),
                ..
            }
        ));
    }

    #[test]
    fn cli_parses_edit_commands() {
        let id = "6f1c2a4e-9d3b-4c1e-8a7f-2b5d9e0c4a11";

        let cli = Cli::try_parse_from([
            "burnfree", "edit-mood", "--id", id, "--user", "avery", "--mood", "7", "--stress",
            "3", "--sleep", "7.5", "--date", "2026-02-03",
        ])
        .unwrap();
        match cli.command {
            Commands::EditMood {
                id: parsed,
                mood,
                stress,
                sleep,
                date,
                ..
            } => {
                assert_eq!(parsed.to_string(), id);
                assert_eq!((mood, stress), (7, 3));
                assert_eq!(sleep, 7.5);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 3));
            }
            _ => panic!("expected edit-mood"),
        }

        let cli = Cli::try_parse_from([
            "burnfree", "edit-work", "--id", id, "--user", "avery", "--client", "Acme",
            "--project", "Audit", "--hours", "6",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::EditWork { date: None, .. }));

        let cli = Cli::try_parse_from([
            "burnfree", "edit-income", "--id", id, "--user", "avery", "--client", "Acme",
            "--amount", "900", "--type", "salary",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::EditIncome {
                income_type: IncomeType::Salary,
                ..
            }
        ));
    }

    #[test]
    fn cli_edit_requires_id_and_valid_scale() {
        let missing_id = Cli::try_parse_from([
            "burnfree", "edit-mood", "--user", "avery", "--mood", "7", "--stress", "3",
        ]);
        assert!(missing_id.is_err());

        let bad_mood = Cli::try_parse_from([
            "burnfree", "edit-mood", "--id", "6f1c2a4e-9d3b-4c1e-8a7f-2b5d9e0c4a11", "--user",
            "avery", "--mood", "0", "--stress", "3",
        ]);
        assert!(bad_mood.is_err());
    }

    #[test]
    fn cli_parses_mood_and_rejects_out_of_range() {
        let cli = Cli::try_parse_from([
            "burnfree", "log-mood", "--user", "avery", "--mood", "6", "--stress", "4",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::LogMood { mood: 6, stress: 4, .. }));

        let err = Cli::try_parse_from([
            "burnfree", "log-mood", "--user", "avery", "--mood", "11", "--stress", "4",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn cli_parses_income_type() {
        let cli = Cli::try_parse_from([
            "burnfree", "log-income", "--user", "avery", "--client", "Acme", "--amount", "250",
            "--type", "investment",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::LogIncome {
                income_type: IncomeType::Investment,
                ..
            }
        ));
    }
}
