use anyhow::{ensure, Context};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{IncomeEntry, IncomeType, LogKind, MoodEntry, UserLogs, WorkEntry};

#[derive(Debug, Clone, Deserialize)]
pub struct MoodRow {
    pub user_id: String,
    pub mood: i16,
    pub stress: i16,
    pub sleep: f64,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub source_key: Option<String>,
}

impl MoodRow {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.user_id.trim().is_empty(), "user_id must not be empty");
        ensure!((1..=10).contains(&self.mood), "mood must be between 1 and 10, got {}", self.mood);
        ensure!(
            (1..=10).contains(&self.stress),
            "stress must be between 1 and 10, got {}",
            self.stress
        );
        ensure!(
            (0.0..=24.0).contains(&self.sleep),
            "sleep must be between 0 and 24 hours, got {}",
            self.sleep
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkRow {
    pub user_id: String,
    pub client: String,
    pub project: String,
    pub hours: f64,
    pub date: NaiveDate,
    pub source_key: Option<String>,
}

impl WorkRow {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.user_id.trim().is_empty(), "user_id must not be empty");
        ensure!(!self.client.trim().is_empty(), "client must not be empty");
        ensure!(
            (0.0..=24.0).contains(&self.hours),
            "hours must be between 0 and 24, got {}",
            self.hours
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomeRow {
    pub user_id: String,
    pub client: String,
    pub amount: f64,
    pub income_type: IncomeType,
    pub date: NaiveDate,
    pub source_key: Option<String>,
}

impl IncomeRow {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.user_id.trim().is_empty(), "user_id must not be empty");
        ensure!(!self.client.trim().is_empty(), "client must not be empty");
        ensure!(
            self.amount.is_finite() && self.amount >= 0.0,
            "amount must be a non-negative number, got {}",
            self.amount
        );
        Ok(())
    }
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("migrations applied");
    Ok(())
}

/// Inserts a mood check-in. Returns `None` when `source_key` was already imported.
pub async fn insert_mood(pool: &PgPool, row: &MoodRow) -> anyhow::Result<Option<MoodEntry>> {
    row.validate()?;
    let id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO burnfree.mood_logs
        (id, user_id, mood, stress, sleep, notes, entry_date, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(row.mood)
    .bind(row.stress)
    .bind(row.sleep)
    .bind(&row.notes)
    .bind(row.date)
    .bind(&row.source_key)
    .fetch_optional(pool)
    .await
    .context("failed to insert mood log")?;

    Ok(inserted.map(|record| MoodEntry {
        id,
        user_id: row.user_id.clone(),
        mood: row.mood,
        stress: row.stress,
        sleep: row.sleep,
        notes: row.notes.clone(),
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

pub async fn insert_work(pool: &PgPool, row: &WorkRow) -> anyhow::Result<Option<WorkEntry>> {
    row.validate()?;
    let id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO burnfree.work_logs
        (id, user_id, client, project, hours, entry_date, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(&row.client)
    .bind(&row.project)
    .bind(row.hours)
    .bind(row.date)
    .bind(&row.source_key)
    .fetch_optional(pool)
    .await
    .context("failed to insert work log")?;

    Ok(inserted.map(|record| WorkEntry {
        id,
        user_id: row.user_id.clone(),
        client: row.client.clone(),
        project: row.project.clone(),
        hours: row.hours,
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

pub async fn insert_income(pool: &PgPool, row: &IncomeRow) -> anyhow::Result<Option<IncomeEntry>> {
    row.validate()?;
    let id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"
        INSERT INTO burnfree.income_logs
        (id, user_id, client, amount, income_type, entry_date, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(&row.client)
    .bind(row.amount)
    .bind(row.income_type.as_str())
    .bind(row.date)
    .bind(&row.source_key)
    .fetch_optional(pool)
    .await
    .context("failed to insert income log")?;

    Ok(inserted.map(|record| IncomeEntry {
        id,
        user_id: row.user_id.clone(),
        client: row.client.clone(),
        amount: row.amount,
        income_type: row.income_type,
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

/// Rewrites one of the user's mood check-ins. Returns `None` when no entry with
/// that id belongs to the user. `source_key` is never changed.
pub async fn update_mood(
    pool: &PgPool,
    id: Uuid,
    row: &MoodRow,
) -> anyhow::Result<Option<MoodEntry>> {
    row.validate()?;
    let updated = sqlx::query(
        r#"
        UPDATE burnfree.mood_logs
        SET mood = $3, stress = $4, sleep = $5, notes = $6, entry_date = $7
        WHERE id = $1 AND user_id = $2
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(row.mood)
    .bind(row.stress)
    .bind(row.sleep)
    .bind(&row.notes)
    .bind(row.date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update mood entry {id}"))?;

    Ok(updated.map(|record| MoodEntry {
        id,
        user_id: row.user_id.clone(),
        mood: row.mood,
        stress: row.stress,
        sleep: row.sleep,
        notes: row.notes.clone(),
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

pub async fn update_work(
    pool: &PgPool,
    id: Uuid,
    row: &WorkRow,
) -> anyhow::Result<Option<WorkEntry>> {
    row.validate()?;
    let updated = sqlx::query(
        r#"
        UPDATE burnfree.work_logs
        SET client = $3, project = $4, hours = $5, entry_date = $6
        WHERE id = $1 AND user_id = $2
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(&row.client)
    .bind(&row.project)
    .bind(row.hours)
    .bind(row.date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update work entry {id}"))?;

    Ok(updated.map(|record| WorkEntry {
        id,
        user_id: row.user_id.clone(),
        client: row.client.clone(),
        project: row.project.clone(),
        hours: row.hours,
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

pub async fn update_income(
    pool: &PgPool,
    id: Uuid,
    row: &IncomeRow,
) -> anyhow::Result<Option<IncomeEntry>> {
    row.validate()?;
    let updated = sqlx::query(
        r#"
        UPDATE burnfree.income_logs
        SET client = $3, amount = $4, income_type = $5, entry_date = $6
        WHERE id = $1 AND user_id = $2
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(&row.user_id)
    .bind(&row.client)
    .bind(row.amount)
    .bind(row.income_type.as_str())
    .bind(row.date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update income entry {id}"))?;

    Ok(updated.map(|record| IncomeEntry {
        id,
        user_id: row.user_id.clone(),
        client: row.client.clone(),
        amount: row.amount,
        income_type: row.income_type,
        entry_date: row.date,
        created_at: record.get::<DateTime<Utc>, _>("created_at"),
    }))
}

/// Deletes one of the user's entries. Returns whether a row was removed.
pub async fn delete_entry(
    pool: &PgPool,
    kind: LogKind,
    user_id: &str,
    id: Uuid,
) -> anyhow::Result<bool> {
    let query = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());
    let result = sqlx::query(&query)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete {} entry {id}", kind.label()))?;
    Ok(result.rows_affected() > 0)
}

/// Reads all three log sets for a user from a single repeatable-read snapshot.
pub async fn fetch_logs(
    pool: &PgPool,
    user_id: &str,
    since_date: Option<NaiveDate>,
) -> anyhow::Result<UserLogs> {
    let mut tx = pool.begin().await.context("failed to open read transaction")?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    let mood_rows = sqlx::query(
        r#"
        SELECT id, user_id, mood, stress, sleep, notes, entry_date, created_at
        FROM burnfree.mood_logs
        WHERE user_id = $1 AND ($2::date IS NULL OR entry_date >= $2)
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(since_date)
    .fetch_all(&mut *tx)
    .await
    .context("failed to fetch mood logs")?;

    let work_rows = sqlx::query(
        r#"
        SELECT id, user_id, client, project, hours, entry_date, created_at
        FROM burnfree.work_logs
        WHERE user_id = $1 AND ($2::date IS NULL OR entry_date >= $2)
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(since_date)
    .fetch_all(&mut *tx)
    .await
    .context("failed to fetch work logs")?;

    let income_rows = sqlx::query(
        r#"
        SELECT id, user_id, client, amount, income_type, entry_date, created_at
        FROM burnfree.income_logs
        WHERE user_id = $1 AND ($2::date IS NULL OR entry_date >= $2)
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(since_date)
    .fetch_all(&mut *tx)
    .await
    .context("failed to fetch income logs")?;

    tx.commit().await?;

    let mut logs = UserLogs::default();

    for row in mood_rows {
        logs.moods.push(MoodEntry {
            id: row.get("id"),
            user_id: row.get("user_id"),
            mood: row.get("mood"),
            stress: row.get("stress"),
            sleep: row.get("sleep"),
            notes: row.get("notes"),
            entry_date: row.get("entry_date"),
            created_at: row.get("created_at"),
        });
    }

    for row in work_rows {
        logs.work.push(WorkEntry {
            id: row.get("id"),
            user_id: row.get("user_id"),
            client: row.get("client"),
            project: row.get("project"),
            hours: row.get("hours"),
            entry_date: row.get("entry_date"),
            created_at: row.get("created_at"),
        });
    }

    for row in income_rows {
        let income_type: String = row.get("income_type");
        logs.income.push(IncomeEntry {
            id: row.get("id"),
            user_id: row.get("user_id"),
            client: row.get("client"),
            amount: row.get("amount"),
            income_type: income_type.parse()?,
            entry_date: row.get("entry_date"),
            created_at: row.get("created_at"),
        });
    }

    debug!(
        user_id,
        moods = logs.moods.len(),
        work = logs.work.len(),
        income = logs.income.len(),
        "logs fetched"
    );
    Ok(logs)
}

pub async fn import_csv(
    pool: &PgPool,
    kind: LogKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    // Header is line 1, so the first record sits on line 2.
    match kind {
        LogKind::Mood => {
            for (index, result) in reader.deserialize::<MoodRow>().enumerate() {
                let row = result.with_context(|| format!("bad mood row on line {}", index + 2))?;
                let added = insert_mood(pool, &row)
                    .await
                    .with_context(|| format!("mood row on line {}", index + 2))?;
                inserted += usize::from(added.is_some());
            }
        }
        LogKind::Work => {
            for (index, result) in reader.deserialize::<WorkRow>().enumerate() {
                let row = result.with_context(|| format!("bad work row on line {}", index + 2))?;
                let added = insert_work(pool, &row)
                    .await
                    .with_context(|| format!("work row on line {}", index + 2))?;
                inserted += usize::from(added.is_some());
            }
        }
        LogKind::Income => {
            for (index, result) in reader.deserialize::<IncomeRow>().enumerate() {
                let row =
                    result.with_context(|| format!("bad income row on line {}", index + 2))?;
                let added = insert_income(pool, &row)
                    .await
                    .with_context(|| format!("income row on line {}", index + 2))?;
                inserted += usize::from(added.is_some());
            }
        }
    }

    info!(kind = kind.label(), inserted, path = %csv_path.display(), "csv imported");
    Ok(inserted)
}

pub const SEED_USER: &str = "demo-freelancer";

fn seed_date(month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, month, day).context("invalid date")
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let moods = vec![
        ("seed-mood-001", 4, 8, 5.5, Some("Deadline crunch for two clients"), seed_date(2, 2)?),
        ("seed-mood-002", 6, 6, 6.5, None, seed_date(2, 3)?),
        ("seed-mood-003", 2, 10, 4.0, Some("Barely slept, invoice dispute"), seed_date(2, 4)?),
        ("seed-mood-004", 8, 4, 8.0, Some("Took the afternoon off"), seed_date(2, 6)?),
    ];

    for (source_key, mood, stress, sleep, notes, date) in moods {
        insert_mood(
            pool,
            &MoodRow {
                user_id: SEED_USER.to_string(),
                mood,
                stress,
                sleep,
                notes: notes.map(str::to_string),
                date,
                source_key: Some(source_key.to_string()),
            },
        )
        .await?;
    }

    let work = vec![
        ("seed-work-001", "Northwind", "Checkout redesign", 10.5, seed_date(2, 2)?),
        ("seed-work-002", "Northwind", "Checkout redesign", 9.0, seed_date(2, 3)?),
        ("seed-work-003", "Globex", "API migration", 12.0, seed_date(2, 4)?),
        ("seed-work-004", "Globex", "API migration", 6.0, seed_date(2, 6)?),
    ];

    for (source_key, client, project, hours, date) in work {
        insert_work(
            pool,
            &WorkRow {
                user_id: SEED_USER.to_string(),
                client: client.to_string(),
                project: project.to_string(),
                hours,
                date,
                source_key: Some(source_key.to_string()),
            },
        )
        .await?;
    }

    let income = vec![
        ("seed-income-001", "Northwind", 1200.0, IncomeType::Freelance, seed_date(2, 1)?),
        ("seed-income-002", "Globex", 650.0, IncomeType::Freelance, seed_date(2, 5)?),
        ("seed-income-003", "Index fund", 80.0, IncomeType::Investment, seed_date(2, 5)?),
    ];

    for (source_key, client, amount, income_type, date) in income {
        insert_income(
            pool,
            &IncomeRow {
                user_id: SEED_USER.to_string(),
                client: client.to_string(),
                amount,
                income_type,
                date,
                source_key: Some(source_key.to_string()),
            },
        )
        .await?;
    }

    info!(user_id = SEED_USER, "seed data ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_rows_parse_from_csv() {
        let data = "user_id,mood,stress,sleep,notes,date,source_key\n\
                    avery,6,4,7.5,felt fine,2026-02-01,row-1\n\
                    avery,3,8,5,,2026-02-02,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<MoodRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].notes.as_deref(), Some("felt fine"));
        assert_eq!(rows[0].source_key.as_deref(), Some("row-1"));
        assert_eq!(rows[1].notes, None);
        assert_eq!(rows[1].source_key, None);
        assert!(rows.iter().all(|row| row.validate().is_ok()));
    }

    #[test]
    fn income_rows_parse_type_names() {
        let data = "user_id,client,amount,income_type,date,source_key\n\
                    avery,Northwind,1200.50,freelance,2026-02-01,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<IncomeRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].income_type, IncomeType::Freelance);
        assert_eq!(rows[0].amount, 1200.5);
    }

    #[test]
    fn unknown_income_type_fails_to_parse() {
        let data = "user_id,client,amount,income_type,date,source_key\n\
                    avery,Northwind,10,lottery,2026-02-01,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let parsed: Result<Vec<IncomeRow>, _> = reader.deserialize().collect();
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let mood = MoodRow {
            user_id: "avery".to_string(),
            mood: 11,
            stress: 5,
            sleep: 7.0,
            notes: None,
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            source_key: None,
        };
        assert!(mood.validate().is_err());

        let work = WorkRow {
            user_id: "avery".to_string(),
            client: "Acme".to_string(),
            project: "Audit".to_string(),
            hours: 30.0,
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            source_key: None,
        };
        assert!(work.validate().is_err());

        let income = IncomeRow {
            user_id: "avery".to_string(),
            client: "Acme".to_string(),
            amount: -5.0,
            income_type: IncomeType::Other,
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            source_key: None,
        };
        assert!(income.validate().is_err());
    }
}
