use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unknown income type '{0}'")]
    IncomeType(String),
}

#[derive(Debug, Clone)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: String,
    pub mood: i16,
    pub stress: i16,
    pub sleep: f64,
    pub notes: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WorkEntry {
    pub id: Uuid,
    pub user_id: String,
    pub client: String,
    pub project: String,
    pub hours: f64,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    Salary,
    Freelance,
    Business,
    Investment,
    Other,
}

impl IncomeType {
    pub fn as_str(self) -> &'static str {
        match self {
            IncomeType::Salary => "salary",
            IncomeType::Freelance => "freelance",
            IncomeType::Business => "business",
            IncomeType::Investment => "investment",
            IncomeType::Other => "other",
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeType {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "salary" => Ok(IncomeType::Salary),
            "freelance" => Ok(IncomeType::Freelance),
            "business" => Ok(IncomeType::Business),
            "investment" => Ok(IncomeType::Investment),
            "other" => Ok(IncomeType::Other),
            _ => Err(ParseError::IncomeType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub user_id: String,
    pub client: String,
    pub amount: f64,
    pub income_type: IncomeType,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Which of the three user-scoped log tables a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogKind {
    Mood,
    Work,
    Income,
}

impl LogKind {
    pub fn table(self) -> &'static str {
        match self {
            LogKind::Mood => "burnfree.mood_logs",
            LogKind::Work => "burnfree.work_logs",
            LogKind::Income => "burnfree.income_logs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogKind::Mood => "mood",
            LogKind::Work => "work",
            LogKind::Income => "income",
        }
    }
}

/// Every log a user has recorded inside one read window.
#[derive(Debug, Clone, Default)]
pub struct UserLogs {
    pub moods: Vec<MoodEntry>,
    pub work: Vec<WorkEntry>,
    pub income: Vec<IncomeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BurnoutMetrics {
    pub avg_mood: f64,
    pub avg_stress: f64,
    pub avg_sleep: f64,
    pub avg_work_hours: f64,
}

impl Default for BurnoutMetrics {
    /// Neutral averages used when a log set has no entries.
    fn default() -> Self {
        Self {
            avg_mood: 5.0,
            avg_stress: 5.0,
            avg_sleep: 7.0,
            avg_work_hours: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BurnoutLevel {
    Low,
    Moderate,
    High,
    Severe,
    NoData,
}

impl BurnoutLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            BurnoutLevel::Low => "Low",
            BurnoutLevel::Moderate => "Moderate",
            BurnoutLevel::High => "High",
            BurnoutLevel::Severe => "Severe",
            BurnoutLevel::NoData => "NoData",
        }
    }
}

impl fmt::Display for BurnoutLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurnoutResult {
    pub score: u8,
    pub level: BurnoutLevel,
    pub color: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceType {
    Burnout,
    Income,
    Productivity,
    Wellness,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvicePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl AdvicePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvicePriority::Low => "low",
            AdvicePriority::Medium => "medium",
            AdvicePriority::High => "high",
            AdvicePriority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiAdvice {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    #[serde(rename = "type")]
    pub kind: AdviceType,
    pub priority: AdvicePriority,
    pub created_at: DateTime<Utc>,
}

/// Aggregated view of a user's logs, ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub metrics: BurnoutMetrics,
    pub total_income: f64,
    pub mood_count: usize,
    pub work_count: usize,
    pub income_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Assessment {
    NoData {
        burnout: BurnoutResult,
        advice: Vec<AiAdvice>,
    },
    Scored {
        snapshot: Snapshot,
        burnout: BurnoutResult,
        advice: Vec<AiAdvice>,
    },
}

impl Assessment {
    pub fn burnout(&self) -> &BurnoutResult {
        match self {
            Assessment::NoData { burnout, .. } | Assessment::Scored { burnout, .. } => burnout,
        }
    }

    pub fn advice(&self) -> &[AiAdvice] {
        match self {
            Assessment::NoData { advice, .. } | Assessment::Scored { advice, .. } => advice,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientHours {
    pub client: String,
    pub hours: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct IncomeTypeSummary {
    pub income_type: IncomeType,
    pub total: f64,
    pub entry_count: usize,
}
