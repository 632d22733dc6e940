use chrono::{DateTime, Utc};

use crate::models::{AdvicePriority, AdviceType, AiAdvice, BurnoutResult};

pub const LOW_INCOME_THRESHOLD: f64 = 1000.0;
pub const GOOD_INCOME_THRESHOLD: f64 = 3000.0;
pub const LOW_MOOD_THRESHOLD: f64 = 2.0;
pub const OVERLOAD_HOURS_THRESHOLD: f64 = 10.0;

/// Values every advice rule may inspect.
#[derive(Debug, Clone, Copy)]
pub struct AdviceInput {
    pub score: u8,
    pub total_income: f64,
    pub avg_mood: f64,
    pub avg_work_hours: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AdviceTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub kind: AdviceType,
    pub priority: AdvicePriority,
}

impl AdviceTemplate {
    pub fn instantiate(&self, created_at: DateTime<Utc>) -> AiAdvice {
        AiAdvice {
            id: self.id,
            title: self.title,
            message: self.message,
            kind: self.kind,
            priority: self.priority,
            created_at,
        }
    }
}

pub struct AdviceRule {
    pub applies: fn(&AdviceInput) -> bool,
    pub template: AdviceTemplate,
}

pub const RULES: [AdviceRule; 9] = [
    AdviceRule {
        applies: |input| input.score >= 75,
        template: AdviceTemplate {
            id: "burnout_critical",
            title: "Severe Burnout Risk",
            message: "Your workload and stress are at a critical level. Stop, step away from work and take immediate rest.",
            kind: AdviceType::Burnout,
            priority: AdvicePriority::Critical,
        },
    },
    AdviceRule {
        applies: |input| (50..75).contains(&input.score),
        template: AdviceTemplate {
            id: "burnout_high",
            title: "High Burnout Risk",
            message: "Your burnout risk is rising. Schedule regular breaks and protect time for recovery this week.",
            kind: AdviceType::Burnout,
            priority: AdvicePriority::High,
        },
    },
    AdviceRule {
        applies: |input| (25..50).contains(&input.score),
        template: AdviceTemplate {
            id: "burnout_moderate",
            title: "Moderate Burnout",
            message: "Some strain is showing. Monitor your stress and keep an eye on how many hours you take on.",
            kind: AdviceType::Burnout,
            priority: AdvicePriority::Medium,
        },
    },
    AdviceRule {
        applies: |input| input.score < 25,
        template: AdviceTemplate {
            id: "burnout_low",
            title: "Great Balance",
            message: "You're managing work and rest well. Keep it up and keep logging to stay on track.",
            kind: AdviceType::Wellness,
            priority: AdvicePriority::Low,
        },
    },
    AdviceRule {
        applies: |input| input.total_income < LOW_INCOME_THRESHOLD,
        template: AdviceTemplate {
            id: "income_low",
            title: "Low Income",
            message: "Your logged income is low. Review your rates and look for steadier clients or extra projects.",
            kind: AdviceType::Income,
            priority: AdvicePriority::High,
        },
    },
    AdviceRule {
        applies: |input| {
            input.total_income >= LOW_INCOME_THRESHOLD
                && input.total_income < GOOD_INCOME_THRESHOLD
        },
        template: AdviceTemplate {
            id: "income_mid",
            title: "Stable Income",
            message: "Your income is steady. Build a savings buffer before adding more workload.",
            kind: AdviceType::Income,
            priority: AdvicePriority::Medium,
        },
    },
    AdviceRule {
        // Negated so non-finite totals still land on exactly one income rule.
        applies: |input| !(input.total_income < GOOD_INCOME_THRESHOLD),
        template: AdviceTemplate {
            id: "income_good",
            title: "Healthy Income",
            message: "Your income is in good shape. Use the margin to take time off without financial pressure.",
            kind: AdviceType::Income,
            priority: AdvicePriority::Low,
        },
    },
    AdviceRule {
        applies: |input| input.avg_mood <= LOW_MOOD_THRESHOLD,
        template: AdviceTemplate {
            id: "mood_low",
            title: "Low Mood",
            message: "Your mood has been consistently low. Reach out to someone you trust and make space for things you enjoy.",
            kind: AdviceType::Wellness,
            priority: AdvicePriority::High,
        },
    },
    AdviceRule {
        applies: |input| input.avg_work_hours >= OVERLOAD_HOURS_THRESHOLD,
        template: AdviceTemplate {
            id: "work_overload",
            title: "Work Overload",
            message: "You're averaging ten or more hours a day. Cut back, delegate or renegotiate deadlines.",
            kind: AdviceType::Productivity,
            priority: AdvicePriority::High,
        },
    },
];

pub const GET_STARTED: AdviceTemplate = AdviceTemplate {
    id: "get_started",
    title: "Get Started",
    message: "Log your mood and work hours to receive personalized burnout insights.",
    kind: AdviceType::General,
    priority: AdvicePriority::Low,
};

pub fn generate_advice(
    burnout: &BurnoutResult,
    total_income: f64,
    avg_mood: f64,
    avg_work_hours: f64,
) -> Vec<AiAdvice> {
    generate_advice_at(burnout, total_income, avg_mood, avg_work_hours, Utc::now())
}

/// Evaluates every rule in table order and keeps the ones that apply.
pub fn generate_advice_at(
    burnout: &BurnoutResult,
    total_income: f64,
    avg_mood: f64,
    avg_work_hours: f64,
    created_at: DateTime<Utc>,
) -> Vec<AiAdvice> {
    let input = AdviceInput {
        score: burnout.score,
        total_income,
        avg_mood,
        avg_work_hours,
    };

    RULES
        .iter()
        .filter(|rule| (rule.applies)(&input))
        .map(|rule| rule.template.instantiate(created_at))
        .collect()
}

pub fn get_started_advice() -> AiAdvice {
    GET_STARTED.instantiate(Utc::now())
}
