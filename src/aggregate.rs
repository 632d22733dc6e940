use tracing::debug;

use crate::advice;
use crate::burnout;
use crate::models::{
    Assessment, BurnoutMetrics, ClientHours, IncomeEntry, IncomeType, IncomeTypeSummary,
    MoodEntry, Snapshot, UserLogs, WorkEntry,
};

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Reduces raw logs into averages and total income. Empty mood or work sets fall
/// back to the neutral defaults of [`BurnoutMetrics::default`].
pub fn aggregate(moods: &[MoodEntry], work: &[WorkEntry], income: &[IncomeEntry]) -> Snapshot {
    let defaults = BurnoutMetrics::default();

    let metrics = BurnoutMetrics {
        avg_mood: mean(moods.iter().map(|entry| f64::from(entry.mood))).unwrap_or(defaults.avg_mood),
        avg_stress: mean(moods.iter().map(|entry| f64::from(entry.stress)))
            .unwrap_or(defaults.avg_stress),
        avg_sleep: mean(moods.iter().map(|entry| entry.sleep)).unwrap_or(defaults.avg_sleep),
        avg_work_hours: mean(work.iter().map(|entry| entry.hours))
            .unwrap_or(defaults.avg_work_hours),
    };

    Snapshot {
        metrics,
        total_income: income.iter().map(|entry| entry.amount).sum(),
        mood_count: moods.len(),
        work_count: work.len(),
        income_count: income.len(),
    }
}

pub fn aggregate_logs(logs: &UserLogs) -> Snapshot {
    aggregate(&logs.moods, &logs.work, &logs.income)
}

/// Scores a snapshot and derives advice from it in one step.
///
/// A user with neither mood nor work entries gets the `NoData` sentinel and a
/// single "Get Started" item; the scorer and the rule table are not consulted.
/// Income alone is not enough to score.
pub fn assess(snapshot: Snapshot) -> Assessment {
    if snapshot.mood_count == 0 && snapshot.work_count == 0 {
        debug!(income_count = snapshot.income_count, "no mood or work logs, skipping scorer");
        return Assessment::NoData {
            burnout: burnout::no_data(),
            advice: vec![advice::get_started_advice()],
        };
    }

    let result = burnout::score(&snapshot.metrics);
    let items = advice::generate_advice(
        &result,
        snapshot.total_income,
        snapshot.metrics.avg_mood,
        snapshot.metrics.avg_work_hours,
    );
    debug!(
        score = result.score,
        level = %result.level,
        advice_count = items.len(),
        "burnout assessed"
    );

    Assessment::Scored {
        snapshot,
        burnout: result,
        advice: items,
    }
}

pub fn hours_by_client(work: &[WorkEntry]) -> Vec<ClientHours> {
    let mut map: std::collections::HashMap<String, (f64, usize)> =
        std::collections::HashMap::new();

    for entry in work {
        let slot = map.entry(entry.client.clone()).or_insert((0.0, 0));
        slot.0 += entry.hours;
        slot.1 += 1;
    }

    let mut summaries: Vec<ClientHours> = map
        .into_iter()
        .map(|(client, (hours, entry_count))| ClientHours {
            client,
            hours,
            entry_count,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.client.cmp(&b.client))
    });
    summaries
}

pub fn income_by_type(income: &[IncomeEntry]) -> Vec<IncomeTypeSummary> {
    let mut map: std::collections::HashMap<IncomeType, (f64, usize)> =
        std::collections::HashMap::new();

    for entry in income {
        let slot = map.entry(entry.income_type).or_insert((0.0, 0));
        slot.0 += entry.amount;
        slot.1 += 1;
    }

    let mut summaries: Vec<IncomeTypeSummary> = map
        .into_iter()
        .map(|(income_type, (total, entry_count))| IncomeTypeSummary {
            income_type,
            total,
            entry_count,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.income_type.as_str().cmp(b.income_type.as_str()))
    });
    summaries
}


#[cfg(test)]
mod tests {
    use super::fixtures::{income, mood, work};
    use super::*;
    use crate::models::{AdviceType, BurnoutLevel};

    #[test]
    fn averages_each_metric() {
        let moods = vec![mood(2, 9, 4.0, None), mood(4, 7, 6.0, None)];
        let work = vec![work("Acme", 10.0), work("Acme", 12.0)];
        let income = vec![income(400.0, IncomeType::Freelance), income(250.5, IncomeType::Other)];

        let snapshot = aggregate(&moods, &work, &income);
        assert_eq!(snapshot.metrics.avg_mood, 3.0);
        assert_eq!(snapshot.metrics.avg_stress, 8.0);
        assert_eq!(snapshot.metrics.avg_sleep, 5.0);
        assert_eq!(snapshot.metrics.avg_work_hours, 11.0);
        assert!((snapshot.total_income - 650.5).abs() < 1e-9);
        assert_eq!(snapshot.mood_count, 2);
        assert_eq!(snapshot.income_count, 2);
    }

    #[test]
    fn empty_sets_use_defaults() {
        let snapshot = aggregate(&[], &[], &[]);
        assert_eq!(snapshot.metrics, BurnoutMetrics::default());
        assert_eq!(snapshot.total_income, 0.0);
    }

    #[test]
    fn missing_work_falls_back_to_default_hours() {
        let snapshot = aggregate(&[mood(6, 4, 8.0, None)], &[], &[]);
        assert_eq!(snapshot.metrics.avg_work_hours, 8.0);
        assert_eq!(snapshot.metrics.avg_mood, 6.0);
    }

    #[test]
    fn no_mood_or_work_short_circuits() {
        let snapshot = aggregate(&[], &[], &[income(5000.0, IncomeType::Salary)]);
        let assessment = assess(snapshot);

        assert!(matches!(assessment, Assessment::NoData { .. }));
        assert_eq!(assessment.burnout().level, BurnoutLevel::NoData);
        assert_eq!(assessment.burnout().color, "#9CA3AF");
        assert_eq!(assessment.advice().len(), 1);
        assert_eq!(assessment.advice()[0].id, "get_started");
        assert_eq!(assessment.advice()[0].kind, AdviceType::General);
    }

    #[test]
    fn work_only_user_is_scored() {
        let snapshot = aggregate(&[], &[work("Acme", 12.0)], &[]);
        let assessment = assess(snapshot);

        // mood/stress/sleep defaults with 12h: 60 + 40 - 30 - 28 = 42
        assert_eq!(assessment.burnout().score, 42);
        assert_eq!(assessment.burnout().level, BurnoutLevel::Moderate);
        let ids: Vec<_> = assessment.advice().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec!["burnout_moderate", "income_low", "work_overload"]);
    }

    #[test]
    fn stressed_user_gets_full_advice() {
        let moods = vec![mood(2, 9, 4.0, Some("rough week")), mood(2, 9, 4.0, None)];
        let work = vec![work("Acme", 11.0)];
        let assessment = assess(aggregate(&moods, &work, &[]));

        assert_eq!(assessment.burnout().score, 99);
        assert_eq!(assessment.burnout().level, BurnoutLevel::Severe);
        let ids: Vec<_> = assessment.advice().iter().map(|item| item.id).collect();
        assert_eq!(
            ids,
            vec!["burnout_critical", "income_low", "mood_low", "work_overload"]
        );
    }

    #[test]
    fn client_hours_sorted_by_total() {
        let entries = vec![work("Acme", 3.0), work("Globex", 9.0), work("Acme", 4.5)];
        let summaries = hours_by_client(&entries);
        assert_eq!(summaries[0].client, "Globex");
        assert_eq!(summaries[1].client, "Acme");
        assert_eq!(summaries[1].hours, 7.5);
        assert_eq!(summaries[1].entry_count, 2);
    }

    #[test]
    fn income_grouped_by_type() {
        let entries = vec![
            income(1200.0, IncomeType::Freelance),
            income(300.0, IncomeType::Investment),
            income(800.0, IncomeType::Freelance),
        ];
        let summaries = income_by_type(&entries);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].income_type, IncomeType::Freelance);
        assert_eq!(summaries[0].total, 2000.0);
        assert_eq!(summaries[1].entry_count, 1);
    }
}
