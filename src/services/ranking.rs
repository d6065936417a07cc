// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking engine.
//!
//! Turns a snapshot of the activity log into per-user totals, per-activity
//! scores and a leaderboard. Everything here is a pure function of its input:
//! callers fetch the records from the store and pass them in.
//!
//! Floating-point sums depend on the order of their terms, so every group is
//! folded in ascending record ID order. That makes the results identical for
//! any permutation of the input.

use crate::error::{AppError, Result};
use crate::models::{
    ActivityRecord, ActivityType, ActivityTypeTotals, RankingEntry, UserAggregate, UserSummary,
};
use std::collections::BTreeMap;

/// Group records by user name and total their distance and duration.
///
/// The result is sorted by name.
pub fn aggregate_by_name(records: &[ActivityRecord]) -> Vec<UserAggregate> {
    group_by_name(records)
        .into_iter()
        .map(|(name, group)| {
            let mut totals = UserAggregate::new(name);
            for record in group {
                totals.add(record);
            }
            totals
        })
        .collect()
}

/// Score a single activity: `round(distance / duration, 2) * 100`.
///
/// Computed as `round(distance / duration * 100)` so that scores come out as
/// whole numbers. Exact halves round away from zero (12.5 becomes 13).
/// A zero duration has no defined speed, and a duration so small that the
/// score overflows has no usable one; both yield
/// [`AppError::DivisionUndefined`].
pub fn score(record: &ActivityRecord) -> Result<f64> {
    if record.duration == 0.0 {
        return Err(AppError::DivisionUndefined { id: record.id });
    }
    let score = (record.distance / record.duration * 100.0).round();
    if !score.is_finite() {
        return Err(AppError::DivisionUndefined { id: record.id });
    }
    Ok(score)
}

/// Build the leaderboard, best first.
///
/// Each user's score is the mean of their activity scores. Activities with
/// an undefined score are left out of the mean, and a user with no scorable
/// activities is left off the board entirely. Ties share the best rank and
/// the following rank is skipped (80, 80, 50 ranks as 1, 1, 3); tied users
/// are listed by name.
pub fn rank(records: &[ActivityRecord]) -> Vec<RankingEntry> {
    let mut skipped = 0usize;
    let mut entries: Vec<RankingEntry> = group_by_name(records)
        .into_iter()
        .filter_map(|(name, group)| {
            let scores: Vec<f64> = group
                .into_iter()
                .filter_map(|record| match score(record) {
                    Ok(s) => Some(s),
                    Err(err) => {
                        tracing::debug!(id = record.id, name, error = %err, "Skipping activity");
                        skipped += 1;
                        None
                    }
                })
                .collect();

            if scores.is_empty() {
                return None;
            }

            Some(RankingEntry {
                name: name.to_string(),
                score: mean(&scores),
                rank: 0,
                scored_activities: scores.len() as u32,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    assign_competition_ranks(&mut entries);

    tracing::debug!(
        activities = records.len(),
        skipped,
        ranked_users = entries.len(),
        "Ranking computed"
    );

    entries
}

/// Totals per activity type, one row per type in [`ActivityType::ALL`] order.
///
/// Types without any activity are included with zero totals.
pub fn totals_by_activity_type(records: &[ActivityRecord]) -> Vec<ActivityTypeTotals> {
    let mut totals: Vec<ActivityTypeTotals> = ActivityType::ALL
        .into_iter()
        .map(ActivityTypeTotals::empty)
        .collect();

    for record in sorted_by_id(records.iter()) {
        if let Some(row) = totals
            .iter_mut()
            .find(|t| t.activity_type == record.activity_type)
        {
            row.add(record);
        }
    }

    totals
}

/// Dashboard view for one user, or `None` if the name has never been logged.
///
/// The ranking entry is taken from the leaderboard over all `records`, so the
/// rank is the user's global position.
pub fn summarize_user(name: &str, records: &[ActivityRecord]) -> Option<UserSummary> {
    let mut activities: Vec<ActivityRecord> =
        records.iter().filter(|r| r.name == name).cloned().collect();
    if activities.is_empty() {
        return None;
    }

    let totals = aggregate_by_name(&activities).into_iter().next()?;
    let ranking = rank(records).into_iter().find(|entry| entry.name == name);
    let by_activity_type = totals_by_activity_type(&activities);
    sort_newest_first(&mut activities);

    Some(UserSummary {
        totals,
        ranking,
        by_activity_type,
        activities,
    })
}

/// Order records for display: most recent date first, then most recently logged.
pub fn sort_newest_first(records: &mut [ActivityRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}

/// Mean of finite, non-negative scores that is itself always finite.
///
/// Large scores can overflow the plain sum; those are averaged term by term
/// instead.
fn mean(scores: &[f64]) -> f64 {
    let n = scores.len() as f64;
    let sum: f64 = scores.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        scores.iter().map(|s| s / n).sum::<f64>().min(f64::MAX)
    }
}

/// Standard competition ranking over entries already sorted by descending score.
fn assign_competition_ranks(entries: &mut [RankingEntry]) {
    let mut previous: Option<f64> = None;
    let mut rank = 0;
    for (position, entry) in entries.iter_mut().enumerate() {
        if previous != Some(entry.score) {
            rank = position as u32 + 1;
            previous = Some(entry.score);
        }
        entry.rank = rank;
    }
}

fn group_by_name(records: &[ActivityRecord]) -> BTreeMap<&str, Vec<&ActivityRecord>> {
    let mut groups: BTreeMap<&str, Vec<&ActivityRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.name.as_str()).or_default().push(record);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.id);
    }
    groups
}

fn sorted_by_id<'a>(records: impl Iterator<Item = &'a ActivityRecord>) -> Vec<&'a ActivityRecord> {
    let mut sorted: Vec<&ActivityRecord> = records.collect();
    sorted.sort_by_key(|r| r.id);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_record(id: i64, name: &str, duration: f64, distance: f64) -> ActivityRecord {
        make_typed_record(id, name, ActivityType::Running, duration, distance)
    }

    fn make_typed_record(
        id: i64,
        name: &str,
        activity_type: ActivityType,
        duration: f64,
        distance: f64,
    ) -> ActivityRecord {
        ActivityRecord {
            id,
            name: name.to_string(),
            activity_type,
            duration,
            distance,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(id as u64),
        }
    }

    #[test]
    fn test_score_examples() {
        let a1 = make_record(1, "A", 50.0, 10.0);
        let a2 = make_record(2, "A", 25.0, 0.0);

        assert_eq!(score(&a1).unwrap(), 20.0);
        assert_eq!(score(&a2).unwrap(), 0.0);

        let ranking = rank(&[a1, a2]);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].score, 10.0);
        assert_eq!(ranking[0].scored_activities, 2);
    }

    #[test]
    fn test_score_rounds_to_two_decimals_of_speed() {
        // 7 / 30 = 0.2333.. -> 0.23 -> 23
        assert_eq!(score(&make_record(1, "A", 30.0, 7.0)).unwrap(), 23.0);
        // 2 / 3 = 0.666.. -> 0.67 -> 67
        assert_eq!(score(&make_record(2, "A", 3.0, 2.0)).unwrap(), 67.0);
    }

    #[test]
    fn test_score_rounds_half_away_from_zero() {
        // 1 / 8 = 0.125 exactly; the half goes up, not to even.
        assert_eq!(score(&make_record(1, "A", 8.0, 1.0)).unwrap(), 13.0);
        // 3 / 8 = 0.375 -> 38
        assert_eq!(score(&make_record(2, "A", 8.0, 3.0)).unwrap(), 38.0);
    }

    #[test]
    fn test_tiny_duration_is_undefined_and_skipped() {
        let tiny = make_record(1, "A", 1e-310, 1.0);
        assert!(matches!(
            score(&tiny),
            Err(AppError::DivisionUndefined { id: 1 })
        ));

        let records = vec![tiny, make_record(2, "B", 10.0, 2.0)];
        let ranking = rank(&records);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].name, "B");
        assert!(ranking.iter().all(|e| e.score.is_finite()));
    }

    #[test]
    fn test_mean_of_huge_scores_stays_finite() {
        // Each score is 1e308, finite, but their sum is not.
        let records = vec![
            make_record(1, "A", 1e-301, 100_000.0),
            make_record(2, "A", 1e-301, 100_000.0),
        ];
        let single = score(&records[0]).unwrap();
        assert!(single.is_finite());

        let ranking = rank(&records);
        assert_eq!(ranking.len(), 1);
        assert!(ranking[0].score.is_finite());
        assert_eq!(ranking[0].score, single);
    }

    #[test]
    fn test_zero_duration_is_undefined() {
        let record = make_record(7, "A", 0.0, 5.0);
        assert!(matches!(
            score(&record),
            Err(AppError::DivisionUndefined { id: 7 })
        ));
    }

    #[test]
    fn test_rank_skips_zero_duration_records() {
        let records = vec![
            make_record(1, "A", 50.0, 40.0), // 80
            make_record(2, "A", 0.0, 10.0),  // skipped
            make_record(3, "B", 0.0, 3.0),   // skipped, B has nothing else
        ];

        let ranking = rank(&records);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].name, "A");
        assert_eq!(ranking[0].score, 80.0);
        assert_eq!(ranking[0].scored_activities, 1);
        assert!(ranking.iter().all(|e| e.score.is_finite()));
    }

    #[test]
    fn test_rank_competition_ties() {
        let records = vec![
            make_record(1, "C", 100.0, 50.0), // 50
            make_record(2, "B", 100.0, 80.0), // 80
            make_record(3, "A", 50.0, 40.0),  // 80
        ];

        let ranking = rank(&records);
        let summary: Vec<(&str, u32, f64)> = ranking
            .iter()
            .map(|e| (e.name.as_str(), e.rank, e.score))
            .collect();
        assert_eq!(summary, vec![("A", 1, 80.0), ("B", 1, 80.0), ("C", 3, 50.0)]);
    }

    #[test]
    fn test_rank_distinct_scores_are_dense() {
        let records = vec![
            make_record(1, "A", 10.0, 1.0), // 10
            make_record(2, "B", 10.0, 3.0), // 30
            make_record(3, "C", 10.0, 2.0), // 20
        ];

        let ranks: Vec<(String, u32)> = rank(&records)
            .into_iter()
            .map(|e| (e.name, e.rank))
            .collect();
        assert_eq!(
            ranks,
            vec![
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("A".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[]).is_empty());
        assert!(aggregate_by_name(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_by_name_totals() {
        let records = vec![
            make_record(1, "A", 30.0, 5.0),
            make_record(2, "B", 45.0, 12.0),
            make_record(3, "A", 60.0, 10.5),
        ];

        let totals = aggregate_by_name(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "A");
        assert_eq!(totals[0].total_duration, 90.0);
        assert_eq!(totals[0].total_distance, 15.5);
        assert_eq!(totals[0].activity_count, 2);
        assert_eq!(totals[1].name, "B");
        assert_eq!(totals[1].activity_count, 1);
    }

    #[test]
    fn test_aggregate_is_permutation_invariant() {
        let records = vec![
            make_record(1, "A", 0.1, 0.1),
            make_record(2, "A", 0.2, 0.7),
            make_record(3, "B", 12.3, 4.56),
            make_record(4, "A", 0.3, 1e-9),
            make_record(5, "B", 7.77, 0.01),
            make_record(6, "A", 1e10, 3.3),
        ];
        let expected = aggregate_by_name(&records);

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(aggregate_by_name(&reversed), expected);

        let mut rotated = records.clone();
        rotated.rotate_left(2);
        assert_eq!(aggregate_by_name(&rotated), expected);

        let mut swapped = records;
        swapped.swap(0, 5);
        swapped.swap(1, 3);
        assert_eq!(aggregate_by_name(&swapped), expected);
    }

    #[test]
    fn test_totals_by_activity_type() {
        let records = vec![
            make_typed_record(1, "A", ActivityType::Cycling, 60.0, 20.0),
            make_typed_record(2, "B", ActivityType::Cycling, 30.0, 10.0),
            make_typed_record(3, "A", ActivityType::Walking, 15.0, 1.5),
        ];

        let totals = totals_by_activity_type(&records);
        let types: Vec<ActivityType> = totals.iter().map(|t| t.activity_type).collect();
        assert_eq!(types, ActivityType::ALL.to_vec());

        assert_eq!(totals[0].activity_count, 0); // Running
        assert_eq!(totals[1].activity_count, 2);
        assert_eq!(totals[1].total_distance, 30.0);
        assert_eq!(totals[1].total_duration, 90.0);
        assert_eq!(totals[2].activity_count, 0); // Swimming
        assert_eq!(totals[3].total_distance, 1.5);
    }

    #[test]
    fn test_summarize_user_uses_global_rank() {
        let records = vec![
            make_record(1, "A", 10.0, 9.0), // 90
            make_record(2, "B", 10.0, 5.0), // 50
            make_record(3, "B", 10.0, 7.0), // 70
        ];

        let summary = summarize_user("B", &records).unwrap();
        assert_eq!(summary.totals.activity_count, 2);
        assert_eq!(summary.totals.total_distance, 12.0);

        let ranking = summary.ranking.unwrap();
        assert_eq!(ranking.rank, 2);
        assert_eq!(ranking.score, 60.0);

        // Newest first
        let ids: Vec<i64> = summary.activities.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_summarize_user_without_scorable_activity() {
        let records = vec![make_record(1, "A", 0.0, 1.0)];
        let summary = summarize_user("A", &records).unwrap();
        assert!(summary.ranking.is_none());
        assert_eq!(summary.totals.activity_count, 1);
    }

    #[test]
    fn test_summarize_unknown_user() {
        let records = vec![make_record(1, "A", 10.0, 1.0)];
        assert!(summarize_user("Z", &records).is_none());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            make_record(1, "A", 10.0, 1.0),
            make_record(3, "A", 10.0, 1.0),
            make_record(2, "A", 10.0, 1.0),
        ];
        records[2].date = records[1].date; // same day as id 3

        sort_newest_first(&mut records);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
