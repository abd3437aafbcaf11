//! Weekly aggregation and longer-window insights over daily check-ins
//!
//! All functions are pure; callers pass rows ordered oldest first.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use shared::checkin::{DailyCheckin, EmotionCount, InsightsSummary, Trend, WeeklySummary};

/// Minimum score delta (last minus first) for an up/down trend
pub const TREND_THRESHOLD: f64 = 0.6;
/// Fewer data points than this yields `Trend::Na`
pub const TREND_MIN_POINTS: usize = 3;
/// Days in a weekly window, today included
pub const WEEK_DAYS: u64 = 7;

/// Number of distinct days with a check-in
pub fn completed_days(rows: &[DailyCheckin]) -> usize {
    rows.iter()
        .map(|r| r.check_date)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Emotion counts in first-seen order
fn emotion_counts(rows: &[DailyCheckin]) -> Vec<EmotionCount> {
    let mut counts: Vec<EmotionCount> = Vec::new();
    for row in rows {
        match counts.iter_mut().find(|c| c.emotion == row.emotion) {
            Some(entry) => entry.count += 1,
            None => counts.push(EmotionCount {
                emotion: row.emotion.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// Most frequent emotion; ties go to the one seen first
pub fn top_emotion(rows: &[DailyCheckin]) -> Option<String> {
    let mut best: Option<EmotionCount> = None;
    for entry in emotion_counts(rows) {
        if best.as_ref().is_none_or(|b| entry.count > b.count) {
            best = Some(entry);
        }
    }
    best.map(|b| b.emotion)
}

/// Direction of a score series from its first and last values
pub fn trend(scores: &[f64]) -> Trend {
    if scores.len() < TREND_MIN_POINTS {
        return Trend::Na;
    }
    let (Some(first), Some(last)) = (scores.first(), scores.last()) else {
        return Trend::Na;
    };
    let delta = last - first;
    if delta >= TREND_THRESHOLD {
        Trend::Up
    } else if delta <= -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Flat
    }
}

fn average(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

fn scores(rows: &[DailyCheckin]) -> Vec<f64> {
    rows.iter().map(|r| f64::from(r.mood_score)).collect()
}

/// `[from, to]` window of `days` calendar days ending at `to`
pub fn window(to: NaiveDate, days: u64) -> (NaiveDate, NaiveDate) {
    let from = to
        .checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN);
    (from, to)
}

fn within(rows: &[DailyCheckin], from: NaiveDate, to: NaiveDate) -> Vec<DailyCheckin> {
    rows.iter()
        .filter(|r| r.check_date >= from && r.check_date <= to)
        .cloned()
        .collect()
}

/// Weekly summary over the rows falling inside `[week_start, week_end]`
pub fn summarize_week(
    rows: &[DailyCheckin],
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> WeeklySummary {
    let week = within(rows, week_start, week_end);
    let scores = scores(&week);
    WeeklySummary {
        week_start,
        week_end,
        completed_days: completed_days(&week),
        top_emotion: top_emotion(&week),
        trend: trend(&scores),
        average_score: average(&scores),
    }
}

/// Consecutive check-in days ending today, or yesterday if today is still open
pub fn current_streak(rows: &[DailyCheckin], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.check_date).collect();
    let mut day = if dates.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Insights over the last `days` days ending `today`
pub fn summarize_insights(rows: &[DailyCheckin], today: NaiveDate, days: u32) -> InsightsSummary {
    let (from, to) = window(today, u64::from(days));
    let span = within(rows, from, to);
    let scores = scores(&span);

    let mut emotions = emotion_counts(&span);
    // Stable sort keeps first-seen order among equal counts
    emotions.sort_by(|a, b| b.count.cmp(&a.count));

    InsightsSummary {
        days,
        from,
        to,
        total_checkins: span.len(),
        average_score: average(&scores),
        trend: trend(&scores),
        emotions,
        current_streak: current_streak(&span, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn checkin(d: u32, score: i16, emotion: &str) -> DailyCheckin {
        DailyCheckin {
            check_date: day(d),
            mood_score: score,
            emotion: emotion.to_string(),
            note: None,
            updated_at: 0,
        }
    }

    #[test]
    fn top_emotion_picks_most_frequent() {
        let rows = vec![
            checkin(1, 3, "Calm"),
            checkin(2, 3, "Calm"),
            checkin(3, 4, "Happy"),
        ];
        assert_eq!(top_emotion(&rows).as_deref(), Some("Calm"));
    }

    #[test]
    fn top_emotion_tie_goes_to_first_seen() {
        let rows = vec![
            checkin(1, 3, "Anxious"),
            checkin(2, 3, "Calm"),
            checkin(3, 4, "Calm"),
            checkin(4, 4, "Anxious"),
        ];
        assert_eq!(top_emotion(&rows).as_deref(), Some("Anxious"));
        assert_eq!(top_emotion(&[]), None);
    }

    #[test]
    fn top_emotion_is_case_sensitive() {
        let rows = vec![
            checkin(1, 3, "calm"),
            checkin(2, 3, "Calm"),
            checkin(3, 3, "Calm"),
        ];
        assert_eq!(top_emotion(&rows).as_deref(), Some("Calm"));
    }

    #[test]
    fn trend_thresholds() {
        assert_eq!(trend(&[2.0, 3.0, 1.0, 4.0, 2.0, 3.0, 3.0]), Trend::Up);
        assert_eq!(trend(&[3.0, 3.0, 3.6]), Trend::Up);
        assert_eq!(trend(&[4.0, 2.0, 3.4]), Trend::Down);
        assert_eq!(trend(&[3.0, 5.0, 3.5]), Trend::Flat);
        assert_eq!(trend(&[3.0, 1.0, 2.5]), Trend::Flat);
    }

    #[test]
    fn trend_needs_three_points() {
        assert_eq!(trend(&[]), Trend::Na);
        assert_eq!(trend(&[1.0, 5.0]), Trend::Na);
    }

    #[test]
    fn completed_days_counts_distinct_dates() {
        let rows = vec![checkin(1, 3, "Calm"), checkin(1, 4, "Calm"), checkin(3, 2, "Sad")];
        assert_eq!(completed_days(&rows), 2);
    }

    #[test]
    fn weekly_summary_ignores_rows_outside_window() {
        let rows = vec![
            checkin(1, 1, "Sad"),
            checkin(4, 2, "Tired"),
            checkin(6, 3, "Calm"),
            checkin(8, 4, "Calm"),
            checkin(10, 5, "Happy"),
        ];
        let (start, end) = window(day(10), WEEK_DAYS);
        assert_eq!(start, day(4));

        let summary = summarize_week(&rows, start, end);
        assert_eq!(summary.completed_days, 4);
        assert_eq!(summary.top_emotion.as_deref(), Some("Calm"));
        assert_eq!(summary.trend, Trend::Up);
        assert_eq!(summary.average_score, Some(3.5));
    }

    #[test]
    fn empty_week() {
        let summary = summarize_week(&[], day(1), day(7));
        assert_eq!(summary.completed_days, 0);
        assert_eq!(summary.top_emotion, None);
        assert_eq!(summary.trend, Trend::Na);
        assert_eq!(summary.average_score, None);
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let rows = vec![
            checkin(5, 3, "Calm"),
            checkin(7, 3, "Calm"),
            checkin(8, 3, "Calm"),
            checkin(9, 3, "Calm"),
        ];
        assert_eq!(current_streak(&rows, day(9)), 3);
        assert_eq!(current_streak(&rows, day(10)), 3);
        assert_eq!(current_streak(&rows, day(11)), 0);
    }

    #[test]
    fn insights_sort_emotions_by_count() {
        let rows = vec![
            checkin(1, 2, "Sad"),
            checkin(2, 3, "Calm"),
            checkin(3, 3, "Tired"),
            checkin(4, 4, "Calm"),
            checkin(5, 4, "Tired"),
        ];
        let insights = summarize_insights(&rows, day(5), 30);
        assert_eq!(insights.total_checkins, 5);
        assert_eq!(insights.to, day(5));
        assert_eq!(
            insights
                .emotions
                .iter()
                .map(|e| (e.emotion.as_str(), e.count))
                .collect::<Vec<_>>(),
            vec![("Calm", 2), ("Tired", 2), ("Sad", 1)]
        );
        assert_eq!(insights.trend, Trend::Up);
        assert_eq!(insights.current_streak, 5);
        assert_eq!(insights.average_score, Some(3.2));
    }
}
