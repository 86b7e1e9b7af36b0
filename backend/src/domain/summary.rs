//! Weekly summary aggregation.
//!
//! The window covers the seven days ending at `end`: an entry stamped exactly
//! `end - 7 days` is left out and one stamped exactly `end` is counted.

use chrono::{DateTime, Duration, Utc};
use shared::{DrivingReport, DrivingWeeklySummary, HealthLog, HealthLogType, HealthWeeklySummary};

pub const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SummaryWindow {
    /// `None` when `end` is too close to the start of representable time
    pub fn ending_at(end: DateTime<Utc>) -> Option<Self> {
        let start = end.checked_sub_signed(Duration::days(WINDOW_DAYS))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp > self.start && *timestamp <= self.end
    }
}

pub fn summarize_health(logs: &[HealthLog], window: &SummaryWindow) -> HealthWeeklySummary {
    let mut summary = HealthWeeklySummary::default();

    for log in logs.iter().filter(|l| window.contains(&l.timestamp)) {
        summary.total_entries += 1;
        match log.log_type {
            HealthLogType::Meal => summary.meal_count += 1,
            HealthLogType::Sleep => summary.sleep_count += 1,
            HealthLogType::Mood => {
                summary.mood_count += 1;
                summary.mood_entries.push(log.clone());
            }
            HealthLogType::Symptom => summary.symptom_count += 1,
            HealthLogType::Medicine => summary.medicine_count += 1,
        }
    }

    summary
        .mood_entries
        .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
    summary
}

pub fn summarize_driving(reports: &[DrivingReport], window: &SummaryWindow) -> DrivingWeeklySummary {
    let trips: Vec<&DrivingReport> = reports.iter().filter(|r| window.contains(&r.trip_start)).collect();
    if trips.is_empty() {
        return DrivingWeeklySummary::default();
    }

    let score_total: u64 = trips.iter().map(|r| u64::from(r.score)).sum();
    // f64::round rounds half away from zero
    let avg_score = (score_total as f64 / trips.len() as f64).round() as u32;

    DrivingWeeklySummary {
        total_trips: trips.len() as u32,
        avg_score,
        total_distance: trips.iter().map(|r| r.distance_miles).sum(),
        max_speed: trips.iter().map(|r| r.max_speed_mph).fold(0.0, f64::max),
        hard_braking_events: trips.iter().map(|r| r.hard_braking).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap()
    }

    fn log(id: &str, log_type: HealthLogType, timestamp: DateTime<Utc>) -> HealthLog {
        HealthLog {
            id: id.to_string(),
            child_id: "child::1".to_string(),
            log_type,
            value: "value".to_string(),
            notes: None,
            timestamp,
        }
    }

    fn trip(score: u32, distance_miles: f64, max_speed_mph: f64, trip_start: DateTime<Utc>) -> DrivingReport {
        DrivingReport {
            id: format!("driving::{}", score),
            child_id: "child::1".to_string(),
            trip_start,
            trip_end: None,
            start_location: "A".to_string(),
            end_location: "B".to_string(),
            score,
            distance_miles,
            max_speed_mph,
            hard_braking: 2,
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let window = SummaryWindow::ending_at(end()).unwrap();
        assert_eq!(summarize_health(&[], &window), HealthWeeklySummary::default());

        let driving = summarize_driving(&[], &window);
        assert_eq!(driving.total_trips, 0);
        assert_eq!(driving.avg_score, 0);
        assert_eq!(driving.total_distance, 0.0);
        assert_eq!(driving.max_speed, 0.0);
    }

    #[test]
    fn test_window_excludes_start_and_includes_end() {
        let window = SummaryWindow::ending_at(end()).unwrap();
        assert!(!window.contains(&(end() - Duration::days(7))));
        assert!(window.contains(&(end() - Duration::days(7) + Duration::milliseconds(1))));
        assert!(window.contains(&end()));
        assert!(!window.contains(&(end() + Duration::milliseconds(1))));
    }

    #[test]
    fn test_window_rejects_underflowing_end() {
        assert_eq!(SummaryWindow::ending_at(DateTime::<Utc>::MIN_UTC), None);
        assert!(SummaryWindow::ending_at(DateTime::<Utc>::MIN_UTC + Duration::days(7)).is_some());
    }

    #[test]
    fn test_health_counts_by_type() {
        let window = SummaryWindow::ending_at(end()).unwrap();
        let logs = vec![
            log("h1", HealthLogType::Meal, end() - Duration::days(1)),
            log("h2", HealthLogType::Meal, end() - Duration::days(2)),
            log("h3", HealthLogType::Sleep, end() - Duration::days(3)),
            log("h4", HealthLogType::Mood, end() - Duration::days(4)),
            log("h5", HealthLogType::Mood, end() - Duration::hours(1)),
            log("h6", HealthLogType::Symptom, end()),
            log("h7", HealthLogType::Medicine, end() - Duration::days(8)),
        ];

        let summary = summarize_health(&logs, &window);
        assert_eq!(summary.total_entries, 6);
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.sleep_count, 1);
        assert_eq!(summary.mood_count, 2);
        assert_eq!(summary.symptom_count, 1);
        assert_eq!(summary.medicine_count, 0);
        let mood_ids: Vec<&str> = summary.mood_entries.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(mood_ids, vec!["h5", "h4"]);
    }

    #[test]
    fn test_driving_average_rounds_to_nearest() {
        let window = SummaryWindow::ending_at(end()).unwrap();
        let day = |n| end() - Duration::days(n);
        let trips = vec![trip(70, 3.5, 45.0, day(1)), trip(90, 10.0, 62.5, day(2)), trip(100, 1.5, 30.0, day(3))];

        let summary = summarize_driving(&trips, &window);
        assert_eq!(summary.total_trips, 3);
        assert_eq!(summary.avg_score, 87);
        assert_eq!(summary.total_distance, 15.0);
        assert_eq!(summary.max_speed, 62.5);
        assert_eq!(summary.hard_braking_events, 6);
    }

    #[test]
    fn test_driving_average_half_rounds_up() {
        let window = SummaryWindow::ending_at(end()).unwrap();
        let trips = vec![trip(80, 1.0, 20.0, end()), trip(81, 1.0, 20.0, end())];
        assert_eq!(summarize_driving(&trips, &window).avg_score, 81);
    }
}
