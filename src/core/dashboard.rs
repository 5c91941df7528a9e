//! Dashboard roll-ups and staleness classification.
//!
//! Pure functions of the collections and a reference date, so the dashboard
//! can be rendered (and tested) without any network or UI dependency.

use crate::collections::Collections;
use crate::models::{MeterType, Reading};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Days since last reading at or below which a meter counts as recent.
const RECENT_DAYS: i64 = 7;
/// Days since last reading at or below which a meter is merely a warning.
const WARNING_DAYS: i64 = 30;

/// Three-tier freshness label derived from days since a meter's last reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Last reading within the past 7 days
    Recent,
    /// Last reading within the past 30 days
    Warning,
    /// Last reading more than 30 days ago, or no reading at all
    Stale,
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Recent => "recent",
            Self::Warning => "warning",
            Self::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// Classifies a meter's freshness from its last reading date.
///
/// A meter with no reading yet is stale. Dates in the future (clock skew)
/// count as recent.
#[must_use]
pub fn classify_staleness(last_reading_date: Option<NaiveDate>, today: NaiveDate) -> Staleness {
    let Some(last) = last_reading_date else {
        return Staleness::Stale;
    };

    let days = (today - last).num_days();
    if days <= RECENT_DAYS {
        Staleness::Recent
    } else if days <= WARNING_DAYS {
        Staleness::Warning
    } else {
        Staleness::Stale
    }
}

/// Summary statistics rolled up from the collections for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Number of meters
    pub total_meters: usize,
    /// Number of readings across all meters
    pub total_readings: usize,
    /// Sum of every meter's running consumption total
    pub total_consumption: f64,
    /// Sum of consumption over readings dated in the reference month
    pub month_consumption: f64,
}

/// One row of the per-meter dashboard list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterOverview {
    /// Meter id
    pub meter_id: String,
    /// Display name
    pub name: String,
    /// Household the meter belongs to
    pub home_name: String,
    /// Utility kind
    pub meter_type: MeterType,
    /// Running consumption total
    pub total_consumption: f64,
    /// Freshness classification against the reference date
    pub staleness: Staleness,
}

/// Rolls the collections up into summary statistics.
///
/// `today` is the reference date: "this month" means the calendar month
/// containing it.
#[must_use]
pub fn summarize(collections: &Collections, today: NaiveDate) -> DashboardSummary {
    let total_consumption = collections.meters().map(|m| m.total_consumption).sum();
    let month_consumption = collections
        .readings()
        .filter(|r| r.date.year() == today.year() && r.date.month() == today.month())
        .map(|r| r.consumption)
        .sum();

    DashboardSummary {
        total_meters: collections.meter_count(),
        total_readings: collections.reading_count(),
        total_consumption,
        month_consumption,
    }
}

/// Consumption summed over one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyConsumption {
    /// The day
    pub date: NaiveDate,
    /// Summed consumption of every reading dated that day
    pub consumption: f64,
}

/// Consumption summed over one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyConsumption {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Summed consumption of every reading dated in that month
    pub consumption: f64,
}

/// Consumption summed over one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyConsumption {
    /// Calendar year
    pub year: i32,
    /// Summed consumption of every reading dated in that year
    pub consumption: f64,
}

fn history_readings<'a>(
    collections: &'a Collections,
    meter_id: Option<&'a str>,
) -> impl Iterator<Item = &'a Reading> {
    collections
        .readings()
        .filter(move |r| meter_id.is_none_or(|id| r.meter_id == id))
}

/// Per-day consumption history, oldest day first. `meter_id` restricts the
/// roll-up to one meter; `None` aggregates across all of them.
#[must_use]
pub fn daily_history(collections: &Collections, meter_id: Option<&str>) -> Vec<DailyConsumption> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for reading in history_readings(collections, meter_id) {
        *by_day.entry(reading.date).or_insert(0.0) += reading.consumption;
    }
    by_day
        .into_iter()
        .map(|(date, consumption)| DailyConsumption { date, consumption })
        .collect()
}

/// Per-month consumption history, oldest month first.
#[must_use]
pub fn monthly_history(
    collections: &Collections,
    meter_id: Option<&str>,
) -> Vec<MonthlyConsumption> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for reading in history_readings(collections, meter_id) {
        *by_month
            .entry((reading.date.year(), reading.date.month()))
            .or_insert(0.0) += reading.consumption;
    }
    by_month
        .into_iter()
        .map(|((year, month), consumption)| MonthlyConsumption {
            year,
            month,
            consumption,
        })
        .collect()
}

/// Per-year consumption history, oldest year first.
#[must_use]
pub fn yearly_history(collections: &Collections, meter_id: Option<&str>) -> Vec<YearlyConsumption> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for reading in history_readings(collections, meter_id) {
        *by_year.entry(reading.date.year()).or_insert(0.0) += reading.consumption;
    }
    by_year
        .into_iter()
        .map(|(year, consumption)| YearlyConsumption { year, consumption })
        .collect()
}

/// Builds the per-meter dashboard rows, sorted by home then meter name.
#[must_use]
pub fn meter_overviews(collections: &Collections, today: NaiveDate) -> Vec<MeterOverview> {
    let mut overviews: Vec<MeterOverview> = collections
        .meters()
        .map(|m| MeterOverview {
            meter_id: m.id.clone(),
            name: m.name.clone(),
            home_name: m.home_name.clone(),
            meter_type: m.meter_type,
            total_consumption: m.total_consumption,
            staleness: classify_staleness(m.last_reading_date, today),
        })
        .collect();
    overviews.sort_by(|a, b| (&a.home_name, &a.name).cmp(&(&b.home_name, &b.name)));
    overviews
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::collections::Collections;
    use crate::test_utils::{sample_meter, sample_reading};
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_staleness_thresholds() {
        let today = date(2024, 5, 20);

        assert_eq!(classify_staleness(Some(today), today), Staleness::Recent);
        assert_eq!(
            classify_staleness(Some(today - Duration::days(7)), today),
            Staleness::Recent
        );
        assert_eq!(
            classify_staleness(Some(today - Duration::days(10)), today),
            Staleness::Warning
        );
        assert_eq!(
            classify_staleness(Some(today - Duration::days(30)), today),
            Staleness::Warning
        );
        assert_eq!(
            classify_staleness(Some(today - Duration::days(40)), today),
            Staleness::Stale
        );
    }

    #[test]
    fn test_staleness_without_reading_is_stale() {
        assert_eq!(classify_staleness(None, date(2024, 5, 20)), Staleness::Stale);
    }

    #[test]
    fn test_staleness_future_date_is_recent() {
        let today = date(2024, 5, 20);
        assert_eq!(
            classify_staleness(Some(today + Duration::days(2)), today),
            Staleness::Recent
        );
    }

    #[test]
    fn test_summary_totals_from_meters_not_readings() {
        let mut collections = Collections::new();
        let mut m1 = sample_meter("m1", "Main");
        m1.total_consumption = 35.0;
        let mut m2 = sample_meter("m2", "Garage");
        m2.total_consumption = 12.5;
        collections.upsert_meter(m1);
        collections.upsert_meter(m2);

        // Total consumption comes from meter totals, independent of how many
        // readings happen to be loaded.
        let summary = summarize(&collections, date(2024, 5, 20));
        assert_eq!(summary.total_meters, 2);
        assert_eq!(summary.total_readings, 0);
        assert_eq!(summary.total_consumption, 47.5);
    }

    #[test]
    fn test_month_consumption_filters_by_calendar_month() {
        let mut collections = Collections::new();
        collections.upsert_meter(sample_meter("m1", "Main"));

        let mut in_month = sample_reading("r1", "m1", 120.0, 2024, 5, 3);
        in_month.consumption = 20.0;
        let mut also_in_month = sample_reading("r2", "m1", 130.0, 2024, 5, 28);
        also_in_month.consumption = 10.0;
        let mut previous_month = sample_reading("r3", "m1", 100.0, 2024, 4, 30);
        previous_month.consumption = 50.0;
        let mut previous_year = sample_reading("r4", "m1", 90.0, 2023, 5, 10);
        previous_year.consumption = 5.0;

        for r in [in_month, also_in_month, previous_month, previous_year] {
            collections.upsert_reading(r).unwrap();
        }

        let summary = summarize(&collections, date(2024, 5, 20));
        assert_eq!(summary.month_consumption, 30.0);
        assert_eq!(summary.total_readings, 4);
    }

    #[test]
    fn test_empty_collections_summary_is_zeroed() {
        let summary = summarize(&Collections::new(), date(2024, 5, 20));
        assert_eq!(
            summary,
            DashboardSummary {
                total_meters: 0,
                total_readings: 0,
                total_consumption: 0.0,
                month_consumption: 0.0,
            }
        );
    }

    fn history_collections() -> Collections {
        let mut collections = Collections::new();
        collections.upsert_meter(sample_meter("m1", "Main"));
        collections.upsert_meter(sample_meter("m2", "Garage"));

        // Two readings on the same day across different meters, one later in
        // the same month, one in the next year.
        let mut a = sample_reading("r1", "m1", 120.0, 2024, 5, 3);
        a.consumption = 20.0;
        let mut b = sample_reading("r2", "m2", 45.0, 2024, 5, 3);
        b.consumption = 5.0;
        let mut c = sample_reading("r3", "m1", 130.0, 2024, 5, 28);
        c.consumption = 10.0;
        let mut d = sample_reading("r4", "m1", 170.0, 2025, 1, 4);
        d.consumption = 40.0;
        for r in [a, b, c, d] {
            collections.upsert_reading(r).unwrap();
        }
        collections
    }

    #[test]
    fn test_daily_history_groups_and_sorts_by_day() {
        let collections = history_collections();

        let daily = daily_history(&collections, None);
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].date, date(2024, 5, 3));
        assert_eq!(daily[0].consumption, 25.0);
        assert_eq!(daily[1].date, date(2024, 5, 28));
        assert_eq!(daily[1].consumption, 10.0);
        assert_eq!(daily[2].date, date(2025, 1, 4));
    }

    #[test]
    fn test_monthly_history_groups_by_calendar_month() {
        let collections = history_collections();

        let monthly = monthly_history(&collections, None);
        assert_eq!(monthly.len(), 2);
        assert_eq!((monthly[0].year, monthly[0].month), (2024, 5));
        assert_eq!(monthly[0].consumption, 35.0);
        assert_eq!((monthly[1].year, monthly[1].month), (2025, 1));
        assert_eq!(monthly[1].consumption, 40.0);
    }

    #[test]
    fn test_yearly_history_groups_by_year() {
        let collections = history_collections();

        let yearly = yearly_history(&collections, None);
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[0].year, 2024);
        assert_eq!(yearly[0].consumption, 35.0);
        assert_eq!(yearly[1].year, 2025);
        assert_eq!(yearly[1].consumption, 40.0);
    }

    #[test]
    fn test_history_filters_by_meter() {
        let collections = history_collections();

        let daily = daily_history(&collections, Some("m2"));
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].consumption, 5.0);

        let yearly = yearly_history(&collections, Some("m1"));
        assert_eq!(yearly[0].consumption, 30.0);
    }

    #[test]
    fn test_history_of_empty_collections_is_empty() {
        let collections = Collections::new();
        assert!(daily_history(&collections, None).is_empty());
        assert!(monthly_history(&collections, None).is_empty());
        assert!(yearly_history(&collections, None).is_empty());
    }

    #[test]
    fn test_meter_overviews_sorted_and_classified() {
        let today = date(2024, 5, 20);
        let mut collections = Collections::new();

        let mut fresh = sample_meter("m1", "Kitchen");
        fresh.last_reading_date = Some(today - Duration::days(2));
        let mut old = sample_meter("m2", "Basement");
        old.last_reading_date = Some(today - Duration::days(60));
        collections.upsert_meter(fresh);
        collections.upsert_meter(old);

        let overviews = meter_overviews(&collections, today);
        assert_eq!(overviews.len(), 2);
        assert_eq!(overviews[0].name, "Basement");
        assert_eq!(overviews[0].staleness, Staleness::Stale);
        assert_eq!(overviews[1].name, "Kitchen");
        assert_eq!(overviews[1].staleness, Staleness::Recent);
    }
}
