//! Data model shared across the crate.
//!
//! Meters and readings are the two record kinds the backend stores per user.
//! Identifiers are opaque strings; the client generates a fresh UUID when it
//! creates a record so ids survive a round trip through sync unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of utility a meter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterType {
    /// Electricity meter (kWh)
    Electricity,
    /// Gas meter (m³)
    Gas,
    /// Water meter (m³)
    Water,
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
            Self::Water => "water",
        };
        f.write_str(s)
    }
}

/// A tracked utility measurement point within a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    /// Unique, opaque identifier
    pub id: String,
    /// Owning user identifier
    pub user_id: String,
    /// Household the meter belongs to
    pub home_name: String,
    /// Display name of the meter
    pub name: String,
    /// Utility kind
    pub meter_type: MeterType,
    /// Most recently recorded value. Monotonic non-decreasing under normal
    /// operation; a lower value is accepted on meter replacement.
    pub latest_reading: f64,
    /// Running sum of all readings' consumption, maintained incrementally
    pub total_consumption: f64,
    /// Calendar date of the last recorded reading, if any
    pub last_reading_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp, advanced on every mutation. Sync uses it
    /// to decide which side of a diverged record is authoritative.
    pub updated_at: DateTime<Utc>,
}

impl Meter {
    /// Creates a new meter with a fresh id, no readings, and zero totals.
    #[must_use]
    pub fn new(user_id: &str, home_name: &str, name: &str, meter_type: MeterType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            home_name: home_name.to_string(),
            name: name.to_string(),
            meter_type,
            latest_reading: 0.0,
            total_consumption: 0.0,
            last_reading_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single timestamped value submission for a meter.
/// Immutable after creation; deleted only as a cascade of meter deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique, opaque identifier
    pub id: String,
    /// Meter this reading belongs to; must name an existing meter
    pub meter_id: String,
    /// Recorded meter value
    pub value: f64,
    /// Calendar date the reading was taken
    pub date: NaiveDate,
    /// Delta against the meter's prior latest reading, floored at zero
    pub consumption: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Reading {
    /// Creates a new reading with a fresh id.
    #[must_use]
    pub fn new(meter_id: &str, value: f64, date: NaiveDate, consumption: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meter_id: meter_id.to_string(),
            value,
            date,
            consumption,
            created_at: Utc::now(),
        }
    }
}

/// An authenticated user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, opaque identifier
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_meter_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MeterType::Electricity).unwrap(),
            "\"electricity\""
        );
        assert_eq!(serde_json::to_string(&MeterType::Gas).unwrap(), "\"gas\"");
        let parsed: MeterType = serde_json::from_str("\"water\"").unwrap();
        assert_eq!(parsed, MeterType::Water);
    }

    #[test]
    fn test_meter_type_display() {
        assert_eq!(MeterType::Electricity.to_string(), "electricity");
        assert_eq!(MeterType::Water.to_string(), "water");
    }

    #[test]
    fn test_new_meter_starts_empty() {
        let meter = Meter::new("user1", "Home", "Main", MeterType::Electricity);
        assert!(!meter.id.is_empty());
        assert_eq!(meter.latest_reading, 0.0);
        assert_eq!(meter.total_consumption, 0.0);
        assert!(meter.last_reading_date.is_none());
    }

    #[test]
    fn test_new_readings_get_distinct_ids() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let a = Reading::new("m1", 100.0, date, 0.0);
        let b = Reading::new("m1", 110.0, date, 10.0);
        assert_ne!(a.id, b.id);
    }
}
