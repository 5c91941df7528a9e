//! Shared test utilities for `VoltTrack`.
//!
//! This module provides common helper functions for building test meters,
//! readings, and populated collections with sensible defaults.

use crate::collections::Collections;
use crate::models::{Meter, MeterType, Reading, User};
use chrono::{NaiveDate, Utc};

/// Creates a test user with sensible defaults.
#[must_use]
pub fn sample_user() -> User {
    User {
        id: "user1".to_string(),
        email: "user@example.com".to_string(),
        name: "Test User".to_string(),
    }
}

/// Creates a test meter with a fixed id and zeroed totals.
///
/// # Defaults
/// * `user_id`: "user1"
/// * `home_name`: "Test Home"
/// * `meter_type`: electricity
#[must_use]
pub fn sample_meter(id: &str, name: &str) -> Meter {
    let now = Utc::now();
    Meter {
        id: id.to_string(),
        user_id: "user1".to_string(),
        home_name: "Test Home".to_string(),
        name: name.to_string(),
        meter_type: MeterType::Electricity,
        latest_reading: 0.0,
        total_consumption: 0.0,
        last_reading_date: None,
        created_at: now,
        updated_at: now,
    }
}

/// Creates a test reading with a fixed id and zero consumption.
///
/// # Panics
/// Panics if the supplied calendar date is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sample_reading(id: &str, meter_id: &str, value: f64, y: i32, m: u32, d: u32) -> Reading {
    Reading {
        id: id.to_string(),
        meter_id: meter_id.to_string(),
        value,
        date: NaiveDate::from_ymd_opt(y, m, d).expect("valid test date"),
        consumption: 0.0,
        created_at: Utc::now(),
    }
}

/// Sets up collections holding a single meter with the given starting value.
/// Returns the collections and the meter id for common test scenarios.
#[must_use]
pub fn collections_with_meter(latest_reading: f64) -> (Collections, String) {
    let mut meter = sample_meter("m1", "Main Meter");
    meter.latest_reading = latest_reading;
    let mut collections = Collections::new();
    collections.upsert_meter(meter);
    (collections, "m1".to_string())
}
