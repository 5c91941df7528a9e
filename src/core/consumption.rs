//! Consumption calculation for newly recorded readings.
//!
//! A reading's consumption is the delta against the meter's prior latest
//! value, floored at zero. The meter's running total is maintained
//! incrementally here rather than recomputed from its readings.

use crate::collections::Collections;
use crate::errors::{Error, Result};
use crate::models::{Meter, Reading};
use chrono::NaiveDate;
use tracing::info;

/// Outcome of recording a reading: the new reading and the mutated meter,
/// both already inserted into the collections. The caller persists them via
/// the gateway.
#[derive(Debug, Clone)]
pub struct RecordedReading {
    /// The newly created reading
    pub reading: Reading,
    /// The meter after its latest value, date, and total were updated
    pub meter: Meter,
}

/// Records a reading for a meter and updates the meter's running totals.
///
/// The consumption is `max(0, value - latest_reading)`. A value lower than
/// the current latest reading is accepted (meter replacement or counter
/// rollover) and records zero consumption; the latest reading still moves to
/// the new value.
///
/// # Errors
/// Returns [`Error::MeterNotFound`] if `meter_id` names no known meter.
pub fn record_reading(
    collections: &mut Collections,
    meter_id: &str,
    value: f64,
    date: NaiveDate,
) -> Result<RecordedReading> {
    let mut meter = collections
        .meter(meter_id)
        .cloned()
        .ok_or_else(|| Error::MeterNotFound {
            id: meter_id.to_string(),
        })?;

    let delta = (value - meter.latest_reading).max(0.0);
    let reading = Reading::new(meter_id, value, date, delta);

    meter.latest_reading = value;
    meter.last_reading_date = Some(date);
    meter.total_consumption += delta;
    meter.updated_at = chrono::Utc::now();

    collections.upsert_meter(meter.clone());
    collections.upsert_reading(reading.clone())?;

    info!(
        "Recorded reading {value} for meter '{}' (consumption {delta})",
        meter.name
    );

    Ok(RecordedReading { reading, meter })
}
