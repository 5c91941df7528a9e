//! In-session collections of meters and readings.
//!
//! `Collections` exclusively owns the in-memory meter and reading maps for
//! the lifetime of a session. They are rebuilt from the gateway on login and
//! discarded on logout, never persisted locally. `load`, `upsert_meter`,
//! `upsert_reading`, and `remove_meter` are the only mutation entry points;
//! the calculator and controller never touch the maps directly.

use crate::errors::{Error, Result};
use crate::models::{Meter, Reading};
use std::collections::HashMap;
use tracing::debug;

/// The authoritative in-session mapping of meter id to [`Meter`] and
/// reading id to [`Reading`].
#[derive(Debug, Clone, Default)]
pub struct Collections {
    meters: HashMap<String, Meter>,
    readings: HashMap<String, Reading>,
}

impl Collections {
    /// Creates empty collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both maps wholesale. Used after a gateway fetch.
    ///
    /// Readings that reference a meter missing from `meters` are dropped so
    /// the no-orphans invariant holds regardless of what the backend sent.
    pub fn load(&mut self, meters: Vec<Meter>, readings: Vec<Reading>) {
        self.meters = meters.into_iter().map(|m| (m.id.clone(), m)).collect();
        self.readings = readings
            .into_iter()
            .filter(|r| {
                let known = self.meters.contains_key(&r.meter_id);
                if !known {
                    debug!(
                        "Dropping reading {} for unknown meter {}",
                        r.id, r.meter_id
                    );
                }
                known
            })
            .map(|r| (r.id.clone(), r))
            .collect();
    }

    /// Drops everything. Used on logout and on fetch failure.
    pub fn clear(&mut self) {
        self.meters.clear();
        self.readings.clear();
    }

    /// Inserts or replaces a meter.
    pub fn upsert_meter(&mut self, meter: Meter) {
        self.meters.insert(meter.id.clone(), meter);
    }

    /// Inserts or replaces a reading.
    ///
    /// # Errors
    /// Returns [`Error::MeterNotFound`] if the reading references a meter
    /// that is not in the collections.
    pub fn upsert_reading(&mut self, reading: Reading) -> Result<()> {
        if !self.meters.contains_key(&reading.meter_id) {
            return Err(Error::MeterNotFound {
                id: reading.meter_id,
            });
        }
        self.readings.insert(reading.id.clone(), reading);
        Ok(())
    }

    /// Removes a meter and cascades to every reading that references it.
    /// Returns the removed meter and how many readings went with it.
    ///
    /// # Errors
    /// Returns [`Error::MeterNotFound`] if the meter is absent.
    pub fn remove_meter(&mut self, meter_id: &str) -> Result<(Meter, usize)> {
        let meter = self
            .meters
            .remove(meter_id)
            .ok_or_else(|| Error::MeterNotFound {
                id: meter_id.to_string(),
            })?;

        let before = self.readings.len();
        self.readings.retain(|_, r| r.meter_id != meter_id);
        Ok((meter, before - self.readings.len()))
    }

    /// Looks up a meter by id.
    #[must_use]
    pub fn meter(&self, meter_id: &str) -> Option<&Meter> {
        self.meters.get(meter_id)
    }

    /// Iterates over all meters, in no particular order.
    pub fn meters(&self) -> impl Iterator<Item = &Meter> {
        self.meters.values()
    }

    /// Iterates over all readings, in no particular order.
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.values()
    }

    /// Returns the readings for one meter, oldest first.
    #[must_use]
    pub fn readings_for_meter(&self, meter_id: &str) -> Vec<&Reading> {
        let mut readings: Vec<&Reading> = self
            .readings
            .values()
            .filter(|r| r.meter_id == meter_id)
            .collect();
        readings.sort_by_key(|r| r.date);
        readings
    }

    /// Number of meters.
    #[must_use]
    pub fn meter_count(&self) -> usize {
        self.meters.len()
    }

    /// Number of readings.
    #[must_use]
    pub fn reading_count(&self) -> usize {
        self.readings.len()
    }

    /// True when both maps are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meters.is_empty() && self.readings.is_empty()
    }
}
