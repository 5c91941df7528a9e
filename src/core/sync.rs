//! Diff-by-id comparison between local collections and server snapshots.
//!
//! The comparison is deliberately simple: meters match by id, readings match
//! by (meter, date). Records present on one side only are queued for upload
//! or download; same-day readings whose values disagree beyond a small
//! tolerance are flagged as conflicts for the user to resolve by hand. There
//! is no vector-clock machinery and no automatic conflict resolution.

use crate::collections::Collections;
use crate::models::{Meter, Reading};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Floating-point slack when comparing reading values across databases.
const VALUE_TOLERANCE: f64 = 0.01;

/// A same-day reading recorded with different values locally and remotely.
#[derive(Debug, Clone)]
pub struct ReadingConflict {
    /// Meter the readings belong to
    pub meter_id: String,
    /// Calendar date both readings share
    pub date: NaiveDate,
    /// Value recorded locally
    pub local_value: f64,
    /// Value recorded on the server
    pub server_value: f64,
}

/// What a sync pass would transfer in each direction.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// Meters present locally but not on the server
    pub meters_to_upload: Vec<Meter>,
    /// Meters present on the server but not locally
    pub meters_to_download: Vec<Meter>,
    /// Diverged meters on both sides where the local copy is newer; pushed
    /// to the server as an update
    pub meters_local_newer: Vec<Meter>,
    /// Diverged meters on both sides where the server copy is newer; adopted
    /// locally
    pub meters_server_newer: Vec<Meter>,
    /// Readings present locally but not on the server
    pub readings_to_upload: Vec<Reading>,
    /// Readings present on the server but not locally
    pub readings_to_download: Vec<Reading>,
    /// Same-day readings with mismatched values
    pub conflicts: Vec<ReadingConflict>,
}

impl SyncPlan {
    /// True when both sides already agree.
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.meters_to_upload.is_empty()
            && self.meters_to_download.is_empty()
            && self.meters_local_newer.is_empty()
            && self.meters_server_newer.is_empty()
            && self.readings_to_upload.is_empty()
            && self.readings_to_download.is_empty()
            && self.conflicts.is_empty()
    }

    /// Number of records queued for upload.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.meters_to_upload.len() + self.meters_local_newer.len() + self.readings_to_upload.len()
    }

    /// Number of records queued for download.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.meters_to_download.len()
            + self.meters_server_newer.len()
            + self.readings_to_download.len()
    }

    /// Human-readable summary of the plan.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_in_sync() {
            return "All data is in sync".to_string();
        }

        let mut summary = String::new();
        if self.upload_count() > 0 {
            let _ = writeln!(summary, "{} items to upload to server", self.upload_count());
        }
        if self.download_count() > 0 {
            let _ = writeln!(
                summary,
                "{} items to download from server",
                self.download_count()
            );
        }
        if !self.conflicts.is_empty() {
            let _ = writeln!(summary, "{} conflicts need resolution", self.conflicts.len());
        }
        summary.trim_end().to_string()
    }
}

/// True when two copies of the same meter disagree on anything sync cares
/// about. Timestamps themselves are not compared; they only decide direction.
fn meters_differ(local: &Meter, server: &Meter) -> bool {
    (local.latest_reading - server.latest_reading).abs() > VALUE_TOLERANCE
        || (local.total_consumption - server.total_consumption).abs() > VALUE_TOLERANCE
        || local.last_reading_date != server.last_reading_date
        || local.name != server.name
        || local.home_name != server.home_name
        || local.meter_type != server.meter_type
}

/// Compares local collections with server snapshots of both record kinds.
#[must_use]
pub fn compare(
    local: &Collections,
    server_meters: &[Meter],
    server_readings: &[Reading],
) -> SyncPlan {
    let mut plan = SyncPlan::default();

    let server_by_id: HashMap<&str, &Meter> =
        server_meters.iter().map(|m| (m.id.as_str(), m)).collect();

    for meter in local.meters() {
        match server_by_id.get(meter.id.as_str()) {
            None => plan.meters_to_upload.push(meter.clone()),
            // Shared id: reconcile a diverged record from the newer side. A
            // tie goes to the local copy, which is the one the user can see.
            Some(&server_meter) if meters_differ(meter, server_meter) => {
                if meter.updated_at >= server_meter.updated_at {
                    plan.meters_local_newer.push(meter.clone());
                } else {
                    plan.meters_server_newer.push(server_meter.clone());
                }
            }
            Some(_) => {}
        }
    }
    for meter in server_meters {
        if local.meter(&meter.id).is_none() {
            plan.meters_to_download.push(meter.clone());
        }
    }

    // Readings match on (meter, date): ids are client-generated and may
    // differ for the same logical submission.
    let server_by_key: HashMap<(&str, NaiveDate), &Reading> = server_readings
        .iter()
        .map(|r| ((r.meter_id.as_str(), r.date), r))
        .collect();
    let local_keys: HashMap<(&str, NaiveDate), &Reading> = local
        .readings()
        .map(|r| ((r.meter_id.as_str(), r.date), r))
        .collect();

    for (key, reading) in &local_keys {
        match server_by_key.get(key) {
            None => plan.readings_to_upload.push((*reading).clone()),
            Some(server_reading) => {
                if (reading.value - server_reading.value).abs() > VALUE_TOLERANCE {
                    plan.conflicts.push(ReadingConflict {
                        meter_id: reading.meter_id.clone(),
                        date: reading.date,
                        local_value: reading.value,
                        server_value: server_reading.value,
                    });
                }
            }
        }
    }
    for (key, reading) in &server_by_key {
        if !local_keys.contains_key(key) {
            plan.readings_to_download.push((*reading).clone());
        }
    }

    plan
}
