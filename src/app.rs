//! Application controller - explicit app state, action dispatch, notices.
//!
//! `App` is the single application-state object constructed at startup:
//! login establishes it, logout tears it down, and every user action flows
//! through [`App::dispatch`] with a closed [`Action`] type so new actions are
//! compile-time-checked additions. All failures are caught at the dispatch
//! boundary and surfaced as dismissable [`Notice`]s; none are fatal to the
//! running application.

use crate::collections::Collections;
use crate::config::AppConfig;
use crate::core::consumption::{self, RecordedReading};
use crate::core::dashboard::{self, DashboardSummary};
use crate::core::sync;
use crate::errors::{Error, Result};
use crate::gateway::Gateway;
use crate::models::{Meter, MeterType, User};
use crate::session::SessionStore;
use chrono::{NaiveDate, Utc};
use std::fmt;
use tracing::{error, info, warn};

/// A transient, user-dismissable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice(pub String);

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every user action the controller understands. The match in
/// [`App::dispatch`] is exhaustive, so adding a variant forces a handler.
#[derive(Debug, Clone)]
pub enum Action {
    /// Roll up the collections into dashboard statistics
    ShowDashboard,
    /// Create a meter for a household
    AddMeter {
        /// Household name
        home_name: String,
        /// Meter display name
        name: String,
        /// Utility kind
        meter_type: MeterType,
    },
    /// Record a new reading for a meter
    RecordReading {
        /// Target meter id
        meter_id: String,
        /// Recorded value
        value: f64,
        /// Calendar date of the reading
        date: NaiveDate,
    },
    /// Delete a meter and all of its readings
    DeleteMeter {
        /// Target meter id
        meter_id: String,
    },
    /// Compare with the server and transfer missing records both ways
    Sync,
    /// End the session
    Logout,
}

/// What a successfully dispatched action produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Dashboard statistics for display
    Dashboard(DashboardSummary),
    /// The newly created meter
    MeterAdded(Meter),
    /// The recorded reading and updated meter
    ReadingRecorded(RecordedReading),
    /// A meter was removed together with its readings
    MeterDeleted {
        /// Id of the removed meter
        meter_id: String,
        /// How many readings the cascade removed
        readings_removed: usize,
    },
    /// Result of a sync pass
    Synced(SyncReport),
    /// The session ended
    LoggedOut,
}

/// Counts from one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records uploaded to the server
    pub pushed: usize,
    /// Records adopted from the server
    pub pulled: usize,
    /// Uploads that failed (surfaced, never retried)
    pub push_failures: usize,
    /// Same-day readings with mismatched values, left untouched
    pub conflicts: usize,
}

/// The application-state object owning session, gateway, and collections.
pub struct App {
    gateway: Gateway,
    session_store: SessionStore,
    collections: Collections,
    current_user: Option<User>,
    notices: Vec<Notice>,
}

impl App {
    /// Builds the application state from configuration. No session is
    /// active until [`App::startup`] or [`App::login`] establishes one.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gateway: Gateway::new(&config.api_url, &config.project_id, config.api_key.clone()),
            session_store: SessionStore::new(config.session_file.clone()),
            collections: Collections::new(),
            current_user: None,
            notices: Vec::new(),
        }
    }

    /// Restores a persisted session if a valid one exists, then loads the
    /// collections. Returns whether a session is active.
    pub async fn startup(&mut self) -> bool {
        let Some(session) = self.session_store.check() else {
            info!("No valid session; login required");
            return false;
        };

        info!("Restored session for {}", session.user.email);
        self.gateway.set_token(session.token);
        self.current_user = Some(session.user);
        self.load_collections().await;
        true
    }

    /// Authenticates and establishes a session, then loads the collections.
    ///
    /// # Errors
    /// Returns [`Error::Authentication`] with the backend's message or a
    /// generic network-failure message.
    pub async fn login(&mut self, email: &str, password: &str, remember: bool) -> Result<User> {
        let login = self.gateway.authenticate(email, password).await?;
        let session = self
            .session_store
            .establish(login.user.clone(), login.token, remember);

        self.gateway.set_token(session.token);
        self.current_user = Some(login.user.clone());
        info!("Logged in as {}", login.user.email);

        self.load_collections().await;
        Ok(login.user)
    }

    /// Ends the session: clears persisted data, the held token, and the
    /// in-memory collections. The collections are never persisted locally.
    pub fn logout(&mut self) {
        self.session_store.clear();
        self.gateway.clear_token();
        self.collections.clear();
        self.current_user = None;
        info!("Logged out");
    }

    /// Rebuilds the collections from the gateway.
    ///
    /// A fetch failure is not fatal: the maps become empty (rather than
    /// leaving stale data displayed ambiguously) and a notice is pushed for
    /// the user, who may re-trigger the load.
    pub async fn load_collections(&mut self) {
        let meters = match self.gateway.fetch_meters().await {
            Ok(meters) => meters,
            Err(e) => {
                error!("Failed to load meters: {e}");
                self.collections.clear();
                self.notify(format!("Could not load your meters: {e}"));
                return;
            }
        };
        let readings = match self.gateway.fetch_readings().await {
            Ok(readings) => readings,
            Err(e) => {
                error!("Failed to load readings: {e}");
                self.collections.clear();
                self.notify(format!("Could not load your readings: {e}"));
                return;
            }
        };

        self.collections.load(meters, readings);
        info!(
            "Loaded {} meters and {} readings",
            self.collections.meter_count(),
            self.collections.reading_count()
        );
    }

    /// Creates a meter, persists it, and inserts it into the collections.
    ///
    /// # Errors
    /// Fails on an empty name, a duplicate home + name pair, a missing
    /// session, or a gateway failure.
    pub async fn add_meter(
        &mut self,
        home_name: &str,
        name: &str,
        meter_type: MeterType,
    ) -> Result<Meter> {
        // Trim once so the duplicate check sees the name the meter will get.
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Config {
                message: "Meter name cannot be empty".to_string(),
            });
        }
        if self
            .collections
            .meters()
            .any(|m| m.home_name == home_name && m.name == name)
        {
            return Err(Error::Config {
                message: "A meter with this name already exists for this home".to_string(),
            });
        }
        let user = self.current_user.as_ref().ok_or_else(|| Error::Authentication {
            message: "Authentication required".to_string(),
        })?;

        let meter = Meter::new(&user.id, home_name, name, meter_type);
        self.gateway.create_meter(&meter).await?;
        self.collections.upsert_meter(meter.clone());
        info!("Added {} meter '{}' for home '{home_name}'", meter.meter_type, meter.name);
        Ok(meter)
    }

    /// Records a reading: pure consumption calculation over the collections,
    /// then persistence of the new reading and the mutated meter.
    ///
    /// # Errors
    /// Fails if the meter is unknown or a gateway write fails. A failed
    /// write is surfaced immediately and not retried.
    pub async fn record_reading(
        &mut self,
        meter_id: &str,
        value: f64,
        date: NaiveDate,
    ) -> Result<RecordedReading> {
        let recorded = consumption::record_reading(&mut self.collections, meter_id, value, date)?;
        self.gateway.create_reading(&recorded.reading).await?;
        self.gateway.update_meter(&recorded.meter).await?;
        Ok(recorded)
    }

    /// Deletes a meter remotely and locally, cascading to its readings.
    /// Remote deletes run first; the local cascade only happens once the
    /// backend has accepted every call.
    pub async fn delete_meter(&mut self, meter_id: &str) -> Result<(String, usize)> {
        if self.collections.meter(meter_id).is_none() {
            return Err(Error::MeterNotFound {
                id: meter_id.to_string(),
            });
        }

        let reading_ids: Vec<String> = self
            .collections
            .readings_for_meter(meter_id)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        for reading_id in &reading_ids {
            self.gateway.delete_reading(reading_id).await?;
        }
        self.gateway.delete_meter(meter_id).await?;

        let (meter, readings_removed) = self.collections.remove_meter(meter_id)?;
        info!(
            "Deleted meter '{}' and {readings_removed} readings",
            meter.name
        );
        Ok((meter.id, readings_removed))
    }

    /// Compares local collections with the server and transfers missing
    /// records in both directions, one call per item. Diverged meters present
    /// on both sides are reconciled from whichever copy is newer. Upload
    /// failures are counted and reported, never retried; conflicts are left
    /// untouched.
    ///
    /// # Errors
    /// Fails if either server snapshot cannot be fetched.
    pub async fn sync(&mut self) -> Result<SyncReport> {
        let server_meters = self.gateway.fetch_meters().await?;
        let server_readings = self.gateway.fetch_readings().await?;

        let plan = sync::compare(&self.collections, &server_meters, &server_readings);
        info!("Sync plan: {}", plan.summary());

        let mut report = SyncReport {
            conflicts: plan.conflicts.len(),
            ..SyncReport::default()
        };

        for meter in &plan.meters_to_upload {
            match self.gateway.create_meter(meter).await {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!("Failed to upload meter '{}': {e}", meter.name);
                    report.push_failures += 1;
                }
            }
        }
        for meter in &plan.meters_local_newer {
            match self.gateway.update_meter(meter).await {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!("Failed to push updated meter '{}': {e}", meter.name);
                    report.push_failures += 1;
                }
            }
        }
        for reading in &plan.readings_to_upload {
            match self.gateway.create_reading(reading).await {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!("Failed to upload reading {}: {e}", reading.id);
                    report.push_failures += 1;
                }
            }
        }

        for meter in plan.meters_to_download {
            self.collections.upsert_meter(meter);
            report.pulled += 1;
        }
        for meter in plan.meters_server_newer {
            self.collections.upsert_meter(meter);
            report.pulled += 1;
        }
        for reading in plan.readings_to_download {
            match self.collections.upsert_reading(reading) {
                Ok(()) => report.pulled += 1,
                // Reading for a meter we still don't know; skip it.
                Err(e) => warn!("Skipping downloaded reading: {e}"),
            }
        }

        if report.conflicts > 0 {
            self.notify(format!(
                "{} readings differ between this device and the server",
                report.conflicts
            ));
        }
        Ok(report)
    }

    /// Dispatches a user action, catching any failure as a [`Notice`].
    /// Returns `None` when the action failed; the notice queue carries the
    /// user-visible message.
    pub async fn dispatch(&mut self, action: Action) -> Option<Outcome> {
        let result = match action {
            Action::ShowDashboard => Ok(Outcome::Dashboard(dashboard::summarize(
                &self.collections,
                Utc::now().date_naive(),
            ))),
            Action::AddMeter {
                home_name,
                name,
                meter_type,
            } => self
                .add_meter(&home_name, &name, meter_type)
                .await
                .map(Outcome::MeterAdded),
            Action::RecordReading {
                meter_id,
                value,
                date,
            } => self
                .record_reading(&meter_id, value, date)
                .await
                .map(Outcome::ReadingRecorded),
            Action::DeleteMeter { meter_id } => self.delete_meter(&meter_id).await.map(
                |(meter_id, readings_removed)| Outcome::MeterDeleted {
                    meter_id,
                    readings_removed,
                },
            ),
            Action::Sync => self.sync().await.map(Outcome::Synced),
            Action::Logout => {
                self.logout();
                Ok(Outcome::LoggedOut)
            }
        };

        match result {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Action failed: {e}");
                self.notify(e.to_string());
                None
            }
        }
    }

    /// Queues a user-visible notice.
    fn notify(&mut self, message: String) {
        self.notices.push(Notice(message));
    }

    /// Drains the pending notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The in-session collections, for rendering.
    #[must_use]
    pub const fn collections(&self) -> &Collections {
        &self.collections
    }

    /// The authenticated user, if a session is active.
    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }
}
