//! Core business logic - framework-agnostic consumption, dashboard, and
//! sync calculations.
//!
//! Everything in this module is a pure transform over [`crate::collections`]
//! data: no network, no rendering surface, no global state. The application
//! controller wires these results to the gateway and to whatever UI hosts
//! the crate.

/// Consumption calculation for newly recorded readings
pub mod consumption;
/// Dashboard roll-ups and staleness classification
pub mod dashboard;
/// Diff-by-id comparison between local and server snapshots
pub mod sync;
