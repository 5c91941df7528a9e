//! `VoltTrack` - A utility-meter reading tracker
//!
//! This crate provides the headless core of the VoltTrack application: users
//! log periodic meter readings (electricity, gas, water) per household meter,
//! and the app computes consumption deltas and aggregate totals, syncing with
//! a hosted backend. Rendering surfaces live outside this crate; everything
//! here is testable with no UI at all.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Application controller - explicit app state, action dispatch, notices
pub mod app;
/// In-session collections of meters and readings
pub mod collections;
/// Configuration loading from volttrack.toml and environment variables
pub mod config;
/// Core business logic - consumption, dashboard, and sync calculations
pub mod core;
/// Unified error types and result handling
pub mod errors;
/// Remote data gateway - authenticated HTTP calls against the backend
pub mod gateway;
/// Data model shared across the crate
pub mod models;
/// Local session persistence with expiry checking
pub mod session;

#[cfg(test)]
pub mod test_utils;
