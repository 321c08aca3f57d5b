//! # Charity Fund
//!
//! Ledger for a charity fund: projects ask for money, donations bring it in,
//! and an allocation run matches the two pools oldest-first.
//!
//! | Concern        | Module        |
//! |----------------|---------------|
//! | Entities       | [`models`]    |
//! | Matching       | [`allocator`] |
//! | Storage        | [`db`]        |
//! | Service layer  | [`ledger`]    |
//! | Reporting      | [`report`]    |
//! | Background run | [`watcher`]   |
//!
//! The allocator is pure; everything that touches SQLite goes through
//! [`ledger::Ledger`], which serializes allocation runs and commits each one
//! as a single transaction.

pub mod allocator;
pub mod config;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod report;
pub mod watcher;

#[cfg(test)]
mod invariants;

pub use allocator::{allocate, AllocationSummary};
pub use errors::{LedgerError, Result};
pub use ledger::Ledger;
pub use models::{CharityProject, Donation, Fundable, NewDonation, NewProject, ProjectUpdate};
