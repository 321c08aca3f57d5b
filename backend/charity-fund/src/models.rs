//! Ledger entities and the input payloads that create or edit them.
//!
//! Both [`CharityProject`] and [`Donation`] have the same funding shape: a
//! target `full_amount`, the `invested_amount` matched so far, and a
//! `close_date` that is set exactly when the two become equal. The
//! [`Fundable`] trait exposes that shape to the allocator so it can walk
//! either pool with the same code.
//!
//! ```text
//! open (invested < full) ──► closed (invested == full, close_date set)
//! ```
//!
//! There is no way back from closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Longest project name accepted on create or update.
pub const MAX_NAME_LEN: usize = 100;

/// Largest `full_amount` accepted for a project or a donation.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Common funding shape shared by projects and donations.
pub trait Fundable {
    fn id(&self) -> i64;
    fn full_amount(&self) -> i64;
    fn invested_amount(&self) -> i64;
    fn fully_invested(&self) -> bool;
    fn close_date(&self) -> Option<DateTime<Utc>>;
    fn create_date(&self) -> DateTime<Utc>;

    fn set_invested_amount(&mut self, amount: i64);
    /// Mark as fully invested and stamp the close date.
    fn close(&mut self, at: DateTime<Utc>);

    /// Amount still missing before this entity is fully invested.
    fn remaining(&self) -> i64 {
        self.full_amount() - self.invested_amount()
    }

    fn is_open(&self) -> bool {
        self.close_date().is_none()
    }

    /// Invest everything that is still missing and close.
    fn fill(&mut self, at: DateTime<Utc>) {
        let full = self.full_amount();
        self.set_invested_amount(full);
        self.close(at);
    }

    /// Invest `amount` more without closing.
    fn top_up(&mut self, amount: i64) {
        let next = self.invested_amount() + amount;
        self.set_invested_amount(next);
    }
}

/// A charity project collecting money toward `full_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CharityProject {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub full_amount: i64,
    pub invested_amount: i64,
    pub fully_invested: bool,
    pub create_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
}

/// A donation waiting to be spread over projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: i64,
    pub comment: Option<String>,
    pub full_amount: i64,
    pub invested_amount: i64,
    pub fully_invested: bool,
    pub create_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
}

macro_rules! impl_fundable {
    ($ty:ty) => {
        impl Fundable for $ty {
            fn id(&self) -> i64 {
                self.id
            }
            fn full_amount(&self) -> i64 {
                self.full_amount
            }
            fn invested_amount(&self) -> i64 {
                self.invested_amount
            }
            fn fully_invested(&self) -> bool {
                self.fully_invested
            }
            fn close_date(&self) -> Option<DateTime<Utc>> {
                self.close_date
            }
            fn create_date(&self) -> DateTime<Utc> {
                self.create_date
            }
            fn set_invested_amount(&mut self, amount: i64) {
                self.invested_amount = amount;
            }
            fn close(&mut self, at: DateTime<Utc>) {
                self.fully_invested = true;
                self.close_date = Some(at);
            }
        }
    };
}

impl_fundable!(CharityProject);
impl_fundable!(Donation);

// ─────────────────────────────────────────────────────────
// Input payloads
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub full_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    pub full_amount: i64,
    pub comment: Option<String>,
}

/// Partial edit of an open project. `None` fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub full_amount: Option<i64>,
}

impl NewProject {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_amount(self.full_amount)
    }
}

impl NewDonation {
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.full_amount)
    }
}

impl ProjectUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(amount) = self.full_amount {
            validate_amount(amount)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("project name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "project name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "project description must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(LedgerError::Validation(format!(
            "full_amount must be positive, got {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::Validation(format!(
            "full_amount must be at most {MAX_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}
