//! Ledger service — input checks, CRUD, and serialized allocation runs.
//!
//! Every operation that can move money takes the allocation lock and runs
//! inside a single SQLite transaction: read the open pools, allocate in
//! memory, write the touched rows, commit. If anything fails before the
//! commit the transaction is dropped, SQLite rolls it back, and the
//! in-memory results go with it.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::allocator::{self, AllocationSummary};
use crate::db;
use crate::errors::{LedgerError, Result};
use crate::models::{CharityProject, Donation, Fundable, NewDonation, NewProject, ProjectUpdate};
use crate::report::{self, ReportRow};

pub struct Ledger {
    pool: SqlitePool,
    /// Held for the whole read-allocate-write cycle so two runs never see
    /// the same open snapshot.
    allocation_lock: Mutex<()>,
}

impl Ledger {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            allocation_lock: Mutex::new(()),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────

    /// Register a new project and immediately fund it from open donations.
    pub async fn create_project(&self, new: NewProject) -> Result<CharityProject> {
        new.validate()?;

        let _guard = self.allocation_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        ensure_name_free(&mut tx, &new.name).await?;

        let now = Utc::now();
        let project = db::insert_project(&mut tx, &new, now).await?;
        info!("Project {} ({:?}) created for {}", project.id, project.name, project.full_amount);

        run_allocation(&mut tx, now).await?;
        let project = require_project(&mut tx, project.id).await?;
        tx.commit().await?;
        Ok(project)
    }

    pub async fn get_project(&self, id: i64) -> Result<CharityProject> {
        let mut conn = self.pool.acquire().await?;
        require_project(&mut conn, id).await
    }

    pub async fn list_projects(&self) -> Result<Vec<CharityProject>> {
        db::list_projects(&self.pool).await
    }

    /// Edit an open project.
    ///
    /// Lowering `full_amount` to exactly what is already invested closes the
    /// project. An allocation runs in the same transaction, so a raised
    /// target picks up donations written by other processes.
    pub async fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<CharityProject> {
        update.validate()?;

        let _guard = self.allocation_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let mut project = require_project(&mut tx, id).await?;
        if !project.is_open() || project.fully_invested {
            return Err(LedgerError::ProjectClosed(id));
        }

        if let Some(name) = update.name {
            if name != project.name {
                ensure_name_free(&mut tx, &name).await?;
                project.name = name;
            }
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        if let Some(full_amount) = update.full_amount {
            if full_amount < project.invested_amount {
                return Err(LedgerError::FullAmountBelowInvested {
                    requested: full_amount,
                    invested: project.invested_amount,
                });
            }
            project.full_amount = full_amount;
        }

        let now = Utc::now();
        if project.remaining() == 0 {
            project.close(now);
            info!("Project {} closed by edit at {}", project.id, project.full_amount);
        }
        db::update_project(&mut tx, &project).await?;

        run_allocation(&mut tx, now).await?;
        let project = require_project(&mut tx, id).await?;
        tx.commit().await?;
        Ok(project)
    }

    /// Remove a project that has not received any money yet.
    pub async fn delete_project(&self, id: i64) -> Result<CharityProject> {
        let _guard = self.allocation_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let project = require_project(&mut tx, id).await?;
        if project.invested_amount > 0 {
            return Err(LedgerError::ProjectHasInvestments(id));
        }
        db::delete_project(&mut tx, id).await?;
        tx.commit().await?;

        info!("Project {id} deleted");
        Ok(project)
    }

    // ─────────────────────────────────────────────────────────
    // Donations
    // ─────────────────────────────────────────────────────────

    /// Accept a donation and immediately spread it over open projects.
    pub async fn create_donation(&self, new: NewDonation) -> Result<Donation> {
        new.validate()?;

        let _guard = self.allocation_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let donation = db::insert_donation(&mut tx, &new, now).await?;
        info!("Donation {} received: {}", donation.id, donation.full_amount);

        run_allocation(&mut tx, now).await?;
        let donation = db::get_donation(&mut tx, donation.id)
            .await?
            .ok_or(LedgerError::Database(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        Ok(donation)
    }

    pub async fn list_donations(&self) -> Result<Vec<Donation>> {
        db::list_donations(&self.pool).await
    }

    // ─────────────────────────────────────────────────────────
    // Allocation and reporting
    // ─────────────────────────────────────────────────────────

    /// Run one allocation over the stored open pools and commit it.
    pub async fn invest(&self) -> Result<AllocationSummary> {
        let _guard = self.allocation_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let summary = run_allocation(&mut tx, Utc::now()).await?;
        tx.commit().await?;
        Ok(summary)
    }

    /// Closed projects, fastest collection first.
    pub async fn report(&self) -> Result<Vec<ReportRow>> {
        let closed = db::closed_projects(&self.pool).await?;
        Ok(report::build(&closed))
    }
}

/// Read both open pools, allocate, and write back the touched prefixes.
async fn run_allocation(conn: &mut SqliteConnection, now: DateTime<Utc>) -> Result<AllocationSummary> {
    let mut projects = db::open_projects(conn).await?;
    let mut donations = db::open_donations(conn).await?;
    debug!(
        "Allocating over {} open projects and {} open donations",
        projects.len(),
        donations.len()
    );

    let summary = allocator::allocate(&mut projects, &mut donations, now);
    if summary.is_empty() {
        return Ok(summary);
    }

    db::save_allocation(
        conn,
        &projects[..summary.projects_touched],
        &donations[..summary.donations_touched],
    )
    .await?;

    info!(
        "Allocation moved {} into {} projects from {} donations",
        summary.invested_in_projects, summary.projects_touched, summary.donations_touched
    );
    Ok(summary)
}

async fn require_project(conn: &mut SqliteConnection, id: i64) -> Result<CharityProject> {
    db::get_project(conn, id)
        .await?
        .ok_or(LedgerError::ProjectNotFound(id))
}

async fn ensure_name_free(conn: &mut SqliteConnection, name: &str) -> Result<()> {
    match db::get_project_by_name(conn, name).await? {
        Some(_) => Err(LedgerError::DuplicateProjectName(name.to_string())),
        None => Ok(()),
    }
}
