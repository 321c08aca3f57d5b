//! Database layer — migrations, entity queries, and the allocation batch write.
//!
//! Reads and writes that take part in an allocation run accept a
//! `&mut SqliteConnection` so the caller can run them inside one
//! transaction (`&mut *tx`). Plain listings take the pool.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::models::{CharityProject, Donation, NewDonation, NewProject};

const PROJECT_COLUMNS: &str = "id, name, description, full_amount, invested_amount, \
                               fully_invested, create_date, close_date";
const DONATION_COLUMNS: &str = "id, comment, full_amount, invested_amount, \
                                fully_invested, create_date, close_date";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Make sure the file is created if it doesn't exist yet.
    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────

/// Insert a new open project and return the stored row.
pub async fn insert_project(
    conn: &mut SqliteConnection,
    new: &NewProject,
    now: DateTime<Utc>,
) -> Result<CharityProject> {
    let sql = format!(
        r#"
        INSERT INTO charityproject
            (name, description, full_amount, invested_amount, fully_invested, create_date)
        VALUES (?1, ?2, ?3, 0, 0, ?4)
        RETURNING {PROJECT_COLUMNS}
        "#
    );
    let project = sqlx::query_as::<_, CharityProject>(&sql)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.full_amount)
        .bind(now)
        .fetch_one(conn)
        .await?;
    Ok(project)
}

pub async fn get_project(conn: &mut SqliteConnection, id: i64) -> Result<Option<CharityProject>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM charityproject WHERE id = ?1");
    let row = sqlx::query_as::<_, CharityProject>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn get_project_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<CharityProject>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM charityproject WHERE name = ?1");
    let row = sqlx::query_as::<_, CharityProject>(&sql)
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Overwrite every editable column of an existing project.
pub async fn update_project(conn: &mut SqliteConnection, project: &CharityProject) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE charityproject
        SET    name = ?1, description = ?2, full_amount = ?3,
               invested_amount = ?4, fully_invested = ?5, close_date = ?6
        WHERE  id = ?7
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.full_amount)
    .bind(project.invested_amount)
    .bind(project.fully_invested)
    .bind(project.close_date)
    .bind(project.id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete_project(conn: &mut SqliteConnection, id: i64) -> Result<u64> {
    let rows = sqlx::query("DELETE FROM charityproject WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows)
}

/// Fetch all projects, ordered by id ascending.
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<CharityProject>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM charityproject ORDER BY id ASC");
    let rows = sqlx::query_as::<_, CharityProject>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch every closed project. Ordering is left to the report.
pub async fn closed_projects(pool: &SqlitePool) -> Result<Vec<CharityProject>> {
    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM charityproject WHERE close_date IS NOT NULL ORDER BY id ASC"
    );
    let rows = sqlx::query_as::<_, CharityProject>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Donations
// ─────────────────────────────────────────────────────────

/// Insert a new open donation and return the stored row.
pub async fn insert_donation(
    conn: &mut SqliteConnection,
    new: &NewDonation,
    now: DateTime<Utc>,
) -> Result<Donation> {
    let sql = format!(
        r#"
        INSERT INTO donation
            (comment, full_amount, invested_amount, fully_invested, create_date)
        VALUES (?1, ?2, 0, 0, ?3)
        RETURNING {DONATION_COLUMNS}
        "#
    );
    let donation = sqlx::query_as::<_, Donation>(&sql)
        .bind(&new.comment)
        .bind(new.full_amount)
        .bind(now)
        .fetch_one(conn)
        .await?;
    Ok(donation)
}

pub async fn get_donation(conn: &mut SqliteConnection, id: i64) -> Result<Option<Donation>> {
    let sql = format!("SELECT {DONATION_COLUMNS} FROM donation WHERE id = ?1");
    let row = sqlx::query_as::<_, Donation>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Fetch all donations, ordered by id ascending.
pub async fn list_donations(pool: &SqlitePool) -> Result<Vec<Donation>> {
    let sql = format!("SELECT {DONATION_COLUMNS} FROM donation ORDER BY id ASC");
    let rows = sqlx::query_as::<_, Donation>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Allocation snapshot and batch write
// ─────────────────────────────────────────────────────────

/// Open projects, oldest first. Ties on `create_date` fall back to id.
pub async fn open_projects(conn: &mut SqliteConnection) -> Result<Vec<CharityProject>> {
    let sql = format!(
        r#"
        SELECT {PROJECT_COLUMNS}
        FROM   charityproject
        WHERE  close_date IS NULL
        ORDER  BY create_date ASC, id ASC
        "#
    );
    let rows = sqlx::query_as::<_, CharityProject>(&sql)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Open donations, oldest first. Ties on `create_date` fall back to id.
pub async fn open_donations(conn: &mut SqliteConnection) -> Result<Vec<Donation>> {
    let sql = format!(
        r#"
        SELECT {DONATION_COLUMNS}
        FROM   donation
        WHERE  close_date IS NULL
        ORDER  BY create_date ASC, id ASC
        "#
    );
    let rows = sqlx::query_as::<_, Donation>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

/// Persist the funding columns of every entity an allocation run touched.
///
/// Must be called on the transaction that read the snapshot; nothing is
/// visible until that transaction commits.
pub async fn save_allocation(
    conn: &mut SqliteConnection,
    projects: &[CharityProject],
    donations: &[Donation],
) -> Result<()> {
    for project in projects {
        sqlx::query(
            r#"
            UPDATE charityproject
            SET    invested_amount = ?1, fully_invested = ?2, close_date = ?3
            WHERE  id = ?4
            "#,
        )
        .bind(project.invested_amount)
        .bind(project.fully_invested)
        .bind(project.close_date)
        .bind(project.id)
        .execute(&mut *conn)
        .await?;
    }
    for donation in donations {
        sqlx::query(
            r#"
            UPDATE donation
            SET    invested_amount = ?1, fully_invested = ?2, close_date = ?3
            WHERE  id = ?4
            "#,
        )
        .bind(donation.invested_amount)
        .bind(donation.fully_invested)
        .bind(donation.close_date)
        .bind(donation.id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
