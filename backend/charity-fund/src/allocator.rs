//! Greedy matching of open donations to open projects.
//!
//! One allocation run takes both open pools, each ordered by creation time,
//! and moves money in two walks:
//!
//! 1. **Projects.** Walk projects oldest first and fill each one from the
//!    donation pool's free capacity. The first project that cannot be filled
//!    completely receives whatever capacity is left and the walk stops.
//! 2. **Donations.** Walk donations oldest first and mark as invested the
//!    amount the project pool absorbed. The first donation that cannot be
//!    consumed completely is topped up by the remainder and the walk stops.
//!
//! The capacity used by the second walk is taken from the pool totals as
//! they stood *before* the first walk, clamped to the smaller of the two.
//! Both walks therefore move exactly `min(project deficit, donation surplus)`.
//!
//! Nothing here touches storage. The caller persists the touched prefixes
//! and commits them as one batch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::{CharityProject, Donation, Fundable};

/// What a single allocation run changed.
///
/// Every walk stops at its first partial fill, so the touched entities are
/// always a prefix of the input slice: `projects[..projects_touched]` and
/// `donations[..donations_touched]`.
///
/// Pool totals are summed as `i128`; a pool of several `i64::MAX` amounts
/// does not overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub projects_touched: usize,
    pub donations_touched: usize,
    pub invested_in_projects: i128,
    pub drawn_from_donations: i128,
}

impl AllocationSummary {
    pub fn is_empty(&self) -> bool {
        self.projects_touched == 0 && self.donations_touched == 0
    }
}

/// Free capacity of a pool: sum of `full_amount` minus sum of `invested_amount`.
fn pool_capacity<T: Fundable>(pool: &[T]) -> i128 {
    let full: i128 = pool.iter().map(|e| i128::from(e.full_amount())).sum();
    let invested: i128 = pool.iter().map(|e| i128::from(e.invested_amount())).sum();
    full - invested
}

/// Run one allocation over the open pools, mutating them in place.
///
/// Both slices must hold only open entities ordered by `create_date`
/// ascending. `now` becomes the `close_date` of everything closed by this run.
pub fn allocate(
    projects: &mut [CharityProject],
    donations: &mut [Donation],
    now: DateTime<Utc>,
) -> AllocationSummary {
    let project_capacity = pool_capacity(projects);
    let donation_capacity = pool_capacity(donations);

    let mut summary = AllocationSummary::default();

    // Projects, funded from the donation pool.
    let mut to_invest = project_capacity;
    let mut to_be_invested = donation_capacity;
    for project in projects.iter_mut() {
        if to_be_invested <= 0 || to_invest <= 0 {
            break;
        }
        let need = i128::from(project.remaining());
        if need <= to_be_invested {
            project.fill(now);
            debug!("Project {} fully invested ({})", project.id, project.full_amount);
            to_invest -= need;
            to_be_invested -= need;
            summary.projects_touched += 1;
            summary.invested_in_projects += need;
        } else {
            // Below `need`, so it fits in i64.
            project.top_up(to_be_invested as i64);
            summary.projects_touched += 1;
            summary.invested_in_projects += to_be_invested;
            break;
        }
    }

    // Donations, drawn against the pre-walk pool totals.
    let mut available = donation_capacity.min(project_capacity);
    for donation in donations.iter_mut() {
        let portion = i128::from(donation.remaining());
        if portion <= available {
            donation.fill(now);
            debug!("Donation {} fully invested ({})", donation.id, donation.full_amount);
            available -= portion;
            summary.donations_touched += 1;
            summary.drawn_from_donations += portion;
        } else {
            if available > 0 {
                // Below `portion`, so it fits in i64.
                donation.top_up(available as i64);
                summary.donations_touched += 1;
                summary.drawn_from_donations += available;
            }
            break;
        }
    }

    summary
}
